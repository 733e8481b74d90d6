use bevy::prelude::*;
use std::collections::HashMap;

/// Index from entity `Name` to entity, populated by walking under `MotionSceneRoot`.
/// The first entity found under a name wins.
#[derive(Resource, Default)]
pub struct TargetIndex {
    pub by_name: HashMap<String, Entity>,
}

/// References motion filters currently hold on target entities: a non-zero
/// count means a leg is moving that target.
#[derive(Resource, Default, Debug)]
pub struct TargetLeases {
    counts: HashMap<Entity, u32>,
}

impl TargetLeases {
    pub fn acquire(&mut self, entity: Entity) {
        *self.counts.entry(entity).or_insert(0) += 1;
    }

    pub fn release(&mut self, entity: Entity) {
        if let Some(count) = self.counts.get_mut(&entity) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(&entity);
            }
        }
    }

    pub fn count(&self, entity: Entity) -> u32 {
        self.counts.get(&entity).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Fixed timestep configuration (seconds per tick).
#[derive(Resource)]
pub struct FixedDt(pub f32);

impl Default for FixedDt {
    fn default() -> Self {
        Self(1.0 / 60.0)
    }
}
