use bevy::prelude::*;
use std::collections::HashMap;

use motion_filter_core::{
    Extent, MotionEvent, TargetHandle, TargetResolver, Transform2D, Vec2 as MotionVec2,
};

use crate::components::{MotionFilter, MotionSceneRoot, NativeSize};
use crate::resources::{FixedDt, TargetIndex, TargetLeases};
use crate::triggers::TriggerTable;
use crate::{MotionConfigUpdate, MotionLegCompleted, MotionStatePersisted, MotionTrigger};

type TargetData = (
    &'static mut Transform,
    Option<&'static Name>,
    Option<&'static NativeSize>,
);

/// Handles are entity bits, so they stay valid exactly as long as the entity does.
#[inline]
fn handle_of(entity: Entity) -> TargetHandle {
    TargetHandle(entity.to_bits())
}

#[inline]
fn entity_of(handle: TargetHandle) -> Option<Entity> {
    Entity::try_from_bits(handle.0).ok()
}

/// Walks descendants under each MotionSceneRoot and populates the TargetIndex
/// resource mapping entity names to entities.
pub fn build_target_index_system(
    roots: Query<Entity, With<MotionSceneRoot>>,
    children: Query<&Children>,
    names: Query<&Name>,
    mut index: ResMut<TargetIndex>,
) {
    let mut map: HashMap<String, Entity> = HashMap::new();

    fn walk(
        e: Entity,
        map: &mut HashMap<String, Entity>,
        names: &Query<&Name>,
        children: &Query<&Children>,
    ) {
        if let Ok(name) = names.get(e) {
            map.entry(name.as_str().to_string()).or_insert(e);
        }
        if let Ok(cs) = children.get(e) {
            for &c in cs.iter() {
                walk(c, map, names, children);
            }
        }
    }

    for root in roots.iter() {
        walk(root, &mut map, &names, &children);
    }

    index.by_name = map;
}

/// Core resolver over the ECS: names go through the TargetIndex, ids are entity bits.
pub struct SceneResolver<'a, 'w, 's> {
    targets: &'a mut Query<'w, 's, TargetData>,
    index: &'a TargetIndex,
    leases: &'a mut TargetLeases,
}

impl<'a, 'w, 's> SceneResolver<'a, 'w, 's> {
    pub fn new(
        targets: &'a mut Query<'w, 's, TargetData>,
        index: &'a TargetIndex,
        leases: &'a mut TargetLeases,
    ) -> Self {
        Self {
            targets,
            index,
            leases,
        }
    }
}

impl TargetResolver for SceneResolver<'_, '_, '_> {
    fn resolve(&mut self, name: &str) -> Option<TargetHandle> {
        let entity = *self.index.by_name.get(name)?;
        self.targets.contains(entity).then(|| handle_of(entity))
    }

    fn resolve_id(&mut self, id: u64) -> Option<TargetHandle> {
        let entity = entity_of(TargetHandle(id))?;
        self.targets.contains(entity).then(|| handle_of(entity))
    }

    fn name_of(&self, handle: TargetHandle) -> Option<String> {
        let (_, name, _) = self.targets.get(entity_of(handle)?).ok()?;
        name.map(|n| n.as_str().to_string())
    }

    fn transform(&self, handle: TargetHandle) -> Option<Transform2D> {
        let (tf, _, _) = self.targets.get(entity_of(handle)?).ok()?;
        Some(Transform2D {
            position: MotionVec2::new(tf.translation.x, tf.translation.y),
            scale: MotionVec2::new(tf.scale.x, tf.scale.y),
        })
    }

    fn native_size(&self, handle: TargetHandle) -> Option<Extent> {
        let (_, _, native) = self.targets.get(entity_of(handle)?).ok()?;
        native.map(|n| Extent::new(n.0.x, n.0.y))
    }

    fn set_transform(&mut self, handle: TargetHandle, transform: Transform2D) {
        let Some(entity) = entity_of(handle) else {
            return;
        };
        if let Ok((mut tf, _, _)) = self.targets.get_mut(entity) {
            // Depth is not part of the motion.
            tf.translation.x = transform.position.x;
            tf.translation.y = transform.position.y;
            tf.scale.x = transform.scale.x;
            tf.scale.y = transform.scale.y;
        }
    }

    fn acquire(&mut self, handle: TargetHandle) {
        if let Some(entity) = entity_of(handle) {
            self.leases.acquire(entity);
        }
    }

    fn release(&mut self, handle: TargetHandle) {
        if let Some(entity) = entity_of(handle) {
            self.leases.release(entity);
        }
    }
}

/// Runs `apply_config` before swapping in each updated config, so a target
/// change unwinds the old target first.
pub fn apply_config_updates_system(
    mut updates: EventReader<MotionConfigUpdate>,
    mut filters: Query<&mut MotionFilter>,
    mut targets: Query<TargetData>,
    index: Res<TargetIndex>,
    mut leases: ResMut<TargetLeases>,
) {
    let mut resolver = SceneResolver::new(&mut targets, &index, &mut leases);
    for update in updates.read() {
        let Ok(mut filter) = filters.get_mut(update.filter) else {
            warn!("config update for {:?}, which has no MotionFilter", update.filter);
            continue;
        };
        let MotionFilter { config, machine, .. } = &mut *filter;
        if machine.apply_config(config, &update.config, &mut resolver) {
            debug!("motion filter {:?} recovered before retargeting", update.filter);
        }
        *config = update.config.clone();
    }
}

pub fn dispatch_triggers_system(
    mut triggers: EventReader<MotionTrigger>,
    table: Res<TriggerTable>,
    mut filters: Query<&mut MotionFilter>,
    mut targets: Query<TargetData>,
    index: Res<TargetIndex>,
    mut leases: ResMut<TargetLeases>,
) {
    let mut resolver = SceneResolver::new(&mut targets, &index, &mut leases);
    for trigger in triggers.read() {
        let handler = match table.handler(&trigger.trigger) {
            Ok(handler) => handler,
            Err(err) => {
                warn!("motion filter {:?}: {err}", trigger.filter);
                continue;
            }
        };
        let Ok(mut filter) = filters.get_mut(trigger.filter) else {
            warn!("trigger '{}' sent to {:?}, which has no MotionFilter", trigger.trigger, trigger.filter);
            continue;
        };
        match handler(&mut *filter, &mut resolver) {
            Ok(()) => debug!("motion filter {:?}: '{}' accepted", trigger.filter, trigger.trigger),
            Err(reason) => debug!("motion filter {:?}: '{}' ignored ({reason})", trigger.filter, trigger.trigger),
        }
    }
}

/// Fixed timestep: advance every filter by `FixedDt` and route the machine's
/// events back into the ECS.
pub fn tick_motion_system(
    dt: Res<FixedDt>,
    mut filters: Query<(Entity, &mut MotionFilter)>,
    mut targets: Query<TargetData>,
    index: Res<TargetIndex>,
    mut leases: ResMut<TargetLeases>,
    mut completed: EventWriter<MotionLegCompleted>,
    mut persisted: EventWriter<MotionStatePersisted>,
) {
    let mut resolver = SceneResolver::new(&mut targets, &index, &mut leases);
    for (entity, mut filter) in filters.iter_mut() {
        let MotionFilter {
            config,
            machine,
            persisted: stored,
        } = &mut *filter;

        let out = machine.tick(dt.0, &mut resolver);
        if out.is_empty() {
            continue;
        }
        if let Some(state) = out.persist_request() {
            *stored = Some(state.clone());
        }
        for event in &out.events {
            match event {
                MotionEvent::PersistRequested(state) => {
                    persisted.send(MotionStatePersisted {
                        filter: entity,
                        state: state.clone(),
                    });
                }
                MotionEvent::TargetRenamed { name } => {
                    debug!("motion filter {entity:?}: target renamed to '{name}'");
                    config.target.name = name.clone();
                }
                MotionEvent::LegCompleted { direction, pending } => {
                    completed.send(MotionLegCompleted {
                        filter: entity,
                        completed: *direction,
                        pending: *pending,
                    });
                }
                MotionEvent::LegAborted { direction } => {
                    warn!("motion filter {entity:?}: {direction:?} leg aborted, target is gone");
                }
                other => trace!("motion filter {entity:?}: {other:?}"),
            }
        }
    }
}

/// A filter going away puts its target back: a running leg is unwound and a
/// reverse leg still owed is settled by restoring the origin.
pub fn recover_on_remove(
    trigger: Trigger<OnRemove, MotionFilter>,
    mut filters: Query<&mut MotionFilter>,
    mut targets: Query<TargetData>,
    index: Res<TargetIndex>,
    mut leases: ResMut<TargetLeases>,
) {
    let Ok(mut filter) = filters.get_mut(trigger.entity()) else {
        return;
    };
    let mut resolver = SceneResolver::new(&mut targets, &index, &mut leases);
    if filter.machine.recover(&mut resolver) {
        debug!("motion filter {:?} removed; target recovered", trigger.entity());
    }
}
