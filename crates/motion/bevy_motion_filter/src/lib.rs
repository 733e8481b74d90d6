//! Bevy host for the motion filter core.
//!
//! Each entity carrying a [`MotionFilter`] drives one named target found under a
//! [`MotionSceneRoot`]. Triggers, config updates and ticks run in `FixedUpdate`,
//! in that order; the name index is rebuilt every `Update`.

use bevy::prelude::*;
use motion_filter_core::{Direction, MotionConfig, PersistedState};

pub mod components;
pub mod resources;
pub mod systems;
pub mod triggers;

pub use components::{MotionFilter, MotionSceneRoot, NativeSize};
pub use resources::{FixedDt, TargetIndex, TargetLeases};
pub use triggers::{
    TriggerHandler, TriggerTable, GRAB_DESTINATION, PLAY_BACKWARD, PLAY_FORWARD,
};

/// Fire a named trigger (see [`TriggerTable`]) on a filter entity.
#[derive(Event, Debug, Clone)]
pub struct MotionTrigger {
    pub filter: Entity,
    pub trigger: String,
}

impl MotionTrigger {
    pub fn new(filter: Entity, trigger: impl Into<String>) -> Self {
        Self {
            filter,
            trigger: trigger.into(),
        }
    }
}

/// Replace a filter's config. The old target is recovered first when it changes.
#[derive(Event, Debug, Clone)]
pub struct MotionConfigUpdate {
    pub filter: Entity,
    pub config: MotionConfig,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionLegCompleted {
    pub filter: Entity,
    pub completed: Direction,
    pub pending: Direction,
}

/// State to store with the filter's settings.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct MotionStatePersisted {
    pub filter: Entity,
    pub state: PersistedState,
}

pub struct MotionFilterPlugin;

impl Plugin for MotionFilterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FixedDt>()
            .init_resource::<TargetIndex>()
            .init_resource::<TargetLeases>()
            .init_resource::<TriggerTable>()
            .add_event::<MotionTrigger>()
            .add_event::<MotionConfigUpdate>()
            .add_event::<MotionLegCompleted>()
            .add_event::<MotionStatePersisted>()
            .add_systems(Update, systems::build_target_index_system)
            .add_systems(
                FixedUpdate,
                (
                    systems::dispatch_triggers_system,
                    systems::apply_config_updates_system,
                    systems::tick_motion_system,
                )
                    .chain(),
            )
            .observe(systems::recover_on_remove);
    }
}
