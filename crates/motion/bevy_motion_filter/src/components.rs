use bevy::prelude::*;
use motion_filter_core::{MotionConfig, MotionMachine, PersistedState};

/// Marker component designating the root of a subtree whose named entities can be
/// motion targets. The index system walks descendants of any entity with this marker.
#[derive(Component)]
pub struct MotionSceneRoot;

/// One motion filter: the host-owned config, the core state machine driving it,
/// and the latest state the machine asked to persist.
#[derive(Component, Debug, Default)]
pub struct MotionFilter {
    pub config: MotionConfig,
    pub machine: MotionMachine,
    pub persisted: Option<PersistedState>,
}

impl MotionFilter {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            machine: MotionMachine::new(),
            persisted: None,
        }
    }

    /// Filter resuming from a state stored by an earlier session.
    pub fn restored(config: MotionConfig, state: PersistedState) -> Self {
        Self {
            config,
            machine: MotionMachine::from_persisted(&state),
            persisted: Some(state),
        }
    }
}

/// Unscaled size of a target in world units. Destination/start size overrides
/// are converted to scale factors against it; targets without one keep their
/// live scale.
#[derive(Component, Debug, Clone, Copy)]
pub struct NativeSize(pub Vec2);
