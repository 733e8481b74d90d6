//! Motion Filter Core (engine-agnostic)
//!
//! Moves a single scene target along a linear, quadratic or cubic Bezier path
//! and interpolates its scale, one leg at a time. Hosts (Bevy, editors, plugin
//! shells) implement [`TargetResolver`] and drive [`MotionMachine`] from their
//! per-frame update:
//!
//! - `request_start` when a "play-forward" / "play-backward" trigger fires
//! - `tick` once per frame, applying the returned [`Outputs`]' events
//! - `apply_config` before swapping in a changed [`MotionConfig`]
//! - `recover` / `teardown` when the filter is removed

pub mod bezier;
pub mod binding;
pub mod config;
pub mod error;
pub mod machine;
pub mod outputs;
pub mod persist;
pub mod snapshot;

// Re-exports for consumers (adapters)
pub use bezier::{evaluate, evaluate_vec2};
pub use binding::{resolve_target, Resolution, TargetHandle, TargetRef, TargetResolver};
pub use config::{parse_motion_config_json, Behaviour, Extent, MotionConfig, PathType, Transform2D, Vec2};
pub use error::{MotionError, StartRejected};
pub use machine::{Direction, MotionMachine, Origin, Phase};
pub use outputs::{Change, MotionEvent, Outputs};
pub use persist::{PersistedOrigin, PersistedState};
pub use snapshot::VariationSnapshot;
