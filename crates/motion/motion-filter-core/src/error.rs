//! Error types for the motion core.

use crate::machine::Direction;

/// Why a start request was not accepted. None of these is fatal; the
/// machine's state is untouched whenever one is returned.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StartRejected {
    /// A leg is already in motion.
    #[error("a {running:?} leg is already running")]
    AlreadyRunning { running: Direction },

    /// The other direction is pending; this leg was already played.
    #[error("{requested:?} requested while the {pending:?} leg is pending")]
    DirectionNotPending {
        requested: Direction,
        pending: Direction,
    },

    /// Suppressed by the host-facing trigger rules (one-way behaviour).
    #[error("{requested:?} trigger suppressed for one-way motion")]
    Suppressed { requested: Direction },

    /// The configured target does not currently resolve to a live object.
    #[error("target '{name}' did not resolve to a live object")]
    TargetUnresolved { name: String },
}

/// Errors surfaced by parsing and host-facing helpers.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum MotionError {
    #[error("motion json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown trigger '{0}'")]
    UnknownTrigger(String),
}
