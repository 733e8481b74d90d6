//! Output contracts from the motion core.
//!
//! Transform writes go straight to the resolver; `Outputs` mirrors them as
//! `changes` for hosts that batch or record, and carries the semantic events
//! adapters must act on (persisting state, renaming the configured target).

use serde::{Deserialize, Serialize};

use crate::binding::TargetHandle;
use crate::config::Transform2D;
use crate::machine::Direction;
use crate::persist::PersistedState;

/// One transform written this tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub target: TargetHandle,
    pub transform: Transform2D,
}

/// Discrete signals emitted by start, tick, recover and config changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum MotionEvent {
    LegStarted {
        direction: Direction,
        target: TargetHandle,
    },
    LegCompleted {
        direction: Direction,
        /// Direction the next trigger must request.
        pending: Direction,
    },
    /// The target vanished while a leg was running.
    LegAborted {
        direction: Direction,
    },
    /// The origin was written back onto the target.
    Recovered {
        target: TargetHandle,
    },
    /// The target was found by id under a different name; hosts should store it.
    TargetRenamed {
        name: String,
    },
    /// State a host should persist so a reload resumes the round trip correctly.
    PersistRequested(PersistedState),
}

/// Outputs returned by `MotionMachine::tick()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<MotionEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Last persisted state requested this tick, if any.
    pub fn persist_request(&self) -> Option<&PersistedState> {
        self.events.iter().rev().find_map(|e| match e {
            MotionEvent::PersistRequested(state) => Some(state),
            _ => None,
        })
    }
}
