//! Persisted round-trip state.
//!
//! A round trip spans two triggers, possibly with a reload in between. After
//! each completed round-trip leg (and after a recover) the machine asks the host
//! to store which leg is pending and where the target started, so that the
//! reverse leg and `recover` still know the origin after a restart.

use serde::{Deserialize, Serialize};

use crate::binding::TargetRef;
use crate::config::Vec2;
use crate::error::MotionError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// True while the reverse leg is pending.
    #[serde(rename = "is_reversed", default)]
    pub reversed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<PersistedOrigin>,
}

/// Start transform of the last forward leg.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedOrigin {
    pub target: TargetRef,
    pub position: Vec2,
    pub scale: Vec2,
}

impl PersistedState {
    pub fn to_json(&self) -> Result<String, MotionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MotionError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_defaults_to_forward_pending() {
        let state = PersistedState::from_json("{}").unwrap();
        assert_eq!(state, PersistedState::default());
        assert!(!state.reversed);
    }

    #[test]
    fn reversed_flag_uses_stored_key() {
        let state = PersistedState {
            reversed: true,
            origin: None,
        };
        let json = state.to_json().unwrap();
        assert_eq!(json, r#"{"is_reversed":true}"#);
    }

    #[test]
    fn garbage_is_a_json_error() {
        let err = PersistedState::from_json("{not json").unwrap_err();
        assert!(matches!(err, MotionError::Json(_)));
    }
}
