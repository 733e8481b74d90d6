//! Motion configuration supplied by the host layer.
//!
//! The core only ever reads a [`MotionConfig`]; hosts own it and replace it
//! wholesale when settings change (see `MotionMachine::apply_config`).

use serde::{Deserialize, Serialize};

use crate::binding::{resolve_target, TargetRef, TargetResolver};
use crate::error::MotionError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn finite_or_zero(self) -> Self {
        Self {
            x: finite_or_zero(self.x),
            y: finite_or_zero(self.y),
        }
    }
}

/// Width/height pair in scene units.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Scale factor that makes an object of `native` size appear at this extent.
    /// `None` when the native size has a zero (or unusable) dimension.
    pub fn scale_relative_to(self, native: Extent) -> Option<Vec2> {
        if !(native.width > 0.0 && native.height > 0.0) {
            return None;
        }
        Some(Vec2::new(self.width / native.width, self.height / native.height))
    }

    fn clamped(self) -> Self {
        Self {
            width: finite_or_zero(self.width).max(0.0),
            height: finite_or_zero(self.height).max(0.0),
        }
    }
}

/// Position and scale of a target, the only transform parts the filter drives.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub position: Vec2,
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            scale: Vec2::ONE,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathType {
    #[default]
    Linear,
    Quadratic,
    Cubic,
}

impl PathType {
    /// Bezier order of the position curve.
    #[inline]
    pub fn order(self) -> usize {
        match self {
            PathType::Linear => 1,
            PathType::Quadratic => 2,
            PathType::Cubic => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behaviour {
    OneWay,
    #[default]
    RoundTrip,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MotionConfig {
    /// Scene object to move.
    pub target: TargetRef,
    pub path_type: PathType,
    pub behaviour: Behaviour,

    pub use_explicit_start: bool,
    pub explicit_start_position: Vec2,
    pub use_explicit_start_size: bool,
    pub explicit_start_size: Extent,

    /// Consulted for quadratic and cubic paths.
    pub control_point1: Vec2,
    /// Consulted for cubic paths only.
    pub control_point2: Vec2,

    pub destination_position: Vec2,
    pub use_explicit_destination_size: bool,
    pub destination_size: Extent,

    /// Leg duration in seconds.
    pub duration: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            target: TargetRef::default(),
            path_type: PathType::Linear,
            behaviour: Behaviour::RoundTrip,
            use_explicit_start: false,
            explicit_start_position: Vec2::default(),
            use_explicit_start_size: false,
            explicit_start_size: Extent::new(300.0, 300.0),
            control_point1: Vec2::default(),
            control_point2: Vec2::default(),
            destination_position: Vec2::default(),
            use_explicit_destination_size: false,
            destination_size: Extent::new(300.0, 300.0),
            duration: 1.0,
        }
    }
}

impl MotionConfig {
    /// Copy with unusable numbers clamped: duration and extents are floored at
    /// zero, non-finite values become zero.
    pub fn sanitized(&self) -> Self {
        Self {
            target: self.target.clone(),
            explicit_start_position: self.explicit_start_position.finite_or_zero(),
            explicit_start_size: self.explicit_start_size.clamped(),
            control_point1: self.control_point1.finite_or_zero(),
            control_point2: self.control_point2.finite_or_zero(),
            destination_position: self.destination_position.finite_or_zero(),
            destination_size: self.destination_size.clamped(),
            duration: finite_or_zero(self.duration).max(0.0),
            ..*self
        }
    }

    /// Interior control points for the configured path type: none for linear,
    /// `control_point1` for quadratic, both for cubic.
    pub fn control_points(&self) -> impl Iterator<Item = Vec2> {
        let controls = [self.control_point1, self.control_point2];
        controls.into_iter().take(self.path_type.order() - 1)
    }

    /// Copy the target's current position into `destination_position`, so a
    /// target placed by hand becomes the end of the path. A target found only
    /// by id also has its new name written into `target`. Returns false (and
    /// changes nothing) when the target does not resolve.
    pub fn grab_destination(&mut self, resolver: &mut dyn TargetResolver) -> bool {
        let Some(resolution) = resolve_target(resolver, &self.target) else {
            return false;
        };
        let Some(live) = resolver.transform(resolution.handle) else {
            return false;
        };
        if let Some(name) = resolution.renamed {
            self.target.name = name;
        }
        self.destination_position = live.position;
        true
    }
}

#[inline]
fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Parse a motion config from JSON. Missing fields take their defaults.
pub fn parse_motion_config_json(json: &str) -> Result<MotionConfig, MotionError> {
    let cfg: MotionConfig = serde_json::from_str(json)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitized_clamps_unusable_numbers() {
        let cfg = MotionConfig {
            duration: f32::NAN,
            destination_size: Extent::new(-5.0, f32::INFINITY),
            control_point1: Vec2::new(f32::NEG_INFINITY, 3.0),
            ..MotionConfig::default()
        };
        let clean = cfg.sanitized();
        assert_eq!(clean.duration, 0.0);
        assert_eq!(clean.destination_size, Extent::new(0.0, 0.0));
        assert_eq!(clean.control_point1, Vec2::new(0.0, 3.0));
        assert_eq!(clean.behaviour, cfg.behaviour);
    }

    #[test]
    fn control_points_follow_path_type() {
        let mut cfg = MotionConfig {
            control_point1: Vec2::new(1.0, 1.0),
            control_point2: Vec2::new(2.0, 2.0),
            ..MotionConfig::default()
        };
        assert_eq!(cfg.control_points().count(), 0);
        cfg.path_type = PathType::Quadratic;
        assert_eq!(cfg.control_points().collect::<Vec<_>>(), vec![Vec2::new(1.0, 1.0)]);
        cfg.path_type = PathType::Cubic;
        assert_eq!(cfg.control_points().count(), 2);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let cfg = parse_motion_config_json(
            r#"{"pathType":"Cubic","useExplicitDestinationSize":true,"destinationSize":{"width":10,"height":20}}"#,
        )
        .unwrap();
        assert_eq!(cfg.path_type, PathType::Cubic);
        assert!(cfg.use_explicit_destination_size);
        assert_eq!(cfg.destination_size, Extent::new(10.0, 20.0));
        assert_eq!(cfg.duration, 1.0);
    }

    #[test]
    fn extent_scale_needs_a_native_size() {
        let target = Extent::new(200.0, 50.0);
        assert_eq!(target.scale_relative_to(Extent::new(100.0, 100.0)), Some(Vec2::new(2.0, 0.5)));
        assert_eq!(target.scale_relative_to(Extent::new(0.0, 100.0)), None);
    }
}
