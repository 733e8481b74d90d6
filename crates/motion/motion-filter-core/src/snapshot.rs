//! Variation snapshot: the frozen inputs of one leg.
//!
//! Built when a leg starts and never touched by later config changes, so a
//! leg always finishes on the curve it started on.

use serde::{Deserialize, Serialize};

use crate::bezier::{evaluate_vec2, lerp_f32};
use crate::binding::TargetHandle;
use crate::config::{Extent, MotionConfig, PathType, Transform2D, Vec2};
use crate::machine::Direction;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariationSnapshot {
    pub target: TargetHandle,
    pub direction: Direction,
    pub path_type: PathType,
    /// Start, interior control points, destination: `path_type.order() + 1` points.
    pub position_curve: Vec<Vec2>,
    /// Start and destination scale, always blended linearly.
    pub scale_curve: [Vec2; 2],
    /// Destination size override was on when the leg started.
    pub interpolate_scale: bool,
    pub duration: f32,
    pub elapsed: f32,
}

/// Live readings taken from the target when a leg starts.
#[derive(Copy, Clone, Debug)]
pub struct TargetReading {
    pub live: Transform2D,
    pub native: Option<Extent>,
}

impl VariationSnapshot {
    /// Build the snapshot for a leg in `direction`.
    ///
    /// `origin` is the recoverable start of the previous forward leg; a backward
    /// leg returns to it. Without one, the backward leg starts from the live
    /// transform.
    pub fn build(
        config: &MotionConfig,
        direction: Direction,
        target: TargetHandle,
        reading: TargetReading,
        origin: Option<Transform2D>,
    ) -> Self {
        let base = match (direction, origin) {
            (Direction::Backward, Some(origin)) => origin,
            _ => reading.live,
        };

        let start_position = if config.use_explicit_start {
            config.explicit_start_position
        } else {
            base.position
        };

        let start_scale = if config.use_explicit_start_size {
            extent_scale(config.explicit_start_size, reading)
        } else {
            base.scale
        };

        let end_scale = if config.use_explicit_destination_size {
            extent_scale(config.destination_size, reading)
        } else {
            start_scale
        };

        let mut position_curve = Vec::with_capacity(config.path_type.order() + 1);
        position_curve.push(start_position);
        position_curve.extend(config.control_points());
        position_curve.push(config.destination_position);

        Self {
            target,
            direction,
            path_type: config.path_type,
            position_curve,
            scale_curve: [start_scale, end_scale],
            interpolate_scale: config.use_explicit_destination_size,
            duration: config.duration,
            elapsed: 0.0,
        }
    }

    /// Transform at the start of the curve: the position/scale the target had
    /// (or was told to have) when the leg began.
    pub fn start(&self) -> Transform2D {
        Transform2D {
            position: self.position_curve[0],
            scale: self.scale_curve[0],
        }
    }

    /// Normalized curve parameter for the current elapsed time. Backward legs
    /// run the same curve from 1 down to 0.
    pub fn percent(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.elapsed.min(self.duration);
        let forward = elapsed / self.duration;
        match self.direction {
            Direction::Forward => forward,
            Direction::Backward => 1.0 - forward,
        }
    }

    /// Transform on the curve at `percent`.
    pub fn sample_at(&self, percent: f32) -> Transform2D {
        let position = evaluate_vec2(&self.position_curve, percent);
        let scale = if self.interpolate_scale {
            let [s0, s1] = self.scale_curve;
            Vec2::new(lerp_f32(s0.x, s1.x, percent), lerp_f32(s0.y, s1.y, percent))
        } else {
            self.scale_curve[0]
        };
        Transform2D { position, scale }
    }

    /// Transform for the current elapsed time.
    #[inline]
    pub fn sample(&self) -> Transform2D {
        self.sample_at(self.percent())
    }

    /// Elapsed time has reached the duration (unclamped comparison).
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    #[inline]
    pub fn advance(&mut self, delta: f32) {
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
        }
    }
}

fn extent_scale(extent: Extent, reading: TargetReading) -> Vec2 {
    reading
        .native
        .and_then(|native| extent.scale_relative_to(native))
        .unwrap_or(reading.live.scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Behaviour;

    fn reading(x: f32, y: f32) -> TargetReading {
        TargetReading {
            live: Transform2D {
                position: Vec2::new(x, y),
                scale: Vec2::ONE,
            },
            native: Some(Extent::new(100.0, 50.0)),
        }
    }

    fn cfg(path_type: PathType) -> MotionConfig {
        MotionConfig {
            path_type,
            behaviour: Behaviour::RoundTrip,
            control_point1: Vec2::new(10.0, 10.0),
            control_point2: Vec2::new(20.0, 20.0),
            destination_position: Vec2::new(100.0, 0.0),
            ..MotionConfig::default()
        }
    }

    #[test]
    fn curve_length_follows_path_order() {
        for (path, len) in [
            (PathType::Linear, 2),
            (PathType::Quadratic, 3),
            (PathType::Cubic, 4),
        ] {
            let snap = VariationSnapshot::build(
                &cfg(path),
                Direction::Forward,
                TargetHandle(1),
                reading(5.0, 6.0),
                None,
            );
            assert_eq!(snap.position_curve.len(), len, "{path:?}");
            assert_eq!(snap.position_curve[0], Vec2::new(5.0, 6.0));
            assert_eq!(*snap.position_curve.last().unwrap(), Vec2::new(100.0, 0.0));
        }
    }

    #[test]
    fn quadratic_ignores_second_control_point() {
        let snap = VariationSnapshot::build(
            &cfg(PathType::Quadratic),
            Direction::Forward,
            TargetHandle(1),
            reading(0.0, 0.0),
            None,
        );
        assert_eq!(snap.position_curve[1], Vec2::new(10.0, 10.0));
        assert!(!snap.position_curve.contains(&Vec2::new(20.0, 20.0)));
    }

    #[test]
    fn explicit_start_overrides_live_position() {
        let mut c = cfg(PathType::Linear);
        c.use_explicit_start = true;
        c.explicit_start_position = Vec2::new(-40.0, 8.0);
        let snap = VariationSnapshot::build(
            &c,
            Direction::Forward,
            TargetHandle(1),
            reading(5.0, 6.0),
            None,
        );
        assert_eq!(snap.start().position, Vec2::new(-40.0, 8.0));
    }

    #[test]
    fn extents_become_independent_axis_scales() {
        let mut c = cfg(PathType::Linear);
        c.use_explicit_start_size = true;
        c.explicit_start_size = Extent::new(50.0, 50.0);
        c.use_explicit_destination_size = true;
        c.destination_size = Extent::new(200.0, 25.0);
        let snap = VariationSnapshot::build(
            &c,
            Direction::Forward,
            TargetHandle(1),
            reading(0.0, 0.0),
            None,
        );
        assert_eq!(snap.scale_curve[0], Vec2::new(0.5, 1.0));
        assert_eq!(snap.scale_curve[1], Vec2::new(2.0, 0.5));
    }

    #[test]
    fn zero_native_size_falls_back_to_live_scale() {
        let mut c = cfg(PathType::Linear);
        c.use_explicit_destination_size = true;
        c.destination_size = Extent::new(200.0, 200.0);
        let mut r = reading(0.0, 0.0);
        r.live.scale = Vec2::new(1.5, 1.5);
        r.native = Some(Extent::new(0.0, 10.0));
        let snap = VariationSnapshot::build(&c, Direction::Forward, TargetHandle(1), r, None);
        assert_eq!(snap.scale_curve[1], Vec2::new(1.5, 1.5));
    }

    #[test]
    fn backward_leg_returns_to_origin() {
        let origin = Transform2D {
            position: Vec2::new(3.0, 4.0),
            scale: Vec2::new(0.5, 0.5),
        };
        let snap = VariationSnapshot::build(
            &cfg(PathType::Linear),
            Direction::Backward,
            TargetHandle(1),
            reading(100.0, 0.0),
            Some(origin),
        );
        assert_eq!(snap.start(), origin);
        assert_eq!(snap.percent(), 1.0);
        assert_eq!(snap.sample().position, Vec2::new(100.0, 0.0));
    }

    #[test]
    fn backward_leg_without_origin_starts_from_live() {
        let snap = VariationSnapshot::build(
            &cfg(PathType::Linear),
            Direction::Backward,
            TargetHandle(1),
            reading(70.0, 1.0),
            None,
        );
        assert_eq!(snap.start().position, Vec2::new(70.0, 1.0));
    }

    #[test]
    fn percent_clamps_elapsed_and_handles_zero_duration() {
        let mut snap = VariationSnapshot::build(
            &cfg(PathType::Linear),
            Direction::Forward,
            TargetHandle(1),
            reading(0.0, 0.0),
            None,
        );
        snap.elapsed = 5.0;
        assert_eq!(snap.percent(), 1.0);
        snap.duration = 0.0;
        snap.elapsed = 0.0;
        assert_eq!(snap.percent(), 1.0);
        assert!(snap.is_finished());
    }

    #[test]
    fn scale_is_held_without_destination_override() {
        let mut r = reading(0.0, 0.0);
        r.live.scale = Vec2::new(2.0, 3.0);
        let snap = VariationSnapshot::build(
            &cfg(PathType::Linear),
            Direction::Forward,
            TargetHandle(1),
            r,
            None,
        );
        assert_eq!(snap.sample_at(0.5).scale, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn advance_ignores_negative_and_non_finite_deltas() {
        let mut snap = VariationSnapshot::build(
            &cfg(PathType::Linear),
            Direction::Forward,
            TargetHandle(1),
            reading(0.0, 0.0),
            None,
        );
        snap.advance(-1.0);
        snap.advance(f32::NAN);
        snap.advance(f32::INFINITY);
        assert_eq!(snap.elapsed, 0.0);
        snap.advance(0.25);
        assert_eq!(snap.elapsed, 0.25);
    }
}
