//! Bezier evaluation helpers:
//! - evaluate (scalar, order inferred from the number of control values)
//! - evaluate_vec2 (component-wise over 2D control points)
//!
//! Orders 1 to 3 use the closed Bernstein forms so that `t = 0` and `t = 1`
//! return the first and last control value exactly. `t` is not clamped.

use crate::config::Vec2;

/// Linear interpolation in weighted form, exact at both endpoints.
#[inline]
pub fn lerp_f32(p0: f32, p1: f32, t: f32) -> f32 {
    (1.0 - t) * p0 + t * p1
}

#[inline]
fn quadratic_bezier(p0: f32, p1: f32, p2: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * p1 + t * t * p2
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// De Casteljau reduction for curves above cubic order.
fn de_casteljau(values: &[f32], t: f32) -> f32 {
    let mut work = values.to_vec();
    for level in (1..work.len()).rev() {
        for i in 0..level {
            work[i] = lerp_f32(work[i], work[i + 1], t);
        }
    }
    work[0]
}

/// Evaluate a Bezier curve over `values` at `t`. The order is `values.len() - 1`:
/// two values give a linear blend, three a quadratic curve, four a cubic one.
/// A single value is constant and an empty slice evaluates to zero.
#[inline]
pub fn evaluate(values: &[f32], t: f32) -> f32 {
    match *values {
        [] => 0.0,
        [p0] => p0,
        [p0, p1] => lerp_f32(p0, p1, t),
        [p0, p1, p2] => quadratic_bezier(p0, p1, p2, t),
        [p0, p1, p2, p3] => cubic_bezier(p0, p1, p2, p3, t),
        _ => de_casteljau(values, t),
    }
}

/// Evaluate a Bezier curve over 2D control points, X and Y independently.
pub fn evaluate_vec2(points: &[Vec2], t: f32) -> Vec2 {
    let mut xs = [0.0f32; 4];
    let mut ys = [0.0f32; 4];
    if points.len() > xs.len() {
        let xs: Vec<f32> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f32> = points.iter().map(|p| p.y).collect();
        return Vec2::new(evaluate(&xs, t), evaluate(&ys, t));
    }
    for (i, p) in points.iter().enumerate() {
        xs[i] = p.x;
        ys[i] = p.y;
    }
    let n = points.len();
    Vec2::new(evaluate(&xs[..n], t), evaluate(&ys[..n], t))
}
