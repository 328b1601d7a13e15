//! Vector helpers layered on top of [`nalgebra::Vector2`].
//!
//! nalgebra already covers add/sub/scale/dot/length. This module fills in the
//! few game-oriented operations the physics code leans on: normalization with
//! an explicit fallback, mirror reflection, angle construction and rotation.

use nalgebra::Vector2;

// ComplexField / RealField provide sqrt(), sin_cos() and atan2() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::{ComplexField, RealField};

/// The vector type used for positions, velocities, forces and normals.
pub type Vec2 = Vector2<f32>;

/// Lengths below this are treated as zero when normalizing.
pub const NORMALIZE_EPSILON: f32 = 1e-6;

/// Normalize `v`, returning `fallback` when `v` is (nearly) zero length.
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.norm();
    if len > NORMALIZE_EPSILON {
        v / len
    } else {
        fallback
    }
}

/// Normalize `v`, returning the zero vector when `v` is (nearly) zero length.
#[inline]
pub fn normalize_or_zero(v: Vec2) -> Vec2 {
    normalize_or(v, Vec2::zeros())
}

/// Unit vector pointing from `from` toward `to`.
///
/// `None` when the points cannot be told apart at `f32` precision, i.e. their
/// distance is within `f32::EPSILON` relative to the larger coordinate
/// magnitude. Small but resolvable offsets near the origin still get a
/// direction.
#[inline]
pub fn direction_between(from: &Vec2, to: &Vec2) -> Option<Vec2> {
    let diff = to - from;
    let dist = diff.norm();
    let scale = from.norm().max(to.norm());
    (dist > 0.0 && dist > f32::EPSILON * scale).then(|| diff / dist)
}

/// Mirror `v` about the plane with unit normal `n`: `v - 2 (v·n) n`.
///
/// Reflection is its own inverse: `reflect(reflect(v, n), n) == v`.
#[inline]
pub fn reflect(v: Vec2, n: Vec2) -> Vec2 {
    v - n * (2.0 * v.dot(&n))
}

/// Vector of length `magnitude` pointing along `angle` (radians from +X).
#[inline]
pub fn from_angle(angle: f32, magnitude: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos * magnitude, sin * magnitude)
}

/// Heading of `v` in radians, in `(-PI, PI]`.
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Rotate `v` counter-clockwise by `angle` radians.
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: &Vec2, b: &Vec2) -> f32 {
    (b - a).norm()
}

/// Squared distance between two points.
#[inline]
pub fn distance_squared(a: &Vec2, b: &Vec2) -> f32 {
    (b - a).norm_squared()
}

/// Scale `v` down to `max_length` if it is longer; shorter vectors pass through.
#[inline]
pub fn clamp_length(v: Vec2, max_length: f32) -> Vec2 {
    let len = v.norm();
    if len > max_length && len > 0.0 {
        v * (max_length / len)
    } else {
        v
    }
}

/// Degrees to radians.
#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * (core::f32::consts::PI / 180.0)
}

/// Radians to degrees.
#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians * (180.0 / core::f32::consts::PI)
}
