//! Force application primitives.
//!
//! The same `apply_force` call serves every explicit Euler sub-step: force
//! scaled by `1/mass` into acceleration, acceleration scaled by `dt` into
//! velocity, and velocity scaled by `dt` into position.

use crate::vector::{from_angle, Vec2};

/// `target += force * scaler`.
#[inline]
pub fn apply_force(target: &mut Vec2, force: &Vec2, scaler: f32) {
    *target += force * scaler;
}

/// `target *= 1 - damping`.
///
/// `damping` is not clamped: values above 1 flip the sign and negative values
/// make the quantity grow.
#[inline]
pub fn apply_damping(target: &mut Vec2, damping: f32) {
    *target *= 1.0 - damping;
}

/// Returns `angular_velocity + torque * scaler`.
#[inline]
pub fn apply_torque(angular_velocity: f32, torque: f32, scaler: f32) -> f32 {
    angular_velocity + torque * scaler
}

/// Decompose `magnitude` along `angle` (radians) and apply it to `target`.
#[inline]
pub fn apply_angle_force(target: &mut Vec2, angle: f32, magnitude: f32, scaler: f32) {
    apply_force(target, &from_angle(angle, magnitude), scaler);
}
