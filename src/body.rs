//! The rigid body: a circle with linear and angular state integrated by
//! explicit (forward) Euler.
//!
//! Continuous forces go into `acceleration`, which is cleared at the end of
//! every [`RigidBody::update`]. A force applied once therefore only affects
//! the next step. Angular velocity is persistent: it keeps spinning the body
//! until `angular_drag` bleeds it off or another torque cancels it.
//!
//! # Example
//! ```
//! use physics2d::body::{BodyConfig, RigidBody};
//! use physics2d::vector::Vec2;
//!
//! let config = BodyConfig {
//!     gravity: Vec2::new(0.0, 980.0),
//!     radius: 4.0,
//!     ..BodyConfig::default()
//! };
//! let mut ball = RigidBody::new(Vec2::new(100.0, 0.0), config).unwrap();
//!
//! let floor = Vec2::new(0.0, 500.0);
//! let up = Vec2::new(0.0, -1.0);
//! for _ in 0..60 {
//!     ball.update(1.0 / 60.0);
//!     ball.collide_with_surface(&floor, &up);
//! }
//! assert_eq!(ball.acceleration, Vec2::zeros());
//! ```

use alloc::format;
use log::error;
use serde::Deserialize;

use crate::collision::{self, detect_circles, OverlapMode};
use crate::error::{Error, Result};
use crate::force::{apply_angle_force, apply_damping, apply_force, apply_torque};
use crate::vector::Vec2;

/// Construction parameters for a [`RigidBody`].
///
/// Every field has a default, so partial bags can be written with struct
/// update syntax or loaded through serde with missing keys filled in.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodyConfig {
    /// Mass, must be finite and > 0. Force and impulse response scale with `1/mass`.
    pub mass: f32,
    /// Per-step multiplicative velocity damping (0.0 = none).
    pub drag: f32,
    /// Per-step multiplicative angular velocity damping (0.0 = none).
    pub angular_drag: f32,
    /// Restitution in `[0, 1]`: 0 = no bounce, 1 = perfectly elastic.
    #[serde(alias = "restitution")]
    pub elasticity: f32,
    /// Collision radius, must be finite and >= 0.
    pub radius: f32,
    /// Constant acceleration added every step.
    pub gravity: Vec2,
    /// Per-step multiplicative velocity damping applied before `drag`.
    pub friction: f32,
    /// Overlap handling used by [`RigidBody::collide_with_body`].
    pub overlap: OverlapMode,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            drag: 0.0,
            angular_drag: 0.0,
            elasticity: 0.8,
            radius: 0.0,
            gravity: Vec2::zeros(),
            friction: 0.0,
            overlap: OverlapMode::Separate,
        }
    }
}

/// A circular rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    // -- Linear state --
    pub position: Vec2,
    pub velocity: Vec2,
    /// Accumulated acceleration for this step. Zeroed by `update()`.
    pub acceleration: Vec2,

    // -- Angular state --
    /// Heading in radians.
    pub angle: f32,
    /// Radians per second. Persists across steps; only `angular_drag` reduces it.
    pub angular_velocity: f32,

    // -- Parameters --
    mass: f32,
    inv_mass: f32,
    pub radius: f32,
    pub elasticity: f32,
    pub friction: f32,
    pub drag: f32,
    pub angular_drag: f32,
    pub gravity: Vec2,
    pub overlap: OverlapMode,
}

impl RigidBody {
    /// Create a body at rest at `position`.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `mass` is not finite and > 0, `radius` is
    ///   not finite and >= 0, or `position` is not finite.
    pub fn new(position: Vec2, config: BodyConfig) -> Result<Self> {
        if !config.mass.is_finite() || config.mass <= 0.0 {
            error!("rejecting body with mass {}", config.mass);
            return Err(Error::InvalidParam(format!(
                "mass must be finite and > 0, got {}",
                config.mass
            )));
        }
        if !config.radius.is_finite() || config.radius < 0.0 {
            error!("rejecting body with radius {}", config.radius);
            return Err(Error::InvalidParam(format!(
                "radius must be finite and >= 0, got {}",
                config.radius
            )));
        }
        if !position.iter().all(|c| c.is_finite()) {
            error!("rejecting body with non-finite position");
            return Err(Error::InvalidParam("position must be finite".into()));
        }

        Ok(Self {
            position,
            velocity: Vec2::zeros(),
            acceleration: Vec2::zeros(),
            angle: 0.0,
            angular_velocity: 0.0,
            mass: config.mass,
            inv_mass: 1.0 / config.mass,
            radius: config.radius,
            elasticity: config.elasticity,
            friction: config.friction,
            drag: config.drag,
            angular_drag: config.angular_drag,
            gravity: config.gravity,
            overlap: config.overlap,
        })
    }

    /// Builder: set initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: set initial heading (radians).
    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    /// Builder: set initial angular velocity (radians per second).
    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    /// Set position (validated as finite).
    pub fn set_position(&mut self, position: Vec2) -> Result<()> {
        if !position.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        self.position = position;
        Ok(())
    }

    /// Set velocity (validated as finite).
    pub fn set_velocity(&mut self, velocity: Vec2) -> Result<()> {
        if !velocity.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        self.velocity = velocity;
        Ok(())
    }

    /// Apply a continuous force for the next step: `acceleration += force / mass`.
    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        apply_force(&mut self.acceleration, &force, self.inv_mass);
    }

    /// Apply an instantaneous impulse: `velocity += impulse / mass`.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        apply_force(&mut self.velocity, &impulse, self.inv_mass);
    }

    /// Spin the body: `angular_velocity += torque / mass`.
    #[inline]
    pub fn apply_torque(&mut self, torque: f32) {
        self.angular_velocity = apply_torque(self.angular_velocity, torque, self.inv_mass);
    }

    /// Push with `force` along `angle`, or along the body's own heading when `None`.
    pub fn thrust(&mut self, force: f32, angle: Option<f32>) {
        let angle = angle.unwrap_or(self.angle);
        apply_angle_force(&mut self.acceleration, angle, force, self.inv_mass);
    }

    /// Advance the body by `dt` seconds.
    ///
    /// Order: gravity, friction, drag, velocity, position, angle, angular
    /// drag, then the acceleration accumulator is cleared.
    pub fn update(&mut self, dt: f32) {
        apply_force(&mut self.acceleration, &self.gravity, 1.0);

        if self.friction > 0.0 {
            apply_damping(&mut self.velocity, self.friction);
        }
        if self.drag > 0.0 {
            apply_damping(&mut self.velocity, self.drag);
        }

        apply_force(&mut self.velocity, &self.acceleration, dt);
        apply_force(&mut self.position, &self.velocity, dt);

        self.angle += self.angular_velocity * dt;
        if self.angular_drag > 0.0 {
            self.angular_velocity *= 1.0 - self.angular_drag;
        }

        self.acceleration = Vec2::zeros();
    }

    /// Resolve a collision with `other` if the two circles overlap.
    ///
    /// Uses the lower of the two elasticities and this body's overlap mode.
    /// Returns `true` when a collision was detected and resolved.
    pub fn collide_with_body(&mut self, other: &mut RigidBody) -> bool {
        if detect_circles(&self.position, self.radius, &other.position, other.radius).is_none() {
            return false;
        }
        let restitution = self.elasticity.min(other.elasticity);
        let mode = self.overlap;
        collision::collide(self, other, restitution, mode);
        true
    }

    /// Bounce off the plane through `point` with unit `normal`.
    ///
    /// Returns `true` when the body penetrated the plane and was corrected.
    pub fn collide_with_surface(&mut self, point: &Vec2, normal: &Vec2) -> bool {
        collision::collide_with_surface(self, point, normal)
    }

    /// Returns the current speed (magnitude of velocity).
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }

    /// Returns the linear momentum `m * v`.
    #[inline]
    pub fn momentum(&self) -> Vec2 {
        self.velocity * self.mass
    }

    /// Returns the kinetic energy of this body: `0.5 * m * v^2`.
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.velocity.norm_squared()
    }
}
