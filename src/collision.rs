//! Pairwise collision resolution between circular bodies and static planes.
//!
//! Detection is discrete: overlap is checked at the end of a step only, so
//! fast bodies can tunnel through each other. Response is impulse based along
//! the contact normal; no torque is generated by off-center impacts.
//!
//! # Example
//! ```
//! use physics2d::body::{BodyConfig, RigidBody};
//! use physics2d::collision::{collide, OverlapMode};
//! use physics2d::vector::Vec2;
//!
//! let mut a = RigidBody::new(Vec2::new(0.0, 0.0), BodyConfig::default())
//!     .unwrap()
//!     .with_velocity(Vec2::new(5.0, 0.0));
//! let mut b = RigidBody::new(Vec2::new(1.0, 0.0), BodyConfig::default())
//!     .unwrap()
//!     .with_velocity(Vec2::new(-5.0, 0.0));
//!
//! collide(&mut a, &mut b, 1.0, OverlapMode::None);
//! assert!((a.velocity.x + 5.0).abs() < 1e-4);
//! assert!((b.velocity.x - 5.0).abs() < 1e-4);
//! ```

use log::debug;
// ComplexField provides sqrt() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;
use serde::Deserialize;

use crate::body::RigidBody;
use crate::vector::{direction_between, reflect, Vec2};

/// Strength used by [`OverlapMode::repel`].
pub const DEFAULT_REPEL_STRENGTH: f32 = 0.5;

/// Contact normal used when two centers coincide.
#[inline]
pub fn fallback_normal() -> Vec2 {
    Vec2::new(1.0, 0.0)
}

/// How positional overlap is handled after the velocity impulse.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum OverlapMode {
    /// Move both bodies apart along the normal, heavier body moving less.
    #[default]
    Separate,
    /// Add a velocity push proportional to the overlap depth instead of moving
    /// positions. Produces a springy separation over a few steps.
    Repel { strength: f32 },
    /// Leave overlapping bodies where they are.
    None,
}

impl OverlapMode {
    /// Repel with [`DEFAULT_REPEL_STRENGTH`].
    pub fn repel() -> Self {
        OverlapMode::Repel {
            strength: DEFAULT_REPEL_STRENGTH,
        }
    }
}

/// A detected overlap between two circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first body toward the second.
    pub normal: Vec2,
    /// Penetration depth (positive when overlapping).
    pub penetration: f32,
}

/// Unit vector from `a` toward `b`, or [`fallback_normal`] when they coincide.
///
/// Coincidence is judged relative to the magnitude of the coordinates, see
/// [`direction_between`].
pub fn collision_normal(a: &Vec2, b: &Vec2) -> Vec2 {
    direction_between(a, b).unwrap_or_else(|| {
        debug!("coincident centers at ({}, {}), using fallback normal", a.x, a.y);
        fallback_normal()
    })
}

/// Circle vs circle overlap test.
///
/// Touching circles (distance exactly `ra + rb`) do not count as overlapping.
pub fn detect_circles(pos_a: &Vec2, radius_a: f32, pos_b: &Vec2, radius_b: f32) -> Option<Contact> {
    let dist_sq = (pos_b - pos_a).norm_squared();
    let sum_r = radius_a + radius_b;

    if dist_sq >= sum_r * sum_r {
        return None;
    }

    Some(Contact {
        normal: collision_normal(pos_a, pos_b),
        penetration: sum_r - dist_sq.sqrt(),
    })
}

/// Share of a correction taken by each body: `(inv_a, inv_b) / (inv_a + inv_b)`.
///
/// Equivalent to `(m_b, m_a) / (m_a + m_b)`, so the heavier body moves less.
#[inline]
fn mass_shares(a: &RigidBody, b: &RigidBody) -> (f32, f32) {
    let inv_a = a.inv_mass();
    let inv_b = b.inv_mass();
    let inv_sum = inv_a + inv_b;
    (inv_a / inv_sum, inv_b / inv_sum)
}

/// Penetration of two bodies along their center line, `ra + rb - distance`.
#[inline]
fn overlap_depth(a: &RigidBody, b: &RigidBody) -> f32 {
    a.radius + b.radius - (b.position - a.position).norm()
}

/// Resolve a collision between `a` and `b`.
///
/// Applies the normal impulse
/// `j = -(1 + restitution) * vn / (1/m_a + 1/m_b)` when the bodies are
/// approaching (`vn <= 0`), then handles overlap according to `mode`.
/// Separating bodies receive no impulse, so energy is never added to a pair
/// that is already moving apart.
pub fn collide(a: &mut RigidBody, b: &mut RigidBody, restitution: f32, mode: OverlapMode) {
    let normal = collision_normal(&a.position, &b.position);

    let relative_vel = b.velocity - a.velocity;
    let vel_along_normal = relative_vel.dot(&normal);

    if vel_along_normal <= 0.0 {
        let inv_mass_a = a.inv_mass();
        let inv_mass_b = b.inv_mass();
        let j = -(1.0 + restitution) * vel_along_normal / (inv_mass_a + inv_mass_b);

        let impulse = normal * j;
        a.velocity -= impulse * inv_mass_a;
        b.velocity += impulse * inv_mass_b;
    }

    match mode {
        OverlapMode::Separate => {
            separate(a, b, &normal);
        }
        OverlapMode::Repel { strength } => {
            repel(a, b, &normal, strength);
        }
        OverlapMode::None => {}
    }
}

/// Push overlapping bodies apart along `normal`, split inversely to mass.
///
/// Returns `false` (and does nothing) when the bodies do not overlap.
pub fn separate(a: &mut RigidBody, b: &mut RigidBody, normal: &Vec2) -> bool {
    let overlap = overlap_depth(a, b);
    if overlap <= 0.0 {
        return false;
    }

    let (share_a, share_b) = mass_shares(a, b);
    let correction = normal * overlap;
    a.position -= correction * share_a;
    b.position += correction * share_b;
    true
}

/// Push overlapping bodies apart in the velocity domain.
///
/// The push is `normal * overlap * strength`, split inversely to mass like
/// [`separate`]. Returns `false` when the bodies do not overlap.
pub fn repel(a: &mut RigidBody, b: &mut RigidBody, normal: &Vec2, strength: f32) -> bool {
    let overlap = overlap_depth(a, b);
    if overlap <= 0.0 {
        return false;
    }

    let (share_a, share_b) = mass_shares(a, b);
    let push = normal * (overlap * strength);
    a.velocity -= push * share_a;
    b.velocity += push * share_b;
    true
}

/// Bounce `body` off the infinite plane through `point` with unit `normal`.
///
/// The body is pushed out so it rests exactly `radius` in front of the plane
/// and its velocity is mirrored about the normal and scaled by its
/// elasticity. Returns `false` when the body does not penetrate the plane.
pub fn collide_with_surface(body: &mut RigidBody, point: &Vec2, normal: &Vec2) -> bool {
    let depth = (body.position - point).dot(normal);
    if depth >= body.radius {
        return false;
    }

    body.position += normal * (body.radius - depth);
    body.velocity = reflect(body.velocity, *normal) * body.elasticity;
    true
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::body::BodyConfig;
    use crate::error::Result;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn approx_vec_eq(a: &Vec2, b: &Vec2) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
    }

    fn body(x: f32, vx: f32, mass: f32, radius: f32) -> Result<RigidBody> {
        let config = BodyConfig {
            mass,
            radius,
            ..BodyConfig::default()
        };
        Ok(RigidBody::new(Vec2::new(x, 0.0), config)?.with_velocity(Vec2::new(vx, 0.0)))
    }

    #[test]
    fn test_equal_mass_elastic_swaps_velocities() -> Result<()> {
        let mut a = body(0.0, 5.0, 1.0, 0.0)?;
        let mut b = body(1.0, -5.0, 1.0, 0.0)?;

        collide(&mut a, &mut b, 1.0, OverlapMode::None);

        assert!(approx_vec_eq(&a.velocity, &Vec2::new(-5.0, 0.0)));
        assert!(approx_vec_eq(&b.velocity, &Vec2::new(5.0, 0.0)));
        Ok(())
    }

    #[test]
    fn test_inelastic_matches_normal_velocity() -> Result<()> {
        let mut a = body(0.0, 5.0, 1.0, 0.0)?;
        let mut b = body(1.0, -5.0, 1.0, 0.0)?;

        collide(&mut a, &mut b, 0.0, OverlapMode::None);

        let n = Vec2::new(1.0, 0.0);
        assert!(approx_eq(a.velocity.dot(&n), b.velocity.dot(&n)));
        Ok(())
    }

    #[test]
    fn test_inelastic_unequal_mass_conserves_momentum() -> Result<()> {
        let mut a = body(0.0, 4.0, 3.0, 0.0)?;
        let mut b = body(1.0, 0.0, 1.0, 0.0)?;
        let before = a.momentum() + b.momentum();

        collide(&mut a, &mut b, 0.0, OverlapMode::None);

        let after = a.momentum() + b.momentum();
        assert!(approx_vec_eq(&before, &after));
        // Common velocity: 12 / 4 = 3
        assert!(approx_eq(a.velocity.x, 3.0));
        assert!(approx_eq(b.velocity.x, 3.0));
        Ok(())
    }

    #[test]
    fn test_separating_bodies_untouched() -> Result<()> {
        let mut a = body(0.0, -2.0, 1.0, 0.0)?;
        let mut b = body(1.0, 3.0, 1.0, 0.0)?;

        collide(&mut a, &mut b, 1.0, OverlapMode::None);

        assert_eq!(a.velocity, Vec2::new(-2.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(3.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_separate_is_mass_weighted() -> Result<()> {
        // Radii sum 15, distance 5: overlap of 10 units
        let mut heavy = body(0.0, 0.0, 10.0, 7.5)?;
        let mut light = body(5.0, 0.0, 1.0, 7.5)?;

        collide(&mut heavy, &mut light, 0.5, OverlapMode::Separate);

        let heavy_moved = heavy.position.x.abs();
        let light_moved = (light.position.x - 5.0).abs();
        assert!(approx_eq(heavy_moved + light_moved, 10.0));
        assert!(approx_eq(light_moved / heavy_moved, 10.0));
        assert!(approx_eq(light.position.x - heavy.position.x, 15.0));
        Ok(())
    }

    #[test]
    fn test_separate_noop_without_overlap() -> Result<()> {
        let mut a = body(0.0, 0.0, 1.0, 1.0)?;
        let mut b = body(5.0, 0.0, 1.0, 1.0)?;
        let n = collision_normal(&a.position, &b.position);

        assert!(!separate(&mut a, &mut b, &n));
        assert_eq!(a.position, Vec2::zeros());
        assert_eq!(b.position, Vec2::new(5.0, 0.0));
        Ok(())
    }

    #[test]
    fn test_repel_pushes_velocity_not_position() -> Result<()> {
        let mut a = body(0.0, 0.0, 1.0, 1.0)?;
        let mut b = body(1.0, 0.0, 1.0, 1.0)?;

        collide(&mut a, &mut b, 0.0, OverlapMode::Repel { strength: 2.0 });

        // Overlap of 1, push of 2 split evenly
        assert_eq!(a.position, Vec2::zeros());
        assert_eq!(b.position, Vec2::new(1.0, 0.0));
        assert!(approx_vec_eq(&a.velocity, &Vec2::new(-1.0, 0.0)));
        assert!(approx_vec_eq(&b.velocity, &Vec2::new(1.0, 0.0)));
        Ok(())
    }

    #[test]
    fn test_coincident_centers_use_fallback_normal() -> Result<()> {
        let n = collision_normal(&Vec2::new(2.0, 2.0), &Vec2::new(2.0, 2.0));
        assert_eq!(n, fallback_normal());

        let mut a = body(0.0, 0.0, 1.0, 1.0)?;
        let mut b = body(0.0, 0.0, 1.0, 1.0)?;
        collide(&mut a, &mut b, 1.0, OverlapMode::Separate);

        assert!(a.position.x.is_finite() && b.position.x.is_finite());
        assert!(approx_eq(b.position.x - a.position.x, 2.0));
        Ok(())
    }

    #[test]
    fn test_repel_is_mass_weighted() -> Result<()> {
        let mut heavy = body(0.0, 0.0, 10.0, 1.0)?;
        let mut light = body(1.0, 0.0, 1.0, 1.0)?;
        let n = collision_normal(&heavy.position, &light.position);

        // Overlap of 1, push of 1.1 split 1:10
        assert!(repel(&mut heavy, &mut light, &n, 1.1));
        assert!(approx_vec_eq(&heavy.velocity, &Vec2::new(-0.1, 0.0)));
        assert!(approx_vec_eq(&light.velocity, &Vec2::new(1.0, 0.0)));
        assert!(approx_vec_eq(&(heavy.momentum() + light.momentum()), &Vec2::zeros()));
        Ok(())
    }

    #[test]
    fn test_overlapping_but_separating_still_separated() -> Result<()> {
        let mut a = body(0.0, -1.0, 1.0, 1.0)?;
        let mut b = body(1.0, 1.0, 1.0, 1.0)?;

        collide(&mut a, &mut b, 1.0, OverlapMode::Separate);

        // No impulse for a separating pair
        assert_eq!(a.velocity, Vec2::new(-1.0, 0.0));
        assert_eq!(b.velocity, Vec2::new(1.0, 0.0));
        // Overlap still resolved
        assert!(approx_eq(a.position.x, -0.5));
        assert!(approx_eq(b.position.x, 1.5));
        Ok(())
    }

    #[test]
    fn test_tiny_offset_keeps_true_normal() -> Result<()> {
        let n = collision_normal(&Vec2::zeros(), &Vec2::new(-5e-7, 0.0));
        assert!(approx_vec_eq(&n, &Vec2::new(-1.0, 0.0)));

        let mut a = body(0.0, 0.0, 1.0, 1.0)?;
        let mut b = body(-5e-7, 0.0, 1.0, 1.0)?;
        collide(&mut a, &mut b, 0.5, OverlapMode::Separate);

        // b started on the left and must stay there
        assert!(b.position.x < a.position.x);
        assert!(approx_eq(a.position.x - b.position.x, 2.0));
        Ok(())
    }

    #[test]
    fn test_detect_circles() {
        assert!(detect_circles(&Vec2::zeros(), 1.0, &Vec2::new(3.0, 0.0), 1.0).is_none());
        // Exactly touching
        assert!(detect_circles(&Vec2::zeros(), 1.0, &Vec2::new(2.0, 0.0), 1.0).is_none());

        let contact = detect_circles(&Vec2::zeros(), 1.0, &Vec2::new(0.0, 1.5), 1.0).unwrap();
        assert!(approx_eq(contact.penetration, 0.5));
        assert!(approx_vec_eq(&contact.normal, &Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_surface_bounce() -> Result<()> {
        let config = BodyConfig {
            radius: 1.0,
            elasticity: 0.5,
            ..BodyConfig::default()
        };
        let mut b = RigidBody::new(Vec2::new(0.0, 0.5), config)?.with_velocity(Vec2::new(2.0, -4.0));

        let hit = collide_with_surface(&mut b, &Vec2::zeros(), &Vec2::new(0.0, 1.0));

        assert!(hit);
        assert!(approx_vec_eq(&b.position, &Vec2::new(0.0, 1.0)));
        assert!(approx_vec_eq(&b.velocity, &Vec2::new(1.0, 2.0)));
        Ok(())
    }

    #[test]
    fn test_surface_no_penetration_noop() -> Result<()> {
        let config = BodyConfig {
            radius: 1.0,
            ..BodyConfig::default()
        };
        let mut b = RigidBody::new(Vec2::new(0.0, 3.0), config)?.with_velocity(Vec2::new(0.0, -1.0));

        assert!(!collide_with_surface(&mut b, &Vec2::zeros(), &Vec2::new(0.0, 1.0)));
        assert_eq!(b.velocity, Vec2::new(0.0, -1.0));
        Ok(())
    }
}
