//! Boid flocking forces: separation, alignment and cohesion.
//!
//! [`Flock::forces`] scans every pair (O(n²)), which is fine for tens of
//! boids. [`Flock::forces_with_grid`] produces the same forces using a
//! [`SpatialGrid`] sized to the largest rule radius.
//!
//! A boid with no neighbors in any radius gets a zero force. What it does
//! then (wander, keep heading) is up to the host.

use alloc::format;
use alloc::vec::Vec;
use log::error;
use serde::Deserialize;

use crate::collision::fallback_normal;
use crate::error::{Error, Result};
use crate::grid::SpatialGrid;
use crate::vector::{clamp_length, direction_between, normalize_or_zero, Vec2};

/// Floor for the separation distance weight `1 / max(dist, SEPARATION_EPSILON)`.
pub const SEPARATION_EPSILON: f32 = 1e-3;

/// A flocking agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Not used by the flocking rules; carried for hosts that integrate
    /// the resulting force as `F / m`.
    pub mass: f32,
}

impl Boid {
    /// A boid of unit mass.
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            mass: 1.0,
        }
    }
}

/// Flocking rule radii, weights and output cap.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlockConfig {
    pub separation_radius: f32,
    pub alignment_radius: f32,
    pub cohesion_radius: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// Maximum length of the combined force.
    pub max_speed: f32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            separation_radius: 25.0,
            alignment_radius: 50.0,
            cohesion_radius: 50.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            max_speed: 4.0,
        }
    }
}

impl FlockConfig {
    /// Errors:
    /// - `Error::InvalidParam` if a radius or `max_speed` is negative or not
    ///   finite, or a weight is not finite.
    pub fn validate(&self) -> Result<()> {
        let radii = [
            ("separation_radius", self.separation_radius),
            ("alignment_radius", self.alignment_radius),
            ("cohesion_radius", self.cohesion_radius),
            ("max_speed", self.max_speed),
        ];
        for (name, value) in radii {
            if !value.is_finite() || value < 0.0 {
                error!("rejecting flock config with {} = {}", name, value);
                return Err(Error::InvalidParam(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }
        if ![self.separation_weight, self.alignment_weight, self.cohesion_weight]
            .iter()
            .all(|w| w.is_finite())
        {
            error!("rejecting flock config with non-finite weights");
            return Err(Error::InvalidParam("flocking weights must be finite".into()));
        }
        Ok(())
    }

    /// Largest of the three rule radii.
    pub fn max_radius(&self) -> f32 {
        self.separation_radius
            .max(self.alignment_radius)
            .max(self.cohesion_radius)
    }
}

/// Computes flocking forces from a validated [`FlockConfig`].
#[derive(Debug, Clone)]
pub struct Flock {
    config: FlockConfig,
}

impl Flock {
    pub fn new(config: FlockConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    /// Steering force on each boid by brute-force neighbor scan.
    pub fn forces(&self, boids: &[Boid]) -> Vec<Vec2> {
        (0..boids.len())
            .map(|i| self.steer(boids, i, 0..boids.len()))
            .collect()
    }

    /// Steering force on each boid, finding neighbors through a spatial grid.
    pub fn forces_with_grid(&self, boids: &[Boid]) -> Vec<Vec2> {
        let cell_size = self.config.max_radius();
        if cell_size <= 0.0 {
            return alloc::vec![Vec2::zeros(); boids.len()];
        }

        let positions: Vec<Vec2> = boids.iter().map(|b| b.position).collect();
        let mut grid = SpatialGrid::with_cell_size(cell_size);
        grid.rebuild(&positions);

        (0..boids.len())
            .map(|i| self.steer(boids, i, grid.candidates(&positions[i])))
            .collect()
    }

    /// Combine the three rules for boid `i` over `candidates`.
    fn steer(&self, boids: &[Boid], i: usize, candidates: impl Iterator<Item = usize>) -> Vec2 {
        let cfg = &self.config;
        let me = &boids[i];

        let mut separation = Vec2::zeros();
        let mut velocity_sum = Vec2::zeros();
        let mut aligned = 0usize;
        let mut position_sum = Vec2::zeros();
        let mut cohering = 0usize;

        for j in candidates {
            if j == i {
                continue;
            }
            let other = &boids[j];
            let offset = me.position - other.position;
            let dist = offset.norm();

            if dist < cfg.separation_radius {
                // Coincident pair: the lower index steps back along the
                // fallback normal and the higher one forward, as in `collide`
                let fallback = if i < j { -fallback_normal() } else { fallback_normal() };
                let away = direction_between(&other.position, &me.position).unwrap_or(fallback);
                separation += away / dist.max(SEPARATION_EPSILON);
            }
            if dist < cfg.alignment_radius {
                velocity_sum += other.velocity;
                aligned += 1;
            }
            if dist < cfg.cohesion_radius {
                position_sum += other.position;
                cohering += 1;
            }
        }

        let alignment = if aligned > 0 {
            velocity_sum / aligned as f32
        } else {
            Vec2::zeros()
        };
        let cohesion = if cohering > 0 {
            position_sum / cohering as f32 - me.position
        } else {
            Vec2::zeros()
        };

        let force = normalize_or_zero(separation) * cfg.separation_weight
            + normalize_or_zero(alignment) * cfg.alignment_weight
            + normalize_or_zero(cohesion) * cfg.cohesion_weight;
        clamp_length(force, cfg.max_speed)
    }
}
