//! Approximate SPH (smoothed particle hydrodynamics) fluid forces.
//!
//! This is tuned for plausible fluid-like motion in games, not accuracy.
//! Each step:
//! 1. Particles are bucketed into a [`SpatialGrid`] with cell size equal to
//!    the smoothing radius `h`.
//! 2. Density is summed over neighbors within `h` using the linear kernel
//!    `mass * (1 - dist / h)`. A particle does not contribute to its own density.
//! 3. Pressure is `stiffness * (density - rest_density)`. It is not clamped,
//!    so rarefied regions pull particles together.
//! 4. Each neighbor pair exchanges a pressure term along the line between them
//!    and a viscosity term along their velocity difference. Both terms are
//!    symmetric in the pair, so the forces obey Newton's third law.
//!
//! A particle with no neighbors has zero density and receives zero force.
//!
//! # Example
//! ```
//! use physics2d::fluid::{FluidConfig, FluidParticle, FluidSolver};
//! use physics2d::vector::Vec2;
//!
//! let solver = FluidSolver::new(FluidConfig::default()).unwrap();
//! let particles = [
//!     FluidParticle::new(Vec2::new(0.0, 0.0), 1.0),
//!     FluidParticle::new(Vec2::new(4.0, 0.0), 1.0),
//! ];
//! let forces = solver.forces(&particles);
//! assert!((forces[0] + forces[1]).norm() < 1e-4);
//! ```

use alloc::format;
use alloc::vec::Vec;
use log::error;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::grid::SpatialGrid;
use crate::vector::{direction_between, Vec2};

/// One fluid sample point.
///
/// `density` and `pressure` are a per-frame cache written by
/// [`FluidSolver::refresh`]; they are not read by the force computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub density: f32,
    pub pressure: f32,
    pub mass: f32,
}

impl FluidParticle {
    /// A particle at rest at `position`.
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec2::zeros(),
            density: 0.0,
            pressure: 0.0,
            mass,
        }
    }

    /// Builder: set initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Tuning parameters for the fluid model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FluidConfig {
    /// Interaction radius `h` (also the grid cell size). Must be finite and > 0.
    pub smoothing_radius: f32,
    /// Pressure per unit of density above rest.
    pub stiffness: f32,
    /// Density at which pressure is zero.
    pub rest_density: f32,
    /// Strength of velocity smoothing between neighbors.
    pub viscosity: f32,
}

impl Default for FluidConfig {
    fn default() -> Self {
        Self {
            smoothing_radius: 16.0,
            stiffness: 200.0,
            rest_density: 1.0,
            viscosity: 0.1,
        }
    }
}

impl FluidConfig {
    /// Errors:
    /// - `Error::InvalidParam` if `smoothing_radius` is not finite and > 0, or
    ///   any other field is not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.smoothing_radius.is_finite() || self.smoothing_radius <= 0.0 {
            error!("rejecting fluid config with smoothing radius {}", self.smoothing_radius);
            return Err(Error::InvalidParam(format!(
                "smoothing_radius must be finite and > 0, got {}",
                self.smoothing_radius
            )));
        }
        if ![self.stiffness, self.rest_density, self.viscosity]
            .iter()
            .all(|v| v.is_finite())
        {
            error!("rejecting fluid config with non-finite coefficients");
            return Err(Error::InvalidParam(
                "stiffness, rest_density and viscosity must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Density and pressure of one particle for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DensitySample {
    pub density: f32,
    pub pressure: f32,
}

/// Computes fluid densities and forces from a validated [`FluidConfig`].
///
/// All methods are pure with respect to the particle slice except
/// [`FluidSolver::refresh`], which writes the density cache.
#[derive(Debug, Clone)]
pub struct FluidSolver {
    config: FluidConfig,
}

impl FluidSolver {
    pub fn new(config: FluidConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    /// Linear falloff kernel: 1 at distance 0, 0 at the smoothing radius.
    #[inline]
    fn kernel(&self, dist: f32) -> f32 {
        1.0 - dist / self.config.smoothing_radius
    }

    fn build_grid(&self, particles: &[FluidParticle]) -> (Vec<Vec2>, SpatialGrid) {
        let positions: Vec<Vec2> = particles.iter().map(|p| p.position).collect();
        let mut grid = SpatialGrid::with_cell_size(self.config.smoothing_radius);
        grid.rebuild(&positions);
        (positions, grid)
    }

    fn densities_in(&self, particles: &[FluidParticle], positions: &[Vec2], grid: &SpatialGrid) -> Vec<DensitySample> {
        let h = self.config.smoothing_radius;
        (0..particles.len())
            .map(|i| {
                let density: f32 = grid
                    .neighbors_within(positions, i, h)
                    .map(|(j, dist)| particles[j].mass * self.kernel(dist))
                    .sum();
                DensitySample {
                    density,
                    pressure: self.config.stiffness * (density - self.config.rest_density),
                }
            })
            .collect()
    }

    /// Density and pressure per particle, parallel to `particles`.
    pub fn densities(&self, particles: &[FluidParticle]) -> Vec<DensitySample> {
        let (positions, grid) = self.build_grid(particles);
        self.densities_in(particles, &positions, &grid)
    }

    /// Write this frame's density and pressure into each particle.
    pub fn refresh(&self, particles: &mut [FluidParticle]) {
        let samples = self.densities(particles);
        for (p, s) in particles.iter_mut().zip(samples) {
            p.density = s.density;
            p.pressure = s.pressure;
        }
    }

    /// Net pressure + viscosity force on each particle, parallel to `particles`.
    ///
    /// The host decides how to integrate these (typically dividing by mass or
    /// density and adding to velocity).
    pub fn forces(&self, particles: &[FluidParticle]) -> Vec<Vec2> {
        let h = self.config.smoothing_radius;
        let (positions, grid) = self.build_grid(particles);
        let samples = self.densities_in(particles, &positions, &grid);

        (0..particles.len())
            .map(|i| {
                let pi = &particles[i];
                let si = samples[i];
                if si.density <= 0.0 {
                    return Vec2::zeros();
                }

                let mut force = Vec2::zeros();
                for (j, dist) in grid.neighbors_within(&positions, i, h) {
                    let pj = &particles[j];
                    let sj = samples[j];
                    if sj.density <= 0.0 {
                        continue;
                    }

                    // Shared pair weight: symmetric in (i, j)
                    let weight = self.kernel(dist) * pi.mass * pj.mass / (si.density * sj.density);

                    // Coincident particles have no direction to push along
                    if let Some(away) = direction_between(&pj.position, &pi.position) {
                        let shared_pressure = 0.5 * (si.pressure + sj.pressure);
                        force += away * (shared_pressure * weight);
                    }

                    force += (pj.velocity - pi.velocity) * (self.config.viscosity * weight);
                }
                force
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use alloc::vec;

    const EPSILON: f32 = 1e-4;

    fn approx_vec_eq(a: &Vec2, b: &Vec2) -> bool {
        (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
    }

    fn solver(stiffness: f32, rest_density: f32, viscosity: f32) -> FluidSolver {
        FluidSolver::new(FluidConfig {
            smoothing_radius: 10.0,
            stiffness,
            rest_density,
            viscosity,
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FluidConfig {
            smoothing_radius: 0.0,
            ..FluidConfig::default()
        };
        assert!(FluidSolver::new(config).is_err());

        let config = FluidConfig {
            stiffness: f32::NAN,
            ..FluidConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_density_linear_kernel() {
        let s = solver(1.0, 0.0, 0.0);
        let particles = [
            FluidParticle::new(Vec2::new(0.0, 0.0), 2.0),
            FluidParticle::new(Vec2::new(5.0, 0.0), 1.0),
        ];
        let d = s.densities(&particles);
        // Particle 0 sees mass 1 at half the radius: 1 * 0.5
        assert!((d[0].density - 0.5).abs() < EPSILON);
        // Particle 1 sees mass 2 at half the radius: 2 * 0.5
        assert!((d[1].density - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_pressure_can_be_negative() {
        let s = solver(10.0, 2.0, 0.0);
        let particles = [
            FluidParticle::new(Vec2::new(0.0, 0.0), 1.0),
            FluidParticle::new(Vec2::new(5.0, 0.0), 1.0),
        ];
        let d = s.densities(&particles);
        // density 0.5, rest 2.0 -> pressure 10 * (0.5 - 2.0)
        assert!((d[0].pressure + 15.0).abs() < EPSILON);
    }

    #[test]
    fn test_isolated_particle_gets_zero_force() {
        let s = solver(100.0, 1.0, 0.5);
        let particles = [
            FluidParticle::new(Vec2::new(0.0, 0.0), 1.0),
            FluidParticle::new(Vec2::new(100.0, 0.0), 1.0).with_velocity(Vec2::new(3.0, 0.0)),
        ];
        let forces = s.forces(&particles);
        assert_eq!(forces[0], Vec2::zeros());
        assert_eq!(forces[1], Vec2::zeros());
        assert_eq!(s.densities(&particles)[0].density, 0.0);
    }

    #[test]
    fn test_pair_forces_equal_and_opposite() {
        let s = solver(50.0, 0.1, 0.3);
        let particles = [
            FluidParticle::new(Vec2::new(1.0, 2.0), 1.0).with_velocity(Vec2::new(1.0, 0.0)),
            FluidParticle::new(Vec2::new(4.0, 6.0), 3.0).with_velocity(Vec2::new(-2.0, 1.0)),
        ];
        let forces = s.forces(&particles);
        assert!(forces[0].norm() > 0.0);
        assert!(approx_vec_eq(&(forces[0] + forces[1]), &Vec2::zeros()));
    }

    #[test]
    fn test_compressed_pair_pushes_apart() {
        let s = solver(50.0, 0.0, 0.0);
        let particles = [
            FluidParticle::new(Vec2::new(0.0, 0.0), 1.0),
            FluidParticle::new(Vec2::new(2.0, 0.0), 1.0),
        ];
        let forces = s.forces(&particles);
        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
    }

    #[test]
    fn test_viscosity_drags_toward_neighbor_velocity() {
        let s = solver(0.0, 0.0, 1.0);
        let particles = [
            FluidParticle::new(Vec2::new(0.0, 0.0), 1.0),
            FluidParticle::new(Vec2::new(0.0, 5.0), 1.0).with_velocity(Vec2::new(4.0, 0.0)),
        ];
        let forces = s.forces(&particles);
        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
    }

    #[test]
    fn test_coincident_particles_stay_finite() {
        let s = solver(50.0, 0.0, 0.2);
        let particles = vec![
            FluidParticle::new(Vec2::new(3.0, 3.0), 1.0),
            FluidParticle::new(Vec2::new(3.0, 3.0), 1.0),
        ];
        let forces = s.forces(&particles);
        assert!(forces.iter().all(|f| f.x.is_finite() && f.y.is_finite()));
    }

    #[test]
    fn test_refresh_writes_cache() {
        let s = solver(2.0, 0.0, 0.0);
        let mut particles = [
            FluidParticle::new(Vec2::new(0.0, 0.0), 1.0),
            FluidParticle::new(Vec2::new(0.0, 5.0), 1.0),
        ];
        s.refresh(&mut particles);
        assert!((particles[0].density - 0.5).abs() < EPSILON);
        assert!((particles[0].pressure - 1.0).abs() < EPSILON);
    }
}
