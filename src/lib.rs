//! 2D impulse-based physics toolkit for games and simulations.
//!
//! - [`body::RigidBody`]: circle with linear/angular state, explicit Euler `update`.
//! - [`collision`]: impulse response between bodies, overlap separation or
//!   repulsion, bouncing off static planes.
//! - [`fluid::FluidSolver`]: SPH-like density/pressure/viscosity forces.
//! - [`boids::Flock`]: separation/alignment/cohesion flocking forces.
//! - [`world::PhysicsWorld`]: fixed-capacity container running the tick.
//!
//! The crate is `no_std` and needs `alloc` for the many-body force fields.

#![no_std]

extern crate alloc;

pub mod body;
pub mod boids;
pub mod collision;
pub mod error;
pub mod fluid;
pub mod force;
pub mod grid;
pub mod vector;
pub mod world;

pub use body::{BodyConfig, RigidBody};
pub use boids::{Boid, Flock, FlockConfig};
pub use collision::{collide, collide_with_surface, Contact, OverlapMode};
pub use error::{Error, Result};
pub use fluid::{FluidConfig, FluidParticle, FluidSolver};
pub use grid::SpatialGrid;
pub use vector::Vec2;
pub use world::{BodyId, PhysicsWorld, Surface};
