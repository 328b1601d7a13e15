//! Fixed-capacity simulation world.
//!
//! Holds bodies and static surfaces in `heapless` collections and runs the
//! usual tick: integrate every body, resolve body pairs, then resolve bodies
//! against surfaces. Pairs are resolved sequentially in index order, so when a
//! body overlaps several others the outcome depends on that order.
//!
//! # Example
//! ```
//! use physics2d::body::{BodyConfig, RigidBody};
//! use physics2d::world::PhysicsWorld;
//! use physics2d::vector::Vec2;
//!
//! let mut world = PhysicsWorld::<8, 2>::new();
//! world.add_surface(Vec2::new(0.0, 500.0), Vec2::new(0.0, -1.0)).unwrap();
//!
//! let config = BodyConfig {
//!     gravity: Vec2::new(0.0, 980.0),
//!     radius: 5.0,
//!     ..BodyConfig::default()
//! };
//! let id = world.add_body(RigidBody::new(Vec2::new(50.0, 0.0), config).unwrap()).unwrap();
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!(world.body(id).unwrap().position.y <= 495.0 + 1e-3);
//! ```

use log::{error, trace};

use crate::body::RigidBody;
use crate::error::{Error, Result};
use crate::vector::{Vec2, NORMALIZE_EPSILON};

/// Handle to a body within a [`PhysicsWorld`].
///
/// Slots are reused after [`PhysicsWorld::remove_body`]; the generation makes
/// a handle to a removed body stay dead even after its slot is refilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyId {
    index: usize,
    generation: u32,
}

impl BodyId {
    /// Slot index of this body.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A static infinite plane bodies bounce off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub point: Vec2,
    /// Unit normal pointing to the free side of the plane.
    pub normal: Vec2,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    body: Option<RigidBody>,
}

/// The physics simulation world.
///
/// # Type Parameters
/// * `N` - Maximum number of bodies alive at once.
/// * `S` - Maximum number of surfaces.
pub struct PhysicsWorld<const N: usize, const S: usize = 4> {
    slots: heapless::Vec<Slot, N>,
    surfaces: heapless::Vec<Surface, S>,
}

impl<const N: usize, const S: usize> Default for PhysicsWorld<N, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, const S: usize> PhysicsWorld<N, S> {
    /// Create an empty world.
    pub fn new() -> Self {
        Self {
            slots: heapless::Vec::new(),
            surfaces: heapless::Vec::new(),
        }
    }

    /// Add a body, reusing the first free slot.
    ///
    /// Returns `Error::CapacityExceeded` when `N` bodies are alive.
    pub fn add_body(&mut self, body: RigidBody) -> Result<BodyId> {
        if let Some(index) = self.slots.iter().position(|s| s.body.is_none()) {
            let slot = &mut self.slots[index];
            slot.body = Some(body);
            return Ok(BodyId {
                index,
                generation: slot.generation,
            });
        }

        let index = self.slots.len();
        self.slots
            .push(Slot {
                generation: 0,
                body: Some(body),
            })
            .map_err(|_| Error::CapacityExceeded(N))?;
        Ok(BodyId { index, generation: 0 })
    }

    /// Add a plane through `point`. `normal` is normalized here.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `point` or `normal` is not finite or `normal` is zero.
    /// - `Error::CapacityExceeded` when `S` surfaces exist.
    pub fn add_surface(&mut self, point: Vec2, normal: Vec2) -> Result<()> {
        let len = normal.norm();
        if !len.is_finite() || len <= NORMALIZE_EPSILON || !point.iter().all(|c| c.is_finite()) {
            error!("rejecting surface with normal ({}, {})", normal.x, normal.y);
            return Err(Error::InvalidParam(
                "surface point must be finite and normal non-zero".into(),
            ));
        }
        self.surfaces
            .push(Surface {
                point,
                normal: normal / len,
            })
            .map_err(|_| Error::CapacityExceeded(S))
    }

    fn slot(&self, id: BodyId) -> Option<&Slot> {
        self.slots.get(id.index).filter(|s| s.generation == id.generation)
    }

    fn slot_mut(&mut self, id: BodyId) -> Option<&mut Slot> {
        self.slots.get_mut(id.index).filter(|s| s.generation == id.generation)
    }

    /// Get a body by ID. `None` if it was removed.
    pub fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.slot(id).and_then(|s| s.body.as_ref())
    }

    /// Get a mutable body by ID. `None` if it was removed.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.slot_mut(id).and_then(|s| s.body.as_mut())
    }

    /// Take a body out of the world, e.g. when it leaves the screen.
    ///
    /// Other IDs stay valid and the slot is free for the next `add_body`.
    /// Returns the removed body.
    pub fn remove_body(&mut self, id: BodyId) -> Option<RigidBody> {
        let slot = self.slot_mut(id)?;
        let body = slot.body.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        Some(body)
    }

    /// Number of bodies currently in the world.
    pub fn body_count(&self) -> usize {
        self.slots.iter().filter(|s| s.body.is_some()).count()
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Iterate over the bodies still in the world.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &RigidBody)> {
        self.slots.iter().enumerate().filter_map(|(index, s)| {
            let id = BodyId {
                index,
                generation: s.generation,
            };
            s.body.as_ref().map(|b| (id, b))
        })
    }

    /// Iterate mutably over the bodies still in the world.
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = (BodyId, &mut RigidBody)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, s)| {
            let id = BodyId {
                index,
                generation: s.generation,
            };
            s.body.as_mut().map(|b| (id, b))
        })
    }

    /// Advance the world by `dt` seconds and return the number of contacts resolved.
    pub fn step(&mut self, dt: f32) -> usize {
        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            body.update(dt);
        }

        let mut contacts = 0;
        let len = self.slots.len();
        for i in 0..len {
            for j in (i + 1)..len {
                let (head, tail) = self.slots.split_at_mut(j);
                if let (Some(a), Some(b)) = (head[i].body.as_mut(), tail[0].body.as_mut()) {
                    if a.collide_with_body(b) {
                        contacts += 1;
                    }
                }
            }
        }

        for body in self.slots.iter_mut().filter_map(|s| s.body.as_mut()) {
            for surface in self.surfaces.iter() {
                if body.collide_with_surface(&surface.point, &surface.normal) {
                    contacts += 1;
                }
            }
        }

        trace!("stepped {} bodies by {}s, {} contacts", self.body_count(), dt, contacts);
        contacts
    }

    /// Advance by `dt` split into `substeps` equal steps. Returns total contacts.
    pub fn step_fixed(&mut self, dt: f32, substeps: u32) -> usize {
        if substeps == 0 {
            return 0;
        }
        let sub_dt = dt / substeps as f32;
        (0..substeps).map(|_| self.step(sub_dt)).sum()
    }
}
