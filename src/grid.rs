//! Uniform spatial hash grid for neighbor queries.
//!
//! Points are bucketed by `floor(position / cell_size)`. A query around a
//! point visits the 3x3 block of cells centered on the point's own cell, so
//! every point within `cell_size` of the query is guaranteed to be among the
//! candidates.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;
use log::error;

use crate::error::{Error, Result};
use crate::vector::Vec2;

// ComplexField provides floor() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Integer cell coordinates.
pub type CellKey = (i32, i32);

/// Buckets point indices by cell.
///
/// Buckets are kept in a `BTreeMap` so iteration order, and therefore the
/// order neighbors are visited in, is deterministic.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: BTreeMap<CellKey, Vec<usize>>,
}

impl SpatialGrid {
    /// Create an empty grid.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if `cell_size` is not finite and > 0.
    pub fn new(cell_size: f32) -> Result<Self> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            error!("rejecting grid with cell size {}", cell_size);
            return Err(Error::InvalidParam(format!(
                "cell_size must be finite and > 0, got {}",
                cell_size
            )));
        }
        Ok(Self::with_cell_size(cell_size))
    }

    /// Constructor for callers that already validated `cell_size`.
    pub(crate) fn with_cell_size(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: BTreeMap::new(),
        }
    }

    /// Build a grid over `positions`; point `i` is stored under index `i`.
    pub fn from_positions(cell_size: f32, positions: &[Vec2]) -> Result<Self> {
        let mut grid = Self::new(cell_size)?;
        grid.rebuild(positions);
        Ok(grid)
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of occupied cells.
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Cell containing `position`.
    #[inline]
    pub fn cell_of(&self, position: &Vec2) -> CellKey {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// Replace the contents of the grid with `positions`.
    pub fn rebuild(&mut self, positions: &[Vec2]) {
        self.cells.clear();
        for (i, p) in positions.iter().enumerate() {
            let key = self.cell_of(p);
            self.cells.entry(key).or_default().push(i);
        }
    }

    /// Indices stored in the 3x3 block of cells around `position`.
    ///
    /// Candidates are not distance filtered.
    pub fn candidates(&self, position: &Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(position);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(move |key| self.cells.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Indices `j != i` with `|positions[j] - positions[i]| < radius`, paired
    /// with that distance.
    ///
    /// `positions` must be the slice the grid was built from. Only complete
    /// when `radius <= cell_size`.
    pub fn neighbors_within<'a>(
        &'a self,
        positions: &'a [Vec2],
        i: usize,
        radius: f32,
    ) -> impl Iterator<Item = (usize, f32)> + 'a {
        let origin = positions[i];
        self.candidates(&origin).filter_map(move |j| {
            if j == i {
                return None;
            }
            let dist = (positions[j] - origin).norm();
            (dist < radius).then_some((j, dist))
        })
    }
}
