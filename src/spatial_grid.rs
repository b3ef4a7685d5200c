/*
 * Spatial Grid Module
 *
 * This module defines the SpatialHashGrid struct for efficient neighbor lookups.
 * It divides the plane into square cells keyed by their integer coordinates and
 * keeps, per cell, the handles of the boids currently inside it. Every boid
 * caches the key of its own cell, so relocating or removing it never scans the
 * grid.
 *
 * Neighbor queries visit a fixed window of cells around the querying boid, so
 * their cost depends on the perception window and local density, not on the
 * total number of boids. Candidates are then filtered by the boid's field of
 * view.
 *
 * The grid is unbounded: cells are created on first insert and dropped when
 * their last boid leaves, so lookups outside the populated area just find
 * nothing.
 */

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::boid::{Boid, BoidId};
use crate::error::GridError;
use crate::params::FlockParams;

/// Integer coordinates of a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey(pub i32, pub i32);

/// Result of a neighbor query, split by kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Neighbors {
    /// Every visible neighbor, used for separation.
    pub all: Vec<BoidId>,
    /// The visible neighbors sharing the querying boid's kind, used for alignment and cohesion.
    pub same_kind: Vec<BoidId>,
}

pub struct SpatialHashGrid {
    cell_size: f32,
    perception_radius: i32,
    field_of_view: f32,
    cells: HashMap<CellKey, Vec<BoidId>>,
    len: usize,
}

impl SpatialHashGrid {
    pub fn new(cell_size: f32, perception_radius: i32, field_of_view: f32) -> Self {
        Self {
            cell_size,
            perception_radius,
            field_of_view,
            cells: HashMap::new(),
            len: 0,
        }
    }

    pub fn from_params(params: &FlockParams) -> Self {
        Self::new(params.cell_size, params.perception_radius, params.field_of_view)
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn perception_radius(&self) -> i32 {
        self.perception_radius
    }

    pub fn field_of_view(&self) -> f32 {
        self.field_of_view
    }

    // Update the query settings; membership is unaffected
    pub fn set_perception(&mut self, perception_radius: i32, field_of_view: f32) {
        self.perception_radius = perception_radius;
        self.field_of_view = field_of_view;
    }

    /// Number of indexed boids.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    // Convert plane coordinates to the key of the containing cell
    #[inline]
    pub fn hash(&self, point: Vec2) -> CellKey {
        CellKey(
            (point.x / self.cell_size).floor() as i32,
            (point.y / self.cell_size).floor() as i32,
        )
    }

    /// Insert a boid at `point`, recording the cell on the boid.
    ///
    /// A boid that is already indexed must be deleted first; inserting it again
    /// is rejected and leaves the grid untouched.
    pub fn insert(&mut self, id: BoidId, boid: &mut Boid, point: Vec2) -> Result<(), GridError> {
        if let Some(cell) = boid.cell {
            return Err(GridError::AlreadyIndexed { id, cell });
        }

        self.place(id, boid, point);
        Ok(())
    }

    // Insert a boid known to be unindexed
    pub(crate) fn place(&mut self, id: BoidId, boid: &mut Boid, point: Vec2) {
        debug_assert!(boid.cell.is_none());

        let key = self.hash(point);
        let cell = self.cells.entry(key).or_default();
        debug_assert!(!cell.contains(&id), "boid {id:?} already listed in {key:?}");

        cell.push(id);
        boid.cell = Some(key);
        self.len += 1;
    }

    /// Remove a boid from its recorded cell. Deleting a boid that is not
    /// indexed does nothing.
    pub fn delete(&mut self, id: BoidId, boid: &mut Boid) {
        let Some(key) = boid.cell.take() else {
            return;
        };

        if let Some(cell) = self.cells.get_mut(&key) {
            if let Some(slot) = cell.iter().position(|&other| other == id) {
                cell.swap_remove(slot);
                self.len -= 1;
            }
            if cell.is_empty() {
                self.cells.remove(&key);
            }
        }
    }

    // Relocate a boid after its position changed
    pub fn move_boid(&mut self, id: BoidId, boid: &mut Boid, point: Vec2) {
        self.delete(id, boid);
        self.place(id, boid, point);
    }

    // Re-hash every indexed boid under a new cell size
    pub fn rebuild(&mut self, cell_size: f32, boids: &mut SlotMap<BoidId, Boid>) {
        self.cell_size = cell_size;
        self.cells.clear();
        self.len = 0;

        for (id, boid) in boids.iter_mut() {
            if boid.cell.take().is_some() {
                let position = boid.position;
                self.place(id, boid, position);
            }
        }
    }

    /// Handles stored in one cell.
    pub fn boids_in(&self, key: CellKey) -> &[BoidId] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (CellKey, &[BoidId])> + '_ {
        self.cells.iter().map(|(key, ids)| (*key, ids.as_slice()))
    }

    // Find the cell holding a handle by scanning the whole grid (diagnostics only)
    pub fn cell_of(&self, id: BoidId) -> Option<CellKey> {
        self.cells
            .iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(key, _)| *key)
    }

    /// Keys of the perception window around `center`: offsets
    /// `1 - radius ..= radius - 1` on both axes.
    pub fn window(center: CellKey, perception_radius: i32) -> impl Iterator<Item = CellKey> {
        let offsets = 1i32.saturating_sub(perception_radius)..perception_radius;

        offsets.clone().flat_map(move |dx| {
            offsets.clone().filter_map(move |dy| {
                Some(CellKey(
                    center.0.checked_add(dx)?,
                    center.1.checked_add(dy)?,
                ))
            })
        })
    }

    // Neighbors of a boid using the grid's own perception settings
    pub fn query(&self, id: BoidId, boids: &SlotMap<BoidId, Boid>) -> Neighbors {
        self.query_with(id, boids, self.perception_radius, self.field_of_view)
    }

    /// Collect the boids in the perception window that the boid can see.
    ///
    /// The querying boid never appears in its own result. A boid that is not
    /// indexed queries around the cell its position hashes to.
    pub fn query_with(
        &self,
        id: BoidId,
        boids: &SlotMap<BoidId, Boid>,
        perception_radius: i32,
        field_of_view: f32,
    ) -> Neighbors {
        let mut neighbors = Neighbors::default();

        let Some(boid) = boids.get(id) else {
            return neighbors;
        };

        let center = boid.cell.unwrap_or_else(|| self.hash(boid.position));
        let half_view = field_of_view / 2.0;

        for key in Self::window(center, perception_radius) {
            for &other_id in self.boids_in(key) {
                if other_id == id {
                    continue;
                }
                let Some(other) = boids.get(other_id) else {
                    continue;
                };

                if in_field_of_view(boid.position, boid.velocity, other.position, half_view) {
                    neighbors.all.push(other_id);
                    if other.kind == boid.kind {
                        neighbors.same_kind.push(other_id);
                    }
                }
            }
        }

        neighbors
    }

    /// Check the index against the boids it refers to.
    ///
    /// Every listed handle must be unique and point back at its cell, and every
    /// boid with a recorded cell must be listed in the cell its position hashes to.
    pub fn verify(&self, boids: &SlotMap<BoidId, Boid>) -> Result<(), GridError> {
        let mut listed = HashSet::with_capacity(self.len);

        for (key, ids) in self.iter_cells() {
            for &id in ids {
                if !listed.insert(id) {
                    return Err(GridError::Duplicated { id });
                }
                match boids.get(id) {
                    Some(boid) if boid.cell == Some(key) => {}
                    _ => return Err(GridError::Orphaned { id, cell: key }),
                }
            }
        }

        for (id, boid) in boids.iter() {
            let Some(recorded) = boid.cell else {
                continue;
            };

            let expected = self.hash(boid.position);
            if recorded != expected {
                return Err(GridError::Desynchronized { id, recorded, expected });
            }
            if !listed.contains(&id) {
                return Err(GridError::NotIndexed { id });
            }
        }

        Ok(())
    }
}

/// Field-of-view test on the triangle formed by the boid's position `P`, the
/// look-ahead point `D = P + velocity` and the candidate `O`.
///
/// The angle at `P` follows from the law of cosines. A stationary boid, or a
/// candidate sitting exactly on the boid, is always visible, and so is
/// everything once the view spans the full circle.
pub fn in_field_of_view(position: Vec2, velocity: Vec2, other: Vec2, half_view_degrees: f32) -> bool {
    let look_ahead = position + velocity;

    let a = position.distance(look_ahead);
    let b = position.distance(other);
    let c = look_ahead.distance(other);

    if a == 0.0 || b == 0.0 || half_view_degrees >= 180.0 {
        return true;
    }

    // Rounding can push the cosine just past -1 for a candidate straight
    // behind. Clamping reads that as 180 degrees (hidden for any view under
    // the full circle) rather than as an undefined angle, which would count
    // as visible.
    let cosine = ((c * c - a * a - b * b) / (-2.0 * a * b)).clamp(-1.0, 1.0);
    let angle = cosine.acos().to_degrees();

    angle.is_nan() || angle <= half_view_degrees
}
