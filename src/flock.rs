/*
 * Flock Module
 *
 * This module defines the Flock: the owner of the boid arena, the spatial
 * grid and the parameters. It is the surface a front-end talks to: build a
 * flock, tick it, read the boids for drawing, tweak parameters between ticks
 * and reset it.
 *
 * Boids live in a slot map and are addressed by stable handles; the grid only
 * stores those handles. A separate order vector fixes the iteration order
 * that rendering sees.
 */

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, info, trace};

use crate::boid::{Boid, BoidId};
use crate::error::GridError;
use crate::params::FlockParams;
use crate::physics;
use crate::spatial_grid::{Neighbors, SpatialHashGrid};

/// Everything needed to build a flock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub agent_count: usize,
    pub type_count: usize,
    pub world_size: Vec2,
    /// Fixed seed for reproducible flocks; drawn from the OS when absent.
    pub seed: Option<u64>,
    pub params: FlockParams,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            agent_count: 100,
            type_count: 3,
            world_size: Vec2::new(1000.0, 1000.0),
            seed: None,
            params: FlockParams::default(),
        }
    }
}

pub struct Flock {
    boids: SlotMap<BoidId, Boid>,
    order: Vec<BoidId>,
    grid: SpatialHashGrid,
    params: FlockParams,
    world_size: Vec2,
    type_count: usize,
    rng: StdRng,
    ticks: u64,
}

impl Flock {
    pub fn new(config: FlockConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut flock = Self::with_rng(config.world_size, config.params, rng);
        flock.reset(config.agent_count, config.type_count);
        flock
    }

    /// A flock without boids, to be populated with [`Flock::spawn`].
    pub fn empty(world_size: Vec2, params: FlockParams) -> Self {
        Self::with_rng(world_size, params, StdRng::from_entropy())
    }

    fn with_rng(world_size: Vec2, params: FlockParams, rng: StdRng) -> Self {
        Self {
            boids: SlotMap::with_key(),
            order: Vec::new(),
            grid: SpatialHashGrid::from_params(&params),
            params,
            world_size,
            type_count: 1,
            rng,
            ticks: 0,
        }
    }

    /// Add one boid and index it at its position.
    pub fn spawn(&mut self, position: Vec2, velocity: Vec2, kind: usize) -> BoidId {
        let id = self.boids.insert(Boid::new(position, velocity, kind));
        if let Some(boid) = self.boids.get_mut(id) {
            self.grid.place(id, boid, position);
        }
        self.order.push(id);
        id
    }

    // Delete every boid from the grid, then regenerate the whole flock
    pub fn reset(&mut self, agent_count: usize, type_count: usize) {
        for id in self.order.drain(..) {
            if let Some(boid) = self.boids.get_mut(id) {
                self.grid.delete(id, boid);
            }
        }
        self.boids.clear();
        self.ticks = 0;

        // Kinds are drawn from [0, type_count); zero types would leave nothing to draw from
        self.type_count = type_count.max(1);

        // Pick up a cell size changed since the last tick
        if self.grid.cell_size() != self.params.cell_size {
            self.grid.rebuild(self.params.cell_size, &mut self.boids);
        }

        self.order.reserve(agent_count);
        for _ in 0..agent_count {
            let (position, velocity, kind) = self.random_state();
            self.spawn(position, velocity, kind);
        }

        info!(agents = agent_count, types = self.type_count, "flock reset");
    }

    fn random_state(&mut self) -> (Vec2, Vec2, usize) {
        let speed = self.params.max_speed;

        let position = Vec2::new(
            sample(&mut self.rng, 0.0, self.world_size.x),
            sample(&mut self.rng, 0.0, self.world_size.y),
        );
        let velocity = Vec2::new(
            sample(&mut self.rng, -speed, speed),
            sample(&mut self.rng, -speed, speed),
        );
        let kind = self.rng.gen_range(0..self.type_count);

        (position, velocity, kind)
    }

    // Advance the simulation by one step
    pub fn tick(&mut self) {
        self.sync_grid();

        physics::update_flock(
            &self.order,
            &mut self.boids,
            &mut self.grid,
            &self.params,
            self.world_size,
        );

        self.ticks += 1;
        trace!(tick = self.ticks, boids = self.order.len(), cells = self.grid.occupied_cells(), "tick");
    }

    // Bring the grid in line with parameters changed since the last tick
    fn sync_grid(&mut self) {
        self.grid
            .set_perception(self.params.perception_radius, self.params.field_of_view);

        if self.grid.cell_size() != self.params.cell_size {
            debug!(
                from = self.grid.cell_size(),
                to = self.params.cell_size,
                "cell size changed, rebuilding grid"
            );
            self.grid.rebuild(self.params.cell_size, &mut self.boids);
        }
    }

    /// Boids in their stable iteration order.
    pub fn agents(&self) -> impl ExactSizeIterator<Item = &Boid> + '_ {
        self.order.iter().map(move |id| &self.boids[*id])
    }

    pub fn ids(&self) -> &[BoidId] {
        &self.order
    }

    pub fn get(&self, id: BoidId) -> Option<&Boid> {
        self.boids.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Neighbors of one boid under the current parameters.
    pub fn neighbors(&self, id: BoidId) -> Neighbors {
        self.grid
            .query_with(id, &self.boids, self.params.perception_radius, self.params.field_of_view)
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    /// Parameters take effect on the next tick.
    pub fn params_mut(&mut self) -> &mut FlockParams {
        &mut self.params
    }

    pub fn world_size(&self) -> Vec2 {
        self.world_size
    }

    pub fn set_world_size(&mut self, world_size: Vec2) {
        self.world_size = world_size;
    }

    pub fn type_count(&self) -> usize {
        self.type_count
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    /// Check that the grid agrees with every boid's position.
    pub fn verify_index(&self) -> Result<(), GridError> {
        self.grid.verify(&self.boids)?;

        for &id in &self.order {
            if self.boids.get(id).and_then(Boid::cell).is_none() {
                return Err(GridError::NotIndexed { id });
            }
        }

        Ok(())
    }
}

// Uniform sample in [low, high), collapsing to zero for empty or non-finite ranges
fn sample(rng: &mut StdRng, low: f32, high: f32) -> f32 {
    if low.is_finite() && high.is_finite() && (high - low).is_finite() && high > low {
        rng.gen_range(low..high)
    } else {
        0.0
    }
}
