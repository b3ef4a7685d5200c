/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure of the flocking library.
 * The simulation core (boids, spatial grid, parameters, physics and the flock
 * itself) has no GUI dependencies; the interactive viewer modules are only
 * compiled with the `viewer` feature.
 */

// Re-export key components for easier access
pub use boid::{Boid, BoidId};
pub use error::GridError;
pub use flock::{Flock, FlockConfig};
pub use params::{BoundaryPolicy, FlockParams};
pub use spatial_grid::{CellKey, Neighbors, SpatialHashGrid};

// Define modules
pub mod boid;
pub mod error;
pub mod flock;
pub mod params;
pub mod physics;
pub mod spatial_grid;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod debug;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;

// Constants
#[cfg(feature = "viewer")]
pub const BOID_SIZE: f32 = 5.0;
