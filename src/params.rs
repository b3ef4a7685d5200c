/*
 * Flock Parameters Module
 *
 * This module defines the FlockParams struct that contains all the tunable
 * knobs of the simulation, and the boundary policy applied at the world edge.
 * The parameters are read by the update algorithm once per tick and can be
 * changed freely between ticks (e.g. from the viewer's sliders). Nothing here
 * is validated: out-of-range values simply make the simulation inert.
 */

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What happens to a boid at the edge of the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Teleport to the opposite edge once past a bound.
    #[default]
    Loop,
    /// Nudge the velocity by `factor` while within `margin` of an edge.
    Turn { margin: f32, factor: f32 },
}

impl BoundaryPolicy {
    // Apply the policy to a boid's position and velocity inside a world of the given size
    pub fn apply(&self, position: &mut Vec2, velocity: &mut Vec2, world_size: Vec2) {
        match *self {
            BoundaryPolicy::Loop => {
                if position.x > world_size.x {
                    position.x = 0.0;
                } else if position.x < 0.0 {
                    position.x = world_size.x;
                }

                if position.y > world_size.y {
                    position.y = 0.0;
                } else if position.y < 0.0 {
                    position.y = world_size.y;
                }
            }
            BoundaryPolicy::Turn { margin, factor } => {
                if position.x < margin {
                    velocity.x += factor;
                }
                if position.x > world_size.x - margin {
                    velocity.x -= factor;
                }

                if position.y < margin {
                    velocity.y += factor;
                }
                if position.y > world_size.y - margin {
                    velocity.y -= factor;
                }
            }
        }
    }
}

// Parameters for the simulation that can be adjusted via UI
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    pub cell_size: f32,
    /// Half-width of the neighbor window, in cells.
    pub perception_radius: i32,
    /// Full viewing angle in degrees.
    pub field_of_view: f32,
    pub max_speed: f32,
    pub avoid_distance: f32,
    pub other_type_avoid_distance: f32,
    pub other_type_avoid_multiplier: f32,
    pub alignment_factor: f32,
    pub cohesion_factor: f32,
    pub separation_factor: f32,
    pub boundary: BoundaryPolicy,
    // Run the compute phase on the rayon pool
    pub parallel: bool,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            cell_size: 100.0,
            perception_radius: 2,
            field_of_view: 270.0,
            max_speed: 1.0,
            avoid_distance: 20.0,
            other_type_avoid_distance: 40.0,
            other_type_avoid_multiplier: 1.1,
            alignment_factor: 0.1,
            cohesion_factor: 0.1,
            separation_factor: 0.1,
            boundary: BoundaryPolicy::Loop,
            parallel: false,
        }
    }
}

impl FlockParams {
    // Get parameter ranges for UI sliders
    pub fn get_factor_range() -> std::ops::RangeInclusive<f32> {
        0.0..=1.0
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        0.1..=20.0
    }

    pub fn get_distance_range() -> std::ops::RangeInclusive<f32> {
        0.0..=200.0
    }

    pub fn get_multiplier_range() -> std::ops::RangeInclusive<f32> {
        0.0..=5.0
    }

    pub fn get_perception_range() -> std::ops::RangeInclusive<i32> {
        1..=6
    }

    pub fn get_field_of_view_range() -> std::ops::RangeInclusive<f32> {
        0.0..=360.0
    }

    pub fn get_cell_size_range() -> std::ops::RangeInclusive<f32> {
        10.0..=500.0
    }

    pub fn get_turn_margin_range() -> std::ops::RangeInclusive<f32> {
        0.0..=300.0
    }

    pub fn get_turn_factor_range() -> std::ops::RangeInclusive<f32> {
        0.0..=5.0
    }

    pub fn get_num_boids_range() -> std::ops::RangeInclusive<usize> {
        0..=5000
    }

    pub fn get_num_types_range() -> std::ops::RangeInclusive<usize> {
        1..=8
    }
}
