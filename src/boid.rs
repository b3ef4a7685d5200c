/*
 * Boid Module
 *
 * This module defines the Boid struct and the local steering rules.
 * Each boid reacts only to the neighbors the spatial grid hands it:
 * 1. Separation: Keep distance from every neighbor, more so from other kinds
 * 2. Alignment: Steer towards the average heading of neighbors of the same kind
 * 3. Cohesion: Steer towards the average position of neighbors of the same kind
 *
 * The rules return velocity deltas and never touch other boids, so they can be
 * evaluated against a snapshot of the previous tick from any thread.
 */

use glam::Vec2;
use slotmap::new_key_type;

use crate::params::FlockParams;
use crate::spatial_grid::CellKey;

new_key_type! {
    /// Stable handle for a boid in the flock's arena.
    pub struct BoidId;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boid {
    pub position: Vec2,
    pub velocity: Vec2,
    pub kind: usize,
    // Written only by the spatial grid
    pub(crate) cell: Option<CellKey>,
}

impl Boid {
    pub fn new(position: Vec2, velocity: Vec2, kind: usize) -> Self {
        Self {
            position,
            velocity,
            kind,
            cell: None,
        }
    }

    /// Cell recorded at the last insert or move, `None` while not indexed.
    pub fn cell(&self) -> Option<CellKey> {
        self.cell
    }

    // Calculate the separation delta (avoid crowding neighbors of any kind)
    pub fn separation(&self, neighbors: &[&Boid], params: &FlockParams) -> Vec2 {
        let mut avoid = Vec2::ZERO;

        for other in neighbors {
            let d = self.position.distance(other.position);
            let kind_distance = self.kind.abs_diff(other.kind);

            if kind_distance == 0 {
                if d <= params.avoid_distance {
                    avoid += self.position - other.position;
                }
            } else {
                // Other kinds are avoided harder and from further away
                let multiplier = kind_distance.min(1) as f32 * params.other_type_avoid_multiplier + 1.0;

                if d <= params.other_type_avoid_distance {
                    avoid += (self.position - other.position) * multiplier;
                }
            }
        }

        avoid * params.separation_factor
    }

    // Calculate the alignment delta (steer towards average heading of neighbors)
    pub fn alignment(&self, neighbors: &[&Boid], factor: f32) -> Vec2 {
        if neighbors.is_empty() {
            return Vec2::ZERO;
        }

        let mut average = Vec2::ZERO;
        for other in neighbors {
            average += other.velocity;
        }
        average /= neighbors.len() as f32;

        (average - self.velocity) * factor
    }

    // Calculate the cohesion delta (steer towards average position of neighbors)
    pub fn cohesion(&self, neighbors: &[&Boid], factor: f32) -> Vec2 {
        if neighbors.is_empty() {
            return Vec2::ZERO;
        }

        let mut center = Vec2::ZERO;
        for other in neighbors {
            center += other.position;
        }
        center /= neighbors.len() as f32;

        (center - self.position) * factor
    }

    // Scale the velocity down to max_speed, keeping its direction
    pub fn limit_speed(&mut self, max_speed: f32) {
        // A negative limit stops the boid like a zero one
        let max_speed = max_speed.max(0.0);
        let speed = self.velocity.length();

        if speed > max_speed {
            self.velocity = self.velocity / speed * max_speed;
        }
    }
}
