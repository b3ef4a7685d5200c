/*
 * Physics Module
 *
 * This module advances the flock by one tick. The update runs in two passes
 * so that every boid reacts to the same snapshot of the previous tick:
 *
 * 1. Compute: for each boid, query the grid, apply separation, alignment and
 *    cohesion, the boundary policy and the speed limit, and work out the new
 *    position. Nothing is written, so this pass can run on the rayon pool.
 * 2. Commit: write every new position and velocity back and relocate the boid
 *    in the grid. The position and the grid move always happen together.
 */

use glam::Vec2;
use rayon::prelude::*;
use slotmap::SlotMap;

use crate::boid::{Boid, BoidId};
use crate::params::FlockParams;
use crate::spatial_grid::SpatialHashGrid;

/// New state of one boid, computed against the previous tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Steering {
    pub id: BoidId,
    pub position: Vec2,
    pub velocity: Vec2,
}

// Compute the next state of a single boid
pub fn steer(
    id: BoidId,
    boids: &SlotMap<BoidId, Boid>,
    grid: &SpatialHashGrid,
    params: &FlockParams,
    world_size: Vec2,
) -> Option<Steering> {
    let boid = boids.get(id)?;
    let neighbors = grid.query(id, boids);

    let all: Vec<&Boid> = neighbors.all.iter().filter_map(|&n| boids.get(n)).collect();
    let same_kind: Vec<&Boid> = neighbors.same_kind.iter().filter_map(|&n| boids.get(n)).collect();

    // Work on a copy; later rules see the velocity changed by earlier ones
    let mut next = boid.clone();
    next.velocity += next.separation(&all, params);
    next.velocity += next.alignment(&same_kind, params.alignment_factor);
    next.velocity += next.cohesion(&same_kind, params.cohesion_factor);

    params.boundary.apply(&mut next.position, &mut next.velocity, world_size);
    next.limit_speed(params.max_speed);

    Some(Steering {
        id,
        position: next.position + next.velocity,
        velocity: next.velocity,
    })
}

// First pass: compute the next state of every boid without writing anything
pub fn compute_steering(
    order: &[BoidId],
    boids: &SlotMap<BoidId, Boid>,
    grid: &SpatialHashGrid,
    params: &FlockParams,
    world_size: Vec2,
) -> Vec<Steering> {
    if params.parallel {
        order
            .par_iter()
            .filter_map(|&id| steer(id, boids, grid, params, world_size))
            .collect()
    } else {
        order
            .iter()
            .filter_map(|&id| steer(id, boids, grid, params, world_size))
            .collect()
    }
}

// Second pass: write the new states back and keep the grid in step
pub fn commit(steering: &[Steering], boids: &mut SlotMap<BoidId, Boid>, grid: &mut SpatialHashGrid) {
    for next in steering {
        if let Some(boid) = boids.get_mut(next.id) {
            boid.velocity = next.velocity;
            boid.position = next.position;
            grid.move_boid(next.id, boid, next.position);
        }
    }
}

// Update boid positions and behaviors for one tick
pub fn update_flock(
    order: &[BoidId],
    boids: &mut SlotMap<BoidId, Boid>,
    grid: &mut SpatialHashGrid,
    params: &FlockParams,
    world_size: Vec2,
) {
    let steering = compute_steering(order, boids, grid, params, world_size);
    commit(&steering, boids, grid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BoundaryPolicy;

    const WORLD: Vec2 = Vec2::new(1000.0, 1000.0);

    fn quiet_params() -> FlockParams {
        FlockParams {
            cell_size: 10.0,
            perception_radius: 2,
            field_of_view: 360.0,
            max_speed: 100.0,
            avoid_distance: 0.0,
            other_type_avoid_distance: 0.0,
            other_type_avoid_multiplier: 1.0,
            alignment_factor: 0.0,
            cohesion_factor: 0.0,
            separation_factor: 0.0,
            boundary: BoundaryPolicy::Loop,
            parallel: false,
        }
    }

    fn setup(boids: &[Boid], params: &FlockParams) -> (SlotMap<BoidId, Boid>, SpatialHashGrid, Vec<BoidId>) {
        let mut arena = SlotMap::with_key();
        let mut grid = SpatialHashGrid::from_params(params);
        let mut order = Vec::new();

        for boid in boids {
            let id = arena.insert(boid.clone());
            let position = boid.position;
            grid.insert(id, &mut arena[id], position).expect("fresh boid");
            order.push(id);
        }

        (arena, grid, order)
    }

    #[test]
    fn quiet_boids_just_drift() {
        let params = quiet_params();
        let (mut arena, mut grid, order) = setup(
            &[Boid::new(Vec2::new(500.0, 500.0), Vec2::new(2.0, -1.0), 0)],
            &params,
        );

        update_flock(&order, &mut arena, &mut grid, &params, WORLD);

        assert_eq!(arena[order[0]].position, Vec2::new(502.0, 499.0));
        assert_eq!(arena[order[0]].velocity, Vec2::new(2.0, -1.0));
        assert_eq!(grid.verify(&arena), Ok(()));
    }

    #[test]
    fn alignment_ignores_other_kinds() {
        let params = FlockParams {
            alignment_factor: 1.0,
            ..quiet_params()
        };
        let (arena, grid, order) = setup(
            &[
                Boid::new(Vec2::new(500.0, 500.0), Vec2::new(1.0, 0.0), 0),
                Boid::new(Vec2::new(502.0, 500.0), Vec2::new(0.0, 3.0), 1),
            ],
            &params,
        );

        let next = steer(order[0], &arena, &grid, &params, WORLD).expect("boid exists");

        assert_eq!(next.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn alignment_matches_a_single_same_kind_neighbor() {
        let params = FlockParams {
            alignment_factor: 1.0,
            ..quiet_params()
        };
        let (arena, grid, order) = setup(
            &[
                Boid::new(Vec2::new(500.0, 500.0), Vec2::new(1.0, 0.0), 0),
                Boid::new(Vec2::new(502.0, 500.0), Vec2::new(0.0, 3.0), 0),
            ],
            &params,
        );

        let next = steer(order[0], &arena, &grid, &params, WORLD).expect("boid exists");

        assert_eq!(next.velocity, Vec2::new(0.0, 3.0));
    }

    #[test]
    fn alignment_sees_the_velocity_after_separation() {
        let params = FlockParams {
            alignment_factor: 0.5,
            separation_factor: 1.0,
            avoid_distance: 5.0,
            ..quiet_params()
        };
        let (arena, grid, order) = setup(
            &[
                Boid::new(Vec2::new(500.0, 500.0), Vec2::ZERO, 0),
                Boid::new(Vec2::new(502.0, 500.0), Vec2::new(4.0, 0.0), 0),
            ],
            &params,
        );

        let next = steer(order[0], &arena, &grid, &params, WORLD).expect("boid exists");

        // separation gives (-2, 0); alignment then adds ((4, 0) - (-2, 0)) * 0.5
        assert_eq!(next.velocity, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn speed_limit_applies_after_the_boundary_nudge() {
        let params = FlockParams {
            max_speed: 1.0,
            boundary: BoundaryPolicy::Turn { margin: 100.0, factor: 3.0 },
            ..quiet_params()
        };
        let (arena, grid, order) = setup(&[Boid::new(Vec2::new(10.0, 500.0), Vec2::ZERO, 0)], &params);

        let next = steer(order[0], &arena, &grid, &params, WORLD).expect("boid exists");

        assert_eq!(next.velocity, Vec2::new(1.0, 0.0));
        assert_eq!(next.position, Vec2::new(11.0, 500.0));
    }

    #[test]
    fn loop_wraps_before_advancing() {
        let params = quiet_params();
        let (mut arena, mut grid, order) = setup(&[Boid::new(Vec2::new(-0.5, 500.0), Vec2::new(-1.0, 0.0), 0)], &params);

        update_flock(&order, &mut arena, &mut grid, &params, WORLD);

        assert_eq!(arena[order[0]].position, Vec2::new(999.0, 500.0));
        assert_eq!(grid.verify(&arena), Ok(()));
    }

    #[test]
    fn every_boid_reads_the_previous_tick() {
        let params = FlockParams {
            cohesion_factor: 1.0,
            max_speed: 1.0,
            ..quiet_params()
        };
        let boids = [
            Boid::new(Vec2::new(500.0, 500.0), Vec2::ZERO, 0),
            Boid::new(Vec2::new(505.0, 500.0), Vec2::ZERO, 0),
        ];

        let (mut forward, mut forward_grid, order) = setup(&boids, &params);
        update_flock(&order, &mut forward, &mut forward_grid, &params, WORLD);

        let (mut backward, mut backward_grid, order_rev) = setup(&boids, &params);
        let reversed: Vec<_> = order_rev.iter().rev().copied().collect();
        update_flock(&reversed, &mut backward, &mut backward_grid, &params, WORLD);

        // Symmetric pull: both move one unit inwards regardless of order
        assert_eq!(forward[order[0]].position, Vec2::new(501.0, 500.0));
        assert_eq!(forward[order[1]].position, Vec2::new(504.0, 500.0));
        assert_eq!(backward[order_rev[0]].position, forward[order[0]].position);
        assert_eq!(backward[order_rev[1]].position, forward[order[1]].position);
    }

    #[test]
    fn parallel_compute_matches_sequential() {
        let sequential = FlockParams {
            alignment_factor: 0.05,
            cohesion_factor: 0.01,
            separation_factor: 0.1,
            avoid_distance: 8.0,
            other_type_avoid_distance: 12.0,
            field_of_view: 270.0,
            max_speed: 2.0,
            ..quiet_params()
        };
        let parallel = FlockParams {
            parallel: true,
            ..sequential.clone()
        };

        let boids: Vec<Boid> = (0..200)
            .map(|i| {
                let angle = i as f32 * 0.37;
                Boid::new(
                    Vec2::new(500.0 + (i % 20) as f32 * 3.0, 500.0 + (i / 20) as f32 * 3.0),
                    Vec2::new(angle.cos(), angle.sin()),
                    i % 3,
                )
            })
            .collect();

        let (arena, grid, order) = setup(&boids, &sequential);

        let a = compute_steering(&order, &arena, &grid, &sequential, WORLD);
        let b = compute_steering(&order, &arena, &grid, &parallel, WORLD);

        assert_eq!(a, b);
    }
}
