/*
 * Renderer Module
 *
 * This module handles the rendering of the flock.
 * It draws the grid lines, the boids and the debug overlay.
 *
 * The simulation uses screen-style coordinates: origin in the top-left
 * corner of the world, y growing downwards. nannou puts the origin in the
 * middle of the window with y growing upwards, so every point goes through
 * `to_screen` before it is drawn. World points are `glam` vectors; window
 * points are nannou's own.
 */

use nannou::color::Hsl;
use glam::Vec2 as WorldPoint;
use nannou::prelude::*;

use crate::app::Model;
use crate::spatial_grid::CellKey;
use crate::ui;
use crate::BOID_SIZE;

// Map a world point to window coordinates
pub fn to_screen(point: WorldPoint, world_size: WorldPoint) -> Point2 {
    pt2(point.x - world_size.x / 2.0, world_size.y / 2.0 - point.y)
}

// Color of a boid kind, spread evenly around the hue wheel
pub fn kind_color(kind: usize, type_count: usize) -> Hsl {
    let hue = kind as f32 / type_count.max(1) as f32;
    hsl(hue, 0.8, 0.55)
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let flock = &model.flock;
    let world_size = flock.world_size();

    draw_grid(&draw, flock.grid().cell_size(), world_size);

    // Draw each boid as a triangle pointing along its velocity
    let type_count = flock.type_count();
    for boid in flock.agents() {
        let center = to_screen(boid.position, world_size);
        let heading = vec2(boid.velocity.x, -boid.velocity.y);
        let forward = if heading.length_squared() > 0.0 {
            heading.normalize()
        } else {
            vec2(0.0, 1.0)
        };
        let side = forward.perp();

        draw.tri()
            .points(
                center + forward * BOID_SIZE * 2.0,
                center - forward * BOID_SIZE + side * BOID_SIZE,
                center - forward * BOID_SIZE - side * BOID_SIZE,
            )
            .color(kind_color(boid.kind, type_count));
    }

    if model.controls.show_debug {
        draw_neighbor_overlay(&draw, model);
        ui::draw_debug_info(&draw, &model.debug_info, app.window_rect());
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        tracing::warn!(?err, "failed to draw frame");
    }

    // Draw the egui UI
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        tracing::warn!(?err, "failed to draw controls");
    }
}

// Most grid lines drawn along one axis
const MAX_GRID_LINES: u32 = 1000;

// Offsets of the cell boundaries along one axis, from 0 up to `extent`
pub fn grid_lines(extent: f32, cell_size: f32) -> impl Iterator<Item = f32> {
    let count = if cell_size > 0.0 && extent.is_finite() && extent >= 0.0 {
        Some(((extent / cell_size).floor() as u32).min(MAX_GRID_LINES))
    } else {
        None
    };

    count
        .into_iter()
        .flat_map(move |count| (0..=count).map(move |i| i as f32 * cell_size))
}

// Draw one line per cell boundary
fn draw_grid(draw: &Draw, cell_size: f32, world_size: WorldPoint) {
    let color = rgba(0.25, 0.25, 0.25, 1.0);

    for x in grid_lines(world_size.x, cell_size) {
        draw.line()
            .start(to_screen(WorldPoint::new(x, 0.0), world_size))
            .end(to_screen(WorldPoint::new(x, world_size.y), world_size))
            .color(color)
            .stroke_weight(1.0);
    }

    for y in grid_lines(world_size.y, cell_size) {
        draw.line()
            .start(to_screen(WorldPoint::new(0.0, y), world_size))
            .end(to_screen(WorldPoint::new(world_size.x, y), world_size))
            .color(color)
            .stroke_weight(1.0);
    }
}

// Highlight the first boid, its query window and the neighbors it sees
fn draw_neighbor_overlay(draw: &Draw, model: &Model) {
    let flock = &model.flock;
    let world_size = flock.world_size();

    let Some(&id) = flock.ids().first() else {
        return;
    };
    let Some(boid) = flock.get(id) else {
        return;
    };
    let center = to_screen(boid.position, world_size);

    // Query window: the cells within perception - 1 of the boid's own cell
    let perception = flock.params().perception_radius;
    if let (Some(CellKey(cx, cy)), true) = (boid.cell(), perception > 0) {
        let cell_size = flock.grid().cell_size();
        let reach = (perception - 1) as f32;
        let min = WorldPoint::new((cx as f32 - reach) * cell_size, (cy as f32 - reach) * cell_size);
        let max = WorldPoint::new((cx as f32 + reach + 1.0) * cell_size, (cy as f32 + reach + 1.0) * cell_size);
        let window = Rect::from_corners(to_screen(min, world_size), to_screen(max, world_size));

        draw.rect()
            .xy(window.xy())
            .wh(window.wh())
            .no_fill()
            .stroke_weight(2.0)
            .stroke(rgba(1.0, 0.5, 0.0, 0.7));
    }

    let neighbors = flock.neighbors(id);
    for other in neighbors.all.iter().filter_map(|&n| flock.get(n)) {
        let same_kind = other.kind == boid.kind;
        draw.line()
            .start(center)
            .end(to_screen(other.position, world_size))
            .color(if same_kind { GREEN } else { RED })
            .stroke_weight(1.0);
    }

    draw.ellipse()
        .xy(center)
        .radius(BOID_SIZE * 2.0)
        .no_fill()
        .stroke(YELLOW)
        .stroke_weight(2.0);

    // Velocity vector
    draw.arrow()
        .start(center)
        .end(center + vec2(boid.velocity.x, -boid.velocity.y) * 10.0)
        .color(YELLOW)
        .stroke_weight(2.0);
}
