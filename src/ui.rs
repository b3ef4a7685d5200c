/*
 * UI Module
 *
 * This module contains functions for creating and updating the user interface
 * using nannou_egui. It provides controls for adjusting flock parameters,
 * which take effect on the next tick, and for regenerating the flock.
 */

use nannou_egui::{egui, Egui};

use crate::debug::DebugInfo;
use crate::params::{BoundaryPolicy, FlockParams};

// Viewer state edited through the panel but not part of the flock parameters
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
    pub agent_count: usize,
    pub type_count: usize,
    pub turn_at_edges: bool,
    pub turn_margin: f32,
    pub turn_factor: f32,
    pub paused: bool,
    pub show_debug: bool,
}

impl Controls {
    pub fn new(agent_count: usize, type_count: usize, boundary: BoundaryPolicy) -> Self {
        let (turn_at_edges, turn_margin, turn_factor) = match boundary {
            BoundaryPolicy::Loop => (false, 100.0, 1.5),
            BoundaryPolicy::Turn { margin, factor } => (true, margin, factor),
        };

        Self {
            agent_count,
            type_count,
            turn_at_edges,
            turn_margin,
            turn_factor,
            paused: false,
            show_debug: false,
        }
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        if self.turn_at_edges {
            BoundaryPolicy::Turn {
                margin: self.turn_margin,
                factor: self.turn_factor,
            }
        } else {
            BoundaryPolicy::Loop
        }
    }
}

// Update the UI and return whether the flock should be regenerated
pub fn update_ui(egui: &mut Egui, params: &mut FlockParams, controls: &mut Controls, debug_info: &DebugInfo) -> bool {
    let mut should_reset = false;

    let ctx = egui.begin_frame();

    egui::Window::new("Flock Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Flock", |ui| {
                ui.add(egui::Slider::new(&mut controls.agent_count, FlockParams::get_num_boids_range()).text("Agents"));
                ui.add(egui::Slider::new(&mut controls.type_count, FlockParams::get_num_types_range()).text("Types"));

                if ui.button("Reset").clicked() {
                    should_reset = true;
                }

                ui.add(egui::Slider::new(&mut params.max_speed, FlockParams::get_max_speed_range()).text("Max Speed"));
            });

            ui.collapsing("Flocking Behavior", |ui| {
                ui.add(egui::Slider::new(&mut params.alignment_factor, FlockParams::get_factor_range()).text("Alignment"));
                ui.add(egui::Slider::new(&mut params.cohesion_factor, FlockParams::get_factor_range()).text("Cohesion"));
                ui.add(egui::Slider::new(&mut params.separation_factor, FlockParams::get_factor_range()).text("Separation"));
                ui.add(egui::Slider::new(&mut params.avoid_distance, FlockParams::get_distance_range()).text("Avoid Distance"));
                ui.add(
                    egui::Slider::new(&mut params.other_type_avoid_distance, FlockParams::get_distance_range())
                        .text("Other Type Avoid Distance"),
                );
                ui.add(
                    egui::Slider::new(&mut params.other_type_avoid_multiplier, FlockParams::get_multiplier_range())
                        .text("Other Type Multiplier"),
                );
            });

            ui.collapsing("Perception", |ui| {
                ui.add(egui::Slider::new(&mut params.perception_radius, FlockParams::get_perception_range()).text("Perception (cells)"));
                ui.add(egui::Slider::new(&mut params.field_of_view, FlockParams::get_field_of_view_range()).text("Field of View"));
                ui.add(egui::Slider::new(&mut params.cell_size, FlockParams::get_cell_size_range()).text("Cell Size"));
            });

            ui.collapsing("Boundary", |ui| {
                ui.checkbox(&mut controls.turn_at_edges, "Turn at edges (wrap around otherwise)");
                ui.add_enabled(
                    controls.turn_at_edges,
                    egui::Slider::new(&mut controls.turn_margin, FlockParams::get_turn_margin_range()).text("Turn Margin"),
                );
                ui.add_enabled(
                    controls.turn_at_edges,
                    egui::Slider::new(&mut controls.turn_factor, FlockParams::get_turn_factor_range()).text("Turn Factor"),
                );
            });

            ui.collapsing("Performance", |ui| {
                ui.checkbox(&mut params.parallel, "Enable Parallel Processing");

                ui.separator();

                for line in debug_info.lines() {
                    ui.label(line);
                }
            });

            ui.checkbox(&mut controls.show_debug, "Show Debug Info");
            ui.checkbox(&mut controls.paused, "Pause Simulation");
        });

    params.boundary = controls.boundary();

    should_reset
}

// Draw debug information on the screen
pub fn draw_debug_info(draw: &nannou::Draw, debug_info: &DebugInfo, window_rect: nannou::geom::Rect) {
    // Background panel in the top-right corner, clear of the control window
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 260.0;
    let lines = debug_info.lines();
    let panel_height = line_height * lines.len() as f32 + margin;
    let panel_x = window_rect.right() - panel_width / 2.0;
    let panel_y = window_rect.top() - panel_height / 2.0;

    draw.rect()
        .x_y(panel_x, panel_y)
        .w_h(panel_width, panel_height)
        .color(nannou::color::rgba(0.0, 0.0, 0.0, 0.7));

    let text_y = window_rect.top() - margin;

    for (i, text) in lines.iter().enumerate() {
        let y = text_y - (i as f32 * line_height);

        draw.text(text)
            .x_y(panel_x, y)
            .w(panel_width - margin)
            .left_justify()
            .color(nannou::color::WHITE)
            .font_size(14);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_round_trip_the_boundary_policy() {
        let turn = BoundaryPolicy::Turn { margin: 80.0, factor: 2.0 };

        assert_eq!(Controls::new(10, 2, turn).boundary(), turn);
        assert_eq!(Controls::new(10, 2, BoundaryPolicy::Loop).boundary(), BoundaryPolicy::Loop);
    }

    #[test]
    fn looping_keeps_default_turn_settings_for_the_toggle() {
        let mut controls = Controls::new(10, 2, BoundaryPolicy::Loop);
        controls.turn_at_edges = true;

        assert_eq!(controls.boundary(), BoundaryPolicy::Turn { margin: 100.0, factor: 1.5 });
    }
}
