/*
 * Application Module
 *
 * This module defines the viewer's model and update loop.
 * It owns the flock, the egui panel and the debug metrics, and advances the
 * simulation on a fixed timestep so the flock moves at the same rate
 * regardless of the render frame rate.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use std::fs;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::debug::DebugInfo;
use crate::error::ConfigError;
use crate::flock::{Flock, FlockConfig};
use crate::renderer;
use crate::ui::{self, Controls};

// Simulation rate of the viewer
pub const TICKS_PER_SECOND: f32 = 30.0;

// Upper bound on catch-up ticks after a slow frame
const MAX_TICKS_PER_FRAME: usize = 5;

// Main model for the application
pub struct Model {
    pub flock: Flock,
    pub egui: Egui,
    pub controls: Controls,
    pub debug_info: DebugInfo,
    // Fixed timestep variables
    pub tick_accumulator: Duration,
    pub tick_step: Duration,
    pub last_update_time: Instant,
}

/// Read a flock configuration from a JSON file. Missing fields take their defaults.
pub fn load_config(path: &str) -> Result<FlockConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_owned(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_owned(),
        source,
    })
}

// Configuration named on the command line, or the defaults
fn startup_config() -> FlockConfig {
    let Some(path) = std::env::args().nth(1) else {
        return FlockConfig::default();
    };

    match load_config(&path) {
        Ok(config) => {
            info!(%path, "loaded flock config");
            config
        }
        Err(err) => {
            warn!(%err, "falling back to the default config");
            FlockConfig::default()
        }
    }
}

// Initialize the model
pub fn model(app: &App) -> Model {
    let config = startup_config();

    // Window sized to the world
    let window_id = app
        .new_window()
        .title("Boid Flocking Simulation")
        .size(config.world_size.x.max(1.0) as u32, config.world_size.y.max(1.0) as u32)
        .view(renderer::view)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to create window");

    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    let controls = Controls::new(config.agent_count, config.type_count, config.params.boundary);
    let flock = Flock::new(config);

    Model {
        flock,
        egui,
        controls,
        debug_info: DebugInfo::default(),
        tick_accumulator: Duration::ZERO,
        tick_step: Duration::from_secs_f32(1.0 / TICKS_PER_SECOND),
        last_update_time: Instant::now(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;

    model.egui.set_elapsed_time(update.since_start);
    let should_reset = ui::update_ui(
        &mut model.egui,
        model.flock.params_mut(),
        &mut model.controls,
        &model.debug_info,
    );

    if should_reset {
        model.flock.reset(model.controls.agent_count, model.controls.type_count);
        model.tick_accumulator = Duration::ZERO;
    }

    let current_time = Instant::now();
    let frame_time = current_time.duration_since(model.last_update_time);
    model.last_update_time = current_time;

    // Only advance the flock if the simulation is not paused
    let mut ticks_this_frame = 0;
    if model.controls.paused {
        model.tick_accumulator = Duration::ZERO;
    } else {
        model.tick_accumulator += frame_time;

        while model.tick_accumulator >= model.tick_step {
            if ticks_this_frame == MAX_TICKS_PER_FRAME {
                // Drop the backlog rather than spiral
                model.tick_accumulator = Duration::ZERO;
                break;
            }

            let started = Instant::now();
            model.flock.tick();
            model.debug_info.tick_time = started.elapsed();

            model.tick_accumulator -= model.tick_step;
            ticks_this_frame += 1;
        }
    }

    model.debug_info.ticks_per_frame = ticks_this_frame;
    model.debug_info.agents = model.flock.len();
    model.debug_info.occupied_cells = model.flock.grid().occupied_cells();
    if model.controls.show_debug {
        model.debug_info.highlighted_neighbors = model
            .flock
            .ids()
            .first()
            .map_or(0, |&id| model.flock.neighbors(id).all.len());
    }
}

// Forward window events to egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
