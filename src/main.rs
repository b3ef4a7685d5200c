/*
 * Boid Flocking Simulation - Viewer Entry Point
 *
 * Opens a window on a flock of several boid kinds driven by the spatial
 * hash grid, with an egui panel for tuning the flocking parameters live.
 *
 * Usage: flock-viewer [config.json]
 * Logging is controlled through RUST_LOG (defaults to `info`).
 */

use flockgrid::app;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    nannou::app(app::model).update(app::update).run();
}
