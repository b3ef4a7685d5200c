/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct that contains performance metrics
 * and other debug information to be displayed in the UI.
 *
 * Includes metrics for:
 * - FPS (frames per second) and frame time
 * - Time spent in the last simulation tick
 * - Ticks run in the last frame
 * - Agent count and occupied grid cells
 * - Neighbors seen by the highlighted boid
 */

use std::time::Duration;

// Debug information to display
#[derive(Clone, Debug, Default)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub tick_time: Duration,
    pub ticks_per_frame: usize,
    pub agents: usize,
    pub occupied_cells: usize,
    pub highlighted_neighbors: usize,
}

impl DebugInfo {
    pub fn lines(&self) -> [String; 6] {
        [
            format!("FPS: {:.1}", self.fps),
            format!("Frame time: {:.2} ms", self.frame_time.as_secs_f64() * 1000.0),
            format!("Tick time: {:.2} ms ({} per frame)", self.tick_time.as_secs_f64() * 1000.0, self.ticks_per_frame),
            format!("Agents: {}", self.agents),
            format!("Occupied cells: {}", self.occupied_cells),
            format!("Neighbors of first boid: {}", self.highlighted_neighbors),
        ]
    }
}
