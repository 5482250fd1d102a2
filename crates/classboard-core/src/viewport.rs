//! Viewport pan/zoom state.
//!
//! Persisted with the board record but never broadcast: each peer frames the
//! scene independently.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Scene-to-screen transform: `screen = scene * zoom + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.x, self.y)) * Affine::scale(self.zoom)
    }

    pub fn screen_to_scene(&self, screen: Point) -> Point {
        self.transform().inverse() * screen
    }

    pub fn scene_to_screen(&self, scene: Point) -> Point {
        self.transform() * scene
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Zoom keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let anchor = self.screen_to_scene(screen);
        self.zoom = new_zoom;
        let moved = self.scene_to_screen(anchor);
        self.x += screen.x - moved.x;
        self.y += screen.y - moved.y;
    }
}
