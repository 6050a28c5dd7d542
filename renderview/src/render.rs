//! Renderer seam and per-frame context.
//!
//! Drawing is the host's job. A [`Renderer`] receives the viewport and
//! scissor rectangles for each enabled viewport followed by a render call
//! with the scene and the camera framed for that viewport.

use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::scene::Scene;
use crate::view::ViewId;

/// Axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Half-open containment: the left and top edges are inside, the right
    /// and bottom edges are not.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// What the render system sees around each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub view: ViewId,
    /// Frames rendered by this view before this one.
    pub frame: u64,
    /// Seconds since the previous frame.
    pub dt: f64,
    pub canvas_width: f64,
    pub canvas_height: f64,
}

pub trait Renderer {
    /// Viewport rectangle, bottom-left origin, in canvas pixels.
    fn set_viewport(&mut self, rect: PixelRect);

    /// Scissor rectangle (bottom-left origin), or `None` to disable.
    fn set_scissor(&mut self, rect: Option<PixelRect>);

    fn render(&mut self, scene: &Scene, camera: &Camera);
}
