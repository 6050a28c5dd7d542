//! Viewports: rectangular regions of the canvas that own input and framing
//! within their bounds.
//!
//! [`Viewport`] is the seam a [`crate::view::RenderView`] routes through.
//! [`RegionViewport`] is the stock implementation: a region given as
//! fractions of the canvas, optionally driving an [`OrbitController`].

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, OrbitController};
use crate::render::{PixelRect, Renderer};
use crate::routed::RoutedEvent;

/// Registration handle of a viewport within one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewportId(pub(crate) u32);

impl fmt::Display for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewport#{}", self.0)
    }
}

pub trait Viewport: Any {
    /// Disabled viewports are skipped by hit testing and rendering.
    fn enabled(&self) -> bool;

    /// Whether a canvas-local point falls inside this viewport.
    fn is_point_inside(&self, x: f64, y: f64) -> bool;

    /// Canvas-local x to device x (`-1` left edge, `1` right edge).
    fn device_x(&self, local_x: f64) -> f64;

    /// Canvas-local y to device y (`1` top edge, `-1` bottom edge).
    fn device_y(&self, local_y: f64) -> f64;

    fn set_canvas_size(&mut self, width: f64, height: f64);

    fn apply_viewport(&self, renderer: &mut dyn Renderer);

    /// Frame `camera` for this viewport without advancing any controller.
    fn frame_camera(&self, camera: &mut Camera);

    /// Per-frame camera update: advance controllers, then frame.
    fn update_camera(&mut self, camera: &mut Camera) {
        self.frame_camera(camera);
    }

    fn on_pointer(&mut self, _event: &mut RoutedEvent) {}

    fn on_trigger(&mut self, _event: &mut RoutedEvent) {}
}

/// Viewport bounds as fractions of the canvas, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Region {
    fn default() -> Self {
        Self::FULL
    }
}

impl Region {
    pub const FULL: Self = Self { left: 0.0, top: 0.0, width: 1.0, height: 1.0 };

    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }
}

/// Viewport covering a fixed fraction of the canvas.
#[derive(Debug, Clone)]
pub struct RegionViewport {
    region: Region,
    enabled: bool,
    canvas_width: f64,
    canvas_height: f64,
    rect: PixelRect,
    controller: Option<OrbitController>,
}

impl Default for RegionViewport {
    fn default() -> Self {
        Self::new(Region::FULL)
    }
}

impl RegionViewport {
    #[must_use]
    pub fn new(region: Region) -> Self {
        Self {
            region,
            enabled: true,
            canvas_width: 0.0,
            canvas_height: 0.0,
            rect: PixelRect::default(),
            controller: None,
        }
    }

    /// Drive the camera with an orbit controller fed by this viewport's
    /// pointer events.
    #[must_use]
    pub fn with_controller(mut self, mut controller: OrbitController) -> Self {
        controller.set_viewport_height(self.rect.height);
        self.controller = Some(controller);
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_region(&mut self, region: Region) {
        self.region = region;
        self.recompute();
    }

    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Bounds in canvas pixels, top-left origin.
    #[must_use]
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    #[must_use]
    pub fn controller(&self) -> Option<&OrbitController> {
        self.controller.as_ref()
    }

    pub fn controller_mut(&mut self) -> Option<&mut OrbitController> {
        self.controller.as_mut()
    }

    fn recompute(&mut self) {
        self.rect = PixelRect::new(
            self.region.left * self.canvas_width,
            self.region.top * self.canvas_height,
            self.region.width * self.canvas_width,
            self.region.height * self.canvas_height,
        );
        if let Some(controller) = self.controller.as_mut() {
            controller.set_viewport_height(self.rect.height);
        }
    }

    /// Bounds with the origin moved to the bottom-left, as GPU viewports expect.
    fn gl_rect(&self) -> PixelRect {
        PixelRect::new(
            self.rect.x,
            self.canvas_height - (self.rect.y + self.rect.height),
            self.rect.width,
            self.rect.height,
        )
    }
}

impl Viewport for RegionViewport {
    fn enabled(&self) -> bool {
        self.enabled
    }

    fn is_point_inside(&self, x: f64, y: f64) -> bool {
        !self.rect.is_empty() && self.rect.contains(x, y)
    }

    fn device_x(&self, local_x: f64) -> f64 {
        if self.rect.width <= 0.0 {
            return 0.0;
        }
        (local_x - self.rect.x) / self.rect.width * 2.0 - 1.0
    }

    fn device_y(&self, local_y: f64) -> f64 {
        if self.rect.height <= 0.0 {
            return 0.0;
        }
        1.0 - (local_y - self.rect.y) / self.rect.height * 2.0
    }

    fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width.max(0.0);
        self.canvas_height = height.max(0.0);
        self.recompute();
    }

    fn apply_viewport(&self, renderer: &mut dyn Renderer) {
        let rect = self.gl_rect();
        renderer.set_viewport(rect);
        renderer.set_scissor(Some(rect));
    }

    #[allow(clippy::cast_possible_truncation)]
    fn frame_camera(&self, camera: &mut Camera) {
        if !self.rect.is_empty() {
            camera.aspect = (self.rect.width / self.rect.height) as f32;
        }
        if let Some(controller) = &self.controller {
            camera.position = controller.position();
            camera.target = controller.target();
        }
    }

    fn update_camera(&mut self, camera: &mut Camera) {
        if let Some(controller) = self.controller.as_mut() {
            controller.update(camera);
        }
        self.frame_camera(camera);
    }

    fn on_pointer(&mut self, event: &mut RoutedEvent) {
        let Some(controller) = self.controller.as_mut() else {
            return;
        };
        if let Some(pointer) = event.pointer() {
            controller.handle_pointer(pointer);
        }
    }
}
