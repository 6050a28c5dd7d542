//! Capability interface shared by everything attached to a scene node.
//!
//! A component opts into the capabilities it has: an update step run once
//! per frame, and/or a renderable mesh. Concrete components are recovered
//! from `dyn Component` by downcasting through [`std::any::Any`].

use std::any::Any;

use glam::Mat4;

use crate::camera::Camera;
use crate::geometry::MeshBuffers;

/// Per-frame inputs handed to [`Component::update`].
#[derive(Debug, Clone, Copy)]
pub struct UpdateContext<'a> {
    /// World matrix of the node the component is attached to.
    pub world: Mat4,
    /// Active camera, if the render system has one.
    pub camera: Option<&'a Camera>,
    /// Canvas size in CSS pixels.
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Seconds since the previous frame.
    pub dt: f64,
}

pub trait Component: Any {
    /// Short type name for diagnostics.
    fn name(&self) -> &'static str;

    /// Per-frame update step. Most components have none.
    fn update(&mut self, _ctx: &UpdateContext<'_>) {}

    /// Renderable resource owned by this component. Components returning a
    /// mesh when attached get an object id and become pickable.
    fn mesh(&self) -> Option<&MeshBuffers> {
        None
    }
}
