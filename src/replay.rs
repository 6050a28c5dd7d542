//! Drives a [`RenderView`] through a scenario's steps and records what
//! happened at each one.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use serde::Serialize;
use tracing::{debug, info};

use renderview::camera::{Camera, OrbitController};
use renderview::error::ViewError;
use renderview::event::Point;
use renderview::pick::PickBuffer;
use renderview::render::{PixelRect, Renderer};
use renderview::routed::RoutedEvent;
use renderview::scene::Scene;
use renderview::sprite::SpriteGroup;
use renderview::system::{RenderSystem, SceneSystem};
use renderview::view::RenderView;
use renderview::viewport::{RegionViewport, ViewportId};

use crate::error::CliError;
use crate::scenario::{Pickable, Scenario, Step};

/// Outcome of one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Record {
    /// The event reached a viewport.
    Routed {
        index: usize,
        /// Name of the node owning the picked object.
        target: Option<String>,
        event: RoutedEvent,
    },
    /// No viewport owned the event.
    Dropped { index: usize, at: Point },
    Frame {
        index: usize,
        drawn: bool,
        /// Viewport rectangles handed to the renderer (bottom-left origin).
        viewports: Vec<PixelRect>,
        camera: Option<CameraPose>,
        sprites: Vec<SpritePlacement>,
    },
    Resized { index: usize, width: f64, height: f64 },
    ViewportRemoved { index: usize, viewport: ViewportId },
    ViewportToggled { index: usize, viewport: ViewportId, enabled: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub aspect: f32,
}

impl From<&Camera> for CameraPose {
    fn from(camera: &Camera) -> Self {
        Self { position: camera.position.to_array(), target: camera.target.to_array(), aspect: camera.aspect }
    }
}

/// Where a sprite ended up after a frame. `at` is `None` when hidden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpritePlacement {
    pub node: String,
    pub html: String,
    pub at: Option<Point>,
}

/// Renderer that only remembers the viewport rectangles it was given.
#[derive(Debug, Default)]
struct TraceRenderer {
    viewports: Vec<PixelRect>,
}

impl Renderer for TraceRenderer {
    fn set_viewport(&mut self, rect: PixelRect) {
        self.viewports.push(rect);
    }

    fn set_scissor(&mut self, _rect: Option<PixelRect>) {}

    fn render(&mut self, _scene: &Scene, _camera: &Camera) {}
}

/// A view, its render system, and the scenario's viewport handles.
pub struct Replay {
    view: RenderView,
    system: SceneSystem,
    viewports: Vec<ViewportId>,
    pickables: Vec<Pickable>,
    /// Canvas size the pick rects were authored for.
    authored: (f64, f64),
}

impl Replay {
    /// Build the scene, the pick buffer and the viewports described by
    /// `scenario`. The canvas size can be overridden.
    ///
    /// # Errors
    ///
    /// Scene construction errors.
    pub fn new(scenario: &Scenario, canvas: Option<(f64, f64)>) -> Result<Self, CliError> {
        let (width, height) = canvas.unwrap_or((scenario.canvas.width, scenario.canvas.height));
        let (scene, pickables) = scenario.build_scene()?;
        let camera = scenario.camera.camera();
        let system = SceneSystem::with_scene(scene, camera);
        let authored = (scenario.canvas.width, scenario.canvas.height);

        let buffer = pick_buffer(&system, &pickables, authored, (width, height));
        let mut view = RenderView::new(buffer);
        view.set_canvas_size(width, height);
        let mut viewports = Vec::new();
        for spec in scenario.viewport_specs() {
            let mut viewport = RegionViewport::new(spec.region);
            viewport.set_enabled(spec.enabled);
            if let Some(settings) = spec.orbit {
                viewport = viewport.with_controller(OrbitController::from_camera(&camera, settings));
            }
            viewports.push(view.add_viewport(viewport));
        }

        let objects = pickables.len();
        let mut replay = Self { view, system, viewports, pickables, authored };
        replay.view.attach(&mut replay.system);
        info!(width, height, viewports = replay.viewports.len(), objects, "scenario loaded");
        Ok(replay)
    }

    #[must_use]
    pub fn view(&self) -> &RenderView {
        &self.view
    }

    /// Run every step in order.
    ///
    /// # Errors
    ///
    /// The first step that names a viewport the scenario does not have, or
    /// one that was already removed.
    pub fn run(&mut self, steps: &[Step]) -> Result<Vec<Record>, CliError> {
        steps.iter().enumerate().map(|(index, step)| self.step(index, step)).collect()
    }

    fn step(&mut self, index: usize, step: &Step) -> Result<Record, CliError> {
        let record = match step {
            Step::Pointer(event) => {
                let at = event.local;
                let routed = self.view.dispatch_pointer(&mut self.system, event.clone());
                self.routed(index, at, routed)
            }
            Step::Trigger(event) => {
                let at = event.local;
                let routed = self.view.dispatch_trigger(&mut self.system, event.clone());
                self.routed(index, at, routed)
            }
            Step::Frame { dt } => self.frame(index, *dt),
            Step::Resize { width, height } => {
                self.view.set_canvas_size(*width, *height);
                let buffer = pick_buffer(&self.system, &self.pickables, self.authored, (*width, *height));
                self.view.set_picker(buffer);
                Record::Resized { index, width: *width, height: *height }
            }
            Step::RemoveViewport { index: target } => {
                let viewport = self.viewport_id(index, *target)?;
                self.view.remove_viewport(viewport)?;
                Record::ViewportRemoved { index, viewport }
            }
            Step::SetEnabled { index: target, enabled } => {
                let viewport = self.viewport_id(index, *target)?;
                let region = self
                    .view
                    .viewport_as_mut::<RegionViewport>(viewport)
                    .ok_or(ViewError::ViewportNotFound(viewport))?;
                region.set_enabled(*enabled);
                Record::ViewportToggled { index, viewport, enabled: *enabled }
            }
        };
        Ok(record)
    }

    fn viewport_id(&self, step: usize, index: usize) -> Result<ViewportId, CliError> {
        self.viewports
            .get(index)
            .copied()
            .ok_or(CliError::UnknownViewport { step, index, count: self.viewports.len() })
    }

    fn routed(&self, index: usize, at: Point, routed: Option<RoutedEvent>) -> Record {
        let Some(event) = routed else {
            return Record::Dropped { index, at };
        };
        let target = event
            .node
            .and_then(|node| self.system.active_scene()?.node(node))
            .map(|node| node.name().to_owned());
        Record::Routed { index, target, event }
    }

    fn frame(&mut self, index: usize, dt: f64) -> Record {
        let mut renderer = TraceRenderer::default();
        let drawn = self.view.render(&mut self.system, &mut renderer, dt);
        let camera = self.system.active_camera().map(CameraPose::from);

        let mut sprites = Vec::new();
        if let Some(scene) = self.system.scene_mut() {
            let groups: Vec<_> = scene.components_mut::<SpriteGroup>().map(|(id, _)| id).collect();
            for id in groups {
                let node = scene
                    .node_of(id)
                    .and_then(|n| scene.node(n))
                    .map(|n| n.name().to_owned())
                    .unwrap_or_default();
                let Some(group) = scene.component::<SpriteGroup>(id) else {
                    continue;
                };
                sprites.extend(group.iter().map(|(_, sprite)| SpritePlacement {
                    node: node.clone(),
                    html: sprite.html.clone(),
                    at: sprite.is_shown().then(|| sprite.screen()).flatten(),
                }));
            }
        }

        Record::Frame { index, drawn, viewports: renderer.viewports, camera, sprites }
    }
}

/// Pick buffer of `size` holding every footprint, scaled from the canvas
/// size the footprints were authored for.
fn pick_buffer(system: &SceneSystem, pickables: &[Pickable], authored: (f64, f64), size: (f64, f64)) -> PickBuffer {
    let scale = |to: f64, from: f64| if from > 0.0 { to / from } else { 1.0 };
    let (sx, sy) = (scale(size.0, authored.0), scale(size.1, authored.1));

    let mut buffer = PickBuffer::new(pixels(size.0), pixels(size.1));
    for pickable in pickables {
        let Some(index) = system.pick_table().index_of(pickable.object) else {
            continue;
        };
        let r = pickable.rect;
        let rect = PixelRect::new(r.x * sx, r.y * sy, r.width * sx, r.height * sy);
        buffer.fill_rect(rect, index);
        debug!(name = %pickable.name, index, x = rect.x, y = rect.y, "pick footprint");
    }
    buffer
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn pixels(size: f64) -> usize {
    if size.is_finite() && size > 0.0 { size.ceil() as usize } else { 0 }
}
