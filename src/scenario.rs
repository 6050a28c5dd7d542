//! Scenario files: a scene, a viewport layout, and a script of input steps.
//!
//! Scenarios are JSON. Every section has defaults, so `{}` is a valid
//! scenario: an 800×600 canvas, one full-canvas viewport, an empty scene and
//! no steps.

#[cfg(test)]
#[path = "scenario_test.rs"]
mod scenario_test;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use renderview::camera::{Camera, OrbitSettings};
use renderview::event::{PointerEvent, TriggerEvent};
use renderview::geometry::{BoxGeometry, BoxParams};
use renderview::render::PixelRect;
use renderview::scene::{NodeId, ObjectId, Scene};
use renderview::sprite::{Sprite, SpriteGroup};
use renderview::transform::Transform;
use renderview::viewport::Region;

use crate::error::CliError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub canvas: CanvasSpec,
    pub camera: CameraSpec,
    /// Registered in order; steps refer to viewports by position here.
    pub viewports: Vec<ViewportSpec>,
    /// Parents must be declared before their children.
    pub objects: Vec<ObjectSpec>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSpec {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasSpec {
    fn default() -> Self {
        Self { width: 800.0, height: 600.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSpec {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_deg: f32,
}

impl Default for CameraSpec {
    fn default() -> Self {
        let camera = Camera::default();
        Self { position: camera.position, target: camera.target, fov_y_deg: camera.fov_y_deg }
    }
}

impl CameraSpec {
    #[must_use]
    pub fn camera(&self) -> Camera {
        Camera { fov_y_deg: self.fov_y_deg, ..Camera::looking_at(self.position, self.target) }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSpec {
    pub region: Region,
    pub enabled: bool,
    /// Attach an orbit controller with these settings.
    pub orbit: Option<OrbitSettings>,
}

impl Default for ViewportSpec {
    fn default() -> Self {
        Self { region: Region::FULL, enabled: true, orbit: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSpec {
    pub translation: Vec3,
    /// XYZ Euler angles in degrees.
    pub rotation_deg: Vec3,
    pub scale: Vec3,
}

impl Default for TransformSpec {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation_deg: Vec3::ZERO, scale: Vec3::ONE }
    }
}

impl TransformSpec {
    #[must_use]
    pub fn transform(&self) -> Transform {
        let r = self.rotation_deg;
        Transform {
            translation: self.translation,
            rotation: Quat::from_euler(EulerRot::XYZ, r.x.to_radians(), r.y.to_radians(), r.z.to_radians()),
            scale: self.scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSpec {
    #[serde(default)]
    pub offset: Vec3,
    pub html: String,
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub transform: TransformSpec,
    /// Box geometry on this node. Nodes without one are not pickable.
    #[serde(default, rename = "box")]
    pub geometry: Option<BoxParams>,
    /// Canvas pixels this object covers in the pick buffer (top-left origin),
    /// relative to the scenario's canvas. Scaled when the canvas is resized.
    #[serde(default)]
    pub pick_rect: Option<PixelRect>,
    #[serde(default)]
    pub sprites: Vec<SpriteSpec>,
}

fn default_dt() -> f64 {
    1.0 / 60.0
}

/// One scripted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Pointer(PointerEvent),
    Trigger(TriggerEvent),
    /// Render a frame.
    Frame {
        #[serde(default = "default_dt")]
        dt: f64,
    },
    Resize { width: f64, height: f64 },
    RemoveViewport { index: usize },
    SetEnabled { index: usize, enabled: bool },
}

/// A renderable object created from the scenario, with its pick footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct Pickable {
    pub name: String,
    pub object: ObjectId,
    pub rect: PixelRect,
}

impl Scenario {
    /// # Errors
    ///
    /// Unreadable file or invalid JSON.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    /// # Errors
    ///
    /// Invalid JSON.
    pub fn from_json(text: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Viewports to register; a scenario without any gets one full-canvas viewport.
    #[must_use]
    pub fn viewport_specs(&self) -> Vec<ViewportSpec> {
        if self.viewports.is_empty() {
            vec![ViewportSpec::default()]
        } else {
            self.viewports.clone()
        }
    }

    /// Build the scene graph. Returns the scene and, for every object with
    /// both a box and a pick rect, its pick footprint.
    ///
    /// # Errors
    ///
    /// Duplicate object names, or a parent that is not declared earlier.
    pub fn build_scene(&self) -> Result<(Scene, Vec<Pickable>), CliError> {
        let mut scene = Scene::new();
        let mut by_name: HashMap<&str, NodeId> = HashMap::new();
        let mut pickables = Vec::new();

        for spec in &self.objects {
            if by_name.contains_key(spec.name.as_str()) {
                return Err(CliError::DuplicateObject(spec.name.clone()));
            }
            let parent = match &spec.parent {
                Some(parent) => Some(*by_name.get(parent.as_str()).ok_or_else(|| CliError::UnknownParent {
                    object: spec.name.clone(),
                    parent: parent.clone(),
                })?),
                None => None,
            };
            let node = scene.add_node(spec.name.clone(), parent)?;
            if let Some(transform) = scene.transform_mut(node) {
                *transform = spec.transform.transform();
            }
            by_name.insert(spec.name.as_str(), node);

            if let Some(params) = spec.geometry {
                let component = scene.add_component(node, BoxGeometry::new(params))?;
                if let (Some(object), Some(rect)) = (scene.object_of(component), spec.pick_rect) {
                    pickables.push(Pickable { name: spec.name.clone(), object, rect });
                }
            }
            if !spec.sprites.is_empty() {
                let mut group = SpriteGroup::new();
                for sprite in &spec.sprites {
                    group.add(Sprite::new(sprite.offset, sprite.html.clone()).with_class(sprite.class.clone()));
                }
                scene.add_component(node, group)?;
            }
        }
        Ok((scene, pickables))
    }
}
