//! Render system: the consumer downstream of a render view.
//!
//! It holds the active scene and camera, resolves pick indices to objects
//! and objects to their owning components, gets the first look at every
//! routed event, and brackets each frame.

#[cfg(test)]
#[path = "system_test.rs"]
mod system_test;

use tracing::debug;

use crate::camera::Camera;
use crate::pick::{PickIndex, PickTable};
use crate::render::RenderContext;
use crate::routed::RoutedEvent;
use crate::scene::{ComponentId, NodeId, ObjectId, Scene};
use crate::view::ViewId;

pub trait RenderSystem {
    fn active_scene(&self) -> Option<&Scene>;

    fn active_camera(&self) -> Option<&Camera>;

    fn active_camera_mut(&mut self) -> Option<&mut Camera>;

    /// Object drawn with `index` in the pick target.
    fn object_by_index(&self, index: PickIndex) -> Option<ObjectId>;

    /// Component owning a renderable object.
    fn owner_of(&self, object: ObjectId) -> Option<ComponentId>;

    /// Node a component is attached to.
    fn node_of(&self, component: ComponentId) -> Option<NodeId>;

    fn attach_view(&mut self, view: ViewId);

    fn detach_view(&mut self, view: ViewId);

    fn pre_render(&mut self, ctx: &RenderContext);

    fn post_render(&mut self, ctx: &RenderContext);

    /// First look at a routed pointer event. Stop propagation to keep it
    /// from the viewport.
    fn on_pointer(&mut self, event: &mut RoutedEvent);

    fn on_trigger(&mut self, event: &mut RoutedEvent);
}

type Listener = Box<dyn FnMut(&mut RoutedEvent)>;

/// Render system backed by a [`Scene`].
#[derive(Default)]
pub struct SceneSystem {
    scene: Option<Scene>,
    camera: Option<Camera>,
    table: PickTable,
    views: Vec<ViewId>,
    frames: u64,
    pointer_listeners: Vec<Listener>,
    trigger_listeners: Vec<Listener>,
}

impl SceneSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scene(scene: Scene, camera: Camera) -> Self {
        let mut system = Self::new();
        system.set_scene(Some(scene));
        system.set_camera(Some(camera));
        system
    }

    /// Install (or clear) the active scene. Pick indices are assigned for
    /// its objects right away.
    pub fn set_scene(&mut self, scene: Option<Scene>) -> Option<Scene> {
        self.table = PickTable::new();
        if let Some(scene) = &scene {
            self.table.sync(scene);
        }
        std::mem::replace(&mut self.scene, scene)
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) -> Option<Camera> {
        std::mem::replace(&mut self.camera, camera)
    }

    /// Mutable scene access. Call [`Self::refresh_pick_table`] after adding
    /// or removing renderable components if picks must see them before the
    /// next frame.
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.as_mut()
    }

    pub fn refresh_pick_table(&mut self) {
        if let Some(scene) = &self.scene {
            self.table.sync(scene);
        }
    }

    #[must_use]
    pub fn pick_table(&self) -> &PickTable {
        &self.table
    }

    #[must_use]
    pub fn attached_views(&self) -> &[ViewId] {
        &self.views
    }

    /// Frames completed since creation.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Listeners run in registration order until one stops propagation.
    pub fn add_pointer_listener(&mut self, listener: impl FnMut(&mut RoutedEvent) + 'static) {
        self.pointer_listeners.push(Box::new(listener));
    }

    pub fn add_trigger_listener(&mut self, listener: impl FnMut(&mut RoutedEvent) + 'static) {
        self.trigger_listeners.push(Box::new(listener));
    }
}

fn notify(listeners: &mut [Listener], event: &mut RoutedEvent) {
    for listener in listeners {
        listener(event);
        if event.is_propagation_stopped() {
            break;
        }
    }
}

impl RenderSystem for SceneSystem {
    fn active_scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    fn active_camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    fn object_by_index(&self, index: PickIndex) -> Option<ObjectId> {
        self.table.object(index)
    }

    fn owner_of(&self, object: ObjectId) -> Option<ComponentId> {
        self.scene.as_ref()?.owner_of(object)
    }

    fn node_of(&self, component: ComponentId) -> Option<NodeId> {
        self.scene.as_ref()?.node_of(component)
    }

    fn attach_view(&mut self, view: ViewId) {
        if !self.views.contains(&view) {
            debug!(%view, "view attached");
            self.views.push(view);
        }
    }

    fn detach_view(&mut self, view: ViewId) {
        self.views.retain(|v| *v != view);
    }

    fn pre_render(&mut self, ctx: &RenderContext) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        self.table.sync(scene);
        scene.update(self.camera.as_ref(), ctx.canvas_width, ctx.canvas_height, ctx.dt);
    }

    fn post_render(&mut self, _ctx: &RenderContext) {
        self.frames += 1;
    }

    fn on_pointer(&mut self, event: &mut RoutedEvent) {
        notify(&mut self.pointer_listeners, event);
    }

    fn on_trigger(&mut self, event: &mut RoutedEvent) {
        notify(&mut self.trigger_listeners, event);
    }
}
