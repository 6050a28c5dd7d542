//! Render view: owns the viewports of one canvas and routes input to them.
//!
//! Routing decides, per event, which viewport owns it, what (if anything)
//! lies under it, and which scene component and node that object belongs
//! to. State is sticky across a gesture: a pointer-down hit-tests and picks,
//! the moves and up that follow reuse the result.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::consts::BACKGROUND_PICK_INDEX;
use crate::error::ViewError;
use crate::event::{InputEvent, Point, PointerEvent, PointerKind, TriggerEvent};
use crate::gesture::GestureState;
use crate::pick::Picker;
use crate::render::{RenderContext, Renderer};
use crate::routed::RoutedEvent;
use crate::scene::{ComponentId, ObjectId};
use crate::system::RenderSystem;
use crate::viewport::{Viewport, ViewportId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view:{}", self.0)
    }
}

/// Viewports in registration order. Mutating the list requires `&mut`, so
/// it cannot change under an in-flight render or routing call.
pub struct RenderView {
    id: ViewId,
    viewports: Vec<(ViewportId, Box<dyn Viewport>)>,
    next_viewport: u32,
    picker: Box<dyn Picker>,
    gesture: GestureState,
    canvas_width: f64,
    canvas_height: f64,
    frame: u64,
}

impl RenderView {
    #[must_use]
    pub fn new(picker: impl Picker + 'static) -> Self {
        Self {
            id: ViewId::new(),
            viewports: Vec::new(),
            next_viewport: 0,
            picker: Box::new(picker),
            gesture: GestureState::default(),
            canvas_width: 0.0,
            canvas_height: 0.0,
            frame: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    #[must_use]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Frames rendered so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn set_picker(&mut self, picker: impl Picker + 'static) {
        self.picker = Box::new(picker);
    }

    pub fn attach(&self, system: &mut dyn RenderSystem) {
        system.attach_view(self.id);
    }

    pub fn detach(&self, system: &mut dyn RenderSystem) {
        system.detach_view(self.id);
    }

    // --- Viewports ---

    /// Register a viewport after the existing ones. It is sized to the
    /// current canvas.
    pub fn add_viewport(&mut self, mut viewport: impl Viewport) -> ViewportId {
        let id = ViewportId(self.next_viewport);
        self.next_viewport += 1;
        viewport.set_canvas_size(self.canvas_width, self.canvas_height);
        self.viewports.push((id, Box::new(viewport)));
        id
    }

    /// Unregister a viewport. The others keep their relative order. If the
    /// viewport owned the current gesture, the gesture is dropped.
    ///
    /// # Errors
    ///
    /// [`ViewError::ViewportNotFound`] if `id` is not registered.
    pub fn remove_viewport(&mut self, id: ViewportId) -> Result<Box<dyn Viewport>, ViewError> {
        let position = self
            .viewports
            .iter()
            .position(|(v, _)| *v == id)
            .ok_or(ViewError::ViewportNotFound(id))?;
        let (_, viewport) = self.viewports.remove(position);
        self.gesture.forget_viewport(id);
        Ok(viewport)
    }

    /// Registered viewport ids, in registration order.
    #[must_use]
    pub fn viewport_ids(&self) -> Vec<ViewportId> {
        self.viewports.iter().map(|(id, _)| *id).collect()
    }

    #[must_use]
    pub fn viewport(&self, id: ViewportId) -> Option<&dyn Viewport> {
        self.viewports.iter().find(|(v, _)| *v == id).map(|(_, vp)| vp.as_ref())
    }

    pub fn viewport_mut(&mut self, id: ViewportId) -> Option<&mut dyn Viewport> {
        self.viewports.iter_mut().find(|(v, _)| *v == id).map(|(_, vp)| vp.as_mut())
    }

    /// Concrete viewport access.
    #[must_use]
    pub fn viewport_as<T: Viewport>(&self, id: ViewportId) -> Option<&T> {
        let any: &dyn Any = self.viewport(id)?;
        any.downcast_ref::<T>()
    }

    pub fn viewport_as_mut<T: Viewport>(&mut self, id: ViewportId) -> Option<&mut T> {
        let any: &mut dyn Any = self.viewport_mut(id)?;
        any.downcast_mut::<T>()
    }

    /// Resize the canvas (CSS pixels) and every viewport with it.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_width = width;
        self.canvas_height = height;
        for (_, viewport) in &mut self.viewports {
            viewport.set_canvas_size(width, height);
        }
    }

    #[must_use]
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    // --- Routing ---

    /// Resolve an input event against this view.
    ///
    /// With `hit_test`, the owning viewport is re-resolved from the event's
    /// location; otherwise the gesture's viewport is reused. With `pick`,
    /// the picker is queried and the result replaces the gesture's object
    /// and component; otherwise they carry over. Returns `None` when no
    /// enabled viewport owns the event.
    pub fn route_event(
        &mut self,
        system: &dyn RenderSystem,
        input: InputEvent,
        hit_test: bool,
        pick: bool,
    ) -> Option<RoutedEvent> {
        let local = input.local();

        if hit_test {
            self.gesture.clear_viewport();
            let Some(hit) = self
                .viewports
                .iter()
                .find(|(_, vp)| vp.enabled() && vp.is_point_inside(local.x, local.y))
                .map(|(id, _)| *id)
            else {
                trace!(view = %self.id, x = local.x, y = local.y, "no viewport under event");
                return None;
            };
            self.gesture.set_viewport(hit);
        }

        let viewport_id = self.gesture.viewport()?;
        let viewport = self
            .viewports
            .iter()
            .find(|(id, _)| *id == viewport_id)
            .map(|(_, vp)| vp.as_ref())?;
        if !viewport.enabled() {
            return None;
        }

        let device = Point::new(viewport.device_x(local.x), viewport.device_y(local.y));
        let mut routed = RoutedEvent::new(input, self.id, viewport_id, device);

        let (object, component) = if pick {
            pick_object(self.picker.as_mut(), viewport, system, &routed)
        } else {
            (self.gesture.object(), self.gesture.component())
        };

        routed.object = object;
        routed.component = component;
        routed.node = component.and_then(|c| system.node_of(c));
        self.gesture.set_target(object, component);
        Some(routed)
    }

    /// Route and dispatch a pointer event, returning the routed event.
    ///
    /// Hover re-resolves the viewport without picking; a primary down
    /// re-resolves and picks; everything else reuses the gesture.
    pub fn dispatch_pointer(&mut self, system: &mut dyn RenderSystem, event: PointerEvent) -> Option<RoutedEvent> {
        let (hit_test, pick) = match event.kind {
            PointerKind::Hover => (true, false),
            PointerKind::Down if event.is_primary_down() => (true, true),
            _ => (false, false),
        };
        let mut routed = self.route_event(&*system, InputEvent::Pointer(event), hit_test, pick)?;
        system.on_pointer(&mut routed);
        if !routed.is_propagation_stopped() {
            if let Some(viewport) = self.viewport_mut(routed.viewport) {
                viewport.on_pointer(&mut routed);
            }
        }
        Some(routed)
    }

    /// Route and dispatch a trigger event. Triggers always re-resolve and pick.
    pub fn dispatch_trigger(&mut self, system: &mut dyn RenderSystem, event: TriggerEvent) -> Option<RoutedEvent> {
        let mut routed = self.route_event(&*system, InputEvent::Trigger(event), true, true)?;
        system.on_trigger(&mut routed);
        if !routed.is_propagation_stopped() {
            if let Some(viewport) = self.viewport_mut(routed.viewport) {
                viewport.on_trigger(&mut routed);
            }
        }
        Some(routed)
    }

    /// Returns whether the event was consumed (routed to a viewport).
    pub fn on_pointer(&mut self, system: &mut dyn RenderSystem, event: PointerEvent) -> bool {
        self.dispatch_pointer(system, event).is_some()
    }

    /// Returns whether the event was consumed (routed to a viewport).
    pub fn on_trigger(&mut self, system: &mut dyn RenderSystem, event: TriggerEvent) -> bool {
        self.dispatch_trigger(system, event).is_some()
    }

    // --- Frame ---

    /// Render one frame through every enabled viewport.
    ///
    /// Without an active scene and camera the frame is skipped with a
    /// warning. Returns whether anything was drawn.
    pub fn render(&mut self, system: &mut dyn RenderSystem, renderer: &mut dyn Renderer, dt: f64) -> bool {
        if system.active_scene().is_none() || system.active_camera().is_none() {
            warn!(view = %self.id, "frame skipped: no active scene or camera");
            return false;
        }

        let ctx = RenderContext {
            view: self.id,
            frame: self.frame,
            dt,
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
        };
        system.pre_render(&ctx);

        for (_, viewport) in self.viewports.iter_mut().filter(|(_, vp)| vp.enabled()) {
            viewport.apply_viewport(renderer);
            if let Some(camera) = system.active_camera_mut() {
                viewport.update_camera(camera);
            }
            if let (Some(scene), Some(camera)) = (system.active_scene(), system.active_camera()) {
                renderer.render(scene, camera);
            }
        }

        system.post_render(&ctx);
        self.frame += 1;
        true
    }
}

/// Ask the picker what lies under the event and resolve it to an object and
/// its owning component. Background, a missing scene or camera, and indices
/// the system does not know all resolve to nothing.
fn pick_object(
    picker: &mut dyn Picker,
    viewport: &dyn Viewport,
    system: &dyn RenderSystem,
    routed: &RoutedEvent,
) -> (Option<ObjectId>, Option<ComponentId>) {
    let (Some(scene), Some(camera)) = (system.active_scene(), system.active_camera()) else {
        debug!(view = %routed.view, "pick skipped: no active scene or camera");
        return (None, None);
    };
    let mut camera = *camera;
    viewport.frame_camera(&mut camera);

    let index = picker.pick_index(scene, &camera, routed);
    if index == BACKGROUND_PICK_INDEX {
        return (None, None);
    }
    let Some(object) = system.object_by_index(index) else {
        debug!(view = %routed.view, index, "pick index has no object");
        return (None, None);
    };
    let component = system.owner_of(object);
    debug!(
        view = %routed.view,
        viewport = %routed.viewport,
        index,
        %object,
        component = ?component,
        "picked object"
    );
    (Some(object), component)
}
