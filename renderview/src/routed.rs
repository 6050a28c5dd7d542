//! The event handed to the render system and to the owning viewport.

use serde::Serialize;

use crate::event::{InputEvent, Point, PointerEvent, TriggerEvent};
use crate::scene::{ComponentId, NodeId, ObjectId};
use crate::view::ViewId;
use crate::viewport::ViewportId;

/// An input event resolved against a view.
///
/// Always carries the viewport that owns it. Object, component and node are
/// present only when something (other than the background) was picked,
/// either by this event or by the pointer-down that started the gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedEvent {
    pub input: InputEvent,
    pub view: ViewId,
    pub viewport: ViewportId,
    /// Device (NDC) coordinates within the viewport, `y` up.
    pub device: Point,
    pub object: Option<ObjectId>,
    pub component: Option<ComponentId>,
    pub node: Option<NodeId>,
    propagation_stopped: bool,
}

impl RoutedEvent {
    #[must_use]
    pub fn new(input: InputEvent, view: ViewId, viewport: ViewportId, device: Point) -> Self {
        Self {
            input,
            view,
            viewport,
            device,
            object: None,
            component: None,
            node: None,
            propagation_stopped: false,
        }
    }

    /// Keep the event from reaching the viewport.
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    #[must_use]
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }

    #[must_use]
    pub fn pointer(&self) -> Option<&PointerEvent> {
        match &self.input {
            InputEvent::Pointer(ev) => Some(ev),
            InputEvent::Trigger(_) => None,
        }
    }

    #[must_use]
    pub fn trigger(&self) -> Option<&TriggerEvent> {
        match &self.input {
            InputEvent::Trigger(ev) => Some(ev),
            InputEvent::Pointer(_) => None,
        }
    }
}
