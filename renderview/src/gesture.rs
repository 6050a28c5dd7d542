//! Sticky routing state for one view.
//!
//! A pointer-down resolves a viewport and picks an object; the moves and the
//! up that follow reuse both without re-testing, so a drag stays attached to
//! what it started on even when the pointer leaves the object.

use crate::scene::{ComponentId, ObjectId};
use crate::viewport::ViewportId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    viewport: Option<ViewportId>,
    object: Option<ObjectId>,
    component: Option<ComponentId>,
}

impl GestureState {
    #[must_use]
    pub fn viewport(&self) -> Option<ViewportId> {
        self.viewport
    }

    #[must_use]
    pub fn object(&self) -> Option<ObjectId> {
        self.object
    }

    #[must_use]
    pub fn component(&self) -> Option<ComponentId> {
        self.component
    }

    /// Start of a hit test: no viewport owns the gesture until one matches.
    pub(crate) fn clear_viewport(&mut self) {
        self.viewport = None;
    }

    pub(crate) fn set_viewport(&mut self, viewport: ViewportId) {
        self.viewport = Some(viewport);
    }

    pub(crate) fn set_target(&mut self, object: Option<ObjectId>, component: Option<ComponentId>) {
        self.object = object;
        self.component = component;
    }

    /// Drop everything if `viewport` owns the current gesture.
    pub(crate) fn forget_viewport(&mut self, viewport: ViewportId) {
        if self.viewport == Some(viewport) {
            *self = Self::default();
        }
    }
}
