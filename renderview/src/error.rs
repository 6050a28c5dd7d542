//! Error types for the view and scene layers.
//!
//! Missing render prerequisites (no scene, no camera) are not errors: they
//! degrade to "nothing picked" or a skipped frame. The variants here cover
//! requests that name something that does not exist, which is a caller bug.

use crate::scene::{ComponentId, NodeId};
use crate::viewport::ViewportId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("viewport {0} is not registered with this view")]
    ViewportNotFound(ViewportId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),
    #[error("component {0} does not exist")]
    ComponentNotFound(ComponentId),
    #[error("cannot parent node {child} under its own descendant {parent}")]
    CyclicParent { child: NodeId, parent: NodeId },
}
