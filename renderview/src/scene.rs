//! Scene graph: nodes with hierarchical transforms, and the components
//! attached to them.
//!
//! The scene owns every component. A component that carries a renderable
//! mesh is given an [`ObjectId`] when attached; the scene keeps the typed
//! association from that object back to its owning component, which is what
//! pick resolution uses to go from "index under the pointer" to "component
//! and node the user touched".

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Camera;
use crate::component::{Component, UpdateContext};
use crate::error::SceneError;
use crate::geometry::MeshBuffers;
use crate::transform::Transform;

/// Identity of a renderable 3D object.
pub type ObjectId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component#{}", self.0)
    }
}

/// A node in the scene hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    components: Vec<ComponentId>,
    /// Transform relative to the parent (or to the world for roots).
    pub transform: Transform,
}

impl Node {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn components(&self) -> &[ComponentId] {
        &self.components
    }
}

struct Slot {
    node: NodeId,
    object: Option<ObjectId>,
    component: Box<dyn Component>,
}

/// Node arena plus component storage.
#[derive(Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, Node>,
    roots: Vec<NodeId>,
    slots: BTreeMap<ComponentId, Slot>,
    owners: HashMap<ObjectId, ComponentId>,
    next_node: u32,
    next_component: u32,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes)
            .field("roots", &self.roots)
            .field("components", &self.slots.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Nodes ---

    /// Create a node under `parent`, or as a root when `parent` is `None`.
    ///
    /// # Errors
    ///
    /// [`SceneError::NodeNotFound`] if `parent` does not exist.
    pub fn add_node(&mut self, name: impl Into<String>, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            if !self.nodes.contains_key(&p) {
                return Err(SceneError::NodeNotFound(p));
            }
        }
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            Node {
                name: name.into(),
                parent,
                children: Vec::new(),
                components: Vec::new(),
                transform: Transform::IDENTITY,
            },
        );
        self.link(id, parent);
        Ok(id)
    }

    /// Remove a node, its whole subtree, and every component attached to it.
    ///
    /// # Errors
    ///
    /// [`SceneError::NodeNotFound`] if the node does not exist.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), SceneError> {
        let parent = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?.parent;
        self.unlink(id, parent);

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(node) = self.nodes.remove(&next) else {
                continue;
            };
            stack.extend(node.children);
            for component in node.components {
                if let Some(slot) = self.slots.remove(&component) {
                    if let Some(object) = slot.object {
                        self.owners.remove(&object);
                    }
                }
            }
        }
        Ok(())
    }

    /// Move a node under a new parent (or make it a root).
    ///
    /// # Errors
    ///
    /// [`SceneError::NodeNotFound`] if either node is missing, and
    /// [`SceneError::CyclicParent`] if `parent` lies in the subtree of `id`.
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let old_parent = self.nodes.get(&id).ok_or(SceneError::NodeNotFound(id))?.parent;
        if let Some(p) = parent {
            let mut cursor = Some(p);
            while let Some(c) = cursor {
                if c == id {
                    return Err(SceneError::CyclicParent { child: id, parent: p });
                }
                cursor = self.nodes.get(&c).ok_or(SceneError::NodeNotFound(c))?.parent;
            }
        }
        self.unlink(id, old_parent);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = parent;
        }
        self.link(id, parent);
        Ok(())
    }

    fn link(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(p) => p.children.push(id),
            None => self.roots.push(id),
        }
    }

    fn unlink(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent.and_then(|p| self.nodes.get_mut(&p)) {
            Some(p) => p.children.retain(|c| *c != id),
            None => self.roots.retain(|r| *r != id),
        }
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    #[must_use]
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    #[must_use]
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(&id).map(|n| &mut n.transform)
    }

    /// First node with the given name, in creation order.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|(_, n)| n.name == name).map(|(id, _)| *id)
    }

    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World matrix of a node: parent world × local, up to the root.
    #[must_use]
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        world_matrix_in(&self.nodes, id)
    }

    // --- Components ---

    /// Attach a component to a node. Components that own a mesh become
    /// renderable objects.
    ///
    /// # Errors
    ///
    /// [`SceneError::NodeNotFound`] if the node does not exist.
    pub fn add_component<C: Component>(&mut self, node: NodeId, component: C) -> Result<ComponentId, SceneError> {
        let Some(n) = self.nodes.get_mut(&node) else {
            return Err(SceneError::NodeNotFound(node));
        };
        let id = ComponentId(self.next_component);
        self.next_component += 1;
        n.components.push(id);

        let object = component.mesh().map(|_| Uuid::new_v4());
        if let Some(object) = object {
            self.owners.insert(object, id);
        }
        self.slots.insert(id, Slot { node, object, component: Box::new(component) });
        Ok(id)
    }

    /// Detach a component, dropping its object association.
    ///
    /// # Errors
    ///
    /// [`SceneError::ComponentNotFound`] if the component does not exist.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Box<dyn Component>, SceneError> {
        let slot = self.slots.remove(&id).ok_or(SceneError::ComponentNotFound(id))?;
        if let Some(object) = slot.object {
            self.owners.remove(&object);
        }
        if let Some(node) = self.nodes.get_mut(&slot.node) {
            node.components.retain(|c| *c != id);
        }
        Ok(slot.component)
    }

    #[must_use]
    pub fn component<T: Component>(&self, id: ComponentId) -> Option<&T> {
        let any: &dyn Any = self.slots.get(&id)?.component.as_ref();
        any.downcast_ref::<T>()
    }

    #[must_use]
    pub fn component_mut<T: Component>(&mut self, id: ComponentId) -> Option<&mut T> {
        let any: &mut dyn Any = self.slots.get_mut(&id)?.component.as_mut();
        any.downcast_mut::<T>()
    }

    /// Every component of type `T`, in attachment order.
    pub fn components_mut<T: Component>(&mut self) -> impl Iterator<Item = (ComponentId, &mut T)> {
        self.slots.iter_mut().filter_map(|(id, slot)| {
            let any: &mut dyn Any = slot.component.as_mut();
            any.downcast_mut::<T>().map(|c| (*id, c))
        })
    }

    #[must_use]
    pub fn dyn_component(&self, id: ComponentId) -> Option<&dyn Component> {
        self.slots.get(&id).map(|s| s.component.as_ref())
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.slots.len()
    }

    // --- Object ownership ---

    /// Component that owns a renderable object.
    #[must_use]
    pub fn owner_of(&self, object: ObjectId) -> Option<ComponentId> {
        self.owners.get(&object).copied()
    }

    /// Node a component is attached to.
    #[must_use]
    pub fn node_of(&self, component: ComponentId) -> Option<NodeId> {
        self.slots.get(&component).map(|s| s.node)
    }

    /// Renderable object of a component, if it has one.
    #[must_use]
    pub fn object_of(&self, component: ComponentId) -> Option<ObjectId> {
        self.slots.get(&component).and_then(|s| s.object)
    }

    /// Renderable objects with their owning components, in attachment order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, ComponentId)> + '_ {
        self.slots.iter().filter_map(|(id, slot)| slot.object.map(|o| (o, *id)))
    }

    /// Mesh of a renderable object.
    #[must_use]
    pub fn mesh_of(&self, object: ObjectId) -> Option<&MeshBuffers> {
        let owner = self.owners.get(&object)?;
        self.slots.get(owner)?.component.mesh()
    }

    // --- Frame ---

    /// Run every component's update step with its node's world matrix.
    pub fn update(&mut self, camera: Option<&Camera>, canvas_width: f64, canvas_height: f64, dt: f64) {
        let nodes = &self.nodes;
        for slot in self.slots.values_mut() {
            let world = world_matrix_in(nodes, slot.node).unwrap_or(Mat4::IDENTITY);
            let ctx = UpdateContext { world, camera, canvas_width, canvas_height, dt };
            slot.component.update(&ctx);
        }
    }
}

fn world_matrix_in(nodes: &BTreeMap<NodeId, Node>, id: NodeId) -> Option<Mat4> {
    let node = nodes.get(&id)?;
    let mut world = node.transform.matrix();
    let mut cursor = node.parent;
    while let Some(parent_id) = cursor {
        let Some(parent) = nodes.get(&parent_id) else {
            break;
        };
        world = parent.transform.matrix() * world;
        cursor = parent.parent;
    }
    Some(world)
}
