//! Render graph: one renderable node per scene object.
//!
//! The graph subscribes to the [`SceneRegistry`](crate::scene::SceneRegistry)
//! and mirrors it. Each node caches what the renderer, picker and framing
//! code need: the world-space mesh and its bounds. Nodes
//! are rebuilt whole on every `Updated` event; objects are small.

#[cfg(test)]
#[path = "graph_test.rs"]
mod graph_test;

use crate::bounds::Aabb;
use crate::geometry::{GeometryKind, Mesh};
use crate::scene::{Material, ObjectId, SceneEvent, SceneObject, SceneObserver};

/// A renderable node.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: ObjectId,
    pub kind: GeometryKind,
    /// Mesh with every vertex already in world space.
    pub mesh: Mesh,
    pub bounds: Aabb,
    pub material: Material,
}

impl Node {
    #[must_use]
    pub fn from_object(object: &SceneObject) -> Self {
        let world = object.world_matrix();
        let mesh = object.params.mesh().transformed(&world);
        let bounds = mesh.bounds();
        Self { id: object.id, kind: object.kind(), mesh, bounds, material: object.material }
    }
}

/// The set of nodes, in registry order.
#[derive(Debug, Default)]
pub struct RenderGraph {
    nodes: Vec<Node>,
}

impl RenderGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: ObjectId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Union of every node's world bounds. Empty when there are no nodes.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        self.nodes.iter().fold(Aabb::EMPTY, |acc, n| acc.union(n.bounds))
    }

    fn attach(&mut self, object: &SceneObject) {
        let node = Node::from_object(object);
        match self.nodes.iter_mut().find(|n| n.id == object.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    fn detach(&mut self, id: ObjectId) {
        self.nodes.retain(|n| n.id != id);
    }
}

impl SceneObserver for RenderGraph {
    fn on_scene_event(&mut self, event: SceneEvent<'_>) {
        match event {
            SceneEvent::Added(object) | SceneEvent::Updated(object) => self.attach(object),
            SceneEvent::Removed(id) => self.detach(id),
            SceneEvent::Cleared => self.nodes.clear(),
        }
    }
}
