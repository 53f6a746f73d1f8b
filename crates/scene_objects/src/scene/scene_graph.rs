//! Scene graph trait and implementations
//!
//! Provides the node hierarchy scene objects attach to.

use crate::foundation::math::Transform;
use crate::{SceneError, SceneResult};
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Handle to a node in a scene graph
    pub struct NodeId;
}

/// Trait for node hierarchies used by scene objects
///
/// Allows pluggable scene graph implementations; the object layer only needs
/// node creation, parenting, subtree cloning and removal.
pub trait SceneGraph {
    /// The root node every other node ultimately hangs from
    fn root(&self) -> NodeId;

    /// Create a detached node
    fn create_node(&mut self, name: &str) -> NodeId;

    /// Attach `child` under `parent`, detaching it from any previous parent
    fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()>;

    /// Remove `node` and its whole subtree
    fn remove_node(&mut self, node: NodeId) -> SceneResult<()>;

    /// Deep-copy the subtree rooted at `node`; the copy starts detached
    fn clone_subtree(&mut self, node: NodeId) -> SceneResult<NodeId>;

    /// Parent of `node`, if attached
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of `node` in attachment order (empty for unknown nodes)
    fn children(&self, node: NodeId) -> &[NodeId];

    /// Node name
    fn name(&self, node: NodeId) -> Option<&str>;

    /// Local transform of `node`
    fn transform(&self, node: NodeId) -> Option<&Transform>;

    /// Mutable local transform of `node`
    fn transform_mut(&mut self, node: NodeId) -> Option<&mut Transform>;

    /// Whether `node` is a live node of this graph
    fn contains(&self, node: NodeId) -> bool;

    /// Total number of nodes, including the root
    fn node_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct SceneNode {
    name: String,
    transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            transform: Transform::default(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Slot-map backed node hierarchy
#[derive(Debug)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
}

impl NodeTree {
    /// Create a tree holding only a root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new("root"));
        Self { nodes, root }
    }

    /// Path of node names from the root down to `node`, e.g. `root/player/skeleton`
    pub fn path(&self, node: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            let entry = self.nodes.get(id)?;
            names.push(entry.name.as_str());
            current = entry.parent;
        }
        names.reverse();
        Some(names.join("/"))
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get_mut(node).and_then(|entry| entry.parent.take()) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|child| *child != node);
        }
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|entry| entry.parent);
        }
        false
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph for NodeTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn create_node(&mut self, name: &str) -> NodeId {
        self.nodes.insert(SceneNode::new(name))
    }

    fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(SceneError::UnknownNode(child));
        }
        if child == self.root {
            return Err(SceneError::InvalidHierarchy("the root node cannot be reparented".into()));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::InvalidHierarchy(format!(
                "attaching '{}' under '{}' would create a cycle",
                self.nodes[child].name, self.nodes[parent].name
            )));
        }

        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    fn remove_node(&mut self, node: NodeId) -> SceneResult<()> {
        if node == self.root {
            return Err(SceneError::InvalidHierarchy("the root node cannot be removed".into()));
        }
        if !self.nodes.contains_key(node) {
            return Err(SceneError::UnknownNode(node));
        }

        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.remove(id) {
                stack.extend(removed.children);
            }
        }
        Ok(())
    }

    fn clone_subtree(&mut self, node: NodeId) -> SceneResult<NodeId> {
        let source = self.nodes.get(node).ok_or(SceneError::UnknownNode(node))?;
        let mut copy = source.clone();
        copy.parent = None;
        copy.children.clear();
        let copy_root = self.nodes.insert(copy);

        // (source, copied parent) pairs still to visit
        let mut stack: Vec<(NodeId, NodeId)> = self.nodes[node]
            .children
            .iter()
            .rev()
            .map(|child| (*child, copy_root))
            .collect();
        while let Some((source, parent)) = stack.pop() {
            let mut copy = self.nodes[source].clone();
            let grandchildren = std::mem::take(&mut copy.children);
            copy.parent = Some(parent);
            let copied = self.nodes.insert(copy);
            self.nodes[parent].children.push(copied);
            stack.extend(grandchildren.iter().rev().map(|child| (*child, copied)));
        }
        Ok(copy_root)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|entry| entry.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        match self.nodes.get(node) {
            Some(entry) => &entry.children,
            None => &[],
        }
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|entry| entry.name.as_str())
    }

    fn transform(&self, node: NodeId) -> Option<&Transform> {
        self.nodes.get(node).map(|entry| &entry.transform)
    }

    fn transform_mut(&mut self, node: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(node).map(|entry| &mut entry.transform)
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
