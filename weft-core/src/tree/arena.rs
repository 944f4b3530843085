//! Component Arena
//!
//! All component nodes live in one slotmap, addressed by [`NodeId`].
//! Parent/child relationships are id references rather than owned
//! pointers, which keeps the tree acyclic in the ownership sense and
//! makes subtree destruction an explicit bulk operation.
//!
//! The scheduler exclusively owns this structure; nodes are created and
//! destroyed only during a pass.

use slotmap::SlotMap;

use super::node::{ComponentNode, NodeId};

/// The arena of live component nodes plus the root id.
#[derive(Debug, Default)]
pub struct ComponentTree {
    nodes: SlotMap<NodeId, ComponentNode>,
    root: Option<NodeId>,
}

impl ComponentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Insert the root node. The caller guarantees this happens once.
    pub fn insert_root(&mut self, node: ComponentNode) -> NodeId {
        let id = self.nodes.insert(node);
        self.root = Some(id);
        id
    }

    /// Insert a non-root node. The parent's child list is maintained by
    /// the scheduler at commit time, not here.
    pub fn insert(&mut self, node: ComponentNode) -> NodeId {
        self.nodes.insert(node)
    }

    pub fn get(&self, id: NodeId) -> Option<&ComponentNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ComponentNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove a single node without touching its subtree. Used to undo
    /// node creation when a pass aborts.
    pub fn remove_node(&mut self, id: NodeId) {
        self.nodes.remove(id);
        if self.root == Some(id) {
            self.root = None;
        }
    }

    /// Tear down a node and every descendant. Returns how many nodes were
    /// destroyed. State cells and caches die with their nodes; pending
    /// writes addressed to them are dropped when the next pass skips the
    /// missing ids.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        let mut stack = vec![id];
        let mut removed = 0;

        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children().iter().copied());
                removed += 1;
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }
        removed
    }

    /// Mark a node and every ancestor up to the root as dirty.
    pub fn mark_dirty_to_root(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.nodes.get_mut(node_id) {
                Some(node) => {
                    node.mark_dirty();
                    current = node.parent();
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use smallvec::SmallVec;

    use super::*;
    use crate::tree::node::{ChildKey, MemoPolicy, Slots};
    use crate::value::Props;

    fn node(type_name: &str, parent: Option<NodeId>) -> ComponentNode {
        ComponentNode::new(
            Rc::from(type_name),
            ChildKey::Index(0),
            parent,
            MemoPolicy::None,
        )
    }

    /// Build root -> mid -> (leaf_a, leaf_b) with committed child lists.
    fn small_tree(tree: &mut ComponentTree) -> (NodeId, NodeId, NodeId, NodeId) {
        let root = tree.insert_root(node("root", None));
        let mid = tree.insert(node("mid", Some(root)));
        let leaf_a = tree.insert(node("leaf", Some(mid)));
        let leaf_b = tree.insert(node("leaf", Some(mid)));

        tree.get_mut(root).unwrap().commit_render(
            Props::new(),
            Slots::new(),
            SmallVec::from_slice(&[mid]),
        );
        tree.get_mut(mid).unwrap().commit_render(
            Props::new(),
            Slots::new(),
            SmallVec::from_slice(&[leaf_a, leaf_b]),
        );
        (root, mid, leaf_a, leaf_b)
    }

    #[test]
    fn subtree_removal_is_recursive() {
        let mut tree = ComponentTree::new();
        let (root, mid, leaf_a, leaf_b) = small_tree(&mut tree);

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.remove_subtree(mid), 3);

        assert!(tree.contains(root));
        assert!(!tree.contains(mid));
        assert!(!tree.contains(leaf_a));
        assert!(!tree.contains(leaf_b));
    }

    #[test]
    fn removing_root_clears_root_id() {
        let mut tree = ComponentTree::new();
        let (root, ..) = small_tree(&mut tree);

        tree.remove_subtree(root);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn dirty_marking_walks_to_root() {
        let mut tree = ComponentTree::new();
        let (root, mid, leaf_a, leaf_b) = small_tree(&mut tree);

        tree.mark_dirty_to_root(leaf_a);

        assert!(tree.get(leaf_a).unwrap().is_dirty());
        assert!(tree.get(mid).unwrap().is_dirty());
        assert!(tree.get(root).unwrap().is_dirty());
        // Siblings are untouched.
        assert!(!tree.get(leaf_b).unwrap().is_dirty());
    }

    #[test]
    fn remove_node_leaves_descendants() {
        let mut tree = ComponentTree::new();
        let (_, mid, leaf_a, _) = small_tree(&mut tree);

        tree.remove_node(mid);
        assert!(!tree.contains(mid));
        assert!(tree.contains(leaf_a));
    }
}
