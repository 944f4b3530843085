//! Component Nodes
//!
//! A [`ComponentNode`] is one render-function instance bound to props and
//! state. Nodes live in the arena ([`crate::tree::ComponentTree`]) and
//! refer to each other by [`NodeId`]; children are an ordered id list, so
//! there is no cyclic ownership and subtree teardown is a bulk operation
//! over the arena.
//!
//! Each node owns its hook slots: state cells, derived-value entries, and
//! callback entries, keyed by caller-supplied slot keys. Explicit keys
//! (rather than call order) mean conditionally-skipped primitive calls
//! cannot shift slot identity.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::reactive::{CallbackEntry, MemoEntry, StateCell};
use crate::value::{props_equal, Props};

slotmap::new_key_type! {
    /// Opaque arena address of a component node.
    pub struct NodeId;
}

/// The identity a parent assigns to a child descriptor, used to match
/// nodes across passes. Defaults to the child's position among its
/// siblings when no explicit key is supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildKey {
    Index(usize),
    Named(String),
}

impl fmt::Display for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildKey::Index(i) => write!(f, "#{i}"),
            ChildKey::Named(s) => f.write_str(s),
        }
    }
}

/// How a node decides whether parent-supplied props count as changed.
///
/// Memoization only protects against prop-driven re-execution propagated
/// from an ancestor; a state write inside the node always forces
/// re-execution regardless of policy.
#[derive(Clone)]
pub enum MemoPolicy {
    /// Always re-execute when visited.
    None,
    /// Key-by-key shallow comparison against the last committed props.
    ShallowProps,
    /// Caller-supplied predicate; returns `true` when props are
    /// *unchanged* (i.e. the node may bail out).
    Custom(Rc<dyn Fn(&Props, &Props) -> bool>),
}

impl MemoPolicy {
    /// `true` iff the node may skip execution for this prop delta.
    pub fn props_unchanged(&self, last: &Props, next: &Props) -> bool {
        match self {
            MemoPolicy::None => false,
            MemoPolicy::ShallowProps => props_equal(last, next),
            MemoPolicy::Custom(cmp) => cmp(last, next),
        }
    }
}

impl fmt::Debug for MemoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoPolicy::None => f.write_str("None"),
            MemoPolicy::ShallowProps => f.write_str("ShallowProps"),
            MemoPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One hook slot owned by a node.
#[derive(Debug, Clone)]
pub enum Slot {
    State(StateCell),
    Memo(MemoEntry),
    Callback(CallbackEntry),
}

/// The node's ordered slot map, keyed by caller-supplied slot keys.
pub type Slots = IndexMap<String, Slot>;

/// A render-function instance in the tree.
#[derive(Debug)]
pub struct ComponentNode {
    type_name: Rc<str>,
    key: ChildKey,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    /// Props used for the most recent *committed* render; `None` until
    /// the node has executed once.
    last_props: Option<Props>,
    memo: MemoPolicy,
    dirty: bool,
    slots: Slots,
}

impl ComponentNode {
    pub fn new(
        type_name: Rc<str>,
        key: ChildKey,
        parent: Option<NodeId>,
        memo: MemoPolicy,
    ) -> Self {
        Self {
            type_name,
            key,
            parent,
            children: SmallVec::new(),
            last_props: None,
            memo,
            dirty: false,
            slots: Slots::new(),
        }
    }

    pub fn type_name(&self) -> &Rc<str> {
        &self.type_name
    }

    pub fn key(&self) -> &ChildKey {
        &self.key
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn last_props(&self) -> Option<&Props> {
        self.last_props.as_ref()
    }

    pub fn memo_policy(&self) -> &MemoPolicy {
        &self.memo
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn slots(&self) -> &Slots {
        &self.slots
    }

    pub(crate) fn slots_mut(&mut self) -> &mut Slots {
        &mut self.slots
    }

    /// Whether a visit from an executed parent must re-execute this node.
    ///
    /// A node re-executes iff it is dirty (a state write landed in it or
    /// below it), it has never rendered, or its memo policy reports the
    /// incoming props as changed.
    pub fn must_execute(&self, incoming: &Props) -> bool {
        if self.dirty {
            return true;
        }
        match &self.last_props {
            None => true,
            Some(last) => !self.memo.props_unchanged(last, incoming),
        }
    }

    /// Apply a committed render: new props, slots, and child list, and
    /// clear the dirty flag.
    pub(crate) fn commit_render(
        &mut self,
        props: Props,
        slots: Slots,
        children: SmallVec<[NodeId; 4]>,
    ) {
        self.last_props = Some(props);
        self.slots = slots;
        self.children = children;
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    fn leaf(memo: MemoPolicy) -> ComponentNode {
        ComponentNode::new(Rc::from("leaf"), ChildKey::Index(0), None, memo)
    }

    #[test]
    fn unrendered_node_always_executes() {
        let node = leaf(MemoPolicy::ShallowProps);
        assert!(node.must_execute(&props! { "n" => 0 }));
    }

    #[test]
    fn shallow_props_bails_out_on_equal_props() {
        let mut node = leaf(MemoPolicy::ShallowProps);
        node.commit_render(props! { "n" => 0 }, Slots::new(), SmallVec::new());

        assert!(!node.must_execute(&props! { "n" => 0 }));
        assert!(node.must_execute(&props! { "n" => 1 }));
        assert!(node.must_execute(&props! { "n" => 0, "extra" => true }));
    }

    #[test]
    fn policy_none_never_bails_out() {
        let mut node = leaf(MemoPolicy::None);
        node.commit_render(props! { "n" => 0 }, Slots::new(), SmallVec::new());

        assert!(node.must_execute(&props! { "n" => 0 }));
    }

    #[test]
    fn dirty_overrides_memo_policy() {
        let mut node = leaf(MemoPolicy::ShallowProps);
        node.commit_render(props! { "n" => 0 }, Slots::new(), SmallVec::new());
        node.mark_dirty();

        assert!(node.must_execute(&props! { "n" => 0 }));
    }

    #[test]
    fn custom_comparator_is_honored() {
        // Only the "relevant" prop matters to this component.
        let policy = MemoPolicy::Custom(Rc::new(|last: &Props, next: &Props| {
            last.get("relevant") == next.get("relevant")
        }));

        let mut node = leaf(policy);
        node.commit_render(
            props! { "relevant" => 1, "noise" => 0 },
            Slots::new(),
            SmallVec::new(),
        );

        assert!(!node.must_execute(&props! { "relevant" => 1, "noise" => 99 }));
        assert!(node.must_execute(&props! { "relevant" => 2, "noise" => 0 }));
    }

    #[test]
    fn commit_render_clears_dirty() {
        let mut node = leaf(MemoPolicy::None);
        node.mark_dirty();
        assert!(node.is_dirty());

        node.commit_render(Props::new(), Slots::new(), SmallVec::new());
        assert!(!node.is_dirty());
        assert!(node.last_props().is_some());
    }

    #[test]
    fn child_keys_display() {
        assert_eq!(ChildKey::Index(3).to_string(), "#3");
        assert_eq!(ChildKey::Named("row".into()).to_string(), "row");
    }
}
