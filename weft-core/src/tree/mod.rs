//! Component Tree
//!
//! The tree of live component instances, modeled as an arena of nodes
//! addressed by opaque id with children stored as ordered id lists:
//!
//! - No cyclic ownership: parent/child relationships are ids, so subtree
//!   teardown is an explicit bulk operation over the arena.
//! - Identity across passes: a child is matched to an existing node by
//!   its key (explicit, or positional by default) and component type.
//!   Matched nodes carry their state cells and caches forward; unmatched
//!   descriptors create fresh nodes; disappeared keys destroy subtrees.
//!
//! The scheduler exclusively owns this structure and mutates it only
//! while a pass is running.

mod arena;
mod node;
mod output;

pub use arena::ComponentTree;
pub use node::{ChildKey, ComponentNode, MemoPolicy, NodeId, Slot, Slots};
pub use output::{ChildSpec, RenderOutput};
