//! Render Scheduler
//!
//! The engine walks the component tree on each batch of state writes and
//! re-executes exactly the nodes that need it. One pass follows the state
//! machine `Idle → Scheduled → Running → Committed → Idle`:
//!
//! 1. Drain the write queue and apply final values to their state cells,
//!    marking each written node and its ancestor chain dirty.
//! 2. Walk the tree depth-first, pre-order, from the root. A visited node
//!    re-executes iff it is dirty or its memo policy reports the props
//!    supplied by its (already re-executed) parent as changed. A node
//!    that bails out is skipped and not recursed into; memo bail-out
//!    prunes the whole subtree.
//! 3. An executed node's declared child list is reconciled by key
//!    against the previous pass: matched keys (same component type) reuse
//!    the existing node with its state and caches; new keys create fresh
//!    nodes; disappeared keys destroy their subtrees.
//! 4. Commit: render results (props, slots, child lists) staged during
//!    the walk are applied, orphaned subtrees are destroyed, and writes
//!    that landed mid-pass schedule the next pass.
//!
//! # Failure Semantics
//!
//! A failing render function aborts the pass atomically. Nothing staged
//! is applied, nodes created mid-pass are removed again, and deferred
//! destruction means no committed node was lost: the tree is exactly at
//! its last committed state and stays usable. The engine never retries
//! on its own.
//!
//! # Concurrency
//!
//! Strictly single-threaded and synchronous. Exactly one pass runs at a
//! time, passes are serialized, and a pass is deterministic given the
//! same writes: same dirty set, same visitation order, same trace output.
//! Asynchronous work lives outside the engine and re-enters it by
//! performing a state write, which schedules the next pass.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::EngineError;
use crate::reactive::{PendingWrite, Phase, RenderContext, WriteQueue};
use crate::registry::{ComponentRegistry, RenderFn};
use crate::trace::{RenderEvent, SharedSink};
use crate::tree::{
    ChildKey, ChildSpec, ComponentNode, ComponentTree, NodeId, Slot, Slots,
};
use crate::value::Props;

/// A render result staged during the walk, applied only on commit.
struct StagedNode {
    last_props: Props,
    slots: Slots,
    children: SmallVec<[NodeId; 4]>,
}

/// Everything a pass accumulates before commit or rollback.
#[derive(Default)]
struct PassState {
    staged: HashMap<NodeId, StagedNode>,
    /// Nodes created this pass; removed again if the pass aborts.
    created: Vec<NodeId>,
    /// Nodes whose keys disappeared; their subtrees are destroyed at
    /// commit. Deferring destruction is what makes abort loss-free.
    orphaned: Vec<NodeId>,
}

/// The reactive rendering engine: component tree, scheduler, and the
/// write queue that external callbacks feed.
pub struct Engine {
    tree: ComponentTree,
    registry: ComponentRegistry,
    sink: SharedSink,
    queue: Rc<WriteQueue>,
    root_props: Props,
    passes: u64,
}

impl Engine {
    pub fn new(registry: ComponentRegistry, sink: SharedSink) -> Self {
        Self {
            tree: ComponentTree::new(),
            registry,
            sink,
            queue: WriteQueue::new(),
            root_props: Props::new(),
            passes: 0,
        }
    }

    /// Create the root node and run the initial pass.
    pub fn mount(&mut self, root_type: &str, props: Props) -> Result<(), EngineError> {
        if self.tree.root().is_some() {
            return Err(EngineError::AlreadyMounted);
        }
        let memo = self
            .registry
            .get(root_type)
            .map(|spec| spec.memo.clone())
            .ok_or_else(|| EngineError::UnknownComponent(root_type.to_string()))?;

        let root = ComponentNode::new(Rc::from(root_type), ChildKey::Index(0), None, memo);
        self.tree.insert_root(root);
        self.root_props = props;

        self.queue.set_phase(Phase::Scheduled);
        if let Err(err) = self.flush() {
            self.unmount_uncommitted_root();
            return Err(err);
        }
        Ok(())
    }

    /// If the root never reached a committed render, `mount` failed before
    /// anything was committed: tear the root down and leave the engine as
    /// if `mount` had not been called, so the caller can mount again.
    fn unmount_uncommitted_root(&mut self) {
        let uncommitted = self
            .tree
            .root()
            .and_then(|id| self.tree.get(id))
            .is_some_and(|node| node.last_props().is_none());
        if !uncommitted {
            return;
        }
        if let Some(root) = self.tree.root() {
            self.tree.remove_subtree(root);
        }
        self.root_props = Props::new();
        self.queue.drain();
        self.queue.set_phase(Phase::Idle);
    }

    /// Run scheduled passes until the engine is idle. Returns how many
    /// passes ran. All writes issued before the call collapse into the
    /// first pass; writes issued by render functions mid-pass run in
    /// follow-up passes before this returns.
    pub fn flush(&mut self) -> Result<usize, EngineError> {
        let mut ran = 0;
        while self.queue.phase() == Phase::Scheduled {
            self.run_pass()?;
            ran += 1;
        }
        Ok(ran)
    }

    /// The pass state machine's current phase.
    pub fn phase(&self) -> Phase {
        self.queue.phase()
    }

    /// Number of live component nodes.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Number of committed passes since creation.
    pub fn committed_passes(&self) -> u64 {
        self.passes
    }

    /// One synchronous pass: apply writes, walk, commit or roll back.
    fn run_pass(&mut self) -> Result<(), EngineError> {
        self.queue.set_phase(Phase::Running);
        let writes = self.queue.drain();
        debug!(pass = self.passes, writes = writes.len(), "render pass starting");
        self.apply_writes(writes);

        let Some(root) = self.tree.root() else {
            // Writes can arrive for an unmounted tree; nothing to render.
            self.queue.set_phase(Phase::Idle);
            return Ok(());
        };

        let mut pass = PassState::default();
        let mut ancestry: Vec<Rc<str>> = Vec::new();
        let result = self.render_node(root, self.root_props.clone(), 0, &mut ancestry, &mut pass);

        match result {
            Ok(()) => {
                self.queue.set_phase(Phase::Committed);
                self.commit(pass);
                self.passes += 1;
                self.settle_phase();
                Ok(())
            }
            Err(err) => {
                self.rollback(pass);
                debug!(error = %err, "render pass aborted");
                self.settle_phase();
                Err(err)
            }
        }
    }

    /// `Committed → Idle`, unless mid-pass writes already scheduled the
    /// next pass.
    fn settle_phase(&self) {
        let next = if self.queue.is_empty() {
            Phase::Idle
        } else {
            Phase::Scheduled
        };
        self.queue.set_phase(next);
    }

    /// Apply one batch of writes. Each cell takes the final value of its
    /// queued writes before the walk begins, so every read within the
    /// pass observes one consistent `(value, version)` pair. Writes to
    /// nodes destroyed since they were issued are dropped.
    fn apply_writes(&mut self, writes: Vec<PendingWrite>) {
        for write in writes {
            let applied = match self.tree.get_mut(write.node) {
                None => false,
                Some(node) => match node.slots_mut().get_mut(&write.slot) {
                    Some(Slot::State(cell)) => {
                        cell.apply(write.op);
                        true
                    }
                    _ => false,
                },
            };
            if applied {
                self.tree.mark_dirty_to_root(write.node);
            } else {
                trace!(slot = %write.slot, "dropping write to unmounted state cell");
            }
        }
    }

    /// Visit one node in the depth-first, pre-order walk.
    fn render_node(
        &mut self,
        id: NodeId,
        incoming: Props,
        depth: usize,
        ancestry: &mut Vec<Rc<str>>,
        pass: &mut PassState,
    ) -> Result<(), EngineError> {
        let (type_name, must_execute, committed_slots, old_children) = {
            let Some(node) = self.tree.get(id) else {
                return Ok(());
            };
            (
                node.type_name().clone(),
                node.must_execute(&incoming),
                node.slots().clone(),
                node.children().to_vec(),
            )
        };

        if !must_execute {
            trace!(node = %type_name, depth, "memo bail-out, pruning subtree");
            return Ok(());
        }

        let render: RenderFn = self
            .registry
            .get(&type_name)
            .map(|spec| spec.render.clone())
            .ok_or_else(|| EngineError::UnknownComponent(type_name.to_string()))?;

        let label = type_name.to_string();
        self.sink
            .borrow_mut()
            .append(RenderEvent::new(label.clone(), depth));
        trace!(node = %label, depth, "executing render function");

        let mut working_slots = committed_slots;
        let output = {
            let mut ctx = RenderContext::new(
                id,
                &label,
                depth,
                &mut working_slots,
                &self.queue,
                &self.sink,
            );
            render(&incoming, &mut ctx)
        };
        let output = match output {
            Ok(out) => out,
            // Hook-surface errors pass through unwrapped; anything else is
            // a render-function failure.
            Err(err) => {
                return Err(match err.downcast::<EngineError>() {
                    Ok(engine_err) => *engine_err,
                    Err(other) => EngineError::RenderFunction {
                        label,
                        source: other,
                    },
                })
            }
        };

        let specs = self.validate_children(&type_name, &label, ancestry, output.into_children())?;
        let new_children = self.reconcile_children(id, &old_children, &specs, pass);

        pass.staged.insert(
            id,
            StagedNode {
                last_props: incoming,
                slots: working_slots,
                children: new_children.clone(),
            },
        );

        ancestry.push(type_name);
        for (child_id, (_, spec)) in new_children.iter().zip(specs.into_iter()) {
            self.render_node(*child_id, spec.props, depth + 1, ancestry, pass)?;
        }
        ancestry.pop();
        Ok(())
    }

    /// Resolve keys and reject invalid child lists before the tree is
    /// mutated: sibling key collisions, unregistered types, and
    /// descriptors that would make a component its own ancestor.
    fn validate_children(
        &self,
        parent_type: &Rc<str>,
        parent_label: &str,
        ancestry: &[Rc<str>],
        children: Vec<ChildSpec>,
    ) -> Result<Vec<(ChildKey, ChildSpec)>, EngineError> {
        let mut seen = HashSet::with_capacity(children.len());
        let mut specs = Vec::with_capacity(children.len());

        for (index, spec) in children.into_iter().enumerate() {
            let key = match &spec.key {
                Some(name) => ChildKey::Named(name.clone()),
                None => ChildKey::Index(index),
            };
            if !seen.insert(key.clone()) {
                return Err(EngineError::KeyCollision {
                    parent: parent_label.to_string(),
                    key: key.to_string(),
                });
            }
            if spec.type_name.as_str() == parent_type.as_ref()
                || ancestry.iter().any(|t| t.as_ref() == spec.type_name.as_str())
            {
                return Err(EngineError::Cycle {
                    type_name: spec.type_name.clone(),
                });
            }
            if !self.registry.contains(&spec.type_name) {
                return Err(EngineError::UnknownComponent(spec.type_name.clone()));
            }
            specs.push((key, spec));
        }
        Ok(specs)
    }

    /// Match declared children against the previous pass's child list by
    /// key. Identity is key + component type: a matched key with a
    /// different type gets a fresh node and the old one is orphaned.
    fn reconcile_children(
        &mut self,
        parent: NodeId,
        old_children: &[NodeId],
        specs: &[(ChildKey, ChildSpec)],
        pass: &mut PassState,
    ) -> SmallVec<[NodeId; 4]> {
        let mut previous: HashMap<ChildKey, NodeId> = old_children
            .iter()
            .filter_map(|&cid| self.tree.get(cid).map(|child| (child.key().clone(), cid)))
            .collect();

        let mut new_children = SmallVec::with_capacity(specs.len());
        for (key, spec) in specs {
            let mut reused = None;
            if let Some(old_id) = previous.remove(key) {
                let same_type = self
                    .tree
                    .get(old_id)
                    .map(|n| n.type_name().as_ref() == spec.type_name.as_str())
                    .unwrap_or(false);
                if same_type {
                    reused = Some(old_id);
                } else {
                    pass.orphaned.push(old_id);
                }
            }

            let child_id = reused.unwrap_or_else(|| {
                let memo = self
                    .registry
                    .get(&spec.type_name)
                    .map(|s| s.memo.clone())
                    .expect("child type validated against registry");
                let node = ComponentNode::new(
                    Rc::from(spec.type_name.as_str()),
                    key.clone(),
                    Some(parent),
                    memo,
                );
                let new_id = self.tree.insert(node);
                pass.created.push(new_id);
                new_id
            });
            new_children.push(child_id);
        }

        // Previously-present keys with no descriptor this pass.
        pass.orphaned.extend(previous.into_values());
        new_children
    }

    /// Apply every staged render and destroy orphaned subtrees.
    fn commit(&mut self, pass: PassState) {
        let executed = pass.staged.len();
        for (id, staged) in pass.staged {
            if let Some(node) = self.tree.get_mut(id) {
                node.commit_render(staged.last_props, staged.slots, staged.children);
            }
        }

        let mut destroyed = 0;
        for orphan in pass.orphaned {
            destroyed += self.tree.remove_subtree(orphan);
        }
        debug!(executed, destroyed, "render pass committed");
    }

    /// Undo node creation; staged results are simply dropped. Committed
    /// nodes, including would-be orphans, are untouched.
    fn rollback(&mut self, pass: PassState) {
        for id in pass.created {
            self.tree.remove_node(id);
        }
    }
}
