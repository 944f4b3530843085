//! State Cells and the Write Queue
//!
//! A [`StateCell`] is a single unit of owned, mutable data with a
//! monotonic version counter. Cells live in their owning component's slot
//! map and are destroyed with it.
//!
//! Writes never mutate a cell directly. A [`StateSetter`] pushes a
//! [`PendingWrite`] onto the engine's shared [`WriteQueue`], which:
//!
//! 1. Batches: every write issued before the next pass begins lands in
//!    one queue drain, so one pass runs and each cell is read at its
//!    final value.
//! 2. Serializes: writes issued during a pass stay queued and are merged
//!    into the next pass rather than interrupting the current one.
//! 3. Schedules: the first write transitions the pass phase to
//!    `Scheduled`; repeated writes are idempotent.
//!
//! The queue also carries the pass state machine ([`Phase`]). Setters
//! have no access to the engine itself; they request a pass through the
//! queue.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::error::EngineError;
use crate::tree::NodeId;
use crate::value::Value;

/// The pass state machine: `Idle → Scheduled → Running → Committed → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No pass requested.
    Idle,
    /// At least one write is pending; a pass will run on the next flush.
    Scheduled,
    /// A pass is executing. Writes issued now target the *next* pass.
    Running,
    /// Transient: the walk finished and results are being applied.
    Committed,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

/// A single unit of owned, mutable state.
#[derive(Debug, Clone)]
pub struct StateCell {
    value: Value,
    version: u64,
}

impl StateCell {
    pub fn new(initial: Value) -> Self {
        Self {
            value: initial,
            version: 0,
        }
    }

    /// Read the current value. No side effect.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Monotonic mutation counter; strictly increases on every write.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply one write operation, bumping the version.
    pub(crate) fn apply(&mut self, op: WriteOp) {
        self.value = match op {
            WriteOp::Set(value) => value,
            WriteOp::Update(f) => f(&self.value),
        };
        self.version += 1;
    }
}

/// A queued mutation: either a replacement value or a function of the
/// current value.
pub(crate) enum WriteOp {
    Set(Value),
    Update(Box<dyn FnOnce(&Value) -> Value>),
}

impl std::fmt::Debug for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOp::Set(v) => f.debug_tuple("Set").field(v).finish(),
            WriteOp::Update(_) => f.write_str("Update(..)"),
        }
    }
}

/// A write waiting for the next pass, addressed by owner node and slot key.
#[derive(Debug)]
pub(crate) struct PendingWrite {
    pub node: NodeId,
    pub slot: String,
    pub op: WriteOp,
}

/// The shared write queue and pass phase.
///
/// Owned by the engine; setters hold a `Weak` reference so a callback
/// that outlives the engine reports [`EngineError::StaleContext`] instead
/// of writing into nothing.
#[derive(Debug, Default)]
pub(crate) struct WriteQueue {
    writes: RefCell<Vec<PendingWrite>>,
    phase: Cell<Phase>,
}

impl WriteQueue {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            writes: RefCell::new(Vec::new()),
            phase: Cell::new(Phase::Idle),
        })
    }

    /// Enqueue a write and request a pass.
    ///
    /// Idempotent with respect to scheduling: `Idle`/`Committed` move to
    /// `Scheduled`, `Scheduled` stays, and `Running` is left alone. The
    /// engine re-checks the queue when the current pass commits.
    pub fn push(&self, write: PendingWrite) {
        self.writes.borrow_mut().push(write);
        match self.phase.get() {
            Phase::Idle | Phase::Committed => self.phase.set(Phase::Scheduled),
            Phase::Scheduled | Phase::Running => {}
        }
    }

    /// Take every pending write, in issue order.
    pub fn drain(&self) -> Vec<PendingWrite> {
        std::mem::take(&mut *self.writes.borrow_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.writes.borrow().is_empty()
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn set_phase(&self, phase: Phase) {
        self.phase.set(phase);
    }
}

/// The write half of a state cell, as handed out by
/// [`crate::reactive::RenderContext::use_state`].
///
/// Cloneable and cheap; typically captured by event callbacks. Writing
/// never takes effect immediately; it schedules the next pass.
#[derive(Debug, Clone)]
pub struct StateSetter {
    node: NodeId,
    slot: String,
    queue: Weak<WriteQueue>,
}

impl StateSetter {
    pub(crate) fn new(node: NodeId, slot: String, queue: &Rc<WriteQueue>) -> Self {
        Self {
            node,
            slot,
            queue: Rc::downgrade(queue),
        }
    }

    /// Replace the cell's value on the next pass.
    pub fn set(&self, value: impl Into<Value>) -> Result<(), EngineError> {
        self.push(WriteOp::Set(value.into()))
    }

    /// Transform the cell's value on the next pass. The function sees the
    /// final value of any writes queued before it.
    pub fn update(
        &self,
        f: impl FnOnce(&Value) -> Value + 'static,
    ) -> Result<(), EngineError> {
        self.push(WriteOp::Update(Box::new(f)))
    }

    fn push(&self, op: WriteOp) -> Result<(), EngineError> {
        let queue = self.queue.upgrade().ok_or(EngineError::StaleContext)?;
        queue.push(PendingWrite {
            node: self.node,
            slot: self.slot.clone(),
            op,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_id() -> NodeId {
        // Slotmap keys are only mintable through a map.
        let mut map = slotmap::SlotMap::<NodeId, ()>::with_key();
        map.insert(())
    }

    #[test]
    fn cell_version_strictly_increases() {
        let mut cell = StateCell::new(Value::Int(0));
        assert_eq!(cell.version(), 0);

        cell.apply(WriteOp::Set(Value::Int(5)));
        assert_eq!(cell.version(), 1);
        assert_eq!(cell.value(), &Value::Int(5));

        // Writing the same value still bumps the version.
        cell.apply(WriteOp::Set(Value::Int(5)));
        assert_eq!(cell.version(), 2);
    }

    #[test]
    fn update_op_sees_current_value() {
        let mut cell = StateCell::new(Value::Int(10));
        cell.apply(WriteOp::Update(Box::new(|v| {
            Value::Int(v.as_int().unwrap() + 1)
        })));
        assert_eq!(cell.value(), &Value::Int(11));
    }

    #[test]
    fn first_write_schedules_a_pass() {
        let queue = WriteQueue::new();
        assert_eq!(queue.phase(), Phase::Idle);

        let setter = StateSetter::new(node_id(), "n".into(), &queue);
        setter.set(1).unwrap();
        assert_eq!(queue.phase(), Phase::Scheduled);

        // Repeated writes do not create additional passes.
        setter.set(2).unwrap();
        assert_eq!(queue.phase(), Phase::Scheduled);
        assert_eq!(queue.drain().len(), 2);
    }

    #[test]
    fn write_during_running_does_not_reenter() {
        let queue = WriteQueue::new();
        let setter = StateSetter::new(node_id(), "n".into(), &queue);

        queue.set_phase(Phase::Running);
        setter.set(1).unwrap();

        // The current pass is not interrupted; the write stays queued.
        assert_eq!(queue.phase(), Phase::Running);
        assert!(!queue.is_empty());
    }

    #[test]
    fn setter_outliving_queue_is_stale() {
        let queue = WriteQueue::new();
        let setter = StateSetter::new(node_id(), "n".into(), &queue);
        drop(queue);

        assert!(matches!(setter.set(1), Err(EngineError::StaleContext)));
    }

    #[test]
    fn drain_preserves_issue_order() {
        let queue = WriteQueue::new();
        let setter = StateSetter::new(node_id(), "n".into(), &queue);

        setter.set(1).unwrap();
        setter.update(|v| Value::Int(v.as_int().unwrap() * 10)).unwrap();

        let writes = queue.drain();
        assert_eq!(writes.len(), 2);
        assert!(matches!(writes[0].op, WriteOp::Set(_)));
        assert!(matches!(writes[1].op, WriteOp::Update(_)));
        assert!(queue.is_empty());
    }
}
