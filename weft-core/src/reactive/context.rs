//! Render Context
//!
//! The only API surface a render function may call. A [`RenderContext`]
//! is created by the scheduler for one node execution and threaded into
//! the render call as an explicit parameter; it borrows the node's
//! working slot map for exactly that execution, so it cannot escape the
//! call or be used re-entrantly. There is deliberately no ambient
//! "current component" global.
//!
//! Slots are addressed by caller-supplied string keys. A key identifies
//! one primitive call site for the node's lifetime; reusing a key for a
//! different primitive kind is a programmer error.

use std::rc::Rc;

use crate::error::EngineError;
use crate::trace::{RenderEvent, SharedSink};
use crate::tree::{NodeId, Slot, Slots};
use crate::value::{CallbackRef, Deps, Value};

use super::callback::CallbackEntry;
use super::memo::MemoEntry;
use super::state::{StateCell, StateSetter, WriteQueue};

/// The per-execution hook surface handed to a render function.
pub struct RenderContext<'a> {
    node: NodeId,
    label: &'a str,
    depth: usize,
    slots: &'a mut Slots,
    queue: &'a Rc<WriteQueue>,
    sink: &'a SharedSink,
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(
        node: NodeId,
        label: &'a str,
        depth: usize,
        slots: &'a mut Slots,
        queue: &'a Rc<WriteQueue>,
        sink: &'a SharedSink,
    ) -> Self {
        Self {
            node,
            label,
            depth,
            slots,
            queue,
            sink,
        }
    }

    /// The executing node's label (its component type name).
    pub fn label(&self) -> &str {
        self.label
    }

    /// The executing node's depth in the tree.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Declare (or re-read) a state cell under `key`.
    ///
    /// Returns the cell's current value together with its write handle.
    /// The initializer runs only on the node's first render. Writes made
    /// through the setter are batched and take effect at the start of the
    /// next pass; within one pass every read observes the same value.
    pub fn use_state(
        &mut self,
        key: &str,
        init: impl FnOnce() -> Value,
    ) -> Result<(Value, StateSetter), EngineError> {
        if !self.slots.contains_key(key) {
            self.slots
                .insert(key.to_string(), Slot::State(StateCell::new(init())));
        }
        let value = match self.slots.get(key) {
            Some(Slot::State(cell)) => cell.value().clone(),
            _ => return Err(self.slot_mismatch(key)),
        };
        Ok((value, StateSetter::new(self.node, key.to_string(), self.queue)))
    }

    /// Memoize a derived value under `key`, recomputing only when `deps`
    /// differ (shallow rule) from the previous render's declaration.
    ///
    /// An empty `deps` means "compute exactly once, forever". Each real
    /// recomputation appends a `"{node}.{key}"` event to the trace sink.
    pub fn use_memo(
        &mut self,
        key: &str,
        deps: Deps,
        compute: impl FnOnce() -> Value,
    ) -> Result<Value, EngineError> {
        match self.slots.get(key) {
            Some(Slot::Memo(entry)) if entry.is_valid_for(&deps) => {
                return Ok(entry.result().clone());
            }
            Some(Slot::Memo(_)) | None => {}
            Some(_) => return Err(self.slot_mismatch(key)),
        }

        let result = compute();
        self.sink.borrow_mut().append(RenderEvent::new(
            format!("{}.{}", self.label, key),
            self.depth + 1,
        ));
        self.slots.insert(
            key.to_string(),
            Slot::Memo(MemoEntry::new(deps, result.clone())),
        );
        Ok(result)
    }

    /// Stabilize a callback under `key`: the same handle is returned
    /// across renders while `deps` are unchanged, so a memoized child
    /// receiving it as a prop sees no difference.
    pub fn use_callback(
        &mut self,
        key: &str,
        deps: Deps,
        factory: impl FnOnce() -> CallbackRef,
    ) -> Result<CallbackRef, EngineError> {
        match self.slots.get(key) {
            Some(Slot::Callback(entry)) if entry.is_valid_for(&deps) => {
                return Ok(entry.func().clone());
            }
            Some(Slot::Callback(_)) | None => {}
            Some(_) => return Err(self.slot_mismatch(key)),
        }

        let func = factory();
        self.slots.insert(
            key.to_string(),
            Slot::Callback(CallbackEntry::new(deps, func.clone())),
        );
        Ok(func)
    }

    fn slot_mismatch(&self, key: &str) -> EngineError {
        EngineError::SlotMismatch {
            label: self.label.to_string(),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::trace::VecSink;

    struct Fixture {
        node: NodeId,
        slots: Slots,
        queue: Rc<WriteQueue>,
        sink: Rc<std::cell::RefCell<VecSink>>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut map = slotmap::SlotMap::<NodeId, ()>::with_key();
            Self {
                node: map.insert(()),
                slots: Slots::new(),
                queue: WriteQueue::new(),
                sink: VecSink::shared(),
            }
        }
    }

    #[test]
    fn use_state_initializes_once() {
        let mut fx = Fixture::new();
        let sink: SharedSink = fx.sink.clone();

        let (value, _setter) = {
            let mut ctx = RenderContext::new(
                fx.node,
                "widget",
                1,
                &mut fx.slots,
                &fx.queue,
                &sink,
            );
            ctx.use_state("n", || Value::Int(7)).unwrap()
        };
        assert_eq!(value, Value::Int(7));

        // Second render: initializer must not run again.
        let (value, _setter) = {
            let mut ctx = RenderContext::new(
                fx.node,
                "widget",
                1,
                &mut fx.slots,
                &fx.queue,
                &sink,
            );
            ctx.use_state("n", || panic!("init ran twice")).unwrap()
        };
        assert_eq!(value, Value::Int(7));
    }

    #[test]
    fn use_memo_recomputes_only_on_dep_change() {
        let mut fx = Fixture::new();
        let sink: SharedSink = fx.sink.clone();
        let runs = Cell::new(0);

        for (pass, dep) in [(0, 1i64), (1, 1), (2, 2)] {
            let mut ctx = RenderContext::new(
                fx.node,
                "widget",
                1,
                &mut fx.slots,
                &fx.queue,
                &sink,
            );
            let out = ctx
                .use_memo("double", vec![Value::Int(dep)], || {
                    runs.set(runs.get() + 1);
                    Value::Int(dep * 2)
                })
                .unwrap();
            assert_eq!(out, Value::Int(dep * 2), "pass {pass}");
        }

        // Computed on pass 0 and pass 2; pass 1 hit the cache.
        assert_eq!(runs.get(), 2);
        assert_eq!(
            fx.sink.borrow().labels(),
            vec!["widget.double", "widget.double"]
        );
        assert_eq!(fx.sink.borrow().events()[0].depth, 2);
    }

    #[test]
    fn use_callback_returns_identical_handle() {
        let mut fx = Fixture::new();
        let sink: SharedSink = fx.sink.clone();

        let first = {
            let mut ctx = RenderContext::new(
                fx.node,
                "widget",
                1,
                &mut fx.slots,
                &fx.queue,
                &sink,
            );
            ctx.use_callback("on_click", vec![], || CallbackRef::new(|| {}))
                .unwrap()
        };
        let second = {
            let mut ctx = RenderContext::new(
                fx.node,
                "widget",
                1,
                &mut fx.slots,
                &fx.queue,
                &sink,
            );
            ctx.use_callback("on_click", vec![], || CallbackRef::new(|| {}))
                .unwrap()
        };

        assert!(first.ptr_eq(&second));
    }

    #[test]
    fn slot_kind_reuse_is_rejected() {
        let mut fx = Fixture::new();
        let sink: SharedSink = fx.sink.clone();
        let mut ctx = RenderContext::new(
            fx.node,
            "widget",
            1,
            &mut fx.slots,
            &fx.queue,
            &sink,
        );

        ctx.use_state("x", || Value::Int(0)).unwrap();
        let err = ctx.use_memo("x", vec![], || Value::Int(1)).unwrap_err();
        assert!(matches!(err, EngineError::SlotMismatch { .. }));
    }
}
