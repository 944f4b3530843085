//! Trace Sink
//!
//! The engine reports every render execution (and every derived-value
//! recomputation) as an ordered stream of [`RenderEvent`]s. Append order
//! is the only contract: the sink must preserve it, because observability
//! tests assert on the exact visitation sequence of a pass.
//!
//! Two sinks are provided: [`VecSink`] records events in memory (the one
//! tests use) and [`LogSink`] forwards them to `tracing`.

use std::cell::RefCell;
use std::rc::Rc;

/// One entry in the render trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEvent {
    /// The executed node's label (its component type name), or
    /// `"{node}.{slot}"` for a derived-value recomputation.
    pub label: String,
    /// Depth in the component tree; derived values report their owner's
    /// depth plus one.
    pub depth: usize,
}

impl RenderEvent {
    pub fn new(label: impl Into<String>, depth: usize) -> Self {
        Self {
            label: label.into(),
            depth,
        }
    }
}

/// An append-only consumer of render events.
pub trait TraceSink {
    /// Record one event. Implementations must preserve append order.
    fn append(&mut self, event: RenderEvent);
}

/// A shared, engine-owned sink handle.
///
/// The engine and the caller both hold the sink; `Rc<RefCell<..>>` lets a
/// test keep its `VecSink` inspectable after handing it to the engine.
pub type SharedSink = Rc<RefCell<dyn TraceSink>>;

/// An in-memory sink that records events in order.
#[derive(Debug, Default)]
pub struct VecSink {
    events: Vec<RenderEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in the shared handle the engine expects.
    pub fn shared() -> Rc<RefCell<VecSink>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// All recorded events, in append order.
    pub fn events(&self) -> &[RenderEvent] {
        &self.events
    }

    /// Just the labels, in append order. Convenient for assertions.
    pub fn labels(&self) -> Vec<String> {
        self.events.iter().map(|e| e.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Forget recorded events, typically between passes in a test.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TraceSink for VecSink {
    fn append(&mut self, event: RenderEvent) {
        self.events.push(event);
    }
}

/// A sink that forwards events to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn shared() -> SharedSink {
        Rc::new(RefCell::new(LogSink))
    }
}

impl TraceSink for LogSink {
    fn append(&mut self, event: RenderEvent) {
        tracing::debug!(label = %event.label, depth = event.depth, "render event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_preserves_append_order() {
        let mut sink = VecSink::new();

        sink.append(RenderEvent::new("root", 0));
        sink.append(RenderEvent::new("child", 1));
        sink.append(RenderEvent::new("child.derived", 2));

        assert_eq!(sink.labels(), vec!["root", "child", "child.derived"]);
        assert_eq!(sink.events()[1].depth, 1);
    }

    #[test]
    fn vec_sink_clear_resets() {
        let mut sink = VecSink::new();
        sink.append(RenderEvent::new("root", 0));
        assert!(!sink.is_empty());

        sink.clear();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
    }
}
