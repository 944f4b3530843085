//! Weft Core
//!
//! This crate provides the core runtime for the Weft reactive rendering
//! engine. It implements:
//!
//! - A tree of stateful components held in an arena
//! - Fine-grained, dependency-driven invalidation: a state write marks
//!   exactly the path that must re-execute, and memoized components prune
//!   everything else
//! - The primitives render functions use to suppress unnecessary work:
//!   state cells, cached derived values, and identity-stable callbacks
//! - A synchronous pass scheduler with batched writes and atomic failure
//!
//! The engine does no painting and dispatches no input events; it is
//! defined purely in terms of state, invalidation, and the scheduling
//! algorithm that turns a mutation into a minimal set of re-executions.
//! The application supplies render functions through a registry and
//! observes passes through an ordered trace sink.
//!
//! # Architecture
//!
//! - `reactive`: state cells, caches, the write queue, and the
//!   per-execution `RenderContext` hook surface
//! - `tree`: the component arena, nodes, memo policies, and descriptors
//! - `scheduler`: the pass state machine, walk, and keyed reconciliation
//! - `registry`: the application-supplied render functions
//! - `trace`: the ordered render-event sink
//!
//! # Example
//!
//! ```rust
//! use weft_core::{
//!     props, ComponentRegistry, Engine, MemoPolicy, RenderOutput, Value, VecSink,
//! };
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register("counter", MemoPolicy::None, |_props, ctx| {
//!     let (count, _set_count) = ctx.use_state("count", || Value::Int(0))?;
//!     let label = ctx.use_memo("label", vec![count.clone()], || {
//!         Value::str(format!("count is {count:?}"))
//!     })?;
//!     Ok(RenderOutput::new().child("display", props! { "text" => label }))
//! });
//! registry.register("display", MemoPolicy::ShallowProps, |_props, _ctx| {
//!     Ok(RenderOutput::leaf())
//! });
//!
//! let sink = VecSink::shared();
//! let mut engine = Engine::new(registry, sink.clone());
//! engine.mount("counter", props! {}).unwrap();
//!
//! assert_eq!(
//!     sink.borrow().labels(),
//!     vec!["counter", "counter.label", "display"],
//! );
//! ```

pub mod error;
pub mod reactive;
pub mod registry;
pub mod scheduler;
pub mod trace;
pub mod tree;
pub mod value;

pub use error::EngineError;
pub use reactive::{Phase, RenderContext, StateSetter};
pub use registry::{ComponentRegistry, RenderFn, RenderResult};
pub use scheduler::Engine;
pub use trace::{LogSink, RenderEvent, SharedSink, TraceSink, VecSink};
pub use tree::{ChildKey, ChildSpec, MemoPolicy, NodeId, RenderOutput};
pub use value::{CallbackRef, Deps, Props, Value};
