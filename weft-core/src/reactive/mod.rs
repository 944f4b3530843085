//! Reactive Primitives
//!
//! This module implements the hook surface render functions program
//! against: state cells, derived-value caches, and callback identity
//! caches, plus the write queue that turns state mutations into scheduled
//! passes.
//!
//! # Concepts
//!
//! ## State Cells
//!
//! A state cell is one unit of owned, mutable data with a monotonic
//! version. Writing to it never takes effect immediately: the write is
//! queued, the owning node and its ancestors are marked dirty, and one
//! pass runs for all writes batched before it.
//!
//! ## Derived Values
//!
//! A memo entry caches a pure computation keyed by its declared
//! dependency values, recomputing only when the sequence differs under
//! the engine's shallow equality rule.
//!
//! ## Stable Callbacks
//!
//! A callback entry applies the same protocol to invocable handles, so
//! event-handler props keep reference identity across renders and do not
//! defeat a memoized child's bail-out.
//!
//! # Execution Context
//!
//! All three primitives are reached through [`RenderContext`], an
//! explicit per-execution handle the scheduler threads into each render
//! call. Slots are matched by caller-supplied keys rather than call
//! order, so conditional primitive calls cannot corrupt slot identity.

mod callback;
mod context;
mod memo;
mod state;

pub use callback::CallbackEntry;
pub use context::RenderContext;
pub use memo::MemoEntry;
pub use state::{Phase, StateCell, StateSetter};

pub(crate) use state::{PendingWrite, WriteOp, WriteQueue};
