//! Derived Value Cache
//!
//! A [`MemoEntry`] memoizes the result of a pure computation keyed by its
//! declared dependency values. On each render of the owning component,
//! the stored dependency sequence is compared element-wise (shallow rule,
//! see [`crate::value`]) against the freshly declared one:
//!
//! - Equal: the cached result is returned and the computation is skipped.
//! - Unequal (including the first call): the computation runs and the
//!   entry stores the new `(deps, result)` pair.
//!
//! An empty dependency sequence compares equal forever, so such an entry
//! computes exactly once for the component's lifetime.
//!
//! The computation must be free of observable side effects; the engine
//! invokes it exactly once per real dependency change.

use crate::value::{deps_equal, Deps, Value};

/// One memoized computation at one call site of a component.
#[derive(Debug, Clone)]
pub struct MemoEntry {
    deps: Deps,
    result: Value,
}

impl MemoEntry {
    pub fn new(deps: Deps, result: Value) -> Self {
        Self { deps, result }
    }

    /// Whether the cached result is still valid for the given deps.
    pub fn is_valid_for(&self, deps: &[Value]) -> bool {
        deps_equal(&self.deps, deps)
    }

    /// The cached result.
    pub fn result(&self) -> &Value {
        &self.result
    }
}
