//! Callback Identity Cache
//!
//! A [`CallbackEntry`] follows the same dependency-equality protocol as
//! the derived value cache, but the cached payload is an invocable
//! [`CallbackRef`] rather than a data value.
//!
//! Its purpose is referential stability: a freshly allocated closure on
//! every render would make a memoized child's shallow prop comparison
//! report a difference for that prop on every pass, defeating bail-out
//! entirely. While the declared dependencies are unchanged, the same
//! handle is returned across any number of passes.

use crate::value::{deps_equal, CallbackRef, Deps, Value};

/// One stabilized callback at one call site of a component.
#[derive(Debug, Clone)]
pub struct CallbackEntry {
    deps: Deps,
    func: CallbackRef,
}

impl CallbackEntry {
    pub fn new(deps: Deps, func: CallbackRef) -> Self {
        Self { deps, func }
    }

    /// Whether the cached handle is still valid for the given deps.
    pub fn is_valid_for(&self, deps: &[Value]) -> bool {
        deps_equal(&self.deps, deps)
    }

    /// The cached handle.
    pub fn func(&self) -> &CallbackRef {
        &self.func
    }
}
