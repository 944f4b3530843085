//! Engine Errors
//!
//! Two families of failure exist:
//!
//! - Programmer errors (`StaleContext`, `KeyCollision`, `Cycle`,
//!   `UnknownComponent`, `SlotMismatch`) are surfaced immediately and
//!   never recovered; they indicate a bug in the application.
//! - `RenderFunction` aborts only the current pass. The tree is left in
//!   its last committed state and remains usable for the next pass; the
//!   engine never retries on its own.

use thiserror::Error;

/// Errors surfaced by the rendering engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A reactive primitive was used after its execution context ended,
    /// e.g. a state setter invoked after the engine was dropped.
    #[error("reactive primitive used outside an active execution context")]
    StaleContext,

    /// Two sibling child descriptors in one render output share a key.
    #[error("duplicate child key `{key}` among children of `{parent}`")]
    KeyCollision { parent: String, key: String },

    /// A render function failed. The pass was aborted; the tree is still
    /// at its last committed state.
    #[error("render function for `{label}` failed")]
    RenderFunction {
        label: String,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    /// A child descriptor would make a component its own ancestor.
    #[error("component type `{type_name}` would become its own ancestor")]
    Cycle { type_name: String },

    /// A descriptor named a component type with no registered render
    /// function.
    #[error("no component registered for type `{0}`")]
    UnknownComponent(String),

    /// A hook slot key was reused for a different primitive kind within
    /// one component (e.g. `use_state("x", ..)` then `use_memo("x", ..)`).
    #[error("slot `{key}` on `{label}` reused as a different primitive kind")]
    SlotMismatch { label: String, key: String },

    /// `mount` was called on an engine that already has a root.
    #[error("engine already has a mounted root")]
    AlreadyMounted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_readable_messages() {
        let err = EngineError::KeyCollision {
            parent: "list".into(),
            key: "row-3".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate child key `row-3` among children of `list`"
        );

        let err = EngineError::UnknownComponent("sidebar".into());
        assert_eq!(err.to_string(), "no component registered for type `sidebar`");
    }

    #[test]
    fn render_function_error_carries_source() {
        use std::error::Error as _;

        let inner: Box<dyn std::error::Error> = "boom".into();
        let err = EngineError::RenderFunction {
            label: "root".into(),
            source: inner,
        };

        assert!(err.source().is_some());
        assert_eq!(err.source().unwrap().to_string(), "boom");
    }
}
