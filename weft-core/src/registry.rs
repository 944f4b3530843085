//! Component Registry
//!
//! The application supplies, for each component type, a pure render
//! function `(props, ctx) -> RenderOutput` together with the memo policy
//! nodes of that type carry. The registry is the engine's only source of
//! render behavior: descriptors select a component by type name, and a
//! name with no registration is rejected during reconciliation.

use std::collections::HashMap;
use std::rc::Rc;

use crate::reactive::RenderContext;
use crate::tree::{MemoPolicy, RenderOutput};
use crate::value::Props;

/// What a render function returns: a child list, or any error. Errors
/// abort the current pass (the tree stays at its last committed state);
/// `weft_core::EngineError` values raised by the hook API pass through
/// unwrapped.
pub type RenderResult = Result<RenderOutput, Box<dyn std::error::Error>>;

/// A registered render function.
pub type RenderFn = Rc<dyn Fn(&Props, &mut RenderContext<'_>) -> RenderResult>;

/// One component type: its render function and memo policy.
#[derive(Clone)]
pub struct ComponentSpec {
    pub(crate) render: RenderFn,
    pub(crate) memo: MemoPolicy,
}

/// The tree of render functions supplied by the application.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<String, ComponentSpec>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type. Re-registering a name replaces the
    /// previous entry; existing nodes keep the policy they were created
    /// with until they are recreated.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        memo: MemoPolicy,
        render: impl Fn(&Props, &mut RenderContext<'_>) -> RenderResult + 'static,
    ) -> &mut Self {
        self.components.insert(
            type_name.into(),
            ComponentSpec {
                render: Rc::new(render),
                memo,
            },
        );
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&ComponentSpec> {
        self.components.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.components.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut registry = ComponentRegistry::new();
        registry.register("leaf", MemoPolicy::None, |_props, _ctx| {
            Ok(RenderOutput::leaf())
        });

        assert!(registry.contains("leaf"));
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reregistering_replaces() {
        let mut registry = ComponentRegistry::new();
        registry.register("leaf", MemoPolicy::None, |_, _| Ok(RenderOutput::leaf()));
        registry.register("leaf", MemoPolicy::ShallowProps, |_, _| {
            Ok(RenderOutput::leaf())
        });

        assert_eq!(registry.len(), 1);
        assert!(matches!(
            registry.get("leaf").unwrap().memo,
            MemoPolicy::ShallowProps
        ));
    }
}
