//! Render Output
//!
//! A render function returns an ordered list of child descriptors. The
//! engine never interprets the output beyond extracting this list: each
//! descriptor names a registered component type, the props to hand it,
//! and optionally a stable key for matching across passes. Children
//! without an explicit key match by their position among the siblings.

use crate::value::Props;

/// One child descriptor in a render output.
#[derive(Debug, Clone)]
pub struct ChildSpec {
    /// Explicit stable key, if the parent supplied one.
    pub key: Option<String>,
    /// Registered component type to instantiate or reuse.
    pub type_name: String,
    /// Props handed to the child, read-only from its perspective.
    pub props: Props,
}

/// The ordered child list a render function declares.
#[derive(Debug, Clone, Default)]
pub struct RenderOutput {
    children: Vec<ChildSpec>,
}

impl RenderOutput {
    /// An output with no children (a leaf render).
    pub fn leaf() -> Self {
        Self::default()
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positionally-keyed child.
    pub fn child(mut self, type_name: impl Into<String>, props: Props) -> Self {
        self.children.push(ChildSpec {
            key: None,
            type_name: type_name.into(),
            props,
        });
        self
    }

    /// Append a child with an explicit stable key.
    pub fn keyed_child(
        mut self,
        key: impl Into<String>,
        type_name: impl Into<String>,
        props: Props,
    ) -> Self {
        self.children.push(ChildSpec {
            key: Some(key.into()),
            type_name: type_name.into(),
            props,
        });
        self
    }

    pub fn children(&self) -> &[ChildSpec] {
        &self.children
    }

    pub fn into_children(self) -> Vec<ChildSpec> {
        self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;

    #[test]
    fn builder_preserves_declaration_order() {
        let out = RenderOutput::new()
            .keyed_child("a", "item", props! { "n" => 1 })
            .child("divider", Props::new())
            .keyed_child("b", "item", props! { "n" => 2 });

        let kinds: Vec<_> = out.children().iter().map(|c| c.type_name.as_str()).collect();
        assert_eq!(kinds, vec!["item", "divider", "item"]);
        assert_eq!(out.children()[0].key.as_deref(), Some("a"));
        assert_eq!(out.children()[1].key, None);
    }

    #[test]
    fn leaf_has_no_children() {
        assert!(RenderOutput::leaf().children().is_empty());
    }
}
