//! Widget kinds: the per-type capability set.
//!
//! A widget's type name selects a [`WidgetKind`] from the [`KindRegistry`].
//! Kinds supply the behavior a plain box does not have: default CSS, an
//! intrinsic content size and content painting. Widgets whose type has no
//! registered kind are plain boxes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::css::computed::ComputedStyle;
use crate::font::FontBackend;
use crate::geometry::SizeF;
use crate::render::canvas::PaintTarget;
use crate::render::compositor::PaintContext;
use crate::tree::{Widget, WidgetId, WidgetTree};

// ---------------------------------------------------------------------------
// WidgetKind
// ---------------------------------------------------------------------------

/// Behavior shared by every widget of one type.
///
/// Kinds are shared across the repaint worker pool, so `paint` and
/// `measure` take `&self` and must not rely on interior mutation.
pub trait WidgetKind: Send + Sync {
    /// The type name widgets of this kind are created with.
    fn type_name(&self) -> &str;

    /// Style sheet loaded at default origin when the kind is registered.
    fn default_css(&self) -> &str {
        ""
    }

    /// Called once after a widget of this kind is created.
    fn init(&self, _tree: &mut WidgetTree, _id: WidgetId) {}

    /// Called before a widget of this kind is destroyed, while its data is
    /// still readable.
    fn destroy(&self, _tree: &mut WidgetTree, _id: WidgetId) {}

    /// Content size, without padding and border. `max_width` is the
    /// available content width when known. `None` means the content is
    /// sized by children only.
    fn measure(
        &self,
        _widget: &Widget,
        _style: &ComputedStyle,
        _fonts: &dyn FontBackend,
        _max_width: Option<f32>,
    ) -> Option<SizeF> {
        None
    }

    /// Paint content over the box. The target origin is the widget's
    /// border-box origin.
    fn paint(&self, _ctx: &PaintContext<'_>, _target: &mut PaintTarget<'_>, _widget: &Widget, _style: &ComputedStyle) {}
}

// ---------------------------------------------------------------------------
// KindRegistry
// ---------------------------------------------------------------------------

/// Kinds keyed by type name, compared case-insensitively like type
/// selectors.
#[derive(Clone, Default)]
pub struct KindRegistry {
    kinds: HashMap<String, Arc<dyn WidgetKind>>,
}

impl std::fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.kinds.keys().collect();
        names.sort();
        f.debug_struct("KindRegistry").field("kinds", &names).finish()
    }
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind, replacing any kind with the same type name.
    pub fn register(&mut self, kind: Arc<dyn WidgetKind>) -> Option<Arc<dyn WidgetKind>> {
        self.kinds.insert(kind.type_name().to_ascii_lowercase(), kind)
    }

    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn WidgetKind>> {
        if let Some(kind) = self.kinds.get(type_name) {
            return Some(kind);
        }
        self.kinds.get(&type_name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(&'static str);

    impl WidgetKind for Probe {
        fn type_name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn lookup_ignores_case() {
        let mut kinds = KindRegistry::new();
        assert!(kinds.register(Arc::new(Probe("Label"))).is_none());
        assert!(kinds.get("label").is_some());
        assert!(kinds.get("LABEL").is_some());
        assert!(kinds.get("panel").is_none());
    }

    #[test]
    fn register_replaces() {
        let mut kinds = KindRegistry::new();
        kinds.register(Arc::new(Probe("a")));
        assert!(kinds.register(Arc::new(Probe("A"))).is_some());
        assert_eq!(kinds.len(), 1);
    }

    #[test]
    fn default_hooks_do_nothing() {
        let probe = Probe("a");
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        probe.init(&mut tree, root);
        assert_eq!(probe.default_css(), "");
        let style = ComputedStyle::initial();
        let widget = tree.get(root).cloned();
        let Some(widget) = widget else { panic!("root missing") };
        assert!(probe.measure(&widget, &style, &crate::font::NullFont, None).is_none());
    }
}
