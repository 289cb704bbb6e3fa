//! Cascade: matched rules + inline block + inheritance → [`ComputedStyle`].
//!
//! Declarations from every matching rule are sorted by their
//! [`Specificity`] and folded so the greatest one per property wins. The
//! widget's inline block is applied after that and always wins. Unset
//! inherited properties take the parent's computed value, everything else
//! starts from the initial table.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::css::computed::ComputedStyle;
use crate::css::model::DeclarationValue;
use crate::css::properties::{
    apply_property, copy_property, Property, PropertyKey, PropertyRegistry, WideKeyword,
};
use crate::css::specificity::Specificity;
use crate::css::stylesheet::RuleStore;
use crate::tree::{WidgetId, WidgetTree};

/// The declared value of every property set for one widget, after
/// specificity ordering and the inline override.
pub fn declared_values<'a>(
    tree: &'a WidgetTree,
    rules: &'a RuleStore,
    id: WidgetId,
) -> BTreeMap<PropertyKey, &'a [DeclarationValue]> {
    let mut declared = BTreeMap::new();
    let Some(widget) = tree.get(id) else { return declared };

    let mut ordered: Vec<(Specificity, &PropertyKey, &[DeclarationValue])> = Vec::new();
    for matched in rules.matching(tree, id) {
        for (index, (key, value)) in matched.declarations.iter().enumerate() {
            let priority = matched.specificity.for_declaration(value.important, index);
            ordered.push((priority, key, value.values.as_slice()));
        }
    }
    ordered.sort_by_key(|(priority, ..)| *priority);

    for (_, key, values) in ordered {
        declared.insert(key.clone(), values);
    }
    for (key, value) in widget.inline_style().iter() {
        declared.insert(key.clone(), value.values.as_slice());
    }
    declared
}

/// Compute the style of `id` from the rules, its inline block and its
/// parent's computed style. The parent must already be computed for
/// inheritance to take effect.
pub fn compute_style(
    tree: &WidgetTree,
    rules: &RuleStore,
    registry: &PropertyRegistry,
    id: WidgetId,
) -> ComputedStyle {
    let parent = tree.parent(id).and_then(|p| tree.get(p)).and_then(|p| p.computed_style().cloned());
    let declared = declared_values(tree, rules, id);
    resolve(&declared, parent.as_deref(), registry)
}

/// Resolve declared values into a computed style.
pub fn resolve(
    declared: &BTreeMap<PropertyKey, &[DeclarationValue]>,
    parent: Option<&ComputedStyle>,
    registry: &PropertyRegistry,
) -> ComputedStyle {
    let initial = ComputedStyle::initial();
    let mut style = initial.clone();

    for custom in registry.iter() {
        if let Some(values) = &custom.initial {
            style.custom.insert(custom.name.clone(), values.clone());
        }
    }
    if let Some(parent) = parent {
        for &prop in Property::ALL {
            if prop.is_inherited() {
                copy_property(&mut style, parent, prop);
            }
        }
        for (name, values) in &parent.custom {
            if registry.is_inherited(name) {
                style.custom.insert(name.clone(), values.clone());
            }
        }
    }

    for (key, values) in declared {
        let wide = WideKeyword::detect(values);
        match key {
            PropertyKey::Builtin(prop) => match wide {
                Some(WideKeyword::Initial) => copy_property(&mut style, &initial, *prop),
                Some(WideKeyword::Inherit) => {
                    copy_property(&mut style, parent.unwrap_or(&initial), *prop)
                }
                None => {
                    if let Err(err) = apply_property(&mut style, *prop, values) {
                        debug!(error = %err, "falling back to initial value");
                        copy_property(&mut style, &initial, *prop);
                    }
                }
            },
            PropertyKey::Custom(name) => {
                let value = match wide {
                    Some(WideKeyword::Initial) => {
                        registry.get(name).and_then(|p| p.initial.clone())
                    }
                    Some(WideKeyword::Inherit) => parent.and_then(|p| p.custom.get(name).cloned()),
                    None => Some(values.to_vec()),
                };
                match value {
                    Some(value) => {
                        style.custom.insert(Arc::clone(name), value);
                    }
                    None => {
                        style.custom.remove(name);
                    }
                }
            }
        }
    }
    style
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::declaration::StyleDeclaration;
    use crate::css::specificity::Origin;
    use crate::css::values::{Color, Length};
    use pretty_assertions::assert_eq;

    struct Fixture {
        tree: WidgetTree,
        rules: RuleStore,
        registry: PropertyRegistry,
    }

    impl Fixture {
        fn new(css: &str) -> Self {
            let mut rules = RuleStore::new();
            assert!(rules.load_css(css, Origin::Author).is_ok());
            Self { tree: WidgetTree::new("root"), rules, registry: PropertyRegistry::new() }
        }

        fn child(&mut self, parent: WidgetId, type_name: &str) -> WidgetId {
            let id = self.tree.create(type_name);
            assert!(self.tree.append(parent, id).is_ok());
            id
        }

        /// Compute and store styles top-down for the whole tree.
        fn style_all(&mut self) {
            let order: Vec<WidgetId> = self.tree.descendants(self.tree.root()).collect();
            for id in order {
                let style = compute_style(&self.tree, &self.rules, &self.registry, id);
                if let Some(w) = self.tree.get_mut(id) {
                    w.computed = Some(Arc::new(style));
                }
            }
        }

        fn style(&self, id: WidgetId) -> Arc<ComputedStyle> {
            self.tree
                .get(id)
                .and_then(|w| w.computed_style().cloned())
                .unwrap_or_else(|| Arc::new(ComputedStyle::initial()))
        }
    }

    // ── Specificity ──────────────────────────────────────────────────

    #[test]
    fn class_beats_type_and_inline_beats_both() {
        let mut fx = Fixture::new(".foo { color: blue; } item { color: red; }");
        let root = fx.tree.root();
        let w = fx.child(root, "item");
        assert!(fx.tree.add_class(w, "foo").is_ok());
        fx.style_all();
        assert_eq!(fx.style(w).color, Color::rgb(0, 0, 255));

        assert!(fx.tree.set_style_property(w, "color", "#00ff00").is_ok());
        fx.style_all();
        assert_eq!(fx.style(w).color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn later_rule_wins_ties() {
        let mut fx = Fixture::new("item { width: 10px; } item { width: 20px; }");
        let root = fx.tree.root();
        let w = fx.child(root, "item");
        fx.style_all();
        assert_eq!(fx.style(w).width, Length::Px(20.0));
    }

    #[test]
    fn important_beats_specificity_but_not_inline() {
        let mut fx = Fixture::new("item { width: 10px !important; } #x { width: 20px; }");
        let root = fx.tree.root();
        let w = fx.child(root, "item");
        assert!(fx.tree.set_id(w, Some("x")).is_ok());
        fx.style_all();
        assert_eq!(fx.style(w).width, Length::Px(10.0));

        assert!(fx.tree.set_inline_style(w, StyleDeclaration::parse("width: 30px")).is_ok());
        fx.style_all();
        assert_eq!(fx.style(w).width, Length::Px(30.0));
    }

    // ── Inheritance ──────────────────────────────────────────────────

    #[test]
    fn inherited_properties_follow_parent() {
        let mut fx = Fixture::new("panel { color: white; width: 50px; font-size: 20px; }");
        let root = fx.tree.root();
        let panel = fx.child(root, "panel");
        let leaf = fx.child(panel, "leaf");
        fx.style_all();
        let style = fx.style(leaf);
        assert_eq!(style.color, Color::WHITE);
        assert_eq!(style.font_size, 20.0);
        assert_eq!(style.width, Length::Auto);
    }

    #[test]
    fn wide_keywords() {
        let mut fx = Fixture::new(
            "panel { color: white; width: 50px; } leaf { color: initial; width: inherit; }",
        );
        let root = fx.tree.root();
        let panel = fx.child(root, "panel");
        let leaf = fx.child(panel, "leaf");
        fx.style_all();
        let style = fx.style(leaf);
        assert_eq!(style.color, Color::BLACK);
        assert_eq!(style.width, Length::Px(50.0));
    }

    #[test]
    fn invalid_value_falls_back_to_initial() {
        let mut fx = Fixture::new("leaf { display: sideways; opacity: 0.5; }");
        let root = fx.tree.root();
        let leaf = fx.child(root, "leaf");
        fx.style_all();
        let style = fx.style(leaf);
        assert_eq!(style.display, ComputedStyle::initial().display);
        assert_eq!(style.opacity, 0.5);
    }

    // ── Custom properties ────────────────────────────────────────────

    #[test]
    fn custom_properties_cascade_and_inherit() {
        let mut fx = Fixture::new("panel { --tone: warm; --size: 3; } leaf { --other: x; }");
        assert!(fx.registry.register("--tone", "cold", true).is_ok());
        assert!(fx.registry.register("--size", "", false).is_ok());
        let root = fx.tree.root();
        let panel = fx.child(root, "panel");
        let leaf = fx.child(panel, "leaf");
        fx.style_all();

        let root_style = fx.style(root);
        assert_eq!(root_style.custom.get("--tone"), Some(&vec![DeclarationValue::Ident("cold".into())]));

        let leaf_style = fx.style(leaf);
        assert_eq!(leaf_style.custom.get("--tone"), Some(&vec![DeclarationValue::Ident("warm".into())]));
        assert_eq!(leaf_style.custom.get("--size"), None);
        assert_eq!(leaf_style.custom.get("--other"), Some(&vec![DeclarationValue::Ident("x".into())]));
    }

    // ── Determinism ──────────────────────────────────────────────────

    #[test]
    fn recomputing_is_identical() {
        let mut fx = Fixture::new(
            "* { margin: 1px 2px; } .a { border: 2px dashed red; } #z { background: #123456; }",
        );
        let root = fx.tree.root();
        let w = fx.child(root, "item");
        assert!(fx.tree.add_class(w, "a").is_ok());
        assert!(fx.tree.set_id(w, Some("z")).is_ok());
        fx.style_all();
        let first = fx.style(w);
        fx.style_all();
        assert_eq!(*first, *fx.style(w));
    }
}
