//! Rule store: compiled rules, bucketed by their subject key, matched
//! against the live widget tree.
//!
//! Each selector of a registered rule becomes one [`CompiledRule`] with its
//! specificity computed once. Rules are bucketed by the index key of their
//! right-most compound (`#id`, `.class`, type name or `*`), so matching a
//! widget only visits rules that could possibly apply to it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::css::declaration::StyleDeclaration;
use crate::css::model::{Combinator, CompoundSelector, Selector, SelectorComponent, SelectorPart};
use crate::css::parser::{parse_css, parse_selector_list, ParseError};
use crate::css::specificity::{Origin, Specificity};
use crate::tree::{Widget, WidgetId, WidgetTree};

/// A single selector with its pre-computed specificity and shared
/// declaration block.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub selector: Selector,
    pub specificity: Specificity,
    pub declarations: Arc<StyleDeclaration>,
}

/// A rule that matched a widget.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRule<'a> {
    pub specificity: Specificity,
    pub declarations: &'a StyleDeclaration,
}

/// Every registered rule, indexed for matching.
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<CompiledRule>,
    buckets: HashMap<String, Vec<usize>>,
    next_order: u32,
}

fn bucket_key(compound: &CompoundSelector) -> String {
    let key = compound.index_key();
    if key.starts_with(['#', '.']) {
        key
    } else {
        // Type selectors match case-insensitively.
        key.to_ascii_lowercase()
    }
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `declarations` under every selector of `selector_text`
    /// (a comma-separated list). An empty or malformed selector is
    /// rejected and nothing is registered.
    pub fn register_rule(
        &mut self,
        selector_text: &str,
        declarations: StyleDeclaration,
        origin: Origin,
    ) -> Result<usize, ParseError> {
        let selectors = parse_selector_list(selector_text)?;
        if selectors.iter().any(|s| s.subject().is_none()) {
            return Err(ParseError::EmptySelector);
        }
        Ok(self.add(selectors, Arc::new(declarations), origin))
    }

    /// Register every rule of a style sheet. Returns the number of compiled
    /// rules added. A parse error registers nothing.
    pub fn load_css(&mut self, css: &str, origin: Origin) -> Result<usize, ParseError> {
        let sheet = parse_css(css)?;
        let mut added = 0;
        for rule in sheet.rules {
            let selectors: Vec<Selector> =
                rule.selectors.into_iter().filter(|s| s.subject().is_some()).collect();
            if selectors.is_empty() {
                continue;
            }
            let declarations = Arc::new(StyleDeclaration::from_declarations(&rule.declarations));
            added += self.add(selectors, declarations, origin);
        }
        Ok(added)
    }

    fn add(&mut self, selectors: Vec<Selector>, declarations: Arc<StyleDeclaration>, origin: Origin) -> usize {
        let order = self.next_order;
        self.next_order = self.next_order.saturating_add(1);
        let count = selectors.len();
        for selector in selectors {
            let Some(key) = selector.subject().map(bucket_key) else { continue };
            let specificity = Specificity::from_selector(&selector, order, origin);
            self.buckets.entry(key).or_default().push(self.rules.len());
            self.rules.push(CompiledRule { selector, specificity, declarations: declarations.clone() });
        }
        count
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Every rule whose selector matches `id`, in registration order.
    pub fn matching(&self, tree: &WidgetTree, id: WidgetId) -> Vec<MatchedRule<'_>> {
        let Some(widget) = tree.get(id) else { return Vec::new() };

        let mut keys: Vec<String> = Vec::with_capacity(widget.classes().len() + 3);
        if let Some(name) = widget.id() {
            keys.push(format!("#{name}"));
        }
        keys.extend(widget.classes().iter().map(|c| format!(".{c}")));
        keys.push(widget.type_name().to_ascii_lowercase());
        keys.push("*".to_string());

        let mut candidates: Vec<usize> = keys
            .iter()
            .filter_map(|k| self.buckets.get(k))
            .flatten()
            .copied()
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        candidates
            .into_iter()
            .map(|i| &self.rules[i])
            .filter(|rule| matches_selector(&rule.selector, tree, id))
            .map(|rule| MatchedRule { specificity: rule.specificity, declarations: &rule.declarations })
            .collect()
    }
}

/// Whether `selector` matches `id`, walking the live tree right to left.
pub fn matches_selector(selector: &Selector, tree: &WidgetTree, id: WidgetId) -> bool {
    matches_parts(&selector.parts, tree, id)
}

fn matches_parts(parts: &[SelectorPart], tree: &WidgetTree, id: WidgetId) -> bool {
    let Some((SelectorPart::Compound(compound), rest)) = parts.split_last() else {
        return false;
    };
    if !matches_compound(compound, tree, id) {
        return false;
    }
    let Some((last, rest)) = rest.split_last() else {
        return true;
    };
    let SelectorPart::Combinator(combinator) = last else {
        return false;
    };
    match combinator {
        Combinator::Child => tree.parent(id).is_some_and(|p| matches_parts(rest, tree, p)),
        Combinator::Descendant => tree.ancestors(id).any(|a| matches_parts(rest, tree, a)),
        Combinator::Adjacent => tree.prev_sibling(id).is_some_and(|s| matches_parts(rest, tree, s)),
        Combinator::Sibling => {
            std::iter::successors(tree.prev_sibling(id), |&s| tree.prev_sibling(s))
                .any(|s| matches_parts(rest, tree, s))
        }
    }
}

fn matches_compound(compound: &CompoundSelector, tree: &WidgetTree, id: WidgetId) -> bool {
    let Some(widget) = tree.get(id) else { return false };
    compound.components.iter().all(|component| match component {
        SelectorComponent::Type(name) => widget.type_name().eq_ignore_ascii_case(name),
        SelectorComponent::Class(name) => widget.has_class(name),
        SelectorComponent::Id(name) => widget.id() == Some(name.as_str()),
        SelectorComponent::Universal => true,
        SelectorComponent::PseudoClass(name) => matches_pseudo_class(name, widget, tree, id),
    })
}

fn matches_pseudo_class(name: &str, widget: &Widget, tree: &WidgetTree, id: WidgetId) -> bool {
    let attached = tree.parent(id).is_some();
    match name {
        "first-child" => attached && tree.prev_sibling(id).is_none(),
        "last-child" => attached && tree.next_sibling(id).is_none(),
        "only-child" => attached && tree.prev_sibling(id).is_none() && tree.next_sibling(id).is_none(),
        status => widget.has_status(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::properties::{Property, PropertyKey};

    /// Build a test tree:
    /// ```text
    ///        root
    ///       /    \
    ///    panel    panel#side.nav
    ///   #main
    ///   .content
    ///    /   \
    ///  button  label
    ///  .primary #title
    /// ```
    fn build() -> (WidgetTree, [WidgetId; 5]) {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let main = tree.create("panel");
        let side = tree.create("panel");
        let button = tree.create("button");
        let label = tree.create("label");
        for (p, c) in [(root, main), (root, side), (main, button), (main, label)] {
            assert!(tree.append(p, c).is_ok());
        }
        assert!(tree.set_id(main, Some("main")).is_ok());
        assert!(tree.add_class(main, "content").is_ok());
        assert!(tree.set_id(side, Some("side")).is_ok());
        assert!(tree.add_class(side, "nav").is_ok());
        assert!(tree.add_class(button, "primary").is_ok());
        assert!(tree.set_id(label, Some("title")).is_ok());
        (tree, [root, main, side, button, label])
    }

    fn matches(text: &str, tree: &WidgetTree, id: WidgetId) -> bool {
        let selectors = parse_selector_list(text).unwrap_or_default();
        assert!(!selectors.is_empty(), "bad selector {text}");
        selectors.iter().any(|s| matches_selector(s, tree, id))
    }

    // ── Simple selectors ─────────────────────────────────────────────

    #[test]
    fn type_class_id_universal() {
        let (tree, [_, main, side, button, label]) = build();
        assert!(matches("panel", &tree, main));
        assert!(matches("PANEL", &tree, side));
        assert!(matches(".primary", &tree, button));
        assert!(matches("#title", &tree, label));
        assert!(matches("*", &tree, label));
        assert!(!matches("button", &tree, label));
        assert!(matches("panel.nav#side", &tree, side));
        assert!(!matches("panel.nav#main", &tree, side));
    }

    #[test]
    fn statuses_and_structural_pseudo_classes() {
        let (mut tree, [root, main, side, button, label]) = build();
        assert!(!matches(":hover", &tree, button));
        assert!(tree.set_status(button, "hover", true).is_ok());
        assert!(matches("button:hover", &tree, button));
        assert!(matches(":first-child", &tree, main));
        assert!(matches(":last-child", &tree, side));
        assert!(matches(":last-child", &tree, label));
        assert!(!matches(":first-child", &tree, root));
        assert!(!matches(":only-child", &tree, label));
    }

    // ── Combinators ──────────────────────────────────────────────────

    #[test]
    fn descendant_and_child() {
        let (tree, [_, _, _, button, label]) = build();
        assert!(matches("root button", &tree, button));
        assert!(matches("#main > .primary", &tree, button));
        assert!(!matches("root > button", &tree, button));
        assert!(!matches(".nav label", &tree, label));
    }

    #[test]
    fn descendant_backtracks() {
        let (mut tree, [_, _, _, button, _]) = build();
        let inner = tree.create("panel");
        let leaf = tree.create("leaf");
        assert!(tree.append(button, inner).is_ok());
        assert!(tree.append(inner, leaf).is_ok());
        // The nearest `panel` ancestor is `inner`, whose parent is not the
        // root; the match must continue up to `main`.
        assert!(matches("root > panel leaf", &tree, leaf));
        assert!(matches("#main leaf", &tree, leaf));
        assert!(!matches("#side leaf", &tree, leaf));
    }

    #[test]
    fn sibling_combinators() {
        let (tree, [_, main, side, button, label]) = build();
        assert!(matches("button + label", &tree, label));
        assert!(matches("#main ~ .nav", &tree, side));
        assert!(!matches("label + button", &tree, button));
        assert!(!matches("#side ~ panel", &tree, main));
    }

    #[test]
    fn matching_follows_live_structure() {
        let (mut tree, [_, _, side, button, _]) = build();
        assert!(matches("#main button", &tree, button));
        assert!(tree.unlink(button).is_ok());
        assert!(tree.append(side, button).is_ok());
        assert!(!matches("#main button", &tree, button));
        assert!(matches(".nav > button", &tree, button));
    }

    // ── Store ────────────────────────────────────────────────────────

    fn decl(text: &str) -> StyleDeclaration {
        StyleDeclaration::parse(text)
    }

    #[test]
    fn register_rejects_bad_selectors() {
        let mut store = RuleStore::new();
        assert_eq!(store.register_rule("", decl("color: red"), Origin::Author), Err(ParseError::EmptySelector));
        assert!(store.register_rule("a >", decl("color: red"), Origin::Author).is_err());
        assert!(store.is_empty());
        assert_eq!(store.register_rule("a, .b", decl("color: red"), Origin::Author), Ok(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn matching_uses_buckets_and_keeps_order() {
        let (tree, [_, _, _, button, _]) = build();
        let mut store = RuleStore::new();
        let css = "
            label { color: red; }
            .primary { color: blue; }
            * { opacity: 0.5; }
            #main .primary { color: green; }
            BUTTON { width: 10px; }
        ";
        assert_eq!(store.load_css(css, Origin::Author), Ok(5));
        let matched = store.matching(&tree, button);
        let orders: Vec<u32> = matched.iter().map(|m| m.specificity.source_order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
        assert_eq!(matched[2].specificity.id_count, 1);
        let width = matched[3].declarations.get(&PropertyKey::Builtin(Property::Width));
        assert!(width.is_some());
    }

    #[test]
    fn selector_list_shares_declarations() {
        let mut store = RuleStore::new();
        assert_eq!(store.load_css(".a, .b { color: red }", Origin::Default), Ok(2));
        let rules = store.rules();
        assert!(Arc::ptr_eq(&rules[0].declarations, &rules[1].declarations));
        assert_eq!(rules[0].specificity.source_order, rules[1].specificity.source_order);
        assert!(rules[0].specificity.is_default());
    }
}
