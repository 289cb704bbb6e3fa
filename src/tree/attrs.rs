//! Identity and content mutations: id, classes, statuses, text, inline
//! style, attributes.
//!
//! Anything a selector can observe queues a style update on the widget, its
//! subtree and its following siblings. Nothing is recomputed here.

use super::arena::WidgetTree;
use super::node::WidgetId;
use super::TreeError;
use crate::css::declaration::StyleDeclaration;
use crate::css::model::DeclarationValue;
use crate::css::properties::{expand_shorthand, parse_value_text};
use crate::task::{TaskKind, TaskSet};

impl WidgetTree {
    /// Set or clear the widget's id and update the registry.
    pub fn set_id(&mut self, id: WidgetId, name: Option<&str>) -> Result<(), TreeError> {
        let widget = self.live_mut(id)?;
        if widget.id.as_deref() == name {
            return Ok(());
        }
        let old = std::mem::replace(&mut widget.id, name.map(str::to_string));
        if let Some(old) = old {
            self.unregister_id(&old, id);
        }
        if let Some(name) = name {
            self.register_id(name, id);
        }
        self.restyle_from(id);
        Ok(())
    }

    /// Add a class. Returns `false` if it was already present.
    pub fn add_class(&mut self, id: WidgetId, class: &str) -> Result<bool, TreeError> {
        let widget = self.live_mut(id)?;
        if widget.has_class(class) {
            return Ok(false);
        }
        widget.classes.push(class.to_string());
        self.restyle_from(id);
        Ok(true)
    }

    /// Remove a class. Returns `false` if it was absent.
    pub fn remove_class(&mut self, id: WidgetId, class: &str) -> Result<bool, TreeError> {
        let widget = self.live_mut(id)?;
        let before = widget.classes.len();
        widget.classes.retain(|c| c != class);
        if widget.classes.len() == before {
            return Ok(false);
        }
        self.restyle_from(id);
        Ok(true)
    }

    /// Replace the class list with the whitespace-separated `classes`.
    /// Duplicates are dropped, order is kept.
    pub fn set_classes(&mut self, id: WidgetId, classes: &str) -> Result<(), TreeError> {
        let widget = self.live_mut(id)?;
        let mut list: Vec<String> = Vec::new();
        for class in classes.split_whitespace() {
            if !list.iter().any(|c| c == class) {
                list.push(class.to_string());
            }
        }
        if widget.classes == list {
            return Ok(());
        }
        widget.classes = list;
        self.restyle_from(id);
        Ok(())
    }

    /// Turn a status (pseudo-class) on or off. Returns whether it changed.
    pub fn set_status(&mut self, id: WidgetId, status: &str, on: bool) -> Result<bool, TreeError> {
        let widget = self.live_mut(id)?;
        if widget.has_status(status) == on {
            return Ok(false);
        }
        if on {
            widget.statuses.push(status.to_string());
        } else {
            widget.statuses.retain(|s| s != status);
        }
        self.restyle_from(id);
        Ok(true)
    }

    /// Replace the text content.
    pub fn set_text(&mut self, id: WidgetId, text: &str) -> Result<(), TreeError> {
        let widget = self.live_mut(id)?;
        if widget.text.as_deref() == Some(text) {
            return Ok(());
        }
        widget.text = Some(text.to_string());
        self.add_tasks(id, TaskSet::REFLOW | TaskSet::REPAINT);
        Ok(())
    }

    /// Replace the inline declaration block.
    pub fn set_inline_style(&mut self, id: WidgetId, style: StyleDeclaration) -> Result<(), TreeError> {
        let widget = self.live_mut(id)?;
        if widget.inline_style == style {
            return Ok(());
        }
        widget.inline_style = style;
        self.add_task(id, TaskKind::StyleUpdate);
        Ok(())
    }

    /// Set one inline property from value text, e.g. `("margin", "0 auto")`.
    /// An empty value removes the property. Unparsable values are ignored
    /// and leave the block unchanged.
    pub fn set_style_property(&mut self, id: WidgetId, name: &str, value: &str) -> Result<(), TreeError> {
        let widget = self.live_mut(id)?;
        let mut style = widget.inline_style.clone();
        let (value, important) = match value.trim().strip_suffix("!important") {
            Some(rest) => (rest.trim(), true),
            None => (value.trim(), false),
        };
        if value.is_empty() {
            // A wide keyword expands any shorthand into its longhand names.
            let probe = [DeclarationValue::Ident("initial".into())];
            let longhands = expand_shorthand(name, &probe).unwrap_or_default();
            for (key, _) in longhands {
                style.remove(&key);
            }
        } else {
            let Some(values) = parse_value_text(value) else {
                tracing::debug!(property = name, value, "ignoring unparsable inline value");
                return Ok(());
            };
            match expand_shorthand(name, &values) {
                Ok(longhands) => {
                    // The latest inline write wins, whatever its importance.
                    for (key, values) in longhands {
                        style.replace(key, values, important);
                    }
                }
                Err(err) => {
                    tracing::debug!(error = %err, "ignoring inline declaration");
                    return Ok(());
                }
            }
        }
        self.set_inline_style(id, style)
    }

    /// Set an attribute. `id`, `class` and `style` are routed to their
    /// setters; other names are stored as-is.
    pub fn set_attribute(&mut self, id: WidgetId, name: &str, value: &str) -> Result<(), TreeError> {
        match name {
            "id" => self.set_id(id, Some(value).filter(|v| !v.is_empty())),
            "class" => self.set_classes(id, value),
            "style" => self.set_inline_style(id, StyleDeclaration::parse(value)),
            _ => {
                self.live_mut(id)?.attributes.insert(name.to_string(), value.to_string());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::properties::{Property, PropertyKey};

    fn clean(tree: &mut WidgetTree) {
        let all: Vec<WidgetId> = tree.descendants(tree.root()).collect();
        for id in all {
            if let Some(w) = tree.get_mut(id) {
                w.tasks = TaskSet::empty();
                w.subtree_dirty = false;
            }
        }
    }

    fn tasks(tree: &WidgetTree, id: WidgetId) -> TaskSet {
        tree.get(id).map(|w| w.tasks()).unwrap_or_default()
    }

    fn build() -> (WidgetTree, [WidgetId; 4]) {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let a = tree.create("panel");
        let b = tree.create("panel");
        let b1 = tree.create("text");
        for (p, c) in [(root, a), (root, b), (b, b1)] {
            assert!(tree.append(p, c).is_ok());
        }
        clean(&mut tree);
        (tree, [root, a, b, b1])
    }

    #[test]
    fn class_change_restyles_followers() {
        let (mut tree, [root, a, b, b1]) = build();
        assert_eq!(tree.add_class(a, "active"), Ok(true));
        assert_eq!(tree.add_class(a, "active"), Ok(false));
        for id in [a, b, b1] {
            assert!(tasks(&tree, id).contains(TaskSet::STYLE));
        }
        assert!(!tasks(&tree, root).contains(TaskSet::STYLE));
    }

    #[test]
    fn set_classes_dedups() {
        let (mut tree, [_, a, ..]) = build();
        assert!(tree.set_classes(a, "x y x  z").is_ok());
        assert_eq!(tree.get(a).map(|w| w.classes().to_vec()), Some(vec!["x".into(), "y".into(), "z".into()]));
    }

    #[test]
    fn set_id_updates_registry() {
        let (mut tree, [_, a, ..]) = build();
        assert!(tree.set_id(a, Some("one")).is_ok());
        assert_eq!(tree.find_by_id("one"), Some(a));
        assert!(tree.set_id(a, Some("two")).is_ok());
        assert_eq!(tree.find_by_id("one"), None);
        assert_eq!(tree.find_by_id("two"), Some(a));
    }

    #[test]
    fn status_toggle() {
        let (mut tree, [_, _, b, _]) = build();
        assert_eq!(tree.set_status(b, "hover", true), Ok(true));
        assert_eq!(tree.set_status(b, "hover", true), Ok(false));
        assert!(tree.get(b).is_some_and(|w| w.has_status("hover")));
        assert_eq!(tree.set_status(b, "hover", false), Ok(true));
    }

    #[test]
    fn inline_style_only_restyles_self() {
        let (mut tree, [_, a, b, _]) = build();
        assert!(tree.set_style_property(a, "background-color", "#00ff00").is_ok());
        assert_eq!(tasks(&tree, a), TaskSet::STYLE);
        assert!(tasks(&tree, b).is_empty());
        let value = tree
            .get(a)
            .and_then(|w| w.inline_style().get(&PropertyKey::Builtin(Property::BackgroundColor)).cloned());
        assert_eq!(value.map(|v| v.values), Some(vec![DeclarationValue::Color("00ff00".into())]));
    }

    #[test]
    fn style_property_shorthand_and_removal() {
        let (mut tree, [_, a, ..]) = build();
        assert!(tree.set_style_property(a, "padding", "4px").is_ok());
        assert_eq!(tree.get(a).map(|w| w.inline_style().len()), Some(4));
        assert!(tree.set_style_property(a, "padding", "").is_ok());
        assert_eq!(tree.get(a).map(|w| w.inline_style().len()), Some(0));
    }

    #[test]
    fn style_property_overwrites_important_inline_value() {
        let (mut tree, [_, a, ..]) = build();
        let key = PropertyKey::Builtin(Property::Width);
        assert!(tree.set_style_property(a, "width", "10px !important").is_ok());
        assert_eq!(tree.get(a).and_then(|w| w.inline_style().get(&key)).map(|v| v.important), Some(true));

        clean(&mut tree);
        assert!(tree.set_style_property(a, "width", "20px").is_ok());
        let value = tree.get(a).and_then(|w| w.inline_style().get(&key)).cloned();
        assert_eq!(value.as_ref().map(|v| v.important), Some(false));
        assert_eq!(value.map(|v| v.values), parse_value_text("20px"));
        assert!(tasks(&tree, a).contains(TaskSet::STYLE));
    }

    #[test]
    fn text_queues_reflow_and_repaint() {
        let (mut tree, [_, _, _, b1]) = build();
        assert!(tree.set_text(b1, "hello").is_ok());
        assert_eq!(tasks(&tree, b1), TaskSet::REFLOW | TaskSet::REPAINT);
    }

    #[test]
    fn attributes_route_to_setters() {
        let (mut tree, [_, a, ..]) = build();
        assert!(tree.set_attribute(a, "id", "main").is_ok());
        assert!(tree.set_attribute(a, "class", "big red").is_ok());
        assert!(tree.set_attribute(a, "style", "width: 10px").is_ok());
        assert!(tree.set_attribute(a, "data-x", "7").is_ok());
        let widget = tree.get(a);
        assert_eq!(widget.and_then(|w| w.id()), Some("main"));
        assert_eq!(widget.map(|w| w.classes().len()), Some(2));
        assert_eq!(widget.map(|w| w.inline_style().len()), Some(1));
        assert_eq!(widget.and_then(|w| w.attribute("data-x")), Some("7"));
    }

    #[test]
    fn destroyed_widget_rejects_mutation() {
        let (mut tree, [_, a, ..]) = build();
        assert!(tree.destroy(a).is_ok());
        assert_eq!(tree.add_class(a, "x"), Err(TreeError::Destroyed));
        assert_eq!(tree.free_trash(), 1);
        assert_eq!(tree.add_class(a, "x"), Err(TreeError::Stale));
    }
}
