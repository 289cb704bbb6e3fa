//! Cascade priority tuple and comparison.
//!
//! Every matched declaration gets a [`Specificity`]; the cascade applies
//! declarations in ascending order so the greatest one wins. The tuple is:
//!
//! ```text
//! (origin, important, id_count, class_count, type_count, source_order, index)
//! ```
//!
//! Fields are ordered so that the derived `Ord` (lexicographic) is the
//! cascade order:
//! - Author rules beat the default rules widget kinds ship with
//! - `!important` beats normal within an origin
//! - More IDs beat fewer IDs
//! - More classes/pseudo-classes beat fewer
//! - More type selectors beat fewer
//! - Later rules win ties, and within a rule later declarations win

use crate::css::model::{Selector, SelectorComponent, SelectorPart};

/// Where a rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Origin {
    /// Default rules registered by widget kinds.
    #[default]
    Default,
    /// Rules registered by the application.
    Author,
}

/// Cascade priority of one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    pub origin: Origin,
    /// 1 if `!important`, 0 otherwise.
    pub important: u8,
    /// Number of ID selectors (`#id`).
    pub id_count: u16,
    /// Number of class + pseudo-class selectors (`.class`, `:hover`).
    pub class_count: u16,
    /// Number of type selectors (`button`, `text`).
    pub type_count: u16,
    /// Registration order of the rule.
    pub source_order: u32,
    /// Position of the declaration within its rule.
    pub index: u32,
}

impl Specificity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the selector part of the tuple. `important` and `index`
    /// start at zero; see [`Specificity::for_declaration`].
    pub fn from_selector(selector: &Selector, source_order: u32, origin: Origin) -> Self {
        let mut id_count: u16 = 0;
        let mut class_count: u16 = 0;
        let mut type_count: u16 = 0;

        for part in &selector.parts {
            if let SelectorPart::Compound(compound) = part {
                for component in &compound.components {
                    match component {
                        SelectorComponent::Id(_) => id_count += 1,
                        SelectorComponent::Class(_) | SelectorComponent::PseudoClass(_) => {
                            class_count += 1
                        }
                        SelectorComponent::Type(_) => type_count += 1,
                        SelectorComponent::Universal => {}
                    }
                }
            }
        }

        Self {
            origin,
            important: 0,
            id_count,
            class_count,
            type_count,
            source_order,
            index: 0,
        }
    }

    /// The priority of the `index`-th declaration of a rule with this
    /// selector specificity.
    pub fn for_declaration(self, important: bool, index: usize) -> Self {
        Self {
            important: u8::from(important),
            index: u32::try_from(index).unwrap_or(u32::MAX),
            ..self
        }
    }

    pub fn is_default(&self) -> bool {
        self.origin == Origin::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::model::{Combinator, CompoundSelector};

    fn simple_selector(components: Vec<SelectorComponent>) -> Selector {
        Selector { parts: vec![SelectorPart::Compound(CompoundSelector { components })] }
    }

    fn author(components: Vec<SelectorComponent>, order: u32) -> Specificity {
        Specificity::from_selector(&simple_selector(components), order, Origin::Author)
    }

    // ── Counting ─────────────────────────────────────────────────────

    #[test]
    fn compound_counts() {
        let spec = author(
            vec![
                SelectorComponent::Type("button".into()),
                SelectorComponent::Class("primary".into()),
                SelectorComponent::PseudoClass("hover".into()),
            ],
            0,
        );
        assert_eq!((spec.id_count, spec.class_count, spec.type_count), (0, 2, 1));
    }

    #[test]
    fn universal_counts_nothing() {
        let spec = author(vec![SelectorComponent::Universal], 0);
        assert_eq!(spec, Specificity { origin: Origin::Author, ..Specificity::new() });
    }

    #[test]
    fn counts_across_combinators() {
        let selector = Selector {
            parts: vec![
                SelectorPart::Compound(CompoundSelector {
                    components: vec![SelectorComponent::Id("list".into())],
                }),
                SelectorPart::Combinator(Combinator::Child),
                SelectorPart::Compound(CompoundSelector {
                    components: vec![
                        SelectorComponent::Type("item".into()),
                        SelectorComponent::Class("selected".into()),
                    ],
                }),
            ],
        };
        let spec = Specificity::from_selector(&selector, 5, Origin::Author);
        assert_eq!((spec.id_count, spec.class_count, spec.type_count), (1, 1, 1));
        assert_eq!(spec.source_order, 5);
    }

    // ── Ordering ─────────────────────────────────────────────────────

    #[test]
    fn id_beats_class_beats_type() {
        let id = author(vec![SelectorComponent::Id("main".into())], 0);
        let class = author(vec![SelectorComponent::Class("foo".into())], 1);
        let tag = author(vec![SelectorComponent::Type("text".into())], 2);
        assert!(id > class);
        assert!(class > tag);
    }

    #[test]
    fn important_beats_higher_selector() {
        let tag = author(vec![SelectorComponent::Type("text".into())], 0);
        let id = author(vec![SelectorComponent::Id("main".into())], 1);
        assert!(tag.for_declaration(true, 0) > id.for_declaration(false, 0));
    }

    #[test]
    fn author_beats_default_important() {
        let sel = simple_selector(vec![SelectorComponent::Universal]);
        let author = Specificity::from_selector(&sel, 0, Origin::Author);
        let default = Specificity::from_selector(&sel, 9, Origin::Default).for_declaration(true, 0);
        assert!(author > default);
        assert!(default.is_default());
    }

    #[test]
    fn source_order_then_index() {
        let a = author(vec![SelectorComponent::Class("x".into())], 0);
        let b = author(vec![SelectorComponent::Class("x".into())], 1);
        assert!(b > a.for_declaration(false, 40));
        assert!(a.for_declaration(false, 2) > a.for_declaration(false, 1));
    }
}
