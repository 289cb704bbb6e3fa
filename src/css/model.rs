//! CSS AST: Selector, RuleSet, Declaration.

use std::fmt;

/// A single CSS selector component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorComponent {
    /// Type selector: matches the widget type name (e.g. `button`).
    Type(String),
    /// Universal selector: `*`.
    Universal,
    /// Class selector: `.classname`.
    Class(String),
    /// ID selector: `#id`.
    Id(String),
    /// Pseudo-class: `:hover`, `:first-child`, etc.
    PseudoClass(String),
}

/// A combinator between compound selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (whitespace): `A B`.
    Descendant,
    /// Child combinator: `A > B`.
    Child,
    /// Adjacent sibling combinator: `A + B`.
    Adjacent,
    /// General sibling combinator: `A ~ B`.
    Sibling,
}

/// A single compound selector (sequence of components without combinators).
///
/// For example, `button.primary:hover` is one `CompoundSelector` with three
/// components: `Type("button")`, `Class("primary")`, `PseudoClass("hover")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    /// Create an empty compound selector.
    pub fn new() -> Self {
        Self { components: Vec::new() }
    }

    /// Append a component to this compound selector.
    pub fn push(&mut self, component: SelectorComponent) {
        self.components.push(component);
    }

    /// The most selective index key of this compound: `#id`, then `.class`,
    /// then the type name, then `*`.
    pub fn index_key(&self) -> String {
        let mut class_key = None;
        let mut type_key = None;
        for component in &self.components {
            match component {
                SelectorComponent::Id(id) => return format!("#{id}"),
                SelectorComponent::Class(c) if class_key.is_none() => {
                    class_key = Some(format!(".{c}"));
                }
                SelectorComponent::Type(t) if type_key.is_none() => {
                    type_key = Some(t.clone());
                }
                _ => {}
            }
        }
        class_key.or(type_key).unwrap_or_else(|| "*".to_string())
    }
}

/// One element in a selector chain: either a compound selector or a combinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorPart {
    /// A compound selector (one or more simple selectors).
    Compound(CompoundSelector),
    /// A combinator between compound selectors.
    Combinator(Combinator),
}

/// A full CSS selector: chain of compound selectors joined by combinators.
///
/// For example, `.list > item.selected` is a `Selector` with parts:
/// `[Compound(.list), Combinator(Child), Compound(item.selected)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Alternating compound selectors and combinators.
    /// Always starts and ends with a `SelectorPart::Compound`.
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    /// Create an empty selector.
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// The right-most compound, which is the one tested against the
    /// widget being styled.
    pub fn subject(&self) -> Option<&CompoundSelector> {
        match self.parts.last() {
            Some(SelectorPart::Compound(compound)) => Some(compound),
            _ => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                SelectorPart::Compound(compound) => {
                    for component in &compound.components {
                        match component {
                            SelectorComponent::Type(t) => write!(f, "{t}")?,
                            SelectorComponent::Universal => write!(f, "*")?,
                            SelectorComponent::Class(c) => write!(f, ".{c}")?,
                            SelectorComponent::Id(id) => write!(f, "#{id}")?,
                            SelectorComponent::PseudoClass(p) => write!(f, ":{p}")?,
                        }
                    }
                }
                SelectorPart::Combinator(Combinator::Descendant) => write!(f, " ")?,
                SelectorPart::Combinator(Combinator::Child) => write!(f, " > ")?,
                SelectorPart::Combinator(Combinator::Adjacent) => write!(f, " + ")?,
                SelectorPart::Combinator(Combinator::Sibling) => write!(f, " ~ ")?,
            }
        }
        Ok(())
    }
}

/// A value token within a CSS declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationValue {
    /// An identifier like `red`, `solid`, `center`.
    Ident(String),
    /// A bare number like `10`, `0.5`.
    Number(f32),
    /// A number with a unit suffix like `10px`, `50%`, `80vh`.
    Dimension(f32, String),
    /// A hex color string (without the `#` prefix), e.g. `"ff00aa"`.
    Color(String),
    /// A quoted string value.
    String(String),
    /// The body of `url(...)`, quotes stripped.
    Url(String),
    /// A function call such as `rgba(0, 0, 0, 0.5)`; commas are dropped
    /// from the argument list.
    Function(String, Vec<DeclarationValue>),
    /// A top-level comma, kept so list values (font families) survive.
    Comma,
    /// A top-level `/`.
    Slash,
}

/// A single CSS property declaration, e.g. `color: red` or `margin: 0 auto`.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// The property name, e.g. `"color"`, `"margin"`.
    pub property: String,
    /// The declaration values.
    pub values: Vec<DeclarationValue>,
    /// Whether `!important` was specified.
    pub important: bool,
}

impl Declaration {
    /// Create a new declaration.
    pub fn new(property: impl Into<String>, values: Vec<DeclarationValue>, important: bool) -> Self {
        Self { property: property.into(), values, important }
    }
}

/// A CSS rule: one or more selectors paired with declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    /// The selectors for this rule (comma-separated in CSS).
    pub selectors: Vec<Selector>,
    /// The property declarations inside the `{ ... }` block.
    pub declarations: Vec<Declaration>,
}

/// A parsed CSS stylesheet: a list of rule sets.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    pub rules: Vec<RuleSet>,
}
