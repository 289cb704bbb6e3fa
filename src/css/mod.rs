//! CSS engine: tokenizer, parser, property table, rule store, cascade.

pub mod tokenizer;
pub mod model;
pub mod parser;
pub mod values;
pub mod properties;
pub mod declaration;
pub mod computed;
pub mod specificity;
pub mod stylesheet;
pub mod cascade;

pub use computed::{ComputedStyle, StyleDiff};
pub use declaration::StyleDeclaration;
pub use parser::ParseError;
pub use properties::{Property, PropertyError, PropertyKey, PropertyRegistry};
pub use specificity::{Origin, Specificity};
pub use stylesheet::RuleStore;
