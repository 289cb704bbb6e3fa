//! Style declaration store: an ordered longhand → value mapping.
//!
//! Used for a widget's inline style and for the declaration block of every
//! registered rule. Shorthands are expanded on insertion.

use tracing::debug;

use crate::css::model::{Declaration, DeclarationValue};
use crate::css::parser::parse_declarations;
use crate::css::properties::{expand_shorthand, PropertyKey};

/// A declared value and its importance.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredValue {
    pub values: Vec<DeclarationValue>,
    pub important: bool,
}

/// Ordered mapping from property key to declared value.
///
/// Setting a key that is already present replaces its value in place,
/// unless the existing entry is `!important` and the new one is not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDeclaration {
    entries: Vec<(PropertyKey, DeclaredValue)>,
}

impl StyleDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a declaration block such as `width: 10px; color: red`.
    pub fn parse(text: &str) -> Self {
        Self::from_declarations(&parse_declarations(text))
    }

    pub fn from_declarations(declarations: &[Declaration]) -> Self {
        let mut store = Self::new();
        for declaration in declarations {
            store.push(declaration);
        }
        store
    }

    /// Add a parsed declaration, expanding shorthands. Invalid shorthands
    /// are dropped.
    pub fn push(&mut self, declaration: &Declaration) {
        match expand_shorthand(&declaration.property, &declaration.values) {
            Ok(longhands) => {
                for (key, values) in longhands {
                    self.set(key, values, declaration.important);
                }
            }
            Err(err) => debug!(error = %err, "dropping declaration"),
        }
    }

    /// Set one longhand. Returns `false` when an important entry kept its
    /// value.
    pub fn set(&mut self, key: PropertyKey, values: Vec<DeclarationValue>, important: bool) -> bool {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => {
                if existing.important && !important {
                    return false;
                }
                *existing = DeclaredValue { values, important };
            }
            None => self.entries.push((key, DeclaredValue { values, important })),
        }
        true
    }

    /// Set one longhand regardless of the importance of an existing entry.
    pub fn replace(&mut self, key: PropertyKey, values: Vec<DeclarationValue>, important: bool) {
        let value = DeclaredValue { values, important };
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&DeclaredValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<DeclaredValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Merge `other` on top of `self`, following [`StyleDeclaration::set`].
    pub fn merge(&mut self, other: &StyleDeclaration) {
        for (key, value) in &other.entries {
            self.set(key.clone(), value.values.clone(), value.important);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyKey, &DeclaredValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
