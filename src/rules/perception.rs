//! Fixed-length observations.

use crate::rules::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// One observation of the environment: a symbol per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perception(Vec<Symbol>);

impl Perception {
    /// Wrap a symbol vector.
    #[must_use]
    pub const fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the perception has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attribute values in order.
    #[must_use]
    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    /// Iterate over attribute values.
    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.0.iter()
    }
}

impl Index<usize> for Perception {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Symbol {
        &self.0[index]
    }
}

impl From<&str> for Perception {
    fn from(s: &str) -> Self {
        Self(s.chars().collect())
    }
}

impl From<Vec<Symbol>> for Perception {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }
}

impl FromIterator<Symbol> for Perception {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Perception {
    type Item = &'a Symbol;
    type IntoIter = std::slice::Iter<'a, Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Perception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for s in &self.0 {
            write!(f, "{s}")?;
        }
        Ok(())
    }
}
