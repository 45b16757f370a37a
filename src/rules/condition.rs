//! Condition part of a classifier.

use crate::error::{Acs2Error, Acs2Result};
use crate::rules::{Perception, Symbol};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Wildcard-capable pattern over perceptions.
///
/// The length is fixed at construction; every operation that takes another
/// perception-string or a perception checks it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    attributes: Vec<Symbol>,
    wildcard: Symbol,
}

impl Condition {
    /// Fully general condition of the given length.
    #[must_use]
    pub fn general(length: usize, wildcard: Symbol) -> Self {
        Self {
            attributes: vec![wildcard; length],
            wildcard,
        }
    }

    /// Condition from explicit attribute values.
    #[must_use]
    pub const fn new(attributes: Vec<Symbol>, wildcard: Symbol) -> Self {
        Self {
            attributes,
            wildcard,
        }
    }

    /// Parse a condition written as a string, e.g. `"##1#"`.
    #[must_use]
    pub fn parse(s: &str, wildcard: Symbol) -> Self {
        Self::new(s.chars().collect(), wildcard)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the condition has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The wildcard symbol.
    #[must_use]
    pub const fn wildcard(&self) -> Symbol {
        self.wildcard
    }

    /// Attribute values in order.
    #[must_use]
    pub fn attributes(&self) -> &[Symbol] {
        &self.attributes
    }

    /// Whether position `index` is a wildcard.
    #[must_use]
    pub fn is_wildcard(&self, index: usize) -> bool {
        self.attributes[index] == self.wildcard
    }

    /// Number of non-wildcard positions.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.attributes.iter().filter(|&&a| a != self.wildcard).count()
    }

    /// Indices of non-wildcard positions.
    pub fn specified_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.attributes
            .iter()
            .enumerate()
            .filter(|(_, a)| **a != self.wildcard)
            .map(|(i, _)| i)
    }

    /// Pointwise match: wildcards match anything, other positions need equality.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Shape`] if the perception length differs.
    pub fn matches(&self, perception: &Perception) -> Acs2Result<bool> {
        Acs2Error::check_shape(self.len(), perception.len())?;
        Ok(self
            .attributes
            .iter()
            .zip(perception)
            .all(|(&c, &p)| c == self.wildcard || c == p))
    }

    /// Set position `index` to `value`.
    pub fn specialize(&mut self, index: usize, value: Symbol) {
        self.attributes[index] = value;
    }

    /// Set position `index` to the wildcard.
    pub fn generalize(&mut self, index: usize) {
        self.attributes[index] = self.wildcard;
    }

    /// Copy every specified position of `other` into this condition.
    pub fn specialize_with(&mut self, other: &Self) {
        for (mine, &theirs) in self.attributes.iter_mut().zip(&other.attributes) {
            if theirs != other.wildcard {
                *mine = theirs;
            }
        }
    }

    /// Generalize every position where `other` holds a different value.
    pub fn generalize_disagreements(&mut self, other: &Self) {
        for (mine, &theirs) in self.attributes.iter_mut().zip(&other.attributes) {
            if *mine != theirs {
                *mine = self.wildcard;
            }
        }
    }

    /// Generalize one uniformly chosen specified position.
    ///
    /// Returns `false` if the condition is already fully general.
    pub fn generalize_random_specified<R: Rng>(&mut self, rng: &mut R) -> bool {
        let specified: Vec<usize> = self.specified_indices().collect();
        if specified.is_empty() {
            return false;
        }
        let index = specified[rng.gen_range(0..specified.len())];
        self.generalize(index);
        true
    }

    /// Whether every situation matched by `other` is also matched by `self`.
    #[must_use]
    pub fn does_subsume(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .attributes
                .iter()
                .zip(&other.attributes)
                .all(|(&mine, &theirs)| mine == self.wildcard || mine == theirs)
    }
}

impl Index<usize> for Condition {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Symbol {
        &self.attributes[index]
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.attributes {
            write!(f, "{a}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_matching() {
        let c = Condition::parse("#1#0", '#');
        assert!(c.matches(&Perception::from("0110")).unwrap());
        assert!(c.matches(&Perception::from("1100")).unwrap());
        assert!(!c.matches(&Perception::from("0011")).unwrap());
    }

    #[test]
    fn test_matching_shape_error() {
        let c = Condition::general(4, '#');
        assert_eq!(
            c.matches(&Perception::from("010")),
            Err(Acs2Error::shape(4, 3))
        );
    }

    #[test]
    fn test_specialize_and_generalize() {
        let mut c = Condition::general(4, '#');
        c.specialize(2, '0');
        assert_eq!(c.to_string(), "##0#");
        assert_eq!(c.specificity(), 1);
        c.generalize(2);
        assert_eq!(c.specificity(), 0);
    }

    #[test]
    fn test_subsumption() {
        let general = Condition::parse("#1##", '#');
        let specific = Condition::parse("01#1", '#');
        assert!(general.does_subsume(&specific));
        assert!(!specific.does_subsume(&general));
        assert!(!Condition::parse("#0##", '#').does_subsume(&specific));
    }

    #[test]
    fn test_generalize_disagreements() {
        let mut c = Condition::parse("01#1", '#');
        c.generalize_disagreements(&Condition::parse("00#1", '#'));
        assert_eq!(c.to_string(), "0##1");
    }

    #[test]
    fn test_generalize_random_specified() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut c = Condition::parse("1#0#", '#');
        assert!(c.generalize_random_specified(&mut rng));
        assert_eq!(c.specificity(), 1);
        assert!(c.generalize_random_specified(&mut rng));
        assert!(!c.generalize_random_specified(&mut rng));
    }
}
