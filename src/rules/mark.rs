//! Marks record where a classifier's wildcards failed to tell situations apart.

use crate::rules::{Condition, Perception, Symbol};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Per-position sets of perceptual values seen at wildcard positions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    positions: Vec<BTreeSet<Symbol>>,
}

impl Mark {
    /// Empty mark for conditions of the given length.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self {
            positions: vec![BTreeSet::new(); length],
        }
    }

    /// Whether any position holds a value.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.positions.iter().any(|s| !s.is_empty())
    }

    /// Values recorded at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> &BTreeSet<Symbol> {
        &self.positions[index]
    }

    /// Indices holding at least one value.
    pub fn marked_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(i, _)| i)
    }

    /// Drop every recorded value.
    pub fn clear(&mut self) {
        for s in &mut self.positions {
            s.clear();
        }
    }

    /// Record `perception` at every wildcard position of `condition`.
    ///
    /// Returns whether a value not seen before was recorded.
    pub fn set_mark_using_condition(&mut self, condition: &Condition, perception: &Perception) -> bool {
        let mut changed = false;
        for (i, set) in self.positions.iter_mut().enumerate() {
            if condition.is_wildcard(i) {
                changed |= set.insert(perception[i]);
            }
        }
        changed
    }

    /// Whether both marks cover the same positions.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.positions.len() == other.positions.len()
            && self
                .positions
                .iter()
                .zip(&other.positions)
                .all(|(a, b)| a.is_empty() == b.is_empty())
    }

    /// Condition attributes that would tell `p0` apart from the marked situations.
    ///
    /// If some marked position has not seen `p0`'s value, one such position is
    /// picked uniformly. Otherwise every position that has seen more than one
    /// value is used. The result is fully general when the mark is empty or
    /// neither rule applies.
    pub fn differences<R: Rng>(&self, p0: &Perception, wildcard: Symbol, rng: &mut R) -> Condition {
        let mut diff = Condition::general(self.positions.len(), wildcard);
        if !self.is_marked() {
            return diff;
        }

        let unseen: Vec<usize> = self
            .positions
            .iter()
            .enumerate()
            .filter(|(i, s)| !s.is_empty() && !s.contains(&p0[*i]))
            .map(|(i, _)| i)
            .collect();

        if unseen.is_empty() {
            for (i, s) in self.positions.iter().enumerate() {
                if s.len() > 1 {
                    diff.specialize(i, p0[i]);
                }
            }
        } else {
            let i = unseen[rng.gen_range(0..unseen.len())];
            diff.specialize(i, p0[i]);
        }
        diff
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for i in self.marked_positions() {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{i}:")?;
            for s in &self.positions[i] {
                write!(f, "{s}")?;
            }
        }
        Ok(())
    }
}
