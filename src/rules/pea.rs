//! Probability-enhanced attributes.
//!
//! A PEA replaces a single anticipated symbol when the environment has shown
//! that a position may change to several values after the same action.
//! Probabilities are learned state; identity (equality, hashing) only depends
//! on which symbols are present, so a classifier keeps its key while its
//! distribution is refined.

// Probability normalisation divides by symbol counts
#![allow(clippy::cast_precision_loss)]

use crate::rules::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Weight given to a newly observed symbol by [`ProbabilityEnhancedAttribute::insert_symbol`].
pub const INSERT_RATE: f64 = 0.5;

/// Probability distribution over symbols, kept in first-observed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbabilityEnhancedAttribute {
    entries: Vec<(Symbol, f64)>,
}

impl ProbabilityEnhancedAttribute {
    /// Distribution holding `symbol` with probability 1.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            entries: vec![(symbol, 1.0)],
        }
    }

    /// Distribution from explicit `(symbol, weight)` pairs, normalised.
    ///
    /// Non-positive weights are dropped; if nothing remains the result is
    /// `None`.
    #[must_use]
    pub fn from_weights(weights: &[(Symbol, f64)]) -> Option<Self> {
        let mut pea = Self {
            entries: Vec::with_capacity(weights.len()),
        };
        for &(symbol, weight) in weights {
            if weight <= 0.0 {
                continue;
            }
            match pea.entries.iter_mut().find(|(s, _)| *s == symbol) {
                Some(entry) => entry.1 += weight,
                None => pea.entries.push((symbol, weight)),
            }
        }
        if pea.entries.is_empty() {
            return None;
        }
        pea.normalize();
        Some(pea)
    }

    /// Number of symbols in the distribution.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`: a PEA holds at least one symbol.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(symbol, probability)` pairs in first-observed order.
    #[must_use]
    pub fn entries(&self) -> &[(Symbol, f64)] {
        &self.entries
    }

    /// Probability of `symbol`, 0 when absent.
    #[must_use]
    pub fn probability(&self, symbol: Symbol) -> f64 {
        self.entries
            .iter()
            .find(|(s, _)| *s == symbol)
            .map_or(0.0, |(_, p)| *p)
    }

    /// Whether `symbol` has non-zero probability.
    #[must_use]
    pub fn does_contain(&self, symbol: Symbol) -> bool {
        self.probability(symbol) > 0.0
    }

    /// Shift probability mass towards a newly observed symbol.
    ///
    /// `p' = (1 - λ)·p + λ·[s = symbol]` with `λ =` [`INSERT_RATE`], which keeps
    /// the total at 1.
    pub fn insert_symbol(&mut self, symbol: Symbol) {
        for (_, p) in &mut self.entries {
            *p *= 1.0 - INSERT_RATE;
        }
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 += INSERT_RATE,
            None => self.entries.push((symbol, INSERT_RATE)),
        }
        self.normalize();
    }

    /// Reinforce `symbol` by `rate` and renormalise.
    ///
    /// Symbols not yet present are added.
    pub fn increase_probability(&mut self, symbol: Symbol, rate: f64) {
        match self.entries.iter_mut().find(|(s, _)| *s == symbol) {
            Some(entry) => entry.1 += rate,
            None => self.entries.push((symbol, rate)),
        }
        self.normalize();
    }

    /// Quality-weighted average of two distributions over their symbol union.
    ///
    /// Equal weights are used when both qualities are zero.
    #[must_use]
    pub fn merge(&self, other: &Self, q1: f64, q2: f64) -> Self {
        let (w1, w2) = if q1 + q2 > 0.0 {
            (q1 / (q1 + q2), q2 / (q1 + q2))
        } else {
            (0.5, 0.5)
        };
        let mut entries: Vec<(Symbol, f64)> = Vec::with_capacity(self.len() + other.len());
        for &(s, p) in &self.entries {
            entries.push((s, w1 * p));
        }
        for &(s, p) in &other.entries {
            match entries.iter_mut().find(|(e, _)| *e == s) {
                Some(entry) => entry.1 += w2 * p,
                None => entries.push((s, w2 * p)),
            }
        }
        let mut merged = Self { entries };
        merged.normalize();
        merged
    }

    /// Symbol with the highest probability; ties go to the earliest observed.
    #[must_use]
    pub fn most_likely_symbol(&self) -> Symbol {
        let mut best = self.entries[0];
        for &entry in &self.entries[1..] {
            if entry.1 > best.1 {
                best = entry;
            }
        }
        best.0
    }

    /// Sum of all probabilities; 1 up to rounding.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }

    fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 {
            for (_, p) in &mut self.entries {
                *p /= total;
            }
        } else {
            let uniform = 1.0 / self.entries.len() as f64;
            for (_, p) in &mut self.entries {
                *p = uniform;
            }
        }
    }

    fn symbol_set(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.entries.iter().map(|(s, _)| *s).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl PartialEq for ProbabilityEnhancedAttribute {
    fn eq(&self, other: &Self) -> bool {
        self.symbol_set() == other.symbol_set()
    }
}

impl Eq for ProbabilityEnhancedAttribute {}

impl Hash for ProbabilityEnhancedAttribute {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.symbol_set().hash(state);
    }
}

impl fmt::Display for ProbabilityEnhancedAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (s, p)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{s}:{:.0}%", p * 100.0)?;
        }
        write!(f, "}}")
    }
}
