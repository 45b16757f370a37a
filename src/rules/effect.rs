//! Effect part of a classifier.

use crate::error::{Acs2Error, Acs2Result};
use crate::rules::{Perception, ProbabilityEnhancedAttribute, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One position of an effect.
///
/// `Plain(wildcard)` passes the attribute through unchanged, any other
/// `Plain` symbol anticipates a change to exactly that value, and `Enhanced`
/// anticipates a change to one of several values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectAttribute {
    /// Single anticipated symbol, or the wildcard.
    Plain(Symbol),
    /// Learned distribution over anticipated symbols.
    Enhanced(ProbabilityEnhancedAttribute),
}

impl EffectAttribute {
    fn to_distribution(&self) -> ProbabilityEnhancedAttribute {
        match self {
            Self::Plain(s) => ProbabilityEnhancedAttribute::new(*s),
            Self::Enhanced(pea) => pea.clone(),
        }
    }
}

/// Anticipated perception after an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Effect {
    attributes: Vec<EffectAttribute>,
    wildcard: Symbol,
}

impl Effect {
    /// Effect anticipating no change at all.
    #[must_use]
    pub fn general(length: usize, wildcard: Symbol) -> Self {
        Self {
            attributes: vec![EffectAttribute::Plain(wildcard); length],
            wildcard,
        }
    }

    /// Effect from explicit attributes.
    #[must_use]
    pub const fn new(attributes: Vec<EffectAttribute>, wildcard: Symbol) -> Self {
        Self {
            attributes,
            wildcard,
        }
    }

    /// Parse a plain effect written as a string, e.g. `"##1#"`.
    #[must_use]
    pub fn parse(s: &str, wildcard: Symbol) -> Self {
        Self::new(s.chars().map(EffectAttribute::Plain).collect(), wildcard)
    }

    /// Effect anticipating exactly the change from `p0` to `p1`.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Shape`] if the perceptions differ in length.
    pub fn for_perception_change(
        p0: &Perception,
        p1: &Perception,
        wildcard: Symbol,
    ) -> Acs2Result<Self> {
        Acs2Error::check_shape(p0.len(), p1.len())?;
        let attributes = p0
            .iter()
            .zip(p1)
            .map(|(&a, &b)| EffectAttribute::Plain(if a == b { wildcard } else { b }))
            .collect();
        Ok(Self::new(attributes, wildcard))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether the effect has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// The wildcard symbol.
    #[must_use]
    pub const fn wildcard(&self) -> Symbol {
        self.wildcard
    }

    /// Attributes in order.
    #[must_use]
    pub fn attributes(&self) -> &[EffectAttribute] {
        &self.attributes
    }

    /// Attribute at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> &EffectAttribute {
        &self.attributes[index]
    }

    /// Whether position `index` passes through unchanged.
    #[must_use]
    pub fn is_wildcard(&self, index: usize) -> bool {
        matches!(self.attributes[index], EffectAttribute::Plain(s) if s == self.wildcard)
    }

    /// Whether any position is probability-enhanced.
    #[must_use]
    pub fn is_enhanced(&self) -> bool {
        self.attributes
            .iter()
            .any(|a| matches!(a, EffectAttribute::Enhanced(_)))
    }

    /// Whether some change is anticipated.
    #[must_use]
    pub fn specify_change(&self) -> bool {
        self.attributes.iter().any(|a| match a {
            EffectAttribute::Plain(s) => *s != self.wildcard,
            EffectAttribute::Enhanced(_) => true,
        })
    }

    /// Whether specialization alone can make this effect anticipate `p0 -> p1`.
    #[must_use]
    pub fn is_specializable(&self, p0: &Perception, p1: &Perception) -> bool {
        if self.is_enhanced() {
            return true;
        }
        self.attributes
            .iter()
            .zip(p0.iter().zip(p1))
            .all(|(attr, (&a, &b))| match attr {
                EffectAttribute::Plain(s) if *s != self.wildcard => *s == b && a != b,
                _ => true,
            })
    }

    /// Whether every position anticipates the observed transition.
    #[must_use]
    pub fn anticipates(&self, p0: &Perception, p1: &Perception) -> bool {
        self.len() == p0.len()
            && p0.len() == p1.len()
            && self
                .attributes
                .iter()
                .zip(p0.iter().zip(p1))
                .all(|(attr, (&a, &b))| match attr {
                    EffectAttribute::Plain(s) if *s == self.wildcard => a == b,
                    EffectAttribute::Plain(s) => a != b && *s == b,
                    EffectAttribute::Enhanced(pea) => pea.does_contain(b),
                })
    }

    /// Make position `index` anticipate `observed`.
    ///
    /// A pass-through becomes the plain symbol; a different plain symbol is
    /// promoted to a distribution holding both; a distribution absorbs the
    /// new symbol.
    pub fn specialize(&mut self, index: usize, observed: Symbol) {
        let wildcard = self.wildcard;
        let replacement = match &mut self.attributes[index] {
            EffectAttribute::Plain(s) if *s == wildcard => Some(EffectAttribute::Plain(observed)),
            EffectAttribute::Plain(s) if *s == observed => None,
            EffectAttribute::Plain(s) => {
                let mut pea = ProbabilityEnhancedAttribute::new(*s);
                pea.insert_symbol(observed);
                Some(EffectAttribute::Enhanced(pea))
            }
            EffectAttribute::Enhanced(pea) => {
                pea.insert_symbol(observed);
                None
            }
        };
        if let Some(attr) = replacement {
            self.attributes[index] = attr;
        }
    }

    /// Reinforce the observed symbol at every enhanced position.
    ///
    /// Symbols a distribution does not already hold are left out so the
    /// effect keeps its identity.
    pub fn update_enhanced_probabilities(&mut self, perception: &Perception, rate: f64) {
        let enhanced = self
            .attributes
            .iter_mut()
            .zip(perception)
            .filter_map(|(attr, &observed)| match attr {
                EffectAttribute::Enhanced(pea) => Some((pea, observed)),
                EffectAttribute::Plain(_) => None,
            });
        for (pea, observed) in enhanced {
            if pea.does_contain(observed) {
                pea.increase_probability(observed, rate);
            }
        }
    }

    /// Quality-weighted merge of two effects.
    ///
    /// Positions where only one effect passes through take the value from
    /// `perception`. A merged position collapses back to a plain symbol only
    /// when both sides anticipated that same symbol.
    #[must_use]
    pub fn enhanced_merge(&self, other: &Self, q1: f64, q2: f64, perception: &Perception) -> Self {
        let wildcard = self.wildcard;
        let attributes = self
            .attributes
            .iter()
            .zip(&other.attributes)
            .zip(perception)
            .map(|((a1, a2), &p)| {
                let pass1 = matches!(a1, EffectAttribute::Plain(s) if *s == wildcard);
                let pass2 = matches!(a2, EffectAttribute::Plain(s) if *s == wildcard);
                if pass1 && pass2 {
                    return EffectAttribute::Plain(wildcard);
                }
                let d1 = if pass1 {
                    ProbabilityEnhancedAttribute::new(p)
                } else {
                    a1.to_distribution()
                };
                let d2 = if pass2 {
                    ProbabilityEnhancedAttribute::new(p)
                } else {
                    a2.to_distribution()
                };
                let merged = d1.merge(&d2, q1, q2);
                if merged.len() == 1 && !pass1 && !pass2 {
                    EffectAttribute::Plain(merged.most_likely_symbol())
                } else {
                    EffectAttribute::Enhanced(merged)
                }
            })
            .collect();
        Self::new(attributes, wildcard)
    }

    /// Copy with every distribution replaced by its most likely symbol.
    #[must_use]
    pub fn reduced_to_non_enhanced(&self) -> Self {
        let attributes = self
            .attributes
            .iter()
            .map(|a| match a {
                EffectAttribute::Plain(s) => EffectAttribute::Plain(*s),
                EffectAttribute::Enhanced(pea) => EffectAttribute::Plain(pea.most_likely_symbol()),
            })
            .collect();
        Self::new(attributes, self.wildcard)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for a in &self.attributes {
            match a {
                EffectAttribute::Plain(s) => write!(f, "{s}")?,
                EffectAttribute::Enhanced(pea) => write!(f, "{pea}")?,
            }
        }
        Ok(())
    }
}
