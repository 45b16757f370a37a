//! Rule model of the classifier system.
//!
//! A classifier is a condition-action-effect triple plus learned statistics.
//! Everything here is plain data with local operations; the population-level
//! learning processes live in [`crate::engine`].
//!
//! # Structure
//!
//! ```text
//! Classifier
//! ├── Condition   "##0#"   wildcard-capable pattern over a Perception
//! ├── Action      2
//! ├── Effect      "##1#"   Plain symbols or ProbabilityEnhancedAttribute
//! └── Mark        {2: [0, 1]}
//! ```

mod classifier;
mod condition;
mod effect;
mod mark;
mod pea;
mod perception;

pub use classifier::{Classifier, ClassifierBuilder, ClassifierKey, QUALITY_INITIAL, REWARD_INITIAL};
pub use condition::Condition;
pub use effect::{Effect, EffectAttribute};
pub use mark::Mark;
pub use pea::{INSERT_RATE, ProbabilityEnhancedAttribute};
pub use perception::Perception;

/// A single perceptual attribute value.
pub type Symbol = char;

/// Action identifier in `0..number_of_actions`.
pub type Action = usize;
