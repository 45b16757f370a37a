//! Population-level learning.
//!
//! One environment transition drives one learning cycle:
//!
//! ```text
//! form_match_set(p0) ─► form_action_set(a) ─► env.step(a) ─► p1
//!                                                           │
//!        apply_alp ◄──────────────┬─────────────────────────┘
//!        apply_reinforcement_learning
//!        apply_ga (optional)
//! ```
//!
//! Match and action sets are lists of [`ClassifierKey`]s into the
//! [`ClassifierSet`]. The ALP and the GA are the only code that changes rule
//! content; both take a [`LearningContext`] carrying the configuration, the
//! shared random source and the event sink.

mod alp;
mod crossover;
mod ga;
mod mutation;
mod population;
mod rl;
mod selection;

pub use alp::{AlpReport, apply_alp};
pub use crossover::two_point_crossover;
pub use ga::{apply_ga, should_apply_ga};
pub use mutation::mutate_condition;
pub use population::{ActionSet, ClassifierSet, Insertion, MatchSet};
pub use rl::apply_reinforcement_learning;
pub use selection::{deletion_vote, parent_weight, roulette_select};

use crate::config::Configuration;
use crate::events::{Event, EventSink, Origin};
use crate::rules::{Classifier, ClassifierKey};
use rand::Rng;
use std::fmt;

/// Everything a learning operator needs besides the population and views.
pub struct LearningContext<'a, R: Rng> {
    /// Run configuration.
    pub cfg: &'a Configuration,
    /// Single shared random source.
    pub rng: &'a mut R,
    /// Receiver of population events.
    pub sink: &'a mut dyn EventSink,
}

impl<'a, R: Rng> LearningContext<'a, R> {
    /// Bundle the collaborators of one learning step.
    #[must_use]
    pub fn new(cfg: &'a Configuration, rng: &'a mut R, sink: &'a mut dyn EventSink) -> Self {
        Self { cfg, rng, sink }
    }
}

impl<R: Rng> fmt::Debug for LearningContext<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearningContext")
            .field("cfg", self.cfg)
            .finish_non_exhaustive()
    }
}

/// Insert through the insertion rule and report the outcome.
///
/// Returns the key when a new entry was created.
fn insert_reported(
    population: &mut ClassifierSet,
    classifier: Classifier,
    origin: Origin,
    time: u64,
    sink: &mut dyn EventSink,
) -> Option<ClassifierKey> {
    let key = classifier.key();
    match population.insert(classifier) {
        Insertion::Added => {
            sink.emit(Event::Created {
                time,
                origin,
                classifier: key.clone(),
            });
            Some(key)
        }
        Insertion::Absorbed => {
            let numerosity = population.get(&key).map_or(0, |cl| cl.numerosity);
            sink.emit(Event::Absorbed {
                time,
                origin,
                into: key,
                numerosity,
            });
            None
        }
    }
}

/// Add one to `into`'s numerosity on behalf of a subsumed candidate.
fn absorb_into(
    population: &mut ClassifierSet,
    into: &ClassifierKey,
    origin: Origin,
    time: u64,
    sink: &mut dyn EventSink,
) {
    if let Some(cl) = population.get_mut(into) {
        cl.numerosity = cl.numerosity.saturating_add(1);
        let numerosity = cl.numerosity;
        sink.emit(Event::Absorbed {
            time,
            origin,
            into: into.clone(),
            numerosity,
        });
    }
}
