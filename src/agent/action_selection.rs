//! Epsilon-greedy action choice.

use crate::engine::ClassifierSet;
use crate::rules::{Action, Classifier, ClassifierKey};
use rand::Rng;

/// Action of the fittest match-set classifier that anticipates a change.
///
/// Ties keep the earliest classifier. `None` when no classifier anticipates
/// a change.
#[must_use]
pub fn best_action(population: &ClassifierSet, match_set: &[ClassifierKey]) -> Option<Action> {
    let mut best: Option<&Classifier> = None;
    for cl in population.resolve(match_set) {
        if !cl.does_anticipate_change() {
            continue;
        }
        if best.is_none_or(|b| cl.fitness() > b.fitness()) {
            best = Some(cl);
        }
    }
    best.map(Classifier::action)
}

/// With probability `epsilon` a uniform action, otherwise [`best_action`]
/// falling back to a uniform action.
pub fn choose_action<R: Rng>(
    population: &ClassifierSet,
    match_set: &[ClassifierKey],
    number_of_actions: usize,
    epsilon: f64,
    rng: &mut R,
) -> Action {
    if epsilon > 0.0 && rng.gen_bool(epsilon) {
        return rng.gen_range(0..number_of_actions);
    }
    best_action(population, match_set).unwrap_or_else(|| rng.gen_range(0..number_of_actions))
}
