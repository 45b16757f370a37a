//! Reinforcement step.

use crate::engine::ClassifierSet;
use crate::rules::ClassifierKey;

/// Discounted reward update of every classifier in `action_set`.
///
/// `r += β(reward + γ·next_max_fitness - r)` and `ir += β(reward - ir)`.
pub fn apply_reinforcement_learning(
    population: &mut ClassifierSet,
    action_set: &[ClassifierKey],
    reward: f64,
    next_max_fitness: f64,
    beta: f64,
    gamma: f64,
) {
    let target = reward + gamma * next_max_fitness;
    for key in action_set {
        if let Some(cl) = population.get_mut(key) {
            cl.reward += beta * (target - cl.reward);
            cl.immediate_reward += beta * (reward - cl.immediate_reward);
        }
    }
}
