//! Genetic generalization.
//!
//! The GA runs on an action set once the numerosity-weighted mean time since
//! its members last took part exceeds `theta_ga`. Random draws happen in a
//! fixed order so a seeded run is reproducible:
//!
//! 1. first parent, second parent (roulette over `fitness × numerosity`)
//! 2. mutation of the first child, attribute by attribute
//! 3. mutation of the second child
//! 4. crossover coin, then the two cut points if the children's effects agree
//! 5. deletion victims, one roulette draw per excess micro-classifier

// Timestamps averaged as floating point
#![allow(clippy::cast_precision_loss)]

use crate::engine::{
    ActionSet, ClassifierSet, LearningContext, MatchSet, absorb_into, deletion_vote, insert_reported,
    mutate_condition, parent_weight, roulette_select, two_point_crossover,
};
use crate::error::{Acs2Error, Acs2Result};
use crate::events::{Event, Origin, RemovalCause};
use crate::rules::{Classifier, ClassifierKey, Perception};
use rand::Rng;

/// Whether the action set is due for reproduction at `time`.
#[must_use]
pub fn should_apply_ga(population: &ClassifierSet, action_set: &[ClassifierKey], time: u64, theta_ga: u64) -> bool {
    let (weighted, numerosity) = population
        .resolve(action_set)
        .fold((0.0, 0.0), |(w, n), cl| {
            let num = f64::from(cl.numerosity);
            (w + cl.tga as f64 * num, n + num)
        });
    if numerosity <= 0.0 {
        return false;
    }
    time as f64 - weighted / numerosity > theta_ga as f64
}

/// Apply the GA to `action_set`.
///
/// `perception` is the situation the match set was formed for; offspring
/// that match it are added to the match set. Subsumers are looked up in the
/// match set, or in the action set when there is none.
///
/// # Errors
///
/// Returns [`Acs2Error::Shape`] if `perception` has the wrong length.
pub fn apply_ga<R: Rng>(
    time: u64,
    population: &mut ClassifierSet,
    mut match_set: Option<&mut MatchSet>,
    action_set: &mut ActionSet,
    perception: &Perception,
    ctx: &mut LearningContext<'_, R>,
) -> Acs2Result<()> {
    let cfg = ctx.cfg;
    Acs2Error::check_shape(cfg.perception_length, perception.len())?;
    let ga = &cfg.ga;

    action_set.retain(|k| population.contains(k));
    if !should_apply_ga(population, action_set, time, ga.theta_ga) {
        return Ok(());
    }
    for key in action_set.iter() {
        if let Some(cl) = population.get_mut(key) {
            cl.tga = time;
        }
    }

    let weights: Vec<f64> = population.resolve(action_set).map(parent_weight).collect();
    let first = &action_set[roulette_select(&weights, ctx.rng)];
    let second = &action_set[roulette_select(&weights, ctx.rng)];
    let (Some(parent1), Some(parent2)) = (population.get(first), population.get(second)) else {
        return Ok(());
    };
    let mut child1 = parent1.copy_from(time);
    let mut child2 = parent2.copy_from(time);

    mutate_condition(child1.condition_mut(), ga.mu, &ga.mutation_symbols, ctx.rng);
    mutate_condition(child2.condition_mut(), ga.mu, &ga.mutation_symbols, ctx.rng);

    if ctx.rng.gen_bool(ga.chi) && child1.effect() == child2.effect() {
        two_point_crossover(child1.condition_mut(), child2.condition_mut(), ctx.rng);

        let quality = (child1.quality + child2.quality) / 2.0;
        let reward = (child1.reward + child2.reward) / 2.0;
        for child in [&mut child1, &mut child2] {
            child.quality = quality;
            child.reward = reward;
        }
    }
    child1.quality /= 2.0;
    child2.quality /= 2.0;

    ctx.sink.emit(Event::GeneticAlgorithm {
        time,
        action_set_size: action_set.len(),
    });
    tracing::debug!(time, action_set = action_set.len(), "genetic algorithm applied");

    let mut children = vec![child1];
    if child2 != children[0] {
        children.push(child2);
    }
    for child in children {
        if child.condition().specificity() == 0 {
            continue;
        }
        add_ga_classifier(population, match_set.as_deref_mut(), action_set, child, perception, time, ctx)?;
    }

    delete_to_capacity(population, match_set, action_set, time, ctx);
    Ok(())
}

/// Insert an offspring unless an experienced, reliable, more general
/// classifier absorbs it.
fn add_ga_classifier<R: Rng>(
    population: &mut ClassifierSet,
    match_set: Option<&mut MatchSet>,
    action_set: &mut ActionSet,
    child: Classifier,
    perception: &Perception,
    time: u64,
    ctx: &mut LearningContext<'_, R>,
) -> Acs2Result<()> {
    let cfg = ctx.cfg;
    let ga = &cfg.ga;
    if ga.do_subsumption {
        let pool: &[ClassifierKey] = match match_set.as_deref() {
            Some(ms) => ms,
            None => action_set,
        };
        let subsumer = population
            .resolve(pool)
            .filter(|cl| cl.does_subsume(&child, ga.theta_as))
            .reduce(|best, cl| if cl.is_more_general(best) { cl } else { best })
            .map(Classifier::key);
        if let Some(key) = subsumer {
            absorb_into(population, &key, Origin::Reproduction, time, &mut *ctx.sink);
            return Ok(());
        }
    }

    let matches = child.condition().matches(perception)?;
    if let Some(key) = insert_reported(population, child, Origin::Reproduction, time, &mut *ctx.sink) {
        if let Some(ms) = match_set.filter(|_| matches) {
            ms.push(key.clone());
        }
        action_set.push(key);
    }
    Ok(())
}

/// Delete micro-classifiers by roulette until the numerosity ceiling holds.
fn delete_to_capacity<R: Rng>(
    population: &mut ClassifierSet,
    mut match_set: Option<&mut MatchSet>,
    action_set: &mut ActionSet,
    time: u64,
    ctx: &mut LearningContext<'_, R>,
) {
    let ceiling = ctx.cfg.ga.max_numerosity as u64;
    while population.numerosity() > ceiling && !population.is_empty() {
        let votes: Vec<f64> = population.iter().map(deletion_vote).collect();
        let Some(victim) = population.iter().nth(roulette_select(&votes, ctx.rng)).map(Classifier::key) else {
            break;
        };
        let Some(cl) = population.get_mut(&victim) else {
            break;
        };
        if cl.numerosity > 1 {
            cl.numerosity -= 1;
            continue;
        }

        population.remove(&victim);
        action_set.retain(|k| *k != victim);
        if let Some(ms) = match_set.as_deref_mut() {
            ms.retain(|k| *k != victim);
        }
        ctx.sink.emit(Event::Removed {
            time,
            cause: RemovalCause::Deletion,
            classifier: victim,
        });
    }
}
