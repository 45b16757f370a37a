//! Roulette-wheel selection for reproduction and deletion.
//!
//! Parents are drawn in proportion to `fitness × numerosity`. Deletion draws
//! victims in proportion to [`deletion_vote`], which favours weak, specific,
//! inexperienced classifiers.

// Specificity ratios and square roots of counters
#![allow(clippy::cast_precision_loss)]

use crate::rules::Classifier;
use rand::Rng;

/// Draw an index with probability proportional to `weights`.
///
/// Falls back to a uniform draw when no weight is positive. `weights` must
/// not be empty.
pub fn roulette_select<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return rng.gen_range(0..weights.len());
    }

    let mut point = rng.gen_range(0.0..total);
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        if point < w {
            return i;
        }
        point -= w;
    }
    // Rounding can leave the point just past the last positive weight
    weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
}

/// Reproduction weight of a classifier.
#[must_use]
pub fn parent_weight(cl: &Classifier) -> f64 {
    cl.fitness() * f64::from(cl.numerosity)
}

/// Deletion weight of a classifier.
///
/// `num × (1 + specificity / L) / (fitness + 0.01) / √exp`, scaled by 0.1 for
/// reliable classifiers.
#[must_use]
pub fn deletion_vote(cl: &Classifier) -> f64 {
    let length = cl.condition().len().max(1) as f64;
    let specificity = cl.condition().specificity() as f64 / length;
    let vote = f64::from(cl.numerosity) * (1.0 + specificity)
        / (cl.fitness().max(0.0) + 0.01)
        / f64::from(cl.experience.max(1)).sqrt();
    if cl.is_reliable() { vote * 0.1 } else { vote }
}
