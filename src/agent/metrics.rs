//! Per-trial measurements and model knowledge.

// Percentages over counts
#![allow(clippy::cast_precision_loss)]

use crate::engine::{AlpReport, ClassifierSet};
use crate::error::Acs2Result;
use crate::rules::{Action, Perception};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of one trial and of the population after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialMetrics {
    /// Trial index within the run.
    pub trial: usize,
    /// Steps taken in this trial.
    pub steps: usize,
    /// Steps taken by the agent so far.
    pub total_steps: u64,
    /// Reward collected in this trial.
    pub reward: f64,
    /// Number of macro-classifiers.
    pub population: usize,
    /// Total numerosity.
    pub numerosity: u64,
    /// Number of reliable classifiers.
    pub reliable: usize,
    /// Mean quality, `None` for an empty population.
    pub quality: Option<f64>,
    /// Mean fitness, `None` for an empty population.
    pub fitness: Option<f64>,
    /// Whether the trial explored (and learned anticipations).
    pub explore: bool,
    /// Percentage of correct anticipations; `None` for exploit trials or
    /// trials without any ALP application.
    pub anticipation_ratio: Option<f64>,
}

impl TrialMetrics {
    /// Measure `population` after a trial.
    #[must_use]
    pub fn collect(
        population: &ClassifierSet,
        trial: usize,
        steps: usize,
        total_steps: u64,
        reward: f64,
        anticipation: Option<AlpReport>,
    ) -> Self {
        Self {
            trial,
            steps,
            total_steps,
            reward,
            population: population.len(),
            numerosity: population.numerosity(),
            reliable: population.reliable_count(),
            quality: population.mean_quality(),
            fitness: population.mean_fitness(),
            explore: anticipation.is_some(),
            anticipation_ratio: anticipation.and_then(|r| r.ratio()),
        }
    }
}

impl fmt::Display for TrialMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "trial {} ({}) steps {} reward {:.1} population {} numerosity {} reliable {}",
            self.trial,
            if self.explore { "explore" } else { "exploit" },
            self.steps,
            self.reward,
            self.population,
            self.numerosity,
            self.reliable,
        )?;
        if let Some(q) = self.quality {
            write!(f, " quality {q:.3}")?;
        }
        if let Some(ratio) = self.anticipation_ratio {
            write!(f, " anticipated {ratio:.1}%")?;
        }
        Ok(())
    }
}

/// Percentage of `transitions` predicted by at least one reliable classifier.
///
/// `None` when there are no transitions to check.
///
/// # Errors
///
/// Returns [`crate::Acs2Error::Shape`] if a transition has the wrong length.
pub fn knowledge(
    population: &ClassifierSet,
    transitions: &[(Perception, Action, Perception)],
) -> Acs2Result<Option<f64>> {
    if transitions.is_empty() {
        return Ok(None);
    }
    let reliable: Vec<_> = population.iter().filter(|cl| cl.is_reliable()).collect();
    let mut known = 0usize;
    for (p0, action, p1) in transitions {
        for cl in &reliable {
            if cl.predicts_successfully(p0, *action, p1)? {
                known += 1;
                break;
            }
        }
    }
    Ok(Some(known as f64 * 100.0 / transitions.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::rules::Classifier;

    #[test]
    fn test_knowledge_counts_reliable_predictions() {
        let cfg = Configuration::new(2, 2);
        let mut population = ClassifierSet::new();
        population.insert(
            Classifier::builder()
                .config(&cfg)
                .condition("0#")
                .action(0)
                .effect("1#")
                .quality(0.95)
                .build()
                .unwrap(),
        );
        // Correct but not reliable
        population.insert(
            Classifier::builder()
                .config(&cfg)
                .condition("#0")
                .action(1)
                .effect("#1")
                .build()
                .unwrap(),
        );
        let transitions = vec![
            (Perception::from("00"), 0, Perception::from("10")),
            (Perception::from("00"), 1, Perception::from("01")),
        ];
        assert_eq!(knowledge(&population, &transitions).unwrap(), Some(50.0));
        assert_eq!(knowledge(&population, &[]).unwrap(), None);
    }

    #[test]
    fn test_exploit_metrics_have_no_ratio() {
        let population = ClassifierSet::new();
        let metrics = TrialMetrics::collect(&population, 3, 10, 100, 0.0, None);
        assert!(!metrics.explore);
        assert_eq!(metrics.anticipation_ratio, None);
        assert_eq!(metrics.quality, None);
    }
}
