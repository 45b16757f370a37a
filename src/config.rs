//! Run configuration.
//!
//! A [`Configuration`] is fixed for the lifetime of a run. The perception
//! length and the number of actions have no sensible default and must always
//! be supplied; the learning and GA groups default to the reference ACS2
//! parameter values.

use crate::error::{Acs2Error, Acs2Result};
use crate::rules::Symbol;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Default wildcard ("don't care") symbol.
pub const DEFAULT_WILDCARD: Symbol = '#';

/// Parameters of the anticipatory learning process and reinforcement step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    /// Learning rate for quality, reward and application-average updates.
    pub beta: f64,
    /// Discount factor of the reinforcement step.
    pub gamma: f64,
    /// Quality above which a classifier is reliable.
    pub theta_r: f64,
    /// Quality below which a classifier is inadequate.
    pub theta_i: f64,
    /// Experience a classifier needs before it may subsume others in the ALP.
    pub theta_exp: u32,
    /// Maximum number of specified unchanging attributes kept by mark-driven
    /// specialization.
    pub u_max: usize,
    /// Exploration probability of the epsilon-greedy policy.
    pub epsilon: f64,
    /// Enable probability-enhanced effects.
    pub do_pee: bool,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            beta: 0.05,
            gamma: 0.95,
            theta_r: 0.9,
            theta_i: 0.1,
            theta_exp: 20,
            u_max: 100_000,
            epsilon: 0.5,
            do_pee: false,
        }
    }
}

/// Parameters of the genetic generalization operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Run the GA after each ALP step.
    pub enabled: bool,
    /// Mean time since the last GA an action set needs before reproducing.
    pub theta_ga: u64,
    /// Per-attribute mutation probability.
    pub mu: f64,
    /// Crossover probability.
    pub chi: f64,
    /// Let experienced, reliable, more general classifiers absorb offspring.
    pub do_subsumption: bool,
    /// Experience a classifier needs before it may subsume offspring.
    pub theta_as: u32,
    /// Ceiling on the total numerosity of the population.
    pub max_numerosity: usize,
    /// Symbols a mutated attribute may be rewritten to. Empty means mutation
    /// only ever generalizes.
    pub mutation_symbols: Vec<Symbol>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            theta_ga: 100,
            mu: 0.3,
            chi: 0.8,
            do_subsumption: true,
            theta_as: 20,
            max_numerosity: 1000,
            mutation_symbols: Vec::new(),
        }
    }
}

/// Complete configuration of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Number of attributes in every perception.
    pub perception_length: usize,
    /// Number of distinct actions, identified as `0..number_of_actions`.
    pub number_of_actions: usize,
    /// Symbol meaning "matches anything" in conditions and "unchanged" in effects.
    #[serde(default = "default_wildcard")]
    pub wildcard: Symbol,
    /// Seed of the single random source shared by all stochastic operators.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Safety cap on steps per trial.
    #[serde(default = "default_max_trial_steps")]
    pub max_trial_steps: usize,
    /// ALP and reinforcement parameters.
    #[serde(default)]
    pub learning: LearningConfig,
    /// Genetic algorithm parameters.
    #[serde(default)]
    pub ga: GaConfig,
}

const fn default_wildcard() -> Symbol {
    DEFAULT_WILDCARD
}

const fn default_seed() -> u64 {
    42
}

const fn default_max_trial_steps() -> usize {
    1000
}

impl Configuration {
    /// Configuration with reference parameter values for the given problem shape.
    #[must_use]
    pub fn new(perception_length: usize, number_of_actions: usize) -> Self {
        Self {
            perception_length,
            number_of_actions,
            wildcard: DEFAULT_WILDCARD,
            seed: default_seed(),
            max_trial_steps: default_max_trial_steps(),
            learning: LearningConfig::default(),
            ga: GaConfig::default(),
        }
    }

    /// Load a configuration from a JSON file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`Configuration::validate`].
    pub fn from_json_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        cfg.validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(cfg)
    }

    /// Check every parameter against its admissible range.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Configuration`] naming the first offending parameter.
    pub fn validate(&self) -> Acs2Result<()> {
        let l = &self.learning;
        let ga = &self.ga;

        if self.perception_length == 0 {
            return Err(invalid("perception_length must be positive"));
        }
        if self.number_of_actions == 0 {
            return Err(invalid("number_of_actions must be positive"));
        }
        if !(l.beta > 0.0 && l.beta <= 1.0) {
            return Err(invalid("beta must lie in (0, 1]"));
        }
        if l.do_pee && l.beta >= 1.0 {
            return Err(invalid("beta must be below 1 with probability-enhanced effects"));
        }
        for (name, value) in [
            ("gamma", l.gamma),
            ("theta_r", l.theta_r),
            ("theta_i", l.theta_i),
            ("epsilon", l.epsilon),
            ("mu", ga.mu),
            ("chi", ga.chi),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(&format!("{name} must lie in [0, 1]")));
            }
        }
        if l.theta_i >= l.theta_r {
            return Err(invalid("theta_i must be below theta_r"));
        }
        if l.u_max == 0 {
            return Err(invalid("u_max must be positive"));
        }
        if ga.max_numerosity == 0 {
            return Err(invalid("max_numerosity must be positive"));
        }
        if ga.mutation_symbols.contains(&self.wildcard) {
            return Err(invalid("mutation_symbols must not contain the wildcard"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> Acs2Error {
    Acs2Error::Configuration(message.to_string())
}
