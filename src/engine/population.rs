//! The classifier population and its filtered views.

// Numerosity totals are averaged as floating point
#![allow(clippy::cast_precision_loss)]

use crate::config::LearningConfig;
use crate::error::Acs2Result;
use crate::rules::{Action, Classifier, ClassifierKey, Perception};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keys of the classifiers matching one perception.
pub type MatchSet = Vec<ClassifierKey>;

/// Keys of the match-set classifiers advocating one action.
pub type ActionSet = Vec<ClassifierKey>;

/// Outcome of [`ClassifierSet::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The classifier was new and is now stored.
    Added,
    /// An identical classifier existed and its numerosity was incremented.
    Absorbed,
}

/// Population of distinct classifiers, keyed by identity, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Classifier>", into = "Vec<Classifier>")]
pub struct ClassifierSet {
    classifiers: IndexMap<ClassifierKey, Classifier>,
}

impl ClassifierSet {
    /// Empty population.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct (macro) classifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    /// Whether the population is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Sum of numerosities.
    #[must_use]
    pub fn numerosity(&self) -> u64 {
        self.classifiers.values().map(|cl| u64::from(cl.numerosity)).sum()
    }

    /// Classifiers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Classifier> {
        self.classifiers.values()
    }

    /// Look up a classifier by identity.
    #[must_use]
    pub fn get(&self, key: &ClassifierKey) -> Option<&Classifier> {
        self.classifiers.get(key)
    }

    /// Mutable access to a classifier's statistics.
    pub fn get_mut(&mut self, key: &ClassifierKey) -> Option<&mut Classifier> {
        self.classifiers.get_mut(key)
    }

    /// Whether a classifier with this identity is stored.
    #[must_use]
    pub fn contains(&self, key: &ClassifierKey) -> bool {
        self.classifiers.contains_key(key)
    }

    /// Insert a classifier, or increment the numerosity of its stored twin.
    pub fn insert(&mut self, classifier: Classifier) -> Insertion {
        let key = classifier.key();
        if let Some(existing) = self.classifiers.get_mut(&key) {
            existing.numerosity = existing.numerosity.saturating_add(1);
            Insertion::Absorbed
        } else {
            self.classifiers.insert(key, classifier);
            Insertion::Added
        }
    }

    /// Make every classifier follow `params`.
    pub fn rebind(&mut self, params: &LearningConfig) {
        for cl in self.classifiers.values_mut() {
            cl.rebind(params);
        }
    }

    /// Remove a classifier entirely, keeping the order of the rest.
    pub fn remove(&mut self, key: &ClassifierKey) -> Option<Classifier> {
        self.classifiers.shift_remove(key)
    }

    /// Keys of all classifiers whose condition matches `perception`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Acs2Error::Shape`] if `perception` has the wrong length.
    pub fn form_match_set(&self, perception: &Perception) -> Acs2Result<MatchSet> {
        let mut match_set = Vec::new();
        for (key, cl) in &self.classifiers {
            if cl.condition().matches(perception)? {
                match_set.push(key.clone());
            }
        }
        Ok(match_set)
    }

    /// Keys of `match_set` that advocate `action`.
    #[must_use]
    pub fn form_action_set(match_set: &[ClassifierKey], action: Action) -> ActionSet {
        match_set.iter().filter(|k| k.action == action).cloned().collect()
    }

    /// Stored classifiers for the given keys, skipping unknown ones.
    pub fn resolve<'a>(&'a self, keys: &'a [ClassifierKey]) -> impl Iterator<Item = &'a Classifier> + 'a {
        keys.iter().filter_map(|k| self.classifiers.get(k))
    }

    /// Highest fitness among the given classifiers, 0 for none.
    #[must_use]
    pub fn max_fitness(&self, keys: &[ClassifierKey]) -> f64 {
        self.resolve(keys).map(Classifier::fitness).fold(0.0, f64::max)
    }

    /// Number of reliable classifiers.
    #[must_use]
    pub fn reliable_count(&self) -> usize {
        self.iter().filter(|cl| cl.is_reliable()).count()
    }

    /// Mean quality, `None` for an empty population.
    #[must_use]
    pub fn mean_quality(&self) -> Option<f64> {
        self.mean_of(|cl| cl.quality)
    }

    /// Mean fitness, `None` for an empty population.
    #[must_use]
    pub fn mean_fitness(&self) -> Option<f64> {
        self.mean_of(Classifier::fitness)
    }

    fn mean_of(&self, f: impl Fn(&Classifier) -> f64) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.iter().map(f).sum::<f64>() / self.len() as f64)
    }
}

impl From<Vec<Classifier>> for ClassifierSet {
    fn from(classifiers: Vec<Classifier>) -> Self {
        classifiers.into_iter().collect()
    }
}

impl From<ClassifierSet> for Vec<Classifier> {
    fn from(set: ClassifierSet) -> Self {
        set.classifiers.into_values().collect()
    }
}

impl FromIterator<Classifier> for ClassifierSet {
    fn from_iter<I: IntoIterator<Item = Classifier>>(iter: I) -> Self {
        let mut set = Self::new();
        for cl in iter {
            set.insert(cl);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;

    fn classifier(cfg: &Configuration, condition: &str, action: Action, effect: &str) -> Classifier {
        Classifier::builder()
            .config(cfg)
            .condition(condition)
            .action(action)
            .effect(effect)
            .build()
            .unwrap()
    }

    #[test]
    fn test_insert_duplicate_increments_numerosity() {
        let cfg = Configuration::new(4, 4);
        let mut population = ClassifierSet::new();
        assert_eq!(population.insert(classifier(&cfg, "##1#", 3, "##0#")), Insertion::Added);
        assert_eq!(population.insert(classifier(&cfg, "##1#", 3, "##0#")), Insertion::Absorbed);
        assert_eq!(population.len(), 1);
        assert_eq!(population.iter().next().unwrap().numerosity, 2);
        assert_eq!(population.numerosity(), 2);
    }

    #[test]
    fn test_match_and_action_sets() {
        let cfg = Configuration::new(4, 4);
        let mut population = ClassifierSet::new();
        population.insert(classifier(&cfg, "1###", 0, "####"));
        population.insert(classifier(&cfg, "0###", 0, "####"));
        population.insert(classifier(&cfg, "####", 1, "####"));

        let match_set = population.form_match_set(&Perception::from("1000")).unwrap();
        assert_eq!(match_set.len(), 2);
        let action_set = ClassifierSet::form_action_set(&match_set, 1);
        assert_eq!(action_set.len(), 1);
        assert_eq!(action_set[0].action, 1);
        assert!(population.form_match_set(&Perception::from("10")).is_err());
    }

    #[test]
    fn test_max_fitness() {
        let cfg = Configuration::new(2, 2);
        let mut population = ClassifierSet::new();
        assert!(population.max_fitness(&[]).abs() < f64::EPSILON);

        let mut strong = classifier(&cfg, "1#", 0, "##");
        strong.reward = 10.0;
        population.insert(strong);
        population.insert(classifier(&cfg, "#1", 0, "##"));
        let keys: Vec<ClassifierKey> = population.iter().map(Classifier::key).collect();
        assert!((population.max_fitness(&keys) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_remove_keeps_order() {
        let cfg = Configuration::new(2, 3);
        let mut population: ClassifierSet = (0..3).map(|a| classifier(&cfg, "##", a, "##")).collect();
        let middle = classifier(&cfg, "##", 1, "##").key();
        assert!(population.remove(&middle).is_some());
        let actions: Vec<Action> = population.iter().map(Classifier::action).collect();
        assert_eq!(actions, vec![0, 2]);
        assert!(population.mean_quality().is_some());
        assert!(ClassifierSet::new().mean_fitness().is_none());
    }
}
