//! Classifiers: condition-action-effect rules with learned statistics.

// Timestamps and counters feed floating point running averages
#![allow(clippy::cast_precision_loss)]

use crate::config::{Configuration, LearningConfig};
use crate::error::{Acs2Error, Acs2Result};
use crate::rules::{Action, Condition, Effect, EffectAttribute, Mark, Perception};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Initial quality of new classifiers and floor for specialized or merged children.
pub const QUALITY_INITIAL: f64 = 0.5;

/// Initial reward prediction of new classifiers.
pub const REWARD_INITIAL: f64 = 0.5;

/// Identity of a classifier: two classifiers with equal keys are the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassifierKey {
    /// Condition part.
    pub condition: Condition,
    /// Action part.
    pub action: Action,
    /// Effect part.
    pub effect: Effect,
}

impl fmt::Display for ClassifierKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.condition, self.action, self.effect)
    }
}

/// A macro-classifier standing for `numerosity` identical rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    condition: Condition,
    action: Action,
    effect: Effect,
    mark: Mark,
    /// Accuracy of anticipations, in `[0, 1]`.
    pub quality: f64,
    /// Reward prediction.
    pub reward: f64,
    /// Immediate reward prediction.
    pub immediate_reward: f64,
    /// Number of identical micro-classifiers this entry stands for.
    pub numerosity: u32,
    /// Number of ALP applications.
    pub experience: u32,
    /// Time of the last GA application.
    pub tga: u64,
    /// Time of the last ALP application.
    pub talp: u64,
    /// Running average of the interval between ALP applications.
    pub tav: f64,
    /// Whether the classifier may take part in effect merging.
    pub enhanceable: bool,
    params: LearningConfig,
}

impl Classifier {
    /// Start building a classifier.
    #[must_use]
    pub fn builder<'a>() -> ClassifierBuilder<'a> {
        ClassifierBuilder::default()
    }

    /// Condition part.
    #[must_use]
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }

    pub(crate) const fn condition_mut(&mut self) -> &mut Condition {
        &mut self.condition
    }

    /// Action part.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Effect part.
    #[must_use]
    pub const fn effect(&self) -> &Effect {
        &self.effect
    }

    /// Current mark.
    #[must_use]
    pub const fn mark(&self) -> &Mark {
        &self.mark
    }

    /// Learning parameters the classifier follows.
    #[must_use]
    pub const fn params(&self) -> &LearningConfig {
        &self.params
    }

    /// Follow `params` from now on.
    pub fn rebind(&mut self, params: &LearningConfig) {
        self.params = *params;
    }

    /// Identity triple.
    #[must_use]
    pub fn key(&self) -> ClassifierKey {
        ClassifierKey {
            condition: self.condition.clone(),
            action: self.action,
            effect: self.effect.clone(),
        }
    }

    /// Fresh copy with timestamps set to `time`, unit numerosity and experience,
    /// and an empty mark.
    #[must_use]
    pub fn copy_from(&self, time: u64) -> Self {
        Self {
            condition: self.condition.clone(),
            action: self.action,
            effect: self.effect.clone(),
            mark: Mark::new(self.condition.len()),
            quality: self.quality,
            reward: self.reward,
            immediate_reward: self.immediate_reward,
            numerosity: 1,
            experience: 1,
            tga: time,
            talp: time,
            tav: self.tav,
            enhanceable: false,
            params: self.params,
        }
    }

    /// `quality × reward`.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.quality * self.reward
    }

    /// Quality above `theta_r`.
    #[must_use]
    pub fn is_reliable(&self) -> bool {
        self.quality > self.params.theta_r
    }

    /// Quality below `theta_i`.
    #[must_use]
    pub fn is_inadequate(&self) -> bool {
        self.quality < self.params.theta_i
    }

    /// Whether the mark holds any value.
    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.mark.is_marked()
    }

    /// Whether the effect anticipates any change.
    #[must_use]
    pub fn does_anticipate_change(&self) -> bool {
        self.effect.specify_change()
    }

    /// Condition positions that are specified while the effect anticipates no
    /// change there.
    #[must_use]
    pub fn specified_unchanging_attributes(&self) -> Vec<usize> {
        self.condition
            .specified_indices()
            .filter(|&i| match self.effect.get(i) {
                EffectAttribute::Plain(s) => *s == self.effect.wildcard(),
                EffectAttribute::Enhanced(pea) => pea.does_contain(self.condition[i]),
            })
            .collect()
    }

    /// Increment experience.
    pub const fn increase_experience(&mut self) {
        self.experience = self.experience.saturating_add(1);
    }

    /// `q += β(1 - q)`.
    pub fn increase_quality(&mut self) {
        self.quality += self.params.beta * (1.0 - self.quality);
    }

    /// `q -= βq`.
    pub fn decrease_quality(&mut self) {
        self.quality -= self.params.beta * self.quality;
    }

    /// Undo one [`Classifier::increase_quality`].
    ///
    /// With `beta == 1` the previous quality is unrecoverable and the quality
    /// is left unchanged.
    pub fn reverse_increase_quality(&mut self) {
        let keep = 1.0 - self.params.beta;
        if keep <= 0.0 {
            return;
        }
        self.quality = ((self.quality - self.params.beta) / keep).clamp(0.0, 1.0);
    }

    /// Specialize condition and effect where `p0` and `p1` differ.
    ///
    /// With `leave_specialized`, positions the effect already specifies are
    /// skipped.
    pub fn specialize(&mut self, p0: &Perception, p1: &Perception, leave_specialized: bool) {
        for i in 0..p1.len() {
            if leave_specialized && !self.effect.is_wildcard(i) {
                continue;
            }
            if p0[i] != p1[i] {
                self.effect.specialize(i, p1[i]);
                self.condition.specialize(i, p0[i]);
            }
        }
    }

    /// Matches `p0`, has `action` and anticipates `p1`.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Shape`] if `p0` has the wrong length.
    pub fn predicts_successfully(&self, p0: &Perception, action: Action, p1: &Perception) -> Acs2Result<bool> {
        Ok(self.condition.matches(p0)? && self.action == action && self.does_anticipate_correctly(p0, p1))
    }

    /// Whether the effect anticipates the transition `p0 -> p1`.
    #[must_use]
    pub fn does_anticipate_correctly(&self, p0: &Perception, p1: &Perception) -> bool {
        self.effect.anticipates(p0, p1)
    }

    /// Merge with another classifier into one with a probability-enhanced effect.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::InvalidOperation`] unless probability-enhanced
    /// effects are enabled, and [`Acs2Error::Shape`] on length mismatch.
    pub fn merge_with(&self, other: &Self, perception: &Perception, time: u64) -> Acs2Result<Self> {
        if !self.params.do_pee {
            return Err(Acs2Error::InvalidOperation(
                "merging requires probability-enhanced effects".to_string(),
            ));
        }
        Acs2Error::check_shape(self.condition.len(), other.condition.len())?;
        Acs2Error::check_shape(self.condition.len(), perception.len())?;

        let mut condition = self.condition.clone();
        condition.generalize_disagreements(&other.condition);
        let effect = self
            .effect
            .enhanced_merge(&other.effect, self.quality, other.quality, perception);

        Ok(Self {
            mark: Mark::new(condition.len()),
            condition,
            action: self.action,
            effect,
            quality: ((self.quality + other.quality) / 2.0).max(QUALITY_INITIAL),
            reward: (self.reward + other.reward) / 2.0,
            immediate_reward: 0.0,
            numerosity: 1,
            experience: 1,
            tga: time,
            talp: time,
            tav: 0.0,
            enhanceable: false,
            params: self.params,
        })
    }

    /// Record `perception` at the condition's wildcard positions.
    ///
    /// A newly recorded value makes the classifier non-enhanceable.
    pub fn set_mark(&mut self, perception: &Perception) {
        if self.mark.set_mark_using_condition(&self.condition, perception) {
            self.enhanceable = false;
        }
    }

    /// Update the application average and the ALP timestamp.
    pub fn set_alp_timestamp(&mut self, time: u64) {
        let interval = time.saturating_sub(self.talp) as f64;
        let exp = f64::from(self.experience);
        if 1.0 / exp > self.params.beta {
            self.tav = (self.tav * exp + interval) / (exp + 1.0);
        } else {
            self.tav += self.params.beta * (interval - self.tav);
        }
        self.talp = time;
    }

    /// Reinforce the observed symbols of every probability-enhanced position.
    pub fn update_enhanced_probabilities(&mut self, p1: &Perception) {
        self.effect.update_enhanced_probabilities(p1, self.params.beta);
    }

    /// Strictly lower specificity than `other`.
    #[must_use]
    pub fn is_more_general(&self, other: &Self) -> bool {
        self.condition.specificity() < other.condition.specificity()
    }

    /// Experienced beyond `experience_threshold`, reliable and unmarked.
    #[must_use]
    pub fn is_subsumer(&self, experience_threshold: u32) -> bool {
        self.experience > experience_threshold && self.is_reliable() && !self.is_marked()
    }

    /// Whether this classifier can absorb `other`.
    #[must_use]
    pub fn does_subsume(&self, other: &Self, experience_threshold: u32) -> bool {
        self.is_subsumer(experience_threshold)
            && self.is_more_general(other)
            && self.condition.does_subsume(&other.condition)
            && self.action == other.action
            && self.effect == other.effect
    }

    /// Generalize one uniformly chosen specified unchanging attribute.
    ///
    /// Returns `false` if there is none.
    pub fn generalize_unchanging_condition_attribute<R: Rng>(&mut self, rng: &mut R) -> bool {
        let candidates = self.specified_unchanging_attributes();
        if candidates.is_empty() {
            return false;
        }
        let index = candidates[rng.gen_range(0..candidates.len())];
        self.condition.generalize(index);
        true
    }

    /// Render with action names supplied by the caller.
    #[must_use]
    pub fn display_with(&self, action_name: &dyn Fn(Action) -> String) -> String {
        format!(
            "{} {:<2} {:<16} ({}) q: {:<5.3} r: {:<6.4} ir: {:<6.4} f: {:<6.4} exp: {:<3} tga: {:<5} talp: {:<5} tav: {:<6.3} num: {}",
            self.condition,
            action_name(self.action),
            self.effect.to_string(),
            self.mark,
            self.quality,
            self.reward,
            self.immediate_reward,
            self.fitness(),
            self.experience,
            self.tga,
            self.talp,
            self.tav,
            self.numerosity,
        )
    }
}

impl PartialEq for Classifier {
    fn eq(&self, other: &Self) -> bool {
        self.condition == other.condition && self.action == other.action && self.effect == other.effect
    }
}

impl Eq for Classifier {}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_with(&|a| a.to_string()))
    }
}

#[derive(Debug, Clone)]
enum Part<T> {
    Text(String),
    Value(T),
}

/// Builder for [`Classifier`]; a configuration is mandatory.
#[derive(Debug, Clone)]
pub struct ClassifierBuilder<'a> {
    cfg: Option<&'a Configuration>,
    condition: Option<Part<Condition>>,
    action: Action,
    effect: Option<Part<Effect>>,
    quality: f64,
    reward: f64,
    immediate_reward: f64,
    numerosity: u32,
    experience: u32,
    time: u64,
    tav: f64,
}

impl Default for ClassifierBuilder<'_> {
    fn default() -> Self {
        Self {
            cfg: None,
            condition: None,
            action: 0,
            effect: None,
            quality: QUALITY_INITIAL,
            reward: REWARD_INITIAL,
            immediate_reward: 0.0,
            numerosity: 1,
            experience: 1,
            time: 0,
            tav: 0.0,
        }
    }
}

impl<'a> ClassifierBuilder<'a> {
    /// Configuration the classifier belongs to.
    #[must_use]
    pub const fn config(mut self, cfg: &'a Configuration) -> Self {
        self.cfg = Some(cfg);
        self
    }

    /// Condition written as a string, parsed with the configured wildcard.
    #[must_use]
    pub fn condition(mut self, condition: &str) -> Self {
        self.condition = Some(Part::Text(condition.to_string()));
        self
    }

    /// Condition value.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(Part::Value(condition));
        self
    }

    /// Action.
    #[must_use]
    pub const fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Effect written as a string, parsed with the configured wildcard.
    #[must_use]
    pub fn effect(mut self, effect: &str) -> Self {
        self.effect = Some(Part::Text(effect.to_string()));
        self
    }

    /// Effect value.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(Part::Value(effect));
        self
    }

    /// Initial quality.
    #[must_use]
    pub const fn quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    /// Initial reward prediction.
    #[must_use]
    pub const fn reward(mut self, reward: f64) -> Self {
        self.reward = reward;
        self
    }

    /// Initial immediate reward prediction.
    #[must_use]
    pub const fn immediate_reward(mut self, immediate_reward: f64) -> Self {
        self.immediate_reward = immediate_reward;
        self
    }

    /// Initial numerosity.
    #[must_use]
    pub const fn numerosity(mut self, numerosity: u32) -> Self {
        self.numerosity = numerosity;
        self
    }

    /// Initial experience.
    #[must_use]
    pub const fn experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    /// Creation time, used for both GA and ALP timestamps.
    #[must_use]
    pub const fn time(mut self, time: u64) -> Self {
        self.time = time;
        self
    }

    /// Initial application average.
    #[must_use]
    pub const fn tav(mut self, tav: f64) -> Self {
        self.tav = tav;
        self
    }

    /// Build the classifier.
    ///
    /// Missing parts default to fully general ones.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Configuration`] without a configuration or with a
    /// zero numerosity or experience, and [`Acs2Error::Shape`] when a part's
    /// length differs from the configured perception length.
    pub fn build(self) -> Acs2Result<Classifier> {
        let cfg = self.cfg.ok_or_else(|| {
            Acs2Error::Configuration("a classifier cannot be built without a configuration".to_string())
        })?;
        if self.numerosity == 0 || self.experience == 0 {
            return Err(Acs2Error::Configuration(
                "numerosity and experience must be at least 1".to_string(),
            ));
        }

        let length = cfg.perception_length;
        let condition = match self.condition {
            None => Condition::general(length, cfg.wildcard),
            Some(Part::Text(s)) => Condition::parse(&s, cfg.wildcard),
            Some(Part::Value(c)) => c,
        };
        let effect = match self.effect {
            None => Effect::general(length, cfg.wildcard),
            Some(Part::Text(s)) => Effect::parse(&s, cfg.wildcard),
            Some(Part::Value(e)) => e,
        };
        Acs2Error::check_shape(length, condition.len())?;
        Acs2Error::check_shape(length, effect.len())?;

        Ok(Classifier {
            mark: Mark::new(length),
            condition,
            action: self.action,
            effect,
            quality: self.quality,
            reward: self.reward,
            immediate_reward: self.immediate_reward,
            numerosity: self.numerosity,
            experience: self.experience,
            tga: self.time,
            talp: self.time,
            tav: self.tav,
            enhanceable: false,
            params: cfg.learning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn cfg() -> Configuration {
        Configuration::new(4, 4)
    }

    fn p(s: &str) -> Perception {
        Perception::from(s)
    }

    #[test]
    fn test_build_requires_configuration() {
        let result = Classifier::builder().condition("##1#").action(1).build();
        assert!(matches!(result, Err(Acs2Error::Configuration(_))));
    }

    #[test]
    fn test_build_checks_length() {
        let cfg = cfg();
        let result = Classifier::builder().config(&cfg).condition("##1").build();
        assert_eq!(result.unwrap_err(), Acs2Error::shape(4, 3));
    }

    #[test]
    fn test_defaults() {
        let cfg = cfg();
        let cl = Classifier::builder().config(&cfg).action(2).build().unwrap();
        assert_eq!(cl.condition().to_string(), "####");
        assert_eq!(cl.effect().to_string(), "####");
        assert!((cl.fitness() - 0.25).abs() < 1e-12);
        assert_eq!(cl.numerosity, 1);
        assert!(!cl.is_marked());
    }

    #[test]
    fn test_identity_ignores_statistics() {
        let cfg = cfg();
        let a = Classifier::builder().config(&cfg).condition("1###").action(0).quality(0.9).build().unwrap();
        let b = Classifier::builder().config(&cfg).condition("1###").action(0).quality(0.1).build().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_quality_updates() {
        let cfg = cfg();
        let mut cl = Classifier::builder().config(&cfg).build().unwrap();
        cl.increase_quality();
        assert!((cl.quality - 0.525).abs() < 1e-12);
        cl.reverse_increase_quality();
        assert!((cl.quality - 0.5).abs() < 1e-12);
        cl.decrease_quality();
        assert!((cl.quality - 0.475).abs() < 1e-12);
    }

    #[test]
    fn test_reverse_increase_quality_with_full_rate() {
        let mut cfg = cfg();
        cfg.learning.beta = 1.0;
        let mut cl = Classifier::builder().config(&cfg).quality(0.4).build().unwrap();
        cl.increase_quality();
        cl.reverse_increase_quality();
        assert!((cl.quality - 1.0).abs() < 1e-12);
        assert!(!cl.quality.is_nan());
    }

    #[test]
    fn test_rebind_replaces_thresholds() {
        let cfg = cfg();
        let mut cl = Classifier::builder().config(&cfg).quality(0.7).build().unwrap();
        assert!(!cl.is_reliable());

        let mut resumed = cfg.learning;
        resumed.theta_r = 0.5;
        resumed.do_pee = true;
        cl.rebind(&resumed);
        assert!(cl.is_reliable());
        assert_eq!(cl.params(), &resumed);
    }

    #[test]
    fn test_specialize() {
        let cfg = cfg();
        let mut cl = Classifier::builder().config(&cfg).action(2).build().unwrap();
        cl.specialize(&p("0000"), &p("0010"), true);
        assert_eq!(cl.condition().to_string(), "##0#");
        assert_eq!(cl.effect().to_string(), "##1#");
    }

    #[test]
    fn test_specialize_leaves_specified_positions() {
        let cfg = cfg();
        let mut cl = Classifier::builder().config(&cfg).effect("1###").build().unwrap();
        cl.specialize(&p("0000"), &p("2010"), true);
        assert_eq!(cl.effect().to_string(), "1#1#");
        assert_eq!(cl.condition().to_string(), "##0#");
    }

    #[test]
    fn test_predicts_successfully() {
        let cfg = cfg();
        let cl = Classifier::builder().config(&cfg).condition("##0#").action(2).effect("##1#").build().unwrap();
        assert!(cl.predicts_successfully(&p("0000"), 2, &p("0010")).unwrap());
        assert!(!cl.predicts_successfully(&p("0000"), 1, &p("0010")).unwrap());
        assert!(!cl.predicts_successfully(&p("0010"), 2, &p("0010")).unwrap());
        assert!(cl.predicts_successfully(&p("000"), 2, &p("0010")).is_err());
    }

    #[test]
    fn test_specified_unchanging_attributes() {
        let cfg = cfg();
        let cl = Classifier::builder().config(&cfg).condition("01#1").effect("1###").build().unwrap();
        assert_eq!(cl.specified_unchanging_attributes(), vec![1, 3]);
    }

    #[test]
    fn test_generalize_unchanging() {
        let cfg = cfg();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut cl = Classifier::builder().config(&cfg).condition("0##1").effect("1###").build().unwrap();
        assert!(cl.generalize_unchanging_condition_attribute(&mut rng));
        assert_eq!(cl.condition().to_string(), "0###");
        assert!(!cl.generalize_unchanging_condition_attribute(&mut rng));
    }

    #[test]
    fn test_set_mark_clears_enhanceable() {
        let cfg = cfg();
        let mut cl = Classifier::builder().config(&cfg).condition("1###").build().unwrap();
        cl.enhanceable = true;
        cl.set_mark(&p("1010"));
        assert!(cl.is_marked());
        assert!(!cl.enhanceable);
    }

    #[test]
    fn test_alp_timestamp() {
        let cfg = cfg();
        let mut cl = Classifier::builder().config(&cfg).time(10).build().unwrap();
        cl.set_alp_timestamp(20);
        assert!((cl.tav - 5.0).abs() < 1e-12);
        assert_eq!(cl.talp, 20);

        cl.experience = 100;
        cl.set_alp_timestamp(30);
        assert!((cl.tav - (5.0 + 0.05 * 5.0)).abs() < 1e-12);
    }

    #[test]
    fn test_merge_requires_pee() {
        let cfg = cfg();
        let a = Classifier::builder().config(&cfg).effect("1###").build().unwrap();
        let b = Classifier::builder().config(&cfg).effect("2###").build().unwrap();
        assert!(matches!(
            a.merge_with(&b, &p("0000"), 5),
            Err(Acs2Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_merge_with() {
        let mut cfg = cfg();
        cfg.learning.do_pee = true;
        let a = Classifier::builder().config(&cfg).condition("00##").effect("1###").quality(0.2).build().unwrap();
        let b = Classifier::builder().config(&cfg).condition("0###").effect("2###").quality(0.3).build().unwrap();
        let merged = a.merge_with(&b, &p("0000"), 5).unwrap();
        assert_eq!(merged.condition().to_string(), "0###");
        assert!(merged.effect().is_enhanced());
        assert!((merged.quality - QUALITY_INITIAL).abs() < 1e-12);
        assert_eq!(merged.tga, 5);
        assert_eq!(merged.numerosity, 1);
    }

    #[test]
    fn test_subsumption() {
        let cfg = cfg();
        let general = Classifier::builder()
            .config(&cfg)
            .condition("1###")
            .effect("#1##")
            .quality(0.95)
            .experience(30)
            .build()
            .unwrap();
        let specific = Classifier::builder().config(&cfg).condition("10##").effect("#1##").build().unwrap();
        assert!(general.does_subsume(&specific, 20));
        assert!(!general.does_subsume(&specific, 30));
        assert!(!specific.does_subsume(&general, 0));
    }

    #[test]
    fn test_display_with_namer() {
        let cfg = cfg();
        let cl = Classifier::builder().config(&cfg).action(1).build().unwrap();
        let text = cl.display_with(&|a| ["N", "E"][a].to_string());
        assert!(text.starts_with("#### E"));
    }
}
