//! Anticipatory learning process.
//!
//! For every classifier of the action set the observed transition `p0 -> p1`
//! is either anticipated (expected case) or not (unexpected case):
//!
//! - expected: quality rises; a marked classifier may spawn a child
//!   specialized on the mark's differences, or become enhanceable.
//! - unexpected: quality falls, the mark records `p0`, and a specializable
//!   effect yields a specialized child.
//!
//! Classifiers that turn inadequate are removed. When nothing anticipated the
//! transition a covering classifier is created.

// Report ratios divide counters
#![allow(clippy::cast_precision_loss)]

use crate::engine::{ActionSet, ClassifierSet, LearningContext, MatchSet, absorb_into, insert_reported};
use crate::error::{Acs2Error, Acs2Result};
use crate::events::{Event, Origin, RemovalCause};
use crate::rules::{Action, Classifier, ClassifierKey, Perception, QUALITY_INITIAL};
use rand::Rng;

/// Anticipation counts of one ALP application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlpReport {
    /// Classifiers that anticipated the transition.
    pub correct: usize,
    /// Classifiers the ALP was applied to.
    pub total: usize,
}

impl AlpReport {
    /// Percentage of correct anticipations, `None` when nothing was applied.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 * 100.0 / self.total as f64)
    }
}

/// Apply the ALP to `action_set` for the transition `p0 --action--> p1`.
///
/// New classifiers are inserted into `population` through the insertion rule
/// and appended to the action set, and to the match set (formed for `p1`)
/// when they match `p1`. Removed classifiers disappear from both views.
///
/// # Errors
///
/// Returns [`Acs2Error::Shape`] if a perception has the wrong length.
#[allow(clippy::too_many_arguments)]
pub fn apply_alp<R: Rng>(
    population: &mut ClassifierSet,
    mut match_set: Option<&mut MatchSet>,
    action_set: &mut ActionSet,
    p0: &Perception,
    action: Action,
    p1: &Perception,
    time: u64,
    ctx: &mut LearningContext<'_, R>,
) -> Acs2Result<AlpReport> {
    let length = ctx.cfg.perception_length;
    Acs2Error::check_shape(length, p0.len())?;
    Acs2Error::check_shape(length, p1.len())?;

    let members = action_set.clone();
    let mut report = AlpReport::default();
    let mut anticipated: Vec<ClassifierKey> = Vec::new();
    let mut added: Vec<ClassifierKey> = Vec::new();

    for key in &members {
        let Some(cl) = population.get_mut(key) else {
            continue;
        };
        report.total += 1;
        cl.increase_experience();
        cl.set_alp_timestamp(time);

        let child = if cl.does_anticipate_correctly(p0, p1) {
            report.correct += 1;
            anticipated.push(key.clone());
            expected_case(cl, p0, p1, time, ctx)
        } else {
            let child = unexpected_case(cl, p0, p1, time);
            if cl.is_inadequate() && cl.experience > 1 {
                population.remove(key);
                ctx.sink.emit(Event::Removed {
                    time,
                    cause: RemovalCause::Inadequate,
                    classifier: key.clone(),
                });
            }
            child
        };

        if let Some((child, origin)) = child {
            add_alp_classifier(population, &members, child, origin, time, ctx, &mut added);
        }
    }

    if ctx.cfg.learning.do_pee {
        merge_enhanceable(population, &members, &anticipated, p0, time, ctx, &mut added)?;
    }

    if report.correct == 0 {
        let cover = cover(p0, action, p1, time, ctx)?;
        add_alp_classifier(population, &members, cover, Origin::Covering, time, ctx, &mut added);
    }

    action_set.retain(|k| population.contains(k));
    if let Some(ms) = match_set.as_deref_mut() {
        ms.retain(|k| population.contains(k));
    }
    for key in added {
        if !population.contains(&key) {
            continue;
        }
        if !action_set.contains(&key) {
            action_set.push(key.clone());
        }
        match match_set.as_deref_mut() {
            Some(ms) if key.condition.matches(p1)? && !ms.contains(&key) => ms.push(key),
            _ => {}
        }
    }

    Ok(report)
}

/// Correct anticipation: reinforce and, for a marked classifier, specialize
/// on the mark's differences.
fn expected_case<R: Rng>(
    cl: &mut Classifier,
    p0: &Perception,
    p1: &Perception,
    time: u64,
    ctx: &mut LearningContext<'_, R>,
) -> Option<(Classifier, Origin)> {
    let cfg = ctx.cfg;
    cl.increase_quality();
    if cfg.learning.do_pee {
        cl.update_enhanced_probabilities(p1);
    }

    let mut diff = cl.mark().differences(p0, cfg.wildcard, ctx.rng);
    if diff.specificity() == 0 {
        if cfg.learning.do_pee && cl.is_marked() {
            cl.enhanceable = true;
        }
        return None;
    }

    let mut child = cl.copy_from(time);
    let u_max = cfg.learning.u_max;
    let mut unchanging = child.specified_unchanging_attributes().len();
    let mut new_specified = diff.specificity();
    let mut origin = Origin::Specialization;

    let shrink_unchanging = unchanging >= u_max;
    while unchanging >= u_max && child.generalize_unchanging_condition_attribute(ctx.rng) {
        unchanging -= 1;
        origin = Origin::Generalization;
    }
    while unchanging + new_specified > u_max {
        if shrink_unchanging && unchanging > 0 && ctx.rng.gen_bool(0.5) {
            if child.generalize_unchanging_condition_attribute(ctx.rng) {
                unchanging -= 1;
                origin = Origin::Generalization;
            } else {
                unchanging = 0;
            }
        } else if diff.generalize_random_specified(ctx.rng) {
            new_specified -= 1;
        } else {
            break;
        }
    }

    child.condition_mut().specialize_with(&diff);
    child.quality = child.quality.max(QUALITY_INITIAL);
    Some((child, origin))
}

/// Incorrect anticipation: penalize, mark and try to specialize.
fn unexpected_case(
    cl: &mut Classifier,
    p0: &Perception,
    p1: &Perception,
    time: u64,
) -> Option<(Classifier, Origin)> {
    cl.decrease_quality();
    cl.set_mark(p0);
    if !cl.effect().is_specializable(p0, p1) {
        return None;
    }

    let mut child = cl.copy_from(time);
    child.specialize(p0, p1, true);
    if child == *cl {
        return None;
    }
    child.quality = child.quality.max(QUALITY_INITIAL);
    Some((child, Origin::Specialization))
}

/// Classifier anticipating exactly `p0 --action--> p1`, specified only where
/// the perception changed.
fn cover<R: Rng>(
    p0: &Perception,
    action: Action,
    p1: &Perception,
    time: u64,
    ctx: &LearningContext<'_, R>,
) -> Acs2Result<Classifier> {
    let mut cl = Classifier::builder().config(ctx.cfg).action(action).time(time).build()?;
    cl.specialize(p0, p1, false);
    Ok(cl)
}

/// Merge every enhanceable, marked classifier that anticipated correctly with
/// a random partner whose mark covers the same positions.
#[allow(clippy::too_many_arguments)]
fn merge_enhanceable<R: Rng>(
    population: &mut ClassifierSet,
    members: &[ClassifierKey],
    anticipated: &[ClassifierKey],
    p0: &Perception,
    time: u64,
    ctx: &mut LearningContext<'_, R>,
    added: &mut Vec<ClassifierKey>,
) -> Acs2Result<()> {
    let candidates: Vec<ClassifierKey> = anticipated
        .iter()
        .filter(|k| {
            population
                .get(k)
                .is_some_and(|cl| cl.enhanceable && cl.is_marked())
        })
        .cloned()
        .collect();
    if candidates.len() < 2 {
        return Ok(());
    }

    for key in &candidates {
        let Some(candidate) = population.get(key) else {
            continue;
        };
        let partners: Vec<&ClassifierKey> = candidates
            .iter()
            .filter(|other| *other != key)
            .filter(|other| {
                population
                    .get(other)
                    .is_some_and(|cl| cl.mark().is_compatible_with(candidate.mark()))
            })
            .collect();
        if partners.is_empty() {
            continue;
        }
        let partner_key = partners[ctx.rng.gen_range(0..partners.len())];
        let Some(partner) = population.get(partner_key) else {
            continue;
        };
        let merged = candidate.merge_with(partner, p0, time)?;
        if let Some(cl) = population.get_mut(key) {
            cl.reverse_increase_quality();
        }
        add_alp_classifier(population, members, merged, Origin::Merge, time, ctx, added);
    }
    Ok(())
}

/// Insert an ALP candidate unless the most general subsumer of the action set
/// absorbs it.
fn add_alp_classifier<R: Rng>(
    population: &mut ClassifierSet,
    members: &[ClassifierKey],
    child: Classifier,
    origin: Origin,
    time: u64,
    ctx: &mut LearningContext<'_, R>,
    added: &mut Vec<ClassifierKey>,
) {
    let theta_exp = ctx.cfg.learning.theta_exp;
    let mut subsumer: Option<&Classifier> = None;
    for cl in population.resolve(members) {
        if cl.does_subsume(&child, theta_exp) && subsumer.is_none_or(|s| cl.is_more_general(s)) {
            subsumer = Some(cl);
        }
    }

    if let Some(key) = subsumer.map(Classifier::key) {
        absorb_into(population, &key, origin, time, &mut *ctx.sink);
    } else if let Some(key) = insert_reported(population, child, origin, time, &mut *ctx.sink) {
        added.push(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use crate::events::{NoopSink, RecordingSink};
    use crate::rules::{Effect, EffectAttribute, ProbabilityEnhancedAttribute};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn p(s: &str) -> Perception {
        Perception::from(s)
    }

    fn single(cl: Classifier) -> (ClassifierSet, ActionSet) {
        let mut population = ClassifierSet::new();
        let key = cl.key();
        population.insert(cl);
        (population, vec![key])
    }

    #[test]
    fn test_general_classifier_spawns_specialized_child() {
        let cfg = Configuration::new(4, 4);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut sink = RecordingSink::default();
        let cl = Classifier::builder().config(&cfg).action(2).build().unwrap();
        let (mut population, mut action_set) = single(cl);

        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        let report = apply_alp(&mut population, None, &mut action_set, &p("0000"), 2, &p("0010"), 1, &mut ctx)
            .unwrap();

        assert_eq!(report, AlpReport { correct: 0, total: 1 });
        let child = population
            .iter()
            .find(|cl| cl.condition().to_string() == "##0#")
            .unwrap();
        assert_eq!(child.effect().to_string(), "##1#");
        assert_eq!(child.action(), 2);
        assert!(action_set.contains(&child.key()));
        assert_eq!(sink.created(Origin::Specialization), 1);
    }

    #[test]
    fn test_correct_anticipation_raises_quality() {
        let cfg = Configuration::new(4, 4);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = NoopSink;
        let cl = Classifier::builder()
            .config(&cfg)
            .condition("##0#")
            .action(2)
            .effect("##1#")
            .build()
            .unwrap();
        let key = cl.key();
        let (mut population, mut action_set) = single(cl);

        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        let report = apply_alp(&mut population, None, &mut action_set, &p("0000"), 2, &p("0010"), 1, &mut ctx)
            .unwrap();

        assert_eq!(report.ratio(), Some(100.0));
        assert_eq!(population.len(), 1);
        let cl = population.get(&key).unwrap();
        assert!(cl.quality > 0.5);
        assert_eq!(cl.experience, 2);
    }

    #[test]
    fn test_inadequate_classifier_is_removed() {
        let cfg = Configuration::new(4, 4);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();
        let cl = Classifier::builder()
            .config(&cfg)
            .condition("0###")
            .action(1)
            .effect("1###")
            .quality(0.1)
            .experience(5)
            .build()
            .unwrap();
        let key = cl.key();
        let (mut population, mut action_set) = single(cl);
        let mut match_set = action_set.clone();

        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        apply_alp(
            &mut population,
            Some(&mut match_set),
            &mut action_set,
            &p("0000"),
            1,
            &p("0000"),
            1,
            &mut ctx,
        )
        .unwrap();

        assert!(!population.contains(&key));
        assert!(!action_set.contains(&key));
        assert!(!match_set.contains(&key));
        assert_eq!(sink.removed(RemovalCause::Inadequate), 1);
    }

    #[test]
    fn test_covering_when_nothing_anticipates() {
        let cfg = Configuration::new(4, 4);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = RecordingSink::default();
        let mut population = ClassifierSet::new();
        let mut action_set = ActionSet::new();

        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        apply_alp(&mut population, None, &mut action_set, &p("0101"), 3, &p("0111"), 7, &mut ctx).unwrap();

        assert_eq!(population.len(), 1);
        let cl = population.iter().next().unwrap();
        assert_eq!(cl.condition().to_string(), "##0#");
        assert_eq!(cl.effect().to_string(), "##1#");
        assert_eq!(cl.tga, 7);
        assert_eq!(sink.created(Origin::Covering), 1);
    }

    #[test]
    fn test_shape_error() {
        let cfg = Configuration::new(4, 4);
        let mut rng = SmallRng::seed_from_u64(1);
        let mut sink = NoopSink;
        let mut population = ClassifierSet::new();
        let mut action_set = ActionSet::new();
        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        let result = apply_alp(&mut population, None, &mut action_set, &p("010"), 0, &p("0111"), 1, &mut ctx);
        assert_eq!(result, Err(Acs2Error::shape(4, 3)));
    }

    #[test]
    fn test_marked_classifier_specializes_on_differences() {
        let cfg = Configuration::new(2, 1);
        let mut rng = SmallRng::seed_from_u64(5);
        let mut sink = NoopSink;
        let mut cl = Classifier::builder().config(&cfg).effect("1#").build().unwrap();
        // Earlier failure in a situation where attribute 1 was '1'
        cl.set_mark(&p("01"));
        let (mut population, mut action_set) = single(cl);

        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        apply_alp(&mut population, None, &mut action_set, &p("00"), 0, &p("10"), 2, &mut ctx).unwrap();

        let child = population
            .iter()
            .find(|cl| cl.condition().to_string() == "#0")
            .unwrap();
        assert_eq!(child.effect().to_string(), "1#");
        assert!(!child.is_marked());
    }

    #[test]
    fn test_enhanceable_classifiers_merge_into_distribution() {
        let mut cfg = Configuration::new(2, 1);
        cfg.learning.do_pee = true;
        let mut rng = SmallRng::seed_from_u64(9);
        let mut sink = RecordingSink::default();

        let mut plain = Classifier::builder().config(&cfg).condition("#0").effect("1#").build().unwrap();
        let pea = ProbabilityEnhancedAttribute::from_weights(&[('1', 0.5), ('0', 0.5)]).unwrap();
        let effect = Effect::new(vec![EffectAttribute::Enhanced(pea), EffectAttribute::Plain('#')], '#');
        let mut enhanced = Classifier::builder().config(&cfg).condition("#0").with_effect(effect).build().unwrap();
        // Both already failed once in this very situation
        plain.set_mark(&p("00"));
        enhanced.set_mark(&p("00"));
        let (plain_key, enhanced_key) = (plain.key(), enhanced.key());

        let mut population = ClassifierSet::new();
        population.insert(plain);
        population.insert(enhanced);
        let mut action_set = vec![plain_key.clone(), enhanced_key.clone()];

        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        let report = apply_alp(&mut population, None, &mut action_set, &p("00"), 0, &p("10"), 3, &mut ctx)
            .unwrap();

        assert_eq!(report, AlpReport { correct: 2, total: 2 });
        assert_eq!(population.len(), 2);
        for key in [&plain_key, &enhanced_key] {
            let cl = population.get(key).unwrap();
            assert!(cl.enhanceable);
            assert!((cl.quality - 0.5).abs() < 1e-12);
        }

        let enhanced = population.get(&enhanced_key).unwrap();
        match enhanced.effect().get(0) {
            EffectAttribute::Enhanced(pea) => assert!(pea.probability('1') > 0.5),
            EffectAttribute::Plain(_) => panic!("distribution lost"),
        }
        // The merged rule holds the same symbols as the enhanced one
        assert_eq!(enhanced.numerosity, 3);
        let merges = sink
            .events
            .iter()
            .filter(|e| {
                matches!(e, Event::Absorbed { origin: Origin::Merge, into, .. } if *into == enhanced_key)
            })
            .count();
        assert_eq!(merges, 2);
        assert_eq!(sink.created(Origin::Covering), 0);
    }

    #[test]
    fn test_merge_skipped_without_compatible_partner() {
        let mut cfg = Configuration::new(2, 1);
        cfg.learning.do_pee = true;
        let mut rng = SmallRng::seed_from_u64(9);
        let mut sink = RecordingSink::default();

        let mut first = Classifier::builder().config(&cfg).condition("#0").effect("1#").build().unwrap();
        let pea = ProbabilityEnhancedAttribute::from_weights(&[('1', 0.5), ('0', 0.5)]).unwrap();
        let effect = Effect::new(vec![EffectAttribute::Enhanced(pea), EffectAttribute::Plain('#')], '#');
        let mut second = Classifier::builder().config(&cfg).condition("0#").with_effect(effect).build().unwrap();
        first.set_mark(&p("00"));
        second.set_mark(&p("00"));
        let keys = vec![first.key(), second.key()];

        let mut population = ClassifierSet::new();
        population.insert(first);
        population.insert(second);
        let mut action_set = keys.clone();

        let mut ctx = LearningContext::new(&cfg, &mut rng, &mut sink);
        apply_alp(&mut population, None, &mut action_set, &p("00"), 0, &p("10"), 3, &mut ctx).unwrap();

        for key in &keys {
            let cl = population.get(key).unwrap();
            assert!(cl.enhanceable);
            assert!((cl.quality - 0.525).abs() < 1e-12);
            assert_eq!(cl.numerosity, 1);
        }
        assert!(!sink.events.iter().any(|e| matches!(
            e,
            Event::Created { origin: Origin::Merge, .. } | Event::Absorbed { origin: Origin::Merge, .. }
        )));
    }
}
