//! Genetic generalization on hand-built action sets.
//!
//! Run with: cargo test ga_behaviour

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use acs2::engine::{ActionSet, apply_ga};
use acs2::events::{Event, RecordingSink};
use acs2::rules::ClassifierKey;
use acs2::{Classifier, ClassifierSet, Configuration, LearningContext, Perception};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn ga_config() -> Configuration {
    let mut cfg = Configuration::new(4, 2);
    cfg.ga.enabled = true;
    cfg.ga.theta_ga = 10;
    cfg
}

fn classifier(cfg: &Configuration, condition: &str, quality: f64, experience: u32) -> Classifier {
    Classifier::builder()
        .config(cfg)
        .condition(condition)
        .effect("###1")
        .quality(quality)
        .experience(experience)
        .build()
        .unwrap()
}

fn setup(classifiers: Vec<Classifier>) -> (ClassifierSet, ActionSet) {
    let population: ClassifierSet = classifiers.into_iter().collect();
    let keys = population.iter().map(Classifier::key).collect();
    (population, keys)
}

fn run_ga(cfg: &Configuration, population: &mut ClassifierSet, action_set: &mut ActionSet, time: u64) -> RecordingSink {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut sink = RecordingSink::default();
    let mut ctx = LearningContext::new(cfg, &mut rng, &mut sink);
    apply_ga(time, population, None, action_set, &Perception::from("1000"), &mut ctx).unwrap();
    sink
}

#[test]
fn test_recent_action_set_is_left_alone() {
    let cfg = ga_config();
    let (mut population, mut action_set) = setup(vec![classifier(&cfg, "10##", 0.8, 3)]);
    let before = population.numerosity();

    // tga is 0 and the mean interval 10 does not exceed theta_ga
    let sink = run_ga(&cfg, &mut population, &mut action_set, 10);

    assert_eq!(population.numerosity(), before);
    assert_eq!(population.iter().next().unwrap().tga, 0);
    assert!(sink.events.is_empty());
}

#[test]
fn test_reproduction_stamps_action_set() {
    let mut cfg = ga_config();
    cfg.ga.mu = 0.0;
    cfg.ga.chi = 0.0;
    let (mut population, mut action_set) = setup(vec![classifier(&cfg, "10##", 0.8, 3)]);

    let sink = run_ga(&cfg, &mut population, &mut action_set, 50);

    assert!(sink.events.iter().any(|e| matches!(e, Event::GeneticAlgorithm { time: 50, .. })));
    assert!(population.iter().all(|cl| cl.tga == 50));
    // Both offspring are copies of the only parent
    assert_eq!(population.len(), 1);
    assert_eq!(population.numerosity(), 2);
}

#[test]
fn test_reliable_generalist_subsumes_offspring() {
    let mut cfg = ga_config();
    cfg.ga.mu = 0.0;
    cfg.ga.chi = 0.0;
    let specific = classifier(&cfg, "10##", 0.6, 3);
    let general = classifier(&cfg, "1###", 0.95, 30);
    let (specific_key, general_key): (ClassifierKey, ClassifierKey) = (specific.key(), general.key());
    let (mut population, mut action_set) = setup(vec![specific, general]);

    run_ga(&cfg, &mut population, &mut action_set, 50);

    assert_eq!(population.len(), 2);
    assert_eq!(population.get(&specific_key).unwrap().numerosity, 1);
    assert!(population.get(&general_key).unwrap().numerosity > 1);
}

#[test]
fn test_deletion_enforces_numerosity_ceiling() {
    let mut cfg = ga_config();
    cfg.ga.max_numerosity = 3;
    cfg.ga.mu = 0.5;
    cfg.ga.do_subsumption = false;
    let (mut population, mut action_set) = setup(vec![
        classifier(&cfg, "10##", 0.8, 3),
        classifier(&cfg, "01##", 0.4, 3),
        classifier(&cfg, "0#1#", 0.2, 3),
    ]);

    for time in [50, 100, 150, 200] {
        run_ga(&cfg, &mut population, &mut action_set, time);
        assert!(population.numerosity() <= 3);
        assert!(action_set.iter().all(|k| population.contains(k)));
    }
}
