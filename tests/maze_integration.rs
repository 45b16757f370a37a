//! Learning runs in the built-in mazes.
//!
//! Run with: cargo test --release maze_integration

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use acs2::agent::knowledge;
use acs2::environments::Maze;
use acs2::events::{Origin, RecordingSink};
use acs2::persistence::{Snapshot, load_snapshot, save_snapshot};
use acs2::{Agent, Configuration, Environment, IdentityAdapter, NoopSink, TransitionModel};
use tempfile::tempdir;

fn maze_config(seed: u64) -> Configuration {
    let mut cfg = Configuration::new(8, 8);
    cfg.seed = seed;
    cfg.learning.epsilon = 0.8;
    cfg
}

#[test]
fn test_explore_learns_simple_maze() {
    let cfg = maze_config(42);
    let mut maze = Maze::by_name("simple", cfg.seed).unwrap();
    let mut agent = Agent::new(cfg).unwrap();
    let mut sink = RecordingSink::default();

    let metrics = agent.explore(&mut maze, &IdentityAdapter, 150, &mut sink).unwrap();

    assert_eq!(metrics.len(), 150);
    assert!(sink.created(Origin::Covering) > 0);
    assert!(agent.population().reliable_count() > 0);
    let known = knowledge(agent.population(), &maze.possible_transitions()).unwrap().unwrap();
    assert!(known > 0.0 && known <= 100.0);
}

#[test]
fn test_exploit_finds_food_quickly_after_learning() {
    let cfg = maze_config(7);
    let cap = cfg.max_trial_steps;
    let mut maze = Maze::by_name("simple", cfg.seed).unwrap();
    let mut agent = Agent::new(cfg).unwrap();
    agent.explore(&mut maze, &IdentityAdapter, 300, &mut NoopSink).unwrap();

    let metrics = agent.exploit(&mut maze, &IdentityAdapter, 20, &mut NoopSink).unwrap();
    let reached = metrics.iter().filter(|m| m.steps < cap).count();
    assert!(reached >= 10, "only {reached} of 20 exploit trials reached food");
}

#[test]
fn test_ga_keeps_numerosity_bounded() {
    let mut cfg = maze_config(3);
    cfg.ga.enabled = true;
    cfg.ga.theta_ga = 0;
    cfg.ga.max_numerosity = 200;
    let mut maze = Maze::by_name("medium", cfg.seed).unwrap();
    let mut agent = Agent::new(cfg).unwrap();

    let metrics = agent.explore(&mut maze, &IdentityAdapter, 100, &mut NoopSink).unwrap();
    // Slack for ALP insertions made after the last deletion of a trial
    assert!(metrics.iter().all(|m| m.numerosity <= 250));
}

#[test]
fn test_snapshot_resumes_identically() {
    let cfg = maze_config(11);
    let mut maze = Maze::by_name("simple", cfg.seed).unwrap();
    let mut agent = Agent::new(cfg.clone()).unwrap();
    agent.explore(&mut maze, &IdentityAdapter, 30, &mut NoopSink).unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("maze.acs2");
    let snapshot = Snapshot {
        configuration: cfg.clone(),
        time: agent.time(),
        population: agent.population().clone(),
    };
    save_snapshot(&snapshot, &path).unwrap();
    let loaded = load_snapshot(&path).unwrap();

    let resume = |population| {
        let mut maze = Maze::by_name("simple", 99).unwrap();
        maze.reset();
        let mut agent = Agent::with_population(cfg.clone(), population, snapshot.time).unwrap();
        agent.explore(&mut maze, &IdentityAdapter, 10, &mut NoopSink).unwrap()
    };
    let original = resume(agent.population().clone());
    let restored = resume(loaded.population);
    assert_eq!(original, restored);
}
