// Allow unwrap in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! ACS2: an anticipatory learning classifier system.
//!
//! The agent learns a population of condition-action-effect rules that
//! anticipate how the environment responds to each action, and improves them
//! with an anticipatory learning process, reinforcement learning and an
//! optional genetic generalization:
//!
//! - Rules with wildcard conditions, effects and probability-enhanced effects
//! - Seeded, reproducible learning from a single random source
//! - Snapshots of learned populations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Agent (explore / exploit trials)  │
//! ├─────────────────────────────────────┤
//! │   Engine (ALP, RL, GA, population)  │
//! ├─────────────────────────────────────┤
//! │   Rules (condition, effect, mark)   │
//! └─────────────────────────────────────┘
//! ```

pub mod agent;
pub mod config;
pub mod engine;
pub mod environments;
pub mod error;
pub mod events;
pub mod persistence;
pub mod rules;

pub use agent::{Agent, Environment, EnvironmentAdapter, IdentityAdapter, Step, TransitionModel, TrialMetrics};
pub use config::{Configuration, GaConfig, LearningConfig};
pub use engine::{ClassifierSet, LearningContext};
pub use error::{Acs2Error, Acs2Result};
pub use events::{Event, EventSink, NoopSink, RecordingSink, TracingSink};
pub use rules::{Action, Classifier, Condition, Effect, Perception, Symbol};
