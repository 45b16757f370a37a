//! Environment seams.

use crate::rules::{Action, Perception};
use serde_json::{Map, Value};

/// Result of one environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<O> {
    /// Observation after the action.
    pub observation: O,
    /// Reward for the action.
    pub reward: f64,
    /// Whether the trial ended.
    pub done: bool,
    /// Free-form diagnostics from the environment.
    pub info: Map<String, Value>,
}

impl<O> Step<O> {
    /// Step without diagnostics.
    #[must_use]
    pub fn new(observation: O, reward: f64, done: bool) -> Self {
        Self {
            observation,
            reward,
            done,
            info: Map::new(),
        }
    }
}

/// An episodic environment.
pub trait Environment {
    /// Native observation type.
    type Observation;
    /// Native action type.
    type Action;

    /// Start a new trial.
    fn reset(&mut self) -> Self::Observation;

    /// Execute an action.
    fn step(&mut self, action: Self::Action) -> Step<Self::Observation>;
}

/// Translation between an environment's native encoding and perceptions.
pub trait EnvironmentAdapter<E: Environment> {
    /// Fixed-length symbolic view of an observation.
    fn to_perception(&self, observation: &E::Observation) -> Perception;

    /// Native action for an internal action index.
    fn to_env_action(&self, action: Action) -> E::Action;
}

/// Adapter for environments that already speak perceptions and action indices.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityAdapter;

impl<E> EnvironmentAdapter<E> for IdentityAdapter
where
    E: Environment<Observation = Perception, Action = Action>,
{
    fn to_perception(&self, observation: &Perception) -> Perception {
        observation.clone()
    }

    fn to_env_action(&self, action: Action) -> Action {
        action
    }
}

/// Environments able to enumerate their deterministic transitions.
pub trait TransitionModel {
    /// Every `(p0, action, p1)` of a successful move, whether or not the
    /// perception changes.
    fn possible_transitions(&self) -> Vec<(Perception, Action, Perception)>;
}
