//! Trial driver.
//!
//! An [`Agent`] owns the configuration, the population, the single seeded
//! random source and the global step counter. It runs explore, exploit or
//! alternating trials against any [`Environment`] through an
//! [`EnvironmentAdapter`], invoking the engine once per transition.

mod action_selection;
mod environment;
mod metrics;

pub use action_selection::{best_action, choose_action};
pub use environment::{Environment, EnvironmentAdapter, IdentityAdapter, Step, TransitionModel};
pub use metrics::{TrialMetrics, knowledge};

use crate::config::Configuration;
use crate::engine::{
    ActionSet, AlpReport, ClassifierSet, LearningContext, MatchSet, apply_alp, apply_ga,
    apply_reinforcement_learning,
};
use crate::error::{Acs2Error, Acs2Result};
use crate::events::{Event, EventSink};
use crate::rules::{Action, Perception};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

/// Interval, in trials, between progress log lines.
const LOG_EVERY: usize = 25;

/// Which kind of trial to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Explore,
    Exploit,
}

/// Outcome of a single trial.
#[derive(Debug, Clone, Copy)]
struct TrialOutcome {
    steps: usize,
    reward: f64,
    anticipation: Option<AlpReport>,
}

/// An ACS2 learner.
#[derive(Debug, Clone)]
pub struct Agent<R = SmallRng> {
    cfg: Configuration,
    population: ClassifierSet,
    rng: R,
    time: u64,
}

impl Agent<SmallRng> {
    /// Agent with an empty population, seeded from `cfg.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Configuration`] if the configuration is invalid.
    pub fn new(cfg: Configuration) -> Acs2Result<Self> {
        Self::with_population(cfg, ClassifierSet::new(), 0)
    }

    /// Agent resuming from a saved population at step `time`.
    ///
    /// The population is rebound to `cfg.learning`.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Configuration`] if the configuration is invalid.
    pub fn with_population(cfg: Configuration, population: ClassifierSet, time: u64) -> Acs2Result<Self> {
        let rng = SmallRng::seed_from_u64(cfg.seed);
        let mut agent = Self::with_rng(cfg, rng)?;
        agent.population = population;
        agent.population.rebind(&agent.cfg.learning);
        agent.time = time;
        Ok(agent)
    }
}

impl<R: Rng> Agent<R> {
    /// Agent drawing from a caller-supplied random source.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Configuration`] if the configuration is invalid.
    pub fn with_rng(cfg: Configuration, rng: R) -> Acs2Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            population: ClassifierSet::new(),
            rng,
            time: 0,
        })
    }

    /// Run configuration.
    #[must_use]
    pub const fn cfg(&self) -> &Configuration {
        &self.cfg
    }

    /// Current population.
    #[must_use]
    pub const fn population(&self) -> &ClassifierSet {
        &self.population
    }

    /// Consume the agent, keeping its population.
    #[must_use]
    pub fn into_population(self) -> ClassifierSet {
        self.population
    }

    /// Steps taken so far across all trials.
    #[must_use]
    pub const fn time(&self) -> u64 {
        self.time
    }

    /// Learn from `trials` exploration trials.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Shape`] if the adapter produces perceptions of the
    /// wrong length.
    pub fn explore<E, A>(
        &mut self,
        env: &mut E,
        adapter: &A,
        trials: usize,
        sink: &mut dyn EventSink,
    ) -> Acs2Result<Vec<TrialMetrics>>
    where
        E: Environment,
        A: EnvironmentAdapter<E>,
    {
        self.evaluate(env, adapter, trials, sink, |_| Phase::Explore)
    }

    /// Act greedily for `trials` trials, updating rewards only.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Shape`] if the adapter produces perceptions of the
    /// wrong length.
    pub fn exploit<E, A>(
        &mut self,
        env: &mut E,
        adapter: &A,
        trials: usize,
        sink: &mut dyn EventSink,
    ) -> Acs2Result<Vec<TrialMetrics>>
    where
        E: Environment,
        A: EnvironmentAdapter<E>,
    {
        self.evaluate(env, adapter, trials, sink, |_| Phase::Exploit)
    }

    /// Alternate exploration and exploitation, starting with exploration.
    ///
    /// # Errors
    ///
    /// Returns [`Acs2Error::Shape`] if the adapter produces perceptions of the
    /// wrong length.
    pub fn explore_exploit<E, A>(
        &mut self,
        env: &mut E,
        adapter: &A,
        trials: usize,
        sink: &mut dyn EventSink,
    ) -> Acs2Result<Vec<TrialMetrics>>
    where
        E: Environment,
        A: EnvironmentAdapter<E>,
    {
        self.evaluate(env, adapter, trials, sink, |trial| {
            if trial % 2 == 0 { Phase::Explore } else { Phase::Exploit }
        })
    }

    fn evaluate<E, A>(
        &mut self,
        env: &mut E,
        adapter: &A,
        trials: usize,
        sink: &mut dyn EventSink,
        phase: impl Fn(usize) -> Phase,
    ) -> Acs2Result<Vec<TrialMetrics>>
    where
        E: Environment,
        A: EnvironmentAdapter<E>,
    {
        let mut metrics = Vec::with_capacity(trials);
        for trial in 0..trials {
            let outcome = match phase(trial) {
                Phase::Explore => self.run_explore_trial(env, adapter, sink)?,
                Phase::Exploit => self.run_exploit_trial(env, adapter)?,
            };
            let m = TrialMetrics::collect(
                &self.population,
                trial,
                outcome.steps,
                self.time,
                outcome.reward,
                outcome.anticipation,
            );
            if trial % LOG_EVERY == 0 {
                info!(trials, "{m}");
            }
            sink.emit(Event::TrialCompleted(m.clone()));
            metrics.push(m);
        }
        Ok(metrics)
    }

    fn perceive<E, A>(&self, adapter: &A, observation: &E::Observation) -> Acs2Result<Perception>
    where
        E: Environment,
        A: EnvironmentAdapter<E>,
    {
        let perception = adapter.to_perception(observation);
        Acs2Error::check_shape(self.cfg.perception_length, perception.len())?;
        Ok(perception)
    }

    /// ALP, reinforcement and GA for one transition `p0 --action--> p1`.
    ///
    /// Without a match set the transition ended the trial and the next
    /// state is worth nothing.
    #[allow(clippy::too_many_arguments)]
    fn learn_transition(
        &mut self,
        sink: &mut dyn EventSink,
        mut match_set: Option<&mut MatchSet>,
        action_set: &mut ActionSet,
        p0: &Perception,
        action: Action,
        p1: &Perception,
        reward: f64,
        report: &mut AlpReport,
    ) -> Acs2Result<()> {
        let mut ctx = LearningContext::new(&self.cfg, &mut self.rng, sink);
        let r = apply_alp(
            &mut self.population,
            match_set.as_deref_mut(),
            action_set,
            p0,
            action,
            p1,
            self.time,
            &mut ctx,
        )?;
        report.correct += r.correct;
        report.total += r.total;

        let next_max = match_set.as_deref().map_or(0.0, |ms| self.population.max_fitness(ms));
        let (beta, gamma) = (self.cfg.learning.beta, self.cfg.learning.gamma);
        apply_reinforcement_learning(&mut self.population, action_set, reward, next_max, beta, gamma);
        if self.cfg.ga.enabled {
            apply_ga(self.time, &mut self.population, match_set, action_set, p1, &mut ctx)?;
        }
        Ok(())
    }

    fn run_explore_trial<E, A>(
        &mut self,
        env: &mut E,
        adapter: &A,
        sink: &mut dyn EventSink,
    ) -> Acs2Result<TrialOutcome>
    where
        E: Environment,
        A: EnvironmentAdapter<E>,
    {
        let mut state = self.perceive::<E, A>(adapter, &env.reset())?;
        let mut previous: Option<(Perception, Action, ActionSet, f64)> = None;
        let mut report = AlpReport::default();
        let mut steps = 0;
        let mut total_reward = 0.0;

        loop {
            let mut match_set: MatchSet = self.population.form_match_set(&state)?;
            if let Some((p0, action, mut action_set, reward)) = previous.take() {
                self.learn_transition(
                    &mut *sink,
                    Some(&mut match_set),
                    &mut action_set,
                    &p0,
                    action,
                    &state,
                    reward,
                    &mut report,
                )?;
            }

            let action = choose_action(
                &self.population,
                &match_set,
                self.cfg.number_of_actions,
                self.cfg.learning.epsilon,
                &mut self.rng,
            );
            let mut action_set = ClassifierSet::form_action_set(&match_set, action);
            let step = env.step(adapter.to_env_action(action));
            let next = self.perceive::<E, A>(adapter, &step.observation)?;
            steps += 1;
            total_reward += step.reward;
            self.time += 1;
            debug!(step = steps, %state, action, %next, reward = step.reward, "explore step");

            if step.done {
                self.learn_transition(
                    &mut *sink,
                    None,
                    &mut action_set,
                    &state,
                    action,
                    &next,
                    step.reward,
                    &mut report,
                )?;
                break;
            }
            if steps >= self.cfg.max_trial_steps {
                warn!(steps, "trial stopped at the step limit");
                let mut next_match_set = self.population.form_match_set(&next)?;
                self.learn_transition(
                    &mut *sink,
                    Some(&mut next_match_set),
                    &mut action_set,
                    &state,
                    action,
                    &next,
                    step.reward,
                    &mut report,
                )?;
                break;
            }
            previous = Some((state, action, action_set, step.reward));
            state = next;
        }

        Ok(TrialOutcome {
            steps,
            reward: total_reward,
            anticipation: Some(report),
        })
    }

    fn run_exploit_trial<E, A>(&mut self, env: &mut E, adapter: &A) -> Acs2Result<TrialOutcome>
    where
        E: Environment,
        A: EnvironmentAdapter<E>,
    {
        let mut state = self.perceive::<E, A>(adapter, &env.reset())?;
        let mut previous: Option<(ActionSet, f64)> = None;
        let mut steps = 0;
        let mut total_reward = 0.0;
        let (beta, gamma) = (self.cfg.learning.beta, self.cfg.learning.gamma);

        loop {
            let match_set = self.population.form_match_set(&state)?;
            if let Some((action_set, reward)) = previous.take() {
                let next_max = self.population.max_fitness(&match_set);
                apply_reinforcement_learning(&mut self.population, &action_set, reward, next_max, beta, gamma);
            }

            let action = choose_action(
                &self.population,
                &match_set,
                self.cfg.number_of_actions,
                0.0,
                &mut self.rng,
            );
            let action_set = ClassifierSet::form_action_set(&match_set, action);
            let step = env.step(adapter.to_env_action(action));
            let next = self.perceive::<E, A>(adapter, &step.observation)?;
            steps += 1;
            total_reward += step.reward;
            self.time += 1;
            debug!(step = steps, %state, action, %next, reward = step.reward, "exploit step");

            if step.done {
                apply_reinforcement_learning(&mut self.population, &action_set, step.reward, 0.0, beta, gamma);
                break;
            }
            if steps >= self.cfg.max_trial_steps {
                warn!(steps, "trial stopped at the step limit");
                break;
            }
            previous = Some((action_set, step.reward));
            state = next;
        }

        Ok(TrialOutcome {
            steps,
            reward: total_reward,
            anticipation: None,
        })
    }
}
