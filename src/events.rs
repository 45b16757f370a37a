//! Learning events.
//!
//! The engine reports every change to the population through an
//! [`EventSink`] handed to it by the caller:
//! - `NoopSink`: discards all events
//! - `RecordingSink`: keeps them in memory, mostly for tests
//! - `TracingSink`: forwards them to `tracing` at debug level

use crate::agent::TrialMetrics;
use crate::rules::ClassifierKey;
use serde::{Deserialize, Serialize};

/// How a classifier came into being.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// No classifier anticipated the observed transition.
    Covering,
    /// ALP specialization of an incorrect or marked classifier.
    Specialization,
    /// ALP generalization of unchanging attributes.
    Generalization,
    /// Merge of two classifiers into a probability-enhanced one.
    Merge,
    /// GA offspring.
    Reproduction,
}

/// Why a classifier left the population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Quality fell below the inadequacy threshold.
    Inadequate,
    /// GA deletion to respect the numerosity ceiling.
    Deletion,
}

/// A change to the population or a trial boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A new classifier was inserted.
    Created {
        /// Step counter.
        time: u64,
        /// Operator that produced it.
        origin: Origin,
        /// Identity of the new classifier.
        classifier: ClassifierKey,
    },
    /// A candidate was folded into an existing classifier.
    Absorbed {
        /// Step counter.
        time: u64,
        /// Operator that produced the candidate.
        origin: Origin,
        /// Classifier whose numerosity grew.
        into: ClassifierKey,
        /// Its numerosity afterwards.
        numerosity: u32,
    },
    /// A classifier was removed entirely.
    Removed {
        /// Step counter.
        time: u64,
        /// Reason for removal.
        cause: RemovalCause,
        /// Identity of the removed classifier.
        classifier: ClassifierKey,
    },
    /// The GA ran on an action set.
    GeneticAlgorithm {
        /// Step counter.
        time: u64,
        /// Number of classifiers in the action set.
        action_set_size: usize,
    },
    /// A trial finished.
    TrialCompleted(TrialMetrics),
}

/// Receiver of learning events.
pub trait EventSink {
    /// Handle one event.
    fn emit(&mut self, event: Event);
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&mut self, _event: Event) {}
}

/// Sink that keeps every event in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    /// Events received so far.
    pub events: Vec<Event>,
}

impl RecordingSink {
    /// Number of `Created` events with the given origin.
    #[must_use]
    pub fn created(&self, origin: Origin) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Created { origin: o, .. } if *o == origin))
            .count()
    }

    /// Number of `Removed` events with the given cause.
    #[must_use]
    pub fn removed(&self, cause: RemovalCause) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Removed { cause: c, .. } if *c == cause))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

/// Sink that logs each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Created { time, origin, classifier } => {
                tracing::debug!(time, ?origin, %classifier, "classifier created");
            }
            Event::Absorbed { time, origin, into, numerosity } => {
                tracing::debug!(time, ?origin, %into, numerosity, "classifier absorbed");
            }
            Event::Removed { time, cause, classifier } => {
                tracing::debug!(time, ?cause, %classifier, "classifier removed");
            }
            Event::GeneticAlgorithm { time, action_set_size } => {
                tracing::debug!(time, action_set_size, "genetic algorithm applied");
            }
            Event::TrialCompleted(metrics) => {
                tracing::debug!(
                    trial = metrics.trial,
                    steps = metrics.steps,
                    population = metrics.population,
                    "trial completed"
                );
            }
        }
    }
}
