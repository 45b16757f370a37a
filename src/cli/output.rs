//! Output formatting utilities for CLI.

// Averages over trial counts
#![allow(clippy::cast_precision_loss)]

use acs2::{Action, Classifier, ClassifierSet, TrialMetrics};
use acs2::environments::Maze;
use serde::Serialize;
use std::fmt::Write;
use std::time::Duration;

/// JSON-serializable result of a maze run.
#[derive(Debug, Serialize)]
pub(super) struct MazeReport {
    /// Layout name.
    pub(super) layout: String,
    /// Metrics of every exploration trial.
    pub(super) explore: Vec<TrialMetrics>,
    /// Metrics of every exploitation trial.
    pub(super) exploit: Vec<TrialMetrics>,
    /// Percentage of maze transitions known by reliable classifiers.
    pub(super) knowledge: Option<f64>,
    /// Final number of macro-classifiers.
    pub(super) population: usize,
    /// Final number of reliable classifiers.
    pub(super) reliable: usize,
}

impl MazeReport {
    /// Collect the report of a finished run.
    pub(super) fn new(
        layout: &str,
        explore: &[TrialMetrics],
        exploit: &[TrialMetrics],
        knowledge: Option<f64>,
        population: &ClassifierSet,
    ) -> Self {
        Self {
            layout: layout.to_string(),
            explore: explore.to_vec(),
            exploit: exploit.to_vec(),
            knowledge,
            population: population.len(),
            reliable: population.reliable_count(),
        }
    }
}

fn mean_steps(trials: &[TrialMetrics]) -> Option<f64> {
    if trials.is_empty() {
        return None;
    }
    Some(trials.iter().map(|m| m.steps as f64).sum::<f64>() / trials.len() as f64)
}

/// Format a maze run as human-readable text.
pub(super) fn format_maze_text(report: &MazeReport, duration: Duration) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "Maze: {} ({:.2}s)", report.layout, duration.as_secs_f64());
    for (name, trials) in [("Explore", &report.explore), ("Exploit", &report.exploit)] {
        let _ = write!(output, "  {name}: {} trials", trials.len());
        if let Some(steps) = mean_steps(trials) {
            let _ = write!(output, ", {steps:.1} steps on average");
        }
        output.push('\n');
        if let Some(last) = trials.last() {
            let _ = writeln!(output, "    last: {last}");
        }
    }
    let _ = writeln!(
        output,
        "  Population: {} classifiers, {} reliable",
        report.population, report.reliable
    );
    match report.knowledge {
        Some(k) => {
            let _ = writeln!(output, "  Knowledge: {k:.1}%");
        }
        None => output.push_str("  Knowledge: n/a\n"),
    }

    output
}

fn maze_action_name(action: Action) -> String {
    Maze::action_name(action).to_string()
}

/// Format classifiers one per line with maze action names.
pub(super) fn format_population_text<'a>(classifiers: impl Iterator<Item = &'a Classifier>) -> String {
    let mut output = String::new();
    let mut count = 0usize;
    for cl in classifiers {
        let _ = writeln!(output, "{}", cl.display_with(&maze_action_name));
        count += 1;
    }
    let _ = writeln!(output, "{count} classifiers");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_report_without_trials() {
        let report = MazeReport::new("simple", &[], &[], None, &ClassifierSet::new());
        let text = format_maze_text(&report, Duration::from_millis(10));
        assert!(text.contains("Maze: simple"));
        assert!(text.contains("Knowledge: n/a"));
        assert!(!text.contains("on average"));
    }
}
