//! Maze command implementation.

use super::output::{MazeReport, format_maze_text};
use super::{CliError, OutputFormat};
use acs2::agent::knowledge;
use acs2::environments::Maze;
use acs2::persistence::{Snapshot, save_any};
use acs2::{Agent, Configuration, Event, EventSink, IdentityAdapter, TracingSink, TransitionModel};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;

/// Perception length of the built-in mazes.
const MAZE_PERCEPTION: usize = 8;

/// Number of moves in the built-in mazes.
const MAZE_ACTIONS: usize = 8;

/// Arguments of the `maze` command.
#[derive(Debug)]
pub(crate) struct MazeArgs {
    pub(crate) layout: String,
    pub(crate) explore: usize,
    pub(crate) exploit: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) epsilon: Option<f64>,
    pub(crate) ga: bool,
    pub(crate) pee: bool,
    pub(crate) config: Option<PathBuf>,
    pub(crate) save: Option<PathBuf>,
    pub(crate) format: OutputFormat,
    pub(crate) progress: bool,
}

/// Forwards events to `tracing` and ticks the progress bar once per trial.
#[derive(Debug)]
struct ProgressSink {
    bar: Option<ProgressBar>,
}

impl EventSink for ProgressSink {
    fn emit(&mut self, event: Event) {
        if let (Event::TrialCompleted(_), Some(bar)) = (&event, &self.bar) {
            bar.inc(1);
        }
        TracingSink.emit(event);
    }
}

fn progress_bar(trials: usize) -> ProgressBar {
    let pb = ProgressBar::new(trials as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trials ({per_sec})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

fn load_configuration(args: &MazeArgs) -> Result<Configuration, CliError> {
    let mut cfg = match &args.config {
        Some(path) => Configuration::from_json_file(path)
            .map_err(|e| CliError::new(format!("Failed to load {}: {e}", path.display())))?,
        None => Configuration::new(MAZE_PERCEPTION, MAZE_ACTIONS),
    };
    if cfg.perception_length != MAZE_PERCEPTION || cfg.number_of_actions != MAZE_ACTIONS {
        return Err(CliError::new(format!(
            "maze needs perception_length {MAZE_PERCEPTION} and number_of_actions {MAZE_ACTIONS}"
        )));
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    if let Some(epsilon) = args.epsilon {
        cfg.learning.epsilon = epsilon;
    }
    cfg.ga.enabled |= args.ga;
    cfg.learning.do_pee |= args.pee;
    cfg.validate()?;
    Ok(cfg)
}

/// Execute the maze command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the layout is unknown,
/// or the snapshot cannot be written.
pub(crate) fn execute(args: &MazeArgs) -> Result<(), CliError> {
    let cfg = load_configuration(args)?;
    let mut maze = Maze::by_name(&args.layout, cfg.seed)?;
    let mut agent = Agent::new(cfg.clone())?;

    let bar = args.progress.then(|| progress_bar(args.explore + args.exploit));
    let mut sink = ProgressSink { bar };
    let start = Instant::now();

    let explore = agent.explore(&mut maze, &IdentityAdapter, args.explore, &mut sink)?;
    let exploit = agent.exploit(&mut maze, &IdentityAdapter, args.exploit, &mut sink)?;

    if let Some(bar) = sink.bar.take() {
        bar.finish_with_message("done");
    }
    let duration = start.elapsed();

    let knowledge = knowledge(agent.population(), &maze.possible_transitions())?;
    let report = MazeReport::new(&args.layout, &explore, &exploit, knowledge, agent.population());

    match args.format {
        OutputFormat::Text => print!("{}", format_maze_text(&report, duration)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(path) = &args.save {
        let snapshot = Snapshot {
            configuration: cfg,
            time: agent.time(),
            population: agent.into_population(),
        };
        save_any(&snapshot, path)?;
        if args.format == OutputFormat::Text {
            println!("Saved population to {}", path.display());
        }
    }

    Ok(())
}
