//! Inspect command implementation.

use super::output::format_population_text;
use super::{CliError, OutputFormat};
use acs2::Classifier;
use acs2::persistence::load_any;
use std::path::Path;

/// Execute the inspect command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read.
pub(crate) fn execute(snapshot: &Path, reliable: bool, format: OutputFormat) -> Result<(), CliError> {
    let loaded = load_any(snapshot)
        .map_err(|e| CliError::new(format!("Failed to load {}: {e}", snapshot.display())))?;
    let selected: Vec<&Classifier> = loaded
        .population
        .iter()
        .filter(|cl| !reliable || cl.is_reliable())
        .collect();

    match format {
        OutputFormat::Text => {
            println!(
                "Snapshot at step {} (perception length {}, {} actions)",
                loaded.time, loaded.configuration.perception_length, loaded.configuration.number_of_actions
            );
            print!("{}", format_population_text(selected.into_iter()));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&selected)?),
    }
    Ok(())
}
