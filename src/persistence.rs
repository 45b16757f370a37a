//! Saving and loading learned populations.
//!
//! The binary format is a 4-byte magic, a version byte and an LZ4-compressed
//! bincode payload. JSON export is provided for inspection with other tools.

use crate::config::Configuration;
use crate::engine::ClassifierSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

/// Magic bytes for file format identification.
const MAGIC: &[u8; 4] = b"ACS2";

/// Current format version.
const VERSION: u8 = 1;

/// A learned model together with the settings it was learned under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Configuration of the run.
    pub configuration: Configuration,
    /// Agent step counter when the snapshot was taken.
    pub time: u64,
    /// The population.
    pub population: ClassifierSet,
}

fn invalid_data<E>(e: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn validated(mut snapshot: Snapshot) -> io::Result<Snapshot> {
    snapshot.configuration.validate().map_err(invalid_data)?;
    snapshot.population.rebind(&snapshot.configuration.learning);
    Ok(snapshot)
}

/// Save a snapshot in the compressed binary format.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> io::Result<()> {
    let encoded = bincode::serialize(snapshot).map_err(invalid_data)?;
    let compressed = lz4_flex::compress_prepend_size(&encoded);

    let mut file = fs::File::create(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&[VERSION])?;
    file.write_all(&compressed)?;
    Ok(())
}

/// Load a snapshot saved by [`save_snapshot`].
///
/// # Errors
///
/// Returns an error if the file format is invalid, decompression fails, or
/// the stored configuration does not validate.
pub fn load_snapshot(path: &Path) -> io::Result<Snapshot> {
    let mut file = fs::File::open(path)?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(invalid_data("invalid file magic"));
    }

    let mut version = [0u8; 1];
    file.read_exact(&mut version)?;
    if version[0] != VERSION {
        return Err(invalid_data(format!("unsupported version: {}", version[0])));
    }

    let mut compressed = Vec::new();
    file.read_to_end(&mut compressed)?;
    let decompressed = lz4_flex::decompress_size_prepended(&compressed).map_err(invalid_data)?;
    let snapshot: Snapshot = bincode::deserialize(&decompressed).map_err(invalid_data)?;
    validated(snapshot)
}

/// Write a snapshot as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn export_json(snapshot: &Snapshot, path: &Path) -> io::Result<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(invalid_data)?;
    fs::write(path, json)
}

/// Read a snapshot written by [`export_json`].
///
/// # Errors
///
/// Returns an error if the file is not a valid snapshot.
pub fn import_json(path: &Path) -> io::Result<Snapshot> {
    let content = fs::read_to_string(path)?;
    let snapshot: Snapshot = serde_json::from_str(&content).map_err(invalid_data)?;
    validated(snapshot)
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

/// Save in either format, choosing JSON for a `.json` extension.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_any(snapshot: &Snapshot, path: &Path) -> io::Result<()> {
    if is_json(path) { export_json(snapshot, path) } else { save_snapshot(snapshot, path) }
}

/// Load either format, choosing JSON for a `.json` extension.
///
/// # Errors
///
/// Returns an error if the file is not a valid snapshot.
pub fn load_any(path: &Path) -> io::Result<Snapshot> {
    if is_json(path) { import_json(path) } else { load_snapshot(path) }
}
