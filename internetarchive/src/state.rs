use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Key this fetcher owns in the shared state file
pub const TOTAL_KEY: &str = "total_records_retrieved (internet archive)";

/// Checkpoint persisted between runs.
///
/// The state file is shared by the fetcher family, so keys belonging to other
/// fetchers are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(rename = "total_records_retrieved (internet archive)", default)]
    pub total_records_retrieved: u64,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_yaml::Value>,
}

/// Read the state file, or the zero state when it does not exist yet.
///
/// An existing but empty file is an error: reading it as zero would make the
/// run re-initialize the data file and discard recorded rows.
pub fn load_state(path: &Path) -> Result<State> {
    if !path.exists() {
        return Ok(State::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read state file: {}", path.display()))?;
    if contents.trim().is_empty() {
        bail!("State file is empty: {}", path.display());
    }

    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse state file: {}", path.display()))
}

/// Replace the state file atomically, so an interrupted write leaves the old one
pub fn save_state(path: &Path, state: &State) -> Result<()> {
    let yaml = serde_yaml::to_string(state).context("Failed to serialize state")?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(yaml.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .with_context(|| format!("Failed to write state file: {}", path.display()))?;
    tmp.persist(path)
        .with_context(|| format!("Failed to replace state file: {}", path.display()))?;
    Ok(())
}
