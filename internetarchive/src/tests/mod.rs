use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Result;
use quantifying_shared::{Paths, RepoSync, FETCH_PHASE};
use tempfile::TempDir;

use crate::licenses::MANIFEST_FILE;
use crate::search::LicenseSearch;

pub mod fixtures;

/// Search double that answers from a table and remembers every query
#[derive(Default)]
pub struct FakeSearch {
    counts: HashMap<String, u64>,
    failing: Option<String>,
    pub queried: RefCell<Vec<String>>,
}

impl FakeSearch {
    pub fn with_counts(counts: &[(&str, u64)]) -> FakeSearch {
        FakeSearch {
            counts: counts
                .iter()
                .map(|(license, count)| (license.to_string(), *count))
                .collect(),
            ..FakeSearch::default()
        }
    }

    /// Make queries for `license` fail as if retries were exhausted
    pub fn failing_on(mut self, license: &str) -> FakeSearch {
        self.failing = Some(license.to_string());
        self
    }
}

impl LicenseSearch for FakeSearch {
    fn count(&self, license: &str) -> Result<u64> {
        self.queried.borrow_mut().push(license.to_string());
        if self.failing.as_deref() == Some(license) {
            return Err(anyhow::anyhow!(
                "Max retries (5) exceeded for archive search, last failure: status 503"
            ));
        }
        self.counts
            .get(license)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("unexpected license {}", license))
    }
}

/// Repository sync double that records which operations ran
#[derive(Default)]
pub struct RecordingSync {
    pub calls: RefCell<Vec<String>>,
}

impl RepoSync for RecordingSync {
    fn fetch_and_merge(&self) -> Result<()> {
        self.calls.borrow_mut().push("fetch_and_merge".to_string());
        Ok(())
    }

    fn add_and_commit(&self, paths: &[&Path], message: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("add_and_commit({}): {}", paths.len(), message));
        Ok(())
    }

    fn push(&self) -> Result<()> {
        self.calls.borrow_mut().push("push".to_string());
        Ok(())
    }
}

/// Scratch repository with a manifest and quarter-resolved paths
pub struct ScratchRepo {
    _dir: TempDir,
    pub paths: Paths,
}

impl ScratchRepo {
    pub fn with_manifest(fixture_name: &str) -> ScratchRepo {
        let dir = tempfile::tempdir().unwrap();
        let manifest = fixtures::load_manifest_fixture(fixture_name);
        fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
        let paths = Paths::for_today(dir.path(), FETCH_PHASE);
        ScratchRepo { _dir: dir, paths }
    }

    pub fn empty() -> ScratchRepo {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::for_today(dir.path(), FETCH_PHASE);
        ScratchRepo { _dir: dir, paths }
    }

    pub fn write_state(&self, yaml: &str) {
        fs::create_dir_all(&self.paths.data).unwrap();
        fs::write(&self.paths.state, yaml).unwrap();
    }
}
