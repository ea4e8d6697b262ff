use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};

/// Phase directory that fetchers write into
pub const FETCH_PHASE: &str = "1-fetch";

/// Every location a fetcher reads or writes, resolved from the repository root.
///
/// Data is grouped by calendar quarter:
///
/// ```text
/// <repo>/data/state.yaml
/// <repo>/data/2024Q3/1-fetch/<fetcher>.csv
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub repo: PathBuf,
    pub data: PathBuf,
    pub data_quarter: PathBuf,
    pub data_phase: PathBuf,
    pub state: PathBuf,
}

impl Paths {
    pub fn resolve<P: Into<PathBuf>>(repo: P, phase: &str, today: NaiveDate) -> Paths {
        let repo = repo.into();
        let data = repo.join("data");
        let data_quarter = data.join(quarter_label(today));
        let data_phase = data_quarter.join(phase);
        let state = data.join("state.yaml");

        Paths {
            repo,
            data,
            data_quarter,
            data_phase,
            state,
        }
    }

    /// Resolve paths for the current local date
    pub fn for_today<P: Into<PathBuf>>(repo: P, phase: &str) -> Paths {
        Paths::resolve(repo, phase, Local::now().date_naive())
    }

    /// Path of a file inside the phase directory
    pub fn phase_file(&self, file_name: &str) -> PathBuf {
        self.data_phase.join(file_name)
    }

    pub fn repo_file(&self, file_name: &str) -> PathBuf {
        self.repo.join(file_name)
    }

    pub fn log(&self) {
        let entries: [(&str, &Path); 5] = [
            ("repo", &self.repo),
            ("data", &self.data),
            ("data_quarter", &self.data_quarter),
            ("data_phase", &self.data_phase),
            ("state", &self.state),
        ];
        log::info!("PATHS:");
        for (name, path) in entries {
            log::info!("  {}: {}", name, path.display());
        }
    }
}

/// Quarter label such as `2024Q3`
pub fn quarter_label(date: NaiveDate) -> String {
    format!("{}Q{}", date.year(), date.month0() / 3 + 1)
}
