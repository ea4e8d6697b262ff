use anyhow::Result;
use quantifying_shared::{ensure_dir, find_quantifying_error, Paths, QuantifyingError, RepoSync};

use crate::licenses::{load_license_list, MANIFEST_FILE};
use crate::record::{DataFile, DATA_FILE};
use crate::search::LicenseSearch;
use crate::state::{load_state, save_state};

/// Once the cumulative total reaches this, runs stop fetching
pub const GOAL_DOCUMENTS: u64 = 1000;

pub const COMMIT_MESSAGE: &str = "Add and commit Internet Archive data";

/// How a run ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    GoalAlreadyMet {
        total: u64,
    },
    Fetched {
        licenses: usize,
        retrieved: u64,
        total: u64,
    },
}

/// Count documents for a single license.
///
/// Any failure, including exhausted retries, becomes a fatal error with exit
/// code 1 so the caller stops the whole run.
pub fn fetch_license_count(
    search: &dyn LicenseSearch,
    license: &str,
) -> Result<u64, QuantifyingError> {
    log::info!("Querying metadata for license: {}", license);
    search.count(license).map_err(|e| {
        log::error!("Error fetching data for license: {}: {:#}", license, e);
        QuantifyingError::new(format!("Error fetching data: {:#}", e), 1)
    })
}

/// Query each license in order, recording a row as soon as its count is known.
///
/// Stops at the first failed query. Rows recorded before the failure stay in
/// the data file.
pub fn retrieve_license_data(
    search: &dyn LicenseSearch,
    licenses: &[String],
    data: &DataFile,
) -> Result<u64> {
    log::info!("Retrieving the data for all license types.");
    let mut retrieved = 0;

    for license in licenses {
        let count = fetch_license_count(search, license)?;
        retrieved += count;
        data.append(license, count)?;
    }

    Ok(retrieved)
}

/// One scheduled fetch: sync, resume from state, query, record, persist, publish
pub fn run(
    paths: &Paths,
    sync: &dyn RepoSync,
    search: &dyn LicenseSearch,
    max_licenses: usize,
) -> Result<RunOutcome> {
    sync.fetch_and_merge()?;

    let mut state = load_state(&paths.state)?;
    let initial_total = state.total_records_retrieved;
    log::info!("Initial total_records_retrieved: {}", initial_total);

    if initial_total >= GOAL_DOCUMENTS {
        log::info!(
            "Goal of {} documents already achieved. No further action required.",
            GOAL_DOCUMENTS
        );
        return Ok(RunOutcome::GoalAlreadyMet {
            total: initial_total,
        });
    }

    paths.log();

    let all_licenses = load_license_list(&paths.repo_file(MANIFEST_FILE))?;
    let licenses = &all_licenses[..max_licenses.min(all_licenses.len())];

    ensure_dir(&paths.data_phase)?;
    let data = DataFile::new(paths.phase_file(DATA_FILE));
    if initial_total == 0 {
        data.initialize()?;
    }

    let retrieved = retrieve_license_data(search, licenses, &data)?;

    state.total_records_retrieved = initial_total + retrieved;
    log::info!(
        "Total documents retrieved after fetching: {}",
        state.total_records_retrieved
    );
    save_state(&paths.state, &state)?;

    sync.add_and_commit(
        &[paths.data_quarter.as_path(), paths.state.as_path()],
        COMMIT_MESSAGE,
    )?;
    sync.push()?;

    Ok(RunOutcome::Fetched {
        licenses: licenses.len(),
        retrieved,
        total: state.total_records_retrieved,
    })
}

/// Process exit code for a finished run, logging how it ended.
///
/// Harness errors keep their own code (0 is an early stop, not a failure);
/// anything else is 1.
pub fn exit_code(result: &Result<RunOutcome>) -> i32 {
    match result {
        Ok(RunOutcome::GoalAlreadyMet { total }) => {
            log::info!("Nothing fetched, {} documents already recorded", total);
            0
        }
        Ok(RunOutcome::Fetched {
            licenses,
            retrieved,
            total,
        }) => {
            log::info!(
                "Fetched {} documents across {} licenses ({} total)",
                retrieved,
                licenses,
                total
            );
            0
        }
        Err(e) => match find_quantifying_error(e) {
            Some(fatal) if !fatal.is_failure() => {
                log::info!("{}", fatal.message);
                0
            }
            Some(fatal) => {
                log::error!("{}", fatal.message);
                fatal.exit_code
            }
            None => {
                log::error!("(1) Unhandled error: {:?}", e);
                1
            }
        },
    }
}
