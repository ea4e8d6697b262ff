pub mod fetch;
pub mod licenses;
pub mod record;
pub mod search;
pub mod state;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::fetch::{
    exit_code, fetch_license_count, retrieve_license_data, run, RunOutcome, GOAL_DOCUMENTS,
};
pub use crate::licenses::{extract_licenses, load_license_list, MANIFEST_FILE};
pub use crate::record::{DataFile, DATA_FILE, HEADER};
pub use crate::search::{license_query, ArchiveSearch, LicenseSearch, RetryPolicy};
pub use crate::state::{load_state, save_state, State};
