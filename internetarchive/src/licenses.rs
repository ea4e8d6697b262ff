use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

/// File in the repository root listing Creative Commons legal tool paths
pub const MANIFEST_FILE: &str = "legal-tool-paths.txt";

// First two path segments plus the one that follows, e.g. `licenses/by/4.0`
const LICENSE_PATTERN: &str = r"((?:[^/]+/){2}(?:[^/]+)).*";

fn license_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(LICENSE_PATTERN).expect("license pattern is valid"))
}

/// Extract license identifiers from manifest text.
///
/// Each line is treated as a single-column CSV record, so anything after the
/// first comma is ignored. Lines without enough path segments are dropped and
/// duplicates keep their first position.
pub fn extract_licenses(manifest: &str) -> Vec<String> {
    let pattern = license_pattern();
    let mut seen = HashSet::new();
    let mut licenses = Vec::new();

    for line in manifest.lines() {
        let column = line.split(',').next().unwrap_or("").trim_end_matches('\r');
        if column.trim().is_empty() {
            continue;
        }

        let Some(captures) = pattern.captures(column) else {
            continue;
        };
        let license = captures[1].to_string();

        if seen.insert(license.clone()) {
            licenses.push(license);
        }
    }

    licenses
}

/// Load the ordered, deduplicated license list from a manifest file.
///
/// A missing manifest or one with no usable lines is an error: an empty list
/// would make the run silently record nothing.
pub fn load_license_list(path: &Path) -> Result<Vec<String>> {
    log::info!("Retrieving list of licenses from Creative Commons' record.");
    let manifest = fs::read_to_string(path)
        .with_context(|| format!("Failed to read license manifest: {}", path.display()))?;

    let licenses = extract_licenses(&manifest);
    if licenses.is_empty() {
        return Err(anyhow::anyhow!(
            "No license identifiers found in {}",
            path.display()
        ));
    }

    log::debug!("Found {} license identifiers", licenses.len());
    Ok(licenses)
}
