use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Create a directory and any missing parents, leaving existing contents alone
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path_ref = path.as_ref();
    fs::create_dir_all(path_ref)
        .with_context(|| format!("Failed to create directory: {}", path_ref.display()))
}
