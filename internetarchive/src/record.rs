use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub const DATA_FILE: &str = "internetarchive_fetched.csv";
pub const HEADER: &str = "LICENSE TYPE,Document Count\n";

/// Append-only CSV of per-license document counts.
///
/// Every call opens and closes the file, so rows already recorded survive a
/// failure later in the run.
#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> DataFile {
        DataFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate (or create) the file so it holds only the header
    pub fn initialize(&self) -> Result<()> {
        log::info!("Setting up the data file for recording results.");
        fs::write(&self.path, HEADER)
            .with_context(|| format!("Failed to write header to {}", self.path.display()))
    }

    pub fn append(&self, license: &str, count: u64) -> Result<()> {
        log::info!("Recording data for license: {}", license);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(file);
        writer
            .write_record([license, count.to_string().as_str()])
            .with_context(|| format!("Failed to write row for {}", license))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_writes_only_header() {
        let tmp = tempfile::tempdir().unwrap();
        let data = DataFile::new(tmp.path().join(DATA_FILE));
        fs::write(data.path(), "stale\n").unwrap();

        data.initialize().unwrap();
        assert_eq!(fs::read_to_string(data.path()).unwrap(), HEADER);
    }

    #[test]
    fn test_rows_are_fully_quoted() {
        let tmp = tempfile::tempdir().unwrap();
        let data = DataFile::new(tmp.path().join(DATA_FILE));
        data.initialize().unwrap();

        data.append("licenses/by/4.0", 1234).unwrap();
        assert_eq!(
            fs::read_to_string(data.path()).unwrap(),
            "LICENSE TYPE,Document Count\n\"licenses/by/4.0\",\"1234\"\n"
        );
    }

    #[test]
    fn test_append_keeps_existing_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let data = DataFile::new(tmp.path().join(DATA_FILE));
        data.initialize().unwrap();
        data.append("licenses/by/4.0", 1).unwrap();

        // A later run starts from non-zero state and never re-initializes
        let later = DataFile::new(data.path());
        later.append("licenses/by-sa/4.0", 2).unwrap();
        later.append("licenses/by-nd/4.0", 3).unwrap();

        let contents = fs::read_to_string(data.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(contents.matches("LICENSE TYPE").count(), 1);
        assert_eq!(lines[3], "\"licenses/by-nd/4.0\",\"3\"");
    }
}
