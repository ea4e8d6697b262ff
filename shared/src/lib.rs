// Harness shared by every quantifying fetcher
pub mod error;
pub mod git;
pub mod io;
pub mod logging;
pub mod paths;

pub use crate::error::{find_quantifying_error, QuantifyingError, EXIT_INTERRUPTED};
pub use crate::git::{GitRepo, RepoSync, SkipSync};
pub use crate::io::ensure_dir;
pub use crate::paths::{quarter_label, Paths, FETCH_PHASE};
