use thiserror::Error;

/// Exit code used when a run is halted by Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// An error that ends a fetcher run with a specific process exit code.
///
/// An exit code of 0 is a normal early stop, not a failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct QuantifyingError {
    pub message: String,
    pub exit_code: i32,
}

impl QuantifyingError {
    pub fn new(message: impl Into<String>, exit_code: i32) -> Self {
        QuantifyingError {
            message: message.into(),
            exit_code,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.exit_code != 0
    }
}

/// Find the first `QuantifyingError` anywhere in an error's cause chain
pub fn find_quantifying_error(err: &anyhow::Error) -> Option<&QuantifyingError> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<QuantifyingError>())
}
