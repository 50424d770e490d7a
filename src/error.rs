//! Error types.
//!
//! `AppError` is the process-level error: it carries the exit code the `ie`
//! binary returns. `DataShortfall` is the data-level condition reported by
//! derivations that cannot produce a value from the cleaned series; it is
//! carried inside the pipeline result rather than aborting the run.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;

/// Exit code for unreadable input, bad arguments, and export failures.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for terminal/runtime failures.
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// The input file could not be located or read. Fatal for the run.
    pub fn source_unavailable(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::new(
            EXIT_INPUT,
            format!("Data file not found or unreadable at '{}': {err}", path.display()),
        )
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Why a derivation produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataShortfall {
    #[error("no data")]
    NoData,
    #[error("insufficient data: need at least {required} distinct dates, found {available}")]
    InsufficientData { required: usize, available: usize },
    /// Enough points, but the least squares solve produced no finite fit.
    #[error("fit failed: no finite least squares solution")]
    FitFailed,
}
