//! Process-level errors.
//!
//! Per-record problems never surface here: they become `RejectedRecord`s in the
//! batch outcome. `AppError` is reserved for failures that stop a run (bad
//! configuration, unreadable input, unwritable output) and carries the exit code
//! the binary should return.

use thiserror::Error;

/// Invalid input files, columns or configuration.
pub const EXIT_INPUT: u8 = 2;
/// Every dataset finished without a single normalized record.
pub const EXIT_NO_RECORDS: u8 = 3;
/// Output could not be written.
pub const EXIT_OUTPUT: u8 = 4;

#[derive(Clone, Error)]
#[error("{message}")]
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

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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
