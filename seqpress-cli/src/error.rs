// ============================================================================
// seqpress-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// The CLI reuses the core error type. This module adds a result alias, a
// context extension trait, and the mapping from errors to exit codes.
//
// AI-ASSISTANT-INFO: CLI error handling utilities

// ---- Internal crate imports ----
use seqpress_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;

/// Exit status for a successful run.
pub const EXIT_CODE_SUCCESS: i32 = 0;

/// Exit status for any validation, configuration or conversion failure.
pub const EXIT_CODE_FAILURE: i32 = 1;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Extension trait for adding context to errors in the CLI.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{context}: {core_error}"))
        })
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let core_error: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", f(), core_error))
        })
    }
}

/// Maps the outcome of a run to the process exit status.
pub fn exit_code_for<T>(result: &CliResult<T>) -> i32 {
    match result {
        Ok(_) => EXIT_CODE_SUCCESS,
        Err(_) => EXIT_CODE_FAILURE,
    }
}
