// ============================================================================
// seqpress-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for seqpress-core
//
// This module defines the error types used throughout the seqpress-core
// library. Every variant is scoped to the operation that raised it and carries
// the path or sequence key it concerns, so the CLI can report a failure
// without re-deriving context.
//
// KEY COMPONENTS:
// - CoreError: Main error enum covering organize, probe, bitrate, layout,
//   command, finalize and configuration failures
// - CoreResult: Type alias for Result with CoreError
// - Helper constructors for external command failures
//
// AI-ASSISTANT-INFO: Error handling infrastructure for the core library

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised by seqpress-core.
///
/// Every variant aborts the sequence being processed. The orchestrator never
/// swallows one of these; best-effort failures are logged instead of being
/// turned into a `CoreError`.
#[derive(Error, Debug)]
pub enum CoreError {
    // ---- File organization ----
    #[error("Failed to organize videos in {root}: {source}")]
    OrganizeFailed {
        root: PathBuf,
        #[source]
        source: io::Error,
    },

    // ---- Stream probing ----
    #[error("Source file not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Failed to probe {path}: {reason}")]
    ProbeFailed { path: PathBuf, reason: String },

    #[error("No streams found in {0}")]
    NoStreams(PathBuf),

    // ---- Bitrate selection ----
    #[error("Missing stream metadata ({field}) in {path}")]
    MissingMetadata { path: PathBuf, field: &'static str },

    #[error("Invalid {field} value '{value}' in {path}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        value: String,
    },

    // ---- Stream layout ----
    #[error("Expected at least 2 streams for sequence {sequence}, found {found}")]
    InsufficientStreams { sequence: String, found: usize },

    #[error(
        "Expected bin_data stream at index 3 for sequence {sequence}, found codec '{codec}'"
    )]
    UnexpectedStreamLayout { sequence: String, codec: String },

    #[error("Unsupported stream layout for sequence {sequence}: {count} streams")]
    UnsupportedStreamLayout { sequence: String, count: usize },

    #[error("Sequence directory contains no clips: {0}")]
    EmptySequence(PathBuf),

    // ---- External commands ----
    #[error("Command failed while {purpose}: {reason}")]
    CommandFailed { purpose: String, reason: String },

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    // ---- Finalization ----
    #[error("Failed to finalize {partial} -> {destination}: {source}")]
    FinalizeFailed {
        partial: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    // ---- Configuration ----
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ---- Generic ----
    #[error("{0}")]
    OperationFailed(String),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for seqpress-core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a *command-failed* error for a process that exited unsuccessfully.
pub fn command_failed_error(
    purpose: impl Into<String>,
    status: ExitStatus,
    stderr: impl AsRef<str>,
) -> CoreError {
    let stderr = stderr.as_ref().trim();
    let reason = if stderr.is_empty() {
        format!("exited with {status}")
    } else {
        format!("exited with {status}: {stderr}")
    };
    CoreError::CommandFailed {
        purpose: purpose.into(),
        reason,
    }
}

/// Builds a *command-failed* error for a process that could not be launched.
pub fn command_start_error(purpose: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandFailed {
        purpose: purpose.into(),
        reason: format!("failed to start: {err}"),
    }
}

/// Builds a *command-failed* error for a process whose exit status could not be collected.
pub fn command_wait_error(purpose: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandFailed {
        purpose: purpose.into(),
        reason: format!("failed to wait for exit: {err}"),
    }
}
