// seqpress-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---
//
// Scripted doubles for the four external collaborators. Each one records what
// it was asked to do so tests can assert on the exact calls the orchestrator
// made. They use `Rc<RefCell<..>>` because the orchestrator is single-threaded.
//
// This module is only compiled for unit tests or with the "test-mocks" feature.
#![cfg(any(test, feature = "test-mocks"))]

use super::*;
use crate::artifacts::ArtifactTracker;
use crate::error::{CoreError, CoreResult};
use crate::media::{StreamDescriptor, StreamSet};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::rc::Rc;

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    // Raw wait status: the exit code lives in the second byte.
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

// ============================================================================
// FFMPEG
// ============================================================================

/// Mock implementation of FfmpegProcess.
#[derive(Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each spawn consumes the first expectation whose pattern is contained in
/// one of the command's arguments. A spawn with no matching expectation
/// panics, so unexpected invocations fail the test.
#[derive(Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Rc<RefCell<Vec<MockFfmpegExpectation>>>,
    received_calls: Rc<RefCell<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        self.expectations.borrow_mut().push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    /// Expects a successful run; with `create_dummy_output` the last argument
    /// (the output path) is created with a few bytes of content.
    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    /// Expects a run that exits with `exit_code`. With `create_dummy_output`
    /// the output is written first, like an encode that dies half way.
    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(exit_code),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls.borrow().clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args: Vec<String> = cmd
            .get_args()
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        self.received_calls.borrow_mut().push(args.clone());

        let mut expectations = self.expectations.borrow_mut();
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
        };

        let expectation = expectations.remove(index);
        log::debug!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        let process = expectation.result?;
        if expectation.create_dummy_output {
            if let Some(output_path) = args.last() {
                if let Err(e) = std::fs::write(output_path, b"mock ffmpeg output") {
                    log::error!(
                        "MockFfmpegSpawner failed to create dummy output file {}: {}",
                        output_path,
                        e
                    );
                }
            }
        }
        Ok(process)
    }
}

// ============================================================================
// FFPROBE
// ============================================================================

/// Mock implementation of FfprobeExecutor.
///
/// Results are keyed by path. Errors are stored as messages and replayed as
/// `CoreError::ProbeFailed`.
#[derive(Clone, Default)]
pub struct MockFfprobeExecutor {
    results: Rc<RefCell<HashMap<PathBuf, Result<Vec<StreamDescriptor>, String>>>>,
    probed: Rc<RefCell<Vec<PathBuf>>>,
}

impl MockFfprobeExecutor {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the result returned when `input_path` is probed.
    pub fn expect_streams(&self, input_path: &Path, result: CoreResult<Vec<StreamDescriptor>>) {
        self.results
            .borrow_mut()
            .insert(input_path.to_path_buf(), result.map_err(|e| e.to_string()));
    }

    /// Makes probing `input_path` fail with `reason`.
    pub fn expect_failure(&self, input_path: &Path, reason: &str) {
        self.results
            .borrow_mut()
            .insert(input_path.to_path_buf(), Err(reason.to_string()));
    }

    /// Every path probed so far, in call order.
    pub fn probed_paths(&self) -> Vec<PathBuf> {
        self.probed.borrow().clone()
    }
}

impl FfprobeExecutor for MockFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<StreamSet> {
        self.probed.borrow_mut().push(input_path.to_path_buf());

        match self.results.borrow().get(input_path) {
            Some(Ok(streams)) => Ok(StreamSet::new(input_path, streams.clone())),
            Some(Err(reason)) => Err(CoreError::ProbeFailed {
                path: input_path.to_path_buf(),
                reason: reason.clone(),
            }),
            None => Err(CoreError::ProbeFailed {
                path: input_path.to_path_buf(),
                reason: "MockFfprobeExecutor: no expectation set".to_string(),
            }),
        }
    }
}

// ============================================================================
// METADATA COPIERS
// ============================================================================

/// Mock implementation of MetadataCopier recording `(source, destination)` pairs.
#[derive(Clone, Default)]
pub struct MockMetadataCopier {
    calls: Rc<RefCell<Vec<(PathBuf, PathBuf)>>>,
    failure: Option<String>,
}

impl MockMetadataCopier {
    pub fn new() -> Self {
        Default::default()
    }

    /// A copier whose every call fails with `CoreError::CommandFailed`.
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl MetadataCopier for MockMetadataCopier {
    fn copy_metadata(&self, _tracker: &ArtifactTracker, source: &Path, destination: &Path) -> CoreResult<()> {
        self.calls
            .borrow_mut()
            .push((source.to_path_buf(), destination.to_path_buf()));

        match &self.failure {
            Some(reason) => Err(CoreError::CommandFailed {
                purpose: format!("copying metadata from {}", source.display()),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// A toolchain made entirely of mocks.
pub type MockToolchain =
    Toolchain<MockFfprobeExecutor, MockFfmpegSpawner, MockMetadataCopier, MockMetadataCopier>;

impl MockToolchain {
    pub fn mock() -> Self {
        Toolchain {
            prober: MockFfprobeExecutor::new(),
            spawner: MockFfmpegSpawner::new(),
            telemetry: MockMetadataCopier::new(),
            tags: MockMetadataCopier::new(),
        }
    }
}
