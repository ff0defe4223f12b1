//! Signal-aware shutdown.
//!
//! The controller owns a shared handle to the [`ArtifactTracker`]. A dedicated
//! listener thread waits for SIGINT/SIGTERM. On the first one it stops the
//! running external tool, cleans up every tracked artifact and terminates the
//! process with a signal-specific exit status. [`CleanupGuard`] covers the
//! normal-exit path.

use crate::artifacts::ArtifactTracker;
use crate::error::CoreResult;

use log::{debug, error, warn};
use std::fmt;
use std::sync::Arc;

/// Exit status used after an interrupt (SIGINT).
pub const EXIT_CODE_SIGINT: i32 = 130;

/// Exit status used after a terminate request (SIGTERM).
pub const EXIT_CODE_SIGTERM: i32 = 143;

/// The shutdown signals the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            ShutdownSignal::Interrupt => EXIT_CODE_SIGINT,
            ShutdownSignal::Terminate => EXIT_CODE_SIGTERM,
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => write!(f, "SIGINT"),
            ShutdownSignal::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Reacts to shutdown signals by cleaning up tracked artifacts.
#[derive(Debug, Clone)]
pub struct ShutdownController {
    tracker: Arc<ArtifactTracker>,
}

impl ShutdownController {
    pub fn new(tracker: Arc<ArtifactTracker>) -> Self {
        Self { tracker }
    }

    /// Handles one delivered signal.
    ///
    /// The first call stops tracked external processes, cleans up and returns
    /// the exit status the process should terminate with. Any later call, for either signal, returns `None`
    /// without doing anything.
    pub fn handle_signal(&self, signal: ShutdownSignal) -> Option<i32> {
        if !self.tracker.mark_signal_handled() {
            debug!("Ignoring {signal}: shutdown already in progress");
            return None;
        }

        warn!("Received {signal}, removing temporary files before exit");
        let stopped = self.tracker.terminate_processes();
        if stopped > 0 {
            debug!("Stopped {stopped} external process(es)");
        }
        self.tracker.cleanup_temporary_artifacts();
        Some(signal.exit_code())
    }

    /// Installs the signal listener and returns the guard for the normal-exit path.
    ///
    /// The listener runs on its own thread with a single-threaded tokio
    /// runtime. It only touches the tracker through its lock, then calls
    /// `std::process::exit`.
    pub fn install(self) -> CoreResult<CleanupGuard> {
        let guard = CleanupGuard::new(Arc::clone(&self.tracker));

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let listener = runtime.block_on(SignalListener::register())?;

        std::thread::Builder::new()
            .name("signal-listener".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut listener = listener;
                    while let Some(signal) = listener.next().await {
                        if let Some(code) = self.handle_signal(signal) {
                            std::process::exit(code);
                        }
                    }
                    error!("Signal listener stopped unexpectedly");
                });
            })?;

        debug!("Installed SIGINT/SIGTERM handlers");
        Ok(guard)
    }
}

#[cfg(unix)]
struct SignalListener {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalListener {
    async fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn next(&mut self) -> Option<ShutdownSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ShutdownSignal::Interrupt),
            Some(()) = self.terminate.recv() => Some(ShutdownSignal::Terminate),
            else => None,
        }
    }
}

#[cfg(not(unix))]
struct SignalListener;

#[cfg(not(unix))]
impl SignalListener {
    async fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn next(&mut self) -> Option<ShutdownSignal> {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(ShutdownSignal::Interrupt),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                None
            }
        }
    }
}

/// Runs the one-shot artifact cleanup when dropped.
///
/// Keep it alive for the whole run in `main`. `std::process::exit` skips
/// destructors, so drop it (or call [`CleanupGuard::cleanup`]) before exiting
/// with an error code.
#[derive(Debug)]
pub struct CleanupGuard {
    tracker: Arc<ArtifactTracker>,
}

impl CleanupGuard {
    pub fn new(tracker: Arc<ArtifactTracker>) -> Self {
        Self { tracker }
    }

    pub fn cleanup(&self) {
        self.tracker.cleanup_temporary_artifacts();
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_interrupt_cleans_up_and_returns_exit_code() {
        let dir = tempdir().unwrap();
        let partial = dir.path().join("GH010001.MP4.partial");
        std::fs::write(&partial, "partial").unwrap();

        let tracker = Arc::new(ArtifactTracker::new());
        tracker.register_partial_output(&partial);
        let controller = ShutdownController::new(Arc::clone(&tracker));

        assert_eq!(controller.handle_signal(ShutdownSignal::Interrupt), Some(EXIT_CODE_SIGINT));
        assert!(!partial.exists());
        assert!(tracker.is_signal_handled());
        assert!(tracker.is_cleanup_done());
    }

    #[test]
    fn test_terminate_returns_its_own_exit_code() {
        let tracker = Arc::new(ArtifactTracker::new());
        let controller = ShutdownController::new(Arc::clone(&tracker));

        assert_eq!(controller.handle_signal(ShutdownSignal::Terminate), Some(EXIT_CODE_SIGTERM));
        assert!(tracker.is_cleanup_done());
    }

    #[test]
    fn test_second_signal_is_ignored() {
        let dir = tempdir().unwrap();
        let tracker = Arc::new(ArtifactTracker::new());
        let controller = ShutdownController::new(Arc::clone(&tracker));

        assert!(controller.handle_signal(ShutdownSignal::Interrupt).is_some());

        let late = dir.path().join("late.txt");
        std::fs::write(&late, "late").unwrap();
        tracker.register_temp_file(&late);

        assert_eq!(controller.handle_signal(ShutdownSignal::Terminate), None);
        assert_eq!(controller.handle_signal(ShutdownSignal::Interrupt), None);
        assert!(late.exists());
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_ne!(
            ShutdownSignal::Interrupt.exit_code(),
            ShutdownSignal::Terminate.exit_code()
        );
        assert_eq!(ShutdownSignal::Interrupt.to_string(), "SIGINT");
    }

    #[test]
    fn test_cleanup_guard_runs_on_drop() {
        let dir = tempdir().unwrap();
        let temp = dir.path().join("concat.txt");
        std::fs::write(&temp, "file 'a'").unwrap();

        let tracker = Arc::new(ArtifactTracker::new());
        tracker.register_temp_file(&temp);
        {
            let _guard = CleanupGuard::new(Arc::clone(&tracker));
        }

        assert!(!temp.exists());
        assert!(tracker.is_cleanup_done());
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_stops_running_tool_before_cleanup() {
        use nix::errno::Errno;
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let dir = tempdir().unwrap();
        let partial = dir.path().join("GH010001.MP4.partial");
        std::fs::write(&partial, "partial").unwrap();

        let child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let pid = child.id();

        let tracker = Arc::new(ArtifactTracker::new());
        tracker.register_partial_output(&partial);
        let _running = tracker.track_process(pid);
        let controller = ShutdownController::new(Arc::clone(&tracker));

        assert_eq!(controller.handle_signal(ShutdownSignal::Terminate), Some(EXIT_CODE_SIGTERM));
        assert_eq!(kill(Pid::from_raw(pid as i32), None), Err(Errno::ESRCH));
        assert!(!partial.exists());
        assert!(tracker.tracked_processes().is_empty());
    }
}
