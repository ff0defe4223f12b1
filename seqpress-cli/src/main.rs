// seqpress-cli/src/main.rs
//
// Entry point for the seqpress command-line tool.
//
// Responsibilities:
// - Parsing arguments with clap.
// - Creating the log directory and installing logging.
// - Installing the SIGINT/SIGTERM cleanup handler.
// - Running the conversion and mapping the result to an exit code.

use clap::Parser;
use seqpress_cli::commands::convert::resolve_videos_dir;
use seqpress_cli::error::{CliErrorContext, CliResult, EXIT_CODE_FAILURE, exit_code_for};
use seqpress_cli::logging::setup_logging;
use seqpress_cli::{Cli, Commands, ConvertArgs, run_convert};
use seqpress_core::{ArtifactTracker, ShutdownController};

use log::{error, info};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Convert(args) => convert(args, cli.verbose),
    };

    process::exit(exit_code);
}

/// Sets up the run environment and converts. Every guard is dropped before
/// the exit code is returned, since `process::exit` skips destructors.
fn convert(args: ConvertArgs, verbose: bool) -> i32 {
    let (videos_dir, log_dir) = match prepare_directories(&args) {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_CODE_FAILURE;
        }
    };

    match setup_logging(&log_dir, verbose) {
        Ok(log_path) => info!("Run log file: {}", log_path.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            return EXIT_CODE_FAILURE;
        }
    }

    let tracker = Arc::new(ArtifactTracker::new());
    let guard = match ShutdownController::new(Arc::clone(&tracker)).install() {
        Ok(guard) => guard,
        Err(e) => {
            error!("Failed to install signal handlers: {e}");
            return EXIT_CODE_FAILURE;
        }
    };

    let result = run_convert(&args, videos_dir, &log_dir, &tracker);
    if tracker.is_signal_handled() {
        // The signal listener owns the exit status from here on.
        loop {
            std::thread::park();
        }
    }
    if let Err(e) = &result {
        error!("{e}");
    }

    drop(guard);
    exit_code_for(&result)
}

/// Resolves the videos directory and creates the log directory.
fn prepare_directories(args: &ConvertArgs) -> CliResult<(PathBuf, PathBuf)> {
    let videos_dir = resolve_videos_dir(&args.videos_dir)?;
    let log_dir = args.log_dir.clone().unwrap_or_else(|| videos_dir.join("logs"));

    std::fs::create_dir_all(&log_dir)
        .cli_with_context(|| format!("Failed to create log directory '{}'", log_dir.display()))?;
    let log_dir = log_dir
        .canonicalize()
        .cli_with_context(|| format!("Invalid log directory '{}'", log_dir.display()))?;

    Ok((videos_dir, log_dir))
}
