//! Core library for batch conversion of multi-clip camera recordings.
//!
//! Clips are grouped into sequences, each sequence is concatenated and
//! re-encoded (or stream-copied) by ffmpeg into one output file, and the
//! source's telemetry and tags are carried over. Every run is crash-safe:
//! outputs only appear through an atomic rename, and temporary artifacts are
//! tracked so that a failure or a shutdown signal never leaves them behind.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use seqpress_core::{
//!     ArtifactTracker, CoreConfig, Toolchain, convert_sequences, list_directory_entries,
//!     organize_into_sequences,
//! };
//! use std::path::PathBuf;
//!
//! let mut config = CoreConfig::new(PathBuf::from("/path/to/videos"));
//! config.resume = true;
//!
//! let entries = list_directory_entries(&config.videos_dir).unwrap();
//! let sequences = organize_into_sequences(&entries, &config.videos_dir).unwrap();
//!
//! let tracker = ArtifactTracker::new();
//! let outcomes = convert_sequences(&Toolchain::system(), &tracker, &config, &sequences).unwrap();
//! println!("{} sequence(s) handled", outcomes.len());
//! ```

pub mod artifacts;
pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod media;
pub mod organize;
pub mod processing;
pub mod shutdown;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use artifacts::ArtifactTracker;
pub use config::{CoreConfig, CoreConfigBuilder, EncoderProfile};
pub use discovery::{list_directory_entries, list_sequence_clips, list_sequence_dirs};
pub use error::{CoreError, CoreResult};
pub use external::{Toolchain, check_dependency};
pub use organize::{organize_into_sequences, sequence_key};
pub use processing::{convert_sequence, convert_sequences, select_bitrate};
pub use shutdown::{CleanupGuard, EXIT_CODE_SIGINT, EXIT_CODE_SIGTERM, ShutdownController};
pub use utils::{calculate_size_reduction, format_bytes, format_duration, format_elapsed};

use std::path::PathBuf;
use std::time::Duration;

/// Result of processing one sequence.
///
/// Returned by [`convert_sequences`] for every sequence, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceOutcome {
    /// The sequence was converted and its output finalized.
    Converted {
        sequence: String,
        destination: PathBuf,
        /// Target bitrate, `None` in stream-copy mode
        bitrate: Option<u64>,
        elapsed: Duration,
        /// Total size of the sequence's clips
        input_size: u64,
        output_size: u64,
    },
    /// Resume mode found the output already present.
    Skipped {
        sequence: String,
        destination: PathBuf,
    },
}

impl SequenceOutcome {
    pub fn sequence(&self) -> &str {
        match self {
            SequenceOutcome::Converted { sequence, .. } | SequenceOutcome::Skipped { sequence, .. } => {
                sequence
            }
        }
    }

    pub fn destination(&self) -> &PathBuf {
        match self {
            SequenceOutcome::Converted { destination, .. }
            | SequenceOutcome::Skipped { destination, .. } => destination,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, SequenceOutcome::Skipped { .. })
    }
}
