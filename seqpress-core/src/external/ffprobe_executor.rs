//! FFprobe integration for stream metadata extraction.
//!
//! The [`FfprobeExecutor`] trait returns the raw streams of a file; callers go
//! through [`crate::media::probe_streams`], which adds the existence and
//! non-empty checks.

use crate::error::{CoreError, CoreResult};
use crate::media::{StreamDescriptor, StreamSet};
use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Trait for probing media files for their streams.
pub trait FfprobeExecutor {
    /// Runs the prober on `input_path`. An empty set is a valid result here.
    fn probe(&self, input_path: &Path) -> CoreResult<StreamSet>;
}

/// Concrete implementation of [`FfprobeExecutor`] using the `ffprobe` crate.
#[derive(Debug, Clone, Default)]
pub struct CrateFfprobeExecutor;

impl CrateFfprobeExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl FfprobeExecutor for CrateFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<StreamSet> {
        log::debug!(
            "Running ffprobe (via crate) for streams on: {}",
            input_path.display()
        );
        match ffprobe(input_path) {
            Ok(metadata) => {
                let streams = metadata
                    .streams
                    .iter()
                    .map(|stream| StreamDescriptor {
                        codec_name: stream.codec_name.clone(),
                        coded_height: stream.coded_height.map(|h| h.to_string()),
                        coded_width: stream.coded_width.map(|w| w.to_string()),
                        framerate: Some(stream.r_frame_rate.clone())
                            .filter(|rate| !rate.is_empty()),
                        bit_rate: stream.bit_rate.clone(),
                    })
                    .collect();
                Ok(StreamSet::new(input_path, streams))
            }
            Err(err) => {
                log::error!("ffprobe failed on {}: {:?}", input_path.display(), err);
                Err(map_ffprobe_error(err, input_path))
            }
        }
    }
}

fn map_ffprobe_error(err: FfProbeError, input_path: &Path) -> CoreError {
    let reason = match err {
        FfProbeError::Io(io_err) => format!("could not run ffprobe: {io_err}"),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            format!("ffprobe exited with {}: {}", output.status, stderr.trim())
        }
        FfProbeError::Deserialize(err) => format!("unreadable ffprobe output: {err}"),
        _ => format!("unknown ffprobe error: {err:?}"),
    };
    CoreError::ProbeFailed {
        path: input_path.to_path_buf(),
        reason,
    }
}
