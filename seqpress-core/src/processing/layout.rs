//! Stream layout validation.
//!
//! Camera files come in two accepted shapes: video + audio, or video + audio
//! + timecode + telemetry with the telemetry track at index 3. Everything else
//! is rejected before ffmpeg runs.

use crate::error::{CoreError, CoreResult};
use crate::media::{StreamSet, TELEMETRY_STREAM_INDEX};

/// Accepted stream layouts of a sequence's first clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamLayout {
    /// Exactly two streams.
    AudioVideo,
    /// Four or more streams with the telemetry track at index 3.
    WithTelemetry,
}

impl StreamLayout {
    /// Classifies `streams`, failing for any layout that is not accepted.
    ///
    /// # Errors
    ///
    /// * `CoreError::InsufficientStreams` - Fewer than 2 streams
    /// * `CoreError::UnsupportedStreamLayout` - Exactly 3 streams
    /// * `CoreError::UnexpectedStreamLayout` - 4 or more streams without
    ///   telemetry at index 3
    pub fn detect(sequence: &str, streams: &StreamSet) -> CoreResult<Self> {
        match streams.len() {
            found @ (0 | 1) => Err(CoreError::InsufficientStreams {
                sequence: sequence.to_string(),
                found,
            }),
            2 => Ok(StreamLayout::AudioVideo),
            count if count <= TELEMETRY_STREAM_INDEX => Err(CoreError::UnsupportedStreamLayout {
                sequence: sequence.to_string(),
                count,
            }),
            _ => match streams.get(TELEMETRY_STREAM_INDEX) {
                Some(stream) if stream.is_telemetry() => Ok(StreamLayout::WithTelemetry),
                other => Err(CoreError::UnexpectedStreamLayout {
                    sequence: sequence.to_string(),
                    codec: other
                        .and_then(|stream| stream.codec_name.clone())
                        .unwrap_or_else(|| "unknown".to_string()),
                }),
            },
        }
    }

    /// Input stream indices mapped into the output.
    pub fn stream_maps(self) -> Vec<usize> {
        match self {
            StreamLayout::AudioVideo => vec![0, 1],
            StreamLayout::WithTelemetry => vec![0, 1, TELEMETRY_STREAM_INDEX],
        }
    }

    pub fn has_telemetry(self) -> bool {
        self == StreamLayout::WithTelemetry
    }
}
