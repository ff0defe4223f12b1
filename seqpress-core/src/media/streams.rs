// ============================================================================
// seqpress-core/src/media/streams.rs
// ============================================================================
//
// STREAM METADATA: Probed Stream Descriptors
//
// Values are kept exactly as ffprobe reported them (strings, possibly absent)
// so that the consumers decide what "missing" and "unparseable" mean and can
// name the offending field in their errors.
//
// AI-ASSISTANT-INFO: StreamSet / StreamDescriptor data model

use std::path::{Path, PathBuf};

/// Codec name ffprobe reports for GoPro's GPMF telemetry track.
pub const TELEMETRY_CODEC_NAME: &str = "bin_data";

/// Stream index at which the telemetry track sits in camera files.
pub const TELEMETRY_STREAM_INDEX: usize = 3;

/// One stream of a media file as reported by the prober.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub codec_name: Option<String>,
    pub coded_height: Option<String>,
    pub coded_width: Option<String>,
    /// Frame rate, either decimal ("29.97") or rational ("30000/1001")
    pub framerate: Option<String>,
    /// Stream bit rate in bits per second
    pub bit_rate: Option<String>,
}

impl StreamDescriptor {
    /// A descriptor with only the codec name set.
    pub fn with_codec(codec_name: &str) -> Self {
        Self {
            codec_name: Some(codec_name.to_string()),
            ..Self::default()
        }
    }

    /// A video descriptor with every numeric field set.
    pub fn video(codec_name: &str, width: u32, height: u32, framerate: &str, bit_rate: u64) -> Self {
        Self {
            codec_name: Some(codec_name.to_string()),
            coded_height: Some(height.to_string()),
            coded_width: Some(width.to_string()),
            framerate: Some(framerate.to_string()),
            bit_rate: Some(bit_rate.to_string()),
        }
    }

    pub fn is_telemetry(&self) -> bool {
        self.codec_name.as_deref() == Some(TELEMETRY_CODEC_NAME)
    }
}

/// The ordered streams of one media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSet {
    source: PathBuf,
    streams: Vec<StreamDescriptor>,
}

impl StreamSet {
    pub fn new(source: impl Into<PathBuf>, streams: Vec<StreamDescriptor>) -> Self {
        Self {
            source: source.into(),
            streams,
        }
    }

    /// The file these streams were probed from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StreamDescriptor> {
        self.streams.get(index)
    }
}
