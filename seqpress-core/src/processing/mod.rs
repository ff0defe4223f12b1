//! Sequence conversion logic and orchestration.
//!
//! The bitrate selector and layout check decide how a sequence is encoded,
//! the concat module writes the clip list ffmpeg reads, and the sequence
//! module drives the whole per-sequence pipeline.

/// Target bitrate selection from stream metadata
pub mod bitrate;

/// ffmpeg concat list files
pub mod concat;

/// Stream layout validation
pub mod layout;

/// Per-sequence orchestration
pub mod sequence;

pub use bitrate::select_bitrate;
pub use layout::StreamLayout;
pub use sequence::{convert_sequence, convert_sequences};
