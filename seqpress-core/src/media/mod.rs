//! Stream metadata for media files.
//!
//! [`StreamSet`] is the probed description of one clip. [`probe_streams`] is
//! the only place a `StreamSet` is obtained from a file: it checks the source
//! exists and that at least one stream came back.

pub mod probe;
pub mod streams;

pub use probe::probe_streams;
pub use streams::{StreamDescriptor, StreamSet, TELEMETRY_CODEC_NAME, TELEMETRY_STREAM_INDEX};
