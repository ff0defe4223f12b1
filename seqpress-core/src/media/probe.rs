//! Validated stream probing.

use crate::error::{CoreError, CoreResult};
use crate::external::FfprobeExecutor;
use crate::media::StreamSet;

use log::debug;
use std::path::Path;

/// Probes `path` and returns its streams.
///
/// # Errors
///
/// * `CoreError::SourceNotFound` - If `path` does not exist
/// * `CoreError::ProbeFailed` - If the prober could not run or its output was unusable
/// * `CoreError::NoStreams` - If probing succeeded but reported zero streams
pub fn probe_streams<P: FfprobeExecutor>(executor: &P, path: &Path) -> CoreResult<StreamSet> {
    if !path.exists() {
        return Err(CoreError::SourceNotFound(path.to_path_buf()));
    }

    let streams = executor.probe(path)?;
    if streams.is_empty() {
        return Err(CoreError::NoStreams(path.to_path_buf()));
    }

    debug!("Probed {} stream(s) in {}", streams.len(), path.display());
    Ok(streams)
}
