// SPDX-License-Identifier: MPL-2.0

//! MP4 muxing and file output

use crate::errors::RecordingError;
use gstreamer as gst;
use gstreamer::prelude::*;
use std::path::Path;
use tracing::debug;

/// Muxer plus the sink writing its output
pub struct MuxerConfig {
    pub muxer: gst::Element,
    pub filesink: gst::Element,
}

/// Create an `mp4mux` writing to `output_path`
pub fn create_muxer(output_path: &Path) -> Result<MuxerConfig, RecordingError> {
    let muxer = gst::ElementFactory::make("mp4mux")
        .name("mux")
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to create mp4mux: {}", e)))?;

    let location = output_path.to_string_lossy().to_string();
    let filesink = gst::ElementFactory::make("filesink")
        .property("location", location.as_str())
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to create filesink: {}", e)))?;

    debug!(path = %output_path.display(), "Muxer and filesink created");
    Ok(MuxerConfig { muxer, filesink })
}

/// Link an encoded stream into the muxer (requests a new sink pad)
pub fn link_to_muxer(
    upstream: &gst::Element,
    muxer: &gst::Element,
    stream: &str,
) -> Result<(), RecordingError> {
    upstream.link(muxer).map_err(|_| {
        RecordingError::StartFailed(format!("Failed to link {} stream to muxer", stream))
    })?;
    debug!(stream, "Linked to muxer");
    Ok(())
}
