// SPDX-License-Identifier: MPL-2.0

//! Encoder selection for the recording pipeline
//!
//! H.264 encoders are probed in priority order (VA-API first, then software).
//! Each encoder family takes its bitrate in a different unit, so the element
//! is configured here rather than by the caller.

use crate::constants::pipeline::{AUDIO_ENCODERS, VIDEO_ENCODERS};
use crate::errors::RecordingError;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

/// Unit an encoder's `bitrate` property is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitrateUnit {
    Kbps,
    Bps,
}

/// Unit of the `bitrate` property for a known H.264 encoder factory
pub fn bitrate_unit(factory: &str) -> BitrateUnit {
    match factory {
        "openh264enc" => BitrateUnit::Bps,
        _ => BitrateUnit::Kbps,
    }
}

/// Value to write into the `bitrate` property for a target in kbps
pub fn bitrate_property_value(factory: &str, kbps: u32) -> u32 {
    match bitrate_unit(factory) {
        BitrateUnit::Kbps => kbps,
        BitrateUnit::Bps => kbps.saturating_mul(1000),
    }
}

/// First factory from `candidates` that is installed
fn first_available(candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .copied()
        .find(|name| gst::ElementFactory::find(name).is_some())
}

/// Video and audio encoders picked for one recording
pub struct SelectedEncoders {
    pub video: gst::Element,
    pub video_factory: &'static str,
    pub audio: Option<gst::Element>,
}

/// Build the encoders for a recording at `bitrate_kbps`
///
/// A missing AAC encoder downgrades to a silent recording; a missing H.264
/// encoder is an error.
pub fn select_encoders(
    bitrate_kbps: u32,
    enable_audio: bool,
) -> Result<SelectedEncoders, RecordingError> {
    let video_factory = first_available(&VIDEO_ENCODERS).ok_or_else(|| {
        RecordingError::EncoderNotAvailable(format!("none of {:?} installed", VIDEO_ENCODERS))
    })?;

    let mut builder = gst::ElementFactory::make(video_factory).property(
        "bitrate",
        bitrate_property_value(video_factory, bitrate_kbps),
    );
    if video_factory == "x264enc" {
        builder = builder
            .property_from_str("tune", "zerolatency")
            .property_from_str("speed-preset", "veryfast");
    }
    let video = builder
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to create {}: {}", video_factory, e)))?;

    info!(encoder = video_factory, bitrate_kbps, "Selected video encoder");

    let audio = if enable_audio {
        match first_available(&AUDIO_ENCODERS) {
            Some(factory) => match gst::ElementFactory::make(factory).build() {
                Ok(element) => {
                    debug!(encoder = factory, "Selected audio encoder");
                    Some(element)
                }
                Err(e) => {
                    warn!(encoder = factory, error = %e, "Failed to create audio encoder. Recording without audio.");
                    None
                }
            },
            None => {
                warn!("No AAC encoder installed. Recording without audio.");
                None
            }
        }
    } else {
        None
    };

    Ok(SelectedEncoders {
        video,
        video_factory,
        audio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitrate_units() {
        assert_eq!(bitrate_property_value("x264enc", 8000), 8000);
        assert_eq!(bitrate_property_value("vah264enc", 5000), 5000);
        assert_eq!(bitrate_property_value("openh264enc", 8000), 8_000_000);
    }
}
