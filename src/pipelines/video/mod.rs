// SPDX-License-Identifier: MPL-2.0

//! Video recording pipeline
//!
//! Preview frames are pushed into an `appsrc`, rotated, H.264 encoded and
//! muxed into MP4, optionally together with AAC audio from the default
//! microphone. Finalization is driven by end-of-stream on the bus.

pub mod encoder_selection;
pub mod muxer;
pub mod recorder;

pub use recorder::{RecorderSettings, SharedRecorder, VideoRecorder};
