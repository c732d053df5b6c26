// SPDX-License-Identifier: MPL-2.0

//! Use-case configuration objects bound to a camera
//!
//! A use-case describes what the session wants from the camera (a live
//! viewfinder, still capture, video recording); the provider decides how to
//! deliver it. All three are constructed once per camera start and bound in
//! a single call.

use super::types::{CameraFrame, Rotation};
use crate::constants::BitratePreset;
use std::sync::Arc;
use tokio::sync::watch;

/// Receiving end of a viewfinder surface, owned by the screen
pub type ViewfinderReceiver = watch::Receiver<Option<Arc<CameraFrame>>>;

/// On-screen region preview frames are rendered into
#[derive(Debug, Clone)]
pub struct ViewfinderSurface {
    sender: Arc<watch::Sender<Option<Arc<CameraFrame>>>>,
    display_rotation: Rotation,
}

impl ViewfinderSurface {
    /// Create a surface for a display with the given rotation
    pub fn new(display_rotation: Rotation) -> (Self, ViewfinderReceiver) {
        let (sender, receiver) = watch::channel(None);
        (
            Self {
                sender: Arc::new(sender),
                display_rotation,
            },
            receiver,
        )
    }

    /// Current rotation of the display showing this surface
    pub fn display_rotation(&self) -> Rotation {
        self.display_rotation
    }

    /// Show a new frame
    pub fn present(&self, frame: Arc<CameraFrame>) {
        self.sender.send_replace(Some(frame));
    }

    /// Blank the surface (camera released)
    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    /// Most recent frame shown
    pub fn latest(&self) -> Option<Arc<CameraFrame>> {
        self.sender.borrow().clone()
    }
}

/// Live viewfinder feed
#[derive(Debug, Clone)]
pub struct Preview {
    surface: ViewfinderSurface,
}

impl Preview {
    pub fn new(surface: ViewfinderSurface) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &ViewfinderSurface {
        &self.surface
    }
}

/// Still-image pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCapture {
    pub target_rotation: Rotation,
    pub jpeg_quality: u8,
}

impl ImageCapture {
    pub fn new(target_rotation: Rotation) -> Self {
        Self {
            target_rotation,
            jpeg_quality: 92,
        }
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

/// Video pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoCapture {
    pub target_rotation: Rotation,
    pub audio_enabled: bool,
    pub bitrate_preset: BitratePreset,
}

impl VideoCapture {
    pub fn new(target_rotation: Rotation) -> Self {
        Self {
            target_rotation,
            audio_enabled: false,
            bitrate_preset: BitratePreset::default(),
        }
    }

    pub fn with_audio(mut self, enabled: bool) -> Self {
        self.audio_enabled = enabled;
        self
    }

    pub fn with_bitrate_preset(mut self, preset: BitratePreset) -> Self {
        self.bitrate_preset = preset;
        self
    }
}

/// Everything bound in one `bind_to_lifecycle` call
#[derive(Debug, Clone)]
pub struct UseCaseGroup {
    pub preview: Preview,
    pub image_capture: ImageCapture,
    pub video_capture: VideoCapture,
}
