// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};

/// Timestamp pattern used in every media file name (`yyyyMMdd_HHmmss`)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Media file naming
pub mod media {
    /// Still image file name prefix
    pub const IMAGE_PREFIX: &str = "image";
    /// Still image extension
    pub const IMAGE_EXTENSION: &str = "jpg";
    /// Video file name prefix
    pub const VIDEO_PREFIX: &str = "video";
    /// Video extension
    pub const VIDEO_EXTENSION: &str = "mp4";
    /// Application subdirectory under the XDG data/config directories
    pub const APP_DIR: &str = "viewfinder";
    /// Media subdirectory (the app-specific external files directory)
    pub const FILES_DIR: &str = "files";
}

/// Video encoder bitrate presets
///
/// These presets define the target bitrate for video encoding based on resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BitratePreset {
    /// Low bitrate - smaller files, reduced quality
    Low,
    /// Medium bitrate - balanced quality and file size (default)
    #[default]
    Medium,
    /// High bitrate - larger files, better quality
    High,
}

impl BitratePreset {
    /// All presets, lowest first
    pub const ALL: [BitratePreset; 3] = [
        BitratePreset::Low,
        BitratePreset::Medium,
        BitratePreset::High,
    ];

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            BitratePreset::Low => "Low",
            BitratePreset::Medium => "Medium",
            BitratePreset::High => "High",
        }
    }

    /// Get bitrate in kbps for a given frame width
    ///
    /// - SD (640x480): Low=1, Medium=2, High=4 Mbps
    /// - HD (1280x720): Low=2.5, Medium=5, High=10 Mbps
    /// - Full HD (1920x1080): Low=4, Medium=8, High=16 Mbps
    /// - 4K (3840x2160): Low=15, Medium=30, High=50 Mbps
    pub fn bitrate_kbps(&self, width: u32) -> u32 {
        match (ResolutionTier::from_width(width), self) {
            (ResolutionTier::SD, BitratePreset::Low) => 1_000,
            (ResolutionTier::SD, BitratePreset::Medium) => 2_000,
            (ResolutionTier::SD, BitratePreset::High) => 4_000,
            (ResolutionTier::HD, BitratePreset::Low) => 2_500,
            (ResolutionTier::HD, BitratePreset::Medium) => 5_000,
            (ResolutionTier::HD, BitratePreset::High) => 10_000,
            (ResolutionTier::FullHD, BitratePreset::Low) => 4_000,
            (ResolutionTier::FullHD, BitratePreset::Medium) => 8_000,
            (ResolutionTier::FullHD, BitratePreset::High) => 16_000,
            (ResolutionTier::FourK, BitratePreset::Low) => 15_000,
            (ResolutionTier::FourK, BitratePreset::Medium) => 30_000,
            (ResolutionTier::FourK, BitratePreset::High) => 50_000,
        }
    }
}

/// Resolution tiers for bitrate calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    /// 640x480 and below
    SD,
    /// 1280x720
    HD,
    /// 1920x1080
    FullHD,
    /// 3840x2160 and above
    FourK,
}

impl ResolutionTier {
    /// Classify a frame width
    pub fn from_width(width: u32) -> Self {
        match width {
            w if w >= 3840 => ResolutionTier::FourK,
            w if w >= 1920 => ResolutionTier::FullHD,
            w if w >= 1280 => ResolutionTier::HD,
            _ => ResolutionTier::SD,
        }
    }
}

/// GStreamer pipeline constants
pub mod pipeline {
    /// Maximum buffer queue size on the preview appsink (keep small for low latency)
    pub const MAX_BUFFERS: u32 = 2;

    /// Framerate advertised on the recording appsrc
    pub const RECORDING_FRAMERATE: i32 = 30;

    /// H.264 encoders in priority order (hardware first)
    pub const VIDEO_ENCODERS: [&str; 4] = ["vah264enc", "vaapih264enc", "x264enc", "openh264enc"];

    /// AAC encoders in priority order
    pub const AUDIO_ENCODERS: [&str; 3] = ["avenc_aac", "fdkaacenc", "voaacenc"];
}

/// Timing constants
pub mod timing {
    use std::time::Duration;

    /// How long a notice stays on screen (matches a "long" toast)
    pub const NOTICE_DURATION: Duration = Duration::from_millis(3500);

    /// Screen refresh interval of the event loop (~30fps)
    pub const PRESENT_INTERVAL: Duration = Duration::from_millis(33);

    /// Input polling interval of the terminal key reader
    pub const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

    /// Upper bound for a recording to reach end-of-stream after stop
    pub const RECORDING_FINALIZE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Settling time after the first frame before a headless capture
    pub const CAMERA_WARMUP: Duration = Duration::from_millis(500);

    /// How long headless commands wait for the camera to become ready
    pub const HEADLESS_READY_TIMEOUT: Duration = Duration::from_secs(15);
}
