// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera providers

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Which way a camera sensor faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LensFacing {
    /// Rear-facing sensor (world camera)
    #[default]
    Back,
    /// Front-facing sensor (selfie camera)
    Front,
    /// External camera (USB webcam, capture card)
    External,
}

impl LensFacing {
    /// Parse a libcamera location property (`"back"`, `"front"`, `"external"`)
    ///
    /// Anything unrecognised is treated as external, which is what plain V4L2
    /// webcams report.
    pub fn from_location(location: &str) -> Self {
        match location.trim().to_ascii_lowercase().as_str() {
            "back" | "rear" => LensFacing::Back,
            "front" => LensFacing::Front,
            _ => LensFacing::External,
        }
    }
}

impl std::fmt::Display for LensFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LensFacing::Back => write!(f, "back"),
            LensFacing::Front => write!(f, "front"),
            LensFacing::External => write!(f, "external"),
        }
    }
}

/// Rotation in 90° steps (clockwise)
///
/// Used both for the sensor's mounting rotation and for the target rotation
/// of capture/record use-cases (the display's current rotation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Create rotation from an integer degree value (normalised to 0-360, snapped down to 90° steps)
    pub fn from_degrees(degrees: i32) -> Self {
        match degrees.rem_euclid(360) / 90 {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::Deg0,
        }
    }

    /// Parse rotation from a string value (degrees)
    pub fn parse(degrees: &str) -> Self {
        degrees
            .trim()
            .parse::<i32>()
            .map(Self::from_degrees)
            .unwrap_or_default()
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Apply `other` after `self`
    pub fn compose(self, other: Rotation) -> Rotation {
        Self::from_degrees((self.degrees() + other.degrees()) as i32)
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// GStreamer `videoflip` method name for this rotation
    pub fn videoflip_method(&self) -> &'static str {
        match self {
            Rotation::Deg0 => "none",
            Rotation::Deg90 => "clockwise",
            Rotation::Deg180 => "rotate-180",
            Rotation::Deg270 => "counterclockwise",
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Stable identifier within one provider instance
    pub id: String,
    /// Human readable name
    pub name: String,
    /// Sensor facing
    pub lens_facing: LensFacing,
    /// Sensor mounting rotation
    pub sensor_rotation: Rotation,
}

/// Chooses which camera a session binds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraSelector {
    lens_facing: LensFacing,
    allow_external_fallback: bool,
}

impl CameraSelector {
    /// Rear-facing selector
    pub const BACK: CameraSelector = CameraSelector {
        lens_facing: LensFacing::Back,
        allow_external_fallback: false,
    };

    /// Select only cameras with the given facing
    pub fn require_lens_facing(lens_facing: LensFacing) -> Self {
        Self {
            lens_facing,
            allow_external_fallback: false,
        }
    }

    /// Also accept external cameras when nothing has the requested facing
    pub fn with_external_fallback(mut self, allow: bool) -> Self {
        self.allow_external_fallback = allow;
        self
    }

    /// Requested facing
    pub fn lens_facing(&self) -> LensFacing {
        self.lens_facing
    }

    /// Pick the first matching camera
    pub fn select<'a>(&self, cameras: &'a [CameraDevice]) -> Option<&'a CameraDevice> {
        cameras
            .iter()
            .find(|c| c.lens_facing == self.lens_facing)
            .or_else(|| {
                if self.allow_external_fallback {
                    cameras
                        .iter()
                        .find(|c| c.lens_facing == LensFacing::External)
                } else {
                    None
                }
            })
    }
}

/// A single RGBA camera frame
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Bytes per row (may include padding)
    pub stride: u32,
    /// RGBA pixel data
    pub data: Arc<[u8]>,
    /// Frame capture timestamp (for latency diagnostics)
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Sample one pixel as RGB, clamping coordinates into the frame
    pub fn rgb_at(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = (y * self.stride + x * 4) as usize;
        if idx + 2 < self.data.len() {
            (self.data[idx], self.data[idx + 1], self.data[idx + 2])
        } else {
            (0, 0, 0)
        }
    }

    /// Copy the pixels into a tightly packed RGBA buffer (stride = width * 4)
    pub fn packed_rgba(&self) -> Vec<u8> {
        let row_bytes = (self.width * 4) as usize;
        let stride = self.stride as usize;
        if stride == row_bytes {
            return self.data[..row_bytes * self.height as usize].to_vec();
        }
        let mut packed = Vec::with_capacity(row_bytes * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * stride;
            packed.extend_from_slice(&self.data[start..start + row_bytes]);
        }
        packed
    }
}
