// SPDX-License-Identifier: MPL-2.0

//! Orientation and color conversion for captured frames
//!
//! Frames arrive in sensor orientation as RGBA. Before encoding they are
//! rotated upright for the requested target rotation and the alpha channel
//! is dropped.

use crate::backends::camera::types::{CameraFrame, Rotation};
use crate::errors::PhotoError;
use image::{DynamicImage, RgbImage, RgbaImage, imageops};
use std::sync::Arc;
use tracing::debug;

/// Processed image data
pub struct ProcessedImage {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
}

/// Rotates and converts captured frames
#[derive(Debug, Clone, Copy)]
pub struct PostProcessor {
    rotation: Rotation,
}

impl PostProcessor {
    pub fn new(rotation: Rotation) -> Self {
        Self { rotation }
    }

    /// Process a captured frame on the blocking pool
    pub async fn process(&self, frame: Arc<CameraFrame>) -> Result<ProcessedImage, PhotoError> {
        let rotation = self.rotation;
        tokio::task::spawn_blocking(move || process_frame(&frame, rotation))
            .await
            .map_err(|e| PhotoError::EncodingFailed(format!("Processing task error: {}", e)))?
    }
}

/// Rotate `frame` by `rotation` and drop alpha
pub fn process_frame(frame: &CameraFrame, rotation: Rotation) -> Result<ProcessedImage, PhotoError> {
    let too_small = || {
        PhotoError::EncodingFailed(format!(
            "Frame buffer too small for {}x{}",
            frame.width, frame.height
        ))
    };
    let needed = (frame.stride as usize * frame.height.saturating_sub(1) as usize)
        + frame.width as usize * 4;
    if frame.width == 0 || frame.height == 0 || frame.data.len() < needed {
        return Err(too_small());
    }
    let rgba = RgbaImage::from_raw(frame.width, frame.height, frame.packed_rgba())
        .ok_or_else(too_small)?;

    let rotated = match rotation {
        Rotation::Deg0 => rgba,
        Rotation::Deg90 => imageops::rotate90(&rgba),
        Rotation::Deg180 => imageops::rotate180(&rgba),
        Rotation::Deg270 => imageops::rotate270(&rgba),
    };

    let image = DynamicImage::ImageRgba8(rotated).into_rgb8();
    let (width, height) = image.dimensions();
    debug!(width, height, %rotation, "Processed frame");

    Ok(ProcessedImage {
        image,
        width,
        height,
    })
}
