// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding and file output
//!
//! Encoding runs on the blocking pool; the write goes through `tokio::fs` so
//! the event loop never waits on disk.

use super::processing::ProcessedImage;
use crate::errors::PhotoError;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Encoded image data ready for saving
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// JPEG encoder with a fixed quality
#[derive(Debug, Clone, Copy)]
pub struct PhotoEncoder {
    quality: u8,
}

impl PhotoEncoder {
    /// Create an encoder (quality clamped to 1-100)
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode a processed image asynchronously
    pub async fn encode(&self, processed: ProcessedImage) -> Result<EncodedImage, PhotoError> {
        debug!(
            width = processed.width,
            height = processed.height,
            quality = self.quality,
            "Starting encoding"
        );

        let quality = self.quality;
        tokio::task::spawn_blocking(move || {
            let data = encode_jpeg(&processed.image, quality)?;
            debug!(size = data.len(), "Encoding complete");
            Ok(EncodedImage {
                data,
                width: processed.width,
                height: processed.height,
            })
        })
        .await
        .map_err(|e| PhotoError::EncodingFailed(format!("Encoding task error: {}", e)))?
    }

    /// Write encoded data to `output_path`, creating its directory if needed
    pub async fn save(&self, encoded: EncodedImage, output_path: &Path) -> Result<PathBuf, PhotoError> {
        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, &encoded.data).await?;

        info!(
            path = %output_path.display(),
            width = encoded.width,
            height = encoded.height,
            bytes = encoded.data.len(),
            "Photo written"
        );
        Ok(output_path.to_path_buf())
    }
}

/// Encode an RGB image as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}
