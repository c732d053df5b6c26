// SPDX-License-Identifier: MPL-2.0

//! Async photo capture pipeline
//!
//! ```text
//! Latest preview frame → Rotate/RGB → JPEG → Disk I/O
//!       ↓
//! Preview continues uninterrupted
//! ```

pub mod encoding;
pub mod processing;

pub use encoding::{EncodedImage, PhotoEncoder};
pub use processing::{PostProcessor, ProcessedImage};

use crate::backends::camera::types::{CameraFrame, Rotation};
use crate::errors::PhotoError;
use std::path::PathBuf;
use std::sync::Arc;

/// Process → encode → save for one still image
#[derive(Debug, Clone, Copy)]
pub struct PhotoPipeline {
    post_processor: PostProcessor,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    pub fn new(rotation: Rotation, jpeg_quality: u8) -> Self {
        Self {
            post_processor: PostProcessor::new(rotation),
            encoder: PhotoEncoder::new(jpeg_quality),
        }
    }

    /// Save `frame` as a JPEG at exactly `output_path`
    pub async fn capture_and_save(
        &self,
        frame: Arc<CameraFrame>,
        output_path: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let processed = self.post_processor.process(frame).await?;
        let encoded = self.encoder.encode(processed).await?;
        self.encoder.save(encoded, &output_path).await
    }
}
