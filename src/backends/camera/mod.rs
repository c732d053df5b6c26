// SPDX-License-Identifier: MPL-2.0

//! Camera provider abstraction
//!
//! The session controller never touches hardware. It resolves a provider
//! asynchronously, hands it a set of use-cases plus a lifecycle observer, and
//! from then on only submits capture/record requests.
//!
//! ```text
//! ┌──────────────────────┐
//! │  SessionController   │
//! └──────────┬───────────┘
//!            │ get_instance() (async)
//!            ▼
//! ┌──────────────────────┐
//! │ CameraProviderSource │
//! └──────────┬───────────┘
//!            │
//!            ▼
//! ┌──────────────────────┐
//! │ CameraProvider trait │  ← bind / unbind / capture / record
//! └──────────┬───────────┘
//!            ▼
//!       ┌─────────┐
//!       │GStreamer│  ← Concrete implementation
//!       └─────────┘
//! ```

pub mod gst_backend;
pub mod lifecycle;
pub mod types;
pub mod use_cases;

pub use lifecycle::{Lifecycle, LifecycleObserver, LifecycleOwner};
pub use types::*;
pub use use_cases::{
    ImageCapture, Preview, UseCaseGroup, VideoCapture, ViewfinderReceiver, ViewfinderSurface,
};

use crate::errors::{CameraError, PhotoError, RecordingError};
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::Arc;

/// Capability object granting access to camera use-case binding
pub trait CameraProvider: Send + Sync {
    /// Cameras known to this provider
    fn available_cameras(&self) -> Vec<CameraDevice>;

    /// Bind preview, still capture and recording to a lifecycle in one call
    ///
    /// The provider starts streaming while the lifecycle is `Started`, releases
    /// the hardware when it is `Stopped`, and drops the binding on `Destroyed`.
    ///
    /// # Returns
    /// * `Ok(CameraDevice)` - The camera the selector picked
    /// * `Err(CameraError)` - No matching camera, or the pipeline failed to build
    fn bind_to_lifecycle(
        &self,
        lifecycle: LifecycleObserver,
        selector: &CameraSelector,
        use_cases: UseCaseGroup,
    ) -> Result<CameraDevice, CameraError>;

    /// Release every bound use-case (finalizing any active recording)
    fn unbind_all(&self);

    /// Whether use-cases are currently bound
    fn is_bound(&self) -> bool;

    /// Write one still image to `output`
    fn take_picture(
        &self,
        use_case: &ImageCapture,
        output: PathBuf,
    ) -> BoxFuture<'static, Result<PathBuf, PhotoError>>;

    /// Start recording to `output`
    ///
    /// The returned future resolves once the recording has ended (after
    /// [`CameraProvider::stop_recording`] or a pipeline failure) and the file
    /// has been finalized. Only one recording can be active at a time.
    fn start_recording(
        &self,
        use_case: &VideoCapture,
        output: PathBuf,
    ) -> BoxFuture<'static, Result<PathBuf, RecordingError>>;

    /// Ask the active recording to stop
    ///
    /// Returns immediately; completion is reported by the future returned from
    /// `start_recording`.
    fn stop_recording(&self) -> Result<(), RecordingError>;
}

/// Asynchronous access to the process-wide camera provider
pub trait CameraProviderSource: Send + Sync {
    fn get_instance(&self) -> BoxFuture<'static, Result<Arc<dyn CameraProvider>, CameraError>>;
}
