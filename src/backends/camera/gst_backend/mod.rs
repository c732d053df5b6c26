// SPDX-License-Identifier: GPL-3.0-only

//! GStreamer camera provider
//!
//! One provider instance exists per process. It is created lazily on the
//! blocking pool (GStreamer init plus device enumeration can take a while)
//! and handed out through [`GstProviderSource`].

pub mod enumeration;
pub mod preview;

use self::enumeration::{DiscoveredCamera, enumerate_cameras};
use self::preview::PreviewPipeline;
use super::lifecycle::{Lifecycle, LifecycleObserver};
use super::types::{CameraDevice, CameraSelector};
use super::use_cases::{ImageCapture, UseCaseGroup, VideoCapture, ViewfinderSurface};
use super::{CameraProvider, CameraProviderSource};
use crate::errors::{CameraError, PhotoError, RecordingError};
use crate::pipelines::photo::PhotoPipeline;
use crate::pipelines::video::{RecorderSettings, SharedRecorder, VideoRecorder};
use crate::storage;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Use-cases currently bound to a camera
struct Binding {
    camera: CameraDevice,
    surface: ViewfinderSurface,
    tasks: Vec<JoinHandle<()>>,
}

/// Camera provider backed by GStreamer device providers
pub struct GstCameraProvider {
    cameras: Vec<DiscoveredCamera>,
    binding: Mutex<Option<Binding>>,
    recorder: SharedRecorder,
}

impl GstCameraProvider {
    /// Initialize GStreamer and enumerate cameras (blocking)
    pub fn new() -> Result<Self, CameraError> {
        let cameras = enumerate_cameras()?;
        Ok(Self {
            cameras,
            binding: Mutex::new(None),
            recorder: Arc::new(Mutex::new(None)),
        })
    }

    /// Bound camera and its surface, if any
    fn bound(&self) -> Option<(CameraDevice, ViewfinderSurface)> {
        let binding = self.binding.lock().ok()?;
        binding
            .as_ref()
            .map(|b| (b.camera.clone(), b.surface.clone()))
    }
}

impl CameraProvider for GstCameraProvider {
    fn available_cameras(&self) -> Vec<CameraDevice> {
        self.cameras.iter().map(|c| c.device.clone()).collect()
    }

    fn bind_to_lifecycle(
        &self,
        lifecycle: LifecycleObserver,
        selector: &CameraSelector,
        use_cases: UseCaseGroup,
    ) -> Result<CameraDevice, CameraError> {
        let devices = self.available_cameras();
        let camera = selector
            .select(&devices)
            .cloned()
            .ok_or(CameraError::NoCameraFound)?;
        let discovered = self
            .cameras
            .iter()
            .find(|c| c.device.id == camera.id)
            .ok_or(CameraError::NoCameraFound)?;

        let mut binding = self
            .binding
            .lock()
            .map_err(|_| CameraError::BindFailed("Binding state poisoned".into()))?;
        if binding.is_some() {
            return Err(CameraError::BindFailed(
                "Use-cases already bound; unbind first".into(),
            ));
        }

        let surface = use_cases.preview.surface().clone();
        let preview = Arc::new(PreviewPipeline::new(
            &discovered.gst_device,
            surface.clone(),
            Arc::clone(&self.recorder),
        )?);

        let mut tasks = Vec::with_capacity(2);
        if let Some(watch) = preview.spawn_bus_watch() {
            tasks.push(watch);
        }
        tasks.push(tokio::spawn(follow_lifecycle(
            lifecycle,
            Arc::clone(&preview),
            surface.clone(),
        )));

        info!(
            camera = %camera.name,
            facing = %camera.lens_facing,
            sensor_rotation = %camera.sensor_rotation,
            target_rotation = %use_cases.image_capture.target_rotation,
            "Bound use-cases to lifecycle"
        );

        *binding = Some(Binding {
            camera: camera.clone(),
            surface,
            tasks,
        });
        Ok(camera)
    }

    fn unbind_all(&self) {
        if let Ok(active) = self.recorder.lock() {
            if let Some(recording) = active.as_ref() {
                if let Err(e) = recording.stop() {
                    warn!(error = %e, "Failed to stop recording during unbind");
                }
            }
        }

        let previous = self.binding.lock().ok().and_then(|mut b| b.take());
        if let Some(binding) = previous {
            debug!(camera = %binding.camera.name, "Unbinding use-cases");
            // Aborting the lifecycle task drops the last preview reference
            for task in binding.tasks {
                task.abort();
            }
            binding.surface.clear();
        }
    }

    fn is_bound(&self) -> bool {
        self.binding.lock().map(|b| b.is_some()).unwrap_or(false)
    }

    fn take_picture(
        &self,
        use_case: &ImageCapture,
        output: PathBuf,
    ) -> BoxFuture<'static, Result<PathBuf, PhotoError>> {
        let Some((camera, surface)) = self.bound() else {
            return futures::future::ready(Err(PhotoError::NotReady)).boxed();
        };
        let Some(frame) = surface.latest() else {
            return futures::future::ready(Err(PhotoError::NoFrameAvailable)).boxed();
        };

        let rotation = camera.sensor_rotation.compose(use_case.target_rotation);
        let pipeline = PhotoPipeline::new(rotation, use_case.jpeg_quality);
        debug!(%rotation, path = %output.display(), "Capturing still image");

        async move { pipeline.capture_and_save(frame, output).await }.boxed()
    }

    fn start_recording(
        &self,
        use_case: &VideoCapture,
        output: PathBuf,
    ) -> BoxFuture<'static, Result<PathBuf, RecordingError>> {
        let fail = |e: RecordingError| -> BoxFuture<'static, Result<PathBuf, RecordingError>> {
            futures::future::ready(Err(e)).boxed()
        };

        let Some((camera, surface)) = self.bound() else {
            return fail(RecordingError::NotReady);
        };
        let Some(frame) = surface.latest() else {
            return fail(RecordingError::StartFailed(
                "No preview frames received yet".into(),
            ));
        };

        let Ok(mut active) = self.recorder.lock() else {
            return fail(RecordingError::StartFailed("Recorder state poisoned".into()));
        };
        if active.is_some() {
            return fail(RecordingError::AlreadyRecording);
        }

        if let Some(dir) = output.parent() {
            if let Err(e) = storage::ensure_media_directory(dir) {
                return fail(RecordingError::StartFailed(format!(
                    "Cannot create {}: {}",
                    dir.display(),
                    e
                )));
            }
        }

        let settings = RecorderSettings {
            width: frame.width,
            height: frame.height,
            rotation: camera.sensor_rotation.compose(use_case.target_rotation),
            bitrate_kbps: use_case.bitrate_preset.bitrate_kbps(frame.width),
            enable_audio: use_case.audio_enabled,
            output_path: output,
        };
        let recorder = match VideoRecorder::new(settings) {
            Ok(recorder) => recorder,
            Err(e) => return fail(e),
        };
        if let Err(e) = recorder.start() {
            return fail(e);
        }

        let completion = recorder.completion();
        *active = Some(recorder);
        drop(active);

        let slot = Arc::clone(&self.recorder);
        async move {
            let result = completion.await;
            if let Ok(mut active) = slot.lock() {
                active.take();
            }
            result
        }
        .boxed()
    }

    fn stop_recording(&self) -> Result<(), RecordingError> {
        let active = self
            .recorder
            .lock()
            .map_err(|_| RecordingError::StopFailed("Recorder state poisoned".into()))?;
        match active.as_ref() {
            Some(recording) => recording.stop(),
            None => Err(RecordingError::NoRecordingInProgress),
        }
    }
}

/// Drive the preview pipeline from the screen lifecycle
async fn follow_lifecycle(
    mut lifecycle: LifecycleObserver,
    preview: Arc<PreviewPipeline>,
    surface: ViewfinderSurface,
) {
    loop {
        let state = *lifecycle.borrow_and_update();
        match state {
            Lifecycle::Started => {
                if let Err(e) = preview.play() {
                    error!(error = %e, "Failed to start preview");
                }
            }
            Lifecycle::Created | Lifecycle::Stopped => {
                preview.release();
                surface.clear();
            }
            Lifecycle::Destroyed => break,
        }
        if lifecycle.changed().await.is_err() {
            break;
        }
    }
    preview.release();
    surface.clear();
    debug!("Lifecycle observer finished");
}

/// Lazily creates the process-wide [`GstCameraProvider`]
#[derive(Clone, Default)]
pub struct GstProviderSource {
    instance: Arc<OnceCell<Arc<GstCameraProvider>>>,
}

impl GstProviderSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CameraProviderSource for GstProviderSource {
    fn get_instance(&self) -> BoxFuture<'static, Result<Arc<dyn CameraProvider>, CameraError>> {
        let instance = Arc::clone(&self.instance);
        async move {
            let provider = instance
                .get_or_try_init(|| async {
                    tokio::task::spawn_blocking(GstCameraProvider::new)
                        .await
                        .map_err(|e| {
                            CameraError::ProviderUnavailable(format!("Provider task failed: {}", e))
                        })?
                        .map(Arc::new)
                })
                .await?;
            Ok(Arc::clone(provider) as Arc<dyn CameraProvider>)
        }
        .boxed()
    }
}
