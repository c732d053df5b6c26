// SPDX-License-Identifier: GPL-3.0-only

//! Shared test doubles for session integration tests
//!
//! - [`ScriptedGate`]: permission gate with fixed check results and a queue of
//!   prompt responses
//! - [`FakeProvider`]: in-memory camera provider that counts bindings and
//!   completes recordings when they are stopped
//! - [`Harness`]: feeds messages to a controller and settles ready tasks

#![allow(dead_code)]

use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use viewfinder::app::{Message, Notice, SessionController};
use viewfinder::backends::camera::{
    CameraDevice, CameraProvider, CameraProviderSource, CameraSelector, ImageCapture, LensFacing,
    LifecycleObserver, Rotation, UseCaseGroup, VideoCapture, ViewfinderReceiver,
    ViewfinderSurface,
};
use viewfinder::errors::{CameraError, PhotoError, RecordingError};
use viewfinder::Config;
use viewfinder::permissions::{
    GrantVector, Permission, PermissionGate, PermissionSet, PermissionStatus,
};

/// Permission gate driven by a script
pub struct ScriptedGate {
    statuses: Mutex<Vec<(Permission, PermissionStatus)>>,
    responses: Mutex<VecDeque<GrantVector>>,
    requests: AtomicUsize,
}

impl ScriptedGate {
    /// Everything already granted; prompting is never needed
    pub fn granted() -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(vec![
                (Permission::Camera, PermissionStatus::Granted),
                (Permission::Microphone, PermissionStatus::Granted),
            ]),
            responses: Mutex::new(VecDeque::new()),
            requests: AtomicUsize::new(0),
        })
    }

    /// Nothing granted; each prompt answers with the next queued response
    pub fn prompting(responses: Vec<GrantVector>) -> Arc<Self> {
        Arc::new(Self {
            statuses: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into()),
            requests: AtomicUsize::new(0),
        })
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PermissionGate for ScriptedGate {
    fn check(&self, permission: Permission) -> PermissionStatus {
        self.statuses
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| *p == permission)
            .map(|(_, status)| *status)
            .unwrap_or(PermissionStatus::Denied)
    }

    fn request(&self, permissions: PermissionSet) -> BoxFuture<'static, GrantVector> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                permissions
                    .iter()
                    .map(|p| (*p, PermissionStatus::Denied))
                    .collect()
            });
        let mut statuses = self.statuses.lock().unwrap();
        statuses.retain(|(p, _)| !response.iter().any(|(answered, _)| answered == p));
        statuses.extend(response.iter().copied());
        drop(statuses);
        futures::future::ready(response).boxed()
    }
}

/// Grant vector with every entry granted
pub fn grant_all(permissions: &[Permission]) -> GrantVector {
    permissions
        .iter()
        .map(|p| (*p, PermissionStatus::Granted))
        .collect()
}

/// Grant vector with every entry denied
pub fn deny_all(permissions: &[Permission]) -> GrantVector {
    permissions
        .iter()
        .map(|p| (*p, PermissionStatus::Denied))
        .collect()
}

struct ActiveRecording {
    output: PathBuf,
    done: oneshot::Sender<Result<PathBuf, RecordingError>>,
}

/// In-memory camera provider
pub struct FakeProvider {
    cameras: Vec<CameraDevice>,
    bound: AtomicUsize,
    max_bound: AtomicUsize,
    bind_calls: AtomicUsize,
    unbind_calls: AtomicUsize,
    record_starts: AtomicUsize,
    record_stops: AtomicUsize,
    photos: Mutex<Vec<PathBuf>>,
    photo_error: Mutex<Option<PhotoError>>,
    active: Mutex<Option<ActiveRecording>>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Self::with_cameras(vec![back_camera()])
    }

    pub fn with_cameras(cameras: Vec<CameraDevice>) -> Arc<Self> {
        Arc::new(Self {
            cameras,
            bound: AtomicUsize::new(0),
            max_bound: AtomicUsize::new(0),
            bind_calls: AtomicUsize::new(0),
            unbind_calls: AtomicUsize::new(0),
            record_starts: AtomicUsize::new(0),
            record_stops: AtomicUsize::new(0),
            photos: Mutex::new(Vec::new()),
            photo_error: Mutex::new(None),
            active: Mutex::new(None),
        })
    }

    /// Make the next still capture fail
    pub fn fail_next_photo(&self, error: PhotoError) {
        *self.photo_error.lock().unwrap() = Some(error);
    }

    /// End the active recording with an error, as a pipeline failure would
    pub fn fail_active_recording(&self, error: RecordingError) {
        if let Some(active) = self.active.lock().unwrap().take() {
            let _ = active.done.send(Err(error));
        }
    }

    pub fn bind_calls(&self) -> usize {
        self.bind_calls.load(Ordering::SeqCst)
    }

    pub fn unbind_calls(&self) -> usize {
        self.unbind_calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous bindings seen
    pub fn max_bound(&self) -> usize {
        self.max_bound.load(Ordering::SeqCst)
    }

    pub fn record_starts(&self) -> usize {
        self.record_starts.load(Ordering::SeqCst)
    }

    pub fn record_stops(&self) -> usize {
        self.record_stops.load(Ordering::SeqCst)
    }

    pub fn photos(&self) -> Vec<PathBuf> {
        self.photos.lock().unwrap().clone()
    }

    pub fn is_recording(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }

    fn finish_active(&self) -> bool {
        match self.active.lock().unwrap().take() {
            Some(active) => {
                let _ = active.done.send(Ok(active.output));
                true
            }
            None => false,
        }
    }
}

impl CameraProvider for FakeProvider {
    fn available_cameras(&self) -> Vec<CameraDevice> {
        self.cameras.clone()
    }

    fn bind_to_lifecycle(
        &self,
        _lifecycle: LifecycleObserver,
        selector: &CameraSelector,
        _use_cases: UseCaseGroup,
    ) -> Result<CameraDevice, CameraError> {
        self.bind_calls.fetch_add(1, Ordering::SeqCst);
        let camera = selector
            .select(&self.cameras)
            .cloned()
            .ok_or(CameraError::NoCameraFound)?;
        let bound = self.bound.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_bound.fetch_max(bound, Ordering::SeqCst);
        Ok(camera)
    }

    fn unbind_all(&self) {
        self.unbind_calls.fetch_add(1, Ordering::SeqCst);
        self.finish_active();
        self.bound.store(0, Ordering::SeqCst);
    }

    fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst) > 0
    }

    fn take_picture(
        &self,
        _use_case: &ImageCapture,
        output: PathBuf,
    ) -> BoxFuture<'static, Result<PathBuf, PhotoError>> {
        let result = match self.photo_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => {
                self.photos.lock().unwrap().push(output.clone());
                Ok(output)
            }
        };
        futures::future::ready(result).boxed()
    }

    fn start_recording(
        &self,
        _use_case: &VideoCapture,
        output: PathBuf,
    ) -> BoxFuture<'static, Result<PathBuf, RecordingError>> {
        let mut active = self.active.lock().unwrap();
        if active.is_some() {
            return futures::future::ready(Err(RecordingError::AlreadyRecording)).boxed();
        }
        self.record_starts.fetch_add(1, Ordering::SeqCst);
        let (done, receiver) = oneshot::channel();
        *active = Some(ActiveRecording { output, done });
        async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(RecordingError::StopFailed("recorder dropped".into())))
        }
        .boxed()
    }

    fn stop_recording(&self) -> Result<(), RecordingError> {
        if self.finish_active() {
            self.record_stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        } else {
            Err(RecordingError::NoRecordingInProgress)
        }
    }
}

/// Provider source resolving to a shared [`FakeProvider`]
pub struct FakeSource {
    provider: Arc<FakeProvider>,
    fail: bool,
    resolutions: AtomicUsize,
}

impl FakeSource {
    pub fn new(provider: Arc<FakeProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            fail: false,
            resolutions: AtomicUsize::new(0),
        })
    }

    /// Source whose resolution is always interrupted
    pub fn failing(provider: Arc<FakeProvider>) -> Arc<Self> {
        Arc::new(Self {
            provider,
            fail: true,
            resolutions: AtomicUsize::new(0),
        })
    }

    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }
}

impl CameraProviderSource for FakeSource {
    fn get_instance(&self) -> BoxFuture<'static, Result<Arc<dyn CameraProvider>, CameraError>> {
        self.resolutions.fetch_add(1, Ordering::SeqCst);
        let result: Result<Arc<dyn CameraProvider>, CameraError> = if self.fail {
            Err(CameraError::ProviderUnavailable("interrupted".into()))
        } else {
            Ok(self.provider.clone() as Arc<dyn CameraProvider>)
        };
        futures::future::ready(result).boxed()
    }
}

pub fn back_camera() -> CameraDevice {
    CameraDevice {
        id: "cam-back".into(),
        name: "Rear Camera".into(),
        lens_facing: LensFacing::Back,
        sensor_rotation: Rotation::Deg90,
    }
}

pub fn front_camera() -> CameraDevice {
    CameraDevice {
        id: "cam-front".into(),
        name: "Front Camera".into(),
        lens_facing: LensFacing::Front,
        sensor_rotation: Rotation::Deg270,
    }
}

/// Config writing into a throwaway directory
pub fn test_config(record_audio: bool) -> Config {
    Config {
        media_dir: Some(std::env::temp_dir().join("viewfinder-tests")),
        record_audio,
        ..Config::default()
    }
}

/// Controller plus the tasks it has returned that have not completed yet
pub struct Harness {
    pub controller: SessionController,
    pub frames: ViewfinderReceiver,
    pending: Vec<BoxFuture<'static, Message>>,
    notices: Vec<Notice>,
}

impl Harness {
    pub fn new(
        config: Config,
        gate: Arc<dyn PermissionGate>,
        source: Arc<dyn CameraProviderSource>,
    ) -> Self {
        let (surface, frames) = ViewfinderSurface::new(Rotation::Deg0);
        Self {
            controller: SessionController::new(config, gate, source, surface),
            frames,
            pending: Vec::new(),
            notices: Vec::new(),
        }
    }

    /// Deliver a message, then run every task that can complete right away
    pub fn send(&mut self, message: Message) {
        self.dispatch(message);
        self.settle();
    }

    /// Deliver a message without settling its tasks
    pub fn dispatch(&mut self, message: Message) {
        let task = self.controller.update(message);
        self.pending.extend(task.into_futures());
        self.notices.extend(self.controller.take_notices());
    }

    /// Poll pending tasks until none of them makes progress
    pub fn settle(&mut self) {
        loop {
            let mut ready = Vec::new();
            let mut still_pending = Vec::new();
            for mut future in self.pending.drain(..) {
                match (&mut future).now_or_never() {
                    Some(message) => ready.push(message),
                    None => still_pending.push(future),
                }
            }
            self.pending = still_pending;
            if ready.is_empty() {
                break;
            }
            for message in ready {
                self.dispatch(message);
            }
        }
    }

    /// Take the pending tasks out, e.g. to deliver their results late
    pub fn take_pending(&mut self) -> Vec<BoxFuture<'static, Message>> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Notices collected so far, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
