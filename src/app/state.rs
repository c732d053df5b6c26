// SPDX-License-Identifier: GPL-3.0-only

//! Session state and messages

use crate::backends::camera::{
    CameraDevice, CameraProvider, CameraProviderSource, ImageCapture, Lifecycle, LifecycleOwner,
    VideoCapture, ViewfinderSurface,
};
use crate::config::Config;
use crate::errors::{CameraError, PhotoError, RecordingError};
use crate::fl;
use crate::permissions::{GrantVector, PermissionGate};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Everything that can happen to the session
///
/// User input and screen visibility come from the front-end; the remaining
/// variants are completions of asynchronous work started by `update`.
pub enum Message {
    /// Screen became visible
    ScreenStarted,
    /// Screen was hidden
    ScreenStopped,
    /// User or system asked to close the screen
    CloseRequested,
    /// Result of a permission prompt
    PermissionsResult(GrantVector),
    /// Provider resolution finished for the given attempt
    ProviderResolved {
        attempt: u64,
        result: Result<Arc<dyn CameraProvider>, CameraError>,
    },
    /// Capture control tapped
    CaptureTapped,
    /// Record toggle tapped
    RecordTapped,
    /// Still capture finished
    PhotoSaved {
        path: PathBuf,
        result: Result<PathBuf, PhotoError>,
    },
    /// Recording ended and the file was finalized (or failed)
    RecordingFinished {
        id: Uuid,
        result: Result<PathBuf, RecordingError>,
    },
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Message::ScreenStarted => write!(f, "ScreenStarted"),
            Message::ScreenStopped => write!(f, "ScreenStopped"),
            Message::CloseRequested => write!(f, "CloseRequested"),
            Message::PermissionsResult(grants) => {
                f.debug_tuple("PermissionsResult").field(grants).finish()
            }
            Message::ProviderResolved { attempt, result } => f
                .debug_struct("ProviderResolved")
                .field("attempt", attempt)
                .field("ok", &result.is_ok())
                .finish(),
            Message::CaptureTapped => write!(f, "CaptureTapped"),
            Message::RecordTapped => write!(f, "RecordTapped"),
            Message::PhotoSaved { path, result } => f
                .debug_struct("PhotoSaved")
                .field("path", path)
                .field("result", result)
                .finish(),
            Message::RecordingFinished { id, result } => f
                .debug_struct("RecordingFinished")
                .field("id", id)
                .field("result", result)
                .finish(),
        }
    }
}

/// Use-cases bound to a resolved provider
pub struct BoundSession {
    pub provider: Arc<dyn CameraProvider>,
    pub camera: CameraDevice,
    pub image_capture: ImageCapture,
    pub video_capture: VideoCapture,
}

/// Camera side of the session
#[derive(Default)]
pub enum CameraSession {
    /// Nothing requested yet, or resolution/binding failed
    #[default]
    Unbound,
    /// Waiting for the permission prompt
    AwaitingPermission,
    /// Waiting for the provider handle
    Resolving { attempt: u64 },
    /// Use-cases bound; capture and record are available
    Ready(BoundSession),
}

impl CameraSession {
    pub fn is_ready(&self) -> bool {
        matches!(self, CameraSession::Ready(_))
    }
}

/// Recording state machine: `Idle → Recording → Stopping → Idle`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RecordingState {
    /// Not recording
    #[default]
    Idle,
    /// Actively recording
    Recording {
        id: Uuid,
        file_path: PathBuf,
        start_time: Instant,
    },
    /// Stop requested, waiting for the file to be finalized
    Stopping { id: Uuid, file_path: PathBuf },
}

impl RecordingState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }

    /// Whether a recording exists (recording or finalizing)
    pub fn is_active(&self) -> bool {
        !matches!(self, RecordingState::Idle)
    }

    /// Identifier of the active recording
    pub fn id(&self) -> Option<Uuid> {
        match self {
            RecordingState::Idle => None,
            RecordingState::Recording { id, .. } | RecordingState::Stopping { id, .. } => Some(*id),
        }
    }

    /// Get the recording file path if recording
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            RecordingState::Idle => None,
            RecordingState::Recording { file_path, .. }
            | RecordingState::Stopping { file_path, .. } => Some(file_path),
        }
    }

    /// Get the elapsed recording duration in seconds
    pub fn elapsed_duration(&self) -> u64 {
        match self {
            RecordingState::Recording { start_time, .. } => start_time.elapsed().as_secs(),
            _ => 0,
        }
    }

    /// Label of the record toggle for this state
    pub fn label(&self) -> RecordLabel {
        match self {
            RecordingState::Idle => RecordLabel::Record,
            RecordingState::Recording { .. } | RecordingState::Stopping { .. } => RecordLabel::Stop,
        }
    }
}

/// Text on the record toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLabel {
    Record,
    Stop,
}

impl RecordLabel {
    pub fn text(&self) -> String {
        match self {
            RecordLabel::Record => fl!("record-button-label"),
            RecordLabel::Stop => fl!("stop-button-label"),
        }
    }
}

/// Short user-facing message (a toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    PermissionsDenied,
    PhotoSaved { path: PathBuf },
    PhotoFailed { path: PathBuf },
    VideoSaved { path: PathBuf },
    VideoFailed { path: PathBuf },
    CameraNotReady,
}

impl Notice {
    /// Localized text
    pub fn text(&self) -> String {
        match self {
            Notice::PermissionsDenied => fl!("request-permissions-fail"),
            Notice::PhotoSaved { .. } => fl!("take-picture-success"),
            Notice::PhotoFailed { .. } => fl!("take-picture-fail"),
            Notice::VideoSaved { .. } => fl!("record-video-success"),
            Notice::VideoFailed { .. } => fl!("record-video-fail"),
            Notice::CameraNotReady => fl!("camera-not-ready"),
        }
    }

    /// File the notice refers to
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Notice::PhotoSaved { path }
            | Notice::PhotoFailed { path }
            | Notice::VideoSaved { path }
            | Notice::VideoFailed { path } => Some(path),
            Notice::PermissionsDenied | Notice::CameraNotReady => None,
        }
    }

    /// Whether the notice reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notice::PermissionsDenied
                | Notice::PhotoFailed { .. }
                | Notice::VideoFailed { .. }
                | Notice::CameraNotReady
        )
    }
}

/// What the front-end renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub camera_ready: bool,
    pub awaiting_permission: bool,
    pub capture_enabled: bool,
    pub record_enabled: bool,
    pub record_label: RecordLabel,
    pub recording_elapsed_secs: Option<u64>,
    /// Screen hidden; the camera is released until it is shown again
    pub paused: bool,
    /// Close requested; waiting for captures and recordings to finish
    pub closing: bool,
    /// Torn down; the front-end should exit
    pub closed: bool,
}

/// Capture session controller
///
/// Owned by the event loop and only ever touched from it. Asynchronous work
/// is returned from `update` as a [`Task`](super::task::Task) whose results
/// come back as messages.
pub struct SessionController {
    pub(crate) config: Config,
    pub(crate) media_dir: PathBuf,
    pub(crate) permissions: Arc<dyn PermissionGate>,
    pub(crate) providers: Arc<dyn CameraProviderSource>,
    pub(crate) surface: ViewfinderSurface,
    pub(crate) lifecycle: LifecycleOwner,
    pub(crate) session: CameraSession,
    pub(crate) recording: RecordingState,
    /// Still captures started but not reported yet
    pub(crate) pending_captures: usize,
    /// Permission gate already evaluated for this screen
    pub(crate) gate_checked: bool,
    pub(crate) next_attempt: u64,
    pub(crate) notices: Vec<Notice>,
    pub(crate) closing: bool,
    pub(crate) closed: bool,
}

impl SessionController {
    pub fn new(
        config: Config,
        permissions: Arc<dyn PermissionGate>,
        providers: Arc<dyn CameraProviderSource>,
        surface: ViewfinderSurface,
    ) -> Self {
        let media_dir = config.media_directory();
        Self {
            config,
            media_dir,
            permissions,
            providers,
            surface,
            lifecycle: LifecycleOwner::new(),
            session: CameraSession::Unbound,
            recording: RecordingState::Idle,
            pending_captures: 0,
            gate_checked: false,
            next_attempt: 0,
            notices: Vec::new(),
            closing: false,
            closed: false,
        }
    }

    /// Current render state
    pub fn view(&self) -> SessionView {
        let camera_ready = self.session.is_ready();
        let usable = self.can_capture();
        SessionView {
            camera_ready,
            awaiting_permission: matches!(self.session, CameraSession::AwaitingPermission),
            capture_enabled: usable,
            record_enabled: usable && !matches!(self.recording, RecordingState::Stopping { .. }),
            record_label: self.recording.label(),
            recording_elapsed_secs: self
                .recording
                .is_recording()
                .then(|| self.recording.elapsed_duration()),
            paused: self.lifecycle.current() == Lifecycle::Stopped,
            closing: self.closing,
            closed: self.closed,
        }
    }

    /// Bound, visible and not closing
    pub(crate) fn can_capture(&self) -> bool {
        self.session.is_ready() && self.lifecycle.current().is_active() && !self.closing
    }

    /// Notices raised since the last call
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn recording(&self) -> &RecordingState {
        &self.recording
    }

    pub fn session(&self) -> &CameraSession {
        &self.session
    }

    /// Camera the session is bound to
    pub fn bound_camera(&self) -> Option<&CameraDevice> {
        match &self.session {
            CameraSession::Ready(bound) => Some(&bound.camera),
            _ => None,
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle.current()
    }

    /// Directory stills and videos are written to
    pub fn media_dir(&self) -> &PathBuf {
        &self.media_dir
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
