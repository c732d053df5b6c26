// SPDX-License-Identifier: MPL-2.0

//! Error types for the camera session

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Camera provider errors
    Camera(CameraError),
    /// Permission backend errors
    Permission(PermissionError),
    /// Recording-related errors
    Recording(RecordingError),
    /// Photo capture errors
    Photo(PhotoError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Camera provider errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// No camera matches the selector
    NoCameraFound,
    /// The provider handle could not be resolved
    ProviderUnavailable(String),
    /// Binding use-cases to the lifecycle failed
    BindFailed(String),
    /// A capture or record request arrived before the session was bound
    NotReady,
    /// Backend error (e.g. GStreamer)
    BackendError(String),
}

/// Permission backend errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// D-Bus session bus or portal not reachable
    PortalUnavailable(String),
    /// The portal request failed or returned an unexpected reply
    RequestFailed(String),
}

/// Recording-specific errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    /// Failed to start recording
    StartFailed(String),
    /// Failed to stop recording
    StopFailed(String),
    /// No usable encoder element
    EncoderNotAvailable(String),
    /// Recording already in progress
    AlreadyRecording,
    /// Stop requested with nothing recording
    NoRecordingInProgress,
    /// Pipeline error during recording
    PipelineError(String),
    /// End-of-stream never reached the bus after stop
    FinalizeTimeout,
    /// The session was not bound
    NotReady,
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoError {
    /// No frame available for capture
    NoFrameAvailable,
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
    /// The session was not bound
    NotReady,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Permission(e) => write!(f, "Permission error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoCameraFound => write!(f, "No matching camera found"),
            CameraError::ProviderUnavailable(msg) => {
                write!(f, "Camera provider unavailable: {}", msg)
            }
            CameraError::BindFailed(msg) => write!(f, "Failed to bind use-cases: {}", msg),
            CameraError::NotReady => write!(f, "Camera session is not ready"),
            CameraError::BackendError(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::PortalUnavailable(msg) => write!(f, "Portal unavailable: {}", msg),
            PermissionError::RequestFailed(msg) => write!(f, "Permission request failed: {}", msg),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::StartFailed(msg) => write!(f, "Failed to start recording: {}", msg),
            RecordingError::StopFailed(msg) => write!(f, "Failed to stop recording: {}", msg),
            RecordingError::EncoderNotAvailable(msg) => write!(f, "Encoder not available: {}", msg),
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingError::NoRecordingInProgress => write!(f, "No recording in progress"),
            RecordingError::PipelineError(msg) => write!(f, "Pipeline error: {}", msg),
            RecordingError::FinalizeTimeout => write!(f, "Timed out finalizing recording"),
            RecordingError::NotReady => write!(f, "Camera session is not ready"),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
            PhotoError::NotReady => write!(f, "Camera session is not ready"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for PermissionError {}
impl std::error::Error for RecordingError {}
impl std::error::Error for PhotoError {}

// Conversions from sub-errors to AppError
impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}

impl From<zbus::Error> for PermissionError {
    fn from(err: zbus::Error) -> Self {
        PermissionError::RequestFailed(err.to_string())
    }
}

impl From<gstreamer::glib::Error> for RecordingError {
    fn from(err: gstreamer::glib::Error) -> Self {
        RecordingError::PipelineError(err.to_string())
    }
}

impl From<gstreamer::glib::BoolError> for CameraError {
    fn from(err: gstreamer::glib::BoolError) -> Self {
        CameraError::BackendError(err.to_string())
    }
}
