// SPDX-License-Identifier: GPL-3.0-only

//! Still capture and recording handlers

use crate::app::state::{CameraSession, Message, Notice, RecordingState, SessionController};
use crate::app::task::Task;
use crate::errors::{PhotoError, RecordingError};
use crate::storage;
use chrono::Local;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

impl SessionController {
    pub(crate) fn handle_capture(&mut self) -> Task<Message> {
        if !self.can_capture() {
            return self.not_ready("capture");
        }
        let CameraSession::Ready(bound) = &self.session else {
            return self.not_ready("capture");
        };

        let path = storage::image_path(&self.media_dir, &Local::now());
        debug!(path = %path.display(), "Taking picture");
        let future = bound.provider.take_picture(&bound.image_capture, path.clone());
        self.pending_captures += 1;
        Task::perform(future, move |result| Message::PhotoSaved { path, result })
    }

    pub(crate) fn handle_photo_saved(
        &mut self,
        path: PathBuf,
        result: Result<PathBuf, PhotoError>,
    ) -> Task<Message> {
        match result {
            Ok(saved) => {
                info!(path = %saved.display(), "Saved picture");
                self.notices.push(Notice::PhotoSaved { path: saved });
            }
            Err(err) => {
                error!(error = %err, path = %path.display(), "Failed to save picture");
                self.notices.push(Notice::PhotoFailed { path });
            }
        }

        self.pending_captures = self.pending_captures.saturating_sub(1);
        self.finish_close_if_settled();
        Task::none()
    }

    pub(crate) fn handle_toggle_recording(&mut self) -> Task<Message> {
        match self.recording {
            RecordingState::Idle => self.start_recording(),
            RecordingState::Recording { .. } => {
                self.stop_recording();
                Task::none()
            }
            RecordingState::Stopping { .. } => {
                debug!("Recording is finalizing, ignoring toggle");
                Task::none()
            }
        }
    }

    fn start_recording(&mut self) -> Task<Message> {
        if !self.can_capture() {
            return self.not_ready("record");
        }
        let CameraSession::Ready(bound) = &self.session else {
            return self.not_ready("record");
        };

        let id = Uuid::new_v4();
        let file_path = storage::video_path(&self.media_dir, &Local::now());
        info!(
            %id,
            path = %file_path.display(),
            audio = bound.video_capture.audio_enabled,
            "Starting video recording"
        );

        let future = bound
            .provider
            .start_recording(&bound.video_capture, file_path.clone());
        self.recording = RecordingState::Recording {
            id,
            file_path,
            start_time: Instant::now(),
        };
        Task::perform(future, move |result| Message::RecordingFinished { id, result })
    }

    /// Ask the provider to stop; the state becomes `Stopping` until the
    /// completion arrives
    pub(crate) fn stop_recording(&mut self) {
        let RecordingState::Recording { id, file_path, .. } = &self.recording else {
            return;
        };
        let (id, file_path) = (*id, file_path.clone());

        let result = match &self.session {
            CameraSession::Ready(bound) => bound.provider.stop_recording(),
            _ => Err(RecordingError::NotReady),
        };
        match result {
            Ok(()) => {
                info!(%id, "Stopping video recording");
                self.recording = RecordingState::Stopping { id, file_path };
            }
            // Already ended on its own; the completion is on its way
            Err(RecordingError::NoRecordingInProgress) => {
                debug!(%id, "Recorder already finished");
                self.recording = RecordingState::Stopping { id, file_path };
            }
            // No completion will arrive for this id; give up on the file
            Err(err) => {
                error!(%id, error = %err, "Failed to stop recording");
                self.recording = RecordingState::Idle;
                self.notices.push(Notice::VideoFailed { path: file_path });
            }
        }
    }

    pub(crate) fn handle_recording_finished(
        &mut self,
        id: Uuid,
        result: Result<PathBuf, RecordingError>,
    ) -> Task<Message> {
        if self.recording.id() != Some(id) {
            debug!(%id, ok = result.is_ok(), "Ignoring completion of a stale recording");
            return Task::none();
        }

        let file_path = self.recording.file_path().cloned().unwrap_or_default();
        self.recording = RecordingState::Idle;

        match result {
            Ok(path) => {
                info!(path = %path.display(), "Recording saved");
                self.notices.push(Notice::VideoSaved { path });
            }
            Err(err) => {
                error!(error = %err, path = %file_path.display(), "Recording failed");
                self.notices.push(Notice::VideoFailed { path: file_path });
            }
        }

        self.finish_close_if_settled();
        Task::none()
    }

    /// Defined outcome for taps before the session is bound
    fn not_ready(&mut self, action: &str) -> Task<Message> {
        warn!(action, "Camera session not ready");
        self.notices.push(Notice::CameraNotReady);
        Task::none()
    }
}
