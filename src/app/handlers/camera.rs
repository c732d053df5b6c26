// SPDX-License-Identifier: GPL-3.0-only

//! Camera session handlers
//!
//! Handles provider resolution, use-case binding and the screen lifecycle.

use crate::app::state::{BoundSession, CameraSession, Message, SessionController};
use crate::app::task::Task;
use crate::backends::camera::{
    CameraProvider, CameraSelector, ImageCapture, Lifecycle, Preview, UseCaseGroup, VideoCapture,
};
use crate::errors::CameraError;
use std::sync::Arc;
use tracing::{debug, error, info};

impl SessionController {
    pub(crate) fn handle_screen_started(&mut self) -> Task<Message> {
        if self.closing {
            debug!("Screen started while closing, ignoring");
            return Task::none();
        }
        self.lifecycle.set(Lifecycle::Started);

        if self.gate_checked {
            return Task::none();
        }
        self.gate_checked = true;
        self.check_permissions_and_start()
    }

    pub(crate) fn handle_screen_stopped(&mut self) -> Task<Message> {
        if self.closed {
            return Task::none();
        }
        self.lifecycle.set(Lifecycle::Stopped);

        if self.recording.is_recording() {
            info!("Screen hidden while recording, stopping");
            self.stop_recording();
        }
        Task::none()
    }

    pub(crate) fn handle_close_requested(&mut self) -> Task<Message> {
        if self.closing {
            return Task::none();
        }
        info!("Close requested");
        self.begin_close()
    }

    /// Request the provider handle; binding happens when it resolves
    pub(crate) fn start_camera(&mut self) -> Task<Message> {
        self.next_attempt += 1;
        let attempt = self.next_attempt;
        self.session = CameraSession::Resolving { attempt };
        debug!(attempt, "Resolving camera provider");

        Task::perform(self.providers.get_instance(), move |result| {
            Message::ProviderResolved { attempt, result }
        })
    }

    pub(crate) fn handle_provider_resolved(
        &mut self,
        attempt: u64,
        result: Result<Arc<dyn CameraProvider>, CameraError>,
    ) -> Task<Message> {
        match self.session {
            CameraSession::Resolving { attempt: current } if current == attempt => {}
            _ => {
                debug!(attempt, "Ignoring stale provider resolution");
                return Task::none();
            }
        }

        let provider = match result {
            Ok(provider) => provider,
            Err(err) => {
                error!(error = %err, "Camera provider resolution failed");
                self.session = CameraSession::Unbound;
                return Task::none();
            }
        };

        self.session = match self.bind_use_cases(provider) {
            Ok(bound) => CameraSession::Ready(bound),
            Err(err) => {
                error!(error = %err, "Use case binding failed");
                CameraSession::Unbound
            }
        };
        Task::none()
    }

    /// Build preview, capture and record use-cases and bind them in one call
    fn bind_use_cases(
        &self,
        provider: Arc<dyn CameraProvider>,
    ) -> Result<BoundSession, CameraError> {
        let selector = CameraSelector::require_lens_facing(self.config.lens_facing)
            .with_external_fallback(self.config.allow_external_fallback);
        let rotation = self.surface.display_rotation();

        let image_capture = ImageCapture::new(rotation).with_jpeg_quality(self.config.jpeg_quality);
        let video_capture = VideoCapture::new(rotation)
            .with_audio(self.config.record_audio)
            .with_bitrate_preset(self.config.bitrate_preset);
        let use_cases = UseCaseGroup {
            preview: Preview::new(self.surface.clone()),
            image_capture,
            video_capture,
        };

        provider.unbind_all();
        let camera = provider.bind_to_lifecycle(self.lifecycle.subscribe(), &selector, use_cases)?;

        info!(
            camera = %camera.name,
            facing = %camera.lens_facing,
            %rotation,
            "Camera bound"
        );
        Ok(BoundSession {
            provider,
            camera,
            image_capture,
            video_capture,
        })
    }

    /// Close the screen once in-flight captures and any recording are done
    pub(crate) fn begin_close(&mut self) -> Task<Message> {
        self.closing = true;
        if self.recording.is_recording() {
            self.stop_recording();
        }
        if self.recording.is_active() || self.pending_captures > 0 {
            info!(
                recording = self.recording.is_active(),
                captures = self.pending_captures,
                "Waiting for captures to finish before closing"
            );
            return Task::none();
        }
        self.teardown();
        Task::none()
    }

    /// Tear down a pending close after the last completion arrives
    pub(crate) fn finish_close_if_settled(&mut self) {
        if self.closing
            && !self.closed
            && !self.recording.is_active()
            && self.pending_captures == 0
        {
            self.teardown();
        }
    }

    /// Destroy the lifecycle and release every binding
    pub(crate) fn teardown(&mut self) {
        self.lifecycle.set(Lifecycle::Destroyed);
        if let CameraSession::Ready(bound) = std::mem::take(&mut self.session) {
            bound.provider.unbind_all();
        }
        self.closed = true;
        info!("Session closed");
    }
}
