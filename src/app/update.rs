// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! `update()` is a dispatcher; the handling code lives in the `handlers`
//! submodules, grouped by concern:
//!
//! - `handlers::permissions`: permission gate and denial policy
//! - `handlers::camera`: provider resolution, binding, screen lifecycle
//! - `handlers::capture`: still capture and the recording toggle

use crate::app::state::{Message, SessionController};
use crate::app::task::Task;
use tracing::trace;

impl SessionController {
    /// Handle one message and return the follow-up work
    pub fn update(&mut self, message: Message) -> Task<Message> {
        trace!(?message, "update");
        match message {
            // ===== Screen lifecycle =====
            Message::ScreenStarted => self.handle_screen_started(),
            Message::ScreenStopped => self.handle_screen_stopped(),
            Message::CloseRequested => self.handle_close_requested(),

            // ===== Permissions =====
            Message::PermissionsResult(grants) => self.handle_permissions_result(grants),

            // ===== Camera =====
            Message::ProviderResolved { attempt, result } => {
                self.handle_provider_resolved(attempt, result)
            }

            // ===== Capture =====
            Message::CaptureTapped => self.handle_capture(),
            Message::PhotoSaved { path, result } => self.handle_photo_saved(path, result),
            Message::RecordTapped => self.handle_toggle_recording(),
            Message::RecordingFinished { id, result } => self.handle_recording_finished(id, result),
        }
    }
}
