// SPDX-License-Identifier: GPL-3.0-only

//! Permission gate handlers

use crate::app::state::{CameraSession, Message, Notice, SessionController};
use crate::app::task::Task;
use crate::permissions::{self, GrantVector};
use tracing::{debug, info, warn};

impl SessionController {
    /// Start the camera if every required permission is granted, otherwise
    /// prompt for them and wait for the result
    pub(crate) fn check_permissions_and_start(&mut self) -> Task<Message> {
        let required = permissions::required_permissions(self.config.record_audio);
        let missing = permissions::missing_permissions(self.permissions.as_ref(), &required);

        if missing.is_empty() {
            debug!(?required, "All permissions granted");
            return self.start_camera();
        }

        info!(?missing, "Requesting permissions");
        self.session = CameraSession::AwaitingPermission;
        Task::perform(self.permissions.request(required), Message::PermissionsResult)
    }

    pub(crate) fn handle_permissions_result(&mut self, grants: GrantVector) -> Task<Message> {
        if !matches!(self.session, CameraSession::AwaitingPermission) {
            debug!(?grants, "Ignoring permission result outside of a prompt");
            return Task::none();
        }

        if permissions::all_granted(&grants) {
            info!("Permissions granted");
            return self.start_camera();
        }

        warn!(?grants, "Permissions not granted by the user");
        self.session = CameraSession::Unbound;
        self.notices.push(Notice::PermissionsDenied);
        self.begin_close()
    }
}
