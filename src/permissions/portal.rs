// SPDX-License-Identifier: GPL-3.0-only

//! Permissions backed by the XDG desktop portal
//!
//! Outside a Flatpak sandbox the process already has device access, so every
//! permission is granted. Inside the sandbox, camera access goes through
//! `org.freedesktop.portal.Camera.AccessCamera`, and microphone access
//! depends on whether the PulseAudio socket was exported to the sandbox.

use super::{GrantVector, Permission, PermissionGate, PermissionSet, PermissionStatus};
use crate::errors::PermissionError;
use futures::StreamExt;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

const FLATPAK_INFO: &str = "/.flatpak-info";
const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";

/// Permission gate using the camera portal when sandboxed
#[derive(Debug, Clone)]
pub struct PortalPermissions {
    sandboxed: bool,
    camera_granted: Arc<AtomicBool>,
    microphone_granted: bool,
}

impl PortalPermissions {
    /// Detect the sandbox from `/.flatpak-info`
    pub fn detect() -> Self {
        match std::fs::read_to_string(FLATPAK_INFO) {
            Ok(info) => {
                let microphone_granted = sandbox_exports_pulseaudio(&info);
                info!(microphone_granted, "Running inside Flatpak sandbox");
                Self::sandboxed(microphone_granted)
            }
            Err(_) => {
                debug!("No Flatpak sandbox detected, all permissions granted");
                Self::unsandboxed()
            }
        }
    }

    /// Gate for a process with direct device access
    pub fn unsandboxed() -> Self {
        Self {
            sandboxed: false,
            camera_granted: Arc::new(AtomicBool::new(true)),
            microphone_granted: true,
        }
    }

    /// Gate for a sandboxed process (camera access not yet granted)
    pub fn sandboxed(microphone_granted: bool) -> Self {
        Self {
            sandboxed: true,
            camera_granted: Arc::new(AtomicBool::new(false)),
            microphone_granted,
        }
    }

    pub fn is_sandboxed(&self) -> bool {
        self.sandboxed
    }
}

impl PermissionGate for PortalPermissions {
    fn check(&self, permission: Permission) -> PermissionStatus {
        let granted = match permission {
            Permission::Camera => self.camera_granted.load(Ordering::Acquire),
            Permission::Microphone => self.microphone_granted,
        };
        if granted {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    fn request(&self, permissions: PermissionSet) -> BoxFuture<'static, GrantVector> {
        let gate = self.clone();
        Box::pin(async move {
            let mut grants = Vec::with_capacity(permissions.len());
            for permission in permissions {
                let status = match permission {
                    Permission::Camera if !gate.camera_granted.load(Ordering::Acquire) => {
                        match access_camera().await {
                            Ok(true) => {
                                gate.camera_granted.store(true, Ordering::Release);
                                PermissionStatus::Granted
                            }
                            Ok(false) => {
                                warn!("Camera access denied through portal");
                                PermissionStatus::Denied
                            }
                            Err(e) => {
                                error!(error = %e, "Camera portal request failed");
                                PermissionStatus::Denied
                            }
                        }
                    }
                    other => gate.check(other),
                };
                grants.push((permission, status));
            }
            grants
        })
    }
}

/// Ask the camera portal for access; `Ok(true)` when the user allowed it
async fn access_camera() -> Result<bool, PermissionError> {
    let connection = zbus::Connection::session()
        .await
        .map_err(|e| PermissionError::PortalUnavailable(format!("Session bus: {}", e)))?;

    let sender = connection
        .unique_name()
        .ok_or_else(|| PermissionError::PortalUnavailable("No unique bus name".into()))?
        .as_str()
        .trim_start_matches(':')
        .replace('.', "_");
    let token = format!("viewfinder_{}", uuid::Uuid::new_v4().simple());
    let request_path = format!("{}/request/{}/{}", PORTAL_PATH, sender, token);

    // Subscribe before calling so the response cannot be missed
    let request = zbus::Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        request_path.as_str(),
        "org.freedesktop.portal.Request",
    )
    .await?;
    let mut responses = request.receive_signal("Response").await?;

    let camera = zbus::Proxy::new(
        &connection,
        PORTAL_DESTINATION,
        PORTAL_PATH,
        "org.freedesktop.portal.Camera",
    )
    .await?;

    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));
    let handle: OwnedObjectPath = camera.call("AccessCamera", &(options,)).await?;
    debug!(handle = %handle, "Waiting for camera portal response");

    let message = responses
        .next()
        .await
        .ok_or_else(|| PermissionError::RequestFailed("Response stream ended".into()))?;
    let (response, _results): (u32, HashMap<String, OwnedValue>) =
        message.body().deserialize()?;

    debug!(response, "Camera portal responded");
    Ok(response == 0)
}

/// Whether the `sockets=` key of the `[Context]` group lists `pulseaudio`
pub fn sandbox_exports_pulseaudio(flatpak_info: &str) -> bool {
    let mut in_context = false;
    for line in flatpak_info.lines().map(str::trim) {
        if line.starts_with('[') {
            in_context = line == "[Context]";
            continue;
        }
        if in_context {
            if let Some(sockets) = line.strip_prefix("sockets=") {
                return sockets.split(';').any(|s| s.trim() == "pulseaudio");
            }
        }
    }
    false
}
