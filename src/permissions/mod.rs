// SPDX-License-Identifier: GPL-3.0-only

//! Runtime permission gate
//!
//! The session only starts the camera once every required permission is
//! granted. Checking is synchronous; requesting is asynchronous and the
//! result comes back as a grant vector.

pub mod portal;

pub use portal::PortalPermissions;

use futures::future::BoxFuture;

/// A runtime permission the session may need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Camera,
    Microphone,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Camera => write!(f, "camera"),
            Permission::Microphone => write!(f, "microphone"),
        }
    }
}

/// Outcome of a check or request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Permissions a session asks for
pub type PermissionSet = Vec<Permission>;

/// One entry per requested permission
pub type GrantVector = Vec<(Permission, PermissionStatus)>;

/// Source of permission state
pub trait PermissionGate: Send + Sync {
    /// Current status without prompting
    fn check(&self, permission: Permission) -> PermissionStatus;

    /// Prompt for `permissions`; resolves with one entry per permission
    fn request(&self, permissions: PermissionSet) -> BoxFuture<'static, GrantVector>;
}

/// Permissions required for a session (microphone only when recording audio)
pub fn required_permissions(record_audio: bool) -> PermissionSet {
    if record_audio {
        vec![Permission::Camera, Permission::Microphone]
    } else {
        vec![Permission::Camera]
    }
}

/// Whether every entry is granted
///
/// An empty vector counts as not granted (a dismissed prompt reports no
/// results).
pub fn all_granted(grants: &[(Permission, PermissionStatus)]) -> bool {
    !grants.is_empty()
        && grants
            .iter()
            .all(|(_, status)| *status == PermissionStatus::Granted)
}

/// Permissions from `required` that `gate` does not currently grant
pub fn missing_permissions(gate: &dyn PermissionGate, required: &[Permission]) -> PermissionSet {
    required
        .iter()
        .copied()
        .filter(|p| gate.check(*p) != PermissionStatus::Granted)
        .collect()
}
