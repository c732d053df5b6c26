// SPDX-License-Identifier: MPL-2.0

//! Screen lifecycle published to bound camera use-cases
//!
//! The controller owns the [`LifecycleOwner`]; providers receive a
//! [`LifecycleObserver`] at bind time and start or stop hardware access as
//! the screen becomes visible or hidden.

use tokio::sync::watch;
use tracing::debug;

/// Visible lifetime of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Screen exists but is not visible yet
    #[default]
    Created,
    /// Screen is visible
    Started,
    /// Screen is hidden (e.g. lost focus)
    Stopped,
    /// Screen is gone; bindings must be released
    Destroyed,
}

impl Lifecycle {
    /// Whether camera hardware should be streaming in this state
    pub fn is_active(&self) -> bool {
        matches!(self, Lifecycle::Started)
    }
}

/// Receiver side handed to providers
pub type LifecycleObserver = watch::Receiver<Lifecycle>;

/// Sender side owned by the screen's controller
#[derive(Debug)]
pub struct LifecycleOwner {
    sender: watch::Sender<Lifecycle>,
}

impl LifecycleOwner {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Lifecycle::Created);
        Self { sender }
    }

    /// Current state
    pub fn current(&self) -> Lifecycle {
        *self.sender.borrow()
    }

    /// Move to a new state (no-op when unchanged)
    pub fn set(&self, state: Lifecycle) {
        if self.current() != state {
            debug!(from = ?self.current(), to = ?state, "Lifecycle transition");
            self.sender.send_replace(state);
        }
    }

    /// Observer for a new binding
    pub fn subscribe(&self) -> LifecycleObserver {
        self.sender.subscribe()
    }
}

impl Default for LifecycleOwner {
    fn default() -> Self {
        Self::new()
    }
}
