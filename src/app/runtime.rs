// SPDX-License-Identifier: GPL-3.0-only

//! Single-consumer event loop
//!
//! Every message, whether user input, lifecycle change or async completion,
//! goes through one unbounded channel and is handled in order by
//! [`SessionController::update`]. Tasks returned by `update` are spawned on
//! the runtime and send their resulting message back into the same channel.

use crate::app::state::{Message, Notice, SessionController, SessionView};
use crate::app::task::Task;
use crate::constants::timing::PRESENT_INTERVAL;
use crate::errors::AppResult;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Something that shows the session (terminal UI, headless driver)
pub trait Screen {
    /// Render the current view and any notices raised since the last call
    fn present(&mut self, view: &SessionView, notices: Vec<Notice>) -> AppResult<()>;
}

/// Owns the message channel and drives a [`SessionController`]
pub struct EventLoop {
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl EventLoop {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Handle for feeding messages from input threads or signal handlers
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.sender.clone()
    }

    /// Run until the controller reports the session closed
    ///
    /// Returns the controller so callers can inspect the final state.
    pub async fn run(
        mut self,
        mut controller: SessionController,
        screen: &mut impl Screen,
    ) -> AppResult<SessionController> {
        let mut ticker = tokio::time::interval(PRESENT_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                message = self.receiver.recv() => {
                    let Some(message) = message else {
                        debug!("Message channel closed");
                        break;
                    };
                    let task = controller.update(message);
                    self.spawn(task);
                }
                _ = ticker.tick() => {}
            }

            screen.present(&controller.view(), controller.take_notices())?;
            if controller.is_closed() {
                debug!("Session closed, leaving event loop");
                break;
            }
        }
        Ok(controller)
    }

    fn spawn(&self, task: Task<Message>) {
        for future in task.into_futures() {
            let sender = self.sender.clone();
            tokio::spawn(async move {
                let message = future.await;
                // Receiver gone means the loop already exited
                let _ = sender.send(message);
            });
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
