// SPDX-License-Identifier: MPL-2.0

//! Capture session controller
//!
//! The controller owns all session state and is driven exclusively by
//! [`Message`]s on a single event loop. It gates the camera on runtime
//! permissions, binds preview/capture/record use-cases once the provider
//! resolves, and turns taps into still captures and recording toggles.
//!
//! # Architecture
//!
//! - `state`: Session state types (SessionController, Message, RecordingState, etc.)
//! - `update`: Message dispatch
//! - `handlers`: Handling code grouped by concern
//! - `task`: Deferred work returned from `update`
//! - `runtime`: Event loop and the `Screen` front-end trait
//!
//! # Flow
//!
//! ```text
//! ScreenStarted ─▶ permission gate ─▶ get_instance() ─▶ unbind_all + bind
//!                        │                                     │
//!                        ▼                                     ▼
//!               denied: notice + close          CaptureTapped / RecordTapped
//! ```

mod handlers;
pub mod runtime;
mod state;
pub mod task;
mod update;

pub use runtime::{EventLoop, Screen};
pub use state::{
    BoundSession, CameraSession, Message, Notice, RecordLabel, RecordingState, SessionController,
    SessionView,
};
pub use task::Task;
