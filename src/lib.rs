// SPDX-License-Identifier: MPL-2.0

//! Viewfinder - a permission-gated camera session
//!
//! This library provides a capture session that shows a live viewfinder,
//! saves still images and records video, but only after the camera (and, for
//! audio, microphone) permissions have been granted.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Session controller, messages and the event loop
//! - [`backends`]: Camera provider abstraction and the GStreamer provider
//! - [`permissions`]: Runtime permission gate (desktop portal)
//! - [`pipelines`]: Photo encoding and video recording pipelines
//! - [`config`]: User configuration handling
//! - [`storage`]: Output directory and timestamped file names
//! - [`terminal`]: Terminal front-end
//!
//! # Example
//!
//! ```ignore
//! // Interactive terminal session:
//! // viewfinder
//! // Headless capture:
//! // viewfinder photo
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod i18n;
pub mod permissions;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{Message, SessionController};
pub use config::Config;
pub use constants::BitratePreset;
