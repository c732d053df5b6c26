// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for photo and video capture
//!
//! Both pipelines consume frames the preview already produced, so the live
//! viewfinder never pauses while a picture is written or a video recorded.
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  JPEG File   │
//! │   (RGBA)     │     │  - Rotation       │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Video Pipeline   │ ──▶ │   MP4 File   │
//! │   (appsrc)   │     │  - H.264 Encoding │     │              │
//! │              │     │  - Audio Muxing   │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```

pub mod photo;
pub mod video;
