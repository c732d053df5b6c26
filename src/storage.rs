// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for naming and placing photo and video files

use crate::constants::{TIMESTAMP_FORMAT, media};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default media directory (`$XDG_DATA_HOME/viewfinder/files`)
///
/// This is the app-specific external files directory: both stills and videos
/// land here side by side.
pub fn default_media_directory() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(media::APP_DIR)
        .join(media::FILES_DIR)
}

/// Ensure the media directory exists, creating it if necessary
pub fn ensure_media_directory(dir: &Path) -> Result<PathBuf, std::io::Error> {
    std::fs::create_dir_all(dir)?;
    info!(path = %dir.display(), "Media directory ready");
    Ok(dir.to_path_buf())
}

/// Build `<dir>/<prefix>_<yyyyMMdd_HHmmss>.<extension>`
///
/// The timestamp is formatted with chrono's locale-independent formatter.
pub fn timestamped_path<Tz: TimeZone>(
    dir: &Path,
    prefix: &str,
    extension: &str,
    at: &DateTime<Tz>,
) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    dir.join(format!(
        "{}_{}.{}",
        prefix,
        at.format(TIMESTAMP_FORMAT),
        extension
    ))
}

/// Destination for a still image taken at `at`
pub fn image_path<Tz: TimeZone>(dir: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    timestamped_path(dir, media::IMAGE_PREFIX, media::IMAGE_EXTENSION, at)
}

/// Destination for a video started at `at`
pub fn video_path<Tz: TimeZone>(dir: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz::Offset: std::fmt::Display,
{
    timestamped_path(dir, media::VIDEO_PREFIX, media::VIDEO_EXTENSION, at)
}
