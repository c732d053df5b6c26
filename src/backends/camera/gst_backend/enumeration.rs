// SPDX-License-Identifier: GPL-3.0-only

//! Camera discovery through the GStreamer device monitor
//!
//! The monitor aggregates every installed device provider (PipeWire,
//! libcamera, V4L2), so one code path finds laptop webcams and phone sensors
//! alike. Lens facing and mounting rotation come from the libcamera
//! properties PipeWire forwards; devices without them count as external.

use crate::backends::camera::types::{CameraDevice, LensFacing, Rotation};
use crate::errors::CameraError;
use gstreamer as gst;
use gstreamer::prelude::*;
use tracing::{debug, info, warn};

/// A camera plus the GStreamer device used to create its source element
#[derive(Debug, Clone)]
pub struct DiscoveredCamera {
    pub device: CameraDevice,
    pub gst_device: gst::Device,
}

/// Enumerate video sources
pub fn enumerate_cameras() -> Result<Vec<DiscoveredCamera>, CameraError> {
    gst::init().map_err(|e| CameraError::ProviderUnavailable(e.to_string()))?;

    let monitor = gst::DeviceMonitor::new();
    monitor.add_filter(Some("Video/Source"), None);
    monitor
        .start()
        .map_err(|e| CameraError::ProviderUnavailable(format!("Device monitor: {}", e)))?;
    let devices = monitor.devices();
    monitor.stop();

    let cameras: Vec<DiscoveredCamera> = devices
        .into_iter()
        .enumerate()
        .map(|(index, gst_device)| {
            let device = describe_device(index, &gst_device);
            debug!(
                id = %device.id,
                name = %device.name,
                facing = %device.lens_facing,
                rotation = %device.sensor_rotation,
                "Found video source"
            );
            DiscoveredCamera { device, gst_device }
        })
        .collect();

    if cameras.is_empty() {
        warn!("Device monitor reported no video sources");
    } else {
        info!(count = cameras.len(), "Enumerated cameras");
    }
    Ok(cameras)
}

fn describe_device(index: usize, gst_device: &gst::Device) -> CameraDevice {
    let name = gst_device.display_name().to_string();
    let properties = gst_device.properties();
    let property = |key: &str| {
        properties
            .as_ref()
            .and_then(|p| p.get::<String>(key).ok())
    };

    let lens_facing = property("api.libcamera.location")
        .map(|location| LensFacing::from_location(&location))
        .unwrap_or(LensFacing::External);
    let sensor_rotation = property("api.libcamera.rotation")
        .map(|degrees| Rotation::parse(&degrees))
        .unwrap_or_default();
    let id = property("object.serial")
        .or_else(|| property("device.path"))
        .or_else(|| property("api.v4l2.path"))
        .unwrap_or_else(|| index.to_string());

    CameraDevice {
        id,
        name,
        lens_facing,
        sensor_rotation,
    }
}
