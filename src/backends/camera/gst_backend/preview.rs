// SPDX-License-Identifier: GPL-3.0-only

//! Preview pipeline for a bound camera
//!
//! `<device source> ! decodebin ! videoconvert ! RGBA appsink`. Each sample
//! becomes a [`CameraFrame`] that is shown on the viewfinder surface and, if
//! a recording is active, pushed into the recorder.

use crate::backends::camera::types::CameraFrame;
use crate::backends::camera::use_cases::ViewfinderSurface;
use crate::constants::pipeline::MAX_BUFFERS;
use crate::errors::CameraError;
use crate::pipelines::video::SharedRecorder;
use futures::StreamExt;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video::VideoInfo;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Live preview for one camera
#[derive(Debug)]
pub struct PreviewPipeline {
    pipeline: gst::Pipeline,
}

impl PreviewPipeline {
    /// Build the pipeline (left in `Null` until [`PreviewPipeline::play`])
    pub fn new(
        device: &gst::Device,
        surface: ViewfinderSurface,
        recorder: SharedRecorder,
    ) -> Result<Self, CameraError> {
        let source = device
            .create_element(Some("camera-source"))
            .map_err(|e| CameraError::BindFailed(format!("Failed to create source: {}", e)))?;

        let decode = gst::parse::bin_from_description(
            "decodebin ! videoconvert ! video/x-raw,format=RGBA ! appsink name=preview",
            true,
        )
        .map_err(|e| CameraError::BindFailed(format!("Failed to build preview bin: {}", e)))?;

        let pipeline = gst::Pipeline::with_name("viewfinder-preview");
        pipeline.add_many([&source, decode.upcast_ref::<gst::Element>()])?;
        source.link(&decode)?;

        let appsink = decode
            .by_name("preview")
            .ok_or_else(|| CameraError::BindFailed("Preview appsink missing".into()))?
            .dynamic_cast::<gst_app::AppSink>()
            .map_err(|_| CameraError::BindFailed("Failed to cast to AppSink".into()))?;

        appsink.set_property("emit-signals", false);
        appsink.set_property("max-buffers", MAX_BUFFERS);
        appsink.set_property("drop", true);
        appsink.set_property("sync", false);

        appsink.set_callbacks(
            gst_app::AppSinkCallbacks::builder()
                .new_sample(move |appsink| {
                    let sample = appsink.pull_sample().map_err(|_| gst::FlowError::Eos)?;
                    let buffer = sample.buffer().ok_or(gst::FlowError::Error)?;
                    let caps = sample.caps().ok_or(gst::FlowError::Error)?;
                    let video_info =
                        VideoInfo::from_caps(caps).map_err(|_| gst::FlowError::Error)?;
                    let map = buffer.map_readable().map_err(|_| gst::FlowError::Error)?;

                    let frame = Arc::new(CameraFrame {
                        width: video_info.width(),
                        height: video_info.height(),
                        stride: video_info.stride()[0] as u32,
                        data: Arc::from(map.as_slice()),
                        captured_at: std::time::Instant::now(),
                    });

                    if let Ok(active) = recorder.lock() {
                        if let Some(recording) = active.as_ref() {
                            recording.push_frame(&frame);
                        }
                    }
                    surface.present(frame);

                    Ok(gst::FlowSuccess::Ok)
                })
                .build(),
        );

        debug!(device = %device.display_name(), "Preview pipeline created");
        Ok(Self { pipeline })
    }

    /// Start streaming
    pub fn play(&self) -> Result<(), CameraError> {
        info!("Starting preview");
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| CameraError::BackendError(format!("Failed to start preview: {}", e)))?;
        Ok(())
    }

    /// Release the device (pipeline back to `Null`)
    pub fn release(&self) {
        debug!("Releasing preview");
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            warn!(error = %e, "Failed to stop preview pipeline");
        }
    }

    /// Log errors and warnings posted on the bus until the task is aborted
    pub fn spawn_bus_watch(&self) -> Option<tokio::task::JoinHandle<()>> {
        let bus = self.pipeline.bus()?;
        Some(tokio::spawn(async move {
            let mut messages = bus.stream();
            while let Some(message) = messages.next().await {
                match message.view() {
                    gst::MessageView::Error(err) => {
                        error!(
                            error = %err.error(),
                            debug = ?err.debug(),
                            source = ?err.src().map(|s| s.name()),
                            "Preview pipeline error"
                        );
                    }
                    gst::MessageView::Warning(w) => {
                        warn!(warning = %w.error(), debug = ?w.debug(), "Preview pipeline warning");
                    }
                    _ => {}
                }
            }
        }))
    }
}

impl Drop for PreviewPipeline {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
