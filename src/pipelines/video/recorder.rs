// SPDX-License-Identifier: MPL-2.0

//! Video recorder fed from preview frames
//!
//! The preview pipeline keeps running while recording; every frame it
//! delivers is also pushed into this recorder's `appsrc`. Stopping sends EOS
//! through the whole pipeline so `mp4mux` can write its index, and the
//! completion future resolves once that EOS (or an error) reaches the bus.

use super::encoder_selection::select_encoders;
use super::muxer::{create_muxer, link_to_muxer};
use crate::backends::camera::types::{CameraFrame, Rotation};
use crate::constants::{pipeline::RECORDING_FRAMERATE, timing::RECORDING_FINALIZE_TIMEOUT};
use crate::errors::RecordingError;
use futures::StreamExt;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Structure name of the application message posted when finalizing stalls
const FINALIZE_TIMEOUT_MESSAGE: &str = "viewfinder-finalize-timeout";

/// Slot holding the active recorder, shared with the preview callback
pub type SharedRecorder = Arc<Mutex<Option<VideoRecorder>>>;

/// Everything needed to build a recorder
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Frame width as delivered by the preview
    pub width: u32,
    /// Frame height as delivered by the preview
    pub height: u32,
    /// Rotation applied before encoding
    pub rotation: Rotation,
    pub bitrate_kbps: u32,
    pub enable_audio: bool,
    pub output_path: PathBuf,
}

/// One recording in progress
#[derive(Debug)]
pub struct VideoRecorder {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    file_path: PathBuf,
    width: u32,
    height: u32,
    stopping: Arc<AtomicBool>,
}

impl VideoRecorder {
    /// Build the recording pipeline (not started yet)
    pub fn new(settings: RecorderSettings) -> Result<Self, RecordingError> {
        info!(
            width = settings.width,
            height = settings.height,
            rotation = %settings.rotation,
            bitrate_kbps = settings.bitrate_kbps,
            audio = settings.enable_audio,
            output = %settings.output_path.display(),
            "Creating video recorder"
        );

        gst::init().map_err(|e| {
            RecordingError::StartFailed(format!("Failed to initialize GStreamer: {}", e))
        })?;

        let encoders = select_encoders(settings.bitrate_kbps, settings.enable_audio)?;

        let caps = gst_video::VideoInfo::builder(
            gst_video::VideoFormat::Rgba,
            settings.width,
            settings.height,
        )
        .fps(gst::Fraction::new(RECORDING_FRAMERATE, 1))
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Invalid frame size: {}", e)))?
        .to_caps()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to build caps: {}", e)))?;

        let appsrc = gst_app::AppSrc::builder()
            .name("frames")
            .caps(&caps)
            .format(gst::Format::Time)
            .is_live(true)
            .do_timestamp(true)
            .build();

        let queue = make_element("queue")?;
        let convert_in = make_element("videoconvert")?;
        let flip = gst::ElementFactory::make("videoflip")
            .property_from_str("method", settings.rotation.videoflip_method())
            .build()
            .map_err(|e| {
                RecordingError::StartFailed(format!("Failed to create videoflip: {}", e))
            })?;
        let convert_out = make_element("videoconvert")?;
        let parser = make_element("h264parse")?;
        let muxer = create_muxer(&settings.output_path)?;

        let pipeline = gst::Pipeline::with_name("viewfinder-recorder");
        pipeline
            .add_many([
                appsrc.upcast_ref::<gst::Element>(),
                &queue,
                &convert_in,
                &flip,
                &convert_out,
                &encoders.video,
                &parser,
                &muxer.muxer,
                &muxer.filesink,
            ])
            .map_err(|e| RecordingError::StartFailed(format!("Failed to add elements: {}", e)))?;

        gst::Element::link_many([
            appsrc.upcast_ref::<gst::Element>(),
            &queue,
            &convert_in,
            &flip,
            &convert_out,
            &encoders.video,
            &parser,
        ])
        .map_err(|_| {
            RecordingError::StartFailed(format!(
                "Failed to link video chain through {}",
                encoders.video_factory
            ))
        })?;
        link_to_muxer(&parser, &muxer.muxer, "video")?;
        muxer
            .muxer
            .link(&muxer.filesink)
            .map_err(|_| RecordingError::StartFailed("Failed to link muxer to filesink".into()))?;

        if let Some(encoder) = encoders.audio {
            let source = make_element("autoaudiosrc")?;
            let audio_queue = make_element("queue")?;
            let convert = make_element("audioconvert")?;
            let resample = make_element("audioresample")?;
            let audio_chain = [&source, &audio_queue, &convert, &resample, &encoder];
            pipeline
                .add_many(audio_chain)
                .map_err(|e| RecordingError::StartFailed(format!("Failed to add audio: {}", e)))?;
            gst::Element::link_many(audio_chain)
                .map_err(|_| RecordingError::StartFailed("Failed to link audio chain".into()))?;
            link_to_muxer(&encoder, &muxer.muxer, "audio")?;
        }

        Ok(Self {
            pipeline,
            appsrc,
            file_path: settings.output_path,
            width: settings.width,
            height: settings.height,
            stopping: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Output file
    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }

    /// Start recording
    pub fn start(&self) -> Result<(), RecordingError> {
        info!(path = %self.file_path.display(), "Starting video recording");
        self.pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| RecordingError::StartFailed(format!("{}", e)))?;
        Ok(())
    }

    /// Feed one preview frame
    ///
    /// Frames arriving after stop, or with a size different from the one the
    /// recorder was built for, are dropped.
    pub fn push_frame(&self, frame: &CameraFrame) {
        if self.stopping.load(Ordering::Acquire) {
            return;
        }
        if frame.width != self.width || frame.height != self.height {
            debug!(
                width = frame.width,
                height = frame.height,
                "Dropping frame with mismatched size"
            );
            return;
        }

        let buffer = if frame.stride == frame.width * 4 {
            gst::Buffer::from_slice(Arc::clone(&frame.data))
        } else {
            gst::Buffer::from_mut_slice(frame.packed_rgba())
        };
        if let Err(e) = self.appsrc.push_buffer(buffer) {
            debug!(error = ?e, "appsrc rejected frame");
        }
    }

    /// Send EOS through the pipeline
    ///
    /// Returns once EOS is queued; the completion future reports when the
    /// file is finalized. A second call is a no-op.
    pub fn stop(&self) -> Result<(), RecordingError> {
        if self.stopping.swap(true, Ordering::AcqRel) {
            debug!("Recording already stopping");
            return Ok(());
        }

        info!("Sending EOS to recording pipeline");
        if !self.pipeline.send_event(gst::event::Eos::new()) {
            return Err(RecordingError::StopFailed(
                "Pipeline rejected EOS event".into(),
            ));
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let pipeline = self.pipeline.clone();
                handle.spawn(async move {
                    tokio::time::sleep(RECORDING_FINALIZE_TIMEOUT).await;
                    let message = gst::message::Application::new(gst::Structure::new_empty(
                        FINALIZE_TIMEOUT_MESSAGE,
                    ));
                    // Fails harmlessly once the pipeline is already torn down
                    let _ = pipeline.post_message(message);
                });
            }
            Err(_) => warn!("No async runtime; finalize timeout disabled"),
        }
        Ok(())
    }

    /// Future resolving when the recording has ended
    ///
    /// Resolves to the output path after EOS, or to an error if the pipeline
    /// failed or finalization timed out. The pipeline is shut down either way.
    pub fn completion(
        &self,
    ) -> impl Future<Output = Result<PathBuf, RecordingError>> + Send + 'static {
        let pipeline = self.pipeline.clone();
        let file_path = self.file_path.clone();
        let bus = self.pipeline.bus();

        async move {
            let Some(bus) = bus else {
                return Err(RecordingError::PipelineError("No bus available".into()));
            };
            let mut messages = bus.stream();

            let outcome = loop {
                let Some(message) = messages.next().await else {
                    break Err(RecordingError::PipelineError("Bus closed".into()));
                };
                match message.view() {
                    gst::MessageView::Eos(_) => break Ok(()),
                    gst::MessageView::Error(err) => {
                        error!(
                            error = %err.error(),
                            debug = ?err.debug(),
                            source = ?err.src().map(|s| s.name()),
                            "Recording pipeline error"
                        );
                        break Err(RecordingError::PipelineError(err.error().to_string()));
                    }
                    gst::MessageView::Warning(w) => {
                        warn!(warning = %w.error(), debug = ?w.debug(), "Recording pipeline warning");
                    }
                    gst::MessageView::Application(app)
                        if app
                            .structure()
                            .is_some_and(|s| s.has_name(FINALIZE_TIMEOUT_MESSAGE)) =>
                    {
                        break Err(RecordingError::FinalizeTimeout);
                    }
                    _ => {}
                }
            };

            if let Err(e) = pipeline.set_state(gst::State::Null) {
                warn!(error = %e, "Failed to shut down recording pipeline");
            }

            match outcome {
                Ok(()) => {
                    debug!(path = %file_path.display(), "Recording finalized");
                    Ok(file_path)
                }
                Err(e) => Err(e),
            }
        }
    }
}

impl Drop for VideoRecorder {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}

fn make_element(factory: &str) -> Result<gst::Element, RecordingError> {
    gst::ElementFactory::make(factory)
        .build()
        .map_err(|e| RecordingError::StartFailed(format!("Failed to create {}: {}", factory, e)))
}
