// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking photos
//! - Recording videos
//!
//! Photo and video commands run the same permission-gated session as the
//! terminal front-end, driven by a scripted screen instead of key presses.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};
use viewfinder::Config;
use viewfinder::app::{EventLoop, Message, Notice, Screen, SessionController, SessionView};
use viewfinder::backends::camera::gst_backend::GstProviderSource;
use viewfinder::backends::camera::{CameraProviderSource, ViewfinderReceiver, ViewfinderSurface};
use viewfinder::constants::timing::{CAMERA_WARMUP, HEADLESS_READY_TIMEOUT};
use viewfinder::errors::AppResult;
use viewfinder::permissions::PortalPermissions;

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    let provider = runtime.block_on(GstProviderSource::new().get_instance())?;
    let cameras = provider.available_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        println!(
            "      Facing: {}, sensor rotation: {}",
            camera.lens_facing, camera.sensor_rotation
        );
        println!();
    }

    Ok(())
}

/// Take a photo with the configured camera
pub fn take_photo(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let path = run_headless(config, HeadlessAction::Photo)?;
    println!("Photo saved to: {}", path.display());
    Ok(())
}

/// Record a video of `duration` seconds (Ctrl+C stops early)
pub fn record_video(config: Config, duration: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("Recording for {} seconds (press Ctrl+C to stop early)...", duration);
    let path = run_headless(
        config,
        HeadlessAction::Video {
            duration: Duration::from_secs(duration),
        },
    )?;
    println!("Video saved to: {}", path.display());
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum HeadlessAction {
    Photo,
    Video { duration: Duration },
}

fn run_headless(
    config: Config,
    action: HeadlessAction,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })?;

    let outcome = runtime.block_on(async move {
        let (surface, frames) = ViewfinderSurface::new(config.display_rotation);
        let controller = SessionController::new(
            config,
            Arc::new(PortalPermissions::detect()),
            Arc::new(GstProviderSource::new()),
            surface,
        );

        let event_loop = EventLoop::new();
        let sender = event_loop.sender();
        let _ = sender.send(Message::ScreenStarted);

        let mut screen = HeadlessScreen::new(action, sender, frames, interrupted);
        event_loop.run(controller, &mut screen).await?;
        AppResult::Ok(screen.outcome)
    })?;

    match outcome {
        Some(Ok(path)) => Ok(path),
        Some(Err(reason)) => Err(reason.into()),
        None => Err("Session closed before anything was captured".into()),
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    WaitingForCamera,
    WarmingUp { first_frame: Instant },
    Capturing,
    Recording { until: Instant },
    Stopping,
    Closing,
}

/// Scripted screen: waits for the camera, taps once, and closes on the result
struct HeadlessScreen {
    action: HeadlessAction,
    sender: UnboundedSender<Message>,
    frames: ViewfinderReceiver,
    interrupted: Arc<AtomicBool>,
    started: Instant,
    phase: Phase,
    outcome: Option<Result<PathBuf, String>>,
}

impl HeadlessScreen {
    fn new(
        action: HeadlessAction,
        sender: UnboundedSender<Message>,
        frames: ViewfinderReceiver,
        interrupted: Arc<AtomicBool>,
    ) -> Self {
        Self {
            action,
            sender,
            frames,
            interrupted,
            started: Instant::now(),
            phase: Phase::WaitingForCamera,
            outcome: None,
        }
    }

    fn send(&self, message: Message) {
        // The loop owns the receiver for as long as present() is being called
        let _ = self.sender.send(message);
    }

    fn finish(&mut self, outcome: Result<PathBuf, String>) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
        if !matches!(self.phase, Phase::Closing) {
            self.phase = Phase::Closing;
            self.send(Message::CloseRequested);
        }
    }

    fn record_notice(&mut self, notice: Notice) {
        match &notice {
            Notice::PhotoSaved { path } | Notice::VideoSaved { path } => {
                self.finish(Ok(path.clone()))
            }
            Notice::PhotoFailed { .. }
            | Notice::VideoFailed { .. }
            | Notice::PermissionsDenied
            | Notice::CameraNotReady => self.finish(Err(notice.text())),
        }
    }
}

impl Screen for HeadlessScreen {
    fn present(&mut self, view: &SessionView, notices: Vec<Notice>) -> AppResult<()> {
        for notice in notices {
            self.record_notice(notice);
        }

        let now = Instant::now();
        let interrupted = self.interrupted.swap(false, Ordering::SeqCst);

        match self.phase {
            Phase::WaitingForCamera | Phase::WarmingUp { .. } if interrupted => {
                self.finish(Err("Interrupted".into()));
            }
            Phase::WaitingForCamera => {
                if view.camera_ready && self.frames.borrow().is_some() {
                    self.phase = Phase::WarmingUp { first_frame: now };
                } else if now.duration_since(self.started) > HEADLESS_READY_TIMEOUT {
                    warn!(
                        awaiting_permission = view.awaiting_permission,
                        "Camera did not become ready in time"
                    );
                    self.finish(Err("Timed out waiting for the camera".into()));
                }
            }
            Phase::WarmingUp { first_frame } => {
                if now.duration_since(first_frame) >= CAMERA_WARMUP {
                    match self.action {
                        HeadlessAction::Photo => {
                            info!("Capturing photo");
                            self.phase = Phase::Capturing;
                            self.send(Message::CaptureTapped);
                        }
                        HeadlessAction::Video { duration } => {
                            info!(?duration, "Starting recording");
                            self.phase = Phase::Recording {
                                until: now + duration,
                            };
                            self.send(Message::RecordTapped);
                        }
                    }
                }
            }
            Phase::Recording { until } => {
                if interrupted || now >= until {
                    info!(interrupted, "Stopping recording");
                    self.phase = Phase::Stopping;
                    self.send(Message::RecordTapped);
                }
            }
            Phase::Capturing | Phase::Stopping | Phase::Closing => {}
        }
        Ok(())
    }
}
