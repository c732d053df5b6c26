// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session controller

mod common;

use common::{
    FakeProvider, FakeSource, Harness, ScriptedGate, back_camera, deny_all, front_camera,
    grant_all, test_config,
};
use futures::FutureExt;
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use viewfinder::app::{
    CameraSession, EventLoop, Message, Notice, RecordLabel, RecordingState, Screen, SessionView,
};
use viewfinder::backends::camera::{
    CameraProvider, LensFacing, Lifecycle, Rotation, ViewfinderSurface,
};
use viewfinder::errors::{AppResult, PhotoError, RecordingError};
use viewfinder::permissions::{Permission, PermissionStatus};

const AUDIO_SET: [Permission; 2] = [Permission::Camera, Permission::Microphone];

/// Session with permissions already granted and the camera bound
fn ready_session() -> (Harness, Arc<FakeProvider>) {
    let provider = FakeProvider::new();
    let mut harness = Harness::new(
        test_config(true),
        ScriptedGate::granted(),
        FakeSource::new(provider.clone()),
    );
    harness.send(Message::ScreenStarted);
    assert!(harness.controller.session().is_ready());
    (harness, provider)
}

/// `<prefix>_<8 digits>_<6 digits>.<extension>`
fn matches_timestamp_name(path: &Path, prefix: &str, extension: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(rest) = name.strip_prefix(prefix).and_then(|r| r.strip_prefix('_')) else {
        return false;
    };
    let Some(stamp) = rest.strip_suffix(extension).and_then(|r| r.strip_suffix('.')) else {
        return false;
    };
    let bytes = stamp.as_bytes();
    bytes.len() == 15
        && bytes[8] == b'_'
        && bytes[..8].iter().all(u8::is_ascii_digit)
        && bytes[9..].iter().all(u8::is_ascii_digit)
}

// ===== Permission gate =====

#[test]
fn test_camera_starts_only_when_every_grant_is_granted() {
    use PermissionStatus::{Denied, Granted};

    let cases = vec![
        (vec![(Permission::Camera, Granted), (Permission::Microphone, Granted)], true),
        (vec![(Permission::Camera, Granted), (Permission::Microphone, Denied)], false),
        (vec![(Permission::Camera, Denied), (Permission::Microphone, Granted)], false),
        (vec![(Permission::Camera, Denied), (Permission::Microphone, Denied)], false),
        (vec![], false),
    ];

    for (grants, should_start) in cases {
        let provider = FakeProvider::new();
        let source = FakeSource::new(provider.clone());
        let mut harness = Harness::new(
            test_config(true),
            ScriptedGate::prompting(vec![grants.clone()]),
            source.clone(),
        );
        harness.send(Message::ScreenStarted);

        assert_eq!(
            source.resolutions() == 1,
            should_start,
            "grants {:?} should start: {}",
            grants,
            should_start
        );
        assert_eq!(harness.controller.session().is_ready(), should_start);

        let notices = harness.take_notices();
        if should_start {
            assert!(notices.is_empty());
            assert!(!harness.controller.is_closed());
        } else {
            assert_eq!(notices, vec![Notice::PermissionsDenied]);
            assert!(harness.controller.is_closed());
            assert_eq!(provider.bind_calls(), 0);
        }
    }
}

#[test]
fn test_granted_after_prompt_starts_camera_exactly_once() {
    let provider = FakeProvider::new();
    let source = FakeSource::new(provider.clone());
    let gate = ScriptedGate::prompting(vec![grant_all(&AUDIO_SET)]);
    let mut harness = Harness::new(test_config(true), gate.clone(), source.clone());

    harness.dispatch(Message::ScreenStarted);
    assert!(matches!(
        harness.controller.session(),
        CameraSession::AwaitingPermission
    ));
    assert!(harness.controller.view().awaiting_permission);
    assert_eq!(source.resolutions(), 0, "camera must not start before the grant");

    harness.settle();
    assert_eq!(gate.request_count(), 1);
    assert_eq!(source.resolutions(), 1);
    assert_eq!(provider.bind_calls(), 1);
    assert!(harness.controller.session().is_ready());

    // Later visibility changes never re-run the gate or the start sequence
    harness.send(Message::ScreenStopped);
    harness.send(Message::ScreenStarted);
    assert_eq!(gate.request_count(), 1);
    assert_eq!(source.resolutions(), 1);
    assert_eq!(provider.bind_calls(), 1);
}

#[test]
fn test_microphone_not_requested_without_audio() {
    let provider = FakeProvider::new();
    let source = FakeSource::new(provider.clone());
    // Only the camera is answered; a microphone entry would be denied
    let gate = ScriptedGate::prompting(vec![grant_all(&[Permission::Camera])]);
    let mut harness = Harness::new(test_config(false), gate.clone(), source);

    harness.send(Message::ScreenStarted);
    assert!(harness.controller.session().is_ready());
    assert_eq!(gate.request_count(), 1);
}

#[test]
fn test_denial_closes_screen() {
    let provider = FakeProvider::new();
    let mut harness = Harness::new(
        test_config(true),
        ScriptedGate::prompting(vec![deny_all(&AUDIO_SET)]),
        FakeSource::new(provider.clone()),
    );
    harness.send(Message::ScreenStarted);

    assert_eq!(harness.take_notices(), vec![Notice::PermissionsDenied]);
    assert!(harness.controller.is_closed());
    assert_eq!(harness.controller.lifecycle(), Lifecycle::Destroyed);
    assert!(!provider.is_bound());
}

#[test]
fn test_late_permission_result_is_ignored() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::PermissionsResult(deny_all(&AUDIO_SET)));

    assert!(harness.controller.session().is_ready());
    assert!(!harness.controller.is_closed());
    assert!(harness.take_notices().is_empty());
    assert_eq!(provider.bind_calls(), 1);
}

// ===== Provider resolution and binding =====

#[test]
fn test_resolution_failure_is_silent_and_not_retried() {
    let provider = FakeProvider::new();
    let source = FakeSource::failing(provider.clone());
    let mut harness = Harness::new(test_config(true), ScriptedGate::granted(), source.clone());

    harness.send(Message::ScreenStarted);
    assert!(matches!(harness.controller.session(), CameraSession::Unbound));
    assert!(harness.take_notices().is_empty(), "no user notice on resolution failure");

    harness.send(Message::ScreenStopped);
    harness.send(Message::ScreenStarted);
    assert_eq!(source.resolutions(), 1, "resolution is never retried");
    assert_eq!(provider.bind_calls(), 0);
}

#[test]
fn test_stale_provider_resolution_is_ignored() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::ProviderResolved {
        attempt: 42,
        result: Ok(provider.clone() as Arc<dyn CameraProvider>),
    });
    assert_eq!(provider.bind_calls(), 1);
    assert!(harness.controller.session().is_ready());
}

#[test]
fn test_binds_rear_camera() {
    let provider = FakeProvider::with_cameras(vec![front_camera(), back_camera()]);
    let mut harness = Harness::new(
        test_config(true),
        ScriptedGate::granted(),
        FakeSource::new(provider),
    );
    harness.send(Message::ScreenStarted);

    let camera = harness.controller.bound_camera().expect("camera bound");
    assert_eq!(camera.lens_facing, LensFacing::Back);
    assert_eq!(harness.controller.lifecycle(), Lifecycle::Started);
}

#[test]
fn test_no_matching_camera_leaves_session_unbound() {
    let provider = FakeProvider::with_cameras(vec![front_camera()]);
    let mut harness = Harness::new(
        test_config(true),
        ScriptedGate::granted(),
        FakeSource::new(provider.clone()),
    );
    harness.send(Message::ScreenStarted);

    assert!(matches!(harness.controller.session(), CameraSession::Unbound));
    assert!(!provider.is_bound());
    harness.send(Message::CaptureTapped);
    assert_eq!(harness.take_notices(), vec![Notice::CameraNotReady]);
}

#[test]
fn test_restart_unbinds_before_rebinding() {
    // A shared provider outlives the screen; a new screen must not stack bindings
    let provider = FakeProvider::new();
    let source = FakeSource::new(provider.clone());

    let mut first = Harness::new(test_config(true), ScriptedGate::granted(), source.clone());
    first.send(Message::ScreenStarted);
    assert!(provider.is_bound());

    let mut second = Harness::new(test_config(true), ScriptedGate::granted(), source.clone());
    second.send(Message::ScreenStarted);

    assert_eq!(provider.bind_calls(), 2);
    assert!(provider.unbind_calls() >= 2);
    assert_eq!(provider.max_bound(), 1, "never two simultaneous bindings");
}

// ===== Still capture =====

#[test]
fn test_capture_reports_one_success_and_logs_path() {
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    let (notices, provider) = tracing::subscriber::with_default(subscriber, || {
        let (mut harness, provider) = ready_session();
        harness.send(Message::CaptureTapped);
        (harness.take_notices(), provider)
    });

    assert_eq!(notices.len(), 1);
    let Notice::PhotoSaved { path } = &notices[0] else {
        panic!("expected a photo notice, got {:?}", notices);
    };
    assert!(path.to_string_lossy().ends_with(".jpg"));
    assert!(matches_timestamp_name(path, "image", "jpg"));
    assert_eq!(provider.photos(), vec![path.clone()]);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    let path_lines = output
        .lines()
        .filter(|line| line.contains(".jpg"))
        .collect::<Vec<_>>();
    assert_eq!(path_lines.len(), 1, "log output:\n{}", output);
    assert!(path_lines[0].contains("Saved picture"));
}

#[test]
fn test_capture_path_is_in_media_directory() {
    let (mut harness, _provider) = ready_session();
    harness.send(Message::CaptureTapped);

    let notices = harness.take_notices();
    let path = notices[0].path().expect("notice carries a path");
    assert_eq!(path.parent(), Some(harness.controller.media_dir().as_path()));
}

#[test]
fn test_capture_failure_reports_notice() {
    let (mut harness, provider) = ready_session();
    provider.fail_next_photo(PhotoError::NoFrameAvailable);
    harness.send(Message::CaptureTapped);

    let notices = harness.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(notices[0], Notice::PhotoFailed { .. }));
    assert!(notices[0].is_failure());

    // Nothing is retried; the next tap works normally
    harness.send(Message::CaptureTapped);
    assert!(matches!(harness.take_notices()[..], [Notice::PhotoSaved { .. }]));
}

#[test]
fn test_taps_before_ready_are_rejected() {
    let provider = FakeProvider::new();
    let mut harness = Harness::new(
        test_config(true),
        ScriptedGate::prompting(vec![grant_all(&AUDIO_SET)]),
        FakeSource::new(provider.clone()),
    );
    harness.dispatch(Message::ScreenStarted);

    let view = harness.controller.view();
    assert!(!view.capture_enabled);
    assert!(!view.record_enabled);

    harness.dispatch(Message::CaptureTapped);
    harness.dispatch(Message::RecordTapped);
    assert_eq!(
        harness.take_notices(),
        vec![Notice::CameraNotReady, Notice::CameraNotReady]
    );
    assert_eq!(*harness.controller.recording(), RecordingState::Idle);
    assert!(provider.photos().is_empty());
    assert_eq!(provider.record_starts(), 0);
}

#[test]
fn test_taps_while_hidden_are_rejected() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::ScreenStopped);

    let view = harness.controller.view();
    assert!(view.camera_ready);
    assert!(view.paused);
    assert!(!view.capture_enabled);
    assert!(!view.record_enabled);

    harness.send(Message::CaptureTapped);
    harness.send(Message::RecordTapped);
    assert_eq!(
        harness.take_notices(),
        vec![Notice::CameraNotReady, Notice::CameraNotReady]
    );
    assert!(provider.photos().is_empty());
    assert_eq!(provider.record_starts(), 0);

    // Showing the screen again brings the controls back
    harness.send(Message::ScreenStarted);
    let view = harness.controller.view();
    assert!(!view.paused);
    assert!(view.capture_enabled);
    harness.send(Message::CaptureTapped);
    assert!(matches!(harness.take_notices()[..], [Notice::PhotoSaved { .. }]));
}

// ===== Recording =====

#[test]
fn test_record_toggle_state_machine() {
    let (mut harness, provider) = ready_session();
    assert_eq!(harness.controller.view().record_label, RecordLabel::Record);

    harness.send(Message::RecordTapped);
    assert!(harness.controller.recording().is_recording());
    assert_eq!(harness.controller.view().record_label, RecordLabel::Stop);
    assert_eq!(harness.pending_count(), 1, "completion arrives only after stop");

    harness.dispatch(Message::RecordTapped);
    assert!(matches!(
        harness.controller.recording(),
        RecordingState::Stopping { .. }
    ));
    let view = harness.controller.view();
    assert_eq!(view.record_label, RecordLabel::Stop);
    assert!(!view.record_enabled, "toggle disabled while finalizing");

    harness.settle();
    assert_eq!(*harness.controller.recording(), RecordingState::Idle);
    assert_eq!(harness.controller.view().record_label, RecordLabel::Record);

    let notices = harness.take_notices();
    assert_eq!(notices.len(), 1);
    let Notice::VideoSaved { path } = &notices[0] else {
        panic!("expected a video notice, got {:?}", notices);
    };
    assert!(matches_timestamp_name(path, "video", "mp4"));
    assert_eq!(provider.record_starts(), 1);
    assert_eq!(provider.record_stops(), 1);
}

#[test]
fn test_at_most_one_active_recording() {
    let (mut harness, provider) = ready_session();

    harness.dispatch(Message::RecordTapped);
    harness.dispatch(Message::RecordTapped);
    // Taps while finalizing are ignored, never a second start
    harness.dispatch(Message::RecordTapped);
    harness.dispatch(Message::RecordTapped);
    assert_eq!(provider.record_starts(), 1);

    harness.settle();
    harness.send(Message::RecordTapped);
    assert_eq!(provider.record_starts(), 2);
    assert_eq!(provider.record_stops(), 1);
    assert!(provider.record_starts() - provider.record_stops() <= 1);
}

#[test]
fn test_recording_failure_resets_label() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::RecordTapped);
    provider.fail_active_recording(RecordingError::PipelineError("encoder crashed".into()));
    harness.settle();

    assert_eq!(*harness.controller.recording(), RecordingState::Idle);
    assert_eq!(harness.controller.view().record_label, RecordLabel::Record);
    let notices = harness.take_notices();
    assert!(matches!(notices[..], [Notice::VideoFailed { .. }]));
}

#[test]
fn test_stale_recording_completion_is_ignored() {
    let (mut harness, _provider) = ready_session();
    harness.send(Message::RecordTapped);

    harness.send(Message::RecordingFinished {
        id: Uuid::new_v4(),
        result: Ok("/tmp/elsewhere.mp4".into()),
    });
    assert!(harness.controller.recording().is_recording());
    assert!(harness.take_notices().is_empty());
}

#[test]
fn test_screen_stop_finishes_recording() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::RecordTapped);
    harness.send(Message::ScreenStopped);

    assert_eq!(*harness.controller.recording(), RecordingState::Idle);
    assert_eq!(harness.controller.lifecycle(), Lifecycle::Stopped);
    assert!(matches!(harness.take_notices()[..], [Notice::VideoSaved { .. }]));
    assert_eq!(provider.record_stops(), 1);
}

// ===== Closing =====

#[test]
fn test_close_waits_for_recording() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::RecordTapped);

    harness.dispatch(Message::CloseRequested);
    assert!(harness.controller.view().closing);
    assert!(!harness.controller.is_closed(), "close waits for the file");

    harness.settle();
    assert!(harness.controller.is_closed());
    assert!(matches!(harness.take_notices()[..], [Notice::VideoSaved { .. }]));
    assert_eq!(harness.controller.lifecycle(), Lifecycle::Destroyed);
    assert!(!provider.is_bound());
}

#[test]
fn test_close_waits_for_capture_in_flight() {
    let (mut harness, provider) = ready_session();
    harness.dispatch(Message::CaptureTapped);

    harness.dispatch(Message::CloseRequested);
    assert!(harness.controller.view().closing);
    assert!(!harness.controller.is_closed(), "close waits for the picture");
    assert!(provider.is_bound());

    harness.settle();
    assert!(harness.controller.is_closed());
    let notices = harness.take_notices();
    assert!(matches!(notices[..], [Notice::PhotoSaved { .. }]));
    assert_eq!(provider.photos().len(), 1);
    assert!(!provider.is_bound());
}

#[test]
fn test_close_waits_for_capture_and_recording() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::RecordTapped);
    harness.dispatch(Message::CaptureTapped);

    // Recording completes on close, the picture is still pending
    harness.dispatch(Message::CloseRequested);
    let mut pending = harness.take_pending();
    assert_eq!(pending.len(), 2);
    let recording = pending.remove(0).now_or_never().expect("recording completed");
    harness.dispatch(recording);
    assert!(!harness.controller.is_closed(), "picture still in flight");

    let photo = pending.remove(0).now_or_never().expect("photo completed");
    harness.dispatch(photo);
    assert!(harness.controller.is_closed());
    let notices = harness.take_notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().any(|n| matches!(n, Notice::VideoSaved { .. })));
    assert!(notices.iter().any(|n| matches!(n, Notice::PhotoSaved { .. })));
    assert!(!provider.is_bound());
}

#[test]
fn test_close_releases_binding() {
    let (mut harness, provider) = ready_session();
    harness.send(Message::CloseRequested);

    assert!(harness.controller.is_closed());
    assert!(!provider.is_bound());

    // Screen events after close do nothing
    harness.send(Message::ScreenStarted);
    harness.send(Message::CaptureTapped);
    assert_eq!(provider.bind_calls(), 1);
    assert!(provider.photos().is_empty());
}

// ===== Event loop =====

/// Taps capture once the camera is ready and closes after the first notice
struct TapOnceScreen {
    sender: tokio::sync::mpsc::UnboundedSender<Message>,
    tapped: bool,
    closing: bool,
    seen: Vec<Notice>,
}

impl Screen for TapOnceScreen {
    fn present(&mut self, view: &SessionView, notices: Vec<Notice>) -> AppResult<()> {
        if view.camera_ready && !self.tapped {
            self.tapped = true;
            self.sender.send(Message::CaptureTapped).ok();
        }
        if !notices.is_empty() && !self.closing {
            self.closing = true;
            self.sender.send(Message::CloseRequested).ok();
        }
        self.seen.extend(notices);
        Ok(())
    }
}

#[tokio::test]
async fn test_event_loop_runs_session_to_close() {
    let provider = FakeProvider::new();
    let (surface, _frames) = ViewfinderSurface::new(Rotation::Deg0);
    let controller = viewfinder::SessionController::new(
        test_config(true),
        ScriptedGate::granted(),
        FakeSource::new(provider.clone()),
        surface,
    );

    let event_loop = EventLoop::new();
    let sender = event_loop.sender();
    sender.send(Message::ScreenStarted).unwrap();

    let mut screen = TapOnceScreen {
        sender,
        tapped: false,
        closing: false,
        seen: Vec::new(),
    };
    let controller = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        event_loop.run(controller, &mut screen),
    )
    .await
    .expect("event loop should finish")
    .expect("event loop should not fail");

    assert!(controller.is_closed());
    assert!(matches!(screen.seen[..], [Notice::PhotoSaved { .. }]));
    assert_eq!(provider.photos().len(), 1);
    assert!(!provider.is_bound());
}
