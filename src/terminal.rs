// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front-end for the capture session
//!
//! Renders the viewfinder with Unicode half-block characters (two vertical
//! pixels per cell), a capture control and a record toggle. Key presses and
//! terminal focus changes are read on a separate thread and turned into
//! session messages.

use crate::app::{EventLoop, Message, Notice, RecordLabel, Screen, SessionController, SessionView};
use crate::backends::camera::gst_backend::GstProviderSource;
use crate::backends::camera::{CameraFrame, ViewfinderReceiver, ViewfinderSurface};
use crate::config::Config;
use crate::constants::timing::{INPUT_POLL_INTERVAL, NOTICE_DURATION};
use crate::errors::AppResult;
use crate::fl;
use crate::permissions::PortalPermissions;

use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::collections::VecDeque;
use std::io::{self, stdout};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

type TerminalBackend = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the terminal camera session until the user quits
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = runtime.block_on(run_session(&mut terminal, config));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The alternate screen is gone; repeat the last notice on stdout
    let last_notice = result?;
    if let Some(notice) = last_notice {
        match notice.path() {
            Some(path) => println!("{} ({})", notice.text(), path.display()),
            None => println!("{}", notice.text()),
        }
    }
    Ok(())
}

async fn run_session(terminal: &mut TerminalBackend, config: Config) -> AppResult<Option<Notice>> {
    let (surface, frames) = ViewfinderSurface::new(config.display_rotation);
    let controller = SessionController::new(
        config,
        Arc::new(PortalPermissions::detect()),
        Arc::new(GstProviderSource::new()),
        surface,
    );

    let event_loop = EventLoop::new();
    let sender = event_loop.sender();
    let input = InputReader::spawn(sender.clone());
    // Screen is visible as soon as the alternate screen is up
    let _ = sender.send(Message::ScreenStarted);

    let mut screen = TerminalScreen::new(terminal, frames);
    let result = event_loop.run(controller, &mut screen).await;
    input.stop();

    result?;
    info!("Terminal session finished");
    Ok(screen.last_notice)
}

/// Map a terminal event to a session message
pub fn map_event(event: &Event) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        Event::FocusGained => Some(Message::ScreenStarted),
        Event::FocusLost => Some(Message::ScreenStopped),
        _ => None,
    }
}

fn map_key(key: &KeyEvent) -> Option<Message> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => Some(Message::CloseRequested),
        KeyCode::Char(' ') | KeyCode::Char('c') => Some(Message::CaptureTapped),
        KeyCode::Char('r') => Some(Message::RecordTapped),
        KeyCode::Char('q') | KeyCode::Esc => Some(Message::CloseRequested),
        _ => None,
    }
}

/// Blocking crossterm reader on its own thread
struct InputReader {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputReader {
    fn spawn(sender: UnboundedSender<Message>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            while !stop_flag.load(Ordering::Relaxed) {
                match event::poll(INPUT_POLL_INTERVAL) {
                    Ok(true) => match event::read() {
                        Ok(event) => {
                            if let Some(message) = map_event(&event) {
                                debug!(?message, "Input");
                                if sender.send(message).is_err() {
                                    break;
                                }
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to read terminal event");
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        error!(error = %e, "Failed to poll terminal events");
                        break;
                    }
                }
            }
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// ratatui rendering of the session
struct TerminalScreen<'a> {
    terminal: &'a mut TerminalBackend,
    frames: ViewfinderReceiver,
    toasts: VecDeque<(Notice, Instant)>,
    last_notice: Option<Notice>,
}

impl<'a> TerminalScreen<'a> {
    fn new(terminal: &'a mut TerminalBackend, frames: ViewfinderReceiver) -> Self {
        Self {
            terminal,
            frames,
            toasts: VecDeque::new(),
            last_notice: None,
        }
    }
}

impl Screen for TerminalScreen<'_> {
    fn present(&mut self, view: &SessionView, notices: Vec<Notice>) -> AppResult<()> {
        let now = Instant::now();
        for notice in notices {
            self.last_notice = Some(notice.clone());
            self.toasts.push_back((notice, now));
        }
        self.toasts
            .retain(|(_, shown_at)| now.duration_since(*shown_at) < NOTICE_DURATION);

        let frame = self.frames.borrow().clone();
        let placeholder = if view.awaiting_permission {
            fl!("waiting-for-permission")
        } else if view.paused {
            fl!("camera-paused")
        } else {
            fl!("waiting-for-camera")
        };
        let toast = self.toasts.back().map(|(notice, _)| notice.clone());

        self.terminal.draw(|f| {
            let [viewfinder_area, controls_area, status_area] = Layout::vertical([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .areas(f.area());

            f.render_widget(
                FrameWidget {
                    frame: frame.as_deref(),
                    placeholder: &placeholder,
                },
                viewfinder_area,
            );
            f.render_widget(Paragraph::new(controls_line(view)), controls_area);
            f.render_widget(Paragraph::new(status_line(toast.as_ref())), status_area);
        })?;
        Ok(())
    }
}

fn button_style(enabled: bool) -> Style {
    if enabled {
        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().add_modifier(Modifier::DIM)
    }
}

fn controls_line(view: &SessionView) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", fl!("capture-button-label")),
            button_style(view.capture_enabled),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", view.record_label.text()),
            button_style(view.record_enabled),
        ),
    ];
    if let Some(secs) = view.recording_elapsed_secs {
        let elapsed = format!("{:02}:{:02}", secs / 60, secs % 60);
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            fl!("recording-elapsed", elapsed = elapsed),
            Style::default().fg(Color::Red),
        ));
    } else if view.record_label == RecordLabel::Stop {
        spans.push(Span::styled("  …", Style::default().fg(Color::Red)));
    }
    Line::from(spans)
}

fn status_line(toast: Option<&Notice>) -> Line<'static> {
    match toast {
        Some(notice) => {
            let color = if notice.is_failure() {
                Color::Red
            } else {
                Color::Green
            };
            Line::from(Span::styled(notice.text(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            fl!("key-hints"),
            Style::default().add_modifier(Modifier::DIM),
        )),
    }
}

/// Widget that renders a camera frame using half-block characters
struct FrameWidget<'a> {
    frame: Option<&'a CameraFrame>,
    placeholder: &'a str,
}

impl Widget for FrameWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = match self.frame {
            Some(frame) if frame.width > 0 && frame.height > 0 => frame,
            _ => {
                let msg = self.placeholder;
                let x = area.x + (area.width.saturating_sub(msg.chars().count() as u16)) / 2;
                let y = area.y + area.height / 2;
                if y < area.y + area.height && x < area.x + area.width {
                    buf.set_string(x, y, msg, Style::default());
                }
                return;
            }
        };
        if area.width == 0 || area.height == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;
                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (r, g, b) = frame.rgb_at(src_x, src_y_top);
                let top = Color::Rgb(r, g, b);
                let (r, g, b) = frame.rgb_at(src_x, src_y_bottom);
                let bottom = Color::Rgb(r, g, b);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }
    }
}
