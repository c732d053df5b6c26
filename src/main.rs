// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;
use viewfinder::Config;
use viewfinder::backends::camera::LensFacing;
use viewfinder::constants::media;
use viewfinder::i18n;

mod cli;

#[derive(Parser)]
#[command(name = "viewfinder")]
#[command(about = "Permission-gated camera with photo capture and video recording")]
#[command(version = env!("GIT_VERSION"))]
#[command(subcommand_required = false)]
struct Cli {
    /// Camera facing to bind (back, front, external)
    #[arg(short, long, global = true)]
    facing: Option<String>,

    /// Directory for saved photos and videos
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (renders camera to terminal, default)
    Terminal,

    /// List available cameras
    List,

    /// Take a photo
    Photo,

    /// Record a video
    Video {
        /// Recording duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,

        /// Record without audio
        #[arg(long)]
        no_audio: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let terminal_mode = matches!(cli.command, None | Some(Commands::Terminal));
    init_logging(terminal_mode);

    // Get the system's preferred languages.
    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    let mut config = Config::load();
    if Config::path().is_some_and(|path| !path.exists()) {
        if let Err(err) = config.save() {
            warn!(%err, "Failed to write default config");
        }
    }
    if let Some(facing) = cli.facing.as_deref() {
        config.lens_facing = LensFacing::from_location(facing);
    }
    if let Some(output) = cli.output {
        config.media_dir = Some(output);
    }

    match cli.command {
        None | Some(Commands::Terminal) => viewfinder::terminal::run(config),
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Photo) => cli::take_photo(config),
        Some(Commands::Video { duration, no_audio }) => {
            if no_audio {
                config.record_audio = false;
            }
            cli::record_video(config, duration)
        }
    }
}

/// Initialize logging
///
/// Set RUST_LOG environment variable to control log level
/// Examples: RUST_LOG=debug, RUST_LOG=viewfinder=debug, RUST_LOG=info
///
/// The terminal front-end owns the screen, so its logs go to a file under the
/// state directory instead of stderr.
fn init_logging(terminal_mode: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if terminal_mode {
        if let Some(file) = open_log_file() {
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
            return;
        }
    }
    builder.init();
}

fn open_log_file() -> Option<std::fs::File> {
    let dir = dirs::state_dir()
        .or_else(dirs::cache_dir)?
        .join(media::APP_DIR);
    std::fs::create_dir_all(&dir).ok()?;
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("viewfinder.log"))
        .ok()
}
