//! Binary entrypoint for the GIF player.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use gif_player::config::{self, PlayerConfig};
use gif_player::player::{GifPlayer, PlaybackState};
use gif_player::sink::TerminalSink;

/// Simple CLI
#[derive(Debug, Parser)]
#[command(name = "gif-player", about = "Looping GIF playback in the terminal")]
struct Cli {
    /// GIF file to play
    path: PathBuf,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Load but do not start playback
    #[arg(long)]
    no_auto_play: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("gif_player={}", level).parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = match &cli.config {
        Some(path) => config::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => PlayerConfig::default(),
    };
    cfg.validate().context("validating configuration")?;

    let mut player = GifPlayer::new(
        Box::new(TerminalSink::default()),
        Box::new(TerminalSink::default()),
        &cfg,
    );
    let auto_play = cfg.auto_play && !cli.no_auto_play;
    player.load_from_path(&cli.path, auto_play)?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let mut ticker = tokio::time::interval(cfg.tick_interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("interrupted");
                break;
            }
            _ = ticker.tick() => {
                player.advance(Instant::now());
                match player.state() {
                    PlaybackState::None if !player.is_load_pending() => bail!("load failed"),
                    PlaybackState::Ready if !auto_play => {
                        info!("loaded; auto-play disabled, showing frame 0");
                        break;
                    }
                    PlaybackState::Pause => {
                        info!(loops = player.loops_done(), "playback finished");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}
