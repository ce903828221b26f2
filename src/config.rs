use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

/// Playback tuning, loaded from YAML with kebab-case keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PlayerConfig {
    /// Floor applied to decoded per-frame delays. GIFs commonly carry a
    /// delay of zero, which would otherwise spin the scheduler.
    #[serde(
        default = "PlayerConfig::default_min_frame_delay",
        with = "humantime_serde"
    )]
    pub min_frame_delay: Duration,

    /// Decode guardrail: a gif with more frames than this fails to load.
    #[serde(default = "PlayerConfig::default_max_frames")]
    pub max_frames: usize,

    /// Whether a load starts playing as soon as decoding finishes.
    #[serde(default = "PlayerConfig::default_auto_play")]
    pub auto_play: bool,

    /// Cadence at which the CLI drives the scheduler tick.
    #[serde(
        default = "PlayerConfig::default_tick_interval",
        with = "humantime_serde"
    )]
    pub tick_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            min_frame_delay: Self::default_min_frame_delay(),
            max_frames: Self::default_max_frames(),
            auto_play: Self::default_auto_play(),
            tick_interval: Self::default_tick_interval(),
        }
    }
}

impl PlayerConfig {
    fn default_min_frame_delay() -> Duration {
        Duration::from_millis(20)
    }

    fn default_max_frames() -> usize {
        1000
    }

    fn default_auto_play() -> bool {
        true
    }

    fn default_tick_interval() -> Duration {
        Duration::from_millis(15)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_frame_delay > Duration::ZERO,
            "min-frame-delay must be positive"
        );
        ensure!(self.max_frames > 0, "max-frames must be positive");
        ensure!(
            self.tick_interval > Duration::ZERO,
            "tick-interval must be positive"
        );
        Ok(())
    }
}

pub fn from_yaml_file(path: &Path) -> Result<PlayerConfig> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let cfg =
        serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
