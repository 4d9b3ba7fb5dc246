//! Game tunables, loaded from a TOML file.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the keys
//! it wants to change and a missing file means "all defaults".

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

// ── Sections ──────────────────────────────────────────────────────────────────

/// Logical screen size.  The terminal renderer scales this to the window.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 700.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f32,
    pub height: f32,
    /// Gap between the ship and the bottom edge.
    pub margin: f32,
    pub image: String,
    pub explosion_image: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 40.0,
            margin: 20.0,
            image: "Resources/Images/Player/starship.png".into(),
            explosion_image: "Resources/Images/Explosion/explosion.png".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub width: f32,
    pub height: f32,
    pub image: String,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            image: "Resources/Images/Enemies/starshipdark.png".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub spawn_interval_ms: u64,
    pub descent_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            spawn_interval_ms: 1000,
            descent_ms: 5000,
        }
    }
}

impl TimingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }

    pub fn descent(&self) -> Duration {
        Duration::from_millis(self.descent_ms)
    }
}

/// Points handed out by the scoring engine.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ScoringRules {
    /// Added on every tick that ends without a collision.
    pub survival_reward: u32,
    /// Added when an enemy finishes its descent without hitting the player.
    pub dodge_reward: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringPreset::Arcade.rules()
    }
}

/// Named reward tables.  `Classic` is the slow 1-point-per-tick scoring with
/// no dodge bonus; `Arcade` pays 20 for both.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoringPreset {
    Arcade,
    Classic,
}

impl ScoringPreset {
    pub fn rules(self) -> ScoringRules {
        match self {
            ScoringPreset::Arcade => ScoringRules {
                survival_reward: 20,
                dodge_reward: 20,
            },
            ScoringPreset::Classic => ScoringRules {
                survival_reward: 1,
                dodge_reward: 0,
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// `false` behaves like a device without a gyroscope.
    pub tilt_enabled: bool,
    /// Screen units per unit of angular velocity.
    pub sensitivity: f32,
    /// Angular velocity reported for one key press.
    pub key_tilt: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tilt_enabled: true,
            sensitivity: 10.0,
            key_tilt: 2.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    pub asset_dir: PathBuf,
    pub music: String,
    pub collision: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            asset_dir: PathBuf::from("assets"),
            music: "515405__matrixxx__retro-gaming.wav".into(),
            collision: "745161__etheraudio__retro-death.wav".into(),
        }
    }
}

impl AudioConfig {
    pub fn music_path(&self) -> PathBuf {
        self.asset_dir.join(&self.music)
    }

    pub fn collision_path(&self) -> PathBuf {
        self.asset_dir.join(&self.collision)
    }
}

// ── Root ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub timing: TimingConfig,
    pub scoring: ScoringRules,
    pub input: InputConfig,
    pub audio: AudioConfig,
}

impl Config {
    /// Load from `path`; a missing file falls back to the defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_toml_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        log::info!("loaded config from {}", path.display());
        Ok(cfg)
    }

    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Config = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject geometry the clamp and spawn rules cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let s = &self.screen;
        if !(s.width > 0.0 && s.height > 0.0) {
            bail!("screen must have a positive size, got {}x{}", s.width, s.height);
        }
        if self.player.width <= 0.0 || self.player.width > s.width {
            bail!("player width {} does not fit a {} wide screen", self.player.width, s.width);
        }
        if self.enemy.width <= 0.0 || self.enemy.width > s.width {
            bail!("enemy width {} does not fit a {} wide screen", self.enemy.width, s.width);
        }
        if self.player.height + self.player.margin > s.height {
            bail!("player does not fit vertically on a {} tall screen", s.height);
        }
        if self.timing.tick_ms == 0 || self.timing.spawn_interval_ms == 0 {
            bail!("tick and spawn intervals must be non-zero");
        }
        Ok(())
    }
}
