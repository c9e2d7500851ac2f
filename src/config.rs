//! Tunable gameplay and runtime settings, loaded from TOML.
//!
//! Every section is `#[serde(default)]`, so a file only needs the values it
//! changes and a missing file means the classic arcade defaults.

use std::{env, fs, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::error::ConfigError;

pub const CONFIG_PATH_ENV: &str = "SPACE_DEFENDER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "space_defender.toml";

pub fn config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScreenConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 240.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: u32,
    pub speed: f32,
    pub projectile_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 10,
            speed: 2.0,
            projectile_speed: 3.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnemyConfig {
    pub speed: f32,
    pub hit_points: u32,
    /// Invaders turn around once `x <= left_margin`.
    pub left_margin: f32,
    /// Invaders turn around once `x >= width - right_margin`.
    pub right_margin: f32,
    pub descent_step: f32,
    /// The game ends when an invader passes `height - game_over_margin`.
    pub game_over_margin: f32,
    /// Per-tick probability that an invader fires.
    pub fire_chance: f64,
    /// Magnitude of an invader shot's downward speed.
    pub projectile_speed: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            hit_points: 10,
            left_margin: 5.0,
            right_margin: 15.0,
            descent_step: 3.0,
            game_over_margin: 20.0,
            fire_chance: 1.0 / 200.0,
            projectile_speed: 3.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WaveConfig {
    pub rows: u32,
    pub columns: u32,
    pub origin_x: f32,
    pub origin_y: f32,
    pub column_spacing: f32,
    pub row_spacing: f32,
    pub bonus_chance: f64,
    pub bonus_speed: f32,
    pub bonus_y: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            columns: 10,
            origin_x: 10.0,
            origin_y: 10.0,
            column_spacing: 20.0,
            row_spacing: 20.0,
            bonus_chance: 0.3,
            bonus_speed: 0.5,
            bonus_y: 20.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub enemy_points: u32,
    pub bonus_points: u32,
    pub bonus_heal: u32,
    pub hit_penalty: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enemy_points: 100,
            bonus_points: 500,
            bonus_heal: 5,
            hit_penalty: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub tick_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { tick_ms: 33 }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed RNG seed for reproducible runs; entropy when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub file: PathBuf,
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("space_defender.log"),
            filter: "info".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub screen: ScreenConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub wave: WaveConfig,
    pub scoring: ScoringConfig,
    pub timing: TimingConfig,
    pub game: SessionConfig,
    pub log: LogConfig,
}

impl GameConfig {
    pub fn from_toml_str(raw: &str, origin: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let cfg: GameConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: origin.as_ref().to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.check()?;
        Ok(cfg)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw, path)
    }

    /// Defaults plus the load error, if any, for the caller to report.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<ConfigError>) {
        match Self::load_from_file(path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timing.tick_ms)
    }

    /// Hard constraints; a config that fails here cannot run a session.
    pub fn check(&self) -> Result<(), ConfigError> {
        if !(self.screen.width > 0.0 && self.screen.height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "screen",
                reason: format!(
                    "dimensions must be > 0, got {}x{}",
                    self.screen.width, self.screen.height
                ),
            });
        }
        if self.wave.rows == 0 || self.wave.columns == 0 {
            return Err(ConfigError::Invalid {
                field: "wave",
                reason: format!(
                    "grid {}x{} is empty; an emptied field could never refill",
                    self.wave.rows, self.wave.columns
                ),
            });
        }
        if self.player.max_health == 0 {
            return Err(ConfigError::Invalid {
                field: "player.max_health",
                reason: "must be at least 1".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.enemy.fire_chance) {
            return Err(ConfigError::Invalid {
                field: "enemy.fire_chance",
                reason: format!("{} is not a probability", self.enemy.fire_chance),
            });
        }
        if !(0.0..=1.0).contains(&self.wave.bonus_chance) {
            return Err(ConfigError::Invalid {
                field: "wave.bonus_chance",
                reason: format!("{} is not a probability", self.wave.bonus_chance),
            });
        }
        if self.timing.tick_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.tick_ms",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Soft problems worth logging; the game still runs.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        let formation_right = self.wave.origin_x
            + self.wave.column_spacing * self.wave.columns.saturating_sub(1) as f32;
        if formation_right >= self.screen.width - self.enemy.right_margin {
            w.push(format!(
                "formation spans to x={formation_right}, past the right turn line at {}",
                self.screen.width - self.enemy.right_margin
            ));
        }
        if self.player.projectile_speed <= 0.0 {
            w.push(format!(
                "player.projectile_speed {} does not travel upward",
                self.player.projectile_speed
            ));
        }
        if self.enemy.speed == 0.0 {
            w.push("enemy.speed is zero; invaders will never descend".into());
        }
        if self.timing.tick_ms > 100 {
            w.push(format!(
                "timing.tick_ms {} is slow; play will feel sluggish",
                self.timing.tick_ms
            ));
        }
        w
    }
}
