//! Configuration file loading for game sessions.
//!
//! Settings live in `chess.toml` in the working directory. Every field has a
//! default, so a missing file yields a usable untimed configuration.

use chess_core::PieceKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when loading or using the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// An engine was needed but no `[engine]` table is configured.
    #[error("No engine configured")]
    MissingEngine,
}

/// A UCI engine used as a computer opponent.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Path to the engine executable.
    pub path: PathBuf,
    /// Thinking time per move. Defaults to 500 ms.
    #[serde(default = "default_move_time_ms")]
    pub move_time_ms: u64,
}

impl EngineConfig {
    pub fn move_time(&self) -> Duration {
        Duration::from_millis(self.move_time_ms)
    }
}

fn default_move_time_ms() -> u64 {
    500
}

/// Piece a pawn promotes to when a move arrives without one.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromotionPiece {
    #[default]
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    pub const fn kind(self) -> PieceKind {
        match self {
            PromotionPiece::Queen => PieceKind::Queen,
            PromotionPiece::Rook => PieceKind::Rook,
            PromotionPiece::Bishop => PieceKind::Bishop,
            PromotionPiece::Knight => PieceKind::Knight,
        }
    }
}

/// Session configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Starting time per side in seconds. Absent means untimed.
    #[serde(default)]
    pub time_control_secs: Option<u64>,
    /// Clock driver period in milliseconds. Defaults to 100.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub engine: Option<EngineConfig>,
    #[serde(default)]
    pub auto_promote: PromotionPiece,
}

fn default_tick_interval_ms() -> u64 {
    100
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            time_control_secs: None,
            tick_interval_ms: default_tick_interval_ms(),
            engine: None,
            auto_promote: PromotionPiece::default(),
        }
    }
}

impl SessionConfig {
    /// Loads `chess.toml` from the working directory, or defaults if it
    /// does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::config_path())
    }

    /// Loads the configuration at `path`, or defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("chess.toml")
    }

    pub fn time_control(&self) -> Option<Duration> {
        self.time_control_secs.map(Duration::from_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Returns the engine settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEngine`] if no engine is configured.
    pub fn engine(&self) -> Result<&EngineConfig, ConfigError> {
        self.engine.as_ref().ok_or(ConfigError::MissingEngine)
    }
}
