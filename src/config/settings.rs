//! Application settings and configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Cadence of the simulated player's tick, in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Spacing between position reports from the media engine, in milliseconds
    #[serde(default = "default_time_update_interval_ms")]
    pub time_update_interval_ms: u64,
    /// Capacity of the player update broadcast channel
    #[serde(default = "default_update_capacity")]
    pub update_capacity: usize,
    /// Capacity of the host command channel
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
    /// `tracing` filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_time_update_interval_ms() -> u64 {
    250
}

fn default_update_capacity() -> usize {
    64
}

fn default_command_buffer() -> usize {
    32
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Error types for configuration operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            tick_interval_ms: default_tick_interval_ms(),
            time_update_interval_ms: default_time_update_interval_ms(),
            update_capacity: default_update_capacity(),
            command_buffer: default_command_buffer(),
            log_filter: default_log_filter(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("chatplay").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationError("Tick interval must be greater than zero".to_string()));
        }
        if self.time_update_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Time update interval must be greater than zero".to_string(),
            ));
        }
        if self.update_capacity == 0 || self.command_buffer == 0 {
            return Err(ConfigError::ValidationError("Channel capacities must be greater than zero".to_string()));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn time_update_interval(&self) -> Duration {
        Duration::from_millis(self.time_update_interval_ms)
    }
}
