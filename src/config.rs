//! Game configuration loaded from TOML.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::provider::GameMode;

/// Fewest cast photos a cast-reveal subject may have.
const MIN_CAST_WITH_PHOTOS: usize = 6;

/// Most candidates one selection pass may examine.
const MAX_SELECTION_ATTEMPTS: usize = 10;

/// Tunables shared by both session engines.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Content language passed to the provider.
    #[serde(default = "default_language")]
    language: String,

    /// Pool the cast-reveal engine draws from.
    #[serde(default)]
    mode: GameMode,

    /// Maximum cast clues per round.
    #[serde(default = "default_reveal_budget")]
    reveal_budget: u32,

    /// Cast members with photos a subject needs to be playable.
    #[serde(default = "default_min_cast_with_photos")]
    min_cast_with_photos: usize,

    /// Candidates examined before the pool is refilled.
    #[serde(default = "default_max_selection_attempts")]
    max_selection_attempts: usize,

    /// Round results kept in history.
    #[serde(default = "default_history_limit")]
    history_limit: usize,

    /// Filmography countdown in seconds; 0 disables it.
    #[serde(default = "default_time_limit_secs")]
    time_limit_secs: u32,

    /// Seed for subject selection; random when absent.
    #[serde(default)]
    seed: Option<u64>,
}

#[instrument]
fn default_language() -> String {
    "en-US".to_string()
}

#[instrument]
fn default_reveal_budget() -> u32 {
    6
}

#[instrument]
fn default_min_cast_with_photos() -> usize {
    MIN_CAST_WITH_PHOTOS
}

#[instrument]
fn default_max_selection_attempts() -> usize {
    MAX_SELECTION_ATTEMPTS
}

#[instrument]
fn default_history_limit() -> usize {
    50
}

#[instrument]
fn default_time_limit_secs() -> u32 {
    180
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            mode: GameMode::default(),
            reveal_budget: default_reveal_budget(),
            min_cast_with_photos: default_min_cast_with_photos(),
            max_selection_attempts: default_max_selection_attempts(),
            history_limit: default_history_limit(),
            time_limit_secs: default_time_limit_secs(),
            seed: None,
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(mode = %config.mode, language = %config.language, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Countdown for filmography rounds, if enabled.
    pub fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(u64::from(self.time_limit_secs)))
    }

    /// Sets the pool mode.
    pub fn with_mode(mut self, mode: GameMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the countdown in seconds; 0 disables it.
    pub fn with_time_limit_secs(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets the selection seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the reveal budget.
    pub fn with_reveal_budget(mut self, budget: u32) -> Self {
        self.reveal_budget = budget;
        self
    }

    #[instrument(skip(self))]
    fn validate(&self) -> Result<(), ConfigError> {
        if self.reveal_budget == 0 {
            return Err(ConfigError::new("reveal_budget must be at least 1".to_string()));
        }
        if self.min_cast_with_photos < MIN_CAST_WITH_PHOTOS {
            return Err(ConfigError::new(format!(
                "min_cast_with_photos must be at least {}",
                MIN_CAST_WITH_PHOTOS
            )));
        }
        if !(1..=MAX_SELECTION_ATTEMPTS).contains(&self.max_selection_attempts) {
            return Err(ConfigError::new(format!(
                "max_selection_attempts must be between 1 and {}",
                MAX_SELECTION_ATTEMPTS
            )));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::new("language must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
