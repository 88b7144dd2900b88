//! # Tracker Configuration
//!
//! Timing and presentation knobs for order tracking. Every field has a default,
//! so an empty TOML document (or [`TrackerConfig::default`]) is a valid
//! configuration:
//!
//! ```toml
//! poll_interval_ms = 5000
//! countdown_tick_ms = 1000
//! summary_interval_ms = 5000
//! vibration_pattern_ms = [200, 100, 200]
//! fallback_destination = "your location"
//! ```

use crate::notifier::{DEFAULT_FALLBACK_DESTINATION, DEFAULT_VIBRATION_PATTERN_MS};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Interval between order-list and queue-position fetches.
    pub poll_interval_ms: u64,
    /// Interval between local countdown recomputations.
    pub countdown_tick_ms: u64,
    /// Interval between kitchen summary fetches.
    pub summary_interval_ms: u64,
    pub vibration_pattern_ms: Vec<u64>,
    /// Used in the "on the way" message when the order has no delivery zone.
    pub fallback_destination: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5_000,
            countdown_tick_ms: 1_000,
            summary_interval_ms: 5_000,
            vibration_pattern_ms: DEFAULT_VIBRATION_PATTERN_MS.to_vec(),
            fallback_destination: DEFAULT_FALLBACK_DESTINATION.to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.countdown_tick_ms == 0 {
            return Err(ConfigError::Validation(
                "countdown_tick_ms must be greater than zero".into(),
            ));
        }
        if self.summary_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "summary_interval_ms must be greater than zero".into(),
            ));
        }
        if self.vibration_pattern_ms.is_empty() {
            return Err(ConfigError::Validation(
                "vibration_pattern_ms must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_millis(self.summary_interval_ms)
    }
}

impl FromStr for TrackerConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: TrackerConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}
