//! # Sample Configuration
//!
//! One TOML document configures both halves of the demo:
//!
//! ```toml
//! [tracker]
//! poll_interval_ms = 5000
//!
//! [kitchen]
//! prep_time_per_order_secs = 300
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use order_tracker::{ConfigError, TrackerConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    /// Preparation slot charged for every queued order.
    pub prep_time_per_order_secs: u64,
    pub channel_capacity: usize,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            prep_time_per_order_secs: 300,
            channel_capacity: 32,
        }
    }
}

impl KitchenConfig {
    pub fn prep_time_per_order(&self) -> Duration {
        Duration::from_secs(self.prep_time_per_order_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channel_capacity == 0 {
            return Err(ConfigError::Validation(
                "channel_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    pub tracker: TrackerConfig,
    pub kitchen: KitchenConfig,
}

impl SampleConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)?.parse()
    }
}

impl FromStr for SampleConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: SampleConfig = toml::from_str(s)?;
        config.tracker.validate()?;
        config.kitchen.validate()?;
        Ok(config)
    }
}
