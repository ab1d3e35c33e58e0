//! # Driver Configuration
//!
//! Polling windows for every mailbox command family, retry budgets for the
//! state machine and the errata switches. Defaults match the constants in
//! [`crate::constants`]; a JSON file can override any subset of them.
//!
//! ```rust
//! use adrv9001_radio::config::RadioConfig;
//!
//! let config = RadioConfig::from_json_str(r#"{
//!     "timeouts": { "carrier_set": { "interval_us": 500, "timeout_us": 8000000 } },
//!     "errata": { "rx_recapture_after_prime": false }
//! }"#).unwrap();
//! assert_eq!(config.timeouts.carrier_set.attempts(), 16_000);
//! assert_eq!(config.disable_rf_tries_to_primed, 5);
//! ```

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// One bounded polling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_us: u64,
    pub timeout_us: u64,
}

impl PollConfig {
    pub const fn new(interval_us: u64, timeout_us: u64) -> Self {
        Self {
            interval_us,
            timeout_us,
        }
    }

    /// Number of status reads this window allows, never less than one
    pub fn attempts(&self) -> u64 {
        if self.interval_us == 0 {
            return 1;
        }
        self.timeout_us.div_ceil(self.interval_us).max(1)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_micros(self.interval_us)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_micros(self.timeout_us)
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.interval_us == 0 {
            return Err(ConfigError::Invalid(format!("{name}.interval_us must be > 0")));
        }
        if self.timeout_us < self.interval_us {
            return Err(ConfigError::Invalid(format!(
                "{name}.timeout_us ({}) shorter than interval_us ({})",
                self.timeout_us, self.interval_us
            )));
        }
        Ok(())
    }
}

/// Polling windows, one per command family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandTimeouts {
    /// Enablement delay configure/inspect
    pub default: PollConfig,
    pub carrier_set: PollConfig,
    pub carrier_get: PollConfig,
    pub loop_filter_set: PollConfig,
    pub loop_filter_get: PollConfig,
    /// Prime, un-prime, power up and power down
    pub radio_on_off: PollConfig,
}

impl Default for CommandTimeouts {
    fn default() -> Self {
        Self {
            default: PollConfig::new(DEFAULT_INTERVAL_US, DEFAULT_TIMEOUT_US),
            carrier_set: PollConfig::new(
                SETCARRIER_FREQUENCY_INTERVAL_US,
                SETCARRIER_FREQUENCY_TIMEOUT_US,
            ),
            carrier_get: PollConfig::new(
                GETCARRIER_FREQUENCY_INTERVAL_US,
                GETCARRIER_FREQUENCY_TIMEOUT_US,
            ),
            loop_filter_set: PollConfig::new(SETLOOPFILTER_INTERVAL_US, SETLOOPFILTER_TIMEOUT_US),
            loop_filter_get: PollConfig::new(GETLOOPFILTER_INTERVAL_US, GETLOOPFILTER_TIMEOUT_US),
            radio_on_off: PollConfig::new(RADIOONOFF_INTERVAL_US, RADIOONOFF_TIMEOUT_US),
        }
    }
}

/// Firmware workaround switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrataConfig {
    /// Cycle RF on an enabled RX channel after its paired TX channel is primed
    pub rx_recapture_after_prime: bool,
}

impl Default for ErrataConfig {
    fn default() -> Self {
        Self {
            rx_recapture_after_prime: true,
        }
    }
}

/// Complete driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    pub timeouts: CommandTimeouts,
    pub disable_rf_tries_to_primed: u8,
    pub disable_rf_tries_to_calibrated: u8,
    pub errata: ErrataConfig,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            timeouts: CommandTimeouts::default(),
            disable_rf_tries_to_primed: DISABLE_RF_TRIES_TO_PRIMED,
            disable_rf_tries_to_calibrated: DISABLE_RF_TRIES_TO_CALIBRATED,
            errata: ErrataConfig::default(),
        }
    }
}

impl RadioConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RadioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timeouts;
        t.default.validate("default")?;
        t.carrier_set.validate("carrier_set")?;
        t.carrier_get.validate("carrier_get")?;
        t.loop_filter_set.validate("loop_filter_set")?;
        t.loop_filter_get.validate("loop_filter_get")?;
        t.radio_on_off.validate("radio_on_off")?;
        if self.disable_rf_tries_to_primed == 0 || self.disable_rf_tries_to_calibrated == 0 {
            return Err(ConfigError::Invalid(
                "disable_rf_tries_* must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
