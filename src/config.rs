//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{LinkError, Result};

/// Space plus six hex digits appended to the prefix
const DEVICE_NAME_SUFFIX_LEN: usize = 7;

/// Room left for the complete local name in a 31-byte legacy advertising
/// packet after its two-byte AD header
const MAX_ADVERTISED_NAME_LEN: usize = 29;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ble: BleConfig,
    #[serde(default)]
    pub link: LinkConfig,
}

/// BLE peripheral configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BleConfig {
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    #[serde(default = "default_device_info")]
    pub device_info: String,

    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    #[serde(default = "default_adv_min_preferred")]
    pub adv_min_preferred: u16,

    #[serde(default = "default_adv_max_preferred")]
    pub adv_max_preferred: u16,
}

/// Flight loop publish rates used by the host binary
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LinkConfig {
    #[serde(default = "default_rc_rate_hz")]
    pub rc_rate_hz: u32,

    #[serde(default = "default_telemetry_interval_ms")]
    pub telemetry_interval_ms: u64,
}

// Default value functions
fn default_name_prefix() -> String { "Extreme-Pilot".to_string() }
fn default_device_info() -> String { "ExpressLRS-3.5.6-Extreme".to_string() }
fn default_lock_timeout_ms() -> u64 { 10 }
fn default_heartbeat_interval_ms() -> u64 { 10_000 }
fn default_adv_min_preferred() -> u16 { 0x06 }
fn default_adv_max_preferred() -> u16 { 0x12 }

fn default_rc_rate_hz() -> u32 { 50 }
fn default_telemetry_interval_ms() -> u64 { 100 }

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            device_info: default_device_info(),
            lock_timeout_ms: default_lock_timeout_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            adv_min_preferred: default_adv_min_preferred(),
            adv_max_preferred: default_adv_max_preferred(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            rc_rate_hz: default_rc_rate_hz(),
            telemetry_interval_ms: default_telemetry_interval_ms(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ble: BleConfig::default(),
            link: LinkConfig::default(),
        }
    }
}

impl BleConfig {
    /// Bounded wait used for every publish-side lock acquisition
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// Minimum spacing between two heartbeat messages
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing sections and keys fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use extreme_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if self.ble.name_prefix.trim().is_empty() {
            return Err(invalid("name_prefix cannot be empty"));
        }

        if self.ble.device_info.is_empty() {
            return Err(invalid("device_info cannot be empty"));
        }

        if self.ble.name_prefix.len() + DEVICE_NAME_SUFFIX_LEN > MAX_ADVERTISED_NAME_LEN {
            return Err(invalid(&format!(
                "name_prefix must be at most {} bytes",
                MAX_ADVERTISED_NAME_LEN - DEVICE_NAME_SUFFIX_LEN
            )));
        }

        if self.ble.lock_timeout_ms == 0 || self.ble.lock_timeout_ms > 1000 {
            return Err(invalid("lock_timeout_ms must be between 1 and 1000"));
        }

        if self.ble.heartbeat_interval_ms == 0 || self.ble.heartbeat_interval_ms > 600_000 {
            return Err(invalid("heartbeat_interval_ms must be between 1 and 600000"));
        }

        if self.ble.adv_min_preferred == 0 {
            return Err(invalid("adv_min_preferred must be greater than 0"));
        }

        if self.ble.adv_min_preferred > self.ble.adv_max_preferred {
            return Err(invalid("adv_min_preferred must not exceed adv_max_preferred"));
        }

        if ![25, 50, 100, 150, 250].contains(&self.link.rc_rate_hz) {
            return Err(invalid("rc_rate_hz must be one of: 25, 50, 100, 150, 250"));
        }

        if self.link.telemetry_interval_ms == 0 || self.link.telemetry_interval_ms > 60_000 {
            return Err(invalid("telemetry_interval_ms must be between 1 and 60000"));
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> LinkError {
    LinkError::Config(toml::de::Error::custom(msg))
}
