//! Configuration management and validation.
//!
//! Provides the exporter configuration: device location, scrape cadence,
//! metric naming, and the caller-supplied convention that maps a battery
//! unit number to its console command and metric label.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::constants::{
    DEFAULT_BAT_COMMAND_FORMAT, DEFAULT_BAT_LABEL_FORMAT, DEFAULT_DEVICE_PORT,
    DEFAULT_METRICS_PORT, DEFAULT_NAMESPACE, DEFAULT_POWER_COMMAND, DEFAULT_REFRESH_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, UNIT_PLACEHOLDER,
};
use crate::{Error, Result};

/// Mapping from a 1-based battery unit number to its command and label
///
/// The console firmware has used more than one numbering scheme, so the
/// exporter does not assume one. `{unit}` in either format is replaced by
/// the unit number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitNaming {
    /// Console command per unit, e.g. `bat+{unit}`
    pub command_format: String,

    /// Metric label per unit, e.g. `bat{unit}`
    pub label_format: String,
}

impl UnitNaming {
    pub fn command(&self, unit: usize) -> String {
        self.command_format
            .replace(UNIT_PLACEHOLDER, &unit.to_string())
    }

    pub fn label(&self, unit: usize) -> String {
        self.label_format.replace(UNIT_PLACEHOLDER, &unit.to_string())
    }

    fn validate(&self) -> Result<()> {
        if self.command_format.trim().is_empty() {
            return Err(Error::configuration(
                "Battery command format must not be empty",
            ));
        }

        // Every unit must get its own label or the gauges collide
        if !self.label_format.contains(UNIT_PLACEHOLDER) {
            return Err(Error::configuration(format!(
                "Battery label format '{}' must contain {}",
                self.label_format, UNIT_PLACEHOLDER
            )));
        }

        Ok(())
    }
}

impl Default for UnitNaming {
    fn default() -> Self {
        Self {
            command_format: DEFAULT_BAT_COMMAND_FORMAT.to_string(),
            label_format: DEFAULT_BAT_LABEL_FORMAT.to_string(),
        }
    }
}

/// Exporter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Host name or address of the console bridge
    pub device_ip: String,

    /// HTTP port of the console bridge
    pub device_port: u16,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Port the `/metrics` endpoint listens on
    pub metrics_port: u16,

    /// Seconds between scrape cycles
    pub refresh_secs: u64,

    /// Prometheus namespace prefixed to every metric
    pub namespace: String,

    /// Console command returning the power-supply table
    pub power_command: String,

    /// Battery unit command/label convention
    pub unit_naming: UnitNaming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_ip: String::new(),
            device_port: DEFAULT_DEVICE_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            metrics_port: DEFAULT_METRICS_PORT,
            refresh_secs: DEFAULT_REFRESH_SECS,
            namespace: DEFAULT_NAMESPACE.to_string(),
            power_command: DEFAULT_POWER_COMMAND.to_string(),
            unit_naming: UnitNaming::default(),
        }
    }
}

impl Config {
    /// Scrape interval as a duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.device_ip.trim().is_empty() {
            return Err(Error::configuration("DEVICE_IP not set"));
        }

        if self.refresh_secs < 1 {
            return Err(Error::configuration(format!(
                "Invalid refresh interval {}s, must be at least 1",
                self.refresh_secs
            )));
        }

        if self.request_timeout_secs < 1 {
            return Err(Error::configuration(
                "Request timeout must be at least 1 second",
            ));
        }

        if !is_valid_namespace(&self.namespace) {
            return Err(Error::configuration(format!(
                "Invalid Prometheus namespace '{}'",
                self.namespace
            )));
        }

        if self.power_command.trim().is_empty() {
            return Err(Error::configuration("Power command must not be empty"));
        }

        self.unit_naming.validate()?;

        debug!("Configuration validated: {:?}", self);
        Ok(())
    }
}

/// Prometheus metric name rules: `[a-zA-Z_:][a-zA-Z0-9_:]*`
fn is_valid_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
