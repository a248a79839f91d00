//! Application constants for the Pylontech exporter
//!
//! This module contains the console layout constants, default values,
//! and metric naming used throughout the exporter.

// =============================================================================
// Console Record Layout
// =============================================================================

/// Minimum token count for a `bat` row:
/// ID, Volt, Curr, Tempr, Base.St, Volt.St, Curr.St, Temp.St, SOC, Coulomb, unit, BAL
pub const BATTERY_MIN_TOKENS: usize = 12;

/// Minimum token count for a `pwr` row (the highest position read is 18)
pub const POWER_MIN_TOKENS: usize = 19;

/// Marker printed by the console for an empty power slot
pub const ABSENT_MARKER: &str = "Absent";

/// Value substituted for a supplementary field that failed to decode
pub const SENTINEL: i32 = -1;

/// Base state codes as published on the `base_state` gauges
pub mod base_state {
    pub const CHARGE: i8 = 0;
    pub const DISCHARGE: i8 = 1;
    pub const IDLE: i8 = 2;
    pub const BALANCE: i8 = 3;
    pub const UNKNOWN: i8 = -1;
}

/// Balance column placeholders used instead of a channel bitmask
pub mod balance {
    /// Balancing active, no per-channel detail
    pub const ACTIVE: &str = "Y";
    /// Balancing inactive
    pub const INACTIVE: &str = "N";
}

// =============================================================================
// Device Transport Defaults
// =============================================================================

/// Default HTTP port of the console bridge
pub const DEFAULT_DEVICE_PORT: u16 = 80;

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Console command returning the power-supply table
pub const DEFAULT_POWER_COMMAND: &str = "pwr";

/// Placeholder substituted with the 1-based unit number
pub const UNIT_PLACEHOLDER: &str = "{unit}";

/// Default per-unit battery command
pub const DEFAULT_BAT_COMMAND_FORMAT: &str = "bat+{unit}";

/// Default per-unit metric label
pub const DEFAULT_BAT_LABEL_FORMAT: &str = "bat{unit}";

// =============================================================================
// Exporter Defaults
// =============================================================================

/// Default listen port for the metrics endpoint
pub const DEFAULT_METRICS_PORT: u16 = 9100;

/// Default scrape interval in seconds
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Default Prometheus namespace
pub const DEFAULT_NAMESPACE: &str = "default";

/// Unit label used for the power table on the error counter
pub const POWER_UNIT_LABEL: &str = "pwr";

/// Temperatures are reported in tenths of a degree Celsius
pub const TEMPERATURE_DIVISOR: f64 = 10.0;
