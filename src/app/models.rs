//! Core data models for console records
//!
//! This module defines the typed records produced by the console parser,
//! the operating-mode enumeration shared by both record kinds, and the
//! helpers that map degraded fields back to their wire sentinels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{SENTINEL, balance, base_state};

/// The two line layouts emitted by the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Per-cell rows from the `bat` command
    Battery,
    /// Per-module rows from the `pwr` command
    Power,
}

impl RecordKind {
    /// Short prefix used for error counter types
    pub fn metric_prefix(&self) -> &'static str {
        match self {
            RecordKind::Battery => "bat",
            RecordKind::Power => "pwr",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Battery => write!(f, "BAT"),
            RecordKind::Power => write!(f, "PWR"),
        }
    }
}

/// Operating mode reported in the `Base.St` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaseState {
    Charge,
    Discharge,
    Idle,
    Balance,
    /// Any other token, including `N/A`
    Unknown,
}

impl BaseState {
    /// Numeric code published on the `base_state` gauges
    pub fn code(&self) -> i8 {
        match self {
            BaseState::Charge => base_state::CHARGE,
            BaseState::Discharge => base_state::DISCHARGE,
            BaseState::Idle => base_state::IDLE,
            BaseState::Balance => base_state::BALANCE,
            BaseState::Unknown => base_state::UNKNOWN,
        }
    }
}

/// A single cell row from the `bat` command
///
/// `soc` and `coulomb` are `None` when the console value could not be
/// decoded. Consumers expecting the wire convention use
/// [`BatteryRecord::soc_or_sentinel`] and [`BatteryRecord::coulomb_or_sentinel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryRecord {
    /// Cell index, unique within one scrape of one unit
    pub id: i32,
    /// Voltage in mV
    pub volt: i32,
    /// Current in mA
    pub curr: i32,
    /// Temperature in tenths of a degree Celsius
    pub temp: i32,
    pub base_state: BaseState,
    pub volt_state: String,
    pub curr_state: String,
    pub temp_state: String,
    /// State of charge in percent
    pub soc: Option<i8>,
    /// Remaining capacity in mAh
    pub coulomb: Option<i32>,
    /// Balance channel bitmask, or `Y`/`N`
    pub bal: String,
}

impl BatteryRecord {
    /// SOC with `-1` standing in for a failed decode
    pub fn soc_or_sentinel(&self) -> i8 {
        self.soc.unwrap_or(SENTINEL as i8)
    }

    /// Capacity with `-1` standing in for a failed decode
    pub fn coulomb_or_sentinel(&self) -> i32 {
        self.coulomb.unwrap_or(SENTINEL)
    }

    /// Number of balancing channels currently active
    pub fn active_balance_channels(&self) -> usize {
        match self.bal.as_str() {
            balance::ACTIVE => 1,
            "" | balance::INACTIVE => 0,
            mask => mask.chars().filter(|c| *c == '1').count(),
        }
    }

    /// True when any supplementary field was replaced by a sentinel
    pub fn is_degraded(&self) -> bool {
        self.soc.is_none() || self.coulomb.is_none()
    }
}

/// A single module row from the `pwr` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerRecord {
    /// Power module index
    pub id: i32,
    /// Voltage in mV
    pub volt: i32,
    /// Current in mA
    pub curr: i32,
    /// Board temperature in tenths of a degree Celsius
    pub temp: i32,
    pub base_state: BaseState,
    pub volt_state: String,
    pub curr_state: String,
    pub temp_state: String,
    /// The console's `Coulomb` column, which on this table is a charge
    /// percentage rather than a capacity
    pub coulomb: Option<i8>,
    pub bv_state: String,
    pub bt_state: String,
    /// MOS temperature token as printed; unit conversion is left to the consumer
    pub mos_temp: String,
    pub mt_state: String,
}

impl PowerRecord {
    /// Charge percentage with `-1` standing in for a failed decode
    pub fn coulomb_or_sentinel(&self) -> i8 {
        self.coulomb.unwrap_or(SENTINEL as i8)
    }

    /// True when the charge percentage was replaced by a sentinel
    pub fn is_degraded(&self) -> bool {
        self.coulomb.is_none()
    }
}
