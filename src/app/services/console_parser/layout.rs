//! Token position tables for the console record kinds
//!
//! Each record kind is described by an ordered table of [`FieldSpec`]s mapping
//! a token position to a field name, a decoder and a failure policy. The
//! minimum token count of a kind is the end of its furthest field.

use serde::Serialize;

use super::field_parsers::{
    parse_capacity, parse_integer, parse_pass_through, parse_percentage, parse_state,
};
use crate::app::models::BaseState;
use crate::{Error, Result};

/// Decoder applied to a field's token(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoder {
    Integer,
    Percentage,
    /// Value token followed by a unit token
    Capacity,
    State,
    PassThrough,
}

impl Decoder {
    /// Number of consecutive tokens the decoder consumes
    pub const fn width(&self) -> usize {
        match self {
            Decoder::Capacity => 2,
            _ => 1,
        }
    }
}

/// What happens when a field fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The whole row is discarded
    DropRecord,
    /// The field is replaced by the sentinel and the record kept
    Sentinel,
    /// The decoder cannot fail
    Infallible,
}

/// Decoded value of a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i32),
    Percentage(i8),
    Capacity(i32),
    State(BaseState),
    Text(String),
}

/// One entry of a record layout table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub position: usize,
    pub name: &'static str,
    pub decoder: Decoder,
    pub policy: FailurePolicy,
}

impl FieldSpec {
    const fn new(
        position: usize,
        name: &'static str,
        decoder: Decoder,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            position,
            name,
            decoder,
            policy,
        }
    }

    const fn critical(position: usize, name: &'static str) -> Self {
        Self::new(position, name, Decoder::Integer, FailurePolicy::DropRecord)
    }

    const fn status(position: usize, name: &'static str) -> Self {
        Self::new(position, name, Decoder::PassThrough, FailurePolicy::Infallible)
    }

    /// Index one past the last token this field reads
    pub const fn end(&self) -> usize {
        self.position + self.decoder.width()
    }

    /// Apply this field's decoder to its token(s) within a row
    pub fn decode(&self, tokens: &[&str]) -> Result<FieldValue> {
        let token = self.token(tokens, 0)?;

        match self.decoder {
            Decoder::Integer => parse_integer(token, self.name).map(FieldValue::Integer),
            Decoder::Percentage => parse_percentage(token, self.name).map(FieldValue::Percentage),
            Decoder::Capacity => {
                let unit = self.token(tokens, 1)?;
                parse_capacity(token, unit, self.name).map(FieldValue::Capacity)
            }
            Decoder::State => Ok(FieldValue::State(parse_state(token))),
            Decoder::PassThrough => Ok(FieldValue::Text(parse_pass_through(token))),
        }
    }

    fn token<'a>(&self, tokens: &[&'a str], offset: usize) -> Result<&'a str> {
        tokens.get(self.position + offset).copied().ok_or_else(|| {
            Error::field_decode(
                self.name,
                "",
                format!("no token at position {}", self.position + offset),
            )
        })
    }
}

/// Column layout of a `bat` row:
/// `Battery Volt Curr Tempr Base.St Volt.St Curr.St Temp.St SOC Coulomb BAL`
pub mod battery {
    use super::{Decoder, FailurePolicy, FieldSpec};

    pub const ID: FieldSpec = FieldSpec::critical(0, "BAT ID");
    pub const VOLT: FieldSpec = FieldSpec::critical(1, "BAT Volt");
    pub const CURR: FieldSpec = FieldSpec::critical(2, "BAT Curr");
    pub const TEMP: FieldSpec = FieldSpec::critical(3, "BAT Temp");
    pub const BASE_STATE: FieldSpec =
        FieldSpec::new(4, "BAT Base.St", Decoder::State, FailurePolicy::Infallible);
    pub const VOLT_STATE: FieldSpec = FieldSpec::status(5, "BAT Volt.St");
    pub const CURR_STATE: FieldSpec = FieldSpec::status(6, "BAT Curr.St");
    pub const TEMP_STATE: FieldSpec = FieldSpec::status(7, "BAT Temp.St");
    pub const SOC: FieldSpec =
        FieldSpec::new(8, "BAT SOC", Decoder::Percentage, FailurePolicy::Sentinel);
    pub const COULOMB: FieldSpec =
        FieldSpec::new(9, "BAT Coulomb", Decoder::Capacity, FailurePolicy::Sentinel);
    pub const BAL: FieldSpec = FieldSpec::status(11, "BAT BAL");

    pub const FIELDS: &[FieldSpec] = &[
        ID, VOLT, CURR, TEMP, BASE_STATE, VOLT_STATE, CURR_STATE, TEMP_STATE, SOC, COULOMB, BAL,
    ];

    pub const MIN_TOKENS: usize = crate::constants::BATTERY_MIN_TOKENS;
}

/// Column layout of a `pwr` row:
/// `Power Volt Curr Tempr Tlow Thigh Vlow Vhigh Base.St Volt.St Curr.St Temp.St
/// Coulomb Time B.V.St B.T.St MosTempr M.T.St`
///
/// Positions 4-7 (cell extremes) and 13-14 (date and time) are not read.
pub mod power {
    use super::{Decoder, FailurePolicy, FieldSpec};

    pub const ID: FieldSpec = FieldSpec::critical(0, "PWR ID");
    pub const VOLT: FieldSpec = FieldSpec::critical(1, "PWR Volt");
    pub const CURR: FieldSpec = FieldSpec::critical(2, "PWR Curr");
    pub const TEMP: FieldSpec = FieldSpec::critical(3, "PWR Temp");
    pub const BASE_STATE: FieldSpec =
        FieldSpec::new(8, "PWR Base.St", Decoder::State, FailurePolicy::Infallible);
    pub const VOLT_STATE: FieldSpec = FieldSpec::status(9, "PWR Volt.St");
    pub const CURR_STATE: FieldSpec = FieldSpec::status(10, "PWR Curr.St");
    pub const TEMP_STATE: FieldSpec = FieldSpec::status(11, "PWR Temp.St");
    /// Printed as a charge percentage on this table, stored as the record's coulomb
    pub const COULOMB: FieldSpec =
        FieldSpec::new(12, "PWR Coulomb", Decoder::Percentage, FailurePolicy::Sentinel);
    pub const BV_STATE: FieldSpec = FieldSpec::status(15, "PWR B.V.St");
    pub const BT_STATE: FieldSpec = FieldSpec::status(16, "PWR B.T.St");
    pub const MOS_TEMP: FieldSpec = FieldSpec::status(17, "PWR MosTempr");
    pub const MT_STATE: FieldSpec = FieldSpec::status(18, "PWR M.T.St");

    pub const FIELDS: &[FieldSpec] = &[
        ID, VOLT, CURR, TEMP, BASE_STATE, VOLT_STATE, CURR_STATE, TEMP_STATE, COULOMB, BV_STATE,
        BT_STATE, MOS_TEMP, MT_STATE,
    ];

    pub const MIN_TOKENS: usize = crate::constants::POWER_MIN_TOKENS;
}

/// Index one past the furthest token any field in `fields` reads
pub const fn furthest_end(fields: &[FieldSpec]) -> usize {
    let mut end = 0;
    let mut i = 0;
    while i < fields.len() {
        if fields[i].end() > end {
            end = fields[i].end();
        }
        i += 1;
    }
    end
}

// A row that passes the token minimum can always reach every field
const _: () = assert!(furthest_end(battery::FIELDS) <= battery::MIN_TOKENS);
const _: () = assert!(furthest_end(power::FIELDS) <= power::MIN_TOKENS);
