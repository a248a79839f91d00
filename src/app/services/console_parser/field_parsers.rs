//! Field decoding utilities for console rows
//!
//! This module provides the per-domain decoders applied to individual tokens.
//! Each decoder has its own failure policy:
//! - integer, percentage and capacity decoders return an error the caller
//!   either propagates (critical fields) or replaces with a sentinel
//! - the state decoder is total and never fails
//! - the pass-through decoder returns the token unchanged

use crate::app::models::BaseState;
use crate::{Error, Result};

/// Parse a base-10 signed integer field
pub fn parse_integer(token: &str, field_name: &str) -> Result<i32> {
    let trimmed = token.trim();

    trimmed.parse::<i32>().map_err(|e| {
        Error::field_decode(field_name, token, format!("invalid integer ({})", e))
    })
}

/// Parse a percentage such as `85%` or `85` into the signed 8-bit range
pub fn parse_percentage(token: &str, field_name: &str) -> Result<i8> {
    let trimmed = token.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let value = parse_integer(digits, field_name)?;

    i8::try_from(value).map_err(|_| {
        Error::field_decode(
            field_name,
            token,
            format!("percentage {} is outside {}..={}", value, i8::MIN, i8::MAX),
        )
    })
}

/// Parse a capacity given as a value token followed by a unit token
///
/// The unit (normally `mAH`) is accepted but not checked.
pub fn parse_capacity(value: &str, _unit: &str, field_name: &str) -> Result<i32> {
    parse_integer(value, field_name)
}

/// Map a `Base.St` token to its state; unknown tokens map to [`BaseState::Unknown`]
pub fn parse_state(token: &str) -> BaseState {
    match token {
        "Charge" => BaseState::Charge,
        "Dischg" => BaseState::Discharge,
        "Idle" => BaseState::Idle,
        "Balance" => BaseState::Balance,
        _ => BaseState::Unknown,
    }
}

/// Return a qualitative status token unchanged
pub fn parse_pass_through(token: &str) -> String {
    token.to_string()
}
