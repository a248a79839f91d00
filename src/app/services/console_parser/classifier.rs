//! Line classification for console dumps
//!
//! Console output intermixes section headers, blank separators, prompts and
//! data rows. Rather than carrying a grammar for the headers, a line counts as
//! data when it starts with the numeric prefix its record kind always has.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::app::models::RecordKind;
use crate::constants::ABSENT_MARKER;

/// Cell rows start with the cell index followed by the voltage
static BATTERY_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+\d+").expect("battery prefix pattern is valid"));

/// Power rows only need the module index; the section may hold marker rows
static POWER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+").expect("power prefix pattern is valid"));

/// Outcome of classifying one raw line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    Data,
    Noise(NoiseReason),
}

/// Why a line was not treated as a data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseReason {
    Blank,
    /// The console marks an unpopulated slot with `Absent`
    Absent,
    /// Headers, prompts and anything else without the numeric prefix
    NoNumericPrefix,
}

impl NoiseReason {
    pub fn describe(&self) -> &'static str {
        match self {
            NoiseReason::Blank => "blank line",
            NoiseReason::Absent => "absent device",
            NoiseReason::NoNumericPrefix => "no numeric prefix",
        }
    }
}

/// Classify a raw line for the given record kind
pub fn classify(line: &str, kind: RecordKind) -> LineClass {
    let trimmed = line.trim();

    if trimmed.is_empty() {
        return LineClass::Noise(NoiseReason::Blank);
    }

    if trimmed.contains(ABSENT_MARKER) {
        return LineClass::Noise(NoiseReason::Absent);
    }

    let prefix = match kind {
        RecordKind::Battery => &BATTERY_PREFIX,
        RecordKind::Power => &POWER_PREFIX,
    };

    if prefix.is_match(trimmed) {
        LineClass::Data
    } else {
        LineClass::Noise(NoiseReason::NoNumericPrefix)
    }
}

impl LineClass {
    pub fn is_data(&self) -> bool {
        matches!(self, LineClass::Data)
    }
}
