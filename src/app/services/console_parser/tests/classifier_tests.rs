//! Tests for line classification

use super::*;
use crate::app::models::RecordKind;
use crate::app::services::console_parser::classifier::{LineClass, NoiseReason, classify};

#[test]
fn test_battery_row_is_data() {
    assert_eq!(classify(BATTERY_ROW, RecordKind::Battery), LineClass::Data);
    assert_eq!(
        classify("   0   3312   0   250", RecordKind::Battery),
        LineClass::Data
    );
}

#[test]
fn test_battery_requires_two_numeric_tokens() {
    assert_eq!(
        classify("5 Absentish", RecordKind::Battery),
        LineClass::Noise(NoiseReason::Absent)
    );
    assert_eq!(
        classify("5 abc 0 301", RecordKind::Battery),
        LineClass::Noise(NoiseReason::NoNumericPrefix)
    );
    assert_eq!(
        classify("5", RecordKind::Battery),
        LineClass::Noise(NoiseReason::NoNumericPrefix)
    );
}

#[test]
fn test_power_requires_only_index() {
    assert_eq!(classify(POWER_ROW, RecordKind::Power), LineClass::Data);
    assert_eq!(classify("4 - - -", RecordKind::Power), LineClass::Data);
    assert_eq!(
        classify("Power Volt Curr", RecordKind::Power),
        LineClass::Noise(NoiseReason::NoNumericPrefix)
    );
}

#[test]
fn test_absent_is_always_noise() {
    let absent = "2     -      -      -      -      -      -      -      Absent   -";
    assert_eq!(
        classify(absent, RecordKind::Power),
        LineClass::Noise(NoiseReason::Absent)
    );

    // Even a row that would otherwise be a complete data row
    let padded = format!("{} Absent", POWER_ROW);
    assert_eq!(
        classify(&padded, RecordKind::Power),
        LineClass::Noise(NoiseReason::Absent)
    );
}

#[test]
fn test_blank_lines_are_noise() {
    for line in ["", "   ", "\t \t"] {
        assert_eq!(
            classify(line, RecordKind::Battery),
            LineClass::Noise(NoiseReason::Blank)
        );
        assert_eq!(
            classify(line, RecordKind::Power),
            LineClass::Noise(NoiseReason::Blank)
        );
    }
}

#[test]
fn test_console_chrome_is_noise() {
    for line in ["@", "$$", "pylon>", "Command completed successfully"] {
        assert!(!classify(line, RecordKind::Battery).is_data());
        assert!(!classify(line, RecordKind::Power).is_data());
    }
}
