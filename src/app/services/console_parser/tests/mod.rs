//! Test utilities and fixtures for console parser testing
//!
//! This module provides captured-style console dumps and row builders
//! used across the parser test modules.

// Test modules
mod classifier_tests;
mod layout_tests;

/// Valid cell row used throughout the tests
pub const BATTERY_ROW: &str =
    "1 3750 0 301 Charge Normal Normal Normal 85% 3450 mAH 0000000000000000";

/// Valid power row with 19 tokens (date and time occupy positions 13-14)
pub const POWER_ROW: &str = "1 49923 -3500 260 240 250 3326 3331 Idle Normal Normal Normal 86% \
                             2023-03-11 14:21:23 Normal Normal 270 Normal";

/// Helper to build a `bat` response the way the console prints it
pub fn create_battery_dump() -> Vec<String> {
    [
        "@",
        "Battery  Volt     Curr     Tempr    Base State   Volt. State  Curr. State  Temp. State  SOC          Coulomb      BAL",
        "0        3312     -1200    250      Dischg       Normal       Normal       Normal       87%          43500 mAH    N",
        "1        3313     -1200    251      Dischg       Normal       Normal       Normal       87%          43510 mAH    N",
        "2        3314     0        249      Balance      Normal       Normal       Normal       88%          43620 mAH    0000000000000101",
        "",
        "Command completed successfully",
        "$$",
        "pylon>",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Helper to build a `pwr` response with one populated and two absent slots
pub fn create_power_dump() -> Vec<String> {
    [
        "@",
        "Power Volt   Curr   Tempr  Tlow   Thigh  Vlow   Vhigh  Base.St  Volt.St  Curr.St  Temp.St  Coulomb  Time                 B.V.St   B.T.St   MosTempr M.T.St",
        "1     49923  -3500  260    240    250    3326   3331   Dischg   Normal   Normal   Normal   86%      2023-03-11 14:21:23  Normal   Normal   270      Normal",
        "2     -      -      -      -      -      -      -      Absent   -        -        -        -        -                    -        -        -        -",
        "3     -      -      -      -      -      -      -      Absent   -        -        -        -        -                    -        -        -        -",
        "Command completed successfully",
        "$$",
        "pylon>",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Helper to tokenize a fixture row
pub fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
