//! Line-record parser for Pylontech console output
//!
//! This module turns the loosely structured, whitespace-delimited text printed
//! by the `bat` and `pwr` console commands into typed records. It is a pure
//! function of its input lines: no I/O, no shared state, safe to call from
//! several scrape cycles at once.
//!
//! ## Architecture
//!
//! The parser is organized into logical components:
//! - [`classifier`] - Decides whether a raw line is a data row or noise
//! - [`tokenizer`] - Splits a data row into positional tokens
//! - [`field_parsers`] - Per-domain decoders with their failure policies
//! - [`layout`] - Token position tables for each record kind
//! - [`record_parser`] - Assembles one record from one tokenized row
//! - [`parser`] - Batch driver producing records plus diagnostics
//! - [`stats`] - Diagnostic events, counters and result structures
//!
//! ## Usage
//!
//! ```rust
//! use pylontech_exporter::app::services::console_parser::parse_battery_lines;
//!
//! let lines = vec![
//!     "Battery  Volt  Curr  Tempr  Base.St  Volt.St  Curr.St  Temp.St  SOC  Coulomb  BAL",
//!     "0  3312  0  250  Idle  Normal  Normal  Normal  87%  43500 mAH  N",
//! ];
//! let result = parse_battery_lines(&lines);
//!
//! assert_eq!(result.records.len(), 1);
//! assert_eq!(result.stats.error_count(), 0);
//! ```

pub mod classifier;
pub mod field_parsers;
pub mod layout;
pub mod parser;
pub mod record_parser;
pub mod stats;
pub mod tokenizer;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use classifier::{LineClass, NoiseReason, classify};
pub use parser::{parse_battery_lines, parse_lines, parse_power_lines};
pub use record_parser::{Assembled, ConsoleRecord};
pub use stats::{DiagnosticCounter, DiagnosticKind, LineDiagnostic, ParseResult, ParseStats};
