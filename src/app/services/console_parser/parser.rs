//! Batch parsing of console command responses
//!
//! This module drives classification, tokenization and record assembly over
//! the full line sequence of one command response. It never fails: every
//! per-line problem is resolved locally and reported through [`ParseStats`].

use tracing::{debug, warn};

use super::classifier::{LineClass, classify};
use super::record_parser::ConsoleRecord;
use super::stats::{DiagnosticKind, ParseResult, ParseStats};
use super::tokenizer::tokenize;
use crate::Error;
use crate::app::models::{BatteryRecord, PowerRecord};

/// Parse the lines of a `bat` response
pub fn parse_battery_lines<S: AsRef<str>>(lines: &[S]) -> ParseResult<BatteryRecord> {
    parse_lines(lines)
}

/// Parse the lines of a `pwr` response
pub fn parse_power_lines<S: AsRef<str>>(lines: &[S]) -> ParseResult<PowerRecord> {
    parse_lines(lines)
}

/// Parse a command response into records of kind `R`
///
/// Records are returned in input order. Line numbers in diagnostics are
/// 1-based positions in `lines`.
pub fn parse_lines<R, S>(lines: &[S]) -> ParseResult<R>
where
    R: ConsoleRecord,
    S: AsRef<str>,
{
    let kind = R::KIND;
    let mut stats = ParseStats::new();
    let mut records = Vec::new();

    for (index, raw) in lines.iter().enumerate() {
        let line_number = index + 1;
        let line = raw.as_ref().trim();
        stats.total_lines += 1;

        if let LineClass::Noise(reason) = classify(line, kind) {
            stats.push(line_number, DiagnosticKind::Noise { reason });
            continue;
        }
        stats.data_lines += 1;

        let tokens = tokenize(line);
        match R::from_tokens(&tokens) {
            Ok(assembled) => {
                if !assembled.degraded.is_empty() {
                    stats.degraded_records += 1;
                }
                for failure in assembled.degraded {
                    debug!("Degraded {} field on line {}: {}", kind, line_number, failure);
                    let (field, message) = describe_failure(failure);
                    stats.push(line_number, DiagnosticKind::DegradedField { field, message });
                }
                records.push(assembled.record);
                stats.records_parsed += 1;
            }
            Err(Error::IncompleteRow { found, required }) => {
                warn!(
                    "Skipping line {} ({}) due to insufficient fields (got {}, expected at least {}): '{}'",
                    line_number, kind, found, required, line
                );
                stats.push(line_number, DiagnosticKind::Structural { found, required });
            }
            Err(e) => {
                warn!("Error parsing {} line {}: {}. Line: '{}'", kind, line_number, e, line);
                let (field, message) = describe_failure(e);
                stats.push(line_number, DiagnosticKind::CriticalField { field, message });
            }
        }
    }

    if records.is_empty() && stats.data_lines > 0 {
        warn!(
            "No {} records were parsed although {} line(s) looked like data; the console format may have changed",
            kind, stats.data_lines
        );
        stats.empty_batch_warning = true;
    }

    debug!("{} batch: {}", kind, stats.summary());

    ParseResult { records, stats }
}

/// Field name and message of a decode failure
fn describe_failure(error: Error) -> (String, String) {
    let message = error.to_string();
    let field = match error {
        Error::FieldDecode { field, .. } => field,
        _ => "row".to_string(),
    };
    (field, message)
}
