//! Parsing diagnostics and result structures for console batches
//!
//! Per-line problems never fail a batch. They are reported as
//! [`LineDiagnostic`] events and summarized in [`ParseStats`], which the
//! publishing side turns into error-counter increments.

use serde::Serialize;
use std::fmt;

use super::classifier::NoiseReason;

/// What happened to a line that did not yield a clean record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Never resembled a data row; expected, not an error
    Noise { reason: NoiseReason },
    /// A data row with fewer tokens than its layout needs
    Structural { found: usize, required: usize },
    /// An identity or primary reading failed to decode; row dropped
    CriticalField { field: String, message: String },
    /// A supplementary field was replaced by the sentinel; record kept
    DegradedField { field: String, message: String },
}

impl DiagnosticKind {
    /// Whether this event counts towards the error metrics
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::Structural { .. } | DiagnosticKind::CriticalField { .. }
        )
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Noise { reason } => write!(f, "skipped: {}", reason.describe()),
            DiagnosticKind::Structural { found, required } => write!(
                f,
                "insufficient fields (got {}, expected at least {})",
                found, required
            ),
            DiagnosticKind::CriticalField { message, .. } => write!(f, "dropped: {}", message),
            DiagnosticKind::DegradedField { message, .. } => write!(f, "degraded: {}", message),
        }
    }
}

/// A diagnostic tied to its 1-based input line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiagnostic {
    pub line_number: usize,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.kind)
    }
}

/// Named counters exposed to the error-tracking metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCounter {
    /// Lines skipped for having too few tokens
    Structural,
    /// Lines skipped for a critical-field decode failure
    CriticalField,
    /// Data lines were present but no record assembled
    EmptyBatch,
}

impl DiagnosticCounter {
    pub const ALL: [DiagnosticCounter; 3] = [
        DiagnosticCounter::Structural,
        DiagnosticCounter::CriticalField,
        DiagnosticCounter::EmptyBatch,
    ];

    /// Suffix used in the error counter's `type` label
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCounter::Structural => "structural",
            DiagnosticCounter::CriticalField => "critical",
            DiagnosticCounter::EmptyBatch => "empty",
        }
    }
}

/// Statistics for one parsed batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParseStats {
    /// Number of input lines seen
    pub total_lines: usize,

    /// Lines classified as data rows
    pub data_lines: usize,

    /// Records successfully assembled
    pub records_parsed: usize,

    /// Lines skipped as noise (headers, blanks, absent slots)
    pub noise_lines: usize,

    /// Data lines dropped for having too few tokens
    pub skipped_structural: usize,

    /// Data lines dropped for a critical-field decode failure
    pub skipped_critical: usize,

    /// Records kept with at least one sentinel field
    pub degraded_records: usize,

    /// Set when data lines existed but none assembled
    pub empty_batch_warning: bool,

    /// Per-line events in input order
    pub diagnostics: Vec<LineDiagnostic>,
}

impl ParseStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            total_lines: 0,
            data_lines: 0,
            records_parsed: 0,
            noise_lines: 0,
            skipped_structural: 0,
            skipped_critical: 0,
            degraded_records: 0,
            empty_batch_warning: false,
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, line_number: usize, kind: DiagnosticKind) {
        match &kind {
            DiagnosticKind::Noise { .. } => self.noise_lines += 1,
            DiagnosticKind::Structural { .. } => self.skipped_structural += 1,
            DiagnosticKind::CriticalField { .. } => self.skipped_critical += 1,
            DiagnosticKind::DegradedField { .. } => {}
        }
        self.diagnostics.push(LineDiagnostic { line_number, kind });
    }

    /// Value of a named counter
    pub fn counter(&self, counter: DiagnosticCounter) -> usize {
        match counter {
            DiagnosticCounter::Structural => self.skipped_structural,
            DiagnosticCounter::CriticalField => self.skipped_critical,
            DiagnosticCounter::EmptyBatch => usize::from(self.empty_batch_warning),
        }
    }

    /// Non-zero counters, in a stable order
    pub fn error_counters(&self) -> Vec<(DiagnosticCounter, usize)> {
        DiagnosticCounter::ALL
            .iter()
            .map(|&c| (c, self.counter(c)))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Total of all error counters; noise and degraded fields are excluded
    pub fn error_count(&self) -> usize {
        DiagnosticCounter::ALL.iter().map(|&c| self.counter(c)).sum()
    }

    /// Diagnostics that count as errors
    pub fn errors(&self) -> impl Iterator<Item = &LineDiagnostic> {
        self.diagnostics.iter().filter(|d| d.kind.is_error())
    }

    /// Records assembled as a percentage of data lines
    pub fn success_rate(&self) -> f64 {
        if self.data_lines == 0 {
            0.0
        } else {
            (self.records_parsed as f64 / self.data_lines as f64) * 100.0
        }
    }

    /// Get summary for logging
    pub fn summary(&self) -> String {
        format!(
            "{} lines -> {} records ({} data lines, {:.1}% assembled) | \
             noise: {} | structural: {} | critical: {} | degraded: {}",
            self.total_lines,
            self.records_parsed,
            self.data_lines,
            self.success_rate(),
            self.noise_lines,
            self.skipped_structural,
            self.skipped_critical,
            self.degraded_records
        )
    }
}

impl Default for ParseStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Parsed records with the statistics of their batch
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult<T> {
    /// Successfully assembled records, in input order
    pub records: Vec<T>,

    /// Diagnostics for the batch
    pub stats: ParseStats,
}

impl<T> ParseResult<T> {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
