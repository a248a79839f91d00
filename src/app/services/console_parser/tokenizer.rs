//! Positional tokenizer for console data rows
//!
//! The console layout has no quoting or escaping; columns are separated by
//! runs of whitespace and identified purely by position.

/// Split a data row into its whitespace-delimited tokens
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
