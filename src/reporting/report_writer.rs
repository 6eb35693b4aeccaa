//! Report writing functionality

use anyhow::Result;
use std::io::Write;

use crate::config::RunConfig;
use crate::core::validator::ValidationResult;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Running valid/invalid counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub valid: usize,
    pub invalid: usize,
}

impl Summary {
    pub fn record(&mut self, is_valid: bool) {
        if is_valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid
    }

    pub fn merge(&mut self, other: Summary) {
        self.valid += other.valid;
        self.invalid += other.invalid;
    }
}

/// Format one result line, without trailing newline
///
/// # Arguments
/// * `result` - Result to format
/// * `use_color` - Wrap the line in green (valid) or red (invalid) ANSI codes
pub fn format_result(result: &ValidationResult, use_color: bool) -> String {
    let (status, color) = if result.is_valid {
        ("Valid", GREEN)
    } else {
        ("Invalid", RED)
    };

    if use_color {
        format!("{}{}: {}{}", color, status, result.key, RESET)
    } else {
        format!("{}: {}", status, result.key)
    }
}

/// Print per-key lines and count every result
///
/// Valid keys are always printed; invalid keys only when `show_invalid` is set.
/// With `debug` set, the raw response body follows each printed line.
///
/// # Returns
/// Counts over all results, printed or not
pub fn write_report<'a, W, I>(out: &mut W, results: I, config: &RunConfig) -> Result<Summary>
where
    W: Write,
    I: IntoIterator<Item = &'a ValidationResult>,
{
    let mut summary = Summary::default();

    for result in results {
        if result.is_valid || config.show_invalid {
            writeln!(out, "{}", format_result(result, config.use_color))?;
            if config.debug {
                writeln!(out, "Response Body: {}", result.body)?;
            }
        }
        summary.record(result.is_valid);
    }

    Ok(summary)
}

/// Print the closing count summary
pub fn write_summary<W: Write>(out: &mut W, summary: &Summary) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Summary:")?;
    writeln!(out, "Valid API keys: {}", summary.valid)?;
    writeln!(out, "Invalid API keys: {}", summary.invalid)?;
    Ok(())
}

/// Print transport failures, one line per affected key
pub fn write_diagnostics<'a, W, I>(err: &mut W, results: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ValidationResult>,
{
    for result in results {
        if let Some(error) = &result.error {
            writeln!(err, "{} (key: {})", error, result.key)?;
        }
    }
    Ok(())
}
