//! API key file loading

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read newline-delimited keys from `reader`
///
/// Each line is trimmed; empty and whitespace-only lines are skipped.
/// Bytes that are not valid UTF-8 become U+FFFD in that key only.
pub fn parse_keys<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut keys = Vec::new();

    for line in reader.split(b'\n') {
        let line = line.context("Error reading key list")?;
        let line = String::from_utf8_lossy(&line);
        let key = line.trim();
        if !key.is_empty() {
            keys.push(key.to_string());
        }
    }

    Ok(keys)
}

/// Collect all API keys from a file
///
/// # Arguments
/// * `path` - Key file, one key per line
///
/// # Returns
/// Keys in file order, or an error if the file cannot be opened or read
pub fn collect_keys(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("Error opening file: {}", path.display()))?;

    parse_keys(BufReader::new(file))
        .with_context(|| format!("Error reading file: {}", path.display()))
}
