//! Line-delimited input files.

use std::path::Path;

use crate::error::{Result, ScanError};

/// Read `path` and return its lines, trimmed, in file order.
///
/// Duplicates and blank lines are kept. `\n`, `\r\n` and lone `\r` all end a
/// line; a final terminator does not add an empty line. Invalid UTF-8 is
/// replaced with U+FFFD rather than rejected.
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(split_lines(&String::from_utf8_lossy(&bytes)))
}

fn split_lines(content: &str) -> Vec<String> {
    content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.trim().to_string())
        .collect()
}
