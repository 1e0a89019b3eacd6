// src/process/mod.rs

pub mod row;
pub mod utils;

pub use row::Row;

use thiserror::Error;
use tracing::debug;

use crate::process::utils::{clean_str, is_blank};

/// Field separator of the published export.
pub const DEFAULT_DELIMITER: char = ',';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("payload is empty")]
    Empty,
}

/// Split `text` into rows keyed by the header line.
///
/// - the first non-blank line is the header, every later non-blank line a row
/// - header names and cells are trimmed
/// - missing trailing cells become `""`, surplus cells are dropped
///
/// There is no quoting: a delimiter inside a value shifts every later column
/// of that line.
pub fn parse(text: &str, delimiter: char) -> Vec<Row> {
    let mut lines = text.lines().filter(|l| !is_blank(l));

    let headers: Vec<String> = match lines.next() {
        Some(header) => header.split(delimiter).map(clean_str).collect(),
        None => return Vec::new(),
    };

    let rows: Vec<Row> = lines
        .map(|line| {
            let mut cells = line.split(delimiter);
            headers
                .iter()
                .map(|h| (h.as_str(), cells.next().map(clean_str).unwrap_or_default()))
                .collect::<Row>()
        })
        .collect();

    debug!(columns = headers.len(), rows = rows.len(), "parsed export");
    rows
}

/// Change marker of `text`: the first field of its last non-blank line.
///
/// Returns `Ok(None)` when the payload has a header but no data rows.
pub fn latest_marker(text: &str, delimiter: char) -> Result<Option<String>, ParseError> {
    let mut lines = text.lines().filter(|l| !is_blank(l));
    if lines.next().is_none() {
        return Err(ParseError::Empty);
    }
    Ok(lines.last().map(|last| {
        let first = last.split(delimiter).next().unwrap_or("");
        clean_str(first)
    }))
}
