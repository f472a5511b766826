//! Delimited-text ingestion (`.txt`, `.csv`).
//!
//! The file is decoded under each configured [`TextEncoding`] in turn; the first encoding
//! that decodes cleanly and yields at least one record wins.

use std::path::Path;

use tracing::{debug, warn};

use crate::dates::parse_date;
use crate::error::{RainfallError, RainfallResult};
use crate::types::{Table, Value};

use super::encoding::TextEncoding;

/// Result of parsing one delimited file.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedTable {
    /// Parsed (not yet normalized) table.
    pub table: Table,
    /// Encoding that decoded the file.
    pub encoding: TextEncoding,
    /// Lines dropped because they had more fields than the header.
    pub skipped_lines: usize,
}

/// Read a delimited file, trying `encodings` in order.
///
/// `delimiter` forces the field separator; `None` sniffs it from the first non-empty line.
pub fn read_delimited_from_path(
    path: impl AsRef<Path>,
    encodings: &[TextEncoding],
    delimiter: Option<u8>,
) -> RainfallResult<DelimitedTable> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    read_delimited_from_bytes(&bytes, encodings, delimiter)
        .map_err(|reason| RainfallError::unreadable(path, reason))
}

/// Decode and parse raw bytes; the error is a human-readable reason.
pub fn read_delimited_from_bytes(
    bytes: &[u8],
    encodings: &[TextEncoding],
    delimiter: Option<u8>,
) -> Result<DelimitedTable, String> {
    for &encoding in encodings {
        let Some(text) = encoding.decode(bytes) else {
            debug!(%encoding, "decode failed");
            continue;
        };
        if text.contains('\0') {
            debug!(%encoding, "decoded text contains NUL characters");
            continue;
        }
        if bytes.contains(&b'\n') && !text.contains(['\n', '\r']) {
            debug!(%encoding, "decoded text lost every line break");
            continue;
        }
        match parse_text(&text, delimiter) {
            Ok((table, skipped_lines)) => {
                return Ok(DelimitedTable {
                    table,
                    encoding,
                    skipped_lines,
                });
            }
            Err(e) => {
                warn!(%encoding, error = %e, "failed to parse decoded text");
            }
        }
    }

    let tried: Vec<&str> = encodings.iter().map(|e| e.label()).collect();
    Err(format!("no encoding produced a readable table (tried: {})", tried.join(", ")))
}

/// Parse decoded text into a table, returning it with the number of skipped lines.
pub fn parse_text(text: &str, delimiter: Option<u8>) -> Result<(Table, usize), String> {
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(text));
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut records: Vec<Vec<String>> = Vec::new();
    for (line_idx0, result) in rdr.records().enumerate() {
        match result {
            Ok(record) => {
                if record.iter().all(|f| f.trim().is_empty()) {
                    continue;
                }
                records.push(record.iter().map(str::to_owned).collect());
            }
            Err(e) => debug!(line = line_idx0 + 1, error = %e, "skipping malformed line"),
        }
    }

    let mut records = records.into_iter();
    let first = records.next().ok_or_else(|| "no records".to_string())?;

    let (columns, mut pending) = if looks_like_observation(&first) {
        let labels = (0..first.len()).map(|i| i.to_string()).collect();
        (labels, vec![first])
    } else {
        (header_labels(&first), Vec::new())
    };
    pending.extend(records);

    let width = columns.len();
    let mut skipped = 0usize;
    let mut rows = Vec::with_capacity(pending.len());
    for record in pending {
        if record.len() > width {
            skipped += 1;
            continue;
        }
        let mut row: Vec<Value> = record.iter().map(|raw| Value::infer(raw)).collect();
        row.resize(width, Value::Null);
        rows.push(row);
    }

    if skipped > 0 {
        debug!(skipped, "skipped lines with more fields than the header");
    }
    Ok((Table::new(columns, rows), skipped))
}

/// Tab unless the first non-empty line has none, then comma, then semicolon.
fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    if first.contains('\t') {
        b'\t'
    } else if first.contains(',') {
        b','
    } else if first.contains(';') {
        b';'
    } else {
        b'\t'
    }
}

/// A first record whose first field parses as a date is data, not a header.
///
/// Rainfall is not consulted, so a first observation with a missing amount is kept.
fn looks_like_observation(record: &[String]) -> bool {
    record
        .first()
        .is_some_and(|first| parse_date(&Value::infer(first)).is_some())
}

fn header_labels(record: &[String]) -> Vec<String> {
    record
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim();
            if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_owned()
            }
        })
        .collect()
}
