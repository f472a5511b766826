//! Unified load entrypoint.
//!
//! [`load_table`] turns one resolved file into a normalized [`crate::types::Table`]:
//!
//! - the format is inferred from the file extension;
//! - the format-specific reader runs (spreadsheet or delimited text);
//! - empty rows/columns are dropped and the first three columns renamed positionally;
//! - if an [`IngestionObserver`] is configured, success/failure/alerts are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{RainfallError, RainfallResult};
use crate::types::Table;

use super::delimited;
use super::encoding::TextEncoding;
use super::normalize::normalize;
use super::observability::{
    IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Spreadsheet,
    /// Tab/comma/semicolon separated text.
    DelimitedText,
}

impl DatasetFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            "txt" | "csv" | "tsv" => Some(Self::DelimitedText),
            _ => None,
        }
    }
}

/// Options controlling how files are decoded and parsed.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Forced field delimiter for delimited text; `None` sniffs it per file.
    pub delimiter: Option<u8>,
    /// Encodings tried, in order, for delimited text.
    pub encodings: Vec<TextEncoding>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("delimiter", &self.delimiter.map(char::from))
            .field("encodings", &self.encodings)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            encodings: TextEncoding::DEFAULT_ORDER.to_vec(),
            observer: Some(Arc::new(TracingObserver)),
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load and normalize the file at `path` as dataset `dataset`.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column counts and the winning encoding
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
pub fn load_table(dataset: &str, path: &Path, options: &IngestionOptions) -> RainfallResult<Table> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let Some(format) = DatasetFormat::from_extension(ext) else {
        return Err(RainfallError::unreadable(
            path,
            format!("unsupported extension '{ext}'"),
        ));
    };

    let ctx = IngestionContext {
        dataset: dataset.to_owned(),
        path: path.to_path_buf(),
        format,
    };

    let result = match format {
        DatasetFormat::Spreadsheet => load_spreadsheet(path).map(|t| (normalize(t), 0, None)),
        DatasetFormat::DelimitedText => {
            delimited::read_delimited_from_path(path, &options.encodings, options.delimiter)
                .map(|d| (normalize(d.table), d.skipped_lines, Some(d.encoding)))
        }
    };

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok((table, skipped_lines, encoding)) => obs.on_success(
                &ctx,
                IngestionStats {
                    rows: table.row_count(),
                    columns: table.columns.len(),
                    skipped_lines: *skipped_lines,
                    encoding: *encoding,
                },
            ),
            Err(e) => {
                let sev = IngestionSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result.map(|(table, _, _)| table)
}

fn load_spreadsheet(path: &Path) -> RainfallResult<Table> {
    #[cfg(feature = "excel")]
    {
        super::excel::read_first_sheet_from_path(path)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(RainfallError::unreadable(
            path,
            "spreadsheet ingestion not enabled (enable cargo feature 'excel')",
        ))
    }
}
