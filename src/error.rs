use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for reader operations.
pub type RainfallResult<T> = Result<T, RainfallError>;

/// Error type returned by the dataset reader.
///
/// Only dataset-level failures surface here. Row-level defects (unparseable dates,
/// non-numeric rainfall, malformed lines) are excluded from the affected computation and
/// never become errors.
#[derive(Debug, Error)]
pub enum RainfallError {
    /// No file exists for the dataset under any supported extension.
    #[error("dataset '{name}' not found (tried: {})", tried.join(", "))]
    DatasetNotFound { name: String, tried: Vec<String> },

    /// The file exists but could not be turned into a table: every encoding attempt failed,
    /// the extension is unsupported, or the spreadsheet reader rejected it.
    #[error("unreadable file {}: {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    /// Underlying I/O error (e.g. permission denied while reading a resolved file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RainfallError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// `true` when the dataset does not exist at all (as opposed to existing but failing to parse).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DatasetNotFound { .. })
    }
}
