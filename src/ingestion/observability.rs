use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::RainfallError;

use super::encoding::TextEncoding;
use super::unified::DatasetFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (load failed).
    Error,
    /// Critical error (I/O failures).
    Critical,
}

impl IngestionSeverity {
    /// Severity of a load failure.
    pub fn for_error(e: &RainfallError) -> Self {
        match e {
            RainfallError::Io(_) => IngestionSeverity::Critical,
            RainfallError::UnreadableFile { .. } => IngestionSeverity::Error,
            RainfallError::DatasetNotFound { .. } => IngestionSeverity::Warning,
        }
    }
}

/// Context about a single file load.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// Dataset name (file stem).
    pub dataset: String,
    /// Resolved file path.
    pub path: PathBuf,
    /// Format inferred from the extension.
    pub format: DatasetFormat,
}

/// Stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Rows after normalization.
    pub rows: usize,
    /// Columns after normalization.
    pub columns: usize,
    /// Lines dropped as malformed (delimited text only).
    pub skipped_lines: usize,
    /// Encoding that decoded the file (delimited text only).
    pub encoding: Option<TextEncoding>,
}

/// Observer interface for load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when a file loads.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a file fails to load.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &RainfallError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RainfallError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RainfallError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RainfallError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs load events through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        info!(
            dataset = %ctx.dataset,
            path = %ctx.path.display(),
            format = ?ctx.format,
            encoding = stats.encoding.map(TextEncoding::label).unwrap_or("-"),
            rows = stats.rows,
            columns = stats.columns,
            skipped_lines = stats.skipped_lines,
            "loaded dataset"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RainfallError) {
        warn!(
            dataset = %ctx.dataset,
            path = %ctx.path.display(),
            format = ?ctx.format,
            ?severity,
            %error,
            "failed to load dataset"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &RainfallError) {
        error!(
            dataset = %ctx.dataset,
            path = %ctx.path.display(),
            format = ?ctx.format,
            ?severity,
            %error,
            "dataset load alert"
        );
    }
}
