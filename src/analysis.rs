//! Reader + processor compositions used by the command-line front end.
//!
//! Nothing here computes statistics of its own; each helper reads through a
//! [`RainfallReader`] and hands tables to [`crate::processing`].

use serde::Serialize;
use tracing::{info, warn};

use crate::error::RainfallResult;
use crate::processing::extremes::clamp_threshold;
use crate::processing::{ExtremeEvent, Report, ReportOptions, detect_extremes, report};
use crate::reader::{DatasetSummary, QueryFilters, RainfallReader};
use crate::types::Table;

/// One dataset in a [`DatasetListing`].
#[derive(Debug, Clone, Serialize)]
pub struct DatasetEntry {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DatasetSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetListing {
    pub available_datasets: usize,
    pub datasets: Vec<DatasetEntry>,
}

/// List datasets, optionally summarizing each. Datasets that fail to summarize are listed
/// without a summary.
pub fn list_datasets(reader: &RainfallReader, with_summary: bool) -> DatasetListing {
    let datasets: Vec<DatasetEntry> = reader
        .list_datasets()
        .into_iter()
        .map(|filename| {
            let summary = if with_summary {
                reader
                    .summary(&filename)
                    .inspect_err(|e| warn!(dataset = %filename, error = %e, "no summary"))
                    .ok()
            } else {
                None
            };
            DatasetEntry { filename, summary }
        })
        .collect();
    DatasetListing {
        available_datasets: datasets.len(),
        datasets,
    }
}

/// Descriptive summary and full report of one dataset.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetAnalysis {
    pub filename: String,
    pub summary: DatasetSummary,
    pub report: Report,
}

pub fn analyze_dataset(
    reader: &RainfallReader,
    name: &str,
    options: &ReportOptions,
) -> RainfallResult<DatasetAnalysis> {
    let table = reader.read(name)?;
    let summary = reader.summary(name)?;
    Ok(DatasetAnalysis {
        filename: name.to_owned(),
        summary,
        report: report(&table, options),
    })
}

/// The first `limit` matching rows of a filtered query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryPage {
    pub filename: String,
    pub filters_applied: QueryFilters,
    pub returned_records: usize,
    pub total_matching_records: usize,
    pub is_truncated: bool,
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
}

pub fn query_page(
    reader: &RainfallReader,
    name: &str,
    filters: &QueryFilters,
    limit: usize,
) -> RainfallResult<QueryPage> {
    let table = reader.query(name, filters)?;
    let data = table.to_records(limit);
    Ok(QueryPage {
        filename: name.to_owned(),
        filters_applied: filters.clone(),
        returned_records: data.len(),
        total_matching_records: table.row_count(),
        is_truncated: table.row_count() > limit,
        data,
    })
}

/// An inclusive date window, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodBounds {
    pub start: String,
    pub end: String,
}

impl PeriodBounds {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    fn label(&self) -> String {
        format!("{} to {}", self.start, self.end)
    }
}

/// One side of a [`PeriodComparison`].
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    pub range: String,
    pub records: usize,
    pub statistics: Report,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub filename: String,
    pub period1: PeriodReport,
    pub period2: PeriodReport,
}

impl PeriodComparison {
    /// `true` when both windows matched at least one row.
    pub fn both_have_data(&self) -> bool {
        self.period1.records > 0 && self.period2.records > 0
    }
}

/// Report on the rows of `name` inside each of two date windows.
pub fn compare_periods(
    reader: &RainfallReader,
    name: &str,
    first: &PeriodBounds,
    second: &PeriodBounds,
    options: &ReportOptions,
) -> RainfallResult<PeriodComparison> {
    let side = |bounds: &PeriodBounds| -> RainfallResult<PeriodReport> {
        let table = reader.query(name, &QueryFilters::between(&bounds.start, &bounds.end))?;
        Ok(PeriodReport {
            range: bounds.label(),
            records: table.row_count(),
            statistics: report(&table, options),
        })
    };
    let comparison = PeriodComparison {
        filename: name.to_owned(),
        period1: side(first)?,
        period2: side(second)?,
    };
    info!(
        dataset = name,
        period1_records = comparison.period1.records,
        period2_records = comparison.period2.records,
        "compared periods"
    );
    Ok(comparison)
}

/// Extreme events with a caller-side cap on how many are returned.
#[derive(Debug, Clone, Serialize)]
pub struct ExtremeEventsPage {
    /// Threshold actually used, after clamping.
    pub threshold_percentile: f64,
    pub total_extreme_events: usize,
    pub events_returned: usize,
    pub extreme_events: Vec<ExtremeEvent>,
}

pub fn top_extremes(table: &Table, threshold_percentile: f64, limit: usize) -> ExtremeEventsPage {
    let threshold_percentile = clamp_threshold(threshold_percentile);
    let mut events = detect_extremes(table, threshold_percentile);
    let total = events.len();
    events.truncate(limit);
    ExtremeEventsPage {
        threshold_percentile,
        total_extreme_events: total,
        events_returned: events.len(),
        extreme_events: events,
    }
}
