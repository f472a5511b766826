//! Dataset and combined summaries.
//!
//! These are descriptive only (ranges, region sets, a few rainfall moments). The full
//! statistics report lives in [`crate::processing`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::date_span;
use crate::stats::{self, Distribution};
use crate::types::{DATE_COLUMN, RAINFALL_COLUMN, REGION_COLUMN, Table};

/// Inclusive span of parsed dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    fn of(table: &Table) -> Option<Self> {
        let (start, end) = date_span(table.column(DATE_COLUMN)?)?;
        Some(Self { start, end })
    }

    fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Rainfall moments of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub total: f64,
}

/// Summary of a single dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub filename: String,
    pub total_records: usize,
    pub columns: Vec<String>,
    pub date_range: Option<DateRange>,
    pub regions: Vec<String>,
    pub rainfall_stats: Option<RainfallStats>,
}

/// Summarize `table`, loaded as dataset `filename`.
pub fn summarize(filename: &str, table: &Table) -> DatasetSummary {
    let rainfall_stats =
        Distribution::from_values(&table.numeric_values(RAINFALL_COLUMN)).map(|d| RainfallStats {
            min: d.min,
            max: d.max,
            mean: d.mean,
            median: d.median,
            total: d.total,
        });

    DatasetSummary {
        filename: filename.to_owned(),
        total_records: table.row_count(),
        columns: table.columns.clone(),
        date_range: DateRange::of(table),
        regions: table.distinct_text(REGION_COLUMN),
        rainfall_stats,
    }
}

/// Global date span; either end is `None` when no dataset had a parseable date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OpenDateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Rainfall distribution over every dataset's values pooled together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PooledRainfallStats {
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std: Option<f64>,
}

/// Per-dataset rainfall subtotal inside a [`CombinedSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainfallSubtotal {
    pub total: f64,
    pub mean: f64,
    pub max: f64,
    pub min: f64,
}

/// One dataset's entry inside a [`CombinedSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub records: usize,
    pub regions: Vec<String>,
    pub date_range: Option<DateRange>,
    pub rainfall_summary: Option<RainfallSubtotal>,
}

/// Aggregate over every readable dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CombinedSummary {
    pub total_files: usize,
    pub failed_files: Vec<String>,
    pub total_records: usize,
    pub all_regions: Vec<String>,
    pub date_range: OpenDateRange,
    pub rainfall_stats: Option<PooledRainfallStats>,
    pub file_summaries: BTreeMap<String, FileSummary>,
}

/// Fold per-dataset tables into a [`CombinedSummary`].
///
/// `failed` names the datasets that could not be loaded; they are reported, not aggregated.
pub fn combine<'a, I>(tables: I, failed: Vec<String>) -> CombinedSummary
where
    I: IntoIterator<Item = (&'a str, &'a Table)>,
{
    let mut summary = CombinedSummary {
        failed_files: failed,
        ..Default::default()
    };
    let mut regions = BTreeSet::new();
    let mut span: Option<DateRange> = None;
    let mut pool = Vec::new();

    for (name, table) in tables {
        summary.total_files += 1;
        summary.total_records += table.row_count();

        let file_regions = table.distinct_text(REGION_COLUMN);
        regions.extend(file_regions.iter().cloned());

        let file_span = DateRange::of(table);
        span = match (span, file_span) {
            (Some(a), Some(b)) => Some(a.merge(b)),
            (a, b) => a.or(b),
        };

        let rainfall = table.numeric_values(RAINFALL_COLUMN);
        let rainfall_summary = subtotal(&rainfall);
        pool.extend(rainfall);

        summary.file_summaries.insert(
            name.to_owned(),
            FileSummary {
                records: table.row_count(),
                regions: file_regions,
                date_range: file_span,
                rainfall_summary,
            },
        );
    }

    summary.all_regions = regions.into_iter().collect();
    summary.date_range = OpenDateRange {
        start: span.map(|s| s.start),
        end: span.map(|s| s.end),
    };
    summary.rainfall_stats = Distribution::from_values(&pool).map(|d| PooledRainfallStats {
        total: d.total,
        mean: d.mean,
        median: d.median,
        min: d.min,
        max: d.max,
        std: d.std,
    });
    summary
}

fn subtotal(values: &[f64]) -> Option<RainfallSubtotal> {
    let mean = stats::mean(values)?;
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    Some(RainfallSubtotal {
        total: stats::sum(values),
        mean,
        max,
        min,
    })
}
