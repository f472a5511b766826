//! Distribution of the `rainfall` column.

use serde::Serialize;
use tracing::debug;

use crate::stats::Distribution;
use crate::types::{RAINFALL_COLUMN, Table};

/// Descriptive statistics over every numeric rainfall value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; `None` with fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub q25: f64,
    pub q75: f64,
    pub p10: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    /// Rows whose rainfall was missing or not numeric.
    pub excluded: usize,
}

/// Basic statistics of `table`'s rainfall, or `None` when there is no numeric rainfall.
pub fn basic_stats(table: &Table) -> Option<BasicStats> {
    let values = table.numeric_values(RAINFALL_COLUMN);
    let excluded = table.row_count() - values.len();
    let Some(d) = Distribution::from_values(&values) else {
        debug!(rows = table.row_count(), "no numeric rainfall for basic statistics");
        return None;
    };

    Some(BasicStats {
        count: d.count,
        sum: d.total,
        mean: d.mean,
        median: d.median,
        std: d.std,
        min: d.min,
        max: d.max,
        q25: d.quantile(0.25),
        q75: d.quantile(0.75),
        p10: d.quantile(0.10),
        p90: d.quantile(0.90),
        p95: d.quantile(0.95),
        p99: d.quantile(0.99),
        excluded,
    })
}
