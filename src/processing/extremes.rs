//! Extreme-event detection by rainfall percentile.

use serde::Serialize;
use tracing::{debug, warn};

use crate::stats;
use crate::types::{DATE_COLUMN, RAINFALL_COLUMN, REGION_COLUMN, Table, cell};

/// Percentile used when the caller does not choose one.
pub const DEFAULT_THRESHOLD_PERCENTILE: f64 = 95.0;

const MIN_THRESHOLD_PERCENTILE: f64 = 50.0;
const MAX_THRESHOLD_PERCENTILE: f64 = 99.9;

/// One row at or above the rainfall threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeEvent {
    /// Row index in the source table.
    pub index: usize,
    pub rainfall: f64,
    /// Share of numeric rainfall values strictly below this one, in percent.
    pub percentile: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Clamp a requested threshold into `[50, 99.9]`; NaN falls back to the default.
pub fn clamp_threshold(threshold_percentile: f64) -> f64 {
    if threshold_percentile.is_nan() {
        warn!("threshold percentile is NaN, using {DEFAULT_THRESHOLD_PERCENTILE}");
        return DEFAULT_THRESHOLD_PERCENTILE;
    }
    let clamped = threshold_percentile.clamp(MIN_THRESHOLD_PERCENTILE, MAX_THRESHOLD_PERCENTILE);
    if clamped != threshold_percentile {
        warn!(requested = threshold_percentile, used = clamped, "threshold percentile out of range");
    }
    clamped
}

/// Rows whose numeric rainfall is at or above the `threshold_percentile` quantile of all
/// numeric rainfall, heaviest first. Ties keep row order.
pub fn detect_extremes(table: &Table, threshold_percentile: f64) -> Vec<ExtremeEvent> {
    let Some(rain_idx) = table.index_of(RAINFALL_COLUMN) else {
        return Vec::new();
    };
    let values = table.numeric_values(RAINFALL_COLUMN);
    let sorted = stats::sorted(&values);
    let threshold_percentile = clamp_threshold(threshold_percentile);
    let Some(threshold) = stats::quantile(&sorted, threshold_percentile / 100.0) else {
        return Vec::new();
    };

    let date_idx = table.index_of(DATE_COLUMN);
    let region_idx = table.index_of(REGION_COLUMN);

    let mut events: Vec<ExtremeEvent> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let rainfall = cell(row, rain_idx).as_f64().filter(|&mm| mm >= threshold)?;
            Some(ExtremeEvent {
                index,
                rainfall,
                percentile: stats::percentile_rank(&sorted, rainfall),
                date: date_idx.and_then(|i| cell(row, i).to_text()),
                region: region_idx.and_then(|i| cell(row, i).to_text()),
            })
        })
        .collect();
    events.sort_by(|a, b| b.rainfall.total_cmp(&a.rainfall));

    debug!(threshold, threshold_percentile, events = events.len(), "detected extreme events");
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn hundred() -> Table {
        Table::new(
            vec!["date".into(), "region".into(), "rainfall".into()],
            (1..=100)
                .map(|i| vec![Value::Utf8("2024-05-01".into()), Value::Utf8("r".into()), Value::Int64(i)])
                .collect(),
        )
    }

    #[test]
    fn top_five_percent_of_one_to_hundred() {
        let events = detect_extremes(&hundred(), 95.0);
        let rainfall: Vec<f64> = events.iter().map(|e| e.rainfall).collect();
        assert_eq!(rainfall, vec![100.0, 99.0, 98.0, 97.0, 96.0]);
        assert!(events.iter().all(|e| e.percentile >= 95.0));
        assert_eq!(events[0].index, 99);
        assert_eq!(events[0].percentile, 99.0);
        assert_eq!(events[0].region.as_deref(), Some("r"));
    }

    #[test]
    fn ties_keep_row_order() {
        let t = Table::new(
            vec!["date".into(), "region".into(), "rainfall".into()],
            vec![
                vec![Value::Null, Value::Utf8("a".into()), Value::Float64(5.0)],
                vec![Value::Null, Value::Utf8("b".into()), Value::Float64(9.0)],
                vec![Value::Null, Value::Utf8("c".into()), Value::Float64(9.0)],
                vec![Value::Null, Value::Utf8("d".into()), Value::Float64(1.0)],
            ],
        );
        let events = detect_extremes(&t, 50.0);
        let order: Vec<_> = events.iter().map(|e| e.index).collect();
        assert_eq!(order, vec![1, 2]);
        assert_eq!(events[0].date, None);
    }

    #[test]
    fn thresholds_are_clamped() {
        assert_eq!(clamp_threshold(120.0), 99.9);
        assert_eq!(clamp_threshold(10.0), 50.0);
        assert_eq!(clamp_threshold(f64::NAN), DEFAULT_THRESHOLD_PERCENTILE);
        assert_eq!(clamp_threshold(90.0), 90.0);
        assert_eq!(detect_extremes(&hundred(), 10.0).len(), 50);
    }

    #[test]
    fn empty_inputs() {
        assert!(detect_extremes(&Table::default(), 95.0).is_empty());
        let no_rain = Table::new(vec!["date".into()], vec![vec![Value::Utf8("2024-01-01".into())]]);
        assert!(detect_extremes(&no_rain, 95.0).is_empty());
    }
}
