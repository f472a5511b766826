//! Linear trend over monthly rainfall.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::dates::parse_date;
use crate::stats;
use crate::types::{DATE_COLUMN, Table};

use super::keyed_rainfall;

/// Rainfall aggregate of one calendar month.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    pub total: f64,
    pub average: f64,
    pub count: usize,
}

/// Chronological monthly aggregates over rows with a parseable date and numeric rainfall.
pub fn monthly_series(table: &Table) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for (date, mm) in keyed_rainfall(table, DATE_COLUMN, parse_date) {
        months.entry((date.year(), date.month())).or_default().push(mm);
    }
    months
        .into_iter()
        .filter_map(|((year, month), values)| {
            Some(MonthlyPoint {
                month: format!("{year:04}-{month:02}"),
                total: stats::sum(&values),
                average: stats::mean(&values)?,
                count: values.len(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    /// Direction of a slope; only an exact zero is stable.
    pub fn of_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else if slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// First and last month covered by a trend.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnalysisPeriod {
    pub start: String,
    pub end: String,
}

/// Least-squares slopes of monthly totals and means against the month index.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TrendEstimate {
    pub total_rainfall_trend: f64,
    pub average_rainfall_trend: f64,
    pub trend_direction: TrendDirection,
    pub data_points: usize,
    pub analysis_period: AnalysisPeriod,
}

/// Result of [`trend`].
///
/// Serializes as the estimate itself, or as `{"trend": "insufficient_data"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Trend {
    /// Fewer than two months with usable data.
    InsufficientData,
    Estimate(TrendEstimate),
}

impl Serialize for Trend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Trend::InsufficientData => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("trend", "insufficient_data")?;
                map.end()
            }
            Trend::Estimate(estimate) => estimate.serialize(serializer),
        }
    }
}

/// Fit a trend line through the monthly series of `table`.
pub fn trend(table: &Table) -> Trend {
    let series = monthly_series(table);
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Trend::InsufficientData;
    };
    if series.len() < 2 {
        debug!(months = series.len(), "not enough months for a trend");
        return Trend::InsufficientData;
    }

    let totals: Vec<f64> = series.iter().map(|p| p.total).collect();
    let averages: Vec<f64> = series.iter().map(|p| p.average).collect();
    let total_slope = slope(&totals);

    Trend::Estimate(TrendEstimate {
        total_rainfall_trend: total_slope,
        average_rainfall_trend: slope(&averages),
        trend_direction: TrendDirection::of_slope(total_slope),
        data_points: series.len(),
        analysis_period: AnalysisPeriod {
            start: first.month.clone(),
            end: last.month.clone(),
        },
    })
}

/// OLS slope of `y` against `x = 0..n`.
///
/// The denominator `n Σx² − (Σx)²` is positive for distinct integer `x`, so it is never zero
/// once `n >= 2`, which [`trend`] guarantees.
fn slope(y: &[f64]) -> f64 {
    let n = y.len() as f64;
    let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
    let xy: Vec<f64> = x.iter().zip(y).map(|(a, b)| a * b).collect();
    let x2: Vec<f64> = x.iter().map(|a| a * a).collect();
    let (sx, sy, sxy, sx2) = (stats::sum(&x), stats::sum(y), stats::sum(&xy), stats::sum(&x2));
    (n * sxy - sx * sy) / (n * sx2 - sx * sx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn table(rows: &[(&str, f64)]) -> Table {
        Table::new(
            vec!["date".into(), "region".into(), "rainfall".into()],
            rows.iter()
                .map(|(d, mm)| vec![Value::Utf8((*d).into()), Value::Utf8("r".into()), Value::Float64(*mm)])
                .collect(),
        )
    }

    #[test]
    fn single_month_is_insufficient() {
        let t = table(&[("2024-03-01", 1.0), ("2024-03-20", 2.0)]);
        assert_eq!(trend(&t), Trend::InsufficientData);
        assert_eq!(
            serde_json::to_value(trend(&t)).unwrap(),
            serde_json::json!({ "trend": "insufficient_data" })
        );
        assert_eq!(trend(&Table::default()), Trend::InsufficientData);
    }

    #[test]
    fn rising_monthly_totals() {
        let t = table(&[
            ("2024-01-05", 10.0),
            ("2024年2月3日", 15.0),
            ("2024-02-20", 5.0),
            ("2024-03-11", 30.0),
            ("unknown", 500.0),
        ]);
        let series = monthly_series(&t);
        assert_eq!(series.len(), 3);
        assert_eq!(series[1].total, 20.0);
        assert_eq!(series[1].average, 10.0);

        let Trend::Estimate(est) = trend(&t) else {
            panic!("expected an estimate");
        };
        assert!((est.total_rainfall_trend - 10.0).abs() < 1e-9);
        assert!((est.average_rainfall_trend - 10.0).abs() < 1e-9);
        assert_eq!(est.trend_direction, TrendDirection::Increasing);
        assert_eq!(est.data_points, 3);
        assert_eq!(est.analysis_period.start, "2024-01");
        assert_eq!(est.analysis_period.end, "2024-03");

        let json = serde_json::to_value(trend(&t)).unwrap();
        assert_eq!(json["trend_direction"], "increasing");
    }

    #[test]
    fn flat_series_is_stable() {
        let t = table(&[("2023-12-01", 4.0), ("2024-01-01", 4.0)]);
        let Trend::Estimate(est) = trend(&t) else {
            panic!("expected an estimate");
        };
        assert_eq!(est.total_rainfall_trend, 0.0);
        assert_eq!(est.trend_direction, TrendDirection::Stable);
    }

    #[test]
    fn direction_of_slope() {
        assert_eq!(TrendDirection::of_slope(-0.5), TrendDirection::Decreasing);
        assert_eq!(TrendDirection::of_slope(1e-12), TrendDirection::Increasing);
    }
}
