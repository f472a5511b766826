//! Statistics over a normalized [`crate::types::Table`].
//!
//! Every function here is a pure function of its input table. Rows whose rainfall is not
//! numeric, or whose date does not parse, are excluded from the affected computation; a
//! computation with nothing left to work on returns an empty result rather than an error.
//!
//! Currently implemented:
//!
//! - [`basic_stats()`]: distribution of all numeric rainfall values
//! - [`regional_stats()`]: per-region breakdown
//! - [`by_period()`]: month/season/year buckets
//! - [`detect_extremes()`]: rows at or above a rainfall percentile
//! - [`trend()`]: least-squares slope over monthly totals and means
//! - [`report()`]: all of the above in one structure
//!
//! ## Example
//!
//! ```rust
//! use rainfall_analytics::processing::{basic_stats, detect_extremes};
//! use rainfall_analytics::types::{Table, Value};
//!
//! let rows = (1..=10)
//!     .map(|i| vec![Value::Utf8(format!("2024-01-{i:02}")), Value::Utf8("north".into()), Value::Int64(i)])
//!     .collect();
//! let table = Table::new(vec!["date".into(), "region".into(), "rainfall".into()], rows);
//!
//! let stats = basic_stats(&table).unwrap();
//! assert_eq!(stats.median, 5.5);
//! assert_eq!(detect_extremes(&table, 90.0).len(), 1);
//! ```

pub mod basic;
pub mod extremes;
pub mod regional;
pub mod report;
pub mod temporal;
pub mod trend;

pub use basic::{BasicStats, basic_stats};
pub use extremes::{DEFAULT_THRESHOLD_PERCENTILE, ExtremeEvent, detect_extremes};
pub use regional::{RegionStats, regional_stats};
pub use report::{DataOverview, Report, ReportOptions, report};
pub use temporal::{Period, PeriodStats, Season, SeasonLabels, by_period};
pub use trend::{MonthlyPoint, Trend, TrendDirection, TrendEstimate, monthly_series, trend};

use crate::types::{RAINFALL_COLUMN, Table, Value, cell};

/// `(key, rainfall)` for every row whose key resolves and whose rainfall is numeric.
///
/// Empty when either column is missing.
fn keyed_rainfall<K>(table: &Table, key_column: &str, key: impl Fn(&Value) -> Option<K>) -> Vec<(K, f64)> {
    let (Some(key_idx), Some(rain_idx)) = (table.index_of(key_column), table.index_of(RAINFALL_COLUMN))
    else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .filter_map(|row| Some((key(cell(row, key_idx))?, cell(row, rain_idx).as_f64()?)))
        .collect()
}
