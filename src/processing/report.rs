//! The full statistics report for one table.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::types::Table;

use super::basic::{BasicStats, basic_stats};
use super::extremes::{DEFAULT_THRESHOLD_PERCENTILE, ExtremeEvent, detect_extremes};
use super::regional::{RegionStats, regional_stats};
use super::temporal::{Period, PeriodStats, SeasonLabels, by_period};
use super::trend::{Trend, trend};

/// Knobs for [`report`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Percentile (50..=99.9) at or above which a row is an extreme event.
    pub extreme_threshold_percentile: f64,
    pub season_labels: SeasonLabels,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            extreme_threshold_percentile: DEFAULT_THRESHOLD_PERCENTILE,
            season_labels: SeasonLabels::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataOverview {
    pub total_records: usize,
    pub columns: Vec<String>,
}

/// Every analysis of one table. A block that finds nothing is `None` (`null` in JSON).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub data_overview: DataOverview,
    pub basic_statistics: Option<BasicStats>,
    pub regional_analysis: Option<BTreeMap<String, RegionStats>>,
    pub monthly_analysis: Option<BTreeMap<String, PeriodStats>>,
    pub seasonal_analysis: Option<BTreeMap<String, PeriodStats>>,
    pub yearly_analysis: Option<BTreeMap<String, PeriodStats>>,
    pub extreme_events: Option<Vec<ExtremeEvent>>,
    pub trends: Trend,
}

/// Compose every analysis of `table` into one [`Report`].
pub fn report(table: &Table, options: &ReportOptions) -> Report {
    let periods = |period| non_empty(by_period(table, period, &options.season_labels));
    let report = Report {
        data_overview: DataOverview {
            total_records: table.row_count(),
            columns: table.columns.clone(),
        },
        basic_statistics: basic_stats(table),
        regional_analysis: non_empty(regional_stats(table)),
        monthly_analysis: periods(Period::Month),
        seasonal_analysis: periods(Period::Season),
        yearly_analysis: periods(Period::Year),
        extreme_events: Some(detect_extremes(table, options.extreme_threshold_percentile))
            .filter(|events| !events.is_empty()),
        trends: trend(table),
    };
    debug!(
        rows = table.row_count(),
        regions = report.regional_analysis.as_ref().map_or(0, BTreeMap::len),
        "built report"
    );
    report
}

fn non_empty<V>(map: BTreeMap<String, V>) -> Option<BTreeMap<String, V>> {
    (!map.is_empty()).then_some(map)
}
