//! Month, season and year buckets.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates::parse_date;
use crate::stats;
use crate::types::{DATE_COLUMN, Table};

use super::keyed_rainfall;

/// Bucket granularity for [`by_period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// `YYYY-MM`
    Month,
    /// Meteorological season, labelled by [`SeasonLabels`].
    Season,
    /// `YYYY`
    Year,
}

/// Meteorological season of the northern hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Season of a calendar month (1-12): Dec-Feb winter, Mar-May spring, Jun-Aug summer,
    /// Sep-Nov autumn.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::from_month(date.month())
    }
}

/// Display text used as the bucket key for each season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonLabels {
    pub winter: String,
    pub spring: String,
    pub summer: String,
    pub autumn: String,
}

impl Default for SeasonLabels {
    fn default() -> Self {
        Self {
            winter: "Winter".into(),
            spring: "Spring".into(),
            summer: "Summer".into(),
            autumn: "Autumn".into(),
        }
    }
}

impl SeasonLabels {
    /// 冬季 / 春季 / 夏季 / 秋季
    pub fn chinese() -> Self {
        Self {
            winter: "冬季".into(),
            spring: "春季".into(),
            summer: "夏季".into(),
            autumn: "秋季".into(),
        }
    }

    pub fn label(&self, season: Season) -> &str {
        match season {
            Season::Winter => &self.winter,
            Season::Spring => &self.spring,
            Season::Summer => &self.summer,
            Season::Autumn => &self.autumn,
        }
    }
}

/// Rainfall aggregate of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStats {
    pub total: f64,
    pub average: f64,
    pub count: usize,
}

impl PeriodStats {
    pub(crate) fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            total: stats::sum(values),
            average: stats::mean(values)?,
            count: values.len(),
        })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Period::Month => "month",
            Period::Season => "season",
            Period::Year => "year",
        })
    }
}

/// Bucket numeric rainfall by `period` of each row's parsed date.
///
/// Rows whose date does not parse or whose rainfall is not numeric are excluded.
pub fn by_period(table: &Table, period: Period, labels: &SeasonLabels) -> BTreeMap<String, PeriodStats> {
    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (date, mm) in keyed_rainfall(table, DATE_COLUMN, parse_date) {
        let key = match period {
            Period::Month => date.format("%Y-%m").to_string(),
            Period::Year => date.year().to_string(),
            Period::Season => labels.label(Season::of(date)).to_owned(),
        };
        buckets.entry(key).or_default().push(mm);
    }
    debug!(%period, buckets = buckets.len(), "bucketed rainfall");

    buckets
        .into_iter()
        .filter_map(|(key, values)| Some((key, PeriodStats::from_values(&values)?)))
        .collect()
}
