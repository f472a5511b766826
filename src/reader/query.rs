//! Row filters for [`super::RainfallReader::query`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::{parse_date, parse_date_str};
use crate::types::{DATE_COLUMN, RAINFALL_COLUMN, REGION_COLUMN, Table, Value, cell};

/// Region filter: a substring pattern or a set of exact values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionFilter {
    /// Case-sensitive substring match.
    Pattern(String),
    /// Exact membership match.
    OneOf(Vec<String>),
}

impl RegionFilter {
    fn matches(&self, region: &Value) -> bool {
        let Some(text) = region.to_text() else {
            return false;
        };
        match self {
            RegionFilter::Pattern(p) => text.contains(p.as_str()),
            RegionFilter::OneOf(set) => set.iter().any(|r| *r == text),
        }
    }
}

/// Optional, independently combinable filters (logical AND).
///
/// Bounds are inclusive. A filter whose target column is absent is not applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<RegionFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rainfall: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rainfall: Option<f64>,
}

impl QueryFilters {
    /// `true` when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.region.is_none()
            && self.min_rainfall.is_none()
            && self.max_rainfall.is_none()
    }

    /// Inclusive date window.
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            ..Default::default()
        }
    }
}

/// A filter value that cannot be applied.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("filter '{key}' is not a date: '{value}'")]
    InvalidDate { key: &'static str, value: String },

    #[error("filter '{key}' is not a number")]
    InvalidBound { key: &'static str },
}

/// Apply `filters` to `table`, returning the matching rows.
pub fn apply_filters(table: &Table, filters: &QueryFilters) -> Result<Table, FilterError> {
    let start = date_bound("start_date", filters.start_date.as_deref())?;
    let end = date_bound("end_date", filters.end_date.as_deref())?;
    let min = rainfall_bound("min_rainfall", filters.min_rainfall)?;
    let max = rainfall_bound("max_rainfall", filters.max_rainfall)?;

    let date_idx = if start.is_some() || end.is_some() {
        table.index_of(DATE_COLUMN)
    } else {
        None
    };
    let region = filters
        .region
        .as_ref()
        .and_then(|f| table.index_of(REGION_COLUMN).map(|idx| (idx, f)));
    let rain_idx = if min.is_some() || max.is_some() {
        table.index_of(RAINFALL_COLUMN)
    } else {
        None
    };

    Ok(table.filter_rows(|row| {
        if let Some(idx) = date_idx {
            let Some(date) = parse_date(cell(row, idx)) else {
                return false;
            };
            if start.is_some_and(|s| date < s) || end.is_some_and(|e| date > e) {
                return false;
            }
        }
        if let Some((idx, f)) = region {
            if !f.matches(cell(row, idx)) {
                return false;
            }
        }
        if let Some(idx) = rain_idx {
            let Some(mm) = cell(row, idx).as_f64() else {
                return false;
            };
            if min.is_some_and(|m| mm < m) || max.is_some_and(|m| mm > m) {
                return false;
            }
        }
        true
    }))
}

fn date_bound(key: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    raw.map(|value| {
        parse_date_str(value).ok_or_else(|| FilterError::InvalidDate {
            key,
            value: value.to_owned(),
        })
    })
    .transpose()
}

fn rainfall_bound(key: &'static str, raw: Option<f64>) -> Result<Option<f64>, FilterError> {
    match raw {
        Some(v) if v.is_nan() => Err(FilterError::InvalidBound { key }),
        other => Ok(other),
    }
}
