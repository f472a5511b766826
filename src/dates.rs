//! Mixed-format date parsing.
//!
//! Rainfall files mix ISO dates, Chinese dates (`2024年1月15日`), slash-separated dates and
//! spreadsheet date cells in the same column. [`parse_date`] resolves a cell in three
//! stages and returns `None` rather than failing when none of them apply.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::types::Value;

static YMD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[年\-/](\d{1,2})[月\-/](\d{1,2})日?").expect("static date pattern")
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Resolve a cell to a calendar date.
///
/// Spreadsheet date cells resolve directly and integer cells are tried as `YYYYMMDD`;
/// text goes through [`parse_date_str`]. Everything else is `None`.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::DateTime(dt) => Some(dt.date()),
        Value::Utf8(s) => parse_date_str(s),
        Value::Int64(i) => parse_date_str(&i.to_string()),
        Value::Null | Value::Float64(_) | Value::Bool(_) => None,
    }
}

/// Parse date text in three stages:
///
/// 1. strict `YYYY-MM-DD`;
/// 2. `YYYY{年,-,/}M{月,-,/}D[日]`, anchored at the start so trailing times are ignored;
/// 3. best effort over RFC 3339 and a fixed list of common layouts.
pub fn parse_date_str(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    if let Some(caps) = YMD_PATTERN.captures(s) {
        let year = caps[1].parse::<i32>().ok();
        let month = caps[2].parse::<u32>().ok();
        let day = caps[3].parse::<u32>().ok();
        if let (Some(y), Some(m), Some(d)) = (year, month, day) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                return Some(date);
            }
        }
    }

    parse_permissive(s)
}

/// Earliest and latest parseable date among `values`, or `None` if none parse.
pub fn date_span<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<(NaiveDate, NaiveDate)> {
    values
        .into_iter()
        .filter_map(parse_date)
        .fold(None, |span, d| match span {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
}

fn parse_permissive(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn iso_and_chinese_forms_agree() {
        assert_eq!(parse_date_str("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_str("2024年1月15日"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date_str("2024年01月15"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn mixed_separators_are_accepted() {
        assert_eq!(parse_date_str("2024/3/7"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse_date_str("2024-3/7"), Some(ymd(2024, 3, 7)));
        assert_eq!(parse_date_str("2024年3-7日"), Some(ymd(2024, 3, 7)));
    }

    #[test]
    fn trailing_time_is_ignored() {
        assert_eq!(parse_date_str("2024-06-30 08:00"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date_str("2024年6月30日 08时"), Some(ymd(2024, 6, 30)));
    }

    #[test]
    fn permissive_stage_handles_common_layouts() {
        assert_eq!(parse_date_str("2024-06-30T08:15:00Z"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date_str("2024.06.30"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date_str("20240630"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date_str("06/30/2024"), Some(ymd(2024, 6, 30)));
        assert_eq!(parse_date_str("Jun 30, 2024"), Some(ymd(2024, 6, 30)));
    }

    #[test]
    fn impossible_and_garbage_dates_are_none() {
        assert_eq!(parse_date_str("2024-13-01"), None);
        assert_eq!(parse_date_str("2024年2月30日"), None);
        assert_eq!(parse_date_str("not a date"), None);
        assert_eq!(parse_date_str(""), None);
    }

    #[test]
    fn span_ignores_unparseable_cells() {
        let cells = [
            Value::Utf8("2024年3月1日".into()),
            Value::Null,
            Value::Utf8("2023-11-05".into()),
            Value::Utf8("n/a".into()),
        ];
        assert_eq!(date_span(&cells), Some((ymd(2023, 11, 5), ymd(2024, 3, 1))));
        assert_eq!(date_span(&[Value::Null]), None);
    }

    #[test]
    fn cell_variants() {
        let dt = ymd(2023, 12, 31).and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(parse_date(&Value::DateTime(dt)), Some(ymd(2023, 12, 31)));
        assert_eq!(parse_date(&Value::Int64(20231231)), Some(ymd(2023, 12, 31)));
        assert_eq!(parse_date(&Value::Float64(45000.0)), None);
        assert_eq!(parse_date(&Value::Null), None);
    }
}
