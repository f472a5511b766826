//! Core data model: cell [`Value`]s and the in-memory Observation [`Table`].
//!
//! Tables are schemaless. Column labels come from the source file and, after
//! normalization, the first three are always `date`, `region` and `rainfall`.

use std::fmt;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, Serializer};

/// Column label of the observation date after normalization.
pub const DATE_COLUMN: &str = "date";
/// Column label of the region identifier after normalization.
pub const REGION_COLUMN: &str = "region";
/// Column label of the rainfall amount after normalization.
pub const RAINFALL_COLUMN: &str = "rainfall";

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Spreadsheet date/time cell.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Infer a value from a raw text field.
    ///
    /// Empty text is [`Value::Null`]; integers and finite floats become numbers, except text
    /// with a significant leading zero (`"007"`), which is kept verbatim.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if has_significant_leading_zero(trimmed) {
            return Value::Utf8(trimmed.to_owned());
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int64(i);
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Value::Float64(f),
            _ => Value::Utf8(trimmed.to_owned()),
        }
    }

    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric coercion: `Some` for numbers and numeric text, `None` for everything else.
    ///
    /// NaN never coerces, so every returned value takes part in ordering.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Value::Int64(i) => *i as f64,
            Value::Float64(f) => *f,
            Value::Utf8(s) => s.trim().parse::<f64>().ok()?,
            Value::Null | Value::Bool(_) | Value::DateTime(_) => return None,
        };
        (!v.is_nan()).then_some(v)
    }

    /// Text form of a non-null value, as used for region labels and event annotations.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Cell `idx` of `row`, or [`Value::Null`] when the row is shorter than that.
///
/// Rows built by hand through [`Table::new`] are not checked against the column count.
pub fn cell(row: &[Value], idx: usize) -> &Value {
    row.get(idx).unwrap_or(&Value::Null)
}

fn has_significant_leading_zero(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.len() > 1 && digits.starts_with('0') && !digits.starts_with("0.")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(i) => write!(f, "{i}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Utf8(s) => f.write_str(s),
            Value::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.date().format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Utf8(s) => serializer.serialize_str(s),
            Value::DateTime(_) => serializer.collect_str(self),
        }
    }
}

/// In-memory Observation Table.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as `columns`. Ingested tables
/// always have `columns.len()` cells per row; readers go through [`cell`] so that hand-built
/// short rows read as trailing nulls.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Ordered column labels.
    pub columns: Vec<String>,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table from column labels and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of a column by label, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the cells of one column, or `None` if the column does not exist.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.index_of(name)?;
        Some(self.rows.iter().map(move |row| cell(row, idx)))
    }

    /// Create a new table containing only rows that match `predicate`.
    ///
    /// The returned table preserves the original columns.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Numeric-coercible values of a column in row order; empty if the column is absent.
    pub fn numeric_values(&self, name: &str) -> Vec<f64> {
        self.column(name)
            .map(|cells| cells.filter_map(Value::as_f64).collect())
            .unwrap_or_default()
    }

    /// Distinct non-null values of a column as text, in first-seen order.
    pub fn distinct_text(&self, name: &str) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.column(name)
            .map(|cells| {
                cells
                    .filter_map(Value::to_text)
                    .filter(|t| seen.insert(t.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The first `limit` rows as JSON objects keyed by column label.
    pub fn to_records(&self, limit: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(idx, col)| {
                        let json = serde_json::to_value(cell(row, idx)).unwrap_or(serde_json::Value::Null);
                        (col.clone(), json)
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::new(
            vec!["date".into(), "region".into(), "rainfall".into()],
            vec![
                vec![Value::Utf8("2024-01-01".into()), Value::Utf8("north".into()), Value::Float64(1.5)],
                vec![Value::Utf8("2024-01-02".into()), Value::Utf8("south".into()), Value::Null],
                vec![Value::Utf8("2024-01-03".into()), Value::Utf8("north".into()), Value::Int64(4)],
            ],
        )
    }

    #[test]
    fn infer_distinguishes_numbers_text_and_empty() {
        assert_eq!(Value::infer("  "), Value::Null);
        assert_eq!(Value::infer("12"), Value::Int64(12));
        assert_eq!(Value::infer(" 3.5 "), Value::Float64(3.5));
        assert_eq!(Value::infer("0.25"), Value::Float64(0.25));
        assert_eq!(Value::infer("007"), Value::Utf8("007".into()));
        assert_eq!(Value::infer("nan"), Value::Utf8("nan".into()));
        assert_eq!(Value::infer("2024年1月1日"), Value::Utf8("2024年1月1日".into()));
    }

    #[test]
    fn as_f64_coerces_numeric_text_and_rejects_the_rest() {
        assert_eq!(Value::Int64(3).as_f64(), Some(3.0));
        assert_eq!(Value::Utf8(" 2.5".into()).as_f64(), Some(2.5));
        assert_eq!(Value::Utf8("nan".into()).as_f64(), None);
        assert_eq!(Value::Utf8("trace".into()).as_f64(), None);
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn column_and_index_lookup() {
        let t = sample_table();
        assert_eq!(t.index_of("rainfall"), Some(2));
        assert_eq!(t.index_of("missing"), None);
        let regions: Vec<_> = t.column("region").unwrap().filter_map(Value::to_text).collect();
        assert_eq!(regions, vec!["north", "south", "north"]);
        assert!(t.column("missing").is_none());
    }

    #[test]
    fn filter_rows_preserves_columns() {
        let t = sample_table();
        let out = t.filter_rows(|row| row[1] == Value::Utf8("north".into()));
        assert_eq!(out.columns, t.columns);
        assert_eq!(out.row_count(), 2);
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn records_are_keyed_by_column_and_limited() {
        let t = sample_table();
        let records = t.to_records(2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["region"], serde_json::json!("north"));
        assert_eq!(records[1]["rainfall"], serde_json::Value::Null);
    }

    #[test]
    fn numeric_and_distinct_helpers_skip_missing() {
        let t = sample_table();
        assert_eq!(t.numeric_values("rainfall"), vec![1.5, 4.0]);
        assert_eq!(t.distinct_text("region"), vec!["north", "south"]);
        assert!(t.numeric_values("missing").is_empty());
    }

    #[test]
    fn short_rows_read_as_trailing_nulls() {
        let t = Table::new(
            vec!["date".into(), "region".into(), "rainfall".into()],
            vec![vec![Value::Utf8("2024-01-01".into())]],
        );
        assert_eq!(t.column("rainfall").unwrap().collect::<Vec<_>>(), vec![&Value::Null]);
        assert!(t.numeric_values("rainfall").is_empty());
        assert_eq!(t.to_records(1)[0]["region"], serde_json::Value::Null);
    }

    #[test]
    fn datetime_displays_as_date_when_midnight() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Value::DateTime(dt).to_string(), "2024-03-01");
    }
}
