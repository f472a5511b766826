#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{RainfallError, RainfallResult};
use crate::types::{Table, Value};

/// Read the first sheet of a workbook (`.xlsx`, `.xls`, `.ods`, ...) into a [`Table`].
///
/// Behavior:
/// - The first row is the header row; empty header cells become `Unnamed: {index}`
/// - Remaining rows are converted cell by cell, short rows padded with [`Value::Null`]
/// - Date cells become [`Value::DateTime`]
pub fn read_first_sheet_from_path(path: impl AsRef<Path>) -> RainfallResult<Table> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path).map_err(|e| RainfallError::unreadable(path, e))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| RainfallError::unreadable(path, "workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| RainfallError::unreadable(path, format!("sheet '{first}': {e}")))?;

    Ok(range_to_table(&range))
}

fn range_to_table(range: &calamine::Range<Data>) -> Table {
    let mut rows_iter = range.rows();
    let Some(header) = rows_iter.next() else {
        return Table::default();
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let label = cell_to_header_string(c);
            if label.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                label.trim().to_owned()
            }
        })
        .collect();

    let width = columns.len();
    let rows = rows_iter
        .map(|row| {
            let mut out: Vec<Value> = row.iter().take(width).map(convert_cell).collect();
            out.resize(width, Value::Null);
            out
        })
        .collect();

    Table::new(columns, rows)
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(|d| Value::DateTime(d).to_string())
            .unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) if f.is_finite() => Value::Float64(*f),
        Data::Float(_) => Value::Null,
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Value::Null
            } else {
                Value::Utf8(trimmed.to_owned())
            }
        }
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(Value::DateTime)
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}

/// Convert a 1900-system spreadsheet serial (days since 1899-12-30) to a date-time.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let seconds = ((serial - serial.trunc()) * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::days(days) + Duration::seconds(seconds))
}
