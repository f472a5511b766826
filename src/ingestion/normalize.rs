//! Post-parse cleanup and positional column renaming.

use crate::types::{DATE_COLUMN, RAINFALL_COLUMN, REGION_COLUMN, Table, Value};

/// Drop rows whose cells are all empty, then columns whose cells are all empty.
pub fn drop_empty(table: Table) -> Table {
    let Table { columns, rows } = table;
    let rows: Vec<Vec<Value>> = rows
        .into_iter()
        .filter(|row| row.iter().any(|v| !v.is_null()))
        .collect();

    let keep: Vec<bool> = (0..columns.len())
        .map(|idx| rows.iter().any(|row| row.get(idx).is_some_and(|v| !v.is_null())))
        .collect();

    let columns = columns
        .into_iter()
        .zip(&keep)
        .filter_map(|(c, &k)| k.then_some(c))
        .collect();
    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&keep)
                .filter_map(|(v, &k)| k.then_some(v))
                .collect()
        })
        .collect();

    Table::new(columns, rows)
}

/// Rename columns 0, 1 and 2 to `date`, `region` and `rainfall` when at least three exist.
///
/// The mapping is by position only; source labels of the first three columns are discarded
/// and later columns keep theirs.
pub fn rename_positional(mut table: Table) -> Table {
    if table.columns.len() >= 3 {
        for (idx, label) in [DATE_COLUMN, REGION_COLUMN, RAINFALL_COLUMN].into_iter().enumerate() {
            table.columns[idx] = label.to_owned();
        }
    }
    table
}

/// Full normalization: [`drop_empty`] followed by [`rename_positional`].
pub fn normalize(table: Table) -> Table {
    rename_positional(drop_empty(table))
}
