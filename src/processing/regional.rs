use std::collections::BTreeMap;

use serde::Serialize;

use crate::stats::Distribution;
use crate::types::{REGION_COLUMN, Table, Value};

use super::keyed_rainfall;

/// Rainfall statistics of one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub count: usize,
    pub total: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub std: Option<f64>,
}

/// Group rainfall by region.
///
/// Rows without a region are not grouped, and regions with no numeric rainfall are omitted.
pub fn regional_stats(table: &Table) -> BTreeMap<String, RegionStats> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (region, mm) in keyed_rainfall(table, REGION_COLUMN, Value::to_text) {
        groups.entry(region).or_default().push(mm);
    }

    groups
        .into_iter()
        .filter_map(|(region, values)| {
            let d = Distribution::from_values(&values)?;
            Some((
                region,
                RegionStats {
                    count: d.count,
                    total: d.total,
                    average: d.mean,
                    max: d.max,
                    min: d.min,
                    std: d.std,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_skip_missing_regions_and_non_numeric_rainfall() {
        let s = |v: &str| Value::Utf8(v.to_owned());
        let t = Table::new(
            vec!["date".into(), "region".into(), "rainfall".into()],
            vec![
                vec![s("2024-01-01"), s("north"), Value::Float64(2.0)],
                vec![s("2024-01-02"), s("north"), Value::Float64(4.0)],
                vec![s("2024-01-03"), s("south"), s("n/a")],
                vec![s("2024-01-04"), Value::Null, Value::Float64(9.0)],
                vec![s("2024-01-05"), Value::Int64(7), Value::Int64(1)],
            ],
        );
        let stats = regional_stats(&t);
        assert_eq!(stats.keys().collect::<Vec<_>>(), vec!["7", "north"]);
        let north = &stats["north"];
        assert_eq!((north.count, north.total, north.average), (2, 6.0, 3.0));
        assert!((north.std.unwrap() - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(stats["7"].std, None);
    }
}
