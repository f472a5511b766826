use std::path::Path;

use rainfall_analytics::analysis::{PeriodBounds, analyze_dataset, compare_periods, list_datasets, query_page, top_extremes};
use rainfall_analytics::ingestion::IngestionOptions;
use rainfall_analytics::processing::{ReportOptions, SeasonLabels, Trend, TrendDirection};
use rainfall_analytics::reader::{QueryFilters, RainfallReader, ReaderOptions};
use tempfile::TempDir;

fn reader_with(lines: &[String]) -> (TempDir, RainfallReader) {
    let dir = TempDir::new().unwrap();
    let mut text = String::from("日期\t地区\t降雨量\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    std::fs::write(dir.path().join("basin.txt"), text).unwrap();
    let reader = reader_at(dir.path());
    (dir, reader)
}

fn reader_at(dir: &Path) -> RainfallReader {
    RainfallReader::with_options(
        dir,
        ReaderOptions {
            ingestion: IngestionOptions {
                observer: None,
                ..Default::default()
            },
            ..Default::default()
        },
    )
}

/// Twelve months of 2023, rainfall growing by 10 each month, one row every fifth day.
fn monthly_growth() -> Vec<String> {
    let mut lines = Vec::new();
    for month in 1..=12u32 {
        for day in [1u32, 6, 11, 16, 21, 26] {
            let region = if day < 15 { "upper" } else { "lower" };
            lines.push(format!("2023年{month}月{day}日\t{region}\t{}", month * 10));
        }
    }
    lines.push("unknown\tupper\t999".to_string());
    lines.push("2023-07-04\tlower\tn/a".to_string());
    lines
}

#[test]
fn analysis_of_a_full_year() {
    let (_dir, reader) = reader_with(&monthly_growth());
    let options = ReportOptions {
        season_labels: SeasonLabels::chinese(),
        ..Default::default()
    };

    let analysis = analyze_dataset(&reader, "basin", &options).unwrap();
    assert_eq!(analysis.summary.total_records, 74);
    let report = &analysis.report;

    let basic = report.basic_statistics.as_ref().unwrap();
    assert_eq!(basic.count, 73);
    assert_eq!(basic.excluded, 1);
    assert_eq!(basic.max, 999.0);

    let regions = report.regional_analysis.as_ref().unwrap();
    assert_eq!(regions["upper"].count, 37);
    assert_eq!(regions["lower"].count, 36);

    let months = report.monthly_analysis.as_ref().unwrap();
    assert_eq!(months.len(), 12);
    assert_eq!(months["2023-03"].total, 180.0);
    assert_eq!(months["2023-03"].count, 6);

    let seasons = report.seasonal_analysis.as_ref().unwrap();
    assert_eq!(seasons["冬季"].count, 18);
    assert_eq!(seasons["夏季"].total, 6.0 * (60.0 + 70.0 + 80.0));

    assert_eq!(report.yearly_analysis.as_ref().unwrap()["2023"].count, 72);

    let extremes = report.extreme_events.as_ref().unwrap();
    assert_eq!(extremes[0].rainfall, 999.0);
    assert_eq!(extremes[0].date.as_deref(), Some("unknown"));

    let Trend::Estimate(trend) = &report.trends else {
        panic!("expected a trend estimate");
    };
    assert_eq!(trend.trend_direction, TrendDirection::Increasing);
    assert!((trend.total_rainfall_trend - 60.0).abs() < 1e-9);
    assert!((trend.average_rainfall_trend - 10.0).abs() < 1e-9);
    assert_eq!(trend.data_points, 12);
    assert_eq!(trend.analysis_period.start, "2023-01");
    assert_eq!(trend.analysis_period.end, "2023-12");
}

#[test]
fn compare_two_quarters() {
    let (_dir, reader) = reader_with(&monthly_growth());
    let comparison = compare_periods(
        &reader,
        "basin",
        &PeriodBounds::new("2023-01-01", "2023-03-31"),
        &PeriodBounds::new("2023年10月1日", "2023年12月31日"),
        &ReportOptions::default(),
    )
    .unwrap();

    assert!(comparison.both_have_data());
    assert_eq!(comparison.period1.records, 18);
    assert_eq!(comparison.period1.range, "2023-01-01 to 2023-03-31");
    let q1 = comparison.period1.statistics.basic_statistics.as_ref().unwrap();
    let q4 = comparison.period2.statistics.basic_statistics.as_ref().unwrap();
    assert!(q4.mean > q1.mean);

    let json = serde_json::to_value(&comparison).unwrap();
    assert_eq!(json["period2"]["statistics"]["data_overview"]["total_records"], 18);
}

#[test]
fn query_pages_are_truncated() {
    let (_dir, reader) = reader_with(&monthly_growth());
    let filters = QueryFilters {
        min_rainfall: Some(100.0),
        ..Default::default()
    };

    let page = query_page(&reader, "basin", &filters, 5).unwrap();
    assert_eq!(page.total_matching_records, 19);
    assert_eq!(page.returned_records, 5);
    assert!(page.is_truncated);
    assert_eq!(page.data[0]["region"], "upper");
    assert_eq!(page.data[0]["rainfall"], 100);

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["filters_applied"], serde_json::json!({ "min_rainfall": 100.0 }));
}

#[test]
fn extreme_page_and_listing() {
    let (dir, reader) = reader_with(&monthly_growth());
    std::fs::write(dir.path().join("empty.csv"), "").unwrap();

    let table = reader.read("basin").unwrap();
    let page = top_extremes(&table, 99.0, 3);
    assert_eq!(page.events_returned, 1);
    assert_eq!(page.extreme_events[0].rainfall, 999.0);

    let listing = list_datasets(&reader, true);
    assert_eq!(listing.available_datasets, 2);
    assert_eq!(listing.datasets[0].filename, "basin");
    assert!(listing.datasets[0].summary.is_some());
    assert!(listing.datasets[1].summary.is_none());

    let bare = list_datasets(&reader, false);
    let json = serde_json::to_value(&bare).unwrap();
    assert_eq!(json["datasets"][1], serde_json::json!({ "filename": "empty" }));
}

#[test]
fn single_month_has_no_trend() {
    let lines: Vec<String> = (1..=5).map(|d| format!("2024-06-0{d}\teast\t{d}")).collect();
    let (_dir, reader) = reader_with(&lines);
    let analysis = analyze_dataset(&reader, "basin", &ReportOptions::default()).unwrap();
    assert_eq!(analysis.report.trends, Trend::InsufficientData);
    let json = serde_json::to_value(&analysis.report).unwrap();
    assert_eq!(json["trends"], serde_json::json!({ "trend": "insufficient_data" }));
}
