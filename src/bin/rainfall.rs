//! `rainfall`: command-line access to the rainfall reader and report.
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rainfall_analytics::analysis::{self, PeriodBounds};
use rainfall_analytics::ingestion::IngestionOptions;
use rainfall_analytics::processing::{self, DEFAULT_THRESHOLD_PERCENTILE, ReportOptions, SeasonLabels};
use rainfall_analytics::reader::{QueryFilters, RainfallReader, ReaderOptions, RegionFilter};

#[derive(Parser, Debug)]
#[command(name = "rainfall", version, about = "Rainfall dataset statistics")]
struct Cli {
    /// Directory holding the dataset files.
    #[arg(long, env = "RAINFALL_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Log filter directive (e.g. `info`, `debug`, `rainfall_analytics=trace`).
    #[arg(long, env = "RAINFALL_LOG", default_value = "info")]
    log_level: String,

    /// Labels used for seasonal buckets.
    #[arg(long, value_enum, default_value_t = SeasonLabelSet::English)]
    season_labels: SeasonLabelSet,

    /// Force the field delimiter of text files (`tab`, `,`, `;`, ...) instead of sniffing it.
    #[arg(long, value_parser = parse_delimiter)]
    delimiter: Option<u8>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeasonLabelSet {
    English,
    Chinese,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available datasets.
    List {
        #[arg(long)]
        with_summary: bool,
    },
    /// Descriptive summary of one dataset.
    Summary { name: String },
    /// Summary across every dataset.
    Combined,
    /// Summary plus full statistics report of one dataset.
    Report {
        name: String,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD_PERCENTILE)]
        threshold: f64,
    },
    /// Filtered rows of one dataset.
    Query {
        name: String,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        /// Substring match against the region column.
        #[arg(long, conflicts_with = "regions")]
        region: Option<String>,
        /// Exact region values, comma separated.
        #[arg(long, value_delimiter = ',')]
        regions: Vec<String>,
        #[arg(long)]
        min_rainfall: Option<f64>,
        #[arg(long)]
        max_rainfall: Option<f64>,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Rows at or above a rainfall percentile, heaviest first.
    Extremes {
        name: String,
        #[arg(long, default_value_t = DEFAULT_THRESHOLD_PERCENTILE)]
        threshold: f64,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Monthly trend of one dataset.
    Trend { name: String },
    /// Compare two date windows of one dataset.
    Compare {
        name: String,
        start1: String,
        end1: String,
        start2: String,
        end2: String,
    },
}

#[derive(Serialize)]
struct Named<'a, T: Serialize> {
    filename: &'a str,
    #[serde(flatten)]
    inner: T,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let reader = RainfallReader::with_options(
        &cli.data_dir,
        ReaderOptions {
            ingestion: IngestionOptions {
                delimiter: cli.delimiter,
                ..IngestionOptions::default()
            },
            ..ReaderOptions::default()
        },
    );
    let season_labels = match cli.season_labels {
        SeasonLabelSet::English => SeasonLabels::default(),
        SeasonLabelSet::Chinese => SeasonLabels::chinese(),
    };
    let report_options = |threshold: f64| ReportOptions {
        extreme_threshold_percentile: threshold,
        season_labels: season_labels.clone(),
    };

    match cli.command {
        Command::List { with_summary } => print_json(&analysis::list_datasets(&reader, with_summary)),
        Command::Summary { name } => {
            let summary = reader.summary(&name).with_context(|| format!("summarizing '{name}'"))?;
            print_json(&summary)
        }
        Command::Combined => print_json(&reader.combined_summary()),
        Command::Report { name, threshold } => {
            let analysis = analysis::analyze_dataset(&reader, &name, &report_options(threshold))
                .with_context(|| format!("analyzing '{name}'"))?;
            print_json(&analysis)
        }
        Command::Query {
            name,
            start_date,
            end_date,
            region,
            regions,
            min_rainfall,
            max_rainfall,
            limit,
        } => {
            let region = match (region, regions.is_empty()) {
                (Some(pattern), _) => Some(RegionFilter::Pattern(pattern)),
                (None, false) => Some(RegionFilter::OneOf(regions)),
                (None, true) => None,
            };
            let filters = QueryFilters {
                start_date,
                end_date,
                region,
                min_rainfall,
                max_rainfall,
            };
            let page = analysis::query_page(&reader, &name, &filters, limit)
                .with_context(|| format!("querying '{name}'"))?;
            print_json(&page)
        }
        Command::Extremes { name, threshold, limit } => {
            let table = reader.read(&name).with_context(|| format!("reading '{name}'"))?;
            print_json(&Named {
                filename: &name,
                inner: analysis::top_extremes(&table, threshold, limit),
            })
        }
        Command::Trend { name } => {
            let table = reader.read(&name).with_context(|| format!("reading '{name}'"))?;
            print_json(&Named {
                filename: &name,
                inner: processing::trend(&table),
            })
        }
        Command::Compare {
            name,
            start1,
            end1,
            start2,
            end2,
        } => {
            let comparison = analysis::compare_periods(
                &reader,
                &name,
                &PeriodBounds::new(start1, end1),
                &PeriodBounds::new(start2, end2),
                &report_options(DEFAULT_THRESHOLD_PERCENTILE),
            )
            .with_context(|| format!("comparing periods of '{name}'"))?;
            if !comparison.both_have_data() {
                tracing::warn!(dataset = %name, "one or both periods contain no data");
            }
            print_json(&comparison)
        }
    }
}

fn setup_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing result")?;
    println!("{text}");
    Ok(())
}

fn parse_delimiter(raw: &str) -> Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        "comma" => Ok(b','),
        "semicolon" => Ok(b';'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(format!("expected a single ASCII character or `tab`, got '{other}'")),
    }
}
