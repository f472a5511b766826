//! `rainfall-analytics` reads rainfall observation files of uneven quality into an in-memory
//! [`types::Table`] and computes statistics over them.
//!
//! The primary entrypoint is [`reader::RainfallReader`], which discovers datasets in a
//! directory, loads them (auto-detecting format and text encoding), normalizes the columns
//! and caches the result by dataset name.
//!
//! ## What you can read
//!
//! **File formats (by extension, in resolution order):**
//!
//! - **Spreadsheets** (requires the Cargo feature `excel`, on by default): `.xlsx`, first sheet
//! - **Delimited text**: `.txt`, `.csv` (tab, comma or semicolon; sniffed per file)
//!
//! **Text encodings**, tried in order: UTF-8, GBK, GB2312, UTF-16, Latin-1.
//!
//! Whatever the source headers say, the first three columns become `date`, `region` and
//! `rainfall`. Dates may be ISO (`2024-01-15`), Chinese (`2024年1月15日`) or one of several
//! common layouts; see [`dates::parse_date`].
//!
//! ## Quick example
//!
//! ```no_run
//! use rainfall_analytics::processing::{ReportOptions, report};
//! use rainfall_analytics::reader::RainfallReader;
//!
//! # fn main() -> Result<(), rainfall_analytics::RainfallError> {
//! let reader = RainfallReader::new("data");
//! let table = reader.read("station_north")?;
//! let report = report(&table, &ReportOptions::default());
//! println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`reader`]: discovery, cached reads, filtered queries, single and combined summaries
//! - [`ingestion`]: format-specific readers, encoding fallback, column normalization
//! - [`processing`]: basic/regional/period statistics, extreme events, trends, full report
//! - [`analysis`]: reader + processor compositions (dataset analysis, period comparison)
//! - [`dates`], [`stats`]: shared date parsing and numeric primitives
//! - [`types`], [`error`]: data model and error types
//!
//! Bad rows never fail a read. Unparseable dates and non-numeric rainfall are excluded from
//! the computation they affect; only a missing or unreadable dataset is an error.

pub mod analysis;
pub mod dates;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod reader;
pub mod stats;
pub mod types;

pub use error::{RainfallError, RainfallResult};
