//! File ingestion: format-specific readers and normalization.
//!
//! Most callers go through [`crate::reader::RainfallReader`], which resolves a dataset name to
//! a file and calls [`load_table`] (from [`unified`]). That function:
//!
//! - infers the format from the file extension
//! - decodes delimited text under an ordered list of [`TextEncoding`]s
//! - drops empty rows/columns and renames the first three columns positionally
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`delimited`]
//! - `excel` (cargo feature `excel`)

pub mod delimited;
pub mod encoding;
#[cfg(feature = "excel")]
pub mod excel;
pub mod normalize;
pub mod observability;
pub mod unified;

pub use encoding::TextEncoding;
pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, TracingObserver,
};
pub use unified::{DatasetFormat, IngestionOptions, load_table};
