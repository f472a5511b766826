//! Dataset reader: discovery, cached loading, filtered queries and summaries.
//!
//! A dataset is a file in the data directory, named by its stem. When the same stem exists
//! under several extensions, the first in [`ReaderOptions::extensions`] wins.
//!
//! ```no_run
//! use rainfall_analytics::reader::RainfallReader;
//!
//! let reader = RainfallReader::new("data");
//! for name in reader.list_datasets() {
//!     let summary = reader.summary(&name)?;
//!     println!("{name}: {} records", summary.total_records);
//! }
//! # Ok::<(), rainfall_analytics::error::RainfallError>(())
//! ```

mod cache;
pub mod query;
pub mod summary;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{RainfallError, RainfallResult};
use crate::ingestion::{IngestionOptions, load_table};
use crate::types::Table;

pub use cache::DatasetCache;
pub use query::{FilterError, QueryFilters, RegionFilter, apply_filters};
pub use summary::{CombinedSummary, DatasetSummary, DateRange, FileSummary, RainfallStats};

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Supported extensions, in resolution preference order.
    pub extensions: Vec<String>,
    /// Files whose name starts with this character are editor/lock files and never listed.
    pub temp_file_marker: char,
    /// Options passed to every file load.
    pub ingestion: IngestionOptions,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["xlsx".into(), "txt".into(), "csv".into()],
            temp_file_marker: '~',
            ingestion: IngestionOptions::default(),
        }
    }
}

/// Every dataset loaded by [`RainfallReader::read_all`], plus the names that failed.
#[derive(Debug, Default)]
pub struct LoadedDatasets {
    pub tables: BTreeMap<String, Arc<Table>>,
    pub failed: Vec<String>,
}

/// Reads rainfall datasets from one directory and caches parsed tables by name.
#[derive(Debug)]
pub struct RainfallReader {
    data_dir: PathBuf,
    options: ReaderOptions,
    cache: DatasetCache,
}

impl RainfallReader {
    /// Reader over `data_dir` with default options.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_options(data_dir, ReaderOptions::default())
    }

    pub fn with_options(data_dir: impl Into<PathBuf>, options: ReaderOptions) -> Self {
        Self {
            data_dir: data_dir.into(),
            options,
            cache: DatasetCache::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// The table cache backing [`Self::read`].
    pub fn cache(&self) -> &DatasetCache {
        &self.cache
    }

    /// Names of every dataset in the data directory, sorted and deduplicated.
    ///
    /// A missing directory yields an empty list.
    pub fn list_datasets(&self) -> Vec<String> {
        if !self.data_dir.is_dir() {
            warn!(data_dir = %self.data_dir.display(), "data directory does not exist");
            return Vec::new();
        }

        let escaped = glob::Pattern::escape(&self.data_dir.to_string_lossy());
        let mut names = BTreeSet::new();
        for ext in &self.options.extensions {
            let pattern = format!("{escaped}/*.{ext}");
            let entries = match glob::glob(&pattern) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(%pattern, error = %e, "invalid discovery pattern");
                    continue;
                }
            };
            for entry in entries {
                let path = match entry {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, "cannot read directory entry");
                        continue;
                    }
                };
                if !path.is_file() {
                    continue;
                }
                let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
                    continue;
                };
                if file_name.starts_with(self.options.temp_file_marker) {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.insert(stem.to_owned());
                }
            }
        }
        debug!(count = names.len(), "discovered datasets");
        names.into_iter().collect()
    }

    /// Read a dataset through the cache.
    pub fn read(&self, name: &str) -> RainfallResult<Arc<Table>> {
        self.read_with(name, true)
    }

    /// Read a dataset, consulting and populating the cache only when `use_cache` is set.
    pub fn read_with(&self, name: &str, use_cache: bool) -> RainfallResult<Arc<Table>> {
        if !use_cache {
            let path = self.resolve_path(name)?;
            return load_table(name, &path, &self.options.ingestion).map(Arc::new);
        }
        if let Some(table) = self.cache.get(name) {
            debug!(dataset = name, "cache hit");
            return Ok(table);
        }
        self.cache.get_or_try_insert_with(name, || {
            let path = self.resolve_path(name)?;
            load_table(name, &path, &self.options.ingestion)
        })
    }

    /// Read every discoverable dataset; failures are logged and listed, never fatal.
    pub fn read_all(&self) -> LoadedDatasets {
        let mut loaded = LoadedDatasets::default();
        for name in self.list_datasets() {
            match self.read(&name) {
                Ok(table) => {
                    loaded.tables.insert(name, table);
                }
                Err(e) => {
                    error!(dataset = %name, error = %e, "skipping dataset");
                    loaded.failed.push(name);
                }
            }
        }
        loaded
    }

    /// Rows of `name` matching `filters`.
    ///
    /// If the filters cannot be applied (an unparseable bound date or a NaN bound), the
    /// unfiltered table is returned and the problem is logged.
    pub fn query(&self, name: &str, filters: &QueryFilters) -> RainfallResult<Arc<Table>> {
        let table = self.read(name)?;
        if filters.is_empty() {
            return Ok(table);
        }
        match apply_filters(&table, filters) {
            Ok(filtered) => {
                debug!(
                    dataset = name,
                    matched = filtered.row_count(),
                    total = table.row_count(),
                    "applied filters"
                );
                Ok(Arc::new(filtered))
            }
            Err(e) => {
                warn!(dataset = name, stage = "filter", error = %e, "returning unfiltered data");
                Ok(table)
            }
        }
    }

    /// Descriptive summary of one dataset.
    pub fn summary(&self, name: &str) -> RainfallResult<DatasetSummary> {
        let table = self.read(name)?;
        Ok(summary::summarize(name, &table))
    }

    /// Summary across every readable dataset, computed fresh on each call.
    pub fn combined_summary(&self) -> CombinedSummary {
        let loaded = self.read_all();
        let combined = summary::combine(
            loaded.tables.iter().map(|(name, table)| (name.as_str(), table.as_ref())),
            loaded.failed,
        );
        info!(
            files = combined.total_files,
            failed = combined.failed_files.len(),
            records = combined.total_records,
            "computed combined summary"
        );
        combined
    }

    /// Drop every cached table.
    pub fn clear_cache(&self) {
        let dropped = self.cache.len();
        self.cache.clear();
        info!(dropped, "cleared dataset cache");
    }

    fn resolve_path(&self, name: &str) -> RainfallResult<PathBuf> {
        let mut tried = Vec::with_capacity(self.options.extensions.len());
        if is_plain_name(name) {
            for ext in &self.options.extensions {
                let path = self.data_dir.join(format!("{name}.{ext}"));
                if path.is_file() {
                    return Ok(path);
                }
                tried.push(path.display().to_string());
            }
        }
        error!(dataset = name, data_dir = %self.data_dir.display(), "dataset not found");
        Err(RainfallError::DatasetNotFound {
            name: name.to_owned(),
            tried,
        })
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_only() {
        assert!(is_plain_name("north_2024"));
        assert!(is_plain_name("降雨量"));
        assert!(!is_plain_name("../secret"));
        assert!(!is_plain_name("a/b"));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name(""));
    }

    #[test]
    fn missing_directory_lists_nothing() {
        let reader = RainfallReader::new("/definitely/not/here");
        assert!(reader.list_datasets().is_empty());
        let combined = reader.combined_summary();
        assert_eq!(combined.total_files, 0);
        assert!(combined.rainfall_stats.is_none());
    }

    #[test]
    fn traversal_names_are_not_found() {
        let reader = RainfallReader::new("/tmp");
        let err = reader.read("../etc/passwd").unwrap_err();
        assert!(err.is_not_found());
        assert!(reader.cache().is_empty());
    }
}
