//! Directory loading for the runner.
//!
//! Loads every tabular file in a directory, combines them into one table and
//! computes the dataset hash used for run fingerprinting. Per-file failures
//! and combine warnings are carried alongside the table; only an empty load
//! is fatal.

use std::path::Path;
use stockdash_core::data::{combine, load_directory, CombineWarning, CombinedTable, FileParseError};
use stockdash_core::domain::DatasetHash;
use tracing::info;

pub use stockdash_core::data::LoadError;

/// Result of loading a data directory.
#[derive(Debug)]
pub struct LoadedData {
    /// Combined rows, sorted by (ticker, date).
    pub table: CombinedTable,
    /// Files that could not be parsed.
    pub failures: Vec<FileParseError>,
    pub combine_warnings: Vec<CombineWarning>,
    /// BLAKE3 over the combined rows.
    pub dataset_hash: DatasetHash,
}

impl LoadedData {
    /// One human-readable line per failure and warning, in load order.
    pub fn messages(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| f.to_string())
            .chain(self.combine_warnings.iter().map(|w| w.to_string()))
            .collect()
    }
}

/// Load and combine all price files under `dir`.
pub fn load_data(dir: &Path) -> Result<LoadedData, LoadError> {
    let report = load_directory(dir)?;
    let combined = combine(report.series);

    let dataset_hash = combined.table.dataset_hash();
    info!(
        dir = %dir.display(),
        tickers = combined.table.tickers().count(),
        rows = combined.table.len(),
        failed_files = report.failures.len(),
        hash = %dataset_hash,
        "data loaded"
    );

    Ok(LoadedData {
        table: combined.table,
        failures: report.failures,
        combine_warnings: combined.warnings,
        dataset_hash,
    })
}
