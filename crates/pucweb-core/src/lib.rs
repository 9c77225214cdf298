//! Budget-execution aggregation engine and business logic
//!
//! The engine turns a flat list of coded records into an account forest
//! (synthesizing implied group nodes), computes bottom-up rollups of the
//! three supplied measures, and supports a structure-preserving substring
//! search. `ReportBook` holds the current record snapshot and rebuilds the
//! forest from scratch on every report request.

pub mod error;
pub mod forest;
pub mod report;
pub mod topology;
pub mod types;

use std::path::PathBuf;
use std::sync::RwLock;

use pucweb_config::Config;
use pucweb_source::{CodedRecord, SourceRef};

pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use forest::build_forest;
pub use report::{
    compliance_ratio, compute_rollups, execution_rows, filter_forest, flatten, global_totals,
    TOTALS_ROW_NAME,
};
pub use topology::parent_of;
pub use types::{AccountNode, BookSummary, ExecutionReport, ExecutionRow, ExecutionTotals};

// ==================== Report Book ====================

/// Holder of the current record snapshot.
///
/// Loading swaps in a full new snapshot; reports are pure computations over
/// a copy of it, so concurrent report requests need no coordination beyond
/// the snapshot lock.
pub struct ReportBook {
    config: Config,
    source: SourceRef,
    data: RwLock<Option<Vec<CodedRecord>>>,
    entry: RwLock<Option<PathBuf>>,
}

impl ReportBook {
    /// Create an empty report book
    pub fn new(config: Config, source: SourceRef) -> Self {
        Self {
            config,
            source,
            data: RwLock::new(None),
            entry: RwLock::new(None),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load records from a file through the configured source.
    ///
    /// The snapshot is validated up front by building the forest once, so a
    /// duplicate or malformed code is reported here rather than on the
    /// first report request.
    pub async fn load(&self, path: PathBuf) -> CoreResult<()> {
        let records = self.source.fetch_file(path.clone()).await?;
        forest::build_forest(&records)?;

        log::info!(
            target: "pucweb::core",
            "loaded {} records from {}",
            records.len(),
            path.display()
        );

        *self.data.write().unwrap() = Some(records);
        *self.entry.write().unwrap() = Some(path);
        Ok(())
    }

    /// Re-fetch records from the last loaded path, or the configured
    /// records path if nothing was loaded yet
    pub async fn reload(&self) -> CoreResult<()> {
        let path = self
            .entry
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| self.config.records_path());
        self.load(path).await
    }

    /// Get a copy of the loaded records
    pub fn records(&self) -> CoreResult<Vec<CodedRecord>> {
        self.data
            .read()
            .unwrap()
            .clone()
            .ok_or(CoreError::NotLoaded)
    }

    /// Number of loaded records
    pub fn record_count(&self) -> usize {
        self.data
            .read()
            .unwrap()
            .as_ref()
            .map(|records| records.len())
            .unwrap_or(0)
    }

    /// Build the aggregated (and optionally filtered) forest for the
    /// current snapshot
    pub fn execution_forest(&self, term: &str) -> CoreResult<Vec<AccountNode>> {
        let records = self.records()?;
        let forest = compute_rollups(build_forest(&records)?);
        if term.is_empty() {
            Ok(forest)
        } else {
            Ok(filter_forest(&forest, term))
        }
    }

    /// Build the flattened report (rows plus trailing totals row) for the
    /// current snapshot
    pub fn execution_report(&self, term: &str) -> CoreResult<ExecutionReport> {
        let forest = self.execution_forest(term)?;
        Ok(ExecutionReport {
            rows: execution_rows(&forest),
            totals: global_totals(&forest),
        })
    }

    /// Summary of the loaded data set
    pub fn summary(&self) -> CoreResult<BookSummary> {
        let records = self.records()?;
        let forest = compute_rollups(build_forest(&records)?);

        fn count(nodes: &[AccountNode]) -> (usize, usize) {
            let mut total = 0;
            let mut synthetic = 0;
            for node in nodes {
                total += 1;
                if node.is_synthetic {
                    synthetic += 1;
                }
                let (t, s) = count(&node.children);
                total += t;
                synthetic += s;
            }
            (total, synthetic)
        }
        let (total_nodes, synthetic_nodes) = count(&forest);

        Ok(BookSummary {
            total_records: records.len(),
            total_nodes,
            synthetic_nodes,
            totals: global_totals(&forest),
        })
    }
}

// ==================== Tests ====================
