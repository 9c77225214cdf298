//! Coded-record ingestion for pucweb
//!
//! The upstream accounting system exposes the budget-execution data set as a
//! flat JSON array of coded records. This crate owns that boundary: the
//! record shape, code validation, and a source trait so the report layer
//! never cares where the rows came from.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

pub mod error;
pub mod types;

pub use error::SourceError;
pub use types::{validate_code, CodedRecord};

// ==================== Source Trait ====================

/// Source reference type
pub type SourceRef = Arc<dyn RecordSourceTrait>;

/// Trait for coded-record sources
#[async_trait]
pub trait RecordSourceTrait: Send + Sync {
    /// Parse records from raw JSON content
    async fn parse(&self, content: &str) -> Result<Vec<CodedRecord>, SourceError>;

    /// Fetch records from a file path
    async fn fetch_file(&self, path: PathBuf) -> Result<Vec<CodedRecord>, SourceError>;
}

/// Default source implementation reading a JSON array from disk
#[derive(Debug, Default)]
pub struct JsonRecordSource;

#[async_trait]
impl RecordSourceTrait for JsonRecordSource {
    async fn parse(&self, content: &str) -> Result<Vec<CodedRecord>, SourceError> {
        let records: Vec<CodedRecord> = serde_json::from_str(content)
            .map_err(|e| SourceError::JsonError {
                location: format!("line {}", e.line()),
                message: e.to_string(),
            })?;

        // Reject malformed codes here, before any topology resolution runs
        for record in &records {
            validate_code(&record.code)
                .map_err(|message| SourceError::InvalidRecord { message })?;
        }

        Ok(records)
    }

    async fn fetch_file(&self, path: PathBuf) -> Result<Vec<CodedRecord>, SourceError> {
        let content = tokio::fs::read_to_string(&path).await
            .map_err(SourceError::IoError)?;
        self.parse(&content).await
    }
}

// ==================== Tests ====================
