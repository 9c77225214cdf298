//! Error types for pucweb-core
//!
//! This module provides error handling for the aggregation engine,
//! including error codes, detailed messages, and suggestions.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use pucweb_source::SourceError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Records not loaded
    NotLoaded,
    /// Duplicate account code in the input
    DuplicateCode,
    /// Malformed account code
    InvalidCode,
    /// Record source failure
    SourceError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::DuplicateCode => write!(f, "DUPLICATE_CODE"),
            ErrorCode::InvalidCode => write!(f, "INVALID_CODE"),
            ErrorCode::SourceError => write!(f, "SOURCE_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Debug information
    Debug,
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Main error type for pucweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Records not loaded")]
    NotLoaded,

    #[error("Duplicate account code: {code}")]
    DuplicateCode { code: String },

    #[error("Invalid account code '{code}': {reason}")]
    InvalidCode { code: String, reason: String },

    #[error("Record source error: {message}")]
    SourceError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::DuplicateCode { .. } => ErrorCode::DuplicateCode,
            CoreError::InvalidCode { .. } => ErrorCode::InvalidCode,
            CoreError::SourceError { .. } => ErrorCode::SourceError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::NotLoaded => ErrorSeverity::Warning,
            CoreError::DuplicateCode { .. } => ErrorSeverity::Error,
            CoreError::InvalidCode { .. } => ErrorSeverity::Error,
            CoreError::SourceError { .. } => ErrorSeverity::Error,
            CoreError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(
            self.code(),
            self.to_string(),
        );

        match self {
            CoreError::DuplicateCode { code } => {
                details = details.with_detail(serde_json::json!({ "code": code }));
                details = details.with_suggestion(format!(
                    "Each account code may appear at most once; check the upstream export for code '{}'.", code
                ));
            }
            CoreError::InvalidCode { code, reason } => {
                details = details.with_detail(serde_json::json!({ "code": code, "reason": reason }));
                details = details.with_suggestion(
                    "Account codes must be non-empty strings of decimal digits.".to_string()
                );
            }
            CoreError::SourceError { message } => {
                details = details.with_detail(serde_json::json!({ "source_message": message }));
                details = details.with_suggestion(
                    "Check the records file path and its JSON contents.".to_string()
                );
            }
            CoreError::NotLoaded => {
                details = details.with_suggestion(
                    "Load the records file before requesting a report.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

impl From<SourceError> for CoreError {
    fn from(error: SourceError) -> Self {
        CoreError::SourceError { message: error.to_string() }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::NotLoaded.to_string(), "NOT_LOADED");
        assert_eq!(ErrorCode::DuplicateCode.to_string(), "DUPLICATE_CODE");
        assert_eq!(ErrorCode::InvalidCode.to_string(), "INVALID_CODE");
    }

    #[test]
    fn test_core_error_code() {
        let error = CoreError::DuplicateCode { code: "11".to_string() };
        assert_eq!(error.code(), ErrorCode::DuplicateCode);

        let error = CoreError::NotLoaded;
        assert_eq!(error.code(), ErrorCode::NotLoaded);
    }

    #[test]
    fn test_core_error_severity() {
        assert_eq!(CoreError::NotLoaded.severity(), ErrorSeverity::Warning);
        assert_eq!(
            CoreError::InternalError { message: "x".to_string() }.severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_error_details_duplicate_code() {
        let error = CoreError::DuplicateCode { code: "110505".to_string() };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::DuplicateCode);
        assert!(details.message.contains("110505"));
        assert!(!details.suggestions.is_empty());
    }

    #[test]
    fn test_from_source_error() {
        let source = SourceError::InvalidRecord { message: "bad row".to_string() };
        let error: CoreError = source.into();
        assert_eq!(error.code(), ErrorCode::SourceError);
        assert!(error.to_string().contains("bad row"));
    }
}
