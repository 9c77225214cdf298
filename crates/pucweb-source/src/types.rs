//! Record types for the ingestion boundary

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// One flat row of the budget-execution data set, keyed by a hierarchical
/// account code. Budgeted, executed and variance are supplied independently
/// by the upstream system; variance is never recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodedRecord {
    /// Hierarchical account code (non-empty decimal digits)
    pub code: String,
    /// Account name
    pub name: String,
    /// Budgeted amount
    #[serde(default)]
    pub budgeted: f64,
    /// Executed amount
    #[serde(default)]
    pub executed: f64,
    /// Variance amount, as supplied upstream
    #[serde(default)]
    pub variance: f64,
}

impl CodedRecord {
    /// Create a record, validating the code
    pub fn new(code: &str, name: &str, budgeted: f64, executed: f64, variance: f64) -> Result<Self, SourceError> {
        validate_code(code).map_err(|message| SourceError::InvalidRecord { message })?;
        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
            budgeted,
            executed,
            variance,
        })
    }
}

/// Check that an account code is a non-empty string of decimal digits.
///
/// Runs at ingestion, before any topology resolution sees the code.
pub fn validate_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("account code is empty".to_string());
    }
    if let Some(bad) = code.chars().find(|c| !c.is_ascii_digit()) {
        return Err(format!("account code '{}' contains non-digit character '{}'", code, bad));
    }
    Ok(())
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code_accepts_digits() {
        assert!(validate_code("1").is_ok());
        assert!(validate_code("110505").is_ok());
        assert!(validate_code("1105050102").is_ok());
    }

    #[test]
    fn test_validate_code_rejects_empty() {
        assert!(validate_code("").is_err());
    }

    #[test]
    fn test_validate_code_rejects_non_digits() {
        assert!(validate_code("11a5").is_err());
        assert!(validate_code("11 05").is_err());
        assert!(validate_code("-1105").is_err());
    }

    #[test]
    fn test_record_new_validates() {
        let record = CodedRecord::new("110505", "Caja Principal", 600.0, 500.0, -100.0).unwrap();
        assert_eq!(record.code, "110505");
        assert_eq!(record.budgeted, 600.0);

        assert!(CodedRecord::new("11x", "Bad", 0.0, 0.0, 0.0).is_err());
    }
}
