//! Node and report types for the aggregation engine

use serde::{Deserialize, Serialize};
use pucweb_source::CodedRecord;

/// One node of the account forest.
///
/// Own amounts are copied verbatim from the matching input record and are
/// zero for synthetic nodes. Rollup fields are populated by the rollup pass;
/// nodes are treated as immutable once a pass has returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNode {
    /// Account code, unique within the forest
    pub code: String,
    /// Account name
    pub name: String,
    /// Amounts posted directly to this code
    pub own_budgeted: f64,
    pub own_executed: f64,
    pub own_variance: f64,
    /// True if no input record carried this exact code
    pub is_synthetic: bool,
    /// Child nodes, ascending by code after the rollup pass
    pub children: Vec<AccountNode>,
    /// Own amounts plus all descendant rollups
    pub rollup_budgeted: f64,
    pub rollup_executed: f64,
    pub rollup_variance: f64,
    /// Executed over budgeted as a percentage, 0 when budgeted is 0
    pub compliance_ratio: f64,
}

impl AccountNode {
    /// Create a real node from an input record
    pub fn from_record(record: &CodedRecord) -> Self {
        Self {
            code: record.code.clone(),
            name: record.name.clone(),
            own_budgeted: record.budgeted,
            own_executed: record.executed,
            own_variance: record.variance,
            is_synthetic: false,
            children: vec![],
            rollup_budgeted: 0.0,
            rollup_executed: 0.0,
            rollup_variance: 0.0,
            compliance_ratio: 0.0,
        }
    }

    /// Create a synthetic group node for an implied ancestor code
    pub fn synthetic(code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: format!("GROUP {}", code),
            own_budgeted: 0.0,
            own_executed: 0.0,
            own_variance: 0.0,
            is_synthetic: true,
            children: vec![],
            rollup_budgeted: 0.0,
            rollup_executed: 0.0,
            rollup_variance: 0.0,
            compliance_ratio: 0.0,
        }
    }

    /// Variance derived from the rollups, for cross-checking against the
    /// independently supplied variance rollup. The two are not required
    /// to agree.
    pub fn derived_variance(&self) -> f64 {
        self.rollup_budgeted - self.rollup_executed
    }

    /// Case-insensitive substring match against code or name
    pub fn matches(&self, needle_lower: &str) -> bool {
        self.code.to_lowercase().contains(needle_lower)
            || self.name.to_lowercase().contains(needle_lower)
    }
}

/// Global totals over the root nodes of a forest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTotals {
    pub budgeted: f64,
    pub executed: f64,
    pub variance: f64,
    pub compliance_ratio: f64,
}

/// One flattened report row (preorder position, indentation level)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRow {
    pub code: String,
    pub name: String,
    pub level: usize,
    pub budgeted: f64,
    pub executed: f64,
    pub variance: f64,
    pub compliance_ratio: f64,
}

/// Budget-execution report: flattened rows (with a trailing totals row)
/// plus the totals themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub rows: Vec<ExecutionRow>,
    pub totals: ExecutionTotals,
}

/// Summary of the loaded record set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSummary {
    pub total_records: usize,
    pub total_nodes: usize,
    pub synthetic_nodes: usize,
    pub totals: ExecutionTotals,
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_node_shape() {
        let node = AccountNode::synthetic("1105");
        assert_eq!(node.code, "1105");
        assert_eq!(node.name, "GROUP 1105");
        assert!(node.is_synthetic);
        assert_eq!(node.own_budgeted, 0.0);
        assert_eq!(node.own_executed, 0.0);
        assert_eq!(node.own_variance, 0.0);
    }

    #[test]
    fn test_from_record_copies_amounts() {
        let record = CodedRecord {
            code: "110505".to_string(),
            name: "Caja Principal".to_string(),
            budgeted: 600.0,
            executed: 500.0,
            variance: -100.0,
        };
        let node = AccountNode::from_record(&record);
        assert!(!node.is_synthetic);
        assert_eq!(node.own_budgeted, 600.0);
        assert_eq!(node.own_executed, 500.0);
        assert_eq!(node.own_variance, -100.0);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let record = CodedRecord {
            code: "110505".to_string(),
            name: "Caja Principal".to_string(),
            budgeted: 0.0,
            executed: 0.0,
            variance: 0.0,
        };
        let node = AccountNode::from_record(&record);
        assert!(node.matches("caja"));
        assert!(node.matches("1105"));
        assert!(!node.matches("clientes"));
    }

    #[test]
    fn test_derived_variance() {
        let mut node = AccountNode::synthetic("1");
        node.rollup_budgeted = 2600.0;
        node.rollup_executed = 2700.0;
        assert_eq!(node.derived_variance(), -100.0);
    }
}
