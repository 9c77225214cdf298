//! Rollup, filter and flattening passes
//!
//! Every pass takes a forest and returns a new one; nodes are never mutated
//! after a pass has returned them. Variance is an independently supplied
//! measure and is summed by the same rule as budgeted and executed, never
//! recomputed from them.

use crate::types::{AccountNode, ExecutionRow, ExecutionTotals};

/// Label of the trailing aggregate row in flattened exports
pub const TOTALS_ROW_NAME: &str = "TOTAL";

/// Compute postorder rollups over the forest.
///
/// Siblings (and the roots themselves) are sorted ascending by code as a
/// side effect. The compliance ratio is zero-guarded: a zero budgeted
/// rollup yields 0, never NaN or infinity.
pub fn compute_rollups(forest: Vec<AccountNode>) -> Vec<AccountNode> {
    let mut forest: Vec<AccountNode> = forest.into_iter().map(rollup_node).collect();
    forest.sort_by(|a, b| a.code.cmp(&b.code));
    forest
}

fn rollup_node(mut node: AccountNode) -> AccountNode {
    let mut children: Vec<AccountNode> =
        node.children.drain(..).map(rollup_node).collect();
    children.sort_by(|a, b| a.code.cmp(&b.code));

    // Synthetic nodes carry structure only; their own amounts are zero by
    // construction but are excluded here regardless
    let (own_b, own_e, own_v) = if node.is_synthetic {
        (0.0, 0.0, 0.0)
    } else {
        (node.own_budgeted, node.own_executed, node.own_variance)
    };

    node.rollup_budgeted = own_b + children.iter().map(|c| c.rollup_budgeted).sum::<f64>();
    node.rollup_executed = own_e + children.iter().map(|c| c.rollup_executed).sum::<f64>();
    node.rollup_variance = own_v + children.iter().map(|c| c.rollup_variance).sum::<f64>();
    node.compliance_ratio = compliance_ratio(node.rollup_executed, node.rollup_budgeted);
    node.children = children;
    node
}

/// Zero-guarded executed/budgeted percentage
pub fn compliance_ratio(executed: f64, budgeted: f64) -> f64 {
    if budgeted != 0.0 {
        executed / budgeted * 100.0
    } else {
        0.0
    }
}

/// Sum the rollups over the root nodes only. Roots are disjoint subtrees,
/// so no value can be counted twice.
pub fn global_totals(forest: &[AccountNode]) -> ExecutionTotals {
    let budgeted: f64 = forest.iter().map(|n| n.rollup_budgeted).sum();
    let executed: f64 = forest.iter().map(|n| n.rollup_executed).sum();
    let variance: f64 = forest.iter().map(|n| n.rollup_variance).sum();
    ExecutionTotals {
        budgeted,
        executed,
        variance,
        compliance_ratio: compliance_ratio(executed, budgeted),
    }
}

/// Structure-preserving substring search over the forest.
///
/// A node is kept if it matches the term (case-insensitive, against code or
/// name) or if any descendant does. Ancestors of matches are always
/// retained. A matching node whose descendants all miss keeps its entire
/// original child list, so a matched group is never shown as an empty
/// subtree. An empty term is the identity.
pub fn filter_forest(forest: &[AccountNode], term: &str) -> Vec<AccountNode> {
    if term.is_empty() {
        return forest.to_vec();
    }
    let needle = term.to_lowercase();
    filter_nodes(forest, &needle)
}

fn filter_nodes(nodes: &[AccountNode], needle: &str) -> Vec<AccountNode> {
    let mut kept = Vec::new();
    for node in nodes {
        let own_match = node.matches(needle);
        let kept_children = filter_nodes(&node.children, needle);

        if own_match && !node.children.is_empty() && kept_children.is_empty() {
            // Direct match with no matching descendants: show the full
            // original subtree instead of an empty one
            kept.push(node.clone());
        } else if own_match || !kept_children.is_empty() {
            let mut filtered = node.clone();
            filtered.children = kept_children;
            kept.push(filtered);
        }
    }
    kept
}

/// Preorder flattening of a (possibly filtered) forest into report rows.
/// Children are visited in their stored order, which the rollup pass keeps
/// ascending by code.
pub fn flatten(forest: &[AccountNode]) -> Vec<ExecutionRow> {
    let mut rows = Vec::new();
    for node in forest {
        flatten_node(node, 0, &mut rows);
    }
    rows
}

fn flatten_node(node: &AccountNode, level: usize, rows: &mut Vec<ExecutionRow>) {
    rows.push(ExecutionRow {
        code: node.code.clone(),
        name: node.name.clone(),
        level,
        budgeted: node.rollup_budgeted,
        executed: node.rollup_executed,
        variance: node.rollup_variance,
        compliance_ratio: node.compliance_ratio,
    });
    for child in &node.children {
        flatten_node(child, level + 1, rows);
    }
}

/// Flatten the forest and append the trailing aggregate row with the
/// global totals.
pub fn execution_rows(forest: &[AccountNode]) -> Vec<ExecutionRow> {
    let mut rows = flatten(forest);
    let totals = global_totals(forest);
    rows.push(ExecutionRow {
        code: String::new(),
        name: TOTALS_ROW_NAME.to_string(),
        level: 0,
        budgeted: totals.budgeted,
        executed: totals.executed,
        variance: totals.variance,
        compliance_ratio: totals.compliance_ratio,
    });
    rows
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::build_forest;
    use pucweb_source::CodedRecord;

    fn record(code: &str, name: &str, budgeted: f64, executed: f64, variance: f64) -> CodedRecord {
        CodedRecord {
            code: code.to_string(),
            name: name.to_string(),
            budgeted,
            executed,
            variance,
        }
    }

    /// The two-branch data set from the budget-execution screen
    fn sample_forest() -> Vec<AccountNode> {
        let records = vec![
            record("110505", "Caja Principal", 600.0, 500.0, -100.0),
            record("130505", "Clientes Nacionales", 2000.0, 2200.0, 200.0),
        ];
        compute_rollups(build_forest(&records).unwrap())
    }

    fn find<'a>(forest: &'a [AccountNode], code: &str) -> Option<&'a AccountNode> {
        for node in forest {
            if node.code == code {
                return Some(node);
            }
            if let Some(found) = find(&node.children, code) {
                return Some(found);
            }
        }
        None
    }

    fn assert_sorted(nodes: &[AccountNode]) {
        for pair in nodes.windows(2) {
            assert!(pair[0].code < pair[1].code, "siblings out of order: {} >= {}", pair[0].code, pair[1].code);
        }
        for node in nodes {
            assert_sorted(&node.children);
        }
    }

    fn sum_own(nodes: &[AccountNode]) -> (f64, f64, f64) {
        let mut totals = (0.0, 0.0, 0.0);
        fn walk(nodes: &[AccountNode], totals: &mut (f64, f64, f64)) {
            for n in nodes {
                if !n.is_synthetic {
                    totals.0 += n.own_budgeted;
                    totals.1 += n.own_executed;
                    totals.2 += n.own_variance;
                }
                walk(&n.children, totals);
            }
        }
        walk(nodes, &mut totals);
        totals
    }

    #[test]
    fn test_rollup_two_branch_scenario() {
        let forest = sample_forest();
        assert_eq!(forest.len(), 1);

        let root = &forest[0];
        assert_eq!(root.code, "1");
        assert_eq!(root.rollup_budgeted, 2600.0);
        assert_eq!(root.rollup_executed, 2700.0);
        assert_eq!(root.rollup_variance, 100.0);
        assert!((root.compliance_ratio - 103.84615384615384).abs() < 1e-9);

        let branch_11 = find(&forest, "11").unwrap();
        assert_eq!(branch_11.rollup_budgeted, 600.0);
        assert_eq!(branch_11.rollup_executed, 500.0);
        assert_eq!(branch_11.rollup_variance, -100.0);

        let branch_13 = find(&forest, "13").unwrap();
        assert_eq!(branch_13.rollup_budgeted, 2000.0);
        assert_eq!(branch_13.rollup_variance, 200.0);
    }

    #[test]
    fn test_node_with_own_and_descendant_postings() {
        let records = vec![
            record("11", "Disponible", 50.0, 40.0, -10.0),
            record("1105", "Caja", 10.0, 5.0, -5.0),
            record("110505", "Caja Principal", 600.0, 500.0, -100.0),
        ];
        let forest = compute_rollups(build_forest(&records).unwrap());

        // Own postings count exactly once at each level
        let node = find(&forest, "11").unwrap();
        assert_eq!(node.rollup_budgeted, 660.0);
        assert_eq!(node.rollup_executed, 545.0);
        assert_eq!(node.rollup_variance, -115.0);

        let root = find(&forest, "1").unwrap();
        assert_eq!(root.rollup_budgeted, 660.0);
    }

    #[test]
    fn test_conservation_of_amounts() {
        let records = vec![
            record("110505", "Caja Principal", 600.0, 500.0, -100.0),
            record("11", "Disponible", 50.0, 40.0, -10.0),
            record("130505", "Clientes Nacionales", 2000.0, 2200.0, 200.0),
            record("2105", "Bancos Nacionales", 300.0, 150.0, -150.0),
        ];
        let forest = compute_rollups(build_forest(&records).unwrap());

        let (own_b, own_e, own_v) = sum_own(&forest);
        let totals = global_totals(&forest);
        assert!((totals.budgeted - own_b).abs() < 1e-9);
        assert!((totals.executed - own_e).abs() < 1e-9);
        assert!((totals.variance - own_v).abs() < 1e-9);
    }

    #[test]
    fn test_siblings_sorted_at_every_level() {
        let records = vec![
            record("130505", "Clientes Nacionales", 1.0, 1.0, 0.0),
            record("110505", "Caja Principal", 1.0, 1.0, 0.0),
            record("1110", "Bancos", 1.0, 1.0, 0.0),
            record("1105", "Caja", 1.0, 1.0, 0.0),
            record("2", "Pasivo", 1.0, 1.0, 0.0),
        ];
        let forest = compute_rollups(build_forest(&records).unwrap());
        assert_sorted(&forest);
    }

    #[test]
    fn test_compliance_zero_budget_is_zero() {
        let records = vec![record("11", "Disponible", 0.0, 500.0, 0.0)];
        let forest = compute_rollups(build_forest(&records).unwrap());
        let node = find(&forest, "11").unwrap();
        assert_eq!(node.rollup_executed, 500.0);
        assert_eq!(node.compliance_ratio, 0.0);
        assert!(node.compliance_ratio.is_finite());
    }

    #[test]
    fn test_variance_is_aggregated_not_derived() {
        // Supplied variance deliberately disagrees with budgeted - executed
        let records = vec![record("11", "Disponible", 100.0, 40.0, 7.0)];
        let forest = compute_rollups(build_forest(&records).unwrap());
        let node = find(&forest, "11").unwrap();
        assert_eq!(node.rollup_variance, 7.0);
        assert_eq!(node.derived_variance(), 60.0);
    }

    #[test]
    fn test_filter_empty_term_is_identity() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, "");
        assert_eq!(filtered, forest);
    }

    #[test]
    fn test_filter_keeps_matched_branch_only() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, "Caja");

        // The "13" branch is entirely absent
        assert!(find(&filtered, "13").is_none());
        assert!(find(&filtered, "130505").is_none());

        // The matched leaf and every ancestor up to the root survive
        for code in ["1", "11", "1105", "110505"] {
            assert!(find(&filtered, code).is_some(), "expected {} in result", code);
        }
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, "caja");
        assert!(find(&filtered, "110505").is_some());

        let filtered = filter_forest(&forest, "CLIENTES");
        assert!(find(&filtered, "130505").is_some());
        assert!(find(&filtered, "110505").is_none());
    }

    #[test]
    fn test_filter_matched_group_keeps_full_subtree() {
        let forest = sample_forest();
        // "GROUP 1105" matches the synthetic node by name; its only child
        // does not match the term
        let filtered = filter_forest(&forest, "GROUP 1105");

        let group = find(&filtered, "1105").expect("matched group retained");
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].code, "110505");
    }

    #[test]
    fn test_filter_by_code_substring() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, "1305");
        assert!(find(&filtered, "130505").is_some());
        assert!(find(&filtered, "110505").is_none());
    }

    #[test]
    fn test_filter_no_match_drops_everything() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, "no-such-term");
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_flatten_levels_and_order() {
        let forest = sample_forest();
        let rows = flatten(&forest);

        let expected: Vec<(&str, usize)> = vec![
            ("1", 0),
            ("11", 1),
            ("1105", 2),
            ("110505", 3),
            ("13", 1),
            ("1305", 2),
            ("130505", 3),
        ];
        let actual: Vec<(&str, usize)> =
            rows.iter().map(|r| (r.code.as_str(), r.level)).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_execution_rows_trailing_total() {
        let forest = sample_forest();
        let rows = execution_rows(&forest);

        let total = rows.last().unwrap();
        assert_eq!(total.code, "");
        assert_eq!(total.name, TOTALS_ROW_NAME);
        assert_eq!(total.budgeted, 2600.0);
        assert_eq!(total.executed, 2700.0);
        assert_eq!(total.variance, 100.0);
        assert!((total.compliance_ratio - 103.84615384615384).abs() < 1e-9);
        assert_eq!(rows.len(), 8);
    }

    #[test]
    fn test_flatten_of_filtered_forest() {
        let forest = sample_forest();
        let filtered = filter_forest(&forest, "Clientes");
        let rows = execution_rows(&filtered);

        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["1", "13", "1305", "130505", ""]);

        // Totals row reflects the roots of the flattened forest
        let total = rows.last().unwrap();
        assert_eq!(total.budgeted, 2600.0);
    }
}
