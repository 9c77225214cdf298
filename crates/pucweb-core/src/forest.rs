//! Tree synthesis
//!
//! Rebuilds the account forest from a flat record list on every invocation.
//! Ancestor codes that have no direct postings exist only conceptually in the
//! chart of accounts, so they are fabricated here as zero-valued group nodes.

use std::collections::HashMap;

use pucweb_source::{validate_code, CodedRecord};

use crate::error::{CoreError, CoreResult};
use crate::topology::parent_of;
use crate::types::AccountNode;

/// Build the account forest from a flat list of coded records.
///
/// One real node is created per record; every implied ancestor missing from
/// the input becomes a synthetic group node. Duplicate codes are a hard
/// failure and no partial forest is returned. The forest is unsorted at this
/// stage; sibling ordering is a side effect of the rollup pass.
pub fn build_forest(records: &[CodedRecord]) -> CoreResult<Vec<AccountNode>> {
    let mut nodes: HashMap<String, AccountNode> = HashMap::new();

    for record in records {
        validate_code(&record.code).map_err(|reason| CoreError::InvalidCode {
            code: record.code.clone(),
            reason,
        })?;
        if nodes.contains_key(&record.code) {
            return Err(CoreError::DuplicateCode {
                code: record.code.clone(),
            });
        }
        nodes.insert(record.code.clone(), AccountNode::from_record(record));
    }

    // Synthesize missing ancestors, walking each branch until it hits the
    // root or an already-known code
    let real_codes: Vec<String> = nodes.keys().cloned().collect();
    for code in real_codes {
        let mut current = code;
        while let Some(parent) = parent_of(&current).map(|p| p.to_string()) {
            if nodes.contains_key(&parent) {
                break;
            }
            nodes.insert(parent.clone(), AccountNode::synthetic(&parent));
            current = parent;
        }
    }

    // Group child codes under their parent; anything whose resolved parent
    // is absent from the map becomes a root (synthesis makes the absent
    // case unreachable, but linkage does not assume it)
    let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
    let mut roots: Vec<String> = Vec::new();
    for code in nodes.keys() {
        match parent_of(code) {
            Some(parent) if nodes.contains_key(parent) => {
                children_of
                    .entry(parent.to_string())
                    .or_default()
                    .push(code.clone());
            }
            _ => roots.push(code.clone()),
        }
    }

    let forest = roots
        .into_iter()
        .map(|code| assemble(code, &mut nodes, &mut children_of))
        .collect();
    Ok(forest)
}

/// Move a node out of the working map and attach its subtree.
fn assemble(
    code: String,
    nodes: &mut HashMap<String, AccountNode>,
    children_of: &mut HashMap<String, Vec<String>>,
) -> AccountNode {
    // Every code in roots/children_of was inserted into the node map first
    let mut node = nodes
        .remove(&code)
        .unwrap_or_else(|| AccountNode::synthetic(&code));
    if let Some(child_codes) = children_of.remove(&code) {
        node.children = child_codes
            .into_iter()
            .map(|child| assemble(child, nodes, children_of))
            .collect();
    }
    node
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str, budgeted: f64, executed: f64, variance: f64) -> CodedRecord {
        CodedRecord {
            code: code.to_string(),
            name: name.to_string(),
            budgeted,
            executed,
            variance,
        }
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

    fn count_nodes(forest: &[AccountNode]) -> usize {
        forest.iter().map(|n| 1 + count_nodes(&n.children)).sum()
    }

    #[test]
    fn test_empty_input_yields_empty_forest() {
        let forest = build_forest(&[]).unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn test_synthesizes_ancestor_chain() {
        let records = vec![
            record("110505", "Caja Principal", 600.0, 500.0, -100.0),
            record("130505", "Clientes Nacionales", 2000.0, 2200.0, 200.0),
        ];
        let forest = build_forest(&records).unwrap();

        // Both branches share the single synthetic root "1"
        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.code, "1");
        assert!(root.is_synthetic);

        for code in ["11", "1105", "13", "1305"] {
            let node = find(&forest, code).expect("ancestor must exist");
            assert!(node.is_synthetic, "node {} must be synthetic", code);
            assert_eq!(node.name, format!("GROUP {}", code));
            assert_eq!(node.own_budgeted, 0.0);
        }

        let leaf = find(&forest, "110505").unwrap();
        assert!(!leaf.is_synthetic);
        assert_eq!(leaf.name, "Caja Principal");

        // 1, 11, 1105, 110505, 13, 1305, 130505
        assert_eq!(count_nodes(&forest), 7);
    }

    #[test]
    fn test_every_input_code_appears_exactly_once() {
        let records = vec![
            record("1", "Activo", 100.0, 90.0, -10.0),
            record("11", "Disponible", 50.0, 40.0, -10.0),
            record("110505", "Caja Principal", 600.0, 500.0, -100.0),
        ];
        let forest = build_forest(&records).unwrap();

        for input in &records {
            let mut seen = 0;
            fn walk(nodes: &[AccountNode], code: &str, seen: &mut usize) {
                for n in nodes {
                    if n.code == code {
                        *seen += 1;
                    }
                    walk(&n.children, code, seen);
                }
            }
            walk(&forest, &input.code, &mut seen);
            assert_eq!(seen, 1, "code {} must appear exactly once", input.code);
        }
    }

    #[test]
    fn test_real_node_under_real_ancestor_keeps_own_values() {
        let records = vec![
            record("11", "Disponible", 50.0, 40.0, -10.0),
            record("1105", "Caja", 10.0, 5.0, -5.0),
        ];
        let forest = build_forest(&records).unwrap();

        let group = find(&forest, "11").unwrap();
        assert!(!group.is_synthetic);
        assert_eq!(group.own_budgeted, 50.0);
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].code, "1105");
    }

    #[test]
    fn test_duplicate_code_is_rejected() {
        let records = vec![
            record("11", "Disponible", 1.0, 1.0, 0.0),
            record("11", "Disponible bis", 2.0, 2.0, 0.0),
        ];
        let err = build_forest(&records).unwrap_err();
        match err {
            CoreError::DuplicateCode { code } => assert_eq!(code, "11"),
            other => panic!("expected DuplicateCode, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_code_is_rejected() {
        let records = vec![record("11a5", "Bad", 0.0, 0.0, 0.0)];
        let err = build_forest(&records).unwrap_err();
        assert!(matches!(err, CoreError::InvalidCode { .. }));

        let records = vec![record("", "Empty", 0.0, 0.0, 0.0)];
        assert!(build_forest(&records).is_err());
    }

    #[test]
    fn test_odd_length_code_links_by_dropped_digit() {
        let records = vec![record("123", "Auxiliar", 5.0, 5.0, 0.0)];
        let forest = build_forest(&records).unwrap();
        let parent = find(&forest, "12").expect("parent '12' must be synthesized");
        assert!(parent.is_synthetic);
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].code, "123");
    }

    #[test]
    fn test_single_digit_record_is_root() {
        let records = vec![record("4", "Ingresos", 0.0, 0.0, 0.0)];
        let forest = build_forest(&records).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].code, "4");
        assert!(!forest[0].is_synthetic);
    }
}
