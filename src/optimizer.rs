//! Semantics-preserving simplification of resolved trees.
//!
//! Rewrites run bottom-up in a single pass:
//! - nested `And`/`Or` of the same kind are flattened
//! - identity constants are dropped, absorbing constants collapse the node
//! - structurally equal siblings are removed
//! - `eq`/`in` leaves on one column inside an `Or` merge into one `in`
//! - single-child connectives are replaced by their child
//! - double negation is removed
//!
//! The result is a fixed point: optimizing it again returns it unchanged.

use crate::{
    ast::{Column, ColumnComparison, Operator, ResolvedNode},
    value::Value,
};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Connective {
    And,
    Or,
}

impl Connective {
    fn build(self, children: Vec<ResolvedNode>) -> ResolvedNode {
        match self {
            Connective::And => ResolvedNode::And(children),
            Connective::Or => ResolvedNode::Or(children),
        }
    }

    /// The child that decides the whole node (`false` for `And`).
    fn is_absorbing(self, node: &ResolvedNode) -> bool {
        match self {
            Connective::And => node.is_never(),
            Connective::Or => node.is_always(),
        }
    }
}

pub fn optimize(node: ResolvedNode) -> ResolvedNode {
    match node {
        ResolvedNode::And(children) => optimize_connective(Connective::And, children),
        ResolvedNode::Or(children) => optimize_connective(Connective::Or, children),
        ResolvedNode::Not(inner) => optimize_not(optimize(*inner)),
        compare @ ResolvedNode::Compare(_) => compare,
    }
}

fn optimize_not(inner: ResolvedNode) -> ResolvedNode {
    match inner {
        ResolvedNode::Not(double) => *double,
        node if node.is_always() => ResolvedNode::never(),
        node if node.is_never() => ResolvedNode::always(),
        node => ResolvedNode::Not(Box::new(node)),
    }
}

fn optimize_connective(kind: Connective, children: Vec<ResolvedNode>) -> ResolvedNode {
    let mut flat: Vec<ResolvedNode> = Vec::with_capacity(children.len());

    for child in children.into_iter().map(optimize) {
        if kind.is_absorbing(&child) {
            return child;
        }
        match (kind, child) {
            (Connective::And, ResolvedNode::And(grandchildren))
            | (Connective::Or, ResolvedNode::Or(grandchildren)) => {
                for grandchild in grandchildren {
                    push_unique(&mut flat, grandchild);
                }
            }
            (_, child) => push_unique(&mut flat, child),
        }
    }

    if kind == Connective::Or {
        flat = merge_memberships(flat);
    }

    if flat.len() == 1 {
        flat.remove(0)
    } else {
        kind.build(flat)
    }
}

fn push_unique(children: &mut Vec<ResolvedNode>, node: ResolvedNode) {
    if !children.contains(&node) {
        children.push(node);
    }
}

/// Inside an `Or`, fold every `eq`/`in` leaf on the same column into one
/// leaf at the position of the first.
fn merge_memberships(children: Vec<ResolvedNode>) -> Vec<ResolvedNode> {
    let mut merged: Vec<ResolvedNode> = Vec::with_capacity(children.len());
    // Column -> index in `merged` of its membership leaf.
    let mut slots: Vec<(Column, usize)> = Vec::new();

    for child in children {
        let Some((column, values)) = membership(&child) else {
            merged.push(child);
            continue;
        };

        match slots.iter().find(|(slot_column, _)| *slot_column == column) {
            Some(&(_, at)) => {
                let mut existing = membership(&merged[at]).map(|(_, v)| v).unwrap_or_default();
                for value in values {
                    if !existing.contains(&value) {
                        existing.push(value);
                    }
                }
                merged[at] = membership_leaf(column, existing);
            }
            None => {
                slots.push((column, merged.len()));
                merged.push(child);
            }
        }
    }
    merged
}

fn membership(node: &ResolvedNode) -> Option<(Column, Vec<Value>)> {
    match node {
        ResolvedNode::Compare(ColumnComparison {
            column,
            op: Operator::Eq,
            value,
        }) => Some((column.clone(), vec![value.clone()])),
        ResolvedNode::Compare(ColumnComparison {
            column,
            op: Operator::In,
            value: Value::List(values),
        }) => Some((column.clone(), values.clone())),
        _ => None,
    }
}

fn membership_leaf(column: Column, mut values: Vec<Value>) -> ResolvedNode {
    if values.len() == 1 {
        let value = values.remove(0);
        ResolvedNode::compare(column, Operator::Eq, value)
    } else {
        ResolvedNode::compare(column, Operator::In, Value::List(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(column: &str, value: &str) -> ResolvedNode {
        ResolvedNode::compare(
            Column::new("users", column),
            Operator::Eq,
            Value::Text(value.into()),
        )
    }

    #[test]
    fn test_flatten_and_dedupe() {
        let node = ResolvedNode::And(vec![
            eq("a", "1"),
            ResolvedNode::And(vec![eq("b", "2"), eq("a", "1")]),
        ]);
        assert_eq!(
            optimize(node),
            ResolvedNode::And(vec![eq("a", "1"), eq("b", "2")])
        );
    }

    #[test]
    fn test_double_negation() {
        let node = ResolvedNode::Not(Box::new(ResolvedNode::Not(Box::new(eq("a", "1")))));
        assert_eq!(optimize(node), eq("a", "1"));
    }

    #[test]
    fn test_absorbing_constants() {
        let node = ResolvedNode::And(vec![eq("a", "1"), ResolvedNode::never()]);
        assert_eq!(optimize(node), ResolvedNode::never());

        let node = ResolvedNode::Or(vec![eq("a", "1"), ResolvedNode::always()]);
        assert_eq!(optimize(node), ResolvedNode::always());
    }

    #[test]
    fn test_or_of_equalities_becomes_membership() {
        let node = ResolvedNode::Or(vec![eq("status", "active"), eq("status", "pending")]);
        assert_eq!(
            optimize(node),
            ResolvedNode::compare(
                Column::new("users", "status"),
                Operator::In,
                Value::List(vec![
                    Value::Text("active".into()),
                    Value::Text("pending".into())
                ]),
            )
        );
    }
}
