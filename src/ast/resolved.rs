use std::fmt;

use crate::{ast::Operator, value::Value};

/// A physical `table.column` address after alias substitution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: String,
    pub name: String,
}

impl Column {
    pub fn new(table: impl Into<String>, name: impl Into<String>) -> Self {
        Column {
            table: table.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.name)
    }
}

/// Syntax tree after resolution: every leaf addresses one physical column and
/// carries an operand already coerced to that column's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedNode {
    /// Conjunction. `And(vec![])` is the always-true node.
    And(Vec<ResolvedNode>),
    /// Disjunction. `Or(vec![])` is the always-false node.
    Or(Vec<ResolvedNode>),
    Not(Box<ResolvedNode>),
    Compare(ColumnComparison),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnComparison {
    pub column: Column,
    pub op: Operator,
    /// For [`Operator::In`] this is always a [`Value::List`]; for
    /// [`Operator::Like`] it is the translated pattern text.
    pub value: Value,
}

impl ResolvedNode {
    pub const fn always() -> Self {
        ResolvedNode::And(Vec::new())
    }

    pub const fn never() -> Self {
        ResolvedNode::Or(Vec::new())
    }

    pub fn compare(column: Column, op: Operator, value: Value) -> Self {
        ResolvedNode::Compare(ColumnComparison { column, op, value })
    }

    pub fn is_always(&self) -> bool {
        matches!(self, ResolvedNode::And(children) if children.is_empty())
    }

    pub fn is_never(&self) -> bool {
        matches!(self, ResolvedNode::Or(children) if children.is_empty())
    }

    /// Number of comparison leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            ResolvedNode::And(children) | ResolvedNode::Or(children) => {
                children.iter().map(ResolvedNode::leaf_count).sum()
            }
            ResolvedNode::Not(inner) => inner.leaf_count(),
            ResolvedNode::Compare(_) => 1,
        }
    }
}
