use tracing::trace;

use crate::{
    ast::{Column, Comparison, Operator, RawNode, ResolvedNode},
    error::SearchError,
    registry::{PhysicalColumn, Registry},
    value::{ColumnType, Literal, Value, like_pattern},
};

/// Resolves logical keys against a registry.
///
/// Each comparison on a key becomes one comparison per physical column,
/// joined by `Or` when the key has several columns. Operands are coerced
/// once per key to the key's declared type.
pub struct Resolver<'r, R: Registry + ?Sized> {
    registry: &'r R,
}

/// Resolve a raw tree against `registry`.
pub fn resolve<R: Registry + ?Sized>(
    node: &RawNode,
    registry: &R,
) -> Result<ResolvedNode, SearchError> {
    Resolver::new(registry).resolve(node)
}

impl<'r, R: Registry + ?Sized> Resolver<'r, R> {
    pub fn new(registry: &'r R) -> Self {
        Resolver { registry }
    }

    pub fn resolve(&self, node: &RawNode) -> Result<ResolvedNode, SearchError> {
        match node {
            RawNode::And(children) => Ok(ResolvedNode::And(self.resolve_all(children)?)),
            RawNode::Or(children) => Ok(ResolvedNode::Or(self.resolve_all(children)?)),
            RawNode::Not(inner) => Ok(ResolvedNode::Not(Box::new(self.resolve(inner)?))),
            RawNode::Compare(comparison) => match &comparison.key {
                Some(key) => self.resolve_keyed(key, comparison),
                None => self.resolve_term(comparison),
            },
        }
    }

    fn resolve_all(&self, children: &[RawNode]) -> Result<Vec<ResolvedNode>, SearchError> {
        children.iter().map(|child| self.resolve(child)).collect()
    }

    fn columns(&self, key: &str) -> Result<&'r [PhysicalColumn], SearchError> {
        let columns = self
            .registry
            .columns_for(key)
            .ok_or_else(|| SearchError::UnknownAttribute(key.to_string()))?;
        if columns.is_empty() {
            return Err(SearchError::UnknownColumn(key.to_string()));
        }
        Ok(columns)
    }

    fn resolve_keyed(
        &self,
        key: &str,
        comparison: &Comparison,
    ) -> Result<ResolvedNode, SearchError> {
        let columns = self.columns(key)?;
        let kind = self.registry.options_for(key).column_type();
        let op = comparison.op;

        if !op.supports(kind) {
            return Err(SearchError::IncompatibleOperator {
                key: key.to_string(),
                op,
                kind,
            });
        }
        let value = coerce(op, &comparison.operand, kind).ok_or_else(|| {
            SearchError::IncompatibleDatatype {
                key: key.to_string(),
                operand: comparison.operand.to_string(),
                kind,
            }
        })?;

        let node = self.expand(columns, op, value);
        trace!(key, ?node, "resolved comparison");
        Ok(node)
    }

    /// A bare term searches every default attribute that can hold it.
    fn resolve_term(&self, comparison: &Comparison) -> Result<ResolvedNode, SearchError> {
        let keys = self.registry.default_keys();
        if keys.is_empty() {
            return Err(SearchError::NoSearchableAttributes);
        }

        let mut alternatives = Vec::new();
        for key in keys {
            let kind = self.registry.options_for(key).column_type();
            let Some(op) = term_operator(comparison, kind) else {
                continue;
            };
            let Some(value) = coerce(op, &comparison.operand, kind) else {
                continue;
            };
            match self.expand(self.columns(key)?, op, value) {
                ResolvedNode::Or(branches) => alternatives.extend(branches),
                single => alternatives.push(single),
            }
        }

        trace!(
            operand = %comparison.operand,
            branches = alternatives.len(),
            "resolved bare term"
        );
        Ok(ResolvedNode::Or(alternatives))
    }

    /// One comparison per column, disjoined when there are several.
    fn expand(&self, columns: &[PhysicalColumn], op: Operator, value: Value) -> ResolvedNode {
        if matches!(&value, Value::List(items) if items.is_empty()) {
            return ResolvedNode::never();
        }

        let mut branches: Vec<ResolvedNode> = columns
            .iter()
            .map(|column| ResolvedNode::compare(self.column(column), op, value.clone()))
            .collect();
        if branches.len() == 1 {
            branches.remove(0)
        } else {
            ResolvedNode::Or(branches)
        }
    }

    fn column(&self, column: &PhysicalColumn) -> Column {
        let table = self
            .registry
            .alias_for(&column.table)
            .unwrap_or(&column.table);
        Column::new(table, column.column.as_str())
    }
}

/// Operator used for a bare term against an attribute of type `kind`:
/// pattern match on text, equality elsewhere. Wildcard terms only apply to
/// text attributes.
fn term_operator(comparison: &Comparison, kind: ColumnType) -> Option<Operator> {
    match (comparison.op, kind) {
        (op, ColumnType::Text) => Some(op),
        (Operator::Like, _) => match &comparison.operand {
            Literal::Text(text) if text.contains('*') => None,
            _ => Some(Operator::Eq),
        },
        (op, kind) if op.supports(kind) => Some(op),
        _ => None,
    }
}

fn coerce(op: Operator, operand: &Literal, kind: ColumnType) -> Option<Value> {
    match op {
        Operator::In => operand.coerce_list(kind).map(Value::List),
        Operator::Like => match operand.coerce(kind)? {
            Value::Text(text) => Some(Value::Text(like_pattern(&text))),
            _ => None,
        },
        _ => operand.coerce(kind),
    }
}
