use serde::Deserialize;

use crate::{
    ast::{ColumnComparison, Operator, ResolvedNode},
    value::Value,
};

/// Placeholder syntax for bound parameters.
///
/// LIKE patterns render as `ESCAPE '\'`, a standard SQL string literal.
/// Dialects that treat backslash as a string escape (MySQL by default) are
/// not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placeholder {
    /// `?` (SQLite)
    #[default]
    Question,
    /// `$1`, `$2`, ... (PostgreSQL)
    Numbered,
}

/// A rendered WHERE fragment plus its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlFilter {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Renders resolved trees into parameterized SQL.
///
/// Column identifiers come from a validated registry; operands never appear
/// in the text, only as entries of [`SqlFilter::params`].
pub struct Emitter {
    placeholder: Placeholder,
    params: Vec<Value>,
}

/// Render `node` with the given placeholder style.
pub fn emit(node: &ResolvedNode, placeholder: Placeholder) -> SqlFilter {
    Emitter::new(placeholder).emit(node)
}

impl Emitter {
    pub fn new(placeholder: Placeholder) -> Self {
        Emitter {
            placeholder,
            params: Vec::new(),
        }
    }

    pub fn emit(mut self, node: &ResolvedNode) -> SqlFilter {
        let sql = self.render(node);
        SqlFilter {
            sql,
            params: self.params,
        }
    }

    fn render(&mut self, node: &ResolvedNode) -> String {
        match node {
            ResolvedNode::And(children) if children.is_empty() => "1 = 1".to_string(),
            ResolvedNode::Or(children) if children.is_empty() => "1 = 0".to_string(),
            ResolvedNode::And(children) => self.render_group(children, " AND "),
            ResolvedNode::Or(children) => self.render_group(children, " OR "),
            ResolvedNode::Not(inner) => {
                let rendered = self.render(inner);
                match inner.as_ref() {
                    ResolvedNode::And(children) | ResolvedNode::Or(children)
                        if !children.is_empty() =>
                    {
                        format!("NOT {rendered}")
                    }
                    _ => format!("NOT ({rendered})"),
                }
            }
            ResolvedNode::Compare(comparison) => self.render_comparison(comparison),
        }
    }

    fn render_group(&mut self, children: &[ResolvedNode], joiner: &str) -> String {
        let parts: Vec<String> = children.iter().map(|child| self.render(child)).collect();
        format!("({})", parts.join(joiner))
    }

    fn render_comparison(&mut self, comparison: &ColumnComparison) -> String {
        let column = &comparison.column;
        let placeholder = self.bind(comparison.value.clone());

        match comparison.op {
            Operator::Like => format!("{column} LIKE {placeholder} ESCAPE '\\'"),
            Operator::In => format!("{column} IN ({placeholder})"),
            op => format!("{column} {} {placeholder}", op.as_sql()),
        }
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        match self.placeholder {
            Placeholder::Question => "?".to_string(),
            Placeholder::Numbered => format!("${}", self.params.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Column;

    #[test]
    fn test_numbered_placeholders_follow_parameter_order() {
        let node = ResolvedNode::Or(vec![
            ResolvedNode::compare(
                Column::new("users", "first_name"),
                Operator::Eq,
                Value::Text("Al".into()),
            ),
            ResolvedNode::compare(
                Column::new("users", "last_name"),
                Operator::Eq,
                Value::Text("Al".into()),
            ),
        ]);
        let filter = emit(&node, Placeholder::Numbered);
        assert_eq!(
            filter.sql,
            "(users.first_name = $1 OR users.last_name = $2)"
        );
        assert_eq!(filter.params.len(), 2);
    }

    #[test]
    fn test_negated_group_is_not_double_parenthesized() {
        let leaf = |name: &str| {
            ResolvedNode::compare(Column::new("t", name), Operator::Gt, Value::Text("x".into()))
        };
        let node = ResolvedNode::Not(Box::new(ResolvedNode::And(vec![leaf("a"), leaf("b")])));
        assert_eq!(
            emit(&node, Placeholder::Question).sql,
            "NOT (t.a > ? AND t.b > ?)"
        );

        let node = ResolvedNode::Not(Box::new(leaf("a")));
        assert_eq!(emit(&node, Placeholder::Question).sql, "NOT (t.a > ?)");
    }

    #[test]
    fn test_like_uses_standard_escape_literal() {
        let node = ResolvedNode::compare(
            Column::new("t", "a"),
            Operator::Like,
            Value::Text("%50\\%%".into()),
        );
        let filter = emit(&node, Placeholder::Numbered);
        assert_eq!(filter.sql, r"t.a LIKE $1 ESCAPE '\'");
        assert_eq!(filter.params, vec![Value::Text("%50\\%%".into())]);
    }
}
