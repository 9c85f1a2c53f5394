use std::fmt;

use crate::value::ColumnType;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal (`:`, `=`, `eq`)
    Eq,
    /// Not equal (`!=`, `<>`, `neq`)
    Neq,
    /// Less than (`<`, `lt`)
    Lt,
    /// Less than or equal (`<=`, `lte`)
    Lte,
    /// Greater than (`>`, `gt`)
    Gt,
    /// Greater than or equal (`>=`, `gte`)
    Gte,
    /// Pattern match (`~`, `like`)
    Like,
    /// Set membership (list operand, `in`)
    In,
}

impl Operator {
    /// Parse an operator token of the structured mapping form.
    pub fn from_mapping_token(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(Operator::Eq),
            "neq" | "not_eq" => Some(Operator::Neq),
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "like" | "matches" => Some(Operator::Like),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    /// Whether a column of the given type can be compared with this operator.
    pub fn supports(self, kind: ColumnType) -> bool {
        match kind {
            ColumnType::Text => true,
            ColumnType::Number | ColumnType::Date => self != Operator::Like,
            ColumnType::Boolean => matches!(self, Operator::Eq | Operator::Neq | Operator::In),
        }
    }

    /// SQL spelling of the operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "<>",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Like => "like",
            Operator::In => "in",
        })
    }
}
