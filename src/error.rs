use thiserror::Error;

use crate::{ast::Operator, parser::ParseError, value::ColumnType};

/// Runtime query errors.
///
/// Every variant is an expected outcome of a bad caller-supplied query. The
/// safe entry points turn any of them into a filter that matches no rows.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("attribute '{0}' has no columns")]
    UnknownColumn(String),

    #[error("operator '{op}' is not supported for {kind} attribute '{key}'")]
    IncompatibleOperator {
        key: String,
        op: Operator,
        kind: ColumnType,
    },

    #[error("{operand} is not a valid {kind} operand for attribute '{key}'")]
    IncompatibleDatatype {
        key: String,
        operand: String,
        kind: ColumnType,
    },

    #[error("syntax error: {0}")]
    Syntax(#[from] ParseError),

    #[error("no searchable attributes")]
    NoSearchableAttributes,
}

/// Errors in the declaration of searchable attributes.
///
/// These are programmer errors surfaced when a registry is built; they are
/// never produced while compiling a query.
#[derive(Debug, Error)]
pub enum SpecificationError {
    #[error("model name must not be empty")]
    EmptyModel,

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("attribute '{0}' is declared without columns")]
    NoColumns(String),

    #[error("invalid column '{column}' for attribute '{key}'")]
    InvalidColumn { key: String, column: String },

    #[error("options given for undeclared attribute '{0}'")]
    UndeclaredAttribute(String),

    #[error("invalid registry configuration")]
    Config(#[from] serde_json::Error),
}
