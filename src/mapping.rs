//! Structured (mapping) query form.
//!
//! ```text
//! {"name": "john", "age": {"gt": 30}}                  name = john AND age > 30
//! {"status": ["active", "pending"]}                     status IN (active, pending)
//! {"age": [{"lt": 18}, {"gt": 65}]}                     age < 18 OR age > 65
//! {"flags": [{"active": true}, {"pending": true}]}      active OR pending
//! ```
//!
//! Entries of one object are conjoined. An array of objects is the only way
//! to express a disjunction.

use rust_decimal::Decimal;
use serde_json::{Map, Value as Json};

use crate::{
    ast::{Operator, RawNode},
    parser::{DEFAULT_MAX_DEPTH, ParseError},
    value::{Literal, parse_decimal},
};

/// Parse a structured query with the default nesting limit.
pub fn parse_mapping(value: &Json) -> Result<RawNode, ParseError> {
    MappingParser::new().parse(value)
}

pub struct MappingParser {
    depth: usize,
    max_depth: usize,
}

impl Default for MappingParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingParser {
    pub fn new() -> Self {
        MappingParser {
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(&mut self, value: &Json) -> Result<RawNode, ParseError> {
        match value {
            Json::Object(map) => self.parse_clause(map),
            other => Err(ParseError::InvalidMapping(format!(
                "expected an object, found {}",
                json_kind(other)
            ))),
        }
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// An object of `key -> value` entries, conjoined.
    fn parse_clause(&mut self, map: &Map<String, Json>) -> Result<RawNode, ParseError> {
        self.nested(|parser| {
            let children = map
                .iter()
                .map(|(key, value)| parser.parse_entry(key, value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RawNode::and_of(children))
        })
    }

    fn parse_entry(&mut self, key: &str, value: &Json) -> Result<RawNode, ParseError> {
        if key.is_empty() {
            return Err(ParseError::InvalidMapping("empty attribute key".into()));
        }

        match value {
            Json::Object(ops) => self.parse_operators(key, ops),
            Json::Array(items) if !items.is_empty() && items.iter().all(Json::is_object) => {
                let alternatives = items
                    .iter()
                    .filter_map(Json::as_object)
                    .map(|element| {
                        if is_operator_clause(element) {
                            self.parse_operators(key, element)
                        } else {
                            self.parse_clause(element)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawNode::or_of(alternatives))
            }
            Json::Array(_) => Ok(RawNode::compare(
                key,
                Operator::In,
                operand_literal(key, value)?,
            )),
            scalar => Ok(RawNode::compare(
                key,
                Operator::Eq,
                operand_literal(key, scalar)?,
            )),
        }
    }

    /// `{"gt": 18, "lt": 65}` for one key, conjoined.
    fn parse_operators(&mut self, key: &str, ops: &Map<String, Json>) -> Result<RawNode, ParseError> {
        if ops.is_empty() {
            return Err(ParseError::InvalidMapping(format!(
                "empty operator clause for '{key}'"
            )));
        }

        let children = ops
            .iter()
            .map(|(token, operand)| {
                let op = Operator::from_mapping_token(token)
                    .ok_or_else(|| ParseError::UnknownOperator(token.clone()))?;
                Ok(RawNode::compare(key, op, operand_literal(key, operand)?))
            })
            .collect::<Result<Vec<_>, ParseError>>()?;
        Ok(RawNode::and_of(children))
    }
}

fn is_operator_clause(map: &Map<String, Json>) -> bool {
    !map.is_empty()
        && map
            .keys()
            .all(|token| Operator::from_mapping_token(token).is_some())
}

/// Operands are scalars or arrays of scalars.
fn operand_literal(key: &str, value: &Json) -> Result<Literal, ParseError> {
    match value {
        Json::Array(items) => items
            .iter()
            .map(|item| scalar_literal(key, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Literal::List),
        scalar => scalar_literal(key, scalar),
    }
}

fn scalar_literal(key: &str, value: &Json) -> Result<Literal, ParseError> {
    match value {
        Json::String(s) => Ok(Literal::Text(s.clone())),
        Json::Bool(b) => Ok(Literal::Boolean(*b)),
        Json::Number(n) => Ok(number_literal(n)),
        other => Err(ParseError::InvalidMapping(format!(
            "unexpected {} operand for '{key}'",
            json_kind(other)
        ))),
    }
}

/// A JSON number no `Decimal` holds exactly stays numeral text, so it fails
/// coercion the same way the string grammar's numerals do.
fn number_literal(n: &serde_json::Number) -> Literal {
    if let Some(i) = n.as_i64() {
        return Literal::Number(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Literal::Number(Decimal::from(u));
    }
    let text = n.to_string();
    match parse_decimal(&text) {
        Some(decimal) => Literal::Number(decimal),
        None => Literal::Text(text),
    }
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
