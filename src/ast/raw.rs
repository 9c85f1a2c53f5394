use crate::{ast::Operator, value::Literal};

/// Pre-resolution syntax tree over logical attribute keys.
///
/// Produced by both the string grammar and the mapping form; nothing in it
/// refers to storage yet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    /// All children must match. An empty `And` matches everything.
    And(Vec<RawNode>),

    /// At least one child must match. An empty `Or` matches nothing.
    Or(Vec<RawNode>),

    /// Negation
    ///
    /// # Examples
    /// ```text
    /// NOT status:archived
    /// -status:archived
    /// ```
    Not(Box<RawNode>),

    /// A single comparison
    ///
    /// # Examples
    /// ```text
    /// age>30
    /// name:"john"
    /// status:[active, pending]
    /// ```
    Compare(Comparison),
}

/// A comparison leaf of the raw tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Logical key. `None` for a bare term, which searches every default
    /// attribute.
    pub key: Option<String>,
    pub op: Operator,
    pub operand: Literal,
}

impl RawNode {
    pub fn compare(key: impl Into<String>, op: Operator, operand: Literal) -> Self {
        RawNode::Compare(Comparison {
            key: Some(key.into()),
            op,
            operand,
        })
    }

    /// A bare search term matched against the default attributes.
    pub fn term(op: Operator, operand: Literal) -> Self {
        RawNode::Compare(Comparison {
            key: None,
            op,
            operand,
        })
    }

    pub fn negate(node: RawNode) -> Self {
        RawNode::Not(Box::new(node))
    }

    /// Collapse a connective with a single operand into that operand.
    pub(crate) fn and_of(mut children: Vec<RawNode>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            RawNode::And(children)
        }
    }

    pub(crate) fn or_of(mut children: Vec<RawNode>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            RawNode::Or(children)
        }
    }
}
