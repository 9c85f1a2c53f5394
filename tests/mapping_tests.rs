// tests/mapping_tests.rs

use attr_search::ast::{Operator, RawNode};
use attr_search::mapping::{MappingParser, parse_mapping};
use attr_search::parser::ParseError;
use attr_search::value::Literal;
use rust_decimal::Decimal;
use serde_json::json;

fn num(n: i64) -> Literal {
    Literal::Number(Decimal::from(n))
}

// ============================================================================
// Scalars and conjunction
// ============================================================================

#[test]
fn test_scalar_is_equality() {
    assert_eq!(
        parse_mapping(&json!({"name": "john"})).unwrap(),
        RawNode::compare("name", Operator::Eq, Literal::text("john"))
    );
    assert_eq!(
        parse_mapping(&json!({"active": true})).unwrap(),
        RawNode::compare("active", Operator::Eq, Literal::Boolean(true))
    );
    assert_eq!(
        parse_mapping(&json!({"age": 30})).unwrap(),
        RawNode::compare("age", Operator::Eq, num(30))
    );
}

#[test]
fn test_float_operand() {
    assert_eq!(
        parse_mapping(&json!({"price": 9.99})).unwrap(),
        RawNode::compare("price", Operator::Eq, Literal::Number(Decimal::new(999, 2)))
    );
}

#[test]
fn test_number_beyond_decimal_precision_stays_text() {
    assert_eq!(
        parse_mapping(&json!({"age": 1e40})).unwrap(),
        RawNode::compare("age", Operator::Eq, Literal::text("1e40"))
    );
    assert!(matches!(
        parse_mapping(&json!({"age": -1.5e-30})).unwrap(),
        RawNode::Compare(comparison) if matches!(comparison.operand, Literal::Text(_))
    ));
}

#[test]
fn test_entries_are_conjoined() {
    // serde_json maps iterate in key order
    assert_eq!(
        parse_mapping(&json!({"name": "john", "age": {"gt": 30}})).unwrap(),
        RawNode::And(vec![
            RawNode::compare("age", Operator::Gt, num(30)),
            RawNode::compare("name", Operator::Eq, Literal::text("john")),
        ])
    );
}

#[test]
fn test_empty_mapping_matches_everything() {
    assert_eq!(parse_mapping(&json!({})).unwrap(), RawNode::And(vec![]));
}

// ============================================================================
// Operator clauses
// ============================================================================

#[test]
fn test_operator_tokens() {
    let test_cases = vec![
        ("eq", Operator::Eq),
        ("neq", Operator::Neq),
        ("not_eq", Operator::Neq),
        ("lt", Operator::Lt),
        ("lte", Operator::Lte),
        ("gt", Operator::Gt),
        ("gte", Operator::Gte),
        ("like", Operator::Like),
        ("matches", Operator::Like),
        ("in", Operator::In),
    ];

    for (token, op) in test_cases {
        let mut ops = serde_json::Map::new();
        ops.insert(token.to_string(), json!(1));
        let query = json!({ "age": ops });
        assert_eq!(
            parse_mapping(&query).unwrap(),
            RawNode::compare("age", op, num(1)),
            "Failed for token: {}",
            token
        );
    }
}

#[test]
fn test_several_operators_for_one_key() {
    assert_eq!(
        parse_mapping(&json!({"age": {"gte": 18, "lt": 65}})).unwrap(),
        RawNode::And(vec![
            RawNode::compare("age", Operator::Gte, num(18)),
            RawNode::compare("age", Operator::Lt, num(65)),
        ])
    );
}

#[test]
fn test_unknown_operator() {
    assert_eq!(
        parse_mapping(&json!({"age": {"bigger": 3}})),
        Err(ParseError::UnknownOperator("bigger".to_string()))
    );
}

#[test]
fn test_nested_mapping_inside_operator_clause_is_rejected() {
    let result = parse_mapping(&json!({"age": {"gt": {"lt": 3}}}));
    assert!(matches!(result, Err(ParseError::InvalidMapping(_))), "got {:?}", result);
}

#[test]
fn test_empty_operator_clause_is_rejected() {
    assert!(matches!(
        parse_mapping(&json!({"age": {}})),
        Err(ParseError::InvalidMapping(_))
    ));
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_list_of_scalars_is_membership() {
    assert_eq!(
        parse_mapping(&json!({"status": ["active", "pending"]})).unwrap(),
        RawNode::compare(
            "status",
            Operator::In,
            Literal::List(vec![Literal::text("active"), Literal::text("pending")])
        )
    );
}

#[test]
fn test_empty_list_is_empty_membership() {
    assert_eq!(
        parse_mapping(&json!({"status": []})).unwrap(),
        RawNode::compare("status", Operator::In, Literal::List(vec![]))
    );
}

#[test]
fn test_list_of_mappings_is_disjunction() {
    assert_eq!(
        parse_mapping(&json!({"status": [{"active": true}, {"pending": true}]})).unwrap(),
        RawNode::Or(vec![
            RawNode::compare("active", Operator::Eq, Literal::Boolean(true)),
            RawNode::compare("pending", Operator::Eq, Literal::Boolean(true)),
        ])
    );
}

#[test]
fn test_list_of_operator_clauses_applies_to_key() {
    assert_eq!(
        parse_mapping(&json!({"age": [{"lt": 18}, {"gt": 65}]})).unwrap(),
        RawNode::Or(vec![
            RawNode::compare("age", Operator::Lt, num(18)),
            RawNode::compare("age", Operator::Gt, num(65)),
        ])
    );
}

#[test]
fn test_disjunction_elements_may_nest() {
    let query = json!({"any": [{"name": "al", "age": {"gt": 3}}, {"any": [{"x": 1}, {"y": 2}]}]});
    assert_eq!(
        parse_mapping(&query).unwrap(),
        RawNode::Or(vec![
            RawNode::And(vec![
                RawNode::compare("age", Operator::Gt, num(3)),
                RawNode::compare("name", Operator::Eq, Literal::text("al")),
            ]),
            RawNode::Or(vec![
                RawNode::compare("x", Operator::Eq, num(1)),
                RawNode::compare("y", Operator::Eq, num(2)),
            ]),
        ])
    );
}

#[test]
fn test_mixed_list_is_rejected() {
    assert!(matches!(
        parse_mapping(&json!({"status": ["active", {"pending": true}]})),
        Err(ParseError::InvalidMapping(_))
    ));
}

// ============================================================================
// Malformed shapes
// ============================================================================

#[test]
fn test_top_level_must_be_object() {
    for query in [json!(["a"]), json!(3), json!(true), json!(null)] {
        assert!(
            matches!(parse_mapping(&query), Err(ParseError::InvalidMapping(_))),
            "Should reject: {}",
            query
        );
    }
}

#[test]
fn test_null_operand_is_rejected() {
    assert!(matches!(
        parse_mapping(&json!({"name": null})),
        Err(ParseError::InvalidMapping(_))
    ));
    assert!(matches!(
        parse_mapping(&json!({"name": {"eq": null}})),
        Err(ParseError::InvalidMapping(_))
    ));
}

#[test]
fn test_empty_key_is_rejected() {
    assert!(matches!(
        parse_mapping(&json!({"": 1})),
        Err(ParseError::InvalidMapping(_))
    ));
}

#[test]
fn test_nesting_limit() {
    let mut query = json!({"x": 1});
    for _ in 0..10 {
        query = json!({"any": [query]});
    }
    assert!(matches!(
        MappingParser::new().with_max_depth(5).parse(&query),
        Err(ParseError::TooDeep { limit: 5 })
    ));
    assert!(MappingParser::new().parse(&query).is_ok());
}
