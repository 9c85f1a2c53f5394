use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

/// Declared scalar type of a searchable attribute.
///
/// The type decides which operators are legal and how query operands are
/// coerced before being bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    #[serde(alias = "string")]
    Text,
    #[serde(alias = "integer", alias = "decimal", alias = "float")]
    Number,
    Date,
    #[serde(alias = "bool")]
    Boolean,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
        })
    }
}

/// An operand as written by the query author, before coercion.
///
/// The string grammar only ever produces [`Literal::Text`] (and lists of
/// it); typing happens during resolution. The mapping form keeps the JSON
/// scalar types it was given.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Text(String),
    Number(Decimal),
    Date(Date),
    Boolean(bool),
    List(Vec<Literal>),
}

/// An operand after coercion to a column type. This is what gets bound as a
/// query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Text(String),
    Number(Decimal),
    Date(Date),
    Boolean(bool),
    /// Bound as a single array parameter for set membership.
    List(Vec<Value>),
}

impl Literal {
    pub fn text(s: impl Into<String>) -> Self {
        Literal::Text(s.into())
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Literal::List(_))
    }

    /// Coerce a scalar literal to the given column type.
    ///
    /// Returns `None` when the literal cannot represent a value of that type,
    /// or when it is a list.
    pub fn coerce(&self, kind: ColumnType) -> Option<Value> {
        match kind {
            ColumnType::Text => self.coerce_text().map(Value::Text),
            ColumnType::Number => match self {
                Literal::Number(n) => Some(Value::Number(*n)),
                Literal::Text(s) => parse_decimal(s).map(Value::Number),
                _ => None,
            },
            ColumnType::Date => match self {
                Literal::Date(d) => Some(Value::Date(*d)),
                Literal::Text(s) => parse_date(s).map(Value::Date),
                _ => None,
            },
            ColumnType::Boolean => match self {
                Literal::Boolean(b) => Some(Value::Boolean(*b)),
                Literal::Text(s) => parse_bool(s).map(Value::Boolean),
                Literal::Number(n) if *n == Decimal::ZERO => Some(Value::Boolean(false)),
                Literal::Number(n) if *n == Decimal::ONE => Some(Value::Boolean(true)),
                _ => None,
            },
        }
    }

    /// Coerce every element of a list literal (or a lone scalar) for set
    /// membership.
    pub fn coerce_list(&self, kind: ColumnType) -> Option<Vec<Value>> {
        match self {
            Literal::List(items) => items.iter().map(|item| item.coerce(kind)).collect(),
            scalar => scalar.coerce(kind).map(|value| vec![value]),
        }
    }

    fn coerce_text(&self) -> Option<String> {
        match self {
            Literal::Text(s) => Some(s.clone()),
            Literal::Number(n) => Some(n.to_string()),
            Literal::Date(d) => format_date(*d),
            Literal::Boolean(b) => Some(b.to_string()),
            Literal::List(_) => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "{s:?}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Date(d) => f.write_str(&format_date(*d).ok_or(fmt::Error)?),
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Date(d) => f.write_str(&format_date(*d).ok_or(fmt::Error)?),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Translate a like operand into a SQL `LIKE` pattern using `\` as the
/// escape character.
///
/// `*` is the only wildcard. `%`, `_` and `\` are escaped so they match
/// themselves. An operand without any `*` matches as a substring.
///
/// # Examples
///
/// ```
/// use attr_search::value::like_pattern;
///
/// assert_eq!(like_pattern("jo*"), "jo%");
/// assert_eq!(like_pattern("50%"), "%50\\%%");
/// ```
pub fn like_pattern(text: &str) -> String {
    let contains = !text.contains('*');
    let mut pattern = String::with_capacity(text.len() + 2);

    if contains {
        pattern.push('%');
    }
    for ch in text.chars() {
        match ch {
            '*' => pattern.push('%'),
            '%' | '_' | '\\' => {
                pattern.push('\\');
                pattern.push(ch);
            }
            c => pattern.push(c),
        }
    }
    if contains {
        pattern.push('%');
    }
    pattern
}

/// Parse a plain or scientific numeral, refusing any numeral a `Decimal`
/// can only hold after rounding.
pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let decimal = Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()?;
    is_exact(s, decimal).then_some(decimal)
}

fn is_exact(numeral: &str, decimal: Decimal) -> bool {
    let numeral: String = numeral.chars().filter(|&c| c != '_').collect();
    let (negative, unsigned) = match numeral.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, numeral.strip_prefix('+').unwrap_or(&numeral)),
    };
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => match exponent.parse::<i64>() {
            Ok(exponent) => (mantissa, exponent),
            Err(_) => return false,
        },
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{fraction}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return decimal.is_zero();
    }
    let written = significant(digits, exponent - fraction.len() as i64);

    let normalized = decimal.normalize();
    let stored = significant(
        &normalized.mantissa().unsigned_abs().to_string(),
        -i64::from(normalized.scale()),
    );
    negative == decimal.is_sign_negative() && written == stored
}

/// Significant digits without trailing zeros, and the matching power of ten.
fn significant(digits: &str, exponent: i64) -> (String, i64) {
    let trimmed = digits.trim_end_matches('0');
    let shift = (digits.len() - trimmed.len()) as i64;
    (trimmed.to_string(), exponent + shift)
}

fn parse_date(s: &str) -> Option<Date> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]")).ok()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn format_date(d: Date) -> Option<String> {
    d.format(format_description!("[year]-[month]-[day]")).ok()
}
