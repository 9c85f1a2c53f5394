use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Unquoted run of characters
    ///
    /// Used both for attribute keys and for bare operands. Whether a word is a
    /// key is decided by the parser (a word directly followed by an operator).
    ///
    /// # Examples
    /// ```text
    /// name
    /// 2024-01-31
    /// jo*
    /// ```
    Word(String),

    /// String literal enclosed in double or single quotes
    ///
    /// Quoted text is always literal: `*` inside quotes is not a wildcard
    /// for equality comparisons.
    ///
    /// # Examples
    /// ```text
    /// "john smith"
    /// 'it\'s'
    /// ```
    Quoted(String),

    // Comparison
    /// Equality shorthand (`:`)
    Colon,

    /// Equality (`=`)
    Eq,

    /// Inequality (`!=` or `<>`)
    NotEq,

    /// Less than
    Lt,

    /// Less than or equal
    LtEq,

    /// Greater than
    Gt,

    /// Greater than or equal
    GtEq,

    /// Pattern match (`~`)
    ///
    /// # Examples
    /// ```text
    /// name~jo*
    /// email~"@example.com"
    /// ```
    Tilde,

    // Logical
    /// Logical AND (`and`, case-insensitive, or `&&`)
    And,

    /// Logical OR (`or`, case-insensitive, or `||`)
    Or,

    /// Negation keyword (`not`, case-insensitive)
    Not,

    /// Negation prefix (`!`)
    Bang,

    /// Negation prefix or numeric sign (`-`)
    ///
    /// # Examples
    /// ```text
    /// -status:archived
    /// balance<-10
    /// ```
    Minus,

    // Delimiters
    /// Left parenthesis for grouping
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket opening a list operand
    LBracket,

    /// Right bracket
    RBracket,

    /// Comma separating list elements
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Whether this token can start a comparison after a key.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Token::Colon
                | Token::Eq
                | Token::NotEq
                | Token::Lt
                | Token::LtEq
                | Token::Gt
                | Token::GtEq
                | Token::Tilde
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{w}'"),
            Token::Quoted(s) => write!(f, "\"{s}\""),
            Token::Colon => f.write_str("':'"),
            Token::Eq => f.write_str("'='"),
            Token::NotEq => f.write_str("'!='"),
            Token::Lt => f.write_str("'<'"),
            Token::LtEq => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::GtEq => f.write_str("'>='"),
            Token::Tilde => f.write_str("'~'"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::Not => f.write_str("NOT"),
            Token::Bang => f.write_str("'!'"),
            Token::Minus => f.write_str("'-'"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::LBracket => f.write_str("'['"),
            Token::RBracket => f.write_str("']'"),
            Token::Comma => f.write_str("','"),
            Token::Eof => f.write_str("end of input"),
        }
    }
}
