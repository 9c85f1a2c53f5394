use std::mem;

use thiserror::Error;

use crate::{
    ast::{Operator, RawNode, Token},
    lexer::{LexError, Lexer, Position},
    value::Literal,
};

/// Default limit on parenthesis / negation / mapping nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Errors raised by the string grammar and the mapping form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("unexpected {found} at {position}")]
    UnexpectedToken { found: String, position: Position },

    #[error("expected {expected}, found {found} at {position}")]
    Expected {
        expected: &'static str,
        found: String,
        position: Position,
    },

    #[error("empty expression")]
    EmptyExpression,

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("invalid mapping: {0}")]
    InvalidMapping(String),
}

/// Parse a query in the string grammar with the default nesting limit.
pub fn parse_string(text: &str) -> Result<RawNode, ParseError> {
    Parser::new(Lexer::new(text))?.parse()
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    position: Position,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let position = lexer.token_position();
        Ok(Parser {
            lexer,
            current_token,
            position,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        self.position = self.lexer.token_position();
        Ok(())
    }

    /// Move past the current token and hand it out.
    fn take(&mut self) -> Result<Token, ParseError> {
        let token = mem::replace(&mut self.current_token, Token::Eof);
        self.advance()?;
        Ok(token)
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token, description: &'static str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.expected(description));
        }
        self.advance()
    }

    fn expected(&self, description: &'static str) -> ParseError {
        ParseError::Expected {
            expected: description,
            found: self.current_token.to_string(),
            position: self.position,
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.current_token.to_string(),
            position: self.position,
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

    /// Whether the current token can begin an implicitly conjoined term.
    fn starts_term(&self) -> bool {
        matches!(
            self.current_token,
            Token::Word(_)
                | Token::Quoted(_)
                | Token::LParen
                | Token::Not
                | Token::Bang
                | Token::Minus
        )
    }

    /// Parse operands: words, quoted strings, signed words and bracket lists.
    /// Returns whether the operand was quoted.
    fn parse_operand(&mut self) -> Result<(Literal, bool), ParseError> {
        if self.check(&Token::LBracket) {
            self.advance()?;
            let mut items = vec![self.parse_scalar_operand()?.0];
            while self.check(&Token::Comma) {
                self.advance()?;
                items.push(self.parse_scalar_operand()?.0);
            }
            self.expect(Token::RBracket, "',' or ']'")?;
            return Ok((Literal::List(items), false));
        }
        self.parse_scalar_operand()
    }

    fn parse_scalar_operand(&mut self) -> Result<(Literal, bool), ParseError> {
        match &self.current_token {
            Token::Word(_) | Token::Quoted(_) => match self.take()? {
                Token::Word(word) => Ok((Literal::Text(word), false)),
                Token::Quoted(text) => Ok((Literal::Text(text), true)),
                _ => unreachable!(),
            },
            // Signed numbers: `balance<-10`
            Token::Minus => {
                self.advance()?;
                match &self.current_token {
                    Token::Word(word) => {
                        let signed = format!("-{word}");
                        self.advance()?;
                        Ok((Literal::Text(signed), false))
                    }
                    _ => Err(self.expected("operand")),
                }
            }
            _ => Err(self.expected("operand")),
        }
    }

    /// `key op operand`, with the key and operator token already consumed.
    fn parse_comparison(&mut self, key: String, op: Token) -> Result<RawNode, ParseError> {
        let (operand, quoted) = self.parse_operand()?;

        let node = match op {
            Token::Colon | Token::Eq if operand.is_list() => {
                RawNode::compare(key, Operator::In, operand)
            }
            Token::NotEq if operand.is_list() => {
                RawNode::negate(RawNode::compare(key, Operator::In, operand))
            }
            Token::Colon | Token::Eq => {
                let wildcard = matches!(&operand, Literal::Text(text) if !quoted && text.contains('*'));
                let op = if wildcard { Operator::Like } else { Operator::Eq };
                RawNode::compare(key, op, operand)
            }
            Token::NotEq => RawNode::compare(key, Operator::Neq, operand),
            Token::Lt => RawNode::compare(key, Operator::Lt, operand),
            Token::LtEq => RawNode::compare(key, Operator::Lte, operand),
            Token::Gt => RawNode::compare(key, Operator::Gt, operand),
            Token::GtEq => RawNode::compare(key, Operator::Gte, operand),
            Token::Tilde => RawNode::compare(key, Operator::Like, operand),
            other => {
                return Err(ParseError::UnexpectedToken {
                    found: other.to_string(),
                    position: self.position,
                });
            }
        };
        Ok(node)
    }

    /// Parse primary terms: groups, comparisons and bare terms
    fn parse_primary(&mut self) -> Result<RawNode, ParseError> {
        match &self.current_token {
            Token::LParen => {
                self.advance()?;
                if self.check(&Token::RParen) {
                    return Err(ParseError::EmptyExpression);
                }
                let node = self.nested(Self::parse_or)?;
                self.expect(Token::RParen, "')'")?;
                Ok(node)
            }
            Token::Word(_) => {
                let Token::Word(word) = self.take()? else {
                    unreachable!()
                };
                if self.current_token.is_comparison() {
                    let op = self.take()?;
                    self.parse_comparison(word, op)
                } else {
                    Ok(RawNode::term(Operator::Like, Literal::Text(word)))
                }
            }
            Token::Quoted(_) => {
                let Token::Quoted(text) = self.take()? else {
                    unreachable!()
                };
                Ok(RawNode::term(Operator::Like, Literal::Text(text)))
            }
            Token::Eof => Err(self.expected("expression")),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_unary(&mut self) -> Result<RawNode, ParseError> {
        if matches!(self.current_token, Token::Not | Token::Bang | Token::Minus) {
            self.advance()?;
            let inner = self.nested(Self::parse_unary)?;
            return Ok(RawNode::negate(inner));
        }
        self.parse_primary()
    }

    fn parse_and(&mut self) -> Result<RawNode, ParseError> {
        let mut children = vec![self.parse_unary()?];

        loop {
            if self.check(&Token::And) {
                self.advance()?;
                children.push(self.parse_unary()?);
            } else if self.starts_term() {
                children.push(self.parse_unary()?);
            } else {
                break;
            }
        }
        Ok(RawNode::and_of(children))
    }

    fn parse_or(&mut self) -> Result<RawNode, ParseError> {
        let mut children = vec![self.parse_and()?];

        while self.check(&Token::Or) {
            self.advance()?;
            children.push(self.parse_and()?);
        }
        Ok(RawNode::or_of(children))
    }

    pub fn parse_expression(&mut self) -> Result<RawNode, ParseError> {
        self.parse_or()
    }

    /// Parse a complete query; the whole input must be consumed.
    pub fn parse(&mut self) -> Result<RawNode, ParseError> {
        if self.check(&Token::Eof) {
            return Err(ParseError::EmptyExpression);
        }
        let node = self.parse_expression()?;
        if !self.check(&Token::Eof) {
            return Err(self.unexpected());
        }
        Ok(node)
    }
}
