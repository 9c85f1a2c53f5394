use std::fmt;

use thiserror::Error;

use crate::ast::Token;

/// Location of a token in the query text (1-based character column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}", self.column)
    }
}

/// Errors raised while splitting a query into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: Position },

    #[error("invalid escape sequence '\\{escape}' at {position}")]
    InvalidEscape { escape: char, position: Position },

    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },
}

/// Characters that end an unquoted word.
const DELIMITERS: &[char] = &[
    '(', ')', '[', ']', ',', ':', '=', '!', '<', '>', '~', '"', '\'', '&', '|',
];

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
        }
    }

    /// Start of the token most recently returned by [`Lexer::next_token`].
    pub fn token_position(&self) -> Position {
        Position {
            column: self.token_start + 1,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn here(&self) -> Position {
        Position {
            column: self.position + 1,
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() || DELIMITERS.contains(&ch) {
                break;
            }
            result.push(ch);
            self.advance();
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.here();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    let escape_at = self.here();
                    self.advance();
                    match self.current_char() {
                        Some(c @ ('"' | '\'' | '\\')) => result.push(c),
                        Some(escape) => {
                            return Err(LexError::InvalidEscape {
                                escape,
                                position: escape_at,
                            });
                        }
                        None => return Err(LexError::UnterminatedString { position: start }),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    /// Consume `ch` when it is the next character.
    fn eat(&mut self, ch: char) -> bool {
        if self.peek_char(1) == Some(ch) {
            self.advance();
            self.advance();
            true
        } else {
            false
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some('[') => self.single(Token::LBracket),
            Some(']') => self.single(Token::RBracket),
            Some(',') => self.single(Token::Comma),
            Some(':') => self.single(Token::Colon),
            Some('=') => self.single(Token::Eq),
            Some('~') => self.single(Token::Tilde),
            Some('-') => self.single(Token::Minus),
            Some('!') => {
                if self.eat('=') {
                    Token::NotEq
                } else {
                    self.single(Token::Bang)
                }
            }
            Some('<') => {
                if self.eat('=') {
                    Token::LtEq
                } else if self.eat('>') {
                    Token::NotEq
                } else {
                    self.single(Token::Lt)
                }
            }
            Some('>') => {
                if self.eat('=') {
                    Token::GtEq
                } else {
                    self.single(Token::Gt)
                }
            }
            Some(c @ ('&' | '|')) => {
                if self.eat(c) {
                    if c == '&' { Token::And } else { Token::Or }
                } else {
                    return Err(LexError::UnexpectedChar {
                        ch: c,
                        position: self.here(),
                    });
                }
            }
            Some(quote @ ('"' | '\'')) => Token::Quoted(self.read_string(quote)?),
            Some(_) => {
                let word = self.read_word();
                match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => Token::Word(word),
                }
            }
        };

        Ok(token)
    }

    /// Split the whole input into tokens, ending with [`Token::Eof`].
    pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and OR Not");
    assert_eq!(lexer.next_token(), Ok(Token::And));
    assert_eq!(lexer.next_token(), Ok(Token::Or));
    assert_eq!(lexer.next_token(), Ok(Token::Not));
    assert_eq!(lexer.next_token(), Ok(Token::Eof));
}

#[test]
fn test_comparison() {
    let mut lexer = Lexer::new("age>=30 (name:\"al\")");
    assert_eq!(lexer.next_token(), Ok(Token::Word("age".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::GtEq));
    assert_eq!(lexer.next_token(), Ok(Token::Word("30".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::LParen));
    assert_eq!(lexer.token_position(), Position { column: 9 });
    assert_eq!(lexer.next_token(), Ok(Token::Word("name".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::Colon));
    assert_eq!(lexer.next_token(), Ok(Token::Quoted("al".to_string())));
    assert_eq!(lexer.next_token(), Ok(Token::RParen));
}
