//! Template lexer.
//!
//! Turns template source into a flat stream of tokens: literal text,
//! block delimiters, directives, paths and literals. Positions are
//! tracked so parse errors can point at the offending line and column.
pub mod token;
pub mod value;

pub use token::{Token, TokenWithContext};
pub use value::{ToTemplateValue, Value};

use super::error::Error;

/// Convert template source into tokens.
pub trait Tokenize {
    fn tokenize(&self) -> Result<Vec<TokenWithContext>, Error>;
}

impl Tokenize for &str {
    fn tokenize(&self) -> Result<Vec<TokenWithContext>, Error> {
        Lexer::new(self).tokens()
    }
}

impl Tokenize for String {
    fn tokenize(&self) -> Result<Vec<TokenWithContext>, Error> {
        Lexer::new(self).tokens()
    }
}

/// The template lexer.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<TokenWithContext>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;

        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(c)
    }

    fn push(&mut self, token: Token, line: usize, column: usize) {
        self.tokens.push(TokenWithContext::new(token, line, column));
    }

    /// Tokenize the source.
    pub fn tokens(mut self) -> Result<Vec<TokenWithContext>, Error> {
        let mut text = String::new();
        let mut text_line = self.line;
        let mut text_column = self.column;

        loop {
            if self.peek(0) == Some('{') && self.peek(1) == Some('{') {
                if !text.is_empty() {
                    self.push(Token::Text(std::mem::take(&mut text)), text_line, text_column);
                }

                let line = self.line;
                let column = self.column;
                let raw = self.peek(2) == Some('{');

                let _ = self.advance();
                let _ = self.advance();

                if raw {
                    let _ = self.advance();
                    self.push(Token::BlockStartRaw, line, column);
                } else {
                    self.push(Token::BlockStart, line, column);
                }

                self.code_block(raw)?;

                text_line = self.line;
                text_column = self.column;
            } else {
                if text.is_empty() {
                    text_line = self.line;
                    text_column = self.column;
                }

                match self.advance() {
                    Some(c) => text.push(c),
                    None => break,
                }
            }
        }

        if !text.is_empty() {
            self.push(Token::Text(text), text_line, text_column);
        }

        Ok(self.tokens)
    }

    /// Tokenize the inside of a `{{ ... }}` block.
    /// The closing delimiter must match the opening one.
    fn code_block(&mut self, raw: bool) -> Result<(), Error> {
        loop {
            while self.peek(0).map(|c| c.is_whitespace()).unwrap_or(false) {
                let _ = self.advance();
            }

            let line = self.line;
            let column = self.column;

            let c = self.peek(0).ok_or(Error::Eof("code block"))?;

            match c {
                '}' => {
                    if self.peek(1) != Some('}') {
                        return Err(Error::Syntax(TokenWithContext::new(
                            Token::Text(c.to_string()),
                            line,
                            column,
                        )));
                    }

                    let _ = self.advance();
                    let _ = self.advance();

                    if raw {
                        match self.peek(0) {
                            Some('}') => {
                                let _ = self.advance();
                                self.push(Token::BlockEndRaw, line, column);
                            }
                            _ => {
                                return Err(Error::WrongToken(
                                    TokenWithContext::new(Token::BlockEnd, line, column),
                                    Token::BlockEndRaw,
                                ))
                            }
                        }
                    } else {
                        self.push(Token::BlockEnd, line, column);
                    }

                    return Ok(());
                }

                '!' => {
                    let _ = self.advance();
                    self.push(Token::Not, line, column);
                }

                '\'' | '"' => {
                    let string = self.string_literal(c)?;
                    self.push(Token::Value(Value::String(string)), line, column);
                }

                '#' => {
                    let _ = self.advance();
                    let word = self.word();

                    match word.as_str() {
                        "if" => self.push(Token::If, line, column),
                        "each" => self.push(Token::Each, line, column),
                        _ => {
                            return Err(Error::Syntax(TokenWithContext::new(
                                Token::Variable(format!("#{}", word)),
                                line,
                                column,
                            )))
                        }
                    }
                }

                '/' => {
                    let _ = self.advance();
                    let word = self.word();

                    match word.as_str() {
                        "if" => self.push(Token::EndIf, line, column),
                        "each" => self.push(Token::EndEach, line, column),
                        _ => {
                            return Err(Error::Syntax(TokenWithContext::new(
                                Token::Variable(format!("/{}", word)),
                                line,
                                column,
                            )))
                        }
                    }
                }

                c if c.is_ascii_digit() => {
                    let number = self.number(line, column)?;
                    self.push(Token::Value(number), line, column);
                }

                c if c.is_alphabetic() || c == '_' || c == '@' => {
                    let word = self.word();

                    match word.as_str() {
                        "else" => self.push(Token::Else, line, column),
                        "true" => self.push(Token::Value(Value::Boolean(true)), line, column),
                        "false" => self.push(Token::Value(Value::Boolean(false)), line, column),
                        "null" => self.push(Token::Value(Value::Null), line, column),
                        _ => self.push(Token::Variable(word), line, column),
                    }
                }

                c => {
                    return Err(Error::Syntax(TokenWithContext::new(
                        Token::Text(c.to_string()),
                        line,
                        column,
                    )))
                }
            }
        }
    }

    /// Read an identifier or a dot-separated path, e.g. `user.name` or `@index`.
    fn word(&mut self) -> String {
        let mut word = String::new();

        while let Some(c) = self.peek(0) {
            if c.is_alphanumeric() || c == '_' || c == '.' || c == '@' {
                word.push(c);
                let _ = self.advance();
            } else {
                break;
            }
        }

        word
    }

    /// Read an integer or float literal.
    fn number(&mut self, line: usize, column: usize) -> Result<Value, Error> {
        let mut number = String::new();

        while let Some(c) = self.peek(0) {
            if c.is_ascii_digit() || c == '.' {
                number.push(c);
                let _ = self.advance();
            } else {
                break;
            }
        }

        if number.contains('.') {
            match number.parse::<f64>() {
                Ok(f) => Ok(Value::Float(f)),
                Err(_) => Err(Error::Syntax(TokenWithContext::new(
                    Token::Variable(number),
                    line,
                    column,
                ))),
            }
        } else {
            match number.parse::<i64>() {
                Ok(i) => Ok(Value::Integer(i)),
                Err(_) => Err(Error::Syntax(TokenWithContext::new(
                    Token::Variable(number),
                    line,
                    column,
                ))),
            }
        }
    }

    /// Read a quoted string literal, handling backslash escapes.
    fn string_literal(&mut self, quote: char) -> Result<String, Error> {
        let _ = self.advance(); // Opening quote.
        let mut string = String::new();

        loop {
            let c = self.advance().ok_or(Error::Eof("string literal"))?;

            if c == quote {
                break;
            }

            if c == '\\' {
                let escaped = self.advance().ok_or(Error::Eof("string literal"))?;
                match escaped {
                    'n' => string.push('\n'),
                    't' => string.push('\t'),
                    'r' => string.push('\r'),
                    '\\' => string.push('\\'),
                    c => string.push(c),
                }
            } else {
                string.push(c);
            }
        }

        Ok(string)
    }
}
