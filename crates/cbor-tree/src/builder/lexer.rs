//! Splits JSON-like text into builder tokens.
//!
//! Separators (whitespace, `:` and `,`) are skipped without any check of
//! where they appear; structure is the builder's business.

use std::borrow::Cow;

use super::error::BuildError;
use crate::node::{Kind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Array,
    Map,
}

impl Container {
    pub(crate) fn value(self) -> Value<'static> {
        match self {
            Container::Array => Value::Array,
            Container::Map => Value::Map,
        }
    }

    pub(crate) fn kind(self) -> Kind {
        match self {
            Container::Array => Kind::Array,
            Container::Map => Kind::Map,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Open(Container),
    Close(Container),
    Literal(Value<'a>),
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Lexer<'a> {
    /// Lexes `input[start..end]`.
    pub fn new(input: &'a str, start: usize, end: usize) -> Result<Self, BuildError> {
        if start > end || end > input.len() {
            return Err(BuildError::OutOfRange {
                start,
                end,
                len: input.len(),
            });
        }
        Ok(Self {
            input,
            pos: start,
            end,
        })
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.pos
    }

    fn scan(&mut self) -> Result<Option<(usize, Token<'a>)>, BuildError> {
        let input = self.input;
        let bytes = input.as_bytes();
        while self.pos < self.end {
            let start = self.pos;
            let token = match bytes[start] {
                b' ' | b'\t' | b'\r' | b'\n' | b':' | b',' => None,
                b'{' => Some(Token::Open(Container::Map)),
                b'[' => Some(Token::Open(Container::Array)),
                b'}' => Some(Token::Close(Container::Map)),
                b']' => Some(Token::Close(Container::Array)),
                b'"' => Some(self.string(start)?),
                b't' => Some(self.keyword(start, "true", Value::True)?),
                b'f' => Some(self.keyword(start, "false", Value::False)?),
                b'n' => Some(self.keyword(start, "null", Value::Null)?),
                b'-' | b'0'..=b'9' => Some(self.number(start)?),
                _ => return Err(BuildError::InvalidLiteral { pos: start }),
            };
            // Literal scanners leave `pos` on their last byte.
            self.pos += 1;
            if let Some(token) = token {
                return Ok(Some((start, token)));
            }
        }
        Ok(None)
    }

    fn string(&mut self, start: usize) -> Result<Token<'a>, BuildError> {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut i = start + 1;
        let mut escaped = false;
        let close = loop {
            if i >= self.end {
                return Err(BuildError::UnterminatedLiteral { pos: start });
            }
            match bytes[i] {
                b'"' => break i,
                // Raw control characters must be escaped.
                0x00..=0x1f => return Err(BuildError::InvalidLiteral { pos: start }),
                b'\\' => {
                    escaped = true;
                    i += 2;
                }
                _ => i += 1,
            }
        };
        let text = if escaped {
            let decoded: String = serde_json::from_str(&input[start..=close])
                .map_err(|_| BuildError::InvalidLiteral { pos: start })?;
            Cow::Owned(decoded.into_bytes())
        } else {
            Cow::Borrowed(input[start + 1..close].as_bytes())
        };
        self.pos = close;
        Ok(Token::Literal(Value::Text(text)))
    }

    fn keyword(
        &mut self,
        start: usize,
        word: &str,
        value: Value<'static>,
    ) -> Result<Token<'a>, BuildError> {
        if !self.input.as_bytes()[start..self.end].starts_with(word.as_bytes()) {
            return Err(BuildError::InvalidLiteral { pos: start });
        }
        self.pos = start + word.len() - 1;
        Ok(Token::Literal(value))
    }

    fn number(&mut self, start: usize) -> Result<Token<'a>, BuildError> {
        let input = self.input;
        let bytes = input.as_bytes();
        let mut i = start;
        if bytes[i] == b'-' {
            i += 1;
        }
        let digits = i;
        while i < self.end && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digits {
            return Err(BuildError::InvalidLiteral { pos: start });
        }
        let invalid = BuildError::InvalidLiteral { pos: start };
        let n: i128 = input[start..i].parse().map_err(|_| invalid.clone())?;
        let value = if n >= 0 {
            Value::Uint(u64::try_from(n).map_err(|_| invalid)?)
        } else if n >= -(1i128 << 64) {
            Value::Int(n)
        } else {
            return Err(invalid);
        };
        self.pos = i - 1;
        Ok(Token::Literal(value))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<(usize, Token<'a>), BuildError>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.scan();
        if item.is_err() {
            self.pos = self.end;
        }
        item.transpose()
    }
}
