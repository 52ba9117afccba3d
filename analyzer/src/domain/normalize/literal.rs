//! Strict structured-literal parser.
//!
//! Several services embed Python-literal reprs in their free-text fields
//! (single-quoted strings, `True`/`None`, tuple syntax). Recovering those with
//! a general expression evaluator would be an arbitrary-code-execution hazard,
//! so this parser accepts literals only: strings, numbers, booleans,
//! `None`/`null`, lists, tuples, and dicts of literals. Tuples decode as
//! arrays; non-string dict keys are stringified. No identifiers, no operators,
//! no calls.

use serde_json::{Map, Number, Value as JsonValue};
use thiserror::Error;

/// Maximum container nesting accepted before giving up.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected character {0:?} at byte {1}")]
    UnexpectedChar(char, usize),
    #[error("nesting deeper than {MAX_DEPTH} levels")]
    TooDeep,
    #[error("trailing characters after literal at byte {0}")]
    TrailingInput(usize),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Parse a complete structured literal.
///
/// The whole input must be consumed (modulo surrounding whitespace);
/// anything left over is an error, never evaluated.
pub fn parse_literal(input: &str) -> Result<JsonValue, LiteralError> {
    let mut parser = Parser { src: input, pos: 0 };
    parser.skip_whitespace();
    let value = parser.parse_value(0)?;
    parser.skip_whitespace();
    if parser.pos < parser.src.len() {
        return Err(LiteralError::TrailingInput(parser.pos));
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), LiteralError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(LiteralError::UnexpectedChar(c, self.pos)),
            None => Err(LiteralError::UnexpectedEof),
        }
    }

    fn parse_value(&mut self, depth: usize) -> Result<JsonValue, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(LiteralError::TooDeep);
        }
        match self.peek() {
            Some('{') => self.parse_dict(depth),
            Some('[') => self.parse_sequence(depth, '[', ']'),
            Some('(') => self.parse_sequence(depth, '(', ')'),
            Some('\'') | Some('"') => self.parse_string().map(JsonValue::String),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_keyword(),
            Some(c) => Err(LiteralError::UnexpectedChar(c, self.pos)),
            None => Err(LiteralError::UnexpectedEof),
        }
    }

    fn parse_keyword(&mut self) -> Result<JsonValue, LiteralError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphabetic() {
                self.bump();
            } else {
                break;
            }
        }
        match &self.src[start..self.pos] {
            "True" | "true" => Ok(JsonValue::Bool(true)),
            "False" | "false" => Ok(JsonValue::Bool(false)),
            "None" | "null" => Ok(JsonValue::Null),
            word => {
                let c = word.chars().next().unwrap_or(' ');
                Err(LiteralError::UnexpectedChar(c, start))
            }
        }
    }

    fn parse_number(&mut self) -> Result<JsonValue, LiteralError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' => {
                    self.bump();
                }
                '.' | 'e' | 'E' => {
                    is_float = true;
                    self.bump();
                    if matches!(self.peek(), Some('-') | Some('+')) {
                        self.bump();
                    }
                }
                _ => break,
            }
        }
        let text = &self.src[start..self.pos];
        let unsigned = text.strip_prefix('+').unwrap_or(text);
        if !is_float {
            if let Ok(n) = unsigned.parse::<i64>() {
                return Ok(JsonValue::Number(n.into()));
            }
        }
        let parsed: f64 = unsigned
            .parse()
            .map_err(|_| LiteralError::InvalidNumber(text.to_string()))?;
        Number::from_f64(parsed)
            .map(JsonValue::Number)
            .ok_or_else(|| LiteralError::InvalidNumber(text.to_string()))
    }

    fn parse_string(&mut self) -> Result<String, LiteralError> {
        let quote = self.bump().ok_or(LiteralError::UnexpectedEof)?;
        let mut out = String::new();
        loop {
            let c = self.bump().ok_or(LiteralError::UnexpectedEof)?;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escape_pos = self.pos;
            let e = self.bump().ok_or(LiteralError::UnexpectedEof)?;
            match e {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                '0' => out.push('\0'),
                '\\' | '\'' | '"' => out.push(e),
                'x' => out.push(self.parse_hex_escape(2, escape_pos)?),
                'u' => out.push(self.parse_hex_escape(4, escape_pos)?),
                other => return Err(LiteralError::UnexpectedChar(other, escape_pos)),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize, at: usize) -> Result<char, LiteralError> {
        let mut code: u32 = 0;
        for _ in 0..digits {
            let c = self.bump().ok_or(LiteralError::UnexpectedEof)?;
            let digit = c
                .to_digit(16)
                .ok_or(LiteralError::UnexpectedChar(c, self.pos - c.len_utf8()))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(LiteralError::UnexpectedChar('\\', at))
    }

    fn parse_sequence(
        &mut self,
        depth: usize,
        open: char,
        close: char,
    ) -> Result<JsonValue, LiteralError> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some(close) {
                self.bump();
                return Ok(JsonValue::Array(items));
            }
            items.push(self.parse_value(depth + 1)?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {}
                Some(c) => return Err(LiteralError::UnexpectedChar(c, self.pos)),
                None => return Err(LiteralError::UnexpectedEof),
            }
        }
    }

    fn parse_dict(&mut self, depth: usize) -> Result<JsonValue, LiteralError> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.peek() == Some('}') {
                self.bump();
                return Ok(JsonValue::Object(map));
            }
            let key = match self.parse_value(depth + 1)? {
                JsonValue::String(s) => s,
                other => other.to_string(),
            };
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            let value = self.parse_value(depth + 1)?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                Some(c) => return Err(LiteralError::UnexpectedChar(c, self.pos)),
                None => return Err(LiteralError::UnexpectedEof),
            }
        }
    }
}

#[cfg(test)]
#[path = "literal_tests.rs"]
mod tests;
