//! Decoder for Python literal syntax in segment cells.
//!
//! Some transcript tables were written with Python's `repr` rather than JSON,
//! so a cell reads `[{'text': 'we go again', 'start': 1.0}]`. This accepts the
//! subset such cells use (lists, tuples, dicts, quoted strings, numbers,
//! `None`, `True`, `False`) and yields the equivalent JSON value.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Nesting limit for lists and dicts.
const MAX_DEPTH: usize = 64;

/// The cell is not a literal this decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid literal at byte {offset}")]
pub struct LiteralError {
    /// Byte offset where decoding stopped.
    pub offset: usize,
}

/// Parses a whole cell as one literal value.
pub fn parse(input: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser { src: input, pos: 0 };
    let value = parser.value(0)?;
    parser.skip_ws();
    if parser.pos != input.len() {
        return Err(parser.error());
    }
    Ok(value)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    #[inline(always)]
    fn error(&self) -> LiteralError {
        LiteralError { offset: self.pos }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn next_char(&mut self) -> Result<char, LiteralError> {
        let c = self.src[self.pos..].chars().next().ok_or_else(|| self.error())?;
        self.pos += c.len_utf8();
        Ok(c)
    }

    fn value(&mut self, depth: usize) -> Result<Value, LiteralError> {
        if depth > MAX_DEPTH {
            return Err(self.error());
        }
        self.skip_ws();
        match self.peek().ok_or_else(|| self.error())? {
            b'[' => self.sequence(b']', depth),
            b'(' => self.sequence(b')', depth),
            b'{' => self.dict(depth),
            quote @ (b'\'' | b'"') => self.string(quote).map(Value::String),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.number(),
            _ => self.keyword(),
        }
    }

    fn sequence(&mut self, close: u8, depth: usize) -> Result<Value, LiteralError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(c) if c == close => {}
                _ => return Err(self.error()),
            }
        }
    }

    fn dict(&mut self, depth: usize) -> Result<Value, LiteralError> {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(b'}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }
            let key = match self.peek() {
                Some(quote @ (b'\'' | b'"')) => self.string(quote)?,
                _ => return Err(self.error()),
            };
            self.skip_ws();
            if self.peek() != Some(b':') {
                return Err(self.error());
            }
            self.pos += 1;
            let value = self.value(depth + 1)?;
            map.insert(key, value);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error()),
            }
        }
    }

    fn string(&mut self, quote: u8) -> Result<String, LiteralError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.next_char()? {
                c if c == quote as char => return Ok(out),
                '\n' => return Err(self.error()),
                '\\' => self.escape(&mut out)?,
                c => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        match self.next_char()? {
            c @ ('\\' | '\'' | '"') => out.push(c),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            // line continuation
            '\n' => {}
            'x' => out.push(self.hex_char(2)?),
            'u' => out.push(self.hex_char(4)?),
            'U' => out.push(self.hex_char(8)?),
            // unknown escapes stay as written
            other => {
                out.push('\\');
                out.push(other);
            }
        }
        Ok(())
    }

    fn hex_char(&mut self, digits: usize) -> Result<char, LiteralError> {
        let hex = self
            .src
            .get(self.pos..self.pos + digits)
            .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
            .ok_or_else(|| self.error())?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error())?;
        let c = char::from_u32(code).ok_or_else(|| self.error())?;
        self.pos += digits;
        Ok(c)
    }

    fn number(&mut self) -> Result<Value, LiteralError> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E' | b'_')
        ) {
            self.pos += 1;
        }
        let raw: String = self.src[start..self.pos]
            .chars()
            .filter(|&c| c != '_')
            .collect();

        if let Ok(int) = raw.parse::<i64>() {
            return Ok(Value::from(int));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or(LiteralError { offset: start })
    }

    fn keyword(&mut self) -> Result<Value, LiteralError> {
        let rest = &self.src[self.pos..];
        for (word, value) in [
            ("None", Value::Null),
            ("True", Value::Bool(true)),
            ("False", Value::Bool(false)),
        ] {
            let Some(tail) = rest.strip_prefix(word) else {
                continue;
            };
            if !tail.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
                self.pos += word.len();
                return Ok(value);
            }
        }
        Err(self.error())
    }
}
