// src/cson/parser.rs

//! Recursive-descent CSON reader

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// A syntax error in a CSON document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Parse a CSON document into a JSON value
///
/// A document is either a single value (`[...]`, `{...}`, a scalar) or, in
/// the common case, a braceless object block keyed by indentation. An empty
/// document parses as an empty object.
pub fn from_str(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(text);
    parser.parse_document()
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.replace("\r\n", "\n").chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> ParseError {
        let mut line = 1;
        let mut column = 1;
        for &c in &self.chars[..pos.min(self.chars.len())] {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        ParseError {
            line,
            column,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.pos += 1;
        }
    }

    fn skip_to_eol(&mut self) {
        while !matches!(self.peek(), None | Some('\n')) {
            self.pos += 1;
        }
    }

    /// Find the next line holding content, without consuming anything.
    ///
    /// Returns the position of its first significant character and the line's
    /// indentation. Blank lines and comment-only lines are skipped.
    fn peek_significant_line(&self) -> Option<(usize, usize)> {
        let mut pos = self.pos;
        let mut indent = 0;
        loop {
            match self.chars.get(pos).copied() {
                None => return None,
                Some(' ') | Some('\t') => {
                    indent += 1;
                    pos += 1;
                }
                Some('\n') => {
                    indent = 0;
                    pos += 1;
                }
                Some('#') => {
                    while !matches!(self.chars.get(pos).copied(), None | Some('\n')) {
                        pos += 1;
                    }
                }
                Some(_) => return Some((pos, indent)),
            }
        }
    }

    fn parse_document(&mut self) -> Result<Value, ParseError> {
        let Some((start, indent)) = self.peek_significant_line() else {
            return Ok(Value::Object(Map::new()));
        };

        if self.starts_with_key(start) {
            let block = self.parse_block(indent)?;
            if let Some((pos, _)) = self.peek_significant_line() {
                return Err(self.error_at(pos, "unexpected content after document"));
            }
            return Ok(Value::Object(block));
        }

        self.pos = start;
        let value = self.parse_value()?;
        self.expect_line_end()?;
        if let Some((pos, _)) = self.peek_significant_line() {
            return Err(self.error_at(pos, "unexpected content after document"));
        }
        Ok(value)
    }

    /// Probe whether the line starting at `start` opens a `key:` entry
    fn starts_with_key(&mut self, start: usize) -> bool {
        let saved = self.pos;
        self.pos = start;
        let is_key = self.parse_key().is_ok() && {
            self.skip_spaces();
            self.peek() == Some(':')
        };
        self.pos = saved;
        is_key
    }

    /// Parse a braceless object block whose entries sit at `indent`
    fn parse_block(&mut self, indent: usize) -> Result<Map<String, Value>, ParseError> {
        let mut map = Map::new();
        loop {
            let Some((start, line_indent)) = self.peek_significant_line() else {
                break;
            };
            if line_indent < indent {
                break;
            }
            if line_indent > indent {
                return Err(self.error_at(start, "unexpected indentation"));
            }

            self.pos = start;
            let key = self.parse_key()?;
            self.skip_spaces();
            if self.bump() != Some(':') {
                return Err(self.error("expected ':' after key"));
            }
            self.skip_spaces();

            let value = if matches!(self.peek(), None | Some('\n') | Some('#')) {
                // Value is a nested block on the following lines
                self.skip_to_eol();
                match self.peek_significant_line() {
                    Some((_, child_indent)) if child_indent > indent => {
                        Value::Object(self.parse_block(child_indent)?)
                    }
                    _ => return Err(self.error("expected an indented value")),
                }
            } else {
                let value = self.parse_value()?;
                self.expect_line_end()?;
                value
            };
            map.insert(key, value);
        }
        Ok(map)
    }

    fn parse_key(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some('"') | Some('\'') => self.parse_quoted_string(),
            Some(c) if is_identifier_start(c) => {
                let start = self.pos;
                while self.peek().is_some_and(is_identifier_char) {
                    self.pos += 1;
                }
                Ok(self.chars[start..self.pos].iter().collect())
            }
            _ => Err(self.error("expected a key")),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        match self.peek() {
            Some('"') | Some('\'') => {
                let quote = self.peek().unwrap();
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.parse_heredoc(quote).map(Value::String)
                } else {
                    self.parse_quoted_string().map(Value::String)
                }
            }
            Some('[') => self.parse_array(),
            Some('{') => self.parse_inline_object(),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => self.parse_number(),
            Some(c) if c.is_ascii_alphabetic() => self.parse_word(),
            _ => Err(self.error("expected a value")),
        }
    }

    fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        let quote = self.bump().unwrap();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string")),
                Some('\\') => out.push_str(&self.parse_escape()?),
                Some(c) if c == quote => return Ok(out),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<String, ParseError> {
        match self.bump() {
            None => Err(self.error("unterminated escape sequence")),
            Some('n') => Ok("\n".into()),
            Some('t') => Ok("\t".into()),
            Some('r') => Ok("\r".into()),
            Some('b') => Ok("\u{8}".into()),
            Some('f') => Ok("\u{c}".into()),
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self
                        .bump()
                        .and_then(|c| c.to_digit(16))
                        .ok_or_else(|| self.error("invalid \\u escape"))?;
                    code = code * 16 + digit;
                }
                char::from_u32(code)
                    .map(String::from)
                    .ok_or_else(|| self.error("invalid \\u escape"))
            }
            // Unknown escapes keep the escaped character, as CoffeeScript does
            Some(c) => Ok(c.to_string()),
        }
    }

    fn parse_heredoc(&mut self, quote: char) -> Result<String, ParseError> {
        self.pos += 3;
        let mut raw = String::new();
        loop {
            if self.peek() == Some(quote)
                && self.peek_at(1) == Some(quote)
                && self.peek_at(2) == Some(quote)
            {
                self.pos += 3;
                break;
            }
            match self.bump() {
                None => return Err(self.error("unterminated triple-quoted string")),
                Some('\\') => raw.push_str(&self.parse_escape()?),
                Some(c) => raw.push(c),
            }
        }
        Ok(dedent_heredoc(&raw))
    }

    fn parse_array(&mut self) -> Result<Value, ParseError> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(self.error("unterminated array")),
                Some(']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(_) => items.push(self.parse_value()?),
            }
        }
    }

    fn parse_inline_object(&mut self) -> Result<Value, ParseError> {
        self.pos += 1;
        let mut map = Map::new();
        loop {
            self.skip_separators();
            match self.peek() {
                None => return Err(self.error("unterminated object")),
                Some('}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(_) => {
                    let key = self.parse_key()?;
                    self.skip_separators();
                    if self.bump() != Some(':') {
                        return Err(self.error("expected ':' after key"));
                    }
                    self.skip_separators();
                    let value = self.parse_value()?;
                    map.insert(key, value);
                }
            }
        }
    }

    fn parse_number(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
        {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let text = text.strip_prefix('+').unwrap_or(&text);
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::Number(Number::from(n)));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error_at(start, format!("invalid number \"{text}\"")))
    }

    fn parse_word(&mut self) -> Result<Value, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "true" | "yes" | "on" => Ok(Value::Bool(true)),
            "false" | "no" | "off" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => Err(self.error_at(start, format!("unexpected word \"{word}\""))),
        }
    }

    /// Skip whitespace, newlines, commas, and comments inside `[]`/`{}`
    fn skip_separators(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\n') | Some(',') => self.pos += 1,
                Some('#') => self.skip_to_eol(),
                _ => return,
            }
        }
    }

    /// Consume trailing spaces, an optional comment, and the line terminator
    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        self.skip_spaces();
        if self.peek() == Some('#') {
            self.skip_to_eol();
        }
        match self.bump() {
            None | Some('\n') => Ok(()),
            Some(_) => {
                self.pos -= 1;
                Err(self.error("unexpected characters after value"))
            }
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Strip the framing newlines and common indentation of a heredoc body
fn dedent_heredoc(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.split('\n').collect();
    if lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    if lines.len() > 1 && lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| if l.len() >= indent { &l[indent..] } else { l })
        .collect::<Vec<_>>()
        .join("\n")
}
