//! Attribute path parser (RFC 7644 PATCH `path`).
//!
//! Only the conjunctive value filters produced by this workspace are
//! supported inside brackets: `attr OP literal` clauses joined by `and`.

use crate::types::*;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected character: {0}")]
    UnexpectedChar(char),
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unclosed string")]
    UnclosedString,
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("Unsupported logical operator: {0}")]
    UnsupportedLogical(String),
}

/// Attribute path parser.
pub struct AttrPathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> AttrPathParser<'a> {
    /// Parse a PATCH path.
    ///
    /// A leading `urn:` prefix runs up to the last `:` before any filter;
    /// the segment after it is the attribute name.
    pub fn parse(input: &'a str) -> Result<AttrPath, ParseError> {
        let mut parser = Self { input, pos: 0 };
        let path = parser.parse_path()?;
        if !parser.is_at_end() {
            return Err(ParseError::UnexpectedChar(parser.peek().unwrap_or('\0')));
        }
        Ok(path)
    }

    /// Parse the inside of a value filter, e.g. `type eq "work" and primary eq true`.
    pub fn parse_filter(input: &'a str) -> Result<ValueFilter, ParseError> {
        let mut parser = Self { input, pos: 0 };
        let filter = parser.parse_filter_clauses()?;
        parser.skip_whitespace();
        if !parser.is_at_end() {
            return Err(ParseError::UnexpectedChar(parser.peek().unwrap_or('\0')));
        }
        Ok(filter)
    }

    fn parse_path(&mut self) -> Result<AttrPath, ParseError> {
        let urn = self.parse_urn_prefix();
        let attr = self.parse_identifier()?;
        let mut path = AttrPath::new(attr);
        path.urn = urn;

        if self.peek() == Some('[') {
            self.advance();
            let filter = self.parse_filter_clauses()?;
            self.skip_whitespace();
            self.expect(']')?;
            path.filter = Some(filter);
        }

        if self.peek() == Some('.') {
            self.advance();
            path.sub_attr = Some(self.parse_identifier()?);
        }

        Ok(path)
    }

    fn parse_urn_prefix(&mut self) -> Option<String> {
        let rest = &self.input[self.pos..];
        if !rest.get(..4).is_some_and(|p| p.eq_ignore_ascii_case("urn:")) {
            return None;
        }
        let head_end = rest.find('[').unwrap_or(rest.len());
        let split = rest[..head_end].rfind(':')?;
        let urn = rest[..split].to_string();
        self.pos += split + 1;
        Some(urn)
    }

    fn parse_filter_clauses(&mut self) -> Result<ValueFilter, ParseError> {
        let mut filter = ValueFilter::default();
        self.skip_whitespace();
        if self.peek() == Some(']') || self.is_at_end() {
            return Ok(filter);
        }

        loop {
            filter.push(self.parse_comparison()?);
            self.skip_whitespace();
            if self.peek_keyword("and") {
                self.advance_by(3);
                continue;
            }
            if self.peek_keyword("or") {
                return Err(ParseError::UnsupportedLogical("or".into()));
            }
            break;
        }

        Ok(filter)
    }

    fn parse_comparison(&mut self) -> Result<Comparison, ParseError> {
        self.skip_whitespace();
        let attr = self.parse_identifier()?;
        self.skip_whitespace();
        let token = self.parse_word();
        if token.is_empty() {
            return Err(self.unexpected());
        }
        let op = CompareOp::from_token(&token).ok_or(ParseError::UnknownOperator(token))?;
        self.skip_whitespace();
        let value = self.parse_literal()?;
        Ok(Comparison { attr, op, value })
    }

    fn parse_literal(&mut self) -> Result<serde_json::Value, ParseError> {
        use serde_json::Value;

        match self.peek() {
            Some('"') => Ok(Value::String(self.parse_string()?)),
            Some('-') | Some('0'..='9') => self.parse_number(),
            Some(_) => {
                let word = self.parse_word();
                match word.to_ascii_lowercase().as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    _ => Err(self.unexpected()),
                }
            }
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn parse_identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' || c == '$' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.unexpected());
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn parse_word(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut result = String::new();

        loop {
            match self.peek() {
                None => return Err(ParseError::UnclosedString),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    // Only `\"` is an escape; any other backslash is literal.
                    // Backslashes are written unescaped, so a literal ending
                    // in `\` looks like `\"`: the quote closes the string
                    // when the filter visibly continues or ends after it.
                    if self.peek() == Some('"') {
                        self.advance();
                        if self.at_literal_end() {
                            result.push('\\');
                            break;
                        }
                        result.push('"');
                    } else {
                        result.push('\\');
                    }
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }

        Ok(result)
    }

    fn parse_number(&mut self) -> Result<serde_json::Value, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        {
            self.advance();
        }
        let num_str = &self.input[start..self.pos];
        serde_json::from_str::<serde_json::Number>(num_str)
            .map(serde_json::Value::Number)
            .map_err(|_| ParseError::InvalidNumber)
    }

    /// Whether the input after a string literal looks like the rest of a
    /// filter: end of input, `]`, or the next `and` clause.
    fn at_literal_end(&self) -> bool {
        let rest = self.input[self.pos..].trim_start();
        if rest.is_empty() || rest.starts_with(']') {
            return true;
        }
        let ws = self.input.len() - self.pos - rest.len();
        ws > 0
            && rest.get(..3).is_some_and(|kw| kw.eq_ignore_ascii_case("and"))
            && rest[3..].starts_with(char::is_whitespace)
    }

    /// Case-insensitive keyword followed by whitespace.
    fn peek_keyword(&self, kw: &str) -> bool {
        let rest = &self.input[self.pos..];
        match rest.get(..kw.len()) {
            Some(head) if head.eq_ignore_ascii_case(kw) => {
                rest[kw.len()..].starts_with(char::is_whitespace)
            }
            _ => false,
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(c) => ParseError::UnexpectedChar(c),
            None => ParseError::UnexpectedEnd,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}
