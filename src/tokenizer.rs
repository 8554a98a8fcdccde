//! Turns a raw path string into a `Vec<PathToken>`.
//!
//! The scanner is hand-rolled recursive descent over `&str` byte positions,
//! not a regex: brackets nest (predicates can contain their own `[...]`
//! array accesses) and quoted strings can contain escaped quotes and stray
//! bracket characters, both of which a single-pass regex handles poorly.

use crate::error::JsonPathError;
use crate::expr;
use crate::token::{ArrayIndexSpec, PathToken, TokenFilter};

/// Tokenize a full path expression, e.g. `$.store.book[0].title`.
pub fn tokenize(path: &str) -> Result<Vec<PathToken>, JsonPathError> {
    let mut scanner = Scanner {
        input: path,
        pos: 0,
    };
    scanner.parse_root()
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn parse_root(&mut self) -> Result<Vec<PathToken>, JsonPathError> {
        self.skip_ws();
        let root_char = match self.peek() {
            Some(c @ '$') | Some(c @ '@') => c,
            _ => {
                return Err(JsonPathError::InvalidPath {
                    reason: "path must start with '$' or '@'".to_string(),
                    position: Some(self.pos),
                })
            }
        };
        self.advance();

        let mut tokens = vec![PathToken {
            fragment: root_char.to_string(),
            is_root: true,
            is_end: false,
            filter: TokenFilter::Root,
            upstream_fragment: root_char.to_string(),
        }];

        while !self.at_end() {
            self.parse_segment(&mut tokens)?;
        }

        if let Some(last) = tokens.last_mut() {
            last.is_end = true;
        }
        Ok(tokens)
    }

    fn parse_segment(&mut self, tokens: &mut Vec<PathToken>) -> Result<(), JsonPathError> {
        match self.peek() {
            Some('.') => {
                self.advance();
                if self.peek() == Some('.') {
                    self.advance();
                    self.push_token(tokens, "..".to_string(), TokenFilter::Scan);
                    if matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                        let name = self.parse_identifier()?;
                        self.push_token(tokens, name.clone(), TokenFilter::Field(vec![name]));
                    }
                    return Ok(());
                }
                if self.peek() == Some('*') {
                    self.advance();
                    self.push_token(tokens, ".*".to_string(), TokenFilter::Wildcard);
                    return Ok(());
                }
                if self.peek() == Some('[') {
                    // `.` immediately followed by `[`, e.g. after `..`: no
                    // field name to consume, let the bracket parser handle it.
                    return Ok(());
                }
                let name = self.parse_identifier()?;
                self.push_token(
                    tokens,
                    format!(".{name}"),
                    TokenFilter::Field(vec![name]),
                );
                Ok(())
            }
            Some('[') => {
                let (fragment, filter) = self.consume_bracket()?;
                self.push_token(tokens, fragment, filter);
                Ok(())
            }
            Some(c) => Err(JsonPathError::InvalidPath {
                reason: format!("unexpected character '{c}' in path"),
                position: Some(self.pos),
            }),
            None => Ok(()),
        }
    }

    fn push_token(&self, tokens: &mut Vec<PathToken>, fragment: String, filter: TokenFilter) {
        let upstream_fragment = format!(
            "{}{}",
            tokens.last().map(|t| t.upstream_fragment.as_str()).unwrap_or(""),
            fragment
        );
        tokens.push(PathToken {
            fragment,
            is_root: false,
            is_end: false,
            filter,
            upstream_fragment,
        });
    }

    /// Consume a `[...]` bracket, returning its normalized fragment text and
    /// the `TokenFilter` it compiles to. Tracks nesting depth and quote state
    /// so a `[?(@.a == '[weird]')]` body doesn't close early.
    fn consume_bracket(&mut self) -> Result<(String, TokenFilter), JsonPathError> {
        let start = self.pos;
        self.expect('[')?;
        let body_start = self.pos;
        let mut depth = 1usize;
        let mut quote: Option<char> = None;

        loop {
            match self.peek() {
                None => {
                    return Err(JsonPathError::InvalidPath {
                        reason: "unterminated '[' bracket".to_string(),
                        position: Some(start),
                    })
                }
                Some(c) => {
                    if let Some(q) = quote {
                        if c == '\\' {
                            self.advance();
                            self.advance();
                            continue;
                        }
                        if c == q {
                            quote = None;
                        }
                        self.advance();
                        continue;
                    }
                    match c {
                        '\'' | '"' => {
                            quote = Some(c);
                            self.advance();
                        }
                        '[' => {
                            depth += 1;
                            self.advance();
                        }
                        ']' => {
                            depth -= 1;
                            self.advance();
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => self.advance(),
                    }
                }
            }
        }

        let body = &self.input[body_start..self.pos - 1];
        let fragment = self.input[start..self.pos].to_string();
        let filter = classify_bracket(body)?;
        Ok((fragment, filter))
    }

    fn parse_identifier(&mut self) -> Result<String, JsonPathError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        if self.pos == start {
            return Err(JsonPathError::InvalidPath {
                reason: "expected a property name after '.'".to_string(),
                position: Some(start),
            });
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn expect(&mut self, c: char) -> Result<(), JsonPathError> {
        if self.peek() == Some(c) {
            self.advance();
            Ok(())
        } else {
            Err(JsonPathError::InvalidPath {
                reason: format!("expected '{c}'"),
                position: Some(self.pos),
            })
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

/// Classify the contents of a `[...]` bracket (with the surrounding `[` `]`
/// already stripped) into a `TokenFilter`.
fn classify_bracket(body: &str) -> Result<TokenFilter, JsonPathError> {
    let trimmed = body.trim();

    if trimmed == "*" {
        return Ok(TokenFilter::Wildcard);
    }
    if trimmed.is_empty() {
        return Ok(TokenFilter::AllArrayItems);
    }
    if trimmed == "?" {
        return Ok(TokenFilter::ArrayQuery);
    }
    if let Some(rest) = trimmed.strip_prefix("?(").and_then(|s| s.strip_suffix(')')) {
        return classify_predicate_body(rest);
    }
    if trimmed.starts_with('\'') || trimmed.starts_with('"') {
        let names = split_quoted_list(trimmed)?;
        return Ok(TokenFilter::Field(names));
    }
    if let Some(spec) = parse_array_index(trimmed)? {
        return Ok(TokenFilter::ArrayIndex(spec));
    }
    Err(JsonPathError::InvalidPath {
        reason: format!("unrecognized bracket contents '{trimmed}'"),
        position: None,
    })
}

/// Classify a `?( … )` body: a pure existence test with no comparator and no
/// boolean connective becomes `HasPath`; everything else (comparisons, or any
/// `&&`/`||` combination) compiles through the expression parser.
fn classify_predicate_body(body: &str) -> Result<TokenFilter, JsonPathError> {
    let has_connective = contains_str_outside_quotes(body, "&&") || contains_str_outside_quotes(body, "||");
    let has_comparator = contains_any_outside_quotes(body, &["==", "!=", "<>", "<=", ">=", "<", ">"]);

    if !has_connective && !has_comparator {
        let tokens = tokenize(body.trim())?;
        return Ok(TokenFilter::HasPath(crate::token::SubPath(tokens)));
    }

    let expr = expr::parse_predicate(body.trim())?;
    Ok(TokenFilter::ArrayEval(expr))
}

/// Whether any of `needles` appears in `haystack` outside of a quoted run.
fn contains_any_outside_quotes(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| contains_str_outside_quotes(haystack, n))
}

fn contains_str_outside_quotes(haystack: &str, needle: &str) -> bool {
    let bytes = haystack.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        if b == b'\'' || b == b'"' {
            quote = Some(b);
            i += 1;
            continue;
        }
        if haystack[i..].starts_with(needle) {
            return true;
        }
        i += 1;
    }
    false
}

/// Split a comma-separated list of single- or double-quoted field names,
/// e.g. `'a', 'b'`, respecting escaped quotes inside each string.
fn split_quoted_list(body: &str) -> Result<Vec<String>, JsonPathError> {
    let mut names = Vec::new();
    let bytes = body.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        while i < bytes.len() && (bytes[i] as char).is_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let quote = bytes[i];
        if quote != b'\'' && quote != b'"' {
            return Err(JsonPathError::InvalidPath {
                reason: format!("expected a quoted field name at '{}'", &body[i..]),
                position: None,
            });
        }
        i += 1;
        let mut name = String::new();
        loop {
            if i >= bytes.len() {
                return Err(JsonPathError::InvalidPath {
                    reason: "unclosed quoted field name".to_string(),
                    position: None,
                });
            }
            let c = bytes[i];
            if c == b'\\' && i + 1 < bytes.len() {
                name.push(bytes[i + 1] as char);
                i += 2;
                continue;
            }
            if c == quote {
                i += 1;
                break;
            }
            name.push(c as char);
            i += 1;
        }
        names.push(name);
        while i < bytes.len() && ((bytes[i] as char).is_whitespace() || bytes[i] == b',') {
            i += 1;
        }
    }
    Ok(names)
}

/// Parse an index/list/slice bracket body (already known not to be a
/// quoted-field list). Returns `None` (not `Err`) if it's neither numeric
/// form, so the caller's generic "unrecognized bracket" error fires instead.
fn parse_array_index(body: &str) -> Result<Option<ArrayIndexSpec>, JsonPathError> {
    if body.contains(':') {
        let parts: Vec<&str> = body.splitn(2, ':').collect();
        let left = parts[0].trim();
        let right = parts.get(1).map(|s| s.trim()).unwrap_or("");
        return match (left.is_empty(), right.is_empty()) {
            (true, false) => Ok(Some(ArrayIndexSpec::HeadSlice(parse_signed(right)?))),
            (false, true) => Ok(Some(ArrayIndexSpec::TailSlice(parse_signed(left)?))),
            (false, false) => Ok(Some(ArrayIndexSpec::Range(parse_signed(left)?, parse_signed(right)?))),
            (true, true) => Ok(None),
        };
    }
    if body.contains(',') {
        let indices = body
            .split(',')
            .map(|s| parse_signed(s.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(ArrayIndexSpec::IndexList(indices)));
    }
    if body.chars().all(|c| c.is_ascii_digit()) || (body.starts_with('-') && body[1..].chars().all(|c| c.is_ascii_digit())) {
        return Ok(Some(ArrayIndexSpec::SingleIndex(parse_signed(body)?)));
    }
    Ok(None)
}

fn parse_signed(s: &str) -> Result<i64, JsonPathError> {
    s.parse::<i64>().map_err(|_| JsonPathError::InvalidPath {
        reason: format!("expected an integer, found '{s}'"),
        position: None,
    })
}
