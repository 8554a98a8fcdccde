//! Inline predicate expressions: `[?(@.a == 'x' && @.b > 3)]`.
//!
//! The grammar (see `SPEC_FULL.md` §6) is a small recursive-descent language
//! of `||`-separated `&&`-chains of atoms, where an atom is either a
//! parenthesized sub-expression, a comparison `sub_path cmp literal`, or a
//! bare `sub_path` (an existence test). The AST is built once at compile
//! time; evaluation just walks it, short-circuiting `||` so a `true` left
//! side never forces evaluation of a right side that might not resolve.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Configuration;
use crate::error::JsonPathError;
use crate::criteria::Filter;
use crate::token::SubPath;
use crate::tokenizer;

/// A parsed `[?( … )]` predicate body.
#[derive(Debug, Clone, PartialEq)]
pub enum PredExpr {
    And(Box<PredExpr>, Box<PredExpr>),
    Or(Box<PredExpr>, Box<PredExpr>),
    Cmp {
        path: SubPath,
        op: CmpOp,
        literal: Literal,
    },
    Exists(SubPath),
}

/// A comparison operator. `Ne` covers both `!=` and `<>`; the tokenizer
/// normalizes the latter to the former since their semantics are identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A literal appearing on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Str(s)
    }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self {
        Literal::Int(i)
    }
}

impl From<f64> for Literal {
    fn from(f: f64) -> Self {
        Literal::Float(f)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

/// Evaluate a compiled predicate against one candidate array element.
///
/// Never raises: a sub-path that fails to resolve is treated as `null` for
/// comparisons and as "absent" for existence tests, which is what lets a
/// predicate run uniformly over heterogeneous array elements.
pub fn eval_predicate(expr: &PredExpr, element: &Value, config: &Configuration) -> bool {
    match expr {
        PredExpr::And(lhs, rhs) => {
            eval_predicate(lhs, element, config) && eval_predicate(rhs, element, config)
        }
        PredExpr::Or(lhs, rhs) => {
            eval_predicate(lhs, element, config) || eval_predicate(rhs, element, config)
        }
        PredExpr::Exists(sub) => resolve_subpath(sub, element, config).is_some(),
        PredExpr::Cmp { path, op, literal } => {
            let actual = resolve_subpath(path, element, config).unwrap_or(Value::Null);
            compare(&actual, *op, literal)
        }
    }
}

/// Resolve a `@…` sub-path against a candidate element, swallowing any
/// resolution failure as `None` rather than propagating an error: a
/// predicate sub-path not matching a given element is the normal case, not
/// a fault. A `null` at a non-terminal token means the path didn't match
/// (same rule `JsonPath::read` applies); a `null` *terminal* value is a
/// legitimate resolution, since existence, not truthiness, is what callers
/// like `HasPath` care about.
pub(crate) fn resolve_subpath(sub: &SubPath, element: &Value, config: &Configuration) -> Option<Value> {
    let mut current = element.clone();
    let mut in_array_ctx = false;
    let mut queue: VecDeque<Arc<dyn Filter>> = VecDeque::new();
    for tok in sub.0.iter() {
        if tok.is_root {
            continue;
        }
        match crate::filters::apply_token(
            &tok.filter,
            &current,
            config,
            &mut queue,
            &mut in_array_ctx,
            &tok.upstream_fragment,
        ) {
            Ok(v) => {
                if v.is_null() && !tok.is_end {
                    return None;
                }
                current = v;
            }
            Err(_) => return None,
        }
    }
    Some(current)
}

/// Type-aware comparison, per `SPEC_FULL.md` §4.3.
pub(crate) fn compare(actual: &Value, op: CmpOp, literal: &Literal) -> bool {
    let literal_is_null = matches!(literal, Literal::Null);

    if actual.is_null() {
        return match op {
            CmpOp::Eq => literal_is_null,
            CmpOp::Ne => !literal_is_null,
            _ => false,
        };
    }
    if literal_is_null {
        return match op {
            CmpOp::Eq => false,
            CmpOp::Ne => true,
            _ => false,
        };
    }

    match (actual, literal) {
        (Value::Bool(a), Literal::Bool(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            _ => false,
        },
        (Value::String(a), Literal::Str(b)) => match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            // Ordering on strings returns false rather than comparing
            // lexicographically; preserved legacy behavior, see DESIGN.md.
            _ => false,
        },
        (Value::Number(n), lit @ (Literal::Int(_) | Literal::Float(_))) => {
            let Some(af) = n.as_f64() else {
                return false;
            };
            let lf = match lit {
                Literal::Int(i) => *i as f64,
                Literal::Float(f) => *f,
                _ => unreachable!(),
            };
            match op {
                CmpOp::Eq => numbers_equal(n, lit),
                CmpOp::Ne => !numbers_equal(n, lit),
                CmpOp::Lt => af < lf,
                CmpOp::Le => af <= lf,
                CmpOp::Gt => af > lf,
                CmpOp::Ge => af >= lf,
            }
        }
        _ => false,
    }
}

fn numbers_equal(n: &serde_json::Number, lit: &Literal) -> bool {
    match lit {
        Literal::Int(i) => {
            if let Some(ni) = n.as_i64() {
                ni == *i
            } else if let Some(nu) = n.as_u64() {
                *i >= 0 && nu == *i as u64
            } else {
                n.as_f64().map(|nf| nf == *i as f64).unwrap_or(false)
            }
        }
        Literal::Float(f) => n.as_f64().map(|nf| nf == *f).unwrap_or(false),
        _ => false,
    }
}

/// Parse a `[?( … )]` body (the part between `?(` and the matching `)`)
/// into a predicate tree.
pub(crate) fn parse_predicate(body: &str) -> Result<PredExpr, JsonPathError> {
    let mut scanner = ExprScanner {
        input: body,
        pos: 0,
    };
    let expr = scanner.parse_or()?;
    scanner.skip_ws();
    if !scanner.at_end() {
        return Err(JsonPathError::InvalidPath {
            reason: format!("unexpected trailing content in predicate: '{}'", &body[scanner.pos..]),
            position: Some(scanner.pos),
        });
    }
    Ok(expr)
}

struct ExprScanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ExprScanner<'a> {
    fn parse_or(&mut self) -> Result<PredExpr, JsonPathError> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_ws();
            if self.peek_str("||") {
                self.advance_by(2);
                self.skip_ws();
                let right = self.parse_and()?;
                left = PredExpr::Or(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<PredExpr, JsonPathError> {
        let mut left = self.parse_atom()?;
        loop {
            self.skip_ws();
            if self.peek_str("&&") {
                self.advance_by(2);
                self.skip_ws();
                let right = self.parse_atom()?;
                left = PredExpr::And(Box::new(left), Box::new(right));
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_atom(&mut self) -> Result<PredExpr, JsonPathError> {
        self.skip_ws();
        if self.peek() == Some('(') {
            self.advance();
            self.skip_ws();
            let inner = self.parse_or()?;
            self.skip_ws();
            self.expect(')')?;
            return Ok(inner);
        }

        let path_str = self.consume_path_run()?;
        self.skip_ws();
        if let Some((op, len)) = self.peek_cmp_op() {
            self.advance_by(len);
            self.skip_ws();
            let literal = self.parse_literal()?;
            let tokens = tokenizer::tokenize(path_str)?;
            return Ok(PredExpr::Cmp {
                path: SubPath(tokens),
                op,
                literal,
            });
        }
        let tokens = tokenizer::tokenize(path_str)?;
        Ok(PredExpr::Exists(SubPath(tokens)))
    }

    fn consume_path_run(&mut self) -> Result<&'a str, JsonPathError> {
        self.skip_ws();
        let start = self.pos;
        if !matches!(self.peek(), Some('@') | Some('$')) {
            return Err(JsonPathError::InvalidPath {
                reason: "expected a sub-path starting with '@' or '$' in predicate".to_string(),
                position: Some(self.pos),
            });
        }
        self.advance();
        loop {
            match self.peek() {
                None => break,
                Some(')') | Some(',') => break,
                Some(c) if c.is_whitespace() => break,
                Some('&') if self.peek_str("&&") => break,
                Some('|') if self.peek_str("||") => break,
                Some('=') | Some('!') | Some('<') | Some('>') => break,
                _ => self.advance(),
            }
        }
        Ok(&self.input[start..self.pos])
    }

    fn parse_literal(&mut self) -> Result<Literal, JsonPathError> {
        self.skip_ws();
        match self.peek() {
            Some('\'') | Some('"') => Ok(Literal::Str(self.parse_quoted_string()?)),
            Some('t') if self.peek_str("true") => {
                self.advance_by(4);
                Ok(Literal::Bool(true))
            }
            Some('f') if self.peek_str("false") => {
                self.advance_by(5);
                Ok(Literal::Bool(false))
            }
            Some('n') if self.peek_str("null") => {
                self.advance_by(4);
                Ok(Literal::Null)
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number_literal(),
            other => Err(JsonPathError::InvalidPath {
                reason: format!("expected a literal, found {:?}", other),
                position: Some(self.pos),
            }),
        }
    }

    /// Strip exactly one leading and one trailing quote; a backslash before
    /// the terminator escapes it so the terminator can appear in the literal,
    /// but no other escape sequence is interpreted (`\n`, `\t`, … pass
    /// through as two literal characters). This mirrors the documented
    /// legacy quirk: quote-stripping only, not general unescaping.
    fn parse_quoted_string(&mut self) -> Result<String, JsonPathError> {
        let quote = self.peek().unwrap();
        self.advance();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(JsonPathError::InvalidPath {
                        reason: "unclosed string literal".to_string(),
                        position: Some(self.pos),
                    })
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') if self.peek_ahead(1) == Some(quote) => {
                    out.push(quote);
                    self.advance_by(2);
                }
                Some(c) => {
                    out.push(c);
                    self.advance();
                }
            }
        }
        Ok(out)
    }

    fn parse_number_literal(&mut self) -> Result<Literal, JsonPathError> {
        let start = self.pos;
        let mut is_float = false;
        if self.peek() == Some('-') {
            self.advance();
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.input[start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| JsonPathError::InvalidPath {
                    reason: format!("invalid number literal '{text}'"),
                    position: Some(start),
                })
        } else {
            text.parse::<i64>()
                .map(Literal::Int)
                .map_err(|_| JsonPathError::InvalidPath {
                    reason: format!("invalid number literal '{text}'"),
                    position: Some(start),
                })
        }
    }

    fn peek_cmp_op(&self) -> Option<(CmpOp, usize)> {
        if self.peek_str("==") {
            Some((CmpOp::Eq, 2))
        } else if self.peek_str("!=") {
            Some((CmpOp::Ne, 2))
        } else if self.peek_str("<>") {
            Some((CmpOp::Ne, 2))
        } else if self.peek_str("<=") {
            Some((CmpOp::Le, 2))
        } else if self.peek_str(">=") {
            Some((CmpOp::Ge, 2))
        } else if self.peek_str("<") {
            Some((CmpOp::Lt, 1))
        } else if self.peek_str(">") {
            Some((CmpOp::Gt, 1))
        } else {
            None
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
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
