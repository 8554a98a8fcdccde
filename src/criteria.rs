//! Externally supplied filters, consumed one-per-`[?]` token.
//!
//! These are distinct from inline `[?( … )]` predicates: a `[?]` placeholder
//! in the path text defers the actual test to a [`Filter`] object passed in
//! at `compile` time, so the same compiled path can be reused with different
//! criteria without re-tokenizing. [`Criterion`] and [`CriteriaFilter`] give
//! callers a structured way to build the common case, a conjunction of
//! `key <op> expected` constraints, without hand-rolling a `Filter` impl.

use std::fmt;

use serde_json::Value;

use crate::config::Configuration;
use crate::error::JsonPathError;
use crate::expr::{self, CmpOp, Literal};
use crate::token::SubPath;
use crate::tokenizer;

/// A predicate over one candidate array element, supplied out-of-band from
/// the path text itself.
pub trait Filter: fmt::Debug + Send + Sync {
    fn accept(&self, value: &Value, config: &Configuration) -> bool;
}

/// A single `key <op> expected` constraint, plus any further constraints
/// AND-combined onto the same key path via [`Criterion::and`].
///
/// `key` is compiled once (as a `@.`-rooted sub-path) so repeated
/// evaluations don't re-tokenize it.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    key: SubPath,
    constraints: Vec<(CmpOp, Literal)>,
}

impl Criterion {
    /// Compile a criterion from a bare key path (e.g. `"status"` or
    /// `"address.city"`, without the leading `@.`) and its first
    /// constraint.
    pub fn new(key_path: &str, op: CmpOp, expected: impl Into<Literal>) -> Result<Self, JsonPathError> {
        let rooted = format!("@.{key_path}");
        let tokens = tokenizer::tokenize(&rooted)?;
        Ok(Criterion {
            key: SubPath(tokens),
            constraints: vec![(op, expected.into())],
        })
    }

    /// AND an additional `<op> expected` constraint onto the same key.
    pub fn and(mut self, op: CmpOp, expected: impl Into<Literal>) -> Self {
        self.constraints.push((op, expected.into()));
        self
    }

    /// Resolve `key` against `candidate` and check every constraint holds.
    /// A key that fails to resolve is treated as `null`, same as an inline
    /// predicate sub-path.
    fn matches(&self, candidate: &Value, config: &Configuration) -> bool {
        let actual = expr::resolve_subpath(&self.key, candidate, config).unwrap_or(Value::Null);
        self.constraints
            .iter()
            .all(|(op, expected)| expr::compare(&actual, *op, expected))
    }
}

/// The AND-of-criteria default [`Filter`]: a candidate is accepted only if
/// every [`Criterion`] matches it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriteriaFilter {
    criteria: Vec<Criterion>,
}

impl CriteriaFilter {
    pub fn new(criteria: Vec<Criterion>) -> Self {
        CriteriaFilter { criteria }
    }
}

impl Filter for CriteriaFilter {
    fn accept(&self, value: &Value, config: &Configuration) -> bool {
        self.criteria.iter().all(|c| c.matches(value, config))
    }
}

/// A [`Filter`] built from an arbitrary closure, for callers who don't need
/// the structure of [`Criterion`]/[`CriteriaFilter`].
pub struct FnFilter<F>(pub F)
where
    F: Fn(&Value, &Configuration) -> bool + Send + Sync;

impl<F> fmt::Debug for FnFilter<F>
where
    F: Fn(&Value, &Configuration) -> bool + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFilter").finish_non_exhaustive()
    }
}

impl<F> Filter for FnFilter<F>
where
    F: Fn(&Value, &Configuration) -> bool + Send + Sync,
{
    fn accept(&self, value: &Value, config: &Configuration) -> bool {
        (self.0)(value, config)
    }
}
