//! The `JsonPath` façade: compiles a path string (plus its external filters)
//! once, and evaluates it against many documents.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Configuration;
use crate::criteria::Filter;
use crate::error::JsonPathError;
use crate::filters;
use crate::token::{ArrayIndexSpec, PathToken, TokenFilter};
use crate::tokenizer;

/// A compiled JSONPath expression.
///
/// Immutable and `Send + Sync`: the same `JsonPath` can be evaluated
/// concurrently from multiple threads, each `read` call copying the
/// external-filter queue for itself rather than sharing mutable state.
#[derive(Debug, Clone)]
pub struct JsonPath {
    path: String,
    tokens: Vec<PathToken>,
    filters: Vec<Arc<dyn Filter>>,
}

impl PartialEq for JsonPath {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl JsonPath {
    /// Compile `path` with its externally supplied `[?]` filters.
    ///
    /// Fails if `path` is empty/all-whitespace, if tokenization fails, or if
    /// the number of `[?]` placeholders in `path` doesn't match
    /// `filters.len()`.
    pub fn compile(path: &str, filters: Vec<Arc<dyn Filter>>) -> Result<Self, JsonPathError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(JsonPathError::InvalidPath {
                reason: "path must not be empty".to_string(),
                position: None,
            });
        }

        let tokens = tokenizer::tokenize(trimmed)?;

        let placeholder_count: usize = tokens.iter().map(|t| count_array_queries(&t.filter)).sum();
        if placeholder_count != filters.len() {
            return Err(JsonPathError::InvalidPath {
                reason: format!(
                    "path has {placeholder_count} '[?]' placeholder(s) but {} filter(s) were supplied",
                    filters.len()
                ),
                position: None,
            });
        }

        Ok(JsonPath {
            path: trimmed.to_string(),
            tokens,
            filters,
        })
    }

    /// Compile a path with no externally supplied filters. Equivalent to
    /// `JsonPath::compile(path, Vec::new())`, provided for paths that only
    /// use inline `[?( … )]` predicates.
    pub fn compile_simple(path: &str) -> Result<Self, JsonPathError> {
        Self::compile(path, Vec::new())
    }

    /// The normalized path text this expression was compiled from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Evaluate this path against `value`, returning the matching value
    /// (itself a `Value::Array` when the path fans out).
    pub fn read(&self, value: &Value, config: &Configuration) -> Result<Value, JsonPathError> {
        if self.path == "$" {
            return Ok(value.clone());
        }
        if !value.is_object() && !value.is_array() {
            return Err(JsonPathError::InvalidArgument {
                reason: "root value must be a JSON object or array".to_string(),
            });
        }

        let mut queue: VecDeque<Arc<dyn Filter>> = self.filters.iter().cloned().collect();
        let mut current = value.clone();
        let mut in_array_ctx = false;

        for token in &self.tokens {
            if token.is_root {
                continue;
            }
            let result = filters::apply_token(
                &token.filter,
                &current,
                config,
                &mut queue,
                &mut in_array_ctx,
                &token.upstream_fragment,
            )?;
            if result.is_null() && !token.is_end {
                return Err(JsonPathError::PathNotFound {
                    fragment: token.fragment.clone(),
                    upstream: token.upstream_fragment.clone(),
                });
            }
            current = result;
        }
        Ok(current)
    }

    /// Evaluate this path against `value` with the default configuration.
    pub fn read_default(&self, value: &Value) -> Result<Value, JsonPathError> {
        self.read(value, &Configuration::default())
    }

    /// Evaluate a *definite* path (§4.4) and return a reference into `value`
    /// rather than a clone. Only `Root` and single-key `Field`/single-index
    /// `ArrayIndex` tokens support this; anything that must fan out or
    /// synthesize a new array (`Wildcard`, `Scan`, index lists, slices,
    /// predicates, `[?]`) raises `Unsupported` instead of cloning.
    ///
    /// Callers must not mutate `value` while the returned reference is in
    /// use; ordinary Rust borrow-checking enforces this at the call site.
    pub fn read_ref<'v>(&self, value: &'v Value) -> Result<&'v Value, JsonPathError> {
        let mut current = value;
        for token in &self.tokens {
            if token.is_root {
                continue;
            }
            current = match &token.filter {
                TokenFilter::Field(keys) if keys.len() == 1 => {
                    let Some(obj) = current.as_object() else {
                        return Err(JsonPathError::PathNotFound {
                            fragment: token.fragment.clone(),
                            upstream: token.upstream_fragment.clone(),
                        });
                    };
                    match obj.get(&keys[0]) {
                        Some(v) => v,
                        None => {
                            return Err(JsonPathError::PathNotFound {
                                fragment: token.fragment.clone(),
                                upstream: token.upstream_fragment.clone(),
                            })
                        }
                    }
                }
                TokenFilter::ArrayIndex(ArrayIndexSpec::SingleIndex(i)) => {
                    let Some(arr) = current.as_array() else {
                        return Err(JsonPathError::PathNotFound {
                            fragment: token.fragment.clone(),
                            upstream: token.upstream_fragment.clone(),
                        });
                    };
                    let len = arr.len() as i64;
                    let idx = if *i < 0 { len + i } else { *i };
                    if idx < 0 || idx >= len {
                        return Err(JsonPathError::PathNotFound {
                            fragment: token.fragment.clone(),
                            upstream: token.upstream_fragment.clone(),
                        });
                    }
                    &arr[idx as usize]
                }
                _ => {
                    return Err(JsonPathError::Unsupported {
                        reason: format!(
                            "read_ref only supports definite paths; '{}' requires synthesizing a new value",
                            token.fragment
                        ),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Syntactic check (§4.4): a path is *indefinite* if it can fan out to
    /// more than one location: `..`, bare `*`/`[*]`, an index list, a
    /// slice, or any predicate bracket. Everything else (a chain of `$`,
    /// single-key `Field`, and single-index `ArrayIndex` tokens) is
    /// *definite*.
    pub fn is_path_definite(&self) -> bool {
        self.tokens.iter().all(|t| t.filter.is_definite())
    }
}

/// Count `[?]` placeholders reachable from a token, including ones nested
/// inside `HasPath`/`ArrayEval` sub-path trees (a `[?(@.sub)]` existence
/// test or a `[?(expr)]` predicate can itself reference a sub-path that
/// contains further `[?]` placeholders).
fn count_array_queries(filter: &TokenFilter) -> usize {
    match filter {
        TokenFilter::ArrayQuery => 1,
        TokenFilter::HasPath(sub) => sub.0.iter().map(|t| count_array_queries(&t.filter)).sum(),
        TokenFilter::ArrayEval(expr) => count_in_pred_expr(expr),
        _ => 0,
    }
}

fn count_in_pred_expr(expr: &crate::expr::PredExpr) -> usize {
    use crate::expr::PredExpr;
    match expr {
        PredExpr::And(l, r) | PredExpr::Or(l, r) => count_in_pred_expr(l) + count_in_pred_expr(r),
        PredExpr::Exists(sub) => sub.0.iter().map(|t| count_array_queries(&t.filter)).sum(),
        PredExpr::Cmp { path, .. } => path.0.iter().map(|t| count_array_queries(&t.filter)).sum(),
    }
}
