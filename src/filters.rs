//! Applies one compiled [`TokenFilter`] to the current working value.
//!
//! This is the dispatch core of the evaluator: `apply_token` is called once
//! per token, left to right, threading a single owned [`Value`] and a sticky
//! `in_array_ctx` flag through the whole path. The flag isn't derived from
//! the token kind alone; it's re-derived from the *shape* of the value each
//! step actually produced, so a `Field` that happens to land on an array
//! value puts subsequent tokens back into "filter each candidate" mode even
//! if nothing upstream was a `[*]`/`..`/predicate bracket.

use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::config::Configuration;
use crate::criteria::Filter;
use crate::error::JsonPathError;
use crate::expr::{self, PredExpr};
use crate::token::{ArrayIndexSpec, SubPath, TokenFilter};

pub fn apply_token(
    filter: &TokenFilter,
    current: &Value,
    config: &Configuration,
    queue: &mut VecDeque<Arc<dyn Filter>>,
    in_array_ctx: &mut bool,
    upstream_fragment: &str,
) -> Result<Value, JsonPathError> {
    let result = match filter {
        TokenFilter::Root => current.clone(),
        TokenFilter::AllArrayItems => Value::Array(fan_out(current)),
        TokenFilter::Wildcard => Value::Array(fan_out(current)),
        TokenFilter::Scan => {
            let mut out = Vec::new();
            scan_collect(current, &mut out);
            Value::Array(out)
        }
        TokenFilter::Field(keys) => {
            if *in_array_ctx {
                apply_field_over_candidates(current, keys)
            } else {
                apply_field_direct(current, keys, config, upstream_fragment)?
            }
        }
        TokenFilter::ArrayIndex(spec) => {
            let arr = normalize(current, upstream_fragment)?;
            apply_array_index(&arr, spec)
        }
        TokenFilter::ArrayEval(expr) => {
            let arr = normalize(current, upstream_fragment)?;
            apply_array_eval(&arr, expr, config)
        }
        TokenFilter::HasPath(sub) => {
            let arr = normalize(current, upstream_fragment)?;
            apply_has_path(&arr, sub, config)
        }
        TokenFilter::ArrayQuery => {
            let arr = normalize(current, upstream_fragment)?;
            apply_array_query(&arr, queue, config)
        }
    };
    *in_array_ctx = result.is_array();
    Ok(result)
}

/// Coerce the current value into the `Vec<Value>` an array-shaped token
/// operates over. A non-array, non-null value at this point means the path
/// asked for array semantics somewhere that doesn't have them.
fn normalize(current: &Value, upstream_fragment: &str) -> Result<Vec<Value>, JsonPathError> {
    match current {
        Value::Array(items) => Ok(items.clone()),
        Value::Null => Ok(Vec::new()),
        _ => Err(JsonPathError::PathNotFound {
            fragment: "[...]".to_string(),
            upstream: upstream_fragment.to_string(),
        }),
    }
}

fn fan_out(current: &Value) -> Vec<Value> {
    match current {
        Value::Object(map) => map.values().cloned().collect(),
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    }
}

/// Pre-order depth-first walk collecting every container (object or array)
/// reachable from `current`, including `current` itself.
fn scan_collect(current: &Value, out: &mut Vec<Value>) {
    match current {
        Value::Object(map) => {
            out.push(current.clone());
            for v in map.values() {
                scan_collect(v, out);
            }
        }
        Value::Array(items) => {
            out.push(current.clone());
            for v in items {
                scan_collect(v, out);
            }
        }
        _ => {}
    }
}

/// `Field` running over a flattened array of candidate containers (produced
/// by a prior `Wildcard`/`Scan`/index/predicate token): keep only candidates
/// that are objects carrying `keys`. A single key contributes its bare value
/// per candidate (skipping candidates lacking it); a multi-key union
/// contributes the present-subset object per candidate (skipping candidates
/// with none of the keys present).
fn apply_field_over_candidates(current: &Value, keys: &[String]) -> Value {
    let mut out = Vec::new();
    if let Value::Array(items) = current {
        for item in items {
            let Value::Object(map) = item else { continue };
            if keys.len() == 1 {
                if let Some(v) = map.get(&keys[0]) {
                    out.push(v.clone());
                }
            } else if let Some(subset) = present_subset(map, keys) {
                out.push(Value::Object(subset));
            }
        }
    }
    Value::Array(out)
}

/// `Field` running directly on a single object (not array-context): a
/// single key returns its value (or `null`/error if absent, per
/// `config.throw_on_missing_property`); multiple keys return an object
/// containing the present subset of keys.
fn apply_field_direct(
    current: &Value,
    keys: &[String],
    config: &Configuration,
    upstream_fragment: &str,
) -> Result<Value, JsonPathError> {
    let map = match current {
        Value::Object(map) => Some(map),
        _ => None,
    };

    if keys.len() == 1 {
        let found = map.and_then(|m| m.get(&keys[0]));
        return match found {
            Some(v) => Ok(v.clone()),
            None if config.throw_on_missing_property() => Err(JsonPathError::PathNotFound {
                fragment: keys[0].clone(),
                upstream: upstream_fragment.to_string(),
            }),
            None => Ok(Value::Null),
        };
    }

    let subset = map.and_then(|m| present_subset(m, keys)).unwrap_or_default();
    if subset.is_empty() && config.throw_on_missing_property() {
        return Err(JsonPathError::PathNotFound {
            fragment: keys.join(","),
            upstream: upstream_fragment.to_string(),
        });
    }
    Ok(Value::Object(subset))
}

/// Build the subset of `map` restricted to `keys`, preserving `keys`' order.
/// Returns `None` (not an empty map) when none of `keys` are present, so
/// callers can distinguish "no keys matched" from "matched keys, all with
/// falsy-looking values".
fn present_subset(map: &serde_json::Map<String, Value>, keys: &[String]) -> Option<serde_json::Map<String, Value>> {
    let mut subset = serde_json::Map::new();
    for key in keys {
        if let Some(v) = map.get(key) {
            subset.insert(key.clone(), v.clone());
        }
    }
    if subset.is_empty() {
        None
    } else {
        Some(subset)
    }
}

fn apply_array_index(arr: &[Value], spec: &ArrayIndexSpec) -> Value {
    let len = arr.len() as i64;
    match spec {
        ArrayIndexSpec::SingleIndex(i) => normalize_index(*i, len)
            .and_then(|idx| arr.get(idx as usize).cloned())
            .unwrap_or(Value::Null),
        ArrayIndexSpec::IndexList(list) => {
            let out: Vec<Value> = list
                .iter()
                .filter_map(|i| normalize_index(*i, len).and_then(|idx| arr.get(idx as usize).cloned()))
                .collect();
            Value::Array(out)
        }
        ArrayIndexSpec::HeadSlice(n) => {
            let end = clamp_index(*n, len) as usize;
            Value::Array(arr[..end].to_vec())
        }
        ArrayIndexSpec::TailSlice(n) => {
            let start = clamp_index(*n, len) as usize;
            Value::Array(arr[start..].to_vec())
        }
        ArrayIndexSpec::Range(a, b) => {
            let start = clamp_index(*a, len);
            let end = clamp_index(*b, len);
            if start >= end {
                Value::Array(Vec::new())
            } else {
                Value::Array(arr[start as usize..end as usize].to_vec())
            }
        }
    }
}

/// Resolve a possibly-negative index to an in-bounds position, or `None` if
/// it falls outside `[0, len)` even after wraparound.
fn normalize_index(i: i64, len: i64) -> Option<i64> {
    let idx = if i < 0 { len + i } else { i };
    (idx >= 0 && idx < len).then_some(idx)
}

/// Resolve a possibly-negative slice boundary, clamped into `[0, len]`
/// rather than rejected: an out-of-range slice bound yields an empty or
/// truncated slice, never an error.
fn clamp_index(i: i64, len: i64) -> i64 {
    let idx = if i < 0 { len + i } else { i };
    idx.clamp(0, len)
}

fn apply_array_eval(arr: &[Value], expr: &PredExpr, config: &Configuration) -> Value {
    Value::Array(
        arr.iter()
            .filter(|elem| expr::eval_predicate(expr, elem, config))
            .cloned()
            .collect(),
    )
}

/// Existence, not truthiness: a present key whose value is `null` must still
/// count as a match, while an absent key must not. `Field` alone can't tell
/// those apart (both resolve to `Value::Null` when not throwing), so this
/// always resolves the sub-path with `ThrowOnMissingProperty` forced on,
/// regardless of the ambient `config`: a missing key then surfaces as an
/// error (swallowed by `resolve_subpath` into `None`), while a present-but-
/// `null` value surfaces as `Ok(Value::Null)` (kept).
fn apply_has_path(arr: &[Value], sub: &SubPath, _config: &Configuration) -> Value {
    let existence_config = Configuration::builder()
        .option(crate::config::Options::ThrowOnMissingProperty)
        .build();
    Value::Array(
        arr.iter()
            .filter(|elem| expr::resolve_subpath(sub, elem, &existence_config).is_some())
            .cloned()
            .collect(),
    )
}

/// Pop the next externally supplied filter from the queue and keep only the
/// candidates it accepts. A `[?]` placeholder with no corresponding filter
/// left in the queue matches nothing, rather than panicking.
fn apply_array_query(arr: &[Value], queue: &mut VecDeque<Arc<dyn Filter>>, config: &Configuration) -> Value {
    match queue.pop_front() {
        Some(f) => Value::Array(arr.iter().filter(|elem| f.accept(elem, config)).cloned().collect()),
        None => Value::Array(Vec::new()),
    }
}
