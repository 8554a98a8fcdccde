//! Property-based tests for the invariants of `SPEC_FULL.md` §8 that are
//! amenable to randomized checking (1, 4, 5, 6, 8). The remaining
//! invariants (2, 3, 7) and the eight concrete scenarios are plain
//! `#[test]`s in `scenarios.rs` and `tokenizer_matrix.rs`.

use json_path_filter::JsonPath;
use proptest::prelude::*;
use serde_json::{json, Value};

fn int_array(n: usize) -> Value {
    Value::Array((0..n as i64).map(Value::from).collect())
}

proptest! {
    /// Invariant 1: tokenization is deterministic, and concatenating every
    /// token's fragment reconstructs the compiled path text exactly.
    #[test]
    fn tokenize_is_length_preserving(names in prop::collection::vec("[a-zA-Z][a-zA-Z0-9]{0,5}", 1..6)) {
        let path_str = format!("$.{}", names.join("."));
        let path = JsonPath::compile_simple(&path_str).unwrap();
        prop_assert_eq!(path.path(), path_str.as_str());

        // Re-tokenizing the same text twice must agree (determinism).
        let again = JsonPath::compile_simple(&path_str).unwrap();
        prop_assert_eq!(path.is_path_definite(), again.is_path_definite());
    }

    /// Invariant 4: `$[-k:]` never raises and equals `A[max(0,n-k):n]`.
    #[test]
    fn tail_slice_never_raises_and_clamps(n in 0usize..20, k in 0i64..30) {
        let arr = int_array(n);
        let path = JsonPath::compile_simple(&format!("$[-{k}:]")).unwrap();
        let result = path.read_default(&arr).unwrap();

        let expected_start = (n as i64 - k).max(0) as usize;
        let Value::Array(items) = &arr else { unreachable!() };
        let expected = Value::Array(items[expected_start..].to_vec());
        prop_assert_eq!(result, expected);
    }

    /// Invariant 5: `$[:k]` never raises and equals `A[0:min(k,n)]`.
    #[test]
    fn head_slice_never_raises_and_clamps(n in 0usize..20, k in 0i64..30) {
        let arr = int_array(n);
        let path = JsonPath::compile_simple(&format!("$[:{k}]")).unwrap();
        let result = path.read_default(&arr).unwrap();

        let expected_end = (k as usize).min(n);
        let Value::Array(items) = &arr else { unreachable!() };
        let expected = Value::Array(items[..expected_end].to_vec());
        prop_assert_eq!(result, expected);
    }

    /// Invariant 6: a predicate filter never grows the array and preserves
    /// relative order of surviving elements.
    #[test]
    fn predicate_filter_shrinks_and_preserves_order(values in prop::collection::vec(0i64..100, 0..20)) {
        let arr = Value::Array(values.iter().map(|n| json!({"n": n})).collect());
        let path = JsonPath::compile_simple("$[?(@.n > 50)]").unwrap();
        let result = path.read_default(&arr).unwrap();
        let Value::Array(kept) = &result else { unreachable!() };

        prop_assert!(kept.len() <= values.len());

        let kept_ns: Vec<i64> = kept.iter().map(|v| v["n"].as_i64().unwrap()).collect();
        let expected_ns: Vec<i64> = values.iter().copied().filter(|n| *n > 50).collect();
        prop_assert_eq!(kept_ns, expected_ns);
    }

    /// Invariant 8: evaluation is pure; `read` never mutates the source.
    #[test]
    fn read_never_mutates_source_document(values in prop::collection::vec(0i64..100, 0..20)) {
        let arr = Value::Array(values.into_iter().map(Value::from).collect());
        let before = arr.clone();
        let path = JsonPath::compile_simple("$[0:2]").unwrap();
        let _ = path.read_default(&arr);
        prop_assert_eq!(arr, before);
    }
}
