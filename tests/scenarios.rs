//! The eight concrete JSON → path → expected-result scenarios.

use json_path_filter::{Configuration, JsonPath, JsonPathError, Options};
use serde_json::json;

#[test]
fn scenario_a_tail_slice_clamps_past_start() {
    let path = JsonPath::compile_simple("$[-10:]").unwrap();
    let doc = json!([1, 3, 5, 7, 8, 13, 20]);
    assert_eq!(path.read_default(&doc).unwrap(), doc);
}

#[test]
fn scenario_b_head_slice_clamps_past_end() {
    let path = JsonPath::compile_simple("$[:10]").unwrap();
    let doc = json!([1, 3, 5, 7, 8, 13, 20]);
    assert_eq!(path.read_default(&doc).unwrap(), doc);
}

#[test]
fn scenario_c_head_slice() {
    let path = JsonPath::compile_simple("$[:3]").unwrap();
    let doc = json!([1, 3, 5, 7, 8, 13, 20]);
    assert_eq!(path.read_default(&doc).unwrap(), json!([1, 3, 5]));
}

#[test]
fn scenario_d_tail_slice() {
    let path = JsonPath::compile_simple("$[-3:]").unwrap();
    let doc = json!([1, 3, 5, 7, 8, 13, 20]);
    assert_eq!(path.read_default(&doc).unwrap(), json!([8, 13, 20]));
}

#[test]
fn scenario_e_range() {
    let path = JsonPath::compile_simple("$[0:3]").unwrap();
    let doc = json!([1, 3, 5, 7, 8, 13, 20]);
    assert_eq!(path.read_default(&doc).unwrap(), json!([1, 3, 5]));
}

#[test]
fn scenario_f_inline_predicate_over_nested_array() {
    let path = JsonPath::compile_simple("$.store.book[?(@.p<10)]").unwrap();
    let doc = json!({"store":{"book":[{"p":8.95},{"p":12.99}]}});
    assert_eq!(path.read_default(&doc).unwrap(), json!([{"p": 8.95}]));
}

#[test]
fn scenario_g_scan_preserves_document_order() {
    let path = JsonPath::compile_simple("$..c").unwrap();
    let doc = json!({"a":{"b":{"c":1}},"x":{"c":2}});
    assert_eq!(path.read_default(&doc).unwrap(), json!([1, 2]));
}

#[test]
fn scenario_h_throw_on_missing_property_raises() {
    let path = JsonPath::compile_simple("$.missing").unwrap();
    let config = Configuration::builder().option(Options::ThrowOnMissingProperty).build();
    let err = path.read(&json!({"a": 1}), &config).unwrap_err();
    assert!(matches!(err, JsonPathError::PathNotFound { .. }));
}
