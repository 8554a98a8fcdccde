//! Inline `[?( … )]` predicate parsing and evaluation, end to end.

use json_path_filter::JsonPath;
use serde_json::json;

#[test]
fn comparison_operators_all_parse_and_evaluate() {
    let doc = json!([{"n": 1}, {"n": 2}, {"n": 3}]);
    let cases = [
        ("$[?(@.n == 2)]", json!([{"n": 2}])),
        ("$[?(@.n != 2)]", json!([{"n": 1}, {"n": 3}])),
        ("$[?(@.n <> 2)]", json!([{"n": 1}, {"n": 3}])),
        ("$[?(@.n > 1)]", json!([{"n": 2}, {"n": 3}])),
        ("$[?(@.n >= 2)]", json!([{"n": 2}, {"n": 3}])),
        ("$[?(@.n < 3)]", json!([{"n": 1}, {"n": 2}])),
        ("$[?(@.n <= 2)]", json!([{"n": 1}, {"n": 2}])),
    ];
    for (path_str, expected) in cases {
        let path = JsonPath::compile_simple(path_str).unwrap();
        assert_eq!(path.read_default(&doc).unwrap(), expected, "path {path_str}");
    }
}

#[test]
fn logical_and_or_combine_atoms() {
    let doc = json!([
        {"a": 1, "b": "x"},
        {"a": 1, "b": "y"},
        {"a": 2, "b": "x"}
    ]);
    let and_path = JsonPath::compile_simple("$[?(@.a == 1 && @.b == 'x')]").unwrap();
    assert_eq!(and_path.read_default(&doc).unwrap(), json!([{"a": 1, "b": "x"}]));

    let or_path = JsonPath::compile_simple("$[?(@.a == 2 || @.b == 'y')]").unwrap();
    assert_eq!(or_path.read_default(&doc).unwrap(), json!([{"a": 1, "b": "y"}, {"a": 2, "b": "x"}]));
}

#[test]
fn nested_parens_group_correctly() {
    let doc = json!([
        {"a": 1, "b": 2, "c": 0},
        {"a": 1, "b": 0, "c": 3},
        {"a": 1, "b": 0, "c": 0},
        {"a": 2, "b": 2, "c": 3}
    ]);
    let path = JsonPath::compile_simple("$[?(@.a == 1 && (@.b == 2 || @.c == 3))]").unwrap();
    let result = path.read_default(&doc).unwrap();
    assert_eq!(result, json!([{"a": 1, "b": 2, "c": 0}, {"a": 1, "b": 0, "c": 3}]));
}

#[test]
fn has_path_is_existence_not_truthiness() {
    let doc = json!([{"active": true}, {"active": false}, {"active": null}, {}]);
    let path = JsonPath::compile_simple("$[?(@.active)]").unwrap();
    // Existence: every element that *has* the key, regardless of its value
    // (including explicit null), passes; only the element lacking the key
    // is excluded.
    assert_eq!(path.read_default(&doc).unwrap(), json!([{"active": true}, {"active": false}, {"active": null}]));
}

#[test]
fn null_equality_rules() {
    let doc = json!([{"a": null}, {"a": 1}, {}]);
    let eq_null = JsonPath::compile_simple("$[?(@.a == null)]").unwrap();
    assert_eq!(eq_null.read_default(&doc).unwrap(), json!([{"a": null}, {}]));

    let ne_null = JsonPath::compile_simple("$[?(@.a != null)]").unwrap();
    assert_eq!(ne_null.read_default(&doc).unwrap(), json!([{"a": 1}]));
}

#[test]
fn integer_and_float_literals_compare_equal_across_representations() {
    let doc = json!([{"n": 1}, {"n": 1.0}, {"n": 2}]);
    let path = JsonPath::compile_simple("$[?(@.n == 1)]").unwrap();
    assert_eq!(path.read_default(&doc).unwrap(), json!([{"n": 1}, {"n": 1.0}]));
}

#[test]
fn boolean_literal_is_case_sensitive_value_equality() {
    let doc = json!([{"flag": true}, {"flag": false}]);
    let path = JsonPath::compile_simple("$[?(@.flag == true)]").unwrap();
    assert_eq!(path.read_default(&doc).unwrap(), json!([{"flag": true}]));
}

#[test]
fn string_ordering_comparators_return_false_not_lexicographic() {
    let doc = json!([{"name": "aaa"}, {"name": "zzz"}]);
    let path = JsonPath::compile_simple("$[?(@.name < 'zzz')]").unwrap();
    assert_eq!(path.read_default(&doc).unwrap(), json!([]));
}

#[test]
fn quoted_literal_strips_exactly_one_leading_and_trailing_quote() {
    let doc = json!([{"tag": "it's-a-tag"}, {"tag": "other"}]);
    let path = JsonPath::compile_simple(r"$[?(@.tag == 'it\'s-a-tag')]").unwrap();
    assert_eq!(path.read_default(&doc).unwrap(), json!([{"tag": "it's-a-tag"}]));
}

#[test]
fn or_short_circuits_without_evaluating_unresolvable_right_side() {
    let doc = json!([{"a": 1}]);
    // `@.missing.deep` can't resolve on this element; the left side being
    // true must still let the predicate pass without erroring on the right.
    let path = JsonPath::compile_simple("$[?(@.a == 1 || @.missing.deep > 5)]").unwrap();
    assert_eq!(path.read_default(&doc).unwrap(), json!([{"a": 1}]));
}

#[test]
fn predicate_on_non_array_value_raises_path_not_found() {
    let path = JsonPath::compile_simple("$.a[?(@.n == 1)]").unwrap();
    let err = path.read_default(&json!({"a": {"n": 1}})).unwrap_err();
    assert!(matches!(err, json_path_filter::JsonPathError::PathNotFound { .. }));
}
