//! JSONPath (jayway-style dialect) implementation.
//!
//! This crate compiles and evaluates JSONPath expressions against
//! [`serde_json::Value`] documents: dot/bracket field access, wildcards,
//! recursive descent (`..`), array indices/slices/lists, inline predicates
//! (`[?(@.price < 10)]`), and externally supplied filter objects substituted
//! for `[?]` placeholders.
//!
//! # Example
//!
//! ```
//! use json_path_filter::{Configuration, JsonPath};
//! use serde_json::json;
//!
//! let path = JsonPath::compile_simple("$.store.book[?(@.price < 10)].title").unwrap();
//!
//! let doc = json!({
//!     "store": {
//!         "book": [
//!             {"title": "Sayings of the Century", "price": 8.95},
//!             {"title": "Sword of Honour", "price": 12.99}
//!         ]
//!     }
//! });
//!
//! let titles = path.read(&doc, &Configuration::default()).unwrap();
//! assert_eq!(titles, json!(["Sayings of the Century"]));
//! ```

mod config;
mod criteria;
mod error;
mod expr;
mod filters;
mod path;
mod token;
mod tokenizer;

pub use config::{Configuration, ConfigurationBuilder, Options};
pub use criteria::{CriteriaFilter, Criterion, Filter, FnFilter};
pub use error::JsonPathError;
pub use expr::{CmpOp, Literal, PredExpr};
pub use path::JsonPath;
pub use token::{ArrayIndexSpec, PathToken, SubPath, TokenFilter};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn readme_example_filters_by_price() {
        let path = JsonPath::compile_simple("$.store.book[?(@.price < 10)].title").unwrap();
        let doc = json!({
            "store": {
                "book": [
                    {"title": "Sayings of the Century", "price": 8.95},
                    {"title": "Sword of Honour", "price": 12.99}
                ]
            }
        });
        let titles = path.read_default(&doc).unwrap();
        assert_eq!(titles, json!(["Sayings of the Century"]));
    }

    #[test]
    fn root_path_returns_document_unchanged() {
        let path = JsonPath::compile_simple("$").unwrap();
        let doc = json!({"a": [1, 2, 3]});
        assert_eq!(path.read_default(&doc).unwrap(), doc);
    }

    #[test]
    fn external_filter_placeholder_consumes_supplied_filter() {
        use std::sync::Arc;

        let criterion = Criterion::new("status", CmpOp::Eq, "active").unwrap();
        let filter: Arc<dyn Filter> = Arc::new(CriteriaFilter::new(vec![criterion]));
        let path = JsonPath::compile("$.users[?]", vec![filter]).unwrap();

        let doc = json!({
            "users": [
                {"name": "a", "status": "active"},
                {"name": "b", "status": "inactive"}
            ]
        });
        let result = path.read_default(&doc).unwrap();
        assert_eq!(result, json!([{"name": "a", "status": "active"}]));
    }

    #[test]
    fn throw_on_missing_property_option_surfaces_path_not_found() {
        let path = JsonPath::compile_simple("$.missing").unwrap();
        let config = Configuration::builder().option(Options::ThrowOnMissingProperty).build();
        let err = path.read(&json!({"a": 1}), &config).unwrap_err();
        assert!(matches!(err, JsonPathError::PathNotFound { .. }));
    }
}
