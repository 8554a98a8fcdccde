//! Error types surfaced by compilation and evaluation.

use thiserror::Error;

/// Failure modes for tokenizing, compiling, and evaluating a JSONPath.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum JsonPathError {
    /// Tokenization or predicate parsing failed, or the number of `[?]`
    /// placeholders didn't match the number of filters passed to `compile`.
    #[error("invalid path{}: {reason}", position.map(|p| format!(" at position {p}")).unwrap_or_default())]
    InvalidPath {
        reason: String,
        position: Option<usize>,
    },

    /// A non-terminal token failed to resolve against the current value.
    #[error("fragment '{fragment}' not found (path so far: {upstream})")]
    PathNotFound { fragment: String, upstream: String },

    /// The root value or configuration passed to `read` was unusable.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// An operation was requested that this implementation does not perform,
    /// e.g. taking a reference into a path that must synthesize new values.
    #[error("unsupported: {reason}")]
    Unsupported { reason: String },
}
