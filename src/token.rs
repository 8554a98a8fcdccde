//! Path tokens: the immutable records produced by the tokenizer and consumed
//! by the evaluator, one per path fragment.

use crate::expr::PredExpr;

/// A single compiled path fragment.
///
/// `fragment` is the normalized substring that produced this token (e.g.
/// `"$"`, `"store"`, `"[*]"`, `"[0:3]"`, `".."`). `upstream_fragment` is the
/// accumulated normalized path up to and including this token, used to build
/// [`crate::JsonPathError::PathNotFound`] messages.
#[derive(Debug, Clone, PartialEq)]
pub struct PathToken {
    pub fragment: String,
    pub is_root: bool,
    pub is_end: bool,
    pub filter: TokenFilter,
    pub upstream_fragment: String,
}

/// A relative path compiled from a `@…` predicate sub-expression.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath(pub Vec<PathToken>);

/// The tagged union of token kinds. State specific to a variant (index
/// lists, parsed expression trees) lives inside the variant payload rather
/// than in a class hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenFilter {
    /// `$` or `@`, passthrough.
    Root,
    /// `[*]`, passthrough that marks array context.
    AllArrayItems,
    /// `*`, fans out over object values or array elements.
    Wildcard,
    /// `..`, recursive descent.
    Scan,
    /// Named property access. A single key for `.name`/`['name']`, multiple
    /// for the union form `['a','b']`.
    Field(Vec<String>),
    /// `[i]`, `[i,j,k]`, `[:n]`, `[-n:]`, `[a:b]`.
    ArrayIndex(ArrayIndexSpec),
    /// `[?(<expr>)]` where `<expr>` contains a comparator.
    ArrayEval(PredExpr),
    /// `[?(@.sub)]`, existence test with no comparator in the body.
    HasPath(SubPath),
    /// `[?]`, consumes one externally supplied filter from the queue.
    ArrayQuery,
}

/// A compiled `ArrayIndex` bracket body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayIndexSpec {
    SingleIndex(i64),
    IndexList(Vec<i64>),
    HeadSlice(i64),
    TailSlice(i64),
    Range(i64, i64),
}

impl TokenFilter {
    /// Whether this token kind, on its own, guarantees a path is *definite*
    /// (resolves to at most one location). `Field` is only definite when it
    /// names a single key; the union form `['a','b']` is not.
    pub fn is_definite(&self) -> bool {
        match self {
            TokenFilter::Root => true,
            TokenFilter::Field(keys) => keys.len() == 1,
            TokenFilter::ArrayIndex(ArrayIndexSpec::SingleIndex(_)) => true,
            _ => false,
        }
    }
}
