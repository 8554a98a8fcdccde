//! Evaluation configuration, threaded explicitly through `compile`/`read`.
//!
//! There is no process-wide default: every entry point takes a `Configuration`
//! (or falls back to [`Configuration::default`] as a convenience, never as a
//! hidden singleton).

/// A behavioral option that can be turned on for an evaluation.
///
/// This is intentionally a sum type rather than a plain bitflag struct so new
/// options can be added without breaking callers who match on it exhaustively
/// only at the call sites that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Options {
    /// Raise [`crate::JsonPathError::PathNotFound`] instead of returning `null`
    /// when a `Field` token fails to find its key.
    ThrowOnMissingProperty,
}

/// Behavioral options bound to a single `read` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Configuration {
    throw_on_missing_property: bool,
}

impl Configuration {
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    pub fn throw_on_missing_property(&self) -> bool {
        self.throw_on_missing_property
    }
}

/// Builder for [`Configuration`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigurationBuilder {
    throw_on_missing_property: bool,
}

impl ConfigurationBuilder {
    pub fn option(mut self, opt: Options) -> Self {
        match opt {
            Options::ThrowOnMissingProperty => self.throw_on_missing_property = true,
        }
        self
    }

    pub fn build(self) -> Configuration {
        Configuration {
            throw_on_missing_property: self.throw_on_missing_property,
        }
    }
}
