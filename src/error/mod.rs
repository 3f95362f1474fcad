//! Error definitions
//!
//! This module provides error types for testkit-helpers.

use thiserror::Error;

/// Main error type for testkit-helpers
#[derive(Error, Debug)]
pub enum Error {
    /// A new child was requested from a sealed mock.
    #[error("Can't access {path}, mock is sealed.")]
    Sealed {
        /// Full access path, e.g. `mock.attr` or `mock.attr()`.
        path: String,
    },

    /// The attribute is outside the mock's spec.
    #[error("Mock object has no attribute '{attribute}' (spec: {spec}, mock: {mock})")]
    NoAttribute {
        /// Display name of the mock the attribute was looked up on.
        mock: String,
        /// The attribute that was requested.
        attribute: String,
        /// Name of the interface the mock is restricted to.
        spec: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    /// The bridge configuration asks for something the selected backend
    /// cannot provide.
    #[error("unsupported bridge configuration: {0}")]
    UnsupportedConfig(String),

    /// The bridge could not build a runtime for the call.
    #[error("failed to build runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl Error {
    /// Create a sealed-access error for the given path.
    #[must_use]
    pub fn sealed(path: impl Into<String>) -> Self {
        Self::Sealed { path: path.into() }
    }

    /// Create an assertion failure.
    #[must_use]
    pub fn assertion_failed(message: impl Into<String>) -> Self {
        Self::AssertionFailed(message.into())
    }

    /// Create an unsupported-configuration error.
    #[must_use]
    pub fn unsupported_config(message: impl Into<String>) -> Self {
        Self::UnsupportedConfig(message.into())
    }

    /// Whether this error is an attribute lookup failure.
    ///
    /// Both sealed-access violations and out-of-spec accesses count.
    #[must_use]
    pub fn is_attribute_error(&self) -> bool {
        matches!(self, Self::Sealed { .. } | Self::NoAttribute { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_message() {
        let err = Error::sealed("mock.foo");
        assert_eq!(err.to_string(), "Can't access mock.foo, mock is sealed.");
        assert!(err.is_attribute_error());
    }

    #[test]
    fn test_no_attribute_message() {
        let err = Error::NoAttribute {
            mock: "mock".into(),
            attribute: "nope".into(),
            spec: "str".into(),
        };
        assert!(err.to_string().contains("'nope'"));
        assert!(err.is_attribute_error());
    }

    #[test]
    fn test_unsupported_config_message() {
        let err = Error::unsupported_config("smol has no worker threads");
        assert!(!err.is_attribute_error());
        assert_eq!(
            err.to_string(),
            "unsupported bridge configuration: smol has no worker threads"
        );
    }

    #[test]
    fn test_runtime_error_from_io() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(!err.is_attribute_error());
        assert!(err.to_string().contains("boom"));
    }
}
