//! Core error types for svbmit.
//!
//! [`ValidationError`] is the descriptor a custom validator returns when a
//! value is rejected. [`SvbmitError`] covers everything else: configuration
//! mistakes, contract violations raised while validating, and settings
//! loading failures.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An application-defined validation failure.
///
/// Validators return this to reject a value. The engine never inspects it;
/// it is stored on the field and published unchanged in the error maps.
///
/// # Examples
///
/// ```
/// use svbmit_core::error::ValidationError;
///
/// let err = ValidationError::new("Passwords do not match.", "mismatch")
///     .with_param("other", "password");
/// assert_eq!(err.code, "mismatch");
/// assert_eq!(err.to_string(), "Passwords do not match.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The human-readable error message.
    pub message: String,
    /// A short code identifying the failure (e.g. "required", "mismatch").
    pub code: String,
    /// Additional parameters providing context for the message.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for svbmit.
///
/// Configuration and contract-violation variants indicate programming
/// mistakes. They are returned from the operation that detected them and
/// must not be ignored by the host.
#[derive(Error, Debug)]
pub enum SvbmitError {
    // ── Configuration ────────────────────────────────────────────────

    /// The controller or one of its fields is improperly configured.
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A configuration value is missing, malformed, or cannot be loaded.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Contract violations ──────────────────────────────────────────

    /// A validator returned a deferred result. Validators must be synchronous.
    #[error("Validator for field '{field}' returned a deferred result; validators must be synchronous")]
    DeferredValidator {
        /// The field whose validator misbehaved.
        field: String,
    },

    /// An element reported itself invalid without any recognized validity flag.
    #[error("Unknown native validation error on element '{element}'")]
    UnknownNativeValidity {
        /// The element's name attribute.
        element: String,
    },

    // ── Routing ──────────────────────────────────────────────────────

    /// An event was routed for an element that no field tracks.
    #[error("Unknown element: {0}")]
    UnknownElement(String),

    /// A field name was looked up that the controller does not track.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred while serializing a state snapshot.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SvbmitError {
    /// Returns `true` for errors that indicate misconfiguration or a broken
    /// contract rather than a runtime condition.
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::ImproperlyConfigured(_)
                | Self::DeferredValidator { .. }
                | Self::UnknownNativeValidity { .. }
        )
    }
}

impl From<serde_json::Error> for SvbmitError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// A convenience type alias for `Result<T, SvbmitError>`.
pub type SvbmitResult<T> = Result<T, SvbmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("This field is required.", "required");
        assert_eq!(err.to_string(), "This field is required.");
    }

    #[test]
    fn test_validation_error_display_falls_back_to_code() {
        let err = ValidationError::new("", "mismatch");
        assert_eq!(err.to_string(), "mismatch");
    }

    #[test]
    fn test_validation_error_with_param() {
        let err = ValidationError::new("Too short.", "min_length").with_param("min", "8");
        assert_eq!(err.params.get("min").unwrap(), "8");
    }

    #[test]
    fn test_validation_error_serializes_without_empty_params() {
        let err = ValidationError::new("Nope.", "nope");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Nope.", "code": "nope"}));
    }

    #[test]
    fn test_contract_violations() {
        assert!(SvbmitError::ImproperlyConfigured("x".into()).is_contract_violation());
        assert!(SvbmitError::DeferredValidator { field: "a".into() }.is_contract_violation());
        assert!(SvbmitError::UnknownNativeValidity { element: "a".into() }.is_contract_violation());
        assert!(!SvbmitError::UnknownElement("a".into()).is_contract_violation());
        assert!(!SvbmitError::UnknownField("a".into()).is_contract_violation());
        assert!(!SvbmitError::ConfigurationError("x".into()).is_contract_violation());
    }

    #[test]
    fn test_error_display() {
        let err = SvbmitError::DeferredValidator { field: "email".into() };
        assert!(err.to_string().contains("'email'"));
        let err = SvbmitError::ImproperlyConfigured("missing on_submit".into());
        assert_eq!(err.to_string(), "Improperly configured: missing on_submit");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SvbmitError = json_err.into();
        assert!(matches!(err, SvbmitError::SerializationError(_)));
    }
}
