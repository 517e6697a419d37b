//! Settings and controller defaults for svbmit.
//!
//! [`ControllerDefaults`] holds the controller-level policy every form
//! controller starts from. There is no process-wide mutable copy: build one
//! (or load one through [`settings_loader`](crate::settings_loader)) and hand
//! it to each controller at construction time. [`PartialDefaults`] overrides a
//! subset of the values, leaving the rest untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SvbmitError;

/// When a field re-runs validation in response to events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidateOn {
    /// Validate on every input event.
    Instant,
    /// Validate when the element loses focus.
    Blur,
    /// Validate only when the form is submitted.
    Submit,
    /// Validate on submit; after the first submit, validate on every input.
    InstantAfterSubmit,
    /// Validate on every input, but only commit the result when it is valid.
    InstantValid,
}

impl ValidateOn {
    /// Returns the canonical upper-case name of the policy.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instant => "INSTANT",
            Self::Blur => "BLUR",
            Self::Submit => "SUBMIT",
            Self::InstantAfterSubmit => "INSTANT_AFTER_SUBMIT",
            Self::InstantValid => "INSTANT_VALID",
        }
    }
}

impl fmt::Display for ValidateOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidateOn {
    type Err = SvbmitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INSTANT" => Ok(Self::Instant),
            "BLUR" => Ok(Self::Blur),
            "SUBMIT" => Ok(Self::Submit),
            "INSTANT_AFTER_SUBMIT" => Ok(Self::InstantAfterSubmit),
            "INSTANT_VALID" => Ok(Self::InstantValid),
            other => Err(SvbmitError::ConfigurationError(format!(
                "Unknown validateOn policy '{other}'"
            ))),
        }
    }
}

/// Controller-level defaults applied to every field lacking its own settings.
///
/// # Examples
///
/// ```
/// use svbmit_core::settings::{ControllerDefaults, ValidateOn};
///
/// let defaults = ControllerDefaults::default();
/// assert_eq!(defaults.valid_class, "valid");
/// assert_eq!(defaults.validate_on, ValidateOn::InstantAfterSubmit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerDefaults {
    /// Keep the browser's built-in validation bubbles.
    pub use_native_error_tooltips: bool,
    /// Class added to elements of valid fields.
    pub valid_class: String,
    /// Class added to elements of invalid fields.
    pub invalid_class: String,
    /// Policy for fields without an explicit `validate_on`.
    pub validate_on: ValidateOn,
    /// Add the valid class to checkbox, radio, and select elements too.
    pub add_valid_class_to_all_inputs: bool,
    /// Strip validation classes after a successful submit.
    pub remove_validation_classes_on_submit: bool,
}

impl Default for ControllerDefaults {
    fn default() -> Self {
        Self {
            use_native_error_tooltips: false,
            valid_class: "valid".to_string(),
            invalid_class: "invalid".to_string(),
            validate_on: ValidateOn::InstantAfterSubmit,
            add_valid_class_to_all_inputs: false,
            remove_validation_classes_on_submit: true,
        }
    }
}

impl ControllerDefaults {
    /// Returns a copy of these defaults with `partial` applied on top.
    #[must_use]
    pub fn merge(&self, partial: &PartialDefaults) -> Self {
        let mut merged = self.clone();
        if let Some(v) = partial.use_native_error_tooltips {
            merged.use_native_error_tooltips = v;
        }
        if let Some(v) = &partial.valid_class {
            merged.valid_class.clone_from(v);
        }
        if let Some(v) = &partial.invalid_class {
            merged.invalid_class.clone_from(v);
        }
        if let Some(v) = partial.validate_on {
            merged.validate_on = v;
        }
        if let Some(v) = partial.add_valid_class_to_all_inputs {
            merged.add_valid_class_to_all_inputs = v;
        }
        if let Some(v) = partial.remove_validation_classes_on_submit {
            merged.remove_validation_classes_on_submit = v;
        }
        merged
    }
}

/// A partial override of [`ControllerDefaults`]; `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialDefaults {
    pub use_native_error_tooltips: Option<bool>,
    pub valid_class: Option<String>,
    pub invalid_class: Option<String>,
    pub validate_on: Option<ValidateOn>,
    pub add_valid_class_to_all_inputs: Option<bool>,
    pub remove_validation_classes_on_submit: Option<bool>,
}

/// Host-level settings: logging plus the controller defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log level filter (e.g. "info", "svbmit_forms=trace").
    pub log_level: String,
    /// Defaults for every controller built from these settings.
    pub defaults: ControllerDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            defaults: ControllerDefaults::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_controller_defaults() {
        let d = ControllerDefaults::default();
        assert!(!d.use_native_error_tooltips);
        assert_eq!(d.valid_class, "valid");
        assert_eq!(d.invalid_class, "invalid");
        assert_eq!(d.validate_on, ValidateOn::InstantAfterSubmit);
        assert!(!d.add_valid_class_to_all_inputs);
        assert!(d.remove_validation_classes_on_submit);
    }

    #[test]
    fn test_merge_only_overrides_given_keys() {
        let partial = PartialDefaults {
            valid_class: Some("is-valid".into()),
            invalid_class: Some("is-invalid".into()),
            ..PartialDefaults::default()
        };
        let merged = ControllerDefaults::default().merge(&partial);
        assert_eq!(merged.valid_class, "is-valid");
        assert_eq!(merged.invalid_class, "is-invalid");
        assert_eq!(merged.validate_on, ValidateOn::InstantAfterSubmit);
        assert!(merged.remove_validation_classes_on_submit);
    }

    #[test]
    fn test_merge_does_not_mutate_base() {
        let base = ControllerDefaults::default();
        let partial = PartialDefaults {
            validate_on: Some(ValidateOn::Blur),
            ..PartialDefaults::default()
        };
        let _ = base.merge(&partial);
        assert_eq!(base.validate_on, ValidateOn::InstantAfterSubmit);
    }

    #[test]
    fn test_validate_on_from_str() {
        assert_eq!("instant".parse::<ValidateOn>().unwrap(), ValidateOn::Instant);
        assert_eq!(
            "INSTANT_AFTER_SUBMIT".parse::<ValidateOn>().unwrap(),
            ValidateOn::InstantAfterSubmit
        );
        assert_eq!(" blur ".parse::<ValidateOn>().unwrap(), ValidateOn::Blur);
        assert!("sometimes".parse::<ValidateOn>().is_err());
    }

    #[test]
    fn test_validate_on_serde_names() {
        let json = serde_json::to_string(&ValidateOn::InstantValid).unwrap();
        assert_eq!(json, "\"INSTANT_VALID\"");
        let back: ValidateOn = serde_json::from_str("\"SUBMIT\"").unwrap();
        assert_eq!(back, ValidateOn::Submit);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for policy in [
            ValidateOn::Instant,
            ValidateOn::Blur,
            ValidateOn::Submit,
            ValidateOn::InstantAfterSubmit,
            ValidateOn::InstantValid,
        ] {
            assert_eq!(policy.to_string().parse::<ValidateOn>().unwrap(), policy);
        }
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.defaults, ControllerDefaults::default());
    }
}
