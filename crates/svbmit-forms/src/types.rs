//! Enumerations shared across the engine: validation and submit states,
//! field events, element input types, and native constraint failures.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use svbmit_core::settings::ValidateOn;

/// Validation state of a single field or of the whole form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationState {
    /// No verdict yet.
    Pending,
    /// Validation succeeded.
    Valid,
    /// Validation failed; the field carries an error.
    Invalid,
}

impl fmt::Display for ValidationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "PENDING",
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
        };
        f.write_str(name)
    }
}

/// Whether the form has been successfully submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmitState {
    /// No successful submit yet.
    #[default]
    Unsubmitted,
    /// The submit callback has been invoked at least once.
    Submitted,
}

/// Events routed from the host to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEvent {
    /// The element's value changed.
    Input,
    /// The element lost focus.
    Blur,
    /// The element gained focus.
    Focus,
    /// The owning form is being submitted.
    Submit,
}

/// The `type` of a form element as reported by the element adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum InputType {
    Text,
    Email,
    Password,
    Number,
    Textarea,
    Checkbox,
    Radio,
    Select,
    SelectMultiple,
    Submit,
    Other(String),
}

impl InputType {
    /// Parses an element type attribute (`"select-one"` maps to [`InputType::Select`]).
    pub fn from_attr(attr: &str) -> Self {
        match attr.to_ascii_lowercase().as_str() {
            "" | "text" => Self::Text,
            "email" => Self::Email,
            "password" => Self::Password,
            "number" => Self::Number,
            "textarea" => Self::Textarea,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "select" | "select-one" => Self::Select,
            "select-multiple" => Self::SelectMultiple,
            "submit" => Self::Submit,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the attribute spelling of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Select => "select-one",
            Self::SelectMultiple => "select-multiple",
            Self::Submit => "submit",
            Self::Other(s) => s,
        }
    }

    /// Checkbox, radio, and select elements don't get the valid class by default.
    pub const fn is_valid_class_exempt(&self) -> bool {
        matches!(
            self,
            Self::Checkbox | Self::Radio | Self::Select | Self::SelectMultiple
        )
    }
}

impl From<String> for InputType {
    fn from(s: String) -> Self {
        Self::from_attr(&s)
    }
}

impl From<InputType> for String {
    fn from(t: InputType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Browser-reported constraint violations, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NativeValidationError {
    ValueMissing,
    TypeMismatch,
    BadInput,
    PatternMismatch,
    RangeOverflow,
    RangeUnderflow,
    StepMismatch,
    TooLong,
    TooShort,
}

impl NativeValidationError {
    /// Returns the `ValidityState` flag name for this error.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValueMissing => "valueMissing",
            Self::TypeMismatch => "typeMismatch",
            Self::BadInput => "badInput",
            Self::PatternMismatch => "patternMismatch",
            Self::RangeOverflow => "rangeOverflow",
            Self::RangeUnderflow => "rangeUnderflow",
            Self::StepMismatch => "stepMismatch",
            Self::TooLong => "tooLong",
            Self::TooShort => "tooShort",
        }
    }
}

impl fmt::Display for NativeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_type_from_attr() {
        assert_eq!(InputType::from_attr("select-one"), InputType::Select);
        assert_eq!(InputType::from_attr("RADIO"), InputType::Radio);
        assert_eq!(InputType::from_attr(""), InputType::Text);
        assert_eq!(InputType::from_attr("date"), InputType::Other("date".into()));
    }

    #[test]
    fn test_input_type_serde_as_string() {
        let json = serde_json::to_string(&InputType::SelectMultiple).unwrap();
        assert_eq!(json, "\"select-multiple\"");
        let back: InputType = serde_json::from_str("\"checkbox\"").unwrap();
        assert_eq!(back, InputType::Checkbox);
    }

    #[test]
    fn test_valid_class_exemptions() {
        assert!(InputType::Checkbox.is_valid_class_exempt());
        assert!(InputType::Radio.is_valid_class_exempt());
        assert!(InputType::Select.is_valid_class_exempt());
        assert!(InputType::SelectMultiple.is_valid_class_exempt());
        assert!(!InputType::Email.is_valid_class_exempt());
        assert!(!InputType::Other("date".into()).is_valid_class_exempt());
    }

    #[test]
    fn test_native_error_names() {
        assert_eq!(NativeValidationError::ValueMissing.to_string(), "valueMissing");
        let json = serde_json::to_string(&NativeValidationError::TooShort).unwrap();
        assert_eq!(json, "\"tooShort\"");
    }

    #[test]
    fn test_validation_state_serde() {
        let json = serde_json::to_string(&ValidationState::Invalid).unwrap();
        assert_eq!(json, "\"INVALID\"");
        assert_eq!(ValidationState::Pending.to_string(), "PENDING");
    }
}
