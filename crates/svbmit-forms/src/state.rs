//! Published state snapshots.
//!
//! [`FormState`] is derived from the registry on demand and pushed into the
//! configured sinks; nothing mutates it independently.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use svbmit_core::{SvbmitResult, ValidationError};

use crate::types::{NativeValidationError, SubmitState, ValidationState};
use crate::value::FieldValue;

/// Why a field is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldError {
    /// A constraint reported by the element itself.
    Native(NativeValidationError),
    /// A descriptor returned by a custom validator.
    Custom(ValidationError),
}

impl FieldError {
    /// The native error code, or the custom descriptor's code.
    pub fn code(&self) -> &str {
        match self {
            Self::Native(native) => native.as_str(),
            Self::Custom(custom) => &custom.code,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(native) => write!(f, "{native}"),
            Self::Custom(custom) => write!(f, "{custom}"),
        }
    }
}

impl From<NativeValidationError> for FieldError {
    fn from(native: NativeValidationError) -> Self {
        Self::Native(native)
    }
}

impl From<ValidationError> for FieldError {
    fn from(custom: ValidationError) -> Self {
        Self::Custom(custom)
    }
}

/// Snapshot of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub value: FieldValue,
    pub validation_state: ValidationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FieldError>,
    pub touched: bool,
    /// The parent group's state, for fields that belong to a group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_validation_state: Option<ValidationState>,
}

/// Snapshot of the whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub submit_state: SubmitState,
    pub validation_state: ValidationState,
    pub touched: bool,
    /// Non-orphan fields keyed by name.
    pub fields: HashMap<String, FieldState>,
}

impl FormState {
    /// The empty state a form starts from before its fields are known.
    pub fn empty() -> Self {
        Self {
            submit_state: SubmitState::Unsubmitted,
            validation_state: ValidationState::Valid,
            touched: false,
            fields: HashMap::new(),
        }
    }

    /// Looks up one field's snapshot.
    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.get(name)
    }

    /// Looks up one field's value.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name).map(|f| &f.value)
    }

    /// Serializes the snapshot for hosts that hand it to a script layer.
    pub fn to_json(&self) -> SvbmitResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Field name to error.
pub type ErrorMap = HashMap<String, FieldError>;
