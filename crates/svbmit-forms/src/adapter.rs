//! Collaborator contracts between the engine and its host.
//!
//! The engine never touches a document directly. An [`ElementAdapter`]
//! enumerates the form's elements, reports their state, and applies class
//! changes. A [`MutationWatcher`] is the subscription that delivers
//! "elements changed" signals, and a [`FrameScheduler`] runs the coalesced
//! reconciliation on the next frame.
//!
//! This module also resolves raw element state into what a field needs:
//! a semantic [`FieldValue`] and the highest-precedence native error.

use serde::{Deserialize, Serialize};

use svbmit_core::{SvbmitError, SvbmitResult};

use crate::types::{InputType, NativeValidationError};
use crate::value::FieldValue;

/// Opaque identity of one element, stable for the element's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Mirror of the constraint-validation `ValidityState` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct ValidityFlags {
    pub valid: bool,
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub bad_input: bool,
    pub pattern_mismatch: bool,
    pub range_overflow: bool,
    pub range_underflow: bool,
    pub step_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
}

impl ValidityFlags {
    /// Flags of an element satisfying all of its constraints.
    pub fn valid() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// Flags of an element failing exactly one constraint.
    pub fn failing(error: NativeValidationError) -> Self {
        let mut flags = Self::default();
        match error {
            NativeValidationError::ValueMissing => flags.value_missing = true,
            NativeValidationError::TypeMismatch => flags.type_mismatch = true,
            NativeValidationError::BadInput => flags.bad_input = true,
            NativeValidationError::PatternMismatch => flags.pattern_mismatch = true,
            NativeValidationError::RangeOverflow => flags.range_overflow = true,
            NativeValidationError::RangeUnderflow => flags.range_underflow = true,
            NativeValidationError::StepMismatch => flags.step_mismatch = true,
            NativeValidationError::TooLong => flags.too_long = true,
            NativeValidationError::TooShort => flags.too_short = true,
        }
        flags
    }

    /// Maps the flags to the highest-precedence native error.
    ///
    /// An element that is not valid but sets none of the known flags is a
    /// contract violation.
    pub fn native_error(&self, element: &str) -> SvbmitResult<Option<NativeValidationError>> {
        if self.valid {
            return Ok(None);
        }

        let error = if self.value_missing {
            NativeValidationError::ValueMissing
        } else if self.type_mismatch {
            NativeValidationError::TypeMismatch
        } else if self.bad_input {
            NativeValidationError::BadInput
        } else if self.pattern_mismatch {
            NativeValidationError::PatternMismatch
        } else if self.range_overflow {
            NativeValidationError::RangeOverflow
        } else if self.range_underflow {
            NativeValidationError::RangeUnderflow
        } else if self.step_mismatch {
            NativeValidationError::StepMismatch
        } else if self.too_long {
            NativeValidationError::TooLong
        } else if self.too_short {
            NativeValidationError::TooShort
        } else {
            return Err(SvbmitError::UnknownNativeValidity {
                element: element.to_string(),
            });
        };

        Ok(Some(error))
    }
}

/// Raw state of one element as reported by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub name: String,
    pub input_type: InputType,
    /// The element's `value` property.
    pub value: String,
    /// Check state for checkboxes and radios.
    pub checked: bool,
    /// Selected option values for multi-selects.
    pub selected: Vec<String>,
    pub validity: ValidityFlags,
}

impl ElementState {
    /// A valid element of the given type with an empty value.
    pub fn new(name: impl Into<String>, input_type: InputType) -> Self {
        Self {
            name: name.into(),
            input_type,
            value: String::new(),
            checked: false,
            selected: Vec::new(),
            validity: ValidityFlags::valid(),
        }
    }

    /// The semantic value of this element alone.
    pub fn field_value(&self) -> FieldValue {
        match self.input_type {
            InputType::Checkbox => FieldValue::Bool(self.checked),
            InputType::Radio if !self.checked => FieldValue::Null,
            InputType::SelectMultiple => FieldValue::List(self.selected.clone()),
            _ => FieldValue::Text(self.value.clone()),
        }
    }
}

/// The resolved state of a logical element set (one element, or a radio group).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElements {
    pub name: String,
    pub input_type: InputType,
    pub value: FieldValue,
    pub native_error: Option<NativeValidationError>,
}

/// Collapses the states of a logical element set into one value and error.
///
/// The first non-empty value wins; the first reported native error wins.
/// Name and type come from the first element. Returns `Ok(None)` for an
/// empty set.
pub fn resolve_elements(states: &[ElementState]) -> SvbmitResult<Option<ResolvedElements>> {
    let Some(first) = states.first() else {
        return Ok(None);
    };

    let mut value = None;
    let mut native_error = None;

    for state in states {
        if value.is_none() {
            let v = state.field_value();
            if !v.is_empty() {
                value = Some(v);
            }
        }
        if native_error.is_none() {
            native_error = state.validity.native_error(&state.name)?;
        }
    }

    let value = value.unwrap_or_else(|| {
        if states.len() == 1 {
            first.field_value()
        } else {
            FieldValue::Null
        }
    });

    Ok(Some(ResolvedElements {
        name: first.name.clone(),
        input_type: first.input_type.clone(),
        value,
        native_error,
    }))
}

/// Access to the form's elements.
///
/// Implementations wrap a real document (e.g. through `web-sys`) or an
/// in-memory model such as [`MemoryForm`](crate::memory::MemoryForm).
pub trait ElementAdapter {
    /// The form's elements in document order.
    fn form_elements(&self) -> Vec<ElementId>;

    /// Current state of an element, or `None` if it is no longer attached.
    fn element_state(&self, id: ElementId) -> Option<ElementState>;

    /// Whether the element is still attached to the document.
    fn contains(&self, id: ElementId) -> bool;

    /// Adds a class to an element.
    fn add_class(&mut self, id: ElementId, class: &str);

    /// Removes classes from an element; absent classes are ignored.
    fn remove_classes(&mut self, id: ElementId, classes: &[&str]);

    /// Toggles the form's `novalidate` attribute (native error bubbles).
    fn set_novalidate(&mut self, novalidate: bool);
}

/// A subscription to structural changes of the form.
pub trait MutationWatcher {
    /// Starts delivering change signals.
    fn observe(&mut self);

    /// Stops delivering change signals. Called once, from `destroy()`.
    fn disconnect(&mut self);
}

/// Requests a single callback on the host's next frame.
///
/// The host answers a request by calling
/// [`FormController::on_frame`](crate::controller::FormController::on_frame).
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radio(name: &str, value: &str, checked: bool) -> ElementState {
        ElementState {
            value: value.to_string(),
            checked,
            ..ElementState::new(name, InputType::Radio)
        }
    }

    #[test]
    fn test_native_error_precedence() {
        let flags = ValidityFlags {
            value_missing: true,
            too_short: true,
            ..ValidityFlags::default()
        };
        assert_eq!(
            flags.native_error("a").unwrap(),
            Some(NativeValidationError::ValueMissing)
        );
    }

    #[test]
    fn test_native_error_valid() {
        assert_eq!(ValidityFlags::valid().native_error("a").unwrap(), None);
    }

    #[test]
    fn test_native_error_unknown_combination() {
        let err = ValidityFlags::default().native_error("age").unwrap_err();
        assert!(matches!(err, SvbmitError::UnknownNativeValidity { ref element } if element == "age"));
    }

    #[test]
    fn test_failing_round_trips() {
        for error in [
            NativeValidationError::ValueMissing,
            NativeValidationError::TypeMismatch,
            NativeValidationError::BadInput,
            NativeValidationError::PatternMismatch,
            NativeValidationError::RangeOverflow,
            NativeValidationError::RangeUnderflow,
            NativeValidationError::StepMismatch,
            NativeValidationError::TooLong,
            NativeValidationError::TooShort,
        ] {
            assert_eq!(ValidityFlags::failing(error).native_error("x").unwrap(), Some(error));
        }
    }

    #[test]
    fn test_checkbox_value_is_check_state() {
        let mut state = ElementState::new("terms", InputType::Checkbox);
        state.value = "on".into();
        assert_eq!(state.field_value(), FieldValue::Bool(false));
        state.checked = true;
        assert_eq!(state.field_value(), FieldValue::Bool(true));
    }

    #[test]
    fn test_radio_group_resolves_checked_option() {
        let states = vec![
            radio("size", "s", false),
            radio("size", "m", true),
            radio("size", "l", false),
        ];
        let resolved = resolve_elements(&states).unwrap().unwrap();
        assert_eq!(resolved.name, "size");
        assert_eq!(resolved.value, FieldValue::from("m"));
        assert_eq!(resolved.native_error, None);
    }

    #[test]
    fn test_radio_group_none_checked_is_null() {
        let mut states = vec![
            radio("size", "s", false),
            radio("size", "m", false),
            radio("size", "l", false),
        ];
        for s in &mut states {
            s.validity = ValidityFlags::failing(NativeValidationError::ValueMissing);
        }
        let resolved = resolve_elements(&states).unwrap().unwrap();
        assert_eq!(resolved.value, FieldValue::Null);
        assert_eq!(resolved.native_error, Some(NativeValidationError::ValueMissing));
    }

    #[test]
    fn test_first_reported_native_error_wins() {
        let mut a = ElementState::new("x", InputType::Text);
        a.validity = ValidityFlags::failing(NativeValidationError::TooShort);
        let mut b = ElementState::new("x", InputType::Text);
        b.validity = ValidityFlags::failing(NativeValidationError::ValueMissing);
        let resolved = resolve_elements(&[a, b]).unwrap().unwrap();
        assert_eq!(resolved.native_error, Some(NativeValidationError::TooShort));
    }

    #[test]
    fn test_single_empty_text_keeps_empty_string() {
        let state = ElementState::new("name", InputType::Text);
        let resolved = resolve_elements(&[state]).unwrap().unwrap();
        assert_eq!(resolved.value, FieldValue::from(""));
    }

    #[test]
    fn test_empty_set() {
        assert!(resolve_elements(&[]).unwrap().is_none());
    }
}
