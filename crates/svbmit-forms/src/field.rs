//! A single validated unit of form state.
//!
//! A [`Field`] carries the state shared by every variant (value, validation
//! state, error, touched and submitted flags, validate-on policy, and
//! validators) plus a [`FieldKind`] tag:
//!
//! - [`LeafField`]: backed by one element, or by every option of a radio group.
//! - [`GroupField`]: backed by other fields, named in `children`. Its value is
//!   computed from theirs and it only runs its own validators once every child
//!   is valid.
//!
//! Fields never point at each other. A leaf finds its parent group, and a
//! group finds its children, by name through the
//! [`FieldRegistry`](crate::registry::FieldRegistry), so children can be
//! dropped and recreated during reconciliation without dangling references.

use svbmit_core::ValidateOn;

use crate::adapter::{ElementId, ResolvedElements};
use crate::config::FieldSettings;
use crate::state::FieldError;
use crate::types::{InputType, NativeValidationError, ValidationState};
use crate::validators::{ComputeFn, Validator};
use crate::value::FieldValue;

/// Variant data of a field backed by elements.
#[derive(Debug, Clone, Default)]
pub struct LeafField {
    pub(crate) elements: Vec<ElementId>,
    pub(crate) input_type: Option<InputType>,
    pub(crate) native_error: Option<NativeValidationError>,
}

impl LeafField {
    /// Element references backing this field; empty for an orphan.
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// The element type, once an element has been seen.
    pub const fn input_type(&self) -> Option<&InputType> {
        self.input_type.as_ref()
    }

    /// The native error last read from the elements.
    pub const fn native_error(&self) -> Option<NativeValidationError> {
        self.native_error
    }
}

/// Variant data of a field computed from other fields.
#[derive(Clone)]
pub struct GroupField {
    pub(crate) children: Vec<String>,
    pub(crate) compute_value: ComputeFn,
}

impl GroupField {
    /// Names of the fields this group depends on, in declaration order.
    pub fn children(&self) -> &[String] {
        &self.children
    }
}

impl std::fmt::Debug for GroupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupField")
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

/// Leaf or group.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Leaf(LeafField),
    Group(GroupField),
}

/// One validated unit of form state.
#[derive(Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) value: FieldValue,
    pub(crate) validation_state: ValidationState,
    pub(crate) error: Option<FieldError>,
    pub(crate) display_error: bool,
    pub(crate) touched: bool,
    pub(crate) has_submitted: bool,
    pub(crate) validate_on: ValidateOn,
    pub(crate) validators: Vec<Validator>,
    pub(crate) declared: bool,
    pub(crate) kind: FieldKind,
}

impl Field {
    fn base(name: String, validate_on: ValidateOn, validators: Vec<Validator>, kind: FieldKind) -> Self {
        Self {
            name,
            value: FieldValue::Null,
            validation_state: ValidationState::Pending,
            error: None,
            display_error: false,
            touched: false,
            has_submitted: false,
            validate_on,
            validators,
            declared: false,
            kind,
        }
    }

    /// A leaf field with no elements yet (an orphan until attached).
    pub fn leaf(name: impl Into<String>, validate_on: ValidateOn) -> Self {
        Self::base(
            name.into(),
            validate_on,
            Vec::new(),
            FieldKind::Leaf(LeafField::default()),
        )
    }

    /// A group field over `children`.
    pub fn group(
        name: impl Into<String>,
        children: Vec<String>,
        compute_value: ComputeFn,
        validate_on: ValidateOn,
    ) -> Self {
        Self::base(
            name.into(),
            validate_on,
            Vec::new(),
            FieldKind::Group(GroupField {
                children,
                compute_value,
            }),
        )
    }

    /// Builds a declared field from its settings. `default_policy` applies
    /// when the settings carry no `validate_on`.
    pub(crate) fn from_settings(name: &str, settings: &FieldSettings, default_policy: ValidateOn) -> Self {
        let validate_on = settings.validate_on.unwrap_or(default_policy);
        let mut field = match (&settings.fields, &settings.compute_value) {
            (Some(children), Some(compute)) => {
                Self::group(name, children.clone(), compute.clone(), validate_on)
            }
            _ => Self::leaf(name, validate_on),
        };
        field.validators.clone_from(&settings.validators);
        field.declared = true;
        field
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn value(&self) -> &FieldValue {
        &self.value
    }

    pub const fn validation_state(&self) -> ValidationState {
        self.validation_state
    }

    /// The error; only set while the field is invalid.
    pub const fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }

    /// Whether the current error should be shown to the user.
    pub const fn display_error(&self) -> bool {
        self.display_error && self.error.is_some()
    }

    pub const fn touched(&self) -> bool {
        self.touched
    }

    pub const fn has_submitted(&self) -> bool {
        self.has_submitted
    }

    pub const fn validate_on(&self) -> ValidateOn {
        self.validate_on
    }

    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field was declared in the controller's settings.
    pub const fn is_declared(&self) -> bool {
        self.declared
    }

    pub const fn is_group(&self) -> bool {
        matches!(self.kind, FieldKind::Group(_))
    }

    pub const fn as_leaf(&self) -> Option<&LeafField> {
        match &self.kind {
            FieldKind::Leaf(leaf) => Some(leaf),
            FieldKind::Group(_) => None,
        }
    }

    pub const fn as_group(&self) -> Option<&GroupField> {
        match &self.kind {
            FieldKind::Group(group) => Some(group),
            FieldKind::Leaf(_) => None,
        }
    }

    /// A leaf without elements. Groups are never orphans on their own;
    /// see [`FieldRegistry::is_detached`](crate::registry::FieldRegistry::is_detached).
    pub fn is_orphan(&self) -> bool {
        self.as_leaf().is_some_and(|leaf| leaf.elements.is_empty())
    }

    /// Whether the leaf is backed by `element`.
    pub fn owns_element(&self, element: ElementId) -> bool {
        self.as_leaf().is_some_and(|leaf| leaf.elements.contains(&element))
    }

    pub(crate) fn is_radio(&self) -> bool {
        self.as_leaf()
            .is_some_and(|leaf| leaf.input_type == Some(InputType::Radio))
    }

    /// Points a leaf at a new element set and refreshes value and native
    /// error from it. No-op for groups.
    pub(crate) fn attach(&mut self, elements: Vec<ElementId>, resolved: ResolvedElements) {
        if let FieldKind::Leaf(leaf) = &mut self.kind {
            leaf.elements = elements;
            leaf.input_type = Some(resolved.input_type);
            leaf.native_error = resolved.native_error;
            self.value = resolved.value;
        }
    }

    /// Drops a leaf's element references, turning it into an orphan.
    pub(crate) fn detach(&mut self) {
        if let FieldKind::Leaf(leaf) = &mut self.kind {
            leaf.elements.clear();
            leaf.native_error = None;
        }
    }

    /// Records a verdict. The display flag follows the field's interaction
    /// history at the time of the verdict.
    pub(crate) fn set_verdict(&mut self, state: ValidationState, error: Option<FieldError>) {
        self.validation_state = state;
        self.error = if state == ValidationState::Invalid { error } else { None };
        self.display_error = self.error.is_some() && (self.touched || self.has_submitted);
    }

    /// Resets to `PENDING` without an error.
    pub(crate) fn reset_validation(&mut self) {
        self.set_verdict(ValidationState::Pending, None);
    }
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("validation_state", &self.validation_state)
            .field("error", &self.error)
            .field("touched", &self.touched)
            .field("has_submitted", &self.has_submitted)
            .field("validate_on", &self.validate_on)
            .field("validators", &self.validators.len())
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{all_equal, required};

    fn resolved(value: &str) -> ResolvedElements {
        ResolvedElements {
            name: "email".into(),
            input_type: InputType::Email,
            value: FieldValue::from(value),
            native_error: None,
        }
    }

    #[test]
    fn test_new_field_is_pending_orphan() {
        let field = Field::leaf("email", ValidateOn::Instant);
        assert_eq!(field.validation_state(), ValidationState::Pending);
        assert!(field.error().is_none());
        assert!(!field.touched());
        assert!(!field.has_submitted());
        assert!(field.is_orphan());
    }

    #[test]
    fn test_attach_and_detach() {
        let mut field = Field::leaf("email", ValidateOn::Instant);
        field.attach(vec![ElementId(1)], resolved("a@b.c"));
        assert!(!field.is_orphan());
        assert!(field.owns_element(ElementId(1)));
        assert_eq!(field.value(), &FieldValue::from("a@b.c"));
        assert_eq!(field.as_leaf().unwrap().input_type(), Some(&InputType::Email));

        field.detach();
        assert!(field.is_orphan());
        assert!(!field.owns_element(ElementId(1)));
    }

    #[test]
    fn test_from_settings_group() {
        let settings = FieldSettings::group(["a", "b"], all_equal()).validator(required());
        let field = Field::from_settings("ab", &settings, ValidateOn::Submit);
        assert!(field.is_group());
        assert!(field.is_declared());
        assert!(!field.is_orphan());
        assert_eq!(field.validate_on(), ValidateOn::Submit);
        assert_eq!(field.validators.len(), 1);
        assert_eq!(field.as_group().unwrap().children(), ["a", "b"]);
    }

    #[test]
    fn test_from_settings_policy_override() {
        let settings = FieldSettings::new().validate_on(ValidateOn::Blur);
        let field = Field::from_settings("x", &settings, ValidateOn::Submit);
        assert_eq!(field.validate_on(), ValidateOn::Blur);
    }

    #[test]
    fn test_error_only_kept_while_invalid() {
        let mut field = Field::leaf("x", ValidateOn::Instant);
        field.set_verdict(
            ValidationState::Valid,
            Some(FieldError::Native(NativeValidationError::TooLong)),
        );
        assert!(field.error().is_none());
    }

    #[test]
    fn test_display_flag_follows_interaction() {
        let mut field = Field::leaf("x", ValidateOn::Instant);
        let err = FieldError::Native(NativeValidationError::ValueMissing);

        field.set_verdict(ValidationState::Invalid, Some(err.clone()));
        assert!(!field.display_error());

        field.touched = true;
        field.set_verdict(ValidationState::Invalid, Some(err));
        assert!(field.display_error());

        field.reset_validation();
        assert!(!field.display_error());
        assert_eq!(field.validation_state(), ValidationState::Pending);
    }
}
