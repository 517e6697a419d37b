//! Declarative controller configuration.
//!
//! [`FormConfig`] collects everything a [`FormController`](crate::controller::FormController)
//! needs: the element adapter, the submit callback, per-field settings, policy
//! overrides on top of a [`ControllerDefaults`], and the optional sinks and
//! host hooks.

use std::collections::{HashMap, HashSet};
use std::fmt;

use svbmit_core::{ControllerDefaults, PartialDefaults, SvbmitError, SvbmitResult, ValidateOn};
use svbmit_signals::StateSink;

use crate::adapter::{FrameScheduler, MutationWatcher};
use crate::state::{ErrorMap, FormState};
use crate::validators::{ComputeFn, Validator};
use crate::value::FieldValue;

/// Receives the `{field name -> value}` map when a submit succeeds.
pub type SubmitCallback = Box<dyn FnMut(HashMap<String, FieldValue>)>;

/// Settings for one declared field.
///
/// A field with `fields` set is a group field and must also set
/// `compute_value`.
#[derive(Clone, Default)]
pub struct FieldSettings {
    pub validators: Vec<Validator>,
    pub validate_on: Option<ValidateOn>,
    pub fields: Option<Vec<String>>,
    pub compute_value: Option<ComputeFn>,
}

impl FieldSettings {
    /// Settings for a plain field with no validators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for a group field over `children`.
    pub fn group<I, S>(children: I, compute_value: ComputeFn) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Some(children.into_iter().map(Into::into).collect()),
            compute_value: Some(compute_value),
            ..Self::default()
        }
    }

    /// Appends a validator.
    #[must_use]
    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Sets the field's validate-on policy.
    #[must_use]
    pub fn validate_on(mut self, policy: ValidateOn) -> Self {
        self.validate_on = Some(policy);
        self
    }

    /// Whether these settings describe a group field.
    pub const fn is_group(&self) -> bool {
        self.fields.is_some()
    }
}

impl fmt::Debug for FieldSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSettings")
            .field("validators", &self.validators.len())
            .field("validate_on", &self.validate_on)
            .field("fields", &self.fields)
            .field("compute_value", &self.compute_value.is_some())
            .finish()
    }
}

/// Construction-time configuration of a form controller.
pub struct FormConfig<A> {
    pub(crate) form: A,
    pub(crate) id: String,
    pub(crate) on_submit: Option<SubmitCallback>,
    pub(crate) fields: Vec<(String, FieldSettings)>,
    pub(crate) defaults: ControllerDefaults,
    pub(crate) overrides: PartialDefaults,
    pub(crate) form_state: Option<Box<dyn StateSink<FormState>>>,
    pub(crate) errors: Option<Box<dyn StateSink<ErrorMap>>>,
    pub(crate) watcher: Option<Box<dyn MutationWatcher>>,
    pub(crate) scheduler: Option<Box<dyn FrameScheduler>>,
}

impl<A> FormConfig<A> {
    /// Starts a configuration for the form behind `form`.
    pub fn new(form: A) -> Self {
        Self {
            form,
            id: "form".to_string(),
            on_submit: None,
            fields: Vec::new(),
            defaults: ControllerDefaults::default(),
            overrides: PartialDefaults::default(),
            form_state: None,
            errors: None,
            watcher: None,
            scheduler: None,
        }
    }

    /// Identifier used in log spans.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the callback invoked with the form values on a valid submit.
    #[must_use]
    pub fn on_submit<F>(mut self, callback: F) -> Self
    where
        F: FnMut(HashMap<String, FieldValue>) + 'static,
    {
        self.on_submit = Some(Box::new(callback));
        self
    }

    /// Declares settings for a field. Declaring the same name twice is an error.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, settings: FieldSettings) -> Self {
        self.fields.push((name.into(), settings));
        self
    }

    /// Replaces the defaults the overrides are applied on.
    #[must_use]
    pub fn with_defaults(mut self, defaults: ControllerDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Applies a partial override on top of the defaults.
    #[must_use]
    pub fn overrides(mut self, overrides: PartialDefaults) -> Self {
        self.overrides = overrides;
        self
    }

    #[must_use]
    pub fn validate_on(mut self, policy: ValidateOn) -> Self {
        self.overrides.validate_on = Some(policy);
        self
    }

    #[must_use]
    pub fn use_native_error_tooltips(mut self, enabled: bool) -> Self {
        self.overrides.use_native_error_tooltips = Some(enabled);
        self
    }

    #[must_use]
    pub fn valid_class(mut self, class: impl Into<String>) -> Self {
        self.overrides.valid_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn invalid_class(mut self, class: impl Into<String>) -> Self {
        self.overrides.invalid_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn add_valid_class_to_all_inputs(mut self, enabled: bool) -> Self {
        self.overrides.add_valid_class_to_all_inputs = Some(enabled);
        self
    }

    #[must_use]
    pub fn remove_validation_classes_on_submit(mut self, enabled: bool) -> Self {
        self.overrides.remove_validation_classes_on_submit = Some(enabled);
        self
    }

    /// Sink receiving a [`FormState`] snapshot on every state change.
    #[must_use]
    pub fn form_state_sink(mut self, sink: impl StateSink<FormState> + 'static) -> Self {
        self.form_state = Some(Box::new(sink));
        self
    }

    /// Sink receiving the error map on every state change.
    #[must_use]
    pub fn errors_sink(mut self, sink: impl StateSink<ErrorMap> + 'static) -> Self {
        self.errors = Some(Box::new(sink));
        self
    }

    #[must_use]
    pub fn mutation_watcher(mut self, watcher: impl MutationWatcher + 'static) -> Self {
        self.watcher = Some(Box::new(watcher));
        self
    }

    #[must_use]
    pub fn frame_scheduler(mut self, scheduler: impl FrameScheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Checks the field declarations for mistakes that would otherwise
    /// surface later as confusing runtime behavior.
    pub(crate) fn check_fields(&self) -> SvbmitResult<()> {
        let mut seen = HashSet::new();

        for (name, settings) in &self.fields {
            if name.is_empty() {
                return Err(SvbmitError::ImproperlyConfigured(
                    "Field settings need a non-empty name".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(SvbmitError::ImproperlyConfigured(format!(
                    "Field '{name}' is declared more than once"
                )));
            }
            if let Some(children) = &settings.fields {
                if children.is_empty() {
                    return Err(SvbmitError::ImproperlyConfigured(format!(
                        "Group field '{name}' has no child fields"
                    )));
                }
                if children.iter().any(|child| child == name) {
                    return Err(SvbmitError::ImproperlyConfigured(format!(
                        "Group field '{name}' lists itself as a child"
                    )));
                }
                if settings.compute_value.is_none() {
                    return Err(SvbmitError::ImproperlyConfigured(format!(
                        "Group field '{name}' needs a compute_value function"
                    )));
                }
            }
        }

        // A field has at most one parent group, and groups do not nest.
        let groups: HashSet<&str> = self
            .fields
            .iter()
            .filter(|(_, settings)| settings.is_group())
            .map(|(name, _)| name.as_str())
            .collect();
        let mut parents: HashMap<&str, &str> = HashMap::new();
        for (name, settings) in &self.fields {
            let Some(children) = &settings.fields else {
                continue;
            };
            for child in children {
                if groups.contains(child.as_str()) {
                    return Err(SvbmitError::ImproperlyConfigured(format!(
                        "Group field '{name}' lists group field '{child}' as a child"
                    )));
                }
                if let Some(other) = parents.insert(child.as_str(), name.as_str()) {
                    return Err(SvbmitError::ImproperlyConfigured(format!(
                        "Field '{child}' belongs to both group '{other}' and group '{name}'"
                    )));
                }
            }
        }

        Ok(())
    }
}
