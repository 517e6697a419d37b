//! The form controller.
//!
//! [`FormController`] owns the field registry and the submit lifecycle. Hosts
//! route element events into [`handle_event`](FormController::handle_event),
//! call [`submit`](FormController::submit) when the form is submitted, and
//! forward structural document changes through
//! [`notify_mutation`](FormController::notify_mutation) and
//! [`on_frame`](FormController::on_frame). After every state change the
//! controller pushes a fresh [`FormState`] and error map into the configured
//! sinks.
//!
//! # Examples
//!
//! ```
//! use std::cell::RefCell;
//! use std::collections::HashMap;
//! use std::rc::Rc;
//!
//! use svbmit_forms::prelude::*;
//! use svbmit_forms::validators;
//!
//! let mut form = MemoryForm::new();
//! let email = form.add_input("email", InputType::Email);
//!
//! let submitted = Rc::new(RefCell::new(None));
//! let sink = submitted.clone();
//! let config = FormConfig::new(form)
//!     .on_submit(move |values: HashMap<String, FieldValue>| *sink.borrow_mut() = Some(values))
//!     .field("email", FieldSettings::new()
//!         .validator(validators::required())
//!         .validator(validators::email()));
//! let mut controller = FormController::new(config).unwrap();
//!
//! controller.adapter_mut().set_value(email, "ada@example.com");
//! controller.handle_event(email, FieldEvent::Input).unwrap();
//! assert_eq!(controller.submit().unwrap(), SubmitOutcome::Submitted);
//! assert!(submitted.borrow().is_some());
//! ```

use std::collections::HashMap;

use svbmit_core::logging::form_span;
use svbmit_core::{ControllerDefaults, SvbmitError, SvbmitResult};
use svbmit_signals::StateSink;

use crate::adapter::{ElementAdapter, ElementId, FrameScheduler, MutationWatcher};
use crate::coalesce::Coalescer;
use crate::config::{FormConfig, SubmitCallback};
use crate::field::Field;
use crate::registry::{FieldRegistry, ReconcileReport};
use crate::state::{ErrorMap, FormState};
use crate::types::{FieldEvent, SubmitState, ValidationState};
use crate::validation::Effects;
use crate::value::FieldValue;

/// Result of a [`FormController::submit`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every field was valid and the submit callback ran.
    Submitted,
    /// The aggregate state was not `VALID`; the callback did not run.
    Blocked(ValidationState),
    /// The controller has been destroyed.
    Ignored,
}

/// Drives validation for one form.
pub struct FormController<A: ElementAdapter> {
    form: A,
    registry: FieldRegistry,
    defaults: ControllerDefaults,
    submit_state: SubmitState,
    on_submit: SubmitCallback,
    form_state_sink: Option<Box<dyn StateSink<FormState>>>,
    errors_sink: Option<Box<dyn StateSink<ErrorMap>>>,
    watcher: Option<Box<dyn MutationWatcher>>,
    scheduler: Option<Box<dyn FrameScheduler>>,
    coalescer: Coalescer,
    span: tracing::Span,
    destroyed: bool,
}

impl<A: ElementAdapter> FormController<A> {
    /// Builds a controller, creates the declared fields, and performs the
    /// first reconciliation against the form's elements.
    ///
    /// Fails with [`SvbmitError::ImproperlyConfigured`] when no submit
    /// callback is set or a field declaration is malformed.
    pub fn new(config: FormConfig<A>) -> SvbmitResult<Self> {
        config.check_fields().map_err(violation)?;

        let FormConfig {
            mut form,
            id,
            on_submit,
            fields,
            defaults,
            overrides,
            form_state,
            errors,
            mut watcher,
            scheduler,
        } = config;

        let on_submit = on_submit.ok_or_else(|| {
            violation(SvbmitError::ImproperlyConfigured(
                "FormController requires an on_submit callback".to_string(),
            ))
        })?;

        let defaults = defaults.merge(&overrides);
        let span = form_span(&id);
        let guard = span.enter();

        let mut registry = FieldRegistry::new();
        for (name, settings) in &fields {
            registry.push(Field::from_settings(name, settings, defaults.validate_on));
        }
        tracing::debug!(declared = fields.len(), validate_on = %defaults.validate_on, "controller created");

        if !defaults.use_native_error_tooltips {
            form.set_novalidate(true);
        }
        if let Some(watcher) = watcher.as_mut() {
            watcher.observe();
        }

        drop(guard);
        let mut controller = Self {
            form,
            registry,
            defaults,
            submit_state: SubmitState::Unsubmitted,
            on_submit,
            form_state_sink: form_state,
            errors_sink: errors,
            watcher,
            scheduler,
            coalescer: Coalescer::new(),
            span,
            destroyed: false,
        };
        controller.reconcile()?;
        Ok(controller)
    }

    /// Routes an element event to the field owning `element`.
    ///
    /// `Submit` events submit the whole form. Events after
    /// [`destroy`](Self::destroy) are ignored.
    pub fn handle_event(&mut self, element: ElementId, event: FieldEvent) -> SvbmitResult<()> {
        if self.destroyed {
            return Ok(());
        }
        if event == FieldEvent::Submit {
            return self.submit().map(|_| ());
        }

        let span = self.span.clone();
        let _guard = span.enter();

        let idx = self
            .registry
            .index_of_element(element)
            .ok_or_else(|| SvbmitError::UnknownElement(format!("element #{}", element.0)))?;

        let mut fx = Effects {
            adapter: &mut self.form,
            defaults: &self.defaults,
            submit_state: self.submit_state,
        };
        self.registry.dispatch(idx, event, &mut fx).map_err(violation)?;

        self.publish();
        Ok(())
    }

    /// Validates every field, leaves before groups, and calls the submit
    /// callback when the aggregate state is `VALID`.
    pub fn submit(&mut self) -> SvbmitResult<SubmitOutcome> {
        if self.destroyed {
            return Ok(SubmitOutcome::Ignored);
        }
        let span = self.span.clone();
        let _guard = span.enter();

        let mut fx = Effects {
            adapter: &mut self.form,
            defaults: &self.defaults,
            submit_state: self.submit_state,
        };
        for idx in self.registry.leaves_then_groups() {
            self.registry
                .dispatch(idx, FieldEvent::Submit, &mut fx)
                .map_err(violation)?;
        }

        let state = self.registry.aggregate_validation_state();
        if state != ValidationState::Valid {
            tracing::debug!(state = %state, "submit blocked");
            self.publish();
            return Ok(SubmitOutcome::Blocked(state));
        }

        if self.defaults.remove_validation_classes_on_submit {
            self.registry.clear_all_classes(&mut fx);
        }
        self.submit_state = SubmitState::Submitted;

        let values = self.registry.values();
        tracing::info!(fields = values.len(), "form submitted");
        (self.on_submit)(values);

        self.publish();
        Ok(SubmitOutcome::Submitted)
    }

    /// Reconciles the field set against the form's current elements and
    /// publishes the result.
    pub fn reconcile(&mut self) -> SvbmitResult<ReconcileReport> {
        let span = self.span.clone();
        let _guard = span.enter();

        let report = self
            .registry
            .reconcile(&self.form, self.defaults.validate_on)
            .map_err(violation)?;
        tracing::debug!(
            created = report.created.len(),
            updated = report.updated.len(),
            orphaned = report.orphaned.len(),
            removed = report.removed.len(),
            "reconciled"
        );

        self.publish();
        Ok(report)
    }

    /// Signals that the form's element tree changed.
    ///
    /// With a frame scheduler, the first signal requests a frame and later
    /// signals are folded into it until [`on_frame`](Self::on_frame) runs.
    /// Without one, reconciliation runs immediately.
    pub fn notify_mutation(&mut self) -> SvbmitResult<()> {
        if self.destroyed {
            return Ok(());
        }
        if !self.coalescer.signal() {
            return Ok(());
        }
        match self.scheduler.as_mut() {
            Some(scheduler) => {
                scheduler.request_frame();
                Ok(())
            }
            None => {
                self.coalescer.take();
                self.reconcile().map(|_| ())
            }
        }
    }

    /// The host's frame callback. Runs the pending reconciliation, if any,
    /// and returns whether one ran.
    pub fn on_frame(&mut self) -> SvbmitResult<bool> {
        if self.destroyed || !self.coalescer.take() {
            return Ok(false);
        }
        self.reconcile()?;
        Ok(true)
    }

    /// Validates one field outside of any event and publishes the result.
    pub fn revalidate(&mut self, name: &str) -> SvbmitResult<ValidationState> {
        let idx = self
            .registry
            .index_of(name)
            .ok_or_else(|| SvbmitError::UnknownField(name.to_string()))?;
        if self.destroyed {
            return Ok(self.registry.fields[idx].validation_state());
        }

        let span = self.span.clone();
        let _guard = span.enter();

        let mut fx = Effects {
            adapter: &mut self.form,
            defaults: &self.defaults,
            submit_state: self.submit_state,
        };
        self.registry.refresh_value(idx, &fx).map_err(violation)?;
        self.registry.validate(idx, &mut fx).map_err(violation)?;

        self.publish();
        Ok(self.registry.fields[idx].validation_state())
    }

    /// Disconnects the mutation watcher and drops the sinks and scheduler.
    /// Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.disconnect();
        }
        self.watcher = None;
        self.scheduler = None;
        self.form_state_sink = None;
        self.errors_sink = None;
        self.destroyed = true;
        self.span.in_scope(|| tracing::debug!("controller destroyed"));
    }

    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // ── Queries ─────────────────────────────────────────────────────

    pub fn form_state(&self) -> FormState {
        self.registry.snapshot(self.submit_state)
    }

    /// Errors of all attached fields.
    pub fn form_errors(&self) -> ErrorMap {
        self.registry.form_errors()
    }

    /// Errors flagged for display.
    pub fn displayed_errors(&self) -> ErrorMap {
        self.registry.displayed_errors()
    }

    /// The value map a successful submit would hand to the callback.
    pub fn form_values(&self) -> HashMap<String, FieldValue> {
        self.registry.values()
    }

    pub fn validation_state(&self) -> ValidationState {
        self.registry.aggregate_validation_state()
    }

    pub const fn submit_state(&self) -> SubmitState {
        self.submit_state
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.registry.get(name)
    }

    pub const fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub const fn defaults(&self) -> &ControllerDefaults {
        &self.defaults
    }

    pub const fn adapter(&self) -> &A {
        &self.form
    }

    /// Mutable access to the adapter, for hosts that drive the elements
    /// through it. Changes are picked up on the next event or reconcile.
    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.form
    }

    fn publish(&self) {
        if let Some(sink) = &self.form_state_sink {
            sink.set(self.form_state());
        }
        if let Some(sink) = &self.errors_sink {
            sink.set(self.displayed_errors());
        }
    }
}

impl<A: ElementAdapter> Drop for FormController<A> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<A: ElementAdapter> std::fmt::Debug for FormController<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("registry", &self.registry)
            .field("defaults", &self.defaults)
            .field("submit_state", &self.submit_state)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

/// Logs contract violations before they propagate.
fn violation(err: SvbmitError) -> SvbmitError {
    if err.is_contract_violation() {
        tracing::error!(error = %err, "contract violation");
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldSettings;
    use crate::memory::{ManualFrames, MemoryForm, MemoryWatcher};
    use crate::types::InputType;
    use crate::validators::required;

    fn controller(form: MemoryForm) -> FormController<MemoryForm> {
        FormController::new(FormConfig::new(form).on_submit(|_| {})).unwrap()
    }

    #[test]
    fn test_missing_on_submit_is_improperly_configured() {
        let err = FormController::new(FormConfig::new(MemoryForm::new())).unwrap_err();
        assert!(matches!(err, SvbmitError::ImproperlyConfigured(_)));
    }

    #[test]
    fn test_construction_sets_novalidate() {
        let c = controller(MemoryForm::new());
        assert!(c.adapter().is_novalidate());

        let config = FormConfig::new(MemoryForm::new())
            .on_submit(|_| {})
            .use_native_error_tooltips(true);
        let c = FormController::new(config).unwrap();
        assert!(!c.adapter().is_novalidate());
    }

    #[test]
    fn test_fields_start_pending() {
        let mut form = MemoryForm::new();
        form.add_input("a", InputType::Text);
        form.add_input("b", InputType::Text);
        let c = controller(form);
        assert_eq!(c.registry().len(), 2);
        assert!(c
            .registry()
            .iter()
            .all(|f| f.validation_state() == ValidationState::Pending));
        assert_eq!(c.validation_state(), ValidationState::Pending);
    }

    #[test]
    fn test_unknown_element() {
        let mut c = controller(MemoryForm::new());
        let err = c.handle_event(ElementId(99), FieldEvent::Input).unwrap_err();
        assert!(matches!(err, SvbmitError::UnknownElement(_)));
    }

    #[test]
    fn test_revalidate_unknown_field() {
        let mut c = controller(MemoryForm::new());
        assert!(matches!(c.revalidate("nope"), Err(SvbmitError::UnknownField(_))));
    }

    #[test]
    fn test_revalidate_does_not_display_untouched_error() {
        let mut form = MemoryForm::new();
        form.add_input("a", InputType::Text);
        let config = FormConfig::new(form)
            .on_submit(|_| {})
            .field("a", FieldSettings::new().validator(required()));
        let mut c = FormController::new(config).unwrap();
        assert_eq!(c.revalidate("a").unwrap(), ValidationState::Invalid);
        assert_eq!(c.form_errors().len(), 1);
        assert!(c.displayed_errors().is_empty());
    }

    #[test]
    fn test_notify_without_scheduler_reconciles_now() {
        let mut c = controller(MemoryForm::new());
        c.adapter_mut().add_input("late", InputType::Text);
        c.notify_mutation().unwrap();
        assert!(c.field("late").is_some());
        assert!(!c.on_frame().unwrap());
    }

    #[test]
    fn test_notify_with_scheduler_coalesces() {
        let frames = ManualFrames::new();
        let config = FormConfig::new(MemoryForm::new())
            .on_submit(|_| {})
            .frame_scheduler(frames.clone());
        let mut c = FormController::new(config).unwrap();

        c.adapter_mut().add_input("x", InputType::Text);
        c.notify_mutation().unwrap();
        c.adapter_mut().add_input("y", InputType::Text);
        c.notify_mutation().unwrap();
        assert_eq!(frames.requests(), 1);
        assert!(c.field("x").is_none());

        assert!(c.on_frame().unwrap());
        assert!(c.field("x").is_some());
        assert!(c.field("y").is_some());
        assert!(!c.on_frame().unwrap());
    }

    #[test]
    fn test_destroy_is_idempotent_and_disconnects() {
        let watcher = MemoryWatcher::new();
        let config = FormConfig::new(MemoryForm::new())
            .on_submit(|_| {})
            .mutation_watcher(watcher.clone());
        let mut c = FormController::new(config).unwrap();
        assert!(watcher.is_connected());

        c.destroy();
        c.destroy();
        assert!(!watcher.is_connected());
        assert!(c.is_destroyed());
        assert_eq!(c.submit().unwrap(), SubmitOutcome::Ignored);
        c.notify_mutation().unwrap();
        assert!(!c.on_frame().unwrap());
    }

    #[test]
    fn test_drop_disconnects_watcher() {
        let watcher = MemoryWatcher::new();
        let config = FormConfig::new(MemoryForm::new())
            .on_submit(|_| {})
            .mutation_watcher(watcher.clone());
        let c = FormController::new(config).unwrap();
        drop(c);
        assert!(!watcher.is_connected());
    }
}
