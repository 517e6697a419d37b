//! The per-field state machine.
//!
//! Events move a field between `PENDING`, `VALID`, and `INVALID` according to
//! its validate-on policy. Every verdict is committed through
//! [`FieldRegistry::commit`], which also applies the CSS classes and lets a
//! group re-validate when one of its children changes.

use svbmit_core::{ControllerDefaults, SvbmitResult, ValidateOn};

use crate::adapter::{resolve_elements, ElementAdapter, ResolvedElements};
use crate::field::FieldKind;
use crate::registry::FieldRegistry;
use crate::state::FieldError;
use crate::types::{FieldEvent, SubmitState, ValidationState};
use crate::validators::run_validators;

/// What a state transition may touch outside the registry.
pub(crate) struct Effects<'a> {
    pub adapter: &'a mut dyn ElementAdapter,
    pub defaults: &'a ControllerDefaults,
    pub submit_state: SubmitState,
}

type Verdict = (ValidationState, Option<FieldError>);

impl FieldRegistry {
    /// Routes one event to the field at `idx`. Events for orphaned leaves
    /// are dropped.
    pub(crate) fn dispatch(&mut self, idx: usize, event: FieldEvent, fx: &mut Effects<'_>) -> SvbmitResult<()> {
        let field = &self.fields[idx];
        if field.is_orphan() {
            tracing::trace!(field = %field.name, ?event, "event on orphaned field ignored");
            return Ok(());
        }
        tracing::trace!(field = %field.name, ?event, "field event");

        match event {
            FieldEvent::Input => {
                self.fields[idx].touched = true;
                self.refresh_value(idx, fx)?;
                self.clear(idx, fx)?;

                let (policy, submitted) = (self.fields[idx].validate_on, self.fields[idx].has_submitted);
                match policy {
                    ValidateOn::Instant => self.validate(idx, fx)?,
                    ValidateOn::InstantAfterSubmit if submitted => self.validate(idx, fx)?,
                    ValidateOn::InstantValid => {
                        if let Some((ValidationState::Valid, _)) = self.evaluate(idx, fx)? {
                            self.commit(idx, ValidationState::Valid, None, fx)?;
                        }
                    }
                    _ => {}
                }
            }
            FieldEvent::Blur => {
                let field = &self.fields[idx];
                if field.is_radio() {
                    return Ok(());
                }
                let wants_blur = matches!(field.validate_on, ValidateOn::Blur | ValidateOn::Instant);
                if wants_blur && field.validation_state != ValidationState::Valid {
                    self.validate(idx, fx)?;
                }
            }
            FieldEvent::Focus => {}
            FieldEvent::Submit => {
                self.fields[idx].has_submitted = true;
                self.refresh_value(idx, fx)?;
                self.validate(idx, fx)?;
            }
        }

        Ok(())
    }

    /// Evaluates the field and commits the verdict, if there is one.
    pub(crate) fn validate(&mut self, idx: usize, fx: &mut Effects<'_>) -> SvbmitResult<()> {
        match self.evaluate(idx, fx)? {
            Some((state, error)) => self.commit(idx, state, error, fx),
            None => Ok(()),
        }
    }

    /// Re-reads a leaf's value from its elements, or recomputes a group's
    /// value from its children.
    pub(crate) fn refresh_value(&mut self, idx: usize, fx: &Effects<'_>) -> SvbmitResult<()> {
        if self.fields[idx].is_group() {
            let value = self.current_value(&self.fields[idx]);
            self.fields[idx].value = value;
            return Ok(());
        }

        if let Some(resolved) = self.read_elements(idx, &*fx.adapter)? {
            let field = &mut self.fields[idx];
            field.value = resolved.value;
            if let FieldKind::Leaf(leaf) = &mut field.kind {
                leaf.native_error = resolved.native_error;
            }
        }
        Ok(())
    }

    /// Computes a verdict without committing it.
    ///
    /// A leaf's native error takes precedence over its validators. A leaf
    /// none of whose elements are in the document yields no verdict; it keeps
    /// its state until reconciliation orphans it. A group stays `PENDING`
    /// until every child exists and is `VALID`; only then is its value
    /// recomputed and its validators run.
    pub(crate) fn evaluate(&mut self, idx: usize, fx: &Effects<'_>) -> SvbmitResult<Option<Verdict>> {
        match &self.fields[idx].kind {
            FieldKind::Group(group) => {
                let ready = group.children.iter().all(|child| {
                    self.get(child).is_some_and(|f| {
                        !f.is_orphan() && f.validation_state == ValidationState::Valid
                    })
                });
                if !ready {
                    return Ok(Some((ValidationState::Pending, None)));
                }
                self.refresh_value(idx, fx)?;
            }
            FieldKind::Leaf(_) => {
                let Some(resolved) = self.read_elements(idx, &*fx.adapter)? else {
                    tracing::trace!(field = %self.fields[idx].name, "no live elements, verdict skipped");
                    return Ok(None);
                };
                let native = resolved.native_error;
                if let FieldKind::Leaf(leaf) = &mut self.fields[idx].kind {
                    leaf.native_error = native;
                }
                if let Some(native) = native {
                    return Ok(Some((ValidationState::Invalid, Some(FieldError::Native(native)))));
                }
            }
        }

        let snapshot = self.snapshot(fx.submit_state);
        let field = &self.fields[idx];
        let verdict = match run_validators(&field.name, &field.validators, &field.value, &snapshot)? {
            Some(err) => (ValidationState::Invalid, Some(FieldError::Custom(err))),
            None => (ValidationState::Valid, None),
        };
        Ok(Some(verdict))
    }

    /// Records a verdict and applies its side effects.
    ///
    /// - A leaf gets its CSS classes updated. A leaf inside a group has its
    ///   classes cleared on `VALID` instead, since the group paints them once
    ///   it reaches its own verdict, and then asks the group to re-validate.
    /// - A group with a definite verdict paints all its children.
    pub(crate) fn commit(
        &mut self,
        idx: usize,
        state: ValidationState,
        error: Option<FieldError>,
        fx: &mut Effects<'_>,
    ) -> SvbmitResult<()> {
        let field = &mut self.fields[idx];
        if field.validation_state != state {
            tracing::debug!(field = %field.name, from = %field.validation_state, to = %state, "validation state changed");
        }
        field.set_verdict(state, error);

        if let Some(group) = self.fields[idx].as_group() {
            if state != ValidationState::Pending {
                for child in &group.children {
                    if let Some(child_idx) = self.index_of(child) {
                        self.paint(child_idx, Some(state), fx);
                    }
                }
            }
            return Ok(());
        }

        if self.fields[idx].is_orphan() {
            return Ok(());
        }

        let parent = self.parent_index_of(&self.fields[idx].name);
        if parent.is_some() && state == ValidationState::Valid {
            self.paint(idx, None, fx);
        } else {
            self.paint(idx, Some(state), fx);
        }

        match parent {
            Some(parent_idx) => self.validate(parent_idx, fx),
            None => Ok(()),
        }
    }

    /// Resets a field to `PENDING`. Leaves go through [`commit`](Self::commit)
    /// so their classes and parent group follow.
    pub(crate) fn clear(&mut self, idx: usize, fx: &mut Effects<'_>) -> SvbmitResult<()> {
        if self.fields[idx].is_group() {
            self.fields[idx].reset_validation();
            Ok(())
        } else {
            self.commit(idx, ValidationState::Pending, None, fx)
        }
    }

    /// Removes the validation classes from a leaf's elements, then adds the
    /// class matching `state`. `None` and `PENDING` leave the element bare.
    pub(crate) fn paint(&self, idx: usize, state: Option<ValidationState>, fx: &mut Effects<'_>) {
        let Some(leaf) = self.fields[idx].as_leaf() else {
            return;
        };
        let defaults = fx.defaults;
        let classes = validation_classes(defaults);
        let show_valid = defaults.add_valid_class_to_all_inputs
            || !leaf.input_type.as_ref().is_some_and(|t| t.is_valid_class_exempt());

        for &element in &leaf.elements {
            fx.adapter.remove_classes(element, &classes);
            match state {
                Some(ValidationState::Invalid) if !defaults.invalid_class.is_empty() => {
                    fx.adapter.add_class(element, &defaults.invalid_class);
                }
                Some(ValidationState::Valid) if show_valid && !defaults.valid_class.is_empty() => {
                    fx.adapter.add_class(element, &defaults.valid_class);
                }
                _ => {}
            }
        }
    }

    /// Strips the validation classes from every tracked element.
    pub(crate) fn clear_all_classes(&self, fx: &mut Effects<'_>) {
        for idx in 0..self.fields.len() {
            self.paint(idx, None, fx);
        }
    }

    /// Reads the states of a leaf's elements that still exist.
    fn read_elements(&self, idx: usize, adapter: &dyn ElementAdapter) -> SvbmitResult<Option<ResolvedElements>> {
        let Some(leaf) = self.fields[idx].as_leaf() else {
            return Ok(None);
        };
        let states: Vec<_> = leaf
            .elements
            .iter()
            .filter_map(|&id| adapter.element_state(id))
            .collect();
        resolve_elements(&states)
    }
}

fn validation_classes(defaults: &ControllerDefaults) -> Vec<&str> {
    [defaults.valid_class.as_str(), defaults.invalid_class.as_str()]
        .into_iter()
        .filter(|class| !class.is_empty())
        .collect()
}
