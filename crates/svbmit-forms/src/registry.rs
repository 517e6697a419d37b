//! The ordered collection of fields, keyed by name.
//!
//! Besides lookup, the registry owns two pieces of cross-field logic:
//!
//! - **Reconciliation** against the element set the adapter currently
//!   reports: radio options are grouped by name, existing fields are pointed
//!   at their new elements, new elements get new leaf fields, and fields whose
//!   elements have all disappeared are orphaned (declared fields) or dropped.
//! - **Aggregation** of per-field state into form-level state, excluding
//!   detached fields.

use std::collections::{HashMap, HashSet};

use svbmit_core::{SvbmitResult, ValidateOn};

use crate::adapter::{resolve_elements, ElementAdapter, ElementId, ElementState};
use crate::field::{Field, FieldKind};
use crate::state::{ErrorMap, FieldState, FormState};
use crate::types::{InputType, SubmitState, ValidationState};
use crate::value::FieldValue;

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Fields created for newly observed elements.
    pub created: Vec<String>,
    /// Existing fields pointed at the current element references.
    pub updated: Vec<String>,
    /// Fields whose elements all disappeared.
    pub orphaned: Vec<String>,
    /// Orphaned fields dropped from the registry.
    pub removed: Vec<String>,
}

impl ReconcileReport {
    /// No field was created, orphaned, or removed.
    pub fn is_structurally_unchanged(&self) -> bool {
        self.created.is_empty() && self.orphaned.is_empty() && self.removed.is_empty()
    }
}

/// One logical element set: a single element, or every option of a radio group.
struct ElementSet {
    name: String,
    radio: bool,
    ids: Vec<ElementId>,
    states: Vec<ElementState>,
}

/// Ordered collection of fields.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    pub(crate) fields: Vec<Field>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub(crate) fn index_of_element(&self, element: ElementId) -> Option<usize> {
        self.fields.iter().position(|f| f.owns_element(element))
    }

    pub(crate) fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Leaf indices first, then group indices, each in registry order.
    /// Groups go last so they observe up-to-date children.
    pub(crate) fn leaves_then_groups(&self) -> Vec<usize> {
        let (groups, leaves): (Vec<usize>, Vec<usize>) =
            (0..self.fields.len()).partition(|&i| self.fields[i].is_group());
        leaves.into_iter().chain(groups).collect()
    }

    /// The group listing `name` among its children. A field belongs to at
    /// most one group.
    pub fn parent_group_of(&self, name: &str) -> Option<&Field> {
        self.parent_index_of(name).map(|i| &self.fields[i])
    }

    pub(crate) fn parent_index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| {
            f.as_group()
                .is_some_and(|g| g.children.iter().any(|c| c == name))
        })
    }

    /// A leaf without elements, or a group with a missing or orphaned child.
    /// Detached fields are left out of aggregation, snapshots, and values.
    pub fn is_detached(&self, field: &Field) -> bool {
        match &field.kind {
            FieldKind::Leaf(leaf) => leaf.elements.is_empty(),
            FieldKind::Group(group) => group
                .children
                .iter()
                .any(|child| self.get(child).map_or(true, Field::is_orphan)),
        }
    }

    /// Current values of a group's children, keyed by child name.
    pub(crate) fn group_values(&self, children: &[String]) -> HashMap<String, FieldValue> {
        children
            .iter()
            .filter_map(|child| {
                self.get(child)
                    .map(|f| (child.clone(), f.value.clone()))
            })
            .collect()
    }

    /// A field's value, recomputed from the children for groups.
    pub(crate) fn current_value(&self, field: &Field) -> FieldValue {
        match &field.kind {
            FieldKind::Leaf(_) => field.value.clone(),
            FieldKind::Group(group) => (group.compute_value)(&self.group_values(&group.children)),
        }
    }

    // ── Aggregation ─────────────────────────────────────────────────

    /// `INVALID` if any attached field is invalid, `VALID` if all are valid,
    /// otherwise `PENDING`.
    pub fn aggregate_validation_state(&self) -> ValidationState {
        let mut state = ValidationState::Valid;

        for field in self.fields.iter().filter(|f| !self.is_detached(f)) {
            match field.validation_state {
                ValidationState::Invalid => return ValidationState::Invalid,
                ValidationState::Pending => state = ValidationState::Pending,
                ValidationState::Valid => {}
            }
        }

        state
    }

    /// Builds the published snapshot. Group entries are computed after the
    /// leaves so their values reflect the children.
    pub fn snapshot(&self, submit_state: SubmitState) -> FormState {
        let mut fields = HashMap::new();

        for idx in self.leaves_then_groups() {
            let field = &self.fields[idx];
            if self.is_detached(field) {
                continue;
            }

            let group_validation_state = if field.is_group() {
                None
            } else {
                self.parent_group_of(&field.name)
                    .map(|parent| parent.validation_state)
            };

            fields.insert(
                field.name.clone(),
                FieldState {
                    value: self.current_value(field),
                    validation_state: field.validation_state,
                    error: field.error.clone(),
                    touched: field.touched,
                    group_validation_state,
                },
            );
        }

        FormState {
            submit_state,
            validation_state: self.aggregate_validation_state(),
            touched: self.fields.iter().any(|f| f.touched),
            fields,
        }
    }

    /// Errors of all attached fields.
    pub fn form_errors(&self) -> ErrorMap {
        self.fields
            .iter()
            .filter(|f| !self.is_detached(f))
            .filter_map(|f| f.error.clone().map(|e| (f.name.clone(), e)))
            .collect()
    }

    /// Errors of attached fields that are flagged for display.
    pub fn displayed_errors(&self) -> ErrorMap {
        self.fields
            .iter()
            .filter(|f| !self.is_detached(f) && f.display_error())
            .filter_map(|f| f.error.clone().map(|e| (f.name.clone(), e)))
            .collect()
    }

    /// Values of attached leaf fields, as handed to the submit callback.
    pub fn values(&self) -> HashMap<String, FieldValue> {
        self.fields
            .iter()
            .filter(|f| !f.is_group() && !f.is_orphan())
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect()
    }

    // ── Reconciliation ──────────────────────────────────────────────

    /// Brings the field set in line with the elements the adapter reports.
    pub(crate) fn reconcile(
        &mut self,
        adapter: &dyn ElementAdapter,
        default_policy: ValidateOn,
    ) -> SvbmitResult<ReconcileReport> {
        let mut report = ReconcileReport::default();
        let mut seen = HashSet::new();

        for set in collect_element_sets(adapter) {
            let Some(resolved) = resolve_elements(&set.states)? else {
                continue;
            };

            match self.index_of(&set.name) {
                Some(idx) if self.fields[idx].is_group() => {
                    tracing::warn!(
                        field = %set.name,
                        "element name collides with a group field; element ignored"
                    );
                }
                Some(idx) => {
                    self.fields[idx].attach(set.ids, resolved);
                    report.updated.push(set.name.clone());
                }
                None => {
                    let mut field = Field::leaf(set.name.clone(), default_policy);
                    field.attach(set.ids, resolved);
                    tracing::debug!(field = %set.name, "field created");
                    self.fields.push(field);
                    report.created.push(set.name.clone());
                }
            }

            seen.insert(set.name);
        }

        for field in &mut self.fields {
            let Some(leaf) = field.as_leaf() else {
                continue;
            };
            if leaf.elements.is_empty() || seen.contains(&field.name) {
                continue;
            }
            // Only orphan a field once every backing element is confirmed gone.
            if leaf.elements.iter().all(|&id| !adapter.contains(id)) {
                tracing::debug!(field = %field.name, "field orphaned");
                field.detach();
                report.orphaned.push(field.name.clone());
            }
        }

        report.removed = self.remove_orphans();
        Ok(report)
    }

    /// Drops orphaned leaf fields that were not declared in settings.
    /// Declared fields stay, so their settings survive the element coming back.
    pub fn remove_orphans(&mut self) -> Vec<String> {
        let mut removed = Vec::new();
        self.fields.retain(|field| {
            let drop = field.is_orphan() && !field.declared;
            if drop {
                tracing::debug!(field = %field.name, "field removed");
                removed.push(field.name.clone());
            }
            !drop
        });
        removed
    }
}

/// Reads the adapter's elements into logical sets, in document order.
fn collect_element_sets(adapter: &dyn ElementAdapter) -> Vec<ElementSet> {
    let mut sets: Vec<ElementSet> = Vec::new();

    for id in adapter.form_elements() {
        let Some(state) = adapter.element_state(id) else {
            continue;
        };
        if state.input_type == InputType::Submit || state.name.is_empty() {
            continue;
        }

        let radio = state.input_type == InputType::Radio;
        if let Some(set) = sets.iter_mut().find(|s| s.name == state.name) {
            if radio && set.radio {
                set.ids.push(id);
                set.states.push(state);
            } else {
                tracing::warn!(
                    field = %state.name,
                    "duplicate element name; only the first element is tracked"
                );
            }
            continue;
        }

        sets.push(ElementSet {
            name: state.name.clone(),
            radio,
            ids: vec![id],
            states: vec![state],
        });
    }

    sets
}
