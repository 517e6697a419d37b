//! An in-memory form document.
//!
//! [`MemoryForm`] implements [`ElementAdapter`] over a list of simulated
//! elements, so the controller can be driven without a browser. It emulates
//! the `required` constraint the way a browser does (a radio group is missing
//! a value until any option is checked); every other constraint is set
//! explicitly through [`MemoryForm::set_validity`].
//!
//! [`MemoryWatcher`] and [`ManualFrames`] are the matching host hooks. Both
//! are cheap handles whose clones share state, so a test keeps one clone and
//! hands the other to the controller.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::adapter::{ElementAdapter, ElementId, ElementState, FrameScheduler, MutationWatcher, ValidityFlags};
use crate::types::{InputType, NativeValidationError};

#[derive(Debug, Clone)]
struct MemoryElement {
    id: ElementId,
    state: ElementState,
    classes: BTreeSet<String>,
    attached: bool,
    required: bool,
    validity: Option<ValidityFlags>,
}

/// A simulated form element tree.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    elements: Vec<MemoryElement>,
    next_id: u64,
    novalidate: bool,
}

impl MemoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, state: ElementState) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.elements.push(MemoryElement {
            id,
            state,
            classes: BTreeSet::new(),
            attached: true,
            required: false,
            validity: None,
        });
        id
    }

    fn element(&self, id: ElementId) -> Option<&MemoryElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut MemoryElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Appends an element of the given type with an empty value.
    pub fn add_input(&mut self, name: &str, input_type: InputType) -> ElementId {
        self.push(ElementState::new(name, input_type))
    }

    /// Appends one option of a radio group.
    pub fn add_radio(&mut self, name: &str, value: &str) -> ElementId {
        let mut state = ElementState::new(name, InputType::Radio);
        state.value = value.to_string();
        self.push(state)
    }

    pub fn add_checkbox(&mut self, name: &str) -> ElementId {
        let mut state = ElementState::new(name, InputType::Checkbox);
        state.value = "on".to_string();
        self.push(state)
    }

    pub fn add_submit(&mut self, name: &str) -> ElementId {
        self.push(ElementState::new(name, InputType::Submit))
    }

    pub fn set_value(&mut self, id: ElementId, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.state.value = value.to_string();
        }
    }

    /// Sets the check state. Checking a radio unchecks the rest of its group.
    pub fn set_checked(&mut self, id: ElementId, checked: bool) {
        let Some(target) = self.element(id) else {
            return;
        };
        let radio_group = (target.state.input_type == InputType::Radio && checked)
            .then(|| target.state.name.clone());

        for element in &mut self.elements {
            if element.id == id {
                element.state.checked = checked;
            } else if let Some(group) = &radio_group {
                if element.state.input_type == InputType::Radio && &element.state.name == group {
                    element.state.checked = false;
                }
            }
        }
    }

    /// Sets the selected options of a multi-select.
    pub fn set_selected(&mut self, id: ElementId, selected: &[&str]) {
        if let Some(element) = self.element_mut(id) {
            element.state.selected = selected.iter().map(ToString::to_string).collect();
        }
    }

    pub fn set_required(&mut self, id: ElementId, required: bool) {
        if let Some(element) = self.element_mut(id) {
            element.required = required;
        }
    }

    /// Overrides the element's validity flags; `None` restores emulation.
    pub fn set_validity(&mut self, id: ElementId, validity: Option<ValidityFlags>) {
        if let Some(element) = self.element_mut(id) {
            element.validity = validity;
        }
    }

    /// Detaches an element from the document.
    pub fn remove(&mut self, id: ElementId) {
        if let Some(element) = self.element_mut(id) {
            element.attached = false;
        }
    }

    /// Re-attaches a previously removed element.
    pub fn restore(&mut self, id: ElementId) {
        if let Some(element) = self.element_mut(id) {
            element.attached = true;
        }
    }

    pub fn classes(&self, id: ElementId) -> Vec<String> {
        self.element(id)
            .map(|e| e.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.classes.contains(class))
    }

    pub const fn is_novalidate(&self) -> bool {
        self.novalidate
    }

    fn value_missing(&self, element: &MemoryElement) -> bool {
        let state = &element.state;
        match state.input_type {
            InputType::Radio => {
                let group = self
                    .elements
                    .iter()
                    .filter(|e| e.attached && e.state.input_type == InputType::Radio && e.state.name == state.name);
                let (mut required, mut checked) = (false, false);
                for e in group {
                    required |= e.required;
                    checked |= e.state.checked;
                }
                required && !checked
            }
            _ if !element.required => false,
            InputType::Checkbox => !state.checked,
            InputType::SelectMultiple => state.selected.is_empty(),
            _ => state.value.is_empty(),
        }
    }
}

impl ElementAdapter for MemoryForm {
    fn form_elements(&self) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.attached)
            .map(|e| e.id)
            .collect()
    }

    fn element_state(&self, id: ElementId) -> Option<ElementState> {
        let element = self.element(id).filter(|e| e.attached)?;
        let mut state = element.state.clone();
        state.validity = match &element.validity {
            Some(flags) => *flags,
            None if self.value_missing(element) => ValidityFlags::failing(NativeValidationError::ValueMissing),
            None => ValidityFlags::valid(),
        };
        Some(state)
    }

    fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(|e| e.attached)
    }

    fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(element) = self.element_mut(id) {
            element.classes.insert(class.to_string());
        }
    }

    fn remove_classes(&mut self, id: ElementId, classes: &[&str]) {
        if let Some(element) = self.element_mut(id) {
            for class in classes {
                element.classes.remove(*class);
            }
        }
    }

    fn set_novalidate(&mut self, novalidate: bool) {
        self.novalidate = novalidate;
    }
}

/// A mutation watcher that only records whether it is connected.
#[derive(Debug, Clone, Default)]
pub struct MemoryWatcher {
    connected: Arc<AtomicBool>,
}

impl MemoryWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl MutationWatcher for MemoryWatcher {
    fn observe(&mut self) {
        self.connected.store(true, Ordering::SeqCst);
    }

    fn disconnect(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// A frame scheduler that counts requests; the test drives the frames.
#[derive(Debug, Clone, Default)]
pub struct ManualFrames {
    requests: Arc<AtomicUsize>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames requested so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&mut self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}
