//! # svbmit-forms
//!
//! The form validation engine. A [`FormController`](controller::FormController)
//! attaches to a form through an [`ElementAdapter`](adapter::ElementAdapter),
//! keeps one [`Field`](field::Field) per named element (radio options collapse
//! into one field), and computes group fields such as password confirmation
//! from other fields' values.
//!
//! ## Modules
//!
//! - [`types`] - Validation/submit states, events, input types, native errors
//! - [`value`] - Field values
//! - [`adapter`] - Host collaborator traits and element-state resolution
//! - [`memory`] - In-memory adapter, watcher, and frame scheduler
//! - [`validators`] - Validator contract and built-in validators
//! - [`field`] - Leaf and group fields
//! - [`registry`] - Field registry, reconciliation, and aggregation
//! - [`coalesce`] - Mutation-signal coalescing
//! - [`config`] - Controller configuration
//! - [`state`] - Published state snapshots
//! - [`controller`] - The form controller

pub mod adapter;
pub mod coalesce;
pub mod config;
pub mod controller;
pub mod field;
pub mod memory;
pub mod registry;
pub mod state;
pub mod types;
pub mod validators;
pub mod value;

mod validation;

/// Commonly used types, for glob import.
pub mod prelude {
    pub use crate::adapter::{ElementAdapter, ElementId, ElementState, FrameScheduler, MutationWatcher, ValidityFlags};
    pub use crate::config::{FieldSettings, FormConfig};
    pub use crate::controller::{FormController, SubmitOutcome};
    pub use crate::field::Field;
    pub use crate::memory::{ManualFrames, MemoryForm, MemoryWatcher};
    pub use crate::state::{ErrorMap, FieldError, FieldState, FormState};
    pub use crate::types::{FieldEvent, InputType, NativeValidationError, SubmitState, ValidateOn, ValidationState};
    pub use crate::validators::Verdict;
    pub use crate::value::FieldValue;
}
