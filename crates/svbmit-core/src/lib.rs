//! # svbmit-core
//!
//! Core types, settings, and error types for svbmit.
//! This crate has no framework dependencies and provides the foundation for
//! the other crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Controller defaults and host settings
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{SvbmitError, SvbmitResult, ValidationError};
pub use settings::{ControllerDefaults, PartialDefaults, Settings, ValidateOn};
