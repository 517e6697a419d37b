//! # svbmit
//!
//! A client-side form validation engine for Rust.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `svbmit` to get the entire engine, or depend on
//! individual crates for finer-grained control.

/// Error types, controller defaults, settings loading, and logging.
pub use svbmit_core as core;

/// Fields, the field registry, and the form controller.
#[cfg(feature = "forms")]
pub use svbmit_forms as forms;

/// State sinks and the subscribable `Store`.
#[cfg(feature = "signals")]
pub use svbmit_signals as signals;

pub use serde;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;

/// Everything needed to configure and drive a form controller.
pub mod prelude {
    pub use svbmit_core::logging::setup_logging;
    pub use svbmit_core::{ControllerDefaults, PartialDefaults, Settings, SvbmitError, SvbmitResult, ValidationError};

    #[cfg(feature = "forms")]
    pub use svbmit_forms::prelude::*;

    #[cfg(feature = "signals")]
    pub use svbmit_signals::{StateSink, Store};
}
