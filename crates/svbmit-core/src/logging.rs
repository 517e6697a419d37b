//! Logging integration for svbmit.
//!
//! Provides a helper for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and a span constructor that ties
//! every log line emitted by one form controller together.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

/// Crates whose events a bare level in `settings.log_level` applies to.
const ENGINE_TARGETS: [&str; 3] = ["svbmit_core", "svbmit_forms", "svbmit_signals"];

/// Level for every other target when `log_level` is a bare level.
const HOST_LEVEL: &str = "warn";

/// Sets up the global tracing subscriber based on the given settings.
///
/// A bare level such as `"debug"` applies to the engine crates only, while
/// the rest of the host stays at `warn`. Anything else is taken as a full
/// filter directive. Debug mode logs human-readable lines with source
/// locations; otherwise each event is one JSON object carrying the `form`
/// span it was emitted in. Installing a subscriber twice is a no-op.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;

    let filter = engine_filter(&settings.log_level);
    let builder = fmt::Subscriber::builder().with_env_filter(filter).with_target(true);

    let installed = if settings.debug {
        builder.with_file(true).with_line_number(true).pretty().try_init()
    } else {
        builder.json().with_current_span(true).with_span_list(false).try_init()
    };
    if installed.is_ok() {
        tracing::debug!(filter = %settings.log_level, json = !settings.debug, "logging installed");
    }
}

/// Builds the filter for `log_level`, falling back to `info` for the engine
/// when the directive does not parse.
fn engine_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(filter_directives(log_level))
        .unwrap_or_else(|_| EnvFilter::new(filter_directives("info")))
}

fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    if level.parse::<LevelFilter>().is_err() {
        return level.to_string();
    }
    let mut directives = vec![HOST_LEVEL.to_string()];
    directives.extend(ENGINE_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

/// Creates a tracing span for one form controller.
///
/// # Examples
///
/// ```
/// use svbmit_core::logging::form_span;
///
/// let span = form_span("signup");
/// let _guard = span.enter();
/// tracing::info!("validating");
/// ```
pub fn form_span(form_id: &str) -> tracing::Span {
    tracing::debug_span!("form", id = form_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_logging_twice_is_harmless() {
        let settings = Settings {
            log_level: "not a [valid filter".into(),
            ..Settings::default()
        };
        setup_logging(&settings);
        setup_logging(&Settings::default());
    }

    #[test]
    fn test_bare_level_is_scoped_to_engine() {
        assert_eq!(
            filter_directives("debug"),
            "warn,svbmit_core=debug,svbmit_forms=debug,svbmit_signals=debug"
        );
        assert_eq!(
            filter_directives(" TRACE "),
            "warn,svbmit_core=TRACE,svbmit_forms=TRACE,svbmit_signals=TRACE"
        );
    }

    #[test]
    fn test_full_directive_is_kept() {
        assert_eq!(filter_directives("my_app=info,svbmit_forms=trace"), "my_app=info,svbmit_forms=trace");
    }

    #[test]
    fn test_unparsable_directive_falls_back() {
        let filter = engine_filter("svbmit_forms=loudest");
        assert!(filter.to_string().contains("svbmit_forms=info"));
    }

    #[test]
    fn test_form_span_enter() {
        let span = form_span("contact");
        let _guard = span.enter();
        tracing::debug!("inside form span");
    }
}
