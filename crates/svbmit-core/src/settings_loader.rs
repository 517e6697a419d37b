//! Settings loading from configuration files.
//!
//! Loads [`Settings`] from TOML or JSON and applies environment variable
//! overrides on top.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `SVBMIT_DEBUG` | `debug` |
//! | `SVBMIT_LOG_LEVEL` | `log_level` |
//! | `SVBMIT_VALID_CLASS` | `defaults.valid_class` |
//! | `SVBMIT_INVALID_CLASS` | `defaults.invalid_class` |
//! | `SVBMIT_VALIDATE_ON` | `defaults.validate_on` |
//!
//! ## Examples
//!
//! ```
//! use svbmit_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_str(r#"
//!     [defaults]
//!     valid_class = "is-valid"
//! "#).unwrap();
//! assert_eq!(settings.defaults.valid_class, "is-valid");
//! assert_eq!(settings.defaults.invalid_class, "invalid");
//! ```

use std::path::Path;

use crate::error::SvbmitError;
use crate::settings::{Settings, ValidateOn};

/// Loads settings from a TOML string. Missing keys keep their defaults.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, SvbmitError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| SvbmitError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, SvbmitError> {
    let content = read_file(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SvbmitError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Loads settings from a JSON string. Missing keys keep their defaults.
pub fn from_json_str(json_str: &str) -> Result<Settings, SvbmitError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| SvbmitError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, SvbmitError> {
    let content = read_file(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Result<Settings, SvbmitError> {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Applies environment variable overrides to a settings struct.
///
/// `SVBMIT_DEBUG` accepts "true"/"1"/"yes"; anything else means false.
/// An unknown `SVBMIT_VALIDATE_ON` policy is a configuration error.
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), SvbmitError> {
    if let Ok(val) = std::env::var("SVBMIT_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("SVBMIT_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("SVBMIT_VALID_CLASS") {
        settings.defaults.valid_class = val;
    }

    if let Ok(val) = std::env::var("SVBMIT_INVALID_CLASS") {
        settings.defaults.invalid_class = val;
    }

    if let Ok(val) = std::env::var("SVBMIT_VALIDATE_ON") {
        settings.defaults.validate_on = val.parse::<ValidateOn>()?;
    }

    Ok(())
}

// ============================================================
// Helpers
// ============================================================

fn read_file(path: &Path, format: &str) -> Result<String, SvbmitError> {
    std::fs::read_to_string(path).map_err(|e| {
        SvbmitError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, SvbmitError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        SvbmitError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        SvbmitError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "svbmit_forms=trace"

            [defaults]
            validate_on = "BLUR"
            add_valid_class_to_all_inputs = true
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "svbmit_forms=trace");
        assert_eq!(settings.defaults.validate_on, ValidateOn::Blur);
        assert!(settings.defaults.add_valid_class_to_all_inputs);
        // Defaults preserved
        assert_eq!(settings.defaults.valid_class, "valid");
        assert!(settings.defaults.remove_validation_classes_on_submit);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_malformed() {
        let err = from_toml_str("debug = ").unwrap_err();
        assert!(matches!(err, SvbmitError::ConfigurationError(_)));
    }

    #[test]
    fn test_from_toml_str_unknown_policy() {
        let toml = r#"
            [defaults]
            validate_on = "WHENEVER"
        "#;
        assert!(from_toml_str(toml).is_err());
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{"defaults": {"invalid_class": "is-invalid", "use_native_error_tooltips": true}}"#;
        let settings = from_json_str(json).unwrap();
        assert_eq!(settings.defaults.invalid_class, "is-invalid");
        assert!(settings.defaults.use_native_error_tooltips);
        assert_eq!(settings.defaults.valid_class, "valid");
        assert!(settings.debug);
    }

    #[test]
    fn test_from_json_str_malformed() {
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = from_toml_file("/nonexistent/svbmit.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    // ── Helpers ─────────────────────────────────────────────────────

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}, "d": 3});
        let over = serde_json::json!({"a": {"c": 20}});
        let merged = merge_json(base, over);
        assert_eq!(merged, serde_json::json!({"a": {"b": 1, "c": 20}, "d": 3}));
    }

    #[test]
    fn test_toml_to_json_array() {
        let value: toml::Value = toml::from_str("xs = [1, 2]").unwrap();
        assert_eq!(toml_to_json(value), serde_json::json!({"xs": [1, 2]}));
    }
}
