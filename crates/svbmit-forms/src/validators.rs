//! Custom validators and computed values.
//!
//! A validator is a pure function of a field's value and a snapshot of the
//! form state. It returns a [`Verdict`]; validators run in declaration order
//! and the first rejection becomes the field's error.
//!
//! Validators must answer synchronously. A validator that returns
//! [`Verdict::Deferred`] breaks that contract and the engine reports
//! [`SvbmitError::DeferredValidator`] instead of retrying.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use svbmit_core::{SvbmitError, SvbmitResult, ValidationError};

use crate::state::FormState;
use crate::value::FieldValue;

/// The answer of a single validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value is acceptable.
    Valid,
    /// The value is rejected with the given descriptor.
    Invalid(ValidationError),
    /// The validator could not answer synchronously.
    Deferred,
}

impl From<Result<(), ValidationError>> for Verdict {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Self::Valid,
            Err(err) => Self::Invalid(err),
        }
    }
}

impl From<bool> for Verdict {
    /// `false` rejects with a generic `"invalid"` descriptor.
    fn from(ok: bool) -> Self {
        if ok {
            Self::Valid
        } else {
            Self::Invalid(ValidationError::new("Enter a valid value.", "invalid"))
        }
    }
}

/// A validator function.
pub type Validator = Arc<dyn Fn(&FieldValue, &FormState) -> Verdict + Send + Sync>;

/// Computes a group field's value from its children's values.
pub type ComputeFn = Arc<dyn Fn(&HashMap<String, FieldValue>) -> FieldValue + Send + Sync>;

/// Runs validators in order, stopping at the first rejection.
///
/// Returns `Ok(None)` when every validator accepts the value.
pub fn run_validators(
    field: &str,
    validators: &[Validator],
    value: &FieldValue,
    form_state: &FormState,
) -> SvbmitResult<Option<ValidationError>> {
    for validator in validators {
        match validator(value, form_state) {
            Verdict::Valid => {}
            Verdict::Invalid(err) => return Ok(Some(err)),
            Verdict::Deferred => {
                return Err(SvbmitError::DeferredValidator {
                    field: field.to_string(),
                })
            }
        }
    }
    Ok(None)
}

/// Wraps a closure as a [`Validator`].
///
/// # Examples
///
/// ```
/// use svbmit_forms::validators::{custom, Verdict};
/// use svbmit_forms::state::FormState;
/// use svbmit_forms::value::FieldValue;
///
/// let even = custom(|value, _state| {
///     let n: i64 = value.as_str().and_then(|s| s.parse().ok()).unwrap_or(1);
///     (n % 2 == 0).into()
/// });
/// assert_eq!(even(&FieldValue::from("4"), &FormState::empty()), Verdict::Valid);
/// ```
pub fn custom<F>(f: F) -> Validator
where
    F: Fn(&FieldValue, &FormState) -> Verdict + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Rejects empty values (empty text, empty list, null, unchecked checkbox).
pub fn required() -> Validator {
    custom(|value, _| {
        let missing = value.is_empty() || value.as_bool() == Some(false);
        if missing {
            Verdict::Invalid(ValidationError::new("This field is required.", "required"))
        } else {
            Verdict::Valid
        }
    })
}

/// Rejects text shorter than `min` characters. Empty values pass.
pub fn min_length(min: usize) -> Validator {
    custom(move |value, _| match value.as_str() {
        Some(s) if !s.is_empty() && s.chars().count() < min => Verdict::Invalid(
            ValidationError::new(
                format!("Ensure this value has at least {min} characters."),
                "min_length",
            )
            .with_param("min", min.to_string()),
        ),
        _ => Verdict::Valid,
    })
}

/// Rejects text longer than `max` characters.
pub fn max_length(max: usize) -> Validator {
    custom(move |value, _| match value.as_str() {
        Some(s) if s.chars().count() > max => Verdict::Invalid(
            ValidationError::new(
                format!("Ensure this value has at most {max} characters."),
                "max_length",
            )
            .with_param("max", max.to_string()),
        ),
        _ => Verdict::Valid,
    })
}

/// Rejects non-empty text that does not match `pattern` in full.
pub fn pattern(pattern: &str) -> SvbmitResult<Validator> {
    let anchored = format!("^(?:{pattern})$");
    let regex = Regex::new(&anchored).map_err(|e| {
        SvbmitError::ConfigurationError(format!("Invalid validator pattern '{pattern}': {e}"))
    })?;
    let source = pattern.to_string();

    Ok(custom(move |value, _| match value.as_str() {
        Some(s) if !s.is_empty() && !regex.is_match(s) => Verdict::Invalid(
            ValidationError::new("Enter a value in the expected format.", "pattern")
                .with_param("pattern", source.clone()),
        ),
        _ => Verdict::Valid,
    }))
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$")
        .expect("email regex is valid")
});

/// Rejects non-empty text that is not an email address.
pub fn email() -> Validator {
    custom(|value, _| match value.as_str() {
        Some(s) if !s.is_empty() && !EMAIL_RE.is_match(s) => Verdict::Invalid(
            ValidationError::new("Enter a valid email address.", "invalid_email"),
        ),
        _ => Verdict::Valid,
    })
}

/// Wraps a closure as a [`ComputeFn`].
pub fn compute<F>(f: F) -> ComputeFn
where
    F: Fn(&HashMap<String, FieldValue>) -> FieldValue + Send + Sync + 'static,
{
    Arc::new(f)
}

/// `true` when every child holds the same value (password confirmation).
pub fn all_equal() -> ComputeFn {
    compute(|values| {
        let mut iter = values.values();
        let equal = iter
            .next()
            .map_or(true, |first| iter.all(|other| other == first));
        FieldValue::Bool(equal)
    })
}

/// Accepts a group value of `true`, rejects anything else with `error`.
pub fn is_true(error: ValidationError) -> Validator {
    custom(move |value, _| {
        if value.as_bool() == Some(true) {
            Verdict::Valid
        } else {
            Verdict::Invalid(error.clone())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(validator: &Validator, value: impl Into<FieldValue>) -> Verdict {
        validator(&value.into(), &FormState::empty())
    }

    #[test]
    fn test_required() {
        let v = required();
        assert!(matches!(check(&v, ""), Verdict::Invalid(e) if e.code == "required"));
        assert!(matches!(check(&v, FieldValue::Null), Verdict::Invalid(_)));
        assert!(matches!(check(&v, false), Verdict::Invalid(_)));
        assert_eq!(check(&v, true), Verdict::Valid);
        assert_eq!(check(&v, "x"), Verdict::Valid);
    }

    #[test]
    fn test_min_and_max_length() {
        let min = min_length(3);
        assert!(matches!(check(&min, "ab"), Verdict::Invalid(e) if e.params["min"] == "3"));
        assert_eq!(check(&min, "abc"), Verdict::Valid);
        assert_eq!(check(&min, ""), Verdict::Valid);

        let max = max_length(2);
        assert!(matches!(check(&max, "abc"), Verdict::Invalid(_)));
        assert_eq!(check(&max, "ab"), Verdict::Valid);
    }

    #[test]
    fn test_pattern_is_anchored() {
        let v = pattern("[0-9]+").unwrap();
        assert_eq!(check(&v, "123"), Verdict::Valid);
        assert!(matches!(check(&v, "12a"), Verdict::Invalid(e) if e.code == "pattern"));
        assert_eq!(check(&v, ""), Verdict::Valid);
    }

    #[test]
    fn test_pattern_rejects_bad_regex() {
        assert!(matches!(pattern("(").err(), Some(SvbmitError::ConfigurationError(_))));
    }

    #[test]
    fn test_email() {
        let v = email();
        assert_eq!(check(&v, "ada@example.com"), Verdict::Valid);
        assert!(matches!(check(&v, "ada@"), Verdict::Invalid(_)));
        assert!(matches!(check(&v, "not an email"), Verdict::Invalid(_)));
    }

    #[test]
    fn test_run_validators_stops_at_first_rejection() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let c = calls.clone();
        let validators = vec![
            required(),
            custom(|_, _| Verdict::Invalid(ValidationError::new("first", "first"))),
            custom(move |_, _| {
                c.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Verdict::Invalid(ValidationError::new("second", "second"))
            }),
        ];
        let err = run_validators("f", &validators, &FieldValue::from("x"), &FormState::empty())
            .unwrap()
            .unwrap();
        assert_eq!(err.code, "first");
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_run_validators_all_pass() {
        let validators = vec![required(), min_length(1)];
        let result =
            run_validators("f", &validators, &FieldValue::from("x"), &FormState::empty()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_deferred_validator_is_contract_violation() {
        let validators = vec![custom(|_, _| Verdict::Deferred)];
        let err = run_validators("username", &validators, &FieldValue::Null, &FormState::empty())
            .unwrap_err();
        assert!(matches!(err, SvbmitError::DeferredValidator { ref field } if field == "username"));
    }

    #[test]
    fn test_validator_sees_form_state() {
        let v = custom(|_, state| (state.fields.is_empty()).into());
        assert_eq!(check(&v, "x"), Verdict::Valid);
    }

    #[test]
    fn test_all_equal() {
        let f = all_equal();
        let mut values = HashMap::new();
        values.insert("a".to_string(), FieldValue::from("x"));
        values.insert("b".to_string(), FieldValue::from("x"));
        assert_eq!(f(&values), FieldValue::Bool(true));
        values.insert("b".to_string(), FieldValue::from("y"));
        assert_eq!(f(&values), FieldValue::Bool(false));
        assert_eq!(f(&HashMap::new()), FieldValue::Bool(true));
    }

    #[test]
    fn test_is_true() {
        let v = is_true(ValidationError::new("Values differ.", "mismatch"));
        assert_eq!(check(&v, true), Verdict::Valid);
        assert!(matches!(check(&v, false), Verdict::Invalid(e) if e.code == "mismatch"));
    }
}
