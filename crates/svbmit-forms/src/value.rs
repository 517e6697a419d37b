//! The semantic value of a field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A field's current value.
///
/// Text inputs produce [`FieldValue::Text`], checkboxes [`FieldValue::Bool`],
/// multi-selects [`FieldValue::List`], and a radio group with nothing checked
/// [`FieldValue::Null`]. Group fields may compute any variant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Null, an empty string, and an empty list are empty. Booleans never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(_) => false,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(FieldValue::List(vec![]).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::from("x").is_empty());
    }

    #[test]
    fn test_serializes_untagged() {
        assert_eq!(serde_json::to_value(FieldValue::Null).unwrap(), serde_json::Value::Null);
        assert_eq!(serde_json::to_value(FieldValue::from(true)).unwrap(), serde_json::json!(true));
        assert_eq!(serde_json::to_value(FieldValue::from("a")).unwrap(), serde_json::json!("a"));
        assert_eq!(
            serde_json::to_value(FieldValue::from(vec!["a".to_string()])).unwrap(),
            serde_json::json!(["a"])
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(FieldValue::from("hi").as_str(), Some("hi"));
        assert_eq!(FieldValue::from(true).as_bool(), Some(true));
        assert_eq!(FieldValue::Null.as_str(), None);
    }
}
