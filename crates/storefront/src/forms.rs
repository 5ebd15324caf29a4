//! Form and query-string helpers shared by route handlers.
//!
//! HTML forms submit unset selects and blank inputs as empty strings, and the
//! backend reports validation failures keyed by field name. Both concerns
//! live here so every page treats them the same way.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Validation messages keyed by form field name.
///
/// Deserializes from the backend's `{"errors": {"field": ["msg", ...]}}`
/// shape and is also built locally when a form is rejected before it reaches
/// the network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// No errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Builder-style variant of [`FieldErrors::add`].
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// First message for a field, for rendering beneath the input.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Whether a field has at least one message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.first(field).is_some()
    }

    /// Whether there are no errors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Messages not attached to any of the given fields (shown in a banner).
    #[must_use]
    pub fn unattached(&self, known_fields: &[&str]) -> Vec<String> {
        self.0
            .iter()
            .filter(|(field, _)| !known_fields.contains(&field.as_str()))
            .flat_map(|(_, messages)| messages.iter().cloned())
            .collect()
    }
}

/// Deserialize an optional value, treating blank strings as `None`.
///
/// Used for query strings and urlencoded forms where `<select>` placeholders
/// and cleared inputs arrive as `field=`.
///
/// # Errors
///
/// Returns a deserialization error if a non-blank value fails to parse.
pub fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Deserialize an optional value, treating blank or unparseable strings as `None`.
///
/// Listing pages use this for filter parameters so a hand-edited URL degrades
/// to "filter not set" instead of a 400.
///
/// # Errors
///
/// Only fails if the input is not a string at all.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok()))
}

/// Deserialize an HTML checkbox (`on`, `true`, `1`) into a bool.
///
/// # Errors
///
/// Only fails if the input is not a string at all.
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(matches!(
        raw.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "empty_as_none")]
        strict: Option<i64>,
        #[serde(default, deserialize_with = "lenient")]
        loose: Option<i64>,
        #[serde(default, deserialize_with = "checkbox")]
        flag: bool,
    }

    #[test]
    fn test_blank_values_are_none() {
        let fields: Fields = serde_json::from_str(r#"{"strict": " ", "loose": ""}"#).unwrap();
        assert_eq!(fields.strict, None);
        assert_eq!(fields.loose, None);
        assert!(!fields.flag);
    }

    #[test]
    fn test_values_parse() {
        let fields: Fields =
            serde_json::from_str(r#"{"strict": "4", "loose": "9", "flag": "on"}"#).unwrap();
        assert_eq!(fields.strict, Some(4));
        assert_eq!(fields.loose, Some(9));
        assert!(fields.flag);
    }

    #[test]
    fn test_strict_rejects_garbage_lenient_ignores_it() {
        assert!(serde_json::from_str::<Fields>(r#"{"strict": "x"}"#).is_err());
        let fields: Fields = serde_json::from_str(r#"{"loose": "x"}"#).unwrap();
        assert_eq!(fields.loose, None);
    }

    #[test]
    fn test_field_errors_from_backend_shape() {
        let errors: FieldErrors =
            serde_json::from_str(r#"{"phone": ["taken", "too short"], "name": []}"#).unwrap();
        assert_eq!(errors.first("phone"), Some("taken"));
        assert!(!errors.has("name"));
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_field_errors_unattached() {
        let errors = FieldErrors::new()
            .with("address", "required")
            .with("avatar_size", "too big");
        assert_eq!(errors.unattached(&["address"]), vec!["too big".to_string()]);
    }

    #[test]
    fn test_empty_field_errors() {
        assert!(FieldErrors::new().is_empty());
    }
}
