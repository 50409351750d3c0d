use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw, unvalidated field input keyed by field name.
///
/// Missing fields read as the empty string, matching an untouched input box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormState(BTreeMap<String, String>);

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        field: &str,
    ) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn set(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.0.insert(field.into(), value.into());
    }

    pub fn with(
        mut self,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set(field, value);
        self
    }

    pub fn contains(
        &self,
        field: &str,
    ) -> bool {
        self.0.contains_key(field)
    }

    /// Clears every field, as on an explicit form reset.
    pub fn reset(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Request body for a calculator endpoint.
///
/// Numeric entries are always finite: [`CalculationPayload::insert_number`]
/// stores `0` in place of `NaN` or an infinity. Text entries carry mode
/// selectors and may be `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationPayload(Map<String, Value>);

impl CalculationPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_number(
        &mut self,
        field: impl Into<String>,
        value: f64,
    ) {
        let value = if value.is_finite() && value != 0.0 {
            value
        } else {
            0.0
        };
        self.0.insert(field.into(), Value::from(value));
    }

    pub fn insert_text(
        &mut self,
        field: impl Into<String>,
        value: Option<&str>,
    ) {
        let value = value.map_or(Value::Null, Value::from);
        self.0.insert(field.into(), value);
    }

    pub fn number(
        &self,
        field: &str,
    ) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }

    pub fn text(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn get(
        &self,
        field: &str,
    ) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_form_fields_read_as_empty() {
        let form = FormState::new().with("amount", "12");

        assert_eq!(form.get("amount"), "12");
        assert_eq!(form.get("rate"), "");
        assert!(!form.contains("rate"));
    }

    #[test]
    fn reset_clears_every_field() {
        let mut form: FormState = [("a", "1"), ("b", "2")].into_iter().collect();
        form.reset();

        assert!(form.is_empty());
    }

    #[test]
    fn non_finite_numbers_are_stored_as_zero() {
        let mut payload = CalculationPayload::new();
        payload.insert_number("a", f64::NAN);
        payload.insert_number("b", f64::NEG_INFINITY);
        payload.insert_number("c", -0.0);

        assert_eq!(payload.number("a"), Some(0.0));
        assert_eq!(payload.number("b"), Some(0.0));
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"a":0.0,"b":0.0,"c":0.0}"#);
    }

    #[test]
    fn text_entries_may_be_null() {
        let mut payload = CalculationPayload::new();
        payload.insert_text("businessType", None);
        payload.insert_text("periodType", Some("monthly"));

        assert_eq!(payload.get("businessType"), Some(&Value::Null));
        assert_eq!(payload.text("periodType"), Some("monthly"));
    }
}
