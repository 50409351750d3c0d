//! Field-level input checks composed into a per-form report.
//!
//! A [`Rule`] looks at one raw field value and either passes (`None`) or
//! returns the message to show next to the field. [`validate_form`] runs each
//! field's rules in order and keeps only the first failure for that field.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::calculators::FormState;

static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// A single field check: receives the raw value and the field key.
pub type Rule = Box<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

/// Wraps a plain predicate function as a [`Rule`].
pub fn rule(check: fn(&str, &str) -> Option<String>) -> Rule {
    Box::new(check)
}

/// Parses a complete numeric literal (no trailing garbage, no `inf`/`NaN`).
fn strict_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn validate_required(
    value: &str,
    field: &str,
) -> Option<String> {
    if value.trim().is_empty() {
        Some(format!("{field} is required"))
    } else {
        None
    }
}

/// Passes empty input; use [`validate_required`] to reject it.
pub fn validate_numeric(
    value: &str,
    field: &str,
) -> Option<String> {
    if value.trim().is_empty() || strict_number(value).is_some() {
        None
    } else {
        Some(format!("{field} must be a valid number"))
    }
}

/// Rejects zero, negatives and non-numbers. Empty input passes.
pub fn validate_positive(
    value: &str,
    field: &str,
) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    match strict_number(value) {
        Some(v) if v > 0.0 => None,
        _ => Some(format!("{field} must be a positive number")),
    }
}

/// Inclusive range check. Empty input passes.
pub fn validate_range(
    value: &str,
    field: &str,
    min: f64,
    max: f64,
) -> Option<String> {
    if value.trim().is_empty() {
        return None;
    }
    match strict_number(value) {
        Some(v) if v >= min && v <= max => None,
        _ => Some(format!("{field} must be between {min} and {max}")),
    }
}

/// Builds a [`Rule`] around [`validate_range`] with fixed bounds.
pub fn range_rule(
    min: f64,
    max: f64,
) -> Rule {
    Box::new(move |value: &str, field: &str| validate_range(value, field, min, max))
}

/// Checks the `local@domain.tld` shape. Empty input passes.
pub fn validate_email(
    value: &str,
    _field: &str,
) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let matches = EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(value));
    if matches {
        None
    } else {
        Some("Please enter a valid email address".to_string())
    }
}

/// Ordered rule lists keyed by field name.
#[derive(Default)]
pub struct Rules {
    fields: Vec<(String, Vec<Rule>)>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the rules for `field`, to be run in the given order.
    pub fn field(
        mut self,
        field: impl Into<String>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.fields.push((field.into(), rules.into_iter().collect()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl std::fmt::Debug for Rules {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|(name, rules)| (name, rules.len())))
            .finish()
    }
}

/// Outcome of [`validate_form`]: the first failing message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Runs `rules` against `form`.
///
/// Fields without rules are never looked at; fields missing from `form` are
/// checked as empty strings.
pub fn validate_form(
    form: &FormState,
    rules: &Rules,
) -> ValidationResult {
    let mut errors = BTreeMap::new();

    for (field, field_rules) in &rules.fields {
        let value = form.get(field);
        if let Some(message) = field_rules.iter().find_map(|check| check(value, field.as_str())) {
            tracing::debug!(field = %field, %message, "field failed validation");
            errors.insert(field.clone(), message);
        }
    }

    ValidationResult { errors }
}
