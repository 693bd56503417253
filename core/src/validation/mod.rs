//! Required-field and constraint validation.
//!
//! [`FormValidator`] checks the standard fields and multi-selects declared
//! in a [`FormDefinition`] against the current [`FormValues`], recording
//! failures in an [`ErrorState`].
//!
//! # Rules
//!
//! - A required standard field must be non-empty after trimming.
//! - A non-empty standard field must satisfy its declared constraints
//!   (email/url/tel shape, numeric range, length, pattern), as native
//!   browser validation does for optional inputs too.
//! - A required multi-select must have a non-empty serialized value.
//!
//! Full validation both applies and clears indicators. Live validation
//! ([`FormValidator::revalidate_field`]) only ever clears them, so a user
//! is never interrupted while typing.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{FieldSpec, FormDefinition, InputKind};
use crate::error::{ConfigError, ConfigResult, FieldError};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/]+\S*$").expect("Invalid url regex")
});

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().-]{5,}$").expect("Invalid phone regex"));

/// Compile an HTML-style pattern, which must match the whole value.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}

// =============================================================================
// Form Values
// =============================================================================

/// Current field values in form order. Setting an existing name replaces
/// its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormValues {
    entries: Vec<(String, String)>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.set(name, value);
        }
        values
    }
}

// =============================================================================
// Error State
// =============================================================================

/// Per-field "has error" flags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorState {
    flagged: BTreeSet<String>,
}

impl ErrorState {
    pub fn has_error(&self, name: &str) -> bool {
        self.flagged.contains(name)
    }

    pub fn flag(&mut self, name: &str) {
        self.flagged.insert(name.to_string());
    }

    /// Apply or clear the indicator.
    pub fn set(&mut self, name: &str, has_error: bool) {
        if has_error {
            self.flag(name);
        } else {
            self.clear(name);
        }
    }

    /// Returns whether the field was flagged.
    pub fn clear(&mut self, name: &str) -> bool {
        self.flagged.remove(name)
    }

    pub fn clear_all(&mut self) {
        self.flagged.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    pub fn flagged(&self) -> impl Iterator<Item = &str> {
        self.flagged.iter().map(String::as_str)
    }
}

// =============================================================================
// Rules
// =============================================================================

/// A declared constraint on a standard field.
#[derive(Clone, Debug)]
pub enum Constraint {
    Email,
    Url,
    Phone,
    Number { min: Option<f64>, max: Option<f64> },
    Length { min: Option<usize>, max: Option<usize> },
    Pattern(Regex),
}

impl Constraint {
    fn check(&self, value: &str) -> Result<(), FieldError> {
        match self {
            Constraint::Email if !EMAIL.is_match(value) => Err(FieldError::InvalidEmail),
            Constraint::Url if !URL.is_match(value) => Err(FieldError::InvalidUrl),
            Constraint::Phone if !PHONE.is_match(value) => Err(FieldError::InvalidPhone),
            Constraint::Number { min, max } => {
                let number: f64 = value.parse().map_err(|_| FieldError::NotANumber)?;
                if !number.is_finite() {
                    return Err(FieldError::NotANumber);
                }
                if let Some(min) = min.filter(|min| number < *min) {
                    return Err(FieldError::BelowMinimum(min));
                }
                if let Some(max) = max.filter(|max| number > *max) {
                    return Err(FieldError::AboveMaximum(max));
                }
                Ok(())
            }
            Constraint::Length { min, max } => {
                let chars = value.chars().count();
                if let Some(min) = min.filter(|min| chars < *min) {
                    return Err(FieldError::TooShort(min));
                }
                if let Some(max) = max.filter(|max| chars > *max) {
                    return Err(FieldError::TooLong(max));
                }
                Ok(())
            }
            Constraint::Pattern(regex) if !regex.is_match(value) => {
                Err(FieldError::PatternMismatch)
            }
            _ => Ok(()),
        }
    }
}

/// What kind of control a rule validates.
#[derive(Clone, Debug)]
pub enum RuleKind {
    Standard(Vec<Constraint>),
    MultiSelect,
}

/// Validation rule for one field.
#[derive(Clone, Debug)]
pub struct FieldRule {
    pub name: String,
    pub required: bool,
    pub kind: RuleKind,
}

impl FieldRule {
    pub fn from_spec(spec: &FieldSpec) -> ConfigResult<Self> {
        let mut constraints = Vec::new();
        match spec.input {
            InputKind::Email => constraints.push(Constraint::Email),
            InputKind::Url => constraints.push(Constraint::Url),
            InputKind::Tel => constraints.push(Constraint::Phone),
            InputKind::Number => constraints.push(Constraint::Number {
                min: spec.min,
                max: spec.max,
            }),
            InputKind::Text | InputKind::Textarea => {}
        }
        if spec.min_length.is_some() || spec.max_length.is_some() {
            constraints.push(Constraint::Length {
                min: spec.min_length,
                max: spec.max_length,
            });
        }
        if let Some(pattern) = &spec.pattern {
            let regex = compile_pattern(pattern).map_err(|source| ConfigError::InvalidPattern {
                field: spec.name.clone(),
                source,
            })?;
            constraints.push(Constraint::Pattern(regex));
        }

        Ok(Self {
            name: spec.name.clone(),
            required: spec.required,
            kind: RuleKind::Standard(constraints),
        })
    }

    /// Check a single value against this rule.
    pub fn check(&self, value: &str) -> Result<(), FieldError> {
        match &self.kind {
            RuleKind::MultiSelect => {
                if self.required && value.trim().is_empty() {
                    Err(FieldError::Missing)
                } else {
                    Ok(())
                }
            }
            RuleKind::Standard(constraints) => {
                let value = value.trim();
                if value.is_empty() {
                    return if self.required { Err(FieldError::Missing) } else { Ok(()) };
                }
                constraints.iter().try_for_each(|c| c.check(value))
            }
        }
    }

    pub fn is_multiselect(&self) -> bool {
        matches!(self.kind, RuleKind::MultiSelect)
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Result of a full validation pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    /// Failing fields in form order.
    pub invalid: Vec<(String, FieldError)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
    }

    /// Field to scroll into view.
    pub fn first_invalid(&self) -> Option<&str> {
        self.invalid.first().map(|(name, _)| name.as_str())
    }

    pub fn invalid_names(&self) -> Vec<String> {
        self.invalid.iter().map(|(name, _)| name.clone()).collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FormValidator {
    rules: Vec<FieldRule>,
}

impl FormValidator {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Rules for every standard field, then every multi-select.
    pub fn from_definition(definition: &FormDefinition) -> ConfigResult<Self> {
        let mut rules = definition
            .fields
            .iter()
            .map(FieldRule::from_spec)
            .collect::<ConfigResult<Vec<_>>>()?;
        rules.extend(definition.selects.iter().map(|select| FieldRule {
            name: select.name.clone(),
            required: select.required,
            kind: RuleKind::MultiSelect,
        }));
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Validate every field, flagging failures and clearing passes.
    pub fn validate(&self, values: &FormValues, errors: &mut ErrorState) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            match rule.check(values.get(&rule.name).unwrap_or_default()) {
                Ok(()) => {
                    errors.clear(&rule.name);
                }
                Err(error) => {
                    errors.flag(&rule.name);
                    report.invalid.push((rule.name.clone(), error));
                }
            }
        }
        if let Some(first) = report.first_invalid() {
            log::debug!("Validation failed, first invalid field: {}", first);
        }
        report
    }

    /// Re-check one field after an edit. Clears its indicator if the value
    /// now passes; never applies one. Returns whether the value passes.
    pub fn revalidate_field(&self, name: &str, value: &str, errors: &mut ErrorState) -> bool {
        let Some(rule) = self.rule(name) else {
            return true;
        };
        let passes = rule.check(value).is_ok();
        if passes {
            errors.clear(name);
        }
        passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> FormDefinition {
        FormDefinition::from_json_str(
            r#"{
                "endpoint": "/webhook",
                "fields": [
                    { "name": "company", "required": true },
                    { "name": "email", "required": true, "input": "email" },
                    { "name": "website", "input": "url" },
                    { "name": "employees", "input": "number", "min": 1, "max": 100000 },
                    { "name": "zip", "pattern": "[0-9]{5}" },
                    { "name": "notes", "input": "textarea", "maxLength": 10 }
                ],
                "selects": [
                    { "name": "services", "placeholder": "Pick", "required": true,
                      "options": [{ "label": "X" }, { "label": "Y" }] }
                ]
            }"#,
        )
        .unwrap()
    }

    fn validator() -> FormValidator {
        FormValidator::from_definition(&definition()).unwrap()
    }

    #[test]
    fn test_empty_text_with_satisfied_multiselect() {
        let validator = FormValidator::from_definition(
            &FormDefinition::from_json_str(
                r#"{
                    "endpoint": "/w",
                    "fields": [{ "name": "company", "required": true }],
                    "selects": [{ "name": "services", "placeholder": "Pick", "required": true,
                                  "options": [{ "label": "X" }] }]
                }"#,
            )
            .unwrap(),
        )
        .unwrap();
        let values: FormValues = [("company", "   "), ("services", "X")].into_iter().collect();
        let mut errors = ErrorState::default();

        let report = validator.validate(&values, &mut errors);

        assert!(!report.is_valid());
        assert_eq!(report.invalid, vec![("company".to_string(), FieldError::Missing)]);
        assert!(errors.has_error("company"));
        assert!(!errors.has_error("services"));
    }

    #[test]
    fn test_all_valid_clears_previous_errors() {
        let validator = validator();
        let mut errors = ErrorState::default();
        errors.flag("company");
        errors.flag("services");

        let values: FormValues = [
            ("company", "Acme"),
            ("email", "lead@acme.io"),
            ("services", "X, Y"),
        ]
        .into_iter()
        .collect();

        let report = validator.validate(&values, &mut errors);
        assert!(report.is_valid());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_first_invalid_follows_form_order() {
        let validator = validator();
        let mut errors = ErrorState::default();
        let values: FormValues = [("company", "Acme"), ("email", "nope")].into_iter().collect();

        let report = validator.validate(&values, &mut errors);
        assert_eq!(report.first_invalid(), Some("email"));
        assert_eq!(report.invalid_names(), vec!["email".to_string(), "services".to_string()]);
        assert!(errors.has_error("services"));
    }

    #[test]
    fn test_optional_fields_checked_only_when_filled() {
        let rule = validator().rule("website").cloned().unwrap();
        assert_eq!(rule.check(""), Ok(()));
        assert_eq!(rule.check("https://acme.io/about"), Ok(()));
        assert_eq!(rule.check("acme dot io"), Err(FieldError::InvalidUrl));
    }

    #[test]
    fn test_constraints() {
        let v = validator();
        let check = |name: &str, value: &str| v.rule(name).unwrap().check(value);

        assert_eq!(check("email", " lead@acme.io "), Ok(()));
        assert_eq!(check("email", "lead@acme"), Err(FieldError::InvalidEmail));
        assert_eq!(check("employees", "12"), Ok(()));
        assert_eq!(check("employees", "0"), Err(FieldError::BelowMinimum(1.0)));
        assert_eq!(check("employees", "1e6"), Err(FieldError::AboveMaximum(100000.0)));
        assert_eq!(check("employees", "many"), Err(FieldError::NotANumber));
        assert_eq!(check("zip", "12345"), Ok(()));
        assert_eq!(check("zip", "123456"), Err(FieldError::PatternMismatch));
        assert_eq!(check("notes", "short"), Ok(()));
        assert_eq!(check("notes", "far too long"), Err(FieldError::TooLong(10)));
    }

    #[test]
    fn test_phone_shape() {
        let rule = FieldRule::from_spec(&FieldSpec {
            name: "phone".into(),
            label: String::new(),
            required: false,
            input: InputKind::Tel,
            pattern: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            placeholder: None,
        })
        .unwrap();
        assert_eq!(rule.check("+1 (555) 010-9999"), Ok(()));
        assert_eq!(rule.check("call me"), Err(FieldError::InvalidPhone));
    }

    #[test]
    fn test_revalidate_only_clears() {
        let validator = validator();
        let mut errors = ErrorState::default();

        // an invalid edit on a clean field does not flag it
        assert!(!validator.revalidate_field("email", "lead@", &mut errors));
        assert!(!errors.has_error("email"));

        errors.flag("email");
        assert!(!validator.revalidate_field("email", "lead@", &mut errors));
        assert!(errors.has_error("email"));

        assert!(validator.revalidate_field("email", "lead@acme.io", &mut errors));
        assert!(!errors.has_error("email"));

        // unknown fields always pass
        assert!(validator.revalidate_field("unknown", "", &mut errors));
    }

    #[test]
    fn test_form_values_replace_in_place() {
        let mut values = FormValues::new();
        values.set("a", "1");
        values.set("b", "2");
        values.set("a", "3");
        assert_eq!(values.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
        assert_eq!(values.get("missing"), None);
    }

    #[test]
    fn test_error_state_set_toggles_flag() {
        let mut errors = ErrorState::default();
        errors.set("services", true);
        errors.set("services", true);
        assert_eq!(errors.flagged().collect::<Vec<_>>(), vec!["services"]);

        errors.set("services", false);
        assert!(errors.is_empty());
        assert!(!errors.clear("services"));
    }
}
