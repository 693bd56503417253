//! Application configuration.
//!
//! The form definition is embedded at compile time from `form.json` next to
//! this crate's manifest. Edit that file to change fields, dropdown options,
//! attachment limits or the webhook endpoint.

use leadform::{ConfigResult, FormDefinition};

/// Page title.
pub const APP_NAME: &str = "Submit an Opportunity";

/// Embedded form definition.
pub const FORM_DEFINITION_JSON: &str = include_str!("../form.json");

/// Parse the embedded form definition.
pub fn form_definition() -> ConfigResult<FormDefinition> {
    FormDefinition::from_json_str(FORM_DEFINITION_JSON)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_definition_is_valid() {
        let definition = form_definition().unwrap();
        assert!(!definition.fields.is_empty());
        assert!(definition.selects.iter().any(|s| s.required));
        assert!(leadform::FormValidator::from_definition(&definition).is_ok());
    }
}
