//! Form definition and configuration.
//!
//! Everything the form needs from the outside world lives in one
//! [`FormDefinition`]: the submit endpoint, the attachment limits, and the
//! declared fields. Definitions are JSON documents with camelCase keys:
//!
//! ```json
//! {
//!   "endpoint": "https://hooks.example.com/lead",
//!   "limits": { "allowedTypes": ["application/pdf"], "maxTotalSize": 26214400 },
//!   "fields": [{ "name": "email", "label": "Email", "required": true, "input": "email" }],
//!   "selects": [{ "name": "services", "placeholder": "Select services",
//!                 "options": [{ "label": "Consulting" }, { "label": "Other" }] }]
//! }
//! ```

use std::collections::HashSet;
use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Multipart field name used for staged files.
pub const DEFAULT_FILE_FIELD: &str = "attachments";

/// Page to navigate to when the endpoint does not supply a redirect.
pub const DEFAULT_REDIRECT: &str = "thank-you.html";

/// Delay before following the redirect, so the success label is visible.
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 800;

/// Separator between selected values in a multi-select's serialized form.
pub const DEFAULT_DELIMITER: &str = ", ";

/// Submit button labels.
pub const DEFAULT_SUBMIT_LABEL: &str = "Submit Opportunity";
pub const DEFAULT_SUBMITTING_LABEL: &str = "Submitting...";
pub const DEFAULT_SUCCESS_LABEL: &str = "Submitted!";

/// Attachment limits used when a definition does not override them.
pub const DEFAULT_MAX_FILES: usize = 5;
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 25 * 1024 * 1024;

/// Media types accepted when a definition does not list its own.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "image/png",
    "image/jpeg",
    "text/plain",
    "text/csv",
];

/// Environment variables read by [`FormDefinition::apply_env`].
pub const ENV_ENDPOINT: &str = "LEADFORM_ENDPOINT";
pub const ENV_FILE_FIELD: &str = "LEADFORM_FILE_FIELD";
pub const ENV_MAX_TOTAL_SIZE: &str = "LEADFORM_MAX_TOTAL_SIZE";

// =============================================================================
// Attachment Limits
// =============================================================================

/// What happens when an add pushes the staged total over the cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TotalSizePolicy {
    /// Keep every accepted file and report the violation.
    #[default]
    WarnOnly,
    /// Refuse each candidate that would push the total over the cap.
    RejectExcess,
}

/// Constraints on the staged attachment set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileLimits {
    /// Accepted media types. `type/*` matches a whole family.
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
    #[serde(default)]
    pub max_files: Option<usize>,
    #[serde(default)]
    pub max_file_size: Option<u64>,
    pub max_total_size: u64,
    #[serde(default)]
    pub total_size_policy: TotalSizePolicy,
}

fn default_allowed_types() -> Vec<String> {
    DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect()
}

impl Default for FileLimits {
    fn default() -> Self {
        Self {
            allowed_types: default_allowed_types(),
            max_files: Some(DEFAULT_MAX_FILES),
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            max_total_size: DEFAULT_MAX_TOTAL_SIZE,
            total_size_policy: TotalSizePolicy::default(),
        }
    }
}

impl FileLimits {
    /// Whether `media_type` is on the allow-list.
    pub fn allows(&self, media_type: &str) -> bool {
        let media_type = media_type.trim().to_ascii_lowercase();
        self.allowed_types.iter().any(|allowed| {
            let allowed = allowed.trim().to_ascii_lowercase();
            match allowed.strip_suffix("/*") {
                Some(family) => media_type
                    .split_once('/')
                    .is_some_and(|(head, _)| head == family),
                None => allowed == media_type,
            }
        })
    }

    /// Value for the file input's `accept` attribute.
    pub fn accept_attribute(&self) -> String {
        self.allowed_types.join(",")
    }
}

// =============================================================================
// Field Declarations
// =============================================================================

/// Input type of a standard field, mirroring the HTML input types the
/// form uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    #[default]
    Text,
    Email,
    Tel,
    Number,
    Url,
    Textarea,
}

impl InputKind {
    /// HTML `type` attribute. Textareas have none.
    pub fn html_type(self) -> &'static str {
        match self {
            InputKind::Text | InputKind::Textarea => "text",
            InputKind::Email => "email",
            InputKind::Tel => "tel",
            InputKind::Number => "number",
            InputKind::Url => "url",
        }
    }
}

/// A standard (text-like) field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub input: InputKind,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub min_length: Option<usize>,
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// One option of a multi-select.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub label: String,
    /// Submitted value; defaults to the label.
    #[serde(default)]
    pub value: Option<String>,
}

/// A multi-select dropdown field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    pub options: Vec<OptionSpec>,
}

// =============================================================================
// Form Definition
// =============================================================================

/// Complete configuration of one lead-intake form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub endpoint: String,
    #[serde(default = "default_file_field")]
    pub file_field: String,
    #[serde(default = "default_redirect")]
    pub default_redirect: String,
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_ms: u64,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
    #[serde(default = "default_submitting_label")]
    pub submitting_label: String,
    #[serde(default = "default_success_label")]
    pub success_label: String,
    #[serde(default)]
    pub limits: FileLimits,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub selects: Vec<SelectSpec>,
}

fn default_file_field() -> String {
    DEFAULT_FILE_FIELD.to_string()
}

fn default_redirect() -> String {
    DEFAULT_REDIRECT.to_string()
}

fn default_redirect_delay() -> u64 {
    DEFAULT_REDIRECT_DELAY_MS
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

fn default_submit_label() -> String {
    DEFAULT_SUBMIT_LABEL.to_string()
}

fn default_submitting_label() -> String {
    DEFAULT_SUBMITTING_LABEL.to_string()
}

fn default_success_label() -> String {
    DEFAULT_SUCCESS_LABEL.to_string()
}

impl FormDefinition {
    /// A definition with default settings and no fields.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            file_field: default_file_field(),
            default_redirect: default_redirect(),
            redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
            delimiter: default_delimiter(),
            submit_label: default_submit_label(),
            submitting_label: default_submitting_label(),
            success_label: default_success_label(),
            limits: FileLimits::default(),
            fields: Vec::new(),
            selects: Vec::new(),
        }
    }

    /// Parse and check a JSON definition.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let definition: Self = serde_json::from_str(json)?;
        definition.check()?;
        Ok(definition)
    }

    /// Reject definitions the form cannot work with.
    pub fn check(&self) -> ConfigResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if self.file_field.trim().is_empty() {
            return Err(ConfigError::MissingFileField);
        }
        if self.limits.max_total_size == 0 {
            return Err(ConfigError::ZeroTotalSize);
        }

        let mut seen = HashSet::new();
        let names = self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(self.selects.iter().map(|s| s.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateField(name.to_string()));
            }
        }

        for field in &self.fields {
            if let Some(pattern) = &field.pattern {
                crate::validation::compile_pattern(pattern).map_err(|source| {
                    ConfigError::InvalidPattern {
                        field: field.name.clone(),
                        source,
                    }
                })?;
            }
        }

        Ok(())
    }

    /// Override endpoint, file field and total cap from the environment.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        if let Ok(endpoint) = env::var(ENV_ENDPOINT) {
            log::debug!("Endpoint overridden by {}", ENV_ENDPOINT);
            self.endpoint = endpoint;
        }
        if let Ok(field) = env::var(ENV_FILE_FIELD) {
            self.file_field = field;
        }
        if let Ok(raw) = env::var(ENV_MAX_TOTAL_SIZE) {
            self.limits.max_total_size =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_MAX_TOTAL_SIZE.to_string(),
                    value: raw.clone(),
                })?;
        }
        self.check()
    }

    /// Look up a standard field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
