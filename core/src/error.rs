//! Error types for the lead-intake form.
//!
//! One enum per concern:
//!
//! - [`ConfigError`] - invalid form definition or environment overrides
//! - [`FieldError`] - a single field failing validation
//! - [`TransportError`] - the outbound request could not be performed
//! - [`SubmitError`] - a submission attempt failed (transport or status)
//! - [`LeadFormError`] - top-level error used by the command-line tool
//!
//! File staging never fails with an error; rejected files are reported
//! through [`crate::staging::AddReport`] instead.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors in a form definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Definition is not valid JSON or has the wrong shape.
    #[error("Invalid form definition: {0}")]
    Json(#[from] serde_json::Error),

    /// No submit endpoint configured.
    #[error("Submit endpoint is empty")]
    MissingEndpoint,

    /// No multipart field name for attachments.
    #[error("File field name is empty")]
    MissingFileField,

    /// Total size cap must be positive.
    #[error("Maximum total size must be greater than zero")]
    ZeroTotalSize,

    /// Two fields (standard or multi-select) share a name.
    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    /// A declared pattern does not compile.
    #[error("Invalid pattern for field '{field}': {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    /// An environment override could not be parsed.
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

// =============================================================================
// Field Validation Errors
// =============================================================================

/// Why a single field failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("This field is required")]
    Missing,

    #[error("Enter a valid email address")]
    InvalidEmail,

    #[error("Enter a valid URL")]
    InvalidUrl,

    #[error("Enter a valid phone number")]
    InvalidPhone,

    #[error("Enter a number")]
    NotANumber,

    #[error("Value must be at least {0}")]
    BelowMinimum(f64),

    #[error("Value must be at most {0}")]
    AboveMaximum(f64),

    #[error("Use at least {0} characters")]
    TooShort(usize),

    #[error("Use at most {0} characters")]
    TooLong(usize),

    #[error("Value does not match the expected format")]
    PatternMismatch,
}

// =============================================================================
// Transport & Submit Errors
// =============================================================================

/// Errors raised by a [`crate::submit::Transport`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The request body or headers could not be assembled.
    #[error("Failed to build request: {0}")]
    Request(String),

    /// Connection refused, DNS failure, CORS rejection and the like.
    #[error("Network error: {0}")]
    Network(String),
}

/// Why a submission attempt failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// No response was received.
    #[error("Unable to connect to the server: {0}")]
    Transport(#[from] TransportError),

    /// The endpoint answered with a non-success status.
    #[error("Submission failed (HTTP {status})")]
    Status { status: u16, body: String },
}

impl SubmitError {
    /// Message shown to the user in the dismissable error banner.
    pub fn user_message(&self) -> &'static str {
        match self {
            SubmitError::Transport(_) => {
                "Unable to connect to the server. Please try again later."
            }
            SubmitError::Status { .. } => "Submission failed. Please try again.",
        }
    }
}

// =============================================================================
// Top-level Errors
// =============================================================================

/// Top-level error for the command-line tool.
#[derive(Debug, Error)]
pub enum LeadFormError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Required fields are missing or malformed.
    #[error("Form is invalid: {}", .0.join(", "))]
    Invalid(Vec<String>),

    /// Staged files break the configured limits.
    #[error("Attachments exceed the configured limits")]
    FileLimits,

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    Argument(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for transports.
pub type TransportResult<T> = Result<T, TransportError>;

/// Result type for the command-line tool.
pub type LeadFormResult<T> = Result<T, LeadFormError>;
