//! # Leadform - behaviour layer of a lead-intake form
//!
//! State models behind a single marketing/lead-intake web form: custom
//! multi-select dropdowns, a validated file attachment area, and a submit
//! flow that posts everything as one multipart request to a webhook.
//!
//! The models here are free of any DOM or network dependency; the Leptos
//! frontend and the `leadform` command-line tool drive them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ StagingSet   │   │ DropdownGroup│
//! │ (files)      │   │ (selects)    │
//! └──────┬───────┘   └──────┬───────┘
//!        │                  │ serialized values
//!        ▼                  ▼
//! ┌─────────────────────────────────┐     ┌─────────────┐
//! │ SubmitController                │────▶│  Transport  │──▶ webhook
//! │ validate → payload → send       │     │  (POST)     │
//! └─────────────────────────────────┘     └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per concern
//! - [`config`] - Form definition and attachment limits
//! - [`format`] - Human-readable byte sizes
//! - [`staging`] - Staged file set
//! - [`multiselect`] - Multi-select dropdown model
//! - [`validation`] - Required-field and constraint validation
//! - [`submit`] - Submission state machine, payload and response handling

// Core modules
pub mod error;
pub mod config;
pub mod format;

// Widgets
pub mod staging;
pub mod multiselect;

// Validation
pub mod validation;

// Submission
pub mod submit;

// =============================================================================
// Re-exports - Errors
// =============================================================================

pub use error::{
    ConfigError,
    FieldError,
    TransportError,
    SubmitError,
    LeadFormError,
    ConfigResult,
    TransportResult,
    LeadFormResult,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{
    FormDefinition,
    FieldSpec,
    SelectSpec,
    OptionSpec,
    InputKind,
    FileLimits,
    TotalSizePolicy,
};

// =============================================================================
// Re-exports - Widgets
// =============================================================================

pub use format::format_bytes;

pub use staging::{
    AttachedFile,
    FileIdentity,
    StagingSet,
    AddReport,
    Snapshot,
};

pub use multiselect::{
    MultiSelect,
    SelectOption,
    DropdownGroup,
    DropdownState,
    sort_options,
    OTHER_LABEL,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    FormValidator,
    FormValues,
    ErrorState,
    FieldRule,
    ValidationReport,
};

// =============================================================================
// Re-exports - Submission
// =============================================================================

pub use submit::{
    SubmitController,
    SubmitState,
    SubmitOutcome,
    Abort,
    FormView,
    Payload,
    Part,
    RawResponse,
    Redirect,
    ResponseBody,
    Transport,
    build_payload,
    parse_response_body,
    send,
};

#[cfg(feature = "cli")]
pub use submit::http::HttpTransport;
