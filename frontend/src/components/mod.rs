//! UI components of the lead-intake page.
//!
//! # Layout Components
//! - [`Hero`] - Title and introduction
//! - [`Footer`] - Page footer
//!
//! # Form Components
//! - [`LeadForm`] - The form itself, owner of all form state
//! - [`MultiSelectField`] - Checkbox-list dropdown
//! - [`FileDropZone`] - Attachments with drag & drop
//! - [`AttachmentSummary`] - Staged size against the total cap

mod hero;
mod lead_form;
mod multiselect;
mod drop_zone;
mod progress;
mod footer;

pub use hero::*;
pub use lead_form::*;
pub use multiselect::*;
pub use drop_zone::*;
pub use progress::*;
pub use footer::*;
