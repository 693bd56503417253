//! Browser services.
//!
//! # Services
//!
//! - [`submit`] - multipart POST to the webhook and the success redirect

pub mod submit;

pub use submit::*;
