//! Lead intake - Frontend Rust/Leptos Application
//!
//! A WebAssembly page that collects a sales lead, validates it with the
//! `leadform` models and posts it to the configured webhook.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  LeadPage                                                    │
//! │  ├── Hero (title, introduction)                             │
//! │  └── LeadForm or configuration error                        │
//! │      ├── TextField × n                                      │
//! │      ├── MultiSelectField × n                               │
//! │      └── FileDropZone + AttachmentSummary                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Footer                                                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`] - Embedded form definition
//! - [`types`] - Browser-side file wrappers and DOM ids
//! - [`components`] - UI components (Hero, LeadForm, drop zone, etc.)
//! - [`services`] - Webhook transport and redirect

use leadform::FormValidator;
use leptos::*;
use leptos_meta::*;
use leptos_router::*;
use wasm_bindgen::prelude::*;

// =============================================================================
// Module declarations
// =============================================================================

pub mod config;
pub mod types;
pub mod components;
pub mod services;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{field_dom_id, staged_file, staged_files, StagedFile};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application Entry Point
// =============================================================================

/// WASM entry point - called automatically by trunk.
#[wasm_bindgen(start)]
pub fn main() {
    // Setup panic hook for better error messages
    console_error_panic_hook::set_once();

    // Setup console logging
    _ = console_log::init_with_level(log::Level::Debug);

    log::info!("🦀 Lead intake - Starting Leptos App");

    // Mount the application
    mount_to_body(|| view! { <App/> });
}

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text=APP_NAME/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=LeadPage/>
                </Routes>
            </main>
        </Router>
    }
}

#[component]
fn LeadPage() -> impl IntoView {
    let loaded = form_definition().and_then(|definition| {
        let validator = FormValidator::from_definition(&definition)?;
        Ok((definition, validator))
    });

    let body = match loaded {
        Ok((definition, validator)) => {
            log::debug!(
                "Form ready: {} fields, {} selects, posting to {}",
                definition.fields.len(),
                definition.selects.len(),
                definition.endpoint
            );
            view! { <LeadForm definition=definition validator=validator/> }.into_view()
        }
        Err(e) => {
            log::error!("Invalid form definition: {}", e);
            view! {
                <div class="submit-error" role="alert">
                    "This form is currently unavailable. Please try again later."
                </div>
            }
            .into_view()
        }
    };

    view! {
        <div class="container">
            <Hero/>
            {body}
        </div>

        <Footer/>
    }
}
