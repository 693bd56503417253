//! Hero section component

use leptos::*;

use crate::config::APP_NAME;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>{APP_NAME}</h1>
            <p class="subtitle">
                "Tell us about the project. Fields marked with * are required; "
                "briefs, specs or drawings can be attached below."
            </p>
        </div>
    }
}
