//! Footer component

use leptos::*;

#[component]
pub fn Footer() -> impl IntoView {
    view! {
        <footer>
            <div>"Submissions are forwarded to our sales team • Powered by " <span class="rust-badge">"🦀 Rust + Leptos"</span></div>
            <div class="footer-links">
                <a href="privacy.html" class="footer-link">"Privacy"</a>
                <a href="contact.html" class="footer-link">"Contact"</a>
            </div>
        </footer>
    }
}
