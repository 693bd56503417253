use leadform::StagingSet;
use leptos::*;
use web_sys::File;

#[component]
pub fn AttachmentSummary(staging: RwSignal<StagingSet<File>>) -> impl IntoView {
    let summary = move || staging.with(|s| s.snapshot().summary());
    let fill_width = move || {
        let ratio = staging.with(|s| s.snapshot().usage_ratio());
        format!("width: {:.1}%;", ratio * 100.0)
    };
    let over_limit = move || staging.with(|s| !s.within_limits());

    view! {
        <Show
            when=move || staging.with(|s| !s.is_empty())
            fallback=|| view! { }
        >
            <div class="attachment-summary" class:over-limit=over_limit>
                <div class="progress-bar">
                    <div class="progress-fill" style=fill_width></div>
                </div>
                <div class="attachment-usage">{summary}</div>
            </div>
        </Show>
    }
}
