//! Attachment drop zone with drag & drop and a browse link.
//!
//! Files from the picker or a drop are handed to the staging model; the
//! resulting [`leadform::AddReport`] is shown as inline text. Rejected
//! files are simply not staged.

use leadform::{format_bytes, FileIdentity, StagingSet};
use leptos::*;
use web_sys::{File, FileList};

use crate::components::AttachmentSummary;
use crate::types::{file_key, staged_files, StagedFile};

#[component]
pub fn FileDropZone(
    staging: RwSignal<StagingSet<File>>,
    /// Multipart field name, used for the input's `name`.
    #[prop(into)]
    field_name: String,
) -> impl IntoView {
    let (dragging, set_dragging) = create_signal(false);
    let (messages, set_messages) = create_signal(Vec::<String>::new());
    let file_input = create_node_ref::<html::Input>();

    let accept = staging.with_untracked(|s| s.limits().accept_attribute());

    // Stage files and report what was refused
    let add_files = move |list: FileList| {
        let candidates = staged_files(&list);
        if candidates.is_empty() {
            // cancelled picker: keep what is already staged
            return;
        }
        let lines = staging.try_update(|s| {
            let report = s.add(candidates);
            if report.is_clean() {
                Vec::new()
            } else {
                report.messages(s.limits())
            }
        });
        set_messages.set(lines.unwrap_or_default());
    };

    let on_browse = move |ev: ev::MouseEvent| {
        ev.prevent_default();
        if let Some(input) = file_input.get() {
            input.click();
        }
    };

    let on_file_change = move |_: ev::Event| {
        let Some(input) = file_input.get() else {
            return;
        };
        if let Some(list) = input.files() {
            add_files(list);
        }
        // Reset so picking the same file again still fires `change`
        input.set_value("");
    };

    let on_drag_over = move |ev: ev::DragEvent| {
        ev.prevent_default();
        set_dragging.set(true);
    };

    let on_drag_leave = move |ev: ev::DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
    };

    let on_drop = move |ev: ev::DragEvent| {
        ev.prevent_default();
        set_dragging.set(false);
        if let Some(list) = ev.data_transfer().and_then(|dt| dt.files()) {
            add_files(list);
        }
    };

    let on_remove = move |identity: FileIdentity| {
        staging.update(|s| {
            s.remove(&identity);
        });
        // stale once the set changed
        if staging.with_untracked(|s| s.within_limits()) {
            set_messages.set(Vec::new());
        }
    };

    view! {
        <div class="form-group">
            <label class="form-label">"Attachments"</label>
            <div
                class="file-drop-area"
                id="fileDropArea"
                class:drag-over=dragging
                on:dragenter=on_drag_over
                on:dragover=on_drag_over
                on:dragleave=on_drag_leave
                on:drop=on_drop
            >
                <div class="file-display">
                    "Drag & drop files here or "
                    <a href="#" class="browse-trigger" on:click=on_browse>
                        <strong>"browse"</strong>
                    </a>
                </div>
                <input
                    type="file"
                    id="fileUpload"
                    name=field_name
                    multiple
                    accept=accept
                    style="display:none"
                    node_ref=file_input
                    on:change=on_file_change
                />
            </div>

            <Show
                when=move || !messages.get().is_empty()
                fallback=|| view! { }
            >
                <div class="error-message">
                    <For
                        each=move || messages.get()
                        key=|line| line.clone()
                        children=|line| view! { <div>{line}</div> }
                    />
                </div>
            </Show>

            <ul class="file-list">
                <For
                    each=move || staging.with(|s| s.files().to_vec())
                    key=file_key
                    children=move |file: StagedFile| {
                        let identity = file.identity();
                        view! {
                            <li class="file-item">
                                <span class="file-name">{file.name.clone()}</span>
                                <span class="file-size">{format_bytes(file.size)}</span>
                                <button
                                    type="button"
                                    class="file-remove"
                                    title="Remove"
                                    on:click=move |_| on_remove(identity.clone())
                                >
                                    "×"
                                </button>
                            </li>
                        }
                    }
                />
            </ul>

            <AttachmentSummary staging=staging/>
        </div>
    }
}
