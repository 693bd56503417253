//! Checkbox-list dropdown bound to one [`MultiSelect`] of the form's
//! [`DropdownGroup`].
//!
//! Button text, hidden value and error indicator are derived from the
//! model on every render. Checkboxes are driven through `prop:checked`, so
//! a browser restoring stale checked state from its page cache cannot
//! desynchronise them from the model.

use leadform::{DropdownGroup, ErrorState, MultiSelect};
use leptos::*;

use crate::types::field_dom_id;

/// Matches a widget's root element; its `data-name` is the field name.
pub const MULTISELECT_SELECTOR: &str = ".multiselect-dropdown[data-name]";

#[component]
pub fn MultiSelectField(
    /// Field name, also the name of the hidden input.
    #[prop(into)]
    name: String,
    #[prop(into)]
    label: String,
    /// Serialized-value separator.
    #[prop(into)]
    delimiter: String,
    dropdowns: RwSignal<DropdownGroup>,
    errors: RwSignal<ErrorState>,
) -> impl IntoView {
    let name = store_value(name);
    let delimiter = store_value(delimiter);

    // Read one widget of the group.
    let with_widget = move |f: &dyn Fn(&MultiSelect) -> String| {
        dropdowns.with(|group| {
            name.with_value(|n| group.get(n).map(f).unwrap_or_default())
        })
    };
    let is_open = move || {
        dropdowns.with(|group| name.with_value(|n| group.get(n).is_some_and(MultiSelect::is_open)))
    };
    let has_selection = move || {
        dropdowns.with(|group| {
            name.with_value(|n| group.get(n).is_some_and(MultiSelect::has_selection))
        })
    };
    let display_text = move || with_widget(&|w| w.display_text());
    let serialized = move || delimiter.with_value(|d| with_widget(&|w| w.serialized(d)));
    let has_error = move || errors.with(|e| name.with_value(|n| e.has_error(n)));

    let options = dropdowns
        .with_untracked(|group| name.with_value(|n| group.get(n).map(|w| w.options().to_vec())))
        .unwrap_or_default();

    let on_toggle = move |ev: ev::MouseEvent| {
        ev.prevent_default();
        dropdowns.update(|group| name.with_value(|n| group.toggle(n)));
    };

    let on_checkbox = move |value: String, checked: bool| {
        let required_error = dropdowns.try_update(|group| {
            let n = name.get_value();
            group.set_selected(&n, &value, checked);
            group
                .get(&n)
                .filter(|w| w.required())
                .map(MultiSelect::has_error)
        });
        if let Some(Some(error)) = required_error {
            errors.update(|e| name.with_value(|n| e.set(n, error)));
        }
    };

    let options_view = options
        .into_iter()
        .map(|option| {
            let value = store_value(option.value.clone());
            let checked = move || {
                dropdowns.with(|group| {
                    name.with_value(|n| {
                        value.with_value(|v| group.get(n).is_some_and(|w| w.is_selected(v)))
                    })
                })
            };
            view! {
                <label>
                    <input
                        type="checkbox"
                        value=option.value
                        prop:checked=checked
                        on:change=move |ev| on_checkbox(value.get_value(), event_target_checked(&ev))
                    />
                    {option.label}
                </label>
            }
        })
        .collect_view();

    view! {
        <div class="form-group">
            <label class="form-label">{label}</label>
            <div
                class="multiselect-dropdown"
                class:open=is_open
                data-name=name.get_value()
            >
                <button
                    type="button"
                    class="dropdown-btn"
                    id=name.with_value(|n| field_dom_id(n))
                    class:has-selection=has_selection
                    class:error=has_error
                    on:click=on_toggle
                >
                    {display_text}
                </button>
                <div class="dropdown-list">{options_view}</div>
                <input type="hidden" name=name.get_value() prop:value=serialized/>
            </div>
        </div>
    }
}
