//! The lead-intake form: text fields, multi-selects, attachments and the
//! submit button, wired to the `leadform` models.
//!
//! All state lives in signals owned by [`LeadForm`]; child components only
//! receive the signals they touch. A click anywhere on the page closes every
//! multi-select it did not land in.

use leadform::{
    send, Abort, DropdownGroup, ErrorState, FieldSpec, FormDefinition, FormValidator, FormValues,
    FormView, InputKind, StagingSet, SubmitController, SubmitOutcome,
};
use leptos::*;
use wasm_bindgen::JsCast;
use web_sys::File;

use crate::components::{FileDropZone, MultiSelectField, MULTISELECT_SELECTOR};
use crate::services::{redirect_after, BrowserTransport};
use crate::types::field_dom_id;

#[component]
pub fn LeadForm(definition: FormDefinition, validator: FormValidator) -> impl IntoView {
    // Empty values in form order, so the payload keeps the field order
    let initial_values: FormValues = definition
        .fields
        .iter()
        .map(|field| (field.name.clone(), String::new()))
        .collect();

    let values = create_rw_signal(initial_values);
    let errors = create_rw_signal(ErrorState::default());
    let dropdowns = create_rw_signal(DropdownGroup::from_specs(&definition.selects));
    let staging = create_rw_signal(StagingSet::<File>::new(definition.limits.clone()));
    let controller = create_rw_signal(SubmitController::new());
    let (notice, set_notice) = create_signal(None::<String>);

    let fields = definition.fields.clone();
    let selects = definition.selects.clone();
    let delimiter = definition.delimiter.clone();
    let file_field = definition.file_field.clone();
    let definition = store_value(definition);
    let validator = store_value(validator);

    // Close any multi-select the click did not land in. This runs before the
    // widgets' own delegated handlers, which also listen on the window.
    let page_click = window_event_listener(ev::click, move |ev| {
        let inside = clicked_multiselect(&ev);
        if dropdowns.with_untracked(|group| group.click_closes(inside.as_deref())) {
            dropdowns.update(|group| group.on_click(inside.as_deref()));
        }
    });
    on_cleanup(move || page_click.remove());

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        set_notice.set(None);

        let current_values = values.get_untracked();
        let current_dropdowns = dropdowns.get_untracked();
        let current_staging = staging.get_untracked();
        let mut current_errors = errors.get_untracked();
        let mut current_controller = controller.get_untracked();

        let prepared = definition.with_value(|definition| {
            validator.with_value(|validator| {
                let form = FormView {
                    definition,
                    validator,
                    values: &current_values,
                    dropdowns: &current_dropdowns,
                    staging: &current_staging,
                };
                current_controller.prepare(&form, &mut current_errors)
            })
        });
        errors.set(current_errors);
        controller.set(current_controller);

        match prepared {
            Ok(payload) => {
                let definition = definition.get_value();
                spawn_local(async move {
                    let result = send(&BrowserTransport, &definition, payload).await;
                    let outcome = controller.try_update(|c| c.finish(result));
                    if let Some(SubmitOutcome::Redirect(redirect)) = outcome {
                        if let Err(e) = redirect_after(&redirect.target, redirect.delay).await {
                            log::error!("{}", e);
                            controller.update(SubmitController::reset);
                            set_notice.set(Some(format!(
                                "Your submission was received, but we could not open {}.",
                                redirect.target
                            )));
                        }
                    }
                });
            }
            Err(Abort::Invalid(report)) => {
                if let Some(first) = report.first_invalid() {
                    scroll_to_field(first);
                }
            }
            Err(Abort::FileLimits) => {
                set_notice.set(Some(
                    "Attachments exceed the allowed limits. Remove some files and try again."
                        .to_string(),
                ));
            }
            Err(Abort::Busy) => {}
        }
    };

    let error_banner = move || {
        controller.with(|c| c.last_error().map(|e| e.user_message()))
    };
    let on_dismiss = move |_: ev::MouseEvent| controller.update(SubmitController::dismiss_error);

    let button_label = move || {
        controller.with(|c| definition.with_value(|d| c.button_label(d).to_string()))
    };
    let is_disabled = move || controller.with(SubmitController::is_disabled);

    let text_fields = fields
        .into_iter()
        .map(|spec| view! { <TextField spec=spec values=values errors=errors validator=validator/> })
        .collect_view();

    let select_fields = selects
        .into_iter()
        .map(|spec| {
            view! {
                <MultiSelectField
                    name=spec.name
                    label=spec.label
                    delimiter=delimiter.clone()
                    dropdowns=dropdowns
                    errors=errors
                />
            }
        })
        .collect_view();

    view! {
        <form class="lead-form" id="leadForm" novalidate on:submit=on_submit>
            {text_fields}
            {select_fields}

            <FileDropZone staging=staging field_name=file_field/>

            {move || notice.get().map(|text| view! { <div class="form-notice">{text}</div> })}

            {move || error_banner().map(|message| view! {
                <div class="submit-error" role="alert">
                    <span>{message}</span>
                    <button type="button" class="close-btn" title="Dismiss" on:click=on_dismiss>
                        "×"
                    </button>
                </div>
            })}

            <button type="submit" class="submit-btn" prop:disabled=is_disabled>
                {button_label}
            </button>
        </form>
    }
}

/// One standard input (or textarea) bound to `values`.
#[component]
fn TextField(
    spec: FieldSpec,
    values: RwSignal<FormValues>,
    errors: RwSignal<ErrorState>,
    validator: StoredValue<FormValidator>,
) -> impl IntoView {
    let name = store_value(spec.name.clone());
    let has_error = move || errors.with(|e| name.with_value(|n| e.has_error(n)));
    let current = move || values.with(|v| name.with_value(|n| v.get(n).unwrap_or("").to_string()));

    // Live input only ever clears an error; flagging waits for submit.
    let on_input = move |ev: ev::Event| {
        let value = event_target_value(&ev);
        let n = name.get_value();
        values.update(|v| v.set(n.clone(), value.clone()));
        let needs_clear = errors.with_untracked(|e| e.has_error(&n));
        if needs_clear {
            errors.update(|e| {
                validator.with_value(|rules| rules.revalidate_field(&n, &value, e));
            });
        }
    };

    let label = if spec.required {
        format!("{} *", spec.label)
    } else {
        spec.label.clone()
    };
    let id = field_dom_id(&spec.name);
    let placeholder = spec.placeholder.clone().unwrap_or_default();

    let control = match spec.input {
        InputKind::Textarea => view! {
            <textarea
                id=id.clone()
                name=spec.name.clone()
                class="form-input"
                class:error=has_error
                placeholder=placeholder
                rows="5"
                prop:value=current
                on:input=on_input
            ></textarea>
        }
        .into_view(),
        kind => view! {
            <input
                id=id.clone()
                type=kind.html_type()
                name=spec.name.clone()
                class="form-input"
                class:error=has_error
                placeholder=placeholder
                prop:value=current
                on:input=on_input
            />
        }
        .into_view(),
    };

    view! {
        <div class="form-group">
            <label class="form-label" for=id>{label}</label>
            {control}
        </div>
    }
}

/// Name of the multi-select containing the click target, if any.
fn clicked_multiselect(ev: &ev::MouseEvent) -> Option<String> {
    let target = ev.target()?.dyn_into::<web_sys::Element>().ok()?;
    target
        .closest(MULTISELECT_SELECTOR)
        .ok()
        .flatten()?
        .get_attribute("data-name")
}

fn scroll_to_field(name: &str) {
    match document().get_element_by_id(&field_dom_id(name)) {
        Some(element) => element.scroll_into_view(),
        None => log::warn!("No element for invalid field '{}'", name),
    }
}
