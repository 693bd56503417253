//! Form submission.
//!
//! # Flow
//!
//! ```text
//! ┌──────┐  prepare   ┌────────────┐  send + finish  ┌───────────┐
//! │ Idle │──────────▶│ Submitting │───────────────▶│ Succeeded │──▶ redirect
//! └──────┘            └────────────┘                 └───────────┘
//!    ▲                      │ transport error / non-2xx
//!    └──────────────────────┘ (error kept for display, no retry)
//! ```
//!
//! Submission is split in three steps so a UI can hold the controller in
//! reactive state without borrowing it across the network call:
//!
//! 1. [`SubmitController::prepare`] validates, checks attachment limits,
//!    moves to `Submitting` and assembles the [`Payload`].
//! 2. [`send`] performs exactly one request through a [`Transport`] and
//!    interprets the response.
//! 3. [`SubmitController::finish`] records the outcome.
//!
//! [`SubmitController::submit`] chains the three for callers that own the
//! controller, such as the command-line tool.

#[cfg(feature = "cli")]
pub mod http;

use std::time::Duration;

use serde_json::Value;

use crate::config::FormDefinition;
use crate::error::{SubmitError, TransportResult};
use crate::multiselect::DropdownGroup;
use crate::staging::{AttachedFile, StagingSet};
use crate::validation::{ErrorState, FormValidator, FormValues, ValidationReport};

// =============================================================================
// Payload
// =============================================================================

/// One entry of the multipart body.
#[derive(Clone, Debug, PartialEq)]
pub enum Part<P> {
    Text { name: String, value: String },
    File { name: String, file: AttachedFile<P> },
}

/// The outgoing multipart body, in order: field values, then files.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload<P> {
    parts: Vec<Part<P>>,
}

impl<P> Payload<P> {
    pub fn parts(&self) -> &[Part<P>] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<Part<P>> {
        self.parts
    }

    /// Value of a text entry.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            Part::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Files sent under `field`.
    pub fn files<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a AttachedFile<P>> + 'a {
        self.parts.iter().filter_map(move |part| match part {
            Part::File { name, file } if name == field => Some(file),
            _ => None,
        })
    }
}

/// Assemble the body from field values and staged files.
pub fn build_payload<P: Clone>(
    values: &FormValues,
    staging: &StagingSet<P>,
    file_field: &str,
) -> Payload<P> {
    let text = values.iter().map(|(name, value)| Part::Text {
        name: name.to_string(),
        value: value.to_string(),
    });
    let files = staging.files().iter().map(|file| Part::File {
        name: file_field.to_string(),
        file: file.clone(),
    });
    Payload {
        parts: text.chain(files).collect(),
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Status and body of the endpoint's response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the single outbound POST.
///
/// Implementations only fail when no response was received; any HTTP
/// status is returned as a [`RawResponse`].
#[allow(async_fn_in_trait)]
pub trait Transport<P> {
    async fn post(&self, endpoint: &str, payload: Payload<P>) -> TransportResult<RawResponse>;
}

/// Fields the endpoint may put in its JSON body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseBody {
    pub redirect: Option<String>,
    pub status: Option<String>,
}

/// Read `redirect` and `status` from a response body.
///
/// Empty, non-JSON and non-object bodies, and fields of the wrong type,
/// all degrade to "not present".
pub fn parse_response_body(body: &str) -> ResponseBody {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return ResponseBody::default();
    };
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    ResponseBody {
        redirect: field("redirect"),
        status: field("status"),
    }
}

/// Where to go after a successful submission, and when.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub target: String,
    pub delay: Duration,
    /// `status` reported by the endpoint, if any.
    pub status: Option<String>,
}

/// Post `payload` once and interpret the response.
pub async fn send<P, T: Transport<P>>(
    transport: &T,
    definition: &FormDefinition,
    payload: Payload<P>,
) -> Result<Redirect, SubmitError> {
    log::info!("Submitting form to {}", definition.endpoint);
    let response = transport.post(&definition.endpoint, payload).await?;

    if !response.is_success() {
        return Err(SubmitError::Status {
            status: response.status,
            body: response.body,
        });
    }

    let body = parse_response_body(&response.body);
    if let Some(status) = &body.status {
        log::debug!("Endpoint reported status '{}'", status);
    }
    Ok(Redirect {
        target: body
            .redirect
            .unwrap_or_else(|| definition.default_redirect.clone()),
        delay: Duration::from_millis(definition.redirect_delay_ms),
        status: body.status,
    })
}

// =============================================================================
// Controller
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    /// Waiting for the redirect to happen.
    Succeeded,
}

/// Why a submission was not attempted.
#[derive(Clone, Debug, PartialEq)]
pub enum Abort {
    /// A request is already in flight.
    Busy,
    /// Some fields failed validation.
    Invalid(ValidationReport),
    /// Staged files break the count or total cap.
    FileLimits,
}

/// Everything the controller reads from the form.
pub struct FormView<'a, P> {
    pub definition: &'a FormDefinition,
    pub validator: &'a FormValidator,
    pub values: &'a FormValues,
    pub dropdowns: &'a DropdownGroup,
    pub staging: &'a StagingSet<P>,
}

impl<P> FormView<'_, P> {
    /// Standard values plus every multi-select's serialized value.
    pub fn merged_values(&self) -> FormValues {
        let mut merged = self.values.clone();
        for (name, value) in self.dropdowns.serialized_values(&self.definition.delimiter) {
            merged.set(name, value);
        }
        merged
    }
}

/// What [`SubmitController::submit`] ended with.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Redirect(Redirect),
    Failed(SubmitError),
    Aborted(Abort),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmitController {
    state: SubmitState,
    last_error: Option<SubmitError>,
}

impl SubmitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    /// Submit control is disabled while a request is in flight or the
    /// page is about to navigate away.
    pub fn is_disabled(&self) -> bool {
        self.state != SubmitState::Idle
    }

    pub fn button_label<'a>(&self, definition: &'a FormDefinition) -> &'a str {
        match self.state {
            SubmitState::Idle => &definition.submit_label,
            SubmitState::Submitting => &definition.submitting_label,
            SubmitState::Succeeded => &definition.success_label,
        }
    }

    /// Error from the last failed attempt, until dismissed.
    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Validate the form and, if it may be sent, enter `Submitting` and
    /// return the payload. On abort the controller stays idle.
    pub fn prepare<P: Clone>(
        &mut self,
        form: &FormView<'_, P>,
        errors: &mut ErrorState,
    ) -> Result<Payload<P>, Abort> {
        if self.state != SubmitState::Idle {
            log::debug!("Submit ignored, state is {:?}", self.state);
            return Err(Abort::Busy);
        }

        let values = form.merged_values();
        let report = form.validator.validate(&values, errors);
        if !report.is_valid() {
            return Err(Abort::Invalid(report));
        }
        if !form.staging.within_limits() {
            log::warn!("Submit blocked, attachments exceed limits");
            return Err(Abort::FileLimits);
        }

        self.state = SubmitState::Submitting;
        self.last_error = None;
        Ok(build_payload(&values, form.staging, &form.definition.file_field))
    }

    /// Record the result of [`send`].
    pub fn finish(&mut self, result: Result<Redirect, SubmitError>) -> SubmitOutcome {
        match result {
            Ok(redirect) => {
                log::info!("Submission accepted, redirecting to {}", redirect.target);
                self.state = SubmitState::Succeeded;
                SubmitOutcome::Redirect(redirect)
            }
            Err(error) => {
                log::error!("Submission failed: {}", error);
                self.state = SubmitState::Idle;
                self.last_error = Some(error.clone());
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Back to idle, e.g. when a pending redirect was cancelled by the page.
    pub fn reset(&mut self) {
        self.state = SubmitState::Idle;
    }

    /// Prepare, send and finish in one call.
    pub async fn submit<P: Clone, T: Transport<P>>(
        &mut self,
        form: &FormView<'_, P>,
        errors: &mut ErrorState,
        transport: &T,
    ) -> SubmitOutcome {
        match self.prepare(form, errors) {
            Ok(payload) => {
                let result = send(transport, form.definition, payload).await;
                self.finish(result)
            }
            Err(abort) => SubmitOutcome::Aborted(abort),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use futures::executor::block_on;

    use super::*;
    use crate::error::TransportError;
    use crate::multiselect::MultiSelect;

    /// Records payloads and answers with a canned response.
    struct CannedTransport {
        response: TransportResult<RawResponse>,
        sent: RefCell<Vec<(String, Payload<Vec<u8>>)>>,
    }

    impl CannedTransport {
        fn answering(status: u16, body: &str) -> Self {
            Self {
                response: Ok(RawResponse { status, body: body.to_string() }),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                response: Err(TransportError::Network("connection refused".into())),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn requests(&self) -> usize {
            self.sent.borrow().len()
        }
    }

    impl Transport<Vec<u8>> for CannedTransport {
        async fn post(&self, endpoint: &str, payload: Payload<Vec<u8>>) -> TransportResult<RawResponse> {
            self.sent.borrow_mut().push((endpoint.to_string(), payload));
            self.response.clone()
        }
    }

    struct Form {
        definition: FormDefinition,
        validator: FormValidator,
        values: FormValues,
        dropdowns: DropdownGroup,
        staging: StagingSet<Vec<u8>>,
    }

    impl Form {
        fn new() -> Self {
            let definition = FormDefinition::from_json_str(
                r#"{
                    "endpoint": "https://hooks.example.com/lead",
                    "fileField": "files",
                    "delimiter": ",",
                    "limits": { "allowedTypes": ["application/pdf"], "maxTotalSize": 100 },
                    "fields": [{ "name": "company", "required": true }],
                    "selects": [{ "name": "services", "placeholder": "Pick", "required": true,
                                  "options": [{ "label": "X" }, { "label": "Y" }, { "label": "Z" }] }]
                }"#,
            )
            .unwrap();
            Self {
                validator: FormValidator::from_definition(&definition).unwrap(),
                values: FormValues::new(),
                dropdowns: DropdownGroup::from_specs(&definition.selects),
                staging: StagingSet::new(definition.limits.clone()),
                definition,
            }
        }

        fn filled() -> Self {
            let mut form = Self::new();
            form.values.set("company", "Acme");
            form.dropdowns.set_selected("services", "X", true);
            form.dropdowns.set_selected("services", "Y", true);
            form.staging.add(vec![AttachedFile::new(
                "brief.pdf",
                3,
                "application/pdf",
                b"%PD".to_vec(),
            )]);
            form
        }

        fn view(&self) -> FormView<'_, Vec<u8>> {
            FormView {
                definition: &self.definition,
                validator: &self.validator,
                values: &self.values,
                dropdowns: &self.dropdowns,
                staging: &self.staging,
            }
        }
    }

    #[test]
    fn test_payload_contains_fields_selection_and_files() {
        let form = Form::filled();
        let transport = CannedTransport::answering(200, "");
        let mut controller = SubmitController::new();
        let mut errors = ErrorState::default();

        block_on(controller.submit(&form.view(), &mut errors, &transport));

        let sent = transport.sent.borrow();
        let (endpoint, payload) = &sent[0];
        assert_eq!(endpoint, "https://hooks.example.com/lead");
        assert_eq!(payload.text("company"), Some("Acme"));
        assert_eq!(payload.text("services"), Some("X,Y"));
        let files: Vec<_> = payload.files("files").collect();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "brief.pdf");
        assert_eq!(files[0].payload, b"%PD".to_vec());
    }

    #[test]
    fn test_success_with_redirect() {
        let form = Form::filled();
        let transport = CannedTransport::answering(200, r#"{"redirect":"/ok","status":"received"}"#);
        let mut controller = SubmitController::new();

        let outcome = block_on(controller.submit(&form.view(), &mut ErrorState::default(), &transport));

        let SubmitOutcome::Redirect(redirect) = outcome else {
            panic!("expected redirect, got {outcome:?}");
        };
        assert_eq!(redirect.target, "/ok");
        assert_eq!(redirect.delay, Duration::from_millis(800));
        assert_eq!(redirect.status.as_deref(), Some("received"));
        assert_eq!(controller.state(), SubmitState::Succeeded);
        assert!(controller.is_disabled());
        assert_eq!(controller.button_label(&form.definition), "Submitted!");
    }

    #[test]
    fn test_reset_after_failed_navigation_reenables_submit() {
        let form = Form::filled();
        let transport = CannedTransport::answering(200, r#"{"redirect":"/ok"}"#);
        let mut controller = SubmitController::new();
        let mut errors = ErrorState::default();

        block_on(controller.submit(&form.view(), &mut errors, &transport));
        assert_eq!(controller.state(), SubmitState::Succeeded);
        assert!(matches!(controller.prepare(&form.view(), &mut errors), Err(Abort::Busy)));

        controller.reset();
        assert_eq!(controller.state(), SubmitState::Idle);
        assert!(!controller.is_disabled());
        assert_eq!(controller.button_label(&form.definition), "Submit Opportunity");
        assert!(controller.prepare(&form.view(), &mut errors).is_ok());
    }

    #[test]
    fn test_success_with_empty_body_uses_default_page() {
        let form = Form::filled();
        for body in ["", "OK", "[1, 2]", r#"{"redirect": 42}"#, r#"{"redirect": ""}"#] {
            let transport = CannedTransport::answering(200, body);
            let outcome = block_on(SubmitController::new().submit(
                &form.view(),
                &mut ErrorState::default(),
                &transport,
            ));
            match outcome {
                SubmitOutcome::Redirect(r) => assert_eq!(r.target, "thank-you.html", "body {body:?}"),
                other => panic!("unexpected outcome {other:?} for body {body:?}"),
            }
        }
    }

    #[test]
    fn test_non_success_status_fails_without_redirect() {
        let form = Form::filled();
        let transport = CannedTransport::answering(500, r#"{"redirect":"/ok"}"#);
        let mut controller = SubmitController::new();

        let outcome = block_on(controller.submit(&form.view(), &mut ErrorState::default(), &transport));

        assert!(matches!(
            outcome,
            SubmitOutcome::Failed(SubmitError::Status { status: 500, .. })
        ));
        assert_eq!(controller.state(), SubmitState::Idle);
        assert!(!controller.is_disabled());
        assert_eq!(controller.button_label(&form.definition), "Submit Opportunity");
        assert!(controller.last_error().is_some());

        controller.dismiss_error();
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn test_transport_failure_returns_to_idle() {
        let form = Form::filled();
        let transport = CannedTransport::failing();
        let mut controller = SubmitController::new();

        let outcome = block_on(controller.submit(&form.view(), &mut ErrorState::default(), &transport));

        assert!(matches!(outcome, SubmitOutcome::Failed(SubmitError::Transport(_))));
        assert_eq!(controller.state(), SubmitState::Idle);
        // exactly one attempt, no retry
        assert_eq!(transport.requests(), 1);
    }

    #[test]
    fn test_invalid_form_makes_no_request() {
        let mut form = Form::filled();
        form.values.set("company", "");
        let transport = CannedTransport::answering(200, "");
        let mut controller = SubmitController::new();
        let mut errors = ErrorState::default();

        let outcome = block_on(controller.submit(&form.view(), &mut errors, &transport));

        let SubmitOutcome::Aborted(Abort::Invalid(report)) = outcome else {
            panic!("expected validation abort");
        };
        assert_eq!(report.first_invalid(), Some("company"));
        assert!(errors.has_error("company"));
        assert!(!errors.has_error("services"));
        assert_eq!(transport.requests(), 0);
        assert_eq!(controller.state(), SubmitState::Idle);
    }

    #[test]
    fn test_file_limits_block_submission() {
        let mut form = Form::filled();
        form.staging.add(vec![AttachedFile::new("huge.pdf", 200, "application/pdf", Vec::new())]);
        let transport = CannedTransport::answering(200, "");
        let mut controller = SubmitController::new();

        let outcome = block_on(controller.submit(&form.view(), &mut ErrorState::default(), &transport));

        assert_eq!(outcome, SubmitOutcome::Aborted(Abort::FileLimits));
        assert_eq!(transport.requests(), 0);
        assert_eq!(controller.state(), SubmitState::Idle);
    }

    #[test]
    fn test_overlapping_submissions_are_refused() {
        let form = Form::filled();
        let mut controller = SubmitController::new();
        let mut errors = ErrorState::default();

        assert!(controller.prepare(&form.view(), &mut errors).is_ok());
        assert_eq!(controller.state(), SubmitState::Submitting);
        assert_eq!(controller.button_label(&form.definition), "Submitting...");
        assert_eq!(controller.prepare(&form.view(), &mut errors), Err(Abort::Busy));
    }

    #[test]
    fn test_merged_values_replace_stale_entries() {
        let mut form = Form::filled();
        form.values.set("services", "stale");
        let merged = form.view().merged_values();
        assert_eq!(merged.get("services"), Some("X,Y"));
    }

    #[test]
    fn test_parse_response_body() {
        assert_eq!(parse_response_body(""), ResponseBody::default());
        assert_eq!(parse_response_body("<html>"), ResponseBody::default());
        assert_eq!(
            parse_response_body(r#"{"status":"received"}"#),
            ResponseBody { redirect: None, status: Some("received".into()) }
        );
        assert_eq!(
            parse_response_body(r#"{"redirect":" /thanks "}"#).redirect.as_deref(),
            Some("/thanks")
        );
    }

    #[test]
    fn test_selection_after_widget_reset_serializes_empty() {
        let mut form = Form::filled();
        if let Some(select) = form.dropdowns.get_mut("services") {
            select.clear();
        }
        let mut errors = ErrorState::default();
        let result = SubmitController::new().prepare(&form.view(), &mut errors);
        assert!(matches!(result, Err(Abort::Invalid(_))));
        assert!(errors.has_error("services"));
        assert!(form.dropdowns.get("services").is_some_and(MultiSelect::has_error));
    }
}
