//! Form submission over `fetch`, plus the post-success redirect.

use std::time::Duration;

use gloo_net::http::Request;
use leadform::{Part, Payload, RawResponse, Transport, TransportError, TransportResult};
use web_sys::{File, FormData};

/// Posts payloads as `multipart/form-data`. The browser sets the
/// content type and boundary itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserTransport;

fn form_data(payload: &Payload<File>) -> TransportResult<FormData> {
    let form_data = FormData::new()
        .map_err(|e| TransportError::Request(format!("Failed to create FormData: {:?}", e)))?;

    for part in payload.parts() {
        let (name, appended) = match part {
            Part::Text { name, value } => (name, form_data.append_with_str(name, value)),
            Part::File { name, file } => (
                name,
                form_data.append_with_blob_and_filename(name, &file.payload, &file.name),
            ),
        };
        appended.map_err(|e| {
            TransportError::Request(format!("Failed to append '{}': {:?}", name, e))
        })?;
    }

    Ok(form_data)
}

impl Transport<File> for BrowserTransport {
    async fn post(&self, endpoint: &str, payload: Payload<File>) -> TransportResult<RawResponse> {
        let request = Request::post(endpoint)
            .body(form_data(&payload)?)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::debug!("Webhook answered {} ({} bytes)", status, body.len());

        Ok(RawResponse { status, body })
    }
}

/// Wait `delay`, then navigate to `target`.
pub async fn redirect_after(target: &str, delay: Duration) -> Result<(), String> {
    gloo_timers::future::sleep(delay).await;

    let window = web_sys::window().ok_or_else(|| "No window to redirect from".to_string())?;
    window
        .location()
        .set_href(target)
        .map_err(|e| format!("Redirect to {} failed: {:?}", target, e))
}
