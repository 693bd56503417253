//! Native multipart transport built on `reqwest`.

use reqwest::multipart::{Form, Part as MultipartPart};
use reqwest::Client;

use super::{Part, Payload, RawResponse, Transport};
use crate::error::{TransportError, TransportResult};

/// Posts payloads whose files are held in memory as bytes.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn multipart_form(payload: Payload<Vec<u8>>) -> TransportResult<Form> {
    let mut form = Form::new();
    for part in payload.into_parts() {
        form = match part {
            Part::Text { name, value } => form.text(name, value),
            Part::File { name, file } => {
                let part = MultipartPart::bytes(file.payload)
                    .file_name(file.name)
                    .mime_str(&file.media_type)
                    .map_err(|e| TransportError::Request(e.to_string()))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

impl Transport<Vec<u8>> for HttpTransport {
    async fn post(&self, endpoint: &str, payload: Payload<Vec<u8>>) -> TransportResult<RawResponse> {
        let form = multipart_form(payload)?;

        let response = self
            .client
            .post(endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    TransportError::Request(e.to_string())
                } else {
                    TransportError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        // An unreadable body is treated like an empty one.
        let body = response.text().await.unwrap_or_default();
        log::debug!("Endpoint answered HTTP {} ({} bytes)", status, body.len());

        Ok(RawResponse { status, body })
    }
}
