//! Multipart upload to the processing endpoint via `fetch`.

use batchstamp_core::{BatchError, EndpointResponse, ProcessingEndpoint, RemoteRequest};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::raster;

/// Errors that can occur while talking to the endpoint.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A browser API call returned an error (including network failure).
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for FetchError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<FetchError> for BatchError {
    fn from(err: FetchError) -> Self {
        Self::RemoteProcessingFailure(err.to_string())
    }
}

/// [`ProcessingEndpoint`] backed by `window.fetch`.
///
/// Each file becomes one `Blob` part carrying its MIME type and original
/// filename, all under the request's field name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchEndpoint;

impl ProcessingEndpoint for FetchEndpoint {
    #[allow(clippy::future_not_send)]
    async fn process(&self, request: &RemoteRequest) -> Result<EndpointResponse, BatchError> {
        Ok(send(request).await?)
    }
}

#[allow(clippy::future_not_send)]
async fn send(request: &RemoteRequest) -> Result<EndpointResponse, FetchError> {
    let window = web_sys::window().ok_or_else(|| FetchError::JsError("no global window".into()))?;

    let form = web_sys::FormData::new()?;
    for part in &request.parts {
        let blob = raster::bytes_to_blob(part.bytes(), part.mime_type())?;
        form.append_with_blob_and_filename(&request.field, &blob, part.name())?;
    }

    let init = web_sys::RequestInit::new();
    init.set_method("POST");
    init.set_body(&form);

    let response: web_sys::Response =
        JsFuture::from(window.fetch_with_str_and_init(&request.url, &init))
            .await?
            .dyn_into()?;
    let status = response.status();
    tracing::debug!(status, url = %request.url, "endpoint responded");

    // Error bodies are never surfaced, so only read the archive.
    let body = if response.ok() {
        let buffer = JsFuture::from(response.array_buffer()?).await?;
        js_sys::Uint8Array::new(&buffer).to_vec()
    } else {
        Vec::new()
    };

    Ok(EndpointResponse { status, body })
}
