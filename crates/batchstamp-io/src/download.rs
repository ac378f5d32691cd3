//! File download via Blob URLs.
//!
//! Dioxus has no built-in file download API. Downloads are triggered by
//! wrapping the bytes in a `Blob`, creating an object URL, and clicking a
//! temporary `<a download>` element.
//!
//! Everything here needs a browser (`wasm32-unknown-unknown`).

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;

use crate::raster;

/// MIME type of both downloadable archives.
pub const ZIP_MIME: &str = "application/zip";

/// Errors that can occur when triggering a file download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for DownloadError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

/// Offer `data` to the user as a file called `filename`.
///
/// # Errors
///
/// Returns [`DownloadError::JsError`] if any browser API call fails
/// (`Blob` creation, `URL.createObjectURL`, element creation).
pub fn trigger_download(data: &[u8], filename: &str, mime_type: &str) -> Result<(), DownloadError> {
    let window =
        web_sys::window().ok_or_else(|| DownloadError::JsError("no global window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| DownloadError::JsError("no document".into()))?;

    let blob = raster::bytes_to_blob(data, mime_type)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|e| DownloadError::JsError(format!("failed to cast element: {e:?}")))?;
    anchor.set_href(&url);
    anchor.set_download(filename);

    let body = document
        .body()
        .ok_or_else(|| DownloadError::JsError("no document body".into()))?;
    body.append_child(&anchor)?;
    anchor.click();

    // The download has started; cleanup failures are not download failures.
    let _ = body.remove_child(&anchor);
    raster::revoke_blob_url(&url);

    tracing::info!(filename, bytes = data.len(), "download triggered");
    Ok(())
}
