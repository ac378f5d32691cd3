//! Blob and object URL helpers.
//!
//! Thumbnails and crop sources are shown through `blob:` URLs. Each URL
//! is owned by a [`BlobUrl`], which revokes it when dropped.

use batchstamp_core::RgbaImage;
use image::ImageEncoder;
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

/// Errors that can occur while creating a Blob URL.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    /// A browser API call returned an error.
    #[error("browser API error: {0}")]
    JsError(String),
}

impl From<JsValue> for RasterError {
    fn from(value: JsValue) -> Self {
        Self::JsError(format!("{value:?}"))
    }
}

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        Self::PngEncode(err.to_string())
    }
}

/// Wrap `bytes` in a `Blob` of the given MIME type.
///
/// # Errors
///
/// Returns the browser's exception if the `Blob` cannot be constructed.
pub fn bytes_to_blob(bytes: &[u8], mime_type: &str) -> Result<web_sys::Blob, JsValue> {
    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let opts = BlobPropertyBag::new();
    opts.set_type(mime_type);
    web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
}

/// An object URL revoked on drop.
#[derive(Debug, PartialEq, Eq)]
pub struct BlobUrl(String);

impl BlobUrl {
    /// Create an object URL for `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::JsError`] if Blob or URL creation fails.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, RasterError> {
        let blob = bytes_to_blob(bytes, mime_type)?;
        Ok(Self(web_sys::Url::create_object_url_with_blob(&blob)?))
    }

    /// Encode `image` as PNG and create an object URL for it.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::PngEncode`] if PNG encoding fails, or
    /// [`RasterError::JsError`] if Blob or URL creation fails.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self, RasterError> {
        let mut png_bytes = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png_bytes).write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )?;
        Self::from_bytes(&png_bytes, "image/png")
    }

    /// The `blob:` URL, for use as an `<img src>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Drop for BlobUrl {
    fn drop(&mut self) {
        revoke_blob_url(&self.0);
    }
}

/// Revoke an object URL.
///
/// Best-effort: the URL may already be gone.
pub fn revoke_blob_url(url: &str) {
    let _ = web_sys::Url::revoke_object_url(url);
}
