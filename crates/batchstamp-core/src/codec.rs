//! Image decoding and JPEG encoding.
//!
//! Accepts whatever the `image` crate can decode (PNG, JPEG, BMP, WebP)
//! and produces JPEG output for exports and cropped replacements.

use image::{DynamicImage, ImageEncoder, RgbImage};

use crate::types::{BatchError, SelectedFile};

/// Decode a selected file into an image.
///
/// # Errors
///
/// Returns [`BatchError::DecodeFailure`] if the file is empty or the
/// format is unrecognized or corrupt.
pub fn decode(file: &SelectedFile) -> Result<DynamicImage, BatchError> {
    if file.bytes().is_empty() {
        return Err(BatchError::decode(file.name(), "file is empty"));
    }

    image::load_from_memory(file.bytes()).map_err(|e| BatchError::decode(file.name(), e))
}

/// Encode an RGB canvas as JPEG at the given quality (1-100).
///
/// # Errors
///
/// Returns [`BatchError::EncodeFailure`] naming `name` if encoding fails
/// (e.g. the canvas exceeds JPEG's 65535 pixel dimension limit).
pub fn encode_jpeg(canvas: &RgbImage, quality: u8, name: &str) -> Result<Vec<u8>, BatchError> {
    let mut bytes = Vec::new();
    let encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    encoder
        .write_image(
            canvas.as_raw(),
            canvas.width(),
            canvas.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| BatchError::encode(name, e))?;
    Ok(bytes)
}

/// Flatten a decoded image onto an RGB canvas of its native size.
///
/// Alpha is discarded; JPEG has no transparency.
#[must_use]
pub fn to_canvas(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}
