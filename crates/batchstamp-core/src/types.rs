//! Shared types for batchstamp.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can reference decoded
/// thumbnails and crop sources without depending on `image` directly.
pub use image::RgbaImage;

/// One user-chosen image awaiting processing.
///
/// The payload is reference counted so snapshots of the collection
/// (taken before an export run yields to the event loop) are cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    mime_type: String,
    last_modified: u64,
    bytes: Rc<[u8]>,
}

impl SelectedFile {
    /// Create a selected file from its raw bytes.
    ///
    /// `last_modified` is milliseconds since the Unix epoch.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        last_modified: u64,
        bytes: impl Into<Rc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            last_modified,
            bytes: bytes.into(),
        }
    }

    /// Display name, as chosen by the user.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// MIME type of the payload (e.g. `image/jpeg`).
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Last-modified timestamp in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn last_modified(&self) -> u64 {
        self.last_modified
    }

    /// Raw encoded image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Guess an image MIME type from a filename's extension.
///
/// Falls back to `application/octet-stream` for unknown extensions.
#[must_use]
pub fn mime_type_for(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map_or("", |(_, ext)| ext);
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// One rendered image produced by the local export pipeline.
///
/// `data_url` holds the JPEG payload in `data:image/jpeg;base64,...`
/// form; the archive packager decodes it back to bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    /// Original name of the source file.
    pub name: String,
    /// Encoded image as a base64 data URL.
    pub data_url: String,
}

/// Tunables for a batchstamp session.
///
/// Every field has a default matching the deployed web app, and
/// missing fields fall back to those defaults when deserializing.
/// The 25-image cap and caption geometry are fixed constants
/// ([`crate::collection::MAX_FILES`], [`crate::caption`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// URL of the remote blur/resize endpoint.
    pub remote_endpoint: String,

    /// Multipart field name under which every file is uploaded.
    pub remote_field: String,

    /// Download name for the archive returned by the remote endpoint.
    pub remote_archive_name: String,

    /// Download name for the locally packaged archive.
    pub local_archive_name: String,

    /// Prefix prepended to each entry name in the local archive.
    pub entry_prefix: String,

    /// Longest edge of preview thumbnails, in pixels.
    pub thumbnail_max_edge: u32,

    /// JPEG quality (1-100) used for local exports and cropped images.
    pub jpeg_quality: u8,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            remote_endpoint: "/process_blur_resize".to_owned(),
            remote_field: "images".to_owned(),
            remote_archive_name: "imagens_borradas_redimensionadas.zip".to_owned(),
            local_archive_name: "processed_images.zip".to_owned(),
            entry_prefix: "processed_".to_owned(),
            thumbnail_max_edge: 240,
            jpeg_quality: 90,
        }
    }
}

/// Errors that can occur while managing or exporting a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchError {
    /// Adding the files would push the batch past its size limit.
    /// Nothing was added.
    #[error("the total number of images cannot exceed {max} ({current} selected, {adding} added)")]
    CapacityExceeded {
        /// Files already in the collection.
        current: usize,
        /// Files the rejected add tried to append.
        adding: usize,
        /// Maximum collection size.
        max: usize,
    },

    /// A file could not be decoded as an image.
    #[error("failed to decode {name}: {reason}")]
    DecodeFailure {
        /// Name of the offending file.
        name: String,
        /// Decoder message.
        reason: String,
    },

    /// An image could not be encoded.
    #[error("failed to encode {name}: {reason}")]
    EncodeFailure {
        /// Name of the image being encoded.
        name: String,
        /// Encoder message.
        reason: String,
    },

    /// The remote processing endpoint failed or was unreachable.
    #[error("remote processing failed: {0}")]
    RemoteProcessingFailure(String),

    /// An operation referenced state that no longer exists, such as an
    /// index past the end of the collection.
    #[error("invalid batch state: {0}")]
    ResourceState(String),

    /// The export was already running.
    #[error("an export is already in progress")]
    Busy,

    /// The export was requested with no images selected.
    #[error("there are no images to export")]
    NothingToExport,
}

impl BatchError {
    /// Build a [`BatchError::DecodeFailure`] from any displayable cause.
    pub fn decode(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::DecodeFailure {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`BatchError::EncodeFailure`] from any displayable cause.
    pub fn encode(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::EncodeFailure {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`BatchError::ResourceState`] for an out-of-range index.
    #[must_use]
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::ResourceState(format!("index {index} is out of bounds for {len} images"))
    }
}
