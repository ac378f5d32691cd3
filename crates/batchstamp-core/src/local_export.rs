//! Local export: re-encode every selected file as a captioned JPEG.
//!
//! For each file, in collection order:
//!
//! 1. Decode and draw onto a canvas of the image's native size
//! 2. Stamp the caption, if one was given ([`crate::caption`])
//! 3. Encode as JPEG
//! 4. Stage `{name, data URL}`
//!
//! The run is all-or-nothing: the first failing item aborts it and
//! nothing is staged. Items are processed one at a time so only one
//! full-size canvas is alive at once.

use crate::caption::{self, Caption};
use crate::codec;
use crate::data_url;
use crate::gate::ExportGate;
use crate::types::{BatchError, ProcessedImage, SelectedFile};

/// MIME type of every local export payload.
pub const OUTPUT_MIME: &str = "image/jpeg";

/// The staged result of the most recent successful local export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedExport {
    images: Vec<ProcessedImage>,
}

impl StagedExport {
    /// Wrap rendered images in collection order.
    #[must_use]
    pub const fn new(images: Vec<ProcessedImage>) -> Self {
        Self { images }
    }

    /// Rendered images in collection order.
    #[must_use]
    pub fn images(&self) -> &[ProcessedImage] {
        &self.images
    }

    /// Number of staged images.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` if nothing is staged.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Render one file.
///
/// # Errors
///
/// Returns [`BatchError::DecodeFailure`] or [`BatchError::EncodeFailure`].
pub fn render(
    file: &SelectedFile,
    caption: Option<&Caption>,
    quality: u8,
) -> Result<ProcessedImage, BatchError> {
    let mut canvas = codec::to_canvas(&codec::decode(file)?);
    if let Some(caption) = caption {
        caption::stamp(&mut canvas, caption);
    }
    let jpeg = codec::encode_jpeg(&canvas, quality, file.name())?;
    Ok(ProcessedImage {
        name: file.name().to_owned(),
        data_url: data_url::encode(OUTPUT_MIME, &jpeg),
    })
}

/// Lazily render `files` in order.
///
/// Each call to `next` does the work for one file, letting async callers
/// yield to the event loop between items.
pub fn render_each<'a>(
    files: &'a [SelectedFile],
    caption: Option<&'a Caption>,
    quality: u8,
) -> impl Iterator<Item = Result<ProcessedImage, BatchError>> + 'a {
    files.iter().map(move |file| render(file, caption, quality))
}

/// Render every file, stopping at the first failure.
///
/// `caption_text` is parsed with [`Caption::parse`]: blank text means no
/// caption.
///
/// # Errors
///
/// Returns [`BatchError::NothingToExport`] for an empty batch, otherwise
/// the first per-item failure.
pub fn run(
    files: &[SelectedFile],
    caption_text: &str,
    quality: u8,
) -> Result<StagedExport, BatchError> {
    if files.is_empty() {
        return Err(BatchError::NothingToExport);
    }
    let caption = Caption::parse(caption_text);
    tracing::info!(
        count = files.len(),
        captioned = caption.is_some(),
        "local export started"
    );
    let images = render_each(files, caption.as_ref(), quality)
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| tracing::warn!(error = %e, "local export aborted"))?;
    tracing::info!(count = images.len(), "local export finished");
    Ok(StagedExport::new(images))
}

/// [`run`] while holding `gate`.
///
/// # Errors
///
/// Returns [`BatchError::Busy`] if a run is already in progress, or any
/// error from [`run`]. The gate is released either way.
pub fn run_guarded(
    gate: &ExportGate,
    files: &[SelectedFile],
    caption_text: &str,
    quality: u8,
) -> Result<StagedExport, BatchError> {
    let _guard = gate.try_acquire()?;
    run(files, caption_text, quality)
}
