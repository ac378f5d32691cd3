//! Preview thumbnails for the selected files.
//!
//! Previews are rebuilt from scratch whenever the collection changes.
//! Each entry is decoded independently: a file that fails to decode is
//! reported in the resulting [`PreviewSet`] instead of aborting the rest.

use image::DynamicImage;
use image::imageops::FilterType;

use crate::codec;
use crate::types::{BatchError, Dimensions, RgbaImage, SelectedFile};

/// A decoded, downsampled preview of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    /// Downsampled pixels, longest edge at most the requested size.
    pub image: RgbaImage,
    /// Native size of the source image.
    pub source: Dimensions,
}

/// Preview outcome for one collection entry.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewEntry {
    /// Position of the file in the collection.
    pub index: usize,
    /// Display name of the file.
    pub name: String,
    /// The thumbnail, or why it could not be produced.
    pub outcome: Result<Thumbnail, BatchError>,
}

/// Shrink `image` so its longest edge is at most `max_edge` pixels.
///
/// Images already within bounds are converted without resampling.
#[must_use]
pub fn thumbnail(image: &DynamicImage, max_edge: u32) -> RgbaImage {
    let max_edge = max_edge.max(1);
    if image.width().max(image.height()) <= max_edge {
        return image.to_rgba8();
    }
    image
        .resize(max_edge, max_edge, FilterType::Triangle)
        .to_rgba8()
}

/// Decode one file into a preview entry.
#[must_use]
pub fn decode_preview(index: usize, file: &SelectedFile, max_edge: u32) -> PreviewEntry {
    let outcome = codec::decode(file).map(|image| Thumbnail {
        source: Dimensions {
            width: image.width(),
            height: image.height(),
        },
        image: thumbnail(&image, max_edge),
    });
    if let Err(ref e) = outcome {
        tracing::warn!(index, name = file.name(), error = %e, "preview decode failed");
    }
    PreviewEntry {
        index,
        name: file.name().to_owned(),
        outcome,
    }
}

/// A complete set of previews for one collection revision.
///
/// Only constructed once every entry has finished decoding, so holding a
/// `PreviewSet` means "all previews ready".
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewSet {
    revision: u64,
    entries: Vec<PreviewEntry>,
}

impl PreviewSet {
    /// Assemble a set from entries that may have completed in any order.
    #[must_use]
    pub fn from_entries(revision: u64, mut entries: Vec<PreviewEntry>) -> Self {
        entries.sort_by_key(|e| e.index);
        Self { revision, entries }
    }

    /// Decode every file sequentially on the calling thread.
    ///
    /// For embedders without an event loop to yield to; the browser
    /// build fans out per file and assembles with [`Self::from_entries`].
    #[must_use]
    pub fn decode_all(revision: u64, files: &[SelectedFile], max_edge: u32) -> Self {
        let entries = files
            .iter()
            .enumerate()
            .map(|(i, file)| decode_preview(i, file, max_edge))
            .collect();
        Self::from_entries(revision, entries)
    }

    /// Collection revision these previews were built from.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Entries in collection order.
    #[must_use]
    pub fn entries(&self) -> &[PreviewEntry] {
        &self.entries
    }

    /// Entries whose decode failed.
    pub fn failures(&self) -> impl Iterator<Item = &PreviewEntry> {
        self.entries.iter().filter(|e| e.outcome.is_err())
    }

    /// Returns `true` if every entry decoded.
    #[must_use]
    pub fn all_decoded(&self) -> bool {
        self.failures().next().is_none()
    }
}
