//! Browser-side crop widget.
//!
//! The widget shows the original file through a `blob:` URL and keeps the
//! rectangle the user has dialled in. Dropping it revokes the URL, so the
//! image stays alive exactly as long as its crop session.

use batchstamp_core::{BatchError, CropRect, CropSource, CropWidget, Dimensions, SelectedFile};

use crate::raster::BlobUrl;

/// Live crop editor state for one image.
#[derive(Debug)]
pub struct BlobCropWidget {
    url: BlobUrl,
    bounds: Dimensions,
    rect: CropRect,
}

impl BlobCropWidget {
    /// Create a widget for `file`, starting from `source`'s initial
    /// full-image selection.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::ResourceState`] if the image URL cannot be
    /// created.
    pub fn new(file: &SelectedFile, source: &CropSource) -> Result<Self, BatchError> {
        let url = BlobUrl::from_bytes(file.bytes(), file.mime_type()).map_err(|e| {
            BatchError::ResourceState(format!("cannot show {} for cropping: {e}", file.name()))
        })?;
        Ok(Self {
            url,
            bounds: source.dimensions(),
            rect: source.initial_rect(),
        })
    }

    /// `blob:` URL of the image.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Native size of the image being cropped.
    #[must_use]
    pub const fn bounds(&self) -> Dimensions {
        self.bounds
    }

    /// Move or resize the selection, keeping it inside the image.
    pub fn set_rect(&mut self, rect: CropRect) {
        self.rect = fit_rect(rect, self.bounds);
    }
}

impl CropWidget for BlobCropWidget {
    fn crop_rect(&self) -> CropRect {
        self.rect
    }
}

/// Pull `rect` inside `bounds`, keeping it at least one pixel in size.
#[must_use]
pub fn fit_rect(rect: CropRect, bounds: Dimensions) -> CropRect {
    let max_x = bounds.width.saturating_sub(1);
    let max_y = bounds.height.saturating_sub(1);
    let x = rect.x.min(max_x);
    let y = rect.y.min(max_y);
    CropRect {
        x,
        y,
        width: rect.width.clamp(1, (bounds.width - x).max(1)),
        height: rect.height.clamp(1, (bounds.height - y).max(1)),
    }
}
