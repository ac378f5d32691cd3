//! Crop sessions.
//!
//! A [`CropSession`] edits exactly one collection entry. It owns the
//! decoded source image and a handle to the interactive crop widget;
//! dropping the session drops the widget, which is where widget
//! implementations release their resources.

use image::DynamicImage;

use crate::codec;
use crate::types::{BatchError, Dimensions, SelectedFile};

/// A crop region in source image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CropRect {
    /// A region covering the whole image.
    #[must_use]
    pub const fn full(dimensions: Dimensions) -> Self {
        Self {
            x: 0,
            y: 0,
            width: dimensions.width,
            height: dimensions.height,
        }
    }

    /// Intersect the region with an image of the given size.
    ///
    /// Returns `None` if nothing of the region lies inside the image.
    #[must_use]
    pub fn clamp_to(self, dimensions: Dimensions) -> Option<Self> {
        if self.x >= dimensions.width || self.y >= dimensions.height {
            return None;
        }
        let width = self.width.min(dimensions.width - self.x);
        let height = self.height.min(dimensions.height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(Self {
            x: self.x,
            y: self.y,
            width,
            height,
        })
    }
}

/// The interactive widget a crop session drives.
///
/// Implementations hold whatever UI resources the editor needs and
/// release them in `Drop`.
pub trait CropWidget {
    /// The region currently selected by the user.
    fn crop_rect(&self) -> CropRect;
}

/// The decoded image a crop session edits.
#[derive(Debug, Clone)]
pub struct CropSource {
    /// Collection index being edited.
    pub index: usize,
    /// Name of the file being edited; kept on the cropped result.
    pub name: String,
    /// Decoded source pixels.
    pub image: DynamicImage,
}

impl CropSource {
    /// Native size of the source image.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// The initial selection: free aspect ratio, covering everything.
    #[must_use]
    pub fn initial_rect(&self) -> CropRect {
        CropRect::full(self.dimensions())
    }
}

/// One open crop editor.
pub struct CropSession<W> {
    source: CropSource,
    widget: W,
}

impl<W: CropWidget> CropSession<W> {
    /// Decode `file` and build its widget with `make_widget`.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::DecodeFailure`] if the file cannot be
    /// decoded, or whatever `make_widget` fails with.
    pub fn open(
        index: usize,
        file: &SelectedFile,
        make_widget: impl FnOnce(&CropSource) -> Result<W, BatchError>,
    ) -> Result<Self, BatchError> {
        let source = CropSource {
            index,
            name: file.name().to_owned(),
            image: codec::decode(file)?,
        };
        let widget = make_widget(&source)?;
        Ok(Self { source, widget })
    }

    /// Collection index being edited.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.source.index
    }

    /// The decoded source.
    #[must_use]
    pub const fn source(&self) -> &CropSource {
        &self.source
    }

    /// The widget handle.
    #[must_use]
    pub const fn widget(&self) -> &W {
        &self.widget
    }

    /// Mutable access to the widget, for forwarding user input.
    pub const fn widget_mut(&mut self) -> &mut W {
        &mut self.widget
    }

    /// Render the selected region to a new JPEG file.
    ///
    /// The result keeps the source's name, has MIME type `image/jpeg`,
    /// and is stamped with `now_ms` as its last-modified time.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::ResourceState`] if the widget's region does
    /// not overlap the image, or [`BatchError::EncodeFailure`] if JPEG
    /// encoding fails.
    pub fn render(&self, quality: u8, now_ms: u64) -> Result<SelectedFile, BatchError> {
        let dimensions = self.source.dimensions();
        let rect = self
            .widget
            .crop_rect()
            .clamp_to(dimensions)
            .ok_or_else(|| {
                BatchError::ResourceState(format!(
                    "crop region for {} lies outside the image",
                    self.source.name
                ))
            })?;

        let cropped = self
            .source
            .image
            .crop_imm(rect.x, rect.y, rect.width, rect.height);
        let bytes = codec::encode_jpeg(&codec::to_canvas(&cropped), quality, &self.source.name)?;
        Ok(SelectedFile::new(
            self.source.name.clone(),
            "image/jpeg",
            now_ms,
            bytes,
        ))
    }
}

impl<W> std::fmt::Debug for CropSession<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropSession")
            .field("index", &self.source.index)
            .field("name", &self.source.name)
            .finish_non_exhaustive()
    }
}
