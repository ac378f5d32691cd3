//! Date caption compositing.
//!
//! Stamps a short line of text into the top-right corner of a canvas:
//! an opaque white box with black text on top. Geometry is fixed:
//!
//! - text cell height [`FONT_PX`] (20 px), advance [`GLYPH_ADVANCE`] per character
//! - right-aligned, [`RIGHT_MARGIN`] px from the right edge
//! - baseline at y = [`BASELINE_Y`]
//! - background box from `(x - PADDING, BASELINE_Y - BACKGROUND_RISE)`,
//!   `text_width + 2 * PADDING` wide and [`BACKGROUND_HEIGHT`] tall
//!
//! Glyphs come from the public-domain 8x8 bitmap font in `font8x8`,
//! scaled with nearest-neighbour sampling to the text cell.

use font8x8::legacy::BASIC_LEGACY;
use image::{Rgb, RgbImage};
use imageproc::rect::Rect;

/// Height of the text cell in pixels.
pub const FONT_PX: u32 = 20;

/// Horizontal advance per character in pixels.
pub const GLYPH_ADVANCE: u32 = 12;

/// Distance from the right edge of the image to the end of the text.
pub const RIGHT_MARGIN: u32 = 10;

/// Vertical position of the text baseline.
pub const BASELINE_Y: u32 = 25;

/// Padding on each side of the text inside the background box.
pub const PADDING: u32 = 5;

/// How far above the baseline the background box starts.
pub const BACKGROUND_RISE: u32 = 20;

/// Height of the background box.
pub const BACKGROUND_HEIGHT: u32 = 30;

/// Distance from the top of the text cell to the baseline.
const ASCENT: i64 = 16;

/// Side length of a source glyph bitmap.
const GLYPH_CELLS: u32 = 8;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// A non-blank caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption(String);

impl Caption {
    /// Parse free-form caption input.
    ///
    /// Returns `None` for empty or whitespace-only input, meaning no
    /// caption is drawn. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// The caption text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rendered width of the text in pixels.
    #[must_use]
    pub fn text_width(&self) -> u32 {
        let count = u32::try_from(self.0.chars().count()).unwrap_or(u32::MAX);
        count.saturating_mul(GLYPH_ADVANCE)
    }

    /// Compute where the caption lands on a canvas `image_width` wide.
    #[must_use]
    pub fn layout(&self, image_width: u32) -> CaptionLayout {
        let text_width = self.text_width();
        let text_x = i64::from(image_width) - i64::from(text_width) - i64::from(RIGHT_MARGIN);
        CaptionLayout {
            text_x,
            baseline_y: i64::from(BASELINE_Y),
            background_x: text_x - i64::from(PADDING),
            background_y: i64::from(BASELINE_Y - BACKGROUND_RISE),
            background_width: text_width.saturating_add(2 * PADDING),
            background_height: BACKGROUND_HEIGHT,
        }
    }
}

/// Resolved caption placement for one canvas.
///
/// Coordinates may be negative when the text is wider than the image;
/// drawing clips to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptionLayout {
    /// Left edge of the first glyph.
    pub text_x: i64,
    /// Text baseline.
    pub baseline_y: i64,
    /// Left edge of the background box.
    pub background_x: i64,
    /// Top edge of the background box.
    pub background_y: i64,
    /// Width of the background box.
    pub background_width: u32,
    /// Height of the background box.
    pub background_height: u32,
}

impl CaptionLayout {
    /// Returns `true` if `(x, y)` falls inside the background box.
    #[must_use]
    pub fn background_contains(&self, x: u32, y: u32) -> bool {
        let (x, y) = (i64::from(x), i64::from(y));
        x >= self.background_x
            && x < self.background_x + i64::from(self.background_width)
            && y >= self.background_y
            && y < self.background_y + i64::from(self.background_height)
    }
}

/// Draw `caption` onto `canvas` in place.
pub fn stamp(canvas: &mut RgbImage, caption: &Caption) {
    let layout = caption.layout(canvas.width());

    if let (Ok(x), Ok(y)) = (
        i32::try_from(layout.background_x),
        i32::try_from(layout.background_y),
    ) {
        let rect = Rect::at(x, y).of_size(layout.background_width, layout.background_height);
        imageproc::drawing::draw_filled_rect_mut(canvas, rect, BACKGROUND);
    }

    let cell_top = layout.baseline_y - ASCENT;
    let mut cell_left = layout.text_x;
    for ch in caption.as_str().chars() {
        draw_glyph(canvas, glyph_for(ch), cell_left, cell_top);
        cell_left += i64::from(GLYPH_ADVANCE);
    }
}

/// Look up the 8x8 bitmap for `ch`, substituting `?` outside ASCII.
fn glyph_for(ch: char) -> [u8; 8] {
    let code = if ch.is_ascii() { ch as usize } else { '?' as usize };
    BASIC_LEGACY[code]
}

/// Paint one glyph scaled into a `GLYPH_ADVANCE` x `FONT_PX` cell.
///
/// Each row byte stores its leftmost pixel in the least significant bit.
fn draw_glyph(canvas: &mut RgbImage, glyph: [u8; 8], left: i64, top: i64) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    for py in 0..FONT_PX {
        let row = glyph[(py * GLYPH_CELLS / FONT_PX) as usize];
        if row == 0 {
            continue;
        }
        let y = top + i64::from(py);
        if y < 0 || y >= height {
            continue;
        }
        for px in 0..GLYPH_ADVANCE {
            let column = px * GLYPH_CELLS / GLYPH_ADVANCE;
            if row & (1 << column) == 0 {
                continue;
            }
            let x = left + i64::from(px);
            if x < 0 || x >= width {
                continue;
            }
            // Both coordinates were bounds-checked against u32 dimensions.
            #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            canvas.put_pixel(x as u32, y as u32, INK);
        }
    }
}
