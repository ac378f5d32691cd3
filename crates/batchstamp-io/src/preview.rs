//! Preview decoding and display.
//!
//! All entries are decoded concurrently and collected with `join_all`, so
//! the caller sees a result only once every decode has finished. Each
//! decode first yields to the event loop, letting the loading indicator
//! paint before the CPU-bound work starts.

use batchstamp_core::{PreviewSet, SelectedFile, preview};
use futures::future::join_all;
use gloo_timers::future::TimeoutFuture;

use crate::raster::BlobUrl;

/// Decode previews for every file of one collection revision.
#[allow(clippy::future_not_send)]
pub async fn decode_all(revision: u64, files: Vec<SelectedFile>, max_edge: u32) -> PreviewSet {
    let decodes = files.iter().enumerate().map(|(index, file)| async move {
        TimeoutFuture::new(0).await;
        preview::decode_preview(index, file, max_edge)
    });
    let entries = join_all(decodes).await;
    PreviewSet::from_entries(revision, entries)
}

/// One gallery tile.
#[derive(Debug)]
pub struct PreviewTile {
    /// Collection index.
    pub index: usize,
    /// File name shown under the thumbnail.
    pub name: String,
    /// Thumbnail URL, or the reason there is none.
    pub image: Result<BlobUrl, String>,
}

/// Displayable previews for one collection revision.
///
/// Dropping the set revokes every thumbnail URL it holds.
#[derive(Debug)]
pub struct PreviewTiles {
    revision: u64,
    tiles: Vec<PreviewTile>,
}

impl PreviewTiles {
    /// Turn decoded previews into PNG blob URLs.
    #[must_use]
    pub fn from_set(set: &PreviewSet) -> Self {
        let tiles = set
            .entries()
            .iter()
            .map(|entry| PreviewTile {
                index: entry.index,
                name: entry.name.clone(),
                image: match &entry.outcome {
                    Ok(thumb) => BlobUrl::from_rgba(&thumb.image).map_err(|e| {
                        tracing::warn!(index = entry.index, error = %e, "thumbnail URL failed");
                        e.to_string()
                    }),
                    Err(e) => Err(e.to_string()),
                },
            })
            .collect();
        Self {
            revision: set.revision(),
            tiles,
        }
    }

    /// Collection revision the tiles show.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Tiles in collection order.
    #[must_use]
    pub fn tiles(&self) -> &[PreviewTile] {
        &self.tiles
    }

    /// Number of tiles without a thumbnail.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.tiles.iter().filter(|t| t.image.is_err()).count()
    }
}
