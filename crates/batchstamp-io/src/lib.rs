//! batchstamp-io: Browser I/O and Dioxus component library.
//!
//! Handles multi-file uploads, Blob downloads, blob URLs for thumbnails
//! and the crop widget, the `fetch` upload to the processing endpoint,
//! and provides the UI components for the batchstamp web application.

pub mod components;
pub mod crop_widget;
pub mod download;
pub mod fetch;
pub mod notify;
pub mod preview;
pub mod raster;

pub use components::{CropModal, ExportPanel, FileUpload, Gallery, now_ms};
pub use crop_widget::BlobCropWidget;
pub use fetch::FetchEndpoint;
pub use preview::{PreviewTile, PreviewTiles};
