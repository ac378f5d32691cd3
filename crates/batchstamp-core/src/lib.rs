//! batchstamp-core: Batch state and image processing (sans-IO).
//!
//! Holds the ordered collection of selected images and everything that
//! reads or rewrites it:
//!
//! - the [`Session`] coordinator and its command methods
//! - preview thumbnails ([`preview`])
//! - the crop editor contract ([`crop`])
//! - the local export: decode, caption, JPEG, stage ([`local_export`])
//! - the remote export contract ([`remote`])
//!
//! This crate has **no I/O dependencies**. It works on in-memory byte
//! slices; the browser side (file input, `fetch`, downloads, widgets)
//! lives in `batchstamp-io`.

pub mod caption;
pub mod codec;
pub mod collection;
pub mod crop;
pub mod data_url;
pub mod gate;
pub mod local_export;
pub mod preview;
pub mod remote;
pub mod session;
pub mod types;

pub use caption::Caption;
pub use collection::{FileCollection, MAX_FILES};
pub use crop::{CropRect, CropSession, CropSource, CropWidget};
pub use gate::{BusyGuard, ExportGate};
pub use local_export::StagedExport;
pub use preview::{PreviewEntry, PreviewSet, Thumbnail};
pub use remote::{EndpointResponse, ProcessingEndpoint, RemoteArchive, RemoteRequest};
pub use session::{LocalJob, RemoteJob, Session};
pub use types::{
    BatchConfig, BatchError, Dimensions, ProcessedImage, RgbaImage, SelectedFile, mime_type_for,
};
