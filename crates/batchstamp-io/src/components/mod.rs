//! Dioxus UI components for batchstamp.
//!
//! Provides the multi-file upload zone, the thumbnail gallery, the crop
//! modal, and the export panel.

mod crop_modal;
mod export;
mod gallery;
mod upload;

pub use crop_modal::CropModal;
pub use export::ExportPanel;
pub use gallery::Gallery;
pub use upload::{FileUpload, now_ms};
