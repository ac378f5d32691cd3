//! batchstamp-export: Archive packaging (sans-IO)
//!
//! Bundles staged local exports into a single zip. Triggering the
//! download is left to `batchstamp-io`.

pub mod archive;

pub use archive::{ArchiveError, entry_names, package};
