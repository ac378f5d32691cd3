//! Zip packaging of staged local exports.
//!
//! Each staged image becomes one deflate-compressed entry named
//! `<prefix><original name>`. When two images share a name the later ones
//! get ` (1)`, ` (2)`, ... inserted before the extension so every payload
//! survives.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use batchstamp_core::ProcessedImage;
use batchstamp_core::data_url::{self, DataUrlError};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

/// Errors that can occur while building an archive.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// There were no images to package.
    #[error("nothing to package")]
    Empty,

    /// A staged image did not carry a valid base64 data URL.
    #[error("staged image {name} is not a valid data URL: {source}")]
    InvalidDataUrl {
        /// Name of the offending image.
        name: String,
        /// Why the data URL was rejected.
        source: DataUrlError,
    },

    /// The zip writer failed.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry data failed.
    #[error("write error: {0}")]
    Io(#[from] std::io::Error),
}

/// Split `name` into stem and extension (with its dot).
///
/// A leading dot (hidden file) is part of the stem.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    }
}

/// Archive entry names for `images`, in order, all distinct.
#[must_use]
pub fn entry_names(images: &[ProcessedImage], prefix: &str) -> Vec<String> {
    let mut taken = HashSet::with_capacity(images.len());
    images
        .iter()
        .map(|image| {
            let base = format!("{prefix}{}", image.name);
            if taken.insert(base.clone()) {
                return base;
            }
            let (stem, ext) = split_extension(&base);
            let mut n = 1_usize;
            loop {
                let candidate = format!("{stem} ({n}){ext}");
                if taken.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}

/// Package `images` into a zip archive held in memory.
///
/// # Errors
///
/// Returns [`ArchiveError::Empty`] for an empty slice,
/// [`ArchiveError::InvalidDataUrl`] naming the first image whose payload
/// cannot be decoded, or a zip/IO error from the writer.
pub fn package(images: &[ProcessedImage], prefix: &str) -> Result<Vec<u8>, ArchiveError> {
    if images.is_empty() {
        return Err(ArchiveError::Empty);
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));

    for (image, entry) in images.iter().zip(entry_names(images, prefix)) {
        let (_, bytes) =
            data_url::decode(&image.data_url).map_err(|source| ArchiveError::InvalidDataUrl {
                name: image.name.clone(),
                source,
            })?;
        writer.start_file(entry, options)?;
        writer.write_all(&bytes)?;
    }

    let bytes = writer.finish()?.into_inner();
    tracing::debug!(entries = images.len(), bytes = bytes.len(), "archive packaged");
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Read;

    use super::*;

    fn staged(name: &str, payload: &[u8]) -> ProcessedImage {
        ProcessedImage {
            name: name.to_owned(),
            data_url: data_url::encode("image/jpeg", payload),
        }
    }

    fn names(images: &[ProcessedImage]) -> Vec<String> {
        entry_names(images, "processed_")
    }

    #[test]
    fn entries_get_prefix() {
        assert_eq!(
            names(&[staged("a.jpg", b""), staged("b.png", b"")]),
            ["processed_a.jpg", "processed_b.png"]
        );
    }

    #[test]
    fn duplicate_names_are_numbered_before_extension() {
        let images = [
            staged("a.jpg", b""),
            staged("a.jpg", b""),
            staged("a.jpg", b""),
        ];
        assert_eq!(
            names(&images),
            [
                "processed_a.jpg",
                "processed_a (1).jpg",
                "processed_a (2).jpg"
            ]
        );
    }

    #[test]
    fn numbering_skips_names_already_used() {
        let images = [
            staged("a (1).jpg", b""),
            staged("a.jpg", b""),
            staged("a.jpg", b""),
        ];
        assert_eq!(
            names(&images),
            [
                "processed_a (1).jpg",
                "processed_a.jpg",
                "processed_a (2).jpg"
            ]
        );
    }

    #[test]
    fn extensionless_and_hidden_names() {
        let images = [
            staged("README", b""),
            staged("README", b""),
            staged(".hidden", b""),
            staged(".hidden", b""),
        ];
        assert_eq!(
            entry_names(&images, ""),
            ["README", "README (1)", ".hidden", ".hidden (1)"]
        );
    }

    #[test]
    fn package_round_trips_payloads() {
        let images = [staged("a.jpg", b"first"), staged("a.jpg", b"second")];
        let zipped = package(&images, "processed_").unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(zipped)).unwrap();
        assert_eq!(archive.len(), 2);
        let mut read = |name: &str| {
            let mut out = Vec::new();
            archive.by_name(name).unwrap().read_to_end(&mut out).unwrap();
            out
        };
        assert_eq!(read("processed_a.jpg"), b"first");
        assert_eq!(read("processed_a (1).jpg"), b"second");
    }

    #[test]
    fn malformed_data_url_names_the_entry() {
        let images = [
            staged("ok.jpg", b"x"),
            ProcessedImage {
                name: "broken.jpg".to_owned(),
                data_url: "not a data url".to_owned(),
            },
        ];
        let err = package(&images, "processed_").unwrap_err();
        assert!(
            matches!(err, ArchiveError::InvalidDataUrl { ref name, .. } if name == "broken.jpg"),
            "got {err:?}"
        );
        assert!(err.to_string().contains("broken.jpg"));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(package(&[], "p_"), Err(ArchiveError::Empty)));
    }
}
