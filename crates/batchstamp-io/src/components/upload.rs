//! Multi-file upload with drag-and-drop and file picker.

use batchstamp_core::{MAX_FILES, SelectedFile, mime_type_for};
use dioxus::html::{FileData, HasFileData};
use dioxus::prelude::*;

/// Allowed file extensions for image uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];

/// Check whether a filename has an allowed image extension.
fn has_allowed_extension(name: &str) -> bool {
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        ALLOWED_EXTENSIONS
            .iter()
            .any(|a| a.eq_ignore_ascii_case(ext))
    })
}

/// Milliseconds since the Unix epoch, from the browser clock.
#[must_use]
pub fn now_ms() -> u64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let now = js_sys::Date::now() as u64;
    now
}

/// Props for the [`FileUpload`] component.
#[derive(Props, Clone, PartialEq)]
pub struct FileUploadProps {
    /// How many images are already selected.
    current: usize,
    /// Called once per pick or drop with every readable image, in order.
    on_select: EventHandler<Vec<SelectedFile>>,
}

/// A drop zone with a multi-select file picker.
///
/// Files with unsupported extensions or unreadable contents are skipped
/// and listed below the zone. The remaining files are handed to
/// `on_select` together, so the capacity check sees the whole pick.
#[component]
pub fn FileUpload(props: FileUploadProps) -> Element {
    let mut dragging = use_signal(|| false);
    let mut skipped = use_signal(Vec::<String>::new);

    let read_files = move |files: Vec<FileData>| async move {
        let mut selected = Vec::with_capacity(files.len());
        let mut rejected = Vec::new();
        for file in files {
            let name = file.name();
            if !has_allowed_extension(&name) {
                rejected.push(format!("{name}: unsupported file type"));
                continue;
            }
            match file.read_bytes().await {
                Ok(bytes) => {
                    let mime_type = mime_type_for(&name);
                    selected.push(SelectedFile::new(name, mime_type, now_ms(), bytes.to_vec()));
                }
                Err(e) => rejected.push(format!("{name}: {e}")),
            }
        }
        skipped.set(rejected);
        if !selected.is_empty() {
            props.on_select.call(selected);
        }
    };

    let handle_files = move |evt: FormEvent| async move {
        read_files(evt.files()).await;
    };

    let handle_drop = move |evt: DragEvent| async move {
        evt.prevent_default();
        dragging.set(false);
        read_files(evt.files()).await;
    };

    let zone_class = if dragging() {
        "upload-zone upload-zone-active"
    } else {
        "upload-zone"
    };
    let remaining = MAX_FILES.saturating_sub(props.current);

    rsx! {
        div {
            class: "{zone_class}",
            ondragover: move |evt| {
                evt.prevent_default();
                dragging.set(true);
            },
            ondragleave: move |_| {
                dragging.set(false);
            },
            ondrop: handle_drop,

            p { class: "text-secondary", "Drop images here or " }

            label { class: "btn btn-primary",
                input {
                    r#type: "file",
                    accept: ".png,.jpg,.jpeg,.bmp,.webp",
                    multiple: true,
                    class: "hidden",
                    onchange: handle_files,
                }
                "Choose Images"
            }

            p { class: "text-muted text-sm",
                "{props.current} of {MAX_FILES} selected, {remaining} more allowed"
            }

            for line in skipped() {
                p { class: "text-error text-sm", "Skipped {line}" }
            }
        }
    }
}
