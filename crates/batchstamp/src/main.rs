use std::rc::Rc;

use batchstamp_core::{BatchError, CropRect, CropWidget, SelectedFile, Session, StagedExport};
use batchstamp_io::download::{self, ZIP_MIME};
use batchstamp_io::{
    BlobCropWidget, CropModal, ExportPanel, FetchEndpoint, FileUpload, Gallery, PreviewTiles,
    notify, now_ms, preview,
};
use dioxus::logger::tracing::Level;
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;

fn main() {
    if let Err(e) = dioxus::logger::init(Level::INFO) {
        web_sys::console::warn_1(&format!("logger init failed: {e}").into());
    }
    dioxus::launch(app);
}

/// Report a failed command to the user.
///
/// A busy pipeline or an empty batch are not failures: the controls are
/// already disabled for those, so a stray click is dropped quietly.
fn report(error: &BatchError) {
    match error {
        BatchError::Busy | BatchError::NothingToExport => {
            tracing::debug!(%error, "command ignored");
        }
        _ => notify::alert(&error.to_string()),
    }
}

/// Root application component.
///
/// Owns the single [`Session`] and wires the upload zone, gallery, crop
/// modal and export panel to its commands.
#[allow(clippy::too_many_lines)]
fn app() -> Element {
    // --- Application state ---
    let mut session = use_signal(Session::<BlobCropWidget>::default);
    let mut tiles = use_signal(|| Option::<Rc<PreviewTiles>>::None);
    let mut loading = use_signal(|| false);
    let mut caption = use_signal(String::new);
    let mut local_busy = use_signal(|| false);
    let mut remote_busy = use_signal(|| false);

    // --- Preview rebuild ---
    // Keyed on the collection revision only, so toggling checkboxes or
    // editing a crop does not re-decode anything.
    let revision = use_memo(move || session.read().revision());
    use_effect(move || {
        let revision = revision();
        let (files, max_edge) = {
            let session = session.peek();
            (
                session.files().as_slice().to_vec(),
                session.config().thumbnail_max_edge,
            )
        };
        if files.is_empty() {
            tiles.set(None);
            loading.set(false);
            return;
        }

        loading.set(true);
        spawn(async move {
            let set = preview::decode_all(revision, files, max_edge).await;

            // A newer revision has its own decode in flight.
            if session.peek().revision() != revision {
                return;
            }
            tiles.set(Some(Rc::new(PreviewTiles::from_set(&set))));
            loading.set(false);
        });
    });

    // --- Collection commands ---
    let on_select = move |files: Vec<SelectedFile>| {
        if let Err(e) = session.write().add_files(files) {
            report(&e);
        }
    };

    let on_toggle = move |(index, checked): (usize, bool)| {
        if let Err(e) = session.write().set_selected(index, checked) {
            report(&e);
        }
    };

    let on_toggle_all = move |checked: bool| {
        session.write().set_all_selected(checked);
    };

    let on_remove = move |()| {
        session.write().remove_selected();
    };

    // --- Crop commands ---
    let on_edit = move |index: usize| {
        let Some(file) = session.peek().files().get(index).cloned() else {
            report(&BatchError::out_of_bounds(index, session.peek().files().len()));
            return;
        };
        let opened = session
            .write()
            .open_crop(index, |source| BlobCropWidget::new(&file, source));
        if let Err(e) = opened {
            report(&e);
        }
    };

    let on_crop_change = move |rect: CropRect| {
        if let Some(crop) = session.write().crop_mut() {
            crop.widget_mut().set_rect(rect);
        }
    };

    let on_crop_confirm = move |()| {
        let confirmed = session.write().confirm_crop(now_ms());
        if let Err(e) = confirmed {
            report(&e);
        }
    };

    let on_crop_cancel = move |()| {
        session.write().cancel_crop();
    };

    // --- Local export ---
    let on_process_local = move |()| {
        if local_busy() {
            return;
        }
        let job = session.peek().local_job(&caption.peek());
        spawn(async move {
            let guard = match job.start() {
                Ok(guard) => guard,
                Err(e) => {
                    report(&e);
                    return;
                }
            };
            local_busy.set(true);
            TimeoutFuture::new(0).await;

            let mut images = Vec::with_capacity(job.len());
            let mut failure = None;
            for item in job.items() {
                match item {
                    Ok(image) => images.push(image),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
                // Let the busy indicator repaint between images.
                TimeoutFuture::new(0).await;
            }

            drop(guard);
            local_busy.set(false);
            match failure {
                None => {
                    tracing::info!(count = images.len(), "local export finished");
                    session.write().stage(StagedExport::new(images));
                }
                Some(e) => {
                    tracing::warn!(error = %e, "local export aborted");
                    report(&e);
                }
            }
        });
    };

    let on_download_local = move |()| {
        let session = session.peek();
        let Some(staged) = session.staged() else {
            return;
        };
        let config = session.config();
        let result = batchstamp_export::package(staged.images(), &config.entry_prefix)
            .map_err(|e| e.to_string())
            .and_then(|zip| {
                download::trigger_download(&zip, &config.local_archive_name, ZIP_MIME)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            notify::alert(&format!("Download failed: {e}"));
        }
    };

    // --- Remote export ---
    let on_process_remote = move |()| {
        if remote_busy() {
            return;
        }
        remote_busy.set(true);
        let job = session.peek().remote_job();
        spawn(async move {
            let outcome = job.run(&FetchEndpoint).await;
            remote_busy.set(false);
            match outcome {
                Ok(archive) => {
                    if let Err(e) =
                        download::trigger_download(&archive.bytes, &archive.file_name, ZIP_MIME)
                    {
                        notify::alert(&format!("Download failed: {e}"));
                    }
                }
                Err(e) => report(&e),
            }
        });
    };

    // --- Derived view state ---
    let view = session.read();
    let file_count = view.files().len();
    let selected: Vec<bool> = (0..file_count).map(|i| view.is_selected(i)).collect();
    let show_controls = view.show_selection_controls();
    let export_enabled = view.export_enabled();
    let staged = view.staged().map(StagedExport::len);
    let crop_view = view.crop().map(|crop| {
        let widget = crop.widget();
        (
            widget.url().to_owned(),
            crop.source().name.clone(),
            widget.bounds(),
            widget.crop_rect(),
        )
    });
    drop(view);

    // --- Layout ---
    rsx! {
        style { dangerous_inner_html: include_str!("../assets/style.css") }

        div {
            class: "app",
            // A stray drop outside the upload zone must not navigate away.
            ondragover: move |evt: DragEvent| evt.prevent_default(),
            ondrop: move |evt: DragEvent| evt.prevent_default(),

            header { class: "app-header",
                h1 { "batchstamp" }
                p { class: "text-secondary",
                    "Crop, date-stamp and package up to 25 photos at once."
                }
            }

            main { class: "app-main",
                FileUpload { current: file_count, on_select: on_select }

                Gallery {
                    tiles: tiles(),
                    loading: loading(),
                    selected: selected,
                    show_controls: show_controls,
                    on_toggle: on_toggle,
                    on_toggle_all: on_toggle_all,
                    on_remove: on_remove,
                    on_edit: on_edit,
                }

                ExportPanel {
                    enabled: export_enabled,
                    caption: caption(),
                    local_busy: local_busy(),
                    remote_busy: remote_busy(),
                    staged: staged,
                    on_caption: move |text: String| caption.set(text),
                    on_process_local: on_process_local,
                    on_download_local: on_download_local,
                    on_process_remote: on_process_remote,
                }
            }

            if let Some((url, name, bounds, rect)) = crop_view {
                CropModal {
                    url: url,
                    name: name,
                    bounds: bounds,
                    rect: rect,
                    on_change: on_crop_change,
                    on_confirm: on_crop_confirm,
                    on_cancel: on_crop_cancel,
                }
            }
        }
    }
}
