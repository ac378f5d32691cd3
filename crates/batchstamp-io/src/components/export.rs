//! Export panel: caption input and the two export pipelines.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdDownload, LdImage, LdServer};

/// Props for the [`ExportPanel`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ExportPanelProps {
    /// Whether there is anything to export.
    enabled: bool,
    /// Current caption text.
    caption: String,
    /// Whether a local run is in progress.
    local_busy: bool,
    /// Whether a remote run is in progress.
    remote_busy: bool,
    /// Number of images staged by the last local run, if any.
    staged: Option<usize>,
    /// Fired with the new caption text.
    on_caption: EventHandler<String>,
    /// Starts the local pipeline.
    on_process_local: EventHandler<()>,
    /// Downloads the staged local archive.
    on_download_local: EventHandler<()>,
    /// Starts the remote pipeline.
    on_process_remote: EventHandler<()>,
}

const ENABLED_CLASS: &str = "btn btn-primary";
const DISABLED_CLASS: &str = "btn btn-disabled";

/// Caption date input plus process, download, and server buttons.
///
/// Each pipeline button shows a busy label and refuses clicks while its
/// own run is in progress.
#[component]
pub fn ExportPanel(props: ExportPanelProps) -> Element {
    let local_ready = props.enabled && !props.local_busy;
    let remote_ready = props.enabled && !props.remote_busy;
    let download_ready = props.staged.is_some() && !props.local_busy;
    let on_caption = props.on_caption;
    let on_process_local = props.on_process_local;
    let on_download_local = props.on_download_local;
    let on_process_remote = props.on_process_remote;

    rsx! {
        div { class: "export-panel",
            h3 { class: "panel-title", "Export" }

            div { class: "caption-field",
                label { r#for: "caption_date", "Caption date" }
                input {
                    r#type: "date",
                    id: "caption_date",
                    value: "{props.caption}",
                    oninput: move |e| on_caption.call(e.value()),
                }
                p { class: "text-muted text-xs",
                    "Stamped in the top-right corner. Leave empty for no caption."
                }
            }

            div { class: "button-row",
                button {
                    class: if local_ready { ENABLED_CLASS } else { DISABLED_CLASS },
                    disabled: !local_ready,
                    onclick: move |_| on_process_local.call(()),
                    Icon { icon: LdImage, width: 16, height: 16 }
                    if props.local_busy { "Processing..." } else { "Process images" }
                }
                button {
                    class: if download_ready { ENABLED_CLASS } else { DISABLED_CLASS },
                    disabled: !download_ready,
                    onclick: move |_| on_download_local.call(()),
                    Icon { icon: LdDownload, width: 16, height: 16 }
                    if let Some(count) = props.staged {
                        "Download {count} image(s)"
                    } else {
                        "Download"
                    }
                }
                button {
                    class: if remote_ready { ENABLED_CLASS } else { DISABLED_CLASS },
                    disabled: !remote_ready,
                    onclick: move |_| on_process_remote.call(()),
                    Icon { icon: LdServer, width: 16, height: 16 }
                    if props.remote_busy { "Sending..." } else { "Blur & resize on server" }
                }
            }
        }
    }
}
