//! Thumbnail gallery with deletion checkboxes and edit buttons.

use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::{LdCrop, LdTrash2};

use crate::preview::{PreviewTile, PreviewTiles};

/// Props for the [`Gallery`] component.
#[derive(Props, Clone)]
pub struct GalleryProps {
    /// Tiles for the current collection, or `None` before the first decode.
    tiles: Option<Rc<PreviewTiles>>,
    /// Whether a preview decode is in flight.
    loading: bool,
    /// Deletion flag per collection index.
    selected: Vec<bool>,
    /// Whether the select-all checkbox and delete button are shown.
    show_controls: bool,
    /// Fired with `(index, checked)` when one checkbox changes.
    on_toggle: EventHandler<(usize, bool)>,
    /// Fired when the select-all checkbox changes.
    on_toggle_all: EventHandler<bool>,
    /// Fired when the delete button is pressed.
    on_remove: EventHandler<()>,
    /// Fired with the index whose edit button was pressed.
    on_edit: EventHandler<usize>,
}

impl PartialEq for GalleryProps {
    fn eq(&self, other: &Self) -> bool {
        let tiles_eq = match (&self.tiles, &other.tiles) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        tiles_eq
            && self.loading == other.loading
            && self.selected == other.selected
            && self.show_controls == other.show_controls
    }
}

/// Grid of thumbnails, one per selected file.
///
/// While previews are decoding an overlay covers the grid. Tiles whose
/// file could not be decoded show the error instead of a thumbnail.
#[component]
pub fn Gallery(props: GalleryProps) -> Element {
    let all_selected = !props.selected.is_empty() && props.selected.iter().all(|&s| s);
    let any_selected = props.selected.iter().any(|&s| s);
    let on_toggle_all = props.on_toggle_all;
    let on_remove = props.on_remove;

    rsx! {
        div { class: "gallery",
            if props.show_controls {
                div { class: "gallery-controls",
                    label { class: "checkbox-label",
                        input {
                            r#type: "checkbox",
                            checked: all_selected,
                            onchange: move |e| on_toggle_all.call(e.checked()),
                        }
                        "Select all"
                    }
                    button {
                        class: if any_selected { "btn btn-danger" } else { "btn btn-disabled" },
                        disabled: !any_selected,
                        onclick: move |_| on_remove.call(()),
                        Icon { icon: LdTrash2, width: 16, height: 16 }
                        "Delete selected"
                    }
                }
            }

            div { class: "gallery-grid",
                if let Some(ref tiles) = props.tiles {
                    if tiles.failed() > 0 {
                        p { class: "text-error text-sm gallery-note",
                            "{tiles.failed()} image(s) could not be previewed"
                        }
                    }
                    for tile in tiles.tiles() {
                        {render_tile(
                            tile,
                            props.selected.get(tile.index).copied().unwrap_or(false),
                            props.on_toggle,
                            props.on_edit,
                        )}
                    }
                }

                if props.loading {
                    div { class: "gallery-loading",
                        span { class: "spinner" }
                        "Loading previews..."
                    }
                }
            }
        }
    }
}

/// Render one gallery tile.
fn render_tile(
    tile: &PreviewTile,
    selected: bool,
    on_toggle: EventHandler<(usize, bool)>,
    on_edit: EventHandler<usize>,
) -> Element {
    let index = tile.index;
    let name = tile.name.clone();

    rsx! {
        div { key: "{index}", class: if selected { "tile tile-selected" } else { "tile" },
            input {
                r#type: "checkbox",
                class: "tile-check",
                checked: selected,
                aria_label: "Select {name} for deletion",
                onchange: move |e| on_toggle.call((index, e.checked())),
            }

            match &tile.image {
                Ok(url) => rsx! {
                    img { src: "{url.as_str()}", class: "tile-image", alt: "{name}" }
                },
                Err(reason) => rsx! {
                    div { class: "tile-error", title: "{reason}", "Cannot preview" }
                },
            }

            div { class: "tile-footer",
                span { class: "tile-name", title: "{name}", "{name}" }
                button {
                    class: "btn btn-small",
                    aria_label: "Crop {name}",
                    onclick: move |_| on_edit.call(index),
                    Icon { icon: LdCrop, width: 14, height: 14 }
                    "Edit"
                }
            }
        }
    }
}
