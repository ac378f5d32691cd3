//! Modal crop editor.
//!
//! Shows the image with the current selection outlined and four sliders
//! for its left edge, top edge, width and height. The aspect ratio is
//! free. Slider changes go straight back to the widget via `on_change`,
//! which keeps the rectangle inside the image.

use batchstamp_core::{CropRect, Dimensions};
use dioxus::prelude::*;

/// Props for the [`CropModal`] component.
#[derive(Props, Clone, PartialEq)]
pub struct CropModalProps {
    /// `blob:` URL of the image being cropped.
    url: String,
    /// File name shown in the title.
    name: String,
    /// Native image size.
    bounds: Dimensions,
    /// Current selection.
    rect: CropRect,
    /// Fired with the requested selection when a slider moves.
    on_change: EventHandler<CropRect>,
    /// Fired when the user applies the crop.
    on_confirm: EventHandler<()>,
    /// Fired when the user dismisses the editor.
    on_cancel: EventHandler<()>,
}

/// Percentage of `total` covered by `part`, for CSS positioning.
fn percent(part: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(part) * 100.0 / f64::from(total)
}

/// Modal crop editor for one image.
#[component]
pub fn CropModal(props: CropModalProps) -> Element {
    let CropModalProps {
        url,
        name,
        bounds,
        rect,
        on_change,
        on_confirm,
        on_cancel,
    } = props;

    let left = percent(rect.x, bounds.width);
    let top = percent(rect.y, bounds.height);
    let width = percent(rect.width, bounds.width);
    let height = percent(rect.height, bounds.height);
    let overlay_style =
        format!("left: {left:.3}%; top: {top:.3}%; width: {width:.3}%; height: {height:.3}%;");

    rsx! {
        div { class: "modal-backdrop",
            div {
                class: "modal",
                role: "dialog",
                aria_label: "Crop {name}",

                h3 { class: "modal-title", "Crop {name}" }

                div { class: "crop-stage",
                    img { src: "{url}", class: "crop-image", alt: "{name}" }
                    div { class: "crop-selection", style: "{overlay_style}" }
                }

                div { class: "crop-controls",
                    {render_slider("crop_x", "Left", rect.x, bounds.width.saturating_sub(1), move |v| {
                        on_change.call(CropRect { x: v, ..rect });
                    })}
                    {render_slider("crop_y", "Top", rect.y, bounds.height.saturating_sub(1), move |v| {
                        on_change.call(CropRect { y: v, ..rect });
                    })}
                    {render_slider("crop_w", "Width", rect.width, bounds.width, move |v| {
                        on_change.call(CropRect { width: v, ..rect });
                    })}
                    {render_slider("crop_h", "Height", rect.height, bounds.height, move |v| {
                        on_change.call(CropRect { height: v, ..rect });
                    })}
                }

                div { class: "modal-actions",
                    button {
                        class: "btn",
                        onclick: move |_| on_change.call(CropRect::full(bounds)),
                        "Reset"
                    }
                    button { class: "btn", onclick: move |_| on_cancel.call(()), "Cancel" }
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| on_confirm.call(()),
                        "Apply crop"
                    }
                }
            }
        }
    }
}

/// Render a labeled integer pixel slider.
fn render_slider(
    id: &str,
    label: &str,
    value: u32,
    max: u32,
    on_input: impl Fn(u32) + 'static,
) -> Element {
    let id = id.to_string();
    let label = label.to_string();

    rsx! {
        div { class: "slider",
            div { class: "slider-header",
                label { r#for: "{id}", "{label}" }
                span { class: "tabular-nums", "{value} px" }
            }
            input {
                r#type: "range",
                id: "{id}",
                min: "0",
                max: "{max}",
                step: "1",
                value: "{value}",
                oninput: move |e| {
                    match e.value().parse::<u32>() {
                        Ok(v) => on_input(v),
                        Err(err) => {
                            web_sys::console::warn_1(
                                &format!("slider parse failure: {err:?} from {:?}", e.value())
                                    .into(),
                            );
                        }
                    }
                },
            }
        }
    }
}
