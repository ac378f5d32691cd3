//! Blocking user notifications.

/// Show `message` in a blocking `window.alert` dialog.
///
/// Falls back to a console warning when no window is available.
pub fn alert(message: &str) {
    tracing::warn!(message, "user notified");
    let shown = web_sys::window().is_some_and(|w| w.alert_with_message(message).is_ok());
    if !shown {
        web_sys::console::warn_1(&message.into());
    }
}
