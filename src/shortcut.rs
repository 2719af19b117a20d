use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use crate::error::ConfigError;

/// Parse an accelerator such as `CommandOrControl+Shift+O`.
pub fn parse_accelerator(accelerator: &str) -> Result<Shortcut, ConfigError> {
    accelerator
        .parse::<Shortcut>()
        .map_err(|e| ConfigError::InvalidShortcut {
            accelerator: accelerator.to_string(),
            message: e.to_string(),
        })
}

/// Only the key press toggles; the matching release is ignored.
pub fn triggers_toggle(state: ShortcutState) -> bool {
    state == ShortcutState::Pressed
}

/// Bind `accelerator` to the overlay toggle. The handler hops onto the main
/// thread so it is serialized with tray and command handling.
pub fn register(app: &AppHandle, accelerator: &str) -> Result<(), Box<dyn std::error::Error>> {
    let shortcut = parse_accelerator(accelerator)?;
    app.global_shortcut()
        .on_shortcut(shortcut, |app, _shortcut, event| {
            if !triggers_toggle(event.state()) {
                return;
            }
            let handle = app.clone();
            let result = app.run_on_main_thread(move || {
                crate::with_controller(&handle, |c| c.toggle_overlay());
            });
            if let Err(e) = result {
                tracing::warn!("Failed to dispatch shortcut toggle: {e}");
            }
        })?;
    tracing::info!(accelerator, "global shortcut registered");
    Ok(())
}

/// Release every OS-level hotkey reservation held by this process.
pub fn unregister_all(app: &AppHandle) {
    if let Err(e) = app.global_shortcut().unregister_all() {
        tracing::warn!("Failed to unregister global shortcuts: {e}");
    }
}
