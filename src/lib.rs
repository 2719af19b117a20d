pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod focus;
pub mod logging;
pub mod shortcut;
pub mod tray;
pub mod window_manager;

use std::sync::Mutex;

use tauri::{AppHandle, Manager, RunEvent};

use config::AppConfig;
use controller::{ExitDecision, OverlayController};
use window_manager::desktop::DesktopBackend;

/// Controller as stored in Tauri managed state.
pub type SharedController = Mutex<OverlayController<DesktopBackend>>;

/// Run `f` against the managed controller. Returns `None` before setup has
/// registered it.
pub(crate) fn with_controller<T>(
    app: &AppHandle,
    f: impl FnOnce(&mut OverlayController<DesktopBackend>) -> T,
) -> Option<T> {
    let state = app.try_state::<SharedController>()?;
    let mut guard = match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("controller lock poisoned, recovering");
            poisoned.into_inner()
        }
    };
    Some(f(&mut guard))
}

/// Read `floatball.json` from the app config directory, falling back to
/// defaults when the directory is unknown or the file is broken.
fn load_config(app: &AppHandle) -> (AppConfig, Option<String>) {
    let dir = match app.path().app_config_dir() {
        Ok(dir) => dir,
        Err(e) => return (AppConfig::default(), Some(format!("no config directory: {e}"))),
    };
    match AppConfig::load(&dir) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(format!("{}: {e}", dir.display()))),
    }
}

fn handle_run_event(app: &AppHandle, event: RunEvent) {
    match event {
        RunEvent::ExitRequested { code, api, .. } => {
            let decision = with_controller(app, |c| c.on_exit_requested(code.is_some()))
                .unwrap_or(ExitDecision::Proceed);
            if decision == ExitDecision::KeepAlive {
                api.prevent_exit();
            }
        }
        RunEvent::Exit => {
            shortcut::unregister_all(app);
            tray::destroy_tray(app);
            tracing::info!("shutdown complete");
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            with_controller(app, |c| c.reactivate());
        }
        _ => {}
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .invoke_handler(tauri::generate_handler![commands::window_command])
        .on_menu_event(tray::handle_menu_event)
        .setup(|app| {
            let (config, config_error) = load_config(app.handle());
            logging::init(config.debug_logging);
            if let Some(e) = config_error {
                tracing::warn!("Failed to load config, using defaults: {e}");
            }
            if !config.content_is_loopback() {
                tracing::warn!(
                    url = %config.content_url,
                    "content url is not a loopback http origin; window commands will be rejected"
                );
            }

            let backend = DesktopBackend::new(app.handle().clone());
            app.manage::<SharedController>(Mutex::new(OverlayController::new(backend, config.clone())));

            if let Some(Err(e)) = with_controller(app.handle(), |c| c.create_overlay()) {
                tracing::error!("Failed to create overlay window: {e}");
            }
            if let Err(e) = tray::setup_tray(app, &config) {
                tracing::error!("Failed to create tray icon: {e}");
            }
            if let Err(e) = shortcut::register(app.handle(), &config.shortcut) {
                tracing::error!("Failed to register global shortcut: {e}");
            }
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(handle_run_event);
}
