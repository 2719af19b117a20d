use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Wry};

use crate::config::{AppConfig, MenuLabels};

/// Id of the single process-wide tray icon.
pub const TRAY_ID: &str = "main";

/// Actions reachable from the tray menu and the content context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ToggleOverlay,
    OpenSettings,
    Quit,
}

impl MenuAction {
    pub fn id(self) -> &'static str {
        match self {
            MenuAction::ToggleOverlay => "toggle_overlay",
            MenuAction::OpenSettings => "open_settings",
            MenuAction::Quit => "quit",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "toggle_overlay" => Some(MenuAction::ToggleOverlay),
            "open_settings" => Some(MenuAction::OpenSettings),
            "quit" => Some(MenuAction::Quit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item { action: MenuAction, label: String },
    Separator,
}

/// Toolkit-independent snapshot of the tray menu.
///
/// A menu is immutable once attached to the tray, so a new `TrayMenu` is
/// rendered for every visibility change instead of relabelling in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayMenu {
    pub entries: Vec<MenuEntry>,
}

impl TrayMenu {
    /// Toggle, settings, separator, quit. The toggle label reads "hide"
    /// exactly when the overlay is visible.
    pub fn render(overlay_visible: bool, labels: &MenuLabels) -> Self {
        let toggle = if overlay_visible { &labels.hide } else { &labels.show };
        Self {
            entries: vec![
                MenuEntry::Item {
                    action: MenuAction::ToggleOverlay,
                    label: toggle.clone(),
                },
                MenuEntry::Item {
                    action: MenuAction::OpenSettings,
                    label: labels.settings.clone(),
                },
                MenuEntry::Separator,
                MenuEntry::Item {
                    action: MenuAction::Quit,
                    label: labels.quit.clone(),
                },
            ],
        }
    }

    pub fn label_for(&self, action: MenuAction) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            MenuEntry::Item { action: a, label } if *a == action => Some(label.as_str()),
            _ => None,
        })
    }

    pub fn toggle_label(&self) -> Option<&str> {
        self.label_for(MenuAction::ToggleOverlay)
    }
}

/// Build a Tauri menu from the snapshot.
pub fn build_menu(app: &AppHandle, model: &TrayMenu) -> tauri::Result<Menu<Wry>> {
    let menu = Menu::new(app)?;
    for entry in &model.entries {
        match entry {
            MenuEntry::Item { action, label } => {
                menu.append(&MenuItem::with_id(app, action.id(), label, true, None::<&str>)?)?;
            }
            MenuEntry::Separator => {
                menu.append(&PredefinedMenuItem::separator(app)?)?;
            }
        }
    }
    Ok(menu)
}

/// Route a menu click (tray or context menu) to the controller.
pub fn handle_menu_event(app: &AppHandle, event: tauri::menu::MenuEvent) {
    let Some(action) = MenuAction::from_id(event.id.as_ref()) else {
        tracing::debug!(id = event.id.as_ref(), "ignoring unknown menu item");
        return;
    };
    match action {
        MenuAction::ToggleOverlay => {
            crate::with_controller(app, |c| c.toggle_overlay());
        }
        MenuAction::OpenSettings => {
            crate::with_controller(app, |c| c.create_settings());
        }
        MenuAction::Quit => {
            crate::with_controller(app, |c| c.begin_quit());
            app.exit(0);
        }
    }
}

/// Create the system tray. The menu reflects the overlay's visibility at
/// setup time; left click toggles the overlay without opening the menu.
pub fn setup_tray(app: &tauri::App, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let visible = crate::with_controller(app.handle(), |c| c.visibility().is_visible()).unwrap_or(false);
    let menu = build_menu(app.handle(), &TrayMenu::render(visible, &config.labels))?;

    let mut builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip(&config.tray_tooltip)
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                crate::with_controller(tray.app_handle(), |c| c.toggle_overlay());
            }
        });

    if let Some(icon) = app.default_window_icon() {
        builder = builder.icon(icon.clone()).icon_as_template(cfg!(target_os = "macos"));
    }

    builder.build(app)?;
    Ok(())
}

/// Swap in a freshly built menu on the live tray icon.
pub fn set_tray_menu(app: &AppHandle, model: &TrayMenu) -> tauri::Result<()> {
    if let Some(tray) = app.tray_by_id(TRAY_ID) {
        tray.set_menu(Some(build_menu(app, model)?))?;
    }
    Ok(())
}

/// Remove the tray icon before exit.
pub fn destroy_tray(app: &AppHandle) {
    if app.remove_tray_by_id(TRAY_ID).is_some() {
        tracing::debug!("tray icon removed");
    }
}
