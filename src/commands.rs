use serde::Deserialize;
use serde_json::Value;
use tauri::{AppHandle, WebviewWindow};

use crate::controller::OverlayController;
use crate::tray::{self, TrayMenu};
use crate::window_manager::{DisplayInfo, WindowBackend, WindowLabel};

/// A request sent by overlay or settings content.
///
/// Wire shape: `{"op": "<kebab-case name>", "args": {...}}`. Argument-less
/// operations still take an `args` object (`{}`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "kebab-case")]
pub enum Command {
    /// Move the issuing window.
    Move { x: f64, y: f64 },
    /// Click-through for the issuing window.
    SetClickThrough { ignore: bool },
    /// Always targets the overlay.
    Show {
        #[serde(default)]
        focus: bool,
    },
    /// Always targets the overlay.
    Hide {},
    /// Always targets the overlay.
    Toggle {},
    /// Focusability of the issuing window.
    SetFocusable { focusable: bool },
    /// Display geometry around the issuing window.
    DisplayBounds {},
    /// Pop the tray menu up over the issuing window.
    ContextMenu {},
}

/// Result of a handled [`Command`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Ack,
    Display(Option<DisplayInfo>),
    /// Menu to pop up once the controller lock is released.
    ContextMenu(Option<TrayMenu>),
}

impl Reply {
    /// Value handed back to the content. Everything but `display-bounds`
    /// answers `null`.
    pub fn into_json(self) -> Value {
        match self {
            Reply::Display(Some(info)) => serde_json::to_value(info).unwrap_or(Value::Null),
            Reply::Ack | Reply::Display(None) | Reply::ContextMenu(_) => Value::Null,
        }
    }
}

/// Apply `command` on behalf of `issuer`. Per-window operations from an
/// unknown issuer are no-ops; show/hide/toggle ignore the issuer.
pub fn dispatch<B: WindowBackend>(
    controller: &mut OverlayController<B>,
    issuer: Option<WindowLabel>,
    command: Command,
) -> Reply {
    match command {
        Command::Move { x, y } => {
            if let Some(label) = issuer {
                controller.move_window(label, x, y);
            }
            Reply::Ack
        }
        Command::SetClickThrough { ignore } => {
            if let Some(label) = issuer {
                controller.set_click_through(label, ignore);
            }
            Reply::Ack
        }
        Command::Show { focus } => {
            controller.show_overlay(focus);
            Reply::Ack
        }
        Command::Hide {} => {
            controller.hide_overlay();
            Reply::Ack
        }
        Command::Toggle {} => {
            controller.toggle_overlay();
            Reply::Ack
        }
        Command::SetFocusable { focusable } => {
            if let Some(label) = issuer {
                controller.set_focusable(label, focusable);
            }
            Reply::Ack
        }
        Command::DisplayBounds {} => {
            Reply::Display(issuer.and_then(|label| controller.display_bounds(label)))
        }
        Command::ContextMenu {} => Reply::ContextMenu(issuer.map(|_| controller.context_menu())),
    }
}

/// Entry point for the content's command channel.
#[tauri::command]
pub fn window_command(
    app: AppHandle,
    window: WebviewWindow,
    request: Command,
) -> Result<Value, String> {
    let issuer = WindowLabel::from_label(window.label());
    tracing::trace!(window = window.label(), ?request, "window command");

    let reply = crate::with_controller(&app, |c| dispatch(c, issuer, request))
        .ok_or_else(|| "window controller unavailable".to_string())?;

    if let Reply::ContextMenu(Some(model)) = &reply {
        let menu = tray::build_menu(&app, model).map_err(|e| e.to_string())?;
        window.popup_menu(&menu).map_err(|e| e.to_string())?;
    }

    Ok(reply.into_json())
}
