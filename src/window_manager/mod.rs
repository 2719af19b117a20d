pub mod cursor;
pub mod desktop;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(test)]
pub mod fake;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AppConfig;
use crate::error::WindowError;
use crate::tray::TrayMenu;

/// Script injected into every window before its content runs. Defines
/// `window.always`, the content's handle on the window command channel.
pub const BRIDGE_SCRIPT: &str = include_str!("../../ui/bridge.js");

/// The two windows this app ever creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowLabel {
    Overlay,
    Settings,
}

impl WindowLabel {
    pub const ALL: [WindowLabel; 2] = [WindowLabel::Overlay, WindowLabel::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            WindowLabel::Overlay => "overlay",
            WindowLabel::Settings => "settings",
        }
    }

    /// Resolve a toolkit window label. Unknown labels resolve to no window.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "overlay" => Some(WindowLabel::Overlay),
            "settings" => Some(WindowLabel::Settings),
            _ => None,
        }
    }
}

/// A rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Geometry of the display containing a window.
/// Serialized to camelCase to match what the content expects (`workArea`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayInfo {
    pub bounds: Rect,
    pub work_area: Rect,
}

/// Everything a backend needs to build one of the two windows.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSpec {
    pub title: String,
    pub url: Url,
    pub width: f64,
    pub height: f64,
    pub resizable: bool,
    pub decorations: bool,
    pub transparent: bool,
    pub always_on_top: bool,
    pub skip_taskbar: bool,
    pub shadow: bool,
    pub focusable: bool,
    pub click_through: bool,
    /// RGBA background.
    pub background: (u8, u8, u8, u8),
    pub devtools: bool,
    pub init_script: &'static str,
}

impl WindowSpec {
    /// Frameless, transparent, always-on-top ball. Created hidden,
    /// unfocusable and click-through; shown after the first page load.
    pub fn overlay(config: &AppConfig) -> Self {
        Self {
            title: String::new(),
            url: config.overlay_url(),
            width: config.overlay.width,
            height: config.overlay.height,
            resizable: false,
            decorations: false,
            transparent: true,
            always_on_top: true,
            skip_taskbar: true,
            shadow: false,
            focusable: false,
            click_through: true,
            background: (0, 0, 0, 0),
            devtools: config.open_devtools,
            init_script: BRIDGE_SCRIPT,
        }
    }

    /// Regular framed, opaque, resizable settings window.
    pub fn settings(config: &AppConfig) -> Self {
        Self {
            title: config.labels.settings.clone(),
            url: config.settings_url(),
            width: config.settings.width,
            height: config.settings.height,
            resizable: true,
            decorations: true,
            transparent: false,
            always_on_top: false,
            skip_taskbar: false,
            shadow: true,
            focusable: true,
            click_through: false,
            background: (0xf3, 0xf4, 0xf6, 0xff),
            devtools: false,
            init_script: BRIDGE_SCRIPT,
        }
    }
}

/// Seam over the windowing toolkit.
///
/// Every method that targets a window tolerates that window being gone:
/// queries answer `false`/`None`, mutations return `WindowError::NotFound`
/// which the controller logs and ignores.
pub trait WindowBackend {
    /// Whether a live (not destroyed) window exists for `label`.
    fn exists(&self, label: WindowLabel) -> bool;

    /// Number of live windows of any kind.
    fn window_count(&self) -> usize;

    /// Build a window. It stays hidden until `show` is called.
    fn create(&mut self, label: WindowLabel, spec: &WindowSpec) -> Result<(), WindowError>;

    fn is_visible(&self, label: WindowLabel) -> bool;

    fn is_focused(&self, label: WindowLabel) -> bool;

    /// Show the window. With `focus` unset the currently active
    /// application keeps input focus.
    fn show(&mut self, label: WindowLabel, focus: bool) -> Result<(), WindowError>;

    fn hide(&mut self, label: WindowLabel) -> Result<(), WindowError>;

    fn focus(&mut self, label: WindowLabel) -> Result<(), WindowError>;

    /// Explicitly give up input focus.
    fn blur(&mut self, label: WindowLabel) -> Result<(), WindowError>;

    fn set_position(&mut self, label: WindowLabel, x: i32, y: i32) -> Result<(), WindowError>;

    /// `true` lets mouse events fall through to whatever is beneath while
    /// cursor moves keep being forwarded to the content; `false` restores
    /// normal hit testing and stops forwarding.
    fn set_click_through(&mut self, label: WindowLabel, ignore: bool) -> Result<(), WindowError>;

    /// Whether cursor moves are currently forwarded to the window's content.
    fn forwards_cursor(&self, label: WindowLabel) -> bool;

    /// Returns `WindowError::Unsupported` where the platform cannot toggle it.
    fn set_focusable(&mut self, label: WindowLabel, focusable: bool) -> Result<(), WindowError>;

    /// Bounds and work area of the display containing the window.
    fn display_info(&self, label: WindowLabel) -> Option<DisplayInfo>;

    /// Replace the tray context menu with a freshly built one.
    fn present_tray_menu(&mut self, menu: &TrayMenu) -> Result<(), WindowError>;
}
