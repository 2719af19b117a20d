use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// File name looked up inside the platform app-config directory.
pub const CONFIG_FILE: &str = "floatball.json";

const DEFAULT_CONTENT_URL: &str = "http://localhost:5173";
const DEFAULT_SHORTCUT: &str = "CommandOrControl+Shift+O";

/// Logical size of a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

/// Localized tray and context menu labels. Only the toggle entry switches
/// between `show` and `hide` at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuLabels {
    pub show: String,
    pub hide: String,
    pub settings: String,
    pub quit: String,
}

impl Default for MenuLabels {
    fn default() -> Self {
        Self {
            show: "显示悬浮球".to_string(),
            hide: "隐藏悬浮球".to_string(),
            settings: "设置".to_string(),
            quit: "退出".to_string(),
        }
    }
}

/// Runtime configuration. Every field has a default so a partial file is
/// enough to override a single value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Where the windows load their content from. Only loopback HTTP
    /// origins are granted the window command channel by
    /// `capabilities/default.json`; content served from anywhere else
    /// loads but cannot drive its window.
    pub content_url: Url,
    pub shortcut: String,
    pub tray_tooltip: String,
    pub overlay: WindowSize,
    pub settings: WindowSize,
    pub labels: MenuLabels,
    pub open_devtools: bool,
    pub debug_logging: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            content_url: Url::parse(DEFAULT_CONTENT_URL).expect("default content url is valid"),
            shortcut: DEFAULT_SHORTCUT.to_string(),
            tray_tooltip: "Always".to_string(),
            overlay: WindowSize {
                width: 360.0,
                height: 520.0,
            },
            settings: WindowSize {
                width: 420.0,
                height: 560.0,
            },
            labels: MenuLabels::default(),
            open_devtools: cfg!(debug_assertions),
            debug_logging: cfg!(debug_assertions),
        }
    }
}

impl AppConfig {
    /// Load `floatball.json` from `dir`. A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Whether `content_url` is an origin the default capability grants
    /// IPC to (`http` on `localhost` or `127.0.0.1`).
    pub fn content_is_loopback(&self) -> bool {
        self.content_url.scheme() == "http"
            && matches!(self.content_url.host_str(), Some("localhost" | "127.0.0.1"))
    }

    /// Content URL for the overlay window.
    pub fn overlay_url(&self) -> Url {
        self.content_url.clone()
    }

    /// Content URL for the settings window: the overlay origin with
    /// `settings=1` appended to the query.
    pub fn settings_url(&self) -> Url {
        let mut url = self.content_url.clone();
        url.query_pairs_mut().append_pair("settings", "1");
        url
    }
}
