use thiserror::Error;

/// Failures raised by a window backend.
///
/// The controller treats every one of these as a no-op after logging, so a
/// close racing a pending command never surfaces to the content process.
#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window '{0}' not found")]
    NotFound(&'static str),

    #[error("operation not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("window backend error: {0}")]
    Backend(String),
}

impl From<tauri::Error> for WindowError {
    fn from(e: tauri::Error) -> Self {
        WindowError::Backend(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid shortcut '{accelerator}': {message}")]
    InvalidShortcut {
        accelerator: String,
        message: String,
    },
}
