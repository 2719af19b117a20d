use objc2_app_kit::NSWindow;
use tauri::WebviewWindow;

use crate::error::WindowError;

fn ns_window(window: &WebviewWindow) -> Result<&NSWindow, WindowError> {
    let ptr = window.ns_window()?;
    if ptr.is_null() {
        return Err(WindowError::NotFound("ns_window"));
    }
    // The pointer stays valid for as long as the tauri window is alive.
    Ok(unsafe { &*(ptr as *const NSWindow) })
}

/// Order the window front without making it key, so the active
/// application keeps input focus.
pub fn show_inactive(window: &WebviewWindow) -> Result<(), WindowError> {
    let ns_window = ns_window(window)?;
    #[allow(unused_unsafe)]
    unsafe {
        ns_window.orderFrontRegardless();
    }
    Ok(())
}

/// Give up key status by ordering the window back within its level.
pub fn blur(window: &WebviewWindow) -> Result<(), WindowError> {
    let ns_window = ns_window(window)?;
    #[allow(unused_unsafe)]
    unsafe {
        ns_window.orderBack(None);
    }
    Ok(())
}
