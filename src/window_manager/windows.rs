use tauri::WebviewWindow;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{
    GetWindow, SetForegroundWindow, ShowWindow, GW_HWNDNEXT, SW_SHOWNOACTIVATE,
};

use crate::error::WindowError;

/// Get the HWND from a Tauri WebviewWindow.
fn get_hwnd(window: &WebviewWindow) -> Result<HWND, WindowError> {
    let hwnd_raw = window.hwnd()?;
    Ok(HWND(hwnd_raw.0))
}

/// Show without activating, leaving the foreground window focused.
pub fn show_inactive(window: &WebviewWindow) -> Result<(), WindowError> {
    let hwnd = get_hwnd(window)?;
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
    }
    Ok(())
}

/// Hand the foreground to the next window in z-order.
pub fn blur(window: &WebviewWindow) -> Result<(), WindowError> {
    let hwnd = get_hwnd(window)?;
    unsafe {
        let next = GetWindow(hwnd, GW_HWNDNEXT).map_err(|e| WindowError::Backend(e.to_string()))?;
        foreground_result(SetForegroundWindow(next).as_bool())
    }
}

/// Windows may refuse a foreground change (focus-stealing rules), in which
/// case the overlay keeps focus and the caller has to hear about it.
fn foreground_result(switched: bool) -> Result<(), WindowError> {
    if switched {
        Ok(())
    } else {
        Err(WindowError::Backend("SetForegroundWindow refused the switch".into()))
    }
}
