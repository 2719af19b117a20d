use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tauri::webview::PageLoadEvent;
use tauri::window::Color;
use tauri::{
    AppHandle, Emitter, LogicalPosition, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder,
    WindowEvent,
};

use super::cursor::{CursorTracker, CURSOR_EVENT};
use super::{DisplayInfo, Rect, WindowBackend, WindowLabel, WindowSpec};
use crate::error::WindowError;
use crate::tray::{self, TrayMenu};

/// How often the cursor is sampled for click-through windows.
const CURSOR_POLL: Duration = Duration::from_millis(30);

type ForwardingSet = Arc<Mutex<HashSet<WindowLabel>>>;

/// Window backend driving real Tauri webview windows.
pub struct DesktopBackend {
    app: AppHandle,
    forwarding: ForwardingSet,
}

impl DesktopBackend {
    /// Also starts the cursor forwarding loop for click-through windows.
    pub fn new(app: AppHandle) -> Self {
        let forwarding = ForwardingSet::default();
        spawn_cursor_forwarding(app.clone(), forwarding.clone());
        Self { app, forwarding }
    }

    fn set_forwarding(&self, label: WindowLabel, enabled: bool) {
        let mut set = self.forwarding.lock().unwrap_or_else(|p| p.into_inner());
        if enabled {
            set.insert(label);
        } else {
            set.remove(&label);
        }
    }

    fn window(&self, label: WindowLabel) -> Result<WebviewWindow, WindowError> {
        self.app
            .get_webview_window(label.as_str())
            .ok_or(WindowError::NotFound(label.as_str()))
    }
}

/// Wire page-load and window events back into the controller.
fn attach_handlers(window: &WebviewWindow, label: WindowLabel) {
    let handle = window.app_handle().clone();
    let target = window.clone();
    window.on_window_event(move |event| match event {
        WindowEvent::CloseRequested { api, .. } => {
            let intercepted = crate::with_controller(&handle, |c| c.intercept_close(label)).unwrap_or(false);
            if intercepted {
                api.prevent_close();
                tracing::debug!(window = target.label(), "close intercepted, window hidden");
            }
        }
        WindowEvent::Destroyed => {
            crate::with_controller(&handle, |c| c.window_destroyed(label));
        }
        _ => {}
    });
}

impl WindowBackend for DesktopBackend {
    fn exists(&self, label: WindowLabel) -> bool {
        self.app.get_webview_window(label.as_str()).is_some()
    }

    fn window_count(&self) -> usize {
        self.app.webview_windows().len()
    }

    fn create(&mut self, label: WindowLabel, spec: &WindowSpec) -> Result<(), WindowError> {
        let (r, g, b, a) = spec.background;
        let builder = WebviewWindowBuilder::new(&self.app, label.as_str(), WebviewUrl::External(spec.url.clone()))
            .initialization_script(spec.init_script)
            .title(&spec.title)
            .inner_size(spec.width, spec.height)
            .resizable(spec.resizable)
            .decorations(spec.decorations)
            .transparent(spec.transparent)
            .always_on_top(spec.always_on_top)
            .skip_taskbar(spec.skip_taskbar)
            .shadow(spec.shadow)
            .focusable(spec.focusable)
            .focused(false)
            .visible(false)
            .background_color(Color(r, g, b, a))
            .on_page_load(move |window, payload| {
                if matches!(payload.event(), PageLoadEvent::Finished) {
                    let handle = window.app_handle().clone();
                    crate::with_controller(&handle, |c| c.content_loaded(label));
                }
            });

        let window = builder.build()?;
        if spec.click_through {
            window.set_ignore_cursor_events(true)?;
        }
        self.set_forwarding(label, spec.click_through);
        attach_handlers(&window, label);

        #[cfg(debug_assertions)]
        if spec.devtools {
            window.open_devtools();
        }

        Ok(())
    }

    fn is_visible(&self, label: WindowLabel) -> bool {
        self.window(label)
            .and_then(|w| w.is_visible().map_err(WindowError::from))
            .unwrap_or(false)
    }

    fn is_focused(&self, label: WindowLabel) -> bool {
        self.window(label)
            .and_then(|w| w.is_focused().map_err(WindowError::from))
            .unwrap_or(false)
    }

    fn show(&mut self, label: WindowLabel, focus: bool) -> Result<(), WindowError> {
        let window = self.window(label)?;
        if focus {
            window.show()?;
            window.set_focus()?;
        } else {
            show_inactive(&window)?;
        }
        Ok(())
    }

    fn hide(&mut self, label: WindowLabel) -> Result<(), WindowError> {
        self.window(label)?.hide()?;
        Ok(())
    }

    fn focus(&mut self, label: WindowLabel) -> Result<(), WindowError> {
        self.window(label)?.set_focus()?;
        Ok(())
    }

    fn blur(&mut self, label: WindowLabel) -> Result<(), WindowError> {
        blur(&self.window(label)?)
    }

    fn set_position(&mut self, label: WindowLabel, x: i32, y: i32) -> Result<(), WindowError> {
        self.window(label)?
            .set_position(LogicalPosition::new(f64::from(x), f64::from(y)))?;
        Ok(())
    }

    fn set_click_through(&mut self, label: WindowLabel, ignore: bool) -> Result<(), WindowError> {
        self.window(label)?.set_ignore_cursor_events(ignore)?;
        self.set_forwarding(label, ignore);
        Ok(())
    }

    fn forwards_cursor(&self, label: WindowLabel) -> bool {
        self.forwarding
            .lock()
            .map(|set| set.contains(&label))
            .unwrap_or(false)
    }

    fn set_focusable(&mut self, label: WindowLabel, focusable: bool) -> Result<(), WindowError> {
        self.window(label)?.set_focusable(focusable)?;
        Ok(())
    }

    fn display_info(&self, label: WindowLabel) -> Option<DisplayInfo> {
        let window = self.window(label).ok()?;
        let monitor = window.current_monitor().ok().flatten()?;
        let scale = monitor.scale_factor();

        let position = monitor.position().to_logical::<f64>(scale);
        let size = monitor.size().to_logical::<f64>(scale);
        let work = monitor.work_area();
        let work_position = work.position.to_logical::<f64>(scale);
        let work_size = work.size.to_logical::<f64>(scale);

        Some(DisplayInfo {
            bounds: Rect {
                x: position.x,
                y: position.y,
                width: size.width,
                height: size.height,
            },
            work_area: Rect {
                x: work_position.x,
                y: work_position.y,
                width: work_size.width,
                height: work_size.height,
            },
        })
    }

    fn present_tray_menu(&mut self, menu: &TrayMenu) -> Result<(), WindowError> {
        tray::set_tray_menu(&self.app, menu)?;
        Ok(())
    }
}

/// A click-through window receives no mouse events, so its content could
/// never notice the cursor arriving. Poll the cursor and emit moves over
/// such windows as `cursor-forward` events instead.
fn spawn_cursor_forwarding(app: AppHandle, forwarding: ForwardingSet) {
    tauri::async_runtime::spawn(async move {
        let mut tracker = CursorTracker::new();
        let mut ticker = tokio::time::interval(CURSOR_POLL);
        loop {
            ticker.tick().await;
            let labels: Vec<WindowLabel> = {
                let set = forwarding.lock().unwrap_or_else(|p| p.into_inner());
                set.iter().copied().collect()
            };
            for label in WindowLabel::ALL {
                if !labels.contains(&label) {
                    tracker.forget(label);
                }
            }
            for label in labels {
                let Some(window) = app.get_webview_window(label.as_str()) else {
                    tracker.forget(label);
                    continue;
                };
                if !window.is_visible().unwrap_or(false) {
                    continue;
                }
                let Some((cursor, frame, scale)) = cursor_geometry(&window) else {
                    continue;
                };
                if let Some(sample) = tracker.sample(label, cursor, frame, scale) {
                    if let Err(e) = app.emit_to(label.as_str(), CURSOR_EVENT, sample) {
                        tracing::debug!(window = label.as_str(), "cursor forward failed: {e}");
                    }
                }
            }
        }
    });
}

/// Screen cursor, outer frame and scale factor, all in physical pixels.
fn cursor_geometry(window: &WebviewWindow) -> Option<((f64, f64), Rect, f64)> {
    let cursor = window.cursor_position().ok()?;
    let position = window.outer_position().ok()?;
    let size = window.outer_size().ok()?;
    let scale = window.scale_factor().ok()?;
    let frame = Rect {
        x: f64::from(position.x),
        y: f64::from(position.y),
        width: f64::from(size.width),
        height: f64::from(size.height),
    };
    Some(((cursor.x, cursor.y), frame, scale))
}

#[cfg(target_os = "macos")]
use super::macos::{blur, show_inactive};

#[cfg(target_os = "windows")]
use super::windows::{blur, show_inactive};

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn show_inactive(window: &WebviewWindow) -> Result<(), WindowError> {
    window.show()?;
    Ok(())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn blur(_window: &WebviewWindow) -> Result<(), WindowError> {
    Err(WindowError::Unsupported("explicit blur"))
}
