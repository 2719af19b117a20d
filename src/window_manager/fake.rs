use std::collections::HashMap;

use super::{DisplayInfo, Rect, WindowBackend, WindowLabel, WindowSpec};
use crate::error::WindowError;
use crate::tray::TrayMenu;

/// In-memory window as tracked by [`FakeBackend`].
#[derive(Debug, Clone)]
pub struct FakeWindow {
    /// Creation sequence number, unique across all windows.
    pub instance: u32,
    pub spec: WindowSpec,
    pub visible: bool,
    pub focused: bool,
    pub focusable: bool,
    pub click_through: bool,
    pub position: (i32, i32),
    pub show_calls: u32,
    pub blur_calls: u32,
}

/// Windowing backend used by unit tests. Focus is only granted to
/// focusable windows and only one window holds it at a time.
#[derive(Debug)]
pub struct FakeBackend {
    pub windows: HashMap<WindowLabel, FakeWindow>,
    pub menus: Vec<TrayMenu>,
    pub display: DisplayInfo,
    pub focusable_supported: bool,
    created: HashMap<WindowLabel, u32>,
    next_instance: u32,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            windows: HashMap::new(),
            menus: Vec::new(),
            display: DisplayInfo {
                bounds: Rect { x: 0.0, y: 0.0, width: 1440.0, height: 900.0 },
                work_area: Rect { x: 0.0, y: 25.0, width: 1440.0, height: 875.0 },
            },
            focusable_supported: true,
            created: HashMap::new(),
            next_instance: 1,
        }
    }

    pub fn window(&self, label: WindowLabel) -> Option<&FakeWindow> {
        self.windows.get(&label)
    }

    pub fn last_menu(&self) -> Option<&TrayMenu> {
        self.menus.last()
    }

    pub fn created_count(&self, label: WindowLabel) -> u32 {
        self.created.get(&label).copied().unwrap_or(0)
    }

    /// Simulate the toolkit destroying a window.
    pub fn destroy(&mut self, label: WindowLabel) {
        self.windows.remove(&label);
    }

    fn get_mut(&mut self, label: WindowLabel) -> Result<&mut FakeWindow, WindowError> {
        self.windows
            .get_mut(&label)
            .ok_or(WindowError::NotFound(label.as_str()))
    }

    fn take_focus(&mut self, label: WindowLabel) -> Result<(), WindowError> {
        if !self.get_mut(label)?.focusable {
            return Ok(());
        }
        for (other, window) in self.windows.iter_mut() {
            window.focused = *other == label;
        }
        Ok(())
    }
}

impl WindowBackend for FakeBackend {
    fn exists(&self, label: WindowLabel) -> bool {
        self.windows.contains_key(&label)
    }

    fn window_count(&self) -> usize {
        self.windows.len()
    }

    fn create(&mut self, label: WindowLabel, spec: &WindowSpec) -> Result<(), WindowError> {
        let instance = self.next_instance;
        self.next_instance += 1;
        *self.created.entry(label).or_insert(0) += 1;
        self.windows.insert(
            label,
            FakeWindow {
                instance,
                spec: spec.clone(),
                visible: false,
                focused: false,
                focusable: spec.focusable,
                click_through: spec.click_through,
                position: (0, 0),
                show_calls: 0,
                blur_calls: 0,
            },
        );
        Ok(())
    }

    fn is_visible(&self, label: WindowLabel) -> bool {
        self.windows.get(&label).is_some_and(|w| w.visible)
    }

    fn is_focused(&self, label: WindowLabel) -> bool {
        self.windows.get(&label).is_some_and(|w| w.focused)
    }

    fn show(&mut self, label: WindowLabel, focus: bool) -> Result<(), WindowError> {
        let window = self.get_mut(label)?;
        window.visible = true;
        window.show_calls += 1;
        if focus {
            self.take_focus(label)?;
        }
        Ok(())
    }

    fn hide(&mut self, label: WindowLabel) -> Result<(), WindowError> {
        let window = self.get_mut(label)?;
        window.visible = false;
        window.focused = false;
        Ok(())
    }

    fn focus(&mut self, label: WindowLabel) -> Result<(), WindowError> {
        self.take_focus(label)
    }

    fn blur(&mut self, label: WindowLabel) -> Result<(), WindowError> {
        let window = self.get_mut(label)?;
        window.focused = false;
        window.blur_calls += 1;
        Ok(())
    }

    fn set_position(&mut self, label: WindowLabel, x: i32, y: i32) -> Result<(), WindowError> {
        self.get_mut(label)?.position = (x, y);
        Ok(())
    }

    fn set_click_through(&mut self, label: WindowLabel, ignore: bool) -> Result<(), WindowError> {
        self.get_mut(label)?.click_through = ignore;
        Ok(())
    }

    fn forwards_cursor(&self, label: WindowLabel) -> bool {
        self.windows.get(&label).is_some_and(|w| w.click_through)
    }

    fn set_focusable(&mut self, label: WindowLabel, focusable: bool) -> Result<(), WindowError> {
        if !self.focusable_supported {
            return Err(WindowError::Unsupported("focusability"));
        }
        self.get_mut(label)?.focusable = focusable;
        Ok(())
    }

    fn display_info(&self, label: WindowLabel) -> Option<DisplayInfo> {
        self.windows.get(&label).map(|_| self.display)
    }

    fn present_tray_menu(&mut self, menu: &TrayMenu) -> Result<(), WindowError> {
        self.menus.push(menu.clone());
        Ok(())
    }
}
