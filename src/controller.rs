use crate::config::AppConfig;
use crate::error::WindowError;
use crate::tray::TrayMenu;
use crate::window_manager::{DisplayInfo, WindowBackend, WindowLabel, WindowSpec};

/// Visibility of the overlay as seen by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    VisibleUnfocused,
    VisibleFocused,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        !matches!(self, Visibility::Hidden)
    }
}

/// What the run loop should do with an exit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    Proceed,
    KeepAlive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Show { focus: bool },
    Hide,
}

/// Owns the overlay and settings windows, the quit flag and the tray menu
/// that mirrors them.
///
/// Visibility only changes through [`Transition`]s applied by `dispatch`,
/// which re-renders the tray menu afterwards so its toggle label is never
/// stale.
pub struct OverlayController<B: WindowBackend> {
    backend: B,
    config: AppConfig,
    quitting: bool,
    settings_open: bool,
    overlay_loaded: bool,
    keep_alive_when_windowless: bool,
}

impl<B: WindowBackend> OverlayController<B> {
    pub fn new(backend: B, config: AppConfig) -> Self {
        Self {
            backend,
            config,
            quitting: false,
            settings_open: false,
            overlay_loaded: false,
            keep_alive_when_windowless: cfg!(target_os = "macos"),
        }
    }

    /// Whether the process stays alive once every window is gone
    /// (macOS convention; elsewhere the app quits).
    pub fn keep_alive_when_windowless(mut self, keep: bool) -> Self {
        self.keep_alive_when_windowless = keep;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[cfg(test)]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn visibility(&self) -> Visibility {
        let overlay = WindowLabel::Overlay;
        if !self.backend.exists(overlay) || !self.backend.is_visible(overlay) {
            Visibility::Hidden
        } else if self.backend.is_focused(overlay) {
            Visibility::VisibleFocused
        } else {
            Visibility::VisibleUnfocused
        }
    }

    // --- Overlay lifecycle ---

    /// Build the overlay window hidden, unfocusable and click-through.
    /// Does nothing if one already exists.
    pub fn create_overlay(&mut self) -> Result<(), WindowError> {
        if self.backend.exists(WindowLabel::Overlay) {
            return Ok(());
        }
        let spec = WindowSpec::overlay(&self.config);
        self.backend.create(WindowLabel::Overlay, &spec)?;
        self.overlay_loaded = false;
        tracing::info!(url = %spec.url, "overlay window created");
        Ok(())
    }

    /// Called on every finished page load. The first load of an overlay
    /// instance reveals it without stealing focus.
    pub fn content_loaded(&mut self, label: WindowLabel) {
        if label != WindowLabel::Overlay || self.overlay_loaded {
            return;
        }
        self.overlay_loaded = true;
        self.show_overlay(false);
    }

    pub fn show_overlay(&mut self, focus: bool) {
        if !self.backend.exists(WindowLabel::Overlay) {
            return;
        }
        self.dispatch(Transition::Show { focus });
    }

    pub fn hide_overlay(&mut self) {
        if !self.visibility().is_visible() {
            return;
        }
        self.dispatch(Transition::Hide);
    }

    pub fn toggle_overlay(&mut self) {
        if !self.backend.exists(WindowLabel::Overlay) {
            return;
        }
        if self.visibility().is_visible() {
            self.hide_overlay();
        } else {
            self.show_overlay(false);
        }
    }

    fn dispatch(&mut self, transition: Transition) {
        let overlay = WindowLabel::Overlay;
        let result = match transition {
            Transition::Show { focus } => {
                if !self.backend.is_visible(overlay) {
                    self.backend.show(overlay, focus)
                } else if focus {
                    self.backend.focus(overlay)
                } else {
                    Ok(())
                }
            }
            Transition::Hide => self.backend.hide(overlay),
        };
        log_failure("overlay transition", overlay, result);
        tracing::debug!(?transition, visibility = ?self.visibility(), "overlay transition");
        self.refresh_tray();
    }

    /// Render and present a new tray menu from the current state.
    pub fn refresh_tray(&mut self) {
        let menu = self.tray_menu();
        if let Err(e) = self.backend.present_tray_menu(&menu) {
            tracing::warn!("Failed to update tray menu: {e}");
        }
    }

    pub fn tray_menu(&self) -> TrayMenu {
        TrayMenu::render(self.visibility().is_visible(), &self.config.labels)
    }

    /// Menu popped up over the content on right click.
    pub fn context_menu(&self) -> TrayMenu {
        self.tray_menu()
    }

    // --- Per-window operations requested by content ---

    /// Move `label` to the nearest integer position. Off-screen positions
    /// are accepted as is.
    pub fn move_window(&mut self, label: WindowLabel, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() {
            tracing::debug!(x, y, "ignoring non-finite move");
            return;
        }
        if !self.backend.exists(label) {
            return;
        }
        let result = self.backend.set_position(label, round_half_up(x), round_half_up(y));
        log_failure("move", label, result);
    }

    pub fn set_click_through(&mut self, label: WindowLabel, ignore: bool) {
        if !self.backend.exists(label) {
            return;
        }
        let result = self.backend.set_click_through(label, ignore);
        log_failure("set click-through", label, result);
    }

    /// Revoking focusability from a focused window blurs it first so it
    /// cannot keep focus it is no longer allowed to have.
    pub fn set_focusable(&mut self, label: WindowLabel, focusable: bool) {
        if !self.backend.exists(label) {
            return;
        }
        if !focusable && self.backend.is_focused(label) {
            log_failure("blur", label, self.backend.blur(label));
        }
        match self.backend.set_focusable(label, focusable) {
            Err(WindowError::Unsupported(what)) => {
                tracing::debug!(window = label.as_str(), "{what} unsupported, skipping");
            }
            result => log_failure("set focusable", label, result),
        }
    }

    pub fn display_bounds(&self, label: WindowLabel) -> Option<DisplayInfo> {
        if !self.backend.exists(label) {
            return None;
        }
        self.backend.display_info(label)
    }

    // --- Settings window ---

    /// Focus the live settings window, or build a new one.
    pub fn create_settings(&mut self) {
        let settings = WindowLabel::Settings;
        if self.settings_open && self.backend.exists(settings) {
            log_failure("show settings", settings, self.backend.show(settings, true));
            log_failure("focus settings", settings, self.backend.focus(settings));
            return;
        }
        let spec = WindowSpec::settings(&self.config);
        match self.backend.create(settings, &spec) {
            Ok(()) => {
                self.settings_open = true;
                log_failure("show settings", settings, self.backend.show(settings, true));
                tracing::info!(url = %spec.url, "settings window created");
            }
            Err(e) => tracing::error!("Failed to create settings window: {e}"),
        }
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open && self.backend.exists(WindowLabel::Settings)
    }

    /// Forget a destroyed window. A destroyed settings window is never reused.
    pub fn window_destroyed(&mut self, label: WindowLabel) {
        match label {
            WindowLabel::Settings => self.settings_open = false,
            WindowLabel::Overlay => {
                self.overlay_loaded = false;
                self.refresh_tray();
            }
        }
    }

    // --- Quit handling ---

    /// Returns `true` when the close was intercepted: before a deliberate
    /// quit the overlay is hidden instead of destroyed.
    pub fn intercept_close(&mut self, label: WindowLabel) -> bool {
        if label != WindowLabel::Overlay || self.quitting {
            return false;
        }
        self.dispatch(Transition::Hide);
        true
    }

    /// Set the quit flag. Idempotent.
    pub fn begin_quit(&mut self) {
        if !self.quitting {
            tracing::info!("quit requested");
        }
        self.quitting = true;
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    /// `explicit` is true for app-initiated exits; false when the run loop
    /// exits because the last window closed.
    pub fn on_exit_requested(&mut self, explicit: bool) -> ExitDecision {
        if !explicit && !self.quitting && self.keep_alive_when_windowless {
            return ExitDecision::KeepAlive;
        }
        self.begin_quit();
        ExitDecision::Proceed
    }

    /// Platform reactivation (dock click): rebuild the overlay if every
    /// window is gone, otherwise reveal it.
    pub fn reactivate(&mut self) {
        if self.backend.window_count() == 0 {
            if let Err(e) = self.create_overlay() {
                tracing::error!("Failed to recreate overlay window: {e}");
            }
            return;
        }
        self.show_overlay(false);
    }
}

/// Round to the nearest integer with halves going up (`-1.5` becomes `-1`).
fn round_half_up(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

fn log_failure(op: &str, label: WindowLabel, result: Result<(), WindowError>) {
    if let Err(e) = result {
        tracing::warn!(window = label.as_str(), "{op} failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window_manager::fake::FakeBackend;

    fn controller() -> OverlayController<FakeBackend> {
        let mut c = OverlayController::new(FakeBackend::new(), AppConfig::default())
            .keep_alive_when_windowless(false);
        c.create_overlay().unwrap();
        c
    }

    fn loaded() -> OverlayController<FakeBackend> {
        let mut c = controller();
        c.content_loaded(WindowLabel::Overlay);
        c
    }

    fn presented_toggle_label(c: &OverlayController<FakeBackend>) -> String {
        c.backend()
            .last_menu()
            .and_then(|m| m.toggle_label())
            .unwrap()
            .to_string()
    }

    #[test]
    fn overlay_starts_hidden_click_through_and_unfocusable() {
        let c = controller();
        let window = c.backend().window(WindowLabel::Overlay).unwrap();
        assert_eq!(c.visibility(), Visibility::Hidden);
        assert!(window.click_through);
        assert!(!window.focusable);
        assert!(c.backend().last_menu().is_none());
    }

    #[test]
    fn first_load_shows_without_focus_and_refreshes_tray() {
        let c = loaded();
        assert_eq!(c.visibility(), Visibility::VisibleUnfocused);
        assert_eq!(presented_toggle_label(&c), "隐藏悬浮球");
    }

    #[test]
    fn later_loads_do_not_reshow() {
        let mut c = loaded();
        c.hide_overlay();
        c.content_loaded(WindowLabel::Overlay);
        assert_eq!(c.visibility(), Visibility::Hidden);
    }

    #[test]
    fn settings_loads_do_not_touch_overlay() {
        let mut c = controller();
        c.content_loaded(WindowLabel::Settings);
        assert_eq!(c.visibility(), Visibility::Hidden);
    }

    #[test]
    fn toggle_parity_from_hidden() {
        for n in 0..9 {
            let mut c = controller();
            for _ in 0..n {
                c.toggle_overlay();
            }
            assert_eq!(c.visibility().is_visible(), n % 2 == 1, "after {n} toggles");
        }
    }

    #[test]
    fn tray_label_tracks_every_transition() {
        let mut c = controller();
        c.show_overlay(false);
        assert_eq!(presented_toggle_label(&c), "隐藏悬浮球");
        c.hide_overlay();
        assert_eq!(presented_toggle_label(&c), "显示悬浮球");
        c.toggle_overlay();
        assert_eq!(presented_toggle_label(&c), "隐藏悬浮球");
        c.toggle_overlay();
        assert_eq!(presented_toggle_label(&c), "显示悬浮球");
        c.show_overlay(true);
        assert_eq!(presented_toggle_label(&c), "隐藏悬浮球");
    }

    #[test]
    fn every_menu_is_a_new_render() {
        let mut c = controller();
        c.toggle_overlay();
        c.toggle_overlay();
        c.toggle_overlay();
        assert_eq!(c.backend().menus.len(), 3);
    }

    #[test]
    fn show_refreshes_tray_even_when_already_visible() {
        let mut c = loaded();
        let before = c.backend().menus.len();
        c.show_overlay(false);
        assert_eq!(c.backend().menus.len(), before + 1);
        assert_eq!(c.backend().window(WindowLabel::Overlay).unwrap().show_calls, 1);
    }

    #[test]
    fn hide_when_hidden_is_noop() {
        let mut c = controller();
        c.hide_overlay();
        assert!(c.backend().menus.is_empty());
    }

    #[test]
    fn show_with_focus_focuses_a_focusable_overlay() {
        let mut c = loaded();
        c.set_focusable(WindowLabel::Overlay, true);
        c.show_overlay(true);
        assert_eq!(c.visibility(), Visibility::VisibleFocused);
    }

    #[test]
    fn operations_on_missing_overlay_are_noops() {
        let mut c = OverlayController::new(FakeBackend::new(), AppConfig::default());
        c.show_overlay(true);
        c.hide_overlay();
        c.toggle_overlay();
        c.move_window(WindowLabel::Overlay, 10.0, 10.0);
        c.set_click_through(WindowLabel::Overlay, false);
        c.set_focusable(WindowLabel::Overlay, true);
        assert_eq!(c.visibility(), Visibility::Hidden);
        assert!(c.display_bounds(WindowLabel::Overlay).is_none());
        assert!(c.backend().menus.is_empty());
    }

    #[test]
    fn move_rounds_to_nearest_integer() {
        let mut c = loaded();
        c.move_window(WindowLabel::Overlay, 10.4, 20.6);
        assert_eq!(c.backend().window(WindowLabel::Overlay).unwrap().position, (10, 21));
        c.move_window(WindowLabel::Overlay, -1.5, 2.5);
        assert_eq!(c.backend().window(WindowLabel::Overlay).unwrap().position, (-1, 3));
    }

    #[test]
    fn move_accepts_off_screen_positions() {
        let mut c = loaded();
        c.move_window(WindowLabel::Overlay, -5000.0, 99999.0);
        assert_eq!(c.backend().window(WindowLabel::Overlay).unwrap().position, (-5000, 99999));
    }

    #[test]
    fn move_ignores_non_finite_coordinates() {
        let mut c = loaded();
        c.move_window(WindowLabel::Overlay, 5.0, 5.0);
        c.move_window(WindowLabel::Overlay, f64::NAN, 1.0);
        assert_eq!(c.backend().window(WindowLabel::Overlay).unwrap().position, (5, 5));
    }

    #[test]
    fn click_through_toggles() {
        let mut c = loaded();
        c.set_click_through(WindowLabel::Overlay, false);
        assert!(!c.backend().window(WindowLabel::Overlay).unwrap().click_through);
        c.set_click_through(WindowLabel::Overlay, true);
        assert!(c.backend().window(WindowLabel::Overlay).unwrap().click_through);
    }

    #[test]
    fn cursor_is_forwarded_only_while_click_through() {
        let mut c = OverlayController::new(FakeBackend::new(), AppConfig::default());
        assert!(!c.backend().forwards_cursor(WindowLabel::Overlay));
        c.create_overlay().unwrap();
        assert!(c.backend().forwards_cursor(WindowLabel::Overlay));

        c.set_click_through(WindowLabel::Overlay, false);
        assert!(!c.backend().forwards_cursor(WindowLabel::Overlay));
        c.set_click_through(WindowLabel::Overlay, true);
        assert!(c.backend().forwards_cursor(WindowLabel::Overlay));

        c.create_settings();
        assert!(!c.backend().forwards_cursor(WindowLabel::Settings));
    }

    #[test]
    fn revoking_focusability_blurs_a_focused_window() {
        let mut c = loaded();
        c.set_focusable(WindowLabel::Overlay, true);
        c.show_overlay(true);
        assert!(c.backend().is_focused(WindowLabel::Overlay));

        c.set_focusable(WindowLabel::Overlay, false);
        assert!(!c.backend().is_focused(WindowLabel::Overlay));
        assert!(!c.backend().window(WindowLabel::Overlay).unwrap().focusable);
        assert_eq!(c.backend().window(WindowLabel::Overlay).unwrap().blur_calls, 1);
    }

    #[test]
    fn revoking_focusability_from_unfocused_window_does_not_blur() {
        let mut c = loaded();
        c.set_focusable(WindowLabel::Overlay, false);
        assert_eq!(c.backend().window(WindowLabel::Overlay).unwrap().blur_calls, 0);
    }

    #[test]
    fn unsupported_focusability_is_a_noop() {
        let mut c = loaded();
        c.backend_mut().focusable_supported = false;
        c.set_focusable(WindowLabel::Overlay, true);
        assert!(!c.backend().window(WindowLabel::Overlay).unwrap().focusable);
    }

    #[test]
    fn display_bounds_for_live_window() {
        let c = loaded();
        let info = c.display_bounds(WindowLabel::Overlay).unwrap();
        assert_eq!(info.bounds.width, 1440.0);
        assert!(info.work_area.height < info.bounds.height);
    }

    #[test]
    fn create_settings_twice_keeps_one_window() {
        let mut c = loaded();
        c.create_settings();
        c.move_window(WindowLabel::Settings, 300.0, 200.0);
        c.create_settings();

        let settings = c.backend().window(WindowLabel::Settings).unwrap();
        assert_eq!(c.backend().created_count(WindowLabel::Settings), 1);
        assert_eq!(settings.position, (300, 200));
        assert_eq!((settings.spec.width, settings.spec.height), (420.0, 560.0));
        assert!(settings.visible);
        assert!(c.backend().is_focused(WindowLabel::Settings));
    }

    #[test]
    fn settings_is_recreated_after_close() {
        let mut c = loaded();
        c.create_settings();
        c.backend_mut().destroy(WindowLabel::Settings);
        c.window_destroyed(WindowLabel::Settings);
        assert!(!c.settings_open());

        c.create_settings();
        assert!(c.settings_open());
        assert_eq!(c.backend().created_count(WindowLabel::Settings), 2);
    }

    #[test]
    fn settings_window_loads_settings_variant() {
        let mut c = loaded();
        c.create_settings();
        let settings = c.backend().window(WindowLabel::Settings).unwrap();
        assert_eq!(settings.spec.url.query(), Some("settings=1"));
        assert!(settings.spec.decorations);
    }

    #[test]
    fn close_before_quit_hides_the_same_instance() {
        let mut c = loaded();
        let instance = c.backend().window(WindowLabel::Overlay).unwrap().instance;

        assert!(c.intercept_close(WindowLabel::Overlay));
        assert_eq!(c.visibility(), Visibility::Hidden);
        assert_eq!(presented_toggle_label(&c), "显示悬浮球");

        c.set_focusable(WindowLabel::Overlay, true);
        c.show_overlay(true);
        let window = c.backend().window(WindowLabel::Overlay).unwrap();
        assert_eq!(window.instance, instance);
        assert_eq!(c.visibility(), Visibility::VisibleFocused);
    }

    #[test]
    fn close_after_quit_is_allowed() {
        let mut c = loaded();
        c.begin_quit();
        assert!(!c.intercept_close(WindowLabel::Overlay));
    }

    #[test]
    fn settings_close_is_never_intercepted() {
        let mut c = loaded();
        c.create_settings();
        assert!(!c.intercept_close(WindowLabel::Settings));
    }

    #[test]
    fn explicit_exit_sets_quit_flag() {
        let mut c = loaded();
        assert_eq!(c.on_exit_requested(true), ExitDecision::Proceed);
        assert!(c.is_quitting());
    }

    #[test]
    fn windowless_exit_kept_alive_where_platform_expects_it() {
        let mut c = loaded().keep_alive_when_windowless(true);
        assert_eq!(c.on_exit_requested(false), ExitDecision::KeepAlive);
        assert!(!c.is_quitting());

        c.begin_quit();
        assert_eq!(c.on_exit_requested(false), ExitDecision::Proceed);
    }

    #[test]
    fn windowless_exit_proceeds_elsewhere() {
        let mut c = loaded();
        assert_eq!(c.on_exit_requested(false), ExitDecision::Proceed);
        assert!(c.is_quitting());
    }

    #[test]
    fn reactivate_recreates_overlay_when_no_windows_remain() {
        let mut c = loaded();
        c.backend_mut().destroy(WindowLabel::Overlay);
        c.window_destroyed(WindowLabel::Overlay);

        c.reactivate();
        let window = c.backend().window(WindowLabel::Overlay).unwrap();
        assert_eq!(window.instance, 2);
        assert!(window.click_through);
        assert_eq!(c.visibility(), Visibility::Hidden);

        c.content_loaded(WindowLabel::Overlay);
        assert_eq!(c.visibility(), Visibility::VisibleUnfocused);
    }

    #[test]
    fn reactivate_shows_existing_overlay() {
        let mut c = loaded();
        c.hide_overlay();
        c.reactivate();
        assert_eq!(c.visibility(), Visibility::VisibleUnfocused);
        assert_eq!(c.backend().created_count(WindowLabel::Overlay), 1);
    }

    #[test]
    fn create_overlay_is_idempotent() {
        let mut c = loaded();
        c.create_overlay().unwrap();
        assert_eq!(c.backend().created_count(WindowLabel::Overlay), 1);
        assert_eq!(c.visibility(), Visibility::VisibleUnfocused);
    }

    #[test]
    fn context_menu_matches_tray_state() {
        let c = loaded();
        assert_eq!(c.context_menu().toggle_label(), Some("隐藏悬浮球"));
    }
}
