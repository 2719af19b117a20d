//! Snapshot of the frontmost application, emitted by the `focusd` binary.
//!
//! Output is a single JSON object per invocation:
//! `{"ts_ms":…,"app_name":…,"bundle_id":…,"pid":…,"window_title":…}`.

use std::io::Write;

use serde::{Deserialize, Serialize};

/// One frontmost-application record. `window_title` is an empty string,
/// never absent, when the title cannot be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusRecord {
    pub ts_ms: i64,
    pub app_name: String,
    pub bundle_id: String,
    pub pid: i32,
    pub window_title: String,
}

/// What a platform provider knows about the frontmost application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrontmostApp {
    pub name: Option<String>,
    pub bundle_id: Option<String>,
    pub pid: i32,
    pub window_title: Option<String>,
}

pub trait FrontmostProvider {
    /// `None` when no frontmost application can be determined.
    fn frontmost(&self) -> Option<FrontmostApp>;
}

/// Outcome of one focus snapshot emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitStatus {
    Emitted,
    /// Encoding or writing failed; nothing useful reached the output.
    Suppressed,
    NoFrontmostApp,
}

impl EmitStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            EmitStatus::Emitted | EmitStatus::Suppressed => 0,
            EmitStatus::NoFrontmostApp => 1,
        }
    }
}

pub fn snapshot(provider: &dyn FrontmostProvider, ts_ms: i64) -> Option<FocusRecord> {
    let app = provider.frontmost()?;
    Some(FocusRecord {
        ts_ms,
        app_name: app.name.unwrap_or_default(),
        bundle_id: app.bundle_id.unwrap_or_default(),
        pid: app.pid,
        window_title: app.window_title.unwrap_or_default(),
    })
}

/// Write one JSON line to `out`. Nothing is written when there is no
/// frontmost application or when encoding fails.
pub fn emit<W: Write>(provider: &dyn FrontmostProvider, ts_ms: i64, out: &mut W) -> EmitStatus {
    let Some(record) = snapshot(provider, ts_ms) else {
        return EmitStatus::NoFrontmostApp;
    };
    let Ok(json) = serde_json::to_string(&record) else {
        return EmitStatus::Suppressed;
    };
    match writeln!(out, "{json}").and_then(|_| out.flush()) {
        Ok(()) => EmitStatus::Emitted,
        Err(_) => EmitStatus::Suppressed,
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(target_os = "macos")]
mod macos {
    use core_foundation::base::{CFType, TCFType};
    use core_foundation::dictionary::CFDictionary;
    use core_foundation::number::CFNumber;
    use core_foundation::string::CFString;
    use core_graphics::window::{
        copy_window_info, kCGNullWindowID, kCGWindowListExcludeDesktopElements,
        kCGWindowListOptionOnScreenOnly,
    };
    use objc2_app_kit::NSWorkspace;

    use super::{FrontmostApp, FrontmostProvider};

    /// Frontmost application from `NSWorkspace`, window title from the
    /// first titled on-screen window owned by the same process.
    pub struct WorkspaceProvider;

    impl FrontmostProvider for WorkspaceProvider {
        fn frontmost(&self) -> Option<FrontmostApp> {
            #[allow(unused_unsafe)]
            let (name, bundle_id, pid) = unsafe {
                let workspace = NSWorkspace::sharedWorkspace();
                let app = workspace.frontmostApplication()?;
                (
                    app.localizedName().map(|s| s.to_string()),
                    app.bundleIdentifier().map(|s| s.to_string()),
                    app.processIdentifier(),
                )
            };
            Some(FrontmostApp {
                name,
                bundle_id,
                pid,
                window_title: window_title_for(pid),
            })
        }
    }

    fn window_title_for(pid: i32) -> Option<String> {
        let windows = copy_window_info(
            kCGWindowListOptionOnScreenOnly | kCGWindowListExcludeDesktopElements,
            kCGNullWindowID,
        )?;
        let owner_key = CFString::from_static_string("kCGWindowOwnerPID");
        let name_key = CFString::from_static_string("kCGWindowName");

        windows.iter().find_map(|item| {
            let info: CFDictionary<CFString, CFType> =
                unsafe { CFDictionary::wrap_under_get_rule(*item as _) };
            let owner = info.find(&owner_key)?.downcast::<CFNumber>()?.to_i32()?;
            if owner != pid {
                return None;
            }
            let title = info.find(&name_key)?.downcast::<CFString>()?.to_string();
            (!title.is_empty()).then_some(title)
        })
    }
}

/// Reports no frontmost application on platforms without a frontmost-app lookup.
pub struct UnsupportedProvider;

impl FrontmostProvider for UnsupportedProvider {
    fn frontmost(&self) -> Option<FrontmostApp> {
        None
    }
}

/// Provider for the current platform.
pub fn system_provider() -> Box<dyn FrontmostProvider> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::WorkspaceProvider)
    }
    #[cfg(not(target_os = "macos"))]
    {
        Box::new(UnsupportedProvider)
    }
}
