use std::collections::HashMap;

use serde::Serialize;

use super::{Rect, WindowLabel};

/// Event name the content listens on for forwarded cursor moves.
pub const CURSOR_EVENT: &str = "cursor-forward";

/// Cursor position relative to the window's top-left corner, in logical
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorSample {
    pub x: f64,
    pub y: f64,
    pub inside: bool,
}

/// Turns polled screen cursor positions into per-window move events.
///
/// A click-through window gets an event for every move while the cursor is
/// over it, and exactly one `inside: false` event when it leaves.
#[derive(Debug, Default)]
pub struct CursorTracker {
    last: HashMap<WindowLabel, CursorSample>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// `cursor` and `frame` are in physical screen pixels; `scale` is the
    /// window's scale factor.
    pub fn sample(
        &mut self,
        label: WindowLabel,
        cursor: (f64, f64),
        frame: Rect,
        scale: f64,
    ) -> Option<CursorSample> {
        let (cx, cy) = cursor;
        let inside = cx >= frame.x
            && cy >= frame.y
            && cx < frame.x + frame.width
            && cy < frame.y + frame.height;
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let sample = CursorSample {
            x: (cx - frame.x) / scale,
            y: (cy - frame.y) / scale,
            inside,
        };

        let previous = self.last.insert(label, sample);
        match previous {
            Some(prev) if prev == sample => None,
            Some(prev) if !prev.inside && !inside => None,
            None if !inside => None,
            _ => Some(sample),
        }
    }

    /// Drop state for a window that stopped forwarding.
    pub fn forget(&mut self, label: WindowLabel) {
        self.last.remove(&label);
    }
}
