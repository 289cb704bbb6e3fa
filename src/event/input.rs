//! Normalized input events.
//!
//! Platform backends translate their native events into [`InputEvent`]s
//! before handing them to the core. Coordinates are pixels relative to the
//! top-left corner of the surface.

// ---------------------------------------------------------------------------
// InputEvent
// ---------------------------------------------------------------------------

/// A platform event, already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// The surface changed size.
    Resize { width: i32, height: i32 },
    PointerMove { x: i32, y: i32 },
    PointerDown { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },
    /// A touch point identified by `id` went down.
    TouchDown { id: u64, x: i32, y: i32 },
    TouchUp { id: u64 },
}

impl InputEvent {
    /// The point the event happened at, if it has one.
    pub fn position(&self) -> Option<(i32, i32)> {
        match *self {
            InputEvent::PointerMove { x, y }
            | InputEvent::PointerDown { x, y }
            | InputEvent::PointerUp { x, y }
            | InputEvent::TouchDown { x, y, .. } => Some((x, y)),
            InputEvent::Resize { .. } | InputEvent::TouchUp { .. } => None,
        }
    }
}
