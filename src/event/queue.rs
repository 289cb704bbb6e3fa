//! Pending input, drained by the tick.

use std::collections::VecDeque;

use super::input::InputEvent;

// ---------------------------------------------------------------------------
// InputQueue
// ---------------------------------------------------------------------------

/// FIFO of input events waiting for the next tick.
///
/// Consecutive pointer moves collapse into the latest one, and a resize
/// replaces an earlier pending resize, so a slow frame does not replay
/// every intermediate position.
#[derive(Debug, Default)]
pub struct InputQueue {
    queue: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event.
    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { .. } => {
                if let Some(last @ InputEvent::PointerMove { .. }) = self.queue.back_mut() {
                    *last = event;
                    return;
                }
            }
            InputEvent::Resize { .. } => self.queue.retain(|e| !matches!(e, InputEvent::Resize { .. })),
            _ => {}
        }
        self.queue.push_back(event);
    }

    /// Next event in arrival order.
    pub fn pop(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
