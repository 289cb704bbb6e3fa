//! Pointer and touch state: hover and active chains, event target, touch
//! captures.
//!
//! Hovering or pressing a widget also applies to its ancestors, so the
//! state keeps the whole chain from the hit widget up to the root and
//! toggles the `hover` / `active` statuses on the difference between the
//! old and new chains. Status changes queue style updates through the tree
//! like any other mutation.

use std::collections::HashMap;

use tracing::trace;

use super::input::InputEvent;
use crate::tree::{WidgetId, WidgetTree};

pub const HOVER: &str = "hover";
pub const ACTIVE: &str = "active";

/// `id` and its ancestors, innermost first.
pub fn bubble_path(tree: &WidgetTree, id: WidgetId) -> Vec<WidgetId> {
    std::iter::once(id).chain(tree.ancestors(id)).collect()
}

fn set_status(tree: &mut WidgetTree, ids: &[WidgetId], status: &str, on: bool) {
    for &id in ids {
        if let Err(err) = tree.set_status(id, status, on) {
            trace!(widget = ?id, %err, status, "status not applied");
        }
    }
}

/// Move the `status` chain from `old` to `new`, touching only widgets
/// that enter or leave it.
fn swap_chain(tree: &mut WidgetTree, old: &[WidgetId], new: &[WidgetId], status: &str) {
    let leaving: Vec<WidgetId> = old.iter().copied().filter(|w| !new.contains(w)).collect();
    let entering: Vec<WidgetId> = new.iter().copied().filter(|w| !old.contains(w)).collect();
    set_status(tree, &leaving, status, false);
    set_status(tree, &entering, status, true);
}

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

/// Which widgets the pointer and touch points are currently on.
#[derive(Debug, Default)]
pub struct InputState {
    event_target: Option<WidgetId>,
    hover: Vec<WidgetId>,
    active: Vec<WidgetId>,
    touch_captures: HashMap<u64, WidgetId>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The widget the last press or release landed on.
    pub fn event_target(&self) -> Option<WidgetId> {
        self.event_target
    }

    /// The hovered widget and its ancestors, innermost first.
    pub fn hover_chain(&self) -> &[WidgetId] {
        &self.hover
    }

    pub fn active_chain(&self) -> &[WidgetId] {
        &self.active
    }

    /// The widget holding touch point `id`.
    pub fn touch_capture(&self, id: u64) -> Option<WidgetId> {
        self.touch_captures.get(&id).copied()
    }

    /// Apply a pointer or touch event. Resize events are not handled here
    /// and are ignored.
    pub fn handle(&mut self, tree: &mut WidgetTree, event: InputEvent) {
        let root = tree.root();
        match event {
            InputEvent::Resize { .. } => {}
            InputEvent::PointerMove { x, y } => {
                let chain = tree.hit_test(root, x, y).map(|hit| bubble_path(tree, hit)).unwrap_or_default();
                swap_chain(tree, &self.hover, &chain, HOVER);
                self.hover = chain;
            }
            InputEvent::PointerDown { x, y } => {
                self.event_target = tree.hit_test(root, x, y);
                let chain = self.event_target.map(|hit| bubble_path(tree, hit)).unwrap_or_default();
                swap_chain(tree, &self.active, &chain, ACTIVE);
                self.active = chain;
            }
            InputEvent::PointerUp { x, y } => {
                self.event_target = tree.hit_test(root, x, y);
                let released = std::mem::take(&mut self.active);
                set_status(tree, &released, ACTIVE, false);
            }
            InputEvent::TouchDown { id, x, y } => {
                let Some(hit) = tree.hit_test(root, x, y) else { return };
                self.event_target = Some(hit);
                self.touch_captures.insert(id, hit);
                let chain = bubble_path(tree, hit);
                set_status(tree, &chain, ACTIVE, true);
            }
            InputEvent::TouchUp { id } => {
                let Some(captured) = self.touch_captures.remove(&id) else { return };
                // Other touches may still hold part of the chain.
                let held: Vec<WidgetId> = self
                    .touch_captures
                    .values()
                    .flat_map(|&w| bubble_path(tree, w))
                    .chain(self.active.iter().copied())
                    .collect();
                let released: Vec<WidgetId> =
                    bubble_path(tree, captured).into_iter().filter(|w| !held.contains(w)).collect();
                set_status(tree, &released, ACTIVE, false);
            }
        }
    }

    /// Drop every reference to `id`. Called before a widget is destroyed.
    pub fn forget(&mut self, id: WidgetId) {
        if self.event_target == Some(id) {
            self.event_target = None;
        }
        self.hover.retain(|&w| w != id);
        self.active.retain(|&w| w != id);
        self.touch_captures.retain(|_, w| *w != id);
    }
}
