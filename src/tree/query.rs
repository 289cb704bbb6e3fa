//! Tree queries: traversal, paint order, hit testing.

use std::ops::ControlFlow;

use super::arena::WidgetTree;
use super::node::{Widget, WidgetId};
use crate::css::values::{Display, Position, Visibility};
use crate::geometry::{Offset, Rect};

/// Lazy pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a WidgetTree,
    start: WidgetId,
    next: Option<WidgetId>,
}

impl Iterator for Descendants<'_> {
    type Item = WidgetId;

    fn next(&mut self) -> Option<WidgetId> {
        let current = self.next?;
        self.next = match self.tree.first_child(current) {
            Some(child) => Some(child),
            None => {
                let mut node = current;
                loop {
                    if node == self.start {
                        break None;
                    }
                    if let Some(sibling) = self.tree.next_sibling(node) {
                        break Some(sibling);
                    }
                    match self.tree.parent(node) {
                        Some(parent) => node = parent,
                        None => break None,
                    }
                }
            }
        };
        Some(current)
    }
}

impl WidgetTree {
    /// `id` and its descendants, depth-first pre-order. The walk follows
    /// the live links, so it is lazy and can stop early.
    pub fn descendants(&self, id: WidgetId) -> Descendants<'_> {
        Descendants { tree: self, start: id, next: self.nodes.contains_key(id).then_some(id) }
    }

    /// Call `f` on `id` and each descendant in pre-order until it breaks.
    pub fn each<B>(
        &self,
        id: WidgetId,
        mut f: impl FnMut(WidgetId, &Widget) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        for w in self.descendants(id) {
            if let Some(widget) = self.get(w) {
                f(w, widget)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Children of `id` in paint order: tree order, stable-sorted by
    /// `(z-index, positioned)`.
    pub fn paint_order(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut children: Vec<WidgetId> = self.children(id).collect();
        children.sort_by_key(|&c| {
            self.get(c)
                .and_then(|w| w.computed.as_ref())
                .map(|s| (s.z_index, s.position != Position::Static))
                .unwrap_or((0, false))
        });
        children
    }

    /// Pixel origin of `id` in root coordinates.
    pub fn absolute_origin(&self, id: WidgetId) -> Offset {
        let mut origin = Offset::default();
        let mut current = Some(id);
        while let Some(w) = current {
            if let Some(widget) = self.get(w) {
                origin = origin + widget.layout.pixel_rect().offset();
            }
            current = self.parent(w);
        }
        origin
    }

    /// Border box of `id` in root pixel coordinates.
    pub fn absolute_rect(&self, id: WidgetId) -> Rect {
        match self.get(id) {
            Some(w) => w.layout.pixel_rect().size().to_rect().translate(self.absolute_origin(id)),
            None => Rect::EMPTY,
        }
    }

    /// The top-most visible widget under the point (root pixel coordinates),
    /// searching from `root`.
    pub fn hit_test(&self, root: WidgetId, x: i32, y: i32) -> Option<WidgetId> {
        let parent_origin = match self.parent(root) {
            Some(p) => self.absolute_origin(p),
            None => Offset::default(),
        };
        self.hit_test_at(root, parent_origin, x, y)
    }

    fn hit_test_at(&self, id: WidgetId, parent_origin: Offset, x: i32, y: i32) -> Option<WidgetId> {
        let widget = self.live(id).ok()?;
        let style = widget.computed.as_deref();
        if style.is_some_and(|s| s.display == Display::None) {
            return None;
        }
        let rect = widget.layout.pixel_rect().translate(parent_origin);
        let origin = rect.offset();
        let clip = widget.local_padding_rect().translate(origin);
        if clip.contains(x, y) {
            for child in self.paint_order(id).into_iter().rev() {
                if let Some(hit) = self.hit_test_at(child, origin, x, y) {
                    return Some(hit);
                }
            }
        }
        let visible = style.is_none_or(|s| s.visibility == Visibility::Visible);
        (visible && rect.contains(x, y)).then_some(id)
    }
}
