//! Dirty-rect tracking on the tree.

use super::arena::WidgetTree;
use super::node::WidgetId;
use crate::geometry::Rect;
use crate::task::TaskKind;

impl WidgetTree {
    /// Mark `rect` (widget-local pixels) of `id` as needing repaint.
    ///
    /// The rect is clipped to the widget's canvas box and recorded, then
    /// the stored rect (grown by any merge) is carried to the parent in
    /// the parent's coordinates, clipped to the parent's padding box. Propagation stops at the first widget whose
    /// region already covers the rect. Returns whether anything was
    /// recorded.
    pub fn invalidate(&mut self, id: WidgetId, rect: Rect) -> bool {
        let mut current = id;
        let mut rect = rect;
        let mut recorded = false;
        loop {
            let Ok(widget) = self.live(current) else { return recorded };
            rect = rect.intersection(widget.local_canvas_rect());
            if rect.is_empty() || widget.invalid.contains_rect(rect) {
                return recorded;
            }
            let origin = widget.layout.pixel_rect().offset();
            // A merge may have grown the stored rect; ancestors must cover
            // all of it, or a later rect inside it would stop here unseen.
            if let Some(stored) = self.get_mut(current).and_then(|w| w.invalid.insert(rect)) {
                rect = stored;
            }
            self.add_task(current, TaskKind::Refresh);
            recorded = true;

            let Some(parent) = self.parent(current) else { return recorded };
            let clip = match self.get(parent) {
                Some(p) => p.local_padding_rect(),
                None => return recorded,
            };
            rect = rect.translate(origin).intersection(clip);
            current = parent;
        }
    }

    /// Invalidate the whole canvas box of `id`.
    pub fn invalidate_all(&mut self, id: WidgetId) -> bool {
        match self.get(id) {
            Some(w) => {
                let rect = w.local_canvas_rect();
                self.invalidate(id, rect)
            }
            None => false,
        }
    }

    /// Drop pending invalid rects of a subtree leaving the tree.
    pub(crate) fn clear_invalid_subtree(&mut self, id: WidgetId) {
        for w in self.post_order(id) {
            if let Some(widget) = self.get_mut(w) {
                widget.invalid.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Edges, RectF};

    fn place(tree: &mut WidgetTree, id: WidgetId, rect: RectF) {
        if let Some(w) = tree.get_mut(id) {
            w.layout.border_box = rect;
        }
    }

    fn setup() -> (WidgetTree, WidgetId, WidgetId, WidgetId) {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        place(&mut tree, root, RectF::new(0.0, 0.0, 400.0, 300.0));
        let panel = tree.create("panel");
        let item = tree.create("item");
        assert!(tree.append(root, panel).is_ok());
        assert!(tree.append(panel, item).is_ok());
        place(&mut tree, panel, RectF::new(100.0, 50.0, 200.0, 100.0));
        place(&mut tree, item, RectF::new(10.0, 10.0, 50.0, 20.0));
        (tree, root, panel, item)
    }

    fn rects(tree: &WidgetTree, id: WidgetId) -> Vec<Rect> {
        tree.get(id).map(|w| w.invalid_region().rects().to_vec()).unwrap_or_default()
    }

    #[test]
    fn propagates_in_parent_coordinates() {
        let (mut tree, root, panel, item) = setup();
        assert!(tree.invalidate_all(item));
        assert_eq!(rects(&tree, item), vec![Rect::new(0, 0, 50, 20)]);
        assert_eq!(rects(&tree, panel), vec![Rect::new(10, 10, 50, 20)]);
        assert_eq!(rects(&tree, root), vec![Rect::new(110, 60, 50, 20)]);
    }

    #[test]
    fn clips_to_parent_padding_box() {
        let (mut tree, root, panel, item) = setup();
        if let Some(w) = tree.get_mut(panel) {
            w.layout.border = Edges::all(10.0);
        }
        place(&mut tree, item, RectF::new(-20.0, 0.0, 50.0, 20.0));
        assert!(tree.invalidate_all(item));
        assert_eq!(rects(&tree, panel), vec![Rect::new(10, 10, 20, 10)]);
        assert_eq!(rects(&tree, root), vec![Rect::new(110, 60, 20, 10)]);
    }

    #[test]
    fn stops_at_covering_ancestor() {
        let (mut tree, root, panel, item) = setup();
        assert!(tree.invalidate_all(panel));
        assert!(tree.invalidate_all(item));
        // The panel already covers the item's area, so the root keeps a
        // single rect.
        assert_eq!(rects(&tree, root), vec![Rect::new(100, 50, 200, 100)]);
        assert!(!tree.invalidate_all(item));
    }

    #[test]
    fn merged_child_rects_reach_the_root() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let panel = tree.create("panel");
        assert!(tree.append(root, panel).is_ok());
        place(&mut tree, root, RectF::new(0.0, 0.0, 100.0, 100.0));
        place(&mut tree, panel, RectF::new(0.0, 0.0, 100.0, 100.0));

        assert!(tree.invalidate(panel, Rect::new(5, 5, 5, 5)));
        assert!(tree.invalidate(root, Rect::new(10, 10, 10, 10)));
        assert!(tree.invalidate(panel, Rect::new(0, 0, 3, 3)));
        assert_eq!(rects(&tree, panel), vec![Rect::new(0, 0, 10, 10)]);

        // Inside the panel's merged rect, so nothing new is recorded.
        assert!(!tree.invalidate(panel, Rect::new(0, 4, 2, 1)));
        let root_region = tree.get(root).map(|w| w.invalid_region().clone()).unwrap_or_default();
        for r in rects(&tree, panel) {
            for y in r.y..r.bottom() {
                for x in r.x..r.right() {
                    assert!(root_region.contains_rect(Rect::new(x, y, 1, 1)), "({x}, {y}) missing from root");
                }
            }
        }
    }

    #[test]
    fn outside_rect_is_dropped() {
        let (mut tree, root, _, item) = setup();
        assert!(!tree.invalidate(item, Rect::new(500, 500, 10, 10)));
        assert!(rects(&tree, root).is_empty());
    }
}
