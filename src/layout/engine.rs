//! Measure/arrange driver over the widget tree.
//!
//! [`reflow`] lays the tree out from the root with the viewport as the
//! initial containing block. Block and flex containers delegate to
//! [`super::block`] and [`super::flex`]; absolutely positioned children are
//! placed here once their parent's size is known. Every widget whose pixel
//! box changes gets its old and new canvas boxes invalidated.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, trace};

use super::resolve::{sane, ResolvedBox};
use super::{block, flex, LayoutInput, WidthMode};
use crate::css::computed::ComputedStyle;
use crate::css::values::{Display, FlexDirection, Position};
use crate::font::FontBackend;
use crate::geometry::{Edges, RectF, SizeF};
use crate::tree::{LayoutBox, WidgetId, WidgetTree};
use crate::task::TaskSet;
use crate::widget::KindRegistry;

/// Outcome of one layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutReport {
    /// Widgets whose box was recomputed.
    pub reflowed: usize,
    /// Widgets whose pixel box moved or resized.
    pub moved: usize,
}

/// Lay out every part of the tree with a pending reflow.
pub fn reflow(tree: &mut WidgetTree, kinds: &KindRegistry, fonts: &dyn FontBackend, viewport: SizeF) -> LayoutReport {
    let mut engine = LayoutEngine::new(tree, kinds, fonts, viewport);
    if engine.needs_layout.is_empty() {
        return LayoutReport::default();
    }
    engine.layout_root();
    engine.finish()
}

/// Widgets with a pending reflow and all their ancestors.
fn reflow_paths(tree: &WidgetTree) -> HashSet<WidgetId> {
    let mut paths = HashSet::new();
    let mut stack = vec![tree.root()];
    while let Some(id) = stack.pop() {
        let Some(widget) = tree.get(id) else { continue };
        if !widget.is_subtree_dirty() {
            continue;
        }
        if widget.tasks().contains(TaskSet::REFLOW) {
            paths.insert(id);
            paths.extend(tree.ancestors(id));
        }
        stack.extend(tree.children(id));
    }
    paths
}

/// State of one layout pass.
pub struct LayoutEngine<'a> {
    tree: &'a mut WidgetTree,
    kinds: &'a KindRegistry,
    fonts: &'a dyn FontBackend,
    viewport: SizeF,
    initial: Arc<ComputedStyle>,
    /// Widgets that must be laid out again even with unchanged constraints.
    needs_layout: HashSet<WidgetId>,
    /// Boxes as they were before this pass, in first-touched order.
    old_boxes: Vec<(WidgetId, LayoutBox)>,
    touched: HashSet<WidgetId>,
    reflowed: usize,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(tree: &'a mut WidgetTree, kinds: &'a KindRegistry, fonts: &'a dyn FontBackend, viewport: SizeF) -> Self {
        let needs_layout = reflow_paths(tree);
        Self {
            tree,
            kinds,
            fonts,
            viewport,
            initial: Arc::new(ComputedStyle::initial()),
            needs_layout,
            old_boxes: Vec::new(),
            touched: HashSet::new(),
            reflowed: 0,
        }
    }

    pub fn viewport(&self) -> SizeF {
        self.viewport
    }

    /// The root fills the viewport.
    pub fn layout_root(&mut self) {
        let root = self.tree.root();
        let SizeF { width, height } = self.viewport;
        let input = LayoutInput::fill(width, Some(height)).with_width(width).with_height(Some(height));
        self.layout_widget(root, input);
        self.set_position(root, 0.0, 0.0);
    }

    /// Invalidate moved boxes and report.
    pub fn finish(self) -> LayoutReport {
        let mut moved = 0;
        for (id, old) in self.old_boxes {
            let Some(widget) = self.tree.get(id) else { continue };
            if widget.layout().pixel_rect() == old.pixel_rect() {
                continue;
            }
            moved += 1;
            let old_area = widget.canvas_rect_with(&old);
            if let Some(parent) = self.tree.parent(id) {
                self.tree.invalidate(parent, old_area);
            }
            self.tree.invalidate_all(id);
        }
        debug!(reflowed = self.reflowed, moved, "layout pass");
        LayoutReport { reflowed: self.reflowed, moved }
    }

    pub(crate) fn style_of(&self, id: WidgetId) -> Arc<ComputedStyle> {
        self.tree
            .get(id)
            .and_then(|w| w.computed_style().cloned())
            .unwrap_or_else(|| Arc::clone(&self.initial))
    }

    /// Live children of `id` that take part in its flow.
    pub(crate) fn in_flow_children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.children_where(id, |s| s.is_in_flow())
    }

    fn absolute_children(&self, id: WidgetId) -> Vec<WidgetId> {
        self.children_where(id, |s| s.display != Display::None && s.position == Position::Absolute)
    }

    fn children_where(&self, id: WidgetId, keep: impl Fn(&ComputedStyle) -> bool) -> Vec<WidgetId> {
        self.tree
            .children(id)
            .filter(|&c| {
                self.tree
                    .get(c)
                    .is_some_and(|w| !w.is_destroyed() && keep(w.computed_style().map_or(&*self.initial, |s| &**s)))
            })
            .collect()
    }

    /// Whether `child` is still attached to `parent`. A kind hook may have
    /// restructured the tree since the child list was taken.
    pub(crate) fn still_child(&self, parent: WidgetId, child: WidgetId) -> bool {
        self.tree.parent(child) == Some(parent) && self.tree.live(child).is_ok()
    }

    /// Margins of `child` against a containing block `cb_width` wide.
    /// `None` marks `auto`.
    pub(crate) fn margins(&self, child: WidgetId, cb_width: f32) -> Edges<Option<f32>> {
        let style = self.style_of(child);
        style.margin.map(|l| l.resolve(Some(cb_width), self.viewport).filter(|v| v.is_finite()))
    }

    fn touch(&mut self, id: WidgetId) {
        if self.touched.insert(id) {
            if let Some(w) = self.tree.get(id) {
                self.old_boxes.push((id, *w.layout()));
            }
        }
    }

    /// Move the border box of `id` (parent border-box coordinates).
    pub(crate) fn set_position(&mut self, id: WidgetId, x: f32, y: f32) {
        self.touch(id);
        if let Some(w) = self.tree.get_mut(id) {
            w.layout.border_box.x = if x.is_finite() { x } else { 0.0 };
            w.layout.border_box.y = if y.is_finite() { y } else { 0.0 };
        }
    }

    /// Place an in-flow child at its static position, shifted by its
    /// relative offsets. `cb` is the parent's content size.
    pub(crate) fn place_in_flow(&mut self, child: WidgetId, x: f32, y: f32, cb_width: f32, cb_height: Option<f32>) {
        let style = self.style_of(child);
        let (mut dx, mut dy) = (0.0, 0.0);
        if style.position == Position::Relative {
            let inset = &style.inset;
            let horizontal = |l: crate::css::values::Length| l.resolve(Some(cb_width), self.viewport);
            let vertical = |l: crate::css::values::Length| l.resolve(cb_height, self.viewport);
            dx = horizontal(inset.left).or_else(|| horizontal(inset.right).map(|r| -r)).unwrap_or(0.0);
            dy = vertical(inset.top).or_else(|| vertical(inset.bottom).map(|b| -b)).unwrap_or(0.0);
        }
        self.set_position(child, x + dx, y + dy);
    }

    /// Lay out `id` with `input` and return its border-box size. The
    /// position is left to the caller.
    pub fn layout_widget(&mut self, id: WidgetId, input: LayoutInput) -> SizeF {
        let Ok(widget) = self.tree.live(id) else { return SizeF::ZERO };
        if widget.layout_input == Some(input) && !self.needs_layout.contains(&id) {
            return widget.layout().border_box.size();
        }
        self.touch(id);
        self.reflowed += 1;

        let style = self.style_of(id);
        let rb = ResolvedBox::resolve(&style, Some(input.cb_width), input.cb_height, self.viewport);
        let frame_w = rb.frame_width();
        let frame_h = rb.frame_height();
        let margin = rb.used_margin();

        let content_width = match (input.width, rb.width) {
            (WidthMode::Forced(w), _) => sane(w - frame_w),
            (_, Some(w)) => rb.clamp_width(w),
            (WidthMode::Fill, None) => rb.clamp_width(input.cb_width - margin.horizontal() - frame_w),
            (WidthMode::ShrinkToFit, None) => {
                let available = input.cb_width - margin.horizontal() - frame_w;
                let preferred = self.max_content(id).width - frame_w;
                rb.clamp_width(preferred.min(available))
            }
        };
        let fixed_height = match input.forced_height {
            Some(h) => Some(sane(h - frame_h)),
            None => rb.height.map(|h| rb.clamp_height(h)),
        };

        let content_height = self.arrange(id, &style, &rb, content_width, fixed_height);
        let height = fixed_height.unwrap_or_else(|| rb.clamp_height(content_height));
        let size = SizeF::new(content_width + frame_w, height + frame_h);

        if let Some(w) = self.tree.get_mut(id) {
            w.layout.border_box.width = size.width;
            w.layout.border_box.height = size.height;
            w.layout.margin = margin;
            w.layout.border = rb.border;
            w.layout.padding = rb.padding;
            w.layout_input = Some(input);
        }
        self.place_absolute(id, &rb, size);
        trace!(widget = ?id, width = size.width, height = size.height, "laid out");
        size
    }

    /// Arrange the children of `id` in its content box and return the
    /// content height they need.
    fn arrange(&mut self, id: WidgetId, style: &ComputedStyle, rb: &ResolvedBox, width: f32, height: Option<f32>) -> f32 {
        let measured = match (self.tree.get(id), self.kinds.get(self.type_name(id).as_str())) {
            (Some(widget), Some(kind)) => kind.measure(widget, style, self.fonts, Some(width)),
            _ => None,
        };
        let flow = match style.display {
            Display::Flex => flex::arrange(self, id, style, rb, width, height),
            _ => block::arrange(self, id, style, rb, width, height),
        };
        measured.map_or(flow, |m| flow.max(sane(m.height)))
    }

    fn type_name(&self, id: WidgetId) -> String {
        self.tree.get(id).map(|w| w.type_name().to_string()).unwrap_or_default()
    }

    /// Place absolutely positioned children against the padding box.
    fn place_absolute(&mut self, id: WidgetId, rb: &ResolvedBox, size: SizeF) {
        let children = self.absolute_children(id);
        if children.is_empty() {
            return;
        }
        let pad = RectF::new(0.0, 0.0, size.width, size.height).deflate(rb.border);
        let content_x = rb.border.left + rb.padding.left;
        let content_y = rb.border.top + rb.padding.top;
        for child in children {
            if !self.still_child(id, child) {
                continue;
            }
            let style = self.style_of(child);
            let crb = ResolvedBox::resolve(&style, Some(pad.width), Some(pad.height), self.viewport);
            let m = crb.used_margin();
            let left = style.inset.left.resolve(Some(pad.width), self.viewport);
            let right = style.inset.right.resolve(Some(pad.width), self.viewport);
            let top = style.inset.top.resolve(Some(pad.height), self.viewport);
            let bottom = style.inset.bottom.resolve(Some(pad.height), self.viewport);

            let width = match (left, right, crb.width) {
                (Some(l), Some(r), None) => WidthMode::Forced(sane(pad.width - l - r - m.horizontal())),
                _ => WidthMode::ShrinkToFit,
            };
            let forced_height = match (top, bottom, crb.height) {
                (Some(t), Some(b), None) => Some(sane(pad.height - t - b - m.vertical())),
                _ => None,
            };
            let input = LayoutInput { cb_width: pad.width, cb_height: Some(pad.height), width, forced_height };
            let child_size = self.layout_widget(child, input);

            let x = match (left, right) {
                (Some(l), _) => pad.x + l + m.left,
                (None, Some(r)) => pad.right() - r - m.right - child_size.width,
                (None, None) => content_x + m.left,
            };
            let y = match (top, bottom) {
                (Some(t), _) => pad.y + t + m.top,
                (None, Some(b)) => pad.bottom() - b - m.bottom - child_size.height,
                (None, None) => content_y + m.top,
            };
            self.set_position(child, x, y);
        }
    }

    /// Max-content border-box size of `id`, cached until the next reflow of
    /// the widget or a descendant.
    pub(crate) fn max_content(&mut self, id: WidgetId) -> SizeF {
        if let Some(size) = self.tree.get(id).and_then(|w| w.intrinsic) {
            return size;
        }
        let style = self.style_of(id);
        let rb = ResolvedBox::resolve(&style, None, None, self.viewport);
        let measured = match (self.tree.get(id), self.kinds.get(self.type_name(id).as_str())) {
            (Some(widget), Some(kind)) => kind.measure(widget, &style, self.fonts, None),
            _ => None,
        };
        let fallback_height = rb.frame_height() + measured.map_or(0.0, |m| sane(m.height));

        let size = match rb.border_box_width() {
            Some(width) => SizeF::new(width, rb.border_box_height().unwrap_or(fallback_height)),
            None => {
                let mut content = 0.0f32;
                let mut run = 0.0f32;
                let row = style.display == Display::Flex && style.flex_direction == FlexDirection::Row;
                for child in self.in_flow_children(id) {
                    let child_style = self.style_of(child);
                    let margin = child_style.margin.map(|l| l.resolve(None, self.viewport).unwrap_or(0.0));
                    let outer = self.max_content(child).width + margin.horizontal();
                    if row || (style.display != Display::Flex && child_style.display == Display::InlineBlock) {
                        run += outer;
                    } else {
                        content = content.max(run).max(outer);
                        run = 0.0;
                    }
                }
                content = content.max(run).max(measured.map_or(0.0, |m| sane(m.width)));
                SizeF::new(rb.clamp_width(content) + rb.frame_width(), rb.border_box_height().unwrap_or(fallback_height))
            }
        };
        if let Some(w) = self.tree.get_mut(id) {
            w.intrinsic = Some(size);
        }
        size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::values::{BoxSizing, Length};
    use crate::geometry::Rect;
    use crate::task::TaskKind;

    const VIEWPORT: SizeF = SizeF::new(400.0, 300.0);

    fn restyle(tree: &mut WidgetTree, id: WidgetId, f: impl FnOnce(&mut ComputedStyle)) {
        let mut style = tree
            .get(id)
            .and_then(|w| w.computed_style().map(|s| (**s).clone()))
            .unwrap_or_else(ComputedStyle::initial);
        f(&mut style);
        if let Some(w) = tree.get_mut(id) {
            w.computed = Some(Arc::new(style));
        }
        tree.add_task(id, TaskKind::Reflow);
    }

    fn child(tree: &mut WidgetTree, parent: WidgetId, f: impl FnOnce(&mut ComputedStyle)) -> WidgetId {
        let id = tree.create("box");
        assert!(tree.append(parent, id).is_ok());
        restyle(tree, id, f);
        id
    }

    fn run(tree: &mut WidgetTree) -> LayoutReport {
        let report = reflow(tree, &KindRegistry::new(), &crate::font::NullFont, VIEWPORT);
        clear(tree);
        report
    }

    fn clear(tree: &mut WidgetTree) {
        let all: Vec<WidgetId> = tree.descendants(tree.root()).collect();
        for id in all {
            if let Some(w) = tree.get_mut(id) {
                w.tasks = TaskSet::empty();
                w.subtree_dirty = false;
                w.invalid.clear();
            }
        }
    }

    fn rect(tree: &WidgetTree, id: WidgetId) -> RectF {
        tree.get(id).map(|w| w.layout().border_box).unwrap_or_default()
    }

    // ── Root ─────────────────────────────────────────────────────────

    #[test]
    fn root_fills_viewport() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        restyle(&mut tree, root, |_| {});
        run(&mut tree);
        assert_eq!(rect(&tree, root), RectF::new(0.0, 0.0, 400.0, 300.0));
    }

    // ── Box model ────────────────────────────────────────────────────

    #[test]
    fn border_box_sizing_content_width() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let w = child(&mut tree, root, |s| {
            s.box_sizing = BoxSizing::BorderBox;
            s.width = Length::Px(100.0);
            s.border = s.border.map(|mut b| {
                b.width = 5.0;
                b
            });
        });
        run(&mut tree);
        assert_eq!(rect(&tree, w).width, 100.0);
        let content = tree.get(w).map(|w| w.layout().content_box()).unwrap_or_default();
        assert_eq!(content.width, 90.0);
    }

    // ── Absolute ─────────────────────────────────────────────────────

    #[test]
    fn absolute_child_uses_insets() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let panel = child(&mut tree, root, |s| {
            s.width = Length::Px(200.0);
            s.height = Length::Px(100.0);
        });
        let abs = child(&mut tree, panel, |s| {
            s.position = Position::Absolute;
            s.inset.right = Length::Px(10.0);
            s.inset.bottom = Length::Px(5.0);
            s.width = Length::Px(20.0);
            s.height = Length::Px(20.0);
        });
        let stretched = child(&mut tree, panel, |s| {
            s.position = Position::Absolute;
            s.inset = Edges::all(Length::Px(10.0));
        });
        run(&mut tree);
        assert_eq!(rect(&tree, abs), RectF::new(170.0, 75.0, 20.0, 20.0));
        assert_eq!(rect(&tree, stretched), RectF::new(10.0, 10.0, 180.0, 80.0));
        // Absolute children do not take space in the flow.
        assert_eq!(rect(&tree, panel).height, 100.0);
    }

    #[test]
    fn relative_offsets_shift_without_affecting_siblings() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let a = child(&mut tree, root, |s| {
            s.height = Length::Px(10.0);
            s.position = Position::Relative;
            s.inset.left = Length::Px(5.0);
            s.inset.top = Length::Px(3.0);
        });
        let b = child(&mut tree, root, |s| s.height = Length::Px(10.0));
        run(&mut tree);
        assert_eq!(rect(&tree, a), RectF::new(5.0, 3.0, 400.0, 10.0));
        assert_eq!(rect(&tree, b).y, 10.0);
    }

    // ── Incremental ──────────────────────────────────────────────────

    #[test]
    fn clean_siblings_are_not_relaid() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let a = child(&mut tree, root, |s| s.height = Length::Px(10.0));
        let b = child(&mut tree, root, |s| s.height = Length::Px(10.0));
        let c = child(&mut tree, b, |s| s.height = Length::Px(10.0));
        run(&mut tree);

        restyle(&mut tree, a, |s| s.height = Length::Px(30.0));
        let report = run(&mut tree);
        // Root and `a` are recomputed; `b` is only moved.
        assert_eq!(report.reflowed, 2);
        assert_eq!(rect(&tree, b).y, 30.0);
        assert_eq!(rect(&tree, c).y, 0.0);
    }

    #[test]
    fn moved_widgets_invalidate_old_and_new_area() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let a = child(&mut tree, root, |s| s.height = Length::Px(10.0));
        let b = child(&mut tree, root, |s| s.height = Length::Px(10.0));
        run(&mut tree);

        restyle(&mut tree, a, |s| s.height = Length::Px(20.0));
        let report = reflow(&mut tree, &KindRegistry::new(), &crate::font::NullFont, VIEWPORT);
        assert_eq!(report.moved, 2);
        let region = tree.get(root).map(|w| w.invalid_region().bounds()).unwrap_or_default();
        assert!(region.contains_rect(Rect::new(0, 0, 400, 30)), "{region:?}");
        assert!(tree.get(b).is_some_and(|w| !w.invalid_region().is_empty()));
    }

    #[test]
    fn clean_tree_is_a_no_op() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        child(&mut tree, root, |_| {});
        run(&mut tree);
        assert_eq!(run(&mut tree), LayoutReport::default());
    }

    // ── Intrinsic ────────────────────────────────────────────────────

    #[test]
    fn max_content_sums_inline_blocks() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let holder = child(&mut tree, root, |s| s.display = Display::InlineBlock);
        for w in [30.0, 40.0] {
            child(&mut tree, holder, |s| {
                s.display = Display::InlineBlock;
                s.width = Length::Px(w);
                s.height = Length::Px(5.0);
            });
        }
        child(&mut tree, holder, |s| s.width = Length::Px(50.0));
        run(&mut tree);
        assert_eq!(rect(&tree, holder).width, 70.0);
    }
}
