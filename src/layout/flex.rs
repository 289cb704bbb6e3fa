//! Flex flow along one main axis.
//!
//! Items get a hypothetical main size from `flex-basis` (or their size, or
//! their content), are broken into lines when wrapping, and the free space
//! of each line is shared out in one pass by `flex-grow`, or taken back by
//! `flex-shrink` weighted by the base size. Lines are then distributed per
//! `justify-content` and items aligned per `align-items`.

use std::ops::Range;

use super::engine::LayoutEngine;
use super::resolve::{sane, ResolvedBox};
use super::{LayoutInput, WidthMode};
use crate::css::computed::ComputedStyle;
use crate::css::values::{AlignItems, BoxSizing, FlexDirection, FlexWrap, JustifyContent};
use crate::geometry::Edges;
use crate::tree::WidgetId;

#[derive(Debug)]
struct Item {
    id: WidgetId,
    rb: ResolvedBox,
    margin: Edges<f32>,
    grow: f32,
    shrink: f32,
    /// Hypothetical border-box main size.
    base: f32,
    min_main: f32,
    max_main: Option<f32>,
    /// Final border-box sizes.
    main: f32,
    cross: f32,
}

impl Item {
    fn clamp_main(&self, value: f32) -> f32 {
        let capped = self.max_main.map_or(value, |max| value.min(max));
        sane(capped.max(self.min_main))
    }
}

/// Where the first item starts and the extra gap between items.
pub fn justify(mode: JustifyContent, free: f32, count: usize) -> (f32, f32) {
    let n = count as f32;
    match mode {
        JustifyContent::FlexStart => (0.0, 0.0),
        JustifyContent::FlexEnd => (free, 0.0),
        JustifyContent::Center => (free / 2.0, 0.0),
        JustifyContent::SpaceBetween if free > 0.0 && count > 1 => (0.0, free / (n - 1.0)),
        JustifyContent::SpaceBetween => (0.0, 0.0),
        JustifyContent::SpaceAround if free > 0.0 && count > 0 => (free / n / 2.0, free / n),
        JustifyContent::SpaceEvenly if free > 0.0 => (free / (n + 1.0), free / (n + 1.0)),
        JustifyContent::SpaceAround | JustifyContent::SpaceEvenly => (free / 2.0, 0.0),
    }
}

/// Arrange the in-flow children of the flex container `id` and return the
/// content height they use.
pub(crate) fn arrange(
    engine: &mut LayoutEngine<'_>,
    id: WidgetId,
    style: &ComputedStyle,
    rb: &ResolvedBox,
    width: f32,
    height: Option<f32>,
) -> f32 {
    let row = style.flex_direction == FlexDirection::Row;
    let origin_x = rb.border.left + rb.padding.left;
    let origin_y = rb.border.top + rb.padding.top;
    let main_space = if row { Some(width) } else { height };
    let cross_space = if row { height } else { Some(width) };
    let stretch = style.align_items == AlignItems::Stretch;
    let viewport = engine.viewport();

    // Hypothetical main sizes.
    let mut items = Vec::new();
    for child in engine.in_flow_children(id) {
        if !engine.still_child(id, child) {
            continue;
        }
        let cs = engine.style_of(child);
        let crb = ResolvedBox::resolve(&cs, Some(width), height, viewport);
        let margin = crb.used_margin();
        let frame_main = if row { crb.frame_width() } else { crb.frame_height() };
        let basis = cs
            .flex_basis
            .resolve(main_space, viewport)
            .map(|b| match cs.box_sizing {
                BoxSizing::ContentBox => sane(b) + frame_main,
                BoxSizing::BorderBox => sane(b).max(frame_main),
            })
            .or_else(|| if row { crb.border_box_width() } else { crb.border_box_height() });
        let base = match basis {
            Some(b) => b,
            None if row => engine.layout_widget(child, LayoutInput::shrink_to_fit(width, height)).width,
            None => {
                let input = LayoutInput { width: cross_width(width, &crb, margin, stretch), ..LayoutInput::fill(width, height) };
                engine.layout_widget(child, input).height
            }
        };
        let (min_main, max_main) = if row {
            (crb.min_width + frame_main, crb.max_width.map(|m| m + frame_main))
        } else {
            (crb.min_height + frame_main, crb.max_height.map(|m| m + frame_main))
        };
        items.push(Item {
            id: child,
            rb: crb,
            margin,
            grow: cs.flex_grow.max(0.0),
            shrink: cs.flex_shrink.max(0.0),
            base,
            min_main,
            max_main,
            main: 0.0,
            cross: 0.0,
        });
    }
    if items.is_empty() {
        return 0.0;
    }
    let margin_main = |m: &Edges<f32>| if row { m.horizontal() } else { m.vertical() };
    let margin_cross = |m: &Edges<f32>| if row { m.vertical() } else { m.horizontal() };

    // Lines.
    let mut lines: Vec<Range<usize>> = Vec::new();
    match main_space {
        Some(space) if style.flex_wrap == FlexWrap::Wrap => {
            let mut start = 0;
            let mut used = 0.0;
            for (i, item) in items.iter().enumerate() {
                let outer = item.clamp_main(item.base) + margin_main(&item.margin);
                if i > start && used + outer > space {
                    lines.push(start..i);
                    start = i;
                    used = 0.0;
                }
                used += outer;
            }
            lines.push(start..items.len());
        }
        _ => lines.push(0..items.len()),
    }
    let single_line = lines.len() == 1 && style.flex_wrap == FlexWrap::NoWrap;

    let mut cross_cursor = 0.0f32;
    let mut main_extent = 0.0f32;
    for line in lines {
        let line_items = &mut items[line];

        // Flexible lengths.
        let outer_sum: f32 = line_items.iter().map(|i| i.base + margin_main(&i.margin)).sum();
        let free = main_space.map_or(0.0, |space| space - outer_sum);
        let total_grow: f32 = line_items.iter().map(|i| i.grow).sum();
        let total_shrink: f32 = line_items.iter().map(|i| i.shrink * i.base).sum();
        for item in line_items.iter_mut() {
            let target = if free > 0.0 && total_grow > 0.0 {
                item.base + free * item.grow / total_grow
            } else if free < 0.0 && total_shrink > 0.0 {
                item.base + free * item.shrink * item.base / total_shrink
            } else {
                item.base
            };
            item.main = item.clamp_main(target);
        }

        // Final sizes.
        for item in line_items.iter_mut() {
            let size = if row {
                engine.layout_widget(item.id, LayoutInput::fill(width, height).with_width(item.main))
            } else {
                let input = LayoutInput {
                    width: cross_width(width, &item.rb, item.margin, stretch),
                    ..LayoutInput::fill(width, height).with_height(Some(item.main))
                };
                engine.layout_widget(item.id, input)
            };
            item.cross = if row { size.height } else { size.width };
        }
        let mut line_cross = line_items
            .iter()
            .map(|i| i.cross + margin_cross(&i.margin))
            .fold(0.0f32, f32::max);
        if let (true, Some(space)) = (single_line, cross_space) {
            line_cross = space;
        }

        // Stretch rows to the line height.
        if row && stretch {
            for item in line_items.iter_mut().filter(|i| i.rb.height.is_none()) {
                let target = sane(line_cross - margin_cross(&item.margin));
                if (target - item.cross).abs() > f32::EPSILON {
                    let input = LayoutInput::fill(width, height).with_width(item.main).with_height(Some(target));
                    item.cross = engine.layout_widget(item.id, input).height;
                }
            }
        }

        // Placement.
        let used: f32 = line_items.iter().map(|i| i.main + margin_main(&i.margin)).sum();
        let free = main_space.map_or(0.0, |space| space - used);
        let (start, gap) = justify(style.justify_content, free, line_items.len());
        let mut main_cursor = start;
        for item in line_items.iter() {
            let outer_cross = item.cross + margin_cross(&item.margin);
            let offset = match style.align_items {
                AlignItems::FlexStart | AlignItems::Stretch => 0.0,
                AlignItems::FlexEnd => line_cross - outer_cross,
                AlignItems::Center => (line_cross - outer_cross) / 2.0,
            };
            let (x, y) = if row {
                (main_cursor + item.margin.left, cross_cursor + offset + item.margin.top)
            } else {
                (cross_cursor + offset + item.margin.left, main_cursor + item.margin.top)
            };
            engine.place_in_flow(item.id, origin_x + x, origin_y + y, width, height);
            main_cursor += item.main + margin_main(&item.margin) + gap;
        }
        main_extent = main_extent.max(used);
        cross_cursor += line_cross;
    }

    if row {
        cross_cursor
    } else {
        main_extent
    }
}

/// Width mode of an item in a column container.
fn cross_width(container: f32, rb: &ResolvedBox, margin: Edges<f32>, stretch: bool) -> WidthMode {
    if rb.width.is_none() && stretch {
        WidthMode::Forced(sane(container - margin.horizontal()))
    } else {
        WidthMode::ShrinkToFit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::values::{Display, Length};
    use crate::font::NullFont;
    use crate::geometry::{RectF, SizeF};
    use crate::layout::reflow;
    use crate::tree::WidgetTree;
    use crate::widget::KindRegistry;
    use std::sync::Arc;

    fn child(tree: &mut WidgetTree, parent: WidgetId, f: impl FnOnce(&mut ComputedStyle)) -> WidgetId {
        let id = tree.create("box");
        assert!(tree.append(parent, id).is_ok());
        let mut style = ComputedStyle::initial();
        f(&mut style);
        if let Some(w) = tree.get_mut(id) {
            w.computed = Some(Arc::new(style));
        }
        id
    }

    fn container(tree: &mut WidgetTree, f: impl FnOnce(&mut ComputedStyle)) -> WidgetId {
        let root = tree.root();
        child(tree, root, |s| {
            s.display = Display::Flex;
            s.width = Length::Px(300.0);
            s.height = Length::Px(100.0);
            f(s);
        })
    }

    fn sized(tree: &mut WidgetTree, parent: WidgetId, w: f32, h: f32) -> WidgetId {
        child(tree, parent, |s| {
            s.width = Length::Px(w);
            s.height = Length::Px(h);
        })
    }

    fn layout(tree: &mut WidgetTree) {
        reflow(tree, &KindRegistry::new(), &NullFont, SizeF::new(400.0, 300.0));
    }

    fn rect(tree: &WidgetTree, id: WidgetId) -> RectF {
        tree.get(id).map(|w| w.layout().border_box).unwrap_or_default()
    }

    // ── Justify ──────────────────────────────────────────────────────

    #[test]
    fn justify_modes() {
        assert_eq!(justify(JustifyContent::FlexStart, 60.0, 3), (0.0, 0.0));
        assert_eq!(justify(JustifyContent::FlexEnd, 60.0, 3), (60.0, 0.0));
        assert_eq!(justify(JustifyContent::Center, 60.0, 3), (30.0, 0.0));
        assert_eq!(justify(JustifyContent::SpaceBetween, 60.0, 3), (0.0, 30.0));
        assert_eq!(justify(JustifyContent::SpaceAround, 60.0, 3), (10.0, 20.0));
        assert_eq!(justify(JustifyContent::SpaceEvenly, 60.0, 3), (15.0, 15.0));
        assert_eq!(justify(JustifyContent::SpaceBetween, -10.0, 3), (0.0, 0.0));
    }

    #[test]
    fn row_items_are_placed_with_space_between() {
        let mut tree = WidgetTree::new("root");
        let flex = container(&mut tree, |s| s.justify_content = JustifyContent::SpaceBetween);
        let a = sized(&mut tree, flex, 50.0, 20.0);
        let b = sized(&mut tree, flex, 50.0, 20.0);
        layout(&mut tree);
        assert_eq!(rect(&tree, a).x, 0.0);
        assert_eq!(rect(&tree, b).x, 250.0);
    }

    // ── Grow / shrink ────────────────────────────────────────────────

    #[test]
    fn grow_shares_free_space() {
        let mut tree = WidgetTree::new("root");
        let flex = container(&mut tree, |_| {});
        let a = child(&mut tree, flex, |s| {
            s.flex_basis = Length::Px(50.0);
            s.flex_grow = 1.0;
        });
        let b = child(&mut tree, flex, |s| {
            s.flex_basis = Length::Px(50.0);
            s.flex_grow = 3.0;
        });
        layout(&mut tree);
        assert_eq!(rect(&tree, a).width, 100.0);
        assert_eq!(rect(&tree, b).width, 200.0);
        assert_eq!(rect(&tree, b).x, 100.0);
        // Stretched to the container's height.
        assert_eq!(rect(&tree, a).height, 100.0);
    }

    #[test]
    fn shrink_is_weighted_by_basis() {
        let mut tree = WidgetTree::new("root");
        let flex = container(&mut tree, |_| {});
        let a = child(&mut tree, flex, |s| s.flex_basis = Length::Px(100.0));
        let b = child(&mut tree, flex, |s| s.flex_basis = Length::Px(300.0));
        layout(&mut tree);
        // 100px overflow: a gives 25, b gives 75.
        assert_eq!(rect(&tree, a).width, 75.0);
        assert_eq!(rect(&tree, b).width, 225.0);
    }

    #[test]
    fn min_width_limits_shrinking() {
        let mut tree = WidgetTree::new("root");
        let flex = container(&mut tree, |_| {});
        let a = child(&mut tree, flex, |s| {
            s.flex_basis = Length::Px(200.0);
            s.min_width = Length::Px(190.0);
        });
        child(&mut tree, flex, |s| s.flex_basis = Length::Px(200.0));
        layout(&mut tree);
        assert_eq!(rect(&tree, a).width, 190.0);
    }

    // ── Wrap / align / column ────────────────────────────────────────

    #[test]
    fn wrap_starts_new_lines() {
        let mut tree = WidgetTree::new("root");
        let flex = container(&mut tree, |s| {
            s.flex_wrap = FlexWrap::Wrap;
            s.align_items = AlignItems::FlexStart;
        });
        let a = sized(&mut tree, flex, 200.0, 20.0);
        let b = sized(&mut tree, flex, 200.0, 30.0);
        layout(&mut tree);
        assert_eq!(rect(&tree, a), RectF::new(0.0, 0.0, 200.0, 20.0));
        assert_eq!(rect(&tree, b), RectF::new(0.0, 20.0, 200.0, 30.0));
    }

    #[test]
    fn align_center_in_row() {
        let mut tree = WidgetTree::new("root");
        let flex = container(&mut tree, |s| s.align_items = AlignItems::Center);
        let a = sized(&mut tree, flex, 50.0, 20.0);
        layout(&mut tree);
        assert_eq!(rect(&tree, a).y, 40.0);
    }

    #[test]
    fn column_stacks_and_stretches_width() {
        let mut tree = WidgetTree::new("root");
        let flex = container(&mut tree, |s| {
            s.flex_direction = FlexDirection::Column;
            s.justify_content = JustifyContent::FlexEnd;
        });
        let a = child(&mut tree, flex, |s| s.height = Length::Px(30.0));
        let b = child(&mut tree, flex, |s| s.height = Length::Px(20.0));
        layout(&mut tree);
        assert_eq!(rect(&tree, a), RectF::new(0.0, 50.0, 300.0, 30.0));
        assert_eq!(rect(&tree, b), RectF::new(0.0, 80.0, 300.0, 20.0));
    }

    #[test]
    fn auto_height_row_uses_tallest_item() {
        let mut tree = WidgetTree::new("root");
        let root = tree.root();
        let flex = child(&mut tree, root, |s| s.display = Display::Flex);
        sized(&mut tree, flex, 10.0, 15.0);
        sized(&mut tree, flex, 10.0, 40.0);
        layout(&mut tree);
        assert_eq!(rect(&tree, flex).height, 40.0);
    }
}
