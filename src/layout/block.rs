//! Block flow: block-level children stack vertically, inline-block
//! children fill lines.
//!
//! Vertical margins of adjacent block siblings collapse: the gap is the
//! largest positive margin plus the most negative one. Inline-block lines
//! break when the next box does not fit and are shifted by `text-align`.

use super::engine::LayoutEngine;
use super::resolve::ResolvedBox;
use super::LayoutInput;
use crate::css::computed::ComputedStyle;
use crate::css::values::{Display, TextAlign};
use crate::geometry::{Edges, SizeF};
use crate::tree::WidgetId;

/// Combined gap of two adjoining vertical margins.
pub fn collapse_margins(a: f32, b: f32) -> f32 {
    a.max(b).max(0.0) + a.min(b).min(0.0)
}

struct LineItem {
    id: WidgetId,
    size: SizeF,
    margin: Edges<f32>,
}

struct Flow {
    origin_x: f32,
    origin_y: f32,
    width: f32,
    height: Option<f32>,
    align: TextAlign,
    cursor: f32,
    /// Bottom margin of the previous block, still open for collapsing.
    pending: Option<f32>,
    line: Vec<LineItem>,
    line_width: f32,
}

impl Flow {
    fn flush_line(&mut self, engine: &mut LayoutEngine<'_>) {
        if self.line.is_empty() {
            return;
        }
        let free = (self.width - self.line_width).max(0.0);
        let mut x = match self.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => free / 2.0,
            TextAlign::Right => free,
        };
        let mut line_height = 0.0f32;
        for item in self.line.drain(..) {
            let y = self.cursor + item.margin.top;
            engine.place_in_flow(item.id, self.origin_x + x + item.margin.left, self.origin_y + y, self.width, self.height);
            x += item.size.width + item.margin.horizontal();
            line_height = line_height.max(item.size.height + item.margin.vertical());
        }
        self.cursor += line_height;
        self.line_width = 0.0;
        self.pending = None;
    }
}

/// Arrange the in-flow children of `id` in a content box `width` wide and
/// return the height they use.
pub(crate) fn arrange(
    engine: &mut LayoutEngine<'_>,
    id: WidgetId,
    style: &ComputedStyle,
    rb: &ResolvedBox,
    width: f32,
    height: Option<f32>,
) -> f32 {
    let mut flow = Flow {
        origin_x: rb.border.left + rb.padding.left,
        origin_y: rb.border.top + rb.padding.top,
        width,
        height,
        align: style.text_align,
        cursor: 0.0,
        pending: None,
        line: Vec::new(),
        line_width: 0.0,
    };

    for child in engine.in_flow_children(id) {
        if !engine.still_child(id, child) {
            continue;
        }
        let margin = engine.margins(child, width);
        if engine.style_of(child).display == Display::InlineBlock {
            let size = engine.layout_widget(child, LayoutInput::shrink_to_fit(width, height));
            let margin = margin.map(|m| m.unwrap_or(0.0));
            let outer = size.width + margin.horizontal();
            if !flow.line.is_empty() && flow.line_width + outer > width {
                flow.flush_line(engine);
            }
            flow.line.push(LineItem { id: child, size, margin });
            flow.line_width += outer;
            continue;
        }

        flow.flush_line(engine);
        let size = engine.layout_widget(child, LayoutInput::fill(width, height));
        let top = margin.top.unwrap_or(0.0);
        let bottom = margin.bottom.unwrap_or(0.0);
        let y = match flow.pending.take() {
            Some(previous) => flow.cursor - previous + collapse_margins(previous, top),
            None => flow.cursor + top,
        };
        let x = match (margin.left, margin.right) {
            (None, None) => ((width - size.width) / 2.0).max(0.0),
            (None, Some(right)) => width - size.width - right,
            (Some(left), _) => left,
        };
        engine.place_in_flow(child, flow.origin_x + x, flow.origin_y + y, width, height);
        flow.cursor = y + size.height + bottom;
        flow.pending = Some(bottom);
    }
    flow.flush_line(engine);
    flow.cursor.max(0.0)
}
