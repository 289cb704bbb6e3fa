//! Text widget: a run of text drawn in the widget's `color`.
//!
//! The text is the widget's text content (see
//! [`WidgetTree::set_text`](crate::tree::WidgetTree::set_text)). Measuring
//! and rasterizing go through the installed [`FontBackend`]; when either
//! fails the widget keeps its box and paints no glyphs.

use tracing::warn;

use crate::css::computed::ComputedStyle;
use crate::css::values::TextAlign;
use crate::font::{FontBackend, TextStyle};
use crate::geometry::{SizeF, Offset};
use crate::render::canvas::PaintTarget;
use crate::render::compositor::PaintContext;
use crate::tree::Widget;
use crate::widget::WidgetKind;

// ---------------------------------------------------------------------------
// TextKind
// ---------------------------------------------------------------------------

/// The `text` widget kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextKind;

impl TextKind {
    pub const TYPE_NAME: &'static str = "text";
}

impl WidgetKind for TextKind {
    fn type_name(&self) -> &str {
        Self::TYPE_NAME
    }

    fn default_css(&self) -> &str {
        "text { display: inline-block; }"
    }

    fn measure(
        &self,
        widget: &Widget,
        style: &ComputedStyle,
        fonts: &dyn FontBackend,
        max_width: Option<f32>,
    ) -> Option<SizeF> {
        let text = widget.text().unwrap_or_default();
        match fonts.measure_text(text, &TextStyle::from_computed(style), max_width) {
            Ok(size) => Some(size),
            Err(err) => {
                warn!(error = %err, "text measurement failed");
                Some(SizeF::ZERO)
            }
        }
    }

    fn paint(&self, ctx: &PaintContext<'_>, target: &mut PaintTarget<'_>, widget: &Widget, style: &ComputedStyle) {
        let Some(text) = widget.text().filter(|t| !t.is_empty()) else { return };
        if style.color.is_transparent() {
            return;
        }
        let layout = widget.layout();
        let content = layout.local_pixels(layout.content_box());
        if content.is_empty() {
            return;
        }
        let bitmap = match ctx.fonts.render_text_bitmap(
            text,
            &TextStyle::from_computed(style),
            Some(layout.content_box().width),
        ) {
            Ok(bitmap) => bitmap,
            Err(err) => {
                warn!(error = %err, "text rasterization failed");
                return;
            }
        };

        let free = (content.width - bitmap.width as i32).max(0);
        let shift = match style.text_align {
            TextAlign::Left => 0,
            TextAlign::Center => free / 2,
            TextAlign::Right => free,
        };
        let mut area = target.clipped(content);
        let mut glyphs = area.offset(Offset::new(content.x + shift, content.y));
        for y in 0..bitmap.height as i32 {
            for x in 0..bitmap.width as i32 {
                glyphs.blend_pixel(x, y, style.color, bitmap.coverage_at(x, y));
            }
        }
    }
}
