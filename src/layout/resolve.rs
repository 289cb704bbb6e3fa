//! Computed style -> resolved box quantities.
//!
//! Lengths are resolved against the containing block: horizontal and
//! vertical margins and padding against its width (as CSS does), width
//! against its width and height against its height. Explicit sizes are
//! converted to content-box sizes according to `box-sizing`. Anything
//! negative or non-finite is clamped to zero.

use crate::css::computed::ComputedStyle;
use crate::css::values::{BoxSizing, Length};
use crate::geometry::{Edges, SizeF};

/// Clamp a layout quantity to a finite, non-negative value.
#[inline]
pub fn sane(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Box quantities of one widget for one containing block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolvedBox {
    /// `None` marks an `auto` margin.
    pub margin: Edges<Option<f32>>,
    pub border: Edges<f32>,
    pub padding: Edges<f32>,
    /// Content-box width, `None` when `auto`.
    pub width: Option<f32>,
    /// Content-box height, `None` when `auto` or a percentage of an
    /// unknown height.
    pub height: Option<f32>,
    pub min_width: f32,
    pub max_width: Option<f32>,
    pub min_height: f32,
    pub max_height: Option<f32>,
}

impl ResolvedBox {
    pub fn resolve(style: &ComputedStyle, cb_width: Option<f32>, cb_height: Option<f32>, viewport: SizeF) -> Self {
        let along_width = |l: Length| l.resolve(cb_width, viewport);
        let margin = style.margin.map(|l| along_width(l).map(|v| if v.is_finite() { v } else { 0.0 }));
        let padding = style.padding.map(|l| sane(along_width(l).unwrap_or(0.0)));
        let border = style.border_widths().map(sane);

        let frame_w = border.horizontal() + padding.horizontal();
        let frame_h = border.vertical() + padding.vertical();
        let to_content = |value: f32, frame: f32| match style.box_sizing {
            BoxSizing::ContentBox => sane(value),
            BoxSizing::BorderBox => sane(value - frame),
        };
        let width_of = |l: Length| l.resolve(cb_width, viewport).map(|v| to_content(v, frame_w));
        let height_of = |l: Length| l.resolve(cb_height, viewport).map(|v| to_content(v, frame_h));

        Self {
            margin,
            border,
            padding,
            width: width_of(style.width),
            height: height_of(style.height),
            min_width: width_of(style.min_width).unwrap_or(0.0),
            max_width: width_of(style.max_width),
            min_height: height_of(style.min_height).unwrap_or(0.0),
            max_height: height_of(style.max_height),
        }
    }

    /// Border plus padding, horizontally.
    pub fn frame_width(&self) -> f32 {
        self.border.horizontal() + self.padding.horizontal()
    }

    /// Border plus padding, vertically.
    pub fn frame_height(&self) -> f32 {
        self.border.vertical() + self.padding.vertical()
    }

    /// Margins with `auto` treated as zero.
    pub fn used_margin(&self) -> Edges<f32> {
        self.margin.map(|m| m.unwrap_or(0.0))
    }

    /// Apply min/max to a content width. `min` wins over `max`.
    pub fn clamp_width(&self, width: f32) -> f32 {
        let capped = self.max_width.map_or(width, |max| width.min(max));
        sane(capped.max(self.min_width))
    }

    pub fn clamp_height(&self, height: f32) -> f32 {
        let capped = self.max_height.map_or(height, |max| height.min(max));
        sane(capped.max(self.min_height))
    }

    /// Explicit border-box width.
    pub fn border_box_width(&self) -> Option<f32> {
        self.width.map(|w| self.clamp_width(w) + self.frame_width())
    }

    /// Explicit border-box height.
    pub fn border_box_height(&self) -> Option<f32> {
        self.height.map(|h| self.clamp_height(h) + self.frame_height())
    }
}
