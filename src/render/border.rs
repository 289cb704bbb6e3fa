//! Border painting and the rounded-rect coverage shared by the other
//! box painters.

use super::canvas::PaintTarget;
use crate::css::computed::{BorderSide, ComputedStyle};
use crate::css::values::BorderStyle;
use crate::geometry::{Corners, Edges, Rect, RectF};

/// Scale radii down so adjacent corners never overlap along a side.
pub fn fit_radii(radii: Corners<f32>, width: f32, height: f32) -> Corners<f32> {
    let r = Corners {
        top_left: radii.top_left.max(0.0),
        top_right: radii.top_right.max(0.0),
        bottom_right: radii.bottom_right.max(0.0),
        bottom_left: radii.bottom_left.max(0.0),
    };
    let ratio = |side: f32, a: f32, b: f32| if a + b > side && a + b > 0.0 { side.max(0.0) / (a + b) } else { 1.0 };
    let scale = ratio(width, r.top_left, r.top_right)
        .min(ratio(width, r.bottom_left, r.bottom_right))
        .min(ratio(height, r.top_left, r.bottom_left))
        .min(ratio(height, r.top_right, r.bottom_right));
    if scale >= 1.0 {
        return r;
    }
    Corners {
        top_left: r.top_left * scale,
        top_right: r.top_right * scale,
        bottom_right: r.bottom_right * scale,
        bottom_left: r.bottom_left * scale,
    }
}

/// Radii of the box inside `widths`, following the outer curve.
pub fn inner_radii(outer: Corners<f32>, widths: Edges<f32>) -> Corners<f32> {
    Corners {
        top_left: (outer.top_left - widths.top.max(widths.left)).max(0.0),
        top_right: (outer.top_right - widths.top.max(widths.right)).max(0.0),
        bottom_right: (outer.bottom_right - widths.bottom.max(widths.right)).max(0.0),
        bottom_left: (outer.bottom_left - widths.bottom.max(widths.left)).max(0.0),
    }
}

/// Fraction (0..=1) of pixel `(x, y)` inside the rounded rect, sampled at
/// the pixel center with a one-pixel ramp along the curve.
pub fn rounded_coverage(x: i32, y: i32, rect: RectF, radii: Corners<f32>) -> f32 {
    let px = x as f32 + 0.5;
    let py = y as f32 + 0.5;
    let edge_x = ((px - rect.x).min(rect.right() - px) + 0.5).clamp(0.0, 1.0);
    let edge_y = ((py - rect.y).min(rect.bottom() - py) + 0.5).clamp(0.0, 1.0);
    let straight = edge_x.min(edge_y);
    if straight <= 0.0 {
        return 0.0;
    }

    let corner = |cx: f32, cy: f32, r: f32| -> f32 {
        let distance = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();
        (r - distance + 0.5).clamp(0.0, 1.0)
    };
    let curve = if px < rect.x + radii.top_left && py < rect.y + radii.top_left {
        corner(rect.x + radii.top_left, rect.y + radii.top_left, radii.top_left)
    } else if px > rect.right() - radii.top_right && py < rect.y + radii.top_right {
        corner(rect.right() - radii.top_right, rect.y + radii.top_right, radii.top_right)
    } else if px > rect.right() - radii.bottom_right && py > rect.bottom() - radii.bottom_right {
        corner(rect.right() - radii.bottom_right, rect.bottom() - radii.bottom_right, radii.bottom_right)
    } else if px < rect.x + radii.bottom_left && py > rect.bottom() - radii.bottom_left {
        corner(rect.x + radii.bottom_left, rect.bottom() - radii.bottom_left, radii.bottom_left)
    } else {
        1.0
    };
    straight.min(curve)
}

/// Coverage as an 8-bit alpha factor.
#[inline]
pub fn coverage_u8(coverage: f32) -> u8 {
    (coverage.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// The side owning a border pixel: the one the pixel is relatively
/// shallowest in, which splits corners along their diagonal.
fn owning_side(px: f32, py: f32, width: f32, height: f32, widths: Edges<f32>) -> Option<Side> {
    [
        (Side::Top, py, widths.top),
        (Side::Right, width - px, widths.right),
        (Side::Bottom, height - py, widths.bottom),
        (Side::Left, px, widths.left),
    ]
    .into_iter()
    .filter(|(_, _, w)| *w > 0.0)
    .map(|(side, depth, w)| (side, depth / w))
    .min_by(|a, b| a.1.total_cmp(&b.1))
    .map(|(side, _)| side)
}

/// Whether the dash pattern of `side` draws at position `t` along the edge.
fn pattern_on(style: BorderStyle, width: f32, t: i32) -> bool {
    let segment = match style {
        BorderStyle::Dashed => (width * 3.0).round().max(1.0) as i32,
        BorderStyle::Dotted => width.round().max(1.0) as i32,
        _ => return true,
    };
    (t / segment) % 2 == 0
}

/// Paint the four borders of a box whose border box is `size`.
pub fn paint_border(target: &mut PaintTarget<'_>, border_box: Rect, style: &ComputedStyle) {
    let sides = style.border;
    if ![sides.top, sides.right, sides.bottom, sides.left].iter().any(BorderSide::is_painted) {
        return;
    }
    let widths = style.border_widths();
    let w = border_box.width as f32;
    let h = border_box.height as f32;
    let outer = RectF::new(border_box.x as f32, border_box.y as f32, w, h);
    let inner = outer.deflate(widths);
    let outer_radii = fit_radii(style.border_radius, w, h);
    let inner_radii = inner_radii(outer_radii, widths);

    // Rows and columns strictly inside this rect never touch the border.
    let max_inner_radius = inner_radii
        .top_left
        .max(inner_radii.top_right)
        .max(inner_radii.bottom_right)
        .max(inner_radii.bottom_left);
    let safe = Rect::from_edges(
        (inner.x + max_inner_radius).ceil() as i32,
        (inner.y + max_inner_radius).ceil() as i32,
        (inner.right() - max_inner_radius).floor() as i32,
        (inner.bottom() - max_inner_radius).floor() as i32,
    );

    let area = border_box.intersection(target.local_clip());
    for y in area.y..area.bottom() {
        let skip = if y >= safe.y && y < safe.bottom() && !safe.is_empty() {
            safe.x..safe.right()
        } else {
            0..0
        };
        for x in area.x..area.right() {
            if skip.contains(&x) {
                continue;
            }
            let coverage = rounded_coverage(x, y, outer, outer_radii)
                - rounded_coverage(x, y, inner, inner_radii);
            if coverage <= 0.0 {
                continue;
            }
            let lx = x as f32 + 0.5 - outer.x;
            let ly = y as f32 + 0.5 - outer.y;
            let Some(side) = owning_side(lx, ly, w, h, widths) else { continue };
            let (border, along) = match side {
                Side::Top => (sides.top, x - border_box.x),
                Side::Bottom => (sides.bottom, x - border_box.x),
                Side::Left => (sides.left, y - border_box.y),
                Side::Right => (sides.right, y - border_box.y),
            };
            if !border.is_painted() || !pattern_on(border.style, border.width, along) {
                continue;
            }
            target.blend_pixel(x, y, border.color, coverage_u8(coverage));
        }
    }
}
