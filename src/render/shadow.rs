//! Box shadows. Outset shadows paint outside the border box, inset ones
//! inside the padding box.

use super::border::{coverage_u8, fit_radii, inner_radii, rounded_coverage};
use super::canvas::PaintTarget;
use crate::css::computed::ComputedStyle;
use crate::css::values::BoxShadow;
use crate::geometry::{Corners, Edges, Rect, RectF};

/// Fraction of a blurred edge at signed distance `t` past it. The blur
/// spreads each edge linearly over `2 * blur` pixels.
#[inline]
fn ramp(t: f32, blur: f32) -> f32 {
    if blur <= 0.0 {
        return if t >= 0.0 { 1.0 } else { 0.0 };
    }
    (t / (2.0 * blur) + 0.5).clamp(0.0, 1.0)
}

/// Coverage of the blurred span `[a, b)` at `p`.
#[inline]
fn span(p: f32, a: f32, b: f32, blur: f32) -> f32 {
    (ramp(p - a, blur) - ramp(p - b, blur)).max(0.0)
}

/// Coverage of a blurred rect at pixel `(x, y)`.
fn shadow_coverage(x: i32, y: i32, rect: RectF, radii: Corners<f32>, blur: f32) -> f32 {
    let px = x as f32 + 0.5;
    let py = y as f32 + 0.5;
    let body = span(px, rect.x, rect.right(), blur) * span(py, rect.y, rect.bottom(), blur);
    if radii.is_square() || blur > 0.0 {
        body
    } else {
        body.min(rounded_coverage(x, y, rect, radii))
    }
}

fn grow(radii: Corners<f32>, by: f32) -> Corners<f32> {
    let f = |r: f32| if r > 0.0 { (r + by).max(0.0) } else { 0.0 };
    Corners {
        top_left: f(radii.top_left),
        top_right: f(radii.top_right),
        bottom_right: f(radii.bottom_right),
        bottom_left: f(radii.bottom_left),
    }
}

/// Paint an outset shadow of the box with border box `border_box`.
pub fn paint_outset_shadow(target: &mut PaintTarget<'_>, border_box: Rect, style: &ComputedStyle) {
    let Some(shadow) = style.box_shadow.filter(|s| !s.inset && !s.color.is_transparent()) else {
        return;
    };
    let outer = RectF::new(border_box.x as f32, border_box.y as f32, border_box.width as f32, border_box.height as f32);
    let radii = fit_radii(style.border_radius, outer.width, outer.height);
    let cast = RectF::new(outer.x + shadow.x, outer.y + shadow.y, outer.width, outer.height)
        .inflate(Edges::all(shadow.spread));
    if cast.width <= 0.0 || cast.height <= 0.0 {
        return;
    }
    let cast_radii = grow(radii, shadow.spread);
    let blur = shadow.blur.max(0.0);
    let reach = cast.inflate(Edges::all(blur)).to_rect();
    let area = reach.intersection(target.local_clip());

    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let under_box = rounded_coverage(x, y, outer, radii);
            if under_box >= 1.0 {
                continue;
            }
            let coverage = shadow_coverage(x, y, cast, cast_radii, blur) * (1.0 - under_box);
            target.blend_pixel(x, y, shadow.color, coverage_u8(coverage));
        }
    }
}

/// Paint an inset shadow inside the padding box.
pub fn paint_inset_shadow(target: &mut PaintTarget<'_>, border_box: Rect, style: &ComputedStyle) {
    let Some(shadow) = style.box_shadow.filter(|s| s.inset && !s.color.is_transparent()) else {
        return;
    };
    let outer = RectF::new(border_box.x as f32, border_box.y as f32, border_box.width as f32, border_box.height as f32);
    let widths = style.border_widths();
    let padding = outer.deflate(widths);
    let radii = inner_radii(fit_radii(style.border_radius, outer.width, outer.height), widths);
    let hole = hole_rect(&shadow, padding);
    let hole_radii = grow(radii, -shadow.spread);
    let blur = shadow.blur.max(0.0);
    let area = padding.to_rect().intersection(target.local_clip());

    for y in area.y..area.bottom() {
        for x in area.x..area.right() {
            let inside = rounded_coverage(x, y, padding, radii);
            if inside <= 0.0 {
                continue;
            }
            let lit = if hole.width > 0.0 && hole.height > 0.0 {
                shadow_coverage(x, y, hole, hole_radii, blur)
            } else {
                0.0
            };
            let coverage = (1.0 - lit) * inside;
            target.blend_pixel(x, y, shadow.color, coverage_u8(coverage));
        }
    }
}

fn hole_rect(shadow: &BoxShadow, padding: RectF) -> RectF {
    let moved = RectF::new(padding.x + shadow.x, padding.y + shadow.y, padding.width, padding.height);
    let spread = shadow.spread.max(-moved.width.min(moved.height));
    moved.deflate(Edges::all(spread))
}
