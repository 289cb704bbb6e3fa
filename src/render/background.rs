//! Background color and image painting over the padding box.

use tracing::warn;

use super::border::{coverage_u8, fit_radii, inner_radii, rounded_coverage};
use super::canvas::{ImageQuality, PaintTarget};
use super::image::ImageStore;
use crate::css::computed::ComputedStyle;
use crate::css::values::{BackgroundRepeat, BackgroundSize, Length};
use crate::geometry::{Rect, RectF, SizeF};

/// Size of the background image tile inside an `area`-sized box.
pub fn tile_size(size: BackgroundSize, image: SizeF, area: SizeF, viewport: SizeF) -> SizeF {
    if image.width <= 0.0 || image.height <= 0.0 {
        return SizeF::ZERO;
    }
    let aspect = image.width / image.height;
    match size {
        BackgroundSize::Auto => image,
        BackgroundSize::Cover | BackgroundSize::Contain => {
            let sx = area.width / image.width;
            let sy = area.height / image.height;
            let scale = if size == BackgroundSize::Cover { sx.max(sy) } else { sx.min(sy) };
            SizeF::new(image.width * scale, image.height * scale)
        }
        BackgroundSize::Explicit(w, h) => {
            let w = w.resolve(Some(area.width), viewport);
            let h = h.resolve(Some(area.height), viewport);
            match (w, h) {
                (Some(w), Some(h)) => SizeF::new(w, h),
                (Some(w), None) => SizeF::new(w, w / aspect),
                (None, Some(h)) => SizeF::new(h * aspect, h),
                (None, None) => image,
            }
        }
    }
}

/// Offset of the first tile. Percentages align that point of the tile
/// with the same point of the area.
pub fn tile_offset(position: (Length, Length), tile: SizeF, area: SizeF, viewport: SizeF) -> (f32, f32) {
    let axis = |length: Length, free: f32| match length {
        Length::Percent(p) => free * p / 100.0,
        other => other.resolve_or_zero(Some(free), viewport),
    };
    (axis(position.0, area.width - tile.width), axis(position.1, area.height - tile.height))
}

/// Paint the background of a box with border box `border_box`
/// (widget-local pixels).
pub fn paint_background(
    target: &mut PaintTarget<'_>,
    border_box: Rect,
    style: &ComputedStyle,
    images: &ImageStore,
    quality: ImageQuality,
    viewport: SizeF,
) {
    let outer = RectF::new(
        border_box.x as f32,
        border_box.y as f32,
        border_box.width as f32,
        border_box.height as f32,
    );
    let widths = style.border_widths();
    let inner = outer.deflate(widths);
    let radii = inner_radii(fit_radii(style.border_radius, outer.width, outer.height), widths);
    let area = inner.to_rect();
    let rounded = !radii.is_square();
    let visible = area.intersection(target.local_clip());
    if visible.is_empty() {
        return;
    }

    let color = style.background_color;
    if !color.is_transparent() {
        if rounded {
            for y in visible.y..visible.bottom() {
                for x in visible.x..visible.right() {
                    let coverage = rounded_coverage(x, y, inner, radii);
                    target.blend_pixel(x, y, color, coverage_u8(coverage));
                }
            }
        } else {
            target.fill_rect(visible, color);
        }
    }

    let Some(name) = style.background_image.as_deref() else { return };
    let Some(image) = images.get(name) else {
        warn!(image = name, "background image not found");
        return;
    };
    let natural = image.size().to_f32();
    let area_size = SizeF::new(area.width as f32, area.height as f32);
    let tile = tile_size(style.background_size, natural, area_size, viewport);
    if tile.width <= 0.0 || tile.height <= 0.0 {
        return;
    }
    let (ox, oy) = tile_offset(style.background_position, tile, area_size, viewport);
    let (repeat_x, repeat_y) = match style.background_repeat {
        BackgroundRepeat::Repeat => (true, true),
        BackgroundRepeat::RepeatX => (true, false),
        BackgroundRepeat::RepeatY => (false, true),
        BackgroundRepeat::NoRepeat => (false, false),
    };
    let place = |p: f32, offset: f32, len: f32, repeat: bool| -> Option<f32> {
        let t = p - offset;
        if repeat {
            Some(t.rem_euclid(len))
        } else {
            (0.0..len).contains(&t).then_some(t)
        }
    };

    for y in visible.y..visible.bottom() {
        let Some(ty) = place((y - area.y) as f32 + 0.5, oy, tile.height, repeat_y) else { continue };
        let v = ty * natural.height / tile.height;
        for x in visible.x..visible.right() {
            let Some(tx) = place((x - area.x) as f32 + 0.5, ox, tile.width, repeat_x) else { continue };
            let u = tx * natural.width / tile.width;
            let coverage = if rounded { coverage_u8(rounded_coverage(x, y, inner, radii)) } else { 255 };
            target.blend_pixel(x, y, image.sample(u, v, quality), coverage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::values::Color;
    use crate::geometry::Offset;
    use crate::render::canvas::Canvas;

    const VIEWPORT: SizeF = SizeF::new(800.0, 600.0);

    // ── Sizing ───────────────────────────────────────────────────────

    #[test]
    fn cover_and_contain() {
        let image = SizeF::new(10.0, 20.0);
        let area = SizeF::new(40.0, 40.0);
        assert_eq!(tile_size(BackgroundSize::Cover, image, area, VIEWPORT), SizeF::new(40.0, 80.0));
        assert_eq!(tile_size(BackgroundSize::Contain, image, area, VIEWPORT), SizeF::new(20.0, 40.0));
    }

    #[test]
    fn explicit_size_keeps_aspect_on_auto_axis() {
        let image = SizeF::new(10.0, 20.0);
        let area = SizeF::new(40.0, 40.0);
        let size = BackgroundSize::Explicit(Length::Px(5.0), Length::Auto);
        assert_eq!(tile_size(size, image, area, VIEWPORT), SizeF::new(5.0, 10.0));
        let size = BackgroundSize::Explicit(Length::Percent(50.0), Length::Percent(25.0));
        assert_eq!(tile_size(size, image, area, VIEWPORT), SizeF::new(20.0, 10.0));
    }

    #[test]
    fn percent_position_uses_free_space() {
        let offset = tile_offset(
            (Length::Percent(100.0), Length::Percent(50.0)),
            SizeF::new(10.0, 10.0),
            SizeF::new(50.0, 30.0),
            VIEWPORT,
        );
        assert_eq!(offset, (40.0, 10.0));
    }

    // ── Painting ─────────────────────────────────────────────────────

    #[test]
    fn color_fills_padding_box_only() {
        let mut style = ComputedStyle::initial();
        style.background_color = Color::rgb(255, 0, 0);
        style.border.left.width = 3.0;
        let mut canvas = Canvas::new(10, 10);
        let mut target = PaintTarget::new(&mut canvas, Offset::default());
        paint_background(&mut target, Rect::new(0, 0, 10, 10), &style, &ImageStore::new(), ImageQuality::Nearest, VIEWPORT);
        assert_eq!(canvas.pixel(2, 5), Some(Color::TRANSPARENT));
        assert_eq!(canvas.pixel(3, 5), Some(Color::rgb(255, 0, 0)));
    }

    #[test]
    fn no_repeat_image_is_placed_once() {
        let mut images = ImageStore::new();
        images.insert("dot", Canvas::filled(2, 2, Color::WHITE));
        let mut style = ComputedStyle::initial();
        style.background_image = Some("dot".into());
        style.background_repeat = BackgroundRepeat::NoRepeat;
        style.background_position = (Length::Px(4.0), Length::Px(4.0));
        let mut canvas = Canvas::new(10, 10);
        let mut target = PaintTarget::new(&mut canvas, Offset::default());
        paint_background(&mut target, Rect::new(0, 0, 10, 10), &style, &images, ImageQuality::Nearest, VIEWPORT);
        assert_eq!(canvas.pixel(4, 4), Some(Color::WHITE));
        assert_eq!(canvas.pixel(5, 5), Some(Color::WHITE));
        assert_eq!(canvas.pixel(6, 6), Some(Color::TRANSPARENT));
        assert_eq!(canvas.pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn repeated_image_tiles() {
        let mut images = ImageStore::new();
        let Some(stripes) = Canvas::from_pixels(2, 1, vec![Color::WHITE, Color::BLACK]) else {
            panic!("bad pixel count")
        };
        images.insert("stripes", stripes);
        let mut style = ComputedStyle::initial();
        style.background_image = Some("stripes".into());
        let mut canvas = Canvas::new(6, 2);
        let mut target = PaintTarget::new(&mut canvas, Offset::default());
        paint_background(&mut target, Rect::new(0, 0, 6, 2), &style, &images, ImageQuality::Nearest, VIEWPORT);
        assert_eq!(canvas.pixel(4, 1), Some(Color::WHITE));
        assert_eq!(canvas.pixel(5, 1), Some(Color::BLACK));
    }

    #[test]
    fn missing_image_still_paints_color() {
        let mut style = ComputedStyle::initial();
        style.background_color = Color::rgb(0, 0, 255);
        style.background_image = Some("nope".into());
        let mut canvas = Canvas::new(4, 4);
        let mut target = PaintTarget::new(&mut canvas, Offset::default());
        paint_background(&mut target, Rect::new(0, 0, 4, 4), &style, &ImageStore::new(), ImageQuality::Bilinear, VIEWPORT);
        assert_eq!(canvas.pixel(1, 1), Some(Color::rgb(0, 0, 255)));
    }
}
