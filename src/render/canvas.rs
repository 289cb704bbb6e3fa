//! RGBA pixel buffer with straight alpha and saturating source-over blending.

use crate::css::values::{mul_div_255, Color};
use crate::geometry::{Offset, Rect, Size};

/// How scaled images are sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageQuality {
    Nearest,
    #[default]
    Bilinear,
}

/// Source-over with straight alpha, 8 bits per channel.
#[inline]
pub fn blend(dst: Color, src: Color) -> Color {
    match (src.a, dst.a) {
        (0, _) => dst,
        (255, _) | (_, 0) => src,
        (sa, da) => {
            let sa = sa as u32;
            let keep = da as u32 * (255 - sa) / 255;
            let out_a = sa + keep;
            let channel = |s: u8, d: u8| -> u8 {
                let value = (s as u32 * sa + d as u32 * keep + out_a / 2) / out_a;
                value.min(255) as u8
            };
            Color::rgba(channel(src.r, dst.r), channel(src.g, dst.g), channel(src.b, dst.b), out_a.min(255) as u8)
        }
    }
}

/// An owned RGBA image. Pixel `(x, y)` lives at index `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<Color>,
}

impl Canvas {
    /// A transparent canvas. Negative sizes are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    pub fn filled(width: i32, height: i32, color: Color) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self { width, height, pixels: vec![color; width as usize * height as usize] }
    }

    /// Build from row-major pixels. Returns `None` if the length is wrong.
    pub fn from_pixels(width: i32, height: i32, pixels: Vec<Color>) -> Option<Self> {
        (width >= 0 && height >= 0 && pixels.len() == width as usize * height as usize)
            .then_some(Self { width, height, pixels })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        self.size().to_rect()
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        (x >= 0 && y >= 0 && x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Blend `color` over the pixel at `(x, y)`.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = blend(self.pixels[i], color);
        }
    }

    /// Blend `color` over every pixel of `rect`.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if color.is_transparent() {
            return;
        }
        let rect = rect.intersection(self.bounds());
        for y in rect.y..rect.bottom() {
            let row = y as usize * self.width as usize;
            for x in rect.x..rect.right() {
                let i = row + x as usize;
                self.pixels[i] = blend(self.pixels[i], color);
            }
        }
    }

    /// Overwrite every pixel of `rect` with `color`.
    pub fn clear_rect(&mut self, rect: Rect, color: Color) {
        let rect = rect.intersection(self.bounds());
        for y in rect.y..rect.bottom() {
            let row = y as usize * self.width as usize;
            self.pixels[row + rect.x as usize..row + rect.right() as usize].fill(color);
        }
    }

    /// A copy of `rect` as a new canvas. Parts outside this canvas are
    /// transparent.
    pub fn crop(&self, rect: Rect) -> Canvas {
        let mut out = Canvas::new(rect.width, rect.height);
        out.copy_from(self, rect, Offset::default());
        out
    }

    /// Copy `src_rect` of `src` so that its top-left lands at `dst`,
    /// replacing the pixels underneath.
    pub fn copy_from(&mut self, src: &Canvas, src_rect: Rect, dst: Offset) {
        self.transfer(src, src_rect, dst, |_, s| s);
    }

    /// Blend `src_rect` of `src` over this canvas at `dst`, with the
    /// source alpha scaled by `opacity`.
    pub fn blend_from(&mut self, src: &Canvas, src_rect: Rect, dst: Offset, opacity: u8) {
        self.transfer(src, src_rect, dst, |d, s| blend(d, s.with_alpha_scaled(opacity)));
    }

    fn transfer(&mut self, src: &Canvas, src_rect: Rect, dst: Offset, op: impl Fn(Color, Color) -> Color) {
        let src_rect = src_rect.intersection(src.bounds());
        let shift = Offset::new(dst.x - src_rect.x, dst.y - src_rect.y);
        let target = src_rect.translate(shift).intersection(self.bounds());
        for y in target.y..target.bottom() {
            for x in target.x..target.right() {
                let (sx, sy) = (x - shift.x, y - shift.y);
                let si = sy as usize * src.width as usize + sx as usize;
                let di = y as usize * self.width as usize + x as usize;
                self.pixels[di] = op(self.pixels[di], src.pixels[si]);
            }
        }
    }

    /// Sample at continuous image coordinates, clamping to the edges.
    pub fn sample(&self, u: f32, v: f32, quality: ImageQuality) -> Color {
        if self.pixels.is_empty() {
            return Color::TRANSPARENT;
        }
        let max_x = self.width - 1;
        let max_y = self.height - 1;
        match quality {
            ImageQuality::Nearest => {
                let x = (u.floor() as i32).clamp(0, max_x);
                let y = (v.floor() as i32).clamp(0, max_y);
                self.pixels[y as usize * self.width as usize + x as usize]
            }
            ImageQuality::Bilinear => {
                let fx = (u - 0.5).clamp(0.0, max_x as f32);
                let fy = (v - 0.5).clamp(0.0, max_y as f32);
                let x0 = fx.floor() as i32;
                let y0 = fy.floor() as i32;
                let x1 = (x0 + 1).min(max_x);
                let y1 = (y0 + 1).min(max_y);
                let tx = fx - x0 as f32;
                let ty = fy - y0 as f32;
                let at = |x: i32, y: i32| self.pixels[y as usize * self.width as usize + x as usize];
                let (c00, c10, c01, c11) = (at(x0, y0), at(x1, y0), at(x0, y1), at(x1, y1));
                let mix = |a: u8, b: u8, c: u8, d: u8| -> u8 {
                    let top = a as f32 + (b as f32 - a as f32) * tx;
                    let bottom = c as f32 + (d as f32 - c as f32) * tx;
                    (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8
                };
                Color::rgba(
                    mix(c00.r, c10.r, c01.r, c11.r),
                    mix(c00.g, c10.g, c01.g, c11.g),
                    mix(c00.b, c10.b, c01.b, c11.b),
                    mix(c00.a, c10.a, c01.a, c11.a),
                )
            }
        }
    }

    /// Tint every pixel of `rect` towards `color` by `amount`/255.
    pub fn tint(&mut self, rect: Rect, color: Color, amount: u8) {
        self.fill_rect(rect, Color { a: mul_div_255(color.a, amount), ..color });
    }
}

/// Where and how a widget paints: the canvas, the canvas position of the
/// widget-local origin, and the clip in canvas coordinates.
#[derive(Debug)]
pub struct PaintTarget<'a> {
    pub canvas: &'a mut Canvas,
    pub origin: Offset,
    pub clip: Rect,
}

impl<'a> PaintTarget<'a> {
    pub fn new(canvas: &'a mut Canvas, origin: Offset) -> Self {
        let clip = canvas.bounds();
        Self { canvas, origin, clip }
    }

    /// The clip in widget-local coordinates.
    pub fn local_clip(&self) -> Rect {
        self.clip.translate(Offset::new(-self.origin.x, -self.origin.y))
    }

    /// Reborrow with the clip narrowed to `local` (widget-local).
    pub fn clipped(&mut self, local: Rect) -> PaintTarget<'_> {
        let clip = self.clip.intersection(local.translate(self.origin));
        PaintTarget { canvas: self.canvas, origin: self.origin, clip }
    }

    /// Reborrow with the origin moved by `offset`.
    pub fn offset(&mut self, offset: Offset) -> PaintTarget<'_> {
        PaintTarget { canvas: self.canvas, origin: self.origin + offset, clip: self.clip }
    }

    /// Blend `color` over a widget-local rect.
    pub fn fill_rect(&mut self, local: Rect, color: Color) {
        let rect = local.translate(self.origin).intersection(self.clip);
        self.canvas.fill_rect(rect, color);
    }

    /// Blend `color` at a widget-local pixel, scaled by `coverage`.
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color, coverage: u8) {
        let (cx, cy) = (x + self.origin.x, y + self.origin.y);
        if coverage == 0 || !self.clip.contains(cx, cy) {
            return;
        }
        self.canvas.blend_pixel(cx, cy, color.with_alpha_scaled(coverage));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Blending ─────────────────────────────────────────────────────

    #[test]
    fn opaque_source_replaces() {
        let dst = Color::rgb(10, 20, 30);
        assert_eq!(blend(dst, Color::rgb(1, 2, 3)), Color::rgb(1, 2, 3));
        assert_eq!(blend(dst, Color::TRANSPARENT), dst);
    }

    #[test]
    fn half_alpha_over_opaque() {
        let out = blend(Color::rgb(0, 0, 0), Color::rgba(255, 255, 255, 128));
        assert_eq!(out.a, 255);
        assert!((127..=129).contains(&out.r));
    }

    #[test]
    fn blend_over_transparent_keeps_source() {
        let src = Color::rgba(200, 100, 50, 90);
        assert_eq!(blend(Color::TRANSPARENT, src), src);
    }

    #[test]
    fn translucent_over_translucent_saturates() {
        let out = blend(Color::rgba(255, 255, 255, 200), Color::rgba(255, 255, 255, 200));
        assert_eq!((out.r, out.g, out.b), (255, 255, 255));
        assert!(out.a > 200);
    }

    // ── Canvas ───────────────────────────────────────────────────────

    #[test]
    fn fill_rect_is_clipped_and_half_open() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_rect(Rect::new(2, 2, 10, 10), Color::WHITE);
        assert_eq!(canvas.pixel(1, 1), Some(Color::TRANSPARENT));
        assert_eq!(canvas.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(canvas.pixel(3, 3), Some(Color::WHITE));
        assert_eq!(canvas.pixel(4, 4), None);
    }

    #[test]
    fn crop_and_copy() {
        let mut canvas = Canvas::new(4, 4);
        canvas.set_pixel(1, 1, Color::WHITE);
        let piece = canvas.crop(Rect::new(1, 1, 2, 2));
        assert_eq!(piece.size(), Size::new(2, 2));
        assert_eq!(piece.pixel(0, 0), Some(Color::WHITE));

        let mut other = Canvas::new(4, 4);
        other.copy_from(&piece, piece.bounds(), Offset::new(3, 3));
        assert_eq!(other.pixel(3, 3), Some(Color::WHITE));
    }

    #[test]
    fn blend_from_scales_opacity() {
        let layer = Canvas::filled(1, 1, Color::WHITE);
        let mut canvas = Canvas::filled(1, 1, Color::BLACK);
        canvas.blend_from(&layer, layer.bounds(), Offset::default(), 0);
        assert_eq!(canvas.pixel(0, 0), Some(Color::BLACK));
        canvas.blend_from(&layer, layer.bounds(), Offset::default(), 255);
        assert_eq!(canvas.pixel(0, 0), Some(Color::WHITE));
    }

    // ── Sampling ─────────────────────────────────────────────────────

    #[test]
    fn nearest_and_bilinear_sampling() {
        let image = Canvas::from_pixels(2, 1, vec![Color::BLACK, Color::WHITE]);
        let Some(image) = image else { panic!("bad pixel count") };
        assert_eq!(image.sample(0.9, 0.5, ImageQuality::Nearest), Color::BLACK);
        assert_eq!(image.sample(1.1, 0.5, ImageQuality::Nearest), Color::WHITE);
        let mid = image.sample(1.0, 0.5, ImageQuality::Bilinear);
        assert!((126..=129).contains(&mid.r));
        assert_eq!(image.sample(-5.0, 0.5, ImageQuality::Bilinear), Color::BLACK);
    }

    // ── Paint target ─────────────────────────────────────────────────

    #[test]
    fn target_translates_and_clips() {
        let mut canvas = Canvas::new(10, 10);
        let mut target = PaintTarget::new(&mut canvas, Offset::new(2, 2));
        let mut inner = target.clipped(Rect::new(0, 0, 3, 3));
        inner.fill_rect(Rect::new(0, 0, 100, 100), Color::WHITE);
        assert_eq!(inner.local_clip(), Rect::new(0, 0, 3, 3));
        assert_eq!(canvas.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(canvas.pixel(4, 4), Some(Color::WHITE));
        assert_eq!(canvas.pixel(5, 5), Some(Color::TRANSPARENT));
        assert_eq!(canvas.pixel(1, 1), Some(Color::TRANSPARENT));
    }
}
