//! Text measurement and rasterization boundary.
//!
//! Shaping and glyph rendering are provided by the embedder through
//! [`FontBackend`]. The core only asks for a text box size during layout and
//! a coverage bitmap during paint.

use crate::css::computed::ComputedStyle;
use crate::geometry::SizeF;

/// Errors a font backend may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FontError {
    #[error("no font matches family '{0}'")]
    FamilyNotFound(String),
    #[error("text measurement failed: {0}")]
    Measure(String),
    #[error("glyph rasterization failed: {0}")]
    Raster(String),
}

/// The subset of a computed style a font backend needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
}

impl TextStyle {
    pub fn from_computed(style: &ComputedStyle) -> Self {
        Self {
            font_family: style.font_family.clone(),
            font_size: style.font_size,
            line_height: style.line_height_px(),
        }
    }
}

/// An 8-bit coverage mask, row-major, `width * height` bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBitmap {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<u8>,
}

impl TextBitmap {
    /// Coverage at `(x, y)`; zero outside the bitmap.
    pub fn coverage_at(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return 0;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.coverage.get(index).copied().unwrap_or(0)
    }
}

/// Text shaping and rasterization service.
///
/// Implementations must be shareable across the repaint worker pool.
pub trait FontBackend: Send + Sync {
    /// Size of the laid-out text box. `max_width` is the available width for
    /// wrapping, if known.
    fn measure_text(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> Result<SizeF, FontError>;

    /// Rasterize the text into a coverage mask laid out within `max_width`.
    fn render_text_bitmap(
        &self,
        text: &str,
        style: &TextStyle,
        max_width: Option<f32>,
    ) -> Result<TextBitmap, FontError>;
}

/// A backend that measures every string as empty and renders nothing.
/// Used until the embedder installs a real one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFont;

impl FontBackend for NullFont {
    fn measure_text(&self, _text: &str, style: &TextStyle, _max_width: Option<f32>) -> Result<SizeF, FontError> {
        Ok(SizeF::new(0.0, style.line_height))
    }

    fn render_text_bitmap(
        &self,
        _text: &str,
        _style: &TextStyle,
        _max_width: Option<f32>,
    ) -> Result<TextBitmap, FontError> {
        Ok(TextBitmap::default())
    }
}
