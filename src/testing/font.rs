//! A fixed-advance font that renders every glyph as a solid box.

use crate::font::{FontBackend, FontError, TextBitmap, TextStyle};
use crate::geometry::SizeF;

// ---------------------------------------------------------------------------
// MonospaceFont
// ---------------------------------------------------------------------------

/// Every character is `advance` pixels wide and one line high. Lines break
/// on `'\n'` and, when a width is available, after as many characters as
/// fit. Glyphs other than spaces rasterize as fully covered boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct MonospaceFont {
    pub advance: f32,
    /// Family names that fail with [`FontError::FamilyNotFound`].
    pub missing: Vec<String>,
}

impl Default for MonospaceFont {
    fn default() -> Self {
        Self::new(8.0)
    }
}

impl MonospaceFont {
    pub fn new(advance: f32) -> Self {
        Self { advance: advance.max(1.0), missing: Vec::new() }
    }

    /// Make measuring and rendering with `family` fail.
    pub fn with_missing_family(mut self, family: &str) -> Self {
        self.missing.push(family.to_string());
        self
    }

    fn check(&self, style: &TextStyle) -> Result<(), FontError> {
        if self.missing.iter().any(|m| m.eq_ignore_ascii_case(&style.font_family)) {
            return Err(FontError::FamilyNotFound(style.font_family.clone()));
        }
        Ok(())
    }

    /// Break `text` into lines of characters.
    fn lines(&self, text: &str, max_width: Option<f32>) -> Vec<Vec<char>> {
        let per_line = max_width.map(|w| ((w / self.advance).floor() as usize).max(1));
        let mut lines = Vec::new();
        for hard in text.split('\n') {
            let chars: Vec<char> = hard.chars().collect();
            match per_line {
                Some(n) if chars.len() > n => lines.extend(chars.chunks(n).map(<[char]>::to_vec)),
                _ => lines.push(chars),
            }
        }
        lines
    }
}

impl FontBackend for MonospaceFont {
    fn measure_text(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> Result<SizeF, FontError> {
        self.check(style)?;
        let lines = self.lines(text, max_width);
        let widest = lines.iter().map(Vec::len).max().unwrap_or(0);
        Ok(SizeF::new(widest as f32 * self.advance, lines.len() as f32 * style.line_height))
    }

    fn render_text_bitmap(
        &self,
        text: &str,
        style: &TextStyle,
        max_width: Option<f32>,
    ) -> Result<TextBitmap, FontError> {
        let size = self.measure_text(text, style, max_width)?;
        let width = size.width.ceil() as u32;
        let height = size.height.ceil() as u32;
        let mut coverage = vec![0u8; width as usize * height as usize];
        for (row, line) in self.lines(text, max_width).iter().enumerate() {
            let top = (row as f32 * style.line_height).round() as u32;
            let bottom = (((row + 1) as f32) * style.line_height).round().min(height as f32) as u32;
            for (col, ch) in line.iter().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let left = (col as f32 * self.advance).round() as u32;
                let right = (((col + 1) as f32) * self.advance).round().min(width as f32) as u32;
                for y in top..bottom {
                    let start = (y * width + left) as usize;
                    let end = (y * width + right) as usize;
                    coverage[start..end].fill(255);
                }
            }
        }
        Ok(TextBitmap { width, height, coverage })
    }
}
