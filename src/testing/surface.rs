//! An in-memory [`Surface`] that records what it was sent.

use crate::css::values::Color;
use crate::geometry::{Offset, Rect, Size};
use crate::render::{Canvas, Surface, SurfaceError};

// ---------------------------------------------------------------------------
// MemorySurface
// ---------------------------------------------------------------------------

/// Keeps a pixel copy of everything blitted to it and the rects of every
/// blit since the last [`MemorySurface::take_blits`].
#[derive(Debug, Clone)]
pub struct MemorySurface {
    pixels: Canvas,
    blits: Vec<Rect>,
    presents: usize,
    fail_next: Option<SurfaceError>,
}

impl MemorySurface {
    pub fn new(width: i32, height: i32) -> Self {
        Self { pixels: Canvas::new(width, height), blits: Vec::new(), presents: 0, fail_next: None }
    }

    pub fn pixels(&self) -> &Canvas {
        &self.pixels
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.pixels.pixel(x, y)
    }

    pub fn blits(&self) -> &[Rect] {
        &self.blits
    }

    pub fn take_blits(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.blits)
    }

    /// Number of frames presented.
    pub fn presents(&self) -> usize {
        self.presents
    }

    /// Make the next blit fail with `error`.
    pub fn fail_next_blit(&mut self, error: SurfaceError) {
        self.fail_next = Some(error);
    }

    /// Match a new window size. Existing pixels are kept where they fit.
    pub fn resize(&mut self, width: i32, height: i32) {
        let mut pixels = Canvas::new(width, height);
        pixels.copy_from(&self.pixels, self.pixels.bounds(), Offset::new(0, 0));
        self.pixels = pixels;
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> Size {
        self.pixels.size()
    }

    fn blit(&mut self, rect: Rect, pixels: &Canvas) -> Result<(), SurfaceError> {
        if let Some(error) = self.fail_next.take() {
            return Err(error);
        }
        self.pixels.copy_from(pixels, pixels.bounds(), rect.offset());
        self.blits.push(rect);
        Ok(())
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.presents += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_copies_pixels_and_records_rect() {
        let mut surface = MemorySurface::new(4, 4);
        let tile = Canvas::filled(2, 2, Color::WHITE);
        let rect = Rect::new(1, 1, 2, 2);
        assert!(surface.blit(rect, &tile).is_ok());
        assert_eq!(surface.pixel(1, 1), Some(Color::WHITE));
        assert_eq!(surface.pixel(0, 0), Some(Color::TRANSPARENT));
        assert_eq!(surface.take_blits(), vec![rect]);
        assert!(surface.blits().is_empty());
    }

    #[test]
    fn injected_failure_is_returned_once() {
        let mut surface = MemorySurface::new(2, 2);
        surface.fail_next_blit(SurfaceError::Lost);
        let tile = Canvas::new(1, 1);
        assert_eq!(surface.blit(Rect::new(0, 0, 1, 1), &tile), Err(SurfaceError::Lost));
        assert!(surface.blit(Rect::new(0, 0, 1, 1), &tile).is_ok());
    }
}
