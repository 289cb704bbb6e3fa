//! The platform surface the compositor presents to.

use super::canvas::Canvas;
use crate::geometry::{Rect, Size};

/// Errors a surface may report while presenting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SurfaceError {
    /// The window or buffer went away; the caller should recreate it.
    #[error("surface lost")]
    Lost,
    #[error("surface backend error: {0}")]
    Backend(String),
}

/// A destination for finished pixels, usually a window backbuffer.
pub trait Surface {
    /// Current size in pixels.
    fn size(&self) -> Size;

    /// Copy `pixels` (exactly `rect`-sized) to `rect` on the surface.
    fn blit(&mut self, rect: Rect, pixels: &Canvas) -> Result<(), SurfaceError>;

    /// Called once after every blit of a frame.
    fn present(&mut self) -> Result<(), SurfaceError> {
        Ok(())
    }
}
