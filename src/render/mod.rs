//! Rendering pipeline: canvas, dirty regions, box painters, compositor,
//! surface boundary.

pub mod canvas;
pub mod dirty;
pub mod image;
pub mod border;
pub mod background;
pub mod shadow;
pub mod compositor;
pub mod surface;

pub use canvas::{Canvas, ImageQuality, PaintTarget};
pub use compositor::{Compositor, PaintContext};
pub use dirty::DirtyRegion;
pub use image::ImageStore;
pub use surface::{Surface, SurfaceError};
