//! Headless fixtures: a deterministic font and an in-memory surface.
//!
//! Both are public so downstream crates can drive a
//! [`UiContext`](crate::context::UiContext) or an [`App`](crate::app::App)
//! in their own tests without a window or a font rasterizer.

pub mod font;
pub mod surface;

pub use font::MonospaceFont;
pub use surface::MemorySurface;
