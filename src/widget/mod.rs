//! Widget kinds and their registry.

pub mod traits;

pub use traits::{KindRegistry, WidgetKind};
