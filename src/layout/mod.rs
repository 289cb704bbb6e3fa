//! Layout engine: box resolution, block flow, flex flow, positioned
//! widgets.
//!
//! Layout is incremental. Each widget remembers the constraints it was last
//! laid out with; a widget with no pending reflow on itself or below that
//! receives the same constraints keeps its previous size without
//! descending. Parents along a dirty path always re-arrange their children,
//! so a size change of a child reaches the ancestors that depend on it.

pub mod block;
pub mod engine;
pub mod flex;
pub mod resolve;

pub use engine::{reflow, LayoutEngine, LayoutReport};
pub use resolve::ResolvedBox;

/// How the width of a box is decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WidthMode {
    /// `auto` fills the containing block (block-level boxes).
    Fill,
    /// `auto` is the max-content width capped by the containing block
    /// (inline-blocks, positioned boxes, flex basis).
    ShrinkToFit,
    /// The border-box width was decided by the parent.
    Forced(f32),
}

/// The constraints a parent lays a child out with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInput {
    /// Containing block width (the parent's content width).
    pub cb_width: f32,
    /// Containing block height, when definite.
    pub cb_height: Option<f32>,
    pub width: WidthMode,
    /// Border-box height decided by the parent (flex stretch or main size).
    pub forced_height: Option<f32>,
}

impl LayoutInput {
    pub fn fill(cb_width: f32, cb_height: Option<f32>) -> Self {
        Self { cb_width, cb_height, width: WidthMode::Fill, forced_height: None }
    }

    pub fn shrink_to_fit(cb_width: f32, cb_height: Option<f32>) -> Self {
        Self { cb_width, cb_height, width: WidthMode::ShrinkToFit, forced_height: None }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = WidthMode::Forced(width);
        self
    }

    pub fn with_height(mut self, height: Option<f32>) -> Self {
        self.forced_height = height;
        self
    }
}
