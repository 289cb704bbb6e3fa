//! Widget tree: slotmap arena, tree links, queries and invalidation.

pub mod arena;
pub mod attrs;
pub mod invalidate;
pub mod node;
pub mod query;

pub use arena::{Children, WidgetTree};
pub use node::{LayoutBox, Widget, WidgetId, WidgetState};
pub use query::Descendants;

/// Structural errors. The tree is left unchanged when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("widget handle is stale")]
    Stale,
    #[error("widget is destroyed")]
    Destroyed,
    #[error("widget already has a parent")]
    AlreadyAttached,
    #[error("attaching would make a widget its own ancestor")]
    Cycle,
    #[error("the root widget cannot be attached, unlinked or destroyed")]
    RootWidget,
    #[error("widget has no parent")]
    NotAttached,
}
