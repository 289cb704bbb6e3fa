//! # tessera
//!
//! The core of a retained-mode UI toolkit: a widget tree styled by CSS-like
//! rules, laid out incrementally and painted through dirty rectangles onto
//! an in-memory pixel buffer.
//!
//! Every mutation only queues work on the affected widgets. Once per frame
//! [`UiContext::drain`](context::UiContext::drain) recomputes the styles
//! that may have changed, re-lays the dirty parts of the tree, repaints
//! exactly the regions that changed and blits them to a [`render::Surface`].
//!
//! ## Core Systems
//!
//! - **[`css`]**: tokenizer, parser, property table, rule store, cascade
//! - **[`tree`]**: slotmap-backed widget arena, id registry, traversal, hit testing, invalidation
//! - **[`task`]**: per-widget pending task set
//! - **[`layout`]**: box model, block and inline-block flow, flex flow, positioned widgets
//! - **[`render`]**: canvas, background/border/shadow painters, dirty-rect compositor
//! - **[`widget`]** / **[`widgets`]**: widget kinds and the built-in `text` kind
//! - **[`context`]**: [`UiContext`](context::UiContext), the owner of all UI state
//! - **[`event`]**: normalized input and pointer state
//! - **[`app`]**: settings, the tick and the async run loop
//! - **[`font`]**: the text measurement and rasterization boundary
//! - **[`geometry`]**: integer and float rects, sizes, offsets, edges

// Foundation
pub mod geometry;

// Core systems
pub mod css;
pub mod tree;
pub mod task;
pub mod layout;

// Widget system
pub mod widget;
pub mod widgets;

// Rendering
pub mod font;
pub mod render;

// Application
pub mod context;
pub mod event;
pub mod app;

// Test fixtures
pub mod testing;

pub use app::{App, AppError, AppMessage, Settings};
pub use context::{FrameReport, UiContext};
pub use tree::{TreeError, WidgetId, WidgetTree};
