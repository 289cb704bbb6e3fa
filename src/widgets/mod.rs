//! Built-in widget kinds.

pub mod text;

pub use text::TextKind;

use std::sync::Arc;

use crate::widget::WidgetKind;

/// Every built-in kind, for registering in one go.
pub fn builtin_kinds() -> Vec<Arc<dyn WidgetKind>> {
    vec![Arc::new(TextKind)]
}
