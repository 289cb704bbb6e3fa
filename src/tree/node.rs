//! Widget handle and per-widget data.

use std::collections::BTreeMap;
use std::sync::Arc;

use slotmap::new_key_type;

use crate::css::computed::ComputedStyle;
use crate::css::declaration::StyleDeclaration;
use crate::geometry::{Edges, Rect, RectF, SizeF};
use crate::layout::LayoutInput;
use crate::render::dirty::DirtyRegion;
use crate::task::TaskSet;

new_key_type! {
    /// Generation-checked handle to a widget. Copy, lightweight (u64).
    ///
    /// A handle whose widget was freed never resolves again, even if the
    /// slot is reused.
    pub struct WidgetId;
}

/// Whether a widget is usable or waiting to be freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Live,
    /// Destroyed but not freed yet; freed at the end of the next drain.
    Destroyed,
}

/// Geometry produced by the layout engine.
///
/// `border_box` is relative to the parent's border-box origin. Everything
/// else describes the box around it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutBox {
    pub border_box: RectF,
    pub margin: Edges<f32>,
    pub border: Edges<f32>,
    pub padding: Edges<f32>,
}

impl LayoutBox {
    /// Border box snapped to pixels, in the parent's coordinates.
    pub fn pixel_rect(&self) -> Rect {
        self.border_box.to_rect()
    }

    /// Padding box in widget-local layout units.
    pub fn padding_box(&self) -> RectF {
        RectF::new(0.0, 0.0, self.border_box.width, self.border_box.height).deflate(self.border)
    }

    /// Content box in widget-local layout units.
    pub fn content_box(&self) -> RectF {
        self.padding_box().deflate(self.padding)
    }

    /// Snap a widget-local layout rect to widget-local pixels, rounding in
    /// the parent's space so that edges agree with [`LayoutBox::pixel_rect`].
    pub fn local_pixels(&self, local: RectF) -> Rect {
        let origin = self.pixel_rect();
        let placed = RectF::new(
            local.x + self.border_box.x,
            local.y + self.border_box.y,
            local.width,
            local.height,
        );
        let snapped = placed.to_rect();
        Rect::new(snapped.x - origin.x, snapped.y - origin.y, snapped.width, snapped.height)
    }
}

/// Tree links, stored beside the widget data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Links {
    pub parent: Option<WidgetId>,
    pub first_child: Option<WidgetId>,
    pub last_child: Option<WidgetId>,
    pub prev: Option<WidgetId>,
    pub next: Option<WidgetId>,
}

/// Data associated with a single widget.
#[derive(Debug, Clone)]
pub struct Widget {
    pub(crate) type_name: String,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) statuses: Vec<String>,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) text: Option<String>,
    pub(crate) inline_style: StyleDeclaration,
    pub(crate) computed: Option<Arc<ComputedStyle>>,
    pub(crate) style_generation: u64,
    pub(crate) layout: LayoutBox,
    /// Max-content border-box size, cleared whenever a reflow is queued on
    /// the widget or a descendant.
    pub(crate) intrinsic: Option<SizeF>,
    /// Constraints of the last layout of this widget.
    pub(crate) layout_input: Option<LayoutInput>,
    pub(crate) tasks: TaskSet,
    pub(crate) subtree_dirty: bool,
    pub(crate) invalid: DirtyRegion,
    pub(crate) state: WidgetState,
}

impl Widget {
    pub(crate) fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: None,
            classes: Vec::new(),
            statuses: Vec::new(),
            attributes: BTreeMap::new(),
            text: None,
            inline_style: StyleDeclaration::new(),
            computed: None,
            style_generation: 0,
            layout: LayoutBox::default(),
            intrinsic: None,
            layout_input: None,
            tasks: TaskSet::empty(),
            subtree_dirty: false,
            invalid: DirtyRegion::new(),
            state: WidgetState::Live,
        }
    }

    /// Tag used by type selectors.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Status names, matched by pseudo-class selectors.
    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn inline_style(&self) -> &StyleDeclaration {
        &self.inline_style
    }

    /// The last cascade result, `None` until the first style pass.
    pub fn computed_style(&self) -> Option<&Arc<ComputedStyle>> {
        self.computed.as_ref()
    }

    /// Value of the global style generation counter when the computed
    /// style was stored.
    pub fn style_generation(&self) -> u64 {
        self.style_generation
    }

    pub fn layout(&self) -> &LayoutBox {
        &self.layout
    }

    pub fn tasks(&self) -> TaskSet {
        self.tasks
    }

    /// Whether this widget or a descendant has pending tasks.
    pub fn is_subtree_dirty(&self) -> bool {
        self.subtree_dirty
    }

    pub fn invalid_region(&self) -> &DirtyRegion {
        &self.invalid
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == WidgetState::Destroyed
    }

    /// Whether the widget takes part in its parent's flow. Widgets without
    /// a computed style yet count as in flow.
    pub(crate) fn is_in_flow(&self) -> bool {
        self.computed.as_ref().is_none_or(|s| s.is_in_flow())
    }

    /// Border box plus outset shadow, in widget-local pixels.
    pub fn local_canvas_rect(&self) -> Rect {
        let size = self.layout.pixel_rect().size();
        let extent = self.pixel_extent();
        Rect::from_edges(-extent.left, -extent.top, size.width + extent.right, size.height + extent.bottom)
    }

    /// Canvas box the widget would have with `layout`, in the parent's
    /// pixel coordinates.
    pub(crate) fn canvas_rect_with(&self, layout: &LayoutBox) -> Rect {
        let r = layout.pixel_rect();
        let extent = self.pixel_extent();
        Rect::from_edges(r.x - extent.left, r.y - extent.top, r.right() + extent.right, r.bottom() + extent.bottom)
    }

    fn pixel_extent(&self) -> Edges<i32> {
        self.computed
            .as_ref()
            .map(|s| s.paint_extent())
            .unwrap_or(Edges::ZERO)
            .map(|e| e.ceil() as i32)
    }

    /// Padding box in widget-local pixels: the clip applied to children.
    pub fn local_padding_rect(&self) -> Rect {
        self.layout.local_pixels(self.layout.padding_box())
    }
}
