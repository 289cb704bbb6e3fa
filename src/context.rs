//! The UI context: single owner of every piece of UI state.
//!
//! [`UiContext`] holds the widget tree, the rule store, the custom property
//! registry, the widget kinds, the image store, the font backend and the
//! compositor. All mutation goes through it (or through the tree it owns)
//! and only queues tasks; [`UiContext::drain`] then brings style, layout
//! and pixels up to date in five phases:
//!
//! 1. **Style**: pre-order over dirty subtrees. Each widget with a pending
//!    style update gets a new computed style, diffed against the old one
//!    to decide whether it needs a reflow, a repaint, or a restyle of its
//!    children.
//! 2. **Reflow**: the layout engine re-lays every dirty path and
//!    invalidates boxes that moved.
//! 3. **Repaint**: widgets with a pending repaint invalidate their whole
//!    canvas box.
//! 4. **Refresh**: the root's invalid region is split into disjoint rects,
//!    composited and blitted to the surface.
//! 5. **Clear**: task bits are reset and destroyed widgets are freed.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::app::Settings;
use crate::css::cascade::compute_style;
use crate::css::computed::{ComputedStyle, StyleDiff};
use crate::css::declaration::StyleDeclaration;
use crate::css::parser::ParseError;
use crate::css::properties::{PropertyError, PropertyRegistry};
use crate::css::specificity::Origin;
use crate::css::stylesheet::RuleStore;
use crate::css::values::Color;
use crate::event::{InputEvent, InputState};
use crate::font::{FontBackend, NullFont};
use crate::geometry::{Offset, Rect, Size};
use crate::layout;
use crate::render::{Canvas, Compositor, ImageQuality, ImageStore, PaintContext, Surface, SurfaceError};
use crate::task::{TaskKind, TaskSet};
use crate::tree::{LayoutBox, TreeError, WidgetId, WidgetTree};
use crate::widget::{KindRegistry, WidgetKind};
use crate::widgets::builtin_kinds;

/// Type name of the root widget.
pub const ROOT_TYPE: &str = "root";

/// Overlay used by paint flashing.
const FLASH_COLOR: Color = Color::rgba(255, 0, 255, 255);
const FLASH_AMOUNT: u8 = 96;

// ---------------------------------------------------------------------------
// FrameReport
// ---------------------------------------------------------------------------

/// What one drain did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Rects recomposited and sent to the surface, in root pixels.
    pub dirty_rects: Vec<Rect>,
    /// Widgets whose style was recomputed.
    pub styled: usize,
    /// Widgets whose box was recomputed.
    pub reflowed: usize,
    /// Destroyed widgets freed.
    pub destroyed: usize,
    /// Set by [`App::tick`](crate::app::App::tick) when queued work did not
    /// fit the frame budget.
    pub over_budget: bool,
}

// ---------------------------------------------------------------------------
// UiContext
// ---------------------------------------------------------------------------

/// Owner of the widget tree and everything needed to style, lay out and
/// paint it.
pub struct UiContext {
    tree: WidgetTree,
    rules: RuleStore,
    properties: PropertyRegistry,
    kinds: KindRegistry,
    images: ImageStore,
    fonts: Arc<dyn FontBackend>,
    compositor: Compositor,
    input: InputState,
    viewport: Size,
    quality: ImageQuality,
    paint_flashing: bool,
    generation: u64,
}

impl std::fmt::Debug for UiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiContext")
            .field("widgets", &self.tree.len())
            .field("rules", &self.rules.len())
            .field("kinds", &self.kinds)
            .field("viewport", &self.viewport)
            .field("compositor", &self.compositor)
            .finish()
    }
}

impl UiContext {
    /// A context with an empty root widget filling a `width` x `height`
    /// viewport, the built-in kinds registered and no font backend.
    pub fn new(width: i32, height: i32) -> Self {
        let viewport = Size::new(width.max(0), height.max(0));
        let mut tree = WidgetTree::new(ROOT_TYPE);
        let root = tree.root();
        tree.add_tasks(root, TaskSet::ATTACH);
        let mut ctx = Self {
            tree,
            rules: RuleStore::new(),
            properties: PropertyRegistry::new(),
            kinds: KindRegistry::new(),
            images: ImageStore::new(),
            fonts: Arc::new(NullFont),
            compositor: Compositor::new(viewport),
            input: InputState::new(),
            viewport,
            quality: ImageQuality::default(),
            paint_flashing: false,
            generation: 0,
        };
        for kind in builtin_kinds() {
            if let Err(err) = ctx.register_kind(kind) {
                warn!(error = %err, "built-in kind has invalid default css");
            }
        }
        ctx
    }

    /// Use `fonts` for text measurement and rendering.
    pub fn with_font_backend(mut self, fonts: Arc<dyn FontBackend>) -> Self {
        self.set_font_backend(fonts);
        self
    }

    /// Swap the font backend. Every widget is laid out and painted again.
    pub fn set_font_backend(&mut self, fonts: Arc<dyn FontBackend>) {
        self.fonts = fonts;
        let root = self.tree.root();
        self.tree.add_task_subtree(root, TaskSet::REFLOW | TaskSet::REPAINT);
    }

    // -- accessors -----------------------------------------------------------

    pub fn tree(&self) -> &WidgetTree {
        &self.tree
    }

    /// Direct access to the tree, for the attribute setters it provides.
    /// Mutations made this way queue tasks like any other.
    pub fn tree_mut(&mut self) -> &mut WidgetTree {
        &mut self.tree
    }

    pub fn root(&self) -> WidgetId {
        self.tree.root()
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn properties(&self) -> &PropertyRegistry {
        &self.properties
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// The retained frame, as of the last drain.
    pub fn canvas(&self) -> &Canvas {
        self.compositor.frame()
    }

    pub fn computed_style(&self, id: WidgetId) -> Option<&ComputedStyle> {
        self.tree.get(id)?.computed_style().map(|s| &**s)
    }

    pub fn layout(&self, id: WidgetId) -> Option<&LayoutBox> {
        self.tree.get(id).map(|w| w.layout())
    }

    /// Border box of `id` in root pixels.
    pub fn absolute_rect(&self, id: WidgetId) -> Rect {
        self.tree.absolute_rect(id)
    }

    // -- structure -----------------------------------------------------------

    /// Allocate an unattached widget and run its kind's `init` hook.
    pub fn create(&mut self, type_name: &str) -> WidgetId {
        let id = self.tree.create(type_name);
        if let Some(kind) = self.kinds.get(type_name).cloned() {
            kind.init(&mut self.tree, id);
        }
        id
    }

    pub fn append(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        self.tree.append(parent, child)
    }

    pub fn prepend(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), TreeError> {
        self.tree.prepend(parent, child)
    }

    pub fn unlink(&mut self, id: WidgetId) -> Result<WidgetId, TreeError> {
        self.tree.unlink(id)
    }

    /// Destroy `id` and its subtree, bottom-up. Input state pointing at a
    /// doomed widget is dropped first, then each kind's `destroy` hook runs
    /// while the widget data is still readable.
    pub fn destroy(&mut self, id: WidgetId) -> Result<Vec<WidgetId>, TreeError> {
        self.tree.live(id)?;
        if id == self.tree.root() {
            return Err(TreeError::RootWidget);
        }
        for w in self.tree.post_order(id) {
            self.input.forget(w);
            let kind = self.tree.get(w).and_then(|widget| self.kinds.get(widget.type_name()).cloned());
            if let Some(kind) = kind {
                kind.destroy(&mut self.tree, w);
            }
        }
        self.tree.destroy(id)
    }

    // -- attributes ----------------------------------------------------------

    pub fn set_id(&mut self, id: WidgetId, name: Option<&str>) -> Result<(), TreeError> {
        self.tree.set_id(id, name)
    }

    pub fn add_class(&mut self, id: WidgetId, class: &str) -> Result<bool, TreeError> {
        self.tree.add_class(id, class)
    }

    pub fn remove_class(&mut self, id: WidgetId, class: &str) -> Result<bool, TreeError> {
        self.tree.remove_class(id, class)
    }

    pub fn set_classes(&mut self, id: WidgetId, classes: &str) -> Result<(), TreeError> {
        self.tree.set_classes(id, classes)
    }

    pub fn set_status(&mut self, id: WidgetId, status: &str, on: bool) -> Result<bool, TreeError> {
        self.tree.set_status(id, status, on)
    }

    pub fn set_text(&mut self, id: WidgetId, text: &str) -> Result<(), TreeError> {
        self.tree.set_text(id, text)
    }

    pub fn set_inline_style(&mut self, id: WidgetId, style: StyleDeclaration) -> Result<(), TreeError> {
        self.tree.set_inline_style(id, style)
    }

    /// Set one inline property from CSS text; an empty value removes it.
    pub fn set_style_property(&mut self, id: WidgetId, name: &str, value: &str) -> Result<(), TreeError> {
        self.tree.set_style_property(id, name, value)
    }

    pub fn set_attribute(&mut self, id: WidgetId, name: &str, value: &str) -> Result<(), TreeError> {
        self.tree.set_attribute(id, name, value)
    }

    // -- registration --------------------------------------------------------

    /// Register `declarations` under a comma-separated selector list at
    /// author origin. Every widget is restyled on the next drain.
    pub fn register_rule(&mut self, selector: &str, declarations: StyleDeclaration) -> Result<usize, ParseError> {
        let added = self.rules.register_rule(selector, declarations, Origin::Author)?;
        self.restyle_all();
        Ok(added)
    }

    /// Register every rule of a style sheet at author origin.
    pub fn load_css(&mut self, css: &str) -> Result<usize, ParseError> {
        let added = self.rules.load_css(css, Origin::Author)?;
        self.restyle_all();
        Ok(added)
    }

    pub fn register_property(&mut self, name: &str, initial: &str, inherited: bool) -> Result<(), PropertyError> {
        self.properties.register(name, initial, inherited)?;
        self.restyle_all();
        Ok(())
    }

    /// Register a widget kind and load its default style sheet at default
    /// origin. A kind registered under an existing type name replaces it.
    pub fn register_kind(&mut self, kind: Arc<dyn WidgetKind>) -> Result<(), ParseError> {
        let css = kind.default_css();
        if !css.trim().is_empty() {
            self.rules.load_css(css, Origin::Default)?;
        }
        if let Some(old) = self.kinds.register(kind) {
            debug!(kind = old.type_name(), "widget kind replaced");
        }
        self.restyle_all();
        Ok(())
    }

    /// Make `image` available to `background-image: url(name)`. Widgets
    /// already referring to `name` are repainted.
    pub fn register_image(&mut self, name: &str, image: Canvas) {
        self.images.insert(name, image);
        let root = self.tree.root();
        let users: Vec<WidgetId> = self
            .tree
            .descendants(root)
            .filter(|&w| {
                self.tree
                    .get(w)
                    .and_then(|widget| widget.computed_style())
                    .is_some_and(|s| s.background_image.as_deref() == Some(name))
            })
            .collect();
        for w in users {
            self.tree.add_task(w, TaskKind::Repaint);
        }
    }

    fn restyle_all(&mut self) {
        let root = self.tree.root();
        self.tree.add_task_subtree(root, TaskSet::STYLE);
    }

    // -- queries -------------------------------------------------------------

    pub fn find_by_id(&self, name: &str) -> Option<WidgetId> {
        self.tree.find_by_id(name)
    }

    /// Top-most visible widget at a point in root pixels.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<WidgetId> {
        self.tree.hit_test(self.tree.root(), x, y)
    }

    // -- environment ---------------------------------------------------------

    /// Change the viewport. The whole tree is reflowed against the new size
    /// and the whole surface repainted.
    pub fn resize(&mut self, width: i32, height: i32) {
        let size = Size::new(width.max(0), height.max(0));
        if size == self.viewport {
            return;
        }
        debug!(width = size.width, height = size.height, "viewport resized");
        self.viewport = size;
        self.compositor.resize(size);
        let root = self.tree.root();
        self.tree.add_task_subtree(root, TaskSet::REFLOW);
        self.tree.add_tasks(root, TaskSet::REPAINT);
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.compositor.set_threads(settings.parallel_rendering_threads);
        self.paint_flashing = settings.paint_flashing;
        if settings.image_quality != self.quality {
            self.quality = settings.image_quality;
            let root = self.tree.root();
            self.tree.add_tasks(root, TaskSet::REPAINT);
        }
    }

    /// Apply a normalized input event.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Resize { width, height } => self.resize(width, height),
            _ => self.input.handle(&mut self.tree, event),
        }
    }

    // -- drain ---------------------------------------------------------------

    /// Process every pending task and present the changed pixels.
    ///
    /// A surface error does not stop the frame: the canvas and the tree are
    /// fully updated, the rects that failed to blit are invalidated again
    /// for the next drain, and the first error is returned.
    pub fn drain<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<FrameReport, SurfaceError> {
        let root = self.tree.root();
        let dirty = self.tree.get(root).is_some_and(|w| w.is_subtree_dirty());
        if !dirty {
            let destroyed = self.tree.free_trash();
            return Ok(FrameReport { destroyed, ..FrameReport::default() });
        }

        let styled = self.style_phase();
        let layout = layout::reflow(&mut self.tree, &self.kinds, &*self.fonts, self.viewport.to_f32());
        self.repaint_phase();
        let (rects, result) = self.refresh_phase(surface);
        self.clear_phase();
        let destroyed = self.tree.free_trash();

        let failed = match &result {
            Ok(()) => Vec::new(),
            Err(_) => rects.clone(),
        };
        for rect in failed {
            let origin = self.tree.get(root).map(|w| w.layout().pixel_rect().offset()).unwrap_or_default();
            self.tree.invalidate(root, rect.translate(Offset::new(-origin.x, -origin.y)));
        }

        debug!(styled, reflowed = layout.reflowed, moved = layout.moved, dirty = rects.len(), destroyed, "frame drained");
        result.map(|()| FrameReport { dirty_rects: rects, styled, reflowed: layout.reflowed, destroyed, over_budget: false })
    }

    /// Widgets on dirty paths in pre-order, so parents are visited first.
    fn dirty_pre_order(&self, id: WidgetId, out: &mut Vec<WidgetId>) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.tree.get(current).is_some_and(|w| w.is_subtree_dirty()) {
                continue;
            }
            out.push(current);
            let children: Vec<WidgetId> = self.tree.children(current).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    fn style_phase(&mut self) -> usize {
        let mut styled = 0;
        let mut stack = vec![self.tree.root()];
        while let Some(id) = stack.pop() {
            let Some(widget) = self.tree.get(id) else { continue };
            if !widget.is_subtree_dirty() {
                continue;
            }
            if widget.tasks().contains(TaskSet::STYLE) && !widget.is_destroyed() {
                self.restyle(id);
                styled += 1;
            }
            // Children are read after the restyle, which may have queued them.
            let children: Vec<WidgetId> = self.tree.children(id).collect();
            stack.extend(children.into_iter().rev());
        }
        styled
    }

    fn restyle(&mut self, id: WidgetId) {
        let style = compute_style(&self.tree, &self.rules, &self.properties, id);
        let Some(widget) = self.tree.get(id) else { return };
        let previous = widget.computed_style().cloned();
        let diff = match &previous {
            Some(prev) => style.diff(prev, &self.properties),
            None => StyleDiff::ALL,
        };
        if diff.is_empty() {
            trace!(widget = ?id, "style unchanged");
            return;
        }
        let was_in_flow = widget.is_in_flow();
        let now_in_flow = style.is_in_flow();
        let parent = self.tree.parent(id);

        if let (Some(_), Some(parent)) = (&previous, parent) {
            let old_area = self.tree.canvas_rect_in_parent(id);
            self.tree.invalidate(parent, old_area);
        }
        self.generation += 1;
        if let Some(w) = self.tree.get_mut(id) {
            w.computed = Some(Arc::new(style));
            w.style_generation = self.generation;
        }
        trace!(widget = ?id, layout = diff.layout, paint = diff.paint, inherited = diff.inherited, "restyled");

        if diff.layout {
            self.tree.add_task(id, TaskKind::Reflow);
            if let (Some(parent), true) = (parent, was_in_flow || now_in_flow) {
                self.tree.add_task(parent, TaskKind::Reflow);
            }
        }
        self.tree.add_task(id, TaskKind::Repaint);
        if diff.inherited {
            let children: Vec<WidgetId> = self.tree.children(id).collect();
            for child in children {
                self.tree.add_task(child, TaskKind::StyleUpdate);
            }
        }
    }

    fn repaint_phase(&mut self) {
        let mut order = Vec::new();
        self.dirty_pre_order(self.tree.root(), &mut order);
        for id in order {
            if self.tree.get(id).is_some_and(|w| w.tasks().contains(TaskSet::REPAINT)) {
                self.tree.invalidate_all(id);
            }
        }
    }

    fn refresh_phase<S: Surface + ?Sized>(&mut self, surface: &mut S) -> (Vec<Rect>, Result<(), SurfaceError>) {
        let root = self.tree.root();
        let Some(widget) = self.tree.get_mut(root) else { return (Vec::new(), Ok(())) };
        let region = widget.invalid.take();
        let origin = widget.layout.pixel_rect().offset();
        let bounds = self.viewport.to_rect();
        let rects: Vec<Rect> = region
            .into_disjoint()
            .into_iter()
            .map(|r| r.translate(origin).intersection(bounds))
            .filter(|r| !r.is_empty())
            .collect();
        if rects.is_empty() {
            return (rects, Ok(()));
        }

        let ctx = PaintContext {
            fonts: &*self.fonts,
            images: &self.images,
            quality: self.quality,
            viewport: self.viewport.to_f32(),
        };
        self.compositor.render(&self.tree, &self.kinds, &ctx, &rects);

        let mut result = Ok(());
        for &rect in &rects {
            let mut tile = self.compositor.frame().crop(rect);
            if self.paint_flashing {
                let all = tile.bounds();
                tile.tint(all, FLASH_COLOR, FLASH_AMOUNT);
            }
            if let Err(err) = surface.blit(rect, &tile) {
                warn!(error = %err, ?rect, "blit failed");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        if let Err(err) = surface.present() {
            warn!(error = %err, "present failed");
            if result.is_ok() {
                result = Err(err);
            }
        }
        (rects, result)
    }

    fn clear_phase(&mut self) {
        let mut order = Vec::new();
        self.dirty_pre_order(self.tree.root(), &mut order);
        for id in order {
            if let Some(w) = self.tree.get_mut(id) {
                w.tasks = TaskSet::empty();
                w.subtree_dirty = false;
                w.invalid.clear();
            }
        }
    }
}
