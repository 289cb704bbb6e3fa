//! Dirty-rect compositing.
//!
//! The `Compositor` owns the retained frame canvas. Each refresh hands it a
//! list of disjoint dirty rects in root pixel coordinates. Every rect is
//! rendered into its own tile by walking the tree back to front, clipped to
//! the rect, and the tiles are copied into the frame. With more than one
//! rendering thread the tiles are rendered on a rayon pool; tiles never
//! share pixels, so the frame copy needs no locking.

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::background::paint_background;
use super::border::paint_border;
use super::canvas::{Canvas, ImageQuality, PaintTarget};
use super::dirty::is_disjoint;
use super::image::ImageStore;
use super::shadow::{paint_inset_shadow, paint_outset_shadow};
use crate::css::values::{Display, Visibility};
use crate::font::FontBackend;
use crate::geometry::{Offset, Rect, Size, SizeF};
use crate::tree::{WidgetId, WidgetTree};
use crate::widget::KindRegistry;

// ---------------------------------------------------------------------------
// PaintContext
// ---------------------------------------------------------------------------

/// Read-only services available while painting.
#[derive(Clone, Copy)]
pub struct PaintContext<'a> {
    pub fonts: &'a dyn FontBackend,
    pub images: &'a ImageStore,
    pub quality: ImageQuality,
    pub viewport: SizeF,
}

// ---------------------------------------------------------------------------
// Compositor
// ---------------------------------------------------------------------------

/// Owns the frame canvas and the optional repaint worker pool.
pub struct Compositor {
    frame: Canvas,
    pool: Option<rayon::ThreadPool>,
    threads: usize,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("size", &self.frame.size())
            .field("threads", &self.threads)
            .finish()
    }
}

impl Compositor {
    /// A compositor with a transparent frame of `size`, rendering on the
    /// calling thread.
    pub fn new(size: Size) -> Self {
        Self { frame: Canvas::new(size.width, size.height), pool: None, threads: 1 }
    }

    pub fn frame(&self) -> &Canvas {
        &self.frame
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Resize the frame. The content is kept where it still fits.
    pub fn resize(&mut self, size: Size) {
        if size == self.frame.size() {
            return;
        }
        let mut frame = Canvas::new(size.width, size.height);
        frame.copy_from(&self.frame, self.frame.bounds(), Offset::default());
        self.frame = frame;
    }

    /// Use `threads` rendering threads. One (or zero) renders inline.
    pub fn set_threads(&mut self, threads: usize) {
        let threads = threads.max(1);
        if threads == self.threads {
            return;
        }
        self.pool = None;
        self.threads = 1;
        if threads > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => {
                    self.pool = Some(pool);
                    self.threads = threads;
                }
                Err(err) => warn!(error = %err, threads, "failed to build repaint pool, rendering inline"),
            }
        }
    }

    /// Repaint `rects` (root pixels, pairwise disjoint) into the frame.
    pub fn render(
        &mut self,
        tree: &WidgetTree,
        kinds: &KindRegistry,
        ctx: &PaintContext<'_>,
        rects: &[Rect],
    ) {
        debug_assert!(is_disjoint(rects), "dirty rects overlap: {rects:?}");
        let bounds = self.frame.bounds();
        let rects: Vec<Rect> = rects.iter().map(|r| r.intersection(bounds)).filter(|r| !r.is_empty()).collect();
        if rects.is_empty() {
            return;
        }

        let tiles: Vec<(Rect, Canvas)> = match &self.pool {
            Some(pool) if rects.len() > 1 => pool.install(|| {
                rects.par_iter().map(|&rect| (rect, render_tile(tree, kinds, ctx, rect))).collect()
            }),
            _ => rects.iter().map(|&rect| (rect, render_tile(tree, kinds, ctx, rect))).collect(),
        };
        for (rect, tile) in &tiles {
            self.frame.copy_from(tile, tile.bounds(), rect.offset());
        }
        debug!(tiles = tiles.len(), threads = self.threads, "composited dirty rects");
    }
}

/// Render the whole tree clipped to `rect` into a `rect`-sized canvas.
pub fn render_tile(tree: &WidgetTree, kinds: &KindRegistry, ctx: &PaintContext<'_>, rect: Rect) -> Canvas {
    let mut tile = Canvas::new(rect.width, rect.height);
    let clip = tile.bounds();
    let shift = Offset::new(-rect.x, -rect.y);
    paint_widget(tree, kinds, ctx, tree.root(), shift, &mut tile, clip);
    tile
}

/// Paint `id` and its subtree. `parent_origin` is where the parent's
/// border-box origin lands on `canvas`; `clip` is in canvas pixels.
pub fn paint_widget(
    tree: &WidgetTree,
    kinds: &KindRegistry,
    ctx: &PaintContext<'_>,
    id: WidgetId,
    parent_origin: Offset,
    canvas: &mut Canvas,
    clip: Rect,
) {
    let Ok(widget) = tree.live(id) else { return };
    let Some(style) = widget.computed_style() else { return };
    if style.display == Display::None || style.opacity <= 0.0 {
        return;
    }
    let origin = parent_origin + widget.layout().pixel_rect().offset();
    let clip = clip.intersection(widget.local_canvas_rect().translate(origin));
    if clip.is_empty() {
        return;
    }

    if style.opacity < 1.0 {
        let mut layer = Canvas::new(clip.width, clip.height);
        let layer_origin = Offset::new(parent_origin.x - clip.x, parent_origin.y - clip.y);
        let layer_clip = layer.bounds();
        paint_contents(tree, kinds, ctx, id, layer_origin, &mut layer, layer_clip);
        let alpha = (style.opacity * 255.0).round() as u8;
        canvas.blend_from(&layer, layer.bounds(), clip.offset(), alpha);
    } else {
        paint_contents(tree, kinds, ctx, id, parent_origin, canvas, clip);
    }
}

fn paint_contents(
    tree: &WidgetTree,
    kinds: &KindRegistry,
    ctx: &PaintContext<'_>,
    id: WidgetId,
    parent_origin: Offset,
    canvas: &mut Canvas,
    clip: Rect,
) {
    let Some(widget) = tree.get(id) else { return };
    let Some(style) = widget.computed_style() else { return };
    let origin = parent_origin + widget.layout().pixel_rect().offset();

    if style.visibility == Visibility::Visible {
        trace!(widget = ?id, "paint");
        let border_box = widget.layout().pixel_rect().size().to_rect();
        let mut target = PaintTarget { canvas: &mut *canvas, origin, clip };
        if style.is_paintable() {
            paint_outset_shadow(&mut target, border_box, style);
            paint_background(&mut target, border_box, style, ctx.images, ctx.quality, ctx.viewport);
            paint_inset_shadow(&mut target, border_box, style);
            paint_border(&mut target, border_box, style);
        }
        if let Some(kind) = kinds.get(widget.type_name()) {
            let mut content = target.clipped(border_box);
            kind.paint(ctx, &mut content, widget, style);
        }
    }

    let child_clip = clip.intersection(widget.local_padding_rect().translate(origin));
    if child_clip.is_empty() {
        return;
    }
    for child in tree.paint_order(id) {
        paint_widget(tree, kinds, ctx, child, origin, canvas, child_clip);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::computed::ComputedStyle;
    use crate::css::values::{Color, Position};
    use crate::font::NullFont;
    use crate::geometry::RectF;
    use std::sync::Arc;

    struct Scene {
        tree: WidgetTree,
        kinds: KindRegistry,
        images: ImageStore,
    }

    impl Scene {
        fn new() -> Self {
            let mut tree = WidgetTree::new("root");
            let root = tree.root();
            set(&mut tree, root, RectF::new(0.0, 0.0, 100.0, 100.0), |s| {
                s.background_color = Color::WHITE;
            });
            Self { tree, kinds: KindRegistry::new(), images: ImageStore::new() }
        }

        fn add(&mut self, parent: WidgetId, rect: RectF, f: impl FnOnce(&mut ComputedStyle)) -> WidgetId {
            let id = self.tree.create("box");
            assert!(self.tree.append(parent, id).is_ok());
            set(&mut self.tree, id, rect, f);
            id
        }

        fn render(&self, compositor: &mut Compositor, rects: &[Rect]) {
            let ctx = PaintContext {
                fonts: &NullFont,
                images: &self.images,
                quality: ImageQuality::Nearest,
                viewport: SizeF::new(100.0, 100.0),
            };
            compositor.render(&self.tree, &self.kinds, &ctx, rects);
        }
    }

    fn set(tree: &mut WidgetTree, id: WidgetId, rect: RectF, f: impl FnOnce(&mut ComputedStyle)) {
        let mut style = ComputedStyle::initial();
        f(&mut style);
        if let Some(w) = tree.get_mut(id) {
            w.layout.border_box = rect;
            w.computed = Some(Arc::new(style));
        }
    }

    const RED: Color = Color::rgb(255, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 255);

    // ── Painting ─────────────────────────────────────────────────────

    #[test]
    fn paints_background_back_to_front() {
        let mut scene = Scene::new();
        let root = scene.tree.root();
        scene.add(root, RectF::new(10.0, 10.0, 30.0, 30.0), |s| s.background_color = RED);
        scene.add(root, RectF::new(20.0, 20.0, 30.0, 30.0), |s| s.background_color = BLUE);
        let mut compositor = Compositor::new(Size::new(100, 100));
        scene.render(&mut compositor, &[Rect::new(0, 0, 100, 100)]);
        let frame = compositor.frame();
        assert_eq!(frame.pixel(5, 5), Some(Color::WHITE));
        assert_eq!(frame.pixel(15, 15), Some(RED));
        assert_eq!(frame.pixel(25, 25), Some(BLUE));
    }

    #[test]
    fn z_index_reorders_siblings() {
        let mut scene = Scene::new();
        let root = scene.tree.root();
        scene.add(root, RectF::new(10.0, 10.0, 30.0, 30.0), |s| {
            s.background_color = RED;
            s.z_index = 1;
            s.position = Position::Relative;
        });
        scene.add(root, RectF::new(20.0, 20.0, 30.0, 30.0), |s| s.background_color = BLUE);
        let mut compositor = Compositor::new(Size::new(100, 100));
        scene.render(&mut compositor, &[Rect::new(0, 0, 100, 100)]);
        assert_eq!(compositor.frame().pixel(25, 25), Some(RED));
    }

    #[test]
    fn children_clip_to_parent_padding_box() {
        let mut scene = Scene::new();
        let root = scene.tree.root();
        let panel = scene.add(root, RectF::new(10.0, 10.0, 20.0, 20.0), |_| {});
        scene.add(panel, RectF::new(10.0, 10.0, 40.0, 40.0), |s| s.background_color = RED);
        let mut compositor = Compositor::new(Size::new(100, 100));
        scene.render(&mut compositor, &[Rect::new(0, 0, 100, 100)]);
        assert_eq!(compositor.frame().pixel(25, 25), Some(RED));
        assert_eq!(compositor.frame().pixel(35, 35), Some(Color::WHITE));
    }

    #[test]
    fn only_dirty_rects_change() {
        let mut scene = Scene::new();
        let root = scene.tree.root();
        let w = scene.add(root, RectF::new(0.0, 0.0, 50.0, 50.0), |s| s.background_color = RED);
        let mut compositor = Compositor::new(Size::new(100, 100));
        scene.render(&mut compositor, &[Rect::new(0, 0, 100, 100)]);
        set(&mut scene.tree, w, RectF::new(0.0, 0.0, 50.0, 50.0), |s| s.background_color = BLUE);
        scene.render(&mut compositor, &[Rect::new(0, 0, 10, 10)]);
        assert_eq!(compositor.frame().pixel(5, 5), Some(BLUE));
        assert_eq!(compositor.frame().pixel(20, 20), Some(RED));
    }

    #[test]
    fn opacity_blends_subtree() {
        let mut scene = Scene::new();
        let root = scene.tree.root();
        let faded = scene.add(root, RectF::new(0.0, 0.0, 50.0, 50.0), |s| {
            s.opacity = 0.5;
        });
        scene.add(faded, RectF::new(0.0, 0.0, 50.0, 50.0), |s| s.background_color = Color::BLACK);
        let mut compositor = Compositor::new(Size::new(100, 100));
        scene.render(&mut compositor, &[Rect::new(0, 0, 100, 100)]);
        let Some(pixel) = compositor.frame().pixel(10, 10) else { panic!("out of frame") };
        assert!((120..=135).contains(&pixel.r), "{pixel:?}");
        assert_eq!(pixel.a, 255);
    }

    #[test]
    fn hidden_and_none_skip_painting() {
        let mut scene = Scene::new();
        let root = scene.tree.root();
        let hidden = scene.add(root, RectF::new(0.0, 0.0, 50.0, 50.0), |s| {
            s.background_color = RED;
            s.visibility = Visibility::Hidden;
        });
        scene.add(hidden, RectF::new(0.0, 0.0, 10.0, 10.0), |s| s.background_color = BLUE);
        scene.add(root, RectF::new(60.0, 60.0, 10.0, 10.0), |s| {
            s.background_color = RED;
            s.display = Display::None;
        });
        let mut compositor = Compositor::new(Size::new(100, 100));
        scene.render(&mut compositor, &[Rect::new(0, 0, 100, 100)]);
        assert_eq!(compositor.frame().pixel(5, 5), Some(BLUE));
        assert_eq!(compositor.frame().pixel(20, 20), Some(Color::WHITE));
        assert_eq!(compositor.frame().pixel(65, 65), Some(Color::WHITE));
    }

    // ── Parallel ─────────────────────────────────────────────────────

    #[test]
    fn parallel_tiles_match_inline_rendering() {
        let mut scene = Scene::new();
        let root = scene.tree.root();
        scene.add(root, RectF::new(5.0, 5.0, 80.0, 30.0), |s| s.background_color = RED);
        scene.add(root, RectF::new(30.0, 20.0, 40.0, 60.0), |s| s.background_color = BLUE);
        let rects = [Rect::new(0, 0, 50, 50), Rect::new(50, 0, 50, 50), Rect::new(0, 50, 100, 50)];

        let mut inline = Compositor::new(Size::new(100, 100));
        scene.render(&mut inline, &rects);
        let mut parallel = Compositor::new(Size::new(100, 100));
        parallel.set_threads(3);
        scene.render(&mut parallel, &rects);
        assert_eq!(inline.frame(), parallel.frame());
    }

    #[test]
    fn resize_keeps_content() {
        let mut compositor = Compositor::new(Size::new(10, 10));
        let scene = Scene::new();
        scene.render(&mut compositor, &[Rect::new(0, 0, 10, 10)]);
        compositor.resize(Size::new(20, 5));
        assert_eq!(compositor.frame().size(), Size::new(20, 5));
        assert_eq!(compositor.frame().pixel(9, 4), Some(Color::WHITE));
        assert_eq!(compositor.frame().pixel(15, 4), Some(Color::TRANSPARENT));
    }
}
