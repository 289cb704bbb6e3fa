//! Core geometry types: Offset, Size, Rect, RectF, Edges, Corners.
//!
//! Pixel-space rectangles ([`Rect`]) use `i32` coordinates and half-open
//! intervals `[x, x + width)` so adjacent tiles never share a pixel row or
//! column. Layout works in `f32` ([`RectF`], [`SizeF`]) and snaps to pixels
//! with [`RectF::to_rect`].

use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D displacement or position in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in pixels (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Total area (width * height).
    #[inline]
    pub const fn area(self) -> i32 {
        self.width * self.height
    }

    /// Convert to a [`Rect`] positioned at the origin.
    #[inline]
    pub const fn to_rect(self) -> Rect {
        Rect { x: 0, y: 0, width: self.width, height: self.height }
    }

    /// Convert to layout space.
    #[inline]
    pub fn to_f32(self) -> SizeF {
        SizeF::new(self.width as f32, self.height as f32)
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// A pixel rectangle defined by position and size.
///
/// All edge tests are half-open: a rect covers columns `x..right()` and rows
/// `y..bottom()`. A rect with a non-positive width or height is empty.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// An empty rect at the origin.
    pub const EMPTY: Rect = Rect { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new rect.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rect from its edges. Inverted edges produce an empty rect.
    #[inline]
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let w = right - left;
        let h = bottom - top;
        Rect {
            x: left,
            y: top,
            width: if w > 0 { w } else { 0 },
            height: if h > 0 { h } else { 0 },
        }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The top-left corner as an [`Offset`].
    #[inline]
    pub const fn offset(self) -> Offset {
        Offset { x: self.x, y: self.y }
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Whether the rect covers no pixel.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the pixel (x, y) lies inside this rect.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` is entirely contained within this rect.
    ///
    /// An empty `other` is contained in everything.
    #[inline]
    pub const fn contains_rect(self, other: Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether `other` overlaps this rect (non-zero intersection area).
    #[inline]
    pub const fn overlaps(self, other: Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Compute the intersection of two rects.
    ///
    /// Returns [`Rect::EMPTY`] if the rects do not overlap.
    #[inline]
    pub const fn intersection(self, other: Rect) -> Rect {
        let x1 = if self.x > other.x { self.x } else { other.x };
        let y1 = if self.y > other.y { self.y } else { other.y };

        let sr = self.right();
        let or = other.right();
        let x2 = if sr < or { sr } else { or };

        let sb = self.bottom();
        let ob = other.bottom();
        let y2 = if sb < ob { sb } else { ob };

        let w = x2 - x1;
        let h = y2 - y1;

        if w <= 0 || h <= 0 {
            Rect::EMPTY
        } else {
            Rect { x: x1, y: y1, width: w, height: h }
        }
    }

    /// Compute the smallest rect containing both `self` and `other`.
    ///
    /// Empty operands are ignored.
    #[inline]
    pub const fn union(self, other: Rect) -> Rect {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        let x1 = if self.x < other.x { self.x } else { other.x };
        let y1 = if self.y < other.y { self.y } else { other.y };

        let sr = self.right();
        let or = other.right();
        let x2 = if sr > or { sr } else { or };

        let sb = self.bottom();
        let ob = other.bottom();
        let y2 = if sb > ob { sb } else { ob };

        Rect { x: x1, y: y1, width: x2 - x1, height: y2 - y1 }
    }

    /// Translate the rect by an [`Offset`].
    #[inline]
    pub const fn translate(self, offset: Offset) -> Rect {
        Rect { x: self.x + offset.x, y: self.y + offset.y, width: self.width, height: self.height }
    }

    /// Expand the rect outward by `amount` on every side.
    #[inline]
    pub const fn inflate(self, amount: i32) -> Rect {
        Rect::from_edges(
            self.x - amount,
            self.y - amount,
            self.right() + amount,
            self.bottom() + amount,
        )
    }

    /// Remove `cut` from this rect, returning the remaining area as up to
    /// four non-overlapping rects (top band, bottom band, left and right
    /// slices of the middle band).
    ///
    /// If the rects do not overlap, `self` is returned unchanged.
    pub fn subtract(self, cut: Rect) -> Vec<Rect> {
        if self.is_empty() {
            return Vec::new();
        }
        let inner = self.intersection(cut);
        if inner.is_empty() {
            return vec![self];
        }
        let mut pieces = Vec::with_capacity(4);
        let top = Rect::from_edges(self.x, self.y, self.right(), inner.y);
        let bottom = Rect::from_edges(self.x, inner.bottom(), self.right(), self.bottom());
        let left = Rect::from_edges(self.x, inner.y, inner.x, inner.bottom());
        let right = Rect::from_edges(inner.right(), inner.y, self.right(), inner.bottom());
        for piece in [top, bottom, left, right] {
            if !piece.is_empty() {
                pieces.push(piece);
            }
        }
        pieces
    }
}

// ---------------------------------------------------------------------------
// Layout space
// ---------------------------------------------------------------------------

/// A size in layout units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SizeF {
    pub width: f32,
    pub height: f32,
}

impl SizeF {
    pub const ZERO: SizeF = SizeF { width: 0.0, height: 0.0 };

    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A rectangle in layout units.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub const ZERO: RectF = RectF { x: 0.0, y: 0.0, width: 0.0, height: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn size(self) -> SizeF {
        SizeF::new(self.width, self.height)
    }

    /// Shrink by `edges`, clamping the size at zero.
    pub fn deflate(self, edges: Edges<f32>) -> RectF {
        RectF {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }

    /// Grow by `edges`.
    pub fn inflate(self, edges: Edges<f32>) -> RectF {
        RectF {
            x: self.x - edges.left,
            y: self.y - edges.top,
            width: self.width + edges.horizontal(),
            height: self.height + edges.vertical(),
        }
    }

    /// Snap to the pixel grid by rounding each edge independently, so two
    /// boxes sharing an edge in layout space share it in pixel space too.
    pub fn to_rect(self) -> Rect {
        let left = self.x.round() as i32;
        let top = self.y.round() as i32;
        let right = (self.x + self.width).round() as i32;
        let bottom = (self.y + self.height).round() as i32;
        Rect::from_edges(left, top, right, bottom)
    }
}

// ---------------------------------------------------------------------------
// Edges / Corners
// ---------------------------------------------------------------------------

/// A value for each side of a box: margin, border width, padding.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Edges<T> {
    pub top: T,
    pub right: T,
    pub bottom: T,
    pub left: T,
}

impl<T: Copy> Edges<T> {
    /// Create edges with explicit values for each side.
    #[inline]
    pub const fn new(top: T, right: T, bottom: T, left: T) -> Self {
        Self { top, right, bottom, left }
    }

    /// All four sides set to the same value.
    #[inline]
    pub const fn all(value: T) -> Self {
        Self { top: value, right: value, bottom: value, left: value }
    }

    /// Apply `f` to every side.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> Edges<U> {
        Edges {
            top: f(self.top),
            right: f(self.right),
            bottom: f(self.bottom),
            left: f(self.left),
        }
    }
}

impl Edges<f32> {
    pub const ZERO: Edges<f32> = Edges { top: 0.0, right: 0.0, bottom: 0.0, left: 0.0 };

    /// Total horizontal extent: `left + right`.
    #[inline]
    pub fn horizontal(self) -> f32 {
        self.left + self.right
    }

    /// Total vertical extent: `top + bottom`.
    #[inline]
    pub fn vertical(self) -> f32 {
        self.top + self.bottom
    }
}

impl Add for Edges<f32> {
    type Output = Edges<f32>;
    #[inline]
    fn add(self, rhs: Edges<f32>) -> Edges<f32> {
        Edges {
            top: self.top + rhs.top,
            right: self.right + rhs.right,
            bottom: self.bottom + rhs.bottom,
            left: self.left + rhs.left,
        }
    }
}

/// A value for each corner of a box, clockwise from the top-left.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Corners<T> {
    pub top_left: T,
    pub top_right: T,
    pub bottom_right: T,
    pub bottom_left: T,
}

impl<T: Copy> Corners<T> {
    #[inline]
    pub const fn all(value: T) -> Self {
        Self { top_left: value, top_right: value, bottom_right: value, bottom_left: value }
    }
}

impl Corners<f32> {
    /// Whether every radius is zero.
    pub fn is_square(&self) -> bool {
        self.top_left <= 0.0
            && self.top_right <= 0.0
            && self.bottom_right <= 0.0
            && self.bottom_left <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Rect
    // -----------------------------------------------------------------------

    #[test]
    fn rect_edges_are_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(10, 10));
        assert!(r.contains(14, 14));
        assert!(!r.contains(15, 14));
        assert!(!r.contains(14, 15));
    }

    #[test]
    fn adjacent_rects_do_not_overlap() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert!(!a.overlaps(b));
        assert!(a.intersection(b).is_empty());
    }

    #[test]
    fn intersection_of_overlapping() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(b), Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn union_ignores_empty() {
        let a = Rect::new(3, 4, 5, 6);
        assert_eq!(a.union(Rect::EMPTY), a);
        assert_eq!(Rect::EMPTY.union(a), a);
        assert_eq!(a.union(Rect::new(0, 0, 1, 1)), Rect::new(0, 0, 8, 10));
    }

    #[test]
    fn contains_rect() {
        let outer = Rect::new(0, 0, 100, 100);
        assert!(outer.contains_rect(Rect::new(0, 0, 100, 100)));
        assert!(outer.contains_rect(Rect::new(10, 10, 5, 5)));
        assert!(!outer.contains_rect(Rect::new(90, 90, 20, 5)));
        assert!(outer.contains_rect(Rect::EMPTY));
    }

    #[test]
    fn from_edges_clamps_inverted() {
        assert!(Rect::from_edges(10, 10, 5, 20).is_empty());
    }

    #[test]
    fn subtract_center_yields_four_pieces() {
        let r = Rect::new(0, 0, 30, 30);
        let pieces = r.subtract(Rect::new(10, 10, 10, 10));
        assert_eq!(pieces.len(), 4);
        let area: i32 = pieces.iter().map(|p| p.size().area()).sum();
        assert_eq!(area, 900 - 100);
        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                assert!(!a.overlaps(*b));
            }
            assert!(!a.overlaps(Rect::new(10, 10, 10, 10)));
        }
    }

    #[test]
    fn subtract_disjoint_is_identity() {
        let r = Rect::new(0, 0, 10, 10);
        assert_eq!(r.subtract(Rect::new(20, 20, 5, 5)), vec![r]);
    }

    #[test]
    fn subtract_covering_is_empty() {
        let r = Rect::new(5, 5, 10, 10);
        assert!(r.subtract(Rect::new(0, 0, 50, 50)).is_empty());
    }

    // -----------------------------------------------------------------------
    // RectF
    // -----------------------------------------------------------------------

    #[test]
    fn snapping_shares_edges() {
        let a = RectF::new(0.0, 0.0, 10.4, 5.0);
        let b = RectF::new(10.4, 0.0, 10.4, 5.0);
        assert_eq!(a.to_rect().right(), b.to_rect().x);
    }

    #[test]
    fn deflate_clamps_to_zero() {
        let r = RectF::new(0.0, 0.0, 4.0, 4.0).deflate(Edges::all(3.0));
        assert_eq!(r.size(), SizeF::ZERO);
    }

    #[test]
    fn edges_totals() {
        let e = Edges::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(e.horizontal(), 6.0);
        assert_eq!(e.vertical(), 4.0);
    }
}
