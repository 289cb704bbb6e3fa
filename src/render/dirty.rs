//! Dirty region: the set of invalid rectangles of one widget.
//!
//! Rects are merged on insertion to keep the list short: a rect already
//! covered is dropped, rects the new one covers are removed, and two rects
//! whose right and bottom edges are each within [`MERGE_DISTANCE`] pixels of
//! each other are replaced by their union.

use crate::geometry::Rect;

/// Edge distance under which two dirty rects are merged.
pub const MERGE_DISTANCE: i32 = 10;

/// Invalid rects in widget-local pixel coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyRegion {
    rects: Vec<Rect>,
}

impl DirtyRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rect. Returns `false` when it was empty or already covered.
    pub fn add(&mut self, rect: Rect) -> bool {
        self.insert(rect).is_some()
    }

    /// Add a rect and return the stored rect that now covers it, which is
    /// larger than `rect` when a merge happened. `None` when `rect` was
    /// empty or already covered.
    pub fn insert(&mut self, rect: Rect) -> Option<Rect> {
        if rect.is_empty() || self.contains_rect(rect) {
            return None;
        }
        let mut rect = rect;
        loop {
            self.rects.retain(|r| !rect.contains_rect(*r));
            let near = self.rects.iter().position(|r| {
                (r.right() - rect.right()).abs() <= MERGE_DISTANCE
                    && (r.bottom() - rect.bottom()).abs() <= MERGE_DISTANCE
            });
            match near {
                Some(index) => {
                    let merged = self.rects.swap_remove(index).union(rect);
                    if let Some(&covering) = self.rects.iter().find(|r| r.contains_rect(merged)) {
                        return Some(covering);
                    }
                    rect = merged;
                }
                None => break,
            }
        }
        self.rects.push(rect);
        Some(rect)
    }

    /// Whether a single stored rect covers `rect` entirely.
    pub fn contains_rect(&self, rect: Rect) -> bool {
        self.rects.iter().any(|r| r.contains_rect(rect))
    }

    /// Whether any stored rect overlaps `rect`.
    pub fn overlaps(&self, rect: Rect) -> bool {
        self.rects.iter().any(|r| r.overlaps(rect))
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Bounding box of every stored rect.
    pub fn bounds(&self) -> Rect {
        self.rects.iter().fold(Rect::EMPTY, |acc, r| acc.union(*r))
    }

    /// Split the region into rects that do not overlap each other, covering
    /// exactly the same pixels.
    pub fn into_disjoint(self) -> Vec<Rect> {
        let mut out: Vec<Rect> = Vec::with_capacity(self.rects.len());
        for rect in self.rects {
            let mut pieces = vec![rect];
            for placed in &out {
                pieces = pieces.into_iter().flat_map(|p| p.subtract(*placed)).collect();
                if pieces.is_empty() {
                    break;
                }
            }
            out.extend(pieces);
        }
        out
    }

    pub fn take(&mut self) -> DirtyRegion {
        std::mem::take(self)
    }
}

/// Whether no two rects share a pixel.
pub fn is_disjoint(rects: &[Rect]) -> bool {
    rects
        .iter()
        .enumerate()
        .all(|(i, a)| rects[i + 1..].iter().all(|b| !a.overlaps(*b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(rects: &[Rect]) -> i32 {
        rects.iter().map(|r| r.width * r.height).sum()
    }

    // ── Merging ──────────────────────────────────────────────────────

    #[test]
    fn contained_rect_is_ignored() {
        let mut region = DirtyRegion::new();
        assert!(region.add(Rect::new(0, 0, 100, 100)));
        assert!(!region.add(Rect::new(10, 10, 5, 5)));
        assert_eq!(region.rects(), &[Rect::new(0, 0, 100, 100)]);
    }

    #[test]
    fn covering_rect_replaces_existing() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(10, 10, 5, 5));
        region.add(Rect::new(200, 200, 5, 5));
        region.add(Rect::new(0, 0, 50, 50));
        assert_eq!(region.rects(), &[Rect::new(200, 200, 5, 5), Rect::new(0, 0, 50, 50)]);
    }

    #[test]
    fn nearby_edges_merge() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0, 0, 50, 50));
        region.add(Rect::new(5, 45, 50, 8));
        assert_eq!(region.rects(), &[Rect::new(0, 0, 55, 53)]);
    }

    #[test]
    fn insert_reports_the_merged_rect() {
        let mut region = DirtyRegion::new();
        assert_eq!(region.insert(Rect::new(5, 5, 5, 5)), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(region.insert(Rect::new(0, 0, 3, 3)), Some(Rect::new(0, 0, 10, 10)));
        assert_eq!(region.insert(Rect::new(0, 4, 2, 1)), None);
    }

    #[test]
    fn distant_rects_stay_apart() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0, 0, 10, 10));
        region.add(Rect::new(100, 100, 10, 10));
        assert_eq!(region.rects().len(), 2);
        assert_eq!(region.bounds(), Rect::new(0, 0, 110, 110));
    }

    #[test]
    fn empty_rect_rejected() {
        let mut region = DirtyRegion::new();
        assert!(!region.add(Rect::new(5, 5, 0, 10)));
        assert!(region.is_empty());
    }

    // ── Disjoint split ───────────────────────────────────────────────

    #[test]
    fn disjoint_split_preserves_area() {
        let mut region = DirtyRegion::new();
        region.add(Rect::new(0, 0, 40, 40));
        region.add(Rect::new(20, 20, 60, 60));
        assert_eq!(region.rects().len(), 2);
        let pieces = region.into_disjoint();
        assert!(is_disjoint(&pieces));
        assert_eq!(area(&pieces), 40 * 40 + 60 * 60 - 20 * 20);
    }

    #[test]
    fn disjoint_check() {
        assert!(is_disjoint(&[Rect::new(0, 0, 10, 10), Rect::new(10, 0, 10, 10)]));
        assert!(!is_disjoint(&[Rect::new(0, 0, 10, 10), Rect::new(9, 9, 10, 10)]));
    }
}
