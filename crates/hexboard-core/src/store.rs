//! Segment storage with stable ids and deterministic draw order.

use crate::shapes::{Segment, SegmentId};
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Owns every segment on the canvas.
///
/// Segments are keyed by id; `order` keeps insertion (draw) order, back to
/// front.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    segments: HashMap<SegmentId, Segment>,
    order: Vec<SegmentId>,
}

impl ShapeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment on top of the draw order and return its id.
    pub fn insert(&mut self, segment: Segment) -> SegmentId {
        let id = segment.id();
        if self.segments.insert(id, segment).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Append several segments, returning their ids in order.
    pub fn extend<I>(&mut self, segments: I) -> Vec<SegmentId>
    where
        I: IntoIterator<Item = Segment>,
    {
        segments.into_iter().map(|s| self.insert(s)).collect()
    }

    /// Remove a segment by id.
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        let removed = self.segments.remove(&id)?;
        self.order.retain(|&other| other != id);
        Some(removed)
    }

    /// Remove the segment at a draw-order position.
    ///
    /// Every later segment moves down one position, so any positions held by
    /// the caller are stale afterwards. Ids are unaffected.
    pub fn remove_at(&mut self, index: usize) -> Option<Segment> {
        if index >= self.order.len() {
            return None;
        }
        let id = self.order.remove(index);
        self.segments.remove(&id)
    }

    /// Replace the whole content (used by document load). Every incoming
    /// segment gets a fresh id.
    pub fn replace_all<I>(&mut self, segments: I) -> Vec<SegmentId>
    where
        I: IntoIterator<Item = Segment>,
    {
        self.clear();
        segments
            .into_iter()
            .map(|mut s| {
                s.regenerate_id();
                self.insert(s)
            })
            .collect()
    }

    /// Remove every segment.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.order.clear();
    }

    /// Get a segment by id.
    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Get a mutable reference to a segment by id.
    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.segments.get_mut(&id)
    }

    /// Check whether a segment exists.
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains_key(&id)
    }

    /// Draw-order position of a segment.
    pub fn index_of(&self, id: SegmentId) -> Option<usize> {
        self.order.iter().position(|&other| other == id)
    }

    /// Ids in draw order (back to front).
    pub fn ids(&self) -> &[SegmentId] {
        &self.order
    }

    /// Segments in draw order (back to front).
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Segment> {
        self.order.iter().filter_map(|id| self.segments.get(id))
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Get the bounding box of all segments.
    pub fn bounds(&self) -> Option<Rect> {
        self.iter()
            .map(Segment::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Find the segment closest to `point` that lies strictly within
    /// `tolerance`.
    ///
    /// Segments are scanned front to back (reverse draw order); on equal
    /// distances the first one scanned, i.e. the topmost, wins.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> Option<SegmentId> {
        let mut best: Option<SegmentId> = None;
        let mut best_dist = tolerance;
        for segment in self.iter().rev() {
            let dist = segment.distance_to(point);
            if dist < best_dist {
                best_dist = dist;
                best = Some(segment.id());
            }
        }
        best
    }

    /// Find all segments within `tolerance` of a point, front to back.
    pub fn segments_at_point(&self, point: Point, tolerance: f64) -> Vec<SegmentId> {
        self.iter()
            .rev()
            .filter(|s| s.hit_test(point, tolerance))
            .map(Segment::id)
            .collect()
    }

    /// Find segments with at least one endpoint inside a rectangle, in draw
    /// order.
    pub fn segments_in_rect(&self, rect: Rect) -> Vec<SegmentId> {
        let rect = rect.abs();
        self.iter()
            .filter(|s| s.endpoints().iter().any(|&p| rect.contains(p)))
            .map(Segment::id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(ax: f64, ay: f64, bx: f64, by: f64) -> Segment {
        Segment::new(Point::new(ax, ay), Point::new(bx, by), "#00ff55")
    }

    #[test]
    fn test_store_creation() {
        let store = ShapeStore::new();
        assert!(store.is_empty());
        assert!(store.bounds().is_none());
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = ShapeStore::new();
        let id = store.insert(seg(0.0, 0.0, 10.0, 0.0));
        assert_eq!(store.len(), 1);
        assert!(store.get(id).is_some());
        assert_eq!(store.index_of(id), Some(0));
    }

    #[test]
    fn test_remove_keeps_other_ids() {
        let mut store = ShapeStore::new();
        let ids = store.extend([seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 2.0, 0.0), seg(2.0, 0.0, 3.0, 0.0)]);

        assert!(store.remove(ids[0]).is_some());
        assert!(store.get(ids[1]).is_some());
        assert!(store.get(ids[2]).is_some());
        assert_eq!(store.ids(), &[ids[1], ids[2]]);
        assert!(store.remove(ids[0]).is_none());
    }

    #[test]
    fn test_remove_at_shifts_positions() {
        let mut store = ShapeStore::new();
        let ids = store.extend([seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 2.0, 0.0), seg(2.0, 0.0, 3.0, 0.0)]);

        let removed = store.remove_at(1).unwrap();
        assert_eq!(removed.id(), ids[1]);
        assert_eq!(store.index_of(ids[2]), Some(1));
        assert!(store.remove_at(5).is_none());
    }

    #[test]
    fn test_replace_all_assigns_fresh_ids() {
        let mut store = ShapeStore::new();
        let old = store.insert(seg(0.0, 0.0, 1.0, 0.0));

        let incoming = seg(5.0, 5.0, 6.0, 6.0);
        let incoming_id = incoming.id();
        let ids = store.replace_all(vec![incoming]);

        assert_eq!(store.len(), 1);
        assert!(!store.contains(old));
        assert_ne!(ids[0], incoming_id);
        assert_eq!(store.get(ids[0]).unwrap().a, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_hit_test_boundary() {
        let mut store = ShapeStore::new();
        let id = store.insert(seg(0.0, 0.0, 100.0, 0.0));
        let tol = 6.0;

        assert_eq!(store.hit_test(Point::new(50.0, tol - 1.0), tol), Some(id));
        assert_eq!(store.hit_test(Point::new(50.0, tol + 1.0), tol), None);
    }

    #[test]
    fn test_hit_test_picks_closest() {
        let mut store = ShapeStore::new();
        let low = store.insert(seg(0.0, 0.0, 100.0, 0.0));
        let high = store.insert(seg(0.0, 10.0, 100.0, 10.0));

        assert_eq!(store.hit_test(Point::new(50.0, 3.0), 8.0), Some(low));
        assert_eq!(store.hit_test(Point::new(50.0, 7.0), 8.0), Some(high));
    }

    #[test]
    fn test_hit_test_tie_prefers_topmost() {
        let mut store = ShapeStore::new();
        let _bottom = store.insert(seg(0.0, 0.0, 100.0, 0.0));
        let top = store.insert(seg(0.0, 0.0, 100.0, 0.0));

        assert_eq!(store.hit_test(Point::new(50.0, 2.0), 5.0), Some(top));
    }

    #[test]
    fn test_segments_at_point_front_to_back() {
        let mut store = ShapeStore::new();
        let a = store.insert(seg(0.0, 0.0, 100.0, 0.0));
        let b = store.insert(seg(50.0, -50.0, 50.0, 50.0));

        assert_eq!(store.segments_at_point(Point::new(50.0, 0.0), 1.0), vec![b, a]);
    }

    #[test]
    fn test_segments_in_rect() {
        let mut store = ShapeStore::new();
        let inside = store.insert(seg(5.0, 5.0, 200.0, 200.0));
        let _outside = store.insert(seg(300.0, 300.0, 400.0, 400.0));

        assert_eq!(store.segments_in_rect(Rect::new(0.0, 0.0, 10.0, 10.0)), vec![inside]);
    }

    #[test]
    fn test_bounds() {
        let mut store = ShapeStore::new();
        store.insert(seg(0.0, 0.0, 10.0, 5.0));
        store.insert(seg(-5.0, 20.0, 3.0, 3.0));
        let bounds = store.bounds().unwrap();
        assert_eq!(bounds, Rect::new(-5.0, 0.0, 10.0, 20.0));
    }
}
