//! Line segment shape.

use super::{SegmentId, point_to_segment_dist};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A straight line segment with a stroke colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub(crate) id: SegmentId,
    /// First endpoint.
    pub a: Point,
    /// Second endpoint.
    pub b: Point,
    /// CSS-style colour string, e.g. `#00ff55`.
    pub color: String,
}

impl Segment {
    /// Create a new segment with a fresh id.
    pub fn new(a: Point, b: Point, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            a,
            b,
            color: color.into(),
        }
    }

    /// Get the unique identifier.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Give the segment a new id (used when it enters a store via bulk load).
    pub(crate) fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Both endpoints, `a` first.
    pub fn endpoints(&self) -> [Point; 2] {
        [self.a, self.b]
    }

    /// Get the length of the segment.
    pub fn length(&self) -> f64 {
        self.a.distance(self.b)
    }

    /// Check if both endpoints coincide.
    pub fn is_degenerate(&self) -> bool {
        self.length() < f64::EPSILON
    }

    /// Get the midpoint of the segment.
    pub fn midpoint(&self) -> Point {
        self.a.midpoint(self.b)
    }

    /// Axis-aligned bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.a, self.b)
    }

    /// Distance from a world point to this segment.
    pub fn distance_to(&self, point: Point) -> f64 {
        point_to_segment_dist(point, self.a, self.b)
    }

    /// Check if a point (in world coordinates) lies strictly within
    /// `tolerance` of the segment.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.distance_to(point) < tolerance
    }

    /// Apply a transform to both endpoints.
    pub fn transform(&mut self, affine: Affine) {
        self.a = affine * self.a;
        self.b = affine * self.b;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_creation() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), "#fff");
        assert!((seg.length() - 100.0).abs() < f64::EPSILON);
        assert_eq!(seg.color, "#fff");
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Segment::new(Point::ZERO, Point::new(1.0, 0.0), "#fff");
        let b = a.clone();
        let mut c = a.clone();
        c.regenerate_id();
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_midpoint() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 100.0), "#fff");
        let mid = seg.midpoint();
        assert!((mid.x - 50.0).abs() < f64::EPSILON);
        assert!((mid.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_tolerance_boundary() {
        let seg = Segment::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0), "#fff");
        let tol = 8.0;
        assert!(seg.hit_test(Point::new(50.0, tol - 1.0), tol));
        assert!(!seg.hit_test(Point::new(50.0, tol + 1.0), tol));
        assert!(!seg.hit_test(Point::new(50.0, tol), tol));
    }

    #[test]
    fn test_bounds() {
        let seg = Segment::new(Point::new(50.0, 20.0), Point::new(10.0, 80.0), "#fff");
        let bounds = seg.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 50.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transform_translate() {
        let mut seg = Segment::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0), "#fff");
        seg.transform(Affine::translate((5.0, -2.0)));
        assert_eq!(seg.a, Point::new(5.0, -2.0));
        assert_eq!(seg.b, Point::new(15.0, -2.0));
    }
}
