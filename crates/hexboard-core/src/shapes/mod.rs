//! Shape definitions for the editor.
//!
//! The only drawable primitive is a straight, coloured line segment. Larger
//! "shapes" are connected groups of segments (see [`crate::grouping`]).

mod segment;

pub use segment::Segment;

use kurbo::{Point, Vec2};
use uuid::Uuid;

/// Unique identifier for segments. Stable across deletions of other segments.
pub type SegmentId = Uuid;

/// Colour given to segments that were saved without one.
pub const DEFAULT_COLOR: &str = "#00ff55";

/// Distance from a point to a line segment (a to b).
///
/// The projection parameter is clamped to `[0, 1]` so this is the distance to
/// the segment, not to the infinite line. A zero-length segment uses a
/// denominator of 1, which degrades to the distance to `a`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    let denom = if len_sq < f64::EPSILON { 1.0 } else { len_sq };
    let t = (pv.dot(seg) / denom).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Arithmetic mean of a set of points, or `None` when empty.
pub fn centroid<I>(points: I) -> Option<Point>
where
    I: IntoIterator<Item = Point>,
{
    let (sum, count) = points
        .into_iter()
        .fold((Vec2::ZERO, 0usize), |(sum, n), p| (sum + p.to_vec2(), n + 1));
    (count > 0).then(|| (sum / count as f64).to_point())
}
