//! Snap functionality for aligning points to the hexagonal bubble lattice.
//!
//! Anchors are the centres of hexagonally close-packed circles: rows are
//! `step_y = step_x * sqrt(3) / 2` apart and odd rows are shifted by half a
//! step. Lookups are O(1) because the lattice is regular.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default horizontal distance between neighbouring anchors.
pub const DEFAULT_LATTICE_STEP: f64 = 40.0;

/// Soft snap engages only within this fraction of `step_x`.
pub const SOFT_SNAP_RATIO: f64 = 0.25;

/// Rotation snap increment (15 degrees).
pub const ANGLE_SNAP_INCREMENT: f64 = PI / 12.0;

/// Snap mode, global to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapMode {
    /// Snap to lattice anchors.
    #[default]
    Lattice,
    /// Snap to anchors and the midpoints between neighbouring anchors.
    LatticeWithMidpoints,
    /// No snapping.
    Free,
}

impl SnapMode {
    /// Cycle to the next snap mode.
    pub fn next(self) -> Self {
        match self {
            SnapMode::Lattice => SnapMode::LatticeWithMidpoints,
            SnapMode::LatticeWithMidpoints => SnapMode::Free,
            SnapMode::Free => SnapMode::Lattice,
        }
    }

    /// Check if any snapping is enabled.
    pub fn is_enabled(self) -> bool {
        self != SnapMode::Free
    }

    /// Name used in persisted documents and by the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            SnapMode::Lattice => "lattice",
            SnapMode::LatticeWithMidpoints => "latticeWithMidpoints",
            SnapMode::Free => "free",
        }
    }
}

impl fmt::Display for SnapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown name passed to one of the mode setters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {name:?}")]
pub struct ParseError {
    pub kind: &'static str,
    pub name: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

impl FromStr for SnapMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lattice" => Ok(SnapMode::Lattice),
            "latticeWithMidpoints" => Ok(SnapMode::LatticeWithMidpoints),
            "free" => Ok(SnapMode::Free),
            other => Err(ParseError::new("snap mode", other)),
        }
    }
}

/// Type of snap target, for visual feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapTargetKind {
    /// A lattice anchor.
    Anchor,
    /// Midpoint between two neighbouring anchors.
    Midpoint,
}

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// What the point snapped to, if anything.
    pub target: Option<SnapTargetKind>,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self { point, target: None }
    }

    fn anchor(point: Point) -> Self {
        Self {
            point,
            target: Some(SnapTargetKind::Anchor),
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.target.is_some()
    }
}

/// Hexagonal anchor lattice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLattice {
    /// Horizontal spacing between anchors in a row.
    pub step_x: f64,
}

impl Default for HexLattice {
    fn default() -> Self {
        Self::new(DEFAULT_LATTICE_STEP)
    }
}

impl HexLattice {
    pub fn new(step_x: f64) -> Self {
        Self { step_x }
    }

    /// Vertical spacing between rows.
    pub fn step_y(&self) -> f64 {
        self.step_x * 3.0_f64.sqrt() / 2.0
    }

    /// Horizontal shift of row `row`.
    fn row_offset(&self, row: i64) -> f64 {
        if row.rem_euclid(2) == 1 { self.step_x / 2.0 } else { 0.0 }
    }

    /// Anchor at the given row and column.
    pub fn anchor(&self, row: i64, col: i64) -> Point {
        Point::new(col as f64 * self.step_x + self.row_offset(row), row as f64 * self.step_y())
    }

    /// The anchor picked by rounding to the nearest row, then the nearest
    /// column within that row.
    pub fn nearest_anchor(&self, point: Point) -> Point {
        let row = (point.y / self.step_y()).round() as i64;
        let offset = self.row_offset(row);
        let col = ((point.x - offset) / self.step_x).round() as i64;
        self.anchor(row, col)
    }

    /// The six immediate neighbours of an anchor: east, west, the two above
    /// (left then right), the two below (left then right).
    pub fn neighbors(&self, anchor: Point) -> [Point; 6] {
        let dx = self.step_x / 2.0;
        let dy = self.step_y();
        [
            Point::new(anchor.x + self.step_x, anchor.y),
            Point::new(anchor.x - self.step_x, anchor.y),
            Point::new(anchor.x - dx, anchor.y - dy),
            Point::new(anchor.x + dx, anchor.y - dy),
            Point::new(anchor.x - dx, anchor.y + dy),
            Point::new(anchor.x + dx, anchor.y + dy),
        ]
    }

    /// Snap a point based on the snap mode.
    pub fn snap(&self, point: Point, mode: SnapMode) -> SnapResult {
        match mode {
            SnapMode::Free => SnapResult::none(point),
            SnapMode::Lattice => SnapResult::anchor(self.nearest_anchor(point)),
            SnapMode::LatticeWithMidpoints => self.snap_with_midpoints(point),
        }
    }

    /// Closest of the nearest anchor, its neighbours and the midpoints towards
    /// them. Candidates are visited in that order and the first minimum wins.
    fn snap_with_midpoints(&self, point: Point) -> SnapResult {
        let anchor = self.nearest_anchor(point);
        let neighbors = self.neighbors(anchor);

        let mut best = SnapResult::anchor(anchor);
        let mut best_dist_sq = point.distance_squared(anchor);

        let candidates = neighbors
            .iter()
            .map(|&n| (n, SnapTargetKind::Anchor))
            .chain(neighbors.iter().map(|&n| (anchor.midpoint(n), SnapTargetKind::Midpoint)));

        for (candidate, kind) in candidates {
            let dist_sq = point.distance_squared(candidate);
            if dist_sq < best_dist_sq {
                best_dist_sq = dist_sq;
                best = SnapResult {
                    point: candidate,
                    target: Some(kind),
                };
            }
        }
        best
    }

    /// Soft snap: only move the point if the snap target is within
    /// `step_x * ratio`.
    pub fn maybe_snap(&self, point: Point, mode: SnapMode, ratio: f64) -> SnapResult {
        let result = self.snap(point, mode);
        if !result.is_snapped() {
            return result;
        }
        let threshold = self.step_x * ratio;
        if point.distance(result.point) <= threshold {
            result
        } else {
            SnapResult::none(point)
        }
    }

    /// All anchors inside (or on the edge of) a world-space rectangle, row by
    /// row from top to bottom.
    pub fn anchors_in_rect(&self, rect: Rect) -> impl Iterator<Item = Point> + '_ {
        let rect = rect.abs();
        let step_y = self.step_y();
        let row_min = (rect.y0 / step_y).ceil() as i64;
        let row_max = (rect.y1 / step_y).floor() as i64;
        (row_min..=row_max).flat_map(move |row| {
            let offset = self.row_offset(row);
            let col_min = ((rect.x0 - offset) / self.step_x).ceil() as i64;
            let col_max = ((rect.x1 - offset) / self.step_x).floor() as i64;
            (col_min..=col_max).map(move |col| self.anchor(row, col))
        })
    }
}

/// Snap an angle (radians) to the nearest multiple of `increment`.
pub fn snap_angle(angle: f64, increment: f64) -> f64 {
    if increment <= 0.0 {
        return angle;
    }
    (angle / increment).round() * increment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> HexLattice {
        HexLattice::new(40.0)
    }

    #[test]
    fn test_row_zero_anchors() {
        let l = lattice();
        assert_eq!(l.nearest_anchor(Point::new(-41.0, 3.0)), Point::new(-40.0, 0.0));
        assert_eq!(l.nearest_anchor(Point::new(2.0, -3.0)), Point::new(0.0, 0.0));
        assert_eq!(l.nearest_anchor(Point::new(38.0, 1.0)), Point::new(40.0, 0.0));
    }

    #[test]
    fn test_row_one_is_offset() {
        let l = lattice();
        let step_y = 40.0 * 3.0_f64.sqrt() / 2.0;
        assert!((l.step_y() - 34.641).abs() < 1e-3);

        let p = l.nearest_anchor(Point::new(22.0, 33.0));
        assert!((p.x - 20.0).abs() < 1e-12);
        assert!((p.y - step_y).abs() < 1e-12);

        let p = l.nearest_anchor(Point::new(-18.0, 36.0));
        assert!((p.x + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_odd_rows_are_offset() {
        let l = lattice();
        let p = l.nearest_anchor(Point::new(21.0, -l.step_y()));
        assert!((p.x - 20.0).abs() < 1e-12);
        assert!((p.y + l.step_y()).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_anchor_idempotent() {
        let l = lattice();
        let step_y = l.step_y();
        // Quarter steps in x and y land on half-step ties between columns,
        // between rows, and on negative odd rows.
        for i in -40..=40 {
            for j in -40..=40 {
                let p = Point::new(i as f64 * 5.0, j as f64 * step_y / 4.0);
                let a = l.nearest_anchor(p);
                assert_eq!(l.nearest_anchor(a), a, "anchor {:?} of {:?} not stable", a, p);
                assert!(a.distance(p) <= 30.0, "{:?} snapped too far to {:?}", p, a);
            }
        }
        for row in -7..=7 {
            for col in -5..=5 {
                let a = l.anchor(row, col);
                assert_eq!(l.nearest_anchor(a), a, "row {} col {}", row, col);
            }
        }
        let far = l.nearest_anchor(Point::new(1e4 + 0.3, -7e3 - 0.9));
        assert_eq!(l.nearest_anchor(far), far);
    }

    #[test]
    fn test_free_mode_is_identity() {
        let l = lattice();
        let p = Point::new(13.0, 7.0);
        let result = l.snap(p, SnapMode::Free);
        assert_eq!(result.point, p);
        assert!(!result.is_snapped());
    }

    #[test]
    fn test_midpoint_mode_prefers_midpoint() {
        let l = lattice();
        let result = l.snap(Point::new(19.0, 1.0), SnapMode::LatticeWithMidpoints);
        assert_eq!(result.target, Some(SnapTargetKind::Midpoint));
        assert!((result.point.x - 20.0).abs() < 1e-12);
        assert!(result.point.y.abs() < 1e-12);
    }

    #[test]
    fn test_midpoint_mode_anchor_wins_ties() {
        let l = lattice();
        // Exactly between the anchor (0,0) and the midpoint (20,0).
        let result = l.snap(Point::new(10.0, 0.0), SnapMode::LatticeWithMidpoints);
        assert_eq!(result.point, Point::new(0.0, 0.0));
        assert_eq!(result.target, Some(SnapTargetKind::Anchor));
    }

    #[test]
    fn test_midpoint_mode_on_anchor_returns_anchor() {
        let l = lattice();
        let a = l.anchor(3, -2);
        let result = l.snap(a, SnapMode::LatticeWithMidpoints);
        assert_eq!(result.point, a);
    }

    #[test]
    fn test_neighbors_are_one_step_away() {
        let l = lattice();
        let a = l.anchor(1, 4);
        for n in l.neighbors(a) {
            assert!((a.distance(n) - 40.0).abs() < 1e-9);
            assert_eq!(l.nearest_anchor(n), n);
        }
    }

    #[test]
    fn test_soft_snap_threshold() {
        let l = lattice();
        // 9 units away: within 40 * 0.25 = 10.
        let near = l.maybe_snap(Point::new(9.0, 0.0), SnapMode::Lattice, SOFT_SNAP_RATIO);
        assert_eq!(near.point, Point::new(0.0, 0.0));
        // 12 units away: outside, left alone.
        let far = l.maybe_snap(Point::new(12.0, 0.0), SnapMode::Lattice, SOFT_SNAP_RATIO);
        assert_eq!(far.point, Point::new(12.0, 0.0));
        assert!(!far.is_snapped());
    }

    #[test]
    fn test_anchors_in_rect() {
        let l = lattice();
        let anchors: Vec<Point> = l.anchors_in_rect(Rect::new(-1.0, -1.0, 81.0, 40.0)).collect();
        // Row 0: 0, 40, 80. Row 1: 20, 60.
        assert_eq!(anchors.len(), 5);
        assert!(anchors.contains(&Point::new(80.0, 0.0)));
        assert!(anchors.iter().all(|p| l.nearest_anchor(*p) == *p));
    }

    #[test]
    fn test_snap_mode_cycle() {
        assert_eq!(SnapMode::Lattice.next(), SnapMode::LatticeWithMidpoints);
        assert_eq!(SnapMode::LatticeWithMidpoints.next(), SnapMode::Free);
        assert_eq!(SnapMode::Free.next(), SnapMode::Lattice);
    }

    #[test]
    fn test_snap_mode_names() {
        for mode in [SnapMode::Lattice, SnapMode::LatticeWithMidpoints, SnapMode::Free] {
            assert_eq!(mode.as_str().parse::<SnapMode>(), Ok(mode));
        }
        assert!("grid".parse::<SnapMode>().is_err());
    }

    #[test]
    fn test_snap_angle() {
        let inc = ANGLE_SNAP_INCREMENT;
        assert!(snap_angle(0.0, inc).abs() < 1e-12);
        assert!(snap_angle(7f64.to_radians(), inc).abs() < 1e-12);
        assert!((snap_angle(8f64.to_radians(), inc) - 15f64.to_radians()).abs() < 1e-12);
        assert!((snap_angle(-23f64.to_radians(), inc) + 30f64.to_radians()).abs() < 1e-12);
    }
}
