//! Selection transforms: move, rotate and scale about the selection centroid.

use crate::shapes::{SegmentId, centroid};
use crate::snap::{ANGLE_SNAP_INCREMENT, HexLattice, ParseError, SOFT_SNAP_RATIO, SnapMode, snap_angle};
use crate::store::ShapeStore;
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// How a drag on the selection changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformMode {
    /// Translate by the drag delta.
    #[default]
    Move,
    /// Rotate about the pivot by the swept angle.
    Rotate,
    /// Scale uniformly about the pivot.
    Scale,
}

impl TransformMode {
    /// Cycle to the next mode.
    pub fn next(self) -> Self {
        match self {
            TransformMode::Move => TransformMode::Rotate,
            TransformMode::Rotate => TransformMode::Scale,
            TransformMode::Scale => TransformMode::Move,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransformMode::Move => "move",
            TransformMode::Rotate => "rotate",
            TransformMode::Scale => "scale",
        }
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransformMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "move" => Ok(TransformMode::Move),
            "rotate" => Ok(TransformMode::Rotate),
            "scale" => Ok(TransformMode::Scale),
            other => Err(ParseError::new("transform mode", other)),
        }
    }
}

/// Snapping behaviour applied while a transform session runs.
#[derive(Debug, Clone, Copy)]
pub struct TransformOptions {
    /// Round rotations to `angle_increment` and soft-snap rotated endpoints.
    pub rotate_snap: bool,
    /// Active snap mode.
    pub snap_mode: SnapMode,
    /// Lattice used for soft snapping.
    pub lattice: HexLattice,
    /// Soft-snap radius as a fraction of the lattice step.
    pub soft_snap_ratio: f64,
    /// Rotation snap increment in radians.
    pub angle_increment: f64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            rotate_snap: false,
            snap_mode: SnapMode::default(),
            lattice: HexLattice::default(),
            soft_snap_ratio: SOFT_SNAP_RATIO,
            angle_increment: ANGLE_SNAP_INCREMENT,
        }
    }
}

/// Centroid of every endpoint of the selected segments.
///
/// Each segment contributes both endpoints, so a vertex shared by two
/// selected segments is counted twice.
pub fn selection_centroid(store: &ShapeStore, ids: &[SegmentId]) -> Option<Point> {
    centroid(
        ids.iter()
            .filter_map(|&id| store.get(id))
            .flat_map(|s| s.endpoints()),
    )
}

/// Wrap an angle into `(-PI, PI]`.
fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Rotation swept from `start` to `current` around `pivot`, optionally
/// snapped to `increment`.
pub fn rotation_delta(start: Point, current: Point, pivot: Point, snap: Option<f64>) -> f64 {
    let from = (start - pivot).atan2();
    let to = (current - pivot).atan2();
    let delta = normalize_angle(to - from);
    match snap {
        Some(increment) => snap_angle(delta, increment),
        None => delta,
    }
}

/// Uniform scale factor for a drag from `start` to `current` about `pivot`.
///
/// A start point on top of the pivot uses a denominator of 1.
pub fn scale_factor(start: Point, current: Point, pivot: Point) -> f64 {
    let from = start.distance(pivot);
    let from = if from < f64::EPSILON { 1.0 } else { from };
    current.distance(pivot) / from
}

/// The affine map a drag produces in the given mode.
pub fn transform_affine(
    mode: TransformMode,
    start: Point,
    current: Point,
    pivot: Point,
    rotate_snap: Option<f64>,
) -> Affine {
    match mode {
        TransformMode::Move => Affine::translate(current - start),
        TransformMode::Rotate => Affine::rotate_about(rotation_delta(start, current, pivot, rotate_snap), pivot),
        TransformMode::Scale => {
            let factor = scale_factor(start, current, pivot);
            Affine::translate(pivot.to_vec2()) * Affine::scale(factor) * Affine::translate(-pivot.to_vec2())
        }
    }
}

/// Endpoints of a selected segment as they were when the drag began.
#[derive(Debug, Clone, Copy)]
struct OriginalSegment {
    id: SegmentId,
    a: Point,
    b: Point,
}

/// State of an active transform drag on the selection.
///
/// Every update recomputes from the captured originals, never from the
/// previous frame, so the result does not drift.
#[derive(Debug, Clone)]
pub struct TransformSession {
    /// Transform mode captured at drag start.
    pub mode: TransformMode,
    /// World point where the drag started.
    pub start_point: Point,
    /// Latest world point of the drag.
    pub current_point: Point,
    /// Centroid of the selection at drag start.
    pub pivot: Point,
    originals: Vec<OriginalSegment>,
}

impl TransformSession {
    /// Start a session on the given segments.
    ///
    /// Returns `None` if none of the ids exist in the store.
    pub fn begin(store: &ShapeStore, ids: &[SegmentId], mode: TransformMode, start_point: Point) -> Option<Self> {
        let originals: Vec<OriginalSegment> = ids
            .iter()
            .filter_map(|&id| store.get(id))
            .map(|s| OriginalSegment { id: s.id(), a: s.a, b: s.b })
            .collect();
        if originals.is_empty() {
            return None;
        }
        let pivot = centroid(originals.iter().flat_map(|o| [o.a, o.b]))?;
        log::debug!("{} session started on {} segments, pivot {:?}", mode, originals.len(), pivot);
        Some(Self {
            mode,
            start_point,
            current_point: start_point,
            pivot,
            originals,
        })
    }

    /// Ids of the segments being transformed.
    pub fn ids(&self) -> Vec<SegmentId> {
        self.originals.iter().map(|o| o.id).collect()
    }

    /// Get the drag delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// The transform the session currently represents.
    pub fn affine(&self, options: &TransformOptions) -> Affine {
        let rotate_snap = options.rotate_snap.then_some(options.angle_increment);
        transform_affine(self.mode, self.start_point, self.current_point, self.pivot, rotate_snap)
    }

    fn snaps_endpoints(&self, options: &TransformOptions) -> bool {
        if !options.snap_mode.is_enabled() {
            return false;
        }
        match self.mode {
            TransformMode::Move => true,
            TransformMode::Rotate => options.rotate_snap,
            TransformMode::Scale => false,
        }
    }

    /// Move the drag to `current` and rewrite every selected segment.
    ///
    /// Segments removed from the store since the drag began are skipped.
    pub fn update(&mut self, store: &mut ShapeStore, current: Point, options: &TransformOptions) {
        self.current_point = current;
        let affine = self.affine(options);
        let identity = affine == Affine::IDENTITY;
        let snap = !identity && self.snaps_endpoints(options);

        for original in &self.originals {
            let Some(segment) = store.get_mut(original.id) else {
                continue;
            };
            segment.a = original.a;
            segment.b = original.b;
            if identity {
                continue;
            }
            segment.transform(affine);
            if snap {
                let lattice = &options.lattice;
                segment.a = lattice.maybe_snap(segment.a, options.snap_mode, options.soft_snap_ratio).point;
                segment.b = lattice.maybe_snap(segment.b, options.snap_mode, options.soft_snap_ratio).point;
            }
        }
    }
}
