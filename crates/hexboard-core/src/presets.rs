//! Built-in preset shapes.
//!
//! Presets are pure functions of a centre and a scale. The cube and the
//! tesseract-like frame are flat axonometric drawings, not 3-D geometry.

use crate::grouping::ENDPOINT_EPSILON;
use crate::shapes::Segment;
use crate::snap::ParseError;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, TAU};
use std::fmt;
use std::str::FromStr;

/// Default reference radius for presets at scale 1.
pub const DEFAULT_BASE_RADIUS: f64 = 40.0;

const TRIANGLE_RADIUS: f64 = 1.6;
const HEXAGON_RADIUS: f64 = 1.4;
const CUBE_HALF_EXTENT: f64 = 1.2;
const TESSERACT_INNER_SCALE: f64 = 0.6;
/// Depth shift per unit of z in the axonometric projection.
const DEPTH_SHEAR: f64 = 0.5;

/// Available preset shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PresetKind {
    Triangle,
    Hexagon,
    Cube,
    Tesseract,
}

impl PresetKind {
    /// Every preset, in toolbar order.
    pub const ALL: [PresetKind; 4] = [
        PresetKind::Triangle,
        PresetKind::Hexagon,
        PresetKind::Cube,
        PresetKind::Tesseract,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetKind::Triangle => "triangle",
            PresetKind::Hexagon => "hexagon",
            PresetKind::Cube => "cube",
            PresetKind::Tesseract => "tesseract",
        }
    }

    /// Number of segments the preset produces before snapping.
    pub fn segment_count(self) -> usize {
        match self {
            PresetKind::Triangle => 3,
            PresetKind::Hexagon => 6,
            PresetKind::Cube => 12,
            PresetKind::Tesseract => 32,
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseError::new("preset", s))
    }
}

/// Generates preset segments around a centre point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetGenerator {
    /// Reference radius at scale 1.
    pub base_radius: f64,
}

impl Default for PresetGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_RADIUS)
    }
}

impl PresetGenerator {
    pub fn new(base_radius: f64) -> Self {
        Self { base_radius }
    }

    /// Vertex pairs of a preset, before any snapping.
    pub fn edges(&self, kind: PresetKind, center: Point, scale: f64) -> Vec<(Point, Point)> {
        match kind {
            PresetKind::Triangle => {
                polygon_edges(&regular_polygon(center, TRIANGLE_RADIUS * self.base_radius * scale, 3, -FRAC_PI_2))
            }
            PresetKind::Hexagon => {
                polygon_edges(&regular_polygon(center, HEXAGON_RADIUS * self.base_radius * scale, 6, FRAC_PI_6))
            }
            PresetKind::Cube => {
                let vertices = cube_vertices(center, CUBE_HALF_EXTENT * self.base_radius * scale);
                cube_edges(&vertices)
            }
            PresetKind::Tesseract => {
                let outer = cube_vertices(center, CUBE_HALF_EXTENT * self.base_radius * scale);
                let inner = cube_vertices(center, CUBE_HALF_EXTENT * self.base_radius * scale * TESSERACT_INNER_SCALE);
                let mut edges = cube_edges(&outer);
                edges.extend(cube_edges(&inner));
                edges.extend(outer.iter().zip(inner.iter()).map(|(&o, &i)| (o, i)));
                edges
            }
        }
    }

    /// Build the segments of a preset.
    ///
    /// Every vertex passes through `snap` before it becomes an endpoint; pass
    /// the identity to keep exact geometry. Edges whose endpoints snap onto
    /// the same point are dropped, as are repeats of an edge already emitted.
    pub fn generate<F>(&self, kind: PresetKind, center: Point, scale: f64, color: &str, snap: F) -> Vec<Segment>
    where
        F: Fn(Point) -> Point,
    {
        let mut segments: Vec<Segment> = Vec::new();
        for (a, b) in self.edges(kind, center, scale) {
            let segment = Segment::new(snap(a), snap(b), color);
            if segment.is_degenerate() || segments.iter().any(|kept| same_edge(kept, &segment)) {
                continue;
            }
            segments.push(segment);
        }
        segments
    }

    pub fn triangle(&self, center: Point, scale: f64, color: &str) -> Vec<Segment> {
        self.generate(PresetKind::Triangle, center, scale, color, |p| p)
    }

    pub fn hexagon(&self, center: Point, scale: f64, color: &str) -> Vec<Segment> {
        self.generate(PresetKind::Hexagon, center, scale, color, |p| p)
    }

    pub fn cube(&self, center: Point, scale: f64, color: &str) -> Vec<Segment> {
        self.generate(PresetKind::Cube, center, scale, color, |p| p)
    }

    pub fn tesseract(&self, center: Point, scale: f64, color: &str) -> Vec<Segment> {
        self.generate(PresetKind::Tesseract, center, scale, color, |p| p)
    }
}

/// Both segments join the same pair of points, in either direction.
fn same_edge(first: &Segment, second: &Segment) -> bool {
    let close = |p: Point, q: Point| p.distance(q) <= ENDPOINT_EPSILON;
    (close(first.a, second.a) && close(first.b, second.b)) || (close(first.a, second.b) && close(first.b, second.a))
}

/// `sides` points evenly spaced on a circle, the first at `start_angle`.
fn regular_polygon(center: Point, radius: f64, sides: usize, start_angle: f64) -> Vec<Point> {
    (0..sides)
        .map(|i| {
            let angle = start_angle + TAU * i as f64 / sides as f64;
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

/// Closed loop through the given vertices.
fn polygon_edges(vertices: &[Point]) -> Vec<(Point, Point)> {
    (0..vertices.len())
        .map(|i| (vertices[i], vertices[(i + 1) % vertices.len()]))
        .collect()
}

/// Projected cube corners. Bit 0 of the index selects x, bit 1 y, bit 2 z.
fn cube_vertices(center: Point, half: f64) -> [Point; 8] {
    std::array::from_fn(|i| {
        let sign = |bit: usize| if i & (1 << bit) == 0 { -1.0 } else { 1.0 };
        let (x, y, z) = (sign(0) * half, sign(1) * half, sign(2) * half);
        Point::new(center.x + x + z * DEPTH_SHEAR, center.y + y - z * DEPTH_SHEAR)
    })
}

/// The 12 cube edges: corner pairs that differ in exactly one axis.
fn cube_edges(vertices: &[Point; 8]) -> Vec<(Point, Point)> {
    let mut edges = Vec::with_capacity(12);
    for i in 0..8 {
        for bit in 0..3 {
            let j = i | (1 << bit);
            if j != i {
                edges.push((vertices[i], vertices[j]));
            }
        }
    }
    edges
}
