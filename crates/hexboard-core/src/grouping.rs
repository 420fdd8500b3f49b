//! Connected-shape detection.
//!
//! Two segments belong to the same shape when any of their endpoints
//! coincide. Selecting one edge of a polygon therefore selects the polygon.
//!
//! Every query compares each visited segment against every other one, so it
//! is O(n²) in the segment count. That is fine for hand-drawn diagrams; an
//! endpoint hash maintained on insert/remove would be the next step for much
//! larger documents.

use crate::shapes::{Segment, SegmentId};
use crate::store::ShapeStore;
use std::collections::{HashSet, VecDeque};

/// Endpoints closer than this (world units) count as shared.
pub const ENDPOINT_EPSILON: f64 = 1e-3;

/// Check whether two segments share an endpoint.
pub fn segments_touch(first: &Segment, second: &Segment, epsilon: f64) -> bool {
    first
        .endpoints()
        .iter()
        .any(|p| second.endpoints().iter().any(|q| p.distance(*q) < epsilon))
}

/// The maximal set of segments linked to `start` through shared endpoints,
/// including `start` itself, in draw order.
///
/// Returns an empty list if `start` is not in the store.
pub fn connected_shape(store: &ShapeStore, start: SegmentId) -> Vec<SegmentId> {
    let Some(start_segment) = store.get(start) else {
        return Vec::new();
    };

    let mut visited: HashSet<SegmentId> = HashSet::from([start]);
    let mut queue: VecDeque<&Segment> = VecDeque::from([start_segment]);

    while let Some(current) = queue.pop_front() {
        for candidate in store.iter() {
            if visited.contains(&candidate.id()) {
                continue;
            }
            if segments_touch(current, candidate, ENDPOINT_EPSILON) {
                visited.insert(candidate.id());
                queue.push_back(candidate);
            }
        }
    }

    store
        .ids()
        .iter()
        .copied()
        .filter(|id| visited.contains(id))
        .collect()
}

/// Union of the connected shapes of several seeds, in draw order.
pub fn connected_shapes(store: &ShapeStore, seeds: &[SegmentId]) -> Vec<SegmentId> {
    let mut members: HashSet<SegmentId> = HashSet::new();
    for &seed in seeds {
        if !members.contains(&seed) {
            members.extend(connected_shape(store, seed));
        }
    }
    store
        .ids()
        .iter()
        .copied()
        .filter(|id| members.contains(id))
        .collect()
}
