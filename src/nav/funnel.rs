//! Simple stupid funnel over a portal corridor.
//!
//! A corridor is two equal-length point lists. Index 0 holds the start on
//! both sides, the last index holds the end, and every index in between is
//! one portal crossed by the path. The funnel keeps an apex and the tightest
//! left and right bounds seen so far; when a new portal point crosses the
//! opposite bound, that bound becomes the next waypoint.

use bevy::prelude::*;

use super::error::FunnelError;
use super::fixed_math::FixedVec3;
use super::geometry::{area2, is_clockwise, is_clockwise_or_colinear, is_colinear};
use super::mesh::{NavMeshRegistry, TriangleRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FunnelOutcome {
    /// `out` holds the taut path from the first to the last corridor point.
    Smoothed,
    /// Too few usable portals. `out` is left empty and the caller should
    /// walk straight from start to end.
    Degenerate,
}

/// Corridor sides after dropping redundant leading portals. Index 0 is kept,
/// then everything from `1 + skip` on.
struct Trimmed<'a> {
    left: &'a [FixedVec3],
    right: &'a [FixedVec3],
    skip: usize,
}

impl Trimmed<'_> {
    fn len(&self) -> usize {
        self.left.len() - self.skip
    }

    fn left(&self, i: usize) -> FixedVec3 {
        if i == 0 { self.left[0] } else { self.left[i + self.skip] }
    }

    fn right(&self, i: usize) -> FixedVec3 {
        if i == 0 { self.right[0] } else { self.right[i + self.skip] }
    }

    /// Third point used to tell which way the corridor turns after portal 1.
    fn probe(&self) -> FixedVec3 {
        if self.left(2) == self.left(1) { self.right(2) } else { self.left(2) }
    }

    fn drop_first_portal(&mut self) -> bool {
        self.skip += 1;
        self.len() > 3
    }

    fn sides(&self, swap: bool) -> (Vec<FixedVec3>, Vec<FixedVec3>) {
        let left: Vec<_> = (0..self.len()).map(|i| self.left(i)).collect();
        let right: Vec<_> = (0..self.len()).map(|i| self.right(i)).collect();
        if swap { (right, left) } else { (left, right) }
    }
}

/// Run the funnel over `left`/`right`, writing waypoints into `out`.
///
/// `out` is cleared first. At most `max_waypoints` corners are committed;
/// past that the path is cut short with a warning and jumps to the end.
pub fn run_funnel(
    left: &[FixedVec3],
    right: &[FixedVec3],
    out: &mut Vec<FixedVec3>,
    max_waypoints: usize,
) -> Result<FunnelOutcome, FunnelError> {
    if left.len() != right.len() {
        return Err(FunnelError::MismatchedPortals { left: left.len(), right: right.len() });
    }
    out.clear();
    if left.len() <= 3 {
        return Ok(FunnelOutcome::Degenerate);
    }

    let mut trimmed = Trimmed { left, right, skip: 0 };
    while trimmed.left(1) == trimmed.left(2) && trimmed.right(1) == trimmed.right(2) {
        if !trimmed.drop_first_portal() {
            return Ok(FunnelOutcome::Degenerate);
        }
    }
    loop {
        let (start, l1, r1) = (trimmed.left(0), trimmed.left(1), trimmed.right(1));
        let probe = trimmed.probe();
        let same_side = is_clockwise_or_colinear(l1, r1, probe) == is_clockwise_or_colinear(l1, r1, start);
        if !is_colinear(start, l1, r1) && !same_side {
            break;
        }
        if !trimmed.drop_first_portal() {
            return Ok(FunnelOutcome::Degenerate);
        }
    }

    let swap = !is_clockwise(trimmed.left(0), trimmed.left(1), trimmed.right(1));
    let (left, right) = trimmed.sides(swap);

    out.push(left[0]);
    let mut apex = left[0];
    let mut portal_left = left[1];
    let mut portal_right = right[1];
    let mut left_index = 1;
    let mut right_index = 1;

    let mut i = 2;
    while i < left.len() {
        if out.len() > max_waypoints {
            warn!(
                "[FUNNEL] Corridor of {} portals exceeded {} waypoints, cutting to the end",
                left.len(),
                max_waypoints
            );
            break;
        }
        let next_left = left[i];
        let next_right = right[i];

        if area2(apex, portal_right, next_right) >= 0 {
            if apex == portal_right || area2(apex, portal_left, next_right) <= 0 {
                portal_right = next_right;
                right_index = i;
            } else {
                out.push(portal_left);
                apex = portal_left;
                portal_right = apex;
                right_index = left_index;
                i = left_index + 1;
                continue;
            }
        }

        if area2(apex, portal_left, next_left) <= 0 {
            if apex == portal_left || area2(apex, portal_right, next_left) >= 0 {
                portal_left = next_left;
                left_index = i;
            } else {
                out.push(portal_right);
                apex = portal_right;
                portal_left = apex;
                left_index = right_index;
                i = right_index + 1;
                continue;
            }
        }

        i += 1;
    }

    if let Some(&end) = left.last() {
        out.push(end);
    }
    Ok(FunnelOutcome::Smoothed)
}

/// Portal corridor for a triangle path from `start` to `end`.
///
/// Consecutive triangles without a shared portal contribute both centroids
/// to each side, so the corridor still passes through them.
pub fn build_corridor(
    registry: &NavMeshRegistry,
    path: &[TriangleRef],
    start: FixedVec3,
    end: FixedVec3,
) -> (Vec<FixedVec3>, Vec<FixedVec3>) {
    let mut left = Vec::with_capacity(path.len() + 1);
    let mut right = Vec::with_capacity(path.len() + 1);
    left.push(start);
    right.push(start);

    for pair in path.windows(2) {
        if let Some((l, r)) = registry.portal(pair[0], pair[1]) {
            left.push(l);
            right.push(r);
            continue;
        }
        debug!("[FUNNEL] No portal between {:?} and {:?}", pair[0], pair[1]);
        for tri in pair {
            if let Some(centroid) = registry.triangle(*tri).map(|t| t.centroid) {
                left.push(centroid);
                right.push(centroid);
            }
        }
    }

    left.push(end);
    right.push(end);
    (left, right)
}

/// Waypoints from `start` to `end` through `path`. Falls back to the
/// straight segment when the corridor is too short to smooth.
pub fn smooth_path(
    registry: &NavMeshRegistry,
    path: &[TriangleRef],
    start: FixedVec3,
    end: FixedVec3,
    max_waypoints: usize,
) -> Vec<FixedVec3> {
    let (left, right) = build_corridor(registry, path, start, end);
    let mut out = Vec::with_capacity(left.len());
    match run_funnel(&left, &right, &mut out, max_waypoints) {
        Ok(FunnelOutcome::Smoothed) => out,
        Ok(FunnelOutcome::Degenerate) => vec![start, end],
        Err(e) => {
            error!("[FUNNEL] {}", e);
            vec![start, end]
        }
    }
}
