use bevy::prelude::*;

use super::{NavRasterizer, SegmentHit};
use crate::nav::fixed_math::{FixedVec3, RationalFactor};
use crate::nav::geometry::segment_crossing;
use crate::nav::mesh::{NavMeshRegistry, TriangleRef};

/// Upper bound on cells visited by one grid traversal.
const MAX_TRAVERSAL_STEPS: usize = 1 << 16;

impl NavRasterizer {
    /// First candidate in `point`'s cell that contains it.
    pub fn locate(&self, registry: &NavMeshRegistry, point: FixedVec3) -> Option<TriangleRef> {
        if self.is_empty() {
            return None;
        }
        let (cx, cy) = self.clamped_cell_of(point.xz());
        self.candidates(cx, cy)
            .iter()
            .copied()
            .find(|&t| registry.shape(t).is_some_and(|s| s.contains_point(point)))
    }

    /// The triangle containing `point`, or else the one whose centroid is
    /// closest to it in the ground plane.
    ///
    /// Rings of cells around `point`'s (clamped) cell are scanned outwards,
    /// up to `max_ring` (the whole grid when `None`). The scan stops as soon
    /// as no unscanned cell can hold a closer centroid. Ties keep the first
    /// candidate found.
    pub fn nearest(&self, registry: &NavMeshRegistry, point: FixedVec3, max_ring: Option<u32>) -> Option<TriangleRef> {
        if self.is_empty() {
            return None;
        }
        if let Some(found) = self.locate(registry, point) {
            return Some(found);
        }

        let (cx, cy) = self.clamped_cell_of(point.xz());
        let whole_grid = self.cols.max(self.rows);
        let max_ring = max_ring.map_or(whole_grid, |r| (r as usize).clamp(1, whole_grid));

        let mut best: Option<(TriangleRef, i64)> = None;
        let consider = |cell: (usize, usize), best: &mut Option<(TriangleRef, i64)>| {
            for &t in self.candidates(cell.0, cell.1) {
                let Some(tri) = registry.triangle(t) else { continue };
                let dist = tri.centroid.xz_sqr_distance(point);
                if best.is_none_or(|(_, d)| dist < d) {
                    *best = Some((t, dist));
                }
            }
        };

        consider((cx, cy), &mut best);
        for k in 1..=max_ring {
            let Some(lower_bound) = self.ring_lower_bound_sq(point, cx, cy, k) else {
                break;
            };
            if best.is_some_and(|(_, d)| lower_bound > d) {
                break;
            }
            for cell in self.ring_cells(cx, cy, k) {
                consider(cell, &mut best);
            }
        }
        best.map(|(t, _)| t)
    }

    /// [`nearest`](Self::nearest) plus the closest point of that triangle.
    pub fn nearest_point(
        &self,
        registry: &NavMeshRegistry,
        point: FixedVec3,
        max_ring: Option<u32>,
    ) -> Option<(TriangleRef, FixedVec3)> {
        let tri = self.nearest(registry, point, max_ring)?;
        let shape = registry.shape(tri)?;
        Some((tri, shape.closest_point_xz(point)))
    }

    /// Nearest-to-`start` crossing of segment `start-end` with an edge of a
    /// triangle listed in cell `(cx, cy)`.
    pub fn segment_intersect_in_cell(
        &self,
        registry: &NavMeshRegistry,
        start: FixedVec3,
        end: FixedVec3,
        cx: usize,
        cy: usize,
    ) -> Option<SegmentHit> {
        let mut best: Option<SegmentHit> = None;
        for &t in self.candidates(cx, cy) {
            let Some(shape) = registry.shape(t) else { continue };
            for edge in 0..3 {
                let (v0, v1) = shape.edge(edge);
                let Some(crossing) = segment_crossing(start, end, v0, v1) else { continue };
                if best.is_none_or(|b| crossing.along_first < b.along) {
                    best = Some(SegmentHit {
                        triangle: t,
                        edge,
                        point: crossing.point,
                        along: crossing.along_first,
                    });
                }
            }
        }
        best
    }

    /// Walk the grid cells along `start-end` and return the triangle edge
    /// crossing closest to `start`.
    ///
    /// Cell boundaries are compared as exact fractions of the segment. A hit
    /// is only returned once the traversal has passed its parameter, since a
    /// triangle listed in an early cell may cross the segment further along
    /// than one listed in the next cell.
    ///
    /// The segment is clipped to the grid rectangle first, so the walk
    /// starts at the first cell it actually enters.
    pub fn ray_segment_intersect(
        &self,
        registry: &NavMeshRegistry,
        start: FixedVec3,
        end: FixedVec3,
    ) -> Option<SegmentHit> {
        if self.is_empty() {
            return None;
        }
        let (enter, leave) = self.clip_segment(start, end)?;
        let dx = end.x as i64 - start.x as i64;
        let dz = end.z as i64 - start.z as i64;
        let step_x = dx.signum();
        let step_z = dz.signum();

        let (mut cx, mut cy) = self.cell_along(start, end, enter);
        let (ex, ey) = self.cell_of(end.xz());

        let next_x = |cx: i64| -> Option<RationalFactor> {
            (dx != 0).then(|| {
                let boundary = if dx > 0 { self.column_start(cx + 1) } else { self.column_start(cx) };
                RationalFactor::new(boundary - start.x as i64, dx)
            })
        };
        let next_z = |cy: i64| -> Option<RationalFactor> {
            (dz != 0).then(|| {
                let boundary = if dz > 0 { self.row_start(cy + 1) } else { self.row_start(cy) };
                RationalFactor::new(boundary - start.z as i64, dz)
            })
        };
        let mut t_x = next_x(cx);
        let mut t_z = next_z(cy);

        let mut best: Option<SegmentHit> = None;
        for _ in 0..MAX_TRAVERSAL_STEPS {
            let t_exit = [t_x, t_z].into_iter().flatten().min().map_or(RationalFactor::ONE, |t| t.min(RationalFactor::ONE));

            if self.in_grid(cx, cy) {
                if let Some(hit) = self.segment_intersect_in_cell(registry, start, end, cx as usize, cy as usize) {
                    if best.is_none_or(|b| hit.along < b.along) {
                        best = Some(hit);
                    }
                }
            }
            if best.is_some_and(|b| b.along <= t_exit) {
                return best;
            }
            if (cx, cy) == (ex, ey) || t_exit >= leave {
                return best;
            }

            match (t_x, t_z) {
                (Some(tx), Some(tz)) if tz < tx => {
                    cy += step_z;
                    t_z = next_z(cy);
                }
                (Some(_), _) => {
                    cx += step_x;
                    t_x = next_x(cx);
                }
                (None, Some(_)) => {
                    cy += step_z;
                    t_z = next_z(cy);
                }
                (None, None) => return best,
            }
        }

        warn!(
            "[RASTERIZER] Grid traversal from {:?} to {:?} exceeded {} cells",
            start, end, MAX_TRAVERSAL_STEPS
        );
        best
    }
}
