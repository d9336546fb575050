use bevy::prelude::*;

use super::{MovementResolver, TargetValidation};
use crate::nav::fixed_math::FixedVec3;
use crate::nav::geometry::line_crossing;
use crate::nav::mesh::{TriangleRef, TriangleShape};

impl<'a> MovementResolver<'a> {
    /// Search the integer points around `point` for one inside `shape`:
    /// first the adjacent box, then out to the configured radius, scanning
    /// X then Z in ascending order. `None` when the triangle is too thin to
    /// reach.
    pub(super) fn nudge_into(&self, shape: &TriangleShape, point: FixedVec3) -> Option<FixedVec3> {
        let radius = self.settings.point_search_radius;
        [1, radius].into_iter().find_map(|r| {
            (-r..=r).find_map(|dx| {
                (-r..=r)
                    .map(|dz| FixedVec3::new(point.x + dx, point.y, point.z + dz))
                    .find(|&p| shape.contains_point(p))
            })
        })
    }

    /// Clamp a requested move target to the furthest point on the straight
    /// line from `start` that stays on the mesh, optionally capped at
    /// `radius` raw units from `start`.
    pub fn find_valid_target(&self, start: FixedVec3, end: FixedVec3, radius: Option<i32>) -> TargetValidation {
        let start = start.clamped_to_range();
        let requested = end;
        let mut end = end.clamped_to_range();
        let mut capped = end != requested;
        if let Some(r) = radius.filter(|&r| r > 0) {
            if start.xz_sqr_distance(end) >= r as i64 * r as i64 {
                let reach = (end - start).normalize_xz_to(r);
                end = start.clamped_add(reach.with_y(0)).with_y(end.y);
                capped = true;
            }
        }

        let result = match self.locate(start, None) {
            Some(tri) => self.walk_to_target(tri, start, end),
            None => self.scan_cells_for_target(start, end),
        };
        TargetValidation { adjusted: result.adjusted || capped, ..result }
    }

    /// Keep `target` when it is on the mesh. Otherwise cast from `target`
    /// back toward `location` and settle just inside the first triangle hit.
    pub fn validate_target(&self, location: FixedVec3, target: FixedVec3) -> TargetValidation {
        let requested = target;
        let target = target.clamped_to_range();
        let location = location.clamped_to_range();
        if let Some(tri) = self.locate(target, None) {
            return TargetValidation { target, triangle: Some(tri), adjusted: target != requested };
        }
        match self.rasterizer.ray_segment_intersect(self.registry, target, location) {
            Some(hit) => self.settle(hit.triangle, hit.point),
            None => TargetValidation { target, triangle: None, adjusted: target != requested },
        }
    }

    fn walk_to_target(&self, start_tri: TriangleRef, start: FixedVec3, end: FixedVec3) -> TargetValidation {
        let mut triangle = start_tri;
        let mut span: Option<(usize, usize)> = None;
        for _ in 0..self.settings.max_move_steps {
            let Some(shape) = self.registry.shape(triangle) else { break };
            let (first, count) = span.unwrap_or((0, 3));
            match shape.edge_intersect(start, end, first, count) {
                None => {
                    let inside = shape.contains_point(end);
                    return TargetValidation {
                        target: if inside { end.with_y(shape.height_at(end)) } else { end },
                        triangle: inside.then_some(triangle),
                        adjusted: false,
                    };
                }
                Some(edge) => match self.registry.neighbor_across(triangle, edge) {
                    Some((next, entry)) => {
                        triangle = next;
                        span = Some(((entry + 1) % 3, 2));
                    }
                    None => {
                        let (v0, v1) = shape.edge(edge);
                        let hit = line_crossing(start, end, v0, v1)
                            .map_or(end, |c| c.point);
                        return self.settle(triangle, hit);
                    }
                },
            }
        }
        warn!(
            "[NAV_MOVE] Target walk {:?} -> {:?} did not settle within {} steps",
            start, end, self.settings.max_move_steps
        );
        TargetValidation { target: end, triangle: None, adjusted: false }
    }

    /// Off-mesh start: scan the cells spanned by `start` and `end` for the
    /// first triangle edge the segment crosses.
    fn scan_cells_for_target(&self, start: FixedVec3, end: FixedVec3) -> TargetValidation {
        let grid = self.rasterizer;
        if !grid.is_empty() {
            let (x0, y0) = grid.clamped_cell_of(start.xz());
            let (x1, y1) = grid.clamped_cell_of(end.xz());
            for cx in stepping(x0, x1) {
                for cy in stepping(y0, y1) {
                    let candidates = grid.candidates(cx, cy);
                    if candidates.is_empty() {
                        continue;
                    }
                    if candidates.len() > 2 && !grid.segment_overlaps_cell(start, end, cx, cy) {
                        continue;
                    }
                    if let Some(hit) = grid.segment_intersect_in_cell(self.registry, start, end, cx, cy) {
                        return self.settle(hit.triangle, hit.point);
                    }
                }
            }
        }
        TargetValidation { target: end, triangle: self.locate(end, None), adjusted: false }
    }

    fn settle(&self, triangle: TriangleRef, point: FixedVec3) -> TargetValidation {
        let Some(shape) = self.registry.shape(triangle) else {
            return TargetValidation { target: point, triangle: None, adjusted: true };
        };
        let inside = if shape.contains_point(point) { Some(point) } else { self.nudge_into(&shape, point) };
        match inside {
            Some(p) => TargetValidation {
                target: p.with_y(shape.height_at(p)),
                triangle: Some(triangle),
                adjusted: true,
            },
            None => TargetValidation { target: point, triangle: None, adjusted: true },
        }
    }
}

/// Inclusive cell range from `from` to `to`, in walking order.
fn stepping(from: usize, to: usize) -> impl Iterator<Item = usize> {
    (0..=from.abs_diff(to)).map(move |i| if from <= to { from + i } else { from - i })
}
