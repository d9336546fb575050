use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{MeshId, TileCoord};
use crate::nav::fixed_math::{divide_round, saturate_i32, FixedVec2, FixedVec3};
use crate::nav::geometry::{
    area2, closest_point_on_segment_xz, is_clockwise_or_colinear, is_colinear, segments_intersect,
};

/// Topology of one navmesh triangle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavTriangle {
    /// Indices into the owning mesh's vertex buffer, clockwise from +Y.
    pub vertices: [u32; 3],
    pub mesh: MeshId,
    pub tile: TileCoord,
    /// Adjacent triangles in the same mesh.
    pub neighbors: SmallVec<[u32; 3]>,
    pub centroid: FixedVec3,
}

impl NavTriangle {
    /// Local index (0..3) of mesh vertex `vertex`, if this triangle uses it.
    pub fn local_index_of(&self, vertex: u32) -> Option<usize> {
        self.vertices.iter().position(|&v| v == vertex)
    }
}

/// Resolved vertex positions of a triangle, the value every geometric query
/// runs on. Edge `i` goes from `points[i]` to `points[(i + 1) % 3]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriangleShape {
    pub points: [FixedVec3; 3],
}

impl TriangleShape {
    pub const fn new(points: [FixedVec3; 3]) -> Self {
        Self { points }
    }

    pub fn point(&self, i: usize) -> FixedVec3 {
        self.points[i % 3]
    }

    pub fn edge(&self, edge: usize) -> (FixedVec3, FixedVec3) {
        (self.point(edge), self.point(edge + 1))
    }

    pub fn area2(&self) -> i64 {
        area2(self.points[0], self.points[1], self.points[2])
    }

    pub fn centroid(&self) -> FixedVec3 {
        let [a, b, c] = self.points;
        let avg = |p: i32, q: i32, r: i32| saturate_i32(divide_round(p as i128 + q as i128 + r as i128, 3));
        FixedVec3::new(avg(a.x, b.x, c.x), avg(a.y, b.y, c.y), avg(a.z, b.z, c.z))
    }

    /// Ground-plane bounding box.
    pub fn bounds(&self) -> (FixedVec2, FixedVec2) {
        let [a, b, c] = self.points;
        (a.min_xz(b).min(c.xz()), a.max_xz(b).max(c.xz()))
    }

    /// Inclusive containment: points on an edge or vertex belong to the triangle.
    pub fn contains_point(&self, p: FixedVec3) -> bool {
        (0..3).all(|i| {
            let (a, b) = self.edge(i);
            is_clockwise_or_colinear(a, b, p)
        })
    }

    /// First of `count` edges starting at `start_edge` that segment `a-b`
    /// crosses.
    pub fn edge_intersect(&self, a: FixedVec3, b: FixedVec3, start_edge: usize, count: usize) -> Option<usize> {
        (0..count).map(|i| (start_edge + i) % 3).find(|&edge| {
            let (v0, v1) = self.edge(edge);
            segments_intersect(a, b, v0, v1)
        })
    }

    /// An edge whose supporting line passes through both `a` and `b`.
    pub fn colinear_edge(&self, a: FixedVec3, b: FixedVec3) -> Option<usize> {
        (0..3).find(|&edge| {
            let (v0, v1) = self.edge(edge);
            is_colinear(v0, v1, a) && is_colinear(v0, v1, b)
        })
    }

    /// Local index of the vertex sitting exactly at `p` in the ground plane.
    pub fn vertex_at(&self, p: FixedVec3) -> Option<usize> {
        self.points.iter().position(|v| v.is_equal_xz(p))
    }

    /// `p` itself when inside, otherwise the nearest point on the boundary.
    pub fn closest_point_xz(&self, p: FixedVec3) -> FixedVec3 {
        if self.contains_point(p) {
            return p;
        }
        let mut best = self.points[0];
        let mut best_dist = i64::MAX;
        for edge in 0..3 {
            let (a, b) = self.edge(edge);
            let candidate = closest_point_on_segment_xz(a, b, p);
            let dist = candidate.xz_sqr_distance(p);
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }

    /// Height of the plane through the triangle at `p`.
    pub fn height_at(&self, p: FixedVec3) -> i32 {
        let Some(w) = self.barycentric(p) else {
            return self.points[0].y;
        };
        self.blend_heights(w)
    }

    /// Height at `p` with barycentric weights clamped to `0..=1`, so points
    /// off the triangle never extrapolate the slope.
    pub fn height_at_clamped(&self, p: FixedVec3) -> i32 {
        let Some([w1, w2, _, den]) = self.barycentric(p) else {
            return self.points[0].y;
        };
        let w1 = w1.clamp(0, den);
        let w2 = w2.clamp(0, den);
        let w3 = (den - w1 - w2).clamp(0, den);
        self.blend_heights([w1, w2, w3, den])
    }

    /// Barycentric numerators for the three corners plus their shared
    /// positive denominator. `None` for degenerate triangles.
    fn barycentric(&self, p: FixedVec3) -> Option<[i128; 4]> {
        let [a, b, c] = self.points.map(|v| (v.x as i128, v.z as i128));
        let (px, pz) = (p.x as i128, p.z as i128);
        let mut den = (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1);
        if den == 0 {
            return None;
        }
        let mut w1 = (b.1 - c.1) * (px - c.0) + (c.0 - b.0) * (pz - c.1);
        let mut w2 = (c.1 - a.1) * (px - c.0) + (a.0 - c.0) * (pz - c.1);
        if den < 0 {
            den = -den;
            w1 = -w1;
            w2 = -w2;
        }
        Some([w1, w2, den - w1 - w2, den])
    }

    fn blend_heights(&self, [w1, w2, w3, den]: [i128; 4]) -> i32 {
        let [a, b, c] = self.points;
        let weighted = w1 * a.y as i128 + w2 * b.y as i128 + w3 * c.y as i128;
        saturate_i32(divide_round(weighted, den))
    }
}
