use bevy::prelude::*;

use super::{NavMesh, NavTriangle};
use crate::nav::fixed_math::FixedVec3;

/// Ground-plane axis a tile seam runs along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SeamAxis {
    /// Tiles differ in X; seam edges share an X coordinate.
    X,
    /// Tiles differ in Z; seam edges share a Z coordinate.
    Z,
}

impl SeamAxis {
    fn across(self, p: FixedVec3) -> i32 {
        match self {
            SeamAxis::X => p.x,
            SeamAxis::Z => p.z,
        }
    }

    fn along(self, p: FixedVec3) -> i32 {
        match self {
            SeamAxis::X => p.z,
            SeamAxis::Z => p.x,
        }
    }

    fn with_along(self, p: FixedVec3, value: i32) -> FixedVec3 {
        match self {
            SeamAxis::X => FixedVec3 { z: value, ..p },
            SeamAxis::Z => FixedVec3 { x: value, ..p },
        }
    }
}

impl NavMesh {
    /// The neighbor sharing `edge` of triangle `index`, with the neighbor's
    /// index for that same edge.
    ///
    /// A neighbor shares the edge in reverse orientation. Vertex indices are
    /// matched first; seams whose vertices were duplicated per tile fall back
    /// to exact positions.
    pub fn neighbor_across(&self, index: u32, edge: usize) -> Option<(u32, usize)> {
        let tri = self.triangle(index)?;
        let va = tri.vertices[edge % 3];
        let vb = tri.vertices[(edge + 1) % 3];

        for &n in &tri.neighbors {
            let Some(other) = self.triangle(n) else { continue };
            for k in 0..3 {
                if other.vertices[k] == vb && other.vertices[(k + 1) % 3] == va {
                    return Some((n, k));
                }
            }
        }

        let pa = self.vertices[va as usize];
        let pb = self.vertices[vb as usize];
        for &n in &tri.neighbors {
            let Some(other) = self.triangle(n) else { continue };
            let shape = self.shape_of(other);
            for k in 0..3 {
                if shape.point(k) == pb && shape.point(k + 1) == pa {
                    return Some((n, k));
                }
            }
        }
        None
    }

    /// Edge of `a` that `b` lies across, if they are neighbors.
    pub fn shared_edge(&self, a: u32, b: u32) -> Option<usize> {
        let tri = self.triangle(a)?;
        if !tri.neighbors.contains(&b) {
            return None;
        }
        (0..3).find(|&edge| matches!(self.neighbor_across(a, edge), Some((n, _)) if n == b))
    }

    /// The opening from `from` into `to` as `(left, right)` as seen walking
    /// from `from`.
    ///
    /// Within one tile the shared edge is returned as-is. Across a tile seam
    /// both edges only need to lie on the seam line, and the portal is
    /// clamped to the stretch both edges cover.
    pub fn portal(&self, from: u32, to: u32) -> Option<(FixedVec3, FixedVec3)> {
        let a = self.triangle(from)?;
        let b = self.triangle(to)?;

        if a.tile == b.tile {
            let edge = self.shared_edge(from, to)?;
            let shape = self.shape_of(a);
            return Some(shape.edge(edge));
        }

        let dx = (a.tile.x - b.tile.x).abs();
        let dz = (a.tile.z - b.tile.z).abs();
        let axis = match (dx, dz) {
            (1, 0) => SeamAxis::X,
            (0, 1) => SeamAxis::Z,
            _ => {
                warn!(
                    "[NAVMESH] Portal requested between non-adjacent tiles {:?} and {:?}",
                    a.tile, b.tile
                );
                return None;
            }
        };
        self.seam_portal(a, b, axis)
    }

    fn seam_portal(&self, a: &NavTriangle, b: &NavTriangle, axis: SeamAxis) -> Option<(FixedVec3, FixedVec3)> {
        let sa = self.shape_of(a);
        let sb = self.shape_of(b);
        for i in 0..3 {
            let (l, r) = sa.edge(i);
            if axis.across(l) != axis.across(r) {
                continue;
            }
            for j in 0..3 {
                let (ol, or) = sb.edge(j);
                if axis.across(l) != axis.across(or) || axis.across(r) != axis.across(ol) {
                    continue;
                }
                let lo = axis.along(l).min(axis.along(r)).max(axis.along(ol).min(axis.along(or)));
                let hi = axis.along(l).max(axis.along(r)).min(axis.along(ol).max(axis.along(or)));
                if lo > hi {
                    continue;
                }
                return Some(if axis.along(l) < axis.along(r) {
                    (axis.with_along(l, lo), axis.with_along(r, hi))
                } else {
                    (axis.with_along(l, hi), axis.with_along(r, lo))
                });
            }
        }
        None
    }
}
