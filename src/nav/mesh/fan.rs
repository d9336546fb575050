use fixedbitset::FixedBitSet;
use smallvec::SmallVec;

use super::NavMesh;
use crate::nav::fixed_math::FixedVec3;

/// One triangle around a shared vertex, rotated so the shared vertex comes
/// first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FanMember {
    pub triangle: u32,
    /// Local index of the shared vertex in `triangle`.
    pub corner: usize,
    /// The shared vertex, then the other two in winding order.
    pub points: [FixedVec3; 3],
}

impl NavMesh {
    /// Collect every triangle reachable from `start` through adjacency that
    /// uses mesh vertex `vertex`, depth first in neighbor order.
    ///
    /// `visited` is scratch space; it is cleared and grown to the mesh size.
    pub fn collect_fan(
        &self,
        start: u32,
        vertex: u32,
        visited: &mut FixedBitSet,
        out: &mut SmallVec<[FanMember; 8]>,
    ) {
        out.clear();
        visited.clear();
        visited.grow(self.triangle_count());

        let mut stack: SmallVec<[u32; 16]> = SmallVec::new();
        stack.push(start);
        while let Some(index) = stack.pop() {
            let Some(tri) = self.triangle(index) else { continue };
            if visited.contains(index as usize) {
                continue;
            }
            let Some(corner) = tri.local_index_of(vertex) else { continue };
            visited.insert(index as usize);

            let shape = self.shape_of(tri);
            out.push(FanMember {
                triangle: index,
                corner,
                points: [shape.point(corner), shape.point(corner + 1), shape.point(corner + 2)],
            });
            stack.extend(tri.neighbors.iter().rev().copied());
        }
    }
}
