//! Constrained agent movement over the navmesh.
//!
//! Given an agent position and the displacement it wants this tick, the
//! resolver returns how far it may actually go. It walks triangle adjacency
//! along the straight line. Where the line leaves the mesh it slides along
//! the blocking edge, and where it starts exactly on a vertex it chooses
//! among the triangle fan around that vertex. All of it runs on integers,
//! so every lockstep peer lands on the same millimetre.

use bevy::prelude::*;
use fixedbitset::FixedBitSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::config::NavSettings;
use super::error::NavError;
use super::fixed_math::FixedVec3;
use super::mesh::{FanMember, NavMeshRegistry, TriangleRef};
use super::rasterizer::NavRasterizer;

mod target;
mod walk;
#[cfg(test)]
mod tests;

/// One agent's movement attempt for a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub position: FixedVec3,
    pub displacement: FixedVec3,
    /// Triangle the agent ended in last tick, tried before a grid lookup.
    pub hint: Option<TriangleRef>,
}

impl MoveRequest {
    pub fn new(position: FixedVec3, displacement: FixedVec3) -> Self {
        Self { position, displacement, hint: None }
    }

    pub fn with_hint(mut self, hint: Option<TriangleRef>) -> Self {
        self.hint = hint;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Displacement actually applied.
    pub displacement: FixedVec3,
    /// Mesh height at the resolved position, raw units.
    pub ground_height: i32,
    /// The ground-plane part of the request was cut short or redirected.
    pub collided: bool,
    /// Triangle holding the resolved position.
    pub triangle: Option<TriangleRef>,
}

/// Result of clamping a requested target onto the mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetValidation {
    pub target: FixedVec3,
    /// Triangle holding `target`; `None` when it is off the mesh.
    pub triangle: Option<TriangleRef>,
    /// `target` differs from the requested point.
    pub adjusted: bool,
}

impl TargetValidation {
    pub fn is_valid(&self) -> bool {
        self.triangle.is_some()
    }
}

/// Per-worker scratch space reused across movement calls.
#[derive(Debug, Default)]
pub struct MoveScratch {
    /// Triangles already slid through during the current call.
    checked: FixedBitSet,
    fan_visited: FixedBitSet,
    fan: SmallVec<[FanMember; 8]>,
}

impl MoveScratch {
    fn reset(&mut self) {
        self.checked.clear();
    }

    fn mark_checked(&mut self, tri: TriangleRef) {
        let index = tri.index as usize;
        if index >= self.checked.len() {
            self.checked.grow(index + 1);
        }
        self.checked.insert(index);
    }

    fn is_checked(&self, index: u32) -> bool {
        self.checked.contains(index as usize)
    }
}

/// Read-only view over one registry snapshot and the grid built from it.
#[derive(Clone, Copy)]
pub struct MovementResolver<'a> {
    registry: &'a NavMeshRegistry,
    rasterizer: &'a NavRasterizer,
    settings: &'a NavSettings,
}

impl<'a> MovementResolver<'a> {
    /// Refuses a rasterizer built from a different registry generation.
    pub fn new(
        registry: &'a NavMeshRegistry,
        rasterizer: &'a NavRasterizer,
        settings: &'a NavSettings,
    ) -> Result<Self, NavError> {
        if !rasterizer.is_current(registry) {
            return Err(NavError::StaleRasterizer {
                built: rasterizer.generation(),
                current: registry.generation(),
            });
        }
        Ok(Self { registry, rasterizer, settings })
    }

    pub fn registry(&self) -> &'a NavMeshRegistry {
        self.registry
    }

    pub fn rasterizer(&self) -> &'a NavRasterizer {
        self.rasterizer
    }

    pub fn settings(&self) -> &'a NavSettings {
        self.settings
    }

    /// [`resolve`](Self::resolve) with throwaway scratch space.
    pub fn move_agent(&self, request: &MoveRequest) -> MoveOutcome {
        self.resolve(request, &mut MoveScratch::default())
    }

    /// Resolve one movement attempt.
    pub fn resolve(&self, request: &MoveRequest, scratch: &mut MoveScratch) -> MoveOutcome {
        let src = request.position;
        let delta = request.displacement;

        if delta.is_zero_xz() {
            return MoveOutcome {
                displacement: FixedVec3::ZERO,
                ground_height: src.y,
                collided: false,
                triangle: self.locate(src, request.hint),
            };
        }

        if !src.is_in_range() {
            warn!("[NAV_MOVE] Position {:?} is outside the navigable range", src);
            return MoveOutcome {
                displacement: FixedVec3::ZERO,
                ground_height: src.y,
                collided: true,
                triangle: None,
            };
        }

        // Clamped so every difference of two walked points fits an i32.
        let dest = src.clamped_add(delta);
        scratch.reset();

        let (start, entry) = match self.locate(src, request.hint) {
            Some(tri) => (tri, None),
            None => match self.rasterizer.ray_segment_intersect(self.registry, src, dest) {
                Some(hit) => (hit.triangle, Some((hit.edge, 2))),
                None => {
                    return MoveOutcome {
                        displacement: FixedVec3::ZERO,
                        ground_height: src.y,
                        collided: true,
                        triangle: None,
                    };
                }
            },
        };

        let resolved = self.run(start, entry, src, dest, scratch);
        let mut displacement = resolved.point - src;
        if !self.settings.apply_ground_height {
            displacement.y = 0;
        }
        MoveOutcome {
            displacement,
            ground_height: resolved.point.y,
            collided: displacement.x != delta.x || displacement.z != delta.z,
            triangle: Some(resolved.triangle),
        }
    }

    /// The hint when it still contains `point`, else a grid lookup.
    pub fn locate(&self, point: FixedVec3, hint: Option<TriangleRef>) -> Option<TriangleRef> {
        if let Some(hint) = hint {
            if self.registry.shape(hint).is_some_and(|s| s.contains_point(point)) {
                return Some(hint);
            }
        }
        self.rasterizer.locate(self.registry, point)
    }

    /// Mesh height under `point`, from the nearest triangle when `point`
    /// is off the mesh. Barycentric weights are clamped, so the height never
    /// extrapolates beyond the triangle's own vertices.
    pub fn ground_height(&self, point: FixedVec3) -> Option<i32> {
        let tri = self
            .rasterizer
            .nearest(self.registry, point, self.settings.nearest_max_ring)?;
        Some(self.registry.shape(tri)?.height_at_clamped(point))
    }

    /// Nearest triangle to `point` and the closest point on it.
    pub fn nearest_point(&self, point: FixedVec3) -> Option<(TriangleRef, FixedVec3)> {
        self.rasterizer
            .nearest_point(self.registry, point, self.settings.nearest_max_ring)
    }
}
