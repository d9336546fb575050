use bevy::prelude::*;

use crate::nav::fixed_math::{FixedVec2, FixedVec3, RationalFactor};
use crate::nav::mesh::{NavMeshRegistry, TriangleRef, TriangleShape};

mod grid;
mod query;
#[cfg(test)]
mod tests;

/// Cell edge length used when none is configured: four world units.
pub const DEFAULT_CELL_SIZE: i32 = 4000;

/// Uniform grid over the ground-plane footprint of every registered navmesh.
///
/// Each cell lists the triangles whose bounding box touches it, in registry
/// order (mesh id, then triangle index), so every peer scans candidates in
/// the same sequence.
///
/// # Queries
///
/// - [`locate`](Self::locate): the triangle containing a point
/// - [`nearest`](Self::nearest): closest triangle by centroid distance,
///   via an expanding ring search
/// - [`ray_segment_intersect`](Self::ray_segment_intersect): first triangle
///   edge crossed by a segment, via grid traversal
/// - [`segment_intersect_in_cell`](Self::segment_intersect_in_cell): the same
///   test restricted to one cell
///
/// The grid is rebuilt wholesale from a registry snapshot and remembers that
/// snapshot's generation.
#[derive(Resource, Clone, Debug)]
pub struct NavRasterizer {
    origin: FixedVec2,
    cell_size: i32,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<TriangleRef>>,
    generation: u64,
}

/// A triangle edge crossed by a query segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmentHit {
    pub triangle: TriangleRef,
    pub edge: usize,
    pub point: FixedVec3,
    /// Parameter of `point` along the query segment, `0..=1`.
    pub along: RationalFactor,
}

impl Default for NavRasterizer {
    fn default() -> Self {
        Self::empty(DEFAULT_CELL_SIZE)
    }
}

impl NavRasterizer {
    /// A grid with no cells. Every query on it returns `None`.
    pub fn empty(cell_size: i32) -> Self {
        Self {
            origin: FixedVec2::ZERO,
            cell_size: cell_size.max(1),
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            generation: 0,
        }
    }

    /// Rasterize every triangle of every mesh in `registry`.
    pub fn build(registry: &NavMeshRegistry, cell_size: i32) -> Self {
        let cell_size = if cell_size > 0 {
            cell_size
        } else {
            warn!("[RASTERIZER] Invalid cell size {}, using {}", cell_size, DEFAULT_CELL_SIZE);
            DEFAULT_CELL_SIZE
        };

        let mut bounds: Option<(FixedVec2, FixedVec2)> = None;
        for mesh in registry.iter() {
            for tri in mesh.triangles() {
                let (lo, hi) = mesh.shape_of(tri).bounds();
                bounds = Some(match bounds {
                    Some((min, max)) => (min.min(lo), max.max(hi)),
                    None => (lo, hi),
                });
            }
        }

        let Some((min, max)) = bounds else {
            let mut grid = Self::empty(cell_size);
            grid.generation = registry.generation();
            return grid;
        };

        let cells_along = |extent: i32| -> usize {
            let extent = extent as i64;
            ((extent + cell_size as i64 - 1) / cell_size as i64).max(1) as usize
        };
        let cols = cells_along(max.x - min.x);
        let rows = cells_along(max.y - min.y);

        let mut grid = Self {
            origin: min,
            cell_size,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
            generation: registry.generation(),
        };
        for mesh in registry.iter() {
            for (index, tri) in mesh.triangles().iter().enumerate() {
                grid.insert(mesh.triangle_ref(index as u32), &mesh.shape_of(tri));
            }
        }

        info!(
            "[RASTERIZER] Built {}x{} grid (cell {}) over {} triangles, generation {}",
            cols,
            rows,
            cell_size,
            registry.triangle_count(),
            grid.generation
        );
        grid
    }

    /// Add `triangle` to every cell its bounding box covers.
    pub fn insert(&mut self, triangle: TriangleRef, shape: &TriangleShape) {
        if self.cells.is_empty() {
            return;
        }
        let (lo, hi) = shape.bounds();
        let (x0, y0) = self.clamped_cell_of(lo);
        let (x1, y1) = self.clamped_cell_of(hi);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let idx = y * self.cols + x;
                self.cells[idx].push(triangle);
            }
        }
    }

    pub fn origin(&self) -> FixedVec2 {
        self.origin
    }

    pub fn cell_size(&self) -> i32 {
        self.cell_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Built from the registry's current snapshot.
    pub fn is_current(&self, registry: &NavMeshRegistry) -> bool {
        self.generation == registry.generation()
    }

    /// Candidates of cell `(cx, cy)`; empty outside the grid.
    pub fn candidates(&self, cx: usize, cy: usize) -> &[TriangleRef] {
        if cx >= self.cols || cy >= self.rows {
            return &[];
        }
        &self.cells[cy * self.cols + cx]
    }
}
