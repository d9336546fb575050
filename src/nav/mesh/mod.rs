//! Triangle navigation meshes.
//!
//! A [`NavMesh`] owns a vertex buffer and the triangles indexing into it.
//! Triangles wind clockwise seen from +Y and know their neighbors by index,
//! so adjacency walks never leave the owning mesh. Meshes are immutable once
//! built; the [`NavMeshRegistry`] swaps whole meshes and bumps its
//! generation instead of mutating them in place.

use serde::{Deserialize, Serialize};

use super::error::NavMeshError;
use super::fixed_math::FixedVec3;

pub use data::{NavMeshData, TriangleData};
pub use fan::FanMember;
pub use registry::NavMeshRegistry;
pub use triangle::{NavTriangle, TriangleShape};

mod adjacency;
mod data;
mod fan;
mod registry;
mod triangle;

/// Index of a mesh inside the [`NavMeshRegistry`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeshId(pub u32);

/// Stable handle of one triangle: owning mesh plus index in that mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriangleRef {
    pub mesh: MeshId,
    pub index: u32,
}

impl TriangleRef {
    pub const fn new(mesh: MeshId, index: u32) -> Self {
        Self { mesh, index }
    }
}

/// Tile a triangle was baked in. Meshes built as a single tile leave this
/// at the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

#[derive(Clone, Debug)]
pub struct NavMesh {
    id: MeshId,
    vertices: Vec<FixedVec3>,
    triangles: Vec<NavTriangle>,
}

impl NavMesh {
    /// Validate `data` and build the mesh, computing adjacency for triangles
    /// that do not list their neighbors.
    pub fn from_data(id: MeshId, data: &NavMeshData) -> Result<Self, NavMeshError> {
        let triangles = data::build_triangles(id, data)?;
        Ok(Self {
            id,
            vertices: data.vertices.clone(),
            triangles,
        })
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn vertices(&self) -> &[FixedVec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[NavTriangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangle(&self, index: u32) -> Option<&NavTriangle> {
        self.triangles.get(index as usize)
    }

    pub fn triangle_ref(&self, index: u32) -> TriangleRef {
        TriangleRef::new(self.id, index)
    }

    /// Vertex positions of triangle `index`, in winding order.
    pub fn shape(&self, index: u32) -> Option<TriangleShape> {
        let tri = self.triangle(index)?;
        Some(self.shape_of(tri))
    }

    pub(crate) fn shape_of(&self, tri: &NavTriangle) -> TriangleShape {
        // Indices were range-checked when the mesh was built.
        TriangleShape::new(tri.vertices.map(|v| self.vertices[v as usize]))
    }
}
