use bevy::prelude::*;

use super::{MeshId, NavMesh, NavMeshData, NavTriangle, TriangleRef, TriangleShape};
use crate::nav::error::{NavError, NavMeshError};
use crate::nav::fixed_math::FixedVec3;

/// Every loaded navmesh, addressed by [`MeshId`].
///
/// Replaces any process-wide "current navmesh": callers hold the registry
/// and pass it by reference into every query. The generation increases on
/// each insert or removal so spatial indexes built from an older snapshot
/// can be detected.
#[derive(Resource, Debug, Default)]
pub struct NavMeshRegistry {
    meshes: Vec<Option<NavMesh>>,
    generation: u64,
}

impl NavMeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build `data` into a new mesh and register it under the next free id.
    pub fn insert(&mut self, data: &NavMeshData) -> Result<MeshId, NavMeshError> {
        let id = MeshId(self.meshes.len() as u32);
        let mesh = NavMesh::from_data(id, data)?;
        info!(
            "[NAVMESH] Registered mesh {:?}: {} vertices, {} triangles",
            id,
            mesh.vertices().len(),
            mesh.triangle_count()
        );
        self.meshes.push(Some(mesh));
        self.generation += 1;
        Ok(id)
    }

    /// Rebuild the mesh stored under `id` from new data.
    pub fn replace(&mut self, id: MeshId, data: &NavMeshData) -> Result<(), NavMeshError> {
        let mesh = NavMesh::from_data(id, data)?;
        let index = id.0 as usize;
        if index >= self.meshes.len() {
            self.meshes.resize_with(index + 1, || None);
        }
        self.meshes[index] = Some(mesh);
        self.generation += 1;
        Ok(())
    }

    pub fn remove(&mut self, id: MeshId) -> Option<NavMesh> {
        let removed = self.meshes.get_mut(id.0 as usize)?.take();
        if removed.is_some() {
            self.generation += 1;
        }
        removed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Like [`get`](Self::get), for callers that treat a missing mesh as an error.
    pub fn mesh(&self, id: MeshId) -> Result<&NavMesh, NavError> {
        self.get(id).ok_or(NavError::UnknownMesh(id))
    }

    pub fn get(&self, id: MeshId) -> Option<&NavMesh> {
        self.meshes.get(id.0 as usize)?.as_ref()
    }

    /// Registered meshes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &NavMesh> {
        self.meshes.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().all(|m| m.triangle_count() == 0)
    }

    pub fn triangle_count(&self) -> usize {
        self.iter().map(NavMesh::triangle_count).sum()
    }

    pub fn triangle(&self, tri: TriangleRef) -> Option<&NavTriangle> {
        self.get(tri.mesh)?.triangle(tri.index)
    }

    pub fn shape(&self, tri: TriangleRef) -> Option<TriangleShape> {
        self.get(tri.mesh)?.shape(tri.index)
    }

    pub fn neighbor_across(&self, tri: TriangleRef, edge: usize) -> Option<(TriangleRef, usize)> {
        let mesh = self.get(tri.mesh)?;
        let (n, k) = mesh.neighbor_across(tri.index, edge)?;
        Some((mesh.triangle_ref(n), k))
    }

    /// Portal between two triangles of the same mesh.
    pub fn portal(&self, from: TriangleRef, to: TriangleRef) -> Option<(FixedVec3, FixedVec3)> {
        if from.mesh != to.mesh {
            return None;
        }
        self.get(from.mesh)?.portal(from.index, to.index)
    }
}
