use thiserror::Error;

use super::mesh::MeshId;

/// Rejections raised while turning [`NavMeshData`](super::mesh::NavMeshData)
/// into a [`NavMesh`](super::mesh::NavMesh).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavMeshError {
    #[error("triangle {triangle} references vertex {vertex}, but the mesh has {vertex_count} vertices")]
    VertexOutOfRange { triangle: usize, vertex: u32, vertex_count: usize },

    #[error("triangle {triangle} lists neighbor {neighbor}, but the mesh has {triangle_count} triangles")]
    NeighborOutOfRange { triangle: usize, neighbor: u32, triangle_count: usize },

    #[error("vertex {vertex} lies outside the navigable coordinate range")]
    VertexOutsideRange { vertex: usize },

    #[error("triangle {triangle} repeats a vertex index")]
    RepeatedVertex { triangle: usize },

    #[error("triangle {triangle} is counter-clockwise (signed area {area2})")]
    CounterClockwise { triangle: usize, area2: i64 },

    #[error("mesh has {0} triangles, more than a u32 index can address")]
    TooManyTriangles(usize),
}

/// Failures of the query layer itself, as opposed to "nothing found".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavError {
    #[error("rasterizer was built for registry generation {built}, registry is at {current}")]
    StaleRasterizer { built: u64, current: u64 },

    #[error("no navmesh registered under {0:?}")]
    UnknownMesh(MeshId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FunnelError {
    #[error("portal sides differ in length: {left} left, {right} right")]
    MismatchedPortals { left: usize, right: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("{field} = {value} is outside the representable range")]
    OutOfRange { field: &'static str, value: f32 },
}
