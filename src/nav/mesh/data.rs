use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{MeshId, NavTriangle, TileCoord, TriangleShape};
use crate::nav::error::{ConfigError, NavMeshError};
use crate::nav::fixed_math::FixedVec3;

/// Serialized navmesh as handed over by the mesh baker.
///
/// ```ron
/// (
///     vertices: [(x: 0, y: 0, z: 0), (x: 0, y: 0, z: 10000), (x: 10000, y: 0, z: 10000)],
///     triangles: [(vertices: (0, 1, 2))],
/// )
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavMeshData {
    pub vertices: Vec<FixedVec3>,
    pub triangles: Vec<TriangleData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleData {
    pub vertices: [u32; 3],
    #[serde(default)]
    pub tile: TileCoord,
    /// Explicit adjacency. Left out, it is derived from shared edges.
    #[serde(default)]
    pub neighbors: Option<Vec<u32>>,
}

impl TriangleData {
    pub fn new(vertices: [u32; 3]) -> Self {
        Self { vertices, tile: TileCoord::default(), neighbors: None }
    }

    pub fn in_tile(mut self, tile: TileCoord) -> Self {
        self.tile = tile;
        self
    }
}

impl NavMeshData {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Flat grid of `cols` x `rows` square cells, `spacing` raw units wide,
    /// each cell split along its rising diagonal. Cell `(x, z)` owns
    /// triangles `2 * (z * cols + x)` and the one after it.
    pub fn grid(cols: u32, rows: u32, spacing: i32) -> Self {
        let stride = cols + 1;
        let vertices = (0..=rows)
            .flat_map(|z| (0..=cols).map(move |x| FixedVec3::ground(x as i32 * spacing, z as i32 * spacing)))
            .collect();
        let mut triangles = Vec::with_capacity((cols * rows * 2) as usize);
        for z in 0..rows {
            for x in 0..cols {
                let v00 = z * stride + x;
                let v01 = (z + 1) * stride + x;
                let v11 = v01 + 1;
                let v10 = v00 + 1;
                triangles.push(TriangleData::new([v00, v01, v11]));
                triangles.push(TriangleData::new([v00, v11, v10]));
            }
        }
        Self { vertices, triangles }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

pub(super) fn build_triangles(id: MeshId, data: &NavMeshData) -> Result<Vec<NavTriangle>, NavMeshError> {
    let vertex_count = data.vertices.len();
    let triangle_count = data.triangles.len();
    if u32::try_from(triangle_count).is_err() {
        return Err(NavMeshError::TooManyTriangles(triangle_count));
    }

    if let Some(vertex) = data.vertices.iter().position(|v| !v.is_in_range()) {
        return Err(NavMeshError::VertexOutsideRange { vertex });
    }

    for (t, tri) in data.triangles.iter().enumerate() {
        for &v in &tri.vertices {
            if v as usize >= vertex_count {
                return Err(NavMeshError::VertexOutOfRange { triangle: t, vertex: v, vertex_count });
            }
        }
        let [a, b, c] = tri.vertices;
        if a == b || b == c || a == c {
            return Err(NavMeshError::RepeatedVertex { triangle: t });
        }
        let area2 = TriangleShape::new(tri.vertices.map(|v| data.vertices[v as usize])).area2();
        if area2 > 0 {
            return Err(NavMeshError::CounterClockwise { triangle: t, area2 });
        }
        if let Some(neighbors) = &tri.neighbors {
            if let Some(&n) = neighbors.iter().find(|&&n| n as usize >= triangle_count) {
                return Err(NavMeshError::NeighborOutOfRange { triangle: t, neighbor: n, triangle_count });
            }
        }
    }

    let derived = if data.triangles.iter().any(|t| t.neighbors.is_none()) {
        derive_neighbors(data)
    } else {
        Vec::new()
    };

    Ok(data
        .triangles
        .iter()
        .enumerate()
        .map(|(t, tri)| {
            let neighbors: SmallVec<[u32; 3]> = match &tri.neighbors {
                Some(explicit) => explicit.iter().copied().collect(),
                None => derived[t].clone(),
            };
            let shape = TriangleShape::new(tri.vertices.map(|v| data.vertices[v as usize]));
            NavTriangle {
                vertices: tri.vertices,
                mesh: id,
                tile: tri.tile,
                neighbors,
                centroid: shape.centroid(),
            }
        })
        .collect())
}

/// Pair triangles whose edges run between the same two vertex indices in
/// opposite directions.
fn derive_neighbors(data: &NavMeshData) -> Vec<SmallVec<[u32; 3]>> {
    let mut edges: FxHashMap<(u32, u32), u32> = FxHashMap::default();
    for (t, tri) in data.triangles.iter().enumerate() {
        for i in 0..3 {
            edges.insert((tri.vertices[i], tri.vertices[(i + 1) % 3]), t as u32);
        }
    }

    data.triangles
        .iter()
        .map(|tri| {
            let mut neighbors = SmallVec::new();
            for i in 0..3 {
                let reversed = (tri.vertices[(i + 1) % 3], tri.vertices[i]);
                if let Some(&n) = edges.get(&reversed) {
                    if !neighbors.contains(&n) {
                        neighbors.push(n);
                    }
                }
            }
            neighbors
        })
        .collect()
}
