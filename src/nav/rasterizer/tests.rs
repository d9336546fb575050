use super::*;
use crate::nav::mesh::{MeshId, NavMeshData, TriangleData};

const UNIT: i32 = 1000;

fn p(x: i32, z: i32) -> FixedVec3 {
    FixedVec3::ground(x * UNIT, z * UNIT)
}

fn registry_with(data: &NavMeshData) -> NavMeshRegistry {
    let mut registry = NavMeshRegistry::new();
    registry.insert(data).expect("mesh builds");
    registry
}

fn tri(mesh: u32, index: u32) -> TriangleRef {
    TriangleRef::new(MeshId(mesh), index)
}

#[test]
fn test_build_dimensions_and_candidates() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);

    assert_eq!((grid.cols(), grid.rows()), (3, 3));
    assert_eq!(grid.origin(), FixedVec2::ZERO);
    // Both triangles span the whole square, so every cell lists both in order.
    for cy in 0..3 {
        for cx in 0..3 {
            assert_eq!(grid.candidates(cx, cy), &[tri(0, 0), tri(0, 1)]);
        }
    }
    assert!(grid.candidates(3, 0).is_empty(), "outside the grid");
    assert!(grid.is_current(&registry));
}

#[test]
fn test_small_triangles_touch_only_their_cells() {
    let registry = registry_with(&NavMeshData::grid(4, 4, 4 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);
    assert_eq!((grid.cols(), grid.rows()), (4, 4));

    // Cell (2, 1) owns triangles 2 * (1 * 4 + 2) and the next one, and the
    // shared cell borders pull in the neighbors' triangles too.
    let cell = grid.candidates(2, 1);
    assert!(cell.contains(&tri(0, 12)));
    assert!(cell.contains(&tri(0, 13)));
    assert!(!cell.contains(&tri(0, 0)), "far triangles stay out");
}

#[test]
fn test_empty_registry_gives_empty_grid() {
    let registry = NavMeshRegistry::new();
    let grid = NavRasterizer::build(&registry, 4 * UNIT);
    assert!(grid.is_empty());
    assert_eq!(grid.locate(&registry, p(0, 0)), None);
    assert_eq!(grid.nearest(&registry, p(0, 0), None), None);
    assert_eq!(grid.ray_segment_intersect(&registry, p(-1, 0), p(1, 0)), None);
}

#[test]
fn test_invalid_cell_size_falls_back_to_default() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 0);
    assert_eq!(grid.cell_size(), DEFAULT_CELL_SIZE);
}

#[test]
fn test_locate_inside_and_outside() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);

    assert_eq!(grid.locate(&registry, p(2, 8)), Some(tri(0, 0)));
    assert_eq!(grid.locate(&registry, p(8, 2)), Some(tri(0, 1)));
    assert_eq!(grid.locate(&registry, p(5, 5)), Some(tri(0, 0)), "shared edge goes to the first candidate");
    assert_eq!(grid.locate(&registry, p(10, 10)), Some(tri(0, 0)), "far corner is inclusive");
    assert_eq!(grid.locate(&registry, p(12, 5)), None);
}

#[test]
fn test_nearest_from_far_outside_matches_brute_force() {
    let registry = registry_with(&NavMeshData::grid(4, 4, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);
    let point = FixedVec3::ground(90 * UNIT, 21_300);

    let mesh = registry.get(MeshId(0)).expect("mesh");
    let brute = mesh
        .triangles()
        .iter()
        .enumerate()
        .min_by_key(|(_, t)| t.centroid.xz_sqr_distance(point))
        .map(|(i, _)| tri(0, i as u32));

    let found = grid.nearest(&registry, point, None);
    assert_eq!(found, brute);
    assert_eq!(found, Some(tri(0, 23)));
}

#[test]
fn test_nearest_keeps_searching_past_first_nonempty_cell() {
    // A large triangle listed in every cell and a small one just past the
    // query point's cell: the small one's centroid is much closer.
    let data = NavMeshData {
        vertices: vec![p(0, 0), p(0, 40), p(40, 40), p(41, 0), p(41, 4), p(45, 4)],
        triangles: vec![TriangleData::new([0, 1, 2]), TriangleData::new([3, 4, 5])],
    };
    let registry = registry_with(&data);
    let grid = NavRasterizer::build(&registry, 4 * UNIT);
    let point = p(38, 1);

    assert_eq!(grid.locate(&registry, point), None);
    assert_eq!(grid.nearest(&registry, point, None), Some(tri(0, 1)));
}

#[test]
fn test_nearest_point_clamps_onto_triangle() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);

    let (t, clamped) = grid.nearest_point(&registry, p(15, 3), None).expect("mesh is not empty");
    assert_eq!(t, tri(0, 1));
    assert_eq!(clamped, p(10, 3));

    let (t, inside) = grid.nearest_point(&registry, p(2, 7), None).expect("located");
    assert_eq!((t, inside), (tri(0, 0), p(2, 7)));
}

#[test]
fn test_ray_from_outside_hits_boundary_edge() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);

    let hit = grid.ray_segment_intersect(&registry, p(-5, 5), p(5, 5)).expect("enters the square");
    assert_eq!(hit.triangle, tri(0, 0));
    assert_eq!(hit.edge, 0);
    assert_eq!(hit.point, p(0, 5));
    assert_eq!(hit.along, RationalFactor::new(1, 2));
}

#[test]
fn test_ray_returns_crossing_nearest_start() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);

    let hit = grid.ray_segment_intersect(&registry, p(3, 1), p(3, 20)).expect("crosses the diagonal");
    assert_eq!(hit.point, p(3, 3));
    assert_eq!((hit.triangle, hit.edge), (tri(0, 0), 2));
}

#[test]
fn test_ray_that_misses_returns_none() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);
    assert_eq!(grid.ray_segment_intersect(&registry, p(-5, -5), p(-5, 20)), None);
    assert_eq!(grid.ray_segment_intersect(&registry, p(20, 20), p(30, 40)), None);
}

#[test]
fn test_ray_from_far_off_mesh_is_clipped_to_grid() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, UNIT);

    let hit = grid.ray_segment_intersect(&registry, p(-100_000, 5), p(5, 5)).expect("enters from the west");
    assert_eq!((hit.triangle, hit.edge, hit.point), (tri(0, 0), 0, p(0, 5)));

    let hit = grid.ray_segment_intersect(&registry, p(100_000, 5), p(5, 5)).expect("enters from the east");
    assert_eq!((hit.triangle, hit.point), (tri(0, 1), p(10, 5)));

    assert_eq!(grid.ray_segment_intersect(&registry, p(-100_000, -5), p(100_000, -5)), None);
}

#[test]
fn test_segment_intersect_in_cell() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 10 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);

    let hit = grid
        .segment_intersect_in_cell(&registry, p(-5, 5), p(5, 5), 0, 1)
        .expect("cell lists the square");
    assert_eq!((hit.triangle, hit.edge, hit.point), (tri(0, 0), 0, p(0, 5)));
    assert!(grid.segment_intersect_in_cell(&registry, p(-5, 5), p(5, 5), 7, 7).is_none());
}

#[test]
fn test_segment_overlaps_cell() {
    let registry = registry_with(&NavMeshData::grid(1, 1, 12 * UNIT));
    let grid = NavRasterizer::build(&registry, 4 * UNIT);
    assert!(grid.segment_overlaps_cell(p(0, 1), p(12, 1), 2, 0));
    assert!(!grid.segment_overlaps_cell(p(0, 1), p(12, 1), 1, 1));
}

#[test]
fn test_rebuild_is_deterministic_and_tracks_generation() {
    let mut registry = registry_with(&NavMeshData::grid(6, 5, 3 * UNIT));
    let a = NavRasterizer::build(&registry, 4 * UNIT);
    let b = NavRasterizer::build(&registry, 4 * UNIT);
    for cy in 0..a.rows() {
        for cx in 0..a.cols() {
            assert_eq!(a.candidates(cx, cy), b.candidates(cx, cy));
        }
    }

    registry.insert(&NavMeshData::grid(1, 1, UNIT)).expect("second mesh");
    assert!(!a.is_current(&registry));
    assert!(NavRasterizer::build(&registry, 4 * UNIT).is_current(&registry));
}
