use super::*;
use crate::nav::mesh::{MeshId, NavMeshData};

const UNIT: i32 = 1000;

fn p(x: i32, z: i32) -> FixedVec3 {
    FixedVec3::ground(x * UNIT, z * UNIT)
}

fn tri(index: u32) -> TriangleRef {
    TriangleRef::new(MeshId(0), index)
}

struct World {
    registry: NavMeshRegistry,
    rasterizer: NavRasterizer,
    settings: NavSettings,
}

impl World {
    fn new(data: &NavMeshData) -> Self {
        let mut registry = NavMeshRegistry::new();
        registry.insert(data).expect("mesh builds");
        let settings = NavSettings::default();
        let rasterizer = NavRasterizer::build(&registry, settings.cell_size);
        Self { registry, rasterizer, settings }
    }

    /// 10 x 10 square split along the (0,0)-(10,10) diagonal.
    fn square() -> Self {
        Self::new(&NavMeshData::grid(1, 1, 10 * UNIT))
    }

    fn resolver(&self) -> MovementResolver<'_> {
        MovementResolver::new(&self.registry, &self.rasterizer, &self.settings).expect("fresh rasterizer")
    }

    fn move_by(&self, from: FixedVec3, by: FixedVec3) -> MoveOutcome {
        self.resolver().move_agent(&MoveRequest::new(from, by))
    }
}

#[test]
fn test_blocked_by_far_edge_of_split_square() {
    let world = World::square();
    let outcome = world.move_by(p(1, 1), p(20, 0));

    assert_eq!(outcome.displacement, p(9, 0), "stops on the x = 10 boundary");
    assert!(outcome.collided);
    assert_eq!(outcome.triangle, Some(tri(1)));
    assert_eq!(outcome.ground_height, 0);
}

#[test]
fn test_unobstructed_move_is_returned_unchanged() {
    let world = World::square();

    let inside = world.move_by(p(2, 6), p(1, 2));
    assert_eq!(inside.displacement, p(1, 2));
    assert!(!inside.collided);
    assert_eq!(inside.triangle, Some(tri(0)));

    let across_diagonal = world.move_by(p(2, 6), p(6, -3));
    assert_eq!(across_diagonal.displacement, p(6, -3));
    assert!(!across_diagonal.collided);
    assert_eq!(across_diagonal.triangle, Some(tri(1)));
}

#[test]
fn test_zero_displacement_keeps_height() {
    let world = World::square();
    let outcome = world.move_by(FixedVec3::new(3000, 250, 7000), FixedVec3::new(0, 40, 0));
    assert_eq!(outcome.displacement, FixedVec3::ZERO);
    assert_eq!(outcome.ground_height, 250);
    assert!(!outcome.collided);
}

#[test]
fn test_head_on_into_boundary_ends_on_edge() {
    let world = World::square();
    let outcome = world.move_by(p(5, 2), p(0, -10));
    assert_eq!(outcome.displacement, p(0, -2));
    assert!(outcome.collided);
}

#[test]
fn test_oblique_hit_slides_along_boundary() {
    let world = World::square();
    let outcome = world.move_by(p(5, 2), p(3, -10));

    // Crosses z = 0 at x = 5.6 and keeps the full tangential component.
    assert_eq!(outcome.displacement, FixedVec3::new(3600, 0, -2000));
    assert!(outcome.collided);
}

#[test]
fn test_slide_stops_in_corner_without_neighbor() {
    let world = World::square();
    let outcome = world.move_by(p(9, 3), p(2, -5));
    assert_eq!(p(9, 3) + outcome.displacement, p(10, 0));
    assert!(outcome.collided);
}

#[test]
fn test_slide_past_vertex_continues_through_fan() {
    let world = World::square();
    // Slides up the right wall, passes the (10, 10) vertex into the
    // neighbor, and the fan sends it along the top wall where it stops.
    let outcome = world.move_by(p(9, 5), p(5, 10));
    assert_eq!(p(9, 5) + outcome.displacement, p(10, 10));
    assert!(outcome.collided);
}

#[test]
fn test_fan_picks_wedge_containing_destination() {
    let world = World::new(&NavMeshData::grid(2, 2, 10 * UNIT));
    let outcome = world.move_by(p(10, 10), p(3, 1));
    assert_eq!(outcome.displacement, p(3, 1));
    assert!(!outcome.collided);
    assert_eq!(outcome.triangle, Some(tri(7)));
}

#[test]
fn test_off_mesh_start_recovers_through_ray() {
    let world = World::square();
    let outcome = world.move_by(p(-3, 5), p(6, 0));
    assert_eq!(p(-3, 5) + outcome.displacement, p(0, 5), "snaps onto the entry edge");
    assert!(outcome.collided);
    assert_eq!(outcome.triangle, Some(tri(0)));
}

#[test]
fn test_no_mesh_means_no_movement() {
    let registry = NavMeshRegistry::new();
    let settings = NavSettings::default();
    let rasterizer = NavRasterizer::build(&registry, settings.cell_size);
    let resolver = MovementResolver::new(&registry, &rasterizer, &settings).expect("empty but current");

    let outcome = resolver.move_agent(&MoveRequest::new(p(1, 1), p(5, 0)));
    assert_eq!(outcome.displacement, FixedVec3::ZERO);
    assert!(outcome.collided);
    assert_eq!(outcome.triangle, None);
}

#[test]
fn test_long_nearly_parallel_entry_stays_on_mesh() {
    let world = World::new(&NavMeshData::grid(1, 1, 1_000_000));
    let from = FixedVec3::new(500_000, 0, 1_000_500);
    let outcome = world.move_by(from, FixedVec3::new(1, 0, -900_000));

    assert!(outcome.triangle.is_some());
    let end = from + outcome.displacement;
    assert!((0..=1_000_000).contains(&end.x) && (0..=1_000_000).contains(&end.z), "ended at {:?}", end);
}

#[test]
fn test_huge_displacement_is_clamped_not_overflowed() {
    let world = World::square();
    let outcome = world.move_by(p(7, 3), FixedVec3::new(i32::MAX - 1000, 0, 0));
    assert_eq!(outcome.displacement, p(3, 0));
    assert!(outcome.collided);
    assert_eq!(outcome.triangle, Some(tri(1)));

    let outcome = world.move_by(p(7, 3), FixedVec3::new(0, 0, i32::MIN + 1));
    assert_eq!(outcome.displacement, p(0, -3));
    assert!(outcome.collided);
}

#[test]
fn test_position_outside_coordinate_range_does_not_move() {
    let world = World::square();
    let outcome = world.move_by(FixedVec3::ground(i32::MAX, 5000), p(-1, 0));
    assert_eq!(outcome.displacement, FixedVec3::ZERO);
    assert!(outcome.collided);
    assert_eq!(outcome.triangle, None);
}

#[test]
fn test_far_off_mesh_start_enters_through_ray() {
    let world = World::square();
    let outcome = world.move_by(p(-100_000, 5), p(100_005, 0));
    assert_eq!(outcome.displacement, p(100_000, 0), "snaps onto the entry edge");
    assert!(outcome.collided);
    assert_eq!(outcome.triangle, Some(tri(0)));
}

#[test]
fn test_stale_rasterizer_is_rejected() {
    let mut world = World::square();
    world.registry.insert(&NavMeshData::grid(1, 1, UNIT)).expect("second mesh");
    let err = MovementResolver::new(&world.registry, &world.rasterizer, &world.settings).err();
    assert_eq!(err, Some(NavError::StaleRasterizer { built: 1, current: 2 }));
}

#[test]
fn test_stale_hint_is_ignored() {
    let world = World::square();
    let request = MoveRequest::new(p(2, 6), p(1, 1)).with_hint(Some(tri(1)));
    let outcome = world.resolver().move_agent(&request);
    assert_eq!(outcome.displacement, p(1, 1));
    assert_eq!(outcome.triangle, Some(tri(0)));
}

/// Square whose height rises with X: y = x.
fn sloped_square() -> World {
    let mut data = NavMeshData::grid(1, 1, 10 * UNIT);
    for v in &mut data.vertices {
        v.y = v.x;
    }
    World::new(&data)
}

#[test]
fn test_height_follows_slope() {
    let world = sloped_square();
    let outcome = world.move_by(FixedVec3::new(2000, 2000, 6000), p(1, 2));
    assert_eq!(outcome.displacement, FixedVec3::new(1000, 1000, 2000));
    assert_eq!(outcome.ground_height, 3000);
    assert!(!outcome.collided);
}

#[test]
fn test_ground_height_can_be_ignored() {
    let mut world = sloped_square();
    world.settings.apply_ground_height = false;
    let outcome = world.move_by(FixedVec3::new(2000, 2000, 6000), p(1, 2));
    assert_eq!(outcome.displacement, FixedVec3::new(1000, 0, 2000));
    assert_eq!(outcome.ground_height, 3000, "height is still reported");
}

#[test]
fn test_ground_height_off_mesh_is_clamped() {
    let world = sloped_square();
    let resolver = world.resolver();
    assert_eq!(resolver.ground_height(FixedVec3::ground(4000, 7000)), Some(4000));
    assert_eq!(resolver.ground_height(FixedVec3::ground(15_000, 5000)), Some(10_000));
}

#[test]
fn test_find_valid_target_clamps_to_boundary() {
    let world = World::square();
    let result = world.resolver().find_valid_target(p(2, 5), p(20, 5), None);
    assert_eq!(result.target, p(10, 5));
    assert_eq!(result.triangle, Some(tri(1)));
    assert!(result.adjusted);
    assert!(result.is_valid());
}

#[test]
fn test_find_valid_target_respects_radius() {
    let world = World::square();
    let result = world.resolver().find_valid_target(p(2, 5), p(20, 5), Some(3 * UNIT));
    assert_eq!(result.target, p(5, 5));
    assert_eq!(result.triangle, Some(tri(0)));
    assert!(result.adjusted);
}

#[test]
fn test_find_valid_target_reachable_end_is_kept() {
    let world = World::square();
    let result = world.resolver().find_valid_target(p(2, 5), p(8, 3), None);
    assert_eq!(result, TargetValidation { target: p(8, 3), triangle: Some(tri(1)), adjusted: false });
}

#[test]
fn test_find_valid_target_from_off_mesh_start() {
    let world = World::square();
    let resolver = world.resolver();

    let entering = resolver.find_valid_target(p(-5, 5), p(5, 5), None);
    assert_eq!(entering.target, p(0, 5));
    assert_eq!(entering.triangle, Some(tri(0)));

    let missing = resolver.find_valid_target(p(-5, -5), p(-5, 20), None);
    assert_eq!(missing, TargetValidation { target: p(-5, 20), triangle: None, adjusted: false });
}

#[test]
fn test_far_targets_are_pulled_back_onto_mesh() {
    let world = World::square();
    let resolver = world.resolver();

    let validated = resolver.validate_target(p(5, 5), p(100_000, 5));
    assert_eq!(validated, TargetValidation { target: p(10, 5), triangle: Some(tri(1)), adjusted: true });

    let found = resolver.find_valid_target(p(-100_000, 5), p(5, 5), None);
    assert_eq!(found.target, p(0, 5));
    assert_eq!(found.triangle, Some(tri(0)));

    let clamped = resolver.validate_target(p(5, 5), FixedVec3::ground(i32::MAX, 5000));
    assert_eq!(clamped.target, p(10, 5));
    assert!(clamped.adjusted);
}

#[test]
fn test_validate_target_pulls_back_onto_mesh() {
    let world = World::square();
    let resolver = world.resolver();

    let on_mesh = resolver.validate_target(p(5, 5), p(3, 8));
    assert_eq!(on_mesh, TargetValidation { target: p(3, 8), triangle: Some(tri(0)), adjusted: false });

    let off_mesh = resolver.validate_target(p(5, 5), p(15, 5));
    assert_eq!(off_mesh.target, p(10, 5));
    assert_eq!(off_mesh.triangle, Some(tri(1)));
    assert!(off_mesh.adjusted);
}

#[test]
fn test_random_moves_never_leave_the_mesh() {
    let world = World::new(&NavMeshData::grid(6, 6, 5 * UNIT));
    let resolver = world.resolver();
    let mut scratch = MoveScratch::default();
    let mut rng = fastrand::Rng::with_seed(42);

    for i in 0..300 {
        let from = FixedVec3::ground(rng.i32(0..=30 * UNIT), rng.i32(0..=30 * UNIT));
        let by = FixedVec3::ground(rng.i32(-20 * UNIT..=20 * UNIT), rng.i32(-20 * UNIT..=20 * UNIT));
        let outcome = resolver.resolve(&MoveRequest::new(from, by), &mut scratch);
        let end = from + outcome.displacement;
        assert!(
            resolver.locate(end, None).is_some(),
            "move {} from {:?} by {:?} ended off the mesh at {:?}",
            i,
            from,
            by,
            end
        );
    }
}

#[test]
fn test_scratch_reuse_does_not_change_results() {
    let world = World::new(&NavMeshData::grid(3, 3, 4 * UNIT));
    let resolver = world.resolver();
    let mut shared = MoveScratch::default();
    let mut rng = fastrand::Rng::with_seed(7);

    for _ in 0..100 {
        let request = MoveRequest::new(
            FixedVec3::ground(rng.i32(0..=12 * UNIT), rng.i32(0..=12 * UNIT)),
            FixedVec3::ground(rng.i32(-8 * UNIT..=8 * UNIT), rng.i32(-8 * UNIT..=8 * UNIT)),
        );
        assert_eq!(resolver.resolve(&request, &mut shared), resolver.move_agent(&request));
    }
}
