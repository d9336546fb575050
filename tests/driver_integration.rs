mod common;

use bevy::ecs::message::Messages;
use bevy::prelude::*;
use common::{p, tri, COURTYARD};
use lockstep_nav::nav::config::{NavConfig, NavSettings, DEFAULT_CONFIG_PATH};
use lockstep_nav::nav::driver::{
    DesiredDisplacement, MovementOutcome, NavAgent, NavPosition, NavTick, NavigationPlugin, SmoothPathRequest,
    SmoothedPath,
};
use lockstep_nav::nav::fixed_math::FixedVec3;
use lockstep_nav::nav::mesh::{NavMeshData, NavMeshRegistry};

fn courtyard_app() -> App {
    let mut app = App::new();
    app.add_plugins(bevy::app::TaskPoolPlugin::default());
    app.add_plugins(NavigationPlugin { config_path: Some(DEFAULT_CONFIG_PATH.to_string()) });
    app.update();

    let data = NavMeshData::load(COURTYARD).expect("courtyard asset loads");
    app.world_mut()
        .resource_mut::<NavMeshRegistry>()
        .insert(&data)
        .expect("mesh builds");
    app
}

#[test]
fn test_config_file_is_loaded_at_startup() {
    let app = courtyard_app();
    let expected = NavConfig::load(DEFAULT_CONFIG_PATH).expect("config asset parses");
    assert_eq!(*app.world().resource::<NavConfig>(), expected);
    assert_eq!(*app.world().resource::<NavSettings>(), NavSettings::try_from(&expected).expect("in range"));
}

#[test]
fn test_agent_walks_into_notch_over_several_ticks() {
    let mut app = courtyard_app();
    let agent = app.world_mut().spawn((NavAgent::default(), NavPosition(p(15, 5)))).id();

    for _ in 0..10 {
        app.world_mut().get_mut::<DesiredDisplacement>(agent).expect("required component").0 = p(0, 1);
        app.world_mut().run_schedule(FixedUpdate);
    }

    let world = app.world();
    assert_eq!(world.resource::<NavTick>().0, 10);
    assert_eq!(world.get::<NavPosition>(agent).map(|p| p.0), Some(FixedVec3::new(15_000, 500, 10_000)));
    let last = world.get::<MovementOutcome>(agent).and_then(|o| o.0).expect("resolved");
    assert!(last.collided, "the last ticks push against the notch wall");
    assert_eq!(last.displacement, FixedVec3::ZERO);
}

#[test]
fn test_path_request_fills_smoothed_path() {
    let mut app = courtyard_app();
    let agent = app.world_mut().spawn((NavAgent::default(), NavPosition(p(18, 4)))).id();
    app.world_mut().resource_mut::<Messages<SmoothPathRequest>>().write(SmoothPathRequest {
        entity: agent,
        corridor: vec![tri(3), tri(2), tri(1), tri(0), tri(5), tri(4)],
        start: p(18, 4),
        end: p(2, 18),
    });

    app.world_mut().run_schedule(FixedUpdate);

    let path = app.world().get::<SmoothedPath>(agent).expect("required component");
    assert_eq!(path.0, vec![p(18, 4), p(10, 10), p(2, 18)]);
}

#[test]
fn test_unknown_entity_requests_are_skipped() {
    let mut app = courtyard_app();
    let ghost = app.world_mut().spawn_empty().id();
    app.world_mut().despawn(ghost);
    app.world_mut().resource_mut::<Messages<SmoothPathRequest>>().write(SmoothPathRequest {
        entity: ghost,
        corridor: vec![tri(0)],
        start: p(1, 1),
        end: p(2, 2),
    });

    app.world_mut().run_schedule(FixedUpdate);
    assert_eq!(app.world().resource::<NavTick>().0, 1);
}
