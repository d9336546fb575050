/// Navigation driver systems.
///
/// Everything that moves agents runs in `FixedUpdate` against one
/// registry/rasterizer snapshot per tick. The rebuild system is the only
/// writer of [`NavRasterizer`] and runs before any reader.

use bevy::prelude::*;
use lockstep_nav_macros::profile;

use super::components::*;
use super::events::*;
use super::resources::*;
use crate::nav::config::{NavConfig, NavSettings};
use crate::nav::fixed_math::FixedVec3;
use crate::nav::funnel::smooth_path;
use crate::nav::mesh::NavMeshRegistry;
use crate::nav::movement::{MoveRequest, MoveScratch, MovementResolver};
use crate::nav::rasterizer::NavRasterizer;
use crate::profile_log;

// ============================================================================
// Tick & Configuration
// ============================================================================

/// Runs first in `FixedUpdate` so every navigation system sees the same tick.
pub fn increment_nav_tick(mut tick: ResMut<NavTick>) {
    tick.increment();
}

/// Read the configuration file once and derive the integer settings from it.
pub fn load_nav_config(mut commands: Commands, source: Res<NavConfigPath>) {
    let config = match &source.0 {
        Some(path) => NavConfig::load_or_default(path),
        None => {
            info!("[NAV_CONFIG] No config path set, using defaults");
            NavConfig::default()
        }
    };
    let (config, settings) = NavSettings::from_config_or_default(config);
    commands.insert_resource(settings);
    commands.insert_resource(config);
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Rebuild the grid when asked to, when the registry has moved on, or when
/// the configured cell size changed.
#[profile(4)]
pub fn rebuild_rasterizer(
    mut requests: MessageReader<RebuildNavGrid>,
    registry: Res<NavMeshRegistry>,
    settings: Res<NavSettings>,
    mut rasterizer: ResMut<NavRasterizer>,
) {
    let requested = requests.read().count() > 0;
    let stale = !rasterizer.is_current(&registry);
    let resized = rasterizer.cell_size() != settings.cell_size;
    if requested || stale || resized {
        debug!(
            "[RASTERIZER] Rebuilding (requested: {}, stale: {}, resized: {})",
            requested, stale, resized
        );
        *rasterizer = NavRasterizer::build(&registry, settings.cell_size);
    }
}

// ============================================================================
// Movement
// ============================================================================

/// Resolve every agent's desired displacement against the mesh.
///
/// Agents are independent, so the query runs in parallel with one
/// [`MoveScratch`] per worker.
#[profile]
pub fn resolve_agent_movement(
    #[allow(unused_variables)] tick: Res<NavTick>,
    registry: Res<NavMeshRegistry>,
    rasterizer: Res<NavRasterizer>,
    settings: Res<NavSettings>,
    mut agents: Query<(
        &mut NavAgent,
        &mut NavPosition,
        &mut DesiredDisplacement,
        &mut MovementOutcome,
    )>,
) {
    let resolver = match MovementResolver::new(&registry, &rasterizer, &settings) {
        Ok(resolver) => resolver,
        Err(e) => {
            warn!("[NAV_MOVE] Skipping movement this tick: {}", e);
            return;
        }
    };

    agents.par_iter_mut().for_each_init(MoveScratch::default, |scratch, (mut agent, mut position, mut desired, mut outcome)| {
        let request = MoveRequest::new(position.0, desired.0).with_hint(agent.hint);
        let result = resolver.resolve(&request, scratch);
        position.0 += result.displacement;
        agent.hint = result.triangle;
        desired.0 = FixedVec3::ZERO;
        outcome.0 = Some(result);
    });

    profile_log!(tick, "[NAV_MOVE] Resolved {} agents", agents.iter().len());
}

// ============================================================================
// Queries
// ============================================================================

/// Answer target validation requests in arrival order.
pub fn validate_targets(
    mut requests: MessageReader<ValidateTargetRequest>,
    mut results: MessageWriter<TargetValidated>,
    registry: Res<NavMeshRegistry>,
    rasterizer: Res<NavRasterizer>,
    settings: Res<NavSettings>,
    positions: Query<&NavPosition>,
) {
    let resolver = match MovementResolver::new(&registry, &rasterizer, &settings) {
        Ok(resolver) => resolver,
        Err(e) => {
            warn!("[NAV_MOVE] Dropping target requests: {}", e);
            return;
        }
    };

    for request in requests.read() {
        let Ok(position) = positions.get(request.entity) else {
            warn!("[NAV_MOVE] Target request for {:?}, which has no NavPosition", request.entity);
            continue;
        };
        let result = resolver.find_valid_target(position.0, request.target, request.radius);
        results.write(TargetValidated { entity: request.entity, result });
    }
}

/// Turn triangle corridors into waypoint lists.
pub fn smooth_paths(
    mut requests: MessageReader<SmoothPathRequest>,
    registry: Res<NavMeshRegistry>,
    settings: Res<NavSettings>,
    mut paths: Query<&mut SmoothedPath>,
) {
    for request in requests.read() {
        let Ok(mut path) = paths.get_mut(request.entity) else {
            warn!("[FUNNEL] Path request for {:?}, which has no SmoothedPath", request.entity);
            continue;
        };
        path.0 = smooth_path(
            &registry,
            &request.corridor,
            request.start,
            request.end,
            settings.funnel_max_waypoints,
        );
    }
}
