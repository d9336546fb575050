/// Bevy driver for the navigation core.
///
/// This module is organized into:
/// - **components**: per-agent state (position, pending displacement, outcome)
/// - **resources**: tick counter and config location
/// - **events**: rebuild, target validation and path smoothing messages
/// - **systems**: the `FixedUpdate` systems wiring it all together
use bevy::prelude::*;

use crate::nav::config::{NavConfig, NavSettings, DEFAULT_CONFIG_PATH};
use crate::nav::mesh::NavMeshRegistry;
use crate::nav::rasterizer::NavRasterizer;

pub mod components;
pub mod events;
pub mod resources;
pub mod systems;


pub use components::*;
pub use events::*;
pub use resources::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum NavSet {
    Rebuild, // Keep the rasterizer in step with the registry
    Resolve, // Agent movement
    Queries, // Target validation and path smoothing
}

/// Registers the navigation resources, messages and systems.
///
/// Meshes are added by inserting into [`NavMeshRegistry`]; the rasterizer
/// follows on the next fixed tick.
pub struct NavigationPlugin {
    pub config_path: Option<String>,
}

impl Default for NavigationPlugin {
    fn default() -> Self {
        Self { config_path: Some(DEFAULT_CONFIG_PATH.to_string()) }
    }
}

impl Plugin for NavigationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(NavConfigPath(self.config_path.clone()));
        app.init_resource::<NavConfig>();
        app.init_resource::<NavSettings>();
        app.init_resource::<NavMeshRegistry>();
        app.init_resource::<NavRasterizer>();
        app.init_resource::<NavTick>();

        app.add_message::<RebuildNavGrid>();
        app.add_message::<ValidateTargetRequest>();
        app.add_message::<TargetValidated>();
        app.add_message::<SmoothPathRequest>();

        app.configure_sets(FixedUpdate, (NavSet::Rebuild, NavSet::Resolve, NavSet::Queries).chain());

        app.add_systems(Startup, systems::load_nav_config);
        app.add_systems(FixedUpdate, (
            systems::increment_nav_tick.before(NavSet::Rebuild),
            systems::rebuild_rasterizer.in_set(NavSet::Rebuild),
            systems::resolve_agent_movement.in_set(NavSet::Resolve),
            systems::validate_targets.in_set(NavSet::Queries),
            systems::smooth_paths.in_set(NavSet::Queries),
        ));
    }
}
