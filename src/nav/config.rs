use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::fixed_math::{FixedNum, FixedScalar};
use super::rasterizer::DEFAULT_CELL_SIZE;

pub const DEFAULT_CONFIG_PATH: &str = "assets/nav_config.ron";

/// Human-edited navigation configuration, read once at startup.
///
/// Distances are in world units. Everything the simulation consumes is
/// converted once into [`NavSettings`]; changing these values mid-session
/// would desynchronize lockstep peers.
#[derive(Resource, Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct NavConfig {
    /// Edge length of a rasterizer cell.
    pub cell_size: f32,
    /// Ring limit for nearest-triangle searches. `None` searches the whole grid.
    pub nearest_max_ring: Option<u32>,
    /// Half-width, in raw units, of the box searched for a contained point
    /// when an edge projection lands just outside its triangle.
    pub point_search_radius: i32,
    /// Triangle crossings and slides allowed per movement call.
    pub max_move_steps: usize,
    /// Waypoints the funnel may emit before it gives up.
    pub funnel_max_waypoints: usize,
    /// Follow the mesh height. When off, displacements keep the agent's height.
    pub apply_ground_height: bool,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            cell_size: 4.0,
            nearest_max_ring: None,
            point_search_radius: 4,
            max_move_steps: 1024,
            funnel_max_waypoints: 2000,
            apply_ground_height: true,
        }
    }
}

impl NavConfig {
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
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

    /// Load `path`, logging and falling back to defaults on any failure.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!("[NAV_CONFIG] Loaded navigation config from {}", path.display());
                config
            }
            Err(e) => {
                error!("[NAV_CONFIG] {}", e);
                error!("[NAV_CONFIG] Using default NavConfig");
                Self::default()
            }
        }
    }
}

/// Integer settings the navigation core runs on.
#[derive(Resource, Clone, Debug, PartialEq, Eq)]
pub struct NavSettings {
    /// Raw units.
    pub cell_size: i32,
    pub nearest_max_ring: Option<u32>,
    pub point_search_radius: i32,
    pub max_move_steps: usize,
    pub funnel_max_waypoints: usize,
    pub apply_ground_height: bool,
}

impl TryFrom<&NavConfig> for NavSettings {
    type Error = ConfigError;

    fn try_from(config: &NavConfig) -> Result<Self, Self::Error> {
        let cell_size = FixedNum::checked_from_num(config.cell_size)
            .and_then(FixedScalar::checked_from_fixed)
            .ok_or(ConfigError::OutOfRange { field: "cell_size", value: config.cell_size })?;
        Ok(Self {
            cell_size: cell_size.raw().max(1),
            nearest_max_ring: config.nearest_max_ring,
            point_search_radius: config.point_search_radius.max(1),
            max_move_steps: config.max_move_steps.max(1),
            funnel_max_waypoints: config.funnel_max_waypoints.max(2),
            apply_ground_height: config.apply_ground_height,
        })
    }
}

impl NavSettings {
    /// Convert `config`, falling back to the defaults for both when it holds
    /// a value the simulation cannot represent.
    pub fn from_config_or_default(config: NavConfig) -> (NavConfig, NavSettings) {
        match Self::try_from(&config) {
            Ok(settings) => (config, settings),
            Err(e) => {
                error!("[NAV_CONFIG] {}", e);
                error!("[NAV_CONFIG] Using default NavConfig");
                (NavConfig::default(), NavSettings::default())
            }
        }
    }
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            nearest_max_ring: None,
            point_search_radius: 4,
            max_move_steps: 1024,
            funnel_max_waypoints: 2000,
            apply_ground_height: true,
        }
    }
}
