/// Driver-level resources.

use bevy::prelude::*;

/// Fixed ticks since startup.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavTick(pub u64);

impl NavTick {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

/// Where [`load_nav_config`](super::systems::load_nav_config) reads from.
/// `None` keeps the defaults without touching the filesystem.
#[derive(Resource, Debug, Clone, Default)]
pub struct NavConfigPath(pub Option<String>);
