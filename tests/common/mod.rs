#![allow(dead_code)]

use lockstep_nav::nav::config::NavSettings;
use lockstep_nav::nav::fixed_math::FixedVec3;
use lockstep_nav::nav::mesh::{MeshId, NavMeshData, NavMeshRegistry, TriangleRef};
use lockstep_nav::nav::movement::{MoveOutcome, MoveRequest, MovementResolver};
use lockstep_nav::nav::rasterizer::NavRasterizer;

pub const COURTYARD: &str = "assets/meshes/courtyard.ron";

/// Point on the ground, in whole world units.
pub fn p(x: i32, z: i32) -> FixedVec3 {
    FixedVec3::ground(x * 1000, z * 1000)
}

pub fn tri(index: u32) -> TriangleRef {
    TriangleRef::new(MeshId(0), index)
}

/// A registry, its rasterizer and default settings, kept together so a
/// resolver can borrow all three.
pub struct NavWorld {
    pub registry: NavMeshRegistry,
    pub rasterizer: NavRasterizer,
    pub settings: NavSettings,
}

impl NavWorld {
    pub fn new(data: &NavMeshData) -> Self {
        let mut registry = NavMeshRegistry::new();
        registry.insert(data).expect("mesh builds");
        let settings = NavSettings::default();
        let rasterizer = NavRasterizer::build(&registry, settings.cell_size);
        Self { registry, rasterizer, settings }
    }

    pub fn courtyard() -> Self {
        Self::new(&NavMeshData::load(COURTYARD).expect("courtyard asset loads"))
    }

    pub fn resolver(&self) -> MovementResolver<'_> {
        MovementResolver::new(&self.registry, &self.rasterizer, &self.settings).expect("rasterizer is current")
    }

    pub fn move_by(&self, from: FixedVec3, by: FixedVec3) -> MoveOutcome {
        self.resolver().move_agent(&MoveRequest::new(from, by))
    }
}
