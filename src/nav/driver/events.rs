/// Messages into and out of the navigation driver.

use bevy::prelude::*;

use crate::nav::fixed_math::FixedVec3;
use crate::nav::mesh::TriangleRef;
use crate::nav::movement::TargetValidation;

/// Force a rasterizer rebuild on the next tick. Registry changes are picked
/// up without it; this covers callers that want a fresh grid regardless.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct RebuildNavGrid;

/// Clamp `target` to what `entity` can reach from its current position.
#[derive(Message, Debug, Clone, Copy)]
pub struct ValidateTargetRequest {
    pub entity: Entity,
    pub target: FixedVec3,
    /// Optional reach limit in raw units.
    pub radius: Option<i32>,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct TargetValidated {
    pub entity: Entity,
    pub result: TargetValidation,
}

/// Smooth a triangle corridor from an external path search into waypoints,
/// stored in the entity's [`SmoothedPath`](super::SmoothedPath).
#[derive(Message, Debug, Clone)]
pub struct SmoothPathRequest {
    pub entity: Entity,
    pub corridor: Vec<TriangleRef>,
    pub start: FixedVec3,
    pub end: FixedVec3,
}
