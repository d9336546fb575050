/// Components attached to navigating entities.

use bevy::prelude::*;

use crate::nav::fixed_math::FixedVec3;
use crate::nav::mesh::TriangleRef;
use crate::nav::movement::MoveOutcome;

/// Marks an entity whose movement is resolved against the navmesh.
/// Remembers the triangle it ended in last tick to skip the grid lookup.
#[derive(Component, Debug, Clone, Copy, Default)]
#[require(NavPosition, DesiredDisplacement, MovementOutcome, SmoothedPath)]
pub struct NavAgent {
    pub hint: Option<TriangleRef>,
}

/// Authoritative position in raw fixed-point units.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavPosition(pub FixedVec3);

/// Displacement requested for the next tick. Consumed (reset to zero) when
/// the movement is resolved.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DesiredDisplacement(pub FixedVec3);

/// Result of the last resolved movement, `None` before the first tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementOutcome(pub Option<MoveOutcome>);

/// Waypoints produced by the last [`SmoothPathRequest`](super::SmoothPathRequest).
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct SmoothedPath(pub Vec<FixedVec3>);
