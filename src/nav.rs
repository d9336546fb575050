//! Deterministic fixed-point navmesh movement.
//!
//! The core (`fixed_math`, `mesh`, `rasterizer`, `movement`, `funnel`) is
//! plain synchronous code over read-only data. `driver` wires it into a bevy
//! `FixedUpdate` schedule.

pub mod config;
pub mod driver;
pub mod error;
pub mod fixed_math;
pub mod funnel;
pub mod geometry;
pub mod mesh;
pub mod movement;
pub mod rasterizer;

pub use config::{NavConfig, NavSettings};
pub use driver::{NavSet, NavigationPlugin};
pub use error::{ConfigError, FunnelError, NavError, NavMeshError};
pub use fixed_math::{FixedScalar, FixedVec2, FixedVec3, RationalFactor};
pub use funnel::{build_corridor, run_funnel, smooth_path, FunnelOutcome};
pub use mesh::{MeshId, NavMesh, NavMeshData, NavMeshRegistry, NavTriangle, TileCoord, TriangleData, TriangleRef};
pub use movement::{MoveOutcome, MoveRequest, MoveScratch, MovementResolver, TargetValidation};
pub use rasterizer::{NavRasterizer, SegmentHit};
