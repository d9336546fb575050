//! Deterministic fixed-point mathematics.
//!
//! Every position-affecting computation in the navigation core runs on plain
//! integers scaled by [`PRECISION`]. Signed areas and dot products widen to
//! `i64`, products of products widen to `i128`, so all peers of a lockstep
//! session agree bit for bit regardless of platform.
//!
//! The `fixed` crate's [`FixedNum`] only appears at the edges (configuration
//! and diagnostics), never inside a branch that moves an agent.

use fixed::types::I48F16;

pub use factor::RationalFactor;
pub use int_math::{divide_round, isqrt, isqrt_i64, saturate_i32};
pub use scalar::FixedScalar;
pub use vec2::FixedVec2;
pub use vec3::FixedVec3;

mod factor;
mod int_math;
mod scalar;
mod vec2;
mod vec3;

/// Raw units per world unit. One raw unit is a millimetre.
pub const PRECISION: i32 = 1000;

/// Largest absolute ground coordinate the navigation core accepts.
///
/// The difference of two in-range coordinates still fits an `i32`, and
/// signed areas of in-range points fit an `i64`.
pub const COORD_LIMIT: i32 = 1 << 29;

/// Fixed-point number used at the configuration boundary.
///
/// I48F16: 48 integer bits, 16 fractional bits.
pub type FixedNum = I48F16;
