use serde::{Deserialize, Serialize};

use super::{divide_round, isqrt, saturate_i32, FixedScalar, FixedVec2, COORD_LIMIT};

/// Scale applied before the square root in [`FixedVec3::normalize_to`] so
/// short vectors keep their direction.
const NORMALIZE_SHIFT: u32 = 16;

/// World-space point or offset in raw units. `y` is height, `x`/`z` span
/// the ground plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl FixedVec3 {
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Build from whole world units.
    pub const fn from_units(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: FixedScalar::from_int(x).raw(),
            y: FixedScalar::from_int(y).raw(),
            z: FixedScalar::from_int(z).raw(),
        }
    }

    pub const fn ground(x: i32, z: i32) -> Self {
        Self { x, y: 0, z }
    }

    pub fn with_y(self, y: i32) -> Self {
        Self { y, ..self }
    }

    pub fn xz(self) -> FixedVec2 {
        FixedVec2::new(self.x, self.z)
    }

    pub fn height(self) -> FixedScalar {
        FixedScalar::from_raw(self.y)
    }

    pub fn is_zero_xz(self) -> bool {
        self.x == 0 && self.z == 0
    }

    pub fn is_equal_xz(self, other: Self) -> bool {
        self.x == other.x && self.z == other.z
    }

    pub fn sqr_magnitude(self) -> i64 {
        let (x, y, z) = (self.x as i64, self.y as i64, self.z as i64);
        x * x + y * y + z * z
    }

    pub fn xz_sqr_magnitude(self) -> i64 {
        let (x, z) = (self.x as i64, self.z as i64);
        x * x + z * z
    }

    pub fn xz_sqr_distance(self, other: Self) -> i64 {
        (self - other).xz_sqr_magnitude()
    }

    /// Ground-plane length, floored to a raw unit.
    pub fn xz_magnitude(self) -> i64 {
        isqrt(self.xz_sqr_magnitude() as u128) as i64
    }

    pub fn dot(self, other: Self) -> i64 {
        self.x as i64 * other.x as i64 + self.y as i64 * other.y as i64 + self.z as i64 * other.z as i64
    }

    pub fn dot_xz(self, other: Self) -> i64 {
        self.x as i64 * other.x as i64 + self.z as i64 * other.z as i64
    }

    /// Ground-plane cross product (`x * other.z - z * other.x`).
    pub fn cross_xz(self, other: Self) -> i64 {
        self.x as i64 * other.z as i64 - self.z as i64 * other.x as i64
    }

    /// Rescale to `target` length. The zero vector stays zero.
    pub fn normalize_to(self, target: i32) -> Self {
        normalize(self, self.sqr_magnitude(), target)
    }

    /// Rescale the ground-plane projection to `target` length, dropping height.
    pub fn normalize_xz_to(self, target: i32) -> Self {
        let flat = self.with_y(0);
        normalize(flat, flat.xz_sqr_magnitude(), target)
    }

    /// Component-wise `self * numerator / denominator`, rounded.
    pub fn mul_div(self, numerator: i64, denominator: i64) -> Self {
        let scale = |c: i32| {
            saturate_i32(divide_round(c as i128 * numerator as i128, denominator as i128))
        };
        Self { x: scale(self.x), y: scale(self.y), z: scale(self.z) }
    }

    /// Both ground coordinates lie within `±COORD_LIMIT`.
    pub fn is_in_range(self) -> bool {
        (-COORD_LIMIT..=COORD_LIMIT).contains(&self.x) && (-COORD_LIMIT..=COORD_LIMIT).contains(&self.z)
    }

    /// `self + rhs` with the ground coordinates clamped to `±COORD_LIMIT`.
    /// Height saturates at the `i32` bounds.
    pub fn clamped_add(self, rhs: Self) -> Self {
        let clamp = |a: i32, b: i32| (a as i64 + b as i64).clamp(-(COORD_LIMIT as i64), COORD_LIMIT as i64) as i32;
        Self {
            x: clamp(self.x, rhs.x),
            y: self.y.saturating_add(rhs.y),
            z: clamp(self.z, rhs.z),
        }
    }

    pub fn clamped_to_range(self) -> Self {
        self.clamped_add(Self::ZERO)
    }

    /// `self + offset * numerator / denominator` computed wide, `None` when
    /// the result leaves `i32`.
    pub fn checked_offset(self, offset: Self, numerator: i64, denominator: i64) -> Option<Self> {
        let shift = |base: i32, c: i32| {
            let wide = base as i128 + divide_round(c as i128 * numerator as i128, denominator as i128);
            i32::try_from(wide).ok()
        };
        Some(Self {
            x: shift(self.x, offset.x)?,
            y: shift(self.y, offset.y)?,
            z: shift(self.z, offset.z)?,
        })
    }

    pub fn min_xz(self, other: Self) -> FixedVec2 {
        FixedVec2::new(self.x.min(other.x), self.z.min(other.z))
    }

    pub fn max_xz(self, other: Self) -> FixedVec2 {
        FixedVec2::new(self.x.max(other.x), self.z.max(other.z))
    }
}

fn normalize(v: FixedVec3, sqr_magnitude: i64, target: i32) -> FixedVec3 {
    if sqr_magnitude <= 0 {
        return FixedVec3::ZERO;
    }
    let scaled_magnitude = isqrt((sqr_magnitude as u128) << (2 * NORMALIZE_SHIFT)) as i128;
    let scale = |c: i32| {
        let numerator = ((c as i128) * target as i128) << NORMALIZE_SHIFT;
        saturate_i32(divide_round(numerator, scaled_magnitude))
    };
    FixedVec3 { x: scale(v.x), y: scale(v.y), z: scale(v.z) }
}

impl std::ops::Add for FixedVec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl std::ops::AddAssign for FixedVec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for FixedVec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl std::ops::Neg for FixedVec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

impl From<FixedVec2> for FixedVec3 {
    fn from(v: FixedVec2) -> Self {
        Self::ground(v.x, v.y)
    }
}
