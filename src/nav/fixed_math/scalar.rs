use std::fmt;

use serde::{Deserialize, Serialize};

use super::{divide_round, saturate_i32, FixedNum, PRECISION};

/// A scalar in raw units (`PRECISION` per world unit).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FixedScalar(pub i32);

impl FixedScalar {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(PRECISION);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn from_int(value: i32) -> Self {
        Self(value * PRECISION)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Round a fixed-point value to the nearest raw unit.
    pub fn from_fixed(value: FixedNum) -> Self {
        let scaled = (value * FixedNum::from_num(PRECISION)).round();
        Self(saturate_i32(scaled.to_num::<i64>() as i128))
    }

    /// Like [`from_fixed`](Self::from_fixed), but `None` when the raw value
    /// does not fit an `i32`.
    pub fn checked_from_fixed(value: FixedNum) -> Option<Self> {
        let scaled = value.checked_mul(FixedNum::from_num(PRECISION))?.checked_round()?;
        i32::try_from(scaled.to_num::<i64>()).ok().map(Self)
    }

    pub fn to_fixed(self) -> FixedNum {
        FixedNum::from_num(self.0) / FixedNum::from_num(PRECISION)
    }

    /// Lossy conversion for logging and tooling.
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / PRECISION as f32
    }

    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl std::ops::Add for FixedScalar {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for FixedScalar {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl std::ops::Neg for FixedScalar {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl std::ops::Mul for FixedScalar {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        let wide = self.0 as i128 * rhs.0 as i128;
        Self(saturate_i32(divide_round(wide, PRECISION as i128)))
    }
}

impl std::ops::Div for FixedScalar {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        let wide = self.0 as i128 * PRECISION as i128;
        Self(saturate_i32(divide_round(wide, rhs.0 as i128)))
    }
}

impl fmt::Display for FixedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = (self.0 as i64).abs();
        write!(f, "{}{}.{:03}", sign, abs / PRECISION as i64, abs % PRECISION as i64)
    }
}
