use std::cmp::Ordering;

use super::{divide_round, FixedNum};

/// An unreduced fraction compared exactly.
///
/// Used wherever the resolver compares parameters along a segment or
/// cosines between directions: cross-multiplying in `i128` never rounds,
/// so ties break the same way on every machine.
#[derive(Clone, Copy, Debug)]
pub struct RationalFactor {
    numerator: i64,
    denominator: i64,
}

impl RationalFactor {
    pub const ZERO: Self = Self { numerator: 0, denominator: 1 };
    pub const ONE: Self = Self { numerator: 1, denominator: 1 };

    /// Build a factor with a positive denominator. A zero denominator
    /// collapses to zero.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        match denominator.cmp(&0) {
            Ordering::Greater => Self { numerator, denominator },
            Ordering::Less => Self { numerator: -numerator, denominator: -denominator },
            Ordering::Equal => Self::ZERO,
        }
    }

    pub const fn integer(value: i64) -> Self {
        Self { numerator: value, denominator: 1 }
    }

    pub fn numerator(self) -> i64 {
        self.numerator
    }

    /// Always positive.
    pub fn denominator(self) -> i64 {
        self.denominator
    }

    pub fn is_zero(self) -> bool {
        self.numerator == 0
    }

    pub fn is_negative(self) -> bool {
        self.numerator < 0
    }

    pub fn is_positive(self) -> bool {
        self.numerator > 0
    }

    /// `0 <= self <= 1`.
    pub fn in_unit_interval(self) -> bool {
        self.numerator >= 0 && self.numerator <= self.denominator
    }

    /// `value * self`, rounded.
    pub fn scaled(self, value: i64) -> i64 {
        divide_round(value as i128 * self.numerator as i128, self.denominator as i128) as i64
    }

    /// Approximate value for logging.
    pub fn to_fixed(self) -> FixedNum {
        FixedNum::from_num(self.numerator) / FixedNum::from_num(self.denominator)
    }
}

impl PartialEq for RationalFactor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RationalFactor {}

impl PartialOrd for RationalFactor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RationalFactor {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.numerator as i128 * other.denominator as i128;
        let rhs = other.numerator as i128 * self.denominator as i128;
        lhs.cmp(&rhs)
    }
}
