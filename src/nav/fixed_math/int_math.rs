/// Floor of the square root of `value`.
pub fn isqrt(value: u128) -> u64 {
    if value < 2 {
        return value as u64;
    }
    let bits = 128 - value.leading_zeros();
    let mut x: u128 = 1 << bits.div_ceil(2);
    loop {
        let y = (x + value / x) >> 1;
        if y >= x {
            return x as u64;
        }
        x = y;
    }
}

/// Floor square root of a signed value, zero for non-positive input.
pub fn isqrt_i64(value: i64) -> i64 {
    if value <= 0 {
        0
    } else {
        isqrt(value as u128) as i64
    }
}

/// `numerator / denominator` rounded half away from zero.
///
/// A zero denominator yields zero.
pub fn divide_round(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    let negative = (numerator < 0) != (denominator < 0);
    let n = numerator.unsigned_abs();
    let d = denominator.unsigned_abs();
    let q = (n + d / 2) / d;
    if negative {
        -(q as i128)
    } else {
        q as i128
    }
}

/// Clamp a wide intermediate back into coordinate range.
pub fn saturate_i32(value: i128) -> i32 {
    value.clamp(i32::MIN as i128, i32::MAX as i128) as i32
}
