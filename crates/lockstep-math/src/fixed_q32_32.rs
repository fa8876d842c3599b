// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Raw-integer kernels behind the Q32.32 encoding used by [`crate::Fp`].
//!
//! The representation is an `i64` storing an integer scaled by `2^32`:
//! `real_value = raw / 2^32`. Everything here operates on those raw values
//! with integer arithmetic only:
//! - multiplication and division round to nearest, ties to even;
//! - overflow saturates to `i64::MIN`/`i64::MAX`;
//! - the square root is the classic binary digit-by-digit extraction, so it
//!   needs no initial guess and no iteration count.
//!
//! `from_f64`/`to_f64` exist for host boundaries (config files, diagnostics)
//! and never feed back into the simulation path implicitly.

/// Number of fractional bits in the Q32.32 encoding.
pub const FRAC_BITS: u32 = 32;

/// The raw integer value corresponding to `1.0`.
pub const ONE_RAW: i64 = 1_i64 << FRAC_BITS;

fn round_shift_right_u64(value: u64, shift: u32) -> u64 {
    if shift == 0 {
        return value;
    }
    if shift >= 64 {
        return 0;
    }

    let q = value >> shift;
    let r = value & ((1_u64 << shift) - 1);
    let half = 1_u64 << (shift - 1);

    if r > half || (r == half && (q & 1) == 1) {
        q + 1
    } else {
        q
    }
}

/// Clamps an `i128` intermediate into the `i64` raw range.
pub fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value.is_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Divides `num` by `den` rounding to nearest, ties to even. `den` must be non-zero.
fn div_round_i128(num: i128, den: i128) -> i128 {
    let abs_num = num.unsigned_abs();
    let abs_den = den.unsigned_abs();
    let q = abs_num / abs_den;
    let r = abs_num % abs_den;

    let twice_r = r.saturating_mul(2);
    let rounded = if twice_r > abs_den || (twice_r == abs_den && (q & 1) == 1) {
        q.saturating_add(1)
    } else {
        q
    };

    let magnitude = i128::try_from(rounded).unwrap_or(i128::MAX);
    if (num < 0) ^ (den < 0) {
        -magnitude
    } else {
        magnitude
    }
}

/// Multiplies two raw Q32.32 values.
pub fn mul(a: i64, b: i64) -> i64 {
    let prod = i128::from(a) * i128::from(b);
    saturate(div_round_i128(prod, 1_i128 << FRAC_BITS))
}

/// Divides two raw Q32.32 values.
///
/// Division by zero never traps: `0/0` is `0`, and `x/0` saturates toward
/// the sign of `x`.
pub fn div(a: i64, b: i64) -> i64 {
    if b == 0 {
        return match a.signum() {
            0 => 0,
            1 => i64::MAX,
            _ => i64::MIN,
        };
    }
    saturate(div_round_i128(i128::from(a) << FRAC_BITS, i128::from(b)))
}

/// Builds a raw value for the exact ratio `num / den` (rounded, saturating).
///
/// Returns `0` when `den == 0`.
pub fn ratio(num: i64, den: i64) -> i64 {
    if den == 0 {
        return 0;
    }
    saturate(div_round_i128(i128::from(num) << FRAC_BITS, i128::from(den)))
}

/// Floor square root of a `u128` by binary digit extraction.
///
/// Each iteration decides one result bit using only shifts, adds, and
/// comparisons; the loop runs at most 64 times.
pub fn isqrt_u128(n: u128) -> u128 {
    let mut rem = n;
    let mut res: u128 = 0;
    let mut bit: u128 = 1 << 126;
    while bit > rem {
        bit >>= 2;
    }
    while bit != 0 {
        if rem >= res + bit {
            rem -= res + bit;
            res = (res >> 1) + bit;
        } else {
            res >>= 1;
        }
        bit >>= 2;
    }
    res
}

/// Square root of a non-negative raw Q32.32 value (floor of the exact root).
///
/// `sqrt(raw / 2^32) * 2^32 == sqrt(raw * 2^32)`, so the raw root is the
/// integer root of the operand widened by `FRAC_BITS`. Negative inputs return
/// `None`.
pub fn sqrt(raw: i64) -> Option<i64> {
    if raw < 0 {
        return None;
    }
    let widened = (raw as u128) << FRAC_BITS;
    // sqrt(2^63 * 2^32) < 2^48, always representable.
    Some(isqrt_u128(widened) as i64)
}

/// Deterministically converts an `f64` to a raw Q32.32 `i64`.
///
/// Semantics:
/// - `NaN` maps to `0` (fixed point has no NaN representation).
/// - `+∞`/`-∞` and out-of-range magnitudes saturate to `i64::MAX`/`i64::MIN`.
/// - Values are rounded to nearest with ties to even at the Q32.32 boundary.
///
/// The conversion decodes the IEEE-754 bit pattern directly and never relies
/// on platform float arithmetic.
pub fn from_f64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    if value.is_infinite() {
        return if value.is_sign_positive() {
            i64::MAX
        } else {
            i64::MIN
        };
    }

    let bits = value.to_bits();
    let sign = (bits >> 63) != 0;
    let exp = ((bits >> 52) & 0x7ff) as i32;
    let mant = bits & ((1_u64 << 52) - 1);

    if exp == 0 && mant == 0 {
        return 0;
    }

    // Subnormals carry no implicit leading one and a fixed exponent of -1022.
    let mantissa: u64 = if exp == 0 { mant } else { (1_u64 << 52) | mant };
    let unbiased = if exp == 0 { -1022 } else { exp - 1023 };
    let shift = unbiased + (FRAC_BITS as i32 - 52);

    let abs_raw: i128 = if shift >= 0 {
        let shift_u = shift.unsigned_abs();
        // A 53-bit mantissa shifted past bit 126 cannot fit a signed i128.
        if shift_u > 73 {
            i128::MAX
        } else {
            i128::from(mantissa) << shift_u
        }
    } else {
        i128::from(round_shift_right_u64(mantissa, shift.unsigned_abs()))
    };

    saturate(if sign { -abs_raw } else { abs_raw })
}

/// Converts a raw Q32.32 `i64` to `f64` for diagnostics and host display.
///
/// The `i64 → f64` cast rounds to nearest-even per IEEE-754 and the scale by
/// `2^-32` is exact, so the result is platform-stable.
pub fn to_f64(raw: i64) -> f64 {
    raw as f64 / ONE_RAW as f64
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn mul_rounds_ties_to_even() {
        // 1 ulp * 1.0: exact, no rounding.
        assert_eq!(mul(1, ONE_RAW), 1);
        // (1 ulp) * 0.5 = 0.5 ulp -> ties to even -> 0.
        assert_eq!(mul(1, ONE_RAW / 2), 0);
        // (3 ulp) * 0.5 = 1.5 ulp -> ties to even -> 2.
        assert_eq!(mul(3, ONE_RAW / 2), 2);
    }

    #[test]
    fn div_by_zero_saturates() {
        assert_eq!(div(0, 0), 0);
        assert_eq!(div(ONE_RAW, 0), i64::MAX);
        assert_eq!(div(-ONE_RAW, 0), i64::MIN);
    }

    #[test]
    fn isqrt_matches_perfect_squares() {
        for n in [0_u128, 1, 4, 9, 1 << 64, (1 << 40) * (1 << 40)] {
            let r = isqrt_u128(n);
            assert_eq!(r * r, n);
        }
        assert_eq!(isqrt_u128(15), 3);
        let big = u128::MAX >> 1;
        let r = isqrt_u128(big);
        assert!(r * r <= big && (r + 1) * (r + 1) > big);
    }

    #[test]
    fn f64_boundary_conversion() {
        assert_eq!(from_f64(1.0), ONE_RAW);
        assert_eq!(from_f64(-0.5), -(ONE_RAW / 2));
        assert_eq!(from_f64(f64::NAN), 0);
        assert_eq!(from_f64(f64::INFINITY), i64::MAX);
        assert_eq!(from_f64(1.0e30), i64::MAX);
        assert_eq!(to_f64(ONE_RAW * 3 / 2), 1.5);
    }
}
