// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! The deterministic fixed-point scalar (`fp`).
//!
//! Determinism contract:
//! - All arithmetic is performed in integer space with saturating overflow.
//! - Multiplication/division round to nearest, ties to even.
//! - Comparisons are plain integer comparisons on the raw value.
//! - Square root, sine, cosine, and arccosine are integer algorithms with
//!   fixed work per call (see [`crate::trig`] for accuracy bounds).

use core::fmt;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::error::MathError;
use crate::fixed_q32_32;
use crate::trig;

/// Deterministic fixed-point scalar with Q32.32 encoding stored in an `i64`.
///
/// ```text
/// real_value = raw / 2^32
/// ```
///
/// Range is roughly ±2.1 × 10⁹ with a resolution of 2⁻³² (≈ 2.3 × 10⁻¹⁰).
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fp {
    raw: i64,
}

impl Fp {
    /// `0.0`
    pub const ZERO: Self = Self { raw: 0 };

    /// `1.0`
    pub const ONE: Self = Self {
        raw: fixed_q32_32::ONE_RAW,
    };

    /// `-1.0`
    pub const NEG_ONE: Self = Self {
        raw: -fixed_q32_32::ONE_RAW,
    };

    /// `0.5`
    pub const HALF: Self = Self {
        raw: fixed_q32_32::ONE_RAW / 2,
    };

    /// `2.0`
    pub const TWO: Self = Self {
        raw: fixed_q32_32::ONE_RAW * 2,
    };

    /// π rounded to the nearest Q32.32 value.
    pub const PI: Self = Self { raw: 13_493_037_705 };

    /// π/2 rounded to the nearest Q32.32 value.
    pub const HALF_PI: Self = Self { raw: 6_746_518_852 };

    /// 2π rounded to the nearest Q32.32 value.
    pub const TWO_PI: Self = Self { raw: 26_986_075_409 };

    /// π/180, the degrees-to-radians factor.
    pub const DEG_TO_RAD: Self = Self { raw: 74_961_321 };

    /// 180/π, the radians-to-degrees factor.
    pub const RAD_TO_DEG: Self = Self {
        raw: 246_083_499_208,
    };

    /// Smallest positive value (one raw unit).
    pub const EPSILON: Self = Self { raw: 1 };

    /// Largest representable value.
    pub const MAX: Self = Self { raw: i64::MAX };

    /// Smallest representable value.
    pub const MIN: Self = Self { raw: i64::MIN };

    /// Constructs a value from a raw Q32.32 integer (no scaling).
    pub const fn from_raw(raw: i64) -> Self {
        Self { raw }
    }

    /// Returns the underlying Q32.32 raw storage value.
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// Constructs a value from an integer, saturating outside the Q32.32 range.
    pub fn from_int(n: i64) -> Self {
        Self::from_raw(fixed_q32_32::saturate(i128::from(n) << fixed_q32_32::FRAC_BITS))
    }

    /// Constructs the exact ratio `num / den`, rounded to nearest.
    ///
    /// This is the preferred way to write decimal literals: `Fp::from_ratio(981, 100)`
    /// is `9.81` on every platform. Returns zero when `den == 0`.
    pub fn from_ratio(num: i64, den: i64) -> Self {
        Self::from_raw(fixed_q32_32::ratio(num, den))
    }

    /// Host-boundary conversion from `f64` (see [`fixed_q32_32::from_f64`]).
    pub fn from_f64(value: f64) -> Self {
        Self::from_raw(fixed_q32_32::from_f64(value))
    }

    /// Host-boundary conversion to `f64` for display and diagnostics.
    pub fn to_f64(self) -> f64 {
        fixed_q32_32::to_f64(self.raw)
    }

    /// Returns `true` if the value is exactly zero.
    pub const fn is_zero(self) -> bool {
        self.raw == 0
    }

    /// Returns `true` if the value is strictly negative.
    pub const fn is_negative(self) -> bool {
        self.raw < 0
    }

    /// Absolute value (saturating at `MAX` for `MIN`).
    pub fn abs(self) -> Self {
        Self::from_raw(self.raw.saturating_abs())
    }

    /// Returns `-1`, `0`, or `1` matching the sign of `self`.
    pub fn signum(self) -> Self {
        match self.raw.signum() {
            0 => Self::ZERO,
            1 => Self::ONE,
            _ => Self::NEG_ONE,
        }
    }

    /// Smaller of two values.
    pub fn min(self, other: Self) -> Self {
        if other.raw < self.raw {
            other
        } else {
            self
        }
    }

    /// Larger of two values.
    pub fn max(self, other: Self) -> Self {
        if other.raw > self.raw {
            other
        } else {
            self
        }
    }

    /// Clamps into `[lo, hi]`. When `lo > hi`, `lo` wins.
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        self.min(hi).max(lo)
    }

    /// `self * self`.
    pub fn squared(self) -> Self {
        self * self
    }

    /// Square root by binary digit extraction on the raw representation.
    ///
    /// Returns the floor of the exact root in Q32.32, so perfect squares are
    /// exact: `Fp::from_int(16).sqrt() == Ok(Fp::from_int(4))`.
    pub fn sqrt(self) -> Result<Self, MathError> {
        fixed_q32_32::sqrt(self.raw)
            .map(Self::from_raw)
            .ok_or(MathError::NegativeSqrt { raw: self.raw })
    }

    /// Square root for values known to be non-negative (lengths, sums of
    /// squares). Negative inputs yield zero instead of an error.
    pub fn sqrt_or_zero(self) -> Self {
        fixed_q32_32::sqrt(self.raw).map_or(Self::ZERO, Self::from_raw)
    }

    /// Sine of an angle in radians.
    pub fn sin(self) -> Self {
        trig::sin_cos(self).0
    }

    /// Cosine of an angle in radians.
    pub fn cos(self) -> Self {
        trig::sin_cos(self).1
    }

    /// Sine and cosine of an angle in radians, sharing range reduction.
    pub fn sin_cos(self) -> (Self, Self) {
        trig::sin_cos(self)
    }

    /// Arccosine in radians; inputs are clamped to `[-1, 1]`.
    pub fn acos(self) -> Self {
        trig::acos(self)
    }

    /// Converts degrees to radians.
    pub fn to_radians(self) -> Self {
        self * Self::DEG_TO_RAD
    }

    /// Converts radians to degrees.
    pub fn to_degrees(self) -> Self {
        self * Self::RAD_TO_DEG
    }
}

impl fmt::Debug for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fp({} raw={})", self.to_f64(), self.raw)
    }
}

impl fmt::Display for Fp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}

impl From<i32> for Fp {
    fn from(value: i32) -> Self {
        Self::from_int(i64::from(value))
    }
}

impl Add for Fp {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.saturating_add(rhs.raw))
    }
}

impl Sub for Fp {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.saturating_sub(rhs.raw))
    }
}

impl Mul for Fp {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_raw(fixed_q32_32::mul(self.raw, rhs.raw))
    }
}

impl Div for Fp {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::from_raw(fixed_q32_32::div(self.raw, rhs.raw))
    }
}

impl Neg for Fp {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_raw(self.raw.saturating_neg())
    }
}

impl AddAssign for Fp {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fp {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fp {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fp {
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}
