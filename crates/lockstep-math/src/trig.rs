// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Deterministic `sin`/`cos`/`acos` for Q32.32 fixed point.
//!
//! Nothing here calls a platform transcendental. Every function is a fixed
//! sequence of integer multiplies and divides, so results are bit-identical
//! everywhere.
//!
//! `sin`/`cos` strategy:
//! - reduce `|angle|` into `[0, 2π)` with an integer remainder on the raw value
//! - split into a quadrant with comparisons and map into `[0, π/2)`
//! - evaluate truncated Taylor series in nested (Horner) form through the
//!   `x^15` (sin) and `x^14` (cos) terms; truncation error at `π/2` is below
//!   `1e-11`, well under one raw unit
//! - apply quadrant symmetries; `sin(-x)` is the exact negation of `sin(x)`
//!
//! Observed accuracy is within `1e-9` of the true value for angles in
//! `[-100, 100]`; the dominant term is accumulated rounding in the nested
//! products.
//!
//! `acos` strategy: Abramowitz & Stegun 4.4.46,
//! `acos(x) = sqrt(1 - x) * (a0 + a1 x + ... + a7 x^7)` for `x ∈ [0, 1]`,
//! with `acos(-x) = π - acos(x)`. The polynomial's own error bound is
//! `|ε| ≤ 2e-8` rad; with Q32.32 rounding the implementation stays within
//! `3e-8` rad of the true value. Callers must tolerate that bound.

use crate::scalar::Fp;

const THREE_HALF_PI: Fp = Fp::from_raw(Fp::PI.raw() + Fp::HALF_PI.raw());

/// Highest series index `k`; sine stops at `x^(2k+1)`, cosine at `x^(2k)`.
const SERIES_TERMS: i64 = 7;

/// A&S 4.4.46 coefficients `a0..a7`, rounded to Q32.32.
const ACOS_COEFFS: [Fp; 8] = [
    Fp::from_raw(6_746_518_759),
    Fp::from_raw(-921_694_835),
    Fp::from_raw(382_161_841),
    Fp::from_raw(-215_496_997),
    Fp::from_raw(132_679_619),
    Fp::from_raw(-73_392_941),
    Fp::from_raw(28_647_819),
    Fp::from_raw(-5_422_358),
];

/// `sin(x)` for `x ∈ [0, π/2]`: `x (1 - x²/(2·3) (1 - x²/(4·5) (1 - …)))`.
fn sin_first_quadrant(x: Fp) -> Fp {
    let x2 = x * x;
    let mut acc = Fp::ONE;
    for k in (1..=SERIES_TERMS).rev() {
        acc = Fp::ONE - x2 * acc / Fp::from_int((2 * k) * (2 * k + 1));
    }
    x * acc
}

/// `cos(x)` for `x ∈ [0, π/2]`: `1 - x²/(1·2) (1 - x²/(3·4) (1 - …))`.
fn cos_first_quadrant(x: Fp) -> Fp {
    let x2 = x * x;
    let mut acc = Fp::ONE;
    for k in (1..=SERIES_TERMS).rev() {
        acc = Fp::ONE - x2 * acc / Fp::from_int((2 * k - 1) * (2 * k));
    }
    acc
}

/// Deterministic `(sin, cos)` for an angle in radians.
pub fn sin_cos(angle: Fp) -> (Fp, Fp) {
    let negative = angle.is_negative();
    let r = Fp::from_raw(angle.abs().raw().rem_euclid(Fp::TWO_PI.raw()));

    let (quadrant, a) = if r < Fp::HALF_PI {
        (0_u8, r)
    } else if r < Fp::PI {
        (1_u8, r - Fp::HALF_PI)
    } else if r < THREE_HALF_PI {
        (2_u8, r - Fp::PI)
    } else {
        (3_u8, r - THREE_HALF_PI)
    };

    let s = sin_first_quadrant(a);
    let c = cos_first_quadrant(a);
    let (sin, cos) = match quadrant {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    };

    if negative {
        (-sin, cos)
    } else {
        (sin, cos)
    }
}

/// Deterministic arccosine in radians. Inputs outside `[-1, 1]` are clamped.
pub fn acos(x: Fp) -> Fp {
    let x = x.clamp(Fp::NEG_ONE, Fp::ONE);
    let ax = x.abs();

    let mut poly = Fp::ZERO;
    for coeff in ACOS_COEFFS.iter().rev() {
        poly = poly * ax + *coeff;
    }
    let positive = (Fp::ONE - ax).sqrt_or_zero() * poly;

    if x.is_negative() {
        Fp::PI - positive
    } else {
        positive
    }
}
