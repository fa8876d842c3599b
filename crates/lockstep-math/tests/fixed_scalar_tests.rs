// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use lockstep_math::{Fp, MathError};

#[test]
fn fp_constants_and_raw_encoding() {
    assert_eq!(Fp::ZERO.raw(), 0);
    assert_eq!(Fp::ONE.raw(), 1_i64 << 32);
    assert_eq!(Fp::HALF.raw(), 1_i64 << 31);
    assert_eq!(Fp::from_int(-3).raw(), -3_i64 << 32);
}

#[test]
fn fp_from_f64_exact_values() {
    assert_eq!(Fp::from_f64(0.0).raw(), 0);
    assert_eq!(Fp::from_f64(-0.0).raw(), 0);
    assert_eq!(Fp::from_f64(1.5).raw(), (1_i64 << 32) + (1_i64 << 31));
    assert_eq!(Fp::from_f64(-1.0), Fp::NEG_ONE);
}

#[test]
fn fp_to_f64_roundtrips_dyadic_values() {
    for v in [0.0, 1.0, -1.0, 0.5, 1.5, -1024.25] {
        assert_eq!(Fp::from_f64(v).to_f64(), v);
    }
}

#[test]
fn fp_non_finite_inputs_are_tamed() {
    assert_eq!(Fp::from_f64(f64::INFINITY), Fp::MAX);
    assert_eq!(Fp::from_f64(f64::NEG_INFINITY), Fp::MIN);
    assert_eq!(Fp::from_f64(f64::NAN), Fp::ZERO);
}

#[test]
fn fp_basic_arithmetic() {
    let a = Fp::from_ratio(3, 2);
    let b = Fp::TWO;
    assert_eq!(a + b, Fp::from_ratio(7, 2));
    assert_eq!(b - a, Fp::HALF);
    assert_eq!(a * b, Fp::from_int(3));
    assert_eq!(b / a, Fp::from_ratio(4, 3));
    assert_eq!(-a, Fp::from_ratio(-3, 2));
}

#[test]
fn fp_decimal_literals_via_ratio() {
    let g = Fp::from_ratio(981, 100);
    assert!((g.to_f64() - 9.81).abs() < 1e-9);
    assert_eq!(Fp::from_ratio(1, 0), Fp::ZERO);
}

#[test]
fn fp_division_by_zero_saturates() {
    assert_eq!(Fp::ONE / Fp::ZERO, Fp::MAX);
    assert_eq!(Fp::NEG_ONE / Fp::ZERO, Fp::MIN);
    assert_eq!(Fp::ZERO / Fp::ZERO, Fp::ZERO);
}

#[test]
fn fp_multiplication_saturates() {
    let big = Fp::from_int(1 << 30);
    assert_eq!(big * big, Fp::MAX);
    assert_eq!(big * -big, Fp::MIN);
}

#[test]
fn fp_sqrt_is_exact_on_perfect_squares() {
    assert_eq!(Fp::from_int(16).sqrt(), Ok(Fp::from_int(4)));
    assert_eq!(Fp::from_ratio(1, 4).sqrt(), Ok(Fp::HALF));
    assert_eq!(Fp::ZERO.sqrt(), Ok(Fp::ZERO));
}

#[test]
fn fp_sqrt_of_negative_is_an_error() {
    let err = Fp::from_int(-4).sqrt().unwrap_err();
    assert_eq!(
        err,
        MathError::NegativeSqrt {
            raw: Fp::from_int(-4).raw()
        }
    );
    assert_eq!(Fp::from_int(-4).sqrt_or_zero(), Fp::ZERO);
}

#[test]
fn fp_sqrt_of_two_is_close() {
    let r = Fp::TWO.sqrt().unwrap();
    assert!((r.to_f64() - std::f64::consts::SQRT_2).abs() < 1e-9);
    // Floor semantics: r² never exceeds the operand.
    assert!(i128::from(r.raw()) * i128::from(r.raw()) <= (2_i128 << 64));
}

#[test]
fn fp_ordering_follows_raw_value() {
    let mut v = vec![Fp::ONE, Fp::NEG_ONE, Fp::ZERO, Fp::HALF];
    v.sort();
    assert_eq!(v, vec![Fp::NEG_ONE, Fp::ZERO, Fp::HALF, Fp::ONE]);
    assert_eq!(Fp::from_int(-7).signum(), Fp::NEG_ONE);
    assert_eq!(Fp::from_int(-7).abs(), Fp::from_int(7));
}

#[test]
fn fp_angle_unit_conversion() {
    let rad = Fp::from_int(180).to_radians();
    assert!((rad - Fp::PI).abs() < Fp::from_ratio(1, 1_000_000));
    let deg = Fp::PI.to_degrees();
    assert!((deg - Fp::from_int(180)).abs() < Fp::from_ratio(1, 100_000));
}
