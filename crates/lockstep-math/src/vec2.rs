// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::ops::{Add, Mul, Neg, Sub};

use crate::scalar::Fp;

/// Two-component fixed-point vector.
///
/// Used where a pair of coefficients is combined as a Euclidean length, e.g.
/// mixing two friction coefficients as `sqrt(a² + b²)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fp2 {
    /// X component.
    pub x: Fp,
    /// Y component.
    pub y: Fp,
}

impl Fp2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(Fp::ZERO, Fp::ZERO);

    /// Creates a vector from components.
    pub const fn new(x: Fp, y: Fp) -> Self {
        Self { x, y }
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> Fp {
        self.x * other.x + self.y * other.y
    }

    /// Squared magnitude (no square root).
    pub fn length_squared(self) -> Fp {
        self.dot(self)
    }

    /// Magnitude.
    pub fn length(self) -> Fp {
        self.length_squared().sqrt_or_zero()
    }

    /// Unit vector in the same direction; the zero vector maps to itself.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_zero() {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len)
    }
}

impl Add for Fp2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Fp2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Fp> for Fp2 {
    type Output = Self;

    fn mul(self, rhs: Fp) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Fp2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}
