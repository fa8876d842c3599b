// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::scalar::Fp;

/// Deterministic 3D vector used throughout the engine.
///
/// * Components encode metres and may represent either points or directions
///   depending on the calling context.
/// * Arithmetic is Q32.32 fixed point; see [`Fp`] for rounding rules.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Fp3 {
    /// X component.
    pub x: Fp,
    /// Y component.
    pub y: Fp,
    /// Z component.
    pub z: Fp,
}

impl Fp3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(Fp::ZERO, Fp::ZERO, Fp::ZERO);

    /// `(1, 1, 1)`, the identity scale.
    pub const ONE: Self = Self::new(Fp::ONE, Fp::ONE, Fp::ONE);

    /// Unit vector pointing along the positive X axis.
    pub const UNIT_X: Self = Self::new(Fp::ONE, Fp::ZERO, Fp::ZERO);

    /// Unit vector pointing along the positive Y axis.
    pub const UNIT_Y: Self = Self::new(Fp::ZERO, Fp::ONE, Fp::ZERO);

    /// Unit vector pointing along the positive Z axis.
    pub const UNIT_Z: Self = Self::new(Fp::ZERO, Fp::ZERO, Fp::ONE);

    /// World up (`+Y`).
    pub const UP: Self = Self::UNIT_Y;

    /// World down (`-Y`).
    pub const DOWN: Self = Self::new(Fp::ZERO, Fp::NEG_ONE, Fp::ZERO);

    /// World forward (`+Z`).
    pub const FORWARD: Self = Self::UNIT_Z;

    /// Creates a vector from components.
    pub const fn new(x: Fp, y: Fp, z: Fp) -> Self {
        Self { x, y, z }
    }

    /// Creates a vector from integer components.
    pub fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self::new(Fp::from_int(x), Fp::from_int(y), Fp::from_int(z))
    }

    /// Creates a vector from raw Q32.32 components.
    pub const fn from_raw(raw: [i64; 3]) -> Self {
        Self::new(Fp::from_raw(raw[0]), Fp::from_raw(raw[1]), Fp::from_raw(raw[2]))
    }

    /// Returns raw Q32.32 components.
    pub const fn to_raw(self) -> [i64; 3] {
        [self.x.raw(), self.y.raw(), self.z.raw()]
    }

    /// Returns the components as an array.
    pub const fn to_array(self) -> [Fp; 3] {
        [self.x, self.y, self.z]
    }

    /// Component by axis index (`0 = x`, `1 = y`, anything else `= z`).
    pub fn component(self, axis: usize) -> Fp {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> Fp {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Squared magnitude; prefer this over [`Fp3::length`] for comparisons.
    pub fn length_squared(self) -> Fp {
        self.dot(self)
    }

    /// Magnitude.
    pub fn length(self) -> Fp {
        self.length_squared().sqrt_or_zero()
    }

    /// Unit vector in the same direction.
    ///
    /// The exact zero vector normalizes to itself; this is not an error.
    /// Vectors so short that their length rounds to zero also map to zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len.is_zero() {
            return Self::ZERO;
        }
        self / len
    }

    /// Component-wise product.
    pub fn mul_elem(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs(), self.z.abs())
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Component-wise clamp into `[lo, hi]`.
    pub fn clamp(self, lo: Self, hi: Self) -> Self {
        Self::new(
            self.x.clamp(lo.x, hi.x),
            self.y.clamp(lo.y, hi.y),
            self.z.clamp(lo.z, hi.z),
        )
    }

    /// Index of the component with the greatest absolute magnitude.
    ///
    /// Ties resolve to the lowest index, so `(1, -1, 1)` reports `0`.
    pub fn major_axis(self) -> usize {
        let a = self.abs();
        let mut best = 0;
        if a.y > a.component(best) {
            best = 1;
        }
        if a.z > a.component(best) {
            best = 2;
        }
        best
    }

    /// Greatest absolute component (the magnitude at [`Fp3::major_axis`]).
    pub fn major(self) -> Fp {
        self.component(self.major_axis()).abs()
    }

    /// Angle in radians between two directions, via the fixed `acos`.
    ///
    /// Returns zero when either input is the zero vector.
    pub fn angle_between(self, other: Self) -> Fp {
        let a = self.normalize();
        let b = other.normalize();
        if a == Self::ZERO || b == Self::ZERO {
            return Fp::ZERO;
        }
        a.dot(b).acos()
    }
}

impl Add for Fp3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Fp3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<Fp> for Fp3 {
    type Output = Self;

    fn mul(self, rhs: Fp) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Mul<Fp3> for Fp {
    type Output = Fp3;

    fn mul(self, rhs: Fp3) -> Fp3 {
        rhs * self
    }
}

impl Div<Fp> for Fp3 {
    type Output = Self;

    fn div(self, rhs: Fp) -> Self {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Fp3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Fp3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fp3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign<Fp> for Fp3 {
    fn mul_assign(&mut self, rhs: Fp) {
        *self = *self * rhs;
    }
}
