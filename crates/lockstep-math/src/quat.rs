// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::ops::Mul;

use crate::scalar::Fp;
use crate::vec3::Fp3;

/// Quaternion stored as `(x, y, z, w)` with Q32.32 components.
///
/// * `w` is the scalar part.
/// * Angles are radians unless a constructor says otherwise.
/// * Rotation helpers assume a unit quaternion; call [`Fpq::normalize`]
///   after long multiplication chains.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Fpq {
    /// X component of the vector part.
    pub x: Fp,
    /// Y component of the vector part.
    pub y: Fp,
    /// Z component of the vector part.
    pub z: Fp,
    /// Scalar part.
    pub w: Fp,
}

impl Default for Fpq {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Fpq {
    /// The identity rotation `(0, 0, 0, 1)`.
    pub const IDENTITY: Self = Self::new(Fp::ZERO, Fp::ZERO, Fp::ZERO, Fp::ONE);

    /// Creates a quaternion from components. Normalization is not enforced.
    pub const fn new(x: Fp, y: Fp, z: Fp, w: Fp) -> Self {
        Self { x, y, z, w }
    }

    /// Returns raw Q32.32 components in `(x, y, z, w)` order.
    pub const fn to_raw(self) -> [i64; 4] {
        [self.x.raw(), self.y.raw(), self.z.raw(), self.w.raw()]
    }

    /// Constructs a quaternion from raw Q32.32 components in `(x, y, z, w)` order.
    pub const fn from_raw(raw: [i64; 4]) -> Self {
        Self::new(
            Fp::from_raw(raw[0]),
            Fp::from_raw(raw[1]),
            Fp::from_raw(raw[2]),
            Fp::from_raw(raw[3]),
        )
    }

    fn vector(self) -> Fp3 {
        Fp3::new(self.x, self.y, self.z)
    }

    /// Rotation of `angle` radians about `axis`.
    ///
    /// The axis is normalized first; a zero axis yields the identity.
    pub fn from_axis_angle(axis: Fp3, angle: Fp) -> Self {
        let axis = axis.normalize();
        if axis == Fp3::ZERO {
            return Self::IDENTITY;
        }
        let (sin_half, cos_half) = (angle * Fp::HALF).sin_cos();
        let v = axis * sin_half;
        Self::new(v.x, v.y, v.z, cos_half)
    }

    /// Rotation from Euler angles in degrees.
    ///
    /// Composition is `yaw(y) * pitch(x) * roll(z)`: applied to a vector the
    /// roll happens first, then pitch, then yaw.
    pub fn from_euler_degrees(euler: Fp3) -> Self {
        let pitch = Self::from_axis_angle(Fp3::UNIT_X, euler.x.to_radians());
        let yaw = Self::from_axis_angle(Fp3::UNIT_Y, euler.y.to_radians());
        let roll = Self::from_axis_angle(Fp3::UNIT_Z, euler.z.to_radians());
        yaw * pitch * roll
    }

    /// Rotation whose local `+Z` points along `forward` and whose local `+Y`
    /// leans toward `up`.
    ///
    /// A zero `forward` yields the identity. When `forward` is parallel to
    /// `up`, a substitute up axis (`+X`, or `+Y` for X-dominant forwards) is
    /// used so the result stays well defined.
    pub fn look_rotation(forward: Fp3, up: Fp3) -> Self {
        let f = forward.normalize();
        if f == Fp3::ZERO {
            return Self::IDENTITY;
        }
        let mut r = up.cross(f).normalize();
        if r == Fp3::ZERO {
            let alt = if f.major_axis() == 0 { Fp3::UNIT_Y } else { Fp3::UNIT_X };
            r = alt.cross(f).normalize();
        }
        let u = f.cross(r);

        // Basis matrix with columns (r, u, f).
        let (m00, m01, m02) = (r.x, u.x, f.x);
        let (m10, m11, m12) = (r.y, u.y, f.y);
        let (m20, m21, m22) = (r.z, u.z, f.z);
        let quarter = Fp::from_ratio(1, 4);

        let trace = m00 + m11 + m22;
        let q = if trace > Fp::ZERO {
            let s = (trace + Fp::ONE).sqrt_or_zero() * Fp::TWO;
            Self::new((m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, s * quarter)
        } else if m00 > m11 && m00 > m22 {
            let s = (Fp::ONE + m00 - m11 - m22).sqrt_or_zero() * Fp::TWO;
            Self::new(s * quarter, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = (Fp::ONE + m11 - m00 - m22).sqrt_or_zero() * Fp::TWO;
            Self::new((m01 + m10) / s, s * quarter, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = (Fp::ONE + m22 - m00 - m11).sqrt_or_zero() * Fp::TWO;
            Self::new((m02 + m20) / s, (m12 + m21) / s, s * quarter, (m10 - m01) / s)
        };
        q.normalize()
    }

    /// Hamilton product `self * other`.
    ///
    /// Applied to a vector, `other` rotates first and `self` second.
    pub fn multiply(self, other: Self) -> Self {
        let (ax, ay, az, aw) = (self.x, self.y, self.z, self.w);
        let (bx, by, bz, bw) = (other.x, other.y, other.z, other.w);
        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Conjugate; the inverse rotation for unit quaternions.
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Squared norm.
    pub fn length_squared(self) -> Fp {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Scales to unit length; a zero quaternion becomes the identity.
    pub fn normalize(self) -> Self {
        let len = self.length_squared().sqrt_or_zero();
        if len.is_zero() {
            return Self::IDENTITY;
        }
        Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
    }

    /// Rotates a vector: `v' = v + w·t + u × t` where `t = 2 (u × v)`.
    pub fn rotate(self, v: Fp3) -> Fp3 {
        let u = self.vector();
        let t = u.cross(v) * Fp::TWO;
        v + t * self.w + u.cross(t)
    }
}

impl Mul for Fpq {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.multiply(rhs)
    }
}

impl Mul<Fp3> for Fpq {
    type Output = Fp3;

    fn mul(self, rhs: Fp3) -> Fp3 {
        self.rotate(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_vectors_untouched() {
        let v = Fp3::from_ints(3, -4, 5);
        assert_eq!(Fpq::IDENTITY.rotate(v), v);
    }

    #[test]
    fn looking_down_z_is_identity() {
        assert_eq!(Fpq::look_rotation(Fp3::FORWARD, Fp3::UP), Fpq::IDENTITY);
    }

    #[test]
    fn zero_forward_is_identity() {
        assert_eq!(Fpq::look_rotation(Fp3::ZERO, Fp3::UP), Fpq::IDENTITY);
    }
}
