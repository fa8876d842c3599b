// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Narrow-phase results.
use lockstep_math::{Fp, Fp3};

use crate::checksum::CombiningHash;
use crate::ident::InstanceId;

/// Contact description produced by a narrow-phase test.
///
/// Conventions:
/// - `a` is the point of shape A deepest inside shape B; `b` is the point of
///   shape B deepest inside shape A. Both are world space.
/// - `normal` is a unit vector pointing from A toward B: moving B along it
///   (or A against it) separates the shapes.
/// - `depth_squared` is the squared penetration depth; see
///   [`CollisionPoints::depth`] for the linear value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionPoints {
    /// Deepest point of A, world space.
    pub a: Fp3,
    /// Deepest point of B, world space.
    pub b: Fp3,
    /// Unit contact normal from A toward B.
    pub normal: Fp3,
    /// Squared penetration depth.
    pub depth_squared: Fp,
    /// Whether the shapes touch or overlap.
    pub has_collision: bool,
}

impl CollisionPoints {
    /// The canonical negative result.
    pub const NONE: Self = Self {
        a: Fp3::ZERO,
        b: Fp3::ZERO,
        normal: Fp3::ZERO,
        depth_squared: Fp::ZERO,
        has_collision: false,
    };

    /// A positive result with linear `depth`.
    pub fn hit(a: Fp3, b: Fp3, normal: Fp3, depth: Fp) -> Self {
        Self {
            a,
            b,
            normal,
            depth_squared: depth * depth,
            has_collision: true,
        }
    }

    /// Linear penetration depth.
    pub fn depth(&self) -> Fp {
        self.depth_squared.sqrt_or_zero()
    }

    /// The same contact seen from the other shape: points swapped, normal
    /// negated.
    pub fn flipped(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            normal: -self.normal,
            ..self
        }
    }

    /// Combining hash over every field.
    pub fn checksum(&self) -> u32 {
        CombiningHash::new()
            .signed_all(&self.a.to_raw())
            .signed_all(&self.b.to_raw())
            .signed_all(&self.normal.to_raw())
            .signed(self.depth_squared.raw())
            .word(u64::from(self.has_collision))
            .finish()
    }
}

/// A positive narrow-phase result between two objects of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    /// First object (the later one in insertion order).
    pub a: InstanceId,
    /// Second object.
    pub b: InstanceId,
    /// Contact geometry, `a` to `b`.
    pub points: CollisionPoints,
}

impl Collision {
    /// Returns the other participant, or `None` if `id` is not involved.
    pub fn other(&self, id: InstanceId) -> Option<InstanceId> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
