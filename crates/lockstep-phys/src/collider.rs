// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collider shapes and their placement in world space.
//!
//! Shape fields are local to the owning transform. [`Collider::world_shape`]
//! resolves them against a [`Pose`] at test time; the pairwise algorithms in
//! [`crate::narrow`] only ever see world-space geometry.
use lockstep_math::{Fp, Fp3};

use crate::checksum::fletcher32;
use crate::codec;
use crate::layer::Layer;
use crate::narrow;
use crate::points::CollisionPoints;
use crate::transform::Pose;

/// Sphere around a local center.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sphere {
    /// Local center.
    pub center: Fp3,
    /// Radius before scaling.
    pub radius: Fp,
}

/// Capsule: a segment along `axis` swept by `radius`.
///
/// `height` is the full tip-to-tip length, so the inner segment spans
/// `height - 2 * radius`. `axis` is expected to be one of the canonical unit
/// axes; other directions are accepted but their scale decomposition uses
/// only the axis's largest component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capsule {
    /// Local center.
    pub center: Fp3,
    /// Radius before scaling.
    pub radius: Fp,
    /// Tip-to-tip length before scaling.
    pub height: Fp,
    /// Local long axis.
    pub axis: Fp3,
}

/// Axis-aligned box. Rotation moves its center but never tilts its faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    /// Local minimum corner.
    pub min: Fp3,
    /// Local maximum corner.
    pub max: Fp3,
}

/// Infinite plane `dot(normal, p) == distance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    /// Local normal; need not be unit length.
    pub normal: Fp3,
    /// Offset along the normal.
    pub distance: Fp,
}

/// Closed set of collider shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// See [`Sphere`].
    Sphere(Sphere),
    /// See [`Capsule`].
    Capsule(Capsule),
    /// See [`Aabb`].
    Aabb(Aabb),
    /// See [`Plane`].
    Plane(Plane),
}

/// A shape plus the layer used for pair filtering and query masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collider {
    /// Geometry in local space.
    pub shape: Shape,
    /// Filtering tag.
    pub layer: Layer,
}

impl Default for Collider {
    /// Unit sphere at the origin on [`Layer::Default`]; also the fallback for
    /// unreadable collider records.
    fn default() -> Self {
        Self::sphere(Fp3::ZERO, Fp::ONE)
    }
}

impl Collider {
    /// Sphere collider on [`Layer::Default`].
    pub const fn sphere(center: Fp3, radius: Fp) -> Self {
        Self::from_shape(Shape::Sphere(Sphere { center, radius }))
    }

    /// Capsule collider on [`Layer::Default`].
    pub const fn capsule(center: Fp3, radius: Fp, height: Fp, axis: Fp3) -> Self {
        Self::from_shape(Shape::Capsule(Capsule {
            center,
            radius,
            height,
            axis,
        }))
    }

    /// Box collider on [`Layer::Default`].
    pub const fn aabb(min: Fp3, max: Fp3) -> Self {
        Self::from_shape(Shape::Aabb(Aabb { min, max }))
    }

    /// Plane collider on [`Layer::Default`].
    pub const fn plane(normal: Fp3, distance: Fp) -> Self {
        Self::from_shape(Shape::Plane(Plane { normal, distance }))
    }

    const fn from_shape(shape: Shape) -> Self {
        Self {
            shape,
            layer: Layer::Default,
        }
    }

    /// Builder: sets the layer.
    pub const fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Fletcher-32 of the tagged collider record.
    pub fn checksum(&self) -> u32 {
        fletcher32(&codec::to_bytes(self))
    }

    /// Resolves the shape against `pose`.
    pub fn world_shape(&self, pose: &Pose) -> WorldShape {
        match self.shape {
            Shape::Sphere(s) => WorldShape::Sphere(s.to_world(pose)),
            Shape::Capsule(c) => WorldShape::Capsule(c.to_world(pose)),
            Shape::Aabb(b) => WorldShape::Aabb(b.to_world(pose)),
            Shape::Plane(p) => WorldShape::Plane(p.to_world(pose)),
        }
    }

    /// Narrow-phase test of `self` placed at `pose` against `other` placed at
    /// `other_pose`. The result's normal points from `self` toward `other`.
    pub fn test_collision(&self, pose: &Pose, other: &Self, other_pose: &Pose) -> CollisionPoints {
        narrow::test(&self.world_shape(pose), &other.world_shape(other_pose))
    }
}

/// World-space sphere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldSphere {
    /// Center.
    pub center: Fp3,
    /// Radius.
    pub radius: Fp,
}

/// World-space capsule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldCapsule {
    /// Center.
    pub center: Fp3,
    /// Inner segment start.
    pub start: Fp3,
    /// Inner segment end.
    pub end: Fp3,
    /// Radius.
    pub radius: Fp,
    /// Tip-to-tip length.
    pub height: Fp,
}

impl WorldCapsule {
    /// Capsule centered at `center` whose long axis follows `direction`.
    pub fn along(center: Fp3, direction: Fp3, radius: Fp, height: Fp) -> Self {
        let half = (height * Fp::HALF - radius).max(Fp::ZERO);
        let offset = direction.normalize() * half;
        Self {
            center,
            start: center - offset,
            end: center + offset,
            radius,
            height,
        }
    }
}

/// World-space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldAabb {
    /// Minimum corner.
    pub min: Fp3,
    /// Maximum corner.
    pub max: Fp3,
}

impl WorldAabb {
    /// Box around `center` with non-negative `half_extents`.
    pub fn from_center(center: Fp3, half_extents: Fp3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Midpoint of the box.
    pub fn center(&self) -> Fp3 {
        (self.min + self.max) * Fp::HALF
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: Fp3) -> bool {
        p.clamp(self.min, self.max) == p
    }
}

/// World-space plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldPlane {
    /// Unit normal.
    pub normal: Fp3,
    /// A point on the plane.
    pub point: Fp3,
}

/// A collider resolved into world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldShape {
    /// World-space sphere.
    Sphere(WorldSphere),
    /// World-space capsule.
    Capsule(WorldCapsule),
    /// World-space box.
    Aabb(WorldAabb),
    /// World-space plane.
    Plane(WorldPlane),
}

impl Sphere {
    /// Center follows the pose; the radius grows with the largest scale
    /// component.
    pub fn to_world(&self, pose: &Pose) -> WorldSphere {
        WorldSphere {
            center: pose.apply(self.center),
            radius: self.radius * pose.scale.major(),
        }
    }
}

impl Capsule {
    /// Height scales with the axis component of the pose scale, the radius
    /// with the larger of the other two components.
    pub fn to_world(&self, pose: &Pose) -> WorldCapsule {
        let axis_index = self.axis.major_axis();
        let scale = pose.scale.abs();
        let height_scale = scale.component(axis_index);
        let radius_scale = (0..3)
            .filter(|i| *i != axis_index)
            .map(|i| scale.component(i))
            .fold(Fp::ZERO, Fp::max);
        let direction = pose.rotation.rotate(self.axis);
        WorldCapsule::along(
            pose.apply(self.center),
            direction,
            self.radius * radius_scale,
            self.height * height_scale,
        )
    }
}

impl Aabb {
    /// Center follows the pose; extents are scaled but never rotated.
    pub fn to_world(&self, pose: &Pose) -> WorldAabb {
        let center = (self.min + self.max) * Fp::HALF;
        let half = ((self.max - self.min) * Fp::HALF).mul_elem(pose.scale).abs();
        WorldAabb::from_center(pose.apply(center), half)
    }
}

impl Plane {
    /// The normal is rotated (never scaled) and renormalized; the anchor
    /// point `normal * distance` goes through the full pose.
    pub fn to_world(&self, pose: &Pose) -> WorldPlane {
        let unit = self.normal.normalize();
        WorldPlane {
            normal: pose.rotation.rotate(unit).normalize(),
            point: pose.apply(unit * self.distance),
        }
    }
}
