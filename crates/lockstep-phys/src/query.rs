// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ray and capsule casts against single colliders.
//!
//! A ray is a segment: `origin + direction * t` for `t` in `[0, 1]`, so the
//! length of `direction` is the reach of the query. Every query first checks
//! the target's layer against a [`LayerMask`].
use lockstep_math::{Fp, Fp3};

use crate::collider::{Collider, WorldAabb, WorldCapsule, WorldPlane, WorldShape, WorldSphere};
use crate::layer::LayerMask;
use crate::narrow::{self, closest_points_between_segments};
use crate::points::CollisionPoints;
use crate::transform::Pose;

/// Segment query `origin + direction * t`, `t ∈ [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ray {
    /// Start point.
    pub origin: Fp3,
    /// Direction scaled to the full reach.
    pub direction: Fp3,
}

impl Ray {
    /// New ray segment.
    pub const fn new(origin: Fp3, direction: Fp3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t`.
    pub fn at(&self, t: Fp) -> Fp3 {
        self.origin + self.direction * t
    }

    /// End point (`t = 1`).
    pub fn end(&self) -> Fp3 {
        self.origin + self.direction
    }

    /// Parameter of the projection of `p` onto the ray line, clamped to `[0, 1]`.
    fn param_of(&self, p: Fp3) -> Fp {
        let len_sq = self.direction.length_squared();
        if len_sq.is_zero() {
            return Fp::ZERO;
        }
        ((p - self.origin).dot(self.direction) / len_sq).clamp(Fp::ZERO, Fp::ONE)
    }
}

/// A ray intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayHit {
    /// Ray parameter of the hit, in `[0, 1]`.
    pub t: Fp,
    /// World-space hit point.
    pub point: Fp3,
    /// Outward surface normal of the struck shape.
    pub normal: Fp3,
}

impl RayHit {
    /// The hit as contact points: both points at the hit, zero depth.
    pub fn to_points(self) -> CollisionPoints {
        CollisionPoints {
            a: self.point,
            b: self.point,
            normal: self.normal,
            depth_squared: Fp::ZERO,
            has_collision: true,
        }
    }
}

impl Collider {
    /// Casts `ray` against this collider placed at `pose`.
    pub fn raycast(&self, pose: &Pose, ray: &Ray, mask: LayerMask) -> Option<RayHit> {
        if !mask.contains(self.layer) {
            return None;
        }
        match self.world_shape(pose) {
            WorldShape::Aabb(b) => ray_aabb(ray, &b),
            WorldShape::Capsule(c) => ray_capsule(ray, &c),
            WorldShape::Sphere(s) => ray_sphere(ray, &s),
            WorldShape::Plane(p) => ray_plane(ray, &p),
        }
    }

    /// Tests a capsule of `radius` and tip-to-tip `height`, centered at
    /// `center` with its long axis along `direction`, against this collider
    /// placed at `pose`. The normal points from the cast capsule toward the
    /// collider.
    pub fn capsulecast(
        &self,
        pose: &Pose,
        center: Fp3,
        direction: Fp3,
        radius: Fp,
        height: Fp,
        mask: LayerMask,
    ) -> CollisionPoints {
        if !mask.contains(self.layer) {
            return CollisionPoints::NONE;
        }
        let probe = WorldShape::Capsule(WorldCapsule::along(center, direction, radius, height));
        narrow::test(&probe, &self.world_shape(pose))
    }
}

/// Slab test. Rays starting inside the box hit at `t = 0` with a normal
/// opposite the ray direction.
pub fn ray_aabb(ray: &Ray, b: &WorldAabb) -> Option<RayHit> {
    let mut t_enter = Fp::ZERO;
    let mut t_exit = Fp::ONE;
    let mut entry_normal: Option<Fp3> = None;
    let axes = [Fp3::UNIT_X, Fp3::UNIT_Y, Fp3::UNIT_Z];

    for (i, axis) in axes.into_iter().enumerate() {
        let o = ray.origin.component(i);
        let d = ray.direction.component(i);
        let lo = b.min.component(i);
        let hi = b.max.component(i);
        if d.is_zero() {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let t_lo = (lo - o) / d;
        let t_hi = (hi - o) / d;
        // Entering through the min face means the outward normal is -axis.
        let (near, far, normal) = if t_lo <= t_hi {
            (t_lo, t_hi, -axis)
        } else {
            (t_hi, t_lo, axis)
        };
        if near > t_enter {
            t_enter = near;
            entry_normal = Some(normal);
        }
        t_exit = t_exit.min(far);
        if t_enter > t_exit {
            return None;
        }
    }

    let normal = entry_normal.unwrap_or_else(|| -ray.direction.normalize());
    Some(RayHit {
        t: t_enter,
        point: ray.at(t_enter),
        normal,
    })
}

/// Ray against capsule: the ray is treated as a zero-radius capsule and the
/// closest points between the two inner segments decide the hit.
pub fn ray_capsule(ray: &Ray, c: &WorldCapsule) -> Option<RayHit> {
    let (on_ray, on_axis) = closest_points_between_segments(ray.origin, ray.end(), c.start, c.end);
    let gap = on_ray - on_axis;
    if gap.length_squared() > c.radius * c.radius {
        return None;
    }
    let outward = gap.normalize();
    let normal = if outward == Fp3::ZERO {
        -ray.direction.normalize()
    } else {
        outward
    };
    Some(RayHit {
        t: ray.param_of(on_ray),
        point: on_ray,
        normal,
    })
}

/// Ray against sphere, as a capsule with a zero-length inner segment.
pub fn ray_sphere(ray: &Ray, s: &WorldSphere) -> Option<RayHit> {
    let capsule = WorldCapsule {
        center: s.center,
        start: s.center,
        end: s.center,
        radius: s.radius,
        height: s.radius * Fp::TWO,
    };
    ray_capsule(ray, &capsule)
}

/// Ray against plane; the normal faces the side the ray comes from.
pub fn ray_plane(ray: &Ray, p: &WorldPlane) -> Option<RayHit> {
    let denom = ray.direction.dot(p.normal);
    if denom.is_zero() {
        return None;
    }
    let t = (p.point - ray.origin).dot(p.normal) / denom;
    if t < Fp::ZERO || t > Fp::ONE {
        return None;
    }
    let normal = if denom.is_negative() { p.normal } else { -p.normal };
    Some(RayHit {
        t,
        point: ray.at(t),
        normal,
    })
}
