// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pairwise narrow-phase tests over world-space shapes.
//!
//! [`test`] is the complete dispatch table. Each unordered shape pair has a
//! single implementation; the mirrored direction calls it with the
//! arguments swapped and flips the result. Plane against anything but a
//! sphere is not implemented and reports [`CollisionPoints::NONE`].
//!
//! All "touching" comparisons are inclusive: shapes at exact tangency
//! collide with zero depth.
use lockstep_math::{Fp, Fp3};

use crate::collider::{WorldAabb, WorldCapsule, WorldPlane, WorldShape, WorldSphere};
use crate::points::CollisionPoints;

/// Tests `a` against `b`; the normal of a positive result points from `a`
/// toward `b`.
pub fn test(a: &WorldShape, b: &WorldShape) -> CollisionPoints {
    use WorldShape::{Aabb, Capsule, Plane, Sphere};
    match (a, b) {
        (Sphere(a), Sphere(b)) => sphere_sphere(a, b),
        (Sphere(a), Capsule(b)) => sphere_capsule(a, b),
        (Sphere(a), Aabb(b)) => sphere_aabb(a, b),
        (Sphere(a), Plane(b)) => sphere_plane(a, b),
        (Capsule(a), Sphere(b)) => sphere_capsule(b, a).flipped(),
        (Capsule(a), Capsule(b)) => capsule_capsule(a, b),
        (Capsule(a), Aabb(b)) => capsule_aabb(a, b),
        (Aabb(a), Sphere(b)) => sphere_aabb(b, a).flipped(),
        (Aabb(a), Capsule(b)) => capsule_aabb(b, a).flipped(),
        (Aabb(a), Aabb(b)) => aabb_aabb(a, b),
        (Plane(a), Sphere(b)) => sphere_plane(b, a).flipped(),
        (Capsule(_) | Aabb(_) | Plane(_), Plane(_)) | (Plane(_), Capsule(_) | Aabb(_)) => {
            CollisionPoints::NONE
        }
    }
}

/// Closest point to `p` on the segment `start..=end`.
pub fn closest_point_on_segment(start: Fp3, end: Fp3, p: Fp3) -> Fp3 {
    let ab = end - start;
    let len_sq = ab.length_squared();
    if len_sq.is_zero() {
        return start;
    }
    let t = ((p - start).dot(ab) / len_sq).clamp(Fp::ZERO, Fp::ONE);
    start + ab * t
}

/// Approximate closest points between two segments.
///
/// Picks the endpoint of `a` nearest to `b` from the four endpoint-to-endpoint
/// distances, projects it onto `b`, then projects that point back onto `a`.
/// Exact for most configurations; near-parallel overlapping segments may
/// return a pair that is close to, but not exactly, the minimum.
pub fn closest_points_between_segments(
    a_start: Fp3,
    a_end: Fp3,
    b_start: Fp3,
    b_end: Fp3,
) -> (Fp3, Fp3) {
    let d0 = (b_start - a_start).length_squared();
    let d1 = (b_end - a_start).length_squared();
    let d2 = (b_start - a_end).length_squared();
    let d3 = (b_end - a_end).length_squared();

    let anchor = if d2 < d0 || d2 < d1 || d3 < d0 || d3 < d1 {
        a_end
    } else {
        a_start
    };
    let on_b = closest_point_on_segment(b_start, b_end, anchor);
    let on_a = closest_point_on_segment(a_start, a_end, on_b);
    (on_a, on_b)
}

/// Contact between two balls given their centers and radii.
fn balls(center_a: Fp3, radius_a: Fp, center_b: Fp3, radius_b: Fp) -> CollisionPoints {
    let delta = center_b - center_a;
    let dist_sq = delta.length_squared();
    let reach = radius_a + radius_b;
    if dist_sq > reach * reach {
        return CollisionPoints::NONE;
    }
    let dist = dist_sq.sqrt_or_zero();
    let normal = if dist.is_zero() { Fp3::UP } else { delta / dist };
    CollisionPoints::hit(
        center_a + normal * radius_a,
        center_b - normal * radius_b,
        normal,
        reach - dist,
    )
}

/// Sphere against sphere: collides iff `|cB - cA|² <= (rA + rB)²`.
/// Concentric spheres report an upward normal.
pub fn sphere_sphere(a: &WorldSphere, b: &WorldSphere) -> CollisionPoints {
    balls(a.center, a.radius, b.center, b.radius)
}

/// Sphere against the closest point of the capsule's inner segment.
pub fn sphere_capsule(a: &WorldSphere, b: &WorldCapsule) -> CollisionPoints {
    let on_axis = closest_point_on_segment(b.start, b.end, a.center);
    balls(a.center, a.radius, on_axis, b.radius)
}

/// Sphere against an unbounded plane. Everything behind the plane counts as
/// inside it.
pub fn sphere_plane(a: &WorldSphere, b: &WorldPlane) -> CollisionPoints {
    let distance = (a.center - b.point).dot(b.normal);
    if distance > a.radius {
        return CollisionPoints::NONE;
    }
    CollisionPoints::hit(
        a.center - b.normal * a.radius,
        a.center - b.normal * distance,
        -b.normal,
        a.radius - distance,
    )
}

/// Capsule against capsule via [`closest_points_between_segments`]; collides
/// iff `rA + rB - gap >= 0`.
pub fn capsule_capsule(a: &WorldCapsule, b: &WorldCapsule) -> CollisionPoints {
    let (on_a, on_b) = closest_points_between_segments(a.start, a.end, b.start, b.end);
    balls(on_a, a.radius, on_b, b.radius)
}

/// Sphere against box by clamping the center into the box.
///
/// A center strictly inside the box has no meaningful closest-point
/// direction; the sphere is then pushed out through the top face.
pub fn sphere_aabb(a: &WorldSphere, b: &WorldAabb) -> CollisionPoints {
    let closest = a.center.clamp(b.min, b.max);
    let delta = closest - a.center;
    let dist_sq = delta.length_squared();
    if dist_sq > a.radius * a.radius {
        return CollisionPoints::NONE;
    }
    if dist_sq.is_zero() {
        let top = Fp3::new(a.center.x, b.max.y, a.center.z);
        return CollisionPoints::hit(
            a.center + Fp3::DOWN * a.radius,
            top,
            Fp3::DOWN,
            (b.max.y - a.center.y) + a.radius,
        );
    }
    let dist = dist_sq.sqrt_or_zero();
    let normal = delta / dist;
    CollisionPoints::hit(a.center + normal * a.radius, closest, normal, a.radius - dist)
}

/// Capsule against box, approximated by a box with half extents
/// `(radius, height, radius)` around the capsule center.
pub fn capsule_aabb(a: &WorldCapsule, b: &WorldAabb) -> CollisionPoints {
    let proxy = WorldAabb::from_center(a.center, Fp3::new(a.radius, a.height, a.radius));
    aabb_aabb(&proxy, b)
}

/// Box against box: inclusive slab overlap, then the face with the least
/// penetration. Candidates are checked in the order `+x, -x, +y, -y, +z, -z`
/// and the first minimum wins.
pub fn aabb_aabb(a: &WorldAabb, b: &WorldAabb) -> CollisionPoints {
    let overlaps = (0..3).all(|i| {
        a.min.component(i) <= b.max.component(i) && a.max.component(i) >= b.min.component(i)
    });
    if !overlaps {
        return CollisionPoints::NONE;
    }

    let axes = [Fp3::UNIT_X, Fp3::UNIT_Y, Fp3::UNIT_Z];
    let mut best: Option<(Fp, Fp3)> = None;
    for (i, axis) in axes.into_iter().enumerate() {
        let forward = a.max.component(i) - b.min.component(i);
        let backward = b.max.component(i) - a.min.component(i);
        for (depth, normal) in [(forward, axis), (backward, -axis)] {
            if best.is_none_or(|(d, _)| depth < d) {
                best = Some((depth, normal));
            }
        }
    }
    let Some((depth, normal)) = best else {
        return CollisionPoints::NONE;
    };

    let overlap_center = (a.min.max(b.min) + a.max.min(b.max)) * Fp::HALF;
    let half = normal * (depth * Fp::HALF);
    CollisionPoints::hit(overlap_center + half, overlap_center - half, normal, depth)
}
