// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use lockstep_math::{Fp, Fp3};
use lockstep_phys::{Collider, CollisionPoints, Pose};

fn at(x: i64, y: i64, z: i64) -> Pose {
    Pose::at(Fp3::from_ints(x, y, z))
}

fn unit_sphere() -> Collider {
    Collider::sphere(Fp3::ZERO, Fp::ONE)
}

fn unit_box() -> Collider {
    Collider::aabb(-Fp3::ONE, Fp3::ONE)
}

fn tall_capsule() -> Collider {
    Collider::capsule(Fp3::ZERO, Fp::ONE, Fp::from_int(4), Fp3::UNIT_Y)
}

#[test]
fn tangent_spheres_collide_with_zero_depth() {
    let points = unit_sphere().test_collision(&at(-1, 0, 0), &unit_sphere(), &at(1, 0, 0));
    assert!(points.has_collision);
    assert_eq!(points.depth_squared, Fp::ZERO);
    assert_eq!(points.normal, Fp3::UNIT_X);
    assert_eq!(points.a, Fp3::ZERO);
    assert_eq!(points.b, Fp3::ZERO);
}

#[test]
fn separated_spheres_do_not_collide() {
    let eleven_tenths = Fp::from_ratio(11, 10);
    let a = Pose::at(Fp3::new(-eleven_tenths, Fp::ZERO, Fp::ZERO));
    let b = Pose::at(Fp3::new(eleven_tenths, Fp::ZERO, Fp::ZERO));
    assert_eq!(unit_sphere().test_collision(&a, &unit_sphere(), &b), CollisionPoints::NONE);
}

#[test]
fn sphere_resting_in_plane_is_pushed_along_negative_normal() {
    let plane = Collider::plane(Fp3::UP, Fp::ZERO);
    let sphere_pose = Pose::at(Fp3::new(Fp::ZERO, Fp::HALF, Fp::ZERO));

    let points = unit_sphere().test_collision(&sphere_pose, &plane, &Pose::IDENTITY);
    assert!(points.has_collision);
    assert_eq!(points.normal, Fp3::DOWN);
    assert_eq!(points.depth_squared, Fp::from_ratio(1, 4));
    assert_eq!(points.depth(), Fp::HALF);
    assert_eq!(points.a, Fp3::new(Fp::ZERO, -Fp::HALF, Fp::ZERO));
    assert_eq!(points.b, Fp3::ZERO);

    let mirrored = plane.test_collision(&Pose::IDENTITY, &unit_sphere(), &sphere_pose);
    assert_eq!(mirrored, points.flipped());
    assert_eq!(mirrored.normal, Fp3::UP);
}

#[test]
fn box_overlap_picks_shallowest_face() {
    let b = Pose::at(Fp3::new(Fp::from_ratio(3, 2), Fp::ZERO, Fp::ZERO));
    let points = unit_box().test_collision(&Pose::IDENTITY, &unit_box(), &b);
    assert!(points.has_collision);
    assert_eq!(points.normal, Fp3::UNIT_X);
    assert_eq!(points.depth_squared, Fp::from_ratio(1, 4));
    assert_eq!(points.depth(), Fp::HALF);
}

#[test]
fn box_depth_is_reported_squared_like_every_other_pair() {
    let b = Pose::at(Fp3::from_ints(1, 0, 0));
    let points = unit_box().test_collision(&Pose::IDENTITY, &unit_box(), &b);
    assert_eq!(points.depth(), Fp::ONE);
    assert_eq!(points.depth_squared, Fp::ONE);
    let far = Pose::at(Fp3::from_ints(0, 3, 0));
    assert!(!unit_box().test_collision(&Pose::IDENTITY, &unit_box(), &far).has_collision);
}

#[test]
fn sphere_centered_inside_box_exits_through_top() {
    let points = unit_sphere().test_collision(&Pose::IDENTITY, &unit_box(), &Pose::IDENTITY);
    assert!(points.has_collision);
    assert_eq!(points.normal, Fp3::DOWN);
    // (max.y - c.y) + r = 2
    assert_eq!(points.depth(), Fp::TWO);
    assert_eq!(points.b, Fp3::UNIT_Y);
}

#[test]
fn parallel_capsules_touch_along_their_sides() {
    let b = Pose::at(Fp3::new(Fp::from_ratio(3, 2), Fp::ZERO, Fp::ZERO));
    let points = tall_capsule().test_collision(&Pose::IDENTITY, &tall_capsule(), &b);
    assert!(points.has_collision);
    assert_eq!(points.normal, Fp3::UNIT_X);
    assert_eq!(points.depth(), Fp::HALF);
}

#[test]
fn sphere_against_capsule_tip() {
    // Inner segment spans y in [-1, 1]; the sphere sits just above the top cap.
    let sphere = Pose::at(Fp3::from_ints(0, 3, 0));
    let points = unit_sphere().test_collision(&sphere, &tall_capsule(), &Pose::IDENTITY);
    assert!(points.has_collision);
    assert_eq!(points.normal, Fp3::DOWN);
    assert_eq!(points.depth_squared, Fp::ZERO);

    let mirrored = tall_capsule().test_collision(&Pose::IDENTITY, &unit_sphere(), &sphere);
    assert_eq!(mirrored.normal, Fp3::UP);
}

#[test]
fn plane_against_non_sphere_shapes_reports_nothing() {
    let plane = Collider::plane(Fp3::UP, Fp::ZERO);
    for other in [unit_box(), tall_capsule()] {
        assert_eq!(
            plane.test_collision(&Pose::IDENTITY, &other, &Pose::IDENTITY),
            CollisionPoints::NONE
        );
        assert_eq!(
            other.test_collision(&Pose::IDENTITY, &plane, &Pose::IDENTITY),
            CollisionPoints::NONE
        );
    }
    assert_eq!(
        plane.test_collision(&Pose::IDENTITY, &plane, &Pose::IDENTITY),
        CollisionPoints::NONE
    );
}

#[test]
fn capsule_against_box_uses_proxy_extents() {
    // Proxy half extents are (r, h, r) = (1, 4, 1), so it spans y in [0, 8].
    let capsule = Pose::at(Fp3::from_ints(0, 4, 0));
    let points = tall_capsule().test_collision(&capsule, &unit_box(), &Pose::IDENTITY);
    assert!(points.has_collision);
    assert_eq!(points.normal, -Fp3::UNIT_Y);
    assert_eq!(points.depth_squared, Fp::ONE);
}
