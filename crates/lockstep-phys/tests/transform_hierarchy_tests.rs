// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use lockstep_math::{Fp, Fp3, Fpq};
use lockstep_phys::{
    Collider, Collision, InstanceId, Layer, NoParents, PhysWorld, Pose, Transform, TransformArena,
    WorldError,
};

fn close(a: Fp3, b: Fp3, tol: f64) -> bool {
    let d = a - b;
    d.x.abs().to_f64() <= tol && d.y.abs().to_f64() <= tol && d.z.abs().to_f64() <= tol
}

#[test]
fn root_world_values_equal_local_values() {
    let t = Transform::new(InstanceId(1))
        .with_position(Fp3::from_ints(1, 2, 3))
        .with_scale(Fp3::from_ints(2, 2, 2));
    assert_eq!(t.world_position(&NoParents), Fp3::from_ints(1, 2, 3));
    assert_eq!(t.world_rotation(&NoParents), Fpq::IDENTITY);
    assert_eq!(t.world_scale(&NoParents), Fp3::from_ints(2, 2, 2));
}

#[test]
fn child_composes_through_rotated_parent() {
    let mut arena = TransformArena::new();
    let parent = Transform::new(InstanceId(1))
        .with_position(Fp3::from_ints(10, 0, 0))
        .with_rotation(Fpq::from_axis_angle(Fp3::UNIT_Y, Fp::HALF_PI))
        .with_scale(Fp3::from_ints(2, 3, 4));
    let child = Transform::new(InstanceId(2)).with_position(Fp3::from_ints(1, 0, 0));
    arena.insert(parent).unwrap();
    arena.insert(child).unwrap();
    arena.set_parent(InstanceId(2), Some(InstanceId(1))).unwrap();

    let pose = arena.world_pose(InstanceId(2)).unwrap();
    // +X rotated a quarter turn about +Y lands on -Z.
    assert!(close(pose.position, Fp3::from_ints(10, 0, -1), 1e-6));
    assert_eq!(pose.scale, Fp3::from_ints(2, 3, 4));
}

/// Adds two colliding objects under a parent placed at `offset` and returns
/// the contacts of one zero-length step.
fn contacts_under_parent(
    offset: Fp3,
    add_pair: impl Fn(&mut PhysWorld) -> (InstanceId, InstanceId),
) -> Vec<Collision> {
    let mut w = PhysWorld::new();
    let parent = w.new_object().unwrap().with_position(offset);
    let parent_id = w.add_object(parent).unwrap();
    let (a, b) = add_pair(&mut w);
    w.set_parent(a, Some(parent_id)).unwrap();
    w.set_parent(b, Some(parent_id)).unwrap();
    w.step(Fp::ZERO);
    w.collisions().to_vec()
}

fn assert_translation_invariant(add_pair: impl Fn(&mut PhysWorld) -> (InstanceId, InstanceId)) {
    let offset = Fp3::from_ints(100, -50, 7);
    let home = contacts_under_parent(Fp3::ZERO, &add_pair);
    let moved = contacts_under_parent(offset, &add_pair);
    assert_eq!(home.len(), 1);
    assert_eq!(moved.len(), 1);
    let (h, m) = (home[0].points, moved[0].points);
    assert!(h.has_collision);
    assert_eq!(h.normal, m.normal);
    assert_eq!(h.depth_squared, m.depth_squared);
    assert_eq!(m.a - h.a, offset);
    assert_eq!(m.b - h.b, offset);
}

#[test]
fn box_box_contact_is_invariant_under_parent_translation() {
    assert_translation_invariant(|w| {
        let a = w.create_aabb_object(Fp3::ZERO, Fp3::ONE, Layer::Default).unwrap();
        let b = w.create_aabb_object(
            Fp3::new(Fp::from_ratio(3, 2), Fp::ZERO, Fp::ZERO),
            Fp3::ONE,
            Layer::Default,
        ).unwrap();
        (a, b)
    });
}

#[test]
fn sphere_box_contact_is_invariant_under_parent_translation() {
    assert_translation_invariant(|w| {
        let a = w.create_sphere_object(Fp3::ZERO, Fp::ONE, Layer::Default).unwrap();
        let b = w.create_aabb_object(
            Fp3::new(Fp::from_ratio(3, 2), Fp::ZERO, Fp::ZERO),
            Fp3::ONE,
            Layer::Default,
        ).unwrap();
        (a, b)
    });
}

#[test]
fn capsule_box_contact_is_invariant_under_parent_translation() {
    assert_translation_invariant(|w| {
        let a = w.create_capsule_object(
            Fp3::ZERO,
            Fp::HALF,
            Fp::from_int(2),
            Fp3::UNIT_Y,
            Layer::Default,
        ).unwrap();
        let b = w.create_aabb_object(Fp3::UNIT_X, Fp3::ONE, Layer::Default).unwrap();
        (a, b)
    });
}

#[test]
fn parent_cycles_are_rejected() {
    let mut arena = TransformArena::new();
    for id in 1..=3 {
        arena.insert(Transform::new(InstanceId(id))).unwrap();
    }
    arena.set_parent(InstanceId(2), Some(InstanceId(1))).unwrap();
    arena.set_parent(InstanceId(3), Some(InstanceId(2))).unwrap();

    assert_eq!(
        arena.set_parent(InstanceId(1), Some(InstanceId(3))),
        Err(WorldError::ParentCycle {
            child: InstanceId(1),
            parent: InstanceId(3)
        })
    );
    assert_eq!(
        arena.set_parent(InstanceId(1), Some(InstanceId(1))),
        Err(WorldError::ParentCycle {
            child: InstanceId(1),
            parent: InstanceId(1)
        })
    );
    assert_eq!(
        arena.set_parent(InstanceId(1), Some(InstanceId(9))),
        Err(WorldError::UnknownInstance(InstanceId(9)))
    );
}

#[test]
fn removing_a_parent_keeps_child_local_values() {
    let mut arena = TransformArena::new();
    arena
        .insert(Transform::new(InstanceId(1)).with_position(Fp3::from_ints(5, 0, 0)))
        .unwrap();
    arena
        .insert(Transform::new(InstanceId(2)).with_position(Fp3::from_ints(1, 0, 0)))
        .unwrap();
    arena.set_parent(InstanceId(2), Some(InstanceId(1))).unwrap();
    assert_eq!(arena.world_pose(InstanceId(2)).unwrap().position, Fp3::from_ints(6, 0, 0));

    arena.remove(InstanceId(1));
    assert_eq!(arena.world_pose(InstanceId(2)).unwrap().position, Fp3::from_ints(1, 0, 0));
}

#[test]
fn scaled_parent_grows_child_sphere() {
    let mut w = PhysWorld::new();
    let parent = w.new_object().unwrap().with_flags(false, false);
    let parent_id = w.add_object(parent).unwrap();
    if let Some(p) = w.object_mut(parent_id) {
        p.transform.set_scale(Fp3::from_ints(3, 1, 1));
    }
    let child = w.create_sphere_object(Fp3::ZERO, Fp::ONE, Layer::Default).unwrap();
    w.set_parent(child, Some(parent_id)).unwrap();

    let pose = w.world_pose(child).unwrap();
    let collider = w.object(child).unwrap().collider.unwrap_or_default();
    let probe = Collider::sphere(Fp3::ZERO, Fp::ONE);
    // Radius 3 reaches a unit probe centered at x = 4.
    let hit = collider.test_collision(&pose, &probe, &Pose::at(Fp3::from_ints(4, 0, 0)));
    assert!(hit.has_collision);
}
