// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use lockstep_math::{Fp, Fp3, Fpq};
use lockstep_phys::codec::{from_bytes, to_bytes};
use lockstep_phys::{
    CodecError, Collider, InstanceId, Layer, PhysObject, PhysWorld, Solver, Transform,
};

/// Byte offset of the id counter: magic, version, then seven config fields.
const NEXT_ID_OFFSET: usize = 4 + 2 + 3 * 8 + 6 * 8;

fn sample_world() -> PhysWorld {
    let mut w = PhysWorld::new();
    w.create_plane_object(Fp3::ZERO, Fp3::UP, Layer::Environment).unwrap();
    let ball = w.create_sphere_object(Fp3::from_ints(0, 3, 0), Fp::HALF, Layer::Player).unwrap();
    let crate_id = w.create_aabb_object(Fp3::from_ints(2, 1, 0), Fp3::ONE, Layer::Default).unwrap();
    w.create_capsule_object(
        Fp3::from_ints(-2, 2, 0),
        Fp::HALF,
        Fp::from_int(2),
        Fp3::UNIT_Y,
        Layer::Enemy,
    ).unwrap();
    w.set_parent(ball, Some(crate_id)).unwrap();
    w.matrix_mut()
        .set_layer_collisions(Layer::Player, Layer::Enemy, false);
    for _ in 0..5 {
        w.step(Fp::from_ratio(1, 60));
    }
    w
}

#[test]
fn world_round_trip_is_byte_exact() {
    let w = sample_world();
    let bytes = w.to_bytes();
    let back = PhysWorld::from_bytes(&bytes).unwrap();
    assert_eq!(back.to_bytes(), bytes);
    assert_eq!(back.checksum(), w.checksum());
    assert_eq!(back.state_hash(), w.state_hash());
    assert_eq!(back.matrix(), w.matrix());
    assert_eq!(back.solvers(), w.solvers());
    assert_eq!(back.collisions(), w.collisions());
    assert_eq!(back.peek_next_id(), w.peek_next_id());
    for (a, b) in w.objects().iter().zip(back.objects()) {
        assert_eq!(a.id(), b.id());
        assert_eq!(a.transform, b.transform);
        assert_eq!(a.collider, b.collider);
        assert_eq!(a.checksum(), b.checksum());
    }
}

#[test]
fn decoded_world_resumes_identically() {
    let mut live = sample_world();
    let mut restored = PhysWorld::from_bytes(&live.to_bytes()).unwrap();
    for _ in 0..30 {
        live.step(Fp::from_ratio(1, 60));
        restored.step(Fp::from_ratio(1, 60));
    }
    assert_eq!(live.state_hash(), restored.state_hash());
}

#[test]
fn any_state_change_moves_the_checksum() {
    let mut w = sample_world();
    let before = w.checksum();
    let id = w.objects()[1].id();
    let o = w.object_mut(id).unwrap();
    o.velocity += Fp3::new(Fp::EPSILON, Fp::ZERO, Fp::ZERO);
    assert_ne!(w.checksum(), before);
}

#[test]
fn transform_checksum_is_cached_until_mutation() {
    let mut t = Transform::new(InstanceId(4))
        .with_rotation(Fpq::from_axis_angle(Fp3::UNIT_Z, Fp::ONE));
    let first = t.checksum();
    assert_eq!(t.checksum(), first);
    t.translate(Fp3::UNIT_X);
    assert_ne!(t.checksum(), first);
}

#[test]
fn object_encoding_skips_callbacks() {
    let w = PhysWorld::new();
    let mut plain = PhysObject::new(InstanceId(9), w.config());
    let before = plain.checksum();
    plain.set_on_collision(|_, _| {});
    assert_eq!(plain.checksum(), before);
    let back: PhysObject = from_bytes(&to_bytes(&plain)).unwrap();
    assert!(!back.has_on_collision());
    assert_eq!(back.checksum(), before);
}

#[test]
fn header_is_checked() {
    let mut bytes = sample_world().to_bytes().to_vec();
    bytes[0] = b'X';
    assert_eq!(
        PhysWorld::from_bytes(&bytes).unwrap_err(),
        CodecError::BadMagic(*b"XKST")
    );

    let mut bytes = sample_world().to_bytes().to_vec();
    bytes[4] = 2;
    assert_eq!(
        PhysWorld::from_bytes(&bytes).unwrap_err(),
        CodecError::UnsupportedVersion(2)
    );
}

#[test]
fn truncation_and_trailing_garbage_are_rejected() {
    let bytes = sample_world().to_bytes().to_vec();
    for cut in [0, 3, 40, bytes.len() - 1] {
        assert!(matches!(
            PhysWorld::from_bytes(&bytes[..cut]),
            Err(CodecError::UnexpectedEof { .. })
        ));
    }
    let mut padded = bytes;
    padded.push(0);
    assert_eq!(
        PhysWorld::from_bytes(&padded).unwrap_err(),
        CodecError::TrailingBytes(1)
    );
}

#[test]
fn oversized_object_count_fails_cleanly() {
    // An empty world ends with the object count and the collision count.
    let mut bytes = PhysWorld::new().to_bytes().to_vec();
    let objects_at = bytes.len() - 8;
    bytes[objects_at..objects_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
    assert_eq!(
        PhysWorld::from_bytes(&bytes).unwrap_err(),
        CodecError::UnexpectedEof {
            needed: 8,
            remaining: 4
        }
    );
}

#[test]
fn stale_id_counter_is_rejected() {
    let w = sample_world();
    let mut bytes = w.to_bytes().to_vec();
    let max = w.objects().iter().map(|o| o.id().get()).max().unwrap();
    bytes[NEXT_ID_OFFSET..NEXT_ID_OFFSET + 8].copy_from_slice(&max.to_le_bytes());
    assert_eq!(
        PhysWorld::from_bytes(&bytes).unwrap_err(),
        CodecError::StaleIdCounter { next: max, max }
    );
}

#[test]
fn unknown_collider_tag_decodes_as_default_sphere() {
    let bytes = [7_u8, Layer::Player as u8, 2, 0, 0, 0, 0xde, 0xad];
    let collider: Collider = from_bytes(&bytes).unwrap();
    assert_eq!(collider, Collider::default().with_layer(Layer::Player));
}

#[test]
fn bad_enum_bytes_are_rejected() {
    assert_eq!(
        from_bytes::<Collider>(&[1, 99, 0, 0, 0, 0]).unwrap_err(),
        CodecError::InvalidLayer(99)
    );
    assert_eq!(
        from_bytes::<Solver>(&[5]).unwrap_err(),
        CodecError::InvalidSolver(5)
    );
}

#[test]
fn solver_parameters_survive() {
    let s = Solver::SmoothPosition {
        percent: Fp::from_ratio(2, 3),
        slop: Fp::from_ratio(1, 1000),
    };
    assert_eq!(from_bytes::<Solver>(&to_bytes(&s)).unwrap(), s);
}
