// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use lockstep_math::{Fp, Fp3};
use lockstep_phys::sandbox::{run_pair_determinism, SandboxConfig};
use lockstep_phys::{Layer, PhysWorld};

fn pile(spheres: &[(i64, i64, i64)]) -> PhysWorld {
    let mut w = PhysWorld::new();
    w.create_plane_object(Fp3::ZERO, Fp3::UP, Layer::Environment).unwrap();
    for &(x, y, z) in spheres {
        let center = Fp3::new(
            Fp::from_ratio(x, 100),
            Fp::from_ratio(y, 100),
            Fp::from_ratio(z, 100),
        );
        w.create_sphere_object(center, Fp::HALF, Layer::Default).unwrap();
    }
    w.create_aabb_object(Fp3::from_ints(0, 1, 0), Fp3::ONE, Layer::Default).unwrap();
    w
}

#[test]
fn twin_worlds_stay_in_lockstep() {
    let layout = [(0, 150, 0), (40, 260, -10), (-30, 380, 20), (5, 500, 5)];
    let a = SandboxConfig::new("a", move || pile(&layout));
    let b = SandboxConfig::new("b", move || pile(&layout));
    run_pair_determinism(&a, &b, 240, |step, w| {
        if step % 30 == 0 {
            if let Some(id) = w.objects().get(1).map(lockstep_phys::PhysObject::id) {
                if let Some(o) = w.object_mut(id) {
                    o.apply_force(Fp3::from_ints(3, 0, 1));
                }
            }
        }
        w.step(Fp::from_ratio(1, 60));
    })
    .unwrap();
}

#[test]
fn diverging_inputs_are_reported_with_the_step() {
    let a = SandboxConfig::new("a", || pile(&[(0, 150, 0)]));
    let b = SandboxConfig::new("b", || pile(&[(0, 150, 0)]));
    let mut calls = 0_usize;
    let err = run_pair_determinism(&a, &b, 10, |step, w| {
        calls += 1;
        // Every second call drives world b; nudge it once.
        if step == 3 && calls % 2 == 0 {
            w.object_mut(lockstep_phys::InstanceId(2))
                .unwrap()
                .apply_force(Fp3::UNIT_X);
        }
        w.step(Fp::from_ratio(1, 60));
    })
    .unwrap_err();
    let lockstep_phys::sandbox::DeterminismError::StateMismatch { step, .. } = err;
    assert_eq!(step, 3);
}

#[test]
fn proptest_seed_pinned_replay_matches() {
    const SEED_BYTES: [u8; 32] = [
        0x50, 0x48, 0x59, 0x53, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0,
    ];
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(
        PropConfig {
            cases: 24,
            ..PropConfig::default()
        },
        rng,
    );

    let centi = -300_i64..=300;
    let height = 60_i64..=600;
    let sphere = (centi.clone(), height, centi);
    runner
        .run(&prop::collection::vec(sphere, 1..6), |layout| {
            let mut first = pile(&layout);
            let mut second = pile(&layout);
            for _ in 0..40 {
                first.step(Fp::from_ratio(1, 60));
            }
            // Snapshot midway and continue from the decoded copy.
            for _ in 0..20 {
                second.step(Fp::from_ratio(1, 60));
            }
            let mut resumed = PhysWorld::from_bytes(&second.to_bytes()).unwrap();
            for _ in 0..20 {
                resumed.step(Fp::from_ratio(1, 60));
            }
            prop_assert_eq!(first.state_hash(), resumed.state_hash());
            Ok(())
        })
        .expect("replay from a snapshot matches the uninterrupted run");
}
