// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Contact solvers.
//!
//! Solvers run in registration order over the current step's collision list
//! and keep no state between steps. Contact normals point from `a` to `b`
//! (see [`crate::CollisionPoints`]).
use lockstep_math::{Fp, Fp2, Fp3};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ident::InstanceId;
use crate::object::PhysObject;
use crate::points::Collision;

/// A registered contact solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    /// Velocity-level impulse response with restitution and friction.
    Impulse,
    /// Position-level correction of residual penetration.
    SmoothPosition {
        /// Fraction of the penetration removed per step.
        percent: Fp,
        /// Penetration tolerated without correction.
        slop: Fp,
    },
}

impl Solver {
    /// Applies this solver to every collision.
    pub fn solve(
        &self,
        objects: &mut [PhysObject],
        index: &FxHashMap<InstanceId, usize>,
        collisions: &[Collision],
    ) {
        match *self {
            Self::Impulse => solve_impulses(objects, index, collisions),
            Self::SmoothPosition { percent, slop } => {
                correct_positions(objects, index, collisions, percent, slop);
            }
        }
    }
}

fn pair_indices(
    index: &FxHashMap<InstanceId, usize>,
    collision: &Collision,
) -> Option<(usize, usize)> {
    Some((*index.get(&collision.a)?, *index.get(&collision.b)?))
}

/// Restitution contributed by one side: its own coefficient when dynamic,
/// `1` for immovable bodies.
fn restitution_of(o: &PhysObject) -> Fp {
    if o.is_dynamic {
        o.restitution
    } else {
        Fp::ONE
    }
}

fn solve_impulses(
    objects: &mut [PhysObject],
    index: &FxHashMap<InstanceId, usize>,
    collisions: &[Collision],
) {
    for collision in collisions {
        let Some((ia, ib)) = pair_indices(index, collision) else {
            continue;
        };
        let (a, b) = (&objects[ia], &objects[ib]);
        let inv_a = a.effective_inv_mass();
        let inv_b = b.effective_inv_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum.is_zero() {
            continue;
        }
        let n = collision.points.normal;

        let rel = b.velocity - a.velocity;
        let normal_speed = rel.dot(n);
        if normal_speed >= Fp::ZERO {
            continue;
        }

        let e = restitution_of(a) * restitution_of(b);
        let j = -(Fp::ONE + e) * normal_speed / inv_sum;
        let impulse = n * j;
        let mut vel_a = a.velocity;
        let mut vel_b = b.velocity;
        if a.responds_to_contacts() {
            vel_a -= impulse * inv_a;
        }
        if b.responds_to_contacts() {
            vel_b += impulse * inv_b;
        }

        // Friction along the tangential part of the post-impulse velocity.
        let rel = vel_b - vel_a;
        let tangent = (rel - n * rel.dot(n)).normalize();
        let f = -rel.dot(tangent) / inv_sum;
        let mu_static = Fp2::new(a.static_friction, b.static_friction).length();
        let friction = if f.abs() < j * mu_static {
            tangent * f
        } else {
            let mu_dynamic = Fp2::new(a.dynamic_friction, b.dynamic_friction).length();
            tangent * (-j * mu_dynamic)
        };
        if a.responds_to_contacts() {
            vel_a -= friction * inv_a;
        }
        if b.responds_to_contacts() {
            vel_b += friction * inv_b;
        }

        trace!(a = %collision.a, b = %collision.b, j = %j, "impulse");
        objects[ia].velocity = vel_a;
        objects[ib].velocity = vel_b;
    }
}

fn correct_positions(
    objects: &mut [PhysObject],
    index: &FxHashMap<InstanceId, usize>,
    collisions: &[Collision],
    percent: Fp,
    slop: Fp,
) {
    // Corrections are gathered first so every contact sees the same
    // positions, then applied in one pass.
    let mut deltas = vec![Fp3::ZERO; objects.len()];
    for collision in collisions {
        let Some((ia, ib)) = pair_indices(index, collision) else {
            continue;
        };
        let (a, b) = (&objects[ia], &objects[ib]);
        let inv_a = a.effective_inv_mass();
        let inv_b = b.effective_inv_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum.is_zero() {
            continue;
        }
        let excess = (collision.points.depth() - slop).max(Fp::ZERO);
        let correction = collision.points.normal * (percent * excess / inv_sum);
        if a.responds_to_contacts() {
            deltas[ia] -= correction * inv_a;
        }
        if b.responds_to_contacts() {
            deltas[ib] += correction * inv_b;
        }
    }
    for (object, delta) in objects.iter_mut().zip(deltas) {
        if delta != Fp3::ZERO {
            object.transform.translate(delta);
        }
    }
}
