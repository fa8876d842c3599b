// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! lockstep-phys: deterministic collision detection and resolution.
//!
//! A [`PhysWorld`] owns an insertion-ordered list of [`PhysObject`]s. Each
//! fixed [`PhysWorld::step`] enumerates candidate pairs, filters them through
//! the [`CollisionMatrix`], runs the narrow phase, resolves contacts with the
//! configured [`Solver`]s, fires collision callbacks, and integrates motion.
//! All arithmetic goes through `lockstep_math`, so two peers that start from
//! the same bytes and apply the same steps stay bit-identical.
//!
//! Contact convention: [`CollisionPoints::normal`] points from the first
//! shape toward the second, and `depth_squared` holds the squared
//! penetration depth for every shape pair.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::similar_names
)]

mod broad;
pub mod checksum;
pub mod codec;
mod collider;
mod error;
mod ident;
mod layer;
pub mod narrow;
mod object;
mod points;
pub mod query;
pub mod sandbox;
mod solver;
mod transform;
mod world;

/// Broad-phase interface, its brute-force implementation, and its input.
pub use broad::{BroadPhase, BruteForcePairs, Proxy};
/// Local collider shapes.
pub use collider::{Aabb, Capsule, Collider, Plane, Shape, Sphere};
/// Shapes resolved into world space.
pub use collider::{WorldAabb, WorldCapsule, WorldPlane, WorldShape, WorldSphere};
/// Error types for world mutation, decoding, and layer parsing.
pub use error::{CodecError, ParseLayerError, WorldError};
/// Identifier shared by an object and its transform.
pub use ident::InstanceId;
/// Layers, layer masks, and the pair filter.
pub use layer::{CollisionMatrix, Layer, LayerMask};
/// Simulated bodies and their collision callback type.
pub use object::{CollisionCallback, PhysObject};
/// Contact records.
pub use points::{Collision, CollisionPoints};
/// Ray queries.
pub use query::{Ray, RayHit};
/// Contact resolution strategies.
pub use solver::Solver;
/// Local transforms, world poses, and hierarchy lookup.
pub use transform::{NoParents, Pose, Transform, TransformArena, TransformLookup};
/// The simulation world and its configuration.
pub use world::{ObjectContact, ObjectHit, PhysWorld, WorldConfig};
