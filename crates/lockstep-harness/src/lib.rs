// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Lockstep determinism harness.
//!
//! Loads JSON scenarios, steps them through `lockstep-phys`, and records or
//! verifies the per-step BLAKE3 state hashes so that any drift between runs,
//! builds, or machines shows up as a hash mismatch at a specific step.

pub mod harness;
pub mod scenario;
