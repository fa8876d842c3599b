// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Lightweight sandbox utilities for spinning up isolated worlds with
//! configurable seeds, for determinism tests and A/B comparisons.

use std::sync::Arc;

use crate::world::PhysWorld;

/// Describes how to construct an isolated [`PhysWorld`].
///
/// The seed is a factory so each instance receives fresh state without
/// sharing anything with its twin.
#[derive(Clone)]
pub struct SandboxConfig {
    /// Human label for reports.
    pub label: String,
    /// Factory producing a freshly populated world.
    pub seed: Arc<dyn Fn() -> PhysWorld + Send + Sync>,
}

impl SandboxConfig {
    /// Convenience constructor.
    pub fn new<F>(label: impl Into<String>, seed: F) -> Self
    where
        F: Fn() -> PhysWorld + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            seed: Arc::new(seed),
        }
    }
}

impl core::fmt::Debug for SandboxConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SandboxConfig")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Determinism check failure.
#[derive(Debug, thiserror::Error)]
pub enum DeterminismError {
    /// State hashes diverged at a given step between two worlds.
    #[error("determinism mismatch at step {step}: {label_a}={hash_a:?} vs {label_b}={hash_b:?}")]
    StateMismatch {
        /// Step index where divergence was detected.
        step: usize,
        /// Label of the first world.
        label_a: String,
        /// Label of the second world.
        label_b: String,
        /// State hash of the first world.
        hash_a: [u8; 32],
        /// State hash of the second world.
        hash_b: [u8; 32],
    },
}

/// Builds a fresh world from a [`SandboxConfig`].
pub fn build_world(cfg: &SandboxConfig) -> PhysWorld {
    (cfg.seed)()
}

/// Runs two worlds through the same step function and compares state hashes
/// after every step.
///
/// Runs on the calling thread. The step function is responsible for calling
/// [`PhysWorld::step`] and for any per-step input.
///
/// # Errors
/// Returns [`DeterminismError::StateMismatch`] at the first step where the
/// two worlds encode differently.
pub fn run_pair_determinism<F>(
    cfg_a: &SandboxConfig,
    cfg_b: &SandboxConfig,
    steps: usize,
    mut step_fn: F,
) -> Result<(), DeterminismError>
where
    F: FnMut(usize, &mut PhysWorld),
{
    let mut a = build_world(cfg_a);
    let mut b = build_world(cfg_b);

    for step in 0..steps {
        step_fn(step, &mut a);
        let hash_a = a.state_hash();

        step_fn(step, &mut b);
        let hash_b = b.state_hash();

        if hash_a != hash_b {
            return Err(DeterminismError::StateMismatch {
                step,
                label_a: cfg_a.label.clone(),
                label_b: cfg_b.label.clone(),
                hash_a,
                hash_b,
            });
        }
    }
    Ok(())
}
