// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! CLI entry point for the lockstep harness.

use anyhow::Result;
use lockstep_harness::harness::entrypoint;

fn main() -> Result<()> {
    entrypoint()
}
