// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! End-to-end tests for the `lockstep` command surface.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use lockstep_harness::harness::{execute, run_scenario, state_hashes, Cli, Golden, HASH_ALG};
use lockstep_harness::scenario::Scenario;

fn sample_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/falling_pile.json")
}

fn run_cli(args: &[&str]) -> Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("lockstep").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    execute(cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn sample_scenario_loads_and_runs() {
    let scenario = Scenario::load(&sample_path()).unwrap();
    assert_eq!(scenario.name, "falling_pile");
    let hashes = run_scenario(&scenario).unwrap();
    assert_eq!(hashes.len(), scenario.steps as usize + 1);
    assert!(hashes.iter().all(|h| h.len() == 64));
    assert_ne!(hashes.first(), hashes.last());
}

#[test]
fn record_then_verify_against_golden() {
    let dir = tempfile::tempdir().unwrap();
    let golden = dir.path().join("falling_pile.hashes.json");
    let scenario = sample_path();
    let scenario = scenario.to_str().unwrap();
    let golden_arg = golden.to_str().unwrap();

    let recorded = run_cli(&["record", scenario, "--out", golden_arg]).unwrap();
    assert!(recorded.contains("recorded 181 hashes"));

    let saved = Golden::load(&golden).unwrap();
    assert_eq!(saved.hash_alg, HASH_ALG);
    assert_eq!(saved.scenario, "falling_pile");

    let verified = run_cli(&["run", scenario, "--golden", golden_arg]).unwrap();
    assert!(verified.contains("OK"));
}

#[test]
fn tampered_golden_reports_the_step() {
    let dir = tempfile::tempdir().unwrap();
    let golden = dir.path().join("g.json");
    let scenario = sample_path();
    let scenario = scenario.to_str().unwrap();
    let golden_arg = golden.to_str().unwrap();
    run_cli(&["record", scenario, "--out", golden_arg]).unwrap();

    let mut saved = Golden::load(&golden).unwrap();
    saved.hashes_hex[7] = "00".repeat(32);
    saved.save(&golden).unwrap();

    let err = run_cli(&["run", scenario, "--golden", golden_arg]).unwrap_err();
    assert!(err.to_string().contains("step 7"), "{err}");
}

#[test]
fn truncated_golden_is_a_length_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let golden = dir.path().join("g.json");
    let scenario = sample_path();
    let scenario = scenario.to_str().unwrap();
    let golden_arg = golden.to_str().unwrap();
    run_cli(&["record", scenario, "--out", golden_arg]).unwrap();

    let mut saved = Golden::load(&golden).unwrap();
    saved.hashes_hex.truncate(10);
    saved.save(&golden).unwrap();

    let err = run_cli(&["run", scenario, "--golden", golden_arg]).unwrap_err();
    assert!(err.to_string().contains("length mismatch"), "{err}");
}

#[test]
fn torture_runs_stay_identical() {
    let scenario = sample_path();
    let out = run_cli(&["torture", scenario.to_str().unwrap(), "--runs", "3"]).unwrap();
    assert!(out.contains("3 runs identical"));
}

#[test]
fn roundtrip_resumes_every_step() {
    let scenario = sample_path();
    let out = run_cli(&["roundtrip", scenario.to_str().unwrap()]).unwrap();
    assert!(out.contains("roundtrip OK"));
}

#[test]
fn malformed_scenario_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"{ "name": "bad", "steps": 1, "objects": [], "extra": 1 }"#).unwrap();
    let err = run_cli(&["run", path.to_str().unwrap()]).unwrap_err();
    assert!(format!("{err:#}").contains("invalid scenario JSON"), "{err:#}");
}

#[test]
fn long_scenarios_hash_lazily() {
    let mut scenario = Scenario::load(&sample_path()).unwrap();
    scenario.steps = u32::MAX;
    let first: Vec<String> = state_hashes(&scenario).unwrap().take(3).collect();
    scenario.steps = 2;
    assert_eq!(first, run_scenario(&scenario).unwrap());
}
