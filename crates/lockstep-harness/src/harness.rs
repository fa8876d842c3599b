// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scenario runner, golden-hash recorder, and divergence drills.
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::iter;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use lockstep_phys::codec::WORLD_VERSION;
use lockstep_phys::PhysWorld;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Hash domain tag written into golden files.
pub const HASH_DOMAIN: &str = "LOCKSTEP_STATE_HASH_V1";

/// Hash algorithm written into golden files.
pub const HASH_ALG: &str = "BLAKE3";

/// Command-line interface of the `lockstep` binary.
#[derive(Parser, Debug)]
#[command(name = "lockstep")]
#[command(about = "Deterministic physics scenario harness")]
pub struct Cli {
    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// What to do.
    #[command(subcommand)]
    pub command: Commands,
}

/// Harness subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario and optionally check it against a golden file
    Run {
        /// Path to the scenario JSON
        scenario: PathBuf,
        /// Optional path to golden hashes JSON
        #[arg(long)]
        golden: Option<PathBuf>,
    },
    /// Run a scenario and write its golden hashes JSON
    Record {
        /// Path to the scenario JSON
        scenario: PathBuf,
        /// Path to the output hashes JSON
        #[arg(long)]
        out: PathBuf,
    },
    /// Run a scenario repeatedly to detect non-determinism
    Torture {
        /// Path to the scenario JSON
        scenario: PathBuf,
        /// Number of runs
        #[arg(long, default_value = "20")]
        runs: u32,
    },
    /// Encode and decode the world after every step and confirm the decoded
    /// copy continues identically
    Roundtrip {
        /// Path to the scenario JSON
        scenario: PathBuf,
    },
}

/// Golden hashes file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Golden {
    /// World encoding version the hashes were taken over.
    pub format_version: u16,
    /// Scenario name.
    pub scenario: String,
    /// Hash domain tag.
    pub hash_domain: String,
    /// Hash algorithm name.
    pub hash_alg: String,
    /// Hex state hash before the first step, then after every step.
    pub hashes_hex: Vec<String>,
}

impl Golden {
    fn new(scenario: &Scenario, hashes_hex: Vec<String>) -> Self {
        Self {
            format_version: WORLD_VERSION,
            scenario: scenario.name.clone(),
            hash_domain: HASH_DOMAIN.to_owned(),
            hash_alg: HASH_ALG.to_owned(),
            hashes_hex,
        }
    }

    /// Reads a golden file.
    pub fn load(path: &Path) -> Result<Self> {
        let f = File::open(path)
            .with_context(|| format!("failed to open golden file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("invalid golden file {}", path.display()))
    }

    /// Writes a golden file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let f = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(f, self).context("failed to write golden file")
    }
}

/// Hex BLAKE3 state hash of a world.
pub fn hash_hex(world: &PhysWorld) -> String {
    hex::encode(world.state_hash())
}

/// Lazily steps a fresh world built from `scenario`, yielding the initial
/// hash and then one hash per step.
pub fn state_hashes(scenario: &Scenario) -> Result<impl Iterator<Item = String>> {
    let mut world = scenario.build()?;
    let dt = scenario.dt();
    let initial = hash_hex(&world);
    let steps = (0..scenario.steps).map(move |_| {
        world.step(dt);
        hash_hex(&world)
    });
    Ok(iter::once(initial).chain(steps))
}

/// Runs a scenario and returns the initial hash followed by one hash per step.
pub fn run_scenario(scenario: &Scenario) -> Result<Vec<String>> {
    let hashes: Vec<String> = state_hashes(scenario)?.collect();
    debug!(name = %scenario.name, steps = scenario.steps, "scenario finished");
    Ok(hashes)
}

/// Compares a run against a golden file.
pub fn verify(scenario: &Scenario, hashes: &[String], expected: &Golden) -> Result<()> {
    if expected.format_version != WORLD_VERSION {
        bail!(
            "golden format version {} does not match world format {}",
            expected.format_version,
            WORLD_VERSION
        );
    }
    if expected.hash_alg != HASH_ALG || expected.hash_domain != HASH_DOMAIN {
        bail!(
            "golden hash scheme {}/{} is not {HASH_ALG}/{HASH_DOMAIN}",
            expected.hash_alg,
            expected.hash_domain
        );
    }
    if expected.scenario != scenario.name {
        warn!(
            golden = %expected.scenario,
            scenario = %scenario.name,
            "golden file was recorded for a differently named scenario"
        );
    }
    if let Some((step, (actual, expect))) = hashes
        .iter()
        .zip(&expected.hashes_hex)
        .enumerate()
        .find(|(_, (a, e))| a != e)
    {
        bail!("hash mismatch at step {step}.\nActual:   {actual}\nExpected: {expect}");
    }
    if hashes.len() != expected.hashes_hex.len() {
        bail!(
            "length mismatch. Run has {} hashes, golden has {}.",
            hashes.len(),
            expected.hashes_hex.len()
        );
    }
    Ok(())
}

/// Runs a scenario `runs` times and fails at the first run that differs from
/// the first.
pub fn torture(scenario: &Scenario, runs: u32) -> Result<()> {
    let baseline = run_scenario(scenario).context("run 1 (baseline) failed")?;
    for run in 2..=runs {
        let hashes = run_scenario(scenario).with_context(|| format!("run {run} failed"))?;
        if hashes != baseline {
            let detail = baseline
                .iter()
                .zip(&hashes)
                .enumerate()
                .find(|(_, (b, c))| b != c)
                .map_or_else(
                    || {
                        format!(
                            "length mismatch: baseline {}, current {}",
                            baseline.len(),
                            hashes.len()
                        )
                    },
                    |(step, (b, c))| format!("step {step}.\nBaseline: {b}\nCurrent:  {c}"),
                );
            bail!("divergence detected in run {run} at {detail}");
        }
        if run % 10 == 0 {
            info!(run, runs, "runs clean");
        }
    }
    Ok(())
}

/// Steps a live world and a twin that is rebuilt from its own encoding after
/// every step; both must stay byte-identical.
pub fn roundtrip(scenario: &Scenario) -> Result<()> {
    let dt = scenario.dt();
    let mut live = scenario.build()?;
    let mut twin = PhysWorld::from_bytes(&live.to_bytes()).context("initial world failed to decode")?;
    for step in 0..scenario.steps {
        live.step(dt);
        twin.step(dt);
        let bytes = twin.to_bytes();
        twin = PhysWorld::from_bytes(&bytes)
            .with_context(|| format!("decode failed after step {step}"))?;
        if twin.to_bytes() != bytes {
            bail!("re-encoding after step {step} changed the bytes");
        }
        if twin.state_hash() != live.state_hash() {
            bail!(
                "decoded twin diverged at step {step}.\nLive: {}\nTwin: {}",
                hash_hex(&live),
                hash_hex(&twin)
            );
        }
    }
    Ok(())
}

/// Executes a parsed command, writing the human-readable report to `out`.
pub fn execute(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Run { scenario, golden } => {
            let spec = Scenario::load(&scenario)?;
            let hashes = run_scenario(&spec)?;
            if let Some(golden_path) = golden {
                let expected = Golden::load(&golden_path)?;
                verify(&spec, &hashes, &expected)?;
                writeln!(out, "lockstep: OK. {} hashes verified.", hashes.len())?;
            } else {
                writeln!(
                    out,
                    "lockstep: run complete. {} steps, final hash {}",
                    spec.steps,
                    hashes.last().map_or("", String::as_str)
                )?;
            }
        }
        Commands::Record { scenario, out: out_path } => {
            let spec = Scenario::load(&scenario)?;
            let golden = Golden::new(&spec, run_scenario(&spec)?);
            golden.save(&out_path)?;
            writeln!(
                out,
                "lockstep: recorded {} hashes to {}",
                golden.hashes_hex.len(),
                out_path.display()
            )?;
        }
        Commands::Torture { scenario, runs } => {
            let spec = Scenario::load(&scenario)?;
            info!(runs, scenario = %scenario.display(), "torture starting");
            torture(&spec, runs)?;
            writeln!(out, "lockstep: torture complete. {runs} runs identical.")?;
        }
        Commands::Roundtrip { scenario } => {
            let spec = Scenario::load(&scenario)?;
            roundtrip(&spec)?;
            writeln!(
                out,
                "lockstep: roundtrip OK. {} steps decoded and resumed.",
                spec.steps
            )?;
        }
    }
    Ok(())
}

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("failed to install tracing subscriber")
}

/// Binary entry point.
pub fn entrypoint() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, &mut out)
}
