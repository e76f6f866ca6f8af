/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use mcp_anneal::analysis::feasibility::LoadClass;
use mcp_anneal::config::{AnnealSection, SystemConfig};
use mcp_anneal::export;
use mcp_anneal::optimizer::{AnnealParams, Optimizer};
use mcp_anneal::platform::Mcp;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Place periodic real-time tasks on multi-core platforms by simulated
/// annealing.
///
/// Example:
///   mcp-anneal system.yaml result.yaml --max-steps 1000000 --seed 42
#[derive(Debug, Parser)]
#[command(
    name = "mcp-anneal",
    about = "Laxity-driven task placement across multi-core platforms",
    long_about = None,
)]
struct Cli {
    /// YAML system description (platforms, cores, tasks).
    input: PathBuf,

    /// Where to write the resulting assignment.
    output: PathBuf,

    /// Initial temperature [default: 35].
    #[arg(long = "t0")]
    t0: Option<f64>,

    /// Fraction of max-steps spent at the initial temperature [default: 0.001].
    #[arg(long = "beta0")]
    beta0: Option<f64>,

    /// Total step budget [default: 30000000].
    #[arg(short = 'n', long = "max-steps")]
    max_steps: Option<u64>,

    /// Growth of the per-temperature step budget [default: 1.1].
    #[arg(long = "beta")]
    beta: Option<f64>,

    /// Cooling factor applied after every temperature tier [default: 0.9].
    #[arg(long = "alpha")]
    alpha: Option<f64>,

    /// Seed for the random generator; a fresh one is drawn when absent.
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,
}

impl Cli {
    fn overrides(&self) -> AnnealSection {
        AnnealSection {
            t0: self.t0,
            beta0: self.beta0,
            max_steps: self.max_steps,
            beta: self.beta,
            alpha: self.alpha,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!(
        input  = %cli.input.display(),
        output = %cli.output.display(),
        seed   = ?cli.seed,
        "Configuration"
    );

    // ── Load ──────────────────────────────────────────────────────────────────
    let system = SystemConfig::load_from_file(&cli.input)?;

    // CLI flag > file section > built-in default
    let params: AnnealParams = cli
        .overrides()
        .apply_to(system.annealing.apply_to(AnnealParams::default()));
    params.validate().context("Invalid annealing parameters")?;

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed = seed, "random generator seeded");

    // ── Initial assignment + baseline ─────────────────────────────────────────
    let mut optimizer = Optimizer::new(
        system.platforms,
        system.tasks,
        StdRng::seed_from_u64(seed),
    )
    .context("Cannot build optimizer from system description")?;

    let initial = optimizer.summary();
    info!(
        cost = initial.cost,
        total_laxity = initial.total_laxity,
        unschedulable = initial.unschedulable,
        "initial assignment"
    );

    // ── Anneal ────────────────────────────────────────────────────────────────
    let started = Instant::now();
    let outcome = optimizer.anneal(&params).context("Annealing aborted")?;
    let elapsed = started.elapsed();

    // ── Export ────────────────────────────────────────────────────────────────
    let summary = optimizer.summary();
    let platforms = optimizer.analyzed_platforms();
    report_cores(platforms);
    export::write_result(&cli.output, platforms, &summary)?;

    info!(
        solved        = outcome.solved,
        final_cost    = summary.cost,
        best_cost     = outcome.best_cost,
        total_laxity  = summary.total_laxity,
        perfect       = summary.perfect_laxity,
        unschedulable = summary.unschedulable,
        steps         = outcome.steps,
        elapsed_ms    = elapsed.as_millis() as u64,
        "=== Placement complete ==="
    );

    if summary.unschedulable > 0 {
        warn!(
            unschedulable = summary.unschedulable,
            "final assignment still contains tasks that miss their deadline"
        );
    }

    Ok(())
}

/// Per-core diagnostics of the final assignment.
fn report_cores(platforms: &[Mcp]) {
    for mcp in platforms {
        for core in mcp.cores() {
            let ids: Vec<_> = core.tasks().iter().map(|t| t.id).collect();
            debug!(
                mcp = mcp.id(),
                core = core.id(),
                factor = core.wcet_factor(),
                tasks = ?ids,
                "  final core contents"
            );

            match core.load_class() {
                LoadClass::WithinBound => {}
                LoadClass::Inconclusive { utilization, bound } => debug!(
                    mcp = mcp.id(),
                    core = core.id(),
                    utilization = utilization,
                    bound = bound,
                    "utilization above Liu & Layland bound; schedulability decided by RTA"
                ),
                LoadClass::Overloaded { utilization } => warn!(
                    mcp = mcp.id(),
                    core = core.id(),
                    utilization = utilization,
                    "core overloaded (inflated utilization > 1.0)"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcp_anneal::optimizer::params;
    use std::ffi::OsString;

    #[test]
    fn cli_flags_override_anneal_defaults() {
        let cli = Cli::parse_from([
            "mcp-anneal",
            "in.yaml",
            "out.yaml",
            "--t0",
            "12.5",
            "--max-steps",
            "1000",
            "--seed",
            "7",
        ]);
        let p = cli.overrides().apply_to(AnnealParams::default());
        assert_eq!(p.t0, 12.5);
        assert_eq!(p.max_steps, 1000);
        assert_eq!(p.alpha, params::DEFAULT_ALPHA);
        assert_eq!(cli.seed, Some(7));
    }

    #[test]
    fn cli_flag_wins_over_file_section() {
        let cli = Cli::parse_from(["mcp-anneal", "in.yaml", "out.yaml", "--alpha", "0.5"]);
        let file = AnnealSection {
            alpha: Some(0.8),
            beta: Some(1.3),
            ..Default::default()
        };
        let p = cli
            .overrides()
            .apply_to(file.apply_to(AnnealParams::default()));
        assert_eq!(p.alpha, 0.5);
        assert_eq!(p.beta, 1.3);
    }

    #[test]
    fn run_writes_a_result_file() {
        use std::io::Write;

        let mut input = tempfile::NamedTempFile::new().unwrap();
        input
            .write_all(
                br#"
platforms:
  - id: 0
    cores: [ { id: 0 }, { id: 1 }, { id: 2 } ]
tasks:
  - { id: 1, wcet: 1, period: 10, priority: 1 }
  - { id: 2, wcet: 1, period: 10, priority: 2 }
  - { id: 3, wcet: 1, period: 10, priority: 3 }
annealing:
  t0: 1.0
  beta0: 0.01
  max_steps: 20000
"#,
            )
            .unwrap();
        let output = tempfile::NamedTempFile::new().unwrap();

        let args: Vec<OsString> = vec![
            "mcp-anneal".into(),
            input.path().into(),
            output.path().into(),
            "--seed".into(),
            "3".into(),
        ];
        let cli = Cli::parse_from(args);
        run(&cli).unwrap();

        let doc = export::read_result(output.path()).unwrap();
        assert_eq!(doc.summary.task_count, 3);
        assert_eq!(doc.summary.unschedulable, 0);
        assert_eq!(doc.summary.cost, 0.0);
    }
}
