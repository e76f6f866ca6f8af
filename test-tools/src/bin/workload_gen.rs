/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! workload-gen — random system descriptions for manual mcp-anneal runs.
//!
//! ```text
//! workload-gen -o system.yaml --platforms 2 --cores 4 --tasks 40 --util 0.6 --seed 1
//! mcp-anneal system.yaml result.yaml --max-steps 2000000
//! ```
//!
//! Task utilisations are drawn with UUniFast so they sum to exactly
//! `util × total cores`; periods are drawn log-uniformly between
//! `--min-period` and `--max-period`; priorities are rate-monotonic
//! (shorter period → lower value → higher priority).

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use mcp_anneal::config::{CoreEntry, PlatformEntry, SystemFile, TaskEntry};

#[derive(Debug, Parser)]
#[command(name = "workload-gen", about = "Random system descriptions for mcp-anneal")]
struct Cli {
    /// Output file.
    #[arg(short = 'o', long = "output")]
    output: PathBuf,

    /// Number of platforms.
    #[arg(long = "platforms", default_value_t = 2)]
    platforms: u32,

    /// Cores per platform.
    #[arg(long = "cores", default_value_t = 4)]
    cores: u32,

    /// Number of tasks.
    #[arg(short = 'n', long = "tasks", default_value_t = 32)]
    tasks: u32,

    /// Average per-core utilisation of the whole task set (before inflation).
    #[arg(short = 'u', long = "util", default_value_t = 0.5)]
    util: f64,

    /// Shortest period.
    #[arg(long = "min-period", default_value_t = 10)]
    min_period: u64,

    /// Longest period.
    #[arg(long = "max-period", default_value_t = 1000)]
    max_period: u64,

    /// Largest inflation factor; each core draws uniformly from [1, max].
    #[arg(long = "max-factor", default_value_t = 1.0)]
    max_factor: f64,

    /// Random seed; a fresh one is drawn when absent.
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,
}

/// UUniFast (Bini & Buttazzo): `n` utilisations summing to `total`.
fn uunifast<R: Rng>(rng: &mut R, n: usize, total: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n);
    let mut sum = total;
    for i in 1..n {
        let next = sum * rng.gen::<f64>().powf(1.0 / (n - i) as f64);
        out.push(sum - next);
        sum = next;
    }
    out.push(sum);
    out
}

fn generate<R: Rng>(cli: &Cli, rng: &mut R) -> SystemFile {
    let platforms: Vec<PlatformEntry> = (0..cli.platforms)
        .map(|id| PlatformEntry {
            id,
            cores: (0..cli.cores)
                .map(|id| CoreEntry {
                    id,
                    wcet_factor: if cli.max_factor > 1.0 {
                        rng.gen_range(1.0..=cli.max_factor)
                    } else {
                        1.0
                    },
                })
                .collect(),
        })
        .collect();

    let total_util = cli.util * f64::from(cli.platforms * cli.cores);
    let utils = uunifast(rng, cli.tasks as usize, total_util);

    let (lo, hi) = ((cli.min_period as f64).ln(), (cli.max_period as f64).ln());
    let mut tasks: Vec<TaskEntry> = utils
        .into_iter()
        .zip(1..)
        .map(|(u, id)| {
            let period = if hi > lo {
                rng.gen_range(lo..=hi).exp().round() as u64
            } else {
                cli.min_period
            };
            let wcet = ((u * period as f64).round() as u64).clamp(1, period);
            TaskEntry {
                id,
                wcet,
                period,
                deadline: Some(period),
                priority: 0,
            }
        })
        .collect();

    // Rate-monotonic priorities, ties broken by id.
    tasks.sort_by_key(|t| (t.period, t.id));
    for (rank, task) in tasks.iter_mut().enumerate() {
        task.priority = rank as i32;
    }
    tasks.sort_by_key(|t| t.id);

    SystemFile {
        platforms,
        tasks,
        annealing: None,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if cli.platforms * cli.cores < 2 {
        bail!("need at least two cores in total");
    }
    if cli.min_period == 0 || cli.min_period > cli.max_period {
        bail!("invalid period range {}..{}", cli.min_period, cli.max_period);
    }

    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let file = generate(&cli, &mut rng);

    let yaml = serde_yaml::to_string(&file).context("Failed to serialise workload")?;
    std::fs::write(&cli.output, yaml)
        .with_context(|| format!("Cannot write {}", cli.output.display()))?;

    info!(
        output    = %cli.output.display(),
        seed      = seed,
        platforms = cli.platforms,
        cores     = cli.cores,
        tasks     = cli.tasks,
        "workload written"
    );
    Ok(())
}
