/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Result export: the final platform → core → task assignment as YAML.
//!
//! ```yaml
//! summary:
//!   cost: 0.0
//!   total_laxity: 28
//!   perfect_laxity: 28
//!   unschedulable: 0
//!   task_count: 3
//! platforms:
//!   - id: 0
//!     cores:
//!       - id: 0
//!         wcet_factor: 1.0
//!         utilization: 0.4
//!         tasks:
//!           - { id: 1, wcet: 2, period: 5, deadline: 5, priority: 1, wcrt: 2 }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::optimizer::Summary;
use crate::platform::{Mcp, McpId};
use crate::processor::CoreId;
use crate::task::{Priority, TaskId};

// ── Document layout ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    pub summary: SummaryEntry,
    pub platforms: Vec<PlatformResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub cost: f64,
    pub total_laxity: i64,
    pub perfect_laxity: i64,
    pub unschedulable: usize,
    pub task_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformResult {
    pub id: McpId,
    pub cores: Vec<CoreResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreResult {
    pub id: CoreId,
    pub wcet_factor: f64,
    /// Inflated utilisation of the final task set.
    pub utilization: f64,
    pub tasks: Vec<TaskResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub id: TaskId,
    pub wcet: u64,
    pub period: u64,
    pub deadline: u64,
    pub priority: Priority,
    pub wcrt: u64,
}

// ── Conversion ────────────────────────────────────────────────────────────────

impl ResultFile {
    /// Snapshot `platforms` and `summary`.
    ///
    /// WCRT values are copied as they are; pass analysed platforms (see
    /// [`Optimizer::analyzed_platforms`](crate::optimizer::Optimizer::analyzed_platforms)).
    pub fn build(platforms: &[Mcp], summary: &Summary) -> Self {
        let platforms = platforms
            .iter()
            .map(|mcp| PlatformResult {
                id: mcp.id(),
                cores: mcp
                    .cores()
                    .iter()
                    .map(|core| CoreResult {
                        id: core.id(),
                        wcet_factor: core.wcet_factor(),
                        utilization: core.utilization(),
                        tasks: core
                            .tasks()
                            .iter()
                            .map(|t| TaskResult {
                                id: t.id,
                                wcet: t.wcet,
                                period: t.period,
                                deadline: t.deadline,
                                priority: t.priority,
                                wcrt: t.wcrt(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            summary: SummaryEntry {
                cost: summary.cost,
                total_laxity: summary.total_laxity,
                perfect_laxity: summary.perfect_laxity,
                unschedulable: summary.unschedulable,
                task_count: summary.task_count,
            },
            platforms,
        }
    }
}

// ── File I/O ──────────────────────────────────────────────────────────────────

/// Write the assignment held in `platforms` to `path`.
///
/// # Errors
/// Returns an error if serialisation fails or the file cannot be written.
pub fn write_result(path: &Path, platforms: &[Mcp], summary: &Summary) -> Result<()> {
    let doc = ResultFile::build(platforms, summary);
    let yaml = serde_yaml::to_string(&doc).context("Failed to serialise result")?;

    std::fs::write(path, yaml)
        .with_context(|| format!("Cannot write result file: {}", path.display()))?;

    info!(
        path = %path.display(),
        platforms = doc.platforms.len(),
        tasks = doc.summary.task_count,
        "result written"
    );
    Ok(())
}

/// Read a result file previously produced by [`write_result`].
pub fn read_result(path: &Path) -> Result<ResultFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open result file: {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse result file: {}", path.display()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
