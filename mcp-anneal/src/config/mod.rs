//! System description loading: platform topology, task set and optional
//! annealing parameters.
//!
//! The expected YAML structure is:
//! ```yaml
//! platforms:
//!   - id: 0
//!     cores:
//!       - id: 0
//!         wcet_factor: 1.0
//!       - id: 1
//!         wcet_factor: 1.2
//! tasks:
//!   - { id: 1, wcet: 2, period: 5, deadline: 5, priority: 1 }
//!   - { id: 2, wcet: 1, period: 10, priority: 2 }   # deadline = period
//! annealing:            # optional, every key optional
//!   t0: 35.0
//!   max_steps: 1000000
//! ```
//!
//! Structural problems (unreadable file, malformed YAML, duplicate platform
//! or core ids) are reported here.  Scheduling-level validation (task
//! timing, inflation factors, core count) belongs to
//! [`Optimizer::new`](crate::optimizer::Optimizer::new).

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::optimizer::AnnealParams;
use crate::platform::{Mcp, McpId};
use crate::processor::{Core, CoreId};
use crate::task::{Priority, Task, TaskId};

// ── File layout ───────────────────────────────────────────────────────────────

/// Top-level layout of a system description file.
///
/// Public (and `Serialize`) so that tools can generate input files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemFile {
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,
    #[serde(default)]
    pub tasks: Vec<TaskEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annealing: Option<AnnealSection>,
}

/// One platform as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub id: McpId,
    #[serde(default)]
    pub cores: Vec<CoreEntry>,
}

/// One core as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreEntry {
    pub id: CoreId,
    /// WCET inflation factor; `1.0` when absent.
    #[serde(default = "default_wcet_factor")]
    pub wcet_factor: f64,
}

/// Serde default for `wcet_factor`: no inflation.
fn default_wcet_factor() -> f64 {
    1.0
}

/// One task as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    pub id: TaskId,
    pub wcet: u64,
    pub period: u64,
    /// Relative deadline; equals `period` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<u64>,
    /// Required: a missing key must not silently become the highest priority.
    pub priority: Priority,
}

impl TaskEntry {
    fn into_task(self) -> Task {
        Task::new(
            self.id,
            self.wcet,
            self.period,
            self.deadline.unwrap_or(self.period),
            self.priority,
        )
    }
}

/// Partial annealing parameters.  Absent keys keep the value they are
/// applied on top of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnealSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta0: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<f64>,
}

impl AnnealSection {
    /// Overlay the keys that are set onto `base`.
    pub fn apply_to(&self, base: AnnealParams) -> AnnealParams {
        AnnealParams {
            t0: self.t0.unwrap_or(base.t0),
            beta0: self.beta0.unwrap_or(base.beta0),
            max_steps: self.max_steps.unwrap_or(base.max_steps),
            beta: self.beta.unwrap_or(base.beta),
            alpha: self.alpha.unwrap_or(base.alpha),
        }
    }
}

// ── SystemConfig ──────────────────────────────────────────────────────────────

/// A loaded system: empty platforms, the tasks to place, and whatever
/// annealing parameters the file sets.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Topology with no tasks assigned yet.
    pub platforms: Vec<Mcp>,
    /// Flat task set, in file order.
    pub tasks: Vec<Task>,
    /// Annealing keys from the file (all `None` when the section is absent).
    pub annealing: AnnealSection,
}

impl SystemConfig {
    /// Read and parse the system description at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, the YAML is malformed, or
    /// a platform or core identifier is duplicated.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading system description from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open system file: {}", path.display()))?;

        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid system file: {}", path.display()))
    }

    /// Parse a system description held in memory.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: SystemFile = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        Self::from_file(file)
    }

    fn from_file(file: SystemFile) -> Result<Self> {
        let mut platform_ids = HashSet::new();
        let mut platforms = Vec::with_capacity(file.platforms.len());

        for entry in file.platforms {
            if !platform_ids.insert(entry.id) {
                bail!("platform id {} appears more than once", entry.id);
            }

            let mut core_ids = HashSet::new();
            let mut mcp = Mcp::new(entry.id);
            for core in entry.cores {
                if !core_ids.insert(core.id) {
                    bail!(
                        "core id {} appears more than once in platform {}",
                        core.id,
                        entry.id
                    );
                }
                debug!(
                    "  Platform {} | Core {} | WCET factor {}",
                    entry.id, core.id, core.wcet_factor
                );
                mcp.add_core(Core::new(core.id, core.wcet_factor));
            }
            platforms.push(mcp);
        }

        let tasks: Vec<Task> = file.tasks.into_iter().map(TaskEntry::into_task).collect();
        for task in tasks.iter().filter(|t| t.deadline > t.period) {
            warn!(
                task = task.id,
                deadline = task.deadline,
                period = task.period,
                "deadline exceeds period; analysis assumes constrained deadlines"
            );
        }

        let annealing = file.annealing.unwrap_or_default();

        info!(
            platforms = platforms.len(),
            cores = platforms.iter().map(|p| p.cores().len()).sum::<usize>(),
            tasks = tasks.len(),
            "Successfully loaded system description"
        );

        Ok(Self {
            platforms,
            tasks,
            annealing,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
