/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the placement optimizer.
//!
//! Three layers:
//!
//! * [`TaskDefect`] — why one task's attributes are unusable (carries the
//!   offending values).
//! * [`ParamsError`] — an annealing parameter outside its valid range.
//! * [`OptimizerError`] — top-level failure returned by
//!   [`Optimizer`](super::Optimizer) construction and search.
//!
//! Unschedulable tasks are deliberately **absent**: missing a deadline is a
//! penalised outcome of the search, not a failure.

use thiserror::Error;

use crate::platform::McpId;
use crate::processor::{CoreError, CoreId};
use crate::task::TaskId;

// ── Task validation ───────────────────────────────────────────────────────────

/// Detailed reason why a task cannot be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDefect {
    /// `wcet == 0`.
    ZeroWcet,

    /// `period == 0`; the interference term would divide by zero.
    ZeroPeriod,

    /// `deadline == 0`.
    ZeroDeadline,
}

impl std::fmt::Display for TaskDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskDefect::ZeroWcet => write!(f, "worst-case execution time must be positive"),
            TaskDefect::ZeroPeriod => write!(f, "period must be positive"),
            TaskDefect::ZeroDeadline => write!(f, "deadline must be positive"),
        }
    }
}

// ── Annealing parameters ──────────────────────────────────────────────────────

/// An annealing parameter outside its valid range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("initial temperature must be positive and finite, got {0}")]
    Temperature(f64),

    #[error("beta0 must be in (0, 1], got {0}")]
    InitialFraction(f64),

    #[error("max_steps must be positive")]
    NoSteps,

    #[error("beta must be finite and >= 1, got {0}")]
    Growth(f64),

    #[error("alpha must be in (0, 1), got {0}")]
    Cooling(f64),
}

// ── Top-level optimizer errors ────────────────────────────────────────────────

/// Top-level error type of the optimizer.
///
/// | Variant | When |
/// |---|---|
/// | `NoTasks` | construction — the cost would divide by zero |
/// | `TooFewCores` | construction — no migration is possible |
/// | `DuplicateTask` / `InvalidTask` / `InvalidFactor` | construction |
/// | `Params` | start of [`anneal`](super::Optimizer::anneal) |
/// | `Core` | search — an ownership invariant was broken |
#[derive(Debug, Error)]
pub enum OptimizerError {
    /// The system holds no tasks at all.
    #[error("no tasks provided — the system must contain at least one task")]
    NoTasks,

    /// Fewer than two cores over all platforms.
    #[error("at least two cores are required to migrate tasks, found {found}")]
    TooFewCores { found: usize },

    /// Two tasks share an identifier.
    #[error("task id {task} appears more than once")]
    DuplicateTask { task: TaskId },

    /// A task carries unusable timing attributes.
    #[error("task {task} is invalid: {defect}")]
    InvalidTask { task: TaskId, defect: TaskDefect },

    /// A core's inflation factor is below `1.0` or not finite.
    #[error("core {core} of platform {mcp} has invalid inflation factor {factor} (must be finite and >= 1)")]
    InvalidFactor {
        mcp: McpId,
        core: CoreId,
        factor: f64,
    },

    /// Annealing parameters rejected before the search starts.
    #[error("invalid annealing parameters: {0}")]
    Params(#[from] ParamsError),

    /// A task-ownership operation failed mid-search.  Indicates a broken
    /// invariant (e.g. an undo that does not match its exchange).
    #[error("task ownership invariant violated: {0}")]
    Core(#[from] CoreError),
}
