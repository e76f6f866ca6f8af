/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Response-time analysis for preemptive fixed-priority scheduling.
//!
//! These are free functions rather than [`Core`](crate::processor::Core)
//! methods so they can be tested against hand-computed values without
//! building a core.
//!
//! # Recurrence
//! For task `i` with every higher-priority task `j < i` on the same core:
//!
//! ```text
//! C_i     = ceil(WCET_i × f)
//! R_{n+1} = C_i + Σ_{j<i} ceil(R_n / T_j) × ceil(WCET_j × f)
//! ```
//!
//! starting from the previous task's response time (or `0` for the highest
//! priority task).  Iteration stops at a fixed point, or as soon as the
//! response time reaches the deadline.  A value that lands exactly on the
//! deadline is kept as the WCRT even when it has not converged.

pub mod feasibility;

use crate::task::Task;

/// Execution time of `wcet` after applying a core's inflation factor,
/// rounded up to the next whole time unit.
pub fn inflate(wcet: u64, factor: f64) -> u64 {
    (wcet as f64 * factor).ceil() as u64
}

/// Demand that `higher` places on the core inside a window of length
/// `window`: `Σ ceil(window / T_j) × ceil(WCET_j × f)`.
pub fn interference(higher: &[Task], window: u64, factor: f64) -> u64 {
    higher
        .iter()
        .map(|t| window.div_ceil(t.period).saturating_mul(inflate(t.wcet, factor)))
        .fold(0u64, u64::saturating_add)
}

/// Worst-case response time of `task` when every task in `higher` has a
/// higher priority on the same core.
///
/// `seed` is the starting value of the iteration; the core passes the WCRT
/// of the task immediately above `task` in priority order.
///
/// The result is never below `inflate(task.wcet, factor)`.  Once the
/// iteration reaches `task.deadline` it stops, so the returned value is not
/// necessarily the true (possibly unbounded) response time.
pub fn response_time(higher: &[Task], task: &Task, factor: f64, seed: u64) -> u64 {
    let ci = inflate(task.wcet, factor);
    let mut r = seed;

    loop {
        let next = interference(higher, r, factor).saturating_add(ci);
        if next == r {
            break;
        }
        r = next;
        if r >= task.deadline {
            break;
        }
    }

    r
}

// ── Tests ─────────────────────────────────────────────────────────────────────
