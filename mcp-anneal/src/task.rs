/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic real-time task model.
//!
//! A [`Task`] carries the static scheduling attributes read from the input
//! file plus one derived value, the worst-case response time (WCRT).
//!
//! # Ownership model
//! A `Task` is **owned** by exactly one [`Core`](crate::processor::Core) at a
//! time.  Migrating a task between cores moves the value out of one core's
//! `Vec<Task>` and into another's; there is never a second live copy.  Only
//! the owning core writes `wcrt`, and only as part of its response-time
//! analysis.

use std::cmp::Ordering;

// ── Type aliases ──────────────────────────────────────────────────────────────

/// Task identifier, unique within one system.
pub type TaskId = u32;

/// Scheduling priority.  **Lower value = higher priority.**
pub type Priority = i32;

// ── Task ──────────────────────────────────────────────────────────────────────

/// One periodic task.
///
/// All timing fields share a single abstract time unit (whatever the input
/// file uses).  `period` doubles as the minimum inter-arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    // ── Identity ──────────────────────────────────────────────────────────────
    /// Unique task identifier.
    pub id: TaskId,

    // ── Scheduling parameters ─────────────────────────────────────────────────
    /// Worst-case execution time before any per-core inflation.
    pub wcet: u64,

    /// Activation period (and minimum inter-arrival time).
    pub period: u64,

    /// Relative deadline, expected to be `<= period`.
    pub deadline: u64,

    /// Fixed priority.  Lower value runs first.
    pub priority: Priority,

    // ── Derived ───────────────────────────────────────────────────────────────
    /// Worst-case response time on the current core.  Private so that only
    /// the owning core's analysis can change it.
    wcrt: u64,
}

impl Task {
    /// Create a task with its WCRT reset to zero.
    pub fn new(id: TaskId, wcet: u64, period: u64, deadline: u64, priority: Priority) -> Self {
        Self {
            id,
            wcet,
            period,
            deadline,
            priority,
            wcrt: 0,
        }
    }

    /// Last computed worst-case response time.
    ///
    /// Only meaningful after the owning core has been analysed; see
    /// [`Core::analyze`](crate::processor::Core::analyze).
    pub fn wcrt(&self) -> u64 {
        self.wcrt
    }

    pub(crate) fn set_wcrt(&mut self, wcrt: u64) {
        self.wcrt = wcrt;
    }

    /// `deadline - wcrt`; negative when the task misses its deadline.
    ///
    /// Times above `i64::MAX` are clamped to it.
    pub fn laxity(&self) -> i64 {
        clamped(self.deadline) - clamped(self.wcrt)
    }

    /// Slack with no interference and no inflation: `deadline - wcet`.
    ///
    /// Summed over every task this gives the system's perfect laxity.
    pub fn ideal_laxity(&self) -> i64 {
        clamped(self.deadline) - clamped(self.wcet)
    }

    /// `true` when the last computed WCRT exceeds the deadline.
    pub fn is_unschedulable(&self) -> bool {
        self.wcrt > self.deadline
    }

    /// Ordering used on every core: ascending priority value, ties broken by
    /// ascending identifier so the order is deterministic.
    pub fn priority_order(a: &Task, b: &Task) -> Ordering {
        a.priority.cmp(&b.priority).then(a.id.cmp(&b.id))
    }
}

fn clamped(time: u64) -> i64 {
    i64::try_from(time).unwrap_or(i64::MAX)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
