/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! A single execution unit and its fixed-priority task set.
//!
//! [`Core`] owns its tasks and is the only place where a task's WCRT is
//! written.  Results are cached: any mutation of the task set marks the core
//! *stale*, and the next query re-sorts the tasks and recomputes every WCRT
//! on this core (and only this core).  The cache is an optimisation, not part
//! of the contract; every query returns the same value a from-scratch
//! analysis would.

use rand::Rng;
use thiserror::Error;
use tracing::trace;

use crate::analysis::{self, feasibility};
use crate::task::{Task, TaskId};

/// Core identifier, unique within its platform.
pub type CoreId = u32;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Failures of the task-ownership operations on a [`Core`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A random task was requested from a core that holds none.
    #[error("core {core} has no tasks")]
    Empty { core: CoreId },

    /// Removal of a task the core does not own.  Always a caller bug.
    #[error("task {task} is not assigned to core {core}")]
    NotFound { core: CoreId, task: TaskId },
}

// ── Core ──────────────────────────────────────────────────────────────────────

/// One core of a multi-core platform.
#[derive(Debug, Clone)]
pub struct Core {
    id: CoreId,

    /// Multiplier `>= 1.0` applied to every WCET scheduled here.
    wcet_factor: f64,

    /// Owned tasks.  Sorted by [`Task::priority_order`] whenever `stale` is
    /// `false`.
    tasks: Vec<Task>,

    /// Set by every mutation; cleared by [`analyze`](Self::analyze).
    stale: bool,
}

impl Core {
    /// Create an empty core.
    pub fn new(id: CoreId, wcet_factor: f64) -> Self {
        Self {
            id,
            wcet_factor,
            tasks: Vec::new(),
            stale: false,
        }
    }

    pub fn id(&self) -> CoreId {
        self.id
    }

    pub fn wcet_factor(&self) -> f64 {
        self.wcet_factor
    }

    /// Owned tasks in their current order.
    ///
    /// WCRT values are only current if [`is_stale`](Self::is_stale) returns
    /// `false`; call [`analyze`](Self::analyze) first when in doubt.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    /// `true` when the task order or WCRT values are out of date.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    // ── Ownership transfer ────────────────────────────────────────────────────

    /// Take ownership of `task`.
    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.stale = true;
    }

    /// Give up ownership of the task with identifier `id`.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] if the task is not on this core.
    pub fn remove_task(&mut self, id: TaskId) -> Result<Task, CoreError> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(CoreError::NotFound {
                core: self.id,
                task: id,
            })?;
        self.stale = true;
        Ok(self.tasks.swap_remove(idx))
    }

    /// Remove and return a uniformly chosen task.
    ///
    /// The caller becomes the owner and must place the task on some core.
    ///
    /// # Errors
    /// [`CoreError::Empty`] if the core holds no tasks.
    pub fn take_random_task<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Task, CoreError> {
        if self.tasks.is_empty() {
            return Err(CoreError::Empty { core: self.id });
        }
        let idx = rng.gen_range(0..self.tasks.len());
        self.stale = true;
        Ok(self.tasks.swap_remove(idx))
    }

    // ── Analysis ──────────────────────────────────────────────────────────────

    /// Bring the priority order and every WCRT up to date.
    ///
    /// No-op when the core is not stale, so repeated calls are cheap and
    /// yield identical results.
    pub fn analyze(&mut self) {
        if !self.stale {
            return;
        }

        self.tasks.sort_by(Task::priority_order);

        for i in 0..self.tasks.len() {
            let (higher, rest) = self.tasks.split_at_mut(i);
            let seed = higher.last().map_or(0, Task::wcrt);
            let wcrt = analysis::response_time(higher, &rest[0], self.wcet_factor, seed);
            rest[0].set_wcrt(wcrt);
        }

        self.stale = false;

        trace!(
            core = self.id,
            tasks = self.tasks.len(),
            "response times recomputed"
        );
    }

    /// Number of tasks whose WCRT exceeds their deadline.
    pub fn unschedulable_count(&mut self) -> usize {
        self.analyze();
        self.tasks.iter().filter(|t| t.is_unschedulable()).count()
    }

    /// `Σ (deadline − WCRT)` over the owned tasks.  Negative when tasks miss
    /// their deadlines.
    pub fn laxity(&mut self) -> i64 {
        self.analyze();
        self.tasks
            .iter()
            .map(Task::laxity)
            .fold(0i64, i64::saturating_add)
    }

    /// Inflated utilisation `Σ ceil(WCET × f) / period`.
    pub fn utilization(&self) -> f64 {
        feasibility::inflated_utilization(&self.tasks, self.wcet_factor)
    }

    /// Utilisation-based load classification of the current task set.
    pub fn load_class(&self) -> feasibility::LoadClass {
        feasibility::classify(&self.tasks, self.wcet_factor)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wcrt_of(core: &Core, id: TaskId) -> u64 {
        core.tasks()
            .iter()
            .find(|t| t.id == id)
            .map(Task::wcrt)
            .unwrap()
    }

    // Tasks from the reference scenario (id, wcet, period, deadline, priority).
    fn task1() -> Task {
        Task::new(1, 2, 5, 5, 1)
    }
    fn task2() -> Task {
        Task::new(2, 1, 10, 10, 2)
    }
    fn task3() -> Task {
        Task::new(3, 4, 20, 20, 1)
    }

    // ── Ownership ─────────────────────────────────────────────────────────────

    #[test]
    fn add_task_marks_core_stale() {
        let mut core = Core::new(0, 1.0);
        assert!(!core.is_stale());
        core.add_task(task1());
        assert!(core.is_stale());
        core.analyze();
        assert!(!core.is_stale());
    }

    #[test]
    fn remove_task_returns_the_owned_value() {
        let mut core = Core::new(0, 1.0);
        core.add_task(task1());
        core.add_task(task2());
        core.analyze();

        let t = core.remove_task(2).unwrap();
        assert_eq!(t.id, 2);
        assert!(!core.contains(2));
        assert!(core.is_stale());
    }

    #[test]
    fn remove_missing_task_is_not_found() {
        let mut core = Core::new(4, 1.0);
        core.add_task(task1());
        assert_eq!(
            core.remove_task(9),
            Err(CoreError::NotFound { core: 4, task: 9 })
        );
        assert_eq!(core.len(), 1);
    }

    #[test]
    fn take_random_task_from_empty_core_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut core = Core::new(2, 1.0);
        assert_eq!(
            core.take_random_task(&mut rng),
            Err(CoreError::Empty { core: 2 })
        );
    }

    #[test]
    fn take_random_task_transfers_ownership() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut core = Core::new(0, 1.0);
        for t in [task1(), task2(), task3()] {
            core.add_task(t);
        }

        let taken = core.take_random_task(&mut rng).unwrap();
        assert_eq!(core.len(), 2);
        assert!(!core.contains(taken.id));
    }

    // ── Analysis ──────────────────────────────────────────────────────────────

    #[test]
    fn single_task_wcrt_is_inflated_wcet() {
        let mut core = Core::new(0, 1.3);
        core.add_task(Task::new(1, 10, 100, 13, 0));
        assert_eq!(core.unschedulable_count(), 0);
        assert_eq!(wcrt_of(&core, 1), 13);

        let mut tight = Core::new(1, 1.3);
        tight.add_task(Task::new(1, 10, 100, 12, 0));
        assert_eq!(tight.unschedulable_count(), 1);
    }

    #[test]
    fn reference_scenario_task1_alone() {
        let mut core = Core::new(0, 1.0);
        core.add_task(task1());
        assert_eq!(core.laxity(), 3);
        assert_eq!(wcrt_of(&core, 1), 2);
    }

    #[test]
    fn moving_task3_next_to_task1_adds_interference() {
        let mut a = Core::new(0, 1.0);
        let mut b = Core::new(1, 1.0);
        a.add_task(task1());
        b.add_task(task2());
        b.add_task(task3());
        b.analyze();
        // On core b task 3 outranks task 2, so it runs undisturbed.
        assert_eq!(wcrt_of(&b, 3), 4);

        let t3 = b.remove_task(3).unwrap();
        a.add_task(t3);
        a.analyze();

        // Equal priority, task 1 sorts first: R = 4 + ceil(R/5)×2 → 8.
        assert_eq!(wcrt_of(&a, 1), 2);
        assert_eq!(wcrt_of(&a, 3), 8);
        assert_eq!(a.unschedulable_count(), 0);
    }

    #[test]
    fn analysis_is_idempotent() {
        let mut core = Core::new(0, 1.1);
        for t in [task1(), task2(), task3()] {
            core.add_task(t);
        }
        core.analyze();
        let first: Vec<u64> = core.tasks().iter().map(Task::wcrt).collect();

        core.stale = true; // force a full recomputation
        core.analyze();
        let second: Vec<u64> = core.tasks().iter().map(Task::wcrt).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn tasks_are_sorted_by_priority_after_analysis() {
        let mut core = Core::new(0, 1.0);
        core.add_task(task2());
        core.add_task(task3());
        core.add_task(task1());
        core.analyze();
        let ids: Vec<TaskId> = core.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn wcrt_never_below_inflated_wcet() {
        let mut core = Core::new(0, 1.7);
        for t in [task1(), task2(), task3()] {
            core.add_task(t);
        }
        core.analyze();
        for t in core.tasks() {
            assert!(
                t.wcrt() >= analysis::inflate(t.wcet, 1.7),
                "task {} wcrt {} below inflated wcet",
                t.id,
                t.wcrt()
            );
        }
    }

    #[test]
    fn overloaded_core_reports_unschedulable_tasks() {
        let mut core = Core::new(0, 1.0);
        core.add_task(Task::new(1, 5, 5, 5, 1));
        core.add_task(Task::new(2, 2, 10, 10, 2));
        assert_eq!(core.unschedulable_count(), 1);
        // Task 1: 5 − 5.  Task 2 jumps 7 → 12 over its deadline: 10 − 12.
        assert_eq!(core.laxity(), 0 - 2);
        assert!(matches!(
            core.load_class(),
            feasibility::LoadClass::Overloaded { .. }
        ));
    }

    #[test]
    fn wcrt_landing_on_deadline_counts_as_schedulable() {
        let mut core = Core::new(0, 1.0);
        core.add_task(Task::new(1, 3, 4, 4, 1));
        core.add_task(Task::new(2, 3, 6, 6, 2));
        // Task 2 reaches 6 = D before converging and stops there.
        assert_eq!(core.unschedulable_count(), 0);
        assert_eq!(core.laxity(), 1 + 0);
        assert_eq!(core.tasks()[1].wcrt(), 6);
    }

    #[test]
    fn removal_invalidates_cached_wcrt() {
        let mut core = Core::new(0, 1.0);
        core.add_task(task1());
        core.add_task(task3());
        assert_eq!(core.laxity(), 3 + 12);

        core.remove_task(1).unwrap();
        // Task 3 alone: WCRT 4, laxity 16.
        assert_eq!(core.laxity(), 16);
    }

    #[test]
    fn empty_core_has_zero_laxity() {
        let mut core = Core::new(0, 2.0);
        assert_eq!(core.laxity(), 0);
        assert_eq!(core.unschedulable_count(), 0);
    }
}
