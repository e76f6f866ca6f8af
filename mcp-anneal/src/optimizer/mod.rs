//! Simulated-annealing placement of tasks onto cores.
//!
//! [`Optimizer`] owns the whole platform → core → task graph and searches
//! for an assignment whose total laxity is as close as possible to the
//! *perfect laxity* (the slack every task would have alone on an ideal core)
//! with no task missing its deadline.
//!
//! # Search loop
//!
//! ```text
//! exchange()  ── move one random task from core A to core B
//!     │
//! cost()      ── full recomputation over every core (stale cores only)
//!     │
//! accept?  Δ < 0  or  U[0,1) < exp(−Δ / T)
//!     │ no
//! undo()      ── move the task back from B to A
//! ```
//!
//! Temperature tiers are described in [`AnnealParams`].
//!
//! # Design decisions
//!
//! | Topic | Choice |
//! |---|---|
//! | State | One owned `Optimizer<R>`; no globals, several searches can coexist |
//! | Randomness | Injected `R: Rng`; seed it for reproducible runs |
//! | Neighbour move | Migration (A loses a task, B gains it), not a swap |
//! | Invariant breaks | `undo` on a mismatched move is an `Err`, never ignored |
//! | Preconditions | Empty systems and single-core systems rejected in [`Optimizer::new`] |
//!
//! # Example
//! ```rust,ignore
//! let rng = StdRng::seed_from_u64(42);
//! let mut opt = Optimizer::new(platforms, tasks, rng)?;
//! let outcome = opt.anneal(&AnnealParams::default())?;
//! ```

pub mod error;
pub mod params;

pub use error::{OptimizerError, ParamsError, TaskDefect};
pub use params::AnnealParams;

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info};

use crate::platform::Mcp;
use crate::processor::Core;
use crate::task::{Task, TaskId};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Cost added per unschedulable task, in laxity units.
pub const PENALTY_UNIT: i64 = 5000;

// ── Public value types ────────────────────────────────────────────────────────

/// Position of a core in the topology: platform index, then core index
/// within that platform.  Positions, not identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoreSlot {
    pub mcp: usize,
    pub core: usize,
}

/// One applied neighbour move: task `task` went from `from` to `to`.
///
/// Handing it back to [`Optimizer::undo`] reverts the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub task: TaskId,
    pub from: CoreSlot,
    pub to: CoreSlot,
}

/// Aggregate figures of the current assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub cost: f64,
    pub total_laxity: i64,
    pub perfect_laxity: i64,
    pub unschedulable: usize,
    pub task_count: usize,
    pub core_count: usize,
}

/// Result of one [`Optimizer::anneal`] run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnealOutcome {
    /// Cost of the assignment the optimizer holds when the search ends.
    pub final_cost: f64,
    /// Lowest cost observed during the search.  The search does not return
    /// to that configuration; it is reported for diagnostics.
    pub best_cost: f64,
    /// `true` when a zero-cost assignment was reached.
    pub solved: bool,
    pub steps: u64,
    pub accepted: u64,
    pub rejected: u64,
    /// Temperature tiers entered.
    pub tiers: u32,
    /// Temperature of the last tier entered.
    pub final_temperature: f64,
}

// ── Optimizer ─────────────────────────────────────────────────────────────────

/// The placement optimizer.
pub struct Optimizer<R> {
    platforms: Vec<Mcp>,

    /// Every core position, flattened across platforms, for uniform draws.
    slots: Vec<CoreSlot>,

    /// `Σ (deadline − WCET)` over all tasks; fixed for the optimizer's life.
    perfect_laxity: i64,

    task_count: usize,

    rng: R,
}

impl<R: Rng> Optimizer<R> {
    /// Validate the topology, place `tasks` on random cores and
    /// compute the perfect-laxity baseline.
    ///
    /// Tasks already sitting on a core in `platforms` stay where they are and
    /// count towards every total, so an exported result can be refined by a
    /// second run.
    ///
    /// # Errors
    /// * [`OptimizerError::NoTasks`] — no task anywhere.
    /// * [`OptimizerError::TooFewCores`] — fewer than two cores in total.
    /// * [`OptimizerError::InvalidFactor`] — inflation factor `< 1` or not finite.
    /// * [`OptimizerError::DuplicateTask`] / [`OptimizerError::InvalidTask`].
    pub fn new(platforms: Vec<Mcp>, tasks: Vec<Task>, rng: R) -> Result<Self, OptimizerError> {
        Self::validate(&platforms, &tasks)?;

        let slots: Vec<CoreSlot> = platforms
            .iter()
            .enumerate()
            .flat_map(|(mcp, p)| (0..p.cores().len()).map(move |core| CoreSlot { mcp, core }))
            .collect();

        let mut opt = Self {
            platforms,
            slots,
            perfect_laxity: 0,
            task_count: 0,
            rng,
        };

        opt.initial_assign(tasks);
        opt.task_count = opt.platforms.iter().map(Mcp::task_count).sum();
        opt.perfect_laxity = opt
            .platforms
            .iter()
            .flat_map(|p| p.cores())
            .flat_map(|c| c.tasks())
            .map(Task::ideal_laxity)
            .fold(0i64, i64::saturating_add);

        info!(
            platforms = opt.platforms.len(),
            cores = opt.slots.len(),
            tasks = opt.task_count,
            perfect_laxity = opt.perfect_laxity,
            "optimizer initialised"
        );

        Ok(opt)
    }

    fn validate(platforms: &[Mcp], tasks: &[Task]) -> Result<(), OptimizerError> {
        let core_count: usize = platforms.iter().map(|p| p.cores().len()).sum();
        if core_count < 2 {
            return Err(OptimizerError::TooFewCores { found: core_count });
        }

        for mcp in platforms {
            for core in mcp.cores() {
                let factor = core.wcet_factor();
                if !(factor.is_finite() && factor >= 1.0) {
                    return Err(OptimizerError::InvalidFactor {
                        mcp: mcp.id(),
                        core: core.id(),
                        factor,
                    });
                }
            }
        }

        let placed = platforms
            .iter()
            .flat_map(|p| p.cores())
            .flat_map(|c| c.tasks());

        let mut seen = HashSet::new();
        let mut any = false;
        for task in placed.chain(tasks.iter()) {
            any = true;
            if !seen.insert(task.id) {
                return Err(OptimizerError::DuplicateTask { task: task.id });
            }
            let defect = if task.wcet == 0 {
                Some(TaskDefect::ZeroWcet)
            } else if task.period == 0 {
                Some(TaskDefect::ZeroPeriod)
            } else if task.deadline == 0 {
                Some(TaskDefect::ZeroDeadline)
            } else {
                None
            };
            if let Some(defect) = defect {
                return Err(OptimizerError::InvalidTask {
                    task: task.id,
                    defect,
                });
            }
        }

        if !any {
            return Err(OptimizerError::NoTasks);
        }
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn perfect_laxity(&self) -> i64 {
        self.perfect_laxity
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn core_count(&self) -> usize {
        self.slots.len()
    }

    /// The topology with every core's analysis brought up to date.
    pub fn analyzed_platforms(&mut self) -> &[Mcp] {
        self.cores_mut().for_each(Core::analyze);
        &self.platforms
    }

    /// Consume the optimizer and hand back the analysed topology.
    pub fn into_platforms(mut self) -> Vec<Mcp> {
        self.cores_mut().for_each(Core::analyze);
        self.platforms
    }

    /// Core at `slot`.
    ///
    /// # Panics
    /// If `slot` does not come from this optimizer.
    pub fn core(&self, slot: CoreSlot) -> &Core {
        &self.platforms[slot.mcp].cores()[slot.core]
    }

    fn cores_mut(&mut self) -> impl Iterator<Item = &mut Core> {
        self.platforms.iter_mut().flat_map(|p| p.cores_mut().iter_mut())
    }

    // ── Initial assignment ────────────────────────────────────────────────────

    /// Sort `tasks` by priority and give each one to a random core: a
    /// uniformly drawn platform (among those with cores), then a uniformly
    /// drawn core of that platform.
    ///
    /// Only called from [`new`](Self::new), after validation and before the
    /// baseline is taken.
    fn initial_assign(&mut self, mut tasks: Vec<Task>) {
        tasks.sort_by(Task::priority_order);

        let populated: Vec<usize> = self
            .platforms
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.cores().is_empty())
            .map(|(i, _)| i)
            .collect();
        if populated.is_empty() {
            return;
        }

        for task in tasks {
            let mcp = populated[self.rng.gen_range(0..populated.len())];
            let core = self.rng.gen_range(0..self.platforms[mcp].cores().len());
            debug!(
                task = task.id,
                mcp = self.platforms[mcp].id(),
                core = self.platforms[mcp].cores()[core].id(),
                "initial placement"
            );
            self.platforms[mcp].cores_mut()[core].add_task(task);
        }
    }

    // ── Cost ──────────────────────────────────────────────────────────────────

    fn totals(&mut self) -> (usize, i64, usize) {
        let mut tasks = 0usize;
        let mut laxity = 0i64;
        let mut unschedulable = 0usize;
        for core in self.cores_mut() {
            tasks += core.len();
            laxity = laxity.saturating_add(core.laxity());
            unschedulable += core.unschedulable_count();
        }
        (tasks, laxity, unschedulable)
    }

    /// Normalised distance from perfect laxity, penalising every
    /// unschedulable task by [`PENALTY_UNIT`]:
    ///
    /// `(perfect − (laxity − PENALTY_UNIT × unschedulable)) / tasks`
    ///
    /// Never negative; exactly `0.0` only for an ideal, fully schedulable
    /// assignment.
    pub fn cost(&mut self) -> f64 {
        let (tasks, laxity, unschedulable) = self.totals();
        let penalty = PENALTY_UNIT.saturating_mul(unschedulable as i64);
        let gap = self
            .perfect_laxity
            .saturating_sub(laxity.saturating_sub(penalty));
        gap as f64 / tasks as f64
    }

    /// Cost, laxity and schedulability figures of the current assignment.
    pub fn summary(&mut self) -> Summary {
        let (task_count, total_laxity, unschedulable) = self.totals();
        Summary {
            cost: self.cost(),
            total_laxity,
            perfect_laxity: self.perfect_laxity,
            unschedulable,
            task_count,
            core_count: self.slots.len(),
        }
    }

    // ── Neighbour moves ───────────────────────────────────────────────────────

    /// Migrate one random task between two random cores.
    ///
    /// Both cores are drawn uniformly over every core of every platform and
    /// redrawn together until they differ and the source holds a task.
    ///
    /// # Errors
    /// Only [`OptimizerError::Core`], which a validated optimizer never
    /// produces.
    pub fn exchange(&mut self) -> Result<Migration, OptimizerError> {
        let n = self.slots.len();
        let (from, to) = loop {
            let from = self.slots[self.rng.gen_range(0..n)];
            let to = self.slots[self.rng.gen_range(0..n)];
            if from != to && !self.core(from).is_empty() {
                break (from, to);
            }
        };

        let task = self.platforms[from.mcp].cores_mut()[from.core].take_random_task(&mut self.rng)?;
        let id = task.id;
        self.platforms[to.mcp].cores_mut()[to.core].add_task(task);

        Ok(Migration { task: id, from, to })
    }

    /// Revert `migration`: the task leaves `to` and returns to `from`.
    ///
    /// # Errors
    /// [`OptimizerError::Core`] wrapping `NotFound` if the task is not on
    /// `to`, i.e. the migration was already undone or never applied.
    pub fn undo(&mut self, migration: &Migration) -> Result<(), OptimizerError> {
        let Migration { task, from, to } = *migration;
        let task = self.platforms[to.mcp].cores_mut()[to.core].remove_task(task)?;
        self.platforms[from.mcp].cores_mut()[from.core].add_task(task);
        Ok(())
    }

    // ── Annealing ─────────────────────────────────────────────────────────────

    /// One annealing step from an assignment costing `current_cost`.
    ///
    /// Returns the cost of the assignment held afterwards: the neighbour's
    /// cost if it was accepted, `current_cost` otherwise.
    pub fn step(&mut self, current_cost: f64, temperature: f64) -> Result<f64, OptimizerError> {
        self.try_step(current_cost, temperature).map(|(cost, _)| cost)
    }

    fn try_step(
        &mut self,
        current_cost: f64,
        temperature: f64,
    ) -> Result<(f64, bool), OptimizerError> {
        let migration = self.exchange()?;
        let new_cost = self.cost();
        let delta = new_cost - current_cost;

        if delta < 0.0 {
            return Ok((new_cost, true));
        }

        let draw: f64 = self.rng.gen();
        if draw < (-delta / temperature).exp() {
            Ok((new_cost, true))
        } else {
            self.undo(&migration)?;
            Ok((current_cost, false))
        }
    }

    /// Run the annealing schedule described by `params`.
    ///
    /// Stops when `params.max_steps` steps have been budgeted or as soon as
    /// the cost reaches zero.  An assignment that already costs zero is
    /// returned untouched.
    ///
    /// # Errors
    /// [`OptimizerError::Params`] for an invalid schedule, or
    /// [`OptimizerError::Core`] if an ownership invariant breaks.
    pub fn anneal(&mut self, params: &AnnealParams) -> Result<AnnealOutcome, OptimizerError> {
        params.validate()?;

        let mut current = self.cost();
        let mut outcome = AnnealOutcome {
            final_cost: current,
            best_cost: current,
            solved: current == 0.0,
            steps: 0,
            accepted: 0,
            rejected: 0,
            tiers: 0,
            final_temperature: params.t0,
        };

        info!(
            initial_cost = current,
            t0 = params.t0,
            beta0 = params.beta0,
            max_steps = params.max_steps,
            beta = params.beta,
            alpha = params.alpha,
            "=== simulated annealing started ==="
        );

        if outcome.solved {
            info!("initial assignment already optimal — nothing to do");
            return Ok(outcome);
        }

        let mut temperature = params.t0;
        let mut budget = params.initial_budget();
        let mut elapsed = 0u64;

        'search: while elapsed < params.max_steps {
            outcome.tiers += 1;
            outcome.final_temperature = temperature;

            for _ in 0..budget {
                let (cost, accepted) = self.try_step(current, temperature)?;
                outcome.steps += 1;
                if accepted {
                    outcome.accepted += 1;
                } else {
                    outcome.rejected += 1;
                }

                current = cost;
                if current < outcome.best_cost {
                    outcome.best_cost = current;
                }
                if current == 0.0 {
                    outcome.solved = true;
                    break 'search;
                }
            }

            elapsed += budget;
            info!(
                tier = outcome.tiers,
                temperature = temperature,
                elapsed = elapsed,
                max_steps = params.max_steps,
                current_cost = current,
                best_cost = outcome.best_cost,
                "temperature tier finished"
            );

            budget = params.next_budget(budget);
            temperature *= params.alpha;
        }

        outcome.final_cost = current;

        info!(
            solved = outcome.solved,
            final_cost = outcome.final_cost,
            best_cost = outcome.best_cost,
            steps = outcome.steps,
            accepted = outcome.accepted,
            rejected = outcome.rejected,
            tiers = outcome.tiers,
            "=== simulated annealing finished ==="
        );

        Ok(outcome)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
