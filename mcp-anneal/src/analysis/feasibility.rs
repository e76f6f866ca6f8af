/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Utilisation-based schedulability diagnostics.
//!
//! The annealing cost is driven entirely by exact response-time analysis;
//! these checks are **diagnostics only** and are reported by the driver once
//! the search has finished.  They explain *why* a core ended up with
//! unschedulable tasks:
//!
//! * inflated utilisation above `1.0` means the core is overloaded and no
//!   priority order can fix it;
//! * utilisation between the Liu & Layland bound and `1.0` is the grey zone
//!   where only RTA decides.
//!
//! **Liu & Layland (1973)**: `n` independent periodic tasks are guaranteed
//! schedulable under rate-monotonic priorities when
//!
//! $$U = \sum_{i=1}^{n} \frac{C_i}{T_i} \leq n \left(2^{1/n} - 1\right)$$
//!
//! | n | Bound |
//! |---|---|
//! | 1 | 1.000 |
//! | 2 | 0.828 |
//! | 3 | 0.780 |
//! | ∞ | ln(2) ≈ 0.693 |

use super::inflate;
use crate::task::Task;

/// Liu & Layland utilisation bound for `n` tasks: `n × (2^(1/n) − 1)`.
///
/// `1.0` for a single task, `0.0` for none.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// Total utilisation of `tasks` on a core with inflation factor `factor`,
/// using the inflated execution time `ceil(WCET × f) / T`.
pub fn inflated_utilization(tasks: &[Task], factor: f64) -> f64 {
    tasks
        .iter()
        .map(|t| inflate(t.wcet, factor) as f64 / t.period as f64)
        .sum()
}

/// Classification of one core's load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadClass {
    /// `U <= bound(n)`: provably schedulable under rate-monotonic priorities.
    WithinBound,
    /// `bound(n) < U <= 1.0`: may or may not be schedulable.
    Inconclusive { utilization: f64, bound: f64 },
    /// `U > 1.0`: some task must miss its deadline whatever the priorities.
    Overloaded { utilization: f64 },
}

/// Classify the load of `tasks` on a core with inflation factor `factor`.
///
/// An empty task set is trivially [`LoadClass::WithinBound`].
pub fn classify(tasks: &[Task], factor: f64) -> LoadClass {
    if tasks.is_empty() {
        return LoadClass::WithinBound;
    }

    let utilization = inflated_utilization(tasks, factor);
    let bound = liu_layland_bound(tasks.len());

    if utilization > 1.0 {
        LoadClass::Overloaded { utilization }
    } else if utilization > bound {
        LoadClass::Inconclusive { utilization, bound }
    } else {
        LoadClass::WithinBound
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn task(wcet: u64, period: u64) -> Task {
        Task::new(0, wcet, period, period, 0)
    }

    #[test]
    fn bound_zero_tasks_is_zero() {
        assert_eq!(liu_layland_bound(0), 0.0);
    }

    #[test]
    fn bound_one_task_is_one() {
        let b = liu_layland_bound(1);
        assert!((b - 1.0).abs() < 1e-10, "bound(1) should be 1.0, got {b}");
    }

    #[test]
    fn bound_two_tasks_is_approximately_0_828() {
        let b = liu_layland_bound(2);
        assert!((b - 0.8284).abs() < 1e-3, "bound(2) ≈ 0.828, got {b}");
    }

    #[test]
    fn utilization_uses_inflated_wcet() {
        // ceil(3 × 1.5) = 5 → 5/10
        let u = inflated_utilization(&[task(3, 10)], 1.5);
        assert!((u - 0.5).abs() < 1e-12);
    }

    #[test]
    fn classic_three_task_set_is_within_bound() {
        // 0.30 + 0.25 + 0.16 = 0.71 ≤ bound(3) ≈ 0.780
        let tasks = [task(3, 10), task(5, 20), task(8, 50)];
        assert_eq!(classify(&tasks, 1.0), LoadClass::WithinBound);
    }

    #[test]
    fn grey_zone_is_inconclusive() {
        // 0.5 + 0.4 = 0.9, bound(2) ≈ 0.828
        let tasks = [task(5, 10), task(4, 10)];
        assert!(matches!(
            classify(&tasks, 1.0),
            LoadClass::Inconclusive { .. }
        ));
    }

    #[test]
    fn inflation_can_push_a_core_into_overload() {
        let tasks = [task(5, 10), task(4, 10)];
        match classify(&tasks, 1.2) {
            LoadClass::Overloaded { utilization } => {
                // ceil(6) + ceil(4.8) = 6 + 5 → 1.1
                assert!((utilization - 1.1).abs() < 1e-9, "got {utilization}");
            }
            other => panic!("expected overload, got {other:?}"),
        }
    }

    #[test]
    fn empty_core_is_within_bound() {
        assert_eq!(classify(&[], 3.0), LoadClass::WithinBound);
    }
}
