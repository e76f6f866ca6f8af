/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Annealing schedule parameters.

use serde::{Deserialize, Serialize};

use super::error::ParamsError;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Initial temperature `T0`.
pub const DEFAULT_T0: f64 = 35.0;

/// Fraction `β0` of `max_steps` spent at the initial temperature.
pub const DEFAULT_BETA0: f64 = 0.001;

/// Total step budget.
pub const DEFAULT_MAX_STEPS: u64 = 30_000_000;

/// Growth `β` of the per-temperature budget from one tier to the next.
pub const DEFAULT_BETA: f64 = 1.1;

/// Geometric cooling factor `α`.
pub const DEFAULT_ALPHA: f64 = 0.90;

// ── AnnealParams ──────────────────────────────────────────────────────────────

/// The five knobs of the annealing schedule.
///
/// The first temperature tier runs `floor(β0 × max_steps)` steps at `T0`;
/// each following tier runs `β` times as many steps at `α` times the
/// temperature, until `max_steps` have been spent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnealParams {
    pub t0: f64,
    pub beta0: f64,
    pub max_steps: u64,
    pub beta: f64,
    pub alpha: f64,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            t0: DEFAULT_T0,
            beta0: DEFAULT_BETA0,
            max_steps: DEFAULT_MAX_STEPS,
            beta: DEFAULT_BETA,
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl AnnealParams {
    /// Check every parameter range.
    ///
    /// # Errors
    /// The first [`ParamsError`] found, in declaration order.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.t0.is_finite() && self.t0 > 0.0) {
            return Err(ParamsError::Temperature(self.t0));
        }
        if !(self.beta0 > 0.0 && self.beta0 <= 1.0) {
            return Err(ParamsError::InitialFraction(self.beta0));
        }
        if self.max_steps == 0 {
            return Err(ParamsError::NoSteps);
        }
        if !(self.beta.is_finite() && self.beta >= 1.0) {
            return Err(ParamsError::Growth(self.beta));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ParamsError::Cooling(self.alpha));
        }
        Ok(())
    }

    /// Step budget of the first temperature tier, never below one.
    pub fn initial_budget(&self) -> u64 {
        ((self.beta0 * self.max_steps as f64).floor() as u64).max(1)
    }

    /// Step budget of the tier following one that ran `budget` steps.
    pub fn next_budget(&self, budget: u64) -> u64 {
        ((self.beta * budget as f64).floor() as u64).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let p = AnnealParams::default();
        assert!(p.validate().is_ok());
        assert_eq!(p.initial_budget(), 30_000);
    }

    #[test]
    fn budget_grows_by_beta_and_floors() {
        let p = AnnealParams::default();
        assert_eq!(p.next_budget(30_000), 33_000);
        assert_eq!(p.next_budget(15), 16); // 16.5 → 16
    }

    #[test]
    fn tiny_budgets_never_reach_zero() {
        let p = AnnealParams {
            beta0: 0.001,
            max_steps: 10,
            ..Default::default()
        };
        assert_eq!(p.initial_budget(), 1);
        assert_eq!(p.next_budget(1), 1);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let base = AnnealParams::default();

        let p = AnnealParams { t0: 0.0, ..base };
        assert_eq!(p.validate(), Err(ParamsError::Temperature(0.0)));

        let p = AnnealParams { beta0: 1.5, ..base };
        assert_eq!(p.validate(), Err(ParamsError::InitialFraction(1.5)));

        let p = AnnealParams { max_steps: 0, ..base };
        assert_eq!(p.validate(), Err(ParamsError::NoSteps));

        let p = AnnealParams { beta: 0.5, ..base };
        assert_eq!(p.validate(), Err(ParamsError::Growth(0.5)));

        let p = AnnealParams { alpha: 1.0, ..base };
        assert_eq!(p.validate(), Err(ParamsError::Cooling(1.0)));
    }

    #[test]
    fn nan_temperature_is_rejected() {
        let p = AnnealParams {
            t0: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(ParamsError::Temperature(_))));
    }
}
