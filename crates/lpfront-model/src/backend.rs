//! The boundary to a numerical solver.
//!
//! A [`Backend`] receives a finished [`Model`] and hands back a
//! [`RawResult`]: a status code plus whatever vectors it computed, indexed by
//! position. Turning that into a [`Solution`](crate::Solution) is the job of
//! [`Solution::normalize`](crate::Solution::normalize), so any backend that
//! speaks these codes can be swapped in.

use crate::config::{SensitivityPolicy, SolverConfig};
use crate::model::Model;

/// Status codes a backend reports. The values follow lp_solve.
pub mod codes {
    pub const NOMEMORY: i32 = -2;
    pub const OPTIMAL: i32 = 0;
    /// Integer search stopped early with an incumbent that is not proven optimal
    pub const SUBOPTIMAL: i32 = 1;
    pub const INFEASIBLE: i32 = 2;
    pub const UNBOUNDED: i32 = 3;
    pub const DEGENERATE: i32 = 4;
    /// Numerical trouble, including running out of pivots
    pub const NUMFAILURE: i32 = 5;
    pub const USERABORT: i32 = 6;
    /// A search limit was reached with nothing to show
    pub const TIMEOUT: i32 = 7;
}

/// Closed interval `[from, to]`; either end may be infinite
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub from: f64,
    pub to: f64,
}

impl Interval {
    pub const UNBOUNDED: Interval = Interval {
        from: f64::NEG_INFINITY,
        to: f64::INFINITY,
    };

    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.from - tolerance && value <= self.to + tolerance
    }
}

/// Ranging tables, one interval per objective coefficient and per row rhs
#[derive(Debug, Clone, PartialEq)]
pub struct RawSensitivity {
    pub objective: Vec<Interval>,
    pub rhs: Vec<Interval>,
    /// Relaxation the tables were read from
    pub policy: SensitivityPolicy,
}

/// Unprocessed backend output, indexed by variable and row position
#[derive(Debug, Clone, PartialEq)]
pub struct RawResult {
    pub code: i32,
    /// One value per variable
    pub values: Option<Vec<f64>>,
    /// One shadow price per row: the change in objective per unit increase of its rhs
    pub duals: Option<Vec<f64>>,
    /// One reduced cost per variable; priced out from `duals` when absent
    pub reduced_costs: Option<Vec<f64>>,
    /// Whether each variable is in the final basis
    pub basic: Option<Vec<bool>>,
    pub sensitivity: Option<RawSensitivity>,
}

impl RawResult {
    /// A result carrying only a status code
    pub fn status(code: i32) -> Self {
        Self {
            code,
            values: None,
            duals: None,
            reduced_costs: None,
            basic: None,
            sensitivity: None,
        }
    }

    pub fn optimal(values: Vec<f64>) -> Self {
        Self {
            values: Some(values),
            ..Self::status(codes::OPTIMAL)
        }
    }

    pub fn with_duals(mut self, duals: Vec<f64>) -> Self {
        self.duals = Some(duals);
        self
    }

    pub fn with_reduced_costs(mut self, reduced_costs: Vec<f64>) -> Self {
        self.reduced_costs = Some(reduced_costs);
        self
    }

    pub fn with_basis(mut self, basic: Vec<bool>) -> Self {
        self.basic = Some(basic);
        self
    }

    pub fn with_sensitivity(mut self, sensitivity: RawSensitivity) -> Self {
        self.sensitivity = Some(sensitivity);
        self
    }
}

/// Solver capability.
///
/// `solve` must be deterministic for an unchanged model and configuration,
/// and must terminate: when it cannot finish it reports a non-success code.
/// Dual values and ranging are only expected when `config.sensitivity` is
/// set, and describe the relaxation named by `config.sensitivity_policy`.
pub trait Backend {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn solve(&self, model: &Model, config: &SolverConfig) -> RawResult;
}

impl<B: Backend + ?Sized> Backend for &B {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, model: &Model, config: &SolverConfig) -> RawResult {
        (**self).solve(model, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_result_constructors() {
        let raw = RawResult::status(codes::INFEASIBLE);
        assert_eq!(raw.code, 2);
        assert!(raw.values.is_none());

        let raw = RawResult::optimal(vec![1.0, 2.0]).with_duals(vec![0.5]);
        assert_eq!(raw.code, codes::OPTIMAL);
        assert_eq!(raw.values, Some(vec![1.0, 2.0]));
        assert_eq!(raw.duals, Some(vec![0.5]));
        assert!(raw.reduced_costs.is_none());
        assert!(raw.basic.is_none());
        assert!(raw.sensitivity.is_none());

        let raw = raw.with_reduced_costs(vec![0.0, -1.0]).with_basis(vec![true, false]);
        assert_eq!(raw.reduced_costs, Some(vec![0.0, -1.0]));
        assert_eq!(raw.basic, Some(vec![true, false]));
    }

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(2.0, 6.0);
        assert!(interval.contains(2.0, 0.0));
        assert!(interval.contains(6.0 + 1e-10, 1e-9));
        assert!(!interval.contains(7.0, 1e-9));
        assert!(Interval::UNBOUNDED.contains(1e300, 0.0));
    }
}
