//! Dense two-phase simplex backend for `lpfront-model`.
//!
//! Continuous models are solved directly. Models with integer variables go
//! through depth-first branch-and-bound, and their dual values and ranging
//! come from the LP named by [`SensitivityPolicy`]: by default the LP at the
//! node that produced the incumbent, otherwise the root relaxation.

mod branch;
mod sensitivity;
mod standard_form;
mod tableau;

use lpfront_model::{codes, Backend, Bounds, Model, RawResult, RawSensitivity, SensitivityPolicy, SolverConfig};
use tracing::{debug, warn};

use crate::branch::{BranchAndBound, Outcome};
use crate::standard_form::StandardForm;
use crate::tableau::{Relaxation, Simplex, Tableau};

/// Simplex solver for linear and mixed-integer programs
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexBackend;

impl SimplexBackend {
    pub fn new() -> Self {
        Self
    }

    fn solve_lp(&self, model: &Model, config: &SolverConfig, simplex: &Simplex) -> RawResult {
        let form = StandardForm::new(model, &model.bounds());
        match simplex.solve(&form) {
            Relaxation::Optimal(tableau) => {
                let raw = RawResult::optimal(form.recover(&tableau.column_values()));
                if config.sensitivity {
                    attach_sensitivity(raw, &tableau, &form, model, simplex, config.sensitivity_policy)
                } else {
                    raw
                }
            }
            Relaxation::Infeasible => RawResult::status(codes::INFEASIBLE),
            Relaxation::Unbounded => RawResult::status(codes::UNBOUNDED),
            Relaxation::IterationLimit => iteration_limit(config),
        }
    }

    fn solve_mip(&self, model: &Model, config: &SolverConfig, simplex: &Simplex) -> RawResult {
        let search = BranchAndBound::new(model, simplex, config.max_nodes, config.integrality_tolerance);
        let incumbent = match search.run() {
            Outcome::Optimal(incumbent) => incumbent,
            Outcome::Infeasible => return RawResult::status(codes::INFEASIBLE),
            Outcome::Unbounded => return RawResult::status(codes::UNBOUNDED),
            Outcome::IterationLimit => return iteration_limit(config),
            Outcome::NodeLimit(Some(incumbent)) => {
                return RawResult {
                    values: Some(incumbent.values),
                    ..RawResult::status(codes::SUBOPTIMAL)
                };
            }
            Outcome::NodeLimit(None) => return RawResult::status(codes::TIMEOUT),
        };

        let raw = RawResult::optimal(incumbent.values);
        if !config.sensitivity {
            return raw;
        }

        let bounds: Vec<Bounds> = match config.sensitivity_policy {
            SensitivityPolicy::IncumbentRelaxation => incumbent.bounds,
            SensitivityPolicy::IgnoreIntegrality => model.bounds(),
        };
        let form = StandardForm::new(model, &bounds);
        match simplex.solve(&form) {
            Relaxation::Optimal(tableau) => {
                attach_sensitivity(raw, &tableau, &form, model, simplex, config.sensitivity_policy)
            }
            other => {
                warn!(
                    component = "backend",
                    operation = "sensitivity",
                    status = "error",
                    policy = config.sensitivity_policy.as_str(),
                    outcome = ?other,
                    "Relaxation for sensitivity did not solve to optimality"
                );
                raw
            }
        }
    }
}

impl Backend for SimplexBackend {
    fn name(&self) -> &'static str {
        "simplex"
    }

    fn solve(&self, model: &Model, config: &SolverConfig) -> RawResult {
        let simplex = Simplex::new(config);
        let raw = if model.is_mip() {
            self.solve_mip(model, config, &simplex)
        } else {
            self.solve_lp(model, config, &simplex)
        };

        debug!(
            component = "backend",
            operation = "solve",
            status = "success",
            mip = model.is_mip(),
            code = raw.code,
            "Backend finished"
        );
        raw
    }
}

fn attach_sensitivity(
    raw: RawResult,
    tableau: &Tableau,
    form: &StandardForm,
    model: &Model,
    simplex: &Simplex,
    policy: SensitivityPolicy,
) -> RawResult {
    let tolerance = simplex.tolerance();
    let duals = sensitivity::duals(tableau, form);
    raw.with_reduced_costs(model.reduced_costs(&duals))
        .with_duals(duals)
        .with_basis(sensitivity::basis(tableau, form))
        .with_sensitivity(RawSensitivity {
            objective: sensitivity::objective_ranges(tableau, form, model, tolerance),
            rhs: sensitivity::rhs_ranges(tableau, form, model, tolerance),
            policy,
        })
}

fn iteration_limit(config: &SolverConfig) -> RawResult {
    warn!(
        component = "backend",
        operation = "solve",
        status = "iteration_limit",
        max_iterations = config.max_iterations,
        "Simplex iteration limit reached"
    );
    RawResult::status(codes::NUMFAILURE)
}
