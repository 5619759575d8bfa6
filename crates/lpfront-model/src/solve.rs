use tracing::debug;

use crate::backend::Backend;
use crate::config::SolverConfig;
use crate::labels::Labels;
use crate::model::Model;
use crate::solution::Solution;

/// Run one model through a backend and normalize the result.
///
/// Infeasible, unbounded, and failed solves come back as a [`Solution`]
/// status rather than an error. The model is only read, so the same model
/// may be solved again (or concurrently from several threads) and gives the
/// same answer each time for a deterministic backend.
pub fn solve<B: Backend>(model: &Model, backend: B, config: &SolverConfig, labels: &Labels) -> Solution {
    debug!(
        component = "solve",
        operation = "start",
        status = "started",
        backend = backend.name(),
        variables = model.num_variables(),
        constraints = model.num_constraints(),
        sensitivity = config.sensitivity,
        "Solving model"
    );

    let raw = backend.solve(model, config);
    let code = raw.code;
    let solution = Solution::normalize(raw, model, labels);

    debug!(
        component = "solve",
        operation = "finish",
        status = solution.status.as_str(),
        backend = backend.name(),
        code,
        objective = solution.objective_value,
        "Solve finished"
    );

    solution
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::backend::{codes, RawResult};
    use crate::builder::bulk;
    use crate::model::{Relation, Sense};
    use crate::solution::SolutionStatus;

    /// Backend that replays a canned result and counts calls
    struct Canned {
        result: RawResult,
        calls: Cell<usize>,
    }

    impl Backend for Canned {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn solve(&self, _model: &Model, _config: &SolverConfig) -> RawResult {
            self.calls.set(self.calls.get() + 1);
            self.result.clone()
        }
    }

    fn model() -> Model {
        bulk(
            Sense::Minimize,
            vec![1.0, 1.0],
            vec![vec![1.0, 1.0]],
            vec![Relation::Ge],
            vec![2.0],
        )
        .unwrap()
    }

    #[test]
    fn test_solve_normalizes_backend_output() {
        let backend = Canned {
            result: RawResult::optimal(vec![1.5, 0.5]),
            calls: Cell::new(0),
        };
        let labels = Labels::new().with_variables(["a", "b"]);
        let solution = solve(&model(), &backend, &SolverConfig::new(), &labels);

        assert_eq!(backend.calls.get(), 1);
        assert_eq!(solution.objective_value, Some(2.0));
        assert_eq!(solution.value("a"), Some(1.5));
    }

    #[test]
    fn test_solve_passes_failure_codes_through() {
        let backend = Canned {
            result: RawResult::status(codes::TIMEOUT),
            calls: Cell::new(0),
        };
        let solution = solve(&model(), &backend, &SolverConfig::new(), &Labels::new());
        assert_eq!(solution.status, SolutionStatus::SolverError { code: codes::TIMEOUT });
        assert!(solution.values.is_none());
    }
}
