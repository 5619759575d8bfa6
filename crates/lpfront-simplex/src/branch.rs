use lpfront_model::{Bounds, Model};
use tracing::{debug, trace, warn};

use crate::standard_form::StandardForm;
use crate::tableau::{Relaxation, Simplex};

/// Best integer-feasible point found so far
#[derive(Debug, Clone)]
pub(crate) struct Incumbent {
    /// Values with integer variables snapped to the nearest integer
    pub values: Vec<f64>,
    pub objective: f64,
    /// Variable bounds of the node whose LP produced this point
    pub bounds: Vec<Bounds>,
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Optimal(Incumbent),
    Infeasible,
    Unbounded,
    IterationLimit,
    /// Search stopped before the tree was exhausted
    NodeLimit(Option<Incumbent>),
}

/// Depth-first branch-and-bound on the most fractional integer variable
pub(crate) struct BranchAndBound<'a> {
    model: &'a Model,
    simplex: &'a Simplex,
    max_nodes: usize,
    integrality_tolerance: f64,
}

impl<'a> BranchAndBound<'a> {
    pub fn new(model: &'a Model, simplex: &'a Simplex, max_nodes: usize, integrality_tolerance: f64) -> Self {
        Self {
            model,
            simplex,
            max_nodes,
            integrality_tolerance,
        }
    }

    pub fn run(&self) -> Outcome {
        let sense = self.model.sense();
        let mut stack = vec![self.model.bounds()];
        let mut incumbent: Option<Incumbent> = None;
        let mut nodes = 0;

        while let Some(bounds) = stack.pop() {
            nodes += 1;
            if nodes > self.max_nodes {
                warn!(
                    component = "branch",
                    operation = "search",
                    status = "node_limit",
                    nodes = self.max_nodes,
                    has_incumbent = incumbent.is_some(),
                    "Node limit reached"
                );
                return Outcome::NodeLimit(incumbent);
            }

            let form = StandardForm::new(self.model, &bounds);
            let tableau = match self.simplex.solve(&form) {
                Relaxation::Optimal(t) => t,
                Relaxation::Infeasible => continue,
                Relaxation::Unbounded => return Outcome::Unbounded,
                Relaxation::IterationLimit => return Outcome::IterationLimit,
            };
            let values = form.recover(&tableau.column_values());
            let objective = self.model.objective_value(&values);

            // Prune if LP relaxation is no better than best known
            if let Some(best) = &incumbent {
                if !sense.improves(objective, best.objective, self.simplex.tolerance()) {
                    continue;
                }
            }

            let Some(j) = self.branching_variable(&values) else {
                let values: Vec<f64> = values
                    .iter()
                    .zip(self.model.variables())
                    .map(|(&x, var)| if var.is_integer() { x.round() } else { x })
                    .collect();
                let objective = self.model.objective_value(&values);
                trace!(
                    component = "branch",
                    operation = "incumbent",
                    status = "success",
                    node = nodes,
                    objective,
                    "New incumbent"
                );
                incumbent = Some(Incumbent {
                    values,
                    objective,
                    bounds,
                });
                continue;
            };

            let x = values[j];
            let Bounds { lower, upper } = bounds[j];
            trace!(
                component = "branch",
                operation = "branch",
                status = "success",
                node = nodes,
                variable = j,
                value = x,
                "Branching"
            );

            // Down branch is pushed last so it is explored first
            if x.ceil() <= upper {
                let mut up = bounds.clone();
                up[j] = Bounds::new(x.ceil(), upper);
                stack.push(up);
            }
            if x.floor() >= lower {
                let mut down = bounds;
                down[j] = Bounds::new(lower, x.floor());
                stack.push(down);
            }
        }

        debug!(
            component = "branch",
            operation = "search",
            status = if incumbent.is_some() { "optimal" } else { "infeasible" },
            nodes,
            "Search finished"
        );

        match incumbent {
            Some(best) => Outcome::Optimal(best),
            None => Outcome::Infeasible,
        }
    }

    /// Integer variable furthest from an integer, ties going to the lowest index
    fn branching_variable(&self, values: &[f64]) -> Option<usize> {
        let mut max_fractionality = self.integrality_tolerance;
        let mut branch_var = None;

        for (j, (var, &x)) in self.model.variables().iter().zip(values).enumerate() {
            if var.is_integer() {
                let fractionality = (x - x.round()).abs();
                if fractionality > max_fractionality {
                    max_fractionality = fractionality;
                    branch_var = Some(j);
                }
            }
        }

        branch_var
    }
}
