use std::fmt;

use tracing::warn;

use crate::backend::{codes, RawResult};
use crate::config::SensitivityPolicy;
use crate::labels::Labels;
use crate::model::Model;

/// The result of solving a model.
///
/// Everything except `status` is `None` unless the status is
/// [`SolutionStatus::Optimal`]; a failed solve never carries zero-filled or
/// partial data. The solution owns all of its data and holds no reference
/// back to the model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Solution status
    pub status: SolutionStatus,
    /// Optimal values for each variable, in column order
    pub values: Option<Vec<VariableValue>>,
    /// Optimal objective value
    pub objective_value: Option<f64>,
    /// Shadow prices and reduced costs, when requested
    pub duals: Option<Duals>,
    /// Ranging for objective coefficients and rhs values, when requested
    pub sensitivity: Option<Sensitivity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolutionStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The backend failed or stopped early; `code` is what it reported
    SolverError { code: i32 },
}

impl SolutionStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Unbounded => "unbounded",
            SolutionStatus::SolverError { .. } => "solver_error",
        }
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::SolverError { code } => write!(f, "{} (code {})", self.as_str(), code),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableValue {
    pub name: String,
    pub value: f64,
}

/// Dual information of an optimal solution
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Duals {
    /// Shadow prices (dual values) for each constraint.
    /// Indicates how much the objective changes per unit increase of the rhs
    pub constraints: Vec<ShadowPrice>,
    /// Reduced costs for each variable: its cost minus the priced-out value
    /// of the rows it appears in
    pub variables: Vec<ReducedCost>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShadowPrice {
    pub constraint: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReducedCost {
    pub variable: String,
    pub reduced_cost: f64,
    /// Whether the variable is in the final basis, when the backend reports it
    pub is_basic: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensitivity {
    /// Relaxation these ranges were computed on
    pub policy: SensitivityPolicy,
    /// Sensitivity ranges for objective coefficients
    pub objective: Vec<SensitivityRange>,
    /// Sensitivity ranges for constraint rhs values
    pub rhs: Vec<SensitivityRange>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensitivityRange {
    /// Variable or constraint name
    pub name: String,
    /// Current value
    pub current: f64,
    /// Lowest value at which the current basis stays optimal
    pub from: f64,
    /// Highest value at which the current basis stays optimal
    pub to: f64,
}

impl Solution {
    /// A solution with only a status
    pub fn empty(status: SolutionStatus) -> Self {
        Self {
            status,
            values: None,
            objective_value: None,
            duals: None,
            sensitivity: None,
        }
    }

    /// Translate backend output into a solution, attaching names.
    ///
    /// OPTIMAL maps to optimal, INFEASIBLE to infeasible, UNBOUNDED to
    /// unbounded; every other code becomes a solver error carrying it. An
    /// OPTIMAL result whose vectors do not fit the model is also a solver
    /// error.
    pub fn normalize(raw: RawResult, model: &Model, labels: &Labels) -> Self {
        match raw.code {
            codes::OPTIMAL => {
                let code = raw.code;
                Self::from_optimal(raw, model, labels).unwrap_or_else(|reason| {
                    warn!(
                        component = "solution",
                        operation = "normalize",
                        status = "error",
                        code,
                        reason = reason.as_str(),
                        "Discarding malformed backend result"
                    );
                    Self::empty(SolutionStatus::SolverError { code })
                })
            }
            codes::INFEASIBLE => Self::empty(SolutionStatus::Infeasible),
            codes::UNBOUNDED => Self::empty(SolutionStatus::Unbounded),
            code => Self::empty(SolutionStatus::SolverError { code }),
        }
    }

    fn from_optimal(raw: RawResult, model: &Model, labels: &Labels) -> Result<Self, String> {
        let n = model.num_variables();
        let m = model.num_constraints();

        let values = raw.values.ok_or("optimal result without values")?;
        check_vector("values", &values, n)?;
        let objective_value = model.objective_value(&values);

        let duals = match raw.duals {
            Some(duals) => {
                check_vector("duals", &duals, m)?;
                let reduced_costs = match raw.reduced_costs {
                    Some(reduced_costs) => {
                        check_vector("reduced costs", &reduced_costs, n)?;
                        reduced_costs
                    }
                    None => model.reduced_costs(&duals),
                };
                if let Some(basic) = &raw.basic {
                    if basic.len() != n {
                        return Err(format!("basis has {} entries, expected {}", basic.len(), n));
                    }
                }
                Some(price_out(labels, &duals, &reduced_costs, raw.basic.as_deref()))
            }
            None => None,
        };

        let sensitivity = match raw.sensitivity {
            Some(table) => {
                if table.objective.len() != n || table.rhs.len() != m {
                    return Err(format!(
                        "ranging has {}x{} entries, expected {}x{}",
                        table.objective.len(),
                        table.rhs.len(),
                        n,
                        m
                    ));
                }
                if table
                    .objective
                    .iter()
                    .chain(&table.rhs)
                    .any(|r| r.from.is_nan() || r.to.is_nan() || r.from > r.to)
                {
                    return Err("ranging contains an empty interval".to_string());
                }

                let objective = table
                    .objective
                    .iter()
                    .enumerate()
                    .map(|(j, r)| SensitivityRange {
                        name: labels.variable(j),
                        current: model.objective().coefficients[j],
                        from: r.from,
                        to: r.to,
                    })
                    .collect();
                let rhs = table
                    .rhs
                    .iter()
                    .zip(model.constraints())
                    .enumerate()
                    .map(|(i, (r, c))| SensitivityRange {
                        name: labels.constraint(i),
                        current: c.rhs,
                        from: r.from,
                        to: r.to,
                    })
                    .collect();

                Some(Sensitivity {
                    policy: table.policy,
                    objective,
                    rhs,
                })
            }
            None => None,
        };

        let values = values
            .into_iter()
            .enumerate()
            .map(|(j, value)| VariableValue {
                name: labels.variable(j),
                value,
            })
            .collect();

        Ok(Self {
            status: SolutionStatus::Optimal,
            values: Some(values),
            objective_value: Some(objective_value),
            duals,
            sensitivity,
        })
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Value of the variable with the given name
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values
            .as_ref()?
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value)
    }

    /// Value of the variable at the given column
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.as_ref()?.get(index).map(|v| v.value)
    }

    /// Values in column order, without names
    pub fn value_vector(&self) -> Option<Vec<f64>> {
        self.values
            .as_ref()
            .map(|values| values.iter().map(|v| v.value).collect())
    }

    /// Shadow price of the constraint with the given name
    pub fn shadow_price(&self, name: &str) -> Option<f64> {
        self.duals
            .as_ref()?
            .constraints
            .iter()
            .find(|sp| sp.constraint == name)
            .map(|sp| sp.value)
    }

    /// Names of constraints whose shadow price is non-zero
    pub fn binding_constraints(&self, tolerance: f64) -> Vec<&str> {
        match &self.duals {
            Some(duals) => duals
                .constraints
                .iter()
                .filter(|sp| sp.value.abs() > tolerance)
                .map(|sp| sp.constraint.as_str())
                .collect(),
            None => Vec::new(),
        }
    }
}

fn check_vector(what: &str, values: &[f64], expected: usize) -> Result<(), String> {
    if values.len() != expected {
        return Err(format!(
            "{} has {} entries, expected {}",
            what,
            values.len(),
            expected
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(format!("{} contains a non-finite entry", what));
    }
    Ok(())
}

fn price_out(labels: &Labels, duals: &[f64], reduced_costs: &[f64], basic: Option<&[bool]>) -> Duals {
    let constraints = duals
        .iter()
        .enumerate()
        .map(|(i, &value)| ShadowPrice {
            constraint: labels.constraint(i),
            value,
        })
        .collect();

    let variables = reduced_costs
        .iter()
        .enumerate()
        .map(|(j, &reduced_cost)| ReducedCost {
            variable: labels.variable(j),
            reduced_cost,
            is_basic: basic.map(|b| b[j]),
        })
        .collect();

    Duals {
        constraints,
        variables,
    }
}
