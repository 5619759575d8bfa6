use std::fmt;

use crate::error::ModelError;

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

impl Sense {
    /// Sign that turns this objective into a maximization
    pub fn sign(self) -> f64 {
        match self {
            Sense::Minimize => -1.0,
            Sense::Maximize => 1.0,
        }
    }

    /// Whether `candidate` strictly improves on `incumbent` by more than `tolerance`
    pub fn improves(self, candidate: f64, incumbent: f64, tolerance: f64) -> bool {
        match self {
            Sense::Minimize => candidate < incumbent - tolerance,
            Sense::Maximize => candidate > incumbent + tolerance,
        }
    }
}

/// Comparison operator of a constraint row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Relation {
    /// The relation obtained by multiplying both sides by -1
    pub fn flipped(self) -> Self {
        match self {
            Relation::Le => Relation::Ge,
            Relation::Ge => Relation::Le,
            Relation::Eq => Relation::Eq,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Relation::Le => "<=",
            Relation::Ge => ">=",
            Relation::Eq => "=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VarType {
    #[default]
    Continuous,
    Integer,
}

/// Closed interval a variable must lie in. Either side may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub const NON_NEGATIVE: Bounds = Bounds {
        lower: 0.0,
        upper: f64::INFINITY,
    };

    pub const FREE: Bounds = Bounds {
        lower: f64::NEG_INFINITY,
        upper: f64::INFINITY,
    };

    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Bounds pinning a variable to a single value
    pub fn fixed(value: f64) -> Self {
        Self {
            lower: value,
            upper: value,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.lower.is_nan()
            && !self.upper.is_nan()
            && self.lower != f64::INFINITY
            && self.upper != f64::NEG_INFINITY
            && self.lower <= self.upper
    }

    pub fn contains(&self, value: f64, tolerance: f64) -> bool {
        value >= self.lower - tolerance && value <= self.upper + tolerance
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::NON_NEGATIVE
    }
}

/// A decision variable. Identity is its position in the model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub var_type: VarType,
    pub bounds: Bounds,
}

impl Variable {
    pub fn continuous() -> Self {
        Self::default()
    }

    pub fn integer() -> Self {
        Self {
            var_type: VarType::Integer,
            bounds: Bounds::NON_NEGATIVE,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.var_type == VarType::Integer
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub sense: Sense,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

impl Constraint {
    /// Left-hand side evaluated at `values`
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Amount by which `values` violates this row, zero when satisfied
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.activity(values);
        match self.relation {
            Relation::Le => (lhs - self.rhs).max(0.0),
            Relation::Ge => (self.rhs - lhs).max(0.0),
            Relation::Eq => (lhs - self.rhs).abs(),
        }
    }
}

/// A linear (or mixed-integer) program.
///
/// Models are only produced by [`Bulk`](crate::Bulk),
/// [`Incremental`](crate::Incremental) or deserialization, all of which run
/// the same structural checks. Once built they are read-only.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ModelParts"))]
pub struct Model {
    pub(crate) variables: Vec<Variable>,
    pub(crate) objective: Objective,
    pub(crate) constraints: Vec<Constraint>,
}

/// Unchecked fields of a deserialized [`Model`]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct ModelParts {
    variables: Vec<Variable>,
    objective: Objective,
    constraints: Vec<Constraint>,
}

#[cfg(feature = "serde")]
impl TryFrom<ModelParts> for Model {
    type Error = ModelError;

    fn try_from(parts: ModelParts) -> Result<Self, Self::Error> {
        let model = Model {
            variables: parts.variables,
            objective: parts.objective,
            constraints: parts.constraints,
        };
        model.validate()?;
        Ok(model)
    }
}

impl Model {
    pub(crate) fn empty(columns: usize, row_capacity: usize) -> Self {
        Self {
            variables: vec![Variable::continuous(); columns],
            objective: Objective {
                coefficients: vec![0.0; columns],
                sense: Sense::Minimize,
            },
            constraints: Vec::with_capacity(row_capacity),
        }
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.objective.sense
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index)
    }

    /// Bounds of every variable, in column order
    pub fn bounds(&self) -> Vec<Bounds> {
        self.variables.iter().map(|v| v.bounds).collect()
    }

    /// True when at least one variable is integer-restricted
    pub fn is_mip(&self) -> bool {
        self.variables.iter().any(Variable::is_integer)
    }

    /// Objective function evaluated at `values`
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(coef, value)| coef * value)
            .sum()
    }

    /// Cost of each variable minus the value of its column priced at `duals`
    pub fn reduced_costs(&self, duals: &[f64]) -> Vec<f64> {
        self.objective
            .coefficients
            .iter()
            .enumerate()
            .map(|(j, &cost)| {
                let priced: f64 = self
                    .constraints
                    .iter()
                    .zip(duals)
                    .map(|(c, y)| y * c.coefficients[j])
                    .sum();
                cost - priced
            })
            .collect()
    }

    /// Check a point against every row, bound, and integrality restriction.
    ///
    /// Violations are returned worst first.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<Violation> {
        let mut violations = Vec::new();

        for (i, c) in self.constraints.iter().enumerate() {
            let amount = c.violation(values);
            if amount > tolerance {
                violations.push(Violation {
                    kind: ViolationKind::Constraint(i),
                    required: c.rhs,
                    actual: c.activity(values),
                    amount,
                });
            }
        }

        for (j, (var, &value)) in self.variables.iter().zip(values).enumerate() {
            if !var.bounds.contains(value, tolerance) {
                violations.push(if value < var.bounds.lower {
                    Violation {
                        kind: ViolationKind::LowerBound(j),
                        required: var.bounds.lower,
                        actual: value,
                        amount: var.bounds.lower - value,
                    }
                } else {
                    Violation {
                        kind: ViolationKind::UpperBound(j),
                        required: var.bounds.upper,
                        actual: value,
                        amount: value - var.bounds.upper,
                    }
                });
            }
            if var.is_integer() && (value - value.round()).abs() > tolerance {
                violations.push(Violation {
                    kind: ViolationKind::Integrality(j),
                    required: value.round(),
                    actual: value,
                    amount: (value - value.round()).abs(),
                });
            }
        }

        violations.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        violations
    }

    /// Structural checks shared by both builders
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(ModelError::EmptyModel);
        }
        if self.objective.coefficients.len() != n {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }
        check_finite(&self.objective.coefficients)?;

        for (j, var) in self.variables.iter().enumerate() {
            if !var.bounds.is_valid() {
                return Err(ModelError::InvalidBounds {
                    variable: j,
                    lower: var.bounds.lower,
                    upper: var.bounds.upper,
                });
            }
        }

        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(ModelError::DimensionMismatch {
                    expected: n,
                    found: c.coefficients.len(),
                });
            }
            check_finite(&c.coefficients)?;
            check_finite(&[c.rhs])?;
        }

        Ok(())
    }
}

pub(crate) fn check_finite(values: &[f64]) -> Result<(), ModelError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(ModelError::InvalidCoefficient { value }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Constraint(usize),
    LowerBound(usize),
    UpperBound(usize),
    Integrality(usize),
}

/// A requirement a candidate point fails to meet
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Required value (rhs, bound, or nearest integer)
    pub required: f64,
    /// Value achieved by the point
    pub actual: f64,
    /// How far off the point is
    pub amount: f64,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ViolationKind::Constraint(i) => write!(
                f,
                "row {} evaluates to {:.4}, required {:.4} (off by {:.4})",
                i, self.actual, self.required, self.amount
            ),
            ViolationKind::LowerBound(j) => write!(
                f,
                "column {} is {:.4}, below lower bound {:.4}",
                j, self.actual, self.required
            ),
            ViolationKind::UpperBound(j) => write!(
                f,
                "column {} is {:.4}, above upper bound {:.4}",
                j, self.actual, self.required
            ),
            ViolationKind::Integrality(j) => {
                write!(f, "column {} is {:.4}, not integral", j, self.actual)
            }
        }
    }
}
