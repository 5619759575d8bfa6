//! Per-solve configuration.

/// Which linear program dual values and ranging are read from when the model
/// has integer variables.
///
/// Duals and ranging are only well defined for a linear program, so for a
/// MILP one of two relaxations has to stand in. They answer different
/// questions and usually disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SensitivityPolicy {
    /// The LP solved at the branch-and-bound node that produced the
    /// incumbent, with that node's branching bounds in place. Its optimum is
    /// the reported integer solution.
    #[default]
    IncumbentRelaxation,
    /// The root LP relaxation, with integrality dropped entirely.
    IgnoreIntegrality,
}

impl SensitivityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            SensitivityPolicy::IncumbentRelaxation => "incumbent_relaxation",
            SensitivityPolicy::IgnoreIntegrality => "ignore_integrality",
        }
    }
}

/// Configuration options for a single solve.
///
/// There is no global solver state; every call to [`solve`](crate::solve)
/// takes its own configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Request dual values, reduced costs, and ranging
    pub sensitivity: bool,
    /// Relaxation used for sensitivity on integer models
    pub sensitivity_policy: SensitivityPolicy,
    /// Pivot limit for each LP solve
    pub max_iterations: usize,
    /// Node limit for branch-and-bound
    pub max_nodes: usize,
    /// Tolerance for floating point comparisons
    pub tolerance: f64,
    /// Distance from an integer below which a value counts as integral
    pub integrality_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            sensitivity: false,
            sensitivity_policy: SensitivityPolicy::default(),
            max_iterations: 10000,
            max_nodes: 10000,
            tolerance: 1e-9,
            integrality_tolerance: 1e-6,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensitivity(mut self, enabled: bool) -> Self {
        self.sensitivity = enabled;
        self
    }

    pub fn with_sensitivity_policy(mut self, policy: SensitivityPolicy) -> Self {
        self.sensitivity_policy = policy;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }
}
