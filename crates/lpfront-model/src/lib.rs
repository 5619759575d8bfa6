//! Solver-agnostic front end for linear and mixed-integer programs.
//!
//! A [`Model`] is built either in one shot with [`Bulk`] or row by row with
//! [`Incremental`], handed to any [`Backend`] through [`solve`], and comes
//! back as a [`Solution`] with named values and, on request, dual values and
//! sensitivity ranges.

mod backend;
mod builder;
mod config;
mod error;
mod labels;
mod model;
mod solution;
mod solve;

pub use backend::{codes, Backend, Interval, RawResult, RawSensitivity};
pub use builder::{bulk, Bulk, Incremental};
pub use config::{SensitivityPolicy, SolverConfig};
pub use error::ModelError;
pub use labels::Labels;
pub use model::{Bounds, Constraint, Model, Objective, Relation, Sense, VarType, Variable, Violation, ViolationKind};
pub use solution::{
    Duals, ReducedCost, Sensitivity, SensitivityRange, ShadowPrice, Solution, SolutionStatus, VariableValue,
};
pub use solve::solve;
