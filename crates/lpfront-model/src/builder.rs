//! The two ways of constructing a [`Model`].
//!
//! [`Bulk`] takes the whole problem at once (objective vector, constraint
//! matrix, relation and rhs vectors) and validates it in one go.
//! [`Incremental`] starts from dimensions and accepts the objective and the
//! rows one call at a time. Fed the same rows in the same order, both produce
//! equal models, so nothing downstream needs to know which one was used.

use tracing::{debug, trace};

use crate::error::ModelError;
use crate::model::{check_finite, Bounds, Constraint, Model, Objective, Relation, Sense, VarType};

#[derive(Debug, Clone)]
enum Override {
    Type(usize, VarType),
    Bounds(usize, Bounds),
    AllInteger,
}

/// One-shot construction from a dense matrix.
///
/// ```
/// use lpfront_model::{Bulk, Relation, Sense};
///
/// let model = Bulk::new(
///     Sense::Maximize,
///     vec![3.0, 5.0],
///     vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![3.0, 2.0]],
///     vec![Relation::Le; 3],
///     vec![4.0, 12.0, 18.0],
/// )
/// .build()
/// .unwrap();
/// assert_eq!(model.num_constraints(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Bulk {
    sense: Sense,
    objective: Vec<f64>,
    matrix: Vec<Vec<f64>>,
    relations: Vec<Relation>,
    rhs: Vec<f64>,
    overrides: Vec<Override>,
}

impl Bulk {
    pub fn new(
        sense: Sense,
        objective: Vec<f64>,
        matrix: Vec<Vec<f64>>,
        relations: Vec<Relation>,
        rhs: Vec<f64>,
    ) -> Self {
        Self {
            sense,
            objective,
            matrix,
            relations,
            rhs,
            overrides: Vec::new(),
        }
    }

    /// Set the type of one variable. Later calls for the same variable win.
    pub fn var_type(mut self, variable: usize, var_type: VarType) -> Self {
        self.overrides.push(Override::Type(variable, var_type));
        self
    }

    pub fn integer(self, variable: usize) -> Self {
        self.var_type(variable, VarType::Integer)
    }

    pub fn integers(mut self, variables: impl IntoIterator<Item = usize>) -> Self {
        for variable in variables {
            self.overrides.push(Override::Type(variable, VarType::Integer));
        }
        self
    }

    /// Restrict every variable to integral values
    pub fn all_integer(mut self) -> Self {
        self.overrides.push(Override::AllInteger);
        self
    }

    /// Set the bounds of one variable. Later calls for the same variable win.
    pub fn bounds(mut self, variable: usize, bounds: Bounds) -> Self {
        self.overrides.push(Override::Bounds(variable, bounds));
        self
    }

    /// Validate everything and produce the model. Nothing is built on failure.
    pub fn build(self) -> Result<Model, ModelError> {
        let n = self.objective.len();
        let m = self.matrix.len();

        if self.relations.len() != m {
            return Err(ModelError::ShapeMismatch {
                what: "relations".to_string(),
                expected: m,
                found: self.relations.len(),
            });
        }
        if self.rhs.len() != m {
            return Err(ModelError::ShapeMismatch {
                what: "rhs".to_string(),
                expected: m,
                found: self.rhs.len(),
            });
        }
        for (i, row) in self.matrix.iter().enumerate() {
            if row.len() != n {
                return Err(ModelError::ShapeMismatch {
                    what: format!("matrix row {}", i),
                    expected: n,
                    found: row.len(),
                });
            }
        }

        let mut model = Model::empty(n, m);
        model.objective = Objective {
            coefficients: self.objective,
            sense: self.sense,
        };

        for o in self.overrides {
            match o {
                Override::Type(j, var_type) => {
                    model
                        .variables
                        .get_mut(j)
                        .ok_or(ModelError::UnknownVariable(j))?
                        .var_type = var_type;
                }
                Override::Bounds(j, bounds) => {
                    model
                        .variables
                        .get_mut(j)
                        .ok_or(ModelError::UnknownVariable(j))?
                        .bounds = bounds;
                }
                Override::AllInteger => {
                    for var in &mut model.variables {
                        var.var_type = VarType::Integer;
                    }
                }
            }
        }

        model.constraints = self
            .matrix
            .into_iter()
            .zip(self.relations)
            .zip(self.rhs)
            .map(|((coefficients, relation), rhs)| Constraint {
                coefficients,
                relation,
                rhs,
            })
            .collect();

        model.validate()?;

        debug!(
            component = "builder",
            operation = "bulk",
            status = "success",
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            mip = model.is_mip(),
            "Built model"
        );

        Ok(model)
    }
}

/// Shorthand for [`Bulk::new`] followed by [`Bulk::build`] with no overrides
pub fn bulk(
    sense: Sense,
    objective: Vec<f64>,
    matrix: Vec<Vec<f64>>,
    relations: Vec<Relation>,
    rhs: Vec<f64>,
) -> Result<Model, ModelError> {
    Bulk::new(sense, objective, matrix, relations, rhs).build()
}

/// Row-at-a-time construction.
///
/// The column count is fixed up front; the row count is only a capacity
/// hint and more rows may be appended. The objective must be added exactly
/// once. Rows keep the order they were added in, so the first row added is
/// constraint 0.
#[derive(Debug, Clone)]
pub struct Incremental {
    model: Model,
    objective_set: bool,
}

impl Incremental {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            model: Model::empty(columns, rows),
            objective_set: false,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.model.num_variables()
    }

    pub fn num_constraints(&self) -> usize {
        self.model.num_constraints()
    }

    fn check_length(&self, coefficients: &[f64]) -> Result<(), ModelError> {
        let n = self.num_variables();
        if coefficients.len() != n {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                found: coefficients.len(),
            });
        }
        check_finite(coefficients)
    }

    pub fn add_objective(&mut self, sense: Sense, coefficients: Vec<f64>) -> Result<(), ModelError> {
        if self.objective_set {
            return Err(ModelError::ObjectiveAlreadySet);
        }
        self.check_length(&coefficients)?;

        self.model.objective = Objective {
            coefficients,
            sense,
        };
        self.objective_set = true;
        Ok(())
    }

    /// Append a row and return its index
    pub fn add_constraint(
        &mut self,
        coefficients: Vec<f64>,
        relation: Relation,
        rhs: f64,
    ) -> Result<usize, ModelError> {
        self.check_length(&coefficients)?;
        check_finite(&[rhs])?;

        let index = self.model.constraints.len();
        self.model.constraints.push(Constraint {
            coefficients,
            relation,
            rhs,
        });

        trace!(
            component = "builder",
            operation = "add_constraint",
            status = "success",
            index,
            relation = relation.symbol(),
            rhs,
            "Appended constraint"
        );
        Ok(index)
    }

    /// Set the type of one variable, overwriting any earlier setting
    pub fn set_type(&mut self, variable: usize, var_type: VarType) -> Result<(), ModelError> {
        self.model
            .variables
            .get_mut(variable)
            .ok_or(ModelError::UnknownVariable(variable))?
            .var_type = var_type;
        Ok(())
    }

    /// Set the bounds of one variable, overwriting any earlier setting
    pub fn set_bounds(&mut self, variable: usize, bounds: Bounds) -> Result<(), ModelError> {
        if !bounds.is_valid() {
            return Err(ModelError::InvalidBounds {
                variable,
                lower: bounds.lower,
                upper: bounds.upper,
            });
        }
        self.model
            .variables
            .get_mut(variable)
            .ok_or(ModelError::UnknownVariable(variable))?
            .bounds = bounds;
        Ok(())
    }

    /// Finalize the model. No further rows can be added afterwards.
    pub fn finish(self) -> Result<Model, ModelError> {
        if self.model.num_variables() == 0 {
            return Err(ModelError::EmptyModel);
        }
        if !self.objective_set {
            return Err(ModelError::MissingObjective);
        }
        self.model.validate()?;

        debug!(
            component = "builder",
            operation = "incremental",
            status = "success",
            variables = self.model.num_variables(),
            constraints = self.model.num_constraints(),
            mip = self.model.is_mip(),
            "Built model"
        );

        Ok(self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worked_rows() -> (Vec<Vec<f64>>, Vec<Relation>, Vec<f64>) {
        (
            vec![
                vec![1.0, 1.0, -10.0],
                vec![4.0, 3.0, -20.0],
                vec![1.0, 0.0, -2.0],
                vec![1.0, 1.0, 0.0],
            ],
            vec![Relation::Le, Relation::Le, Relation::Le, Relation::Ge],
            vec![500.0, 200.0, 100.0, 1000.0],
        )
    }

    #[test]
    fn test_bulk_and_incremental_are_equal() {
        let (matrix, relations, rhs) = worked_rows();
        let from_bulk = Bulk::new(
            Sense::Minimize,
            vec![30.0, 40.0, 80.0],
            matrix.clone(),
            relations.clone(),
            rhs.clone(),
        )
        .all_integer()
        .build()
        .unwrap();

        let mut builder = Incremental::new(4, 3);
        builder
            .add_objective(Sense::Minimize, vec![30.0, 40.0, 80.0])
            .unwrap();
        for ((row, relation), b) in matrix.into_iter().zip(relations).zip(rhs) {
            builder.add_constraint(row, relation, b).unwrap();
        }
        for j in 0..3 {
            builder.set_type(j, VarType::Integer).unwrap();
        }
        let from_incremental = builder.finish().unwrap();

        assert_eq!(from_bulk, from_incremental);
        assert_eq!(from_bulk.num_variables(), 3);
        assert_eq!(from_bulk.num_constraints(), 4);
        assert!(from_bulk.is_mip());
    }

    #[test]
    fn test_bulk_rejects_short_rhs() {
        let (matrix, relations, mut rhs) = worked_rows();
        rhs.pop();
        let err = bulk(Sense::Minimize, vec![30.0, 40.0, 80.0], matrix, relations, rhs).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                what: "rhs".to_string(),
                expected: 4,
                found: 3,
            }
        );
    }

    #[test]
    fn test_bulk_rejects_long_rhs_and_relations() {
        let (matrix, mut relations, mut rhs) = worked_rows();
        rhs.push(1.0);
        let err = bulk(
            Sense::Minimize,
            vec![30.0, 40.0, 80.0],
            matrix.clone(),
            relations.clone(),
            rhs,
        )
        .unwrap_err();
        assert_eq!(err.code(), "MODEL_SHAPE_MISMATCH");

        relations.pop();
        let err = bulk(Sense::Minimize, vec![30.0, 40.0, 80.0], matrix, relations, vec![0.0; 4])
            .unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { ref what, .. } if what == "relations"));
    }

    #[test]
    fn test_bulk_rejects_ragged_row() {
        let (mut matrix, relations, rhs) = worked_rows();
        matrix[2].push(5.0);
        let err = bulk(Sense::Minimize, vec![30.0, 40.0, 80.0], matrix, relations, rhs).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                what: "matrix row 2".to_string(),
                expected: 3,
                found: 4,
            }
        );
    }

    #[test]
    fn test_bulk_overrides() {
        let (matrix, relations, rhs) = worked_rows();
        let model = Bulk::new(Sense::Minimize, vec![30.0, 40.0, 80.0], matrix, relations, rhs)
            .integer(2)
            .bounds(0, Bounds::new(0.0, 10.0))
            .bounds(0, Bounds::new(1.0, 20.0))
            .var_type(2, VarType::Continuous)
            .build()
            .unwrap();

        assert_eq!(model.variables()[0].bounds, Bounds::new(1.0, 20.0));
        assert!(!model.is_mip());

        let (matrix, relations, rhs) = worked_rows();
        let model = Bulk::new(Sense::Minimize, vec![30.0, 40.0, 80.0], matrix, relations, rhs)
            .integers([0, 2])
            .build()
            .unwrap();
        let integral: Vec<bool> = model.variables().iter().map(|v| v.is_integer()).collect();
        assert_eq!(integral, vec![true, false, true]);
    }

    #[test]
    fn test_bulk_rejects_unknown_variable_and_bad_bounds() {
        let (matrix, relations, rhs) = worked_rows();
        let err = Bulk::new(
            Sense::Minimize,
            vec![30.0, 40.0, 80.0],
            matrix.clone(),
            relations.clone(),
            rhs.clone(),
        )
        .integer(3)
        .build()
        .unwrap_err();
        assert_eq!(err, ModelError::UnknownVariable(3));

        let err = Bulk::new(Sense::Minimize, vec![30.0, 40.0, 80.0], matrix, relations, rhs)
            .bounds(1, Bounds::new(5.0, 2.0))
            .build()
            .unwrap_err();
        assert_eq!(err.code(), "VARIABLE_INVALID_BOUNDS");
    }

    #[test]
    fn test_bulk_rejects_empty_and_non_finite() {
        assert_eq!(
            bulk(Sense::Minimize, vec![], vec![], vec![], vec![]).unwrap_err(),
            ModelError::EmptyModel
        );
        let err = bulk(
            Sense::Minimize,
            vec![1.0, f64::NAN],
            vec![],
            vec![],
            vec![],
        )
        .unwrap_err();
        assert_eq!(err.code(), "COEFFICIENT_INVALID");
    }

    #[test]
    fn test_incremental_dimension_mismatch_leaves_model_untouched() {
        let mut builder = Incremental::new(1, 3);
        builder.add_objective(Sense::Maximize, vec![1.0, 1.0, 1.0]).unwrap();
        let err = builder
            .add_constraint(vec![1.0, 1.0], Relation::Le, 4.0)
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DimensionMismatch {
                expected: 3,
                found: 2,
            }
        );
        assert_eq!(builder.num_constraints(), 0);
    }

    #[test]
    fn test_incremental_rows_grow_past_hint_in_order() {
        let mut builder = Incremental::new(1, 2);
        builder.add_objective(Sense::Minimize, vec![1.0, 2.0]).unwrap();
        assert_eq!(builder.add_constraint(vec![1.0, 0.0], Relation::Ge, 1.0), Ok(0));
        assert_eq!(builder.add_constraint(vec![0.0, 1.0], Relation::Ge, 2.0), Ok(1));
        assert_eq!(builder.add_constraint(vec![1.0, 1.0], Relation::Le, 9.0), Ok(2));

        let model = builder.finish().unwrap();
        let rhs: Vec<f64> = model.constraints().iter().map(|c| c.rhs).collect();
        assert_eq!(rhs, vec![1.0, 2.0, 9.0]);
    }

    #[test]
    fn test_incremental_objective_exactly_once() {
        let mut builder = Incremental::new(0, 2);
        builder.add_objective(Sense::Minimize, vec![1.0, 2.0]).unwrap();
        assert_eq!(
            builder.add_objective(Sense::Maximize, vec![1.0, 2.0]),
            Err(ModelError::ObjectiveAlreadySet)
        );

        let builder = Incremental::new(0, 2);
        assert_eq!(builder.finish().unwrap_err(), ModelError::MissingObjective);
        assert_eq!(Incremental::new(0, 0).finish().unwrap_err(), ModelError::EmptyModel);
    }

    #[test]
    fn test_incremental_type_and_bounds_overwrite() {
        let mut builder = Incremental::new(0, 2);
        builder.add_objective(Sense::Minimize, vec![1.0, 1.0]).unwrap();
        builder.set_type(0, VarType::Integer).unwrap();
        builder.set_type(0, VarType::Integer).unwrap();
        builder.set_bounds(1, Bounds::new(-1.0, 1.0)).unwrap();
        builder.set_bounds(1, Bounds::new(-2.0, 3.0)).unwrap();
        assert_eq!(builder.set_type(2, VarType::Integer), Err(ModelError::UnknownVariable(2)));
        assert!(builder.set_bounds(0, Bounds::new(1.0, 0.0)).is_err());

        let model = builder.finish().unwrap();
        assert!(model.variables()[0].is_integer());
        assert_eq!(model.variables()[0].bounds, Bounds::NON_NEGATIVE);
        assert_eq!(model.variables()[1].bounds, Bounds::new(-2.0, 3.0));
    }
}
