//! Rewriting a bounded model as `max c'x, Ax (<=|=|>=) b, x >= 0, b >= 0`.
//!
//! Each model variable becomes one or two non-negative columns:
//! - finite lower bound `l`: `x = l + x'` (a finite upper bound `u` adds the row `x' <= u - l`)
//! - only a finite upper bound `u`: `x = u - x'`
//! - free: `x = x+ - x-`
//!
//! Rows with a negative rhs are negated. The model's own rows come first,
//! in order, followed by the bound rows.

use lpfront_model::{Bounds, Model, Relation};

#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub coefficients: Vec<f64>,
    pub relation: Relation,
    pub rhs: f64,
    /// -1.0 when the row was negated to make its rhs non-negative
    pub sign: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct StandardForm {
    /// Number of structural columns
    pub columns: usize,
    /// Columns of each model variable with the sign they enter with
    pub var_columns: Vec<Vec<(usize, f64)>>,
    /// Constant part of each model variable
    pub offsets: Vec<f64>,
    pub rows: Vec<Row>,
    /// Rows taken from the model; the rest are bound rows
    pub model_rows: usize,
    /// Maximization costs per column
    pub cost: Vec<f64>,
    /// +1.0 for a maximization model, -1.0 for minimization
    pub sense_sign: f64,
}

impl StandardForm {
    /// Standard form of `model` with `bounds` in place of its own variable bounds
    pub fn new(model: &Model, bounds: &[Bounds]) -> Self {
        let mut var_columns = Vec::with_capacity(bounds.len());
        let mut offsets = Vec::with_capacity(bounds.len());
        let mut upper_rows = Vec::new();
        let mut columns = 0;

        for b in bounds {
            if b.lower.is_finite() {
                var_columns.push(vec![(columns, 1.0)]);
                offsets.push(b.lower);
                if b.upper.is_finite() {
                    upper_rows.push((columns, b.upper - b.lower));
                }
                columns += 1;
            } else if b.upper.is_finite() {
                var_columns.push(vec![(columns, -1.0)]);
                offsets.push(b.upper);
                columns += 1;
            } else {
                var_columns.push(vec![(columns, 1.0), (columns + 1, -1.0)]);
                offsets.push(0.0);
                columns += 2;
            }
        }

        let mut rows = Vec::with_capacity(model.num_constraints() + upper_rows.len());
        for c in model.constraints() {
            let mut coefficients = vec![0.0; columns];
            let mut rhs = c.rhs;
            for (j, &coef) in c.coefficients.iter().enumerate() {
                for &(col, sign) in &var_columns[j] {
                    coefficients[col] = coef * sign;
                }
                rhs -= coef * offsets[j];
            }
            rows.push(Row {
                coefficients,
                relation: c.relation,
                rhs,
                sign: 1.0,
            });
        }
        for (col, limit) in upper_rows {
            let mut coefficients = vec![0.0; columns];
            coefficients[col] = 1.0;
            rows.push(Row {
                coefficients,
                relation: Relation::Le,
                rhs: limit,
                sign: 1.0,
            });
        }

        for row in &mut rows {
            if row.rhs < 0.0 {
                for coef in &mut row.coefficients {
                    *coef = -*coef;
                }
                row.rhs = -row.rhs;
                row.relation = row.relation.flipped();
                row.sign = -1.0;
            }
        }

        let sense_sign = model.sense().sign();
        let mut cost = vec![0.0; columns];
        for (j, &coef) in model.objective().coefficients.iter().enumerate() {
            for &(col, sign) in &var_columns[j] {
                cost[col] = sense_sign * coef * sign;
            }
        }

        Self {
            columns,
            var_columns,
            offsets,
            rows,
            model_rows: model.num_constraints(),
            cost,
            sense_sign,
        }
    }

    /// Model variable values from structural column values
    pub fn recover(&self, column_values: &[f64]) -> Vec<f64> {
        self.var_columns
            .iter()
            .zip(&self.offsets)
            .map(|(cols, offset)| {
                offset
                    + cols
                        .iter()
                        .map(|&(col, sign)| sign * column_values[col])
                        .sum::<f64>()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpfront_model::{Bulk, Sense};

    fn model() -> Model {
        Bulk::new(
            Sense::Minimize,
            vec![1.0, 2.0, 3.0],
            vec![vec![1.0, 1.0, 1.0]],
            vec![Relation::Ge],
            vec![-4.0],
        )
        .bounds(0, Bounds::new(-3.0, 5.0))
        .bounds(1, Bounds::new(f64::NEG_INFINITY, 2.0))
        .bounds(2, Bounds::FREE)
        .build()
        .unwrap()
    }

    #[test]
    fn test_column_layout() {
        let model = model();
        let form = StandardForm::new(&model, &model.bounds());

        assert_eq!(form.columns, 4);
        assert_eq!(form.var_columns[0], vec![(0, 1.0)]);
        assert_eq!(form.var_columns[1], vec![(1, -1.0)]);
        assert_eq!(form.var_columns[2], vec![(2, 1.0), (3, -1.0)]);
        assert_eq!(form.offsets, vec![-3.0, 2.0, 0.0]);
        assert_eq!(form.cost, vec![-1.0, 2.0, -3.0, 3.0]);
    }

    #[test]
    fn test_rows_shifted_and_normalized() {
        let model = model();
        let form = StandardForm::new(&model, &model.bounds());

        assert_eq!(form.model_rows, 1);
        assert_eq!(form.rows.len(), 2);

        // x0 + x1 + x2 >= -4 becomes x0' - x1' + x2+ - x2- >= -4 + 3 - 2 = -3,
        // which is negated into a <= row
        let row = &form.rows[0];
        assert_eq!(row.relation, Relation::Le);
        assert_eq!(row.rhs, 3.0);
        assert_eq!(row.sign, -1.0);
        assert_eq!(row.coefficients, vec![-1.0, 1.0, -1.0, 1.0]);

        let bound = &form.rows[1];
        assert_eq!(bound.relation, Relation::Le);
        assert_eq!(bound.rhs, 8.0);
        assert_eq!(bound.coefficients, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_recover() {
        let model = model();
        let form = StandardForm::new(&model, &model.bounds());
        assert_eq!(form.recover(&[1.0, 4.0, 0.0, 2.5]), vec![-2.0, -2.0, -2.5]);
    }
}
