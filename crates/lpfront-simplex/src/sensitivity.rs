//! Dual values and ranging read off an optimal tableau.
//!
//! All quantities are reported in the model's own terms: shadow prices are
//! the change in the model's objective per unit increase of a row's rhs, and
//! ranges are intervals on the model's coefficients and rhs values, even
//! though the tableau itself works on shifted, negated, maximizing columns.

use lpfront_model::{Interval, Model};

use crate::standard_form::StandardForm;
use crate::tableau::Tableau;

/// Shadow price of every model row
pub(crate) fn duals(tableau: &Tableau, form: &StandardForm) -> Vec<f64> {
    let obj = &tableau.data[tableau.obj_row()];
    (0..form.model_rows)
        .map(|i| {
            // The row's identity column has zero cost, so its reduced cost is -y_i
            let y = -obj[tableau.identity[i]];
            // Adding zero turns -0.0 into 0.0
            form.sense_sign * form.rows[i].sign * y + 0.0
        })
        .collect()
}

/// Whether each model variable has a column in the final basis
pub(crate) fn basis(tableau: &Tableau, form: &StandardForm) -> Vec<bool> {
    form.var_columns
        .iter()
        .map(|columns| columns.iter().any(|&(col, _)| tableau.basic_row(col).is_some()))
        .collect()
}

/// Interval over which each model row's rhs can move while the basis stays feasible
pub(crate) fn rhs_ranges(tableau: &Tableau, form: &StandardForm, model: &Model, tolerance: f64) -> Vec<Interval> {
    let rhs_col = tableau.rhs_col();

    model
        .constraints()
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let col = tableau.identity[i];
            let sign = form.rows[i].sign;
            let Interval { from: mut lo, to: mut hi } = Interval::UNBOUNDED;

            // x_B(delta) = x_B + sign * delta * B^-1 e_i must stay non-negative
            for r in 0..tableau.obj_row() {
                let g = sign * tableau.data[r][col];
                let x = tableau.data[r][rhs_col];
                if g > tolerance {
                    lo = lo.max(-x / g);
                } else if g < -tolerance {
                    hi = hi.min(-x / g);
                }
            }

            Interval::new(c.rhs + lo, c.rhs + hi)
        })
        .collect()
}

/// Interval over which each objective coefficient can move while the basis stays optimal
pub(crate) fn objective_ranges(
    tableau: &Tableau,
    form: &StandardForm,
    model: &Model,
    tolerance: f64,
) -> Vec<Interval> {
    let obj = &tableau.data[tableau.obj_row()];
    let eligible = tableau.artificial_start();
    let basic_rows: Vec<Option<usize>> = (0..eligible).map(|col| tableau.basic_row(col)).collect();

    model
        .objective()
        .coefficients
        .iter()
        .zip(&form.var_columns)
        .map(|(&cost, columns)| {
            let Interval { from: mut lo, to: mut hi } = Interval::UNBOUNDED;

            for k in (0..eligible).filter(|&k| basic_rows[k].is_none()) {
                // Rate at which reduced cost d_k moves per unit change of this coefficient
                let mut g = 0.0;
                for &(col, sign) in columns {
                    let e = form.sense_sign * sign;
                    match basic_rows[col] {
                        Some(r) => g -= e * tableau.data[r][k],
                        None if col == k => g += e,
                        None => {}
                    }
                }

                let d = obj[k].min(0.0);
                if g > tolerance {
                    hi = hi.min(-d / g);
                } else if g < -tolerance {
                    lo = lo.max(-d / g);
                }
            }

            Interval::new(cost + lo, cost + hi)
        })
        .collect()
}
