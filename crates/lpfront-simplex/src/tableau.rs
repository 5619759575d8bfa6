use lpfront_model::{Relation, SolverConfig};
use tracing::trace;

use crate::standard_form::StandardForm;

/// Consecutive zero-step pivots tolerated before switching to Bland's rule
const DEGENERATE_LIMIT: usize = 50;

/// Two-phase simplex over a dense tableau
pub(crate) struct Simplex {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Simplex {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            tolerance: config.tolerance,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn solve(&self, form: &StandardForm) -> Relaxation {
        let mut tableau = self.build_tableau(form);

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            let scale = 1.0 + form.rows.iter().map(|r| r.rhs).fold(0.0, f64::max);
            match self.phase1(&mut tableau, scale) {
                SimplexResult::Optimal => {}
                SimplexResult::Unbounded => return Relaxation::Infeasible,
                SimplexResult::IterationLimit => return Relaxation::IterationLimit,
            }
            if tableau.has_positive_artificial(self.tolerance * scale) {
                return Relaxation::Infeasible;
            }
            self.drive_out_artificials(&mut tableau);
        }

        // Phase 2: Optimize
        tableau.set_objective(&form.cost);
        let eligible = tableau.artificial_start();
        match self.iterate(&mut tableau, eligible) {
            SimplexResult::Optimal => Relaxation::Optimal(tableau),
            SimplexResult::Unbounded => Relaxation::Unbounded,
            SimplexResult::IterationLimit => Relaxation::IterationLimit,
        }
    }

    fn build_tableau(&self, form: &StandardForm) -> Tableau {
        let n_rows = form.rows.len();
        let n_slack = form
            .rows
            .iter()
            .filter(|r| r.relation != Relation::Eq)
            .count();
        let n_artificial = form
            .rows
            .iter()
            .filter(|r| r.relation != Relation::Le)
            .count();
        let width = form.columns + n_slack + n_artificial + 1; // +1 for RHS

        let mut tableau = Tableau {
            data: vec![vec![0.0; width]; n_rows + 1],
            basic_vars: vec![0; n_rows],
            identity: vec![0; n_rows],
            n_structural: form.columns,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = form.columns;
        let mut artificial_idx = form.columns + n_slack;

        for (i, row) in form.rows.iter().enumerate() {
            tableau.data[i][..form.columns].copy_from_slice(&row.coefficients);
            tableau.data[i][width - 1] = row.rhs;

            // The column holding +1 in this row starts out basic
            let unit = match row.relation {
                Relation::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    slack_idx += 1;
                    slack_idx - 1
                }
                Relation::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    artificial_idx += 1;
                    artificial_idx - 1
                }
                Relation::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    artificial_idx += 1;
                    artificial_idx - 1
                }
            };
            tableau.basic_vars[i] = unit;
            tableau.identity[i] = unit;
        }

        tableau
    }

    fn phase1(&self, tableau: &mut Tableau, scale: f64) -> SimplexResult {
        // Maximize -sum(artificials); artificial columns get -1, then the
        // rows where they are basic are added back in to price them out
        let obj_row = tableau.obj_row();
        let art_start = tableau.artificial_start();
        let rhs_col = tableau.rhs_col();

        tableau.data[obj_row].fill(0.0);
        for j in art_start..rhs_col {
            tableau.data[obj_row][j] = -1.0;
        }
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..=rhs_col {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        let result = self.iterate(tableau, rhs_col);
        trace!(
            component = "simplex",
            operation = "phase1",
            status = ?result,
            infeasibility = -tableau.data[obj_row][rhs_col],
            scale,
            "Phase 1 finished"
        );
        result
    }

    /// Pivot zero-valued artificials out of the basis so phase 2 cannot
    /// raise them. Rows where that is impossible are redundant and stay put.
    fn drive_out_artificials(&self, tableau: &mut Tableau) {
        let art_start = tableau.artificial_start();
        for i in 0..tableau.obj_row() {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            if let Some(col) = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance) {
                tableau.pivot(i, col);
            }
        }
    }

    fn iterate(&self, tableau: &mut Tableau, eligible: usize) -> SimplexResult {
        let mut degenerate = 0;

        for _ in 0..self.max_iterations {
            let bland = degenerate > DEGENERATE_LIMIT;
            let Some(pivot_col) = self.find_pivot_column(tableau, eligible, bland) else {
                return SimplexResult::Optimal;
            };
            let Some((pivot_row, ratio)) = self.find_pivot_row(tableau, pivot_col) else {
                return SimplexResult::Unbounded;
            };

            if ratio <= self.tolerance {
                degenerate += 1;
            } else {
                degenerate = 0;
            }

            trace!(
                component = "simplex",
                operation = "pivot",
                row = pivot_row,
                col = pivot_col,
                bland,
                "Pivoting"
            );
            tableau.pivot(pivot_row, pivot_col);
        }

        SimplexResult::IterationLimit
    }

    /// Entering column among the first `eligible` columns.
    ///
    /// Dantzig's rule picks the most positive reduced cost; Bland's rule the
    /// lowest-indexed positive one.
    fn find_pivot_column(&self, tableau: &Tableau, eligible: usize, bland: bool) -> Option<usize> {
        let obj = &tableau.data[tableau.obj_row()];

        if bland {
            return (0..eligible).find(|&j| obj[j] > self.tolerance);
        }

        let mut max_val = self.tolerance;
        let mut max_col = None;
        for j in 0..eligible {
            if obj[j] > max_val {
                max_val = obj[j];
                max_col = Some(j);
            }
        }
        max_col
    }

    /// Leaving row by minimum ratio, ties going to the lowest basic column
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<(usize, f64)> {
        let rhs_col = tableau.rhs_col();

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..tableau.obj_row() {
            let val = tableau.data[i][col];
            if val > self.tolerance {
                let ratio = tableau.data[i][rhs_col] / val;
                let better = match min_row {
                    None => true,
                    Some(r) => {
                        ratio < min_ratio - self.tolerance
                            || ((ratio - min_ratio).abs() <= self.tolerance
                                && tableau.basic_vars[i] < tableau.basic_vars[r])
                    }
                };
                if better {
                    min_ratio = ratio;
                    min_row = Some(i);
                }
            }
        }

        min_row.map(|row| (row, min_ratio))
    }
}

/// Dense simplex tableau.
///
/// Columns are laid out as structural | slack and surplus | artificial | rhs,
/// and the last row holds the reduced costs `c_j - z_j` of a maximization.
#[derive(Debug, Clone)]
pub(crate) struct Tableau {
    pub data: Vec<Vec<f64>>,
    pub basic_vars: Vec<usize>,
    /// Column that formed the initial identity in each row
    pub identity: Vec<usize>,
    pub n_structural: usize,
    pub n_slack: usize,
    pub n_artificial: usize,
}

impl Tableau {
    pub fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    pub fn rhs_col(&self) -> usize {
        self.n_structural + self.n_slack + self.n_artificial
    }

    pub fn artificial_start(&self) -> usize {
        self.n_structural + self.n_slack
    }

    /// Row in which `col` is basic
    pub fn basic_row(&self, col: usize) -> Option<usize> {
        self.basic_vars.iter().position(|&b| b == col)
    }

    fn has_positive_artificial(&self, threshold: f64) -> bool {
        let art_start = self.artificial_start();
        let rhs_col = self.rhs_col();
        self.basic_vars
            .iter()
            .enumerate()
            .any(|(i, &b)| b >= art_start && self.data[i][rhs_col] > threshold)
    }

    /// Install maximization costs and price out the current basis
    fn set_objective(&mut self, cost: &[f64]) {
        let obj_row = self.obj_row();
        self.data[obj_row].fill(0.0);
        self.data[obj_row][..cost.len()].copy_from_slice(cost);

        for i in 0..obj_row {
            let basic = self.basic_vars[i];
            let ratio = self.data[obj_row][basic];
            if ratio != 0.0 {
                for j in 0..self.data[i].len() {
                    self.data[obj_row][j] -= ratio * self.data[i][j];
                }
            }
        }
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let n_rows = self.data.len();
        let n_cols = self.data[0].len();

        // Update basic variable
        self.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = self.data[row][col];
        for j in 0..n_cols {
            self.data[row][j] /= pivot_val;
        }

        // Eliminate column in other rows
        for i in 0..n_rows {
            if i != row {
                let factor = self.data[i][col];
                if factor != 0.0 {
                    for j in 0..n_cols {
                        self.data[i][j] -= factor * self.data[row][j];
                    }
                }
            }
        }
    }

    /// Values of the structural columns
    pub fn column_values(&self) -> Vec<f64> {
        let rhs_col = self.rhs_col();
        let mut values = vec![0.0; self.n_structural];
        for (i, &basic) in self.basic_vars.iter().enumerate() {
            if basic < self.n_structural {
                values[basic] = self.data[i][rhs_col];
            }
        }
        values
    }
}

#[derive(Debug)]
enum SimplexResult {
    Optimal,
    Unbounded,
    IterationLimit,
}

/// Outcome of solving one LP relaxation
#[derive(Debug)]
pub(crate) enum Relaxation {
    Optimal(Tableau),
    Infeasible,
    Unbounded,
    IterationLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpfront_model::{bulk, Bounds, Bulk, Model, Sense};

    fn solve(model: &Model) -> (Relaxation, StandardForm) {
        let form = StandardForm::new(model, &model.bounds());
        (Simplex::new(&SolverConfig::new()).solve(&form), form)
    }

    fn values(model: &Model) -> Vec<f64> {
        match solve(model) {
            (Relaxation::Optimal(t), form) => form.recover(&t.column_values()),
            (other, _) => panic!("expected optimal, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        //   x, y >= 0
        // Optimal: x=3, y=1, obj=11
        let model = bulk(
            Sense::Maximize,
            vec![3.0, 2.0],
            vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![Relation::Le; 3],
            vec![4.0, 3.0, 3.0],
        )
        .unwrap();

        let x = values(&model);
        assert!((x[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", x[0]);
        assert!((x[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", x[1]);
        assert!((model.objective_value(&x) - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let model = bulk(
            Sense::Minimize,
            vec![2.0, 3.0],
            vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![Relation::Ge, Relation::Le, Relation::Le],
            vec![4.0, 3.0, 3.0],
        )
        .unwrap();

        let x = values(&model);
        assert!((x[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", x[0]);
        assert!((x[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", x[1]);
        assert!((model.objective_value(&x) - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_equality_row() {
        // min 2x + 3y, x + y = 10, x <= 6 -> x=6, y=4
        let model = bulk(
            Sense::Minimize,
            vec![2.0, 3.0],
            vec![vec![1.0, 1.0], vec![1.0, 0.0]],
            vec![Relation::Eq, Relation::Le],
            vec![10.0, 6.0],
        )
        .unwrap();

        let x = values(&model);
        assert!((x[0] - 6.0).abs() < 1e-6);
        assert!((x[1] - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_shifted_and_reflected_bounds() {
        // min x + 2y, x + y >= -4, x in [-3, 5], y <= 2 -> x=5, y=-9
        let model = Bulk::new(
            Sense::Minimize,
            vec![1.0, 2.0],
            vec![vec![1.0, 1.0]],
            vec![Relation::Ge],
            vec![-4.0],
        )
        .bounds(0, Bounds::new(-3.0, 5.0))
        .bounds(1, Bounds::new(f64::NEG_INFINITY, 2.0))
        .build()
        .unwrap();

        let x = values(&model);
        assert!((x[0] - 5.0).abs() < 1e-6, "x = {}", x[0]);
        assert!((x[1] + 9.0).abs() < 1e-6, "y = {}", x[1]);
    }

    #[test]
    fn test_free_variable() {
        // min x, x >= -7, x + y <= 3, x free -> x=-7
        let model = Bulk::new(
            Sense::Minimize,
            vec![1.0, 0.0],
            vec![vec![1.0, 0.0], vec![1.0, 1.0]],
            vec![Relation::Ge, Relation::Le],
            vec![-7.0, 3.0],
        )
        .bounds(0, Bounds::FREE)
        .build()
        .unwrap();

        let x = values(&model);
        assert!((x[0] + 7.0).abs() < 1e-6, "x = {}", x[0]);
    }

    #[test]
    fn test_redundant_equality_rows() {
        // The second row repeats the first, leaving an artificial in a redundant row
        let model = bulk(
            Sense::Maximize,
            vec![1.0, 1.0],
            vec![vec![1.0, 1.0], vec![2.0, 2.0], vec![1.0, 0.0]],
            vec![Relation::Eq, Relation::Eq, Relation::Le],
            vec![5.0, 10.0, 2.0],
        )
        .unwrap();

        let x = values(&model);
        assert!((x[0] + x[1] - 5.0).abs() < 1e-6);
        assert!(model.violations(&x, 1e-6).is_empty());
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let model = bulk(
            Sense::Minimize,
            vec![1.0],
            vec![vec![1.0], vec![1.0]],
            vec![Relation::Ge, Relation::Le],
            vec![5.0, 3.0],
        )
        .unwrap();

        assert!(matches!(solve(&model).0, Relaxation::Infeasible));
    }

    #[test]
    fn test_unbounded() {
        let model = bulk(
            Sense::Maximize,
            vec![1.0, 1.0],
            vec![vec![1.0, -1.0]],
            vec![Relation::Le],
            vec![1.0],
        )
        .unwrap();

        assert!(matches!(solve(&model).0, Relaxation::Unbounded));
    }

    #[test]
    fn test_no_rows() {
        let model = bulk(Sense::Minimize, vec![1.0, 1.0], vec![], vec![], vec![]).unwrap();
        assert_eq!(values(&model), vec![0.0, 0.0]);

        let model = bulk(Sense::Maximize, vec![1.0], vec![], vec![], vec![]).unwrap();
        assert!(matches!(solve(&model).0, Relaxation::Unbounded));
    }

    #[test]
    fn test_iteration_limit() {
        let model = bulk(
            Sense::Maximize,
            vec![3.0, 2.0],
            vec![vec![1.0, 1.0], vec![1.0, 0.0]],
            vec![Relation::Le; 2],
            vec![4.0, 3.0],
        )
        .unwrap();
        let form = StandardForm::new(&model, &model.bounds());
        let simplex = Simplex::new(&SolverConfig::new().with_max_iterations(1));
        assert!(matches!(simplex.solve(&form), Relaxation::IterationLimit));
    }
}
