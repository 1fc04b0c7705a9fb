//! LP relaxation backends.
//!
//! The branch-and-bound driver only needs "solve this LP under these column
//! bounds". Backends implement [`RelaxationSolver`]; the shipped one,
//! [`MinilpRelaxation`], goes through `good_lp` with its pure-Rust `minilp`
//! solver, which handles continuous columns only.

use good_lp::{minilp, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel};
use std::fmt::Debug;

use super::{MilpModel, RowSense};
use crate::error::WaveError;

/// Result of one LP relaxation.
#[derive(Debug, Clone, PartialEq)]
pub enum Relaxation {
    /// Optimal LP point and its objective (offset included).
    Solved {
        /// Value per column.
        values: Vec<f64>,
        /// Objective value.
        objective: f64,
    },
    /// No point satisfies the rows under the given bounds.
    Infeasible,
}

/// Solves the continuous relaxation of a [`MilpModel`].
pub trait RelaxationSolver: Send + Sync + Debug {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Solves the model with integrality dropped and column bounds replaced
    /// by `bounds`.
    ///
    /// # Errors
    /// `WaveError::Backend` when the backend fails for another reason than
    /// infeasibility.
    fn solve(&self, model: &MilpModel, bounds: &[(f64, f64)]) -> Result<Relaxation, WaveError>;
}

/// `good_lp` + `minilp` relaxation backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinilpRelaxation;

impl RelaxationSolver for MinilpRelaxation {
    fn name(&self) -> &'static str {
        "minilp"
    }

    fn solve(&self, model: &MilpModel, bounds: &[(f64, f64)]) -> Result<Relaxation, WaveError> {
        let mut vars = ProblemVariables::new();
        let columns: Vec<_> = bounds
            .iter()
            .map(|&(lower, upper)| vars.add(variable().min(lower).max(upper)))
            .collect();

        let mut objective = Expression::with_capacity(columns.len());
        for (column, var) in model.columns().iter().zip(&columns) {
            if column.cost != 0.0 {
                objective.add_mul(column.cost, *var);
            }
        }

        let mut problem = vars.minimise(objective).using(minilp);
        for row in model.rows() {
            let mut lhs = Expression::with_capacity(row.terms.len());
            for &(c, a) in &row.terms {
                lhs.add_mul(a, columns[c]);
            }
            let constraint = match row.sense {
                RowSense::Le => lhs.leq(row.rhs),
                RowSense::Eq => lhs.eq(row.rhs),
            };
            problem.add_constraint(constraint);
        }

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = columns.iter().map(|&v| solution.value(v)).collect();
                let objective = model.objective_value(&values);
                Ok(Relaxation::Solved { values, objective })
            }
            Err(ResolutionError::Infeasible) => Ok(Relaxation::Infeasible),
            Err(e) => Err(WaveError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_item_model() -> MilpModel {
        // min -a - b  s.t.  2a + 2b <= 3
        let mut model = MilpModel::new();
        let a = model.add_binary("a", -1.0, 0);
        let b = model.add_binary("b", -1.0, 0);
        model.add_row("cap", vec![(a, 2.0), (b, 2.0)], RowSense::Le, 3.0);
        model
    }

    #[test]
    fn test_relaxation_is_fractional() {
        let model = two_item_model();
        match MinilpRelaxation.solve(&model, &model.bounds()).unwrap() {
            Relaxation::Solved { values, objective } => {
                assert!((objective + 1.5).abs() < 1e-6);
                assert!((values[0] + values[1] - 1.5).abs() < 1e-6);
            }
            Relaxation::Infeasible => panic!("relaxation should be feasible"),
        }
    }

    #[test]
    fn test_bounds_override_columns() {
        let model = two_item_model();
        match MinilpRelaxation.solve(&model, &[(0.0, 0.0), (0.0, 1.0)]).unwrap() {
            Relaxation::Solved { values, objective } => {
                assert!(values[0].abs() < 1e-6);
                assert!((values[1] - 1.0).abs() < 1e-6);
                assert!((objective + 1.0).abs() < 1e-6);
            }
            Relaxation::Infeasible => panic!("relaxation should be feasible"),
        }
    }

    #[test]
    fn test_infeasible_relaxation() {
        let model = two_item_model();
        let result = MinilpRelaxation.solve(&model, &[(1.0, 1.0), (1.0, 1.0)]).unwrap();
        assert_eq!(result, Relaxation::Infeasible);
    }

    #[test]
    fn test_equality_rows_and_offset() {
        let mut model = MilpModel::new();
        let a = model.add_binary("a", 1.0, 0);
        let b = model.add_binary("b", 3.0, 0);
        model.add_row("one", vec![(a, 1.0), (b, 1.0)], RowSense::Eq, 1.0);
        model.set_objective_offset(-2.0);
        match MinilpRelaxation.solve(&model, &model.bounds()).unwrap() {
            Relaxation::Solved { values, objective } => {
                assert!((values[0] - 1.0).abs() < 1e-6);
                assert!((objective + 1.0).abs() < 1e-6);
            }
            Relaxation::Infeasible => panic!("relaxation should be feasible"),
        }
    }
}
