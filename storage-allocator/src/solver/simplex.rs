// SPDX-License-Identifier: GPL-3.0-only

//! Simplex back-end
//!
//! Solves the continuous relaxation with the pure-Rust simplex implementation
//! behind `good_lp`'s `microlp` solver, then rounds the result down.

use good_lp::{
    Expression, ProblemVariables, Solution, SolverModel, Variable, constraint, microlp, variable,
};
use tracing::debug;

use super::{Solver, round_down};
use crate::error::SolverError;
use crate::program::{Bound, ConstraintSystem, LinearProgram, LpType};

/// Linear programming solver based on the simplex method
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplexSolver;

impl SimplexSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for SimplexSolver {
    fn solve(&self, program: &LinearProgram) -> Result<Vec<i64>, SolverError> {
        if program.lp_type == LpType::Mip {
            return Err(SolverError::Unsupported(format!(
                "{} solver handles continuous programs only",
                self.name()
            )));
        }
        program.validate()?;

        // The back-end accepts a single inequality direction, so lower bound
        // rows are sign-flipped into upper bound rows.
        let mut inequality = program.upper.clone();
        inequality.extend(program.lower.negated());

        check_constant_rows(&program.equality, &inequality)?;

        debug!(
            "Objective function coefficients:\n{}",
            program.render_objective(8)
        );
        debug!("Equality constraints:\n{}", program.equality.render("="));
        debug!("Inequality constraints:\n{}", inequality.render("<="));

        if program.x_amount == 0 {
            return Ok(Vec::new());
        }

        let mut problem = ProblemVariables::new();
        let xs: Vec<Variable> = program
            .bounds
            .iter()
            .map(|bound| problem.add(variable_definition(bound)))
            .collect();

        // The objective is already sign-flipped by the program builder.
        let objective = linear_expression(&program.objective_function_coefficients, &xs);
        let mut model = problem.minimise(objective).using(microlp);

        for (row, rhs) in program.equality.rows().filter(|(row, _)| !is_constant(row)) {
            let lhs = linear_expression(row, &xs);
            model = model.with(constraint!(lhs == rhs));
        }
        for (row, rhs) in inequality.rows().filter(|(row, _)| !is_constant(row)) {
            let lhs = linear_expression(row, &xs);
            model = model.with(constraint!(lhs <= rhs));
        }

        let solution = model.solve().map_err(|err| {
            SolverError::NoSolutionFound(format!(
                "Allocation is not possible with specified constraints: {err}"
            ))
        })?;

        let values: Vec<f64> = xs.iter().map(|&x| solution.value(x)).collect();
        debug!("Continuous solution: {:?}", values);

        Ok(round_down(values))
    }

    fn name(&self) -> &str {
        "simplex"
    }
}

fn variable_definition(bound: &Bound) -> good_lp::VariableDefinition {
    let definition = variable().min(bound.min);
    match bound.max {
        Some(max) => definition.max(max),
        None => definition,
    }
}

fn linear_expression(coefficients: &[f64], xs: &[Variable]) -> Expression {
    coefficients
        .iter()
        .zip(xs)
        .filter(|(c, _)| **c != 0.0)
        .map(|(&c, &x)| c * x)
        .sum()
}

fn is_constant(row: &[f64]) -> bool {
    row.iter().all(|c| *c == 0.0)
}

/// Rows without any non-zero coefficient never reach the back-end; they
/// either always hold or make the program infeasible.
fn check_constant_rows(
    equality: &ConstraintSystem,
    inequality: &ConstraintSystem,
) -> Result<(), SolverError> {
    for (idx, (row, rhs)) in equality.rows().enumerate() {
        if is_constant(row) && rhs != 0.0 {
            return Err(SolverError::NoSolutionFound(format!(
                "Allocation is not possible with specified constraints: \
                 equality row {idx} requires 0 = {rhs}"
            )));
        }
    }
    for (idx, (row, rhs)) in inequality.rows().enumerate() {
        if is_constant(row) && rhs < 0.0 {
            return Err(SolverError::NoSolutionFound(format!(
                "Allocation is not possible with specified constraints: \
                 inequality row {idx} requires 0 <= {rhs}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_lp() {
        // x1 = 1
        // x2 = 1
        // x3 + x4 >= 2
        // x1 + x2 + x3 + x4 <= 4
        let mut lp = LinearProgram::new(4);
        lp.equality.push(vec![1.0, 0.0, 0.0, 0.0], 1.0);
        lp.equality.push(vec![0.0, 1.0, 0.0, 0.0], 1.0);
        lp.lower.push(vec![0.0, 0.0, 1.0, 1.0], 2.0);
        lp.upper.push(vec![1.0, 1.0, 1.0, 1.0], 4.0);

        let solution = SimplexSolver::new().solve(&lp).unwrap();

        // [1, 1, 0, 2] is optimal too; other back-ends may return it.
        assert_eq!(solution, vec![1, 1, 2, 0]);
    }

    #[test]
    fn prefers_higher_coefficients() {
        // maximize 2 * x0 + x1 with x0 + x1 <= 10, x0 <= 7
        let mut lp = LinearProgram::new(2);
        lp.objective_function_coefficients = vec![-2.0, -1.0];
        lp.upper.push(vec![1.0, 1.0], 10.0);
        lp.upper.push(vec![1.0, 0.0], 7.0);

        let solution = SimplexSolver::new().solve(&lp).unwrap();

        assert_eq!(solution, vec![7, 3]);
    }

    #[test]
    fn raises_error() {
        // 0 * x1 + 0 * x2 = 1
        let mut lp = LinearProgram::new(2);
        lp.equality.push(vec![0.0, 0.0], 1.0);

        let result = SimplexSolver::new().solve(&lp);

        assert!(matches!(result, Err(SolverError::NoSolutionFound(_))));
    }

    #[test]
    fn reports_infeasible_bounds() {
        // x0 >= 10, x0 <= 5
        let mut lp = LinearProgram::new(1);
        lp.lower.push(vec![1.0], 10.0);
        lp.upper.push(vec![1.0], 5.0);

        let result = SimplexSolver::new().solve(&lp);

        match result {
            Err(SolverError::NoSolutionFound(msg)) => {
                assert!(msg.starts_with("Allocation is not possible"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn honors_variable_bounds() {
        let mut lp = LinearProgram::new(2);
        lp.objective_function_coefficients = vec![-1.0, -1.0];
        lp.upper.push(vec![1.0, 1.0], 10.0);
        lp.bounds[0] = Bound {
            min: 0.0,
            max: Some(4.0),
        };
        lp.bounds[1] = Bound {
            min: 0.0,
            max: Some(4.0),
        };

        let solution = SimplexSolver::new().solve(&lp).unwrap();

        assert_eq!(solution, vec![4, 4]);
    }

    #[test]
    fn rejects_mixed_integer_programs() {
        let mut lp = LinearProgram::new(1);
        lp.set_type_mip();

        assert!(matches!(
            SimplexSolver::new().solve(&lp),
            Err(SolverError::Unsupported(_))
        ));
    }

    #[test]
    fn rejects_malformed_programs() {
        let mut lp = LinearProgram::new(2);
        lp.upper.push(vec![1.0], 1.0);

        assert!(matches!(
            SimplexSolver::new().solve(&lp),
            Err(SolverError::InvalidProgram(_))
        ));
    }

    #[test]
    fn empty_program() {
        assert_eq!(SimplexSolver::new().solve(&LinearProgram::new(0)), Ok(Vec::new()));
    }
}
