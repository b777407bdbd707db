// SPDX-License-Identifier: GPL-3.0-only

//! Solver back-ends
//!
//! A `Solver` turns a `LinearProgram` into an integral solution vector, one
//! value per variable. The reference back-end is `SimplexSolver`.

mod simplex;

pub use simplex::SimplexSolver;

use crate::error::SolverError;
use crate::program::LinearProgram;

/// Values this close below an integer are treated as that integer when rounding.
pub const ROUNDING_TOLERANCE: f64 = 1e-6;

/// Common interface for linear program solvers
pub trait Solver: Send + Sync {
    /// Solve the program and return one integer per variable.
    ///
    /// # Errors
    /// `SolverError::NoSolutionFound` if the program is infeasible.
    fn solve(&self, program: &LinearProgram) -> Result<Vec<i64>, SolverError>;

    /// Solver name for logging
    fn name(&self) -> &str;
}

/// Round every value down to the nearest integer.
///
/// Flooring a feasible continuous solution keeps it feasible for the
/// allocation constraints and loses at most one unit per variable.
pub fn round_down<I>(values: I) -> Vec<i64>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .map(|value| (value + ROUNDING_TOLERANCE).floor() as i64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_down() {
        assert_eq!(round_down([0.0, 1.4, 2.99, 10.5]), vec![0, 1, 2, 10]);
    }

    #[test]
    fn absorbs_floating_point_noise() {
        assert_eq!(round_down([1.999_999_9, 2.000_000_1, -0.000_000_1]), vec![2, 2, 0]);
    }
}
