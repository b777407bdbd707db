// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Errors returned by `allocate`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("No solution found: {0}")]
    NoSolutionFound(String),

    #[error("Solver failure: {0}")]
    Solver(String),
}

/// Errors reported by a `Solver` back-end
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("{0}")]
    NoSolutionFound(String),

    #[error("malformed linear program: {0}")]
    InvalidProgram(String),

    #[error("unsupported linear program: {0}")]
    Unsupported(String),
}

impl From<SolverError> for AllocationError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::NoSolutionFound(msg) => AllocationError::NoSolutionFound(msg),
            other => AllocationError::Solver(other.to_string()),
        }
    }
}

/// Result type alias for allocation operations
pub type Result<T> = std::result::Result<T, AllocationError>;
