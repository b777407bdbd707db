// SPDX-License-Identifier: GPL-3.0-only

//! Linear program model
//!
//! A plain description of an optimization problem: objective coefficients,
//! equality and inequality systems and per-variable bounds. The program does
//! not know how it will be solved; see `crate::solver`.

use std::fmt::Write;

use crate::error::SolverError;

/// Direction of the objective function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OptimizationType {
    #[default]
    Maximize,
    Minimize,
}

/// Whether variables are continuous or may carry integer constraints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LpType {
    /// Linear program, real-valued variables
    #[default]
    Lp,
    /// Mixed integer program. Not all back-ends support it.
    Mip,
}

/// Lower and upper bound of a single variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min: f64,
    pub max: Option<f64>,
}

impl Default for Bound {
    fn default() -> Self {
        Self { min: 0.0, max: None }
    }
}

/// A system of linear rows `matrix * x <op> vector`
///
/// The relation is implied by where the system is stored in the program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSystem {
    pub matrix: Vec<Vec<f64>>,
    pub vector: Vec<f64>,
}

impl ConstraintSystem {
    pub fn push(&mut self, row: Vec<f64>, rhs: f64) {
        self.matrix.push(row);
        self.vector.push(rhs);
    }

    /// Append all rows of `other` after the rows of `self`.
    pub fn extend(&mut self, other: ConstraintSystem) {
        self.matrix.extend(other.matrix);
        self.vector.extend(other.vector);
    }

    /// Same rows with every coefficient and right-hand side sign-flipped.
    pub fn negated(&self) -> ConstraintSystem {
        ConstraintSystem {
            matrix: self
                .matrix
                .iter()
                .map(|row| row.iter().map(|c| -c).collect())
                .collect(),
            vector: self.vector.iter().map(|b| -b).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrix.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&[f64], f64)> {
        self.matrix
            .iter()
            .map(Vec::as_slice)
            .zip(self.vector.iter().copied())
    }

    /// Human-readable rows, e.g. `+1 * x0 +1 * x3 >= 10`. Zero terms are skipped.
    pub fn render(&self, relation: &str) -> String {
        let mut out = String::new();
        for (row, rhs) in self.rows() {
            let terms: Vec<String> = row
                .iter()
                .enumerate()
                .filter(|(_, c)| **c != 0.0)
                .map(|(i, c)| format!("{c:+} * x{i}"))
                .collect();
            let lhs = if terms.is_empty() {
                "0".to_string()
            } else {
                terms.join(" ")
            };
            let _ = writeln!(out, "{lhs} {relation} {rhs}");
        }
        out
    }

    fn validate(&self, name: &str, x_amount: usize) -> Result<(), SolverError> {
        if self.matrix.len() != self.vector.len() {
            return Err(SolverError::InvalidProgram(format!(
                "{} system has {} rows but {} right-hand sides",
                name,
                self.matrix.len(),
                self.vector.len()
            )));
        }
        if let Some((idx, row)) = self
            .matrix
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != x_amount)
        {
            return Err(SolverError::InvalidProgram(format!(
                "{} row {} has {} coefficients, expected {}",
                name,
                idx,
                row.len(),
                x_amount
            )));
        }
        if self.matrix.iter().flatten().chain(&self.vector).any(|v| !v.is_finite()) {
            return Err(SolverError::InvalidProgram(format!(
                "{} system contains non-finite values",
                name
            )));
        }
        Ok(())
    }
}

/// Abstract description of a linear program
#[derive(Debug, Clone, PartialEq)]
pub struct LinearProgram {
    /// Number of unknown variables
    pub x_amount: usize,

    pub optimization_type: OptimizationType,

    pub lp_type: LpType,

    /// Coefficients of the objective function, `c[0] * x0 + c[1] * x1 + ...`
    pub objective_function_coefficients: Vec<f64>,

    /// Rows which must hold exactly, `A_eq * x = b_eq`
    pub equality: ConstraintSystem,

    /// Rows which bound `x` from below, `A_lo * x >= b_lo`
    pub lower: ConstraintSystem,

    /// Rows which bound `x` from above, `A_up * x <= b_up`
    pub upper: ConstraintSystem,

    /// Min and max possible value of each variable
    pub bounds: Vec<Bound>,
}

impl LinearProgram {
    /// Empty maximization program over `x_amount` non-negative variables.
    pub fn new(x_amount: usize) -> Self {
        Self {
            x_amount,
            optimization_type: OptimizationType::default(),
            lp_type: LpType::default(),
            objective_function_coefficients: vec![0.0; x_amount],
            equality: ConstraintSystem::default(),
            lower: ConstraintSystem::default(),
            upper: ConstraintSystem::default(),
            bounds: vec![Bound::default(); x_amount],
        }
    }

    pub fn minimize_objective_function(&mut self) {
        self.optimization_type = OptimizationType::Minimize;
    }

    pub fn maximize_objective_function(&mut self) {
        self.optimization_type = OptimizationType::Maximize;
    }

    /// Continuous variables. This is the default.
    pub fn set_type_lp(&mut self) {
        self.lp_type = LpType::Lp;
    }

    /// Allow integer constraints on variables.
    pub fn set_type_mip(&mut self) {
        self.lp_type = LpType::Mip;
    }

    /// Check that every vector and matrix matches `x_amount`.
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.objective_function_coefficients.len() != self.x_amount {
            return Err(SolverError::InvalidProgram(format!(
                "objective has {} coefficients, expected {}",
                self.objective_function_coefficients.len(),
                self.x_amount
            )));
        }
        if self.bounds.len() != self.x_amount {
            return Err(SolverError::InvalidProgram(format!(
                "{} bounds given for {} variables",
                self.bounds.len(),
                self.x_amount
            )));
        }
        if self
            .objective_function_coefficients
            .iter()
            .any(|c| !c.is_finite())
        {
            return Err(SolverError::InvalidProgram(
                "objective contains non-finite coefficients".to_string(),
            ));
        }
        self.equality.validate("equality", self.x_amount)?;
        self.lower.validate("lower", self.x_amount)?;
        self.upper.validate("upper", self.x_amount)?;
        Ok(())
    }

    /// Objective coefficients grouped `per_line` terms per line.
    pub fn render_objective(&self, per_line: usize) -> String {
        let terms: Vec<String> = self
            .objective_function_coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| format!("({c:+.5} * x{i})"))
            .collect();

        terms
            .chunks(per_line.max(1))
            .map(|chunk| chunk.join(" + "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_program_defaults() {
        let lp = LinearProgram::new(3);

        assert_eq!(lp.optimization_type, OptimizationType::Maximize);
        assert_eq!(lp.lp_type, LpType::Lp);
        assert_eq!(lp.bounds, vec![Bound { min: 0.0, max: None }; 3]);
        assert!(lp.equality.is_empty());
        assert!(lp.validate().is_ok());
    }

    #[test]
    fn switches_optimization_type_and_lp_type() {
        let mut lp = LinearProgram::new(0);

        lp.minimize_objective_function();
        assert_eq!(lp.optimization_type, OptimizationType::Minimize);
        lp.maximize_objective_function();
        assert_eq!(lp.optimization_type, OptimizationType::Maximize);

        lp.set_type_mip();
        assert_eq!(lp.lp_type, LpType::Mip);
        lp.set_type_lp();
        assert_eq!(lp.lp_type, LpType::Lp);
    }

    #[test]
    fn validate_rejects_short_rows() {
        let mut lp = LinearProgram::new(3);
        lp.upper.push(vec![1.0, 1.0], 4.0);

        assert!(matches!(
            lp.validate(),
            Err(SolverError::InvalidProgram(msg)) if msg.contains("upper row 0")
        ));
    }

    #[test]
    fn validate_rejects_missing_rhs() {
        let mut lp = LinearProgram::new(2);
        lp.equality.matrix.push(vec![1.0, 0.0]);

        assert!(matches!(lp.validate(), Err(SolverError::InvalidProgram(_))));
    }

    #[test]
    fn extend_and_negate() {
        let mut first = ConstraintSystem::default();
        first.push(vec![1.0, 0.0], 10.0);
        let mut second = ConstraintSystem::default();
        second.push(vec![0.0, 2.0], 20.0);

        first.extend(second);
        let negated = first.negated();

        assert_eq!(first.len(), 2);
        assert_eq!(negated.matrix, vec![vec![-1.0, -0.0], vec![-0.0, -2.0]]);
        assert_eq!(negated.vector, vec![-10.0, -20.0]);
    }

    #[test]
    fn render_skips_zero_terms() {
        let mut system = ConstraintSystem::default();
        system.push(vec![1.0, 0.0, 0.0, 1.0], 10.0);
        system.push(vec![0.0; 4], 1.0);

        assert_eq!(system.render(">="), "+1 * x0 +1 * x3 >= 10\n0 >= 1\n");
    }

    #[test]
    fn render_objective_groups_terms() {
        let mut lp = LinearProgram::new(4);
        lp.objective_function_coefficients = vec![-1.0, -0.5, -0.25, 1.0];

        let rendered = lp.render_objective(2);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "(-1.00000 * x0) + (-0.50000 * x1)");
    }
}
