// SPDX-License-Identifier: GPL-3.0-only

//! Allocation facade
//!
//! Runs the whole pipeline for one request:
//! schema normalization → program builder → solver → per-disk result.

use serde::{Deserialize, Serialize};
use storage_types::{DiskAllocation, DiskSpec, SpaceAllocation, SpaceSpec};
use tracing::{debug, info};

use crate::builder::{ObjectiveTuning, ProgramBuilder};
use crate::error::{AllocationError, Result};
use crate::schema::{DEFAULT_CONTAINER_KINDS, ResolvedSchema};
use crate::solver::{SimplexSolver, Solver};

/// Knobs of the allocation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorOptions {
    /// Objective function constants
    pub tuning: ObjectiveTuning,

    /// Space types which are containers and are not allocated directly
    pub container_kinds: Vec<String>,
}

impl Default for AllocatorOptions {
    fn default() -> Self {
        Self {
            tuning: ObjectiveTuning::default(),
            container_kinds: DEFAULT_CONTAINER_KINDS
                .iter()
                .map(|kind| kind.to_string())
                .collect(),
        }
    }
}

/// Allocates spaces onto disks with a pluggable solver
#[derive(Debug, Clone, Default)]
pub struct Allocator<S = SimplexSolver> {
    solver: S,
    options: AllocatorOptions,
}

impl Allocator<SimplexSolver> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Solver> Allocator<S> {
    pub fn with_solver(solver: S) -> Self {
        Self {
            solver,
            options: AllocatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AllocatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &AllocatorOptions {
        &self.options
    }

    /// Compute a static allocation of `spaces` onto `disks`.
    ///
    /// The result holds one entry per disk in input order; each lists every
    /// allocated space in schema order followed by `unallocated`.
    ///
    /// # Errors
    /// - `AllocationError::InvalidData` if a disk or space misses a required field
    /// - `AllocationError::NoSolutionFound` if the constraints cannot be satisfied
    pub fn allocate(
        &self,
        disks: &[DiskSpec],
        spaces: &[SpaceSpec],
    ) -> Result<Vec<DiskAllocation>> {
        let schema =
            ResolvedSchema::normalize(disks, spaces, self.options.container_kinds.as_slice())?;
        debug!("Disks: {:?}", schema.disks);
        debug!("Spaces: {:?}", schema.spaces);

        if schema.disks.is_empty() {
            debug!("No disks given, nothing to allocate");
            return Ok(Vec::new());
        }

        let program = ProgramBuilder::new(&schema.disks, &schema.spaces)
            .with_tuning(self.options.tuning)
            .build();

        debug!("Solving with {} solver", self.solver.name());
        let solution = self.solver.solve(&program)?;
        debug!("Static allocation vector: {:?}", solution);

        let allocations = reshape(&schema, &solution)?;
        info!(
            disks = allocations.len(),
            spaces = schema.spaces.len(),
            "Allocation complete"
        );

        Ok(allocations)
    }
}

/// Allocate with the default simplex solver and options.
pub fn allocate(disks: &[DiskSpec], spaces: &[SpaceSpec]) -> Result<Vec<DiskAllocation>> {
    Allocator::new().allocate(disks, spaces)
}

/// Split the row-major `disks × spaces` vector into per-disk allocations.
fn reshape(schema: &ResolvedSchema, solution: &[i64]) -> Result<Vec<DiskAllocation>> {
    let spaces_len = schema.spaces.len();
    let expected = schema.disks.len() * spaces_len;
    if solution.len() != expected {
        return Err(AllocationError::Solver(format!(
            "solver returned {} values, expected {}",
            solution.len(),
            expected
        )));
    }

    schema
        .disks
        .iter()
        .zip(solution.chunks(spaces_len))
        .map(|(disk, sizes)| -> Result<DiskAllocation> {
            let spaces = schema
                .spaces
                .iter()
                .zip(sizes)
                .map(|(space, &size)| -> Result<SpaceAllocation> {
                    let size = u64::try_from(size).map_err(|_| {
                        AllocationError::Solver(format!(
                            "solver returned negative size {} for space {} on disk {}",
                            size, space.id, disk.id
                        ))
                    })?;
                    Ok(SpaceAllocation {
                        space_id: space.id.clone(),
                        size,
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(DiskAllocation {
                disk_id: disk.id.clone(),
                size: disk.size,
                spaces,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;
    use crate::program::LinearProgram;
    use crate::schema::UNALLOCATED_ID;

    /// Returns a fixed vector regardless of the program
    struct FixedSolver(Vec<i64>);

    impl Solver for FixedSolver {
        fn solve(&self, _program: &LinearProgram) -> std::result::Result<Vec<i64>, SolverError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingSolver;

    impl Solver for FailingSolver {
        fn solve(&self, _program: &LinearProgram) -> std::result::Result<Vec<i64>, SolverError> {
            Err(SolverError::NoSolutionFound("infeasible".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn input() -> (Vec<DiskSpec>, Vec<SpaceSpec>) {
        (
            vec![DiskSpec::new("sda", 100), DiskSpec::new("sdb", 50)],
            vec![
                SpaceSpec::new("root", "lv").with_min_size(10),
                SpaceSpec::new("os", "vg"),
                SpaceSpec::new("swap", "partition").with_size(5),
            ],
        )
    }

    #[test]
    fn reshapes_solution_per_disk() {
        let (disks, spaces) = input();
        let allocator = Allocator::with_solver(FixedSolver(vec![60, 5, 35, 40, 0, 10]));

        let result = allocator.allocate(&disks, &spaces).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].disk_id, "sda");
        assert_eq!(result[0].size, 100);
        let ids: Vec<&str> = result[0]
            .spaces
            .iter()
            .map(|space| space.space_id.as_str())
            .collect();
        assert_eq!(ids, vec!["root", "swap", UNALLOCATED_ID]);
        assert_eq!(result[0].space_size("root"), Some(60));
        assert_eq!(result[1].space_size("root"), Some(40));
        assert_eq!(result[1].space_size(UNALLOCATED_ID), Some(10));
    }

    #[test]
    fn rejects_solution_of_wrong_length() {
        let (disks, spaces) = input();
        let allocator = Allocator::with_solver(FixedSolver(vec![1, 2, 3]));

        assert!(matches!(
            allocator.allocate(&disks, &spaces),
            Err(AllocationError::Solver(_))
        ));
    }

    #[test]
    fn rejects_negative_sizes() {
        let (disks, spaces) = input();
        let allocator = Allocator::with_solver(FixedSolver(vec![60, -1, 35, 40, 0, 10]));

        match allocator.allocate(&disks, &spaces) {
            Err(AllocationError::Solver(msg)) => {
                assert!(msg.contains("swap"));
                assert!(msg.contains("sda"));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn solver_failure_is_no_solution_found() {
        let (disks, spaces) = input();
        let allocator = Allocator::with_solver(FailingSolver);

        assert_eq!(
            allocator.allocate(&disks, &spaces),
            Err(AllocationError::NoSolutionFound("infeasible".to_string()))
        );
    }

    #[test]
    fn no_disks_means_no_allocation() {
        let allocator = Allocator::with_solver(FailingSolver);

        let result = allocator
            .allocate(&[], &[SpaceSpec::new("root", "lv")])
            .unwrap();

        assert!(result.is_empty());
    }

    #[test]
    fn custom_container_kinds() {
        let (disks, spaces) = input();
        let options = AllocatorOptions {
            container_kinds: vec!["partition".to_string()],
            ..AllocatorOptions::default()
        };
        // root, os and the sink remain
        let allocator =
            Allocator::with_solver(FixedSolver(vec![10, 0, 90, 0, 0, 50])).with_options(options);

        let result = allocator.allocate(&disks, &spaces).unwrap();

        assert_eq!(result[0].space_size("os"), Some(0));
        assert_eq!(result[0].space_size("swap"), None);
    }

    #[test]
    fn options_from_partial_document_keep_defaults() {
        let options: AllocatorOptions =
            serde_json::from_str(r#"{"tuning": {"affinity_bonus": 4.0}}"#).unwrap();

        assert_eq!(options.tuning.affinity_bonus, 4.0);
        assert_eq!(options.tuning.none_order_coefficient, 1.0);
        assert_eq!(options.container_kinds, vec!["vg", "volume-group"]);
    }
}
