// SPDX-License-Identifier: GPL-3.0-only

//! Static allocation of storage spaces onto disks
//!
//! Given the disks of a machine and a schema of spaces (partitions, logical
//! volumes, ...) with size limits, relative weights and disk preferences, the
//! allocator decides how many MiB of every space go to every disk.
//!
//! ## Pipeline
//! - `schema` → validates the input and drops container spaces
//! - `builder` → formulates the problem as a `LinearProgram`
//! - `solver` → solves the program and rounds the result down
//! - `allocator` → ties the steps together and reshapes the result
//!
//! ```no_run
//! use storage_allocator::allocate;
//! use storage_types::{DiskSpec, SpaceSpec};
//!
//! let disks = vec![DiskSpec::new("sda", 100)];
//! let spaces = vec![SpaceSpec::new("root", "lv").with_min_size(10)];
//! let allocation = allocate(&disks, &spaces)?;
//! # Ok::<(), storage_allocator::AllocationError>(())
//! ```

pub mod allocator;
pub mod builder;
pub mod error;
pub mod program;
pub mod schema;
pub mod sequence;
pub mod solver;

pub use allocator::{Allocator, AllocatorOptions, allocate};
pub use builder::{Equations, ObjectiveTuning, ProgramBuilder};
pub use error::{AllocationError, Result, SolverError};
pub use program::{Bound, ConstraintSystem, LinearProgram, LpType, OptimizationType};
pub use schema::{DEFAULT_CONTAINER_KINDS, Disk, ResolvedSchema, Space, UNALLOCATED_ID};
pub use solver::{SimplexSolver, Solver, round_down};
