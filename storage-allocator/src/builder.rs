// SPDX-License-Identifier: GPL-3.0-only

//! Program builder
//!
//! Formulates the allocation of `spaces` onto `disks` as a linear program.
//! For every (disk, space) pair there is one variable, the size of the space
//! on that disk, stored at index `disk_idx * spaces.len() + space_idx`.
//!
//! With two disks and two spaces the variables are laid out as
//!
//! ```text
//! x0 = space 0 on disk 0    x1 = space 1 on disk 0
//! x2 = space 0 on disk 1    x3 = space 1 on disk 1
//! ```

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::program::{ConstraintSystem, LinearProgram};
use crate::schema::{Disk, Space};
use crate::sequence;

/// Constants of the objective function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveTuning {
    /// Flat coefficient for spaces whose order does not matter
    pub none_order_coefficient: f64,

    /// Bonus for placing a space on one of its preferred disks
    pub affinity_bonus: f64,
}

impl Default for ObjectiveTuning {
    fn default() -> Self {
        Self {
            none_order_coefficient: 1.0,
            affinity_bonus: 2.0,
        }
    }
}

/// Constraint systems produced by one family of constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Equations {
    pub equality: ConstraintSystem,
    pub lower: ConstraintSystem,
    pub upper: ConstraintSystem,
}

impl Equations {
    /// Row-wise concatenation of both sets of systems.
    pub fn merge(mut self, other: Equations) -> Equations {
        self.equality.extend(other.equality);
        self.lower.extend(other.lower);
        self.upper.extend(other.upper);
        self
    }
}

/// Key of a weight-equivalence class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct WeightClassKey<'a> {
    min_size: u64,
    max_size: Option<u64>,
    best_with_disks: &'a BTreeSet<String>,
}

pub struct ProgramBuilder<'a> {
    disks: &'a [Disk],
    spaces: &'a [Space],
    tuning: ObjectiveTuning,
    /// Indexes of the disks each space prefers, by space index
    affinity: Vec<BTreeSet<usize>>,
}

impl<'a> ProgramBuilder<'a> {
    pub fn new(disks: &'a [Disk], spaces: &'a [Space]) -> Self {
        let affinity = spaces
            .iter()
            .map(|space| {
                let matched: BTreeSet<usize> = disks
                    .iter()
                    .enumerate()
                    .filter(|(_, disk)| space.best_with_disks.contains(&disk.id))
                    .map(|(idx, _)| idx)
                    .collect();
                if matched.len() < space.best_with_disks.len() {
                    warn!(
                        "Space {} prefers disks which are not present: {:?}",
                        space.id, space.best_with_disks
                    );
                }
                matched
            })
            .collect();

        Self {
            disks,
            spaces,
            tuning: ObjectiveTuning::default(),
            affinity,
        }
    }

    pub fn with_tuning(mut self, tuning: ObjectiveTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Amount of variables, one per (disk, space) pair
    pub fn x_amount(&self) -> usize {
        self.disks.len() * self.spaces.len()
    }

    pub fn build(&self) -> LinearProgram {
        let equations = self
            .space_size_constraints()
            .merge(self.disk_size_constraints())
            .merge(self.weight_constraints());

        let mut program = LinearProgram::new(self.x_amount());
        program.maximize_objective_function();
        program.objective_function_coefficients = self.objective_function_coefficients();
        program.equality = equations.equality;
        program.lower = equations.lower;
        program.upper = equations.upper;

        debug!(
            variables = program.x_amount,
            equality = program.equality.len(),
            lower = program.lower.len(),
            upper = program.upper.len(),
            "Built linear program"
        );

        program
    }

    fn index(&self, disk_idx: usize, space_idx: usize) -> usize {
        disk_idx * self.spaces.len() + space_idx
    }

    fn make_row(&self) -> Vec<f64> {
        vec![0.0; self.x_amount()]
    }

    /// Min and max constraints for each space.
    ///
    /// For 2 disks, the first space with `min_size = 10` and `max_size = 20`:
    ///
    /// ```text
    /// 1 * x0 + 0 * x1 + 1 * x2 + 0 * x3 >= 10
    /// 1 * x0 + 0 * x1 + 1 * x2 + 0 * x3 <= 20
    /// ```
    pub fn space_size_constraints(&self) -> Equations {
        let mut equations = Equations::default();

        for (space_idx, space) in self.spaces.iter().enumerate() {
            let mut row = self.make_row();
            for disk_idx in 0..self.disks.len() {
                row[self.index(disk_idx, space_idx)] = 1.0;
            }

            if let Some(max_size) = space.max_size {
                equations.upper.push(row.clone(), max_size as f64);
            }
            equations.lower.push(row, space.min_size as f64);
        }

        equations
    }

    /// Sum of all spaces on a disk must not exceed the disk size.
    pub fn disk_size_constraints(&self) -> Equations {
        let mut equations = Equations::default();

        for (disk_idx, disk) in self.disks.iter().enumerate() {
            let mut row = self.make_row();
            for space_idx in 0..self.spaces.len() {
                row[self.index(disk_idx, space_idx)] = 1.0;
            }
            equations.upper.push(row, disk.size as f64);
        }

        equations
    }

    /// Proportional sizing of interchangeable spaces.
    ///
    /// Spaces with equal `min_size`, `max_size` and `best_with_disks` form a
    /// class. Every weighted member is tied to the first weighted member of
    /// its class, one row per disk `d`:
    ///
    /// ```text
    /// x[d, pivot] / weight(pivot) - x[d, member] / weight(member) = 0
    /// ```
    ///
    /// Members with weight 0 take no part in the ties.
    pub fn weight_constraints(&self) -> Equations {
        let mut equations = Equations::default();

        for class in self.weight_classes() {
            let mut weighted = class
                .into_iter()
                .filter(|&space_idx| self.spaces[space_idx].weight != 0.0);

            let Some(pivot_idx) = weighted.next() else {
                continue;
            };
            let pivot_weight = self.spaces[pivot_idx].weight;

            for space_idx in weighted {
                let weight = self.spaces[space_idx].weight;
                for disk_idx in 0..self.disks.len() {
                    let mut row = self.make_row();
                    row[self.index(disk_idx, pivot_idx)] = 1.0 / pivot_weight;
                    row[self.index(disk_idx, space_idx)] = -1.0 / weight;
                    equations.equality.push(row, 0.0);
                }
            }
        }

        equations
    }

    /// Space indexes grouped by weight class, classes in order of first
    /// appearance and members in declaration order.
    fn weight_classes(&self) -> Vec<Vec<usize>> {
        let mut positions: HashMap<WeightClassKey<'_>, usize> = HashMap::new();
        let mut classes: Vec<Vec<usize>> = Vec::new();

        for (space_idx, space) in self.spaces.iter().enumerate() {
            let key = WeightClassKey {
                min_size: space.min_size,
                max_size: space.max_size,
                best_with_disks: &space.best_with_disks,
            };
            let position = *positions.entry(key).or_insert_with(|| {
                classes.push(Vec::new());
                classes.len() - 1
            });
            classes[position].push(space_idx);
        }

        classes
    }

    /// Objective coefficients, sign-flipped for a minimizing solver.
    ///
    /// Earlier spaces get higher coefficients so that they are allocated in
    /// schema order; see `crate::sequence`. Spaces with `none_order` get a
    /// flat coefficient. A space gets the affinity bonus on its preferred
    /// disks, or, if it has no preference, on the disks no space prefers.
    pub fn objective_function_coefficients(&self) -> Vec<f64> {
        let mut coefficients: Vec<f64> = sequence::terms(self.x_amount())
            .map(|term| 1.0 / term as f64)
            .collect();

        let claimed: BTreeSet<usize> = self.affinity.iter().flatten().copied().collect();

        for (space_idx, space) in self.spaces.iter().enumerate() {
            let preferred = &self.affinity[space_idx];

            for disk_idx in 0..self.disks.len() {
                let c_idx = self.index(disk_idx, space_idx);

                if space.none_order {
                    coefficients[c_idx] = self.tuning.none_order_coefficient;
                    continue;
                }

                let bonus = if preferred.is_empty() {
                    !claimed.contains(&disk_idx)
                } else {
                    preferred.contains(&disk_idx)
                };
                if bonus {
                    coefficients[c_idx] += self.tuning.affinity_bonus;
                }
            }
        }

        // The solver minimizes, while disks should be maximally allocated.
        coefficients.into_iter().map(|c| -c).collect()
    }
}
