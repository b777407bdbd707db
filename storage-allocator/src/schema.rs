// SPDX-License-Identifier: GPL-3.0-only

//! Schema model and normalization
//!
//! Turns the loose `DiskSpec`/`SpaceSpec` input records into validated `Disk`
//! and `Space` records with every default applied, drops container-only
//! spaces and appends the `unallocated` sink.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use storage_types::{DiskSpec, SpaceSpec};
use tracing::debug;

use crate::error::{AllocationError, Result};

/// Identifier and type of the synthetic sink space
pub const UNALLOCATED_ID: &str = "unallocated";

/// Space types which only group other spaces and are never sized directly
pub const DEFAULT_CONTAINER_KINDS: &[&str] = &["vg", "volume-group"];

const DEFAULT_WEIGHT: f64 = 1.0;

/// A validated physical disk
#[derive(Debug, Clone, PartialEq)]
pub struct Disk {
    pub id: String,
    pub size: u64,
    pub additional_parameters: BTreeMap<String, Value>,
}

impl Disk {
    pub fn new(id: impl Into<String>, size: u64) -> Self {
        Self {
            id: id.into(),
            size,
            additional_parameters: BTreeMap::new(),
        }
    }
}

impl TryFrom<&DiskSpec> for Disk {
    type Error = AllocationError;

    fn try_from(spec: &DiskSpec) -> Result<Self> {
        match (&spec.id, spec.size) {
            (Some(id), Some(size)) => Ok(Self {
                id: id.clone(),
                size,
                additional_parameters: spec.extra.clone(),
            }),
            _ => {
                let mut missing = Vec::new();
                if spec.id.is_none() {
                    missing.push("id");
                }
                if spec.size.is_none() {
                    missing.push("size");
                }
                Err(missing_fields("disk", spec.id.as_deref(), &missing))
            }
        }
    }
}

/// A validated allocatable space
#[derive(Debug, Clone, PartialEq)]
pub struct Space {
    pub id: String,
    pub kind: String,
    pub min_size: u64,
    pub max_size: Option<u64>,
    pub weight: f64,
    pub best_with_disks: BTreeSet<String>,
    pub none_order: bool,
    pub additional_parameters: BTreeMap<String, Value>,
}

impl Space {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            min_size: 0,
            max_size: None,
            weight: DEFAULT_WEIGHT,
            best_with_disks: BTreeSet::new(),
            none_order: false,
            additional_parameters: BTreeMap::new(),
        }
    }

    /// The sink which absorbs capacity left over by every other space.
    pub fn unallocated() -> Self {
        Self {
            none_order: true,
            weight: 0.0,
            ..Self::new(UNALLOCATED_ID, UNALLOCATED_ID)
        }
    }

    pub fn is_unallocated(&self) -> bool {
        self.id == UNALLOCATED_ID && self.kind == UNALLOCATED_ID
    }
}

impl TryFrom<&SpaceSpec> for Space {
    type Error = AllocationError;

    fn try_from(spec: &SpaceSpec) -> Result<Self> {
        let (id, kind) = match (&spec.id, &spec.kind) {
            (Some(id), Some(kind)) => (id.clone(), kind.clone()),
            _ => {
                let mut missing = Vec::new();
                if spec.id.is_none() {
                    missing.push("id");
                }
                if spec.kind.is_none() {
                    missing.push("type");
                }
                return Err(missing_fields("space", spec.id.as_deref(), &missing));
            }
        };

        let weight = spec.weight.unwrap_or(DEFAULT_WEIGHT);
        if !weight.is_finite() || weight < 0.0 {
            return Err(AllocationError::InvalidData(format!(
                "space \"{id}\" has invalid weight {weight}, expected a non-negative number"
            )));
        }

        // Exact size is represented as equal min and max.
        let (min_size, max_size) = match spec.size {
            Some(size) => (size, Some(size)),
            None => (spec.min_size.unwrap_or(0), spec.max_size),
        };

        Ok(Self {
            id,
            kind,
            min_size,
            max_size,
            weight,
            best_with_disks: spec
                .best_with_disks
                .iter()
                .flatten()
                .cloned()
                .collect(),
            none_order: spec.none_order.unwrap_or(false),
            additional_parameters: spec.extra.clone(),
        })
    }
}

/// Disks and spaces ready for the program builder
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub disks: Vec<Disk>,
    pub spaces: Vec<Space>,
}

impl ResolvedSchema {
    /// Validate and normalize the input.
    ///
    /// Spaces whose type is one of `container_kinds` are dropped, and the
    /// `unallocated` sink is appended as the last space. A space may not use
    /// the sink id itself.
    pub fn normalize<K: AsRef<str>>(
        disks: &[DiskSpec],
        spaces: &[SpaceSpec],
        container_kinds: &[K],
    ) -> Result<Self> {
        let disks = disks.iter().map(Disk::try_from).collect::<Result<Vec<_>>>()?;

        let mut normalized = Vec::with_capacity(spaces.len() + 1);
        for spec in spaces {
            let space = Space::try_from(spec)?;
            if container_kinds
                .iter()
                .any(|kind| kind.as_ref() == space.kind)
            {
                debug!("Skipping container space {} ({})", space.id, space.kind);
                continue;
            }
            if space.id == UNALLOCATED_ID {
                return Err(AllocationError::InvalidData(format!(
                    "space id \"{UNALLOCATED_ID}\" is reserved for leftover disk capacity"
                )));
            }
            normalized.push(space);
        }
        normalized.push(Space::unallocated());

        Ok(Self {
            disks,
            spaces: normalized,
        })
    }
}

fn missing_fields(what: &str, id: Option<&str>, missing: &[&str]) -> AllocationError {
    AllocationError::InvalidData(format!(
        "cannot create {} \"{}\", required parameters are not provided: {}",
        what,
        id.unwrap_or("<unnamed>"),
        missing.join(", ")
    ))
}
