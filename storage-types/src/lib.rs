// SPDX-License-Identifier: GPL-3.0-only

//! Canonical data models for the storage allocator
//!
//! This crate defines the records exchanged between the allocation engine and
//! its collaborators:
//!
//! - **storage-allocator**: Consumes the input specs and returns allocations
//! - **storage-cli**: Loads the specs from files and renders the allocations
//!
//! ## Input
//! - `HardwareInfo` → list of `DiskSpec` as reported by discovery
//! - `SpaceSchema` → list of `SpaceSpec`, one per entry of the resolved schema
//!
//! ## Output
//! - `DiskAllocation` → per-disk list of `SpaceAllocation`
//!
//! Input specs are deliberately loose (every field optional, unknown keys kept)
//! so that validation happens in one place, inside the allocator.

pub mod allocation;
pub mod common;
pub mod schema;

pub use allocation::{DiskAllocation, SpaceAllocation, total_allocated};
pub use common::{format_size, get_numeric};
pub use schema::{DiskSpec, HardwareInfo, SpaceSchema, SpaceSpec};
