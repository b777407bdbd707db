//! Static allocation models
//!
//! The allocator output: one `DiskAllocation` per input disk, listing the size
//! every space received on that disk (zero sizes included).

use serde::{Deserialize, Serialize};

/// Allocation result for a single disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskAllocation {
    /// Identifier of the disk
    pub disk_id: String,

    /// Total size of the disk
    pub size: u64,

    /// Sizes of every space on this disk, in schema order
    pub spaces: Vec<SpaceAllocation>,
}

impl DiskAllocation {
    /// Sum of all space sizes on this disk
    pub fn allocated(&self) -> u64 {
        self.spaces.iter().map(|space| space.size).sum()
    }

    /// Capacity not assigned to any space, including rounding loss
    pub fn free(&self) -> u64 {
        self.size.saturating_sub(self.allocated())
    }

    /// Size of the given space on this disk
    pub fn space_size(&self, space_id: &str) -> Option<u64> {
        self.spaces
            .iter()
            .find(|space| space.space_id == space_id)
            .map(|space| space.size)
    }
}

/// Size of one space on one disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceAllocation {
    pub space_id: String,
    pub size: u64,
}

/// Total size of a space across all disks
pub fn total_allocated(allocations: &[DiskAllocation], space_id: &str) -> u64 {
    allocations
        .iter()
        .filter_map(|disk| disk.space_size(space_id))
        .sum()
}
