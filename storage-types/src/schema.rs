//! Hardware and spaces schema input models
//!
//! These records mirror the documents handed to the allocator after selector
//! expressions have been evaluated. Every field is optional here; the allocator
//! validates required fields and applies defaults when it builds its own
//! `Disk` and `Space` records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hardware information document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    /// Physical disks available for allocation, in discovery order
    #[serde(default)]
    pub disks: Vec<DiskSpec>,

    /// Any other hardware facts (memory, interfaces, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A physical disk as described in the hardware information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskSpec {
    /// Disk identifier (e.g. "sda" or a by-id name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Total size of the disk in allocation units (MiB)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Unrecognized keys such as `path` or `model`
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl DiskSpec {
    pub fn new(id: impl Into<String>, size: u64) -> Self {
        Self {
            id: Some(id.into()),
            size: Some(size),
            extra: BTreeMap::new(),
        }
    }
}

/// One entry of the resolved spaces schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceSpec {
    // === Identity ===
    /// Space identifier, unique within the schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Space type (e.g. "partition", "lv", "vg")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    // === Sizing ===
    /// Lower bound of the total size of the space
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,

    /// Upper bound of the total size of the space
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,

    /// Exact size, shorthand for equal `min_size` and `max_size`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Relative share among otherwise interchangeable spaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    // === Placement ===
    /// Disk identifiers this space prefers to live on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_with_disks: Option<Vec<String>>,

    /// Exempt the space from declaration-order priority
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub none_order: Option<bool>,

    /// Unrecognized keys such as `mount` or `file_system`
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SpaceSpec {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = Some(min_size);
        self
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_best_with_disks<I, S>(mut self, disks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.best_with_disks = Some(disks.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_none_order(mut self, none_order: bool) -> Self {
        self.none_order = Some(none_order);
        self
    }
}

/// Resolved spaces schema document
///
/// Accepted either as `{ "spaces": [...] }` or as a bare list of spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpaceSchema {
    Document { spaces: Vec<SpaceSpec> },
    List(Vec<SpaceSpec>),
}

impl SpaceSchema {
    pub fn spaces(&self) -> &[SpaceSpec] {
        match self {
            Self::Document { spaces } | Self::List(spaces) => spaces,
        }
    }

    pub fn into_spaces(self) -> Vec<SpaceSpec> {
        match self {
            Self::Document { spaces } | Self::List(spaces) => spaces,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_spec_reads_type_and_keeps_unknown_keys() {
        let json = r#"{
            "id": "root",
            "type": "lv",
            "min_size": 10,
            "mount": "/",
            "file_system": "ext4"
        }"#;

        let space: SpaceSpec = serde_json::from_str(json).unwrap();

        assert_eq!(space.id.as_deref(), Some("root"));
        assert_eq!(space.kind.as_deref(), Some("lv"));
        assert_eq!(space.min_size, Some(10));
        assert_eq!(space.max_size, None);
        assert_eq!(space.weight, None);
        assert_eq!(space.extra.len(), 2);
        assert_eq!(space.extra["mount"], Value::from("/"));
    }

    #[test]
    fn test_space_spec_missing_fields_stay_empty() {
        let space: SpaceSpec = serde_json::from_str(r#"{"min_size": 5}"#).unwrap();

        assert!(space.id.is_none());
        assert!(space.kind.is_none());
        assert!(space.best_with_disks.is_none());
    }

    #[test]
    fn test_hardware_info_serialization() {
        let mut disk = DiskSpec::new("sda", 1024);
        disk.extra
            .insert("path".to_string(), Value::from("/dev/disk/by-id/ata-1"));
        let info = HardwareInfo {
            disks: vec![disk, DiskSpec::new("sdb", 2048)],
            extra: BTreeMap::new(),
        };

        let json = serde_json::to_string(&info).unwrap();
        let deserialized: HardwareInfo = serde_json::from_str(&json).unwrap();

        assert_eq!(info, deserialized);
        assert!(json.contains("\"path\""));
    }

    #[test]
    fn test_builder_helpers() {
        let space = SpaceSpec::new("data", "partition")
            .with_min_size(100)
            .with_weight(2.0)
            .with_best_with_disks(["sdb"]);

        assert_eq!(space.min_size, Some(100));
        assert_eq!(space.weight, Some(2.0));
        assert_eq!(space.best_with_disks, Some(vec!["sdb".to_string()]));
    }

    #[test]
    fn test_space_schema_accepts_both_shapes() {
        let wrapped: SpaceSchema =
            serde_json::from_str(r#"{"spaces": [{"id": "root", "type": "lv"}]}"#).unwrap();
        let bare: SpaceSchema =
            serde_json::from_str(r#"[{"id": "root", "type": "lv"}, {"id": "swap"}]"#).unwrap();
        let empty: SpaceSchema = serde_json::from_str("[]").unwrap();

        assert!(matches!(wrapped, SpaceSchema::Document { .. }));
        assert_eq!(wrapped.spaces().len(), 1);
        assert_eq!(bare.spaces()[1].id.as_deref(), Some("swap"));
        assert!(empty.into_spaces().is_empty());
    }
}
