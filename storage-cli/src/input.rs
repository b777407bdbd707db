// SPDX-License-Identifier: GPL-3.0-only

//! Loading input documents and writing the static schema

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use storage_types::{DiskAllocation, HardwareInfo, SpaceSchema, SpaceSpec};

/// Document format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Json,
        }
    }

    pub fn parse<T: DeserializeOwned>(self, text: &str) -> Result<T> {
        Ok(match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Toml => toml::from_str(text)?,
        })
    }
}

pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Format::from_path(path)
        .parse(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_hardware_info(path: &Path) -> Result<HardwareInfo> {
    load(path)
}

pub fn load_schema(path: &Path) -> Result<Vec<SpaceSpec>> {
    load::<SpaceSchema>(path).map(SpaceSchema::into_spaces)
}

/// Write the static schema as pretty JSON.
pub fn write_allocation(path: &Path, allocation: &[DiskAllocation]) -> Result<()> {
    let json = serde_json::to_string_pretty(allocation)?;
    fs::write(path, json + "\n").with_context(|| format!("Failed to write {}", path.display()))
}
