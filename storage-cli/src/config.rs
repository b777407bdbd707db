// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storage_allocator::AllocatorOptions;

const CONFIG_DIR: &str = "storage-allocator";
const CONFIG_FILE: &str = "config.toml";

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LoggingLevel,
    pub log_to_disk: bool,
    /// Directory for rolling log files, defaults to the XDG state dir
    pub log_dir: Option<PathBuf>,
    /// `tuning` and `container_kinds` tables
    #[serde(flatten)]
    pub allocator: AllocatorOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LoggingLevel::Info,
            log_to_disk: false,
            log_dir: None,
            allocator: AllocatorOptions::default(),
        }
    }
}

impl Config {
    /// Load `path` if given, else the user config file if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }
}

fn default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join(CONFIG_DIR).join(CONFIG_FILE));
    }

    std::env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    })
}
