// SPDX-License-Identifier: GPL-3.0-only

//! Compile a dynamic spaces schema into a static per-disk allocation

mod config;
mod input;
mod logging;
mod viewer;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use storage_allocator::Allocator;
use tracing::info;

use crate::config::{Config, LoggingLevel};
use crate::viewer::{SvgViewer, TextViewer};

/// Allocate storage spaces onto the disks of a machine
#[derive(Parser, Debug)]
#[command(name = "storage-allocate", version)]
#[command(about = "Compute static disk allocation from a spaces schema", long_about = None)]
struct Cli {
    /// Hardware information with the list of disks
    #[arg(long = "hw-info", value_name = "FILE")]
    hw_info: PathBuf,

    /// Resolved spaces schema
    #[arg(long, value_name = "FILE")]
    schema: PathBuf,

    /// Write the static schema here as JSON
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Write an SVG picture of the allocation here
    #[arg(long, value_name = "FILE")]
    svg: Option<PathBuf>,

    /// Config file, defaults to $XDG_CONFIG_HOME/storage-allocator/config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, value_enum)]
    log_level: Option<LoggingLevel>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    logging::init(&config);

    let hw_info = input::load_hardware_info(&cli.hw_info)?;
    let spaces = input::load_schema(&cli.schema)?;
    info!(
        disks = hw_info.disks.len(),
        spaces = spaces.len(),
        "Loaded allocation input"
    );

    let allocation = Allocator::new()
        .with_options(config.allocator.clone())
        .allocate(&hw_info.disks, &spaces)
        .context("Allocation failed")?;

    print!("{}", TextViewer::new(&allocation).render());

    if let Some(path) = &cli.file {
        input::write_allocation(path, &allocation)?;
        info!("Static schema written to {}", path.display());
    }

    if let Some(path) = &cli.svg {
        fs::write(path, SvgViewer::new(&allocation).render())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Picture written to {}", path.display());
    }

    Ok(())
}
