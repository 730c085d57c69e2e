//! Subcommand implementations.

pub mod anchors;
pub mod front;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result};
use rsm_frontier::{ProcessVariant, SweepConfig};

/// Command-line values that take precedence over the config file.
pub struct Overrides {
    pub variant: Option<ProcessVariant>,
    pub points: Option<usize>,
    pub parallel: bool,
}

/// Load the config file if given, then apply command-line overrides.
pub fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<SweepConfig> {
    let mut config = match path {
        Some(path) => SweepConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SweepConfig::default(),
    };

    if let Some(variant) = overrides.variant {
        config.variant = variant;
    }
    if let Some(points) = overrides.points {
        config.points = points;
        config.weights = None;
    }
    if overrides.parallel {
        config.parallel = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
