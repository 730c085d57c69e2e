//! Anchor resolution command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rsm_frontier::{Anchor, SweepSession};

use super::{Overrides, load_config};

pub fn run(config: Option<PathBuf>, overrides: &Overrides) -> Result<()> {
    let config = load_config(config.as_deref(), overrides)?;
    let variant = config.variant;
    let session = SweepSession::new(config)?;

    let resolved = session.resolve_anchors().context("Failed to resolve anchors")?;

    println!("Variant: {variant}");
    println!("{:<10} {:>12} {:>10} {:>10} {:>10}", "metric", "value", "CA", "EC", "EU");
    println!("{:-<56}", "");
    print_anchor(&resolved.return_anchor);
    print_anchor(&resolved.emissions_anchor);

    Ok(())
}

fn print_anchor(anchor: &Anchor) {
    println!(
        "{:<10} {:>12.6} {:>10.4} {:>10.4} {:>10.4}",
        anchor.metric.name(),
        anchor.value,
        anchor.point.ca,
        anchor.point.ec,
        anchor.point.eu
    );
}
