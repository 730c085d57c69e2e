//! Full sweep command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::{info, warn};
use rsm_frontier::{FrontierReport, FrontierTable, SweepSession};

use super::{Overrides, load_config};

pub fn run(
    config: Option<PathBuf>,
    overrides: &Overrides,
    output: Option<PathBuf>,
    report: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config.as_deref(), overrides)?;
    let delimiter = config.delimiter_byte();
    let variant = config.variant;
    let session = SweepSession::new(config)?;

    let run = session.run_outcome().context("Sweep failed")?;
    let anchors = run.anchors;

    if let Some(failure) = run.outcome.failure {
        if let Some(path) = &output {
            let partial = partial_path(path);
            run.outcome
                .table
                .write_csv(&partial, delimiter)
                .with_context(|| format!("Failed to write partial table: {}", partial.display()))?;
            warn!("wrote {} partial records to {}", run.outcome.table.len(), partial.display());
        }
        bail!("Sweep aborted: {failure}");
    }

    let report_data = FrontierReport::new(variant, anchors, run.outcome.table);
    print_summary(&report_data);

    session
        .write_outputs(&report_data, output.as_deref(), report.as_deref())
        .context("Failed to write outputs")?;

    if output.is_none() && report.is_none() {
        info!("no output path given; results were not saved");
    }

    Ok(())
}

/// `frontier.csv` becomes `frontier.partial.csv`.
fn partial_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.partial.{}", ext.to_string_lossy()),
        None => format!("{stem}.partial"),
    };
    path.with_file_name(name)
}

fn print_summary(report: &FrontierReport) {
    let anchors = &report.anchors;
    println!("Variant: {}", report.variant);
    println!(
        "Return anchor:    {:.6} at (CA={:.4}, EC={:.4}, EU={:.4})",
        anchors.return_anchor.value,
        anchors.return_anchor.point.ca,
        anchors.return_anchor.point.ec,
        anchors.return_anchor.point.eu
    );
    println!(
        "Emissions anchor: {:.6} at (CA={:.4}, EC={:.4}, EU={:.4})",
        anchors.emissions_anchor.value,
        anchors.emissions_anchor.point.ca,
        anchors.emissions_anchor.point.ec,
        anchors.emissions_anchor.point.eu
    );
    println!();

    print_table_stats(&report.table);
}

pub(crate) fn print_table_stats(table: &FrontierTable) {
    println!("Records: {}", table.len());
    if let Some(summary) = table.summary() {
        println!("{:-<60}", "");
        let columns = [
            ("Return", summary.return_metric),
            ("Emissions", summary.emissions_metric),
        ];
        for (name, s) in columns {
            println!("{name}:");
            println!("  Mean: {:.6}, Median: {:.6}", s.mean, s.median);
            println!("  Min: {:.6}, Max: {:.6}", s.min, s.max);
            println!("  StdDev: {:.6}", s.std_dev);
        }
    }
}
