//! Non-dominated subset of an existing frontier table.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use rsm_frontier::FrontierTable;

use super::run::print_table_stats;

pub fn run(input: PathBuf, delimiter: char, tolerance: f64) -> Result<()> {
    let Ok(delimiter) = u8::try_from(delimiter) else {
        bail!("Delimiter must be a single ASCII character, got '{delimiter}'");
    };

    let table = FrontierTable::read_csv(&input, delimiter)
        .with_context(|| format!("Failed to read table: {}", input.display()))?;

    if table.is_empty() {
        bail!("No records found in {}", input.display());
    }

    let front = table.non_dominated(tolerance);
    let dominated = table.dominated_pairs(tolerance);

    println!(
        "Non-dominated: {} of {} records ({} dominance pairs)",
        front.len(),
        table.len(),
        dominated.len()
    );
    println!();
    println!(
        "{:>8} {:>10} {:>10} {:>10} {:>12} {:>12}",
        "w", "CA", "EC", "EU", "return", "emissions"
    );
    println!("{:-<68}", "");
    for record in &front {
        println!(
            "{:>8.4} {:>10.4} {:>10.4} {:>10.4} {:>12.6} {:>12.6}",
            record.weight_return,
            record.point.ca,
            record.point.ec,
            record.point.eu,
            record.return_value,
            record.emissions_value
        );
    }
    println!();

    print_table_stats(&table);

    Ok(())
}
