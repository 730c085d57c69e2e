//! Frontier records, the sweep's output table, and read-only analysis of it.
//!
//! - [`FrontierRecord`]: one solved weight with raw metric values
//! - [`FrontierTable`]: ordered, append-only collection of records
//! - [`FrontierReport`]: table plus anchors and metadata, for JSON output
//! - [`MetricSummary`]: descriptive statistics of a metric column

mod pareto;
mod summary;
mod table;

pub use summary::{FrontierSummary, MetricSummary};
pub use table::{FrontierRecord, FrontierReport, FrontierTable};
