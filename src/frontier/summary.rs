//! Descriptive statistics of frontier metric columns.

use serde::{Deserialize, Serialize};

use super::FrontierTable;

/// Descriptive statistics for one metric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    /// Number of values.
    pub count: usize,
    /// Mean value.
    pub mean: f64,
    /// Median value.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl MetricSummary {
    /// Compute summary statistics for a slice of values.
    ///
    /// Returns `None` if the slice is empty.
    #[must_use]
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / count as f64;

        let mid = count / 2;
        let median = if count % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            count,
            mean,
            median,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
        })
    }

    /// Distance between the extremes.
    #[must_use]
    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

/// Summaries of both metric columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierSummary {
    pub return_metric: MetricSummary,
    pub emissions_metric: MetricSummary,
}

impl FrontierTable {
    /// Summarize both metric columns; `None` for an empty table.
    #[must_use]
    pub fn summary(&self) -> Option<FrontierSummary> {
        let returns: Vec<f64> = self.iter().map(|r| r.return_value).collect();
        let emissions: Vec<f64> = self.iter().map(|r| r.emissions_value).collect();

        Some(FrontierSummary {
            return_metric: MetricSummary::compute(&returns)?,
            emissions_metric: MetricSummary::compute(&emissions)?,
        })
    }
}
