//! Dominance checks over frontier records.
//!
//! Both metrics are maximized. A weighted-sum sweep with a local solver can
//! still emit dominated records on a nonconvex landscape, so these checks
//! are how a finished table is audited.

use super::{FrontierRecord, FrontierTable};

impl FrontierRecord {
    /// Check if this record dominates another within `tolerance`.
    ///
    /// A record dominates another if it is at least as good on both metrics
    /// and better by more than `tolerance` on at least one.
    #[must_use]
    pub fn dominates(&self, other: &Self, tolerance: f64) -> bool {
        let better_or_equal_return = self.return_value >= other.return_value - tolerance;
        let better_or_equal_emissions = self.emissions_value >= other.emissions_value - tolerance;
        let strictly_better = self.return_value > other.return_value + tolerance
            || self.emissions_value > other.emissions_value + tolerance;

        better_or_equal_return && better_or_equal_emissions && strictly_better
    }
}

impl FrontierTable {
    /// Records not dominated by any other record, in table order.
    #[must_use]
    pub fn non_dominated(&self, tolerance: f64) -> FrontierTable {
        let mut front: Vec<usize> = Vec::new();

        for (i, record) in self.records().iter().enumerate() {
            let records = self.records();
            // Check if any existing front record dominates this one
            let is_dominated = front.iter().any(|&j| records[j].dominates(record, tolerance));

            if !is_dominated {
                // Remove any front records that this one dominates
                front.retain(|&j| !record.dominates(&records[j], tolerance));
                front.push(i);
            }
        }

        front.sort_unstable();
        FrontierTable::from_records(
            front.into_iter().map(|i| self.records()[i]).collect(),
            self.is_constrained(),
        )
    }

    /// Pairs `(i, j)` where record `i` dominates record `j`.
    #[must_use]
    pub fn dominated_pairs(&self, tolerance: f64) -> Vec<(usize, usize)> {
        let records = self.records();
        let mut pairs = Vec::new();
        for (i, a) in records.iter().enumerate() {
            for (j, b) in records.iter().enumerate() {
                if i != j && a.dominates(b, tolerance) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}
