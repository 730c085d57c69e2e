//! Scalarization weight grids.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ascending weights in `[0, 1]` placed on the return metric.
///
/// The emissions metric receives the complement `1 - w`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct WeightGrid {
    weights: Vec<f64>,
}

impl WeightGrid {
    /// Grid size used by the reference study.
    pub const REFERENCE_POINTS: usize = 10_000;

    /// `points` equally spaced weights from 0 to 1, both endpoints included exactly.
    pub fn linspace(points: usize) -> Result<Self> {
        if points < 2 {
            return Err(Error::InvalidWeightGrid(format!(
                "need at least 2 points to cover both endpoints, got {points}"
            )));
        }
        let last = (points - 1) as f64;
        Ok(Self {
            weights: (0..points).map(|k| k as f64 / last).collect(),
        })
    }

    /// Explicit weights; must be finite, in `[0, 1]` and strictly ascending.
    pub fn from_weights(weights: Vec<f64>) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::InvalidWeightGrid("grid is empty".to_string()));
        }
        if let Some((i, w)) = weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(0.0..=1.0).contains(*w))
        {
            return Err(Error::InvalidWeightGrid(format!(
                "weight {w} at index {i} is outside [0, 1]"
            )));
        }
        if let Some(i) = weights.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(Error::InvalidWeightGrid(format!(
                "weights must be strictly ascending: {} at index {} follows {}",
                weights[i + 1],
                i + 1,
                weights[i]
            )));
        }
        Ok(Self { weights })
    }

    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights.iter().copied()
    }
}

impl TryFrom<Vec<f64>> for WeightGrid {
    type Error = Error;

    fn try_from(weights: Vec<f64>) -> Result<Self> {
        Self::from_weights(weights)
    }
}

impl From<WeightGrid> for Vec<f64> {
    fn from(grid: WeightGrid) -> Self {
        grid.weights
    }
}
