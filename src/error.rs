//! Error types for frontier tracing.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::solver::SolveStatus;
use crate::surface::Metric;

/// Result type alias for rsm-frontier operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Where in the pipeline a solver call was issued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Single-objective anchor resolution for one metric.
    Anchor(Metric),
    /// One iteration of the scalarization sweep.
    Sweep {
        /// Weight on the return metric for this iteration.
        weight: f64,
    },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchor(metric) => write!(f, "anchor: {}", metric.name()),
            Self::Sweep { weight } => write!(f, "weight {weight}"),
        }
    }
}

/// Errors that can occur while resolving anchors or sweeping weights.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The solver stopped without reaching a stationary point.
    #[error("Solver did not converge ({stage}): {status} after {iterations} iterations")]
    SolverNonConvergence {
        /// Stage that issued the solver call.
        stage: Stage,
        /// Termination status reported by the solver.
        status: SolveStatus,
        /// Iterations spent before giving up.
        iterations: usize,
    },

    /// An anchor is zero, negative or not finite, so normalization is undefined.
    #[error("Degenerate anchor for {metric}: {value} (normalization requires a positive anchor)")]
    DegenerateAnchor {
        /// Metric whose anchor is degenerate.
        metric: Metric,
        /// The offending anchor value.
        value: f64,
    },

    /// The solver found no point in the box satisfying the feasibility constraint.
    #[error("No feasible design point found ({stage})")]
    InfeasibleRegion {
        /// Stage that issued the solver call.
        stage: Stage,
    },

    /// Weight grid values are outside [0, 1], not finite, or not ascending.
    #[error("Invalid weight grid: {0}")]
    InvalidWeightGrid(String),

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A frontier table file could not be read back.
    #[error("Table import error at line {line}: {reason}")]
    TableImport {
        /// Line number where the error occurred.
        line: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Stage of the failed solver call, if the error came from one.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::SolverNonConvergence { stage, .. } | Self::InfeasibleRegion { stage } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}
