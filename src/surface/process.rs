//! Coefficient sets for the studied process configurations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FeasibilityConstraint, Metric, QuadraticSurface};
use crate::error::Error;

/// Process configuration whose fitted models are traced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessVariant {
    /// Stand-alone second-generation plant. Box bounds only.
    #[default]
    Standalone,
    /// Integrated first- and second-generation plant, restricted by a
    /// feasibility constraint.
    Integrated,
}

impl ProcessVariant {
    pub const ALL: [Self; 2] = [Self::Standalone, Self::Integrated];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Integrated => "integrated",
        }
    }

    /// Whether the variant carries a feasibility constraint.
    #[must_use]
    pub fn is_constrained(self) -> bool {
        matches!(self, Self::Integrated)
    }
}

impl fmt::Display for ProcessVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProcessVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standalone" | "stand-alone" | "2g" => Ok(Self::Standalone),
            "integrated" | "1g2g" => Ok(Self::Integrated),
            other => Err(Error::InvalidConfig(format!(
                "unknown process variant '{other}' (expected standalone or integrated)"
            ))),
        }
    }
}

/// The read-only models shared by anchor resolution and the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessModels {
    /// Financial-return response surface.
    pub return_model: QuadraticSurface,
    /// Avoided-emissions response surface.
    pub emissions_model: QuadraticSurface,
    /// Feasibility constraint, when the variant has one.
    pub constraint: Option<FeasibilityConstraint>,
}

impl ProcessModels {
    /// Fitted models for a process variant.
    ///
    /// `feasibility_tolerance` only applies to constrained variants.
    #[must_use]
    pub fn for_variant(variant: ProcessVariant, feasibility_tolerance: f64) -> Self {
        match variant {
            ProcessVariant::Standalone => Self {
                return_model: QuadraticSurface::new(
                    1.987347,
                    [0.652139, -0.021653, -0.000052],
                    [-0.215191, -0.047731, -0.054590],
                    [-0.015525, -0.035575, 0.008675],
                ),
                emissions_model: QuadraticSurface::new(
                    26.64475,
                    [1.68662, 0.28547, -2.54509],
                    [-0.50258, 0.02429, 0.53556],
                    [0.02525, 0.37715, -0.04118],
                ),
                constraint: None,
            },
            ProcessVariant::Integrated => Self {
                return_model: QuadraticSurface::new(
                    8.903801,
                    [0.820775, -0.637673, -0.233889],
                    [-0.809301, -0.087893, -0.387459],
                    [-0.213700, 0.600275, 0.339975],
                ),
                emissions_model: QuadraticSurface::new(
                    18.90206,
                    [0.83915, 0.74775, -1.00481],
                    [-0.37436, 0.03957, 0.01141],
                    [0.05126, 0.42576, -0.04161],
                ),
                constraint: Some(FeasibilityConstraint::new(
                    QuadraticSurface::new(
                        2.95291,
                        [-3.29602, -1.18355, 3.37391],
                        [1.75062, 0.03588, 0.51318],
                        [0.16250, -2.18750, -0.61250],
                    ),
                    feasibility_tolerance,
                )),
            },
        }
    }

    /// Response surface for one metric.
    #[must_use]
    pub fn model(&self, metric: Metric) -> &QuadraticSurface {
        match metric {
            Metric::Return => &self.return_model,
            Metric::Emissions => &self.emissions_model,
        }
    }
}
