//! Normalization anchors: each metric's own best attainable value.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Stage};
use crate::solver::{NlpSolver, Objective, Problem};
use crate::surface::{DesignPoint, FactorBox, Metric, ProcessModels};

/// Default threshold below which an anchor is treated as degenerate.
pub const DEFAULT_ANCHOR_EPSILON: f64 = 1e-9;

/// Best value of one metric on its own, with the point that attains it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub metric: Metric,
    /// Raw metric value at `point`.
    pub value: f64,
    pub point: DesignPoint,
}

/// The pair of anchors that normalizes the weighted-sum objective.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchors {
    pub return_anchor: f64,
    pub emissions_anchor: f64,
}

impl Anchors {
    /// Validate both anchor values.
    ///
    /// Values that are not finite or not above `epsilon` are rejected; a
    /// negative anchor would flip the optimization sense of its term.
    pub fn new(return_anchor: f64, emissions_anchor: f64, epsilon: f64) -> Result<Self> {
        check_anchor(Metric::Return, return_anchor, epsilon)?;
        check_anchor(Metric::Emissions, emissions_anchor, epsilon)?;
        Ok(Self {
            return_anchor,
            emissions_anchor,
        })
    }

    #[must_use]
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Return => self.return_anchor,
            Metric::Emissions => self.emissions_anchor,
        }
    }
}

fn check_anchor(metric: Metric, value: f64, epsilon: f64) -> Result<()> {
    if value.is_finite() && value > epsilon {
        Ok(())
    } else {
        Err(Error::DegenerateAnchor { metric, value })
    }
}

/// Both resolved anchors with their optimal points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAnchors {
    pub return_anchor: Anchor,
    pub emissions_anchor: Anchor,
    /// Validated values used for normalization.
    pub anchors: Anchors,
}

/// Resolves anchors by single-objective solves on the raw metric scale.
pub struct AnchorResolver<'a, S: NlpSolver> {
    solver: &'a S,
    models: &'a ProcessModels,
    bounds: FactorBox,
    epsilon: f64,
}

impl<'a, S: NlpSolver> AnchorResolver<'a, S> {
    #[must_use]
    pub fn new(solver: &'a S, models: &'a ProcessModels, bounds: FactorBox) -> Self {
        Self {
            solver,
            models,
            bounds,
            epsilon: DEFAULT_ANCHOR_EPSILON,
        }
    }

    /// Override the degeneracy threshold.
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Maximize one metric alone over the box and constraint.
    ///
    /// The returned value is the raw metric at the solver's point; a solver
    /// that did not converge yields an error instead of its last iterate.
    pub fn resolve_anchor(&self, metric: Metric) -> Result<Anchor> {
        let objective = Objective::single(metric).bind(self.models);
        let problem = Problem {
            objective: &objective,
            bounds: self.bounds,
            constraint: self.models.constraint.as_ref(),
        };

        let outcome = self.solver.maximize(&problem);
        debug!(
            "anchor {}: status={} iterations={} violation={:.3e}",
            metric,
            outcome.status,
            outcome.diagnostics.iterations,
            outcome.diagnostics.constraint_violation
        );

        let point = outcome.into_point(Stage::Anchor(metric))?;
        let value = self.models.model(metric).evaluate(&point);
        info!(
            "anchor {metric} = {value:.6} at (CA={:.4}, EC={:.4}, EU={:.4})",
            point.ca, point.ec, point.eu
        );

        Ok(Anchor { metric, value, point })
    }

    /// Resolve both anchors and reject degenerate values.
    pub fn resolve_all(&self) -> Result<ResolvedAnchors> {
        let return_anchor = self.resolve_anchor(Metric::Return)?;
        let emissions_anchor = self.resolve_anchor(Metric::Emissions)?;
        let anchors = Anchors::new(return_anchor.value, emissions_anchor.value, self.epsilon)?;

        Ok(ResolvedAnchors {
            return_anchor,
            emissions_anchor,
            anchors,
        })
    }
}
