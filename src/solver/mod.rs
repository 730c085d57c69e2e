//! Narrow interface to a local nonlinear optimizer.
//!
//! Anchor resolution and the sweep describe each subproblem as a
//! [`Problem`] (objective, factor box, optional feasibility constraint) and
//! hand it to an [`NlpSolver`]. The solver returns the point it stopped at
//! together with a [`SolveStatus`]; callers must check the status through
//! [`SolveOutcome::into_point`] before trusting the point.
//!
//! [`SlsqpSolver`] is the default backend, an adapter over `slsqp_rssl`.

pub mod slsqp;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Stage};
use crate::surface::{
    DesignPoint, FactorBox, FeasibilityConstraint, Metric, ProcessModels, QuadraticSurface,
};
use crate::sweep::Anchors;

pub use slsqp::{SlsqpSolver, SolverOptions};

/// Smooth real-valued function of a design point.
pub trait ObjectiveFunction {
    fn value(&self, x: &DesignPoint) -> f64;

    fn gradient(&self, x: &DesignPoint) -> [f64; 3];
}

impl ObjectiveFunction for QuadraticSurface {
    fn value(&self, x: &DesignPoint) -> f64 {
        self.evaluate(x)
    }

    fn gradient(&self, x: &DesignPoint) -> [f64; 3] {
        QuadraticSurface::gradient(self, x)
    }
}

/// Which objective a subproblem maximizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    /// Raw return metric alone.
    MaximizeReturn,
    /// Raw emissions metric alone.
    MaximizeEmissions,
    /// `weight * R/a_R + (1 - weight) * E/a_E`.
    WeightedSum {
        /// Weight on the normalized return metric.
        weight: f64,
        /// Normalization anchors.
        anchors: Anchors,
    },
}

impl Objective {
    /// Single-metric objective used for anchor resolution.
    #[must_use]
    pub fn single(metric: Metric) -> Self {
        match metric {
            Metric::Return => Self::MaximizeReturn,
            Metric::Emissions => Self::MaximizeEmissions,
        }
    }

    /// Attach the models the objective is evaluated on.
    #[must_use]
    pub fn bind(self, models: &ProcessModels) -> ScalarizedObjective<'_> {
        ScalarizedObjective {
            objective: self,
            models,
        }
    }
}

/// An [`Objective`] bound to concrete response surfaces.
#[derive(Debug, Clone, Copy)]
pub struct ScalarizedObjective<'a> {
    objective: Objective,
    models: &'a ProcessModels,
}

impl ObjectiveFunction for ScalarizedObjective<'_> {
    fn value(&self, x: &DesignPoint) -> f64 {
        match self.objective {
            Objective::MaximizeReturn => self.models.return_model.evaluate(x),
            Objective::MaximizeEmissions => self.models.emissions_model.evaluate(x),
            Objective::WeightedSum { weight, anchors } => {
                weight * (self.models.return_model.evaluate(x) / anchors.return_anchor)
                    + (1.0 - weight)
                        * (self.models.emissions_model.evaluate(x) / anchors.emissions_anchor)
            }
        }
    }

    fn gradient(&self, x: &DesignPoint) -> [f64; 3] {
        match self.objective {
            Objective::MaximizeReturn => self.models.return_model.gradient(x),
            Objective::MaximizeEmissions => self.models.emissions_model.gradient(x),
            Objective::WeightedSum { weight, anchors } => {
                let r = self.models.return_model.gradient(x);
                let e = self.models.emissions_model.gradient(x);
                std::array::from_fn(|i| {
                    weight * (r[i] / anchors.return_anchor)
                        + (1.0 - weight) * (e[i] / anchors.emissions_anchor)
                })
            }
        }
    }
}

/// One bounded maximization subproblem.
#[derive(Clone, Copy)]
pub struct Problem<'a> {
    /// Function to maximize.
    pub objective: &'a dyn ObjectiveFunction,
    /// Box on every factor.
    pub bounds: FactorBox,
    /// Optional inequality `surface(x) >= tolerance`.
    pub constraint: Option<&'a FeasibilityConstraint>,
}

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// First-order optimality reached within tolerances.
    Converged,
    /// Iteration budget exhausted before optimality.
    IterationLimit,
    /// Stopped at a point that violates the constraint.
    LocallyInfeasible,
    /// Numerical breakdown before optimality (line search or subproblem failure).
    Stalled,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Converged => "converged",
            Self::IterationLimit => "iteration limit",
            Self::LocallyInfeasible => "locally infeasible",
            Self::Stalled => "stalled",
        })
    }
}

/// Opaque per-solve diagnostics, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Major iterations reported by the solver.
    pub iterations: usize,
    /// Objective value at the returned point.
    pub objective_value: f64,
    /// Infinity norm of the objective's projected gradient at the returned point.
    pub projected_gradient: f64,
    /// Constraint violation `max(0, tolerance - surface(x))`.
    pub constraint_violation: f64,
}

/// Result of one solver call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveOutcome {
    /// Point the solver stopped at.
    pub point: DesignPoint,
    /// Termination status.
    pub status: SolveStatus,
    /// Solver diagnostics.
    pub diagnostics: Diagnostics,
}

impl SolveOutcome {
    /// Accept the point only if the solver converged.
    pub fn into_point(self, stage: Stage) -> Result<DesignPoint> {
        match self.status {
            SolveStatus::Converged => Ok(self.point),
            SolveStatus::LocallyInfeasible => Err(Error::InfeasibleRegion { stage }),
            status @ (SolveStatus::IterationLimit | SolveStatus::Stalled) => {
                Err(Error::SolverNonConvergence {
                    stage,
                    status,
                    iterations: self.diagnostics.iterations,
                })
            }
        }
    }
}

/// Local nonlinear optimizer.
///
/// Implementations must not keep state between calls: every call receives a
/// freshly built problem and may run concurrently with other calls.
pub trait NlpSolver: Sync {
    /// Locally maximize `problem.objective` over the box and constraint.
    fn maximize(&self, problem: &Problem<'_>) -> SolveOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ProcessVariant;

    fn sample_points() -> Vec<DesignPoint> {
        vec![
            DesignPoint::ORIGIN,
            DesignPoint::new(1.0, -0.5, 0.25),
            DesignPoint::new(-1.681792831, 1.681792831, -1.681792831),
            DesignPoint::new(0.33, 1.2, -0.7),
        ]
    }

    fn anchors() -> Anchors {
        Anchors {
            return_anchor: 2.5,
            emissions_anchor: 33.7,
        }
    }

    #[test]
    fn test_weighted_sum_reduces_to_single_objectives() {
        let models = ProcessModels::for_variant(ProcessVariant::Standalone, 1e-5);
        let a = anchors();
        let at_one = Objective::WeightedSum { weight: 1.0, anchors: a }.bind(&models);
        let at_zero = Objective::WeightedSum { weight: 0.0, anchors: a }.bind(&models);
        let ret = Objective::MaximizeReturn.bind(&models);
        let emi = Objective::MaximizeEmissions.bind(&models);

        for x in sample_points() {
            assert!((at_one.value(&x) - ret.value(&x) / a.return_anchor).abs() < 1e-15);
            assert!((at_zero.value(&x) - emi.value(&x) / a.emissions_anchor).abs() < 1e-15);

            let g1 = at_one.gradient(&x);
            let gr = ret.gradient(&x);
            for i in 0..3 {
                assert!((g1[i] - gr[i] / a.return_anchor).abs() < 1e-15);
            }
        }
    }

    #[test]
    fn test_weighted_sum_is_convex_combination() {
        let models = ProcessModels::for_variant(ProcessVariant::Integrated, 1e-5);
        let a = anchors();
        let x = DesignPoint::new(0.4, -0.9, 1.1);
        let r = models.return_model.evaluate(&x) / a.return_anchor;
        let e = models.emissions_model.evaluate(&x) / a.emissions_anchor;
        let mid = Objective::WeightedSum { weight: 0.3, anchors: a }.bind(&models);
        assert!((mid.value(&x) - (0.3 * r + 0.7 * e)).abs() < 1e-12);
    }

    #[test]
    fn test_single_objective_selection() {
        assert_eq!(Objective::single(Metric::Return), Objective::MaximizeReturn);
        assert_eq!(Objective::single(Metric::Emissions), Objective::MaximizeEmissions);
    }

    #[test]
    fn test_outcome_status_mapping() {
        let outcome = |status| SolveOutcome {
            point: DesignPoint::ORIGIN,
            status,
            diagnostics: Diagnostics {
                iterations: 7,
                ..Diagnostics::default()
            },
        };
        let stage = Stage::Sweep { weight: 0.75 };

        assert_eq!(outcome(SolveStatus::Converged).into_point(stage).unwrap(), DesignPoint::ORIGIN);
        assert!(matches!(
            outcome(SolveStatus::IterationLimit).into_point(stage),
            Err(Error::SolverNonConvergence { iterations: 7, .. })
        ));
        assert!(matches!(
            outcome(SolveStatus::Stalled).into_point(stage),
            Err(Error::SolverNonConvergence {
                status: SolveStatus::Stalled,
                ..
            })
        ));
        assert!(matches!(
            outcome(SolveStatus::LocallyInfeasible).into_point(stage),
            Err(Error::InfeasibleRegion { .. })
        ));
    }
}
