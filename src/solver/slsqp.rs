//! [`NlpSolver`] backed by the `slsqp_rssl` sequential least-squares QP solver.
//!
//! SLSQP minimizes, so the objective is negated. The feasibility constraint is
//! passed as an `Ineq` function `surface(x) - tolerance - constraint_margin`;
//! the margin absorbs the solver's own constraint accuracy so that returned
//! points pass [`FeasibilityConstraint::is_feasible`]. The exit message is
//! mapped to a [`SolveStatus`], and the final point is checked against the
//! box and the constraint before the status is reported.

use log::trace;
use serde::{Deserialize, Serialize};
use slsqp_rssl::{Constraint, fmin_slsqp};

use super::{Diagnostics, NlpSolver, Problem, SolveOutcome, SolveStatus};
use crate::surface::{DesignPoint, FactorBox, FeasibilityConstraint};

/// Options passed through to SLSQP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Major iteration limit.
    pub max_iterations: usize,
    /// Requested accuracy of the objective.
    pub accuracy: f64,
    /// Extra slack demanded of the constraint during the solve.
    pub constraint_margin: f64,
    /// Starting point, projected into the box before use.
    pub start: DesignPoint,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            accuracy: 1e-9,
            constraint_margin: 1e-7,
            start: DesignPoint::ORIGIN,
        }
    }
}

/// Local maximizer over the factor box with an optional inequality.
#[derive(Debug, Clone, Default)]
pub struct SlsqpSolver {
    options: SolverOptions,
}

impl SlsqpSolver {
    #[must_use]
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    fn constraints(&self, constraint: Option<&FeasibilityConstraint>) -> Vec<Constraint> {
        let Some(&constraint) = constraint else {
            return Vec::new();
        };
        let margin = self.options.constraint_margin;
        vec![Constraint::Ineq(Box::new(move |x: &[f64]| {
            constraint.slack(&point_from_slice(x)) - margin
        }))]
    }
}

impl NlpSolver for SlsqpSolver {
    fn maximize(&self, problem: &Problem<'_>) -> SolveOutcome {
        let bounds = problem.bounds;
        let start = bounds.project(self.options.start).to_array();
        let box_bounds = [(bounds.lower(), bounds.upper()); 3];
        let objective = problem.objective;

        let result = fmin_slsqp(
            |x: &[f64]| -objective.value(&point_from_slice(x)),
            &start,
            &box_bounds,
            self.constraints(problem.constraint),
            self.options.max_iterations.try_into().unwrap_or_default(),
            self.options.accuracy,
            None,
        );

        let message = result.message.to_string();
        let iterations = usize::try_from(result.nit).unwrap_or(usize::MAX);
        let x: &[f64] = &result.x;
        let point = bounds.project(point_from_slice(x));
        trace!("slsqp: {message} after {iterations} iterations at {point:?}");

        let constraint_violation = problem
            .constraint
            .map_or(0.0, |c| (-c.slack(&point)).max(0.0));
        let status = if constraint_violation > 0.0 {
            SolveStatus::LocallyInfeasible
        } else {
            classify_exit(&message)
        };

        SolveOutcome {
            point,
            status,
            diagnostics: Diagnostics {
                iterations,
                objective_value: objective.value(&point),
                projected_gradient: projected_gradient_norm(
                    bounds,
                    &point,
                    objective.gradient(&point),
                ),
                constraint_violation,
            },
        }
    }
}

/// Map an SLSQP exit message to a status.
///
/// Exit modes: 0 success, 4 incompatible inequality constraints, 9 iteration
/// limit; every other mode is a numerical breakdown.
pub fn classify_exit(message: &str) -> SolveStatus {
    let message = message.to_ascii_lowercase();
    if message.contains("terminated successfully") {
        SolveStatus::Converged
    } else if message.contains("iteration limit") {
        SolveStatus::IterationLimit
    } else if message.contains("incompatible") {
        SolveStatus::LocallyInfeasible
    } else {
        SolveStatus::Stalled
    }
}

fn point_from_slice(x: &[f64]) -> DesignPoint {
    match x {
        [ca, ec, eu, ..] => DesignPoint::new(*ca, *ec, *eu),
        _ => DesignPoint::ORIGIN,
    }
}

/// Infinity norm of `x - P(x + g)` for a maximization gradient `g`.
fn projected_gradient_norm(bounds: FactorBox, x: &DesignPoint, g: [f64; 3]) -> f64 {
    let x = x.to_array();
    x.iter()
        .zip(g)
        .map(|(&a, g)| (a - (a + g).clamp(bounds.lower(), bounds.upper())).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::ObjectiveFunction;
    use crate::surface::QuadraticSurface;

    /// -(CA - 0.5)² - (EC + 0.25)² - 2 (EU - 1)²
    fn concave_bowl() -> QuadraticSurface {
        QuadraticSurface::new(-2.3125, [1.0, -0.5, 4.0], [-1.0, -1.0, -2.0], [0.0; 3])
    }

    /// 1 - CA² >= 1e-5
    fn unit_band() -> FeasibilityConstraint {
        FeasibilityConstraint::new(
            QuadraticSurface::new(1.0, [0.0; 3], [-1.0, 0.0, 0.0], [0.0; 3]),
            1e-5,
        )
    }

    fn solve(
        objective: &dyn ObjectiveFunction,
        constraint: Option<&FeasibilityConstraint>,
    ) -> SolveOutcome {
        SlsqpSolver::default().maximize(&Problem {
            objective,
            bounds: FactorBox::default(),
            constraint,
        })
    }

    #[test]
    fn test_classify_exit() {
        assert_eq!(
            classify_exit("Optimization terminated successfully"),
            SolveStatus::Converged
        );
        assert_eq!(classify_exit("Iteration limit reached"), SolveStatus::IterationLimit);
        assert_eq!(
            classify_exit("Inequality constraints incompatible"),
            SolveStatus::LocallyInfeasible
        );
        assert_eq!(
            classify_exit("Positive directional derivative for linesearch"),
            SolveStatus::Stalled
        );
        assert_eq!(classify_exit("Singular matrix E in LSQ subproblem"), SolveStatus::Stalled);
    }

    #[test]
    fn test_interior_optimum() {
        let outcome = solve(&concave_bowl(), None);
        assert_eq!(outcome.status, SolveStatus::Converged);
        assert!(outcome.point.max_distance(&DesignPoint::new(0.5, -0.25, 1.0)) < 1e-4);
        assert!(outcome.diagnostics.objective_value > -1e-7);
        assert_eq!(outcome.diagnostics.constraint_violation, 0.0);
    }

    #[test]
    fn test_optimum_on_bounds() {
        // 3 CA - EC: pushes CA to the upper and EC to the lower bound.
        let linear = QuadraticSurface::new(0.0, [3.0, -1.0, 0.0], [0.0; 3], [0.0; 3]);
        let outcome = solve(&linear, None);
        assert_eq!(outcome.status, SolveStatus::Converged);
        let b = FactorBox::default();
        let corner = DesignPoint::new(b.upper(), b.lower(), 0.0);
        assert!(outcome.point.max_distance(&corner) < 1e-6);
        assert!(b.contains(&outcome.point));
    }

    #[test]
    fn test_active_constraint_is_strictly_feasible() {
        let ca = QuadraticSurface::new(0.0, [1.0, 0.0, 0.0], [0.0; 3], [0.0; 3]);
        let band = unit_band();
        let outcome = solve(&ca, Some(&band));

        assert_eq!(outcome.status, SolveStatus::Converged);
        assert!(band.is_feasible(&outcome.point), "margin {}", band.margin(&outcome.point));
        assert!((outcome.point.ca - (1.0f64 - 1e-5).sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_inactive_constraint_keeps_unconstrained_optimum() {
        let band = unit_band();
        let outcome = solve(&concave_bowl(), Some(&band));
        assert_eq!(outcome.status, SolveStatus::Converged);
        assert!(outcome.point.max_distance(&DesignPoint::new(0.5, -0.25, 1.0)) < 1e-4);
        assert!(band.is_feasible(&outcome.point));
    }

    #[test]
    fn test_empty_feasible_region() {
        // -1 - CA² >= 1e-5 has no solution.
        let impossible = FeasibilityConstraint::new(
            QuadraticSurface::new(-1.0, [0.0; 3], [-1.0, 0.0, 0.0], [0.0; 3]),
            1e-5,
        );
        let outcome = solve(&concave_bowl(), Some(&impossible));
        assert_eq!(outcome.status, SolveStatus::LocallyInfeasible);
        assert!(outcome.diagnostics.constraint_violation > 1.0);
    }

    #[test]
    fn test_start_outside_box_is_projected() {
        let solver = SlsqpSolver::new(SolverOptions {
            start: DesignPoint::new(10.0, -10.0, 0.0),
            ..SolverOptions::default()
        });
        let bowl = concave_bowl();
        let outcome = solver.maximize(&Problem {
            objective: &bowl,
            bounds: FactorBox::default(),
            constraint: None,
        });
        assert_eq!(outcome.status, SolveStatus::Converged);
        assert!(FactorBox::default().contains(&outcome.point));
    }

    #[test]
    fn test_options_from_partial_json() {
        let options: SolverOptions = serde_json::from_str(r#"{"max_iterations": 200}"#).unwrap();
        assert_eq!(options.max_iterations, 200);
        assert_eq!(options.accuracy, 1e-9);
        assert_eq!(options.start, DesignPoint::ORIGIN);
    }
}
