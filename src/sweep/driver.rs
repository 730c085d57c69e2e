//! The scalarization sweep: one weighted-sum solve per grid weight.

use log::{debug, info, warn};
use rayon::prelude::*;

use super::{Anchors, WeightGrid};
use crate::error::{Error, Result, Stage};
use crate::frontier::{FrontierRecord, FrontierTable};
use crate::solver::{NlpSolver, Objective, Problem};
use crate::surface::{FactorBox, ProcessModels};

/// A sweep that may have stopped early.
///
/// `table` holds the records computed before the first failing weight, in
/// grid order. It is only a complete frontier when `failure` is `None`.
#[derive(Debug)]
pub struct SweepOutcome {
    pub table: FrontierTable,
    pub failure: Option<Error>,
}

impl SweepOutcome {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// The table if every weight succeeded, otherwise the failure.
    pub fn into_result(self) -> Result<FrontierTable> {
        match self.failure {
            None => Ok(self.table),
            Some(err) => Err(err),
        }
    }
}

/// Weighted-sum sweep over shared, read-only models.
///
/// Each iteration builds its own [`Problem`]; nothing is carried from one
/// solver call to the next, so runs are restartable and iterations may run
/// in parallel.
pub struct ScalarizationSweep<'a, S: NlpSolver> {
    solver: &'a S,
    models: &'a ProcessModels,
    bounds: FactorBox,
}

impl<'a, S: NlpSolver> ScalarizationSweep<'a, S> {
    #[must_use]
    pub fn new(solver: &'a S, models: &'a ProcessModels, bounds: FactorBox) -> Self {
        Self {
            solver,
            models,
            bounds,
        }
    }

    /// Solve the weighted-sum subproblem for one weight.
    pub fn solve_weight(&self, weight: f64, anchors: &Anchors) -> Result<FrontierRecord> {
        let objective = Objective::WeightedSum {
            weight,
            anchors: *anchors,
        }
        .bind(self.models);
        let problem = Problem {
            objective: &objective,
            bounds: self.bounds,
            constraint: self.models.constraint.as_ref(),
        };

        let outcome = self.solver.maximize(&problem);
        debug!(
            "weight {weight:.6}: status={} iterations={} pg={:.2e}",
            outcome.status,
            outcome.diagnostics.iterations,
            outcome.diagnostics.projected_gradient
        );

        let point = outcome.into_point(Stage::Sweep { weight })?;
        Ok(FrontierRecord::evaluate(point, weight, self.models))
    }

    /// Lazily solve each weight in grid order.
    pub fn records<'s>(
        &'s self,
        grid: &'s WeightGrid,
        anchors: &'s Anchors,
    ) -> impl Iterator<Item = Result<FrontierRecord>> + 's {
        grid.iter().map(move |weight| self.solve_weight(weight, anchors))
    }

    /// Sequential sweep; fails on the first weight whose solve fails.
    pub fn run(&self, grid: &WeightGrid, anchors: &Anchors) -> Result<FrontierTable> {
        self.run_partial(grid, anchors).into_result()
    }

    /// Sequential sweep keeping the records computed before a failure.
    pub fn run_partial(&self, grid: &WeightGrid, anchors: &Anchors) -> SweepOutcome {
        info!("sweeping {} weights", grid.len());
        let mut table = FrontierTable::with_capacity(grid.len(), self.is_constrained());

        for record in self.records(grid, anchors) {
            match record {
                Ok(record) => table.push(record),
                Err(err) => return self.aborted(table, err),
            }
        }

        info!("sweep finished: {} records", table.len());
        SweepOutcome {
            table,
            failure: None,
        }
    }

    /// Parallel sweep; fails if any weight fails.
    pub fn run_parallel(&self, grid: &WeightGrid, anchors: &Anchors) -> Result<FrontierTable> {
        self.run_partial_parallel(grid, anchors).into_result()
    }

    /// Parallel sweep with the same partial-result semantics as
    /// [`Self::run_partial`]: records before the first failing weight in grid
    /// order are kept.
    pub fn run_partial_parallel(&self, grid: &WeightGrid, anchors: &Anchors) -> SweepOutcome {
        info!("sweeping {} weights on {} threads", grid.len(), rayon::current_num_threads());

        let results: Vec<Result<FrontierRecord>> = grid
            .weights()
            .par_iter()
            .map(|&weight| self.solve_weight(weight, anchors))
            .collect();

        let mut table = FrontierTable::with_capacity(grid.len(), self.is_constrained());
        for result in results {
            match result {
                Ok(record) => table.push(record),
                Err(err) => return self.aborted(table, err),
            }
        }

        info!("sweep finished: {} records", table.len());
        SweepOutcome {
            table,
            failure: None,
        }
    }

    fn is_constrained(&self) -> bool {
        self.models.constraint.is_some()
    }

    fn aborted(&self, table: FrontierTable, err: Error) -> SweepOutcome {
        warn!("sweep aborted: {err}; {} records computed before the failure", table.len());
        SweepOutcome {
            table,
            failure: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::solver::{SlsqpSolver, SolveOutcome, SolveStatus};
    use crate::surface::{FeasibilityConstraint, Metric, ProcessVariant};
    use crate::sweep::{AnchorResolver, ResolvedAnchors};

    /// Default solver that counts calls and reports non-convergence whenever
    /// the point it lands on has a return above `return_ceiling`.
    struct Flaky {
        inner: SlsqpSolver,
        models: ProcessModels,
        calls: AtomicUsize,
        return_ceiling: f64,
    }

    impl Flaky {
        fn new(return_ceiling: f64) -> Self {
            Self {
                inner: SlsqpSolver::default(),
                models: standalone(),
                calls: AtomicUsize::new(0),
                return_ceiling,
            }
        }
    }

    impl NlpSolver for Flaky {
        fn maximize(&self, problem: &Problem<'_>) -> SolveOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut outcome = self.inner.maximize(problem);
            if self.models.return_model.evaluate(&outcome.point) > self.return_ceiling {
                outcome.status = SolveStatus::IterationLimit;
            }
            outcome
        }
    }

    fn standalone() -> ProcessModels {
        ProcessModels::for_variant(
            ProcessVariant::Standalone,
            FeasibilityConstraint::DEFAULT_TOLERANCE,
        )
    }

    fn standalone_anchors() -> ResolvedAnchors {
        let models = standalone();
        AnchorResolver::new(&SlsqpSolver::default(), &models, FactorBox::default())
            .resolve_all()
            .unwrap()
    }

    #[test]
    fn test_five_point_scenario() {
        let solver = SlsqpSolver::default();
        let models = standalone();
        let resolved = standalone_anchors();
        let grid = WeightGrid::from_weights(vec![0.0, 0.25, 0.5, 0.75, 1.0]).unwrap();

        let table = ScalarizationSweep::new(&solver, &models, FactorBox::default())
            .run(&grid, &resolved.anchors)
            .unwrap();

        assert_eq!(table.len(), 5);
        assert!(!table.is_constrained());

        // The endpoints are independent re-solves of the single-metric
        // problems; they match the anchors closely but need not be bit-identical.
        let first = table.records()[0];
        let last = table.records()[4];
        assert!((first.emissions_value - resolved.anchors.emissions_anchor).abs() < 1e-6);
        assert!((last.return_value - resolved.anchors.return_anchor).abs() < 1e-6);
        assert!(first.point.max_distance(&resolved.emissions_anchor.point) < 1e-4);
        assert!(last.point.max_distance(&resolved.return_anchor.point) < 1e-4);

        // Intermediate records lie strictly between the extremes.
        for record in &table.records()[1..4] {
            assert!(record.return_value > first.return_value);
            assert!(record.return_value < last.return_value);
            assert!(record.emissions_value < first.emissions_value);
            assert!(record.emissions_value > last.emissions_value);
        }

        for (record, w) in table.iter().zip(grid.iter()) {
            assert_eq!(record.weight_return, w);
            assert_eq!(record.weight_emissions, 1.0 - w);
        }
    }

    #[test]
    fn test_reference_grid_trade_off() {
        let solver = SlsqpSolver::default();
        let models = standalone();
        let resolved = standalone_anchors();
        let grid = WeightGrid::linspace(WeightGrid::REFERENCE_POINTS).unwrap();

        let table = ScalarizationSweep::new(&solver, &models, FactorBox::default())
            .run_parallel(&grid, &resolved.anchors)
            .unwrap();
        assert_eq!(table.len(), WeightGrid::REFERENCE_POINTS);

        let tol = 1e-6;
        for pair in table.records().windows(2) {
            assert!(
                pair[1].return_value >= pair[0].return_value - tol,
                "return decreased between w={} and w={}",
                pair[0].weight_return,
                pair[1].weight_return
            );
            assert!(
                pair[1].emissions_value <= pair[0].emissions_value + tol,
                "emissions increased between w={} and w={}",
                pair[0].weight_return,
                pair[1].weight_return
            );
        }

        assert_eq!(table.non_dominated(tol).len(), table.len());

        // Anchors bound every recorded value.
        for record in &table {
            assert!(record.return_value <= resolved.anchors.return_anchor + tol);
            assert!(record.emissions_value <= resolved.anchors.emissions_anchor + tol);
            assert!(FactorBox::default().contains(&record.point));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let solver = SlsqpSolver::default();
        let models = standalone();
        let anchors = standalone_anchors().anchors;
        let grid = WeightGrid::linspace(64).unwrap();
        let sweep = ScalarizationSweep::new(&solver, &models, FactorBox::default());

        let sequential = sweep.run(&grid, &anchors).unwrap();
        let parallel = sweep.run_parallel(&grid, &anchors).unwrap();
        assert_eq!(sequential, parallel);

        // Restartable: a second run gives the same table.
        assert_eq!(sweep.run(&grid, &anchors).unwrap(), sequential);
    }

    #[test]
    fn test_failure_names_weight_and_keeps_partial_records() {
        // Return is about 2.436 at w=0.5 and 2.477 at w=0.75.
        let solver = Flaky::new(2.45);
        let models = standalone();
        let anchors = standalone_anchors().anchors;
        let grid = WeightGrid::from_weights(vec![0.0, 0.25, 0.5, 0.75, 1.0]).unwrap();
        let sweep = ScalarizationSweep::new(&solver, &models, FactorBox::default());

        let outcome = sweep.run_partial(&grid, &anchors);
        assert!(!outcome.is_complete());
        assert_eq!(outcome.table.len(), 3);
        let stage = outcome.failure.as_ref().and_then(Error::stage);
        assert_eq!(stage, Some(Stage::Sweep { weight: 0.75 }));
        // Sequential sweep stops at the failing weight.
        assert_eq!(solver.calls.load(Ordering::SeqCst), 4);

        let parallel = sweep.run_partial_parallel(&grid, &anchors);
        assert_eq!(parallel.table, outcome.table);
        assert!(matches!(
            parallel.failure,
            Some(Error::SolverNonConvergence {
                stage: Stage::Sweep { weight },
                ..
            }) if weight == 0.75
        ));

        assert!(sweep.run(&grid, &anchors).is_err());
    }

    fn integrated_sweep(points: usize) -> (ResolvedAnchors, ProcessModels, FrontierTable) {
        let solver = SlsqpSolver::default();
        let models = ProcessModels::for_variant(
            ProcessVariant::Integrated,
            FeasibilityConstraint::DEFAULT_TOLERANCE,
        );
        let resolved = AnchorResolver::new(&solver, &models, FactorBox::default())
            .resolve_all()
            .unwrap();
        let grid = WeightGrid::linspace(points).unwrap();
        let table = ScalarizationSweep::new(&solver, &models, FactorBox::default())
            .run_parallel(&grid, &resolved.anchors)
            .unwrap();
        (resolved, models, table)
    }

    #[test]
    fn test_integrated_records_are_feasible() {
        let (resolved, models, table) = integrated_sweep(21);
        let constraint = models.constraint.unwrap();

        assert!(table.is_constrained());
        assert_eq!(table.len(), 21);
        for record in &table {
            let margin = record.feasibility_margin.unwrap();
            assert!(
                constraint.is_feasible(&record.point),
                "w={}: margin {margin}",
                record.weight_return
            );
            assert!(margin >= constraint.tolerance);
        }
        // A local solver may land on different branches of the nonconvex
        // feasible region, so only the endpoints are pinned.
        let last = table.records()[20];
        assert!((last.return_value - resolved.anchors.get(Metric::Return)).abs() < 1e-5);
        let first = table.records()[0];
        assert!((first.emissions_value - resolved.anchors.get(Metric::Emissions)).abs() < 1e-5);
    }

    #[test]
    fn test_integrated_dense_grid_respects_anchors() {
        let (resolved, models, table) = integrated_sweep(2001);
        let constraint = models.constraint.unwrap();
        let anchors = resolved.anchors;

        assert_eq!(table.len(), 2001);
        for record in &table {
            assert!(constraint.is_feasible(&record.point), "w={}", record.weight_return);
            assert!(FactorBox::default().contains(&record.point));
            assert!(
                record.return_value <= anchors.return_anchor + 1e-6,
                "w={}: return {} above anchor {}",
                record.weight_return,
                record.return_value,
                anchors.return_anchor
            );
            assert!(
                record.emissions_value <= anchors.emissions_anchor + 1e-6,
                "w={}: emissions {} above anchor {}",
                record.weight_return,
                record.emissions_value,
                anchors.emissions_anchor
            );
        }
    }
}
