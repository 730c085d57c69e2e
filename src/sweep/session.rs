//! Configuration-driven frontier study.
//!
//! [`SweepSession`] ties the pieces together: validate the configuration and
//! weight grid, resolve both anchors, then run the sweep.
//!
//! ```rust,ignore
//! use rsm_frontier::{ProcessVariant, SweepConfig, SweepSession};
//!
//! let config = SweepConfig::builder()
//!     .variant(ProcessVariant::Integrated)
//!     .points(10_000)
//!     .parallel(true)
//!     .build();
//!
//! let session = SweepSession::new(config)?;
//! let report = session.run()?;
//! report.table.write_csv("frontier.csv", b';')?;
//! ```

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::{AnchorResolver, ResolvedAnchors, ScalarizationSweep, SweepOutcome, WeightGrid};
use crate::error::{Error, Result};
use crate::frontier::FrontierReport;
use crate::solver::{NlpSolver, SlsqpSolver, SolverOptions};
use crate::surface::{FactorBox, FeasibilityConstraint, ProcessModels, ProcessVariant};
use crate::sweep::anchors::DEFAULT_ANCHOR_EPSILON;

/// Configuration for a frontier study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Process variant whose fitted models are used.
    pub variant: ProcessVariant,

    /// Replacement models; overrides `variant` coefficients when set.
    pub models: Option<ProcessModels>,

    /// Number of equally spaced weights in `[0, 1]`.
    pub points: usize,

    /// Explicit weight grid; overrides `points` when set.
    pub weights: Option<WeightGrid>,

    /// Half-width of the coded factor box.
    pub bound: f64,

    /// Minimum constraint polynomial value for a feasible point.
    pub feasibility_tolerance: f64,

    /// Anchors at or below this value are rejected.
    pub anchor_epsilon: f64,

    /// Solve sweep iterations on the rayon thread pool.
    pub parallel: bool,

    /// Field delimiter for tabular output.
    pub delimiter: char,

    /// Options for the SLSQP backend.
    pub solver: SolverOptions,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            variant: ProcessVariant::default(),
            models: None,
            points: WeightGrid::REFERENCE_POINTS,
            weights: None,
            bound: FactorBox::STAR_POINT,
            feasibility_tolerance: FeasibilityConstraint::DEFAULT_TOLERANCE,
            anchor_epsilon: DEFAULT_ANCHOR_EPSILON,
            parallel: false,
            delimiter: ';',
            solver: SolverOptions::default(),
        }
    }
}

impl SweepConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Load a configuration from a JSON file; missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));

        if !(self.bound.is_finite() && self.bound > 0.0) {
            return invalid(format!("bound must be positive, got {}", self.bound));
        }
        if !(self.feasibility_tolerance.is_finite() && self.feasibility_tolerance >= 0.0) {
            return invalid(format!(
                "feasibility_tolerance must be non-negative, got {}",
                self.feasibility_tolerance
            ));
        }
        if !(self.anchor_epsilon.is_finite() && self.anchor_epsilon >= 0.0) {
            return invalid(format!(
                "anchor_epsilon must be non-negative, got {}",
                self.anchor_epsilon
            ));
        }
        if self.weights.is_none() && self.points < 2 {
            return Err(Error::InvalidWeightGrid(format!(
                "at least 2 points are required, got {}",
                self.points
            )));
        }
        if !self.delimiter.is_ascii() {
            return invalid(format!("delimiter must be ASCII, got '{}'", self.delimiter));
        }

        let s = &self.solver;
        if s.max_iterations == 0 {
            return invalid("solver max_iterations must be at least 1".to_string());
        }
        if !(s.accuracy.is_finite() && s.accuracy > 0.0) {
            return invalid(format!("solver accuracy must be positive, got {}", s.accuracy));
        }
        if !(s.constraint_margin.is_finite() && s.constraint_margin >= 0.0) {
            return invalid(format!(
                "solver constraint_margin must be non-negative, got {}",
                s.constraint_margin
            ));
        }

        Ok(())
    }

    /// Models for this run: the override if present, else the variant's.
    #[must_use]
    pub fn models(&self) -> ProcessModels {
        self.models
            .unwrap_or_else(|| ProcessModels::for_variant(self.variant, self.feasibility_tolerance))
    }

    /// The weight grid for this run.
    pub fn grid(&self) -> Result<WeightGrid> {
        match &self.weights {
            Some(grid) => Ok(grid.clone()),
            None => WeightGrid::linspace(self.points),
        }
    }

    #[must_use]
    pub fn bounds(&self) -> FactorBox {
        FactorBox::new(self.bound)
    }

    /// Delimiter as a byte for the csv writer.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b';')
    }
}

/// Builder for [`SweepConfig`].
#[derive(Debug, Default)]
pub struct SweepConfigBuilder {
    config: SweepConfig,
}

impl SweepConfigBuilder {
    /// Set the process variant.
    #[must_use]
    pub fn variant(mut self, variant: ProcessVariant) -> Self {
        self.config.variant = variant;
        self
    }

    /// Use custom models instead of the variant's coefficients.
    #[must_use]
    pub fn models(mut self, models: ProcessModels) -> Self {
        self.config.models = Some(models);
        self
    }

    /// Set the number of equally spaced weights.
    #[must_use]
    pub fn points(mut self, points: usize) -> Self {
        self.config.points = points;
        self
    }

    /// Use an explicit weight grid.
    #[must_use]
    pub fn weights(mut self, grid: WeightGrid) -> Self {
        self.config.weights = Some(grid);
        self
    }

    /// Set the factor box half-width.
    #[must_use]
    pub fn bound(mut self, bound: f64) -> Self {
        self.config.bound = bound;
        self
    }

    /// Set the feasibility tolerance.
    #[must_use]
    pub fn feasibility_tolerance(mut self, tolerance: f64) -> Self {
        self.config.feasibility_tolerance = tolerance;
        self
    }

    /// Set the degenerate-anchor threshold.
    #[must_use]
    pub fn anchor_epsilon(mut self, epsilon: f64) -> Self {
        self.config.anchor_epsilon = epsilon;
        self
    }

    /// Run sweep iterations in parallel.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Set the output delimiter.
    #[must_use]
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Set the solver options.
    #[must_use]
    pub fn solver(mut self, options: SolverOptions) -> Self {
        self.config.solver = options;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> SweepConfig {
        self.config
    }
}

/// Anchors plus a possibly incomplete sweep.
#[derive(Debug)]
pub struct SessionRun {
    pub anchors: ResolvedAnchors,
    pub outcome: SweepOutcome,
}

/// End-to-end frontier study.
pub struct SweepSession<S: NlpSolver = SlsqpSolver> {
    config: SweepConfig,
    models: ProcessModels,
    solver: S,
}

impl SweepSession<SlsqpSolver> {
    /// Create a session using the SLSQP backend configured by `config.solver`.
    pub fn new(config: SweepConfig) -> Result<Self> {
        let solver = SlsqpSolver::new(config.solver);
        Self::with_solver(config, solver)
    }
}

impl<S: NlpSolver> SweepSession<S> {
    /// Create a session with a caller-provided solver.
    pub fn with_solver(config: SweepConfig, solver: S) -> Result<Self> {
        config.validate()?;
        let models = config.models();
        Ok(Self {
            config,
            models,
            solver,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    #[must_use]
    pub fn models(&self) -> &ProcessModels {
        &self.models
    }

    /// Resolve and validate both anchors.
    pub fn resolve_anchors(&self) -> Result<ResolvedAnchors> {
        AnchorResolver::new(&self.solver, &self.models, self.config.bounds())
            .with_epsilon(self.config.anchor_epsilon)
            .resolve_all()
    }

    /// Run the study, keeping partial sweep results on failure.
    ///
    /// Grid and anchor errors are returned directly: no sweep iteration runs
    /// unless the grid is valid and both anchors are resolved.
    pub fn run_outcome(&self) -> Result<SessionRun> {
        let grid = self.config.grid()?;
        info!(
            "{} variant: {} weights, bound ±{}",
            self.config.variant,
            grid.len(),
            self.config.bound
        );

        let anchors = self.resolve_anchors()?;

        let sweep = ScalarizationSweep::new(&self.solver, &self.models, self.config.bounds());
        let outcome = if self.config.parallel {
            sweep.run_partial_parallel(&grid, &anchors.anchors)
        } else {
            sweep.run_partial(&grid, &anchors.anchors)
        };

        Ok(SessionRun { anchors, outcome })
    }

    /// Run the study; any failure aborts the run.
    pub fn run(&self) -> Result<FrontierReport> {
        let SessionRun { anchors, outcome } = self.run_outcome()?;
        let table = outcome.into_result()?;
        Ok(FrontierReport::new(self.config.variant, anchors, table))
    }

    /// Write the table (delimited text) and/or the full report (JSON).
    pub fn write_outputs(
        &self,
        report: &FrontierReport,
        table_path: Option<&Path>,
        report_path: Option<&Path>,
    ) -> Result<()> {
        if let Some(path) = table_path {
            report.table.write_csv(path, self.config.delimiter_byte())?;
            info!("wrote {} rows to {}", report.table.len(), path.display());
        }
        if let Some(path) = report_path {
            report.write_json(path)?;
            info!("wrote report to {}", path.display());
        }
        Ok(())
    }
}
