//! # rsm-frontier
//!
//! Weighted-sum Pareto frontier tracing over fitted quadratic response
//! surfaces.
//!
//! Two metrics are maximized over three coded process factors (CA, EC, EU):
//! an economic return and an emissions-performance metric. Each metric is
//! first maximized alone to obtain its normalization anchor; the combined
//! objective `w * R / aR + (1 - w) * E / aE` is then maximized for every
//! weight in a grid, producing one frontier record per weight.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rsm_frontier::{ProcessVariant, SweepConfig, SweepSession};
//!
//! let config = SweepConfig::builder()
//!     .variant(ProcessVariant::Standalone)
//!     .points(10_000)
//!     .build();
//!
//! let session = SweepSession::new(config)?;
//! let report = session.run()?;
//!
//! println!("aR = {}", report.anchors.anchors.return_anchor);
//! report.table.write_csv("2G_standAlone.csv", b';')?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`surface`]: Quadratic response surfaces, design points and process variants
//! - [`solver`]: Objectives, problem statements and the SLSQP solver adapter
//! - [`sweep`]: Anchors, weight grids and the scalarization sweep
//! - [`frontier`]: Frontier tables, reports, dominance checks and summaries

pub mod error;
pub mod frontier;
pub mod solver;
pub mod surface;
pub mod sweep;

// Re-export commonly used types
pub use error::{Error, Result, Stage};
pub use frontier::{FrontierRecord, FrontierReport, FrontierSummary, FrontierTable, MetricSummary};
pub use solver::{
    NlpSolver, Objective, Problem, SlsqpSolver, SolveOutcome, SolveStatus, SolverOptions,
};
pub use surface::{
    DesignPoint, FactorBox, FeasibilityConstraint, Metric, ProcessModels, ProcessVariant,
    QuadraticSurface,
};
pub use sweep::{
    Anchor, AnchorResolver, Anchors, ResolvedAnchors, ScalarizationSweep, SweepConfig,
    SweepConfigBuilder, SweepOutcome, SweepSession, WeightGrid,
};
