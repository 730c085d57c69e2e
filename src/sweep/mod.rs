//! Normalization and the weighted-sum scalarization sweep.
//!
//! - [`anchors::AnchorResolver`]: single-metric optima used as normalization anchors
//! - [`grid::WeightGrid`]: validated weight grids
//! - [`driver::ScalarizationSweep`]: one solve per weight, producing a frontier table
//! - [`session::SweepSession`]: configuration-driven end-to-end run

pub mod anchors;
pub mod driver;
pub mod grid;
pub mod session;

pub use anchors::{Anchor, AnchorResolver, Anchors, ResolvedAnchors};
pub use driver::{ScalarizationSweep, SweepOutcome};
pub use grid::WeightGrid;
pub use session::{SweepConfig, SweepConfigBuilder, SweepSession};
