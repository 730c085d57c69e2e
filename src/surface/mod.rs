//! Quadratic response-surface models over three coded process factors.
//!
//! Every metric in the study is a second-order polynomial in the coded
//! factors CA, EC and EU:
//!
//! ```text
//! y = b0 + b1 CA + b2 EC + b3 EU
//!        + b11 CA² + b22 EC² + b33 EU²
//!        + b12 CA·EC + b13 CA·EU + b23 EC·EU
//! ```
//!
//! The same shape is used for the feasibility constraint of the integrated
//! process variant.

pub mod process;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use process::{ProcessModels, ProcessVariant};

/// Performance metric traced on the frontier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Financial return (internal rate of return).
    Return,
    /// Avoided CO2 emissions.
    Emissions,
}

impl Metric {
    /// Both metrics, in anchor-resolution order.
    pub const ALL: [Self; 2] = [Self::Return, Self::Emissions];

    /// Short lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Return => "return",
            Self::Emissions => "emissions",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point in coded factor space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DesignPoint {
    /// Coded factor CA.
    pub ca: f64,
    /// Coded factor EC.
    pub ec: f64,
    /// Coded factor EU.
    pub eu: f64,
}

impl DesignPoint {
    /// Center of the design.
    pub const ORIGIN: Self = Self {
        ca: 0.0,
        ec: 0.0,
        eu: 0.0,
    };

    #[must_use]
    pub fn new(ca: f64, ec: f64, eu: f64) -> Self {
        Self { ca, ec, eu }
    }

    #[must_use]
    pub fn from_array([ca, ec, eu]: [f64; 3]) -> Self {
        Self { ca, ec, eu }
    }

    #[must_use]
    pub fn to_array(self) -> [f64; 3] {
        [self.ca, self.ec, self.eu]
    }

    /// Largest absolute coordinate difference.
    #[must_use]
    pub fn max_distance(&self, other: &Self) -> f64 {
        (self.ca - other.ca)
            .abs()
            .max((self.ec - other.ec).abs())
            .max((self.eu - other.eu).abs())
    }
}

/// Symmetric box bounding every coded factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorBox {
    /// Half-width of the interval on each axis.
    pub half_width: f64,
}

impl FactorBox {
    /// Star-point distance of a rotatable three-factor central composite design.
    pub const STAR_POINT: f64 = 1.681792831;

    #[must_use]
    pub fn new(half_width: f64) -> Self {
        Self { half_width }
    }

    /// Lower bound on each axis.
    #[must_use]
    pub fn lower(&self) -> f64 {
        -self.half_width
    }

    /// Upper bound on each axis.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.half_width
    }

    /// Check whether a point lies inside the closed box.
    #[must_use]
    pub fn contains(&self, point: &DesignPoint) -> bool {
        point
            .to_array()
            .iter()
            .all(|v| (self.lower()..=self.upper()).contains(v))
    }

    /// Project a point onto the box.
    #[must_use]
    pub fn project(&self, point: DesignPoint) -> DesignPoint {
        DesignPoint::from_array(point.to_array().map(|v| v.clamp(self.lower(), self.upper())))
    }
}

impl Default for FactorBox {
    fn default() -> Self {
        Self::new(Self::STAR_POINT)
    }
}

/// Fitted second-order polynomial in the three coded factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadraticSurface {
    /// Constant term.
    pub intercept: f64,
    /// Linear coefficients for (CA, EC, EU).
    pub linear: [f64; 3],
    /// Pure quadratic coefficients for (CA², EC², EU²).
    pub quadratic: [f64; 3],
    /// Two-way interaction coefficients for (CA·EC, CA·EU, EC·EU).
    pub interaction: [f64; 3],
}

impl QuadraticSurface {
    #[must_use]
    pub fn new(
        intercept: f64,
        linear: [f64; 3],
        quadratic: [f64; 3],
        interaction: [f64; 3],
    ) -> Self {
        Self {
            intercept,
            linear,
            quadratic,
            interaction,
        }
    }

    /// Evaluate the polynomial at a design point.
    #[must_use]
    pub fn evaluate(&self, x: &DesignPoint) -> f64 {
        let [l1, l2, l3] = self.linear;
        let [q1, q2, q3] = self.quadratic;
        let [i12, i13, i23] = self.interaction;

        self.intercept
            + l1 * x.ca
            + l2 * x.ec
            + l3 * x.eu
            + q1 * x.ca * x.ca
            + q2 * x.ec * x.ec
            + q3 * x.eu * x.eu
            + i12 * x.ca * x.ec
            + i13 * x.ca * x.eu
            + i23 * x.ec * x.eu
    }

    /// Exact gradient with respect to (CA, EC, EU).
    #[must_use]
    pub fn gradient(&self, x: &DesignPoint) -> [f64; 3] {
        let [l1, l2, l3] = self.linear;
        let [q1, q2, q3] = self.quadratic;
        let [i12, i13, i23] = self.interaction;

        [
            l1 + 2.0 * q1 * x.ca + i12 * x.ec + i13 * x.eu,
            l2 + 2.0 * q2 * x.ec + i12 * x.ca + i23 * x.eu,
            l3 + 2.0 * q3 * x.eu + i13 * x.ca + i23 * x.ec,
        ]
    }
}

/// One-sided inequality `surface(x) >= tolerance` defining the feasible region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeasibilityConstraint {
    /// Constraint polynomial.
    pub surface: QuadraticSurface,
    /// Minimum admissible polynomial value.
    pub tolerance: f64,
}

impl FeasibilityConstraint {
    /// Tolerance used by the reference study.
    pub const DEFAULT_TOLERANCE: f64 = 0.00001;

    #[must_use]
    pub fn new(surface: QuadraticSurface, tolerance: f64) -> Self {
        Self { surface, tolerance }
    }

    /// Raw polynomial value at `x`.
    #[must_use]
    pub fn margin(&self, x: &DesignPoint) -> f64 {
        self.surface.evaluate(x)
    }

    /// Signed slack `surface(x) - tolerance`; non-negative when feasible.
    #[must_use]
    pub fn slack(&self, x: &DesignPoint) -> f64 {
        self.margin(x) - self.tolerance
    }

    #[must_use]
    pub fn is_feasible(&self, x: &DesignPoint) -> bool {
        self.slack(x) >= 0.0
    }
}
