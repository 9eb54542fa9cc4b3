//! Closest-point results.

use ase_math::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// How a foot point was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FootQuality {
    /// Closed-form solution.
    Exact,
    /// Iterative solution that met the solver tolerance.
    Converged { iterations: u32 },
    /// Best candidate after the iteration cap; `residual` is the remaining
    /// parameter-space uncertainty.
    Approximate { residual: f64 },
}

impl FootQuality {
    pub fn is_converged(&self) -> bool {
        !matches!(self, FootQuality::Approximate { .. })
    }
}

/// The nearest surface point to a query position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootPoint {
    pub foot: Point3,
    pub param: Point2,
    /// Oriented unit normal (outward direction at singular points).
    pub normal: Vector3,
    /// Distance from the query to the foot.
    pub distance: f64,
    pub quality: FootQuality,
}

impl FootPoint {
    pub fn new(query: Point3, foot: Point3, param: Point2, normal: Vector3, quality: FootQuality) -> Self {
        Self {
            foot,
            param,
            normal,
            distance: (query - foot).length(),
            quality,
        }
    }
}
