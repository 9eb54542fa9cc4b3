//! Planar section curves used to build surfaces.

mod ellipse;

use ase_math::{Point3, Vector3};

pub use ellipse::Ellipse;

/// A parametric curve in 3D.
pub trait Curve: Send + Sync {
    fn point_at(&self, t: f64) -> Point3;

    /// First derivative with respect to `t`.
    fn tangent_at(&self, t: f64) -> Vector3;

    /// Natural parameter range `(lo, hi)`.
    fn domain(&self) -> (f64, f64);

    /// Start and end of the domain coincide.
    fn is_closed(&self) -> bool {
        false
    }

    /// Period of a closed curve, 0 otherwise.
    fn period(&self) -> f64 {
        if self.is_closed() {
            let (lo, hi) = self.domain();
            hi - lo
        } else {
            0.0
        }
    }
}
