//! Two-dimensional parameter boxes.

use serde::{Deserialize, Serialize};

use crate::{Interval, Point2, DVec2};

/// A box in `(u, v)` parameter space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBox {
    pub u: Interval,
    pub v: Interval,
}

impl ParamBox {
    pub fn new(u: Interval, v: Interval) -> Self {
        Self { u, v }
    }

    /// The unset box used by untrimmed surfaces.
    pub fn infinite() -> Self {
        Self {
            u: Interval::infinite(),
            v: Interval::infinite(),
        }
    }

    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            u: Interval::new(a.x, b.x),
            v: Interval::new(a.y, b.y),
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.u.is_infinite() && self.v.is_infinite()
    }

    pub fn is_finite(&self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty() || self.v.is_empty()
    }

    pub fn contains(&self, uv: Point2, tol: f64) -> bool {
        self.u.contains(uv.x, tol) && self.v.contains(uv.y, tol)
    }

    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.u.approx_eq(&other.u, tol) && self.v.approx_eq(&other.v, tol)
    }

    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            u: self.u.intersect(&other.u),
            v: self.v.intersect(&other.v),
        }
    }

    pub fn mid(&self) -> Point2 {
        DVec2::new(self.u.mid(), self.v.mid())
    }

    /// The four corners, or `None` for a box unbounded in either direction.
    pub fn corners(&self) -> Option<[Point2; 4]> {
        if !self.is_finite() {
            return None;
        }
        Some([
            DVec2::new(self.u.lo, self.v.lo),
            DVec2::new(self.u.hi, self.v.lo),
            DVec2::new(self.u.hi, self.v.hi),
            DVec2::new(self.u.lo, self.v.hi),
        ])
    }
}

impl Default for ParamBox {
    fn default() -> Self {
        Self::infinite()
    }
}
