use crate::{Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned box in model space.
///
/// An empty box has `min > max`. Surfaces with no finite extent report a box
/// with infinite corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self::new(Point3::splat(f64::INFINITY), Point3::splat(f64::NEG_INFINITY))
    }

    pub fn infinite() -> Self {
        Self::new(Point3::splat(f64::NEG_INFINITY), Point3::splat(f64::INFINITY))
    }

    /// Smallest box holding every point; empty for no points.
    pub fn from_points<I: IntoIterator<Item = Point3>>(points: I) -> Self {
        let mut out = Self::empty();
        for p in points {
            out.add_point(p);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn is_infinite(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite())
    }

    pub fn add_point(&mut self, p: Point3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn contains_point(&self, p: Point3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    pub fn merge(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Grown by `amount` on every side.
    pub fn expand(&self, amount: f64) -> Self {
        let offset = Vector3::splat(amount);
        Self::new(self.min - offset, self.max + offset)
    }

    /// Box around the eight transformed corners. Infinite and empty boxes
    /// pass through unchanged.
    pub fn transformed(&self, t: &Transform) -> Self {
        if self.is_empty() || self.is_infinite() {
            return *self;
        }
        Self::from_points((0..8).map(|i| {
            t.transform_point(Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            ))
        }))
    }
}
