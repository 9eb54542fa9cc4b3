//! Ellipse curve.

use std::f64::consts::PI;

use ase_core::{AseError, Result, Tolerance};
use ase_math::{normalize_or_zero, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

use super::Curve;

/// An ellipse in 3D space, parameterized over `[-PI, PI]`.
///
/// `point_at(t) = center + cos(t) * major_axis + sin(t) * radius_ratio * (normal x major_axis)`.
/// The major radius is the length of `major_axis`; the minor radius is
/// `radius_ratio` times that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ellipse {
    pub center: Point3,
    pub normal: Vector3,
    pub major_axis: Vector3,
    pub radius_ratio: f64,
}

impl Ellipse {
    pub fn new(center: Point3, normal: Vector3, major_axis: Vector3, radius_ratio: f64) -> Self {
        Self {
            center,
            normal: normalize_or_zero(normal),
            major_axis,
            radius_ratio,
        }
    }

    /// Circle of the given radius; `major_axis` only supplies the direction
    /// of parameter zero.
    pub fn circle(center: Point3, normal: Vector3, major_dir: Vector3, radius: f64) -> Self {
        Self::new(center, normal, normalize_or_zero(major_dir) * radius, 1.0)
    }

    /// Major radius (length of major_axis).
    pub fn major_radius(&self) -> f64 {
        self.major_axis.length()
    }

    pub fn minor_radius(&self) -> f64 {
        self.major_radius() * self.radius_ratio.abs()
    }

    /// The scaled minor axis vector `radius_ratio * (normal x major_axis)`.
    pub fn minor_axis(&self) -> Vector3 {
        self.radius_ratio * self.normal.cross(self.major_axis)
    }

    pub fn is_circular(&self, tol: f64) -> bool {
        (self.radius_ratio - 1.0).abs() < tol
    }

    pub fn is_defined(&self) -> bool {
        self.normal != Vector3::ZERO && self.major_axis.length_squared() > 0.0
    }

    /// Offset of the curve point from the center at `t`.
    pub fn offset_at(&self, t: f64) -> Vector3 {
        t.cos() * self.major_axis + t.sin() * self.minor_axis()
    }

    /// Second derivative at `t`; always `-offset_at(t)`.
    pub fn second_deriv_at(&self, t: f64) -> Vector3 {
        -self.offset_at(t)
    }

    /// Eccentric angle of the projection of `p` onto the ellipse plane.
    ///
    /// Returns `None` when the projection coincides with the center.
    pub fn param(&self, p: Point3) -> Option<f64> {
        let d = p - self.center;
        let minor = self.minor_axis();
        let x = d.dot(self.major_axis) / self.major_axis.length_squared().max(f64::MIN_POSITIVE);
        let y = d.dot(minor) / minor.length_squared().max(f64::MIN_POSITIVE);
        if x.abs() < 1e-300 && y.abs() < 1e-300 {
            return None;
        }
        Some(y.atan2(x))
    }

    /// Apply an affine transform while keeping the point at each parameter.
    ///
    /// A reflecting transform negates the normal, since the transformed
    /// `normal x major_axis` would otherwise point the wrong way.
    pub fn transform(&mut self, t: &Transform) -> Result<()> {
        if t.is_singular() {
            return Err(AseError::Transform("singular transform applied to ellipse".into()));
        }
        let minor_image = t.transform_vector(self.minor_axis());
        self.center = t.transform_point(self.center);
        self.major_axis = t.transform_vector(self.major_axis);
        self.normal = t.transform_direction(self.normal);
        if t.reflects() {
            self.normal = -self.normal;
        }
        let minor = self.normal.cross(self.major_axis);
        if minor.length_squared() > 0.0 {
            self.radius_ratio = self.radius_ratio.signum() * minor_image.length() / minor.length();
        }
        Ok(())
    }

    /// Reverse the direction of travel.
    pub fn negate(&mut self) {
        self.normal = -self.normal;
    }

    pub fn approx_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        (self.center - other.center).length() < tol.linear
            && (self.normal - other.normal).length() < tol.angular.max(tol.linear)
            && (self.major_axis - other.major_axis).length() < tol.linear
            && (self.radius_ratio - other.radius_ratio).abs() < tol.linear
    }
}

impl Curve for Ellipse {
    fn point_at(&self, t: f64) -> Point3 {
        self.center + self.offset_at(t)
    }

    fn tangent_at(&self, t: f64) -> Vector3 {
        -t.sin() * self.major_axis + t.cos() * self.minor_axis()
    }

    fn domain(&self) -> (f64, f64) {
        (-PI, PI)
    }

    fn is_closed(&self) -> bool {
        true
    }
}
