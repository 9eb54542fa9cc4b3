use ase_core::{AseError, Result};
use serde::{Deserialize, Serialize};

use crate::vector::normalize_or_zero;
use crate::{DMat3, DMat4, DVec3, Point3, Vector3};

/// Affine transform: rotation, reflection, scaling, shear and translation.
///
/// Stored as a column-major 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub matrix: [f64; 16],
}

impl Transform {
    pub fn identity() -> Self {
        Self::from_mat4(DMat4::IDENTITY)
    }

    pub fn from_translation(t: Vector3) -> Self {
        Self::from_mat4(DMat4::from_translation(t))
    }

    /// Rotation by `angle` radians about `axis` through the origin.
    pub fn from_rotation(axis: Vector3, angle: f64) -> Self {
        Self::from_mat4(DMat4::from_axis_angle(normalize_or_zero(axis), angle))
    }

    pub fn from_scale(factor: f64) -> Self {
        Self::from_mat4(DMat4::from_scale(DVec3::splat(factor)))
    }

    pub fn from_non_uniform_scale(factors: Vector3) -> Self {
        Self::from_mat4(DMat4::from_scale(factors))
    }

    /// Mirror through the plane through the origin with the given normal.
    pub fn from_reflection(plane_normal: Vector3) -> Self {
        let n = normalize_or_zero(plane_normal);
        let m = DMat3::IDENTITY - 2.0 * DMat3::from_cols(n * n.x, n * n.y, n * n.z);
        Self::from_mat4(DMat4::from_mat3(m))
    }

    pub fn from_mat4(m: DMat4) -> Self {
        Self {
            matrix: m.to_cols_array(),
        }
    }

    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_cols_array(&self.matrix)
    }

    /// The linear (rotation/scale/shear) part.
    pub fn linear(&self) -> DMat3 {
        DMat3::from_mat4(self.to_mat4())
    }

    pub fn translation(&self) -> Vector3 {
        self.to_mat4().w_axis.truncate()
    }

    pub fn transform_point(&self, p: Point3) -> Point3 {
        self.to_mat4().transform_point3(p)
    }

    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.to_mat4().transform_vector3(v)
    }

    /// Unit direction of a transformed vector (scale removed).
    pub fn transform_direction(&self, v: Vector3) -> Vector3 {
        normalize_or_zero(self.transform_vector(v))
    }

    /// Unit surface normal under the transform (inverse transpose).
    pub fn transform_normal(&self, n: Vector3) -> Vector3 {
        let l = self.linear();
        if l.determinant().abs() < 1e-15 {
            return normalize_or_zero(l * n);
        }
        normalize_or_zero(l.inverse().transpose() * n)
    }

    pub fn then(&self, other: &Transform) -> Transform {
        Self::from_mat4(other.to_mat4() * self.to_mat4())
    }

    pub fn determinant(&self) -> f64 {
        self.linear().determinant()
    }

    pub fn is_singular(&self) -> bool {
        self.determinant().abs() < 1e-15
    }

    /// Whether the transform turns right-handed frames into left-handed ones.
    pub fn reflects(&self) -> bool {
        self.determinant() < 0.0
    }

    /// The scale factor of a similarity transform, `None` if the linear part
    /// shears or scales non-uniformly.
    pub fn uniform_scale(&self) -> Option<f64> {
        let l = self.linear();
        let (x, y, z) = (l.x_axis, l.y_axis, l.z_axis);
        let k2 = x.length_squared();
        if k2 < 1e-30 {
            return None;
        }
        let rel = 1e-9 * k2;
        let uniform = (y.length_squared() - k2).abs() < rel
            && (z.length_squared() - k2).abs() < rel
            && x.dot(y).abs() < rel
            && y.dot(z).abs() < rel
            && z.dot(x).abs() < rel;
        uniform.then(|| k2.sqrt())
    }

    pub fn inverse(&self) -> Result<Transform> {
        let m = self.to_mat4();
        if self.is_singular() {
            return Err(AseError::Transform(format!(
                "singular transform (determinant {:e})",
                self.determinant()
            )));
        }
        Ok(Self::from_mat4(m.inverse()))
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
