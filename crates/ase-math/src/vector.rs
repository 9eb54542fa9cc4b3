//! Small vector helpers shared by the surface types.

use crate::{Vector3, DVec3};

/// Unit vector along `v`, or the zero vector when `v` has no usable length.
///
/// The zero vector is the "undefined" sentinel for unit-vector fields.
pub fn normalize_or_zero(v: Vector3) -> Vector3 {
    let len = v.length();
    if len < 1e-300 || !len.is_finite() {
        DVec3::ZERO
    } else {
        v / len
    }
}

/// A deterministic unit vector perpendicular to `v`.
///
/// Crosses `v` with the coordinate axis it is least aligned with, so the same
/// input always yields the same output. Returns `X` for a zero input.
pub fn any_perpendicular(v: Vector3) -> Vector3 {
    let n = normalize_or_zero(v);
    if n == DVec3::ZERO {
        return DVec3::X;
    }
    let a = n.abs();
    let reference = if a.x <= a.y && a.x <= a.z {
        DVec3::X
    } else if a.y <= a.z {
        DVec3::Y
    } else {
        DVec3::Z
    };
    n.cross(reference).normalize()
}
