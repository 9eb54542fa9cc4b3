//! Differential-geometry results: principal curvatures and normal cones.

use std::f64::consts::{PI, TAU};

use ase_math::{any_perpendicular, normalize_or_zero, Interval, Vector3};
use serde::{Deserialize, Serialize};

/// Principal curvatures and their directions at a surface point.
///
/// Curvature is positive where the surface bends away from its normal, so a
/// sphere with outward normals has curvature `1 / radius`. `k1 <= k2`, and
/// `d1`, `d2` are orthogonal unit tangents. Where curvature is isotropic the
/// directions are arbitrary but still orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalCurvature {
    pub d1: Vector3,
    pub k1: f64,
    pub d2: Vector3,
    pub k2: f64,
}

impl PrincipalCurvature {
    /// Curvatures in arbitrary order; they are sorted so that `k1 <= k2`.
    pub fn new(d1: Vector3, k1: f64, d2: Vector3, k2: f64) -> Self {
        if k1 <= k2 {
            Self { d1, k1, d2, k2 }
        } else {
            Self {
                d1: d2,
                k1: k2,
                d2: d1,
                k2: k1,
            }
        }
    }

    /// Equal curvature in every direction. `hint` picks `d1` when it has a
    /// tangential component; otherwise a deterministic perpendicular is used.
    pub fn isotropic(normal: Vector3, hint: Vector3, k: f64) -> Self {
        let n = normalize_or_zero(normal);
        let mut d1 = normalize_or_zero(hint - n * hint.dot(n));
        if d1 == Vector3::ZERO {
            d1 = any_perpendicular(n);
        }
        let mut d2 = normalize_or_zero(n.cross(d1));
        if d2 == Vector3::ZERO {
            d2 = any_perpendicular(d1);
        }
        Self { d1, k1: k, d2, k2: k }
    }

    pub fn gaussian(&self) -> f64 {
        self.k1 * self.k2
    }

    pub fn mean(&self) -> f64 {
        0.5 * (self.k1 + self.k2)
    }

    /// Normal curvature along a tangent direction (Euler's formula).
    pub fn normal_curvature(&self, dir: Vector3) -> f64 {
        let n = normalize_or_zero(self.d1.cross(self.d2));
        let t = normalize_or_zero(dir - n * dir.dot(n));
        if t == Vector3::ZERO {
            return self.k1;
        }
        let c = t.dot(self.d1);
        let s = t.dot(self.d2);
        self.k1 * c * c + self.k2 * s * s
    }
}

/// Principal curvatures from first and second parametric derivatives.
///
/// The normal must be the surface's oriented unit normal. Degenerate first
/// fundamental forms (singular points) and non-finite derivatives give zero
/// isotropic curvature.
pub fn curvature_from_derivs(
    pu: Vector3,
    pv: Vector3,
    puu: Vector3,
    puv: Vector3,
    pvv: Vector3,
    normal: Vector3,
) -> PrincipalCurvature {
    let e = pu.dot(pu);
    let f = pu.dot(pv);
    let g = pv.dot(pv);
    let l = -puu.dot(normal);
    let m = -puv.dot(normal);
    let n = -pvv.dot(normal);

    let det = e * g - f * f;
    let finite = [e, f, g, l, m, n].iter().all(|x| x.is_finite());
    if !finite || e * g <= 0.0 || det <= 1e-14 * e * g {
        return PrincipalCurvature::isotropic(normal, pu, 0.0);
    }

    let gauss = (l * n - m * m) / det;
    let mean = (e * n - 2.0 * f * m + g * l) / (2.0 * det);
    let disc = (mean * mean - gauss).max(0.0).sqrt();
    let k1 = mean - disc;
    let k2 = mean + disc;

    if disc <= 1e-12 * mean.abs().max(1.0) {
        return PrincipalCurvature::isotropic(normal, pu, mean);
    }

    // Eigenvector of (II - k I) from whichever row is better conditioned.
    let row_a = (m - k1 * f) * pu - (l - k1 * e) * pv;
    let row_b = (n - k1 * g) * pu - (m - k1 * f) * pv;
    let d1 = if row_a.length_squared() >= row_b.length_squared() {
        normalize_or_zero(row_a)
    } else {
        normalize_or_zero(row_b)
    };
    if d1 == Vector3::ZERO {
        return PrincipalCurvature::isotropic(normal, pu, mean);
    }
    let d2 = normalize_or_zero(normal.cross(d1));
    PrincipalCurvature { d1, k1, d2, k2 }
}

/// Conservative bound on the directions of a surface's normal over a region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalCone {
    /// Unit axis of the cone.
    pub axis: Vector3,
    /// Half-angle in radians, in `[0, PI]`.
    pub angle: f64,
    /// Direction the normals rotate about, when there is a single one.
    pub variation: Option<Vector3>,
    /// The cone was estimated rather than derived.
    pub approximate: bool,
    /// For approximate cones: true if the estimate is known to be too large,
    /// false if it may be too small.
    pub oversize: bool,
}

impl NormalCone {
    pub fn exact(axis: Vector3, angle: f64) -> Self {
        Self {
            axis: normalize_or_zero(axis),
            angle: angle.clamp(0.0, PI),
            variation: None,
            approximate: false,
            oversize: false,
        }
    }

    pub fn approximate(axis: Vector3, angle: f64, oversize: bool) -> Self {
        Self {
            approximate: true,
            oversize,
            ..Self::exact(axis, angle)
        }
    }

    pub fn with_variation(mut self, dir: Vector3) -> Self {
        self.variation = Some(normalize_or_zero(dir));
        self
    }

    /// Whether a direction lies inside the cone, with angular slack `tol`.
    pub fn contains(&self, dir: Vector3, tol: f64) -> bool {
        let d = normalize_or_zero(dir);
        let cos = d.dot(self.axis).clamp(-1.0, 1.0);
        cos.acos() <= self.angle + tol
    }
}

/// Exact normal cone for normals of the form
/// `sign * (sin(u) * pole + cos(u) * (cos(v) * q + sin(v) * r))`,
/// the Gauss map shared by spheres and tori.
///
/// Three candidate cones are compared: one around the normal at the box
/// centre (meridian plus parallel path length) and one around each pole.
pub(crate) fn latitude_longitude_cone(
    pole: Vector3,
    q: Vector3,
    r: Vector3,
    sign: f64,
    u: Interval,
    v: Interval,
) -> NormalCone {
    let normal_at = |uu: f64, vv: f64| sign * (uu.sin() * pole + uu.cos() * (vv.cos() * q + vv.sin() * r));

    let full_v = !v.is_finite() || v.length() >= TAU;
    let vc = if v.is_finite() { v.mid() } else { 0.0 };
    let half_v = if full_v { PI } else { 0.5 * v.length() };
    let uc = u.mid();

    let mut axis = normal_at(uc, vc);
    let mut angle = 0.5 * u.length() + uc.cos().abs() * half_v;

    let sin_range = u.sin();
    let to_pole = sin_range.lo.clamp(-1.0, 1.0).acos();
    if to_pole < angle {
        axis = sign * pole;
        angle = to_pole;
    }
    let to_antipole = (-sin_range.hi).clamp(-1.0, 1.0).acos();
    if to_antipole < angle {
        axis = -sign * pole;
        angle = to_antipole;
    }
    NormalCone::exact(axis, angle)
}
