//! Spherical surface.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

use ase_core::{AseError, GeomContext, Result, Tolerance, Validate};
use ase_math::{any_perpendicular, normalize_or_zero, Aabb3, Interval, ParamBox, Point2, Point3, Transform, Vector3, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bounds::interval_box;
use super::diffgeom::latitude_longitude_cone;
use super::{
    transformed_cone_fallback, transformed_copy, wrap_angle, FootPoint, FootQuality, NormalCone, PrincipalCurvature,
    Surface, SurfaceEval, SurfaceKind,
};

/// A sphere parameterized by latitude `u` in `[-PI/2, PI/2]` and longitude
/// `v` (period `2*PI`):
///
/// `P(u, v) = centre + r*sin(u)*pole_dir + r*cos(u)*(cos(v)*uv_oridir + sin(v)*R)`
///
/// with `r = |radius|` and `R = pole_dir x uv_oridir`, negated when
/// `reverse_v` is set. A negative radius gives inward normals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sphere {
    pub centre: Point3,
    pub radius: f64,
    /// Direction of the `v = 0` meridian; perpendicular to `pole_dir`.
    pub uv_oridir: Vector3,
    /// Direction of the `u = PI/2` pole.
    pub pole_dir: Vector3,
    pub reverse_v: bool,
    pub subset: ParamBox,
}

impl Sphere {
    /// Sphere with its pole along +Z and `v = 0` along +X.
    pub fn new(centre: Point3, radius: f64) -> Self {
        Self::with_frame(centre, radius, DVec3::Z, DVec3::X, false)
    }

    /// `uv_oridir` is made perpendicular to `pole_dir`.
    pub fn with_frame(centre: Point3, radius: f64, pole_dir: Vector3, uv_oridir: Vector3, reverse_v: bool) -> Self {
        let pole_dir = normalize_or_zero(pole_dir);
        let mut oridir = normalize_or_zero(uv_oridir - pole_dir * uv_oridir.dot(pole_dir));
        if oridir == DVec3::ZERO {
            oridir = any_perpendicular(pole_dir);
        }
        Self {
            centre,
            radius,
            uv_oridir: oridir,
            pole_dir,
            reverse_v,
            subset: ParamBox::infinite(),
        }
    }

    /// Normals point inwards.
    pub fn hollow(&self) -> bool {
        self.radius < 0.0
    }

    pub fn convex(&self) -> bool {
        self.radius > 0.0
    }

    fn r(&self) -> f64 {
        self.radius.abs()
    }

    fn sign(&self) -> f64 {
        if self.radius < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// `(P, Q, R)`: pole, origin direction and the third frame axis.
    fn frame(&self) -> (Vector3, Vector3, Vector3) {
        let r = self.pole_dir.cross(self.uv_oridir);
        let r = if self.reverse_v { -r } else { r };
        (self.pole_dir, self.uv_oridir, r)
    }

    fn sphere_dir(&self, uv: Point2) -> Vector3 {
        let (p, q, r) = self.frame();
        let w = uv.y.cos() * q + uv.y.sin() * r;
        uv.x.sin() * p + uv.x.cos() * w
    }

    pub fn approx_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        (self.centre - other.centre).length() < tol.linear
            && (self.radius - other.radius).abs() < tol.linear
            && (self.uv_oridir - other.uv_oridir).length() < tol.linear
            && (self.pole_dir - other.pole_dir).length() < tol.linear
            && self.reverse_v == other.reverse_v
            && self.subset.approx_eq(&other.subset, tol.linear)
    }
}

impl Validate for Sphere {
    fn validate(&self) -> Result<()> {
        if !self.is_defined() {
            return Err(AseError::Geometry(format!(
                "sphere with radius {} and pole {} is undefined",
                self.radius, self.pole_dir
            )));
        }
        Ok(())
    }
}

impl Surface for Sphere {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Sphere
    }

    fn is_defined(&self) -> bool {
        self.radius != 0.0 && self.pole_dir != DVec3::ZERO && self.uv_oridir != DVec3::ZERO
    }

    fn subset_range(&self) -> &ParamBox {
        &self.subset
    }

    fn subset_range_mut(&mut self) -> &mut ParamBox {
        &mut self.subset
    }

    fn natural_range_u(&self, _ctx: &GeomContext) -> Interval {
        Interval::new(-FRAC_PI_2, FRAC_PI_2)
    }

    fn natural_range_v(&self, _ctx: &GeomContext) -> Interval {
        Interval::new(-PI, PI)
    }

    fn natural_period_v(&self, _ctx: &GeomContext) -> f64 {
        TAU
    }

    fn singular_u(&self, u: f64, ctx: &GeomContext) -> bool {
        ctx.tolerance.is_negligible_angle(u.abs() - FRAC_PI_2)
    }

    fn left_handed_uv(&self) -> bool {
        (self.radius > 0.0) ^ self.reverse_v
    }

    fn eval_position(&self, uv: Point2) -> Point3 {
        self.centre + self.r() * self.sphere_dir(uv)
    }

    fn eval_normal(&self, uv: Point2) -> Vector3 {
        self.sign() * self.sphere_dir(uv)
    }

    fn accurate_derivs(&self) -> usize {
        2
    }

    fn eval_derivs(&self, uv: Point2, nd: usize) -> SurfaceEval {
        let (p, q, r) = self.frame();
        let rad = self.r();
        let (su, cu) = uv.x.sin_cos();
        let (sv, cv) = uv.y.sin_cos();
        let w = cv * q + sv * r;
        let dw = -sv * q + cv * r;
        let offset = rad * (su * p + cu * w);

        let mut ev = SurfaceEval::new(self.centre + offset);
        if nd >= 1 {
            ev.derivs.push(vec![rad * (cu * p - su * w), rad * cu * dw]);
        }
        if nd >= 2 {
            ev.derivs.push(vec![-offset, -rad * su * dw, -rad * cu * w]);
        }
        ev
    }

    fn param(&self, pos: Point3, guess: Option<Point2>, _ctx: &GeomContext) -> Point2 {
        let (p, q, r) = self.frame();
        let d = pos - self.centre;
        let len = d.length();
        if len < 1e-300 {
            return guess.unwrap_or(Point2::ZERO);
        }
        let u = (d.dot(p) / len).clamp(-1.0, 1.0).asin();
        let x = d.dot(q);
        let y = d.dot(r);
        let v = if x.hypot(y) <= 1e-14 * len {
            guess.map_or(0.0, |g| g.y)
        } else {
            wrap_angle(y.atan2(x), guess.map(|g| g.y).or_else(|| self.subset.v.is_finite().then(|| self.subset.v.mid())))
        };
        Point2::new(u, v)
    }

    fn closest_point(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> FootPoint {
        if !self.is_defined() {
            warn!(radius = self.radius, "closest point requested on an undefined sphere");
        }
        if (pos - self.centre).length() < 1e-300 {
            debug!("closest point at sphere centre, using parameter guess");
        }
        let param = self.param(pos, guess, ctx);
        let foot = self.eval_position(param);
        FootPoint::new(pos, foot, param, self.eval_outdir(param, ctx), FootQuality::Exact)
    }

    fn eval_curvature(&self, uv: Point2, _ctx: &GeomContext) -> PrincipalCurvature {
        let k = if self.radius == 0.0 { 0.0 } else { 1.0 / self.radius };
        let ev = self.eval_derivs(uv, 1);
        let hint = if ev.pu().length_squared() > 0.0 { ev.pu() } else { self.uv_oridir };
        PrincipalCurvature::isotropic(self.eval_normal(uv), hint, k)
    }

    fn bound(&self, pbox: Option<&ParamBox>, t: Option<&Transform>, ctx: &GeomContext) -> Aabb3 {
        if let Some(t) = t {
            return match transformed_copy(self, t) {
                Some(copy) => copy.bound(pbox, None, ctx),
                None => self.bound(pbox, None, ctx).transformed(t),
            };
        }
        let range = self.param_range(pbox, ctx);
        let u = range.u.intersect(&self.natural_range_u(ctx));
        let (p, q, r) = self.frame();
        let rad = self.r();
        let (su, cu) = (u.sin(), u.cos());
        let (sv, cv) = (range.v.sin(), range.v.cos());
        interval_box(self.centre, &[(su * rad, p), (cu * cv * rad, q), (cu * sv * rad, r)])
    }

    fn normal_cone(&self, pbox: &ParamBox, _approx_ok: bool, t: Option<&Transform>, ctx: &GeomContext) -> NormalCone {
        if let Some(t) = t {
            return match transformed_copy(self, t) {
                Some(copy) => copy.normal_cone(pbox, false, None, ctx),
                None => transformed_cone_fallback(self.normal_cone(pbox, false, None, ctx), t),
            };
        }
        let range = self.param_range(Some(pbox), ctx);
        let u = range.u.intersect(&self.natural_range_u(ctx));
        let (p, q, r) = self.frame();
        latitude_longitude_cone(p, q, r, self.sign(), u, range.v)
    }

    fn transform(&mut self, t: &Transform) -> Result<()> {
        let Some(k) = t.uniform_scale() else {
            debug!("rejecting non-similarity transform of sphere");
            return Err(AseError::Transform("sphere requires a similarity transform".into()));
        };
        self.centre = t.transform_point(self.centre);
        self.pole_dir = t.transform_direction(self.pole_dir);
        self.uv_oridir = t.transform_direction(self.uv_oridir);
        self.radius *= k;
        if t.reflects() {
            self.reverse_v = !self.reverse_v;
        }
        Ok(())
    }

    fn negate(&mut self) {
        self.radius = -self.radius;
    }
}

impl fmt::Display for Sphere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sphere centre {} radius {} uv_oridir {} pole {} {}",
            self.centre,
            self.radius,
            self.uv_oridir,
            self.pole_dir,
            if self.reverse_v { "reversed_v" } else { "forward_v" }
        )
    }
}
