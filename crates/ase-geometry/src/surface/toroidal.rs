//! Toroidal surface, including the self-intersecting apple, vortex and
//! lemon regimes.

use std::f64::consts::{PI, TAU};
use std::fmt;

use ase_core::{AseError, GeomContext, Result, Tolerance, Validate};
use ase_math::{any_perpendicular, normalize_or_zero, Aabb3, Interval, ParamBox, Point2, Point3, Transform, Vector3, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::bounds::interval_box;
use super::diffgeom::latitude_longitude_cone;
use super::{
    transformed_cone_fallback, transformed_copy, wrap_angle, FootPoint, FootQuality, NormalCone, Surface, SurfaceEval,
    SurfaceKind,
};

/// Shape regime of a torus, from its signed radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TorusShape {
    /// Ring torus with a hole: `major > minor`.
    Doughnut,
    /// Self-intersecting, dimpled at the axis: `0 < major < minor`.
    Apple,
    /// Tube touching the axis: `major == minor`.
    Vortex,
    /// Only the outer arc of the tube remains: `major <= 0`.
    Lemon,
}

/// A torus parameterized by the tube angle `u` and the spine angle `v`:
///
/// `P(u, v) = centre + m*sin(u)*normal + (major + m*cos(u))*(cos(v)*uv_oridir + sin(v)*R)`
///
/// with `m = |minor_radius|` and `R = normal x uv_oridir`, negated when
/// `reverse_v` is set. `u` is periodic only for a doughnut; otherwise it
/// runs over `[-U, U]` with `U = acos(-major / m)` and both ends are apexes
/// on the axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torus {
    pub centre: Point3,
    /// Normal of the spine plane.
    pub normal: Vector3,
    pub major_radius: f64,
    /// Negative for a hollow tube.
    pub minor_radius: f64,
    pub uv_oridir: Vector3,
    pub reverse_v: bool,
    pub subset: ParamBox,
}

impl Torus {
    pub fn new(centre: Point3, normal: Vector3, major_radius: f64, minor_radius: f64) -> Self {
        let normal = normalize_or_zero(normal);
        Self::with_frame(centre, normal, major_radius, minor_radius, any_perpendicular(normal), false)
    }

    pub fn with_frame(
        centre: Point3,
        normal: Vector3,
        major_radius: f64,
        minor_radius: f64,
        uv_oridir: Vector3,
        reverse_v: bool,
    ) -> Self {
        let normal = normalize_or_zero(normal);
        let mut oridir = normalize_or_zero(uv_oridir - normal * uv_oridir.dot(normal));
        if oridir == DVec3::ZERO {
            oridir = any_perpendicular(normal);
        }
        Self {
            centre,
            normal,
            major_radius,
            minor_radius,
            uv_oridir: oridir,
            reverse_v,
            subset: ParamBox::infinite(),
        }
    }

    /// Regime of the radii; a vortex when they agree within `tol.linear`.
    pub fn shape(&self, tol: &Tolerance) -> TorusShape {
        let major = self.major_radius;
        let minor = self.minor_radius.abs();
        if major <= 0.0 {
            TorusShape::Lemon
        } else if tol.is_negligible_length(major - minor) {
            TorusShape::Vortex
        } else if major > minor {
            TorusShape::Doughnut
        } else {
            TorusShape::Apple
        }
    }

    pub fn doughnut(&self, tol: &Tolerance) -> bool {
        self.shape(tol) == TorusShape::Doughnut
    }

    /// `U`, the tube angle of the apexes; `None` for a doughnut.
    pub fn apex_u(&self, tol: &Tolerance) -> Option<f64> {
        if self.doughnut(tol) {
            return None;
        }
        let m = self.minor_radius.abs();
        if m == 0.0 {
            return Some(0.0);
        }
        Some((-self.major_radius / m).clamp(-1.0, 1.0).acos())
    }

    /// Radius of the circle traced by the tube centre.
    pub fn spine_radius(&self) -> f64 {
        self.major_radius
    }

    pub fn hollow(&self) -> bool {
        self.minor_radius < 0.0
    }

    fn m(&self) -> f64 {
        self.minor_radius.abs()
    }

    fn sign(&self) -> f64 {
        if self.minor_radius < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    fn frame(&self) -> (Vector3, Vector3, Vector3) {
        let r = self.normal.cross(self.uv_oridir);
        let r = if self.reverse_v { -r } else { r };
        (self.normal, self.uv_oridir, r)
    }

    /// Nearest parameters to `pos`, solved in the meridian plane through it.
    ///
    /// Both half-planes of the meridian are tried, since for non-doughnut
    /// shapes the nearest arc may lie across the axis.
    fn nearest_param(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> Point2 {
        let (n, q, r) = self.frame();
        let d = pos - self.centre;
        let h = d.dot(n);
        let planar = d - n * h;
        let rho = planar.length();
        let scale = self.major_radius.abs() + self.m();

        let guess_v = guess.map(|g| g.y);
        let v0 = if rho <= 1e-14 * scale.max(1.0) {
            guess_v.unwrap_or(0.0)
        } else {
            wrap_angle(planar.dot(r).atan2(planar.dot(q)), guess_v)
        };

        let range = self.apex_u(&ctx.tolerance).map(|apex| Interval::new(-apex, apex));
        let mut best = (f64::INFINITY, Point2::new(0.0, v0));
        for (x, v) in [(rho, v0), (-rho, wrap_angle(v0 + PI, guess_v))] {
            let (dist, u) = self.nearest_on_arc(x, h, range.as_ref(), guess.map(|g| g.x));
            if dist < best.0 {
                best = (dist, Point2::new(u, v));
            }
        }
        best.1
    }

    /// Nearest point of the tube arc to `(x, h)` in one meridian half-plane,
    /// as `(distance, u)`. `range` is the arc of a non-doughnut; `None`
    /// means the whole periodic tube.
    fn nearest_on_arc(&self, x: f64, h: f64, range: Option<&Interval>, guess_u: Option<f64>) -> (f64, f64) {
        let m = self.m();
        let major = self.major_radius;
        let dx = x - major;
        let u = if dx.hypot(h) <= 1e-14 * m.max(1.0) {
            guess_u.unwrap_or(0.0)
        } else {
            h.atan2(dx)
        };
        let dist = |u: f64| (x - major - m * u.cos()).hypot(h - m * u.sin());

        let Some(range) = range else {
            let u = match guess_u {
                Some(g) => super::wrap_periodic(u, TAU, g),
                None => u,
            };
            return (dist(u), u);
        };
        if range.contains(u, 0.0) {
            return (dist(u), u);
        }
        let (lo, hi) = (dist(range.lo), dist(range.hi));
        if lo < hi {
            (lo, range.lo)
        } else {
            (hi, range.hi)
        }
    }

    pub fn approx_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        (self.centre - other.centre).length() < tol.linear
            && (self.normal - other.normal).length() < tol.linear
            && (self.major_radius - other.major_radius).abs() < tol.linear
            && (self.minor_radius - other.minor_radius).abs() < tol.linear
            && (self.uv_oridir - other.uv_oridir).length() < tol.linear
            && self.reverse_v == other.reverse_v
            && self.subset.approx_eq(&other.subset, tol.linear)
    }
}

impl Validate for Torus {
    fn validate(&self) -> Result<()> {
        if !self.is_defined() {
            return Err(AseError::Geometry(format!(
                "torus with radii {} and {} is undefined",
                self.major_radius, self.minor_radius
            )));
        }
        Ok(())
    }
}

impl Surface for Torus {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Torus
    }

    fn is_defined(&self) -> bool {
        self.minor_radius != 0.0 && self.normal != DVec3::ZERO && self.major_radius + self.m() > 0.0
    }

    fn subset_range(&self) -> &ParamBox {
        &self.subset
    }

    fn subset_range_mut(&mut self) -> &mut ParamBox {
        &mut self.subset
    }

    fn natural_range_u(&self, ctx: &GeomContext) -> Interval {
        match self.apex_u(&ctx.tolerance) {
            None => Interval::new(-PI, PI),
            Some(apex) => Interval::new(-apex, apex),
        }
    }

    fn natural_range_v(&self, _ctx: &GeomContext) -> Interval {
        Interval::new(-PI, PI)
    }

    fn natural_period_u(&self, ctx: &GeomContext) -> f64 {
        if self.doughnut(&ctx.tolerance) {
            TAU
        } else {
            0.0
        }
    }

    fn natural_period_v(&self, _ctx: &GeomContext) -> f64 {
        TAU
    }

    fn singular_u(&self, u: f64, ctx: &GeomContext) -> bool {
        match self.apex_u(&ctx.tolerance) {
            None => false,
            Some(apex) => ctx.tolerance.is_negligible_angle(u.abs() - apex),
        }
    }

    fn left_handed_uv(&self) -> bool {
        (self.minor_radius > 0.0) ^ self.reverse_v
    }

    fn eval_position(&self, uv: Point2) -> Point3 {
        let (n, q, r) = self.frame();
        let m = self.m();
        let (su, cu) = uv.x.sin_cos();
        let w = uv.y.cos() * q + uv.y.sin() * r;
        self.centre + m * su * n + (self.major_radius + m * cu) * w
    }

    fn eval_normal(&self, uv: Point2) -> Vector3 {
        let (n, q, r) = self.frame();
        let w = uv.y.cos() * q + uv.y.sin() * r;
        self.sign() * (uv.x.sin() * n + uv.x.cos() * w)
    }

    /// At an apex the outward direction is along the axis.
    fn eval_outdir(&self, uv: Point2, ctx: &GeomContext) -> Vector3 {
        if self.singular_u(uv.x, ctx) {
            let up = if uv.x >= 0.0 { self.normal } else { -self.normal };
            return self.sign() * up;
        }
        self.eval_normal(uv)
    }

    fn accurate_derivs(&self) -> usize {
        2
    }

    fn eval_derivs(&self, uv: Point2, nd: usize) -> SurfaceEval {
        let (n, q, r) = self.frame();
        let m = self.m();
        let (su, cu) = uv.x.sin_cos();
        let (sv, cv) = uv.y.sin_cos();
        let w = cv * q + sv * r;
        let dw = -sv * q + cv * r;
        let lambda = self.major_radius + m * cu;

        let mut ev = SurfaceEval::new(self.centre + m * su * n + lambda * w);
        if nd >= 1 {
            ev.derivs.push(vec![m * cu * n - m * su * w, lambda * dw]);
        }
        if nd >= 2 {
            ev.derivs.push(vec![-m * su * n - m * cu * w, -m * su * dw, -lambda * w]);
        }
        ev
    }

    fn param(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> Point2 {
        self.nearest_param(pos, guess, ctx)
    }

    fn closest_point(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> FootPoint {
        if !self.is_defined() {
            warn!(
                major = self.major_radius,
                minor = self.minor_radius,
                "closest point requested on an undefined torus"
            );
        }
        let param = self.nearest_param(pos, guess, ctx);
        let foot = self.eval_position(param);
        FootPoint::new(pos, foot, param, self.eval_outdir(param, ctx), FootQuality::Exact)
    }

    fn bound(&self, pbox: Option<&ParamBox>, t: Option<&Transform>, ctx: &GeomContext) -> Aabb3 {
        if let Some(t) = t {
            return match transformed_copy(self, t) {
                Some(copy) => copy.bound(pbox, None, ctx),
                None => self.bound(pbox, None, ctx).transformed(t),
            };
        }
        let range = self.param_range(pbox, ctx);
        let u = if self.doughnut(&ctx.tolerance) {
            range.u
        } else {
            range.u.intersect(&self.natural_range_u(ctx))
        };
        let (n, q, r) = self.frame();
        let m = self.m();
        let lambda = u.cos() * m + self.major_radius;
        interval_box(
            self.centre,
            &[(u.sin() * m, n), (lambda * range.v.cos(), q), (lambda * range.v.sin(), r)],
        )
    }

    fn normal_cone(&self, pbox: &ParamBox, _approx_ok: bool, t: Option<&Transform>, ctx: &GeomContext) -> NormalCone {
        if let Some(t) = t {
            return match transformed_copy(self, t) {
                Some(copy) => copy.normal_cone(pbox, false, None, ctx),
                None => transformed_cone_fallback(self.normal_cone(pbox, false, None, ctx), t),
            };
        }
        let range = self.param_range(Some(pbox), ctx);
        if !range.u.is_finite() || range.u.length() >= TAU {
            return NormalCone::exact(self.normal, PI);
        }
        let (n, q, r) = self.frame();
        latitude_longitude_cone(n, q, r, self.sign(), range.u, range.v)
    }

    fn transform(&mut self, t: &Transform) -> Result<()> {
        let Some(k) = t.uniform_scale() else {
            debug!("rejecting non-similarity transform of torus");
            return Err(AseError::Transform("torus requires a similarity transform".into()));
        };
        self.centre = t.transform_point(self.centre);
        self.normal = t.transform_direction(self.normal);
        self.uv_oridir = t.transform_direction(self.uv_oridir);
        self.major_radius *= k;
        self.minor_radius *= k;
        if t.reflects() {
            self.reverse_v = !self.reverse_v;
        }
        Ok(())
    }

    fn negate(&mut self) {
        self.minor_radius = -self.minor_radius;
    }
}

impl fmt::Display for Torus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "torus centre {} normal {} major {} minor {} uv_oridir {} {}",
            self.centre,
            self.normal,
            self.major_radius,
            self.minor_radius,
            self.uv_oridir,
            if self.reverse_v { "reversed_v" } else { "forward_v" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ase_math::DVec2;

    fn ctx() -> GeomContext {
        GeomContext::default()
    }

    #[test]
    fn test_toroidal_points_valid() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 5.0, 1.0);
        for i in 0..8 {
            for j in 0..8 {
                let uv = DVec2::new(i as f64 * PI / 4.0 - PI, j as f64 * PI / 4.0 - PI);
                let p = torus.eval_position(uv);
                let rho = (p.x * p.x + p.y * p.y).sqrt();
                let tube = ((rho - 5.0).powi(2) + p.z * p.z).sqrt();
                assert_relative_eq!(tube, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_toroidal_top() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 5.0, 1.0);
        let p = torus.eval_position(DVec2::new(PI / 2.0, 0.0));
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_classification() {
        let shape = |major: f64, minor: f64| Torus::new(DVec3::ZERO, DVec3::Z, major, minor).shape(&Tolerance::default());
        assert_eq!(shape(10.0, 3.0), TorusShape::Doughnut);
        assert_eq!(shape(10.0, -3.0), TorusShape::Doughnut);
        assert_eq!(shape(1.0, 3.0), TorusShape::Apple);
        assert_eq!(shape(3.0, 3.0), TorusShape::Vortex);
        assert_eq!(shape(0.0, 3.0), TorusShape::Lemon);
        assert_eq!(shape(-1.0, 3.0), TorusShape::Lemon);
    }

    #[test]
    fn test_loose_tolerance_makes_a_vortex() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 3.0 + 5e-5, 3.0);
        let tight = ctx();
        let loose = ctx().with_tolerance(Tolerance::loose());

        assert_eq!(torus.shape(&tight.tolerance), TorusShape::Doughnut);
        assert!(torus.periodic_u(&tight));
        assert!(torus.natural_range_u(&tight) == Interval::new(-PI, PI));

        assert_eq!(torus.shape(&loose.tolerance), TorusShape::Vortex);
        assert!(!torus.periodic_u(&loose));
        assert!(!torus.closed_u(&loose));
        let apex = torus.apex_u(&loose.tolerance).unwrap();
        assert_eq!(torus.param_range_u(None, &loose), Interval::new(-apex, apex));
        assert!(torus.singular_u(apex, &loose));
        assert!(!torus.singular_u(apex, &tight));

        // at the apex the outward direction switches to the axis
        let tip = DVec2::new(apex, 0.3);
        assert!((torus.eval_outdir(tip, &loose) - DVec3::Z).length() < 1e-12);
        assert!(torus.eval_outdir(tip, &tight).dot(DVec3::Z).abs() < 1e-12);
    }

    #[test]
    fn test_doughnut_is_periodic_in_u() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 10.0, 3.0);
        assert!(torus.periodic_u(&ctx()));
        assert!(torus.periodic_v(&ctx()));
        assert_eq!(torus.param_range_u(None, &ctx()), Interval::new(-PI, PI));
        assert_eq!(torus.param_period_u(&ctx()), TAU);
        assert!(!torus.singular_u(PI, &ctx()));
        assert!(torus.apex_u(&Tolerance::default()).is_none());
    }

    #[test]
    fn test_apple_range() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 1.0, 3.0);
        let apex = (-1.0f64 / 3.0).acos();
        assert!(!torus.periodic_u(&ctx()));
        assert!(!torus.closed_u(&ctx()));
        assert_eq!(torus.param_period_u(&ctx()), 0.0);
        let range = torus.param_range_u(None, &ctx());
        assert_relative_eq!(range.lo, -apex);
        assert_relative_eq!(range.hi, apex);
        assert!(torus.singular_u(apex, &ctx()));
        assert!(torus.singular_u(-apex, &ctx()));
        // the apexes lie on the axis
        let top = torus.eval_position(DVec2::new(apex, 0.7));
        assert!(top.truncate().length() < 1e-12);
    }

    #[test]
    fn test_derivatives_match_differences() {
        let torus = Torus::with_frame(DVec3::ONE, DVec3::new(1.0, 0.0, 1.0), 4.0, -1.5, DVec3::Y, true);
        let uv = DVec2::new(0.9, -2.2);
        let h = 1e-6;
        let ev = torus.eval_derivs(uv, 2);
        let at = |du: f64, dv: f64| torus.eval_derivs(uv + DVec2::new(du, dv), 1);
        let du = (at(h, 0.0).position - at(-h, 0.0).position) / (2.0 * h);
        let dv = (at(0.0, h).position - at(0.0, -h).position) / (2.0 * h);
        assert!((ev.pu() - du).length() < 1e-7);
        assert!((ev.pv() - dv).length() < 1e-7);
        assert!((ev.puu() - (at(h, 0.0).pu() - at(-h, 0.0).pu()) / (2.0 * h)).length() < 1e-7);
        assert!((ev.puv() - (at(0.0, h).pu() - at(0.0, -h).pu()) / (2.0 * h)).length() < 1e-7);
        assert!((ev.pvv() - (at(0.0, h).pv() - at(0.0, -h).pv()) / (2.0 * h)).length() < 1e-7);
    }

    #[test]
    fn test_handedness_matches_cross_product() {
        for (minor, reverse) in [(1.0, false), (1.0, true), (-1.0, false), (-1.0, true)] {
            let torus = Torus::with_frame(DVec3::ZERO, DVec3::Z, 4.0, minor, DVec3::X, reverse);
            let uv = DVec2::new(0.4, 1.0);
            let ev = torus.eval_derivs(uv, 1);
            let opposes = ev.pu().cross(ev.pv()).dot(torus.eval_normal(uv)) < 0.0;
            assert_eq!(opposes, torus.left_handed_uv());
        }
    }

    #[test]
    fn test_param_inverts_evaluation() {
        for (major, minor) in [(10.0, 3.0), (1.0, 3.0), (-1.0, 3.0)] {
            let torus = Torus::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.0, 1.0, 1.0), major, minor);
            let range = torus.natural_range_u(&ctx());
            let uv = DVec2::new(0.8 * range.hi, 1.3);
            let back = torus.param(torus.eval_position(uv), None, &ctx());
            assert_abs_diff_eq!(back.x, uv.x, epsilon = 1e-10);
            assert_abs_diff_eq!(back.y, uv.y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_closest_point_from_outside() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 10.0, 3.0);
        let fp = torus.closest_point(DVec3::new(20.0, 0.0, 0.0), None, &ctx());
        assert!((fp.foot - DVec3::new(13.0, 0.0, 0.0)).length() < 1e-12);
        assert_relative_eq!(fp.distance, 7.0, epsilon = 1e-12);
        assert!((fp.normal - DVec3::new(1.0, 0.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_closest_point_at_tube_centre_is_deterministic() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 10.0, 3.0);
        let q = torus.eval_position(DVec2::new(0.0, 0.5)) - 3.0 * torus.eval_normal(DVec2::new(0.0, 0.5));
        let a = torus.closest_point(q, None, &ctx());
        let b = torus.closest_point(q, None, &ctx());
        assert_eq!(a, b);
        assert_relative_eq!(a.distance, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_lemon_closest_point() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, -1.0, 3.0);
        let p = DVec3::new(2.5, 0.0, 0.0);
        let fp = torus.closest_point(p, None, &ctx());
        assert!((fp.foot - DVec3::new(2.0, 0.0, 0.0)).length() < 1e-12);
        let range = torus.natural_range_u(&ctx());
        for i in 0..=20 {
            let uv = DVec2::new(range.lo + range.length() * i as f64 / 20.0, fp.param.y);
            assert!(fp.distance <= (torus.eval_position(uv) - p).length() + 1e-12);
        }
    }

    #[test]
    fn test_apple_closest_point_on_axis_is_apex() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 1.0, 3.0);
        let apex = torus.apex_u(&Tolerance::default()).unwrap();
        let tip = torus.eval_position(DVec2::new(apex, 0.0));
        let fp = torus.closest_point(DVec3::new(0.0, 0.0, 2.0), None, &ctx());
        assert!((fp.foot - tip).length() < 1e-12);
        assert!(torus.singular_u(fp.param.x, &ctx()));
        assert!((fp.normal - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_curvature_of_doughnut() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 10.0, 3.0);
        // outer equator: tube curvature 1/3, spine curvature 1/13
        let pc = torus.eval_curvature(DVec2::new(0.0, 0.4), &ctx());
        assert_relative_eq!(pc.k1, 1.0 / 13.0, epsilon = 1e-12);
        assert_relative_eq!(pc.k2, 1.0 / 3.0, epsilon = 1e-12);
        // inner equator is saddle-shaped
        let pc = torus.eval_curvature(DVec2::new(PI, 0.4), &ctx());
        assert_relative_eq!(pc.k1, -1.0 / 7.0, epsilon = 1e-12);
        assert_relative_eq!(pc.k2, 1.0 / 3.0, epsilon = 1e-12);
        assert!(pc.d1.dot(pc.d2).abs() < 1e-12);
    }

    #[test]
    fn test_transform_round_trip() {
        let original = Torus::new(DVec3::new(1.0, 0.0, 0.0), DVec3::Y, 4.0, 1.0);
        let t = Transform::from_rotation(DVec3::new(1.0, 1.0, 0.0).normalize(), 0.8)
            .then(&Transform::from_scale(1.5))
            .then(&Transform::from_reflection(DVec3::Z));
        let mut torus = original.clone();
        torus.transform(&t).unwrap();
        let uv = DVec2::new(0.6, -1.1);
        assert!((torus.eval_position(uv) - t.transform_point(original.eval_position(uv))).length() < 1e-12);
        torus.transform(&t.inverse().unwrap()).unwrap();
        assert!(torus.approx_eq(&original, &Tolerance::default()));
    }

    #[test]
    fn test_bound_contains_samples() {
        let torus = Torus::new(DVec3::ZERO, DVec3::new(0.0, 1.0, 1.0), 1.0, 3.0);
        let b = torus.bound(None, None, &ctx());
        let range = torus.natural_range_u(&ctx());
        for i in 0..=12 {
            for j in 0..=12 {
                let uv = DVec2::new(range.lo + range.length() * i as f64 / 12.0, -PI + TAU * j as f64 / 12.0);
                assert!(b.expand(1e-12).contains_point(torus.eval_position(uv)));
            }
        }
    }

    #[test]
    fn test_normal_cone_contains_normals() {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 5.0, 2.0);
        let pbox = ParamBox::new(Interval::new(2.0, 3.5), Interval::new(-0.2, 0.9));
        let cone = torus.normal_cone(&pbox, false, None, &ctx());
        for i in 0..=8 {
            for j in 0..=8 {
                let uv = DVec2::new(2.0 + 1.5 * i as f64 / 8.0, -0.2 + 1.1 * j as f64 / 8.0);
                assert!(cone.contains(torus.eval_normal(uv), 1e-12));
            }
        }
        let full = torus.normal_cone(&ParamBox::infinite(), false, None, &ctx());
        assert_relative_eq!(full.angle, PI);
    }
}
