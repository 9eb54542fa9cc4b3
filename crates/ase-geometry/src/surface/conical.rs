//! Conical surface with an elliptical cross-section; cylinders are the
//! zero-angle case.

use std::f64::consts::{PI, TAU};
use std::fmt;

use ase_core::{AseError, GeomContext, Result, Tolerance, Validate};
use ase_math::{normalize_or_zero, Aabb3, Interval, ParamBox, Point2, Point3, Transform, Vector3, DVec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use super::bounds::interval_box;
use super::{
    transformed_cone_fallback, transformed_copy, wrap_angle, FootPoint, FootQuality, NormalCone, PrincipalCurvature,
    Surface, SurfaceEval, SurfaceKind,
};
use crate::curve::Ellipse;

/// Samples of the spine angle scanned before refining an elliptical foot.
const FOOT_SCAN_SAMPLES: usize = 32;

/// A cone over an ellipse.
///
/// With `V(v)` the base ellipse offset at `v`, `a` the major radius,
/// `(s, c)` the sine and cosine of the half-angle (both negated when the
/// cosine is negative), `sigma = -1` when `reverse_u` is set and
/// `t = u / u_param_scale`:
///
/// `P(u, v) = base.center + (1 + s*t)*V(v) + c*t*a*sigma*base.normal`
///
/// The default `u_param_scale` is the major radius, which makes `u` the
/// arclength along a generator of a circular cone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cone {
    /// Cross-section at `u = 0`.
    pub base: Ellipse,
    pub sine_angle: f64,
    /// Negative for a hollow cone (normals towards the axis).
    pub cosine_angle: f64,
    pub reverse_u: bool,
    pub u_param_scale: f64,
    pub subset: ParamBox,
}

impl Cone {
    pub fn new(base: Ellipse, sine_angle: f64, cosine_angle: f64) -> Self {
        let u_param_scale = base.major_radius();
        Self {
            base,
            sine_angle,
            cosine_angle,
            reverse_u: false,
            u_param_scale,
            subset: ParamBox::infinite(),
        }
    }

    /// Circular cone with the given half-angle in radians.
    pub fn circular(center: Point3, axis: Vector3, major_dir: Vector3, radius: f64, half_angle: f64) -> Self {
        let (s, c) = half_angle.sin_cos();
        Self::new(Ellipse::circle(center, axis, major_dir, radius), s, c)
    }

    /// Circular cylinder.
    pub fn cylinder_from(center: Point3, axis: Vector3, major_dir: Vector3, radius: f64) -> Self {
        Self::new(Ellipse::circle(center, axis, major_dir, radius), 0.0, 1.0)
    }

    pub fn with_reverse_u(mut self, reverse_u: bool) -> Self {
        self.reverse_u = reverse_u;
        self
    }

    /// Change the u scaling. Positions move along the generators; callers
    /// holding parameters must rescale them.
    pub fn set_u_param_scale(&mut self, scale: f64) {
        self.u_param_scale = scale;
    }

    pub fn cylinder(&self, tol: &Tolerance) -> bool {
        tol.is_negligible_angle(self.sine_angle)
    }

    /// Degenerate to a plane.
    pub fn flat(&self, tol: &Tolerance) -> bool {
        tol.is_negligible_angle(self.cosine_angle)
    }

    pub fn circular_section(&self, tol: &Tolerance) -> bool {
        self.base.is_circular(tol.linear)
    }

    pub fn contracting(&self) -> bool {
        self.sine_angle * self.cosine_angle < 0.0
    }

    pub fn expanding(&self) -> bool {
        self.sine_angle * self.cosine_angle > 0.0
    }

    pub fn hollow(&self) -> bool {
        self.cosine_angle < 0.0
    }

    pub fn convex(&self) -> bool {
        self.cosine_angle > 0.0
    }

    pub fn positive(&self) -> bool {
        self.sine_angle > 0.0
    }

    /// Angle between a generator and the axis, in `[0, PI/2]`.
    pub fn half_angle(&self) -> f64 {
        self.sine_angle.abs().atan2(self.cosine_angle.abs())
    }

    /// Major radius of the cross-section at `u`.
    pub fn radius_at(&self, u: f64) -> f64 {
        self.base.major_radius() * self.lambda(u)
    }

    /// The apex, `None` for a cylinder.
    pub fn apex(&self, tol: &Tolerance) -> Option<Point3> {
        self.apex_u(tol).map(|u| self.eval_position(Point2::new(u, 0.0)))
    }

    /// u parameter of the apex, `None` for a cylinder.
    pub fn apex_u(&self, tol: &Tolerance) -> Option<f64> {
        if self.cylinder(tol) {
            return None;
        }
        let (s, _) = self.angles();
        Some(-self.u_param_scale / s)
    }

    /// Sine and cosine with the cosine made non-negative.
    fn angles(&self) -> (f64, f64) {
        if self.cosine_angle < 0.0 {
            (-self.sine_angle, -self.cosine_angle)
        } else {
            (self.sine_angle, self.cosine_angle)
        }
    }

    fn sigma(&self) -> f64 {
        if self.reverse_u {
            -1.0
        } else {
            1.0
        }
    }

    /// `dt/du`; zero for an undefined zero scale, which pins every u to
    /// the base section.
    fn inv_scale(&self) -> f64 {
        if self.u_param_scale == 0.0 {
            0.0
        } else {
            1.0 / self.u_param_scale
        }
    }

    fn t(&self, u: f64) -> f64 {
        u * self.inv_scale()
    }

    /// Cross-section scale at `u`; zero at the apex.
    fn lambda(&self, u: f64) -> f64 {
        let (s, _) = self.angles();
        1.0 + s * self.t(u)
    }

    /// Axial offset direction per unit `t`: `c * a * sigma * normal`.
    fn axial(&self) -> Vector3 {
        let (_, c) = self.angles();
        c * self.base.major_radius() * self.sigma() * self.base.normal
    }

    /// `d/dv` of the base offset.
    fn offset_deriv(&self, v: f64) -> Vector3 {
        -v.sin() * self.base.major_axis + v.cos() * self.base.minor_axis()
    }

    /// Unoriented generator direction `dP/dt` at `v`.
    fn generator(&self, v: f64) -> Vector3 {
        let (s, _) = self.angles();
        s * self.base.offset_at(v) + self.axial()
    }

    /// Oriented normal, constant along each generator.
    fn normal_at_v(&self, v: f64) -> Vector3 {
        let n = normalize_or_zero(self.generator(v).cross(self.offset_deriv(v)));
        if self.left_handed_uv() {
            -n
        } else {
            n
        }
    }

    /// Foot on the generator at `v`, as `(t, squared distance)`; `t` is
    /// clamped to the live side of the apex.
    fn foot_on_generator(&self, d: Vector3, v: f64, tol: &Tolerance) -> (f64, f64) {
        let (s, _) = self.angles();
        let base = self.base.offset_at(v);
        let dir = self.generator(v);
        let rel = d - base;
        let mut t = rel.dot(dir) / dir.length_squared().max(f64::MIN_POSITIVE);
        if !self.cylinder(tol) {
            let t_apex = -1.0 / s;
            t = if s > 0.0 { t.max(t_apex) } else { t.min(t_apex) };
        }
        (t, (rel - t * dir).length_squared())
    }

    /// Closed-form foot for a circular cross-section, solved in the
    /// meridian half-planes through the query point.
    fn circular_foot(&self, pos: Point3, guess: Option<Point2>, tol: &Tolerance) -> Point2 {
        let d = pos - self.base.center;
        let n = self.base.normal;
        let h = d.dot(n);
        let radial = d - h * n;
        let rho = radial.length();
        let guess_v = guess.map(|g| g.y);
        let v0 = if rho <= 1e-14 * self.base.major_radius().max(1.0) {
            guess_v.unwrap_or(0.0)
        } else {
            match self.base.param(pos) {
                Some(v) => wrap_angle(v, guess_v),
                None => guess_v.unwrap_or(0.0),
            }
        };

        let (t0, d0) = self.foot_on_generator(d, v0, tol);
        let v1 = wrap_angle(v0 + PI, guess_v);
        let (t1, d1) = self.foot_on_generator(d, v1, tol);
        let (t, v) = if d1 < d0 { (t1, v1) } else { (t0, v0) };
        Point2::new(t * self.u_param_scale, v)
    }

    /// Foot for an elliptical cross-section: a scan of the spine angle
    /// followed by golden-section refinement of every local minimum the
    /// scan finds, since the per-generator distance can have two basins.
    #[instrument(level = "trace", skip(self, ctx))]
    fn elliptical_foot(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> (Point2, FootQuality) {
        let d = pos - self.base.center;
        let tol = &ctx.tolerance;
        let f = |v: f64| self.foot_on_generator(d, v, tol).1;

        let n = FOOT_SCAN_SAMPLES;
        let step = TAU / n as f64;
        let scan: Vec<f64> = (0..n).map(|i| f(-PI + i as f64 * step)).collect();
        let mut seeds: Vec<f64> = (0..n)
            .filter(|&i| scan[i] <= scan[(i + n - 1) % n] && scan[i] <= scan[(i + 1) % n])
            .map(|i| -PI + i as f64 * step)
            .collect();
        if let Some(g) = guess {
            seeds.push(g.y);
        }

        let mut best: Option<(f64, f64, u32, f64)> = None;
        for seed in seeds {
            let (v, iterations, residual) = golden_section(&f, seed - step, seed + step, ctx);
            let fv = f(v);
            if best.map_or(true, |(bf, ..)| fv < bf) {
                best = Some((fv, v, iterations, residual));
            }
        }
        let Some((_, v, iterations, residual)) = best else {
            debug!("elliptical cone foot has no finite candidate");
            let v = guess.map_or(0.0, |g| g.y);
            return (Point2::new(0.0, v), FootQuality::Approximate { residual: f64::INFINITY });
        };

        let (t, _) = self.foot_on_generator(d, v, tol);
        let v = wrap_angle(v, guess.map(|g| g.y));
        let quality = if residual <= ctx.solver_tolerance {
            FootQuality::Converged { iterations }
        } else {
            debug!(iterations, residual, "elliptical cone foot did not converge");
            FootQuality::Approximate { residual }
        };
        (Point2::new(t * self.u_param_scale, v), quality)
    }

    /// Sampled normal cone over a spine-angle range.
    fn sampled_normal_cone(&self, v: Interval) -> NormalCone {
        const SAMPLES: usize = 16;
        let normals: Vec<Vector3> = (0..=SAMPLES)
            .map(|i| self.normal_at_v(v.lo + v.length() * i as f64 / SAMPLES as f64))
            .collect();
        let axis = normalize_or_zero(normals.iter().copied().sum::<Vector3>());
        let angle = normals
            .iter()
            .map(|n| n.dot(axis).clamp(-1.0, 1.0).acos())
            .fold(0.0, f64::max);
        NormalCone::approximate(axis, angle, false).with_variation(self.base.normal)
    }

    pub fn approx_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        self.base.approx_eq(&other.base, tol)
            && (self.sine_angle - other.sine_angle).abs() < tol.linear
            && (self.cosine_angle - other.cosine_angle).abs() < tol.linear
            && (self.u_param_scale - other.u_param_scale).abs() < tol.linear
            && self.reverse_u == other.reverse_u
            && self.subset.approx_eq(&other.subset, tol.linear)
    }
}

impl Validate for Cone {
    fn validate(&self) -> Result<()> {
        if !self.is_defined() {
            return Err(AseError::Geometry(format!(
                "cone with angle ({}, {}) and scale {} is undefined",
                self.sine_angle, self.cosine_angle, self.u_param_scale
            )));
        }
        Ok(())
    }
}

impl Surface for Cone {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Cone
    }

    fn is_defined(&self) -> bool {
        !(self.sine_angle == 0.0 && self.cosine_angle == 0.0) && self.base.is_defined() && self.u_param_scale > 0.0
    }

    fn subset_range(&self) -> &ParamBox {
        &self.subset
    }

    fn subset_range_mut(&mut self) -> &mut ParamBox {
        &mut self.subset
    }

    fn natural_range_u(&self, ctx: &GeomContext) -> Interval {
        match self.apex_u(&ctx.tolerance) {
            None => Interval::infinite(),
            Some(apex) if self.angles().0 > 0.0 => Interval::above(apex),
            Some(apex) => Interval::below(apex),
        }
    }

    fn natural_range_v(&self, _ctx: &GeomContext) -> Interval {
        Interval::new(-PI, PI)
    }

    fn natural_period_v(&self, _ctx: &GeomContext) -> f64 {
        TAU
    }

    fn singular_u(&self, u: f64, ctx: &GeomContext) -> bool {
        match self.apex_u(&ctx.tolerance) {
            Some(apex) => ctx.tolerance.is_negligible_length(u - apex),
            None => false,
        }
    }

    fn left_handed_uv(&self) -> bool {
        (self.cosine_angle > 0.0) ^ self.reverse_u
    }

    fn eval_position(&self, uv: Point2) -> Point3 {
        let t = self.t(uv.x);
        self.base.center + self.lambda(uv.x) * self.base.offset_at(uv.y) + t * self.axial()
    }

    fn eval_normal(&self, uv: Point2) -> Vector3 {
        let ev = self.eval_derivs(uv, 1);
        let n = normalize_or_zero(ev.pu().cross(ev.pv()));
        if self.left_handed_uv() {
            -n
        } else {
            n
        }
    }

    /// At the apex the outward direction points away from the cone along
    /// its axis.
    fn eval_outdir(&self, uv: Point2, ctx: &GeomContext) -> Vector3 {
        if self.singular_u(uv.x, ctx) {
            return normalize_or_zero(-self.sine_angle * self.sigma() * self.base.normal);
        }
        self.eval_normal(uv)
    }

    fn accurate_derivs(&self) -> usize {
        2
    }

    fn eval_derivs(&self, uv: Point2, nd: usize) -> SurfaceEval {
        let (s, _) = self.angles();
        let dt = self.inv_scale();
        let lambda = self.lambda(uv.x);
        let offset = self.base.offset_at(uv.y);
        let doffset = self.offset_deriv(uv.y);

        let mut ev = SurfaceEval::new(self.eval_position(uv));
        if nd >= 1 {
            ev.derivs.push(vec![dt * self.generator(uv.y), lambda * doffset]);
        }
        if nd >= 2 {
            ev.derivs.push(vec![DVec3::ZERO, dt * s * doffset, -lambda * offset]);
        }
        ev
    }

    fn param(&self, pos: Point3, guess: Option<Point2>, _ctx: &GeomContext) -> Point2 {
        let d = pos - self.base.center;
        let v = match self.base.param(pos) {
            Some(v) if self.lambda_of_projection(pos) > 1e-14 => wrap_angle(v, guess.map(|g| g.y)),
            _ => guess.map_or(0.0, |g| g.y),
        };
        let dir = self.generator(v);
        let t = (d - self.base.offset_at(v)).dot(dir) / dir.length_squared().max(f64::MIN_POSITIVE);
        Point2::new(t * self.u_param_scale, v)
    }

    fn closest_point(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> FootPoint {
        if !self.is_defined() {
            warn!(
                sine = self.sine_angle,
                cosine = self.cosine_angle,
                "closest point requested on an undefined cone"
            );
        }
        let (param, quality) = if self.circular_section(&ctx.tolerance) {
            (self.circular_foot(pos, guess, &ctx.tolerance), FootQuality::Exact)
        } else {
            self.elliptical_foot(pos, guess, ctx)
        };
        let foot = self.eval_position(param);
        FootPoint::new(pos, foot, param, self.eval_outdir(param, ctx), quality)
    }

    fn eval_curvature(&self, uv: Point2, ctx: &GeomContext) -> PrincipalCurvature {
        let normal = self.eval_normal(uv);
        let lambda = self.lambda(uv.x);
        if lambda.abs() < 1e-14 {
            return PrincipalCurvature::isotropic(self.base.normal, self.base.major_axis, 0.0);
        }
        if !self.circular_section(&ctx.tolerance) {
            let ev = self.evaluate(uv, 2, ctx);
            return super::curvature_from_derivs(ev.pu(), ev.pv(), ev.puu(), ev.puv(), ev.pvv(), normal);
        }
        let w = self.sine_angle.hypot(self.cosine_angle);
        let section = w * self.base.major_radius() * lambda;
        if section == 0.0 {
            return PrincipalCurvature::isotropic(self.base.normal, self.base.major_axis, 0.0);
        }
        let k = self.cosine_angle / section;
        let generator = normalize_or_zero(self.generator(uv.y));
        let around = normalize_or_zero(normal.cross(generator));
        PrincipalCurvature::new(generator, 0.0, around, k)
    }

    fn bound(&self, pbox: Option<&ParamBox>, t: Option<&Transform>, ctx: &GeomContext) -> Aabb3 {
        if let Some(t) = t {
            return match transformed_copy(self, t) {
                Some(copy) => copy.bound(pbox, None, ctx),
                None => self.bound(pbox, None, ctx).transformed(t),
            };
        }
        let range = self.param_range(pbox, ctx);
        if !range.u.is_finite() {
            return Aabb3::infinite();
        }
        let (s, _) = self.angles();
        let t = range.u * self.inv_scale();
        let lambda = t * s + 1.0;
        interval_box(
            self.base.center,
            &[
                (lambda * range.v.cos(), self.base.major_axis),
                (lambda * range.v.sin(), self.base.minor_axis()),
                (t, self.axial()),
            ],
        )
    }

    fn normal_cone(&self, pbox: &ParamBox, approx_ok: bool, t: Option<&Transform>, ctx: &GeomContext) -> NormalCone {
        if let Some(t) = t {
            return match transformed_copy(self, t) {
                Some(copy) => copy.normal_cone(pbox, approx_ok, None, ctx),
                None => transformed_cone_fallback(self.normal_cone(pbox, approx_ok, None, ctx), t),
            };
        }
        let tol = &ctx.tolerance;
        let v = self.param_range(Some(pbox), ctx).v;
        let axis_dir = self.base.normal;
        let (s, c) = self.angles();

        // Every normal makes a bounded angle with the axis.
        let ratio = self.base.radius_ratio.abs();
        let around_axis = if self.cylinder(tol) {
            NormalCone::exact(axis_dir, PI / 2.0)
        } else {
            let side = if self.normal_at_v(0.0).dot(axis_dir) >= 0.0 { axis_dir } else { -axis_dir };
            let angle = (c * ratio.max(1.0)).atan2(s.abs() * ratio);
            NormalCone::exact(side, angle)
        };

        let full_v = !v.is_finite() || v.length() >= TAU;
        let w = s.hypot(c);
        let cone = if self.circular_section(tol) && !full_v && w > 0.0 {
            let along = NormalCone::exact(self.normal_at_v(v.mid()), (c / w) * 0.5 * v.length());
            if along.angle < around_axis.angle {
                along
            } else {
                around_axis
            }
        } else if approx_ok && !full_v {
            let sampled = self.sampled_normal_cone(v);
            if sampled.angle < around_axis.angle {
                sampled
            } else {
                around_axis
            }
        } else {
            around_axis
        };
        cone.with_variation(axis_dir)
    }

    fn transform(&mut self, t: &Transform) -> Result<()> {
        let Some(k) = t.uniform_scale() else {
            debug!("rejecting non-similarity transform of cone");
            return Err(AseError::Transform("cone requires a similarity transform".into()));
        };
        self.base.transform(t)?;
        self.u_param_scale *= k;
        if t.reflects() {
            self.reverse_u = !self.reverse_u;
        }
        Ok(())
    }

    fn negate(&mut self) {
        self.sine_angle = -self.sine_angle;
        self.cosine_angle = -self.cosine_angle;
    }
}

impl Cone {
    /// Cross-section scale implied by the in-plane distance of `pos` from
    /// the axis.
    fn lambda_of_projection(&self, pos: Point3) -> f64 {
        let d = pos - self.base.center;
        let radial = d - d.dot(self.base.normal) * self.base.normal;
        radial.length() / self.base.major_radius().max(f64::MIN_POSITIVE)
    }
}

impl fmt::Display for Cone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cone base {} normal {} major {} ratio {} angle ({}, {}) scale {} {}",
            self.base.center,
            self.base.normal,
            self.base.major_axis,
            self.base.radius_ratio,
            self.sine_angle,
            self.cosine_angle,
            self.u_param_scale,
            if self.reverse_u { "reversed_u" } else { "forward_u" }
        )
    }
}

/// Golden-section minimum of `f` on `[lo, hi]`, as `(v, iterations, final
/// bracket width)`. The midpoint of the bracket is returned unless the
/// bracket centre it started from is lower.
fn golden_section(f: impl Fn(f64) -> f64, mut lo: f64, mut hi: f64, ctx: &GeomContext) -> (f64, u32, f64) {
    const INV_PHI: f64 = 0.618_033_988_749_894_9;
    let start = 0.5 * (lo + hi);
    let mut x1 = hi - INV_PHI * (hi - lo);
    let mut x2 = lo + INV_PHI * (hi - lo);
    let (mut f1, mut f2) = (f(x1), f(x2));
    let mut iterations = 0;
    while iterations < ctx.max_iterations && hi - lo > ctx.solver_tolerance {
        if f1 < f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = hi - INV_PHI * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = lo + INV_PHI * (hi - lo);
            f2 = f(x2);
        }
        iterations += 1;
        trace!(iterations, lo, hi, "golden-section step");
    }
    let mid = 0.5 * (lo + hi);
    let v = if f(start) < f(mid) { start } else { mid };
    (v, iterations, hi - lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use ase_math::DVec2;
    use std::f64::consts::FRAC_PI_4;

    fn ctx() -> GeomContext {
        GeomContext::default()
    }

    fn tol() -> Tolerance {
        Tolerance::default()
    }

    /// 45 degree cone widening upwards from a unit circle at z = 0.
    fn unit_cone() -> Cone {
        Cone::circular(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0, FRAC_PI_4)
    }

    fn elliptical_cone() -> Cone {
        let base = Ellipse::new(DVec3::ZERO, DVec3::Z, DVec3::new(2.0, 0.0, 0.0), 0.5);
        let (s, c) = 0.3f64.sin_cos();
        Cone::new(base, s, c)
    }

    #[test]
    fn test_conical_apex() {
        let cone = unit_cone();
        let apex = cone.apex(&tol()).unwrap();
        assert!((apex - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
        let apex_u = cone.apex_u(&tol()).unwrap();
        assert_relative_eq!(apex_u, -2f64.sqrt(), epsilon = 1e-12);
        assert!(cone.singular_u(apex_u, &ctx()));
        assert!(!cone.singular_u(0.0, &ctx()));
        assert!(!cone.singular_u(apex_u + 1e-5, &ctx()));
        assert!(cone.singular_u(apex_u + 1e-5, &ctx().with_tolerance(Tolerance::loose())));
    }

    #[test]
    fn test_conical_radius_grows() {
        let cone = unit_cone();
        assert_relative_eq!(cone.radius_at(0.0), 1.0);
        assert!(cone.radius_at(1.0) > cone.radius_at(0.0));
        // u is arclength along the generator
        let p0 = cone.eval_position(DVec2::new(0.0, 0.3));
        let p1 = cone.eval_position(DVec2::new(1.5, 0.3));
        assert_relative_eq!((p1 - p0).length(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_conical_half_angle() {
        let cone = unit_cone();
        assert_relative_eq!(cone.half_angle(), FRAC_PI_4, epsilon = 1e-12);
        assert!(cone.expanding());
        assert!(cone.convex());
        assert!(cone.positive());
        assert!(!cone.cylinder(&tol()));
        assert!(!cone.flat(&tol()));
        assert!(cone.circular_section(&tol()));
    }

    #[test]
    fn test_cylinder_classification() {
        let cyl = Cone::cylinder_from(DVec3::ZERO, DVec3::Z, DVec3::X, 2.0);
        assert!(cyl.cylinder(&tol()));
        assert!(cyl.apex(&tol()).is_none());
        assert!(cyl.natural_range_u(&ctx()).is_infinite());
        let nearly = Cone::new(cyl.base.clone(), 0.5 * Tolerance::DEFAULT_ANGULAR, 1.0);
        assert!(nearly.cylinder(&tol()));
        let not = Cone::new(cyl.base.clone(), 2.0 * Tolerance::DEFAULT_ANGULAR, 1.0);
        assert!(!not.cylinder(&tol()));
    }

    #[test]
    fn test_classification_follows_context_tolerance() {
        let loose = ctx().with_tolerance(Tolerance::loose());
        let steep = Cone::new(Ellipse::circle(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0), 5e-7, 1.0);
        assert!(!steep.cylinder(&tol()));
        assert!(steep.natural_range_u(&ctx()).is_bounded_below());
        assert!(steep.cylinder(&loose.tolerance));
        assert!(steep.natural_range_u(&loose).is_infinite());
        assert!(steep.bound(None, None, &loose).is_infinite());

        let nearly_flat = Cone::new(Ellipse::circle(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0), 1.0, 5e-7);
        assert!(!nearly_flat.flat(&tol()));
        assert!(nearly_flat.flat(&loose.tolerance));

        let base = Ellipse::new(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0 - 5e-5);
        let oval = Cone::new(base, 0.5, 0.75f64.sqrt());
        assert!(!oval.circular_section(&tol()));
        assert!(oval.circular_section(&loose.tolerance));
        let q = DVec3::new(3.0, 1.0, 0.5);
        assert_eq!(oval.closest_point(q, None, &loose).quality, FootQuality::Exact);
        assert!(oval.closest_point(q, None, &ctx()).quality.is_converged());
    }

    #[test]
    fn test_u_range_is_half_infinite() {
        let cone = unit_cone();
        let range = cone.natural_range_u(&ctx());
        assert!(range.is_bounded_below());
        assert!(!range.is_bounded_above());
        assert!(!cone.periodic_u(&ctx()));
        assert!(cone.periodic_v(&ctx()));

        let contracting = Cone::circular(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0, -FRAC_PI_4);
        assert!(contracting.contracting());
        assert!(contracting.natural_range_u(&ctx()).is_bounded_above());
    }

    #[test]
    fn test_derivatives_match_differences() {
        let mut cone = elliptical_cone().with_reverse_u(true);
        cone.set_u_param_scale(3.0);
        let uv = DVec2::new(0.7, 2.1);
        let h = 1e-6;
        let ev = cone.eval_derivs(uv, 2);
        let at = |du: f64, dv: f64| cone.eval_derivs(uv + DVec2::new(du, dv), 1);
        assert!((ev.pu() - (at(h, 0.0).position - at(-h, 0.0).position) / (2.0 * h)).length() < 1e-7);
        assert!((ev.pv() - (at(0.0, h).position - at(0.0, -h).position) / (2.0 * h)).length() < 1e-7);
        assert!(ev.puu().length() < 1e-15);
        assert!((ev.puv() - (at(0.0, h).pu() - at(0.0, -h).pu()) / (2.0 * h)).length() < 1e-7);
        assert!((ev.pvv() - (at(0.0, h).pv() - at(0.0, -h).pv()) / (2.0 * h)).length() < 1e-7);
    }

    #[test]
    fn test_normal_orientation() {
        let cone = Cone::cylinder_from(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0);
        let n = cone.eval_normal(DVec2::new(0.0, 0.0));
        assert!((n - DVec3::X).length() < 1e-12);
        for reverse in [false, true] {
            let mut c = cone.clone().with_reverse_u(reverse);
            assert!((c.eval_normal(DVec2::ZERO) - DVec3::X).length() < 1e-12);
            c.negate();
            assert!(c.hollow());
            assert!((c.eval_normal(DVec2::ZERO) + DVec3::X).length() < 1e-12);
        }
    }

    #[test]
    fn test_reverse_u_flips_axial_direction() {
        let fwd = unit_cone();
        let rev = unit_cone().with_reverse_u(true);
        let a = fwd.eval_position(DVec2::new(1.0, 0.0));
        let b = rev.eval_position(DVec2::new(1.0, 0.0));
        assert!(a.z > 0.0);
        assert!(b.z < 0.0);
        assert_relative_eq!(a.x, b.x, epsilon = 1e-12);
    }

    #[test]
    fn test_param_inverts_evaluation() {
        for cone in [unit_cone(), elliptical_cone().with_reverse_u(true)] {
            let uv = DVec2::new(0.6, -2.5);
            let back = cone.param(cone.eval_position(uv), None, &ctx());
            assert_abs_diff_eq!(back.x, uv.x, epsilon = 1e-10);
            assert_abs_diff_eq!(back.y, uv.y, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_closest_point_at_apex() {
        let cone = unit_cone();
        let apex = cone.apex(&tol()).unwrap();
        let fp = cone.closest_point(apex, None, &ctx());
        assert!((fp.foot - apex).length() < 1e-12);
        assert!(fp.distance < 1e-12);
        // outward at the apex is down the axis
        assert!((fp.normal + DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn test_closest_point_beyond_apex_is_apex() {
        let cone = unit_cone();
        let fp = cone.closest_point(DVec3::new(0.0, 0.0, -5.0), None, &ctx());
        assert!((fp.foot - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);
    }

    #[test]
    fn test_closest_point_outside() {
        let cone = unit_cone();
        // Point off the side of the cone at height 1, radius 3.
        let p = DVec3::new(3.0, 0.0, 1.0);
        let fp = cone.closest_point(p, None, &ctx());
        assert_eq!(fp.quality, FootQuality::Exact);
        // distance to the generator line x = z + 1
        assert_relative_eq!(fp.distance, 1.0 / 2f64.sqrt(), epsilon = 1e-12);
        assert!((cone.eval_position(fp.param) - fp.foot).length() < 1e-12);
    }

    #[test]
    fn test_cylinder_closest_point() {
        let cyl = Cone::cylinder_from(DVec3::new(1.0, 1.0, 0.0), DVec3::Z, DVec3::X, 2.0);
        let fp = cyl.closest_point(DVec3::new(1.0, 5.0, 7.0), None, &ctx());
        assert!((fp.foot - DVec3::new(1.0, 3.0, 7.0)).length() < 1e-12);
        assert_relative_eq!(fp.param.x, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn test_elliptical_closest_point_converges() {
        let cone = elliptical_cone();
        let p = DVec3::new(1.0, 2.0, 0.5);
        let fp = cone.closest_point(p, None, &ctx());
        assert!(matches!(fp.quality, FootQuality::Converged { .. }));
        for i in 0..64 {
            for j in 0..16 {
                let uv = DVec2::new(-1.0 + 0.25 * j as f64, -PI + TAU * i as f64 / 64.0);
                assert!(fp.distance <= (cone.eval_position(uv) - p).length() + 1e-9);
            }
        }
    }

    #[test]
    fn test_elliptical_closest_point_with_iteration_cap() {
        let cone = elliptical_cone();
        let fp = cone.closest_point(DVec3::new(1.0, 2.0, 0.5), None, &ctx().with_max_iterations(3));
        assert!(matches!(fp.quality, FootQuality::Approximate { .. }));
        assert!(fp.foot.is_finite());
    }

    #[test]
    fn test_curvature_of_circular_cone() {
        let cone = unit_cone();
        let pc = cone.eval_curvature(DVec2::new(0.0, 1.0), &ctx());
        assert_abs_diff_eq!(pc.k1, 0.0, epsilon = 1e-15);
        assert_relative_eq!(pc.k2, FRAC_PI_4.cos(), epsilon = 1e-12);
        assert!(pc.d1.dot(pc.d2).abs() < 1e-12);

        // agrees with the general derivative-based routine
        let ev = cone.eval_derivs(DVec2::new(0.0, 1.0), 2);
        let general = crate::surface::curvature_from_derivs(
            ev.pu(),
            ev.pv(),
            ev.puu(),
            ev.puv(),
            ev.pvv(),
            cone.eval_normal(DVec2::new(0.0, 1.0)),
        );
        assert_relative_eq!(general.k2, pc.k2, epsilon = 1e-12);
        assert_abs_diff_eq!(general.k1, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_with_reflection() {
        let original = elliptical_cone();
        let t = Transform::from_reflection(DVec3::new(1.0, 1.0, 1.0))
            .then(&Transform::from_scale(2.0))
            .then(&Transform::from_translation(DVec3::new(0.0, 4.0, 0.0)));
        let mut cone = original.clone();
        cone.transform(&t).unwrap();
        assert!(cone.reverse_u);
        for uv in [DVec2::new(0.5, 0.2), DVec2::new(-0.4, 2.8)] {
            let expected = t.transform_point(original.eval_position(uv));
            assert!((cone.eval_position(uv) - expected).length() < 1e-12);
        }
        cone.transform(&t.inverse().unwrap()).unwrap();
        assert!(cone.approx_eq(&original, &tol()));
    }

    #[test]
    fn test_bound_contains_samples() {
        let cone = elliptical_cone();
        let pbox = ParamBox::new(Interval::new(-1.0, 2.0), Interval::new(-1.0, 2.0));
        let b = cone.bound(Some(&pbox), None, &ctx());
        for i in 0..=10 {
            for j in 0..=10 {
                let uv = DVec2::new(-1.0 + 0.3 * i as f64, -1.0 + 0.3 * j as f64);
                assert!(b.expand(1e-12).contains_point(cone.eval_position(uv)));
            }
        }
        assert!(cone.bound(None, None, &ctx()).is_infinite());
    }

    #[test]
    fn test_normal_cone_contains_normals() {
        for cone in [unit_cone(), elliptical_cone(), Cone::cylinder_from(DVec3::ZERO, DVec3::Z, DVec3::X, 1.0)] {
            let pbox = ParamBox::new(Interval::new(0.0, 1.0), Interval::new(0.5, 1.5));
            let nc = cone.normal_cone(&pbox, false, None, &ctx());
            assert!(!nc.approximate);
            for j in 0..=10 {
                let uv = DVec2::new(0.5, 0.5 + 0.1 * j as f64);
                assert!(nc.contains(cone.eval_normal(uv), 1e-12), "{cone}");
            }
        }
    }

    #[test]
    fn test_approximate_normal_cone_is_flagged() {
        let cone = elliptical_cone();
        let pbox = ParamBox::new(Interval::new(0.0, 1.0), Interval::new(0.5, 0.6));
        let nc = cone.normal_cone(&pbox, true, None, &ctx());
        assert!(nc.approximate);
        assert!(!nc.oversize);
        assert!(nc.angle < cone.normal_cone(&pbox, false, None, &ctx()).angle);
    }

    #[test]
    fn test_zero_base_cone_is_finite() {
        let cone = Cone::circular(DVec3::new(1.0, 2.0, 3.0), DVec3::Z, DVec3::X, 0.0, FRAC_PI_4);
        assert_eq!(cone.u_param_scale, 0.0);
        assert!(!cone.is_defined());

        let uv = DVec2::new(0.7, 1.2);
        let ev = cone.evaluate(uv, 2, &ctx());
        assert_eq!(ev.position, cone.base.center);
        assert!(ev.derivs.iter().flatten().all(|d| *d == DVec3::ZERO));

        let fp = cone.closest_point(DVec3::new(4.0, 6.0, 3.0), None, &ctx());
        assert_eq!(fp.foot, cone.base.center);
        assert_relative_eq!(fp.distance, 5.0, epsilon = 1e-12);
        assert!(fp.param.is_finite());
        assert!(fp.normal.is_finite());

        let pc = cone.eval_curvature(uv, &ctx());
        assert_eq!((pc.k1, pc.k2), (0.0, 0.0));
        assert!(pc.d1.is_finite() && pc.d2.is_finite());
        assert!(cone.bound(Some(&ParamBox::from_corners(DVec2::ZERO, DVec2::ONE)), None, &ctx()).min.is_finite());
    }

    #[test]
    fn test_zero_angle_cone_is_finite() {
        let circular = Cone::new(Ellipse::circle(DVec3::ZERO, DVec3::Z, DVec3::X, 2.0), 0.0, 0.0);
        let elliptical = Cone::new(Ellipse::new(DVec3::ZERO, DVec3::Z, DVec3::new(2.0, 0.0, 0.0), 0.5), 0.0, 0.0);
        for cone in [circular, elliptical] {
            assert!(!cone.is_defined());
            let uv = DVec2::new(0.4, -0.9);
            let pc = cone.eval_curvature(uv, &ctx());
            assert_eq!((pc.k1, pc.k2), (0.0, 0.0), "{cone}");
            assert!(pc.d1.is_finite() && pc.d2.is_finite());

            let fp = cone.closest_point(DVec3::new(0.5, 3.0, 1.0), None, &ctx());
            assert!(fp.foot.is_finite() && fp.distance.is_finite());
            let nc = cone.normal_cone(&ParamBox::from_corners(DVec2::ZERO, DVec2::ONE), false, None, &ctx());
            assert!(nc.angle.is_finite());
        }
    }

    #[test]
    fn test_elliptical_foot_is_global_near_axis() {
        let base = Ellipse::new(DVec3::ZERO, DVec3::Z, DVec3::new(3.0, 0.0, 0.0), 0.35);
        let cone = Cone::new(base, 0.2, 0.96f64.sqrt());
        for i in 0..12 {
            let a = 0.37 * i as f64;
            let r = 0.3 + 0.05 * i as f64;
            let q = DVec3::new(r * a.cos(), r * a.sin(), -1.0 + 0.3 * i as f64);
            let fp = cone.closest_point(q, None, &ctx());
            let d = q - cone.base.center;
            let dense = (0..20_000)
                .map(|k| cone.foot_on_generator(d, -PI + TAU * k as f64 / 20_000.0, &tol()).1)
                .fold(f64::INFINITY, f64::min);
            assert!(fp.distance * fp.distance <= dense + 1e-9, "q={q} foot={} dense={}", fp.distance, dense.sqrt());
        }
    }
}
