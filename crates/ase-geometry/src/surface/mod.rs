//! The parametric surface contract and the four analytic surfaces.

mod analytic;
mod bounds;
mod conical;
mod diffgeom;
mod eval;
mod foot;
mod planar;
mod spherical;
mod toroidal;

use std::f64::consts::PI;
use std::fmt;

use ase_core::{GeomContext, Result};
use ase_math::{normalize_or_zero, Aabb3, Interval, ParamBox, Point2, Point3, Transform, Vector2, Vector3};
use nalgebra::{Matrix2, Vector2 as NaVector2};
use serde::{Deserialize, Serialize};

pub use analytic::AnalyticSurface;
pub use conical::Cone;
pub use diffgeom::{curvature_from_derivs, NormalCone, PrincipalCurvature};
pub use eval::{evaluate_with_fallback, SurfaceEval};
pub use foot::{FootPoint, FootQuality};
pub use planar::Plane;
pub use spherical::Sphere;
pub use toroidal::{Torus, TorusShape};

/// The closed set of analytic surface types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Plane,
    Cone,
    Sphere,
    Torus,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 4] = [SurfaceKind::Plane, SurfaceKind::Cone, SurfaceKind::Sphere, SurfaceKind::Torus];

    /// Identifier used in persisted records.
    pub fn type_name(self) -> &'static str {
        match self {
            SurfaceKind::Plane => "plane-surface",
            SurfaceKind::Cone => "cone-surface",
            SurfaceKind::Sphere => "sphere-surface",
            SurfaceKind::Torus => "torus-surface",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.type_name() == name)
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A parametric surface `P(u, v)` with an optional parameter-space trim box.
///
/// Queries take `&self` and never mutate, so a shared surface can be queried
/// from many threads. Only `transform`, `negate`, `limit` and `unlimit`
/// change a surface.
pub trait Surface: Send + Sync + fmt::Debug + fmt::Display {
    fn kind(&self) -> SurfaceKind;

    fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// False when the defining vectors or radii are degenerate. Queries on an
    /// undefined surface still return deterministic values.
    fn is_defined(&self) -> bool;

    // --- Trimming -------------------------------------------------------

    /// The trim box; infinite when the surface is untrimmed.
    fn subset_range(&self) -> &ParamBox;

    fn subset_range_mut(&mut self) -> &mut ParamBox;

    /// Restrict the reported parameter range. Evaluation is unaffected.
    fn limit(&mut self, range: &ParamBox, ctx: &GeomContext) {
        let current = *self.subset_range();
        let (period_u, period_v) = (self.natural_period_u(ctx), self.natural_period_v(ctx));
        *self.subset_range_mut() = trim_box(&current, range, period_u, period_v);
    }

    fn unlimit(&mut self) {
        *self.subset_range_mut() = ParamBox::infinite();
    }

    fn is_subsetted(&self) -> bool {
        !self.subset_range().is_infinite()
    }

    // --- Parameter-space queries ----------------------------------------
    //
    // Classification depends on `ctx.tolerance`: a torus whose radii agree
    // within the linear tolerance is a vortex, a cone whose sine is
    // negligible is a cylinder.

    /// Parameter range of the untrimmed surface in u.
    fn natural_range_u(&self, ctx: &GeomContext) -> Interval;

    fn natural_range_v(&self, ctx: &GeomContext) -> Interval;

    /// Period of the untrimmed surface in u, or 0.
    fn natural_period_u(&self, _ctx: &GeomContext) -> f64 {
        0.0
    }

    fn natural_period_v(&self, _ctx: &GeomContext) -> f64 {
        0.0
    }

    /// Period in u, 0 when the direction is not periodic or the trim box
    /// covers less than a full period.
    fn param_period_u(&self, ctx: &GeomContext) -> f64 {
        effective_period(self.natural_period_u(ctx), &self.subset_range().u)
    }

    fn param_period_v(&self, ctx: &GeomContext) -> f64 {
        effective_period(self.natural_period_v(ctx), &self.subset_range().v)
    }

    fn periodic_u(&self, ctx: &GeomContext) -> bool {
        self.param_period_u(ctx) > 0.0
    }

    fn periodic_v(&self, ctx: &GeomContext) -> bool {
        self.param_period_v(ctx) > 0.0
    }

    fn closed_u(&self, ctx: &GeomContext) -> bool {
        self.periodic_u(ctx)
    }

    fn closed_v(&self, ctx: &GeomContext) -> bool {
        self.periodic_v(ctx)
    }

    /// Parameter range in u, narrowed by the trim box and by `pbox`.
    fn param_range_u(&self, pbox: Option<&ParamBox>, ctx: &GeomContext) -> Interval {
        reported_range(
            self.natural_range_u(ctx),
            self.natural_period_u(ctx),
            self.subset_range().u,
            pbox.map(|b| b.u),
        )
    }

    fn param_range_v(&self, pbox: Option<&ParamBox>, ctx: &GeomContext) -> Interval {
        reported_range(
            self.natural_range_v(ctx),
            self.natural_period_v(ctx),
            self.subset_range().v,
            pbox.map(|b| b.v),
        )
    }

    fn param_range(&self, pbox: Option<&ParamBox>, ctx: &GeomContext) -> ParamBox {
        ParamBox::new(self.param_range_u(pbox, ctx), self.param_range_v(pbox, ctx))
    }

    /// Whether many points of parameter space map to one 3D point at `u`.
    fn singular_u(&self, _u: f64, _ctx: &GeomContext) -> bool {
        false
    }

    fn singular_v(&self, _v: f64, _ctx: &GeomContext) -> bool {
        false
    }

    /// True when `Pu x Pv` points against the surface normal.
    fn left_handed_uv(&self) -> bool;

    // --- Evaluation -----------------------------------------------------

    fn eval_position(&self, uv: Point2) -> Point3;

    /// Oriented unit normal; the zero vector where it is undefined.
    fn eval_normal(&self, uv: Point2) -> Vector3;

    /// Outward direction, well defined at apexes and poles too.
    fn eval_outdir(&self, uv: Point2, _ctx: &GeomContext) -> Vector3 {
        self.eval_normal(uv)
    }

    /// Number of derivative orders `eval_derivs` computes by formula.
    fn accurate_derivs(&self) -> usize;

    /// Position and up to `min(nd, accurate_derivs())` derivative orders.
    fn eval_derivs(&self, uv: Point2, nd: usize) -> SurfaceEval;

    /// Position and exactly `nd` derivative orders, differencing numerically
    /// beyond `accurate_derivs()`.
    fn evaluate(&self, uv: Point2, nd: usize, ctx: &GeomContext) -> SurfaceEval {
        evaluate_with_fallback(self, uv, nd, ctx)
    }

    // --- Inversion and projection ---------------------------------------

    /// Parameters of a point on (or near) the surface. Periodic parameters
    /// are placed nearest `guess` when one is given.
    fn param(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> Point2;

    /// Nearest point on the untrimmed surface.
    fn closest_point(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> FootPoint;

    fn closest_point_with_curvature(
        &self,
        pos: Point3,
        guess: Option<Point2>,
        ctx: &GeomContext,
    ) -> (FootPoint, PrincipalCurvature) {
        let foot = self.closest_point(pos, guess, ctx);
        let curvature = self.eval_curvature(foot.param, ctx);
        (foot, curvature)
    }

    /// Whether `pos` lies within `tol` of the surface.
    fn test_point_tol(&self, pos: Point3, tol: f64, ctx: &GeomContext) -> bool {
        self.closest_point(pos, None, ctx).distance <= tol
    }

    // --- Curvature ------------------------------------------------------

    fn eval_curvature(&self, uv: Point2, ctx: &GeomContext) -> PrincipalCurvature {
        let ev = self.evaluate(uv, 2, ctx);
        curvature_from_derivs(ev.pu(), ev.pv(), ev.puu(), ev.puv(), ev.pvv(), self.eval_normal(uv))
    }

    fn point_curvature(&self, pos: Point3, ctx: &GeomContext) -> PrincipalCurvature {
        self.eval_curvature(self.param(pos, None, ctx), ctx)
    }

    /// Normal curvature at `pos` in the tangent direction `dir`.
    fn point_cross(&self, pos: Point3, dir: Vector3, ctx: &GeomContext) -> f64 {
        self.point_curvature(pos, ctx).normal_curvature(dir)
    }

    /// Parameter-space direction whose image best matches the tangent `dir`.
    ///
    /// Solves the normal equations of `[Pu Pv] x = dir`; returns zero at
    /// singular parameters.
    fn param_unitvec(&self, dir: Vector3, uv: Point2) -> Vector2 {
        let ev = self.eval_derivs(uv, 1);
        let (pu, pv) = (ev.pu(), ev.pv());
        let gram = Matrix2::new(pu.dot(pu), pu.dot(pv), pu.dot(pv), pv.dot(pv));
        let rhs = NaVector2::new(pu.dot(dir), pv.dot(dir));
        match gram.try_inverse() {
            Some(inv) => {
                let x = inv * rhs;
                Vector2::new(x[0], x[1])
            }
            None => Vector2::ZERO,
        }
    }

    // --- Bounding -------------------------------------------------------

    /// Box containing the surface over `pbox` (the whole reported range when
    /// `None`), optionally after applying `t`.
    fn bound(&self, pbox: Option<&ParamBox>, t: Option<&Transform>, ctx: &GeomContext) -> Aabb3;

    /// Cone containing every normal over `pbox`. With `approx_ok` a cheaper
    /// estimate may be returned, flagged as approximate.
    fn normal_cone(&self, pbox: &ParamBox, approx_ok: bool, t: Option<&Transform>, ctx: &GeomContext) -> NormalCone;

    // --- Mutation -------------------------------------------------------

    /// Apply `t` so that each parameter maps to the transformed point.
    fn transform(&mut self, t: &Transform) -> Result<()>;

    /// Reverse the orientation. Positions are unchanged.
    fn negate(&mut self);
}

/// `value + k * period` lying within half a period of `reference`.
pub(crate) fn wrap_periodic(value: f64, period: f64, reference: f64) -> f64 {
    if period <= 0.0 || !value.is_finite() || !reference.is_finite() {
        return value;
    }
    value - ((value - reference) / period).round() * period
}

/// Wrap an angle into `[-PI, PI)` or near a guess.
pub(crate) fn wrap_angle(value: f64, guess: Option<f64>) -> f64 {
    wrap_periodic(value, 2.0 * PI, guess.unwrap_or(0.0))
}

fn effective_period(period: f64, subset: &Interval) -> f64 {
    if period <= 0.0 {
        return 0.0;
    }
    if subset.is_finite() && subset.length() < period - 1e-12 * period {
        return 0.0;
    }
    period
}

fn reported_range(natural: Interval, period: f64, subset: Interval, pbox: Option<Interval>) -> Interval {
    let mut range = if period > 0.0 && subset.is_finite() {
        subset
    } else {
        natural.intersect(&subset)
    };
    if let Some(b) = pbox {
        range = if period > 0.0 && b.is_finite() && range.length() >= period {
            b
        } else {
            range.intersect(&b)
        };
    }
    range
}

/// Intersect a trim box with a new limit. A bounded limit in a periodic
/// direction replaces an unbounded one rather than being cut to the natural
/// range.
fn trim_box(current: &ParamBox, limit: &ParamBox, period_u: f64, period_v: f64) -> ParamBox {
    let narrow = |cur: Interval, lim: Interval, period: f64| {
        if period > 0.0 && !cur.is_finite() && lim.is_finite() {
            lim
        } else {
            cur.intersect(&lim)
        }
    };
    ParamBox::new(narrow(current.u, limit.u, period_u), narrow(current.v, limit.v, period_v))
}

/// Bound or normal cone of a surface after a transform, computed on a
/// transformed copy.
pub(crate) fn transformed_copy<S: Surface + Clone>(surface: &S, t: &Transform) -> Option<S> {
    let mut copy = surface.clone();
    match copy.transform(t) {
        Ok(()) => Some(copy),
        Err(_) => None,
    }
}

/// Fallback normal cone when a transform cannot be applied exactly.
pub(crate) fn transformed_cone_fallback(cone: NormalCone, t: &Transform) -> NormalCone {
    let axis = normalize_or_zero(t.transform_normal(cone.axis));
    if cone.angle == 0.0 {
        NormalCone::exact(axis, 0.0)
    } else {
        NormalCone::exact(axis, PI)
    }
}
