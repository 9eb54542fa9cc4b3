//! Closed sum type over the four analytic surfaces.

use std::fmt;

use ase_core::{GeomContext, Result, Tolerance, Validate};
use ase_math::{Aabb3, Interval, ParamBox, Point2, Point3, Transform, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use super::{Cone, FootPoint, NormalCone, Plane, PrincipalCurvature, Sphere, Surface, SurfaceEval, SurfaceKind, Torus};

/// Any analytic surface, owned by value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnalyticSurface {
    Plane(Plane),
    Cone(Cone),
    Sphere(Sphere),
    Torus(Torus),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            AnalyticSurface::Plane($s) => $body,
            AnalyticSurface::Cone($s) => $body,
            AnalyticSurface::Sphere($s) => $body,
            AnalyticSurface::Torus($s) => $body,
        }
    };
}

impl AnalyticSurface {
    pub fn as_surface(&self) -> &dyn Surface {
        dispatch!(self, s => s)
    }

    pub fn as_surface_mut(&mut self) -> &mut dyn Surface {
        dispatch!(self, s => s)
    }

    /// Equal within tolerance, trim boxes included; surfaces of different
    /// types are never equal.
    pub fn approx_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        match (self, other) {
            (AnalyticSurface::Plane(a), AnalyticSurface::Plane(b)) => a.approx_eq(b, tol),
            (AnalyticSurface::Cone(a), AnalyticSurface::Cone(b)) => a.approx_eq(b, tol),
            (AnalyticSurface::Sphere(a), AnalyticSurface::Sphere(b)) => a.approx_eq(b, tol),
            (AnalyticSurface::Torus(a), AnalyticSurface::Torus(b)) => a.approx_eq(b, tol),
            _ => false,
        }
    }
}

impl From<Plane> for AnalyticSurface {
    fn from(s: Plane) -> Self {
        AnalyticSurface::Plane(s)
    }
}

impl From<Cone> for AnalyticSurface {
    fn from(s: Cone) -> Self {
        AnalyticSurface::Cone(s)
    }
}

impl From<Sphere> for AnalyticSurface {
    fn from(s: Sphere) -> Self {
        AnalyticSurface::Sphere(s)
    }
}

impl From<Torus> for AnalyticSurface {
    fn from(s: Torus) -> Self {
        AnalyticSurface::Torus(s)
    }
}

impl Validate for AnalyticSurface {
    fn validate(&self) -> Result<()> {
        dispatch!(self, s => s.validate())
    }
}

impl fmt::Display for AnalyticSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, s => fmt::Display::fmt(s, f))
    }
}

impl Surface for AnalyticSurface {
    fn kind(&self) -> SurfaceKind {
        dispatch!(self, s => s.kind())
    }

    fn is_defined(&self) -> bool {
        dispatch!(self, s => s.is_defined())
    }

    fn subset_range(&self) -> &ParamBox {
        dispatch!(self, s => s.subset_range())
    }

    fn subset_range_mut(&mut self) -> &mut ParamBox {
        dispatch!(self, s => s.subset_range_mut())
    }

    fn limit(&mut self, range: &ParamBox, ctx: &GeomContext) {
        dispatch!(self, s => s.limit(range, ctx))
    }

    fn natural_range_u(&self, ctx: &GeomContext) -> Interval {
        dispatch!(self, s => s.natural_range_u(ctx))
    }

    fn natural_range_v(&self, ctx: &GeomContext) -> Interval {
        dispatch!(self, s => s.natural_range_v(ctx))
    }

    fn natural_period_u(&self, ctx: &GeomContext) -> f64 {
        dispatch!(self, s => s.natural_period_u(ctx))
    }

    fn natural_period_v(&self, ctx: &GeomContext) -> f64 {
        dispatch!(self, s => s.natural_period_v(ctx))
    }

    fn singular_u(&self, u: f64, ctx: &GeomContext) -> bool {
        dispatch!(self, s => s.singular_u(u, ctx))
    }

    fn singular_v(&self, v: f64, ctx: &GeomContext) -> bool {
        dispatch!(self, s => s.singular_v(v, ctx))
    }

    fn left_handed_uv(&self) -> bool {
        dispatch!(self, s => s.left_handed_uv())
    }

    fn eval_position(&self, uv: Point2) -> Point3 {
        dispatch!(self, s => s.eval_position(uv))
    }

    fn eval_normal(&self, uv: Point2) -> Vector3 {
        dispatch!(self, s => s.eval_normal(uv))
    }

    fn eval_outdir(&self, uv: Point2, ctx: &GeomContext) -> Vector3 {
        dispatch!(self, s => s.eval_outdir(uv, ctx))
    }

    fn accurate_derivs(&self) -> usize {
        dispatch!(self, s => s.accurate_derivs())
    }

    fn eval_derivs(&self, uv: Point2, nd: usize) -> SurfaceEval {
        dispatch!(self, s => s.eval_derivs(uv, nd))
    }

    fn param(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> Point2 {
        dispatch!(self, s => s.param(pos, guess, ctx))
    }

    fn closest_point(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> FootPoint {
        dispatch!(self, s => s.closest_point(pos, guess, ctx))
    }

    fn eval_curvature(&self, uv: Point2, ctx: &GeomContext) -> PrincipalCurvature {
        dispatch!(self, s => s.eval_curvature(uv, ctx))
    }

    fn param_unitvec(&self, dir: Vector3, uv: Point2) -> Vector2 {
        dispatch!(self, s => s.param_unitvec(dir, uv))
    }

    fn bound(&self, pbox: Option<&ParamBox>, t: Option<&Transform>, ctx: &GeomContext) -> Aabb3 {
        dispatch!(self, s => s.bound(pbox, t, ctx))
    }

    fn normal_cone(&self, pbox: &ParamBox, approx_ok: bool, t: Option<&Transform>, ctx: &GeomContext) -> NormalCone {
        dispatch!(self, s => s.normal_cone(pbox, approx_ok, t, ctx))
    }

    fn transform(&mut self, t: &Transform) -> Result<()> {
        dispatch!(self, s => s.transform(t))
    }

    fn negate(&mut self) {
        dispatch!(self, s => s.negate())
    }
}
