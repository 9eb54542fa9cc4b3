//! Planar surface.

use std::fmt;

use ase_core::{AseError, GeomContext, Result, Tolerance, Validate};
use ase_math::{any_perpendicular, normalize_or_zero, Aabb3, Interval, ParamBox, Point2, Point3, Transform, Vector3, DVec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{transformed_copy, FootPoint, FootQuality, NormalCone, PrincipalCurvature, Surface, SurfaceEval, SurfaceKind};

/// An unbounded plane parameterized by `root_point + u * u_deriv + v * v_deriv`.
///
/// `v_deriv = normal x u_deriv`, negated when `reverse_v` is set. A zero
/// `u_deriv` means "any direction"; a deterministic perpendicular of the
/// normal is substituted wherever one is needed. The substitute does not
/// depend on the sign of the normal, so negation keeps every position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plane {
    pub root_point: Point3,
    /// Unit normal; zero when undefined.
    pub normal: Vector3,
    pub u_deriv: Vector3,
    pub reverse_v: bool,
    pub subset: ParamBox,
}

impl Plane {
    pub fn new(root_point: Point3, normal: Vector3) -> Self {
        Self::with_u_deriv(root_point, normal, DVec3::ZERO, false)
    }

    /// The caller is responsible for `u_deriv` being perpendicular to `normal`.
    pub fn with_u_deriv(root_point: Point3, normal: Vector3, u_deriv: Vector3, reverse_v: bool) -> Self {
        Self {
            root_point,
            normal: normalize_or_zero(normal),
            u_deriv,
            reverse_v,
            subset: ParamBox::infinite(),
        }
    }

    /// XY plane through the origin.
    pub fn xy() -> Self {
        Self::with_u_deriv(DVec3::ZERO, DVec3::Z, DVec3::X, false)
    }

    /// The u derivative actually used for evaluation.
    pub fn u_dir(&self) -> Vector3 {
        if self.u_deriv.length_squared() == 0.0 {
            let leading = [self.normal.x, self.normal.y, self.normal.z].into_iter().find(|c| *c != 0.0);
            let n = if leading.is_some_and(|c| c < 0.0) { -self.normal } else { self.normal };
            any_perpendicular(n)
        } else {
            self.u_deriv
        }
    }

    pub fn v_deriv(&self) -> Vector3 {
        let v = self.normal.cross(self.u_dir());
        if self.reverse_v {
            -v
        } else {
            v
        }
    }

    /// Signed distance of `p` along the normal.
    pub fn signed_distance(&self, p: Point3) -> f64 {
        (p - self.root_point).dot(self.normal)
    }

    /// Replace a synthesized u derivative by an explicit one so that later
    /// changes to the normal cannot move the parameterization.
    fn materialize_u_deriv(&mut self) {
        self.u_deriv = self.u_dir();
    }

    pub fn approx_eq(&self, other: &Self, tol: &Tolerance) -> bool {
        (self.root_point - other.root_point).length() < tol.linear
            && (self.normal - other.normal).length() < tol.linear
            && (self.u_dir() - other.u_dir()).length() < tol.linear
            && self.reverse_v == other.reverse_v
            && self.subset.approx_eq(&other.subset, tol.linear)
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::xy()
    }
}

impl Validate for Plane {
    fn validate(&self) -> Result<()> {
        if !self.is_defined() {
            return Err(AseError::Geometry("plane normal is zero".into()));
        }
        Ok(())
    }
}

impl Surface for Plane {
    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Plane
    }

    fn is_defined(&self) -> bool {
        self.normal != DVec3::ZERO
    }

    fn subset_range(&self) -> &ParamBox {
        &self.subset
    }

    fn subset_range_mut(&mut self) -> &mut ParamBox {
        &mut self.subset
    }

    fn natural_range_u(&self, _ctx: &GeomContext) -> Interval {
        Interval::infinite()
    }

    fn natural_range_v(&self, _ctx: &GeomContext) -> Interval {
        Interval::infinite()
    }

    fn left_handed_uv(&self) -> bool {
        self.reverse_v
    }

    fn eval_position(&self, uv: Point2) -> Point3 {
        self.root_point + uv.x * self.u_dir() + uv.y * self.v_deriv()
    }

    fn eval_normal(&self, _uv: Point2) -> Vector3 {
        self.normal
    }

    fn accurate_derivs(&self) -> usize {
        usize::MAX
    }

    fn eval_derivs(&self, uv: Point2, nd: usize) -> SurfaceEval {
        let mut ev = SurfaceEval::new(self.eval_position(uv));
        if nd >= 1 {
            ev.derivs.push(vec![self.u_dir(), self.v_deriv()]);
        }
        for order in 2..=nd {
            ev.derivs.push(vec![DVec3::ZERO; order + 1]);
        }
        ev
    }

    fn param(&self, pos: Point3, _guess: Option<Point2>, _ctx: &GeomContext) -> Point2 {
        let d = pos - self.root_point;
        let u_dir = self.u_dir();
        let v_dir = self.v_deriv();
        let u = d.dot(u_dir) / u_dir.length_squared().max(f64::MIN_POSITIVE);
        let v = d.dot(v_dir) / v_dir.length_squared().max(f64::MIN_POSITIVE);
        Point2::new(u, v)
    }

    fn closest_point(&self, pos: Point3, guess: Option<Point2>, ctx: &GeomContext) -> FootPoint {
        if !self.is_defined() {
            warn!("closest point requested on an undefined plane");
        }
        let foot = pos - self.normal * self.signed_distance(pos);
        let param = self.param(foot, guess, ctx);
        FootPoint::new(pos, foot, param, self.normal, FootQuality::Exact)
    }

    fn eval_curvature(&self, _uv: Point2, _ctx: &GeomContext) -> PrincipalCurvature {
        PrincipalCurvature::isotropic(self.normal, self.u_dir(), 0.0)
    }

    fn bound(&self, pbox: Option<&ParamBox>, t: Option<&Transform>, ctx: &GeomContext) -> Aabb3 {
        if let Some(t) = t {
            return match transformed_copy(self, t) {
                Some(copy) => copy.bound(pbox, None, ctx),
                None => self.bound(pbox, None, ctx).transformed(t),
            };
        }
        let range = self.param_range(pbox, ctx);
        if let Some(corners) = range.corners() {
            return Aabb3::from_points(corners.map(|uv| self.eval_position(uv)));
        }
        // An axis-aligned plane is flat in one coordinate.
        let mut b = Aabb3::infinite();
        let n = self.normal.abs();
        for k in 0..3 {
            if n[k] == 1.0 {
                b.min[k] = self.root_point[k];
                b.max[k] = self.root_point[k];
            }
        }
        b
    }

    fn normal_cone(&self, _pbox: &ParamBox, _approx_ok: bool, t: Option<&Transform>, _ctx: &GeomContext) -> NormalCone {
        let axis = match t {
            Some(t) => t.transform_normal(self.normal),
            None => self.normal,
        };
        NormalCone::exact(axis, 0.0)
    }

    fn transform(&mut self, t: &Transform) -> Result<()> {
        if t.is_singular() {
            return Err(AseError::Transform("singular transform applied to plane".into()));
        }
        self.materialize_u_deriv();
        self.root_point = t.transform_point(self.root_point);
        self.u_deriv = t.transform_vector(self.u_deriv);
        self.normal = t.transform_normal(self.normal);
        if t.reflects() {
            self.reverse_v = !self.reverse_v;
        }
        Ok(())
    }

    /// Flips the normal. `reverse_v` flips with it so that every parameter
    /// keeps its position; `u_deriv` is left as stored.
    fn negate(&mut self) {
        self.normal = -self.normal;
        self.reverse_v = !self.reverse_v;
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "plane root {} normal {} u_deriv {} {}",
            self.root_point,
            self.normal,
            self.u_deriv,
            if self.reverse_v { "reversed_v" } else { "forward_v" }
        )
    }
}
