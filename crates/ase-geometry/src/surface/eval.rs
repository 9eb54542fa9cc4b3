//! Surface evaluation results and the shared finite-difference fallback.
//!
//! Each surface computes derivatives by formula up to its
//! `accurate_derivs()`; anything beyond is obtained here by central
//! differencing the next-lower order at neighbouring parameters. Every
//! extra order costs one more level of differencing, so accuracy degrades
//! with the order requested.

use ase_core::GeomContext;
use ase_math::{DVec2, Point2, Point3, Vector3};

use super::Surface;

/// Position and partial derivatives at one parameter.
///
/// `derivs[k]` holds the derivatives of order `k + 1`, ordered by
/// increasing v-degree: `derivs[0] = [Pu, Pv]`,
/// `derivs[1] = [Puu, Puv, Pvv]`, `derivs[2] = [Puuu, Puuv, Puvv, Pvvv]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceEval {
    pub position: Point3,
    pub derivs: Vec<Vec<Vector3>>,
}

impl SurfaceEval {
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            derivs: Vec::new(),
        }
    }

    /// Number of derivative orders present.
    pub fn order(&self) -> usize {
        self.derivs.len()
    }

    pub fn pu(&self) -> Vector3 {
        self.derivs[0][0]
    }

    pub fn pv(&self) -> Vector3 {
        self.derivs[0][1]
    }

    pub fn puu(&self) -> Vector3 {
        self.derivs[1][0]
    }

    pub fn puv(&self) -> Vector3 {
        self.derivs[1][1]
    }

    pub fn pvv(&self) -> Vector3 {
        self.derivs[1][2]
    }

    /// Values of a given order, with order 0 being the position itself.
    fn row(&self, order: usize) -> Vec<Vector3> {
        if order == 0 {
            vec![self.position]
        } else {
            self.derivs[order - 1].clone()
        }
    }
}

/// Evaluate `nd` derivative orders, falling back to central differences
/// above the surface's `accurate_derivs()`.
pub fn evaluate_with_fallback<S: Surface + ?Sized>(
    surface: &S,
    uv: Point2,
    nd: usize,
    ctx: &GeomContext,
) -> SurfaceEval {
    let exact = nd.min(surface.accurate_derivs());
    let mut ev = surface.eval_derivs(uv, exact);
    ev.derivs.truncate(exact);
    if nd == exact {
        return ev;
    }

    let h = ctx.fd_step;
    let du = DVec2::new(h, 0.0);
    let dv = DVec2::new(0.0, h);
    for order in (exact + 1)..=nd {
        let lower = order - 1;
        let u_plus = evaluate_with_fallback(surface, uv + du, lower, ctx).row(lower);
        let u_minus = evaluate_with_fallback(surface, uv - du, lower, ctx).row(lower);
        let v_plus = evaluate_with_fallback(surface, uv + dv, lower, ctx).row(lower);
        let v_minus = evaluate_with_fallback(surface, uv - dv, lower, ctx).row(lower);

        let mut row = Vec::with_capacity(order + 1);
        for j in 0..order {
            row.push((u_plus[j] - u_minus[j]) / (2.0 * h));
        }
        row.push((v_plus[lower] - v_minus[lower]) / (2.0 * h));
        ev.derivs.push(row);
    }
    ev
}
