//! Parallel read-only queries over one shared surface.

use ase_core::{AseError, GeomContext, Result};
use ase_math::{ParamBox, Point2, Point3};
use rayon::prelude::*;

use crate::surface::{FootPoint, Surface, SurfaceEval};

/// Closest points of many query positions, in input order.
pub fn closest_points<S: Surface + ?Sized>(surface: &S, points: &[Point3], ctx: &GeomContext) -> Vec<FootPoint> {
    points
        .par_iter()
        .map(|&p| surface.closest_point(p, None, ctx))
        .collect()
}

/// Evaluate `nu x nv` samples spanning `pbox`, row by row in v, with first
/// derivatives.
///
/// The box must be bounded and both counts at least 2.
pub fn evaluate_grid<S: Surface + ?Sized>(
    surface: &S,
    pbox: &ParamBox,
    nu: usize,
    nv: usize,
    ctx: &GeomContext,
) -> Result<Vec<SurfaceEval>> {
    if !pbox.is_finite() || pbox.is_empty() {
        return Err(AseError::InvalidOperation("sample grid needs a bounded parameter box".into()));
    }
    if nu < 2 || nv < 2 {
        return Err(AseError::InvalidOperation(format!(
            "sample grid needs at least 2x2 samples, got {nu}x{nv}"
        )));
    }

    let du = pbox.u.length() / (nu - 1) as f64;
    let dv = pbox.v.length() / (nv - 1) as f64;
    let grid: Vec<SurfaceEval> = (0..nu * nv)
        .into_par_iter()
        .map(|idx| {
            let (j, i) = (idx / nu, idx % nu);
            let uv = Point2::new(pbox.u.lo + i as f64 * du, pbox.v.lo + j as f64 * dv);
            surface.evaluate(uv, 1, ctx)
        })
        .collect();

    Ok(grid)
}
