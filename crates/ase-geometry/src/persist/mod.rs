//! Versioned save/restore of analytic surfaces.
//!
//! A record is the surface's type name, its own fields in a fixed order, the
//! subset-range footer and an end marker. Fields introduced after the
//! requested format version are left out when saving and replaced by
//! defaults when restoring; [`version::FIELD_GATES`] lists them.

mod reader;
mod token;
mod version;
mod writer;

pub use reader::RestoreReader;
pub use token::{render, tokenize, Token};
pub use version::{check_version, field_present, Field, CURRENT_VERSION, FIELD_GATES, MIN_VERSION};
pub use writer::SaveWriter;

use ase_core::{AseError, Result};
use ase_math::{ParamBox, DVec3};
use tracing::{debug, instrument};

use crate::curve::Ellipse;
use crate::surface::{AnalyticSurface, Cone, Plane, Sphere, Surface, SurfaceKind, Torus};

const V_FLAG: (&str, &str) = ("forward_v", "reversed_v");
const U_FLAG: (&str, &str) = ("forward_u", "reversed_u");
const ELLIPSE_TYPE: &str = "ellipse-curve";

/// Field-level persistence of one surface type, excluding the type name and
/// the shared footer.
pub trait Persist: Sized {
    fn save_fields(&self, w: &mut SaveWriter);

    fn restore_fields(r: &mut RestoreReader) -> Result<Self>;
}

impl Persist for Plane {
    fn save_fields(&self, w: &mut SaveWriter) {
        w.point(self.root_point);
        w.vector(self.normal);
        if w.has(Field::PlaneParam) {
            w.vector(self.u_deriv);
            w.logical(self.reverse_v, V_FLAG);
        }
    }

    fn restore_fields(r: &mut RestoreReader) -> Result<Self> {
        let root_point = r.point()?;
        let normal = r.vector()?;
        let (u_deriv, reverse_v) = if r.has(Field::PlaneParam) {
            (r.vector()?, r.logical(V_FLAG)?)
        } else {
            (DVec3::ZERO, false)
        };
        Ok(Plane {
            root_point,
            normal,
            u_deriv,
            reverse_v,
            subset: ParamBox::infinite(),
        })
    }
}

impl Persist for Ellipse {
    fn save_fields(&self, w: &mut SaveWriter) {
        w.ident(ELLIPSE_TYPE);
        w.point(self.center);
        w.vector(self.normal);
        w.vector(self.major_axis);
        w.real(self.radius_ratio);
    }

    fn restore_fields(r: &mut RestoreReader) -> Result<Self> {
        r.expect_ident(ELLIPSE_TYPE)?;
        Ok(Ellipse {
            center: r.point()?,
            normal: r.vector()?,
            major_axis: r.vector()?,
            radius_ratio: r.real()?,
        })
    }
}

impl Persist for Cone {
    fn save_fields(&self, w: &mut SaveWriter) {
        self.base.save_fields(w);
        w.real(self.sine_angle);
        w.real(self.cosine_angle);
        if w.has(Field::ConeUParamScale) {
            w.real(self.u_param_scale);
        }
        if w.has(Field::ConeReverseU) {
            w.logical(self.reverse_u, U_FLAG);
        }
    }

    fn restore_fields(r: &mut RestoreReader) -> Result<Self> {
        let base = Ellipse::restore_fields(r)?;
        let sine_angle = r.real()?;
        let cosine_angle = r.real()?;
        let u_param_scale = if r.has(Field::ConeUParamScale) {
            r.real()?
        } else {
            base.major_radius()
        };
        let reverse_u = if r.has(Field::ConeReverseU) {
            r.logical(U_FLAG)?
        } else {
            false
        };
        Ok(Cone {
            base,
            sine_angle,
            cosine_angle,
            reverse_u,
            u_param_scale,
            subset: ParamBox::infinite(),
        })
    }
}

impl Persist for Sphere {
    fn save_fields(&self, w: &mut SaveWriter) {
        w.point(self.centre);
        w.real(self.radius);
        if w.has(Field::SphereParam) {
            w.vector(self.uv_oridir);
            w.vector(self.pole_dir);
            w.logical(self.reverse_v, V_FLAG);
        }
    }

    fn restore_fields(r: &mut RestoreReader) -> Result<Self> {
        let centre = r.point()?;
        let radius = r.real()?;
        if !r.has(Field::SphereParam) {
            return Ok(Sphere::new(centre, radius));
        }
        Ok(Sphere {
            centre,
            radius,
            uv_oridir: r.vector()?,
            pole_dir: r.vector()?,
            reverse_v: r.logical(V_FLAG)?,
            subset: ParamBox::infinite(),
        })
    }
}

impl Persist for Torus {
    fn save_fields(&self, w: &mut SaveWriter) {
        w.point(self.centre);
        w.vector(self.normal);
        w.real(self.major_radius);
        w.real(self.minor_radius);
        if w.has(Field::TorusParam) {
            w.vector(self.uv_oridir);
            w.logical(self.reverse_v, V_FLAG);
        }
    }

    fn restore_fields(r: &mut RestoreReader) -> Result<Self> {
        let centre = r.point()?;
        let normal = r.vector()?;
        let major_radius = r.real()?;
        let minor_radius = r.real()?;
        if !r.has(Field::TorusParam) {
            return Ok(Torus::new(centre, normal, major_radius, minor_radius));
        }
        Ok(Torus {
            centre,
            normal,
            major_radius,
            minor_radius,
            uv_oridir: r.vector()?,
            reverse_v: r.logical(V_FLAG)?,
            subset: ParamBox::infinite(),
        })
    }
}

/// Tokens of one surface record in the given format version.
pub fn save_tokens(surface: &AnalyticSurface, version: u32) -> Result<Vec<Token>> {
    let mut w = SaveWriter::new(version)?;
    w.ident(surface.type_name());
    match surface {
        AnalyticSurface::Plane(s) => s.save_fields(&mut w),
        AnalyticSurface::Cone(s) => s.save_fields(&mut w),
        AnalyticSurface::Sphere(s) => s.save_fields(&mut w),
        AnalyticSurface::Torus(s) => s.save_fields(&mut w),
    }
    if w.has(Field::SubsetRange) {
        let subset = surface.subset_range();
        w.interval(&subset.u);
        w.interval(&subset.v);
    }
    Ok(w.finish())
}

/// Read one surface record from a reader positioned at its type name.
pub fn restore_record(r: &mut RestoreReader) -> Result<AnalyticSurface> {
    let name = r.ident()?;
    let kind = SurfaceKind::from_type_name(&name)
        .ok_or_else(|| AseError::Restore(format!("Unknown surface type '{name}'")))?;
    let mut surface: AnalyticSurface = match kind {
        SurfaceKind::Plane => Plane::restore_fields(r)?.into(),
        SurfaceKind::Cone => Cone::restore_fields(r)?.into(),
        SurfaceKind::Sphere => Sphere::restore_fields(r)?.into(),
        SurfaceKind::Torus => Torus::restore_fields(r)?.into(),
    };
    if r.has(Field::SubsetRange) {
        let u = r.interval()?;
        let v = r.interval()?;
        *surface.subset_range_mut() = ParamBox::new(u, v);
    }
    r.finish()?;
    Ok(surface)
}

pub fn restore_tokens(tokens: Vec<Token>, version: u32) -> Result<AnalyticSurface> {
    let mut r = RestoreReader::new(tokens, version)?;
    let surface = restore_record(&mut r)?;
    if !r.at_end() {
        return Err(AseError::Restore("Trailing tokens after surface record".into()));
    }
    Ok(surface)
}

/// Text form of a surface in the given format version.
#[instrument(level = "debug", skip(surface), fields(kind = %surface.kind()))]
pub fn save_text(surface: &AnalyticSurface, version: u32) -> Result<String> {
    let tokens = save_tokens(surface, version)?;
    debug!(tokens = tokens.len(), "saved surface record");
    Ok(render(&tokens))
}

#[instrument(level = "debug", skip(text))]
pub fn restore_text(text: &str, version: u32) -> Result<AnalyticSurface> {
    let surface = restore_tokens(tokenize(text)?, version)?;
    debug!(kind = %surface.kind(), "restored surface record");
    Ok(surface)
}

/// Binary form: the token stream encoded with bincode.
#[instrument(level = "debug", skip(surface), fields(kind = %surface.kind()))]
pub fn save_binary(surface: &AnalyticSurface, version: u32) -> Result<Vec<u8>> {
    let tokens = save_tokens(surface, version)?;
    bincode::serialize(&tokens).map_err(|e| AseError::InvalidOperation(format!("Binary encoding failed: {e}")))
}

#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
pub fn restore_binary(bytes: &[u8], version: u32) -> Result<AnalyticSurface> {
    let tokens: Vec<Token> =
        bincode::deserialize(bytes).map_err(|e| AseError::Restore(format!("Invalid binary record: {e}")))?;
    restore_tokens(tokens, version)
}
