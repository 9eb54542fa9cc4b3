//! ASE geometry: analytic surfaces, their supporting curves, parallel queries
//! and versioned persistence.

pub mod batch;
pub mod curve;
pub mod persist;
pub mod surface;

pub use curve::{Curve, Ellipse};
pub use surface::{
    AnalyticSurface, Cone, FootPoint, FootQuality, NormalCone, Plane, PrincipalCurvature, Sphere, Surface,
    SurfaceEval, SurfaceKind, Torus, TorusShape,
};
