pub mod aabb;
pub mod interval;
pub mod param;
pub mod transform;
pub mod vector;

pub use glam::{DAffine3, DMat3, DMat4, DVec2, DVec3};
pub use aabb::Aabb3;
pub use interval::Interval;
pub use param::ParamBox;
pub use transform::Transform;
pub use vector::{any_perpendicular, normalize_or_zero};

pub type Point2 = DVec2;
pub type Point3 = DVec3;
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
