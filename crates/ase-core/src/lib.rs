pub mod context;
pub mod error;
pub mod tolerance;
pub mod traits;

pub use context::GeomContext;
pub use error::{AseError, Result};
pub use tolerance::Tolerance;
pub use traits::Validate;
