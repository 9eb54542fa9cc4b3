use thiserror::Error;

#[derive(Debug, Error)]
pub enum AseError {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Transform error: {0}")]
    Transform(String),

    #[error("Restore error: {0}")]
    Restore(String),

    #[error("Unsupported format version {found} (minimum {minimum})")]
    Version { found: u32, minimum: u32 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, AseError>;
