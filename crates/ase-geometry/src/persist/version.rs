//! Format versions and the fields each one introduced.

use ase_core::{AseError, Result};

/// Version written by default.
pub const CURRENT_VERSION: u32 = 700;

/// Oldest version that can still be read or written.
pub const MIN_VERSION: u32 = 100;

/// Persisted fields that did not exist in every format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Plane `u_deriv` and `reverse_v`.
    PlaneParam,
    ConeUParamScale,
    ConeReverseU,
    /// Sphere `uv_oridir`, `pole_dir` and `reverse_v`.
    SphereParam,
    /// Torus `uv_oridir` and `reverse_v`.
    TorusParam,
    /// The subset-range footer shared by all surfaces.
    SubsetRange,
}

/// Version that introduced each gated field.
pub const FIELD_GATES: &[(Field, u32)] = &[
    (Field::PlaneParam, 200),
    (Field::ConeUParamScale, 200),
    (Field::ConeReverseU, 300),
    (Field::SphereParam, 200),
    (Field::TorusParam, 200),
    (Field::SubsetRange, 500),
];

impl Field {
    pub fn introduced_in(self) -> u32 {
        FIELD_GATES
            .iter()
            .find(|(f, _)| *f == self)
            .map_or(MIN_VERSION, |(_, v)| *v)
    }
}

/// Whether records of `version` carry `field`.
pub fn field_present(field: Field, version: u32) -> bool {
    version >= field.introduced_in()
}

pub fn check_version(version: u32) -> Result<()> {
    if version < MIN_VERSION {
        return Err(AseError::Version {
            found: version,
            minimum: MIN_VERSION,
        });
    }
    if version > CURRENT_VERSION {
        return Err(AseError::InvalidOperation(format!(
            "format version {version} is newer than {CURRENT_VERSION}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gates() {
        assert!(!field_present(Field::PlaneParam, 100));
        assert!(field_present(Field::PlaneParam, 200));
        assert!(field_present(Field::ConeUParamScale, 250));
        assert!(!field_present(Field::ConeReverseU, 250));
        assert!(!field_present(Field::SubsetRange, 499));
        assert!(field_present(Field::SubsetRange, CURRENT_VERSION));
    }

    #[test]
    fn test_every_field_has_a_gate() {
        for field in [
            Field::PlaneParam,
            Field::ConeUParamScale,
            Field::ConeReverseU,
            Field::SphereParam,
            Field::TorusParam,
            Field::SubsetRange,
        ] {
            assert!(FIELD_GATES.iter().any(|(f, _)| *f == field));
            assert!(field.introduced_in() > MIN_VERSION);
        }
    }

    #[test]
    fn test_version_window() {
        assert!(check_version(MIN_VERSION).is_ok());
        assert!(check_version(CURRENT_VERSION).is_ok());
        assert!(matches!(check_version(99), Err(AseError::Version { found: 99, minimum: 100 })));
        assert!(check_version(CURRENT_VERSION + 1).is_err());
    }
}
