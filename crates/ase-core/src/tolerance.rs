use serde::{Deserialize, Serialize};

/// Distance and angle tolerances for every classification and equality test
/// on surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Model units.
    pub linear: f64,
    /// Radians, also applied to sines and cosines of angles.
    pub angular: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;
    pub const DEFAULT_ANGULAR: f64 = 1e-10;

    pub fn new(linear: f64, angular: f64) -> Self {
        Self { linear, angular }
    }

    pub fn loose() -> Self {
        Self::new(1e-4, 1e-6)
    }

    pub fn tight() -> Self {
        Self::new(1e-10, 1e-12)
    }

    pub fn is_negligible_length(self, v: f64) -> bool {
        v.abs() < self.linear
    }

    /// Whether an angle, or the sine of a small angle, is zero.
    pub fn is_negligible_angle(self, v: f64) -> bool {
        v.abs() < self.angular
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LINEAR, Self::DEFAULT_ANGULAR)
    }
}
