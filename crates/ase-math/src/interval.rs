//! One-dimensional parameter intervals.
//!
//! An interval may be unbounded at either end; the untrimmed parameter range
//! of a surface is `Interval::infinite()`. Arithmetic is conservative: the
//! result always contains every value the operands can combine to.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A closed interval `[lo, hi]`, either end possibly infinite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub lo: f64,
    pub hi: f64,
}

impl Interval {
    /// The entire real line.
    pub const EVERYTHING: Self = Self {
        lo: f64::NEG_INFINITY,
        hi: f64::INFINITY,
    };

    /// Create an interval from two ends given in any order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    pub fn infinite() -> Self {
        Self::EVERYTHING
    }

    pub fn point(v: f64) -> Self {
        Self { lo: v, hi: v }
    }

    /// `[v, +inf)`
    pub fn above(v: f64) -> Self {
        Self {
            lo: v,
            hi: f64::INFINITY,
        }
    }

    /// `(-inf, v]`
    pub fn below(v: f64) -> Self {
        Self {
            lo: f64::NEG_INFINITY,
            hi: v,
        }
    }

    pub fn is_bounded_below(&self) -> bool {
        self.lo.is_finite()
    }

    pub fn is_bounded_above(&self) -> bool {
        self.hi.is_finite()
    }

    pub fn is_finite(&self) -> bool {
        self.is_bounded_below() && self.is_bounded_above()
    }

    pub fn is_infinite(&self) -> bool {
        !self.is_bounded_below() && !self.is_bounded_above()
    }

    pub fn is_empty(&self) -> bool {
        self.lo > self.hi
    }

    pub fn length(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.hi - self.lo
        }
    }

    /// Midpoint; for half-open intervals the finite end, and 0 for the whole line.
    pub fn mid(&self) -> f64 {
        match (self.is_bounded_below(), self.is_bounded_above()) {
            (true, true) => 0.5 * (self.lo + self.hi),
            (true, false) => self.lo,
            (false, true) => self.hi,
            (false, false) => 0.0,
        }
    }

    pub fn contains(&self, x: f64, tol: f64) -> bool {
        x >= self.lo - tol && x <= self.hi + tol
    }

    /// Ends agree within `tol`; infinite ends must match exactly.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        let close = |a: f64, b: f64| a == b || (a - b).abs() <= tol;
        close(self.lo, other.lo) && close(self.hi, other.hi)
    }

    /// Intersection; may be empty (`lo > hi`).
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            lo: self.lo.max(other.lo),
            hi: self.hi.min(other.hi),
        }
    }

    /// Smallest interval containing both.
    pub fn hull(&self, other: &Self) -> Self {
        Self {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }

    pub fn expand(&self, amount: f64) -> Self {
        Self {
            lo: self.lo - amount,
            hi: self.hi + amount,
        }
    }

    /// Clamp a value into the interval.
    pub fn clamp_value(&self, x: f64) -> f64 {
        x.max(self.lo).min(self.hi)
    }

    /// Conservative range of `sin` over the interval.
    pub fn sin(&self) -> Self {
        if !self.is_finite() || self.length() >= TAU {
            return Self::new(-1.0, 1.0);
        }
        let (a, b) = (self.lo.sin(), self.hi.sin());
        let mut lo = a.min(b);
        let mut hi = a.max(b);
        if contains_phase(self, FRAC_PI_2) {
            hi = 1.0;
        }
        if contains_phase(self, -FRAC_PI_2) {
            lo = -1.0;
        }
        Self { lo, hi }
    }

    /// Conservative range of `cos` over the interval.
    pub fn cos(&self) -> Self {
        if !self.is_finite() || self.length() >= TAU {
            return Self::new(-1.0, 1.0);
        }
        let (a, b) = (self.lo.cos(), self.hi.cos());
        let mut lo = a.min(b);
        let mut hi = a.max(b);
        if contains_phase(self, 0.0) {
            hi = 1.0;
        }
        if contains_phase(self, PI) {
            lo = -1.0;
        }
        Self { lo, hi }
    }
}

/// Whether `phase + 2k*PI` lies in the interval for some integer `k`.
fn contains_phase(iv: &Interval, phase: f64) -> bool {
    let k = ((iv.lo - phase) / TAU).ceil();
    phase + k * TAU <= iv.hi
}

impl Default for Interval {
    fn default() -> Self {
        Self::EVERYTHING
    }
}

impl Add for Interval {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            lo: self.lo + rhs.lo,
            hi: self.hi + rhs.hi,
        }
    }
}

impl Add<f64> for Interval {
    type Output = Self;
    fn add(self, rhs: f64) -> Self {
        Self {
            lo: self.lo + rhs,
            hi: self.hi + rhs,
        }
    }
}

impl Sub for Interval {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            lo: self.lo - rhs.hi,
            hi: self.hi - rhs.lo,
        }
    }
}

impl Mul for Interval {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let products = [
            self.lo * rhs.lo,
            self.lo * rhs.hi,
            self.hi * rhs.lo,
            self.hi * rhs.hi,
        ];
        if products.iter().any(|p| p.is_nan()) {
            return Self::EVERYTHING;
        }
        Self {
            lo: products.iter().copied().fold(f64::INFINITY, f64::min),
            hi: products.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

impl Mul<f64> for Interval {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        if rhs == 0.0 {
            return Self::point(0.0);
        }
        Self::new(self.lo * rhs, self.hi * rhs)
    }
}

impl Neg for Interval {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            lo: -self.hi,
            hi: -self.lo,
        }
    }
}
