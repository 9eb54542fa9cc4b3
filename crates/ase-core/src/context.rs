//! Explicit evaluation context threaded through surface queries.
//!
//! Holds the tolerance and the knobs of the numerical fallbacks (finite
//! differencing and iterative closest-point solving). A context is a plain
//! `Copy` value: it never changes while a query runs.

use crate::tolerance::Tolerance;

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeomContext {
    /// Distance and angle tolerances.
    pub tolerance: Tolerance,
    /// Parameter step used by central finite differencing.
    pub fd_step: f64,
    /// Hard cap on iterations of any iterative solver.
    pub max_iterations: u32,
    /// Parameter-space step below which an iterative solver is converged.
    pub solver_tolerance: f64,
}

impl GeomContext {
    pub const DEFAULT_FD_STEP: f64 = 1e-4;
    pub const DEFAULT_MAX_ITERATIONS: u32 = 64;
    pub const DEFAULT_SOLVER_TOLERANCE: f64 = 1e-12;

    pub fn new(tolerance: Tolerance) -> Self {
        Self {
            tolerance,
            fd_step: Self::DEFAULT_FD_STEP,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
            solver_tolerance: Self::DEFAULT_SOLVER_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_fd_step(mut self, step: f64) -> Self {
        self.fd_step = step;
        self
    }

    pub fn with_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_solver_tolerance(mut self, tolerance: f64) -> Self {
        self.solver_tolerance = tolerance;
        self
    }
}

impl Default for GeomContext {
    fn default() -> Self {
        Self::new(Tolerance::default())
    }
}
