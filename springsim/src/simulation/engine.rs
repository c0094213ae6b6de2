//! High-level runtime engine settings
//!
//! Selects the dimension and the integrator used when building and running
//! a `Scenario`

use super::integrator::IntegratorKind;

#[derive(Debug, Clone)]
pub struct Engine {
    pub dimension: usize, // 1, 2 or 3
    pub integrator: IntegratorKind, // euler or leapfrog
}

impl Engine {
    /// Bending forces only exist for 3-D scenarios.
    pub fn bends(&self) -> bool {
        self.dimension == 3
    }
}
