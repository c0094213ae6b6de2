//! Explicit time integrators for mass points.
//!
//! A [`Solver`] maps the current position, velocity and acceleration of one
//! mass point to its next position and velocity using a stored time step.
//! Two solvers are provided, explicit Euler and the semi-implicit leapfrog
//! variant; [`Integrator`] picks one at run time (e.g. from a scenario file).

use serde::Deserialize;

use super::states::NVec;

pub const DEFAULT_TIME_STEP: f64 = 0.1;

/// Numerical integration strategy, pure in its inputs and time step.
pub trait Solver {
    fn time_step(&self) -> f64;

    /// Returns `(next_position, next_velocity)`.
    fn solve<const D: usize>(&self, position: &NVec<D>, velocity: &NVec<D>, acceleration: &NVec<D>) -> (NVec<D>, NVec<D>);
}

/// Explicit Euler: the position advances with the *old* velocity.
///
/// v' = v + a dt, x' = x + v dt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerSolver {
    time_step: f64,
}

impl EulerSolver {
    pub fn new(time_step: f64) -> Self {
        Self { time_step }
    }

    pub fn set_time_step(&mut self, time_step: f64) {
        self.time_step = time_step;
    }
}

impl Default for EulerSolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl Solver for EulerSolver {
    fn time_step(&self) -> f64 {
        self.time_step
    }

    fn solve<const D: usize>(&self, position: &NVec<D>, velocity: &NVec<D>, acceleration: &NVec<D>) -> (NVec<D>, NVec<D>) {
        let dt = self.time_step;
        let next_velocity = velocity + acceleration * dt;
        let next_position = position + velocity * dt;
        (next_position, next_velocity)
    }
}

/// Semi-implicit leapfrog: the position advances with the *new* velocity.
/// More stable than Euler for oscillating springs; the default integrator.
///
/// v' = v + a dt, x' = x + v' dt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeapFrogSolver {
    time_step: f64,
}

impl LeapFrogSolver {
    pub fn new(time_step: f64) -> Self {
        Self { time_step }
    }

    pub fn set_time_step(&mut self, time_step: f64) {
        self.time_step = time_step;
    }
}

impl Default for LeapFrogSolver {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl Solver for LeapFrogSolver {
    fn time_step(&self) -> f64 {
        self.time_step
    }

    fn solve<const D: usize>(&self, position: &NVec<D>, velocity: &NVec<D>, acceleration: &NVec<D>) -> (NVec<D>, NVec<D>) {
        let dt = self.time_step;
        let next_velocity = velocity + acceleration * dt;
        let next_position = position + next_velocity * dt;
        (next_position, next_velocity)
    }
}

/// Which integrator a scenario uses
/// `integrator: "euler"` or `integrator: "leapfrog"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorKind {
    #[serde(rename = "euler")] // explicit Euler, position from the old velocity
    Euler,

    #[default]
    #[serde(rename = "leapfrog")] // semi-implicit, position from the new velocity
    LeapFrog,
}

/// Run-time selected solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Integrator {
    Euler(EulerSolver),
    LeapFrog(LeapFrogSolver),
}

impl Integrator {
    pub fn new(kind: IntegratorKind, time_step: f64) -> Self {
        match kind {
            IntegratorKind::Euler => Self::Euler(EulerSolver::new(time_step)),
            IntegratorKind::LeapFrog => Self::LeapFrog(LeapFrogSolver::new(time_step)),
        }
    }

    pub fn kind(&self) -> IntegratorKind {
        match self {
            Self::Euler(_) => IntegratorKind::Euler,
            Self::LeapFrog(_) => IntegratorKind::LeapFrog,
        }
    }

    pub fn set_time_step(&mut self, time_step: f64) {
        match self {
            Self::Euler(s) => s.set_time_step(time_step),
            Self::LeapFrog(s) => s.set_time_step(time_step),
        }
    }
}

impl Default for Integrator {
    fn default() -> Self {
        Self::new(IntegratorKind::default(), DEFAULT_TIME_STEP)
    }
}

impl Solver for Integrator {
    fn time_step(&self) -> f64 {
        match self {
            Self::Euler(s) => s.time_step(),
            Self::LeapFrog(s) => s.time_step(),
        }
    }

    fn solve<const D: usize>(&self, position: &NVec<D>, velocity: &NVec<D>, acceleration: &NVec<D>) -> (NVec<D>, NVec<D>) {
        match self {
            Self::Euler(s) => s.solve(position, velocity, acceleration),
            Self::LeapFrog(s) => s.solve(position, velocity, acceleration),
        }
    }
}
