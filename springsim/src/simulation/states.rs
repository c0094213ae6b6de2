//! Core state types for the mass-spring simulation.
//!
//! Defines the dimension-generic vector alias `NVec<D>` (with `NVec1`,
//! `NVec2`, `NVec3` shorthands), the arena ids handed out by
//! [`Simulation`](super::world::Simulation), and [`MassPoint`].

use std::fmt;

use nalgebra::{SVector, Vector3};

pub type NVec<const D: usize> = SVector<f64, D>;
pub type NVec1 = NVec<1>;
pub type NVec2 = NVec<2>;
pub type NVec3 = NVec<3>;

/// Handle of a mass point inside a simulation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MassPointId(pub(crate) usize);

/// Handle of a spring inside a simulation arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpringId(pub(crate) usize);

impl MassPointId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl SpringId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A point particle with mass.
///
/// `position`/`velocity` hold the working state of the current tick, the
/// backup slots hold the last committed state. A mass of zero or less marks
/// the point as an anchor that the integrator never moves.
#[derive(Debug, Clone)]
pub struct MassPoint<const D: usize> {
    mass: f64,
    position: NVec<D>,
    velocity: NVec<D>,
    force: NVec<D>,
    backup_position: NVec<D>,
    backup_velocity: NVec<D>,
    springs: Vec<SpringId>,  // every incident spring
    incoming: Vec<SpringId>, // incident springs whose point2 is this point
}

impl<const D: usize> MassPoint<D> {
    pub fn new(mass: f64, position: NVec<D>) -> Self {
        Self {
            mass,
            position,
            velocity: NVec::zeros(),
            force: NVec::zeros(),
            backup_position: position,
            backup_velocity: NVec::zeros(),
            springs: Vec::new(),
            incoming: Vec::new(),
        }
    }

    /// Anchor point: never integrated.
    pub fn anchor(position: NVec<D>) -> Self {
        Self::new(0.0, position)
    }

    pub fn with_velocity(mut self, velocity: NVec<D>) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
    }

    pub fn is_anchor(&self) -> bool {
        self.mass <= 0.0
    }

    pub fn position(&self) -> &NVec<D> {
        &self.position
    }

    /// Moves the point, overwriting the committed state as well.
    pub fn set_position(&mut self, position: NVec<D>) {
        self.position = position;
        self.backup_position = position;
    }

    pub fn velocity(&self) -> &NVec<D> {
        &self.velocity
    }

    /// Sets the velocity, overwriting the committed state as well.
    pub fn set_velocity(&mut self, velocity: NVec<D>) {
        self.velocity = velocity;
        self.backup_velocity = velocity;
    }

    pub fn backup_position(&self) -> &NVec<D> {
        &self.backup_position
    }

    pub fn backup_velocity(&self) -> &NVec<D> {
        &self.backup_velocity
    }

    pub fn force(&self) -> &NVec<D> {
        &self.force
    }

    pub fn set_force(&mut self, force: NVec<D>) {
        self.force = force;
    }

    pub fn add_force(&mut self, force: &NVec<D>) {
        self.force += force;
    }

    /// Commits the working state as the backup for the next tick and clears
    /// the force accumulator.
    pub fn commit(&mut self) {
        self.backup_position = self.position;
        self.backup_velocity = self.velocity;
        self.force = NVec::zeros();
    }

    /// Incident springs, in the order they were attached.
    pub fn springs(&self) -> &[SpringId] {
        &self.springs
    }

    /// Incident springs that end at this point.
    pub fn incoming(&self) -> &[SpringId] {
        &self.incoming
    }

    pub fn is_orphan(&self) -> bool {
        self.springs.is_empty()
    }

    pub(crate) fn attach(&mut self, spring: SpringId, terminates_here: bool) {
        self.springs.push(spring);
        if terminates_here {
            self.incoming.push(spring);
        }
    }

    pub(crate) fn detach(&mut self, spring: SpringId) {
        self.springs.retain(|&s| s != spring);
        self.incoming.retain(|&s| s != spring);
    }

    /// Integration write-back. Components that came out non-finite keep
    /// their pre-integration value; returns how many were replaced.
    pub(crate) fn apply_integration(&mut self, position: NVec<D>, velocity: NVec<D>) -> usize {
        let mut clamped = 0;
        for d in 0..D {
            if position[d].is_finite() {
                self.position[d] = position[d];
            } else {
                clamped += 1;
            }
            if velocity[d].is_finite() {
                self.velocity[d] = velocity[d];
            } else {
                clamped += 1;
            }
        }
        clamped
    }

    /// Zeroes non-finite force components; returns how many were zeroed.
    pub(crate) fn sanitize_force(&mut self) -> usize {
        let mut zeroed = 0;
        for f in self.force.iter_mut() {
            if !f.is_finite() {
                *f = 0.0;
                zeroed += 1;
            }
        }
        zeroed
    }
}

impl<const D: usize> fmt::Display for MassPoint<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mass {}", self.mass)?;
        writeln!(f, "Position [{}]", join(&self.position))?;
        writeln!(f, "Velocity [{}]", join(&self.velocity))?;
        write!(f, "Force [{}]", join(&self.force))
    }
}

pub(crate) fn join<const D: usize>(v: &NVec<D>) -> String {
    v.iter().map(|c| format!("{c}")).collect::<Vec<_>>().join(" ")
}

/// View of a D-vector as a 3-vector. Only meaningful when `D == 3`.
pub(crate) fn to_vec3<const D: usize>(v: &NVec<D>) -> Option<Vector3<f64>> {
    (D == 3).then(|| Vector3::new(v[0], v[1], v[2]))
}

/// Inverse of [`to_vec3`]; extra components are dropped, missing ones are zero.
pub(crate) fn from_vec3<const D: usize>(v: &Vector3<f64>) -> NVec<D> {
    NVec::from_fn(|i, _| if i < 3 { v[i] } else { 0.0 })
}
