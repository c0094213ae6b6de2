//! Force laws for the mass-spring network.
//!
//! Each function computes the force for one interaction from plain values;
//! [`Simulation`](super::world::Simulation) gathers the inputs and
//! accumulates the results onto the mass points.

use nalgebra::{UnitQuaternion, Vector3};

use super::directional::{reference_axis, rotation_between};
use super::states::NVec;

/// Length of the lever offsets before normalization. Levers end up with
/// unit length, only their directions matter.
pub const LEVER_DISTANCE: f64 = 10.0;
/// Weight of each of the four lever forces.
pub const LEVER_FORCE_SCALE: f64 = 0.25;
/// Weight of the direct pull of the tip toward its preferred position.
pub const TIP_FORCE_SCALE: f64 = 0.5;
/// Weight of the root-distance correction.
pub const ROOT_FORCE_SCALE: f64 = 0.5;

/// Linear spring force acting on point1; point2 receives the negation.
///
/// `F = dir * k * (length - rest) + (v2 - v1) * c`
pub fn linear_spring_force<const D: usize>(
    direction: &NVec<D>,
    length: f64,
    rest_length: f64,
    stiffness: f64,
    damping: f64,
    velocity1: &NVec<D>,
    velocity2: &NVec<D>,
) -> NVec<D> {
    direction * (stiffness * (length - rest_length)) + (velocity2 - velocity1) * damping
}

/// Global velocity damping, `-c * v`.
pub fn velocity_damping_force<const D: usize>(velocity: &NVec<D>, damping: f64) -> NVec<D> {
    velocity * -damping
}

/// Everything the hinge/lever bending law reads for one directional spring.
///
/// The hinge is point1 of the spring, the tip its point2 and the root is
/// point1 of the previous spring in the chain.
#[derive(Debug, Clone)]
pub struct HingeInput {
    pub root: Vector3<f64>,
    pub hinge: Vector3<f64>,
    pub tip: Vector3<f64>,
    pub hinge_velocity: Vector3<f64>,
    pub tip_velocity: Vector3<f64>,
    pub direction: Vector3<f64>,
    pub world_rest_dir: Vector3<f64>,
    pub dir_stiffness: f64,
    pub damping: f64,
}

/// Positions the bending law works with, in world space.
#[derive(Debug, Clone)]
pub struct HingeLevers {
    pub preferred_tip: Vector3<f64>,
    pub preferred: [Vector3<f64>; 4],
    pub current: [Vector3<f64>; 4],
}

/// The four lever offsets in the reference frame, two pairs along the axes
/// perpendicular to the reference axis.
pub fn lever_offsets() -> [Vector3<f64>; 4] {
    [
        Vector3::new(0.0, LEVER_DISTANCE, 0.0),
        Vector3::new(0.0, -LEVER_DISTANCE, 0.0),
        Vector3::new(0.0, 0.0, LEVER_DISTANCE),
        Vector3::new(0.0, 0.0, -LEVER_DISTANCE),
    ]
}

impl HingeInput {
    /// Preferred tip: one unit from the hinge along the world rest direction.
    pub fn preferred_tip(&self) -> Vector3<f64> {
        self.hinge + self.world_rest_dir.try_normalize(0.0).unwrap_or_else(Vector3::zeros)
    }

    /// Lever positions around the hinge for a frame rotation, unit length.
    fn place_levers(&self, rotation: &UnitQuaternion<f64>) -> [Vector3<f64>; 4] {
        lever_offsets().map(|offset| self.hinge + (rotation * offset).normalize())
    }

    /// Preferred levers, placed around the hinge in the world rest frame.
    pub fn preferred_levers(&self) -> [Vector3<f64>; 4] {
        self.place_levers(&rotation_between(&reference_axis(), &self.world_rest_dir))
    }

    /// Places the preferred and current levers around the hinge.
    ///
    /// The current levers are for inspection only: the bending force
    /// measures every lever pull from the preferred lever.
    pub fn levers(&self) -> HingeLevers {
        HingeLevers {
            preferred_tip: self.preferred_tip(),
            preferred: self.preferred_levers(),
            current: self.place_levers(&rotation_between(&reference_axis(), &self.direction)),
        }
    }

    /// Total bending force on the tip; the hinge receives the negation.
    ///
    /// Sums four lever forces, the tip attraction and the root correction.
    /// Each lever pulls along the preferred-lever-to-tip direction.
    pub fn tip_force(&self) -> Vector3<f64> {
        let preferred_tip = self.preferred_tip();
        let damping_term = (self.hinge_velocity - self.tip_velocity) * (self.damping * LEVER_FORCE_SCALE);

        let mut force: Vector3<f64> = Vector3::zeros();
        for lever in &self.preferred_levers() {
            let preferred_length = (preferred_tip - lever).norm();
            let to_tip = self.tip - lever;
            let current_length = to_tip.norm();
            let pull = to_tip.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
            force += pull * (self.dir_stiffness * (preferred_length - current_length) * LEVER_FORCE_SCALE);
            force += damping_term;
        }

        force += (preferred_tip - self.tip) * (self.dir_stiffness * TIP_FORCE_SCALE);

        let root_to_tip = self.tip - self.root;
        let root_to_preferred = (preferred_tip - self.root).norm();
        let root_pull = root_to_tip.try_normalize(0.0).unwrap_or_else(Vector3::zeros);
        force += root_pull * ((root_to_preferred - root_to_tip.norm()) * self.damping * ROOT_FORCE_SCALE);

        force
    }
}
