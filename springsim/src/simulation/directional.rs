//! Direction-aware springs.
//!
//! A directional spring remembers a rest direction expressed in the frame of
//! the previous spring of its chain. The frame is the rotation that maps the
//! reference axis (+x) onto the previous spring's world direction, so a rest
//! direction of +x means "continue straight on".
//!
//! The frame bookkeeping needs 3-D rotations; for other dimensions the world
//! rest direction is the stored rest direction and the local direction is
//! the world direction.

use std::f64::consts::PI;
use std::fmt;

use nalgebra::{Unit, UnitQuaternion, Vector3};

use super::states::{from_vec3, join, to_vec3, NVec};

pub const DEFAULT_DIR_STIFFNESS: f64 = 0.9;

/// Axis that every chain frame is measured from.
pub fn reference_axis() -> Vector3<f64> {
    Vector3::x()
}

/// Rotation taking the direction of `from` onto the direction of `to`.
///
/// Total: a zero vector yields the identity and antiparallel vectors a half
/// turn about an axis perpendicular to `from`.
pub fn rotation_between(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    let (Some(from), Some(to)) = (from.try_normalize(f64::EPSILON), to.try_normalize(f64::EPSILON)) else {
        return UnitQuaternion::identity();
    };
    if let Some(rotation) = UnitQuaternion::rotation_between(&from, &to) {
        return rotation;
    }
    let helper = if from.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let axis = Unit::new_normalize(from.cross(&helper));
    UnitQuaternion::from_axis_angle(&axis, PI)
}

#[derive(Debug, Clone)]
pub struct DirSpring<const D: usize> {
    rest_dir: NVec<D>,
    dir_stiffness: f64,
    world_rest_dir: NVec<D>,
    local_dir: NVec<D>,
    frame: UnitQuaternion<f64>,
}

impl<const D: usize> Default for DirSpring<D> {
    fn default() -> Self {
        Self::new(unit_x(), DEFAULT_DIR_STIFFNESS)
    }
}

impl<const D: usize> DirSpring<D> {
    pub fn new(rest_dir: NVec<D>, dir_stiffness: f64) -> Self {
        let rest_dir = normalized_or(rest_dir, unit_x());
        Self {
            rest_dir,
            dir_stiffness,
            world_rest_dir: rest_dir,
            local_dir: NVec::zeros(),
            frame: UnitQuaternion::identity(),
        }
    }

    /// Rest direction in the previous spring's frame (unit length).
    pub fn rest_dir(&self) -> &NVec<D> {
        &self.rest_dir
    }

    /// Sets the rest direction. A zero vector leaves it unchanged.
    pub fn set_rest_dir(&mut self, rest_dir: NVec<D>) {
        self.rest_dir = normalized_or(rest_dir, self.rest_dir);
    }

    pub fn dir_stiffness(&self) -> f64 {
        self.dir_stiffness
    }

    pub fn set_dir_stiffness(&mut self, dir_stiffness: f64) {
        self.dir_stiffness = dir_stiffness;
    }

    /// Rest direction expressed in world space, as of the last refresh.
    pub fn world_rest_dir(&self) -> &NVec<D> {
        &self.world_rest_dir
    }

    /// Current spring direction expressed in the previous spring's frame.
    pub fn local_dir(&self) -> &NVec<D> {
        &self.local_dir
    }

    /// Rotation from the reference axis into the previous spring's frame.
    pub fn frame(&self) -> &UnitQuaternion<f64> {
        &self.frame
    }

    /// Recomputes the derived frame quantities.
    ///
    /// `direction` is this spring's current world direction and
    /// `previous_direction` the one of its predecessor in the chain, if any.
    /// Chain roots use the reference axis as their frame.
    pub(crate) fn refresh_frame(&mut self, direction: &NVec<D>, previous_direction: Option<&NVec<D>>) {
        let (Some(direction3), Some(rest3)) = (to_vec3(direction), to_vec3(&self.rest_dir)) else {
            self.world_rest_dir = self.rest_dir;
            self.local_dir = *direction;
            self.frame = UnitQuaternion::identity();
            return;
        };
        let previous3 = previous_direction
            .and_then(to_vec3)
            .and_then(|p| p.try_normalize(0.0))
            .unwrap_or_else(reference_axis);

        self.frame = rotation_between(&reference_axis(), &previous3);
        let world_rest = (self.frame * rest3).try_normalize(0.0).unwrap_or(previous3);
        self.world_rest_dir = from_vec3(&world_rest);
        self.local_dir = from_vec3(&(self.frame.inverse() * direction3));
    }
}

impl<const D: usize> fmt::Display for DirSpring<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RestDir [{}]", join(&self.rest_dir))?;
        write!(f, "DirStiffness {}", self.dir_stiffness)
    }
}

fn unit_x<const D: usize>() -> NVec<D> {
    NVec::from_fn(|i, _| if i == 0 { 1.0 } else { 0.0 })
}

fn normalized_or<const D: usize>(v: NVec<D>, fallback: NVec<D>) -> NVec<D> {
    v.try_normalize(0.0).unwrap_or(fallback)
}
