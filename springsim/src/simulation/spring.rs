//! Springs connecting two mass points.
//!
//! A [`Spring`] carries the parameters shared by every variant (rest length,
//! stiffness, damping) plus the cached length and direction; the
//! variant-specific data lives in [`SpringKind`].

use std::fmt;

use super::angled::AngledSpring;
use super::directional::DirSpring;
use super::states::{join, MassPointId, NVec};

pub const DEFAULT_STIFFNESS: f64 = 0.9;
pub const DEFAULT_DAMPING: f64 = 0.9;

#[derive(Debug, Clone)]
pub enum SpringKind<const D: usize> {
    Linear,
    Angled(AngledSpring),
    Directional(DirSpring<D>),
}

#[derive(Debug, Clone)]
pub struct Spring<const D: usize> {
    point1: MassPointId,
    point2: MassPointId,
    rest_length: Option<f64>, // None until measured on insertion
    length: f64,
    direction: NVec<D>, // unit vector point1 -> point2, zero when degenerate
    stiffness: f64,
    damping: f64,
    kind: SpringKind<D>,
}

impl<const D: usize> Spring<D> {
    /// Plain spring with default stiffness and damping. The rest length is
    /// measured when the spring is added to a simulation unless set first.
    pub fn new(point1: MassPointId, point2: MassPointId) -> Self {
        Self {
            point1,
            point2,
            rest_length: None,
            length: 0.0,
            direction: NVec::zeros(),
            stiffness: DEFAULT_STIFFNESS,
            damping: DEFAULT_DAMPING,
            kind: SpringKind::Linear,
        }
    }

    pub fn angled(point1: MassPointId, point2: MassPointId, angled: AngledSpring) -> Self {
        Self { kind: SpringKind::Angled(angled), ..Self::new(point1, point2) }
    }

    pub fn directional(point1: MassPointId, point2: MassPointId, dir: DirSpring<D>) -> Self {
        Self { kind: SpringKind::Directional(dir), ..Self::new(point1, point2) }
    }

    pub fn with_rest_length(mut self, rest_length: f64) -> Self {
        self.rest_length = Some(rest_length);
        self
    }

    pub fn with_stiffness(mut self, stiffness: f64) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    pub fn point1(&self) -> MassPointId {
        self.point1
    }

    pub fn point2(&self) -> MassPointId {
        self.point2
    }

    pub fn touches(&self, point: MassPointId) -> bool {
        self.point1 == point || self.point2 == point
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn rest_length(&self) -> f64 {
        self.rest_length.unwrap_or(self.length)
    }

    pub fn set_rest_length(&mut self, rest_length: f64) {
        self.rest_length = Some(rest_length);
    }

    pub fn direction(&self) -> &NVec<D> {
        &self.direction
    }

    pub fn stiffness(&self) -> f64 {
        self.stiffness
    }

    pub fn set_stiffness(&mut self, stiffness: f64) {
        self.stiffness = stiffness;
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    pub fn set_damping(&mut self, damping: f64) {
        self.damping = damping;
    }

    pub fn kind(&self) -> &SpringKind<D> {
        &self.kind
    }

    pub fn as_angled(&self) -> Option<&AngledSpring> {
        match &self.kind {
            SpringKind::Angled(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_angled_mut(&mut self) -> Option<&mut AngledSpring> {
        match &mut self.kind {
            SpringKind::Angled(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_directional(&self) -> Option<&DirSpring<D>> {
        match &self.kind {
            SpringKind::Directional(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_directional_mut(&mut self) -> Option<&mut DirSpring<D>> {
        match &mut self.kind {
            SpringKind::Directional(d) => Some(d),
            _ => None,
        }
    }

    /// Recomputes length and direction from the endpoint positions.
    pub fn refresh(&mut self, position1: &NVec<D>, position2: &NVec<D>) {
        let delta = position2 - position1;
        self.length = delta.norm();
        self.direction = delta.try_normalize(0.0).unwrap_or_else(NVec::zeros);
    }

    /// Fixes the rest length to the current length if none was given.
    pub(crate) fn settle_rest_length(&mut self) {
        if self.rest_length.is_none() {
            self.rest_length = Some(self.length);
        }
    }
}

impl<const D: usize> fmt::Display for Spring<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Length {}", self.length)?;
        writeln!(f, "RestLength {}", self.rest_length())?;
        writeln!(f, "Stiffness {}", self.stiffness)?;
        writeln!(f, "Damping {}", self.damping)?;
        write!(f, "Direction [{}]", join(&self.direction))?;
        match &self.kind {
            SpringKind::Linear => Ok(()),
            SpringKind::Angled(a) => write!(f, "\n{a}"),
            SpringKind::Directional(d) => write!(f, "\n{d}"),
        }
    }
}
