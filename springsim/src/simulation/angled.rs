//! Angle-aware springs.
//!
//! An angled spring stores target angles and an angular stiffness next to
//! the usual linear parameters. The angles can be queried and compared with
//! the rest angles, but the simulation derives no force from them.

use std::fmt;

use super::spring::Spring;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngledSpring {
    pub rest_angle1: f64,    // in-plane rest angle
    pub rest_angle2: f64,    // out-of-plane rest angle, 3-D only
    pub angle_stiffness: f64,
}

impl AngledSpring {
    pub fn new(rest_angle1: f64, rest_angle2: f64, angle_stiffness: f64) -> Self {
        Self {
            rest_angle1,
            rest_angle2,
            angle_stiffness,
        }
    }

    /// Planar variant without an out-of-plane angle.
    pub fn planar(rest_angle1: f64, angle_stiffness: f64) -> Self {
        Self::new(rest_angle1, 0.0, angle_stiffness)
    }
}

impl fmt::Display for AngledSpring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RestAngle1 {}", self.rest_angle1)?;
        writeln!(f, "RestAngle2 {}", self.rest_angle2)?;
        write!(f, "AngleStiffness {}", self.angle_stiffness)
    }
}

impl<const D: usize> Spring<D> {
    /// Planar angle of the spring direction, `atan2(y, x)`.
    ///
    /// A 1-D spring has no y component and reports either 0 or pi.
    pub fn current_angle1(&self) -> f64 {
        let dir = self.direction();
        let y = if D > 1 { dir[1] } else { 0.0 };
        y.atan2(dir[0])
    }

    /// Polar angle of the spring direction, `acos(z / |dir|)`.
    ///
    /// Only defined in 3-D; every other dimension returns 0, as does a
    /// spring of zero length.
    pub fn current_angle2(&self) -> f64 {
        if D != 3 {
            return 0.0;
        }
        let dir = self.direction();
        let norm = dir.norm();
        if norm > 0.0 {
            (dir[2] / norm).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        }
    }

    /// Deviation from the in-plane rest angle, for angled springs.
    pub fn relative_angle1(&self) -> Option<f64> {
        self.as_angled().map(|a| self.current_angle1() - a.rest_angle1)
    }

    /// Deviation from the out-of-plane rest angle, for angled springs.
    pub fn relative_angle2(&self) -> Option<f64> {
        self.as_angled().map(|a| self.current_angle2() - a.rest_angle2)
    }
}
