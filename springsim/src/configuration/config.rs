//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – dimension and integrator
//! - [`ParametersConfig`] – time step, run length, gravity, damping
//! - [`MassPointConfig`]  – initial state of each explicitly listed mass point
//! - [`SpringConfig`]     – springs between listed mass points
//! - [`ChainConfig`]      – procedurally generated chains (tentacles)
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example 3D scenario YAML matching these types:
//!
//! ```yaml
//! engine:
//!   dimension: 3            # 1, 2 or 3
//!   integrator: "leapfrog"  # or "euler"
//!
//! parameters:
//!   time_step: 0.1          # fixed step size
//!   steps: 600              # ticks for a headless run
//!   gravity: [0.0, -0.2, 0.0]
//!   damping: 0.1            # global velocity damping
//!
//! mass_points:
//!   - mass: 0.0             # mass <= 0 pins the point
//!     position: [0.0, 0.0, 0.0]
//!   - mass: 1.0
//!     position: [1.0, 0.0, 0.0]
//!     velocity: [0.0, 1.0, 0.0]
//!
//! springs:
//!   - from: 0
//!     to: 1
//!     kind: linear          # linear | angled | directional
//!     rest_length: 1.0
//!
//! chains:
//!   - origin: [0.0, 2.0, 0.0]
//!     segment: [1.0, 0.0, 0.0]
//!     segments: 10
//!     dir_stiffness: 0.9
//! ```
//!
//! The scenario builder maps this configuration into the runtime
//! [`Scenario`](crate::simulation::scenario::Scenario).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::simulation::integrator::IntegratorKind;

/// Engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub dimension: usize, // 1, 2 or 3
    #[serde(default)]
    pub integrator: IntegratorKind, // leapfrog unless stated otherwise
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    #[serde(default = "default_time_step")]
    pub time_step: f64, // time step size
    #[serde(default = "default_steps")]
    pub steps: u64, // ticks for a headless run
    #[serde(default)]
    pub gravity: Option<Vec<f64>>, // zero when omitted
    #[serde(default = "default_damping")]
    pub damping: f64, // global velocity damping
}

impl Default for ParametersConfig {
    fn default() -> Self {
        Self {
            time_step: default_time_step(),
            steps: default_steps(),
            gravity: None,
            damping: default_damping(),
        }
    }
}

fn default_time_step() -> f64 {
    crate::simulation::integrator::DEFAULT_TIME_STEP
}

fn default_steps() -> u64 {
    600
}

fn default_damping() -> f64 {
    crate::simulation::world::DEFAULT_GLOBAL_DAMPING
}

fn default_stiffness() -> f64 {
    crate::simulation::spring::DEFAULT_STIFFNESS
}

fn default_spring_damping() -> f64 {
    crate::simulation::spring::DEFAULT_DAMPING
}

fn default_mass() -> f64 {
    1.0
}

fn default_anchored() -> bool {
    true
}

/// Initial state of a single mass point
#[derive(Deserialize, Debug, Clone)]
pub struct MassPointConfig {
    pub mass: f64, // <= 0 makes the point an anchor
    pub position: Vec<f64>, // initial position, one component per dimension
    #[serde(default)]
    pub velocity: Option<Vec<f64>>, // initial velocity, zero when omitted
}

/// Spring variant selector
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpringKindConfig {
    #[default]
    Linear,
    Angled,
    Directional,
}

/// A spring between two entries of `mass_points` (by index)
#[derive(Deserialize, Debug, Clone)]
pub struct SpringConfig {
    pub from: usize, // index of point1 in `mass_points`
    pub to: usize, // index of point2 in `mass_points`
    #[serde(default)]
    pub kind: SpringKindConfig,
    #[serde(default)]
    pub rest_length: Option<f64>, // measured from the initial positions when omitted
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_spring_damping")]
    pub damping: f64,
    #[serde(default)]
    pub rest_angle1: f64, // angled only
    #[serde(default)]
    pub rest_angle2: f64, // angled only
    #[serde(default)]
    pub angle_stiffness: f64, // angled only
    #[serde(default)]
    pub rest_dir: Option<Vec<f64>>, // directional only, +x when omitted
    #[serde(default = "default_stiffness")]
    pub dir_stiffness: f64, // directional only
}

/// A straight chain of equal segments starting at `origin`
///
/// Each segment is `segment` long and points along it. With a positive
/// `dir_stiffness` (3-D only) the springs are directional with rest
/// direction +x, so the chain wants to stay straight. The first spring has
/// no predecessor and never bends.
#[derive(Deserialize, Debug, Clone)]
pub struct ChainConfig {
    pub origin: Vec<f64>,
    pub segment: Vec<f64>,
    pub segments: usize,
    #[serde(default = "default_mass")]
    pub mass: f64, // mass of every non-anchored chain point
    #[serde(default = "default_anchored")]
    pub anchored: bool, // pin the first point
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_spring_damping")]
    pub damping: f64,
    #[serde(default)]
    pub dir_stiffness: f64,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig, // dimension and integrator
    #[serde(default)]
    pub parameters: ParametersConfig, // global numerical and physical parameters
    #[serde(default)]
    pub mass_points: Vec<MassPointConfig>, // explicitly listed mass points
    #[serde(default)]
    pub springs: Vec<SpringConfig>, // springs between listed mass points
    #[serde(default)]
    pub chains: Vec<ChainConfig>, // generated chains
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("invalid scenario YAML")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("cannot open scenario {}", path.display()))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).with_context(|| format!("invalid scenario {}", path.display()))
    }
}
