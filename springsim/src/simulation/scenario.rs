//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario<D>`, with `Scenario2D` / `Scenario3D` shorthands) containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the populated `Simulation<D>`
//! - the integrator chosen by the scenario
//!
//! Scenarios are inserted into Bevy as `Resource`s and consumed by the
//! stepping and visualization systems, or stepped headless.

use anyhow::{bail, ensure, Context, Result};
use bevy::prelude::Resource;

use crate::configuration::config::{ChainConfig, ScenarioConfig, SpringConfig, SpringKindConfig};
use crate::simulation::angled::AngledSpring;
use crate::simulation::directional::DirSpring;
use crate::simulation::engine::Engine;
use crate::simulation::integrator::Integrator;
use crate::simulation::params::Parameters;
use crate::simulation::spring::Spring;
use crate::simulation::states::{MassPoint, MassPointId, NVec};
use crate::simulation::world::Simulation;

/// Bevy resource representing a fully-initialized `D`-dimensional scenario
///
/// This is the main "runtime bundle" constructed from a [`ScenarioConfig`]:
/// it contains the engine settings, parameters, the simulation and the
/// integrator that advances it
#[derive(Resource)]
pub struct Scenario<const D: usize> {
    pub engine: Engine,
    pub parameters: Parameters,
    pub simulation: Simulation<D>,
    pub integrator: Integrator,
}

pub type Scenario1D = Scenario<1>;
pub type Scenario2D = Scenario<2>;
pub type Scenario3D = Scenario<3>;

impl<const D: usize> Scenario<D> {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        ensure!(
            cfg.engine.dimension == D,
            "scenario is {}-D but a {}-D scenario was requested",
            cfg.engine.dimension,
            D
        );
        ensure!(cfg.parameters.time_step > 0.0, "time_step must be positive, got {}", cfg.parameters.time_step);

        // Engine (runtime) from EngineConfig
        let engine = Engine {
            dimension: cfg.engine.dimension,
            integrator: cfg.engine.integrator,
        };

        // Parameters (runtime) from ParametersConfig
        let p_cfg = &cfg.parameters;
        let gravity = match &p_cfg.gravity {
            Some(g) => vector::<D>(g).context("parameters.gravity")?,
            None => NVec::zeros(),
        };
        let parameters = Parameters {
            time_step: p_cfg.time_step,
            steps: p_cfg.steps,
            damping: p_cfg.damping,
            gravity: gravity.iter().copied().collect(),
        };

        let mut simulation = Simulation::new();
        simulation.set_gravity(gravity);
        simulation.set_damping(parameters.damping);

        // Mass points: explicitly listed ones are always tracked, even
        // without springs
        let mut ids = Vec::with_capacity(cfg.mass_points.len());
        for (i, mp_cfg) in cfg.mass_points.iter().enumerate() {
            let position = vector::<D>(&mp_cfg.position).with_context(|| format!("mass_points[{i}].position"))?;
            let mut point = MassPoint::new(mp_cfg.mass, position);
            if let Some(v) = &mp_cfg.velocity {
                point.set_velocity(vector::<D>(v).with_context(|| format!("mass_points[{i}].velocity"))?);
            }
            let id = simulation.create_mass_point(point);
            simulation.add_mass_point(id);
            ids.push(id);
        }

        for (i, s_cfg) in cfg.springs.iter().enumerate() {
            let spring = spring_from_config::<D>(s_cfg, &ids).with_context(|| format!("springs[{i}]"))?;
            if simulation.add_spring(spring).is_none() {
                bail!("springs[{i}]: endpoints {} -> {} could not be connected", s_cfg.from, s_cfg.to);
            }
        }

        for (i, c_cfg) in cfg.chains.iter().enumerate() {
            build_chain(&mut simulation, c_cfg).with_context(|| format!("chains[{i}]"))?;
        }

        ftlog::info!(
            "Built {}-D scenario: {} mass points, {} springs, {:?} integrator, dt = {}",
            D,
            simulation.mass_points().count(),
            simulation.spring_count(),
            engine.integrator,
            parameters.time_step
        );

        let integrator = Integrator::new(engine.integrator, parameters.time_step);
        Ok(Self {
            engine,
            parameters,
            simulation,
            integrator,
        })
    }

    /// Advances the simulation by one tick with the scenario's integrator.
    pub fn step(&mut self) {
        self.simulation.step(&self.integrator);
    }

    /// Positions of the tracked mass points.
    pub fn positions(&self) -> impl Iterator<Item = (MassPointId, NVec<D>)> + '_ {
        self.simulation
            .mass_points()
            .filter_map(|id| self.simulation.mass_point(id).map(|mp| (id, *mp.position())))
    }

    /// Endpoint positions of every spring.
    pub fn segments(&self) -> impl Iterator<Item = (NVec<D>, NVec<D>)> + '_ {
        self.simulation.springs().filter_map(|(_, s)| {
            let a = self.simulation.mass_point(s.point1())?;
            let b = self.simulation.mass_point(s.point2())?;
            Some((*a.position(), *b.position()))
        })
    }
}

/// Converts a config vector, checking its length against the dimension.
pub fn vector<const D: usize>(components: &[f64]) -> Result<NVec<D>> {
    ensure!(
        components.len() == D,
        "expected {} components, got {}",
        D,
        components.len()
    );
    Ok(NVec::from_column_slice(components))
}

fn spring_from_config<const D: usize>(cfg: &SpringConfig, ids: &[MassPointId]) -> Result<Spring<D>> {
    let (Some(&p1), Some(&p2)) = (ids.get(cfg.from), ids.get(cfg.to)) else {
        bail!("endpoint out of range: {} -> {} with {} mass points", cfg.from, cfg.to, ids.len());
    };

    let spring = match cfg.kind {
        SpringKindConfig::Linear => Spring::new(p1, p2),
        SpringKindConfig::Angled => Spring::angled(
            p1,
            p2,
            AngledSpring::new(cfg.rest_angle1, cfg.rest_angle2, cfg.angle_stiffness),
        ),
        SpringKindConfig::Directional => {
            let mut dir = DirSpring::<D>::default();
            dir.set_dir_stiffness(cfg.dir_stiffness);
            if let Some(rest_dir) = &cfg.rest_dir {
                dir.set_rest_dir(vector::<D>(rest_dir).context("rest_dir")?);
            }
            Spring::directional(p1, p2, dir)
        }
    };

    let spring = spring.with_stiffness(cfg.stiffness).with_damping(cfg.damping);
    Ok(match cfg.rest_length {
        Some(rest) => spring.with_rest_length(rest),
        None => spring,
    })
}

/// Adds a straight chain; returns the ids of its points, root first.
pub fn build_chain<const D: usize>(simulation: &mut Simulation<D>, cfg: &ChainConfig) -> Result<Vec<MassPointId>> {
    ensure!(cfg.segments > 0, "a chain needs at least one segment");
    let origin = vector::<D>(&cfg.origin).context("origin")?;
    let segment = vector::<D>(&cfg.segment).context("segment")?;
    let rest_length = segment.norm();
    ensure!(rest_length > 0.0, "segment must not be the zero vector");

    let directional = cfg.dir_stiffness > 0.0 && Simulation::<D>::SUPPORTS_BENDING;
    if cfg.dir_stiffness > 0.0 && !directional {
        ftlog::warn!("dir_stiffness ignored: bending needs a 3-D scenario, this one is {}-D", D);
    }

    let points: Vec<MassPointId> = (0..=cfg.segments)
        .map(|i| {
            let mass = if i == 0 && cfg.anchored { 0.0 } else { cfg.mass };
            simulation.create_mass_point(MassPoint::new(mass, origin + segment * i as f64))
        })
        .collect();

    for pair in points.windows(2) {
        let spring = if directional {
            let mut dir = DirSpring::default();
            dir.set_dir_stiffness(cfg.dir_stiffness);
            Spring::directional(pair[0], pair[1], dir)
        } else {
            Spring::new(pair[0], pair[1])
        };
        let spring = spring
            .with_rest_length(rest_length)
            .with_stiffness(cfg.stiffness)
            .with_damping(cfg.damping);
        if simulation.add_spring(spring).is_none() {
            bail!("could not connect chain points {} and {}", pair[0].index(), pair[1].index());
        }
    }

    Ok(points)
}
