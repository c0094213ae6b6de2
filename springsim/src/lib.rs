pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;

pub use simulation::states::{MassPoint, MassPointId, SpringId, NVec, NVec1, NVec2, NVec3};
pub use simulation::spring::{Spring, SpringKind};
pub use simulation::angled::AngledSpring;
pub use simulation::directional::DirSpring;
pub use simulation::integrator::{Solver, EulerSolver, LeapFrogSolver, Integrator, IntegratorKind};
pub use simulation::world::Simulation;
pub use simulation::registry::{SimulationRegistry, RegistrySlot};
pub use simulation::scenario::{Scenario, Scenario1D, Scenario2D, Scenario3D};

pub use configuration::config::{EngineConfig, ParametersConfig, MassPointConfig, SpringConfig, SpringKindConfig, ChainConfig, ScenarioConfig};
pub use configuration::logging::configure_logger;

pub use visualization::{springsim_vis2d::run_2d, springsim_vis3d::run_3d};

pub use benchmark::benchmark::{bench_chains, bench_integrators};
