pub mod states;
pub mod spring;
pub mod angled;
pub mod directional;
pub mod forces;
pub mod integrator;
pub mod world;
pub mod registry;
pub mod params;
pub mod engine;
pub mod scenario;
