//! Numerical and physical parameters for a scenario run
//!
//! `Parameters` holds runtime settings:
//! - integration step size and the number of ticks of a headless run,
//! - global velocity damping,
//! - gravity, stored as plain components so the struct stays
//!   dimension-agnostic (the simulation keeps the typed vector)

#[derive(Debug, Clone)]
pub struct Parameters {
    pub time_step: f64, // step size
    pub steps: u64, // ticks for a headless run
    pub damping: f64, // global velocity damping
    pub gravity: Vec<f64>, // gravity components, one per dimension
}
