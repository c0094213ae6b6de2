use std::time::Instant;

use crate::configuration::config::ChainConfig;
use crate::simulation::integrator::{Integrator, IntegratorKind};
use crate::simulation::scenario::build_chain;
use crate::simulation::states::NVec3;
use crate::simulation::world::Simulation;

/// Helper to build a 3-D simulation of `chains` chains with `segments` springs each
fn make_simulation(chains: usize, segments: usize, dir_stiffness: f64) -> Simulation<3> {
    let mut sim = Simulation::<3>::new();
    sim.set_gravity(NVec3::new(0.0, -0.2, 0.0));

    for c in 0..chains {
        let c_f = c as f64;
        // deterministic origins on a ring, no rand needed
        let cfg = ChainConfig {
            origin: vec![(c_f * 0.37).sin() * 5.0, 0.0, (c_f * 0.37).cos() * 5.0],
            segment: vec![1.0, 0.0, 0.0],
            segments,
            mass: 1.0,
            anchored: true,
            stiffness: 0.9,
            damping: 0.9,
            dir_stiffness,
        };
        if let Err(e) = build_chain(&mut sim, &cfg) {
            ftlog::warn!("bench: skipping chain {c}: {e}");
        }
    }
    sim
}

fn time_steps(sim: &mut Simulation<3>, integrator: &Integrator, steps: usize) -> f64 {
    // Warm up
    sim.step(integrator);

    let t0 = Instant::now();
    for _ in 0..steps {
        sim.step(integrator);
    }
    t0.elapsed().as_secs_f64() * 1000.0 / steps as f64
}

/// Times a full tick with and without bending for a growing number of chains.
/// Paste output directly into excel to graph
pub fn bench_chains() {
    let integrator = Integrator::new(IntegratorKind::LeapFrog, 0.1);
    let segments = 20;

    println!("chains,springs,linear_ms,bending_ms");

    for chains in (10..=500).step_by(10) {
        let steps = if chains <= 100 { 20 } else { 5 };

        let mut linear = make_simulation(chains, segments, 0.0);
        let ms_linear = time_steps(&mut linear, &integrator, steps);

        let mut bending = make_simulation(chains, segments, 0.9);
        let ms_bending = time_steps(&mut bending, &integrator, steps);

        println!("{},{},{:.6},{:.6}", chains, bending.spring_count(), ms_linear, ms_bending);
    }
    ftlog::info!("bench_chains finished");
}

/// Times Euler against leapfrog on the same bending chain set.
pub fn bench_integrators() {
    let chains = 100;
    let segments = 20;
    let steps = 50;

    for kind in [IntegratorKind::Euler, IntegratorKind::LeapFrog] {
        let integrator = Integrator::new(kind, 0.1);
        let mut sim = make_simulation(chains, segments, 0.9);
        let ms = time_steps(&mut sim, &integrator, steps);
        println!("{:?}: {} springs, step = {:8.6} ms", kind, sim.spring_count(), ms);
    }
}
