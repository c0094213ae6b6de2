use springsim::{ScenarioConfig, Scenario, Scenario1D, Scenario2D, Scenario3D};
use springsim::{run_2d, run_3d};
use springsim::{bench_chains, bench_integrators};
use springsim::configure_logger;

use clap::Parser;
use anyhow::{bail, Result};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Mass-spring simulation", long_about = None)]
struct Args {
    /// Scenario file, looked up under `scenarios/`
    #[arg(short, default_value = "chain_3d.yaml")]
    file_name: String,

    /// Run `parameters.steps` ticks without opening a window
    #[arg(long)]
    headless: bool,

    /// Run the benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    ScenarioConfig::load(&config_path)
}

fn run_headless<const D: usize>(mut scenario: Scenario<D>) {
    let steps = scenario.parameters.steps;
    for _ in 0..steps {
        scenario.step();
    }
    ftlog::info!("Headless run finished after {} steps", scenario.simulation.step_count());
    for (id, position) in scenario.positions() {
        println!("{:4}: {:?}", id.index(), position.as_slice());
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (_guard, log_path) = configure_logger("springsim")?;
    println!("Log file: {log_path:?}");
    ftlog::info!("{args:?}");

    if args.bench {
        bench_chains();
        bench_integrators();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;

    match (scenario_cfg.engine.dimension, args.headless) {
        (1, true) => run_headless(Scenario1D::build_scenario(scenario_cfg)?),
        (1, false) => run_2d(Scenario1D::build_scenario(scenario_cfg)?),
        (2, true) => run_headless(Scenario2D::build_scenario(scenario_cfg)?),
        (2, false) => run_2d(Scenario2D::build_scenario(scenario_cfg)?),
        (3, true) => run_headless(Scenario3D::build_scenario(scenario_cfg)?),
        (3, false) => run_3d(Scenario3D::build_scenario(scenario_cfg)?),
        (d, _) => bail!("unsupported dimension {d}, expected 1, 2 or 3"),
    }

    Ok(())
}
