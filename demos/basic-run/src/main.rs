//! `basic-run` — a runnable demo driving the kernel through a full
//! experiment: a handful of agents cruising down a straight corridor,
//! observed to CSV.
//!
//! ```text
//! basic-run --config experiment.toml --output output/basic-run
//! ```
//!
//! With no `--config`, every kernel default applies (one invocation, five
//! agents, a 13 m/s cruise target).

mod config;
mod cruise;
mod network;
mod spawn;

use std::ffi::{c_char, CStr};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use op_agent::Agent;
use op_core::{LinkId, TimingConfig};
use op_networks::NewAgentRequest;
use op_observation_csv::CsvObservation;
use op_plugin::Callbacks;
use op_sim::{RunObserver, RunOrchestratorBuilder};

use config::DemoConfig;
use cruise::CruiseControlModel;
use spawn::CorridorEntry;

#[derive(Parser)]
#[command(about = "Runs a small openPASS-kernel-style experiment end to end")]
struct Cli {
    /// Path to a TOML file with `[experiment]`/`[environment]`/`[scenario]` tables.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the CSV observation plug-in writes into.
    #[arg(long, default_value = "output/basic-run")]
    output: PathBuf,
}

extern "C" fn log_callback(msg: *const c_char) {
    if msg.is_null() {
        return;
    }
    // SAFETY: `msg` is a NUL-terminated C string for the duration of this call,
    // the same contract every `Callbacks::log` implementor relies on (§4.1).
    let text = unsafe { CStr::from_ptr(msg) }.to_string_lossy();
    tracing::info!(target: "plugin", "{text}");
}

struct PrintingObserver;

impl RunObserver for PrintingObserver {
    fn on_invocation_end(&mut self, index: u32, succeeded: bool) {
        tracing::info!(invocation = index, succeeded, "invocation finished");
    }

    fn on_run_end(&mut self, succeeded: bool) {
        tracing::info!(succeeded, "run finished");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let demo_config = match &cli.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };

    std::fs::create_dir_all(&cli.output)?;

    let (world, road, lane) = network::build_corridor();
    let target_velocity_mps = demo_config.scenario.target_velocity_mps;
    let accel_mps2 = demo_config.scenario.accel_mps2;
    let agent_count = demo_config.scenario.agent_count;
    let spacing_m = demo_config.scenario.spacing_m;

    let agent_builder: op_sim::AgentBuilder = Box::new(move |agent: &mut Agent, _request: &NewAgentRequest| {
        let component = agent
            .graph_mut()
            .add_component(TimingConfig::recurring(100), Box::new(CruiseControlModel::new(target_velocity_mps, accel_mps2)));
        agent
            .graph_mut()
            .connect((component, LinkId(0)), &[])
            .expect("a freshly spawned agent's first component has no prior output link");
    });

    let observation = CsvObservation::new(&cli.output)?;

    let mut run = RunOrchestratorBuilder::new(world, Callbacks { log: log_callback })
        .experiment(demo_config.experiment)
        .environment(demo_config.environment)
        .agent_builder(agent_builder)
        .spawn_point(
            "corridor-entry",
            Box::new(move || Box::new(CorridorEntry::new(road, lane, agent_count, spacing_m))),
        )
        .observation("csv", Box::new(observation))
        .observer(Box::new(PrintingObserver))
        .build();

    let t0 = Instant::now();
    let succeeded = run.run_all()?;
    let elapsed = t0.elapsed();

    println!("run {} in {:.3} s, output in {}", if succeeded { "completed" } else { "failed" }, elapsed.as_secs_f64(), cli.output.display());

    Ok(())
}
