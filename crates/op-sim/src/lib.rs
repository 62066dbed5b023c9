//! `op-sim` — the run orchestrator binding every other kernel crate into a
//! complete experiment (§4.8).
//!
//! # Per-invocation lifecycle
//!
//! ```text
//! for i in 0..experiment.number_of_invocations:
//!   seed stochastics with random_seed + i, sample world parameters
//!   SlavePreRunHook
//!   rebuild spawn-point / event-detector / manipulator networks
//!   bootstrap: pre-run spawn points, register their agents' tasks
//!   run the scheduler over [0, scenario_end_time_ms]
//!     Spawning → PublishGlobalData/detectors/manipulators → agent tasks
//!     → WorldSync → SlaveUpdateHook, every framework cycle
//!   on success: SlavePostRunHook
//!   always: ClearRun (data store, world, agent/event networks dropped)
//! after the last invocation: SlavePostHook
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use op_plugin::Callbacks;
//! use op_sim::RunOrchestratorBuilder;
//! use op_world::World;
//!
//! let mut run = RunOrchestratorBuilder::new(world, Callbacks::default())
//!     .agent_builder(Box::new(|agent, request| { /* wire the component graph */ }))
//!     .spawn_point("entry", Box::new(|| Box::new(my_spawn_point())))
//!     .build();
//! run.run_all()?;
//! ```

pub mod builder;
pub mod environment;
pub mod error;
pub mod observer;
pub mod plugins;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::{AgentBuilder, RunOrchestratorBuilder};
pub use environment::{EnvironmentConfig, Range, WorldParameters};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, RunObserver};
pub use plugins::{EventDetectorSource, Maker, ManipulatorSource, SpawnSource};
pub use sim::{InvocationOutcome, RunOrchestrator};
