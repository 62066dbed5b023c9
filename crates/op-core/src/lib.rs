//! `op-core` — foundational types for the openPASS-style simulation kernel.
//!
//! This crate is a dependency of every other `op-*` crate. It intentionally
//! has no `op-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                   |
//! |-------------|-------------------------------------------------------------|
//! | [`ids`]     | Typed IDs: `AgentId`, `RoadId`, `SectionId`, `LaneId`, ...   |
//! | [`geo`]     | `WorldPoint`, local Cartesian geometry helpers               |
//! | [`time`]    | `TimeMs`, `RunClock`, `TimingConfig`, `ExperimentConfig`      |
//! | [`rng`]     | `AgentRng` (per-agent), `StochasticsRng` (global)             |
//! | [`signal`]  | `Signal` and its payload variants                             |
//! | [`error`]   | `CoreError`, `CoreResult`                                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                 |
//! |---------|---------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the public types.      |
//!           | Required by `op-datastore`'s checkpoint support.         |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod signal;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{angle_diff, normalize_angle, WorldPoint};
pub use ids::{
    AgentId, ComponentId, EventId, GeometryElementId, JunctionId, LaneId, LinkId, ObjectId,
    RoadId, SectionId, TaskId,
};
pub use rng::{AgentRng, StochasticsRng};
pub use signal::{
    ComponentState, DynamicsSignal, LateralSignal, ParameterSignal, SensorDriverSignal, Signal,
};
pub use time::{ExperimentConfig, RunClock, TimeMs, TimingConfig};
