//! Spawn-point, observation, and event-detector plug-in networks (C5, §4.5).
//!
//! Each network wraps a collection of `op_plugin::Binding`s plus
//! zero-or-more instantiated plug-ins. `instantiate` iterates named library
//! descriptors, loads the matching dynamic binding, and looks up the
//! kernel's bundled native implementation for that name; a miss at either
//! step is logged and skipped — already-instantiated plug-ins are kept
//! (no all-or-nothing rollback).
//!
//! # Crate layout
//!
//! | Module            | Contents                                        |
//! |--------------------|-------------------------------------------------|
//! | [`spawn`]          | `SpawnPointPlugin`, `SpawnNetwork`, `NewAgentRequest` |
//! | [`observation`]    | `ObservationPlugin`, `ObservationNetwork`       |
//! | [`event_detector`] | `EventDetectorNetwork` (reuses `op_eventnet::EventDetector`) |
//! | [`manipulator`]    | `ManipulatorNetwork` (reuses `op_eventnet::Manipulator`) |
//! | [`error`]          | `NetworksError`, `NetworksResult<T>`            |

pub mod error;
pub mod event_detector;
pub mod manipulator;
pub mod observation;
pub mod spawn;

#[cfg(test)]
mod tests;

pub use error::{NetworksError, NetworksResult};
pub use event_detector::{EventDetectorFactory, EventDetectorNetwork};
pub use manipulator::{ManipulatorFactory, ManipulatorNetwork};
pub use observation::{ObservationFactory, ObservationNetwork, ObservationPlugin};
pub use spawn::{NewAgentRequest, SpawnNetwork, SpawnPointFactory, SpawnPointPlugin};
