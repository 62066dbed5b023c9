//! `op-agent` — the agent dataflow graph (§4.3) and agent factory/network
//! (§4.4) for the simulation kernel.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|----------------------------------------------------------------|
//! | [`channel`] | `Buffer` — the double-buffered rendezvous point at a link       |
//! | [`graph`]   | `AgentGraph` — components, links, `UpdateInput`/`Trigger`/`UpdateOutput` |
//! | [`agent`]   | `Agent`, `AgentStatus`, `GlobalData`                            |
//! | [`network`] | `AgentNetwork` — add/update/remove agents, publish global data  |
//! | [`error`]   | `AgentError`, `AgentResult`                                     |
//!
//! Scheduling which component runs when (priority, cycle time) is
//! `op-schedule`'s responsibility; this crate only provides the three
//! per-component phases and the buffered channels between them.

pub mod agent;
pub mod channel;
pub mod error;
pub mod graph;
pub mod network;

#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentStatus, GlobalData};
pub use channel::Buffer;
pub use error::{AgentError, AgentResult};
pub use graph::AgentGraph;
pub use network::AgentNetwork;
