//! The agent-state change a manipulator enqueues in response to matching
//! events (§4.6: "enqueue agent-state mutations... or component-state
//! changes").
//!
//! `Mutation` stays expressed purely in `op_core` vocabulary so this crate
//! never depends on `op-agent` — `op-sim` is the layer that knows how to
//! turn a `Mutation` into an `op_agent::AgentNetwork::queue_agent_update`
//! closure.

use op_core::{ComponentId, ComponentState};

#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    SetComponentState(ComponentId, ComponentState),
    OverrideAcceleration(f64),
    OverrideVelocity(f64),
    Remove,
}
