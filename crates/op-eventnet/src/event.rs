//! The event record (§4.6): an immutable fact posted by a detector or a
//! component, consumed by manipulators within the same or a later tick.

use op_core::{AgentId, EventId, TimeMs};

/// Payload carried by an event. The event network never inspects this
/// beyond letting a manipulator match on it — the same "opaque beyond the
/// tag" discipline `op_core::Signal` uses for component output.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EventPayload {
    #[default]
    Empty,
    Text(String),
    Numeric(f64),
}

#[derive(Clone, Debug)]
pub struct Event {
    pub id: EventId,
    pub time: TimeMs,
    pub source_name: String,
    pub kind: String,
    pub acting_agents: Vec<AgentId>,
    pub triggering_agents: Vec<AgentId>,
    pub payload: EventPayload,
    /// If `false`, the scheduler's synchronize phase drops this event when
    /// it clears active events; if `true`, it survives into the next tick.
    pub retain: bool,
}
