use op_core::{AgentId, TimeMs};

use crate::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub struct CyclicRecord {
    pub time: TimeMs,
    pub agent: AgentId,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AcyclicRecord {
    pub time: TimeMs,
    pub agent: AgentId,
    pub value: Value,
}

/// `key -> value[]` with a `persist` flag surviving `Clear` (§4.9).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct StaticRecord {
    pub values: Vec<Value>,
    pub persist: bool,
}
