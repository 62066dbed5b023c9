//! Plain data rows written by the CSV backend.

/// One agent's global-data snapshot at a given tick, read back out of the
/// `"Agent.*"` cyclic keys (§4.9) that `op-sim::write_global_data` writes.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub invocation: u32,
    pub time_ms: u64,
    pub agent_id: u64,
    pub velocity: f64,
    pub acceleration: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
    pub s: f64,
    pub t: f64,
    /// Present only for agents whose `GlobalData.position` was set.
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
}

/// Aggregate statistics for one tick of one invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub invocation: u32,
    pub time_ms: u64,
    pub agent_count: u64,
}
