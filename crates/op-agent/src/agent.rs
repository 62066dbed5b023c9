//! One simulated agent: its dataflow graph plus the fixed publish keys
//! `PublishGlobalData` reads (§4.4).

use op_core::{AgentId, AgentRng, LaneId, RoadId, TimeMs, WorldPoint};

use crate::graph::AgentGraph;

/// An agent's lifecycle state as tracked by [`crate::AgentNetwork`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AgentStatus {
    /// Participating normally in the current tick.
    Live,
    /// Localization failed during `SyncGlobalData`; dropped from scheduling
    /// next tick but still present for observers (§4.4).
    Invalid,
    /// Removed via `QueueAgentRemove`; retained so referrers (e.g. a
    /// trailing agent's "front agent id") can still resolve the id.
    Removed,
}

/// The fixed set of kinematic/localization keys `PublishGlobalData` emits
/// per live agent (§4.4): position, velocity, acceleration, yaw, yaw-rate,
/// steering, odometer, s/t, lane, road, secondary lanes, front agent id.
#[derive(Clone, Debug, Default)]
pub struct GlobalData {
    pub position: Option<WorldPoint>,
    pub velocity: f64,
    pub acceleration: f64,
    pub yaw: f64,
    pub yaw_rate: f64,
    pub steering_angle_rad: f64,
    pub odometer: f64,
    pub s: f64,
    pub t: f64,
    pub lane: Option<LaneId>,
    pub road: Option<RoadId>,
    pub secondary_lanes: Vec<LaneId>,
    pub front_agent: Option<AgentId>,
}

#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    spawn_time: TimeMs,
    status: AgentStatus,
    graph: AgentGraph,
    rng: AgentRng,
    global_data: GlobalData,
}

impl Agent {
    pub fn new(id: AgentId, spawn_time: TimeMs, rng: AgentRng) -> Self {
        Self {
            id,
            spawn_time,
            status: AgentStatus::Live,
            graph: AgentGraph::new(),
            rng,
            global_data: GlobalData::default(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn spawn_time(&self) -> TimeMs {
        self.spawn_time
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn mark_invalid(&mut self) {
        self.status = AgentStatus::Invalid;
    }

    pub fn mark_removed(&mut self) {
        self.status = AgentStatus::Removed;
    }

    pub fn is_live(&self) -> bool {
        self.status == AgentStatus::Live
    }

    pub fn graph(&self) -> &AgentGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut AgentGraph {
        &mut self.graph
    }

    pub fn rng(&mut self) -> &mut AgentRng {
        &mut self.rng
    }

    pub fn global_data(&self) -> &GlobalData {
        &self.global_data
    }

    pub fn set_global_data(&mut self, data: GlobalData) {
        self.global_data = data;
    }
}
