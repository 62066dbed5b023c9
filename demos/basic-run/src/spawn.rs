//! A spawn point that places a fixed number of agents at the start of the
//! corridor, spaced out along `s` so they don't overlap.

use op_core::{LaneId, RoadId, TimeMs};
use op_networks::{NewAgentRequest, SpawnPointPlugin};

pub struct CorridorEntry {
    road: RoadId,
    lane: LaneId,
    agent_count: u32,
    spacing_m: f64,
}

impl CorridorEntry {
    pub fn new(road: RoadId, lane: LaneId, agent_count: u32, spacing_m: f64) -> Self {
        Self {
            road,
            lane,
            agent_count,
            spacing_m,
        }
    }
}

impl SpawnPointPlugin for CorridorEntry {
    fn trigger_pre_run(&mut self) -> Vec<NewAgentRequest> {
        (0..self.agent_count)
            .map(|i| NewAgentRequest {
                road: self.road,
                lane: self.lane,
                s: i as f64 * self.spacing_m,
                t: 0.0,
                agent_profile: "car".to_string(),
            })
            .collect()
    }

    fn trigger_runtime(&mut self, _time: TimeMs) -> Vec<NewAgentRequest> {
        Vec::new()
    }
}
