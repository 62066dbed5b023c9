//! Lane/road stream cache (§4.2 "Navigation"): "another query whose point
//! lies in a stored interval and whose route equals the cached route
//! returns the same stream object; cache is immortal within an invocation,
//! cleared at `Reset`."

use std::collections::HashMap;
use std::rc::Rc;

use op_core::{LaneId, RoadId};
use op_world::{GeometryJoint, RoadGraph};

use crate::error::{NavigationError, NavigationResult};

/// A flattened, linear-s view over a single lane's joints.
#[derive(Debug)]
pub struct LaneStream {
    pub road: RoadId,
    pub lane: LaneId,
    pub s_start: f64,
    pub s_end: f64,
    pub joints: Vec<GeometryJoint>,
}

/// A flattened view over every lane of a single road, for road-level queries.
#[derive(Debug)]
pub struct RoadStream {
    pub road: RoadId,
    pub s_start: f64,
    pub s_end: f64,
    pub lanes: Vec<LaneId>,
}

type Interval<T> = (f64, f64, Rc<T>);

/// Cache keyed by `(route hash, roadId, laneId)` to a list of disjoint
/// `s`-intervals, each carrying the stream built for that interval.
#[derive(Default)]
pub struct StreamCache {
    lanes: HashMap<(u64, RoadId, LaneId), Vec<Interval<LaneStream>>>,
    roads: HashMap<(u64, RoadId), Vec<Interval<RoadStream>>>,
}

impl StreamCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every cached stream. Called at `Reset` — never mid-invocation.
    pub fn reset(&mut self) {
        self.lanes.clear();
        self.roads.clear();
    }

    /// Returns the cached lane stream covering `s` for `(route, road, lane)`,
    /// building and inserting one if no stored interval covers it.
    pub fn lane_stream(
        &mut self,
        route_hash: u64,
        graph: &RoadGraph,
        road: RoadId,
        lane: LaneId,
        s: f64,
    ) -> NavigationResult<Rc<LaneStream>> {
        let key = (route_hash, road, lane);
        if let Some(hit) = self
            .lanes
            .get(&key)
            .and_then(|entries| entries.iter().find(|(lo, hi, _)| s >= *lo && s <= *hi))
        {
            return Ok(Rc::clone(&hit.2));
        }

        let lane_data = graph.lane(lane);
        let (s_start, s_end) = lane_data
            .joints
            .first()
            .zip(lane_data.joints.last())
            .map(|(a, b)| (a.s_offset, b.s_offset))
            .ok_or(NavigationError::EmptyRoad(road))?;

        let stream = Rc::new(LaneStream {
            road,
            lane,
            s_start,
            s_end,
            joints: lane_data.joints.clone(),
        });
        self.lanes.entry(key).or_default().push((s_start, s_end, Rc::clone(&stream)));
        Ok(stream)
    }

    /// Returns the cached road stream covering `s` for `(route, road)`.
    pub fn road_stream(
        &mut self,
        route_hash: u64,
        graph: &RoadGraph,
        road: RoadId,
        s: f64,
    ) -> NavigationResult<Rc<RoadStream>> {
        let key = (route_hash, road);
        if let Some(hit) = self
            .roads
            .get(&key)
            .and_then(|entries| entries.iter().find(|(lo, hi, _)| s >= *lo && s <= *hi))
        {
            return Ok(Rc::clone(&hit.2));
        }

        let road_data = graph.road(road);
        let lanes: Vec<LaneId> = road_data
            .sections
            .iter()
            .flat_map(|&sid| graph.section(sid).lanes.iter().copied())
            .collect();
        let (s_start, s_end) = road_data
            .sections
            .first()
            .zip(road_data.sections.last())
            .map(|(first, last)| (graph.section(*first).s_start, graph.section(*last).s_end))
            .ok_or(NavigationError::EmptyRoad(road))?;

        let stream = Rc::new(RoadStream { road, s_start, s_end, lanes });
        self.roads.entry(key).or_default().push((s_start, s_end, Rc::clone(&stream)));
        Ok(stream)
    }

    pub fn lane_cache_len(&self) -> usize {
        self.lanes.values().map(|v| v.len()).sum()
    }
}
