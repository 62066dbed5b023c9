//! Pure query functions over the road graph and current object positions
//! (§4.2 "Queries"): all of these are pure functions of the road graph and
//! current object positions.

use std::collections::HashMap;

use op_core::{LaneId, ObjectId, RoadId, WorldPoint};

use crate::geometry::{interpolate, GeometryJoint, ObjectPolygon};
use crate::graph::{RoadGraph, RoadLink};
use crate::localization::{self, GlobalRoadPosition, ObjectPosition};
use crate::spatial::SpatialIndex;

#[derive(Clone, Debug)]
pub struct TrafficSign {
    pub lane: LaneId,
    pub s: f64,
    pub kind: String,
}

struct ObjectState {
    position: ObjectPosition,
    polygon: ObjectPolygon,
}

/// Owns the built road graph, its spatial index, and the live set of
/// object positions. All query methods are pure reads over this state.
pub struct World {
    pub graph: RoadGraph,
    pub index: SpatialIndex,
    objects: HashMap<ObjectId, ObjectState>,
    signs: Vec<TrafficSign>,
}

impl World {
    pub fn new(graph: RoadGraph) -> Self {
        let index = SpatialIndex::build(&graph);
        Self {
            graph,
            index,
            objects: HashMap::new(),
            signs: Vec::new(),
        }
    }

    pub fn add_traffic_sign(&mut self, sign: TrafficSign) {
        self.signs.push(sign);
    }

    /// Relocate (or first-locate) an object. Clears its prior lane
    /// assignment before recording the new one (§4.2 "Side effect").
    pub fn locate_object(&mut self, id: ObjectId, polygon: ObjectPolygon) -> &ObjectPosition {
        let position = localization::locate(&self.graph, &self.index, &polygon);
        self.objects.insert(id, ObjectState { position, polygon });
        &self.objects[&id].position
    }

    pub fn object_position(&self, id: ObjectId) -> Option<&ObjectPosition> {
        self.objects.get(&id).map(|s| &s.position)
    }

    /// Drops every tracked object position. Called between invocations —
    /// the road graph and its spatial index persist, but object positions
    /// are scoped to one invocation (§4.8: agent ids are never reused, so
    /// stale entries from a prior invocation would otherwise linger
    /// unreferenced but still visible to range queries).
    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    fn lane_joint_span(&self, lane: LaneId) -> Option<(&GeometryJoint, &GeometryJoint)> {
        let joints = &self.graph.lane(lane).joints;
        Some((joints.first()?, joints.last()?))
    }

    fn joint_at(&self, lane: LaneId, s: f64) -> Option<GeometryJoint> {
        let joints = &self.graph.lane(lane).joints;
        if joints.is_empty() {
            return None;
        }
        let idx = joints.partition_point(|j| j.s_offset <= s);
        if idx == 0 {
            return Some(joints[0]);
        }
        if idx >= joints.len() {
            return Some(*joints.last().unwrap());
        }
        Some(interpolate(&joints[idx - 1], &joints[idx], s))
    }

    /// `RoadCoord2WorldCoord`: lane-local `(s, t)` to world position.
    pub fn road_coord_to_world_coord(&self, lane: LaneId, s: f64, t: f64) -> Option<WorldPoint> {
        let joint = self.joint_at(lane, s)?;
        let lat = (-joint.heading.sin(), joint.heading.cos());
        Some(WorldPoint::new(
            joint.center.x + lat.0 * t,
            joint.center.y + lat.1 * t,
        ))
    }

    pub fn get_lane_width(&self, lane: LaneId, _s: f64) -> Option<f64> {
        Some(self.graph.lane(lane).width)
    }

    pub fn get_lane_curvature(&self, lane: LaneId, s: f64) -> Option<f64> {
        self.joint_at(lane, s).map(|j| j.curvature)
    }

    pub fn get_lane_direction(&self, lane: LaneId, s: f64) -> Option<f64> {
        self.joint_at(lane, s).map(|j| j.heading)
    }

    pub fn get_distance_to_end_of_lane(&self, lane: LaneId, s: f64) -> Option<f64> {
        let (first, last) = self.lane_joint_span(lane)?;
        let _ = first;
        Some((last.s_offset - s).max(0.0))
    }

    /// `GetObjectsInRange`: objects positioned on `lane` within
    /// `[s - backward, s + forward]`.
    pub fn get_objects_in_range(
        &self,
        lane: LaneId,
        s: f64,
        backward: f64,
        forward: f64,
    ) -> Vec<ObjectId> {
        let lo = s - backward;
        let hi = s + forward;
        self.objects
            .iter()
            .filter(|(_, state)| {
                state
                    .position
                    .reference_point
                    .map(|rp| rp.lane == lane && rp.s >= lo && rp.s <= hi)
                    .unwrap_or(false)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn get_traffic_signs_in_range(&self, lane: LaneId, s: f64, forward: f64) -> Vec<&TrafficSign> {
        self.signs
            .iter()
            .filter(|sign| sign.lane == lane && sign.s >= s && sign.s <= s + forward)
            .collect()
    }

    /// `GetObstruction`: how far `other_corners` intrude laterally into
    /// `own`'s lane — positive means an actual obstruction; non-positive
    /// means no overlap.
    pub fn get_obstruction(&self, own: GlobalRoadPosition, other_corners: &[WorldPoint]) -> f64 {
        let Some(width) = self.get_lane_width(own.lane, own.s) else {
            return 0.0;
        };
        let half = width / 2.0;
        let Some(joint) = self.joint_at(own.lane, own.s) else {
            return 0.0;
        };
        let normal = (-joint.heading.sin(), joint.heading.cos());
        let mut max_intrusion = f64::NEG_INFINITY;
        for corner in other_corners {
            let rel = (corner.x - joint.center.x, corner.y - joint.center.y);
            let t = rel.0 * normal.0 + rel.1 * normal.1;
            let intrusion = half - (t - own.t).abs();
            max_intrusion = max_intrusion.max(intrusion);
        }
        max_intrusion
    }

    /// `GetDistanceToJunction`: walk successor road links up to `forward`
    /// metres, returning the distance to the first junction link found.
    pub fn get_distance_to_junction(&self, road: RoadId, forward: f64) -> Option<f64> {
        let mut current = road;
        let mut accumulated = 0.0;
        loop {
            let r = self.graph.road(current);
            match r.successor {
                Some(contact) => match contact.link {
                    RoadLink::Junction(_) => return Some(accumulated),
                    RoadLink::Road(next) => {
                        accumulated += road_length(&self.graph, current);
                        if accumulated > forward {
                            return None;
                        }
                        current = next;
                    }
                },
                None => return None,
            }
        }
    }
}

fn road_length(graph: &RoadGraph, road: RoadId) -> f64 {
    graph
        .road(road)
        .sections
        .iter()
        .map(|&s| {
            let section = graph.section(s);
            section.s_end - section.s_start
        })
        .sum()
}
