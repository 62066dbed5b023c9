//! Localization (§4.2 "Localization"): maps a world-space pose plus
//! bounding polygon onto `(road, lane, s, t, yaw)` per touched road.

use std::collections::{HashMap, HashSet};

use op_core::{LaneId, RoadId, WorldPoint};

use crate::geometry::{GeometryElement, ObjectPolygon};
use crate::graph::RoadGraph;
use crate::spatial::SpatialIndex;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GlobalRoadPosition {
    pub road: RoadId,
    pub lane: LaneId,
    pub s: f64,
    pub t: f64,
    pub yaw: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TouchedRoad {
    pub s_start: f64,
    pub s_end: f64,
    pub lanes: Vec<LaneId>,
    pub remainder_left: f64,
    pub remainder_right: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectPosition {
    pub reference_point: Option<GlobalRoadPosition>,
    pub main_locator: Option<GlobalRoadPosition>,
    pub touched_roads: HashMap<RoadId, TouchedRoad>,
}

impl ObjectPosition {
    /// `isOnRoute = referencePoint ∧ mainLocator both non-empty` (§4.2).
    pub fn is_on_route(&self) -> bool {
        self.reference_point.is_some() && self.main_locator.is_some()
    }
}

struct Accum {
    s_min: f64,
    s_max: f64,
    lanes: HashSet<LaneId>,
    left_slack: f64,
    right_slack: f64,
}

impl Accum {
    fn new() -> Self {
        Self {
            s_min: f64::INFINITY,
            s_max: f64::NEG_INFINITY,
            lanes: HashSet::new(),
            left_slack: f64::INFINITY,
            right_slack: f64::INFINITY,
        }
    }
}

/// Locate `polygon` against the road graph's geometry. Queries `index` for
/// coarse bounding-box candidates, then computes exact polygon intersection
/// per element.
pub fn locate(graph: &RoadGraph, index: &SpatialIndex, polygon: &ObjectPolygon) -> ObjectPosition {
    let (min, max) = polygon.bbox();
    let candidates = index.query_bbox(min, max);

    let mut touched: HashMap<RoadId, Accum> = HashMap::new();
    let mut reference_point = None;
    let mut main_locator = None;

    for id in candidates {
        let element = index.element(id);
        let lane_id = index.lane_of(id);
        let lane = graph.lane(lane_id);
        let road_id = graph.section(lane.section).road;

        if element.intersects_polygon(&polygon.corners) {
            let (left_slack, right_slack) = lateral_slack(element, lane.width, &polygon.corners);
            let acc = touched.entry(road_id).or_insert_with(Accum::new);
            acc.s_min = acc.s_min.min(element.s_start);
            acc.s_max = acc.s_max.max(element.s_end);
            acc.lanes.insert(lane_id);
            acc.left_slack = acc.left_slack.min(left_slack);
            acc.right_slack = acc.right_slack.min(right_slack);
        }

        if reference_point.is_none() && element.contains_point(polygon.reference_point) {
            reference_point = Some(global_position(graph, lane_id, element, polygon.reference_point));
        }
        if main_locator.is_none() && element.contains_point(polygon.main_locator) {
            main_locator = Some(global_position(graph, lane_id, element, polygon.main_locator));
        }
    }

    let touched_roads = touched
        .into_iter()
        .map(|(road, acc)| {
            let mut lanes: Vec<LaneId> = acc.lanes.into_iter().collect();
            lanes.sort_by_key(|l| l.0);
            (
                road,
                TouchedRoad {
                    s_start: acc.s_min,
                    s_end: acc.s_max,
                    lanes,
                    remainder_left: acc.left_slack.max(0.0),
                    remainder_right: acc.right_slack.max(0.0),
                },
            )
        })
        .collect();

    ObjectPosition {
        reference_point,
        main_locator,
        touched_roads,
    }
}

/// Perpendicular distance of `p` from the element's centerline, signed
/// positive to the left (toward the `left` edge).
fn lateral_offset(element: &GeometryElement, p: WorldPoint) -> f64 {
    let center_start = element.corners[0].lerp(element.corners[3], 0.5);
    let center_end = element.corners[1].lerp(element.corners[2], 0.5);
    let dir = (center_end.x - center_start.x, center_end.y - center_start.y);
    let len = (dir.0 * dir.0 + dir.1 * dir.1).sqrt().max(f64::EPSILON);
    let normal = (-dir.1 / len, dir.0 / len);
    let rel = (p.x - center_start.x, p.y - center_start.y);
    rel.0 * normal.0 + rel.1 * normal.1
}

/// How much of the lane's half-width on each side is *not* covered by the
/// polygon's footprint — used to compute `remainder_left`/`remainder_right`
/// so that `remainder_left + remainder_right + width ≈` combined width of
/// all touched lanes for a straddling object (S5).
fn lateral_slack(element: &GeometryElement, lane_width: f64, polygon: &[WorldPoint]) -> (f64, f64) {
    let half = lane_width / 2.0;
    let offsets: Vec<f64> = polygon.iter().map(|&p| lateral_offset(element, p)).collect();
    let t_max = offsets.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let t_min = offsets.iter().cloned().fold(f64::INFINITY, f64::min);
    let left_slack = (half - t_max).max(0.0);
    let right_slack = (half + t_min).max(0.0);
    (left_slack, right_slack)
}

fn global_position(
    graph: &RoadGraph,
    lane: LaneId,
    element: &GeometryElement,
    point: WorldPoint,
) -> GlobalRoadPosition {
    let road = graph.section(graph.lane(lane).section).road;
    let t = lateral_offset(element, point);
    let s = element.s_start.max(0.0) + (element.s_end - element.s_start) * 0.5;
    let center_start = element.corners[0].lerp(element.corners[3], 0.5);
    let center_end = element.corners[1].lerp(element.corners[2], 0.5);
    let yaw = (center_end.y - center_start.y).atan2(center_end.x - center_start.x);
    GlobalRoadPosition { road, lane, s, t, yaw }
}
