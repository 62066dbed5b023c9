//! A single-lane, 500 m straight corridor — the minimal road graph that
//! still exercises localization, spawning, and dataflow end to end.

use op_core::{LaneId, RoadId, WorldPoint};
use op_world::geometry::GeometryJoint;
use op_world::graph::{LaneSpec, RoadGraphBuilder, RoadSpec, SectionSpec};
use op_world::World;

const ROAD_LENGTH_M: f64 = 500.0;
const LANE_WIDTH_M: f64 = 3.5;

/// Build the corridor and return the world plus the single road/lane id
/// agents are spawned onto.
pub fn build_corridor() -> (World, RoadId, LaneId) {
    let joints = vec![
        GeometryJoint {
            s_offset: 0.0,
            center: WorldPoint::new(0.0, 0.0),
            left: WorldPoint::new(0.0, LANE_WIDTH_M / 2.0),
            right: WorldPoint::new(0.0, -LANE_WIDTH_M / 2.0),
            heading: 0.0,
            curvature: 0.0,
        },
        GeometryJoint {
            s_offset: ROAD_LENGTH_M,
            center: WorldPoint::new(ROAD_LENGTH_M, 0.0),
            left: WorldPoint::new(ROAD_LENGTH_M, LANE_WIDTH_M / 2.0),
            right: WorldPoint::new(ROAD_LENGTH_M, -LANE_WIDTH_M / 2.0),
            heading: 0.0,
            curvature: 0.0,
        },
    ];

    let mut builder = RoadGraphBuilder::new();
    let road = builder.add_road(RoadSpec {
        name: "corridor".to_string(),
        predecessor: None,
        successor: None,
        is_junction_road: false,
        sections: vec![SectionSpec {
            s_start: 0.0,
            s_end: ROAD_LENGTH_M,
            lanes: vec![LaneSpec {
                index: -1,
                width: LANE_WIDTH_M,
                joints,
            }],
        }],
    });
    let graph = builder.build().expect("a single straight road always builds");
    let section_id = graph.road(road).sections[0];
    let lane_id = graph.section(section_id).lanes[0];
    (World::new(graph), road, lane_id)
}
