use op_core::{ObjectId, WorldPoint};

use crate::geometry::{GeometryJoint, ObjectPolygon};
use crate::graph::{LaneSpec, RoadContact, RoadGraphBuilder, RoadLink, RoadSpec, SectionSpec};
use crate::spatial::SpatialIndex;
use crate::World;

fn straight_joints(length: f64, samples: usize) -> Vec<GeometryJoint> {
    (0..=samples)
        .map(|i| {
            let s = length * (i as f64) / (samples as f64);
            GeometryJoint {
                s_offset: s,
                center: WorldPoint::new(s, 0.0),
                left: WorldPoint::new(s, 1.75),
                right: WorldPoint::new(s, -1.75),
                heading: 0.0,
                curvature: 0.0,
            }
        })
        .collect()
}

fn single_lane_road(name: &str) -> RoadSpec {
    RoadSpec {
        name: name.to_string(),
        predecessor: None,
        successor: None,
        is_junction_road: false,
        sections: vec![SectionSpec {
            s_start: 0.0,
            s_end: 100.0,
            lanes: vec![LaneSpec {
                index: -1,
                width: 3.5,
                joints: straight_joints(100.0, 4),
            }],
        }],
    }
}

#[cfg(test)]
mod direction_marking {
    use super::*;

    #[test]
    fn end_to_start_contact_propagates_same_direction() {
        let mut builder = RoadGraphBuilder::new();
        let a = builder.add_road(single_lane_road("A"));
        let mut road_b = single_lane_road("B");
        road_b.predecessor = Some(RoadContact {
            link: RoadLink::Road(a),
            same_direction: true,
        });
        builder.add_road(road_b);

        let graph = builder.build().unwrap();
        assert!(graph.road(a).in_direction);
        assert!(graph.roads[1].in_direction);
    }

    #[test]
    fn end_to_end_contact_flips_direction() {
        let mut builder = RoadGraphBuilder::new();
        let a = builder.add_road(single_lane_road("A"));
        let mut road_b = single_lane_road("B");
        road_b.predecessor = Some(RoadContact {
            link: RoadLink::Road(a),
            same_direction: false,
        });
        builder.add_road(road_b);

        let graph = builder.build().unwrap();
        assert!(graph.road(a).in_direction);
        assert!(!graph.roads[1].in_direction);
    }

    #[test]
    fn self_reference_is_a_configuration_error() {
        let mut builder = RoadGraphBuilder::new();
        let mut spec = single_lane_road("A");
        spec.successor = Some(RoadContact {
            link: RoadLink::Road(op_core::RoadId(0)),
            same_direction: true,
        });
        builder.add_road(spec);
        assert!(builder.build().is_err());
    }
}

#[cfg(test)]
mod localization {
    use super::*;

    fn two_lane_road() -> RoadSpec {
        RoadSpec {
            name: "straddle".to_string(),
            predecessor: None,
            successor: None,
            is_junction_road: false,
            sections: vec![SectionSpec {
                s_start: 0.0,
                s_end: 100.0,
                lanes: vec![
                    LaneSpec {
                        index: -1,
                        width: 3.5,
                        joints: (0..=4)
                            .map(|i| {
                                let s = 100.0 * (i as f64) / 4.0;
                                GeometryJoint {
                                    s_offset: s,
                                    center: WorldPoint::new(s, -1.75),
                                    left: WorldPoint::new(s, 0.0),
                                    right: WorldPoint::new(s, -3.5),
                                    heading: 0.0,
                                    curvature: 0.0,
                                }
                            })
                            .collect(),
                    },
                    LaneSpec {
                        index: -2,
                        width: 3.5,
                        joints: (0..=4)
                            .map(|i| {
                                let s = 100.0 * (i as f64) / 4.0;
                                GeometryJoint {
                                    s_offset: s,
                                    center: WorldPoint::new(s, -5.25),
                                    left: WorldPoint::new(s, -3.5),
                                    right: WorldPoint::new(s, -7.0),
                                    heading: 0.0,
                                    curvature: 0.0,
                                }
                            })
                            .collect(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn bounding_box_straddling_two_lanes_touches_both() {
        let mut builder = RoadGraphBuilder::new();
        let road = builder.add_road(two_lane_road());
        let graph = builder.build().unwrap();
        let world = World::new(graph);

        // 2m x 5m box centered on the boundary between the two lanes (t=-3.5).
        let polygon = ObjectPolygon::rectangle(WorldPoint::new(50.0, -3.5), 0.0, 5.0, 2.0, None);
        let position = crate::locate(&world.graph, &world.index, &polygon);

        let touched = position.touched_roads.get(&road).expect("must touch the road");
        assert_eq!(touched.lanes.len(), 2, "must touch both lanes");

        let sum_widths = 3.5 + 3.5;
        let total = touched.remainder_left + touched.remainder_right + 2.0;
        assert!(
            (total - sum_widths).abs() < 0.5,
            "remainder_left({}) + remainder_right({}) + width(2.0) should ~= {sum_widths}, got {total}",
            touched.remainder_left,
            touched.remainder_right
        );
    }

    #[test]
    fn object_fully_off_road_has_no_touched_roads_and_is_not_on_route() {
        let mut builder = RoadGraphBuilder::new();
        builder.add_road(two_lane_road());
        let graph = builder.build().unwrap();
        let world = World::new(graph);

        let polygon = ObjectPolygon::rectangle(WorldPoint::new(50.0, 500.0), 0.0, 5.0, 2.0, None);
        let position = crate::locate(&world.graph, &world.index, &polygon);
        assert!(position.touched_roads.is_empty());
        assert!(!position.is_on_route());
    }

    #[test]
    fn locating_the_same_pose_twice_gives_identical_positions() {
        let mut builder = RoadGraphBuilder::new();
        builder.add_road(single_lane_road("A"));
        let graph = builder.build().unwrap();
        let mut world = World::new(graph);

        let polygon = ObjectPolygon::rectangle(WorldPoint::new(50.0, 0.0), 0.0, 4.5, 1.8, None);
        let id = ObjectId(0);

        let first = world.locate_object(id, polygon.clone()).clone();
        let second = world.locate_object(id, polygon).clone();
        assert_eq!(first, second, "re-locating an unmoved object must not change its position");
    }
}

#[cfg(test)]
mod queries {
    use super::*;

    #[test]
    fn road_coord_round_trips_through_world_coord() {
        let mut builder = RoadGraphBuilder::new();
        builder.add_road(single_lane_road("A"));
        let graph = builder.build().unwrap();
        let lane = graph.lanes[0].id;
        let world = World::new(graph);

        let p = world.road_coord_to_world_coord(lane, 50.0, 1.0).unwrap();
        assert!((p.x - 50.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn distance_to_end_of_lane_decreases_toward_zero() {
        let mut builder = RoadGraphBuilder::new();
        builder.add_road(single_lane_road("A"));
        let graph = builder.build().unwrap();
        let lane = graph.lanes[0].id;
        let world = World::new(graph);

        assert!((world.get_distance_to_end_of_lane(lane, 0.0).unwrap() - 100.0).abs() < 1e-6);
        assert_eq!(world.get_distance_to_end_of_lane(lane, 100.0).unwrap(), 0.0);
    }

    #[test]
    fn spatial_index_is_nonempty_after_build() {
        let mut builder = RoadGraphBuilder::new();
        builder.add_road(single_lane_road("A"));
        let graph = builder.build().unwrap();
        let idx = SpatialIndex::build(&graph);
        assert!(!idx.is_empty());
    }

    #[test]
    fn get_objects_in_range_is_symmetric_between_two_nearby_objects() {
        let mut builder = RoadGraphBuilder::new();
        builder.add_road(single_lane_road("A"));
        let graph = builder.build().unwrap();
        let lane = graph.lanes[0].id;
        let mut world = World::new(graph);

        let near = ObjectId(0);
        let far = ObjectId(1);
        world.locate_object(near, ObjectPolygon::rectangle(WorldPoint::new(40.0, 0.0), 0.0, 4.5, 1.8, None));
        world.locate_object(far, ObjectPolygon::rectangle(WorldPoint::new(60.0, 0.0), 0.0, 4.5, 1.8, None));

        // Both objects sit 20m apart; a +-30m range from either one's own
        // position must see the other (GetObjectsInRange's adjacency
        // relation is symmetric, since it only compares along-lane `s`).
        let seen_from_near = world.get_objects_in_range(lane, 40.0, 30.0, 30.0);
        let seen_from_far = world.get_objects_in_range(lane, 60.0, 30.0, 30.0);
        assert!(seen_from_near.contains(&far), "near should see far within range");
        assert!(seen_from_far.contains(&near), "far should see near within range");
    }
}
